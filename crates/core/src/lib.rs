//! Capo core types: the closed set of Cluster API kinds the bridge understands,
//! the ordered schema generations, and GVK key helpers shared by every crate.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use kube::core::GroupVersionKind;
use serde::{Deserialize, Serialize};

mod error;

pub use error::{ConversionError, ParseError};

/// API group of the core Cluster API kinds.
pub const CLUSTER_API_GROUP: &str = "cluster.x-k8s.io";

/// A discrete, ordered version of the Cluster API data shapes.
///
/// Ordering follows age: `V1Beta1 < V1Beta2`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SchemaGeneration {
    V1Beta1,
    V1Beta2,
}

impl SchemaGeneration {
    pub const ALL: [SchemaGeneration; 2] = [SchemaGeneration::V1Beta1, SchemaGeneration::V1Beta2];

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaGeneration::V1Beta1 => "v1beta1",
            SchemaGeneration::V1Beta2 => "v1beta2",
        }
    }

    /// The adjacent older generation, if any. Only N -> N-1 conversions exist.
    pub fn previous(self) -> Option<SchemaGeneration> {
        match self {
            SchemaGeneration::V1Beta1 => None,
            SchemaGeneration::V1Beta2 => Some(SchemaGeneration::V1Beta1),
        }
    }
}

impl fmt::Display for SchemaGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaGeneration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemaGeneration::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ParseError::UnknownGeneration(s.to_string()))
    }
}

/// Resource kinds covered by the version bridge. The set is closed: adding a
/// kind here forces every dispatch over it to be revisited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Cluster,
    Machine,
    MachinePool,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Cluster, ResourceKind::Machine, ResourceKind::MachinePool];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Cluster => "Cluster",
            ResourceKind::Machine => "Machine",
            ResourceKind::MachinePool => "MachinePool",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::Cluster => "clusters",
            ResourceKind::Machine => "machines",
            ResourceKind::MachinePool => "machinepools",
        }
    }

    /// `cluster.x-k8s.io/<generation>`
    pub fn api_version(self, generation: SchemaGeneration) -> String {
        format!("{}/{}", CLUSTER_API_GROUP, generation)
    }

    pub fn gvk(self, generation: SchemaGeneration) -> GroupVersionKind {
        GroupVersionKind::gvk(CLUSTER_API_GROUP, generation.as_str(), self.as_str())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseError::UnknownKind(s.to_string()))
    }
}

/// One directed conversion: a kind moving between two generations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Conversion {
    pub kind: ResourceKind,
    pub from: SchemaGeneration,
    pub to: SchemaGeneration,
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.kind, self.from, self.to)
    }
}

/// Render a GVK as `version/Kind` (core group) or `group/version/Kind`.
pub fn gvk_key(gvk: &GroupVersionKind) -> String {
    if gvk.group.is_empty() {
        format!("{}/{}", gvk.version, gvk.kind)
    } else {
        format!("{}/{}/{}", gvk.group, gvk.version, gvk.kind)
    }
}

/// Inverse of [`gvk_key`].
pub fn parse_gvk_key(key: &str) -> Result<GroupVersionKind, ParseError> {
    let parts: Vec<_> = key.split('/').collect();
    match parts.as_slice() {
        [version, kind] if !version.is_empty() && !kind.is_empty() => Ok(GroupVersionKind::gvk("", version, kind)),
        [group, version, kind] if !group.is_empty() && !version.is_empty() && !kind.is_empty() => {
            Ok(GroupVersionKind::gvk(group, version, kind))
        }
        _ => Err(ParseError::InvalidGvkKey(key.to_string())),
    }
}

/// Join a group and version into an `apiVersion`; the core group renders as the bare version.
pub fn join_api_version(group: &str, version: &str) -> String {
    if group.is_empty() {
        version.to_string()
    } else {
        format!("{}/{}", group, version)
    }
}

/// Split an `apiVersion` into `(group, version)`; the core group is empty.
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_are_ordered_and_adjacent() {
        assert!(SchemaGeneration::V1Beta1 < SchemaGeneration::V1Beta2);
        assert_eq!(SchemaGeneration::V1Beta2.previous(), Some(SchemaGeneration::V1Beta1));
        assert_eq!(SchemaGeneration::V1Beta1.previous(), None);
        assert_eq!("v1beta2".parse::<SchemaGeneration>().unwrap(), SchemaGeneration::V1Beta2);
        assert!("v1".parse::<SchemaGeneration>().is_err());
    }

    #[test]
    fn kinds_parse_and_render() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
        assert!(matches!("OCICluster".parse::<ResourceKind>(), Err(ParseError::UnknownKind(k)) if k == "OCICluster"));
        assert_eq!(ResourceKind::MachinePool.api_version(SchemaGeneration::V1Beta1), "cluster.x-k8s.io/v1beta1");
        let gvk = ResourceKind::Machine.gvk(SchemaGeneration::V1Beta2);
        assert_eq!(gvk_key(&gvk), "cluster.x-k8s.io/v1beta2/Machine");
    }

    #[test]
    fn gvk_keys_round_trip() {
        let core = parse_gvk_key("v1/ConfigMap").unwrap();
        assert_eq!(core.group, "");
        assert_eq!(gvk_key(&core), "v1/ConfigMap");
        let crd = parse_gvk_key("infrastructure.cluster.x-k8s.io/v1beta2/OCICluster").unwrap();
        assert_eq!(crd.kind, "OCICluster");
        assert!(parse_gvk_key("ConfigMap").is_err());
        assert!(parse_gvk_key("a/b/c/d").is_err());
        assert!(parse_gvk_key("/v1/Kind").is_err());
    }

    #[test]
    fn api_version_split() {
        assert_eq!(split_api_version("v1"), ("", "v1"));
        assert_eq!(split_api_version("apps/v1"), ("apps", "v1"));
        assert_eq!(join_api_version("", "v1"), "v1");
        assert_eq!(join_api_version("apps", "v1"), "apps/v1");
    }

    #[test]
    fn conversion_renders_direction() {
        let c = Conversion { kind: ResourceKind::Cluster, from: SchemaGeneration::V1Beta2, to: SchemaGeneration::V1Beta1 };
        assert_eq!(c.to_string(), "Cluster v1beta2 -> v1beta1");
    }
}
