use std::fmt;

use capo_core::{gvk_key, join_api_version, split_api_version};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::Resource;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::SchemeError;

/// The schema family that contributed an entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Family {
    /// Built-in Kubernetes kinds.
    ClientGo,
    ClusterApiV1Beta1,
    ClusterApiV1Beta2,
    /// OCI provider kinds.
    Infrastructure,
    /// Experimental OCI provider kinds (machine pools, managed clusters).
    ExpInfrastructure,
    /// Registered at runtime without a typed shape.
    Dynamic,
}

impl Family {
    pub fn as_str(self) -> &'static str {
        match self {
            Family::ClientGo => "client-go",
            Family::ClusterApiV1Beta1 => "cluster-api/v1beta1",
            Family::ClusterApiV1Beta2 => "cluster-api/v1beta2",
            Family::Infrastructure => "infrastructure",
            Family::ExpInfrastructure => "exp-infrastructure",
            Family::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Scope {
    Namespaced,
    Cluster,
}

/// Maps a resource's scope marker type onto [`Scope`].
pub trait ScopeKind {
    const SCOPE: Scope;
}

impl ScopeKind for k8s_openapi::NamespaceResourceScope {
    const SCOPE: Scope = Scope::Namespaced;
}

impl ScopeKind for k8s_openapi::ClusterResourceScope {
    const SCOPE: Scope = Scope::Cluster;
}

enum CodecError {
    Decode(serde_json::Error),
    Encode(serde_json::Error),
}

/// Pass a tree through the typed shape of a kind and back.
fn normalize<K: Serialize + DeserializeOwned>(value: Value) -> Result<Value, CodecError> {
    let typed: K = serde_json::from_value(value).map_err(CodecError::Decode)?;
    serde_json::to_value(&typed).map_err(CodecError::Encode)
}

/// Everything needed to marshal an anonymous payload into and out of one kind.
#[derive(Clone)]
pub struct SchemeEntry {
    pub gvk: GroupVersionKind,
    pub resource: ApiResource,
    pub scope: Scope,
    pub family: Family,
    normalize: fn(Value) -> Result<Value, CodecError>,
}

impl SchemeEntry {
    pub fn key(&self) -> String {
        gvk_key(&self.gvk)
    }

    pub fn namespaced(&self) -> bool {
        self.scope == Scope::Namespaced
    }

    fn normalize(&self, value: Value) -> Result<Value, SchemeError> {
        (self.normalize)(value).map_err(|e| match e {
            CodecError::Decode(source) => SchemeError::Decode { gvk: self.key(), source },
            CodecError::Encode(source) => SchemeError::Encode { gvk: self.key(), source },
        })
    }
}

impl fmt::Debug for SchemeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeEntry")
            .field("gvk", &self.key())
            .field("plural", &self.resource.plural)
            .field("scope", &self.scope)
            .field("family", &self.family)
            .finish()
    }
}

/// Collects registrations. Malformed definitions and repeated GVKs are
/// skipped without error; the first registration of a GVK wins.
#[derive(Default)]
pub struct SchemeBuilder {
    entries: Vec<SchemeEntry>,
    index: FxHashMap<String, usize>,
}

impl SchemeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<K>(&mut self, family: Family) -> &mut Self
    where
        K: Resource<DynamicType = ()> + Serialize + DeserializeOwned,
        K::Scope: ScopeKind,
    {
        let resource = ApiResource::erase::<K>(&());
        self.insert(SchemeEntry {
            gvk: GroupVersionKind::gvk(&resource.group, &resource.version, &resource.kind),
            resource,
            scope: <K::Scope as ScopeKind>::SCOPE,
            family,
            normalize: normalize::<K>,
        });
        self
    }

    /// Register a kind known only by its API resource, e.g. a discovered CRD.
    /// Payloads are checked for object shape only.
    pub fn register_dynamic(&mut self, resource: ApiResource, scope: Scope) -> &mut Self {
        self.insert(SchemeEntry {
            gvk: GroupVersionKind::gvk(&resource.group, &resource.version, &resource.kind),
            resource,
            scope,
            family: Family::Dynamic,
            normalize: normalize::<DynamicObject>,
        });
        self
    }

    fn insert(&mut self, entry: SchemeEntry) {
        if entry.gvk.kind.is_empty() || entry.gvk.version.is_empty() || entry.resource.plural.is_empty() {
            debug!(gvk = %entry.key(), family = %entry.family, "skipping malformed registration");
            return;
        }
        let key = entry.key();
        if let Some(&idx) = self.index.get(&key) {
            debug!(gvk = %key, family = %entry.family, first = %self.entries[idx].family, "already registered; keeping first");
            return;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(self) -> Scheme {
        debug!(entries = self.entries.len(), "scheme built");
        Scheme { entries: self.entries, index: self.index }
    }
}

/// Immutable GVK lookup. Built once, then shared by reference.
#[derive(Debug)]
pub struct Scheme {
    entries: Vec<SchemeEntry>,
    index: FxHashMap<String, usize>,
}

impl Scheme {
    pub fn entry(&self, gvk: &GroupVersionKind) -> Option<&SchemeEntry> {
        self.index.get(&gvk_key(gvk)).map(|&i| &self.entries[i])
    }

    pub fn recognizes(&self, gvk: &GroupVersionKind) -> bool {
        self.entry(gvk).is_some()
    }

    /// Look up by the `apiVersion`/`kind` pair found in manifests.
    pub fn lookup(&self, api_version: &str, kind: &str) -> Result<&SchemeEntry, SchemeError> {
        let (group, version) = split_api_version(api_version);
        self.entry(&GroupVersionKind::gvk(group, version, kind)).ok_or_else(|| SchemeError::NotRegistered {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
        })
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[SchemeEntry] {
        &self.entries
    }

    pub fn kinds_for_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a SchemeEntry> + 'a {
        self.entries.iter().filter(move |e| e.gvk.group == group)
    }

    /// Contributing families, in the order they registered.
    pub fn families(&self) -> Vec<Family> {
        let mut out: Vec<Family> = Vec::new();
        for e in &self.entries {
            if !out.contains(&e.family) {
                out.push(e.family);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode a JSON or YAML manifest of any registered kind.
    pub fn decode(&self, payload: &[u8]) -> Result<DynamicObject, SchemeError> {
        let value: Value = serde_yaml::from_slice(payload)?;
        self.decode_value(value)
    }

    /// Validate a tree against the typed shape of its kind.
    pub fn decode_value(&self, value: Value) -> Result<DynamicObject, SchemeError> {
        let normalized = self.normalize(value)?;
        Ok(serde_json::from_value(normalized)?)
    }

    /// Encode an object to JSON bytes after checking it against its typed shape.
    pub fn encode(&self, obj: &DynamicObject) -> Result<Vec<u8>, SchemeError> {
        let normalized = self.normalize(serde_json::to_value(obj)?)?;
        Ok(serde_json::to_vec(&normalized)?)
    }

    /// An empty object of a registered kind with type metadata filled in.
    /// `namespace` is ignored for cluster-scoped kinds.
    pub fn new_object(&self, gvk: &GroupVersionKind, name: &str, namespace: Option<&str>) -> Result<DynamicObject, SchemeError> {
        let entry = self.entry(gvk).ok_or_else(|| SchemeError::NotRegistered {
            api_version: join_api_version(&gvk.group, &gvk.version),
            kind: gvk.kind.clone(),
        })?;
        let obj = DynamicObject::new(name, &entry.resource);
        Ok(match namespace {
            Some(ns) if entry.namespaced() => obj.within(ns),
            _ => obj,
        })
    }

    fn normalize(&self, value: Value) -> Result<Value, SchemeError> {
        let entry = {
            let api_version = value.get("apiVersion").and_then(Value::as_str).ok_or(SchemeError::MissingTypeMeta)?;
            let kind = value.get("kind").and_then(Value::as_str).ok_or(SchemeError::MissingTypeMeta)?;
            self.lookup(api_version, kind)?
        };
        entry.normalize(value)
    }
}
