//! Capo version bridge: downgrade Cluster API records from v1beta2 to v1beta1.
//!
//! Conversion is structural. A record is encoded into a generic JSON tree and
//! the tree is decoded into the older shape: shared fields carry over, fields
//! the older shape does not declare fall away, and a field the older shape
//! requires but the tree lacks fails the call. There is no per-field mapping,
//! so a field added to both generations needs no change here.

#![forbid(unsafe_code)]

use capo_api::cluster::{v1beta1, v1beta2};
use capo_core::{Conversion, ConversionError, ResourceKind, SchemaGeneration};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Encode `record` into the intermediate tree, then decode the tree as `O`.
fn bridge<N, O>(conversion: Conversion, record: &N) -> Result<O, ConversionError>
where
    N: Serialize,
    O: DeserializeOwned,
{
    let tree = serde_json::to_value(record).map_err(|source| ConversionError::Encode { conversion, source })?;
    serde_json::from_value(tree).map_err(|source| ConversionError::Decode { conversion, source })
}

/// A record shape that has an adjacent older generation.
pub trait Downgrade: Serialize + DeserializeOwned {
    type Older: Serialize + DeserializeOwned;
    const KIND: ResourceKind;
    const FROM: SchemaGeneration;
    const TO: SchemaGeneration;

    fn conversion() -> Conversion {
        Conversion { kind: Self::KIND, from: Self::FROM, to: Self::TO }
    }

    fn downgrade(&self) -> Result<Self::Older, ConversionError> {
        bridge(Self::conversion(), self)
    }
}

impl Downgrade for v1beta2::Cluster {
    type Older = v1beta1::Cluster;
    const KIND: ResourceKind = ResourceKind::Cluster;
    const FROM: SchemaGeneration = SchemaGeneration::V1Beta2;
    const TO: SchemaGeneration = SchemaGeneration::V1Beta1;
}

impl Downgrade for v1beta2::Machine {
    type Older = v1beta1::Machine;
    const KIND: ResourceKind = ResourceKind::Machine;
    const FROM: SchemaGeneration = SchemaGeneration::V1Beta2;
    const TO: SchemaGeneration = SchemaGeneration::V1Beta1;
}

impl Downgrade for v1beta2::MachinePool {
    type Older = v1beta1::MachinePool;
    const KIND: ResourceKind = ResourceKind::MachinePool;
    const FROM: SchemaGeneration = SchemaGeneration::V1Beta2;
    const TO: SchemaGeneration = SchemaGeneration::V1Beta1;
}

/// Downgrade an optional record. Absent in, absent out.
pub fn downgrade<N: Downgrade>(record: Option<&N>) -> Result<Option<N::Older>, ConversionError> {
    record.map(N::downgrade).transpose()
}

pub fn convert_cluster_v1beta2_to_v1beta1(
    cluster: Option<&v1beta2::Cluster>,
) -> Result<Option<v1beta1::Cluster>, ConversionError> {
    downgrade(cluster)
}

pub fn convert_machine_v1beta2_to_v1beta1(
    machine: Option<&v1beta2::Machine>,
) -> Result<Option<v1beta1::Machine>, ConversionError> {
    downgrade(machine)
}

pub fn convert_machine_pool_v1beta2_to_v1beta1(
    machine_pool: Option<&v1beta2::MachinePool>,
) -> Result<Option<v1beta1::MachinePool>, ConversionError> {
    downgrade(machine_pool)
}

/// Any v1beta2 record the bridge can downgrade.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyNewer {
    Cluster(v1beta2::Cluster),
    Machine(v1beta2::Machine),
    MachinePool(v1beta2::MachinePool),
}

/// Any v1beta1 record the bridge can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyOlder {
    Cluster(v1beta1::Cluster),
    Machine(v1beta1::Machine),
    MachinePool(v1beta1::MachinePool),
}

/// Typed decoding ignores `apiVersion`/`kind`, so they are checked first.
fn check_type_meta(kind: ResourceKind, generation: SchemaGeneration, value: &Value) -> Result<(), serde_json::Error> {
    let expected = kind.api_version(generation);
    let api_version = value.get("apiVersion").and_then(Value::as_str).unwrap_or_default();
    let found = value.get("kind").and_then(Value::as_str).unwrap_or_default();
    if api_version != expected || found != kind.as_str() {
        return Err(serde::de::Error::custom(format!(
            "expected apiVersion {expected:?} kind {:?}, found apiVersion {api_version:?} kind {found:?}",
            kind.as_str()
        )));
    }
    Ok(())
}

fn decode_input<N: Downgrade>(value: &Value) -> Result<N, ConversionError> {
    let input = |source: serde_json::Error| ConversionError::Input { kind: N::KIND, generation: N::FROM, source };
    check_type_meta(N::KIND, N::FROM, value).map_err(input)?;
    N::deserialize(value).map_err(input)
}

impl AnyNewer {
    /// Decode an untyped v1beta2 record of the given kind.
    pub fn from_value(kind: ResourceKind, value: &Value) -> Result<Self, ConversionError> {
        Ok(match kind {
            ResourceKind::Cluster => AnyNewer::Cluster(decode_input(value)?),
            ResourceKind::Machine => AnyNewer::Machine(decode_input(value)?),
            ResourceKind::MachinePool => AnyNewer::MachinePool(decode_input(value)?),
        })
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            AnyNewer::Cluster(_) => ResourceKind::Cluster,
            AnyNewer::Machine(_) => ResourceKind::Machine,
            AnyNewer::MachinePool(_) => ResourceKind::MachinePool,
        }
    }

    pub fn conversion(&self) -> Conversion {
        match self {
            AnyNewer::Cluster(_) => v1beta2::Cluster::conversion(),
            AnyNewer::Machine(_) => v1beta2::Machine::conversion(),
            AnyNewer::MachinePool(_) => v1beta2::MachinePool::conversion(),
        }
    }

    pub fn downgrade(&self) -> Result<AnyOlder, ConversionError> {
        match self {
            AnyNewer::Cluster(c) => c.downgrade().map(AnyOlder::Cluster),
            AnyNewer::Machine(m) => m.downgrade().map(AnyOlder::Machine),
            AnyNewer::MachinePool(mp) => mp.downgrade().map(AnyOlder::MachinePool),
        }
    }
}

impl AnyOlder {
    pub fn kind(&self) -> ResourceKind {
        match self {
            AnyOlder::Cluster(_) => ResourceKind::Cluster,
            AnyOlder::Machine(_) => ResourceKind::Machine,
            AnyOlder::MachinePool(_) => ResourceKind::MachinePool,
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            AnyOlder::Cluster(c) => serde_json::to_value(c),
            AnyOlder::Machine(m) => serde_json::to_value(m),
            AnyOlder::MachinePool(mp) => serde_json::to_value(mp),
        }
    }
}

impl From<v1beta2::Cluster> for AnyNewer {
    fn from(v: v1beta2::Cluster) -> Self {
        AnyNewer::Cluster(v)
    }
}

impl From<v1beta2::Machine> for AnyNewer {
    fn from(v: v1beta2::Machine) -> Self {
        AnyNewer::Machine(v)
    }
}

impl From<v1beta2::MachinePool> for AnyNewer {
    fn from(v: v1beta2::MachinePool) -> Self {
        AnyNewer::MachinePool(v)
    }
}

/// Untyped entry point: read `value` as a v1beta2 record of `kind` and
/// return the encoded v1beta1 record. The tree's own `apiVersion` and `kind`
/// must name that record.
pub fn downgrade_value(kind: ResourceKind, value: &Value) -> Result<Value, ConversionError> {
    let newer = AnyNewer::from_value(kind, value)?;
    let conversion = newer.conversion();
    newer.downgrade()?.to_value().map_err(|source| ConversionError::Encode { conversion, source })
}
