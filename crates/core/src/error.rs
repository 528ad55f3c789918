use thiserror::Error;

use crate::{Conversion, ResourceKind, SchemaGeneration};

/// Failure of one version-bridge call. Nothing is produced alongside it.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// A record could not be written to the intermediate tree.
    /// Well-formed in-memory records never hit this; treat it as a defect.
    #[error("{conversion}: encoding record: {source}")]
    Encode {
        conversion: Conversion,
        #[source]
        source: serde_json::Error,
    },
    /// The intermediate tree could not populate the target shape, typically
    /// because a field the older generation requires is absent.
    #[error("{conversion}: target generation rejected record: {source}")]
    Decode {
        conversion: Conversion,
        #[source]
        source: serde_json::Error,
    },
    /// An untyped input was not a valid record of its declared generation.
    #[error("input is not a valid {kind} {generation}: {source}")]
    Input {
        kind: ResourceKind,
        generation: SchemaGeneration,
        #[source]
        source: serde_json::Error,
    },
}

impl ConversionError {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ConversionError::Encode { conversion, .. } | ConversionError::Decode { conversion, .. } => conversion.kind,
            ConversionError::Input { kind, .. } => *kind,
        }
    }

    /// The conversion that failed, when the failure happened inside the bridge.
    pub fn conversion(&self) -> Option<Conversion> {
        match self {
            ConversionError::Encode { conversion, .. } | ConversionError::Decode { conversion, .. } => Some(*conversion),
            ConversionError::Input { .. } => None,
        }
    }

    pub fn is_encode(&self) -> bool {
        matches!(self, ConversionError::Encode { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, ConversionError::Decode { .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown resource kind: {0}")]
    UnknownKind(String),
    #[error("unknown schema generation: {0}")]
    UnknownGeneration(String),
    #[error("invalid gvk key: {0} (expect v1/Kind or group/v1/Kind)")]
    InvalidGvkKey(String),
}
