use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("no kind {kind} registered for {api_version}")]
    NotRegistered { api_version: String, kind: String },
    #[error("payload has no apiVersion/kind")]
    MissingTypeMeta,
    #[error("decoding {gvk}: {source}")]
    Decode {
        gvk: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encoding {gvk}: {source}")]
    Encode {
        gvk: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemeError {
    pub fn is_not_registered(&self) -> bool {
        matches!(self, SchemeError::NotRegistered { .. })
    }
}
