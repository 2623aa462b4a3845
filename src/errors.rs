#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unknown storage backend: {0}")]
    UnknownBackend(String),

    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),

    #[error("Cannot serialize value: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Stored value for '{name}' has an unexpected shape: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}
