use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("snapshot is corrupted: {0}")]
    Corruption(String),
}
