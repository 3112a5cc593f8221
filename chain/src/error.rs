use thiserror::Error;
use well3_clients::ClientError;
use well3_utils::Retryable;

#[derive(Debug, Error)]
pub enum TxError {
    #[error("no private key specified")]
    MissingKey,

    #[error("tx simulation failed: {0}")]
    Simulation(String),

    #[error("claim parameters missing from profile: {0}")]
    MissingParams(&'static str),

    #[error("unexpected view result for {method}: {value}")]
    BadView { method: String, value: String },

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl Retryable for TxError {
    fn is_retryable(&self) -> bool {
        match self {
            TxError::MissingKey | TxError::MissingParams(_) | TxError::BadView { .. } => false,
            TxError::Simulation(_) => true,
            TxError::Client(e) => e.is_retryable(),
        }
    }
}
