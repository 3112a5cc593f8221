use std::path::PathBuf;

use thiserror::Error;
use well3_chain::TxError;
use well3_clients::ClientError;
use well3_store::StoreError;
use well3_types::TypesError;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("No invite codes left")]
    NoInvitesLeft,

    #[error("Twitter count does not match wallets count ({socials} vs {wallets})")]
    AccountsMismatch { wallets: usize, socials: usize },

    #[error("invalid wallet on line {line}: {source}")]
    InvalidWallet {
        line: usize,
        #[source]
        source: TypesError,
    },

    #[error("panicked: {0}")]
    Panicked(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Tx(#[from] TxError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report error: {0}")]
    Report(#[from] csv::Error),
}

impl RunnerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RunnerError::Io {
            path: path.into(),
            source,
        }
    }
}
