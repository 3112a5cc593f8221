//! Durable log of multi-line account errors.
//!
//! The console only gets the first line of an account error; anything
//! longer (gateway tracebacks, nested causes) is appended here in full.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use well3_types::Timestamp;

use crate::RunnerError;

/// Cheap to clone; clones append to the same file one entry at a time.
#[derive(Clone)]
pub struct ErrorLog {
    path: PathBuf,
    write: Arc<Mutex<()>>,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry: `<utc time> | <label>) Process account error: <message>`.
    pub async fn append(&self, label: &str, message: &str) -> Result<(), RunnerError> {
        let entry = format!(
            "{} | {label}) Process account error: {message}\n",
            Timestamp::now()
        );
        let _guard = self.write.lock().await;
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| RunnerError::io(dir, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| RunnerError::io(&self.path, e))?;
        file.write_all(entry.as_bytes())
            .await
            .map_err(|e| RunnerError::io(&self.path, e))?;
        file.flush().await.map_err(|e| RunnerError::io(&self.path, e))
    }
}
