//! Append-only audit log, one JSON object per line.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;

use domobridge_app::ports::AuditSink;
use domobridge_domain::audit::AuditRecord;
use domobridge_domain::error::{BridgeError, StoreError};

/// [`AuditSink`] appending JSONL records to a file.
///
/// Rotation and retention are left to the host system.
#[derive(Debug, Clone)]
pub struct JsonlAuditLog {
    path: PathBuf,
}

impl JsonlAuditLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, record: &AuditRecord) -> Result<(), BridgeError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::from)?;
        }
        let line = serde_json::to_string(record).map_err(StoreError::from)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(StoreError::from)?;
        writeln!(file, "{line}").map_err(StoreError::from)?;
        Ok(())
    }
}

impl AuditSink for JsonlAuditLog {
    fn record(&self, record: AuditRecord) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.append(&record);
        async move { result }
    }
}
