//! Schedule persistence as one pretty-printed JSON file.

use std::future::Future;
use std::path::PathBuf;

use domobridge_app::ports::TaskRepository;
use domobridge_domain::error::{BridgeError, StoreError};
use domobridge_domain::task::ScheduledTask;

/// [`TaskRepository`] over a single JSON file.
///
/// The file holds the full task list; every save replaces it wholesale.
/// A missing file is an empty schedule. Concurrency is not handled here;
/// the task-store actor is the single caller.
#[derive(Debug, Clone)]
pub struct JsonTaskStore {
    path: PathBuf,
}

impl JsonTaskStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<Vec<ScheduledTask>, BridgeError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::from(err).into()),
        };
        Ok(serde_json::from_str(&text).map_err(StoreError::from)?)
    }

    fn write(&self, tasks: &[ScheduledTask]) -> Result<(), BridgeError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::from)?;
        }
        let text = serde_json::to_string_pretty(tasks).map_err(StoreError::from)?;
        std::fs::write(&self.path, text).map_err(StoreError::from)?;
        Ok(())
    }
}

impl TaskRepository for JsonTaskStore {
    fn load(&self) -> impl Future<Output = Result<Vec<ScheduledTask>, BridgeError>> + Send {
        let result = self.read();
        async move { result }
    }

    fn save(&self, tasks: &[ScheduledTask]) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.write(tasks);
        async move { result }
    }
}
