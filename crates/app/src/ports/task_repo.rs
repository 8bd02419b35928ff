//! Task repository port — persistence for the schedule.

use std::future::Future;

use domobridge_domain::error::BridgeError;
use domobridge_domain::task::ScheduledTask;

/// Durable storage for the full task list.
///
/// The contract is whole-list replacement: tasks are never partially
/// updated. Mutations (`append`, `remove`) are expressed by the caller as
/// load-modify-save sequences; this layer does not coordinate concurrent
/// callers — that is the job of the task-store actor, the single owner
/// that drives this repository.
pub trait TaskRepository {
    /// Load all tasks. A missing backing store is empty, not an error.
    fn load(&self) -> impl Future<Output = Result<Vec<ScheduledTask>, BridgeError>> + Send;

    /// Persist the full replacement list.
    fn save(
        &self,
        tasks: &[ScheduledTask],
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: TaskRepository + Send + Sync> TaskRepository for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<Vec<ScheduledTask>, BridgeError>> + Send {
        (**self).load()
    }

    fn save(
        &self,
        tasks: &[ScheduledTask],
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).save(tasks)
    }
}
