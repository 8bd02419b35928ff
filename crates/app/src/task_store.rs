//! Task store — the single serializing owner of the persisted schedule.
//!
//! The schedule file is the only shared mutable resource in the system.
//! Concurrent executors finishing in the same minute must not interleave
//! their load-modify-save cycles, so every mutation is routed through one
//! actor task that owns the repository and processes commands from an
//! mpsc channel, one at a time.

use tokio::sync::{mpsc, oneshot};

use domobridge_domain::error::{BridgeError, StoreError};
use domobridge_domain::task::ScheduledTask;

use crate::ports::TaskRepository;

enum Command {
    List(oneshot::Sender<Result<Vec<ScheduledTask>, BridgeError>>),
    Append(ScheduledTask, oneshot::Sender<Result<(), BridgeError>>),
    Remove(String, oneshot::Sender<Result<bool, BridgeError>>),
    Clear {
        keep_disabled: bool,
        reply: oneshot::Sender<Result<usize, BridgeError>>,
    },
}

/// Cloneable handle to the task-store actor.
///
/// All mutations observed through one handle are observed by every other:
/// the actor applies commands strictly in arrival order.
#[derive(Debug, Clone)]
pub struct TaskStoreHandle {
    tx: mpsc::Sender<Command>,
}

impl TaskStoreHandle {
    /// Spawn the owning actor over the given repository and return a handle.
    #[must_use]
    pub fn spawn<R>(repo: R) -> Self
    where
        R: TaskRepository + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::channel(32);
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                dispatch(&repo, command).await;
            }
        });
        Self { tx }
    }

    /// Current task list.
    ///
    /// # Errors
    ///
    /// Returns a store error when the schedule cannot be read or the
    /// actor is gone.
    pub async fn list(&self) -> Result<Vec<ScheduledTask>, BridgeError> {
        self.request(Command::List).await
    }

    /// Append a task and persist the new list.
    ///
    /// # Errors
    ///
    /// Returns a store error when the schedule cannot be written.
    pub async fn append(&self, task: ScheduledTask) -> Result<(), BridgeError> {
        self.request(|reply| Command::Append(task, reply)).await
    }

    /// Remove the task with the given id. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns a store error when the schedule cannot be written.
    pub async fn remove(&self, id: &str) -> Result<bool, BridgeError> {
        self.request(|reply| Command::Remove(id.to_string(), reply))
            .await
    }

    /// Remove tasks wholesale, optionally keeping disabled ones.
    /// Returns the number of removed tasks.
    ///
    /// # Errors
    ///
    /// Returns a store error when the schedule cannot be written.
    pub async fn clear(&self, keep_disabled: bool) -> Result<usize, BridgeError> {
        self.request(|reply| Command::Clear {
            keep_disabled,
            reply,
        })
        .await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, BridgeError>>) -> Command,
    ) -> Result<T, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| StoreError::Unavailable)?;
        rx.await.map_err(|_| StoreError::Unavailable)?
    }
}

async fn dispatch<R: TaskRepository>(repo: &R, command: Command) {
    match command {
        Command::List(reply) => {
            let _ = reply.send(repo.load().await);
        }
        Command::Append(task, reply) => {
            let result = async {
                let mut tasks = repo.load().await?;
                tasks.push(task);
                repo.save(&tasks).await
            }
            .await;
            let _ = reply.send(result);
        }
        Command::Remove(id, reply) => {
            let result = async {
                let mut tasks = repo.load().await?;
                let before = tasks.len();
                tasks.retain(|task| task.id != id);
                if tasks.len() == before {
                    return Ok(false);
                }
                repo.save(&tasks).await?;
                Ok(true)
            }
            .await;
            let _ = reply.send(result);
        }
        Command::Clear {
            keep_disabled,
            reply,
        } => {
            let result = async {
                let mut tasks = repo.load().await?;
                let before = tasks.len();
                if keep_disabled {
                    tasks.retain(|task| !task.enabled);
                } else {
                    tasks.clear();
                }
                let removed = before - tasks.len();
                repo.save(&tasks).await?;
                Ok(removed)
            }
            .await;
            let _ = reply.send(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domobridge_domain::task::{ScheduleDay, TaskAction};
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    /// In-memory repository mirroring the whole-list replacement contract.
    #[derive(Default)]
    struct InMemoryTaskRepo {
        tasks: Arc<Mutex<Vec<ScheduledTask>>>,
    }

    impl TaskRepository for InMemoryTaskRepo {
        fn load(&self) -> impl Future<Output = Result<Vec<ScheduledTask>, BridgeError>> + Send {
            let tasks = self.tasks.lock().unwrap().clone();
            async { Ok(tasks) }
        }

        fn save(
            &self,
            tasks: &[ScheduledTask],
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            *self.tasks.lock().unwrap() = tasks.to_vec();
            async { Ok(()) }
        }
    }

    fn task(id: &str, enabled: bool) -> ScheduledTask {
        ScheduledTask::builder()
            .id(id)
            .enabled(enabled)
            .time("12:00")
            .day(ScheduleDay::Once)
            .action(TaskAction::Script {
                script: "noop".to_string(),
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_append_and_list_tasks() {
        let handle = TaskStoreHandle::spawn(InMemoryTaskRepo::default());
        handle.append(task("t1", true)).await.unwrap();
        handle.append(task("t2", true)).await.unwrap();

        let tasks = handle.list().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "t1");
    }

    #[tokio::test]
    async fn should_remove_existing_task() {
        let handle = TaskStoreHandle::spawn(InMemoryTaskRepo::default());
        handle.append(task("t1", true)).await.unwrap();

        assert!(handle.remove("t1").await.unwrap());
        assert!(handle.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_report_missing_task_on_remove() {
        let handle = TaskStoreHandle::spawn(InMemoryTaskRepo::default());
        assert!(!handle.remove("ghost").await.unwrap());
    }

    #[tokio::test]
    async fn should_keep_disabled_tasks_on_clear() {
        let handle = TaskStoreHandle::spawn(InMemoryTaskRepo::default());
        handle.append(task("on1", true)).await.unwrap();
        handle.append(task("off1", false)).await.unwrap();
        handle.append(task("on2", true)).await.unwrap();

        let removed = handle.clear(true).await.unwrap();
        assert_eq!(removed, 2);

        let left = handle.list().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, "off1");
    }

    #[tokio::test]
    async fn should_not_lose_concurrent_removals() {
        // Two removals racing through the same handle: both must land,
        // which is the whole point of the serializing actor.
        let handle = TaskStoreHandle::spawn(InMemoryTaskRepo::default());
        handle.append(task("a", true)).await.unwrap();
        handle.append(task("b", true)).await.unwrap();

        let h1 = handle.clone();
        let h2 = handle.clone();
        let (r1, r2) = tokio::join!(h1.remove("a"), h2.remove("b"));
        assert!(r1.unwrap());
        assert!(r2.unwrap());
        assert!(handle.list().await.unwrap().is_empty());
    }
}
