//! Task service — schedule management for the voice/chat front-ends.
//!
//! Creation validates through the domain builder, every mutation goes
//! through the serializing store handle, and every mutation is audited.
//! Reads are served straight from the store.

use chrono::Duration;

use domobridge_domain::audit::AuditRecord;
use domobridge_domain::error::BridgeError;
use domobridge_domain::task::{ScheduleDay, ScheduledTask, TaskAction};
use domobridge_domain::time::local_now;

use crate::ports::AuditSink;
use crate::task_store::TaskStoreHandle;

/// Caller-facing schedule operations.
pub struct TaskService<A> {
    tasks: TaskStoreHandle,
    audit: A,
    /// Identity of the front-end session on whose behalf we act.
    user: String,
}

impl<A> TaskService<A>
where
    A: AuditSink,
{
    /// Create a service acting on behalf of `user`.
    pub fn new(tasks: TaskStoreHandle, audit: A, user: impl Into<String>) -> Self {
        Self {
            tasks,
            audit,
            user: user.into(),
        }
    }

    /// Schedule a device switch at `time` on the given days.
    ///
    /// The device name is stored as spoken; resolution happens when the
    /// task fires, against the catalog of that moment.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] when the task is malformed, or
    /// a store error when the schedule cannot be persisted.
    #[tracing::instrument(skip(self))]
    pub async fn add_device_task(
        &self,
        device: &str,
        state: &str,
        time: &str,
        days: Vec<ScheduleDay>,
    ) -> Result<ScheduledTask, BridgeError> {
        let task = ScheduledTask::builder()
            .description(format!("{state} {device} at {time}"))
            .time(time)
            .days(days)
            .action(TaskAction::Device {
                device: device.to_string(),
                state: state.to_string(),
            })
            .build();
        self.store("task_add", device, task).await
    }

    /// Schedule a one-shot device switch `minutes` from now.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] when the task is malformed, or
    /// a store error when the schedule cannot be persisted.
    #[tracing::instrument(skip(self))]
    pub async fn add_delayed_device_task(
        &self,
        device: &str,
        state: &str,
        minutes: i64,
    ) -> Result<ScheduledTask, BridgeError> {
        let time = (local_now() + Duration::minutes(minutes))
            .format("%H:%M")
            .to_string();
        let task = ScheduledTask::builder()
            .description(format!("{state} {device} in {minutes} min"))
            .time(&time)
            .day(ScheduleDay::Once)
            .action(TaskAction::Device {
                device: device.to_string(),
                state: state.to_string(),
            })
            .build();
        self.store("task_add", device, task).await
    }

    /// Schedule a hub script at `time` on the given days.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] when the task is malformed, or
    /// a store error when the schedule cannot be persisted.
    #[tracing::instrument(skip(self))]
    pub async fn add_script_task(
        &self,
        script: &str,
        time: &str,
        days: Vec<ScheduleDay>,
    ) -> Result<ScheduledTask, BridgeError> {
        let task = ScheduledTask::builder()
            .description(format!("run {script} at {time}"))
            .time(time)
            .days(days)
            .action(TaskAction::Script {
                script: script.to_string(),
            })
            .build();
        self.store("task_add", script, task).await
    }

    /// Remove the task with the given id. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns a store error when the schedule cannot be written.
    #[tracing::instrument(skip(self))]
    pub async fn remove_task(&self, id: &str) -> Result<bool, BridgeError> {
        match self.tasks.remove(id).await {
            Ok(existed) => {
                self.record(
                    "task_remove",
                    id,
                    true,
                    serde_json::json!({"existed": existed}),
                )
                .await;
                Ok(existed)
            }
            Err(err) => {
                self.record("task_remove", id, false, error_details(&err))
                    .await;
                Err(err)
            }
        }
    }

    /// Remove every enabled task, keeping disabled ones for later reuse.
    /// Returns the number of removed tasks.
    ///
    /// # Errors
    ///
    /// Returns a store error when the schedule cannot be written.
    #[tracing::instrument(skip(self))]
    pub async fn clear_tasks(&self) -> Result<usize, BridgeError> {
        match self.tasks.clear(true).await {
            Ok(removed) => {
                self.record(
                    "task_clear",
                    "schedule",
                    true,
                    serde_json::json!({"removed": removed}),
                )
                .await;
                Ok(removed)
            }
            Err(err) => {
                self.record("task_clear", "schedule", false, error_details(&err))
                    .await;
                Err(err)
            }
        }
    }

    /// The whole schedule, disabled tasks included.
    ///
    /// # Errors
    ///
    /// Returns a store error when the schedule cannot be read.
    pub async fn list_tasks(&self) -> Result<Vec<ScheduledTask>, BridgeError> {
        self.tasks.list().await
    }

    /// Only the tasks the scheduler will consider.
    ///
    /// # Errors
    ///
    /// Returns a store error when the schedule cannot be read.
    pub async fn active_tasks(&self) -> Result<Vec<ScheduledTask>, BridgeError> {
        let mut tasks = self.tasks.list().await?;
        tasks.retain(|task| task.enabled);
        Ok(tasks)
    }

    async fn store(
        &self,
        action: &str,
        target: &str,
        task: Result<ScheduledTask, BridgeError>,
    ) -> Result<ScheduledTask, BridgeError> {
        let task = match task {
            Ok(task) => task,
            Err(err) => {
                self.record(action, target, false, error_details(&err)).await;
                return Err(err);
            }
        };
        match self.tasks.append(task.clone()).await {
            Ok(()) => {
                self.record(
                    action,
                    target,
                    true,
                    serde_json::json!({
                        "task_id": task.id,
                        "time": task.time,
                        "kind": task.action.kind(),
                    }),
                )
                .await;
                Ok(task)
            }
            Err(err) => {
                self.record(action, target, false, error_details(&err)).await;
                Err(err)
            }
        }
    }

    async fn record(&self, action: &str, target: &str, success: bool, details: serde_json::Value) {
        let record = AuditRecord::new("bridge", action, target, success)
            .with_user(self.user.clone())
            .with_details(details);
        if let Err(err) = self.audit.record(record).await {
            tracing::warn!(error = %err, "failed to write audit record");
        }
    }
}

fn error_details(err: &impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({"error": err.to_string()})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TaskRepository;
    use domobridge_domain::error::ValidationError;
    use domobridge_domain::task::ALL_WEEK;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

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

    #[derive(Default, Clone)]
    struct CollectingAudit {
        records: Arc<Mutex<Vec<AuditRecord>>>,
    }

    impl AuditSink for CollectingAudit {
        fn record(
            &self,
            record: AuditRecord,
        ) -> impl Future<Output = Result<(), BridgeError>> + Send {
            self.records.lock().unwrap().push(record);
            async { Ok(()) }
        }
    }

    fn service() -> TaskService<CollectingAudit> {
        TaskService::new(
            TaskStoreHandle::spawn(InMemoryTaskRepo::default()),
            CollectingAudit::default(),
            "assistant",
        )
    }

    #[tokio::test]
    async fn should_add_device_task_and_audit_it() {
        let svc = service();
        let task = svc
            .add_device_task("rest room", "включи", "17:15", vec![ScheduleDay::Once])
            .await
            .unwrap();

        assert!(task.id.starts_with("task_"));
        assert!(task.is_once());
        assert_eq!(svc.list_tasks().await.unwrap(), vec![task.clone()]);

        let records = svc.audit.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].success);
        assert_eq!(records[0].action, "task_add");
        assert_eq!(records[0].target, "rest room");
        assert_eq!(records[0].details["task_id"], task.id);
    }

    #[tokio::test]
    async fn should_add_delayed_one_shot_task() {
        let svc = service();
        let task = svc
            .add_delayed_device_task("rest room", "off", 10)
            .await
            .unwrap();

        assert!(task.is_once());
        // %H:%M of some minute within the next day, must parse back.
        assert!(chrono::NaiveTime::parse_from_str(&task.time, "%H:%M").is_ok());
    }

    #[tokio::test]
    async fn should_add_weekly_script_task() {
        let svc = service();
        let task = svc
            .add_script_task("good_night", "23:00", ALL_WEEK.to_vec())
            .await
            .unwrap();

        assert!(!task.is_once());
        assert_eq!(task.days.len(), 7);
        assert_eq!(task.action, TaskAction::Script {
            script: "good_night".to_string()
        });
    }

    #[tokio::test]
    async fn should_reject_and_audit_malformed_time() {
        let svc = service();
        let err = svc
            .add_device_task("rest room", "on", "25:99", vec![ScheduleDay::Once])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Validation(ValidationError::InvalidTime(_))
        ));
        assert!(svc.list_tasks().await.unwrap().is_empty());

        let records = svc.audit.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].success);
    }

    #[tokio::test]
    async fn should_remove_task_by_id() {
        let svc = service();
        let task = svc
            .add_script_task("noop", "12:00", vec![ScheduleDay::Once])
            .await
            .unwrap();

        assert!(svc.remove_task(&task.id).await.unwrap());
        assert!(!svc.remove_task(&task.id).await.unwrap());
        assert!(svc.list_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_keep_disabled_tasks_on_clear() {
        let svc = service();
        svc.add_script_task("a", "12:00", vec![ScheduleDay::Once])
            .await
            .unwrap();
        let kept = ScheduledTask::builder()
            .id("kept")
            .enabled(false)
            .time("12:00")
            .day(ScheduleDay::Once)
            .action(TaskAction::Script {
                script: "b".to_string(),
            })
            .build()
            .unwrap();
        svc.tasks.append(kept).await.unwrap();

        assert_eq!(svc.clear_tasks().await.unwrap(), 1);

        let left = svc.list_tasks().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, "kept");
    }

    #[tokio::test]
    async fn should_filter_active_tasks() {
        let svc = service();
        svc.add_script_task("a", "12:00", vec![ScheduleDay::Mon])
            .await
            .unwrap();
        let disabled = ScheduledTask::builder()
            .id("sleeping")
            .enabled(false)
            .time("12:00")
            .day(ScheduleDay::Mon)
            .action(TaskAction::Script {
                script: "b".to_string(),
            })
            .build()
            .unwrap();
        svc.tasks.append(disabled).await.unwrap();

        let active = svc.active_tasks().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_ne!(active[0].id, "sleeping");
    }
}
