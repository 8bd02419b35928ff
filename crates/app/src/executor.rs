//! Task executor — runs one scheduled task and applies its lifecycle.
//!
//! Each due task runs on its own spawned tokio task, concurrently with
//! any other. Nothing here propagates: every outcome is audited, failures
//! are notified, and one-shot tasks are retired after the attempt whatever
//! its outcome — a one-shot task never retries.

use domobridge_domain::alias::DeviceType;
use domobridge_domain::audit::AuditRecord;
use domobridge_domain::error::BridgeError;
use domobridge_domain::query::normalize;
use domobridge_domain::task::{ScheduledTask, TaskAction, relay_value};

use crate::ports::{AliasCatalog, AuditSink, FailureNotifier, HubGateway};
use crate::resolver::DeviceResolver;
use crate::task_store::TaskStoreHandle;

/// Categories searched when a scheduled device task resolves its target.
pub const DEVICE_TASK_CATEGORIES: &[&str] = &["lighting", "devices"];

/// Executes scheduled tasks against the hub.
pub struct TaskRunner<C, H, A, N> {
    resolver: DeviceResolver<C>,
    hub: H,
    tasks: TaskStoreHandle,
    audit: A,
    notifier: N,
}

impl<C, H, A, N> TaskRunner<C, H, A, N>
where
    C: AliasCatalog + Send + Sync,
    H: HubGateway + Send + Sync,
    A: AuditSink + Send + Sync,
    N: FailureNotifier + Send + Sync,
{
    /// Create a runner over the given ports.
    pub fn new(
        resolver: DeviceResolver<C>,
        hub: H,
        tasks: TaskStoreHandle,
        audit: A,
        notifier: N,
    ) -> Self {
        Self {
            resolver,
            hub,
            tasks,
            audit,
            notifier,
        }
    }

    /// Execute one task end to end.
    ///
    /// Never returns an error: failures become an audit record plus a
    /// notification, and a failing task must not disturb the scheduler
    /// loop or other in-flight tasks.
    pub async fn execute(&self, task: ScheduledTask) {
        let result = self.run(&task).await;
        let target = normalize(task.action.target());

        match &result {
            Ok(details) => {
                tracing::info!(task_id = %task.id, %target, "task executed");
                self.record(&task, &target, true, details.clone()).await;
            }
            Err(err) => {
                tracing::error!(task_id = %task.id, %target, error = %err, "task failed");
                self.record(
                    &task,
                    &target,
                    false,
                    serde_json::json!({"error": err.to_string()}),
                )
                .await;
                self.notifier
                    .notify(&format!("task '{}': {err}", task.description))
                    .await;
            }
        }

        // Consumed by the attempt, success or not.
        if task.is_once() {
            match self.tasks.remove(&task.id).await {
                Ok(_) => tracing::info!(task_id = %task.id, "one-shot task removed"),
                Err(err) => {
                    tracing::warn!(task_id = %task.id, error = %err, "failed to remove one-shot task");
                }
            }
        }
    }

    async fn run(&self, task: &ScheduledTask) -> Result<serde_json::Value, BridgeError> {
        match &task.action {
            TaskAction::Device { device, state } => {
                let name = normalize(device);
                let entry = self
                    .resolver
                    .resolve(&name, Some(DEVICE_TASK_CATEGORIES), Some(DeviceType::Relay))
                    .await?;
                let value = relay_value(state);
                self.hub
                    .set_property(&entry.object, &entry.property, value)
                    .await?;
                Ok(serde_json::json!({
                    "state": if value == "1" { "on" } else { "off" },
                }))
            }
            TaskAction::Script { script } => {
                self.hub.run_script(script).await?;
                Ok(serde_json::json!({}))
            }
        }
    }

    async fn record(
        &self,
        task: &ScheduledTask,
        target: &str,
        success: bool,
        mut details: serde_json::Value,
    ) {
        if let Some(map) = details.as_object_mut() {
            map.insert("task_id".to_string(), task.id.clone().into());
        }
        let record = AuditRecord::new("scheduler", task.action.kind(), target, success)
            .with_details(details);
        if let Err(err) = self.audit.record(record).await {
            tracing::warn!(error = %err, "failed to write audit record");
        }
    }
}
