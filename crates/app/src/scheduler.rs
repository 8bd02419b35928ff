//! Scheduler loop — wall-clock dispatch of due tasks.
//!
//! One long-lived loop polls every ~30 seconds, matches enabled tasks
//! against the current local `HH:MM` and weekday, and fires each due task
//! on its own spawned execution, never waiting for it. A minute already
//! processed is skipped, so sub-minute polling cannot double-fire a task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;

use domobridge_domain::audit::AuditRecord;
use domobridge_domain::task::ScheduleDay;
use domobridge_domain::time::{local_now, minute_of};

use crate::executor::TaskRunner;
use crate::ports::{AliasCatalog, AuditSink, FailureNotifier, HubGateway};
use crate::task_store::TaskStoreHandle;

/// Default pause between schedule scans.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// The dispatching loop. Runs until the process shuts down.
pub struct SchedulerLoop<C, H, A, N> {
    tasks: TaskStoreHandle,
    runner: Arc<TaskRunner<C, H, A, N>>,
    audit: A,
    poll_interval: Duration,
    last_tick: Option<String>,
}

impl<C, H, A, N> SchedulerLoop<C, H, A, N>
where
    C: AliasCatalog + Send + Sync + 'static,
    H: HubGateway + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
    N: FailureNotifier + Send + Sync + 'static,
{
    /// Create a loop with the default poll interval.
    pub fn new(tasks: TaskStoreHandle, runner: Arc<TaskRunner<C, H, A, N>>, audit: A) -> Self {
        Self {
            tasks,
            runner,
            audit,
            poll_interval: DEFAULT_POLL_INTERVAL,
            last_tick: None,
        }
    }

    /// Override the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Drive the loop forever.
    ///
    /// Scan errors are logged and audited; the loop always reaches its
    /// next tick.
    pub async fn run(mut self) {
        tracing::info!(interval = ?self.poll_interval, "scheduler loop started");
        loop {
            let now = local_now();
            self.tick(&minute_of(&now), ScheduleDay::from(now.weekday()))
                .await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Process one poll: dispatch every enabled task due at `minute` on
    /// `day`, unless this minute was already processed.
    ///
    /// Returns the ids of the launched tasks. Executions are spawned and
    /// not awaited; two tasks due in the same minute race independently.
    pub async fn tick(&mut self, minute: &str, day: ScheduleDay) -> Vec<String> {
        if self.last_tick.as_deref() == Some(minute) {
            return Vec::new();
        }

        let mut launched = Vec::new();
        match self.tasks.list().await {
            Ok(tasks) => {
                for task in tasks {
                    if !task.enabled || !task.is_due(minute, day) {
                        continue;
                    }
                    tracing::info!(task_id = %task.id, description = %task.description, "launching task");
                    launched.push(task.id.clone());
                    let runner = Arc::clone(&self.runner);
                    tokio::spawn(async move {
                        runner.execute(task).await;
                    });
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "schedule scan failed");
                let record = AuditRecord::new("scheduler", "scheduler_error", "schedule", false)
                    .with_details(serde_json::json!({"error": err.to_string()}));
                if let Err(err) = self.audit.record(record).await {
                    tracing::warn!(error = %err, "failed to write audit record");
                }
            }
        }

        self.last_tick = Some(minute.to_string());
        launched
    }
}
