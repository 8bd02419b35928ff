//! Scheduled tasks — time-triggered device/script actions.
//!
//! A task fires when the local wall clock reaches its `HH:MM` time on one
//! of its days. The `"once"` day marks a single-shot task that is consumed
//! by its first execution attempt, whatever the outcome.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, ValidationError};

/// One slot of a task's `days` set: a weekday or the one-shot marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
    /// Fire on the next matching minute, then retire the task.
    Once,
}

impl From<Weekday> for ScheduleDay {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Mon => Self::Mon,
            Weekday::Tue => Self::Tue,
            Weekday::Wed => Self::Wed,
            Weekday::Thu => Self::Thu,
            Weekday::Fri => Self::Fri,
            Weekday::Sat => Self::Sat,
            Weekday::Sun => Self::Sun,
        }
    }
}

/// Every weekday, the "daily" repeat set.
pub const ALL_WEEK: [ScheduleDay; 7] = [
    ScheduleDay::Mon,
    ScheduleDay::Tue,
    ScheduleDay::Wed,
    ScheduleDay::Thu,
    ScheduleDay::Fri,
    ScheduleDay::Sat,
    ScheduleDay::Sun,
];

/// What a task does when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TaskAction {
    /// Switch a device resolved through the alias table.
    Device {
        /// Free-text device name, normalized at execution time.
        device: String,
        /// Desired state as spoken ("включи", "on", "1" → on, else off).
        state: String,
    },
    /// Trigger a hub script by name, no resolution.
    Script { script: String },
}

impl TaskAction {
    /// The human-facing target name (device alias or script name).
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Device { device, .. } => device,
            Self::Script { script } => script,
        }
    }

    /// Audit/action kind tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Device { .. } => "device",
            Self::Script { .. } => "script",
        }
    }
}

/// Map a spoken switch state to the hub wire value.
///
/// Anything not recognized as "on" means "off", matching the original
/// scheduler's permissive reading of stored task states.
#[must_use]
pub fn relay_value(state: &str) -> &'static str {
    match state.trim().to_lowercase().as_str() {
        "включи" | "on" | "1" => "1",
        _ => "0",
    }
}

/// One automation entry in the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Unique, generated at creation, immutable.
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
    /// Local wall-clock `HH:MM`.
    pub time: String,
    pub days: Vec<ScheduleDay>,
    pub action: TaskAction,
}

fn default_enabled() -> bool {
    true
}

impl ScheduledTask {
    /// Create a builder for constructing a [`ScheduledTask`].
    #[must_use]
    pub fn builder() -> ScheduledTaskBuilder {
        ScheduledTaskBuilder::default()
    }

    /// Whether this is a single-shot task.
    ///
    /// `"once"` wins over any weekday also present in the set.
    #[must_use]
    pub fn is_once(&self) -> bool {
        self.days.contains(&ScheduleDay::Once)
    }

    /// Whether the task fires at the given minute on the given day.
    #[must_use]
    pub fn is_due(&self, minute: &str, day: ScheduleDay) -> bool {
        self.time == minute && (self.days.contains(&day) || self.is_once())
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] when:
    /// - `time` is not a `HH:MM` string ([`ValidationError::InvalidTime`])
    /// - `days` is empty ([`ValidationError::NoDays`])
    /// - the action target is empty ([`ValidationError::EmptyTarget`])
    pub fn validate(&self) -> Result<(), BridgeError> {
        if NaiveTime::parse_from_str(&self.time, "%H:%M").is_err() {
            return Err(ValidationError::InvalidTime(self.time.clone()).into());
        }
        if self.days.is_empty() {
            return Err(ValidationError::NoDays.into());
        }
        if self.action.target().trim().is_empty() {
            return Err(ValidationError::EmptyTarget.into());
        }
        Ok(())
    }

    /// Derive a task id from the current local time and the target name.
    #[must_use]
    pub fn generate_id(target: &str) -> String {
        format!(
            "task_{}_{}",
            crate::time::local_now().format("%Y%m%d_%H%M%S"),
            target.trim().replace(' ', "_")
        )
    }
}

/// Step-by-step builder for [`ScheduledTask`].
#[derive(Debug, Default)]
pub struct ScheduledTaskBuilder {
    id: Option<String>,
    enabled: Option<bool>,
    description: Option<String>,
    time: Option<String>,
    days: Vec<ScheduleDay>,
    action: Option<TaskAction>,
}

impl ScheduledTaskBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    #[must_use]
    pub fn day(mut self, day: ScheduleDay) -> Self {
        self.days.push(day);
        self
    }

    #[must_use]
    pub fn days(mut self, days: impl IntoIterator<Item = ScheduleDay>) -> Self {
        self.days.extend(days);
        self
    }

    #[must_use]
    pub fn action(mut self, action: TaskAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Consume the builder, validate, and return a [`ScheduledTask`].
    ///
    /// A missing id is generated from the target name; a missing
    /// description falls back to the id.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] if required fields are missing
    /// or invariants fail.
    pub fn build(self) -> Result<ScheduledTask, BridgeError> {
        let Some(action) = self.action else {
            return Err(ValidationError::NoAction.into());
        };
        let id = self
            .id
            .unwrap_or_else(|| ScheduledTask::generate_id(action.target()));
        let task = ScheduledTask {
            description: self.description.unwrap_or_else(|| id.clone()),
            id,
            enabled: self.enabled.unwrap_or(true),
            time: self.time.unwrap_or_default(),
            days: self.days,
            action,
        };
        task.validate()?;
        Ok(task)
    }
}
