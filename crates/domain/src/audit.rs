//! Audit records — one structured record per performed action.
//!
//! Every outcome, success or failure, is recorded to an append-only sink
//! with enough context to reconstruct what the bridge did and on whose
//! behalf.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// One append-only audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: Timestamp,
    /// Which subsystem acted ("scheduler", "bridge", …).
    pub source: String,
    /// Who asked for the action; "system" for scheduler-initiated work.
    pub user: String,
    /// Operation name ("device", "script", "add_task", …).
    pub action: String,
    /// Normalized target the operation acted on.
    pub target: String,
    pub success: bool,
    /// Free-form context: task id, resulting state, error detail.
    #[serde(default)]
    pub details: serde_json::Value,
}

impl AuditRecord {
    /// Create a record stamped with the current time, attributed to the
    /// `system` user and with empty details.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        action: impl Into<String>,
        target: impl Into<String>,
        success: bool,
    ) -> Self {
        Self {
            timestamp: crate::time::now(),
            source: source.into(),
            user: "system".to_string(),
            action: action.into(),
            target: target.into(),
            success,
            details: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
