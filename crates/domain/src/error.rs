//! Common error types used across the workspace.
//!
//! Each concern defines its own typed error and converts into
//! [`BridgeError`] via `#[from]`. Nothing here is fatal to the process:
//! callers either surface the error as a structured result or degrade
//! to an empty outcome.

use std::fmt;

/// Workspace-level error, one variant per concern.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A domain invariant was violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An alias could not be resolved to a device.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The hub rejected or failed a call.
    #[error(transparent)]
    Hub(#[from] HubError),

    /// The catalog, schedule, or audit log could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Domain invariant violations.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Task time is not a `HH:MM` wall-clock string.
    #[error("task time must be HH:MM, got '{0}'")]
    InvalidTime(String),

    /// Task has an empty `days` set.
    #[error("task must have at least one schedule day")]
    NoDays,

    /// Task has no action to perform.
    #[error("task must have an action")]
    NoAction,

    /// Device or script name is empty.
    #[error("action target must not be empty")]
    EmptyTarget,

    /// A switch command could not be mapped to on/off.
    #[error("unrecognized switch command '{0}'")]
    UnknownCommand(String),
}

/// An alias did not resolve to any device.
///
/// Carries the caller-usable set of alternative alias names, filtered to
/// the category/type restriction of the failed lookup, so front-ends can
/// present a correction prompt.
#[derive(Debug, thiserror::Error)]
pub struct NotFoundError {
    /// The normalized alias that was looked up.
    pub alias: String,
    /// Known alias names matching the same category/type restriction.
    pub alternatives: Vec<String>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alternatives.is_empty() {
            write!(f, "no device matches '{}'", self.alias)
        } else {
            write!(
                f,
                "no device matches '{}'; known: {}",
                self.alias,
                self.alternatives.join(", ")
            )
        }
    }
}

/// Failures of the external hub call contract.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The hub answered with a non-success HTTP status.
    #[error("hub returned status {0}")]
    Status(u16),

    /// The hub did not answer within the request timeout.
    #[error("hub request timed out")]
    Timeout,

    /// The request could not be performed at all.
    #[error("hub transport error: {0}")]
    Transport(String),
}

/// Failures of the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File could not be read or written.
    #[error("store IO error")]
    Io(#[from] std::io::Error),

    /// Stored JSON could not be (de)serialized.
    #[error("store serialization error")]
    Json(#[from] serde_json::Error),

    /// The task-store worker is gone (process shutting down).
    #[error("task store worker unavailable")]
    Unavailable,
}
