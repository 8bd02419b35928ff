//! Audit sink port — append-only action records.

use std::future::Future;

use domobridge_domain::audit::AuditRecord;
use domobridge_domain::error::BridgeError;

/// Appends one record per performed action.
///
/// Recording is mandatory but never blocking for the caller's outcome:
/// use-cases log a warning on sink errors and carry on.
pub trait AuditSink {
    /// Append a record to the sink.
    fn record(&self, record: AuditRecord) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: AuditSink + Send + Sync> AuditSink for std::sync::Arc<T> {
    fn record(&self, record: AuditRecord) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).record(record)
    }
}
