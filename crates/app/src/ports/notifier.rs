//! Failure notifier port — best-effort outbound alerts.

use std::future::Future;

/// Sends one outbound message per failure.
///
/// Strictly best-effort: delivery failures are swallowed by the adapter
/// (with a warning), which is why the signature has no error channel.
pub trait FailureNotifier {
    /// Deliver a failure message.
    fn notify(&self, text: &str) -> impl Future<Output = ()> + Send;
}

impl<T: FailureNotifier + Send + Sync> FailureNotifier for std::sync::Arc<T> {
    fn notify(&self, text: &str) -> impl Future<Output = ()> + Send {
        (**self).notify(text)
    }
}

/// No-op notifier for deployments without an alert channel.
impl FailureNotifier for () {
    fn notify(&self, _text: &str) -> impl Future<Output = ()> + Send {
        async {}
    }
}
