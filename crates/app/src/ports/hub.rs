//! Hub gateway port — the get/set/trigger call contract of the hub.

use std::future::Future;

use domobridge_domain::error::BridgeError;

/// Outbound calls to the home-automation hub.
///
/// Every call is bounded by the adapter's request timeout. Success is
/// classified strictly by the hub's acknowledgement; any other outcome
/// surfaces as [`BridgeError::Hub`].
pub trait HubGateway {
    /// Read `object.property` and return its scalar value as text.
    fn get_property(
        &self,
        object: &str,
        property: &str,
    ) -> impl Future<Output = Result<String, BridgeError>> + Send;

    /// Set `object.property` to `value`.
    fn set_property(
        &self,
        object: &str,
        property: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Trigger a hub script by name.
    fn run_script(&self, name: &str) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Speak `text` through the given media object.
    fn say(
        &self,
        object: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: HubGateway + Send + Sync> HubGateway for std::sync::Arc<T> {
    fn get_property(
        &self,
        object: &str,
        property: &str,
    ) -> impl Future<Output = Result<String, BridgeError>> + Send {
        (**self).get_property(object, property)
    }

    fn set_property(
        &self,
        object: &str,
        property: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).set_property(object, property, value)
    }

    fn run_script(&self, name: &str) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).run_script(name)
    }

    fn say(
        &self,
        object: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).say(object, text)
    }
}
