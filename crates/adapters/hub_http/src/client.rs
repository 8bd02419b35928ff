//! Client for the hub's plain HTTP API.
//!
//! Endpoints:
//! - `GET  /api/data/{object}.{property}` — read a property
//! - `POST /api/data/{object}.{property}` — write `{"data": value}`
//! - `GET  /api/script/{name}` — trigger a script
//! - `GET  /api/method/{object}.say?text=…` — speak through a device
//!
//! Success is HTTP 200, nothing more: the hub does not report execution
//! results in the body. Every request is bounded by one fixed timeout.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use domobridge_app::ports::HubGateway;
use domobridge_domain::error::{BridgeError, HubError};

/// [`HubGateway`] over the hub's HTTP API.
#[derive(Debug, Clone)]
pub struct HubHttpClient {
    base_url: String,
    client: reqwest::Client,
}

impl HubHttpClient {
    /// Build a client for the hub at `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Hub`] when the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| HubError::Transport(err.to_string()))?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { base_url, client })
    }

    fn data_url(&self, object: &str, property: &str) -> String {
        format!("{}/api/data/{object}.{property}", self.base_url)
    }

    fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response, BridgeError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(HubError::Status(status.as_u16()).into())
        }
    }
}

fn transport_error(err: reqwest::Error) -> BridgeError {
    if err.is_timeout() {
        HubError::Timeout.into()
    } else {
        HubError::Transport(err.to_string()).into()
    }
}

/// Extract the property value from a hub response body.
///
/// The hub answers either `{"data": <value>}` or the bare value as text.
fn parse_value(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str(body) {
        match map.get("data") {
            Some(Value::String(text)) => return text.clone(),
            Some(Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }
    body.trim().to_string()
}

impl HubGateway for HubHttpClient {
    fn get_property(
        &self,
        object: &str,
        property: &str,
    ) -> impl Future<Output = Result<String, BridgeError>> + Send {
        let url = self.data_url(object, property);
        async move {
            tracing::debug!(%url, "hub get");
            let response = self.client.get(&url).send().await.map_err(transport_error)?;
            let response = Self::expect_ok(response)?;
            let body = response.text().await.map_err(transport_error)?;
            Ok(parse_value(&body))
        }
    }

    fn set_property(
        &self,
        object: &str,
        property: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let url = self.data_url(object, property);
        let payload = serde_json::json!({"data": value});
        async move {
            tracing::debug!(%url, "hub set");
            let response = self
                .client
                .post(&url)
                .json(&payload)
                .send()
                .await
                .map_err(transport_error)?;
            Self::expect_ok(response)?;
            Ok(())
        }
    }

    fn run_script(&self, name: &str) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let url = format!("{}/api/script/{name}", self.base_url);
        async move {
            tracing::debug!(%url, "hub script");
            let response = self.client.get(&url).send().await.map_err(transport_error)?;
            Self::expect_ok(response)?;
            Ok(())
        }
    }

    fn say(
        &self,
        object: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let url = format!("{}/api/method/{object}.say", self.base_url);
        let text = text.to_string();
        async move {
            tracing::debug!(%url, "hub say");
            let response = self
                .client
                .get(&url)
                .query(&[("text", text.as_str())])
                .send()
                .await
                .map_err(transport_error)?;
            Self::expect_ok(response)?;
            Ok(())
        }
    }
}
