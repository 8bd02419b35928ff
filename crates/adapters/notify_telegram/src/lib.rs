//! Telegram adapter for the failure notifier port.
//!
//! Delivery is best-effort by contract: an unconfigured notifier is a
//! no-op and a failed send is logged and dropped. The bridge must keep
//! running whether or not anyone hears about its failures.

use std::future::Future;
use std::time::Duration;

use domobridge_app::ports::FailureNotifier;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Bot credentials and destination chat.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// [`FailureNotifier`] posting messages through the Bot API.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    config: Option<TelegramConfig>,
    api_base: String,
}

impl TelegramNotifier {
    /// Build a notifier; `None` yields a permanent no-op.
    #[must_use]
    pub fn new(config: Option<TelegramConfig>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            config,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the notifier at a different Bot API endpoint.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn send(&self, config: &TelegramConfig, text: &str) {
        let url = format!("{}/bot{}/sendMessage", self.api_base, config.bot_token);
        let payload = serde_json::json!({
            "chat_id": config.chat_id,
            "text": text,
        });
        match self.client.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(status = %response.status(), "telegram rejected notification");
            }
            Err(err) => {
                tracing::warn!(error = %err, "telegram notification failed");
            }
        }
    }
}

impl FailureNotifier for TelegramNotifier {
    fn notify(&self, text: &str) -> impl Future<Output = ()> + Send {
        async move {
            if let Some(config) = &self.config {
                self.send(config, text).await;
            }
        }
    }
}
