//! # domobridged — bridge daemon
//!
//! Composition root that wires the adapters together and runs the
//! scheduler loop.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Construct the hub client, file stores and notifier (adapters)
//! - Spawn the task-store actor owning the schedule file
//! - Construct the task runner and drive the scheduler loop
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use domobridge_adapter_hub_http::HubHttpClient;
use domobridge_adapter_notify_telegram::{TelegramConfig, TelegramNotifier};
use domobridge_adapter_store_json::{JsonAliasCatalog, JsonTaskStore, JsonlAuditLog};
use domobridge_app::executor::TaskRunner;
use domobridge_app::resolver::DeviceResolver;
use domobridge_app::scheduler::SchedulerLoop;
use domobridge_app::task_store::TaskStoreHandle;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Adapters
    let hub = Arc::new(HubHttpClient::new(&config.hub.url, config.hub_timeout())?);
    let catalog = Arc::new(JsonAliasCatalog::new(&config.store.aliases));
    let audit = Arc::new(JsonlAuditLog::new(&config.store.audit_log));
    let notifier = Arc::new(TelegramNotifier::new(config.telegram_credentials().map(
        |(bot_token, chat_id)| TelegramConfig {
            bot_token,
            chat_id,
        },
    )));

    // Schedule owner
    let tasks = TaskStoreHandle::spawn(JsonTaskStore::new(&config.store.schedule));

    // Scheduler
    let runner = Arc::new(TaskRunner::new(
        DeviceResolver::new(Arc::clone(&catalog)),
        Arc::clone(&hub),
        tasks.clone(),
        Arc::clone(&audit),
        Arc::clone(&notifier),
    ));
    let scheduler = SchedulerLoop::new(tasks, runner, Arc::clone(&audit))
        .with_poll_interval(config.poll_interval());

    tracing::info!(hub = %config.hub.url, "domobridged started");
    tokio::select! {
        () = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    Ok(())
}
