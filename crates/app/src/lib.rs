//! # domobridge-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AliasCatalog` — load the alias table from its source
//!   - `TaskRepository` — load/save the persisted schedule
//!   - `HubGateway` — get/set properties and trigger scripts on the hub
//!   - `AuditSink` — append one record per performed action
//!   - `FailureNotifier` — best-effort outbound failure alerts
//! - Define **use-cases**:
//!   - `DeviceResolver` — alias + preferences → hub address
//!   - `SchedulerLoop` — minute-tick dispatch of due tasks
//!   - `TaskRunner` — execute one task and apply its lifecycle rules
//!   - `TaskStoreHandle` — the single serializing owner of the schedule
//!   - `DeviceService` / `TaskService` — caller-facing bridge operations
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `domobridge-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod executor;
pub mod ports;
pub mod resolver;
pub mod scheduler;
pub mod services;
pub mod task_store;
