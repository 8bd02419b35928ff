//! JSON file adapters for the bridge's persistence ports.
//!
//! Three flat files, no database: the device catalog (read-only input,
//! maintained by hand or by the hub's exporter), the schedule (owned,
//! whole-list replacement) and the audit log (append-only JSONL).

pub mod audit_log;
pub mod catalog;
pub mod task_store;

pub use audit_log::JsonlAuditLog;
pub use catalog::JsonAliasCatalog;
pub use task_store::JsonTaskStore;
