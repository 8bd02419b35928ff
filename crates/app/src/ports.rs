//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here (in `app`) so that both the use-case layer
//! and the adapter layer can depend on them without creating circular
//! dependencies.

pub mod audit;
pub mod catalog;
pub mod hub;
pub mod notifier;
pub mod task_repo;

pub use audit::AuditSink;
pub use catalog::AliasCatalog;
pub use hub::HubGateway;
pub use notifier::FailureNotifier;
pub use task_repo::TaskRepository;
