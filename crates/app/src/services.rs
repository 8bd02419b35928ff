//! Application services — the caller-facing bridge operations.
//!
//! These are the use-cases invoked by the voice/chat front-ends and the
//! admin panel: controlling devices by spoken name and managing the
//! schedule. Front-ends themselves (parsing, transport, authentication)
//! live outside this crate.

pub mod device_service;
pub mod task_service;

pub use device_service::DeviceService;
pub use task_service::TaskService;
