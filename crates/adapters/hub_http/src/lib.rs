//! HTTP adapter for the hub gateway port.

pub mod client;

pub use client::HubHttpClient;
