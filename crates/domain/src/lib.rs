//! # domobridge-domain
//!
//! Pure domain model for the domobridge voice-assistant bridge.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps
//! - Define the **alias catalog** (human device names → hub addresses,
//!   with category and device-type metadata)
//! - Define **query normalization** (free spoken text → canonical alias key)
//! - Define **scheduled tasks** (time-triggered device/script actions)
//! - Define **audit records** (one structured record per performed action)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod alias;
pub mod audit;
pub mod query;
pub mod task;
