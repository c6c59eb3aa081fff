//! Shared utilities for the Aizuchi chat client.
//!
//! Cross-cutting helpers used by every package: wall-clock timestamps
//! and tracing setup.

pub mod logger;
pub mod time;

pub use logger::setup_logger;
pub use time::get_unix_timestamp_millis;
