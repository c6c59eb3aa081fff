//! Data transfer objects for the realtime wire contract.

pub mod wire;

pub use wire::{ClientFrame, ServerFrame, WireError};
