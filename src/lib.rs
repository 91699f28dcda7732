//! DepotWatch firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod alarm;
pub mod anomaly;
pub mod app;
pub mod config;
pub mod error;
pub mod mailbox;
pub mod pins;
pub mod protocol;

// Hardware-facing layers; generic over embedded-hal so they build on the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;
