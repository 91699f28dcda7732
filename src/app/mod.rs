//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the monitoring rules for DepotWatch: sensor
//! staleness, fire-risk inference, threshold comparison, alarm
//! arbitration and operator input.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
