//! Sensor subsystem — particulate frame decoding and liveness tracking.
//!
//! The climate and presence sensors are plain blocking reads behind
//! [`SensorPort`](crate::app::ports::SensorPort); only the particulate
//! sensor streams bytes and needs a decoder of its own.

pub mod pms;
pub mod staleness;
