//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log them, print the
//! serial report, or both.

use crate::alarm::SystemStatus;
use crate::config::{OperatorModes, ThresholdConfig};
use crate::error::Error;
use crate::protocol::command::Command;
use crate::protocol::telemetry::FaultCode;

/// A subsystem that can be marked faulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Particulate,
    Climate,
    Storage,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the thresholds in force).
    Started(ThresholdConfig),

    /// The arbitrated system status changed.
    StatusChanged { from: SystemStatus, to: SystemStatus },

    /// A subsystem went faulty.
    FaultRaised(Subsystem),

    /// A subsystem recovered.
    FaultCleared(Subsystem),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// A remote command was accepted.
    CommandApplied(Command),

    /// A remote command failed validation; nothing changed.
    CommandRejected(Command, Error),

    /// Light mode, mute or the edit cursor changed from the keys.
    ModesChanged(OperatorModes),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub status: SystemStatus,
    pub temperature_c: u16,
    pub humidity_pct: u16,
    pub pm2_5: u16,
    pub count_0_3: u16,
    pub count_2_5: u16,
    pub fault: FaultCode,
    pub thresholds: ThresholdConfig,
}
