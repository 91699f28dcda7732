//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (sensors, strip and buzzer, event sinks, storage, the
//! RTC) implement these traits.  The
//! [`MonitorService`](super::service::MonitorService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::config::ThresholdConfig;
use crate::drivers::ws2812::{PixelBuffer, STRIP_LEN};
use crate::error::{ClockError, ConfigError, SensorError};
use crate::sensors::pms::ParticulateRecord;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Temperature / humidity pair from the single-wire climate sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClimateReading {
    pub temperature_c: u16,
    pub humidity_pct: u16,
}

/// Inputs to the intrusion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceReading {
    /// Ultrasonic range to the nearest object, millimetres.
    pub distance_mm: u32,
    /// Ambient light, 0–100 %.
    pub light_pct: u8,
}

impl Default for PresenceReading {
    /// Nothing in range, dark store.
    fn default() -> Self {
        Self {
            distance_mm: u32::MAX,
            light_pct: 0,
        }
    }
}

/// Read-side port: the domain calls this once per tick for each input.
pub trait SensorPort {
    /// Latest particulate record.  Read-and-clear: `fresh` is set only
    /// when a new frame arrived since the previous call.
    fn read_particulate(&mut self) -> ParticulateRecord;

    /// Blocking read of the climate sensor.
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError>;

    /// Range and ambient light.
    fn read_presence(&mut self) -> PresenceReading;
}

// ───────────────────────────────────────────────────────────────
// Alarm output port (driven adapter: domain → strip + buzzer)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain pushes one frame and one buzzer level per tick.
pub trait AlarmOutputPort {
    /// Transmit a full strip frame.
    fn show(&mut self, frame: &PixelBuffer<STRIP_LEN>);

    /// Drive the buzzer.
    fn set_buzzer(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, serial
/// report, both).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Fan an event out to two sinks.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent thresholds)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the alarm thresholds.
///
/// Implementations store the blob produced by
/// [`ThresholdConfig::to_blob`] and decode with
/// [`ThresholdConfig::from_blob`], so a corrupted or inverted blob is
/// never handed back as valid.
pub trait ConfigPort {
    /// `Err(NotFound)` on first boot.
    fn load(&self) -> Result<ThresholdConfig, ConfigError>;

    fn save(&mut self, config: &ThresholdConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain → RTC)
// ───────────────────────────────────────────────────────────────

/// Wall-clock time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
    second: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self, ClockError> {
        if hour >= 24 || minute >= 60 || second >= 60 {
            return Err(ClockError::InvalidTime);
        }
        Ok(Self { hour, minute, second })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Seconds since midnight.
    pub fn seconds_of_day(&self) -> u32 {
        u32::from(self.hour) * 3600 + u32::from(self.minute) * 60 + u32::from(self.second)
    }

    /// Inverse of [`seconds_of_day`](Self::seconds_of_day), wrapping at midnight.
    pub fn from_seconds_of_day(secs: u32) -> Self {
        let secs = secs % 86_400;
        Self {
            hour: (secs / 3600) as u8,
            minute: (secs / 60 % 60) as u8,
            second: (secs % 60) as u8,
        }
    }
}

impl core::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Settable wall clock.
pub trait ClockPort {
    fn now(&self) -> TimeOfDay;

    fn set_time(&mut self, time: TimeOfDay) -> Result<(), ClockError>;
}
