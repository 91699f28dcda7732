//! System configuration parameters
//!
//! Two layers:
//!
//! - [`SystemConfig`] — build-time tunables (loop timing, staleness window,
//!   sounding budget, intrusion limits).  Never changed at runtime.
//! - [`ThresholdConfig`] — the five alarm thresholds.  Mutated by the
//!   operator keys and by remote commands, persisted through
//!   [`ConfigPort`](crate::app::ports::ConfigPort).
//!
//! Bound checks live on the mutation path, not on the type: a
//! `ThresholdConfig` is only ever changed through [`ThresholdConfig::apply`]
//! or [`ThresholdConfig::step`], which keep every lower bound below its
//! upper bound.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Telemetry report interval (control ticks)
    pub telemetry_interval_ticks: u32,
    /// Forced inference interval when no fresh frame arrives (control ticks)
    pub inference_interval_ticks: u32,
    /// Quiet period after the last threshold change before it is written
    /// to flash (control ticks)
    pub persist_delay_ticks: u32,

    // --- Fault detection ---
    /// Ticks without a fresh reading before a sensor is marked faulty
    pub staleness_limit_ticks: u16,

    // --- Alarm presentation ---
    /// Ticks of continuous alarm during which the buzzer may sound
    pub sound_budget_ticks: u16,

    // --- Intrusion ---
    /// Anything closer than this (millimetres) is an intruder
    pub intrusion_distance_mm: u32,
    /// Ambient light above this (percent) is an intruder's torch / open door
    pub intrusion_light_percent: u8,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            control_loop_interval_ms: 100, // 10 Hz
            telemetry_interval_ticks: 10,  // 1 Hz
            inference_interval_ticks: 5,   // 2 Hz
            persist_delay_ticks: 50,       // 5 s

            // Fault detection
            staleness_limit_ticks: 30, // 3 s at 10 Hz

            // Alarm presentation
            sound_budget_ticks: 50, // 5 s at 10 Hz

            // Intrusion
            intrusion_distance_mm: 500,
            intrusion_light_percent: 90,
        }
    }
}

// ---------------------------------------------------------------------------
// Alarm thresholds
// ---------------------------------------------------------------------------

/// Upper bound (exclusive) for the temperature high limit, °C.
pub const TEMP_HIGH_CAP: u16 = 99;
/// Upper bound (inclusive) for the humidity high limit, %RH.
pub const HUMI_HIGH_CAP: u16 = 100;
/// Upper bound (inclusive) for the PM2.5 limit, µg/m³.
pub const PM25_HIGH_CAP: u16 = 999;

/// Alarm thresholds.  Temperature in °C, humidity in %RH, PM2.5 in µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub temp_high: u16,
    pub temp_low: u16,
    pub humi_high: u16,
    pub humi_low: u16,
    pub pm25_high: u16,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temp_high: 30,
            temp_low: 10,
            humi_high: 80,
            humi_low: 40,
            pm25_high: 75,
        }
    }
}

/// One editable threshold.  Also the cursor of the local edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingParam {
    TempHigh,
    TempLow,
    HumiHigh,
    HumiLow,
    Pm25High,
}

impl SettingParam {
    /// First parameter selected when edit mode is entered.
    pub const FIRST: Self = Self::TempHigh;

    /// Advance the edit cursor.  Saturating: `None` after the last
    /// parameter means "leave edit mode".
    pub fn next(self) -> Option<Self> {
        match self {
            Self::TempHigh => Some(Self::TempLow),
            Self::TempLow => Some(Self::HumiHigh),
            Self::HumiHigh => Some(Self::HumiLow),
            Self::HumiLow => Some(Self::Pm25High),
            Self::Pm25High => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TempHigh => "temp_high",
            Self::TempLow => "temp_low",
            Self::HumiHigh => "humi_high",
            Self::HumiLow => "humi_low",
            Self::Pm25High => "pm25_high",
        }
    }
}

/// Direction of a single-unit local adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

impl ThresholdConfig {
    /// Current value of one threshold.
    pub fn get(&self, param: SettingParam) -> u16 {
        match param {
            SettingParam::TempHigh => self.temp_high,
            SettingParam::TempLow => self.temp_low,
            SettingParam::HumiHigh => self.humi_high,
            SettingParam::HumiLow => self.humi_low,
            SettingParam::Pm25High => self.pm25_high,
        }
    }

    /// Validate and apply a remote threshold write.
    ///
    /// On rejection the previous value is retained.
    pub fn apply(&mut self, param: SettingParam, value: u16) -> Result<(), ConfigError> {
        match param {
            SettingParam::TempHigh => {
                if value >= TEMP_HIGH_CAP {
                    return Err(ConfigError::OutOfRange("temp_high < 99"));
                }
                if value <= self.temp_low {
                    return Err(ConfigError::OutOfRange("temp_high > temp_low"));
                }
                self.temp_high = value;
            }
            SettingParam::TempLow => {
                if value == 0 {
                    return Err(ConfigError::OutOfRange("temp_low > 0"));
                }
                if value >= self.temp_high {
                    return Err(ConfigError::OutOfRange("temp_low < temp_high"));
                }
                self.temp_low = value;
            }
            SettingParam::HumiHigh => {
                if value > HUMI_HIGH_CAP {
                    return Err(ConfigError::OutOfRange("humi_high <= 100"));
                }
                if value <= self.humi_low {
                    return Err(ConfigError::OutOfRange("humi_high > humi_low"));
                }
                self.humi_high = value;
            }
            SettingParam::HumiLow => {
                if value >= self.humi_high {
                    return Err(ConfigError::OutOfRange("humi_low < humi_high"));
                }
                self.humi_low = value;
            }
            SettingParam::Pm25High => {
                if value > PM25_HIGH_CAP {
                    return Err(ConfigError::OutOfRange("pm25_high <= 999"));
                }
                self.pm25_high = value;
            }
        }
        Ok(())
    }

    /// Nudge one threshold by a single unit from the local keys.
    ///
    /// Saturates at the same bounds [`apply`](Self::apply) enforces instead
    /// of failing.  Returns `true` if the value actually changed.
    pub fn step(&mut self, param: SettingParam, step: Step) -> bool {
        let before = self.get(param);
        match (param, step) {
            (SettingParam::TempHigh, Step::Up) if self.temp_high.saturating_add(1) < TEMP_HIGH_CAP => self.temp_high += 1,
            (SettingParam::TempHigh, Step::Down) if self.temp_high > self.temp_low.saturating_add(1) => self.temp_high -= 1,
            (SettingParam::TempLow, Step::Up) if self.temp_low.saturating_add(1) < self.temp_high => self.temp_low += 1,
            (SettingParam::TempLow, Step::Down) if self.temp_low > 1 => self.temp_low -= 1,
            (SettingParam::HumiHigh, Step::Up) if self.humi_high < HUMI_HIGH_CAP => self.humi_high += 1,
            (SettingParam::HumiHigh, Step::Down) if self.humi_high > self.humi_low.saturating_add(1) => self.humi_high -= 1,
            (SettingParam::HumiLow, Step::Up) if self.humi_low.saturating_add(1) < self.humi_high => self.humi_low += 1,
            (SettingParam::HumiLow, Step::Down) if self.humi_low > 0 => self.humi_low -= 1,
            (SettingParam::Pm25High, Step::Up) if self.pm25_high < PM25_HIGH_CAP => self.pm25_high += 1,
            (SettingParam::Pm25High, Step::Down) if self.pm25_high > 0 => self.pm25_high -= 1,
            _ => {}
        }
        self.get(param) != before
    }

    /// Compare one set of readings against the thresholds.
    pub fn evaluate(&self, temperature_c: u16, humidity_pct: u16, pm2_5: u16) -> ThresholdBreaches {
        ThresholdBreaches {
            temperature: temperature_c > self.temp_high || temperature_c < self.temp_low,
            humidity: humidity_pct > self.humi_high || humidity_pct < self.humi_low,
            particulate: pm2_5 > self.pm25_high,
        }
    }

    /// Structural sanity check applied to blobs loaded from storage.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temp_low >= self.temp_high || self.temp_high >= TEMP_HIGH_CAP {
            return Err(ConfigError::Corrupted);
        }
        if self.humi_low >= self.humi_high || self.humi_high > HUMI_HIGH_CAP {
            return Err(ConfigError::Corrupted);
        }
        if self.pm25_high > PM25_HIGH_CAP {
            return Err(ConfigError::Corrupted);
        }
        Ok(())
    }
}

/// Result of [`ThresholdConfig::evaluate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThresholdBreaches {
    pub temperature: bool,
    pub humidity: bool,
    pub particulate: bool,
}

// ---------------------------------------------------------------------------
// Persisted blob
// ---------------------------------------------------------------------------

/// Marker written in front of the postcard payload.  Absent on first boot.
pub const BLOB_MAGIC: u8 = 0xAA;
/// Worst-case size of a persisted threshold blob.
pub const BLOB_LEN: usize = 16;

impl ThresholdConfig {
    /// Encode as `[magic][postcard payload]`.  Returns the used length.
    pub fn to_blob(&self, out: &mut [u8; BLOB_LEN]) -> Result<usize, ConfigError> {
        out[0] = BLOB_MAGIC;
        let used = postcard::to_slice(self, &mut out[1..])
            .map_err(|_| ConfigError::Storage)?
            .len();
        Ok(used + 1)
    }

    /// Decode a blob written by [`to_blob`](Self::to_blob).
    pub fn from_blob(blob: &[u8]) -> Result<Self, ConfigError> {
        match blob.split_first() {
            Some((&BLOB_MAGIC, payload)) => {
                let cfg: Self = postcard::from_bytes(payload).map_err(|_| ConfigError::Corrupted)?;
                cfg.validate()?;
                Ok(cfg)
            }
            _ => Err(ConfigError::NotFound),
        }
    }
}

// ---------------------------------------------------------------------------
// Operator modes
// ---------------------------------------------------------------------------

/// Strip behaviour selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightMode {
    /// Alarm patterns, green when all is well.
    #[default]
    Auto,
    /// Solid white regardless of alarms.
    Emergency,
    /// Alarm patterns, dark when all is well.
    Off,
}

impl LightMode {
    /// Cycle to the next mode, wrapping back to `Auto`.
    pub fn next(self) -> Self {
        match self {
            Self::Auto => Self::Emergency,
            Self::Emergency => Self::Off,
            Self::Off => Self::Auto,
        }
    }
}

/// Runtime operator state that is not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperatorModes {
    pub light: LightMode,
    /// Buzzer silenced by the operator or by `$MUTE:1!`.
    pub silent: bool,
    /// `Some(param)` while the local edit mode is active.
    pub editing: Option<SettingParam>,
}
