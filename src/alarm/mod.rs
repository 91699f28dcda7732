//! Alarm arbitration.
//!
//! Every control tick the service hands the [`Arbitrator`] one
//! [`AlarmInputs`] snapshot.  The arbitrator resolves it into a single
//! [`SystemStatus`], decides whether the buzzer may sound and picks the
//! strip pattern.
//!
//! ## Status priority (highest first)
//!
//! 1. Any sensor subsystem faulted → `EnvWarning`
//! 2. Fire verdict from the anomaly scorer → `FireAlert`
//! 3. Intrusion → `Intrusion`
//! 4. Particulate / temperature / humidity breach → `EnvWarning`
//! 5. Otherwise → `Normal`
//!
//! ## Sounding budget
//!
//! While any alarm condition holds, a counter advances once per call.
//! Sound is permitted only while it is below the budget (50 ticks = 5 s)
//! and the operator has not silenced the unit.  The counter resets the
//! first call with no alarm, so a new incident sounds again.
//!
//! ## Pattern overrides
//!
//! The config-edit chase beats emergency lighting, which beats any
//! status pattern.

pub mod pattern;

use crate::config::{LightMode, OperatorModes};

use pattern::{EDIT_CYAN, EMERGENCY_WHITE, LightPattern, NORMAL_GREEN};

/// Everything the arbitrator looks at for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlarmInputs {
    /// Anomaly scorer says fire risk.
    pub fire: bool,
    /// Something close to the sensor or a bright light in the dark store.
    pub intrusion: bool,
    pub pm_over: bool,
    pub temp_out: bool,
    pub humi_out: bool,
    /// Particulate sensor stopped delivering frames.
    pub particulate_fault: bool,
    /// Temperature/humidity sensor stopped answering.
    pub climate_fault: bool,
}

impl AlarmInputs {
    /// Clear every alarm that a faulted sensor would have asserted.
    ///
    /// The fire verdict depends on particle counts, so it goes with the
    /// particulate sensor.
    pub fn masked(mut self) -> Self {
        if self.particulate_fault {
            self.pm_over = false;
            self.fire = false;
        }
        if self.climate_fault {
            self.temp_out = false;
            self.humi_out = false;
        }
        self
    }

    pub fn any_fault(&self) -> bool {
        self.particulate_fault || self.climate_fault
    }

    /// Any alarm condition (faults excluded).
    pub fn any_alarm(&self) -> bool {
        self.fire || self.intrusion || self.pm_over || self.temp_out || self.humi_out
    }

    /// Highest-priority active alarm condition.
    pub fn cause(&self) -> Option<AlarmCause> {
        if self.fire {
            Some(AlarmCause::Fire)
        } else if self.intrusion {
            Some(AlarmCause::Intrusion)
        } else if self.pm_over {
            Some(AlarmCause::Particulate)
        } else if self.temp_out {
            Some(AlarmCause::Temperature)
        } else if self.humi_out {
            Some(AlarmCause::Humidity)
        } else {
            None
        }
    }

    /// Resolve the single system status.
    pub fn status(&self) -> SystemStatus {
        if self.any_fault() {
            SystemStatus::EnvWarning
        } else if self.fire {
            SystemStatus::FireAlert
        } else if self.intrusion {
            SystemStatus::Intrusion
        } else if self.pm_over || self.temp_out || self.humi_out {
            SystemStatus::EnvWarning
        } else {
            SystemStatus::Normal
        }
    }
}

/// Overall system status shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    Normal,
    FireAlert,
    Intrusion,
    EnvWarning,
}

impl core::fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::FireAlert => write!(f, "FIRE"),
            Self::Intrusion => write!(f, "intrusion"),
            Self::EnvWarning => write!(f, "warning"),
        }
    }
}

/// Which alarm condition drives the flash pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmCause {
    Fire,
    Intrusion,
    Particulate,
    Temperature,
    Humidity,
}

/// Output of one [`Arbitrator::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arbitration {
    pub status: SystemStatus,
    /// Buzzer permitted this tick (budget left and not silenced).
    pub sound_enabled: bool,
    pub pattern: LightPattern,
}

impl Arbitration {
    /// Buzzer drive for `tick`: sounds in step with an alarm flash.
    pub fn buzzer_on(&self, tick: u32) -> bool {
        self.sound_enabled && self.pattern.is_alarm_flash() && self.pattern.lit(tick)
    }
}

/// Holds the one piece of arbitration state: how long the current
/// incident has been sounding.
pub struct Arbitrator {
    sound_budget: u16,
    sounding_ticks: u16,
    last_tick: u32,
}

impl Arbitrator {
    pub fn new(sound_budget: u16) -> Self {
        Self {
            sound_budget,
            sounding_ticks: 0,
            last_tick: 0,
        }
    }

    /// Arbitrate one tick.  `inputs` must already be [`masked`](AlarmInputs::masked).
    pub fn update(&mut self, inputs: &AlarmInputs, modes: &OperatorModes, tick: u32) -> Arbitration {
        self.last_tick = tick;

        if inputs.any_alarm() {
            self.sounding_ticks = self.sounding_ticks.saturating_add(1).min(self.sound_budget);
        } else {
            self.sounding_ticks = 0;
        }
        let sound_enabled = !modes.silent && self.sounding_ticks < self.sound_budget;

        Arbitration {
            status: inputs.status(),
            sound_enabled,
            pattern: select_pattern(inputs.cause(), modes),
        }
    }

    /// Calls in a row with an alarm active, capped at the budget.
    pub fn sounding_ticks(&self) -> u16 {
        self.sounding_ticks
    }

    pub fn last_tick(&self) -> u32 {
        self.last_tick
    }
}

/// Overrides first, then the alarm cause, then the idle look.
pub fn select_pattern(cause: Option<AlarmCause>, modes: &OperatorModes) -> LightPattern {
    if modes.editing.is_some() {
        return LightPattern::Chase { colour: EDIT_CYAN };
    }
    if modes.light == LightMode::Emergency {
        return LightPattern::Solid(EMERGENCY_WHITE);
    }
    match cause {
        Some(cause) => LightPattern::for_cause(cause),
        None if modes.light == LightMode::Auto => LightPattern::Solid(NORMAL_GREEN),
        None => LightPattern::Off,
    }
}
