//! Strip patterns and how they render.
//!
//! | Pattern            | Colour          | Period (ticks) |
//! |--------------------|-----------------|----------------|
//! | Config-edit chase  | (0, 50, 50)     | moves every 2  |
//! | Emergency          | white           | solid          |
//! | Fire               | red             | 1              |
//! | Intrusion          | purple          | 5              |
//! | Particulate        | orange          | 2              |
//! | Temperature        | yellow          | 5              |
//! | Humidity           | blue            | 10             |
//! | Normal (`Auto`)    | dim green       | solid          |
//! | Normal (`Off`)     | —               | dark           |
//!
//! A flash is lit on ticks where `tick % period == 0` and dark otherwise.

use crate::drivers::ws2812::{PixelBuffer, Rgb};

use super::AlarmCause;

pub const FIRE_RED: Rgb = (255, 0, 0);
pub const INTRUSION_PURPLE: Rgb = (128, 0, 128);
pub const PM_ORANGE: Rgb = (200, 60, 0);
pub const TEMP_YELLOW: Rgb = (200, 100, 0);
pub const HUMI_BLUE: Rgb = (0, 0, 200);
pub const NORMAL_GREEN: Rgb = (0, 50, 0);
pub const EMERGENCY_WHITE: Rgb = (255, 255, 255);
pub const EDIT_CYAN: Rgb = (0, 50, 50);

/// Ticks per chase step.
pub const CHASE_STEP_TICKS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightPattern {
    /// Strip dark.
    Off,
    /// Every pixel one colour.
    Solid(Rgb),
    /// Alarm flash: whole strip lit on every `period`-th tick.
    Flash { colour: Rgb, period: u32 },
    /// One lit pixel walking along the strip.
    Chase { colour: Rgb },
}

impl LightPattern {
    /// Flash pattern for an alarm cause.
    pub fn for_cause(cause: AlarmCause) -> Self {
        let (colour, period) = match cause {
            AlarmCause::Fire => (FIRE_RED, 1),
            AlarmCause::Intrusion => (INTRUSION_PURPLE, 5),
            AlarmCause::Particulate => (PM_ORANGE, 2),
            AlarmCause::Temperature => (TEMP_YELLOW, 5),
            AlarmCause::Humidity => (HUMI_BLUE, 10),
        };
        Self::Flash { colour, period }
    }

    pub fn is_alarm_flash(&self) -> bool {
        matches!(self, Self::Flash { .. })
    }

    /// Whether anything is lit on `tick`.
    pub fn lit(&self, tick: u32) -> bool {
        match *self {
            Self::Off => false,
            Self::Solid(_) | Self::Chase { .. } => true,
            Self::Flash { period, .. } => tick % period.max(1) == 0,
        }
    }

    /// Draw the frame for `tick` into `buffer`.
    pub fn render<const N: usize>(&self, tick: u32, buffer: &mut PixelBuffer<N>) {
        match *self {
            Self::Off => buffer.clear(),
            Self::Solid(colour) => buffer.fill(colour),
            Self::Flash { colour, .. } => {
                if self.lit(tick) {
                    buffer.fill(colour);
                } else {
                    buffer.clear();
                }
            }
            Self::Chase { colour } => {
                buffer.clear();
                if N > 0 {
                    buffer.set((tick / CHASE_STEP_TICKS) as usize % N, colour);
                }
            }
        }
    }
}
