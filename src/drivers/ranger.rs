//! Presence inputs: HC-SR04 ultrasonic ranger and the light-dependent
//! resistor divider.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;

const TRIGGER_US: u32 = 20;
/// No echo start within this long: nothing in front of the sensor.
const ECHO_START_TIMEOUT_US: u64 = 5_000;
/// Echo pulse cap, about 5 m.
const ECHO_MAX_US: u64 = 30_000;

/// ADC counts at or above which the light reads 0 %.
pub const LIGHT_FULL_SCALE: u16 = 4000;

/// Round-trip echo time to one-way distance at 343 m/s.
pub fn echo_to_mm(echo_us: u32) -> u32 {
    (u64::from(echo_us) * 343 / 2000) as u32
}

/// Divider reading to 0–100 % light.  The divider reads high in the dark.
pub fn light_percent(raw: u16) -> u8 {
    (100 - raw.min(LIGHT_FULL_SCALE) / (LIGHT_FULL_SCALE / 100)) as u8
}

/// Monotonic microsecond timestamps for pulse timing.
pub trait MicrosClock {
    fn now_us(&mut self) -> u64;
}

pub struct Ranger<T, E, D, M> {
    trig: T,
    echo: E,
    delay: D,
    clock: M,
}

impl<T, E, D, M> Ranger<T, E, D, M>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    M: MicrosClock,
{
    pub fn new(mut trig: T, echo: E, delay: D, clock: M) -> Result<Self, T::Error> {
        trig.set_low()?;
        Ok(Self {
            trig,
            echo,
            delay,
            clock,
        })
    }

    /// Fire one ping.  `Ok(None)` when no echo came back.
    ///
    /// The echo width is taken from timestamps, so it does not depend on
    /// how fast the pin can be polled.
    pub fn measure_mm(&mut self) -> Result<Option<u32>, SensorError> {
        self.trig.set_high().map_err(|_| SensorError::ReadFailed)?;
        self.delay.delay_us(TRIGGER_US);
        self.trig.set_low().map_err(|_| SensorError::ReadFailed)?;

        let armed = self.clock.now_us();
        while !self.echo_high()? {
            if self.clock.now_us().saturating_sub(armed) >= ECHO_START_TIMEOUT_US {
                return Ok(None);
            }
        }

        let rise = self.clock.now_us();
        let echo_us = loop {
            let width = self.clock.now_us().saturating_sub(rise);
            if width >= ECHO_MAX_US || !self.echo_high()? {
                break width.min(ECHO_MAX_US);
            }
        };
        Ok(Some(echo_to_mm(echo_us as u32)))
    }

    fn echo_high(&mut self) -> Result<bool, SensorError> {
        self.echo.is_high().map_err(|_| SensorError::ReadFailed)
    }
}
