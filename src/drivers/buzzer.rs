//! Active piezo buzzer on a single GPIO (active HIGH, transistor-driven).
//!
//! The alarm arbitrator decides *whether* sound is permitted; this driver
//! only tracks the line so redundant writes are skipped.

use embedded_hal::digital::OutputPin;

pub struct Buzzer<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Buzzer<P> {
    /// Take the pin and drive it low.
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self { pin, on: false })
    }

    pub fn set(&mut self, on: bool) -> Result<(), P::Error> {
        if on == self.on {
            return Ok(());
        }
        if on {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
