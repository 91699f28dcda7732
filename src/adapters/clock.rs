//! Monotonic uptime and the software wall clock.
//!
//! [`Uptime`] is the microsecond counter used for pulse timing.
//! [`SoftClock`] keeps time of day as an offset from it, so a
//! `$T:hhmmss!` command only stores the offset.
//!
//! - **`target_os = "espidf"`** — uptime from `esp_timer_get_time()`
//!   (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.

use log::info;

use crate::app::ports::{ClockPort, TimeOfDay};
use crate::drivers::ranger::MicrosClock;
use crate::error::ClockError;

const SECONDS_PER_DAY: u64 = 86_400;

/// Microseconds since boot.
pub struct Uptime {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Uptime {
    fn default() -> Self {
        Self::new()
    }
}

impl Uptime {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn micros(&self) -> u64 {
        // SAFETY: reads the high-resolution timer; no preconditions.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn micros(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl MicrosClock for Uptime {
    fn now_us(&mut self) -> u64 {
        self.micros()
    }
}

pub struct SoftClock {
    uptime: Uptime,
    /// Seconds to add to the uptime to get seconds since midnight.
    offset_secs: u64,
}

impl Default for SoftClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftClock {
    /// Starts at 00:00:00.
    pub fn new() -> Self {
        Self {
            uptime: Uptime::new(),
            offset_secs: 0,
        }
    }

    /// Seconds since boot (monotonic).
    pub fn uptime_secs(&self) -> u64 {
        self.uptime.micros() / 1_000_000
    }

    fn seconds_of_day_at(&self, uptime_secs: u64) -> u32 {
        ((uptime_secs + self.offset_secs) % SECONDS_PER_DAY) as u32
    }

    fn offset_for(time: TimeOfDay, uptime_secs: u64) -> u64 {
        let target = u64::from(time.seconds_of_day());
        (target + SECONDS_PER_DAY - uptime_secs % SECONDS_PER_DAY) % SECONDS_PER_DAY
    }
}

impl ClockPort for SoftClock {
    fn now(&self) -> TimeOfDay {
        TimeOfDay::from_seconds_of_day(self.seconds_of_day_at(self.uptime_secs()))
    }

    fn set_time(&mut self, time: TimeOfDay) -> Result<(), ClockError> {
        self.offset_secs = Self::offset_for(time, self.uptime_secs());
        info!("Clock set to {time}");
        Ok(())
    }
}
