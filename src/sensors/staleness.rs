//! Heartbeat monitor for sensors that report on their own schedule.
//!
//! Each control tick the owner reports whether a fresh reading arrived.
//! A sensor that stays silent for more than `limit` ticks is faulted;
//! the first fresh reading clears the fault.  Fault edges are logged
//! once.

use log::{info, warn};

pub struct StalenessMonitor {
    name: &'static str,
    limit: u16,
    silent_ticks: u16,
    faulted: bool,
}

impl StalenessMonitor {
    pub fn new(name: &'static str, limit: u16) -> Self {
        Self {
            name,
            limit,
            silent_ticks: 0,
            faulted: false,
        }
    }

    /// Record one tick.  Returns `true` while the sensor is faulted.
    pub fn observe(&mut self, fresh: bool) -> bool {
        if fresh {
            self.silent_ticks = 0;
        } else {
            // Held at limit + 1 once faulted.
            self.silent_ticks = self.silent_ticks.saturating_add(1).min(self.limit.saturating_add(1));
        }

        let faulted = self.silent_ticks > self.limit;
        if faulted != self.faulted {
            if faulted {
                warn!("{}: no fresh data for {} ticks", self.name, self.silent_ticks);
            } else {
                info!("{}: data flowing again", self.name);
            }
            self.faulted = faulted;
        }
        faulted
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn silent_ticks(&self) -> u16 {
        self.silent_ticks
    }
}
