//! Single-slot mailboxes between byte-level producers and the main loop.
//!
//! ```text
//! ┌──────────────┐  publish   ┌───────────┐  take    ┌────────────┐
//! │ UART RX ISR  │──────────▶ │  Mailbox  │────────▶ │ Main loop  │
//! └──────────────┘            └───────────┘          └────────────┘
//! ```
//!
//! A mailbox holds at most one value.  Publishing overwrites an unread
//! value; taking clears the slot.  Both sides run inside a
//! `critical_section`, so the consumer never observes the "full" flag
//! without the matching payload.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::protocol::link::CommandLine;
use crate::sensors::pms::ParticulateRecord;

/// Latest decoded particulate record, written by the sensor UART ISR.
pub static PARTICULATE_MAILBOX: Mailbox<ParticulateRecord> = Mailbox::new();

/// Latest complete `$…!` command line, written by the console UART ISR.
pub static COMMAND_MAILBOX: Mailbox<CommandLine> = Mailbox::new();

/// Overwriting single-value slot.
pub struct Mailbox<T> {
    slot: Signal<CriticalSectionRawMutex, T>,
}

impl<T: Send> Mailbox<T> {
    pub const fn new() -> Self {
        Self {
            slot: Signal::new(),
        }
    }

    /// Store `value`, replacing anything not yet taken.
    /// Safe to call from interrupt context.
    pub fn publish(&self, value: T) {
        self.slot.signal(value);
    }

    /// Remove and return the pending value, if any.
    pub fn take(&self) -> Option<T> {
        self.slot.try_take()
    }

    /// Whether a value is waiting.
    pub fn is_full(&self) -> bool {
        self.slot.signaled()
    }

    /// Drop any pending value.
    pub fn clear(&self) {
        self.slot.reset();
    }
}

impl<T: Send> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
