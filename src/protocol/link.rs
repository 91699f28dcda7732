//! Console UART line capture.
//!
//! Runs in the receive interrupt.  Bytes between `$` and `!` (markers
//! included) are collected into a fixed buffer; the completed line is
//! published to the command mailbox for the main loop to parse.
//!
//! A `$` always starts a fresh line, so a sender that gives up half-way
//! can simply start over.  Lines longer than [`LINE_CAP`] are discarded
//! up to the next `$`.

use log::debug;

use crate::mailbox::{COMMAND_MAILBOX, Mailbox};

use super::command::{self, Command, END, START};

/// Longest accepted line, markers included.
pub const LINE_CAP: usize = 32;

/// One captured `$…!` line.
pub type CommandLine = heapless::Vec<u8, LINE_CAP>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Idle,
    Capturing,
    /// Overflowed; ignore bytes until the next start marker.
    Discarding,
}

pub struct CommandLink {
    state: LinkState,
    line: CommandLine,
}

impl CommandLink {
    pub const fn new() -> Self {
        Self {
            state: LinkState::Idle,
            line: heapless::Vec::new(),
        }
    }

    /// Feed one received byte.  Returns the line when `!` closes it.
    pub fn feed(&mut self, byte: u8) -> Option<CommandLine> {
        if byte == START {
            self.line.clear();
            // Capacity is never zero, so the start marker always fits.
            let _ = self.line.push(byte);
            self.state = LinkState::Capturing;
            return None;
        }

        match self.state {
            LinkState::Idle | LinkState::Discarding => None,
            LinkState::Capturing => {
                if self.line.push(byte).is_err() {
                    self.state = LinkState::Discarding;
                    self.line.clear();
                    return None;
                }
                if byte == END {
                    self.state = LinkState::Idle;
                    let line = self.line.clone();
                    self.line.clear();
                    return Some(line);
                }
                None
            }
        }
    }
}

impl Default for CommandLink {
    fn default() -> Self {
        Self::new()
    }
}

/// Feed a chunk of console bytes and hand every command to `on_command`
/// in arrival order.
///
/// Each completed line is published and taken back out before the next
/// byte is fed, so back-to-back lines in one chunk never overwrite each
/// other in the single-slot mailbox.
pub fn pump_console(
    link: &mut CommandLink,
    mailbox: &Mailbox<CommandLine>,
    bytes: &[u8],
    mut on_command: impl FnMut(Command),
) {
    for &byte in bytes {
        if let Some(line) = link.feed(byte) {
            mailbox.publish(line);
        }
        if let Some(cmd) = take_command(mailbox) {
            on_command(cmd);
        }
    }
}

/// [`pump_console`] on the firmware-wide command mailbox.
pub fn on_console_bytes(link: &mut CommandLink, bytes: &[u8], on_command: impl FnMut(Command)) {
    pump_console(link, &COMMAND_MAILBOX, bytes, on_command);
}

/// Main-loop side: take the pending line, if any, and parse it.
///
/// Malformed lines are dropped here.
pub fn take_command(mailbox: &Mailbox<CommandLine>) -> Option<Command> {
    let line = mailbox.take()?;
    let cmd = command::parse(&line);
    if cmd.is_none() {
        debug!("console: dropped malformed line ({} bytes)", line.len());
    }
    cmd
}
