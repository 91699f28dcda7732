//! Plantower PMS-series laser particulate sensor (PMS7003 / PMS5003).
//!
//! The sensor streams a fixed 32-byte frame over UART at 9600 baud,
//! roughly once per second:
//!
//! ```text
//! ┌──────┬──────┬────────┬──────────────────┬──────────────────┬──────────┬──────────┐
//! │ 0x42 │ 0x4D │ len(2) │ PM std/atm (6×2) │ counts (6×2)     │ rsvd (2) │ sum (2)  │
//! └──────┴──────┴────────┴──────────────────┴──────────────────┴──────────┴──────────┘
//!   0      1      2..4     4..16              16..28             28..30     30..32
//! ```
//!
//! All multi-byte fields are big-endian.  The checksum is the 16-bit
//! wrapping sum of bytes `0..30`.
//!
//! [`PmsDecoder::feed`] runs from the UART receive interrupt, one byte at
//! a time.  It never allocates and never blocks.  Framing errors are
//! swallowed; the staleness monitor notices a sensor that stops
//! producing good frames.

use log::trace;

use crate::mailbox::{Mailbox, PARTICULATE_MAILBOX};

/// First start-of-frame byte.
pub const SYNC1: u8 = 0x42;
/// Second start-of-frame byte.
pub const SYNC2: u8 = 0x4D;
/// Full frame length, sync bytes and checksum included.
pub const FRAME_LEN: usize = 32;
/// Bytes covered by the checksum.
const CHECKSUM_SPAN: usize = FRAME_LEN - 2;

/// One decoded sensor frame.
///
/// PM concentrations in µg/m³, particle counts per 0.1 L of air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParticulateRecord {
    pub pm1_0_std: u16,
    pub pm2_5_std: u16,
    pub pm10_std: u16,
    pub pm1_0_atm: u16,
    pub pm2_5_atm: u16,
    pub pm10_atm: u16,
    /// Particles > 0.3 µm.
    pub count_0_3: u16,
    /// Particles > 0.5 µm.
    pub count_0_5: u16,
    /// Particles > 1.0 µm.
    pub count_1_0: u16,
    /// Particles > 2.5 µm.
    pub count_2_5: u16,
    /// Particles > 5.0 µm.
    pub count_5_0: u16,
    /// Particles > 10 µm.
    pub count_10: u16,
    /// Set only on the read that first observes this record.
    pub fresh: bool,
}

impl ParticulateRecord {
    /// Decode the payload fields of a checksum-verified frame.
    fn from_frame(frame: &[u8; FRAME_LEN]) -> Self {
        let word = |at: usize| u16::from_be_bytes([frame[at], frame[at + 1]]);
        Self {
            pm1_0_std: word(4),
            pm2_5_std: word(6),
            pm10_std: word(8),
            pm1_0_atm: word(10),
            pm2_5_atm: word(12),
            pm10_atm: word(14),
            count_0_3: word(16),
            count_0_5: word(18),
            count_1_0: word(20),
            count_2_5: word(22),
            count_5_0: word(24),
            count_10: word(26),
            fresh: true,
        }
    }
}

/// Decoder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Hunting for `0x42`.
    AwaitSync1,
    /// Got `0x42`, expecting `0x4D`.
    AwaitSync2,
    /// Sync seen, filling the frame buffer.
    Collecting,
}

/// Streaming frame decoder.  One instance per sensor UART.
pub struct PmsDecoder {
    state: DecoderState,
    frame: [u8; FRAME_LEN],
    index: usize,
}

impl PmsDecoder {
    pub const fn new() -> Self {
        Self {
            state: DecoderState::AwaitSync1,
            frame: [0; FRAME_LEN],
            index: 0,
        }
    }

    /// Current state (exposed for diagnostics and tests).
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Feed one received byte.
    ///
    /// Returns a record when this byte completes a frame whose checksum
    /// verifies.  A bad second sync byte drops the partial frame without
    /// re-examining that byte as a first sync byte.
    pub fn feed(&mut self, byte: u8) -> Option<ParticulateRecord> {
        match self.state {
            DecoderState::AwaitSync1 => {
                if byte == SYNC1 {
                    self.frame[0] = byte;
                    self.state = DecoderState::AwaitSync2;
                }
                None
            }
            DecoderState::AwaitSync2 => {
                if byte == SYNC2 {
                    self.frame[1] = byte;
                    self.index = 2;
                    self.state = DecoderState::Collecting;
                } else {
                    trace!("pms: lost sync (0x{byte:02X})");
                    self.state = DecoderState::AwaitSync1;
                }
                None
            }
            DecoderState::Collecting => {
                self.frame[self.index] = byte;
                self.index += 1;
                if self.index < FRAME_LEN {
                    return None;
                }
                self.index = 0;
                self.state = DecoderState::AwaitSync1;
                if checksum_ok(&self.frame) {
                    Some(ParticulateRecord::from_frame(&self.frame))
                } else {
                    trace!("pms: checksum mismatch, frame dropped");
                    None
                }
            }
        }
    }

    /// Drop any partial frame.
    pub fn reset(&mut self) {
        self.state = DecoderState::AwaitSync1;
        self.index = 0;
    }
}

impl Default for PmsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn checksum_ok(frame: &[u8; FRAME_LEN]) -> bool {
    let sum = frame[..CHECKSUM_SPAN]
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
    sum == u16::from_be_bytes([frame[CHECKSUM_SPAN], frame[CHECKSUM_SPAN + 1]])
}

/// Fill in the checksum trailer of a 32-byte frame.
///
/// Used by bench tools and tests to synthesise sensor traffic.
pub fn seal_frame(frame: &mut [u8; FRAME_LEN]) {
    frame[0] = SYNC1;
    frame[1] = SYNC2;
    let sum = frame[..CHECKSUM_SPAN]
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
    frame[CHECKSUM_SPAN..].copy_from_slice(&sum.to_be_bytes());
}

// ---------------------------------------------------------------------------
// ISR glue
// ---------------------------------------------------------------------------

/// UART receive hook: feed the decoder and publish completed records.
pub fn on_pms_byte(decoder: &mut PmsDecoder, byte: u8) {
    if let Some(record) = decoder.feed(byte) {
        PARTICULATE_MAILBOX.publish(record);
    }
}

/// Consumer side of the particulate mailbox.
///
/// Keeps the last record so the main loop always has values to show and
/// compare; `fresh` tells whether it arrived since the previous read.
pub struct ParticulateLink<'a> {
    mailbox: &'a Mailbox<ParticulateRecord>,
    last: ParticulateRecord,
}

impl<'a> ParticulateLink<'a> {
    pub fn new(mailbox: &'a Mailbox<ParticulateRecord>) -> Self {
        Self {
            mailbox,
            last: ParticulateRecord::default(),
        }
    }

    /// Read-and-clear.  `fresh` is true only when a new record was taken.
    pub fn read(&mut self) -> ParticulateRecord {
        match self.mailbox.take() {
            Some(record) => {
                self.last = record;
                self.last.fresh = true;
            }
            None => self.last.fresh = false,
        }
        self.last
    }
}

impl ParticulateLink<'static> {
    /// Link bound to the firmware-wide particulate mailbox.
    pub fn global() -> Self {
        Self::new(&PARTICULATE_MAILBOX)
    }
}
