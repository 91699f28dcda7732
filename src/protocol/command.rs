//! Remote command line parser.
//!
//! ```text
//! $T:HHMMSS!      set the wall clock (exactly six digits)
//! $THH:<n>!       temperature high limit, °C
//! $TLL:<n>!       temperature low limit, °C
//! $HHH:<n>!       humidity high limit, %RH
//! $HLL:<n>!       humidity low limit, %RH
//! $PMH:<n>!       PM2.5 limit, µg/m³
//! $MUTE:<0|1>!    silence / re-arm the buzzer
//! ```
//!
//! `<n>` is one to five ASCII digits.  Anything else parses to `None`;
//! the channel has no negative acknowledgment.  Range policy is not
//! checked here; see [`ThresholdConfig::apply`](crate::config::ThresholdConfig::apply).

use crate::config::SettingParam;

pub const START: u8 = b'$';
pub const END: u8 = b'!';

/// Longest numeric payload accepted for thresholds and mute.
const MAX_DIGITS: usize = 5;
/// `HHMMSS`.
const CLOCK_DIGITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetClock { hour: u8, minute: u8, second: u8 },
    SetTempHigh(u32),
    SetTempLow(u32),
    SetHumiHigh(u32),
    SetHumiLow(u32),
    SetPm25High(u32),
    SetMute(bool),
}

impl Command {
    fn for_threshold(param: SettingParam, value: u32) -> Self {
        match param {
            SettingParam::TempHigh => Self::SetTempHigh(value),
            SettingParam::TempLow => Self::SetTempLow(value),
            SettingParam::HumiHigh => Self::SetHumiHigh(value),
            SettingParam::HumiLow => Self::SetHumiLow(value),
            SettingParam::Pm25High => Self::SetPm25High(value),
        }
    }

    /// The threshold this command writes, if it is a threshold write.
    pub fn threshold(&self) -> Option<(SettingParam, u32)> {
        match *self {
            Self::SetTempHigh(v) => Some((SettingParam::TempHigh, v)),
            Self::SetTempLow(v) => Some((SettingParam::TempLow, v)),
            Self::SetHumiHigh(v) => Some((SettingParam::HumiHigh, v)),
            Self::SetHumiLow(v) => Some((SettingParam::HumiLow, v)),
            Self::SetPm25High(v) => Some((SettingParam::Pm25High, v)),
            Self::SetClock { .. } | Self::SetMute(_) => None,
        }
    }
}

const THRESHOLD_PREFIXES: [(&[u8], SettingParam); 5] = [
    (b"THH:", SettingParam::TempHigh),
    (b"TLL:", SettingParam::TempLow),
    (b"HHH:", SettingParam::HumiHigh),
    (b"HLL:", SettingParam::HumiLow),
    (b"PMH:", SettingParam::Pm25High),
];

/// Parse one captured line, markers included.
pub fn parse(line: &[u8]) -> Option<Command> {
    let body = line.strip_prefix(&[START])?.strip_suffix(&[END])?;

    if let Some(digits) = body.strip_prefix(b"T:") {
        return parse_clock(digits);
    }
    if let Some(digits) = body.strip_prefix(b"MUTE:") {
        return match parse_number(digits)? {
            0 => Some(Command::SetMute(false)),
            1 => Some(Command::SetMute(true)),
            _ => None,
        };
    }
    THRESHOLD_PREFIXES.iter().find_map(|&(prefix, param)| {
        let digits = body.strip_prefix(prefix)?;
        Some(Command::for_threshold(param, parse_number(digits)?))
    })
}

/// One to five ASCII digits, nothing else.
fn parse_number(digits: &[u8]) -> Option<u32> {
    if digits.is_empty() || digits.len() > MAX_DIGITS {
        return None;
    }
    digits.iter().try_fold(0u32, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}

fn parse_clock(digits: &[u8]) -> Option<Command> {
    if digits.len() != CLOCK_DIGITS || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let pair = |i: usize| (digits[i] - b'0') * 10 + (digits[i + 1] - b'0');
    Some(Command::SetClock {
        hour: pair(0),
        minute: pair(2),
        second: pair(4),
    })
}
