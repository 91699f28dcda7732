//! Periodic serial report.
//!
//! Two ASCII lines, once per telemetry period:
//!
//! ```text
//! $D:T24,H51,P12,E:00!
//! $THH:30,TLL:10,HHH:80,HLL:40,PMH:075!
//! ```
//!
//! `E` is the fault code: 00 none, 01 climate sensor, 02 particulate
//! sensor, 03 storage.  Only the highest-ranked fault is reported.

use core::fmt::Write;

use crate::app::events::TelemetryData;
use crate::config::ThresholdConfig;

/// One report line.  Worst case (every field at `u16::MAX`) is 53 bytes.
pub type ReportLine = heapless::String<64>;

/// Fault code carried in the `E:` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    None = 0,
    Climate = 1,
    Particulate = 2,
    Storage = 3,
}

impl FaultCode {
    /// Pick the code to report; climate outranks particulate outranks storage.
    pub fn from_flags(climate: bool, particulate: bool, storage: bool) -> Self {
        if climate {
            Self::Climate
        } else if particulate {
            Self::Particulate
        } else if storage {
            Self::Storage
        } else {
            Self::None
        }
    }
}

/// `$D:T<temp>,H<humi>,P<pm2.5>,E:<code>!\r\n`
pub fn data_line(t: &TelemetryData) -> Result<ReportLine, core::fmt::Error> {
    let mut line = ReportLine::new();
    write!(
        line,
        "$D:T{},H{},P{},E:{:02}!\r\n",
        t.temperature_c, t.humidity_pct, t.pm2_5, t.fault as u8
    )?;
    Ok(line)
}

/// `$THH:<..>,TLL:<..>,HHH:<..>,HLL:<..>,PMH:<...>!\r\n`
pub fn threshold_line(c: &ThresholdConfig) -> Result<ReportLine, core::fmt::Error> {
    let mut line = ReportLine::new();
    write!(
        line,
        "$THH:{:02},TLL:{:02},HHH:{:02},HLL:{:02},PMH:{:03}!\r\n",
        c.temp_high, c.temp_low, c.humi_high, c.humi_low, c.pm25_high
    )?;
    Ok(line)
}
