//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! The operator-facing serial report lives in
//! [`serial_report`](super::serial_report); this sink is for diagnostics.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | status={} | T={}\u{00b0}C H={}% | PM2.5={}ug/m3 | \
                     n0.3={} n2.5={} | fault={:?}",
                    t.status, t.temperature_c, t.humidity_pct, t.pm2_5, t.count_0_3, t.count_2_5, t.fault,
                );
            }
            AppEvent::StatusChanged { from, to } => {
                info!("STATUS | {} -> {}", from, to);
            }
            AppEvent::FaultRaised(subsystem) => {
                warn!("FAULT | {:?} raised", subsystem);
            }
            AppEvent::FaultCleared(subsystem) => {
                info!("FAULT | {:?} cleared", subsystem);
            }
            AppEvent::CommandApplied(cmd) => {
                info!("CMD | applied {:?}", cmd);
            }
            AppEvent::CommandRejected(cmd, e) => {
                warn!("CMD | rejected {:?}: {}", cmd, e);
            }
            AppEvent::ModesChanged(modes) => {
                info!(
                    "MODES | light={:?} silent={} editing={:?}",
                    modes.light, modes.silent, modes.editing
                );
            }
            AppEvent::Started(thresholds) => {
                info!("START | thresholds={:?}", thresholds);
            }
        }
    }
}
