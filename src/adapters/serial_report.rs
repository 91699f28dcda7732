//! Serial report adapter.
//!
//! Writes the two telemetry lines for every
//! [`AppEvent::Telemetry`] to any [`core::fmt::Write`] sink (the console
//! UART on target, a `String` in tests).  Other events are ignored.

use core::fmt::Write;

use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::protocol::telemetry::{data_line, threshold_line};

pub struct SerialReportSink<W> {
    out: W,
}

impl<W: Write> SerialReportSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for SerialReportSink<W> {
    fn emit(&mut self, event: &AppEvent) {
        let AppEvent::Telemetry(t) = event else {
            return;
        };
        let written = data_line(t)
            .and_then(|line| self.out.write_str(&line))
            .and_then(|()| threshold_line(&t.thresholds))
            .and_then(|line| self.out.write_str(&line));
        if written.is_err() {
            warn!("Serial report write failed");
        }
    }
}
