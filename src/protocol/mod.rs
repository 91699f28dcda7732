//! Serial-line protocols: the inbound `$…!` command channel and the
//! outbound telemetry report.

pub mod command;
pub mod link;
pub mod telemetry;
