//! Fuzz target: console line capture + command parser
//!
//! Pushes arbitrary bytes through `CommandLink` and parses every captured
//! line.  Neither stage may panic, and a parsed clock command never
//! carries a digit pair above 99.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use depotwatch::protocol::command::{Command, parse};
use depotwatch::protocol::link::{CommandLink, LINE_CAP};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The raw input as one line.
    let _ = parse(data);

    let mut link = CommandLink::new();
    for &b in data {
        let Some(line) = link.feed(b) else {
            continue;
        };
        assert!(line.len() <= LINE_CAP);
        if let Some(Command::SetClock { hour, minute, second }) = parse(&line) {
            assert!(hour <= 99 && minute <= 99 && second <= 99);
        }
    }
});
