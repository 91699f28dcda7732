//! Fuzz target: `PmsDecoder::feed`
//!
//! Drives arbitrary byte streams into the particulate frame decoder and
//! asserts that it never panics, only emits fresh records, and always
//! returns to the hunt state after a record or a reset.
//!
//! cargo fuzz run fuzz_pms_decoder

#![no_main]

use depotwatch::sensors::pms::{DecoderState, PmsDecoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = PmsDecoder::new();

    for &b in data {
        if let Some(record) = decoder.feed(b) {
            assert!(record.fresh, "decoded record must be marked fresh");
            assert_eq!(decoder.state(), DecoderState::AwaitSync1);
        }
    }

    decoder.reset();
    assert_eq!(decoder.state(), DecoderState::AwaitSync1);
});
