//! Fuzz target for the period parser.

#![no_main]

use chrono::Datelike;
use libfuzzer_sys::fuzz_target;
use smi::transform::parse_period;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Some(date) = parse_period(s) {
            assert_eq!(date.day(), 1);
        }
    }
});
