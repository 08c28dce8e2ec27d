//! Fuzz target for the extract reader and the cleaning pipeline.
//!
//! Whatever the reader accepts must clean without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use smi::input::Parser;
use smi::CleaningPipeline;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    for delimiter in [b',', b';', b'\t'] {
        if let Ok(raw) = Parser::new().parse_bytes(data, delimiter) {
            let out = CleaningPipeline::new().run(&raw);
            assert_eq!(out.report.original_rows, raw.row_count());
        }
    }
});
