//! Fuzz target for the schema normalizer.

#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use smi::transform::normalize_names;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let labels: Vec<&str> = s.split('\n').take(200).collect();
        let names = normalize_names(&labels);

        assert_eq!(names.len(), labels.len());
        let distinct: HashSet<&String> = names.iter().collect();
        assert_eq!(distinct.len(), names.len());
    }
});
