//! Validation reporting for cleaning runs.

mod report;

pub use report::{build_report, ValidationReport};
