//! Cleaning stages and the pipeline that chains them.

mod derived;
mod geography;
mod log;
mod missing;
pub mod naming;
pub mod period;
mod pipeline;

pub use derived::DerivedMetrics;
pub use geography::{geo_id, title_case, GeographyNormalizer};
pub use log::{CleaningLog, StageChange};
pub use missing::MissingValueResolver;
pub use naming::{canonical_name, normalize_names};
pub use period::{parse_period, CalendarFields, PeriodParser};
pub use pipeline::{CleanOutput, CleaningPipeline, SchemaNormalizer, Stage};
