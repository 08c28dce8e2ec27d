//! Extract reading and source metadata.

mod metrics;
mod parser;
mod source;

pub use metrics::{ExtractionMetrics, InMemoryMetrics, MetricsSnapshot, NoopMetrics};
pub use parser::{Parser, ParserConfig};
pub use source::{ColumnCheck, RawTable, SourceMetadata, EXPECTED_HEADERS};
