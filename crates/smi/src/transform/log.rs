//! Per-run record of what the cleaning stages changed.

use serde::{Deserialize, Serialize};

/// A single change made by one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageChange {
    /// Stage that made the change.
    pub stage: String,

    /// Human-readable description.
    pub description: String,

    /// Column affected, when the change is column-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// Number of cells or rows changed.
    pub values_changed: usize,
}

/// Everything the stages of one pipeline run reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningLog {
    /// Changes in stage order.
    pub changes: Vec<StageChange>,

    /// Rows removed because a geography field was absent.
    pub dropped_missing_geography: usize,

    /// Rows whose period label could not be parsed.
    pub unparsed_periods: usize,

    /// Stages that skipped their enrichment for lack of a column.
    pub skipped: Vec<String>,
}

impl CleaningLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change. Zero-count changes are not kept.
    pub fn record(
        &mut self,
        stage: &str,
        column: Option<&str>,
        values_changed: usize,
        description: impl Into<String>,
    ) {
        if values_changed == 0 {
            return;
        }
        self.changes.push(StageChange {
            stage: stage.to_string(),
            description: description.into(),
            column: column.map(str::to_string),
            values_changed,
        });
    }

    /// Record that a stage skipped its enrichment.
    pub fn skip(&mut self, stage: &str, reason: impl Into<String>) {
        self.skipped.push(format!("{}: {}", stage, reason.into()));
    }

    /// Total cells or rows changed across all stages.
    pub fn values_changed(&self) -> usize {
        self.changes.iter().map(|c| c.values_changed).sum()
    }
}
