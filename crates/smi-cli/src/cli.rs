//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SMI: health-indicator cleaning and warehouse loading
#[derive(Parser)]
#[command(name = "smi")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the bronze and silver layers
    #[arg(long, global = true, default_value = "data")]
    pub data_root: PathBuf,

    /// SQLite warehouse file (default: <data-root>/warehouse.db)
    #[arg(long, global = true)]
    pub warehouse: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read an extract file and save the bronze snapshot
    Extract {
        /// Path to the extract (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Field delimiter (default: auto-detect)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Clean the bronze snapshot and save the silver layer
    Clean {
        /// Bronze snapshot to clean (default: <data-root>/bronze/smi_raw.json)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Also export the cleaned records to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Load the silver layer into the warehouse
    Sync {
        /// Identifier written on every fact row of this run
        #[arg(short, long)]
        batch_id: Option<String>,
    },

    /// Extract, clean and sync one file end to end
    Run {
        /// Path to the extract (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Identifier written on every fact row of this run
        #[arg(short, long)]
        batch_id: Option<String>,

        /// Output the completion summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the last validation report
    Report {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Tsv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            _ => Err(format!("Unknown format: {}. Use json, csv, or tsv.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Tsv => write!(f, "tsv"),
        }
    }
}
