//! Clean command - bronze snapshot to silver layer plus validation report.

use std::path::PathBuf;

use colored::Colorize;
use smi::snapshot::save_json;
use smi::{Smi, SmiConfig};

use crate::cli::OutputFormat;

pub fn run(
    config: SmiConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let smi = Smi::with_config(config);
    let input = input.unwrap_or_else(|| smi.config().bronze_path());

    if !input.exists() {
        return Err(format!(
            "Bronze snapshot not found: {}\nRun 'smi extract <FILE>' first.",
            input.display()
        )
        .into());
    }

    println!("{} {}", "Cleaning".cyan().bold(), input.display());
    let cleaned = smi.clean_bronze(&input)?;
    let report = &cleaned.report;

    println!();
    println!("{}", "Validation report:".yellow().bold());
    println!("  Original rows: {}", report.original_rows);
    println!("  Final rows:    {}", report.final_rows.to_string().white().bold());
    if report.rows_removed > 0 {
        println!(
            "  Rows removed:  {} ({} missing geography)",
            report.rows_removed.to_string().red(),
            report.dropped_missing_geography
        );
    }
    println!("  Columns:       {}", report.columns);
    if report.duplicates > 0 {
        println!("  Duplicates:    {}", report.duplicates.to_string().yellow());
    }
    if report.unparsed_periods > 0 {
        println!("  Unparsed periods: {}", report.unparsed_periods.to_string().yellow());
    }
    for (column, count) in &report.negative_values {
        println!(
            "  {} {} negative values in '{}'",
            "Warning:".yellow().bold(),
            count,
            column
        );
    }
    for skipped in &cleaned.log.skipped {
        println!("  {} {}", "Skipped:".dimmed(), skipped);
    }

    if let Some(path) = output {
        match format {
            OutputFormat::Json => save_json(&cleaned.records, &path)?,
            OutputFormat::Csv => cleaned.records.write_csv(&path, b',')?,
            OutputFormat::Tsv => cleaned.records.write_csv(&path, b'\t')?,
        }
        println!();
        println!("{} {} ({})", "Exported:".green().bold(), path.display(), format);
    }

    println!();
    println!(
        "{} {}",
        "Silver snapshot:".green().bold(),
        smi.config().silver_path().display()
    );

    Ok(())
}
