//! Run command - extract, clean and sync one file, then print the
//! completion notice.

use std::path::PathBuf;

use colored::Colorize;
use smi::{InMemoryMetrics, Smi, SmiConfig};

pub fn run(
    config: SmiConfig,
    file: PathBuf,
    batch_id: Option<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let smi = Smi::with_config(config);
    let metrics = InMemoryMetrics::new();
    let batch_id = batch_id.unwrap_or_else(super::default_batch_id);

    let summary = smi.run(&file, &batch_id, &metrics)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let report = &summary.report;
    println!("{}", "SMI pipeline completed".green().bold());
    println!();
    println!("{}", "Extraction:".yellow().bold());
    println!("  File:  {}", summary.source.file.white());
    println!("  Rows:  {}", summary.source.row_count);
    println!();
    println!("{}", "Cleaning:".yellow().bold());
    println!("  Original rows: {}", report.original_rows);
    println!("  Final rows:    {}", report.final_rows.to_string().white().bold());
    println!("  Rows removed:  {}", report.rows_removed);
    println!("  Duplicates:    {}", report.duplicates);

    match &summary.sync {
        Some(sync) => super::sync::print_summary(sync),
        None => {
            println!();
            println!(
                "{} extract lacks geography columns, warehouse not synchronized",
                "Warning:".yellow().bold()
            );
        }
    }

    println!();
    println!("  Batch:    {}", batch_id.dimmed());
    println!(
        "  Finished: {}",
        chrono::Utc::now().to_rfc3339().dimmed()
    );
    if metrics.snapshot().failures > 0 {
        println!("{}", "Some extraction attempts failed".red());
    }

    Ok(())
}
