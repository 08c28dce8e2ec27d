//! Sync command - load the silver layer into the warehouse.

use colored::Colorize;
use smi::{Smi, SmiConfig, SyncSummary};

pub fn run(config: SmiConfig, batch_id: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let smi = Smi::with_config(config);

    if !smi.config().silver_path().exists() {
        return Err(format!(
            "Silver snapshot not found: {}\nRun 'smi clean' first.",
            smi.config().silver_path().display()
        )
        .into());
    }

    let batch_id = batch_id.unwrap_or_else(super::default_batch_id);
    println!(
        "{} {} (batch {})",
        "Synchronizing".cyan().bold(),
        smi.config().warehouse.display(),
        batch_id.white()
    );

    let summary = smi.synchronize_silver(&batch_id)?;
    print_summary(&summary);

    Ok(())
}

pub fn print_summary(summary: &SyncSummary) {
    println!();
    println!("{}", "Warehouse:".yellow().bold());
    println!("  Geographies inserted: {}", summary.geographies_inserted);
    println!("  Dates inserted:       {}", summary.dates_inserted);
    println!(
        "  Facts inserted:       {}",
        summary.facts_inserted.to_string().green()
    );
    println!(
        "  Facts updated:        {}",
        summary.facts_updated.to_string().blue()
    );
    if summary.skipped_without_period > 0 {
        println!(
            "  {} {} records without a period were not loaded",
            "Warning:".yellow().bold(),
            summary.skipped_without_period
        );
    }
}
