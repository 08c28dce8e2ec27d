//! Report command - show the last validation report.

use colored::Colorize;
use smi::{Smi, SmiConfig};

pub fn run(config: SmiConfig, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let smi = Smi::with_config(config);
    let path = smi.config().report_path();

    if !path.exists() {
        return Err(format!(
            "Validation report not found: {}\nRun 'smi clean' first.",
            path.display()
        )
        .into());
    }

    let report = smi.load_report()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Validation report".cyan().bold());
    println!();
    print!("{}", report);

    let mut incomplete: Vec<(&String, &f64)> = report
        .missing_values_pct
        .iter()
        .filter(|(_, pct)| **pct > 0.0)
        .collect();
    incomplete.sort_by(|a, b| b.1.total_cmp(a.1));

    if !incomplete.is_empty() {
        println!();
        println!("{}", "Missing values:".yellow().bold());
        for (column, pct) in incomplete.iter().take(10) {
            println!("  {:<40} {:>6.2}%", column, pct);
        }
    }

    if report.is_clean() {
        println!();
        println!("{}", "No duplicates or negative counters.".green());
    }

    Ok(())
}
