//! Extract command - read an extract file into the bronze layer.

use std::path::PathBuf;

use colored::Colorize;
use smi::input::EXPECTED_HEADERS;
use smi::{InMemoryMetrics, Smi, SmiConfig};

pub fn run(
    mut config: SmiConfig,
    file: PathBuf,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    if let Some(d) = delimiter {
        if !d.is_ascii() {
            return Err(format!("Delimiter must be a single ASCII character, got '{}'", d).into());
        }
        config.parser.delimiter = Some(d as u8);
    }

    let smi = Smi::with_config(config);
    let metrics = InMemoryMetrics::new();

    println!("{} {}", "Extracting".cyan().bold(), file.display());
    let extraction = smi.extract_to_bronze(&file, &metrics)?;

    let check = extraction.raw.check_columns(EXPECTED_HEADERS);

    println!();
    println!("{}", "Source:".yellow().bold());
    println!("  File:    {}", extraction.source.file.white());
    println!("  Format:  {}", extraction.source.format);
    println!("  Rows:    {}", extraction.source.row_count.to_string().white().bold());
    println!("  Columns: {}", extraction.source.column_count);
    println!("  Hash:    {}", extraction.source.hash.dimmed());

    if !check.missing.is_empty() {
        println!(
            "{} missing expected columns: {}",
            "Warning:".yellow().bold(),
            check.missing.join(", ")
        );
    }

    let snapshot = metrics.snapshot();
    println!(
        "  Took:    {:.2?}",
        snapshot.durations.iter().sum::<std::time::Duration>()
    );

    println!();
    println!(
        "{} {}",
        "Bronze snapshot:".green().bold(),
        smi.config().bronze_path().display()
    );

    Ok(())
}
