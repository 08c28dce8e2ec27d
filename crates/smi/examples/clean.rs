//! Example: Clean an SMI extract and print the validation report.
//!
//! Usage:
//!   cargo run --example clean -- <file_path>

use std::env;
use std::path::Path;

use smi::input::Parser;
use smi::CleaningPipeline;

fn main() -> smi::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example clean -- <file_path>");
        std::process::exit(1);
    }

    let file_path = &args[1];
    let path = Path::new(file_path);

    if !path.exists() {
        eprintln!("Error: File not found: {}", file_path);
        std::process::exit(1);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("SMI cleaning: {}", file_path);
    println!("{}", separator);
    println!();

    let (raw, source) = Parser::new().parse_file(path)?;
    println!("## Source Metadata");
    println!("  File: {}", source.file);
    println!("  Format: {}", source.format);
    println!("  Rows: {}", source.row_count);
    println!("  Columns: {}", source.column_count);
    println!();

    let out = CleaningPipeline::new().run(&raw);

    println!("## Column Roles");
    for (field, column) in out.roles.geography_columns() {
        println!("  {:?}: {}", field, column);
    }
    println!("  Counters: {}", out.roles.counters().len());
    println!("  Ratios: {}", out.roles.ratios().len());
    println!();

    println!("## Changes");
    for change in &out.log.changes {
        println!(
            "  [{}] {} ({}): {}",
            change.stage,
            change.description,
            change.column.as_deref().unwrap_or("-"),
            change.values_changed
        );
    }
    println!();

    println!("## Validation Report");
    print!("{}", out.report);

    Ok(())
}
