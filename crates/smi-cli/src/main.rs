//! SMI CLI - health-indicator cleaning and warehouse loading.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use smi::SmiConfig;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "smi=debug" } else { "smi=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let warehouse = cli
        .warehouse
        .clone()
        .unwrap_or_else(|| cli.data_root.join("warehouse.db"));
    let config = SmiConfig {
        data_root: cli.data_root.clone(),
        warehouse,
        ..SmiConfig::default()
    };

    let result = match cli.command {
        Commands::Extract { file, delimiter } => commands::extract::run(config, file, delimiter),

        Commands::Clean {
            input,
            output,
            format,
        } => commands::clean::run(config, input, output, format),

        Commands::Sync { batch_id } => commands::sync::run(config, batch_id),

        Commands::Run {
            file,
            batch_id,
            json,
        } => commands::run::run(config, file, batch_id, json),

        Commands::Report { json } => commands::report::run(config, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
