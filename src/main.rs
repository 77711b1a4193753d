//! Main entry point for trnmodel CLI

use anyhow::Context;
use clap::Parser;
use trnmodel::cli::Cli;
use trnmodel::commands::execute_command;

fn main() {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Set up verbose logging if requested
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let config = match cli.resolve_config().context("Failed to load configuration") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Execute the command
    if let Err(e) = execute_command(cli.command, &config) {
        if e.is_selection_mismatch() {
            eprintln!("Warning: {}. Please check the selected transaction type.", e);
        } else {
            eprintln!("No data available: {}", e);
        }
        std::process::exit(1);
    }
}
