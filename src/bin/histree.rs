//! Histree CLI Binary
//!
//! Processes one repository URL: fetches or refreshes the local clone,
//! replays its history into the annotated tree, and writes the report.

use clap::Parser;
use histree::cli::{self, Cli};
use histree::logging;
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap renders its own usage/help text; help and version are
            // not failures.
            let failed = e.use_stderr();
            let _ = e.print();
            process::exit(if failed { 1 } else { 0 });
        }
    };

    let config = match cli.effective_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = logging::init_logging(Some(&config.logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    match cli::run(&cli, &config) {
        Ok((data, path)) => {
            println!("Report written to {}", path.display());
            println!("{}", cli::summary_table(&data));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
