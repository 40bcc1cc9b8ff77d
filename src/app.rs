//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - parses CLI arguments
//! - runs the download pipeline
//! - writes the CSV export or prints a preview

use clap::Parser;

use crate::cli::{Cli, Command, FetchArgs};
use crate::data::FeedClient;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `neofeed` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Fetch(args) => handle_download(args, OutputMode::Csv),
        Command::Show(args) => handle_download(args, OutputMode::Preview),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Csv,
    Preview,
}

fn handle_download(args: FetchArgs, mode: OutputMode) -> Result<(), AppError> {
    let client = match &args.api_key {
        Some(key) => FeedClient::new(key.clone())?,
        None => FeedClient::from_env()?,
    };

    let table = pipeline::download(&args.start, &args.end, &client)?;

    match mode {
        OutputMode::Csv => {
            crate::io::export::write_table_csv(&args.output, &table)?;
            println!(
                "Wrote {} rows x {} columns to {} ({} records skipped)",
                table.len(),
                table.columns.len(),
                args.output.display(),
                table.skipped,
            );
        }
        OutputMode::Preview => {
            println!("{}", crate::report::format_preview(&table, args.rows));
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
