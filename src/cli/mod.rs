//! Command-line parsing for the NEO feed downloader.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the download/flatten code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "neofeed", version, about = "NASA NEO feed downloader and flattener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download a date range and export the flat table to CSV.
    Fetch(FetchArgs),
    /// Download a date range and print a table preview (useful for spot checks).
    Show(FetchArgs),
}

/// Common options for downloading.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// First day of the range (YYYY-MM-DD).
    #[arg(short = 's', long)]
    pub start: String,

    /// Last day of the range, inclusive (YYYY-MM-DD).
    #[arg(short = 'e', long)]
    pub end: String,

    /// NASA API key. Falls back to the NASA_API_KEY environment variable
    /// (a `.env` file is honored).
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Output CSV path (`fetch` only).
    #[arg(short = 'o', long, default_value = "neo.csv")]
    pub output: PathBuf,

    /// Number of rows to print (`show` only).
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}
