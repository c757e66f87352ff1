//! Command-line interface argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// CDI Dashboard - chronic disease indicator explorer
///
/// Examples:
///   cdi-dashboard --data chronic_disease_indicators.csv
///   cdi-dashboard --config dashboard.toml -v
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Indicator table to open at start-up (.csv, .json or .parquet)
    #[arg(short, long, value_name = "FILE", env = "CDI_DATA")]
    pub data: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for cdi-dashboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
