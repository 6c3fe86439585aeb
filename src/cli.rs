use std::path::PathBuf;

use clap::{Parser, Subcommand};

const DEFAULT_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

#[derive(Parser, Debug)]
#[command(name = "cci-edits-backend")]
#[command(about = "CCI edits checker backend (bundling rules for CPT code pairs)", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API (loads the rule table once at startup).
    Serve(ServeArgs),
    /// Check a set of CPT codes once and print the grouped results.
    Check(CheckArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Backend data directory (rule table and optional meta.json).
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Rule table path (.parquet or .csv). Defaults to <data-dir>/cci_edits.parquet.
    #[arg(long)]
    pub rules: Option<PathBuf>,

    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8787)]
    pub port: u16,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Backend data directory (rule table and optional meta.json).
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Rule table path (.parquet or .csv). Defaults to <data-dir>/cci_edits.parquet.
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// CPT codes, separated by spaces or commas.
    #[arg(required = true)]
    pub codes: Vec<String>,
}
