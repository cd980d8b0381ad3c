use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "menu",
    about = "Menu ledger auditor tools: canonical hashing, export verification, demo runs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the canonical SHA-256 of a JSON document
    Hash(HashArgs),
    /// Recompute the hash inside a compliance export and compare
    VerifyExport(VerifyExportArgs),
    /// Load a fixture into an in-memory ledger, publish, and export
    Demo(DemoArgs),
}

#[derive(Args)]
pub struct HashArgs {
    /// JSON file to hash; `-` reads stdin
    pub path: PathBuf,
}

#[derive(Args)]
pub struct VerifyExportArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct DemoArgs {
    #[arg(long)]
    pub fixture: PathBuf,
    /// Ledger configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Plan definitions (TOML). Without it the fixture organization gets
    /// the publish feature.
    #[arg(long)]
    pub plans: Option<PathBuf>,
}
