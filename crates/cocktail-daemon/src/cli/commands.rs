use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "cocktaild")]
#[command(about = "Control core for an automated cocktail-mixing robot cell")]
#[command(long_about = "cocktaild drives a six-station robot arm and a four-channel peristaltic\n\
                        pump bank through a ring-buffer feeding protocol, planning and executing\n\
                        cocktail orders against a recipe book and slot inventory.")]
#[command(version = BUILD_VERSION)]
#[command(author = "cocktaild maintainers")]
pub struct Cli {
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(short = 'd', long, global = true, value_name = "DIR", env = "COCKTAILD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the control core: management loop, pump channel and HTTP API.
    Run {
        /// Drive a simulated robot and pump instead of real hardware.
        #[arg(long)]
        fake_system: bool,
    },
    /// Create a data directory and a default config.toml.
    Init {
        #[arg(short, long)]
        force: bool,
    },
    /// Query the running daemon's HTTP API for its current status.
    Status,
    /// Run startup diagnostics without starting the control core.
    Check,
    /// Inspect or validate the configuration file.
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Validate,
}
