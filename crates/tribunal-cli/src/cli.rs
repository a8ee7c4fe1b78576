//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tribunal - adjudicate a query across an ensemble of responders.
#[derive(Debug, Parser)]
#[command(name = "tribunal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Pipeline configuration file (TOML)
    #[arg(short, long, global = true, env = "TRIBUNAL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (digest only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a query through the pipeline
    Run(RunArgs),

    /// Re-run a query and compare with the last logged snapshot
    Verify(VerifyArgs),

    /// List snapshots stored in a replay log
    Replay(ReplayArgs),

    /// Print a configuration as TOML
    Config(ConfigArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Query text
    pub query: String,

    /// Logical timestamp recorded in the snapshot
    #[arg(short, long)]
    pub timestamp: Option<u64>,

    /// Declare elevated contradiction likelihood (forces the Tier-2 check)
    #[arg(long)]
    pub elevated: bool,

    /// Evidence corpus files (TOML)
    #[arg(long = "corpus")]
    pub corpora: Vec<PathBuf>,

    /// Append the snapshot to this replay log
    #[arg(short, long)]
    pub log: Option<PathBuf>,
}

/// Arguments for the verify command.
#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// Query text that produced the logged snapshot
    pub query: String,

    /// Replay log to verify against
    #[arg(short, long)]
    pub log: PathBuf,

    /// Evidence corpus files (TOML)
    #[arg(long = "corpus")]
    pub corpora: Vec<PathBuf>,
}

/// Arguments for the replay command.
#[derive(Debug, Parser)]
pub struct ReplayArgs {
    /// Replay log to read
    #[arg(short, long)]
    pub log: PathBuf,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Print a preset instead of the loaded configuration
    #[arg(short, long, value_enum)]
    pub preset: Option<PresetArg>,
}

/// Configuration presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Built-in defaults
    Default,
    /// No failed calls tolerated, quorum of two
    Strict,
    /// Half of the calls may fail
    Permissive,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<PresetArg> for tribunal_pipeline::PipelineConfig {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Default => Self::default(),
            PresetArg::Strict => Self::strict(),
            PresetArg::Permissive => Self::permissive(),
        }
    }
}
