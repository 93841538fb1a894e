use chrono::{DateTime, Utc};
use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "autoclear")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Clear old backup files, keeping the latest copy from 1 day, 1 week, 1 month, 1 year and 2 years ago",
    long_about = None
)]
pub struct Cli {
    /// Directory to clear (defaults to the current directory)
    pub directory: Option<PathBuf>,

    /// Only consider files whose name starts with this prefix
    #[arg(short, long, env = "AUTOCLEAR_PREFIX")]
    pub prefix: Option<String>,

    /// Test mode: print files that would be removed without removing them
    #[arg(short, long)]
    pub test: bool,

    /// Also clear files in subdirectories
    #[arg(short, long, overrides_with = "no_recursive")]
    pub recursive: bool,

    /// Only clear the top-level directory, even if the config enables recursion
    #[arg(long, overrides_with = "recursive")]
    pub no_recursive: bool,

    /// Reference time in RFC 3339 format (defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    pub now: Option<DateTime<Utc>>,

    /// Print the retention plan as JSON
    #[arg(long)]
    pub json: bool,

    /// Settings file (defaults to ~/.config/autoclear/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{s}': {e}"))
}
