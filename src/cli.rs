//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::LlmConfig;

/// planforge - CBET learning-plan and session-plan generator
#[derive(Parser)]
#[command(
    name = "planforge",
    about = "Generates CBET learning plans and session plans from curriculum metadata",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate plans without the TUI (batch mode)
    Generate {
        /// Unit title
        #[arg(long)]
        unit_title: String,

        /// Qualification level (e.g. "Level 6")
        #[arg(long)]
        level: String,

        /// Name of the trainer
        #[arg(long)]
        trainer: String,

        /// Number of weeks
        #[arg(long)]
        weeks: String,

        /// Lessons per week
        #[arg(long)]
        lessons_per_week: String,

        /// Curriculum text file ('-' reads stdin)
        #[arg(long)]
        curriculum_file: PathBuf,

        /// Output directory for the exported documents
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Check configuration and API-key availability
    Check,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("planforge")
        .join("logs")
        .join("planforge.log")
}

/// Generate the after_help text with the API-key check
///
/// Built before the config file is loaded, so it reports on the default
/// key variable.
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let llm = LlmConfig::default();
    let key_present = llm.api_key_present();
    let icon = if key_present { "\u{2705}" } else { "\u{274C}" };
    let status = if key_present { "set" } else { "not set" };

    let mut help = String::new();
    help.push_str("API key:\n");
    help.push_str(&format!("  {} {} {}\n", icon, llm.api_key_env, status));
    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}
