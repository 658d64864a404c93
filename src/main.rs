//! planforge - curriculum learning-plan and session-plan generator
//!
//! CLI entry point: batch generation, config check, or the TUI.

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use planforge::cli::{Cli, Command, generate_after_help, get_log_path};
use planforge::config::Config;
use planforge::export::{self, PlanDocument};
use planforge::generate::run_generation;
use planforge::llm::{StreamChunk, create_client};
use planforge::plan::{PlanRequest, PlanSession};
use planforge::prompts::PromptLoader;
use planforge::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("planforge")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level_str = cli_log_level.or(config_log_level);
    let level = match level_str.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("planforge.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Build command with dynamic after_help showing the API-key check
    let cmd = Cli::command().after_help(generate_after_help());

    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Generate {
            unit_title,
            level,
            trainer,
            weeks,
            lessons_per_week,
            curriculum_file,
            out_dir,
        }) => {
            let request = PlanRequest {
                unit_title,
                level,
                trainer_name: trainer,
                num_weeks: weeks,
                lessons_per_week,
                curriculum: read_curriculum(&curriculum_file)?,
            };
            cmd_generate(&config, request, out_dir).await
        }
        Some(Command::Check) => cmd_check(&config),
        None => {
            debug!("main: no command specified, launching TUI");
            tui::run(&config).await
        }
    }
}

/// Read the curriculum text from a file or stdin
fn read_curriculum(path: &PathBuf) -> Result<String> {
    debug!(?path, "read_curriculum: called");
    if path == &PathBuf::from("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read curriculum from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read curriculum file {}", path.display()))
    }
}

/// Generate plans in batch mode and export both documents
async fn cmd_generate(config: &Config, request: PlanRequest, out_dir: Option<PathBuf>) -> Result<()> {
    debug!(unit_title = %request.unit_title, "cmd_generate: called");

    // Detect a missing API key before any network call
    config.validate()?;
    request.validate()?;

    let llm = create_client(&config.llm)?;
    let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let prompts = PromptLoader::new(&base);
    let mut session = PlanSession::new();

    println!("Generating plans for '{}'...", request.unit_title);

    let mut received = 0usize;
    run_generation(&llm, &prompts, &request, config.llm.max_tokens, &mut session, |chunk| {
        if let StreamChunk::TextDelta(text) = chunk {
            received += text.len();
            print!("\rReceived {} bytes", received);
            let _ = std::io::stdout().flush();
        }
    })
    .await?;
    println!();

    if let Some(warning) = &session.warning {
        println!("{}", format!("Warning: {}", warning).yellow());
    }

    let out_dir = out_dir.unwrap_or_else(|| config.export.out_dir.clone());

    if let Some(path) = export::write_document(&out_dir, PlanDocument::LearningPlan, &session.learning_plan_html, &request)? {
        println!("Wrote {}", path.display());
    }
    match export::write_document(&out_dir, PlanDocument::SessionPlans, &session.session_plans_html, &request)? {
        Some(path) => println!("Wrote {}", path.display()),
        None => println!("No session plans to export"),
    }

    Ok(())
}

/// Report configuration and API-key availability
fn cmd_check(config: &Config) -> Result<()> {
    debug!("cmd_check: called");
    let key_ok = config.llm.api_key_present();
    let key_icon = if key_ok { "\u{2705}" } else { "\u{274C}" };

    println!("Provider:    {}", config.llm.provider);
    println!("Model:       {}", config.llm.model);
    println!("Base URL:    {}", config.llm.base_url);
    println!("API key:     {} {}", key_icon, config.llm.api_key_env);
    println!("Export dir:  {}", config.export.out_dir.display());
    println!("Log file:    {}", get_log_path().display());

    if !key_ok {
        println!(
            "{}",
            format!(
                "Set the {} environment variable to enable generation.",
                config.llm.api_key_env
            )
            .yellow()
        );
    }

    Ok(())
}
