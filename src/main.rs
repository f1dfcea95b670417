mod check;
mod config;
mod logging;
mod models;
mod prompts;

use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use crate::check::{CheckOptions, run_check};
use crate::config::Config;
use crate::models::ProviderClient;
use crate::prompts::AgentRole;

#[derive(Parser)]
#[command(
    name = "agentic",
    version,
    about = "Prompt templates for planner/architect/coder agents and a provider model lister"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the prompt for an agent role
    Prompt {
        /// Agent role to render the prompt for
        #[arg(value_enum)]
        role: AgentRole,
        /// Input text (user request, plan, or task). Read from stdin if omitted.
        text: Option<String>,
        /// Read the input text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// List the models available from the configured provider
    Models {
        /// Hide models the provider marks inactive
        #[arg(long)]
        active_only: bool,
    },
}

/// Resolves the prompt input from the argument, a file, or stdin.
fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(path) = file {
        return fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read prompt input from stdin")?;
    Ok(buf)
}

fn cmd_prompt(role: AgentRole, text: Option<String>, file: Option<PathBuf>) -> Result<ExitCode> {
    let input = read_input(text, file)?;
    debug!(role = role.label(), input_len = input.len(), "render_prompt");

    let rendered = role.render(&input);
    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn log_dotenv_result(result: &dotenvy::Result<PathBuf>) {
    match result {
        Ok(path) => debug!(path = %path.display(), "dotenv_loaded"),
        Err(e) if e.not_found() => debug!("no .env file"),
        Err(e) => warn!(error = %e, "dotenv_failed"),
    }
}

fn cmd_models(config: &Config, active_only: bool) -> Result<ExitCode> {
    let provider = &config.provider;
    let api_key = env::var(&provider.api_key_env).ok();
    let opts = CheckOptions {
        provider: &provider.name,
        key_env: &provider.api_key_env,
        active_only,
    };

    let mut stdout = io::stdout().lock();
    let outcome = run_check(&mut stdout, &opts, api_key.as_deref(), |key| {
        ProviderClient::from_config(provider, key)
    })?;
    stdout.flush()?;

    info!(?outcome, "models_command_done");
    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    // .env may carry AGENTIC_* overrides as well as the key, so load it before config.
    // Variables already set in the environment win.
    let dotenv_result = dotenvy::dotenv();
    let loaded_config = config::load_config();

    let logging_ctx = match logging::init(&loaded_config.config.logging.level) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    log_dotenv_result(&dotenv_result);
    config::log_load_result(&loaded_config);
    if let Some(ref ctx) = logging_ctx {
        logging::cleanup_old_logs(&ctx.log_directory);
    }

    let result = match cli.command {
        Commands::Prompt { role, text, file } => cmd_prompt(role, text, file),
        Commands::Models { active_only } => cmd_models(&loaded_config.config, active_only),
    };

    if let Some(ctx) = logging_ctx {
        info!(
            session_id = %ctx.session_id,
            duration_secs = start_time.elapsed().as_secs_f64(),
            "session_end"
        );
    }

    result
}
