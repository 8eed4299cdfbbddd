//! first-agent entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse the command line
//!   3. Load config and snapshot the environment
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Run the subcommand, racing it against Ctrl-C

use std::io::Write;

use clap::Parser;
use tracing::{debug, info};

use first_agent::bootstrap::logger;
use first_agent::cli::{Cli, Command};
use first_agent::error::AppError;
use first_agent::{commands, config};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present. The file is optional.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?;

    let cli_level = logger::level_for_verbosity(cli.verbose);
    let effective_log_level = cli_level.unwrap_or(config.log_level.as_str());
    let log_file = cli.log_file.clone().or_else(|| config.log_file.clone());

    logger::init(effective_log_level, cli_level.is_some(), log_file.as_deref())?;

    info!(
        agent = %config.agent_name,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        llm_provider = %config.llm.provider,
        search_provider = %config.search.provider,
        "config loaded"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let outcome = tokio::select! {
        res = dispatch(&config, cli.command, &mut out) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received, aborting");
            Err(AppError::Interrupted)
        }
    };
    out.flush()?;
    debug!(ok = outcome.is_ok(), "command finished");
    outcome
}

async fn dispatch(
    config: &config::Config,
    command: Command,
    out: &mut impl Write,
) -> Result<(), AppError> {
    match command {
        Command::Check { ping } => commands::check(config, ping, out).await,
        Command::Search { query, max_results } => {
            commands::search(config, &query, max_results, out).await
        }
        Command::Ask { question } => commands::ask(config, &question, out).await,
        Command::Extract { url, output_dir, timeout } => {
            commands::extract(config, &url, output_dir, timeout, out).await
        }
    }
}
