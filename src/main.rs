// trinity - Matrix-styled terminal chat client
//
// Sends user text to an OpenAI-style chat completions API and rains the
// reply down the screen before settling it into place.
//
// Architecture:
// - TUI (ratatui/crossterm): input bar + rain pane, tokio::select! loop
// - Rain (animator + grid): time-boxed character-reveal animation
// - Session: conversation turns, input history, transcript dump
// - LLM client (reqwest): one completion request per turn, on a
//   background task, handed back through a oneshot channel

mod cli;
mod commands;
mod config;
mod demo;
mod llm;
mod rain;
mod session;
mod theme;
mod tui;

use anyhow::Result;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI subcommands first (config --show, --reset, --edit, --path)
    let Some(demo_flag) = cli::handle_cli() else {
        return Ok(());
    };

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    if demo_flag {
        config.demo_mode = true;
    }

    // Missing credential is fatal, reported before the terminal is touched
    if config.api_key.is_none() && !config.demo_mode {
        eprintln!("OPENAI_API_KEY is not set.");
        eprintln!("Export it and run again, e.g.: export OPENAI_API_KEY=sk-...");
        eprintln!("To look around without a key: trinity --demo");
        std::process::exit(1);
    }

    // The TUI owns the terminal, so logs go to rotating files when enabled
    // and are discarded otherwise.
    //
    // Precedence: RUST_LOG env var > config file > default "info"
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("trinity={}", config.logging.level).into());

    // The guard must be kept alive for the duration of the program to
    // ensure logs flush
    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard> =
        if config.logging.file_enabled {
            match std::fs::create_dir_all(&config.logging.file_dir) {
                Ok(()) => {
                    let file_appender =
                        tracing_appender::rolling::daily(&config.logging.file_dir, "trinity.log");
                    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(
                            tracing_subscriber::fmt::layer()
                                .with_writer(non_blocking)
                                .with_ansi(false),
                        )
                        .init();
                    Some(guard)
                }
                Err(e) => {
                    eprintln!(
                        "Warning: could not create log directory {:?}: {}",
                        config.logging.file_dir, e
                    );
                    tracing_subscriber::registry().with(filter).init();
                    None
                }
            }
        } else {
            tracing_subscriber::registry().with(filter).init();
            None
        };

    tracing::info!(
        version = config::VERSION,
        model = %config.model,
        demo = config.demo_mode,
        "starting trinity"
    );

    tui::run_tui(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
