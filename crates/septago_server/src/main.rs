//! Septago - unified CLI
//!
//! Runs the HTTP server or one of the offline puzzle tools.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use septago_core::{Geometry, list_puzzles, load_puzzle};
use septago_server::{AppState, GameSession, ServerConfig, logging, replay, router};
use std::io::BufReader;
use std::path::Path;
use tracing::{info, instrument};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = ServerConfig::load(&cli.config)?.with_process_env()?;
    logging::init(config.log_filter().as_deref())?;

    match cli.command {
        Command::Serve {
            host,
            port,
            puzzle_dir,
        } => run_server(config.with_overrides(host, port, puzzle_dir)).await,
        Command::List { puzzle_dir } => run_list(config.with_overrides(None, None, puzzle_dir)),
        Command::Validate { file } => run_validate(&file),
        Command::Replay { puzzle, events } => run_replay(&puzzle, &events),
    }
}

/// Run the HTTP server
#[instrument(skip_all, fields(addr = %config.bind_address()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    info!(puzzle_dir = %config.puzzle_dir().display(), "Starting Septago HTTP server");

    let app = router(AppState::new(config.puzzle_dir().clone()));
    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;

    info!("Server ready at http://{}/", config.bind_address());
    axum::serve(listener, app).await?;
    Ok(())
}

/// Print the puzzle directory listing
#[instrument(skip_all)]
fn run_list(config: ServerConfig) -> Result<()> {
    let summaries = list_puzzles(config.puzzle_dir());
    if summaries.is_empty() {
        info!(dir = %config.puzzle_dir().display(), "No puzzles found");
    }
    for summary in summaries {
        println!("{}\t{}\t{}", summary.filename, summary.id, summary.title);
    }
    Ok(())
}

/// Load a puzzle and report whether it is valid
#[instrument]
fn run_validate(file: &Path) -> Result<()> {
    let puzzle = load_puzzle(file, Geometry::septago())
        .with_context(|| format!("{} is not a valid puzzle", file.display()))?;
    println!(
        "OK: {} ({} hidden word{})",
        puzzle.puzzle_id(),
        puzzle.hidden_answers().len(),
        if puzzle.hidden_answers().len() == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Replay an event log and print the final props
#[instrument]
fn run_replay(puzzle: &Path, events: &Path) -> Result<()> {
    let puzzle = load_puzzle(puzzle, Geometry::septago())?;
    let file = std::fs::File::open(events)
        .with_context(|| format!("Failed to open event log {}", events.display()))?;

    let mut session = GameSession::new(replay_session_id(events), puzzle);
    let summary = replay(&mut session, BufReader::new(file))?;
    info!(?summary, "Replay complete");

    println!("{}", serde_json::to_string_pretty(&session.props())?);
    Ok(())
}

fn replay_session_id(events: &Path) -> String {
    match events.file_stem() {
        Some(stem) => format!("replay-{}", stem.to_string_lossy()),
        None => "replay".to_string(),
    }
}
