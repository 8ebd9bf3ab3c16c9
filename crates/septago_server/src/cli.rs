//! Command-line interface for septago.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Septago - 7×7 crossword server and tools
#[derive(Parser, Debug)]
#[command(name = "septago")]
#[command(about = "Septago crossword server and puzzle tools", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = septago_server::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory containing puzzle files
        #[arg(long)]
        puzzle_dir: Option<PathBuf>,
    },

    /// List puzzles in the puzzle directory
    List {
        /// Directory containing puzzle files
        #[arg(long)]
        puzzle_dir: Option<PathBuf>,
    },

    /// Check that a puzzle file is valid
    Validate {
        /// Puzzle file to check
        file: PathBuf,
    },

    /// Apply a JSON-lines event log to a puzzle and print the final props
    Replay {
        /// Puzzle file
        puzzle: PathBuf,

        /// Event log, one envelope per line
        events: PathBuf,
    },
}
