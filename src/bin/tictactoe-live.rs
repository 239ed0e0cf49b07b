//! tictactoe-live CLI - Live games against learning agents
//!
//! This CLI provides:
//! - `serve`: the WebSocket server for live games and background training
//! - `train`: offline training against the teacher or by self-play
//! - `play`: a terminal game against a saved agent

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tictactoe_live::{
    app::AppConfig,
    cli::{
        self,
        commands::{play, serve, train},
    },
};

#[derive(Parser)]
#[command(name = "tictactoe-live")]
#[command(version, about = "Tic-tac-toe against reinforcement-learning agents", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve live games and training over WebSocket
    Serve(serve::ServeArgs),

    /// Train an agent and save it
    Train(train::TrainArgs),

    /// Play against an agent in the terminal
    Play(play::PlayArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => serve::execute(args, config),
        Commands::Train(args) => train::execute(args, config),
        Commands::Play(args) => play::execute(args, config),
    }
}
