//! Command-line interface for strictly_battleship.

use clap::Parser;

/// Strictly Battleship - two-player battleship coordinator
#[derive(Parser, Debug)]
#[command(name = "strictly_battleship")]
#[command(about = "Pairs two players by game id and relays battleship moves", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Address to listen on (`:PORT` binds every interface)
    #[arg(short, long, env = "GAMEADDR")]
    pub addr: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,
}
