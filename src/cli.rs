use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about)]
pub struct Cli {
    /// A TOML configuration file - if omitted, the built-in defaults are used
    #[clap(long, value_parser, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Directory that saved games are written to and listed from
    #[clap(long, value_parser, value_name = "DIR")]
    pub games_dir: Option<PathBuf>,
    /// Maximum log level: off, error, warn, info, debug or trace
    #[clap(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
    #[clap(subcommand)]
    pub subcommand: Option<Subcommands>,
}

#[derive(Subcommand)]
pub enum Subcommands {
    /// Play a game at the terminal (the default)
    Play,
    /// Replay a saved game and print the final position
    Show {
        #[clap(value_name = "FILE")]
        file: PathBuf,
    },
    /// Replay a saved game, cross-checking the engine against the log replay at every ply
    Verify {
        #[clap(value_name = "FILE")]
        file: PathBuf,
    },
    /// List the saved games
    List,
    /// Count the legal move tree from the start position
    Perft {
        #[clap(value_name = "DEPTH")]
        depth: usize,
        /// Print the count below each root move
        #[clap(long)]
        divide: bool,
    },
}
