#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Arbiter, a chess rules engine with a move-log replay validator.

mod cli;

use std::io::{BufRead, Write};

use anyhow::Context;
use arbiter::{
    config::Config,
    crosscheck, perft,
    play::{Control, HELP, Session},
    savefile,
};

/// The name of the program.
pub static NAME: &str = "Arbiter";
/// The version of the program.
pub static VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    let cli = <cli::Cli as clap::Parser>::parse();
    let config = Config::resolve(cli.config.as_deref(), cli.games_dir, cli.log_level)?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(config.level_filter()?)
        .init();
    tracing::debug!(?config, "configuration loaded");

    match cli.subcommand {
        None | Some(cli::Subcommands::Play) => main_loop(&config),
        Some(cli::Subcommands::Show { file }) => {
            let mut game = savefile::load(&file)?;
            println!("{game}");
            println!("{}", game.algebraic_log().join(" "));
            if let Some(result) = game.result_message() {
                println!("{result}");
            }
            Ok(())
        }
        Some(cli::Subcommands::Verify { file }) => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let moves = text.lines().map(str::trim).filter(|line| !line.is_empty());
            let game = crosscheck::check_game(moves)
                .with_context(|| format!("{} failed cross-validation", file.display()))?;
            println!("{}: {} plies, engine and replay agree", file.display(), game.history().len());
            Ok(())
        }
        Some(cli::Subcommands::List) => {
            for path in savefile::list(&config.games_dir)? {
                println!("{}", path.display());
            }
            Ok(())
        }
        Some(cli::Subcommands::Perft { depth, divide }) => {
            let game = arbiter::chess::game::Game::new();
            if divide {
                for (m, nodes) in perft::divide(&game, depth) {
                    println!("{m}: {nodes}");
                }
            }
            let start = std::time::Instant::now();
            let nodes = perft::perft(&game, depth);
            let elapsed = start.elapsed();
            println!("perft({depth}) = {nodes} in {}ms", elapsed.as_millis());
            Ok(())
        }
    }
}

fn main_loop(config: &Config) -> anyhow::Result<()> {
    println!("{NAME} {VERSION}, type `help` for commands");
    let mut session = Session::new(config.games_dir.clone());
    println!("{}", session.game());

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;

        match session.handle(line.trim()) {
            Ok(Control::Continue(reply)) if reply.is_empty() => {}
            Ok(Control::Continue(reply)) => println!("{reply}"),
            Ok(Control::Quit) => break,
            Err(e) => {
                println!("Error: {e}");
                if matches!(e, arbiter::errors::CommandError::UnknownCommand(_)) {
                    println!("{HELP}");
                }
            }
        }
    }
    Ok(())
}
