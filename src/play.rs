//! The interactive text session behind `arbiter play`.

use std::{
    fmt::Write,
    path::{Path, PathBuf},
};

use crate::{
    chess::{chessmove::MoveRequest, game::Game, types::Square},
    errors::CommandError,
    savefile,
};

pub const HELP: &str = "\
commands:
  <from><to>[q|r|b|n]  play a move, e.g. e2e4 or a7a8n
  moves <square>       list the legal destinations of a piece
  board                show the position
  log                  show the moves played so far
  save                 save the game
  list                 list saved games
  load <path>          load a saved game
  resign               the side to move resigns
  draw                 agree a draw
  new                  start a new game
  quit                 leave";

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Continue(String),
    Quit,
}

/// A game in progress plus the place it gets saved to.
pub struct Session {
    game: Game,
    games_dir: PathBuf,
    result: Option<String>,
}

impl Session {
    pub fn new(games_dir: impl Into<PathBuf>) -> Self {
        Self { game: Game::new(), games_dir: games_dir.into(), result: None }
    }

    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// The end-of-game message, once the game has ended.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn handle(&mut self, line: &str) -> Result<Control, CommandError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Control::Continue(String::new()));
        };
        let argument = words.next();

        let reply = match command {
            "quit" | "exit" => return Ok(Control::Quit),
            "help" => HELP.to_string(),
            "board" => self.game.to_string(),
            "new" => {
                self.game = Game::new();
                self.result = None;
                self.game.to_string()
            }
            "moves" => {
                let sq: Square = argument.ok_or(CommandError::Usage("moves <square>"))?.parse()?;
                let mut destinations = self.game.legal_destinations(sq);
                destinations.sort();
                let names: Vec<String> = destinations.iter().map(ToString::to_string).collect();
                if names.is_empty() { format!("{sq}: no legal moves") } else { format!("{sq}: {}", names.join(" ")) }
            }
            "log" => numbered(&self.game.algebraic_log()),
            "save" => match savefile::save(&self.games_dir, &self.game.coordinate_log()) {
                Ok(Some(path)) => format!("saved to {}", path.display()),
                Ok(None) => "nothing to save".to_string(),
                Err(e) => return Err(CommandError::Storage(format!("{e:#}"))),
            },
            "list" => {
                let files = savefile::list(&self.games_dir).map_err(|e| CommandError::Storage(format!("{e:#}")))?;
                if files.is_empty() {
                    format!("no saved games in {}", self.games_dir.display())
                } else {
                    files.iter().map(|path| path.display().to_string()).collect::<Vec<_>>().join("\n")
                }
            }
            "load" => {
                let path = argument.ok_or(CommandError::Usage("load <path>"))?;
                self.load(Path::new(path))?
            }
            "resign" => {
                self.ensure_ongoing()?;
                let loser = self.game.turn();
                self.finish(format!("{} wins by resignation", loser.flip()))
            }
            "draw" => {
                self.ensure_ongoing()?;
                self.finish("Draw agreed".to_string())
            }
            text => self.play(text)?,
        };
        Ok(Control::Continue(reply))
    }

    fn ensure_ongoing(&self) -> Result<(), CommandError> {
        if self.result.is_some() { Err(CommandError::GameOver) } else { Ok(()) }
    }

    fn finish(&mut self, message: String) -> String {
        tracing::info!(%message, "game over");
        self.result = Some(message.clone());
        message
    }

    fn load(&mut self, path: &Path) -> Result<String, CommandError> {
        let game = savefile::load(path).map_err(|e| CommandError::Storage(format!("{e:#}")))?;
        self.game = game;
        self.result = self.game.result_message();
        let mut reply = format!("loaded {} moves from {}\n{}", self.game.history().len(), path.display(), self.game);
        if let Some(result) = &self.result {
            let _ = write!(reply, "\n{result}");
        }
        Ok(reply)
    }

    fn play(&mut self, text: &str) -> Result<String, CommandError> {
        let request: MoveRequest = match text.parse() {
            Ok(request) => request,
            Err(e) if text.chars().count() > 5 || !text.starts_with(|c: char| c.is_ascii_lowercase()) => {
                tracing::trace!(error = %e, "not a move");
                return Err(CommandError::UnknownCommand(text.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        self.ensure_ongoing()?;
        self.game.apply(request.from, request.to, request.promotion)?;
        let san = self.game.algebraic_log().pop().unwrap_or_default();
        let mut reply = format!("{san}\n{}", self.game);
        if let Some(message) = self.game.result_message() {
            reply.push('\n');
            reply.push_str(&self.finish(message));
        }
        Ok(reply)
    }
}

/// `1. e4 e5` style rendering of an algebraic log.
fn numbered(log: &[String]) -> String {
    log.chunks(2)
        .enumerate()
        .map(|(i, pair)| format!("{}. {}", i + 1, pair.join(" ")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(std::env::temp_dir().join(format!("arbiter-session-{}", std::process::id())))
    }

    fn reply(session: &mut Session, line: &str) -> String {
        match session.handle(line) {
            Ok(Control::Continue(text)) => text,
            other => panic!("{line:?} gave {other:?}"),
        }
    }

    #[test]
    fn moves_and_listing() {
        let mut s = session();
        assert_eq!(reply(&mut s, "moves g1"), "g1: f3 h3");
        assert_eq!(reply(&mut s, "moves e8"), "e8: no legal moves");
        assert!(reply(&mut s, "e2e4").starts_with("e4\n"));
        assert!(reply(&mut s, "e7e5").starts_with("e5\n"));
        assert!(reply(&mut s, "g1f3").starts_with("Nf3\n"));
        assert_eq!(reply(&mut s, "log"), "1. e4 e5\n2. Nf3");
        assert_eq!(s.handle(""), Ok(Control::Continue(String::new())));
        assert_eq!(s.handle("quit"), Ok(Control::Quit));
    }

    #[test]
    fn errors_leave_the_session_usable() {
        let mut s = session();
        assert_eq!(s.handle("e2e5"), Err(CommandError::Engine(crate::errors::EngineError::IllegalDestination {
            from: Square::E2,
            to: Square::E5,
        })));
        assert!(matches!(s.handle("e7e5"), Err(CommandError::Engine(_))), "not black's turn");
        assert!(matches!(s.handle("e2e9"), Err(CommandError::MoveParse(_))));
        assert!(matches!(s.handle("castle"), Err(CommandError::UnknownCommand(_))));
        assert!(matches!(s.handle("moves"), Err(CommandError::Usage(_))));
        assert!(matches!(s.handle("moves z9"), Err(CommandError::Engine(_))));
        assert!(s.game().history().is_empty());
        assert!(reply(&mut s, "e2e4").starts_with("e4"));
    }

    #[test]
    fn promotion_suffix_needs_a_promoting_move() {
        let mut s = session();
        assert_eq!(
            s.handle("e2e4q"),
            Err(CommandError::Engine(crate::errors::EngineError::InvalidPromotion(
                crate::chess::piece::PieceType::Queen
            )))
        );
        assert!(s.game().history().is_empty());
        assert!(reply(&mut s, "e2e4").starts_with("e4\n"));
    }

    #[test]
    fn mate_ends_the_game() {
        let mut s = session();
        for mv in ["f2f3", "e7e5", "g2g4"] {
            reply(&mut s, mv);
        }
        let last = reply(&mut s, "d8h4");
        assert!(last.starts_with("Qh4#"));
        assert!(last.ends_with("Black wins by checkmate"));
        assert_eq!(s.result(), Some("Black wins by checkmate"));
        assert_eq!(s.handle("a2a3"), Err(CommandError::GameOver));
        assert_eq!(s.handle("resign"), Err(CommandError::GameOver));
        reply(&mut s, "new");
        assert_eq!(s.result(), None);
        assert!(reply(&mut s, "a2a3").starts_with("a3"));
    }

    #[test]
    fn resignation_and_draws() {
        let mut s = session();
        reply(&mut s, "e2e4");
        assert_eq!(reply(&mut s, "resign"), "White wins by resignation");
        reply(&mut s, "new");
        assert_eq!(reply(&mut s, "draw"), "Draw agreed");
    }

    #[test]
    fn save_and_load() {
        let dir = std::env::temp_dir().join(format!("arbiter-session-save-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut s = Session::new(&dir);
        assert_eq!(reply(&mut s, "save"), "nothing to save");
        assert_eq!(reply(&mut s, "list"), format!("no saved games in {}", dir.display()));
        reply(&mut s, "e2e4");
        reply(&mut s, "e7e5");
        let saved = reply(&mut s, "save");
        let path = saved.trim_start_matches("saved to ").to_string();
        assert_eq!(reply(&mut s, "list"), path);

        let mut fresh = Session::new(&dir);
        assert!(reply(&mut fresh, &format!("load {path}")).starts_with("loaded 2 moves"));
        assert_eq!(fresh.game().coordinate_log(), ["e2e4", "e7e5"]);
        assert!(matches!(fresh.handle("load"), Err(CommandError::Usage(_))));
        assert!(matches!(fresh.handle("load /nonexistent/x.chess"), Err(CommandError::Storage(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
