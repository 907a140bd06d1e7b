//! Move-log replay: an independent reconstruction of a game from its
//! algebraic log, used to cross-check the live engine.

pub mod interpret;
pub mod notation;
pub mod position;

use crate::{
    chess::{
        piece::{Piece, PieceType},
        types::Square,
    },
    replay::{interpret::Replayed, notation::Notation},
};

/// A flat, ordered log of moves in minimal algebraic notation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveHistory {
    entries: Vec<String>,
}

impl MoveHistory {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Splits a log on commas and whitespace.
    pub fn parse(log: &str) -> Self {
        let entries = log
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();
        Self { entries }
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folds the log from the initial position.
    ///
    /// Unreadable tokens are dropped without using up a ply. A readable entry
    /// that cannot be applied leaves the position as it was but still passes
    /// the turn.
    pub fn reconstruct(&self) -> Replayed {
        let mut state = Replayed::new();
        for (index, entry) in self.entries.iter().enumerate() {
            let notation = match entry.parse::<Notation>() {
                Ok(notation) => notation,
                Err(e) => {
                    tracing::debug!(index, %entry, error = %e, "skipping malformed log entry");
                    continue;
                }
            };
            if let Err(e) = state.apply(&notation) {
                tracing::debug!(index, %entry, error = %e, "log entry is inapplicable");
                state.skip_ply();
            }
        }
        state
    }

    /// Validates a prospective move against the position this log describes.
    pub fn is_valid_move(&self, from: Square, piece_type: PieceType, piece: Piece, to: Square) -> bool {
        self.reconstruct().is_valid_move(from, piece_type, piece, to)
    }
}

impl<S: Into<String>> FromIterator<S> for MoveHistory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(Into::into).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::piece::Colour;

    #[test]
    fn separators() {
        let history = MoveHistory::parse("e4, e5\nNf3 Nc6,,Bb5");
        assert_eq!(history.entries(), &["e4", "e5", "Nf3", "Nc6", "Bb5"]);
        assert!(MoveHistory::parse("  \n, ").is_empty());
    }

    #[test]
    fn move_numbers_are_skipped() {
        let numbered = MoveHistory::parse("1. e4 e5 2. Nf3");
        let plain = MoveHistory::parse("e4 e5 Nf3");
        assert_eq!(numbered.len(), 5);
        assert_eq!(numbered.reconstruct(), plain.reconstruct());
    }

    #[test]
    fn inapplicable_entry_passes_the_turn() {
        let history = MoveHistory::parse("e4,Qh4,d4");
        let state = history.reconstruct();
        assert_eq!(state.side_to_move, Colour::Black);
        assert!(state.position.get(Square::D4).is_some_and(|(_, c)| c == Colour::White));
        assert!(state.position.get(Square::D8).is_some(), "the queen never moved");
    }

    #[test]
    fn validates_against_the_log() {
        let mut history = MoveHistory::new();
        for entry in ["f3", "e5", "g4"] {
            history.push(entry);
        }
        let queen = Piece::new(Colour::Black, PieceType::Queen);
        assert!(history.is_valid_move(Square::D8, PieceType::Queen, queen, Square::H4));
        assert!(!history.is_valid_move(Square::D8, PieceType::Queen, queen, Square::D4));
        let collected: MoveHistory = ["f3", "e5", "g4"].into_iter().collect();
        assert_eq!(collected, history);
    }
}
