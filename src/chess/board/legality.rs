use arrayvec::ArrayVec;

use crate::{
    chess::{
        board::{Board, movegen::Destinations},
        chessmove::Move,
        piece::{Colour, Piece, PieceType},
        types::Square,
    },
    errors::EngineError,
};

/// A trial mutation of a board that is undone when the guard is dropped.
///
/// Every cell the mutation can touch is snapshotted up front, so rollback runs
/// on every exit path, including an error from the mutation itself. The guard
/// holds the board mutably for its whole lifetime, so no other query can see
/// the intermediate state.
pub struct Trial<'a> {
    board: &'a mut Board,
    saved: ArrayVec<(Square, Option<Piece>), 4>,
}

impl<'a> Trial<'a> {
    pub fn new(board: &'a mut Board, m: Move) -> Result<Self, EngineError> {
        let saved = m.touched_squares().into_iter().map(|sq| (sq, board.get(sq))).collect();
        let trial = Self { board, saved };
        trial.board.apply_move(m)?;
        Ok(trial)
    }

    /// Takes the piece on `sq` off the board for the lifetime of the guard.
    pub fn lift(board: &'a mut Board, sq: Square) -> Self {
        let mut saved = ArrayVec::new();
        saved.push((sq, board.get(sq)));
        board.set(sq, None);
        Self { board, saved }
    }

    pub fn board(&self) -> &Board {
        self.board
    }
}

impl Drop for Trial<'_> {
    fn drop(&mut self) {
        for &(sq, piece) in self.saved.iter().rev() {
            self.board.set(sq, piece);
        }
    }
}

impl Board {
    /// Whether `m` leaves `colour`'s king unattacked. A move the board cannot
    /// execute at all is illegal.
    pub fn is_legal(&mut self, m: Move, colour: Colour) -> bool {
        Trial::new(self, m).is_ok_and(|trial| !trial.board().in_check(colour))
    }

    /// Pseudo-legal destinations from `from` that survive the king-safety trial.
    pub fn legal_destinations(
        &mut self,
        from: Square,
        turn: Colour,
        ep: Option<Square>,
    ) -> Destinations {
        let mut out = Destinations::new();
        for to in self.pseudo_legal_destinations(from, turn, ep) {
            let Ok(m) = self.classify(from, to, ep, None) else {
                continue;
            };
            if self.is_legal(m, turn) {
                out.push(to);
            }
        }
        out
    }

    /// Whether the piece on `sq` is absolutely pinned to its own king.
    ///
    /// Derived on demand: lift the piece and see if that uncovers an attack on
    /// a king that was safe with the piece in place.
    pub fn is_pinned(&mut self, sq: Square) -> bool {
        let Some(piece) = self.get(sq) else {
            return false;
        };
        if piece.piece_type() == PieceType::King || self.in_check(piece.colour()) {
            return false;
        }
        let trial = Trial::lift(self, sq);
        trial.board().in_check(piece.colour())
    }
}
