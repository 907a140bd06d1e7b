use std::fmt::Display;

use crate::chess::{
    board::Board,
    chessmove::Move,
    piece::{Piece, PieceType},
    squareset::SquareSet,
};

/// Algebraic rendering of a move, evaluated against the position before the
/// move is made. The check suffix depends on the position after the move, so
/// it is left to the caller.
#[derive(Clone, Copy)]
pub struct SanThunk<'a> {
    board: &'a Board,
    m: Move,
    moved_piece: Piece,
}

impl SanThunk<'_> {
    /// Other pieces of the same kind and colour that could also reach the
    /// destination by movement pattern.
    fn rivals(&self) -> SquareSet {
        let Self { board, m, moved_piece } = *self;
        board
            .pieces(moved_piece.colour())
            .filter(|&(sq, p)| sq != m.from() && p.piece_type() == moved_piece.piece_type())
            .filter(|&(sq, _)| {
                board.pseudo_legal_destinations(sq, moved_piece.colour(), None).contains(&m.to())
            })
            .map(|(sq, _)| sq)
            .collect()
    }
}

impl Display for SanThunk<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self { board, m, moved_piece } = *self;
        if let Move::Castle { side, .. } = m {
            return write!(f, "{}", side.notation());
        }
        let to_sq = m.to();
        let from = m.from();
        let is_capture = m.is_ep() || !board.is_empty(to_sq);
        let piece_type = moved_piece.piece_type();

        if let Some(letter) = piece_type.san_letter() {
            write!(f, "{letter}")?;
            let rivals = self.rivals();
            if !rivals.is_empty() {
                let shares_file = rivals.iter().any(|sq| sq.file() == from.file());
                let shares_rank = rivals.iter().any(|sq| sq.rank() == from.rank());
                if !shares_file {
                    write!(f, "{}", from.file().char())?;
                } else if !shares_rank {
                    write!(f, "{}", from.rank().char())?;
                } else {
                    write!(f, "{from}")?;
                }
            }
        } else if is_capture {
            write!(f, "{}", from.file().char())?;
        }

        if is_capture {
            write!(f, "x")?;
        }
        write!(f, "{to_sq}")?;

        if let Some(promo) = m.promotion().and_then(PieceType::san_letter) {
            write!(f, "={promo}")?;
        }
        Ok(())
    }
}

impl Board {
    /// Algebraic notation for `m` in this position, or `None` if there is
    /// nothing on the move's origin square.
    pub fn san(&self, m: Move) -> Option<SanThunk<'_>> {
        let moved_piece = self.get(m.from())?;
        Some(SanThunk { board: self, m, moved_piece })
    }
}
