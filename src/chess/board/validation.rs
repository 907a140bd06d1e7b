use crate::{
    chess::{
        board::Board,
        chessmove::CastleSide,
        piece::{Colour, PieceType},
        squareset::SquareSet,
    },
    errors::PositionValidityError,
};

impl Board {
    /// Audits the structural invariants of a position reached through play.
    pub fn check_validity(&self) -> Result<(), PositionValidityError> {
        // check there is exactly one king for each side
        for colour in Colour::all() {
            let kings = self
                .pieces(colour)
                .filter(|(_, p)| p.piece_type() == PieceType::King)
                .count();
            if kings != 1 {
                return Err(format!("{colour} king count is corrupt: expected 1, got {kings}"));
            }
        }

        // check there are no pawns on the back ranks
        for sq in SquareSet::BACK_RANKS {
            if let Some(piece) = self.get(sq).filter(|p| p.piece_type() == PieceType::Pawn) {
                return Err(format!("{piece:?} found on back rank square {sq}"));
            }
        }

        // kings and rooks away from home must be flagged as moved
        for colour in Colour::all() {
            let homes = [
                CastleSide::King.king_from(colour),
                CastleSide::King.rook_from(colour),
                CastleSide::Queen.rook_from(colour),
            ];
            for (sq, piece) in self.pieces(colour) {
                let tracked = matches!(piece.piece_type(), PieceType::King | PieceType::Rook);
                if tracked && !piece.has_moved() && !homes.contains(&sq) {
                    return Err(format!(
                        "{piece:?} on {sq} is away from home but not marked as moved"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{piece::Piece, types::Square};

    #[test]
    fn startpos_is_valid() {
        assert_eq!(Board::startpos().check_validity(), Ok(()));
    }

    #[test]
    fn king_count_is_checked() {
        let mut board = Board::startpos();
        board.set(Square::E8, None);
        assert!(board.check_validity().is_err());
        let mut board = Board::startpos();
        board.set(Square::E4, Some(Piece::new(Colour::White, PieceType::King).moved()));
        assert!(board.check_validity().is_err());
    }

    #[test]
    fn back_rank_pawns_are_rejected() {
        let mut board = Board::startpos();
        board.set(Square::B8, Some(Piece::new(Colour::White, PieceType::Pawn)));
        let err = board.check_validity().unwrap_err();
        assert!(err.contains("b8"), "message should name the square: {err}");
    }

    #[test]
    fn unflagged_wandering_rook_is_rejected() {
        let mut board = Board::startpos();
        board.set(Square::A1, None);
        board.set(Square::A4, Some(Piece::new(Colour::White, PieceType::Rook)));
        assert!(board.check_validity().is_err());
        board.set(Square::A4, Some(Piece::new(Colour::White, PieceType::Rook).moved()));
        assert_eq!(board.check_validity(), Ok(()));
    }
}
