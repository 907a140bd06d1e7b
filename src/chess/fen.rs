use arrayvec::ArrayVec;

use crate::{
    chess::{
        board::Board,
        chessmove::CastleSide,
        piece::{Colour, Piece, PieceType},
        squareset::SquareSet,
        types::{File, Rank, Square},
    },
    errors::PlacementError,
};

/// Parses a placement string with an optional side-to-move field, such as
/// `"7k/8/6Q1/8/8/8/8/K7 b"`. Anything past the side field is ignored.
pub fn parse(text: &str) -> Result<(Board, Colour), PlacementError> {
    let mut tokens = text.split_whitespace();
    let board = Board::from_placement(tokens.next().unwrap_or(""))?;
    let turn = match tokens.next() {
        None | Some("w") => Colour::White,
        Some("b") => Colour::Black,
        Some(other) => return Err(PlacementError::InvalidSide(other.to_string())),
    };
    Ok((board, turn))
}

impl Board {
    /// Builds a board from the placement field of a FEN string.
    ///
    /// Castling rights are not encoded, so kings and rooks standing on their
    /// home squares are taken to be unmoved and all others are marked as moved.
    pub fn from_placement(board_str: &str) -> Result<Self, PlacementError> {
        let mut out = Self::empty();

        let mut ranks = ArrayVec::<&str, 8>::new();
        let mut board_parts = board_str.split('/');
        while let Some(rank) = board_parts.next() {
            if ranks.try_push(rank).is_err() {
                // 8 successfully parse, plus one now, plus the rest.
                return Err(PlacementError::BoardSegments(8 + 1 + board_parts.count()));
            }
        }
        if ranks.len() != 8 {
            return Err(PlacementError::BoardSegments(ranks.len()));
        }

        for (rank, rank_str) in Rank::all().rev().zip(ranks) {
            let mut squares_in_rank = 0u8;
            let mut prev_was_digit = false;
            for c in rank_str.chars() {
                if let Some(count) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    if prev_was_digit {
                        return Err(PlacementError::AdjacentDigits);
                    }
                    prev_was_digit = true;
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        squares_in_rank += count as u8;
                    }
                    if squares_in_rank > 8 {
                        return Err(PlacementError::BadSquaresInSegment);
                    }
                    continue;
                }
                let piece = Piece::from_char(c).ok_or(PlacementError::UnexpectedCharacter(c))?;
                prev_was_digit = false;
                let file = File::from_index(squares_in_rank).ok_or(PlacementError::BadSquaresInSegment)?;
                squares_in_rank += 1;
                let sq = file.with(rank);
                out.set(sq, Some(mark_if_displaced(piece, sq)));
            }
            if squares_in_rank != 8 {
                return Err(PlacementError::BadSquaresInSegment);
            }
        }

        // pawns are on sensible squares
        if SquareSet::BACK_RANKS
            .iter()
            .any(|sq| out.get(sq).is_some_and(|p| p.piece_type() == PieceType::Pawn))
        {
            return Err(PlacementError::PawnsOnBackranks);
        }

        // check king counts
        for colour in Colour::all() {
            let count = out.pieces(colour).filter(|(_, p)| p.piece_type() == PieceType::King).count();
            if count != 1 {
                return Err(PlacementError::KingCount { colour, count });
            }
        }

        Ok(out)
    }

    /// The placement field for this board.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(71);
        for rank in Rank::all().rev() {
            let mut gap = 0;
            for file in File::all() {
                match self.get(file.with(rank)) {
                    Some(piece) => {
                        if gap > 0 {
                            out.push_str(&gap.to_string());
                            gap = 0;
                        }
                        out.push(piece.char());
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                out.push_str(&gap.to_string());
            }
            if rank != Rank::One {
                out.push('/');
            }
        }
        out
    }
}

fn mark_if_displaced(piece: Piece, sq: Square) -> Piece {
    let colour = piece.colour();
    let home = match piece.piece_type() {
        PieceType::King => sq == CastleSide::King.king_from(colour),
        PieceType::Rook => {
            sq == CastleSide::King.rook_from(colour) || sq == CastleSide::Queen.rook_from(colour)
        }
        _ => true,
    };
    if home { piece } else { piece.moved() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    #[test]
    fn parse_startpos() {
        let board = Board::from_placement(STARTPOS).unwrap();
        assert_eq!(board, Board::startpos());
        assert_eq!(board.placement(), STARTPOS);
    }

    #[test]
    fn placement_round_trips() {
        for text in ["7k/8/6Q1/8/8/8/8/K7", "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R"] {
            assert_eq!(Board::from_placement(text).unwrap().placement(), text);
        }
    }

    #[test]
    fn parse_bad_segments() {
        assert_eq!(
            Board::from_placement("8/8/8/8/8/8/8/8/8"),
            Err(PlacementError::BoardSegments(9))
        );
        assert_eq!(Board::from_placement("8/8/8"), Err(PlacementError::BoardSegments(3)));
        assert_eq!(
            Board::from_placement("4k3/8/8/8/8/8/8/4K4"),
            Err(PlacementError::BadSquaresInSegment)
        );
        assert_eq!(
            Board::from_placement("4k3/8/8/8/8/8/8/4K2"),
            Err(PlacementError::BadSquaresInSegment)
        );
        assert_eq!(
            Board::from_placement("4k3/8/8/8/8/8/8/4K12"),
            Err(PlacementError::AdjacentDigits)
        );
        assert_eq!(
            Board::from_placement("4k3/8/8/8/8/8/8/4X3"),
            Err(PlacementError::UnexpectedCharacter('X'))
        );
    }

    #[test]
    fn reject_broken_positions() {
        assert_eq!(
            Board::from_placement("4k3/8/8/8/8/8/8/P3K3"),
            Err(PlacementError::PawnsOnBackranks)
        );
        assert_eq!(
            Board::from_placement("4k3/8/8/8/8/8/8/8"),
            Err(PlacementError::KingCount { colour: Colour::White, count: 0 })
        );
        assert_eq!(
            Board::from_placement("4k2k/8/8/8/8/8/8/4K3"),
            Err(PlacementError::KingCount { colour: Colour::Black, count: 2 })
        );
    }

    #[test]
    fn displaced_kings_and_rooks_are_marked_moved() {
        let board = Board::from_placement("4k2r/8/8/8/8/8/8/R5K1").unwrap();
        assert!(!board.get(Square::E8).unwrap().has_moved());
        assert!(!board.get(Square::H8).unwrap().has_moved());
        assert!(!board.get(Square::A1).unwrap().has_moved());
        assert!(board.get(Square::G1).unwrap().has_moved());
    }

    #[test]
    fn side_to_move_field() {
        let (_, turn) = parse("7k/8/6Q1/8/8/8/8/K7 b").unwrap();
        assert_eq!(turn, Colour::Black);
        let (_, turn) = parse("7k/8/6Q1/8/8/8/8/K7").unwrap();
        assert_eq!(turn, Colour::White);
        assert_eq!(
            parse("7k/8/6Q1/8/8/8/8/K7 W"),
            Err(PlacementError::InvalidSide("W".to_string()))
        );
        assert_eq!(parse(""), Err(PlacementError::BoardSegments(1)));
    }
}
