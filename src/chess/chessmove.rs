use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use arrayvec::ArrayVec;

use crate::{
    chess::{
        piece::{Colour, PieceType},
        types::{File, Rank, Square},
    },
    errors::MoveParseError,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub const fn king_from(self, colour: Colour) -> Square {
        Square::from_rank_file(Rank::back(colour), File::E)
    }

    pub const fn king_to(self, colour: Colour) -> Square {
        let file = match self {
            Self::King => File::G,
            Self::Queen => File::C,
        };
        Square::from_rank_file(Rank::back(colour), file)
    }

    pub const fn rook_from(self, colour: Colour) -> Square {
        let file = match self {
            Self::King => File::H,
            Self::Queen => File::A,
        };
        Square::from_rank_file(Rank::back(colour), file)
    }

    pub const fn rook_to(self, colour: Colour) -> Square {
        let file = match self {
            Self::King => File::F,
            Self::Queen => File::D,
        };
        Square::from_rank_file(Rank::back(colour), file)
    }

    /// The side whose king destination is `to`, if `from -> to` is a castling king move.
    pub fn from_king_move(colour: Colour, from: Square, to: Square) -> Option<Self> {
        [Self::King, Self::Queen]
            .into_iter()
            .find(|side| side.king_from(colour) == from && side.king_to(colour) == to)
    }

    pub const fn notation(self) -> &'static str {
        match self {
            Self::King => "O-O",
            Self::Queen => "O-O-O",
        }
    }
}

/// A fully-classified move.
///
/// Captures share the `Normal` representation: whether a piece is taken is
/// decided by the occupancy of `to` when the move is applied.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Move {
    Normal {
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    },
    EnPassant {
        from: Square,
        to: Square,
        captured: Square,
    },
    Castle {
        colour: Colour,
        side: CastleSide,
    },
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Self::Normal { from, to, promotion: None }
    }

    pub const fn new_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        Self::Normal { from, to, promotion: Some(promotion) }
    }

    pub const fn from(self) -> Square {
        match self {
            Self::Normal { from, .. } | Self::EnPassant { from, .. } => from,
            Self::Castle { colour, side } => side.king_from(colour),
        }
    }

    pub const fn to(self) -> Square {
        match self {
            Self::Normal { to, .. } | Self::EnPassant { to, .. } => to,
            Self::Castle { colour, side } => side.king_to(colour),
        }
    }

    pub const fn promotion(self) -> Option<PieceType> {
        match self {
            Self::Normal { promotion, .. } => promotion,
            _ => None,
        }
    }

    pub const fn is_ep(self) -> bool {
        matches!(self, Self::EnPassant { .. })
    }

    /// Every cell whose content the move can change.
    pub fn touched_squares(self) -> ArrayVec<Square, 4> {
        let mut out = ArrayVec::new();
        match self {
            Self::Normal { from, to, .. } => {
                out.push(from);
                out.push(to);
            }
            Self::EnPassant { from, to, captured } => {
                out.push(from);
                out.push(to);
                out.push(captured);
            }
            Self::Castle { colour, side } => {
                out.push(side.king_from(colour));
                out.push(side.king_to(colour));
                out.push(side.rook_from(colour));
                out.push(side.rook_to(colour));
            }
        }
        out
    }
}

/// Coordinate form, `e2e4` / `e7e8n`. Castling prints as the king's two-file step.
impl Display for Move {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(pchar) = self.promotion().and_then(PieceType::promo_char) {
            write!(f, "{pchar}")?;
        }
        Ok(())
    }
}

/// An unclassified `from -> to` request in coordinate form, as typed by a
/// user or read from a save file.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl FromStr for MoveRequest {
    type Err = MoveParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        use MoveParseError::{
            InvalidFromSquareFile, InvalidFromSquareRank, InvalidLength, InvalidPromotionPiece,
            InvalidToSquareFile, InvalidToSquareRank,
        };
        let chars: Vec<char> = text.chars().collect();
        if !(4..=5).contains(&chars.len()) {
            return Err(InvalidLength(chars.len()));
        }
        let from_file = File::from_char(chars[0]).ok_or(InvalidFromSquareFile(chars[0]))?;
        let from_rank = Rank::from_char(chars[1]).ok_or(InvalidFromSquareRank(chars[1]))?;
        let to_file = File::from_char(chars[2]).ok_or(InvalidToSquareFile(chars[2]))?;
        let to_rank = Rank::from_char(chars[3]).ok_or(InvalidToSquareRank(chars[3]))?;
        let promotion = match chars.get(4) {
            Some(&c) => Some(PieceType::from_promo_char(c).ok_or(InvalidPromotionPiece(c))?),
            None => None,
        };
        Ok(Self {
            from: from_file.with(from_rank),
            to: to_file.with(to_rank),
            promotion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_move() {
        let m = Move::new(Square::A1, Square::B2);
        assert_eq!(m.from(), Square::A1);
        assert_eq!(m.to(), Square::B2);
        assert!(!m.is_ep());
        assert_eq!(m.promotion(), None);
        assert_eq!(m.to_string(), "a1b2");
    }

    #[test]
    fn promotion_move() {
        let m = Move::new_promotion(Square::A7, Square::A8, PieceType::Knight);
        assert_eq!(m.promotion(), Some(PieceType::Knight));
        assert_eq!(m.to_string(), "a7a8n");
    }

    #[test]
    fn castling_geometry() {
        let m = Move::Castle { colour: Colour::Black, side: CastleSide::Queen };
        assert_eq!(m.from(), Square::E8);
        assert_eq!(m.to(), Square::C8);
        assert_eq!(m.to_string(), "e8c8");
        assert_eq!(
            m.touched_squares().as_slice(),
            &[Square::E8, Square::C8, Square::A8, Square::D8]
        );
        assert_eq!(
            CastleSide::from_king_move(Colour::White, Square::E1, Square::G1),
            Some(CastleSide::King)
        );
        assert_eq!(CastleSide::from_king_move(Colour::White, Square::E1, Square::F1), None);
        assert_eq!(CastleSide::from_king_move(Colour::Black, Square::E1, Square::G1), None);
    }

    #[test]
    fn en_passant_touches_captured_square() {
        let m = Move::EnPassant { from: Square::E5, to: Square::D6, captured: Square::D5 };
        assert!(m.is_ep());
        assert_eq!(m.touched_squares().len(), 3);
        assert!(m.touched_squares().contains(&Square::D5));
    }

    #[test]
    fn parse_requests() {
        let req: MoveRequest = "e2e4".parse().unwrap();
        assert_eq!((req.from, req.to, req.promotion), (Square::E2, Square::E4, None));
        let req: MoveRequest = "a7a8n".parse().unwrap();
        assert_eq!(req.promotion, Some(PieceType::Knight));
        assert_eq!("e2e".parse::<MoveRequest>(), Err(MoveParseError::InvalidLength(3)));
        assert_eq!("e2e4qq".parse::<MoveRequest>(), Err(MoveParseError::InvalidLength(6)));
        assert_eq!("i2e4".parse::<MoveRequest>(), Err(MoveParseError::InvalidFromSquareFile('i')));
        assert_eq!("e9e4".parse::<MoveRequest>(), Err(MoveParseError::InvalidFromSquareRank('9')));
        assert_eq!("e2z4".parse::<MoveRequest>(), Err(MoveParseError::InvalidToSquareFile('z')));
        assert_eq!("e2e0".parse::<MoveRequest>(), Err(MoveParseError::InvalidToSquareRank('0')));
        assert_eq!("e7e8k".parse::<MoveRequest>(), Err(MoveParseError::InvalidPromotionPiece('k')));
    }
}
