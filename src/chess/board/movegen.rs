use arrayvec::ArrayVec;

use crate::{
    chess::{
        board::Board,
        chessmove::{CastleSide, Move},
        piece::{Colour, PieceType},
        types::{Rank, Square},
    },
    errors::EngineError,
};

pub const KNIGHT_OFFSETS: [(i8, i8); 8] =
    [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
pub const KING_OFFSETS: [(i8, i8); 8] =
    [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];
pub const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
pub const ORTHOGONALS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Enough room for a queen in the middle of an empty board (27) plus slack.
pub type Destinations = ArrayVec<Square, 32>;

impl Board {
    /// Destinations reachable from `from` by movement pattern and occupancy,
    /// not yet filtered for leaving the mover's own king attacked.
    ///
    /// Empty if `from` is vacant or holds a piece of the side not on move.
    pub fn pseudo_legal_destinations(
        &self,
        from: Square,
        turn: Colour,
        ep: Option<Square>,
    ) -> Destinations {
        let mut out = Destinations::new();
        let Some(piece) = self.get(from).filter(|p| p.colour() == turn) else {
            return out;
        };
        match piece.piece_type() {
            PieceType::Pawn => self.pawn_destinations(from, turn, ep, &mut out),
            PieceType::Knight => self.jump_destinations(from, turn, &KNIGHT_OFFSETS, &mut out),
            PieceType::Bishop => self.slide_destinations(from, turn, &DIAGONALS, &mut out),
            PieceType::Rook => self.slide_destinations(from, turn, &ORTHOGONALS, &mut out),
            PieceType::Queen => {
                self.slide_destinations(from, turn, &DIAGONALS, &mut out);
                self.slide_destinations(from, turn, &ORTHOGONALS, &mut out);
            }
            PieceType::King => {
                self.jump_destinations(from, turn, &KING_OFFSETS, &mut out);
                for side in [CastleSide::King, CastleSide::Queen] {
                    if self.can_castle(turn, side) && side.king_from(turn) == from {
                        out.push(side.king_to(turn));
                    }
                }
            }
        }
        out
    }

    fn jump_destinations(
        &self,
        from: Square,
        turn: Colour,
        offsets: &[(i8, i8)],
        out: &mut Destinations,
    ) {
        for &(df, dr) in offsets {
            if let Some(to) = from.offset(df, dr)
                && self.colour_at(to) != Some(turn)
            {
                out.push(to);
            }
        }
    }

    fn slide_destinations(
        &self,
        from: Square,
        turn: Colour,
        directions: &[(i8, i8)],
        out: &mut Destinations,
    ) {
        for &(df, dr) in directions {
            let mut cursor = from;
            while let Some(to) = cursor.offset(df, dr) {
                match self.colour_at(to) {
                    None => out.push(to),
                    Some(c) if c == turn => break,
                    Some(_) => {
                        out.push(to);
                        break;
                    }
                }
                cursor = to;
            }
        }
    }

    fn pawn_destinations(
        &self,
        from: Square,
        turn: Colour,
        ep: Option<Square>,
        out: &mut Destinations,
    ) {
        let fwd = turn.forward();
        if let Some(one) = from.offset(0, fwd)
            && self.is_empty(one)
        {
            out.push(one);
            if from.rank() == Rank::pawn_start(turn)
                && let Some(two) = one.offset(0, fwd)
                && self.is_empty(two)
            {
                out.push(two);
            }
        }
        for df in [-1, 1] {
            let Some(to) = from.offset(df, fwd) else {
                continue;
            };
            match self.colour_at(to) {
                Some(c) if c != turn => out.push(to),
                None if Some(to) == ep && self.en_passant_victim(from, to, turn).is_some() => {
                    out.push(to);
                }
                _ => {}
            }
        }
    }

    /// The square of the enemy pawn an en passant capture `from -> to` would take.
    fn en_passant_victim(&self, from: Square, to: Square, turn: Colour) -> Option<Square> {
        let victim = to.file().with(from.rank());
        self.get(victim)
            .is_some_and(|p| p.is(turn.flip(), PieceType::Pawn))
            .then_some(victim)
    }

    /// Whether `colour` may castle on `side` right now: unmoved king and rook on
    /// their home squares, nothing between them, and the king neither starts,
    /// passes nor lands on an attacked square.
    pub fn can_castle(&self, colour: Colour, side: CastleSide) -> bool {
        let king_from = side.king_from(colour);
        let rook_from = side.rook_from(colour);
        let king_ok = self
            .get(king_from)
            .is_some_and(|p| p.is(colour, PieceType::King) && !p.has_moved());
        let rook_ok = self
            .get(rook_from)
            .is_some_and(|p| p.is(colour, PieceType::Rook) && !p.has_moved());
        if !king_ok || !rook_ok || !self.path_clear(king_from, rook_from) {
            return false;
        }
        let king_to = side.king_to(colour);
        let mut king_path = Self::squares_between(king_from, king_to);
        king_path.push(king_from);
        king_path.push(king_to);
        king_path
            .iter()
            .all(|&sq| !self.is_square_attacked(sq, colour.flip()))
    }

    /// Turns a `from -> to` request into a fully-classified [`Move`] by geometry.
    ///
    /// Pawns reaching the far rank promote to `promotion`, or a queen if none was
    /// given. The caller is responsible for having checked that `to` is reachable.
    pub fn classify(
        &self,
        from: Square,
        to: Square,
        ep: Option<Square>,
        promotion: Option<PieceType>,
    ) -> Result<Move, EngineError> {
        let piece = self.get(from).ok_or(EngineError::NoPieceAtSource(from))?;
        let colour = piece.colour();
        match piece.piece_type() {
            PieceType::King => {
                if let Some(side) = CastleSide::from_king_move(colour, from, to) {
                    return Ok(Move::Castle { colour, side });
                }
                Ok(Move::new(from, to))
            }
            PieceType::Pawn => {
                if from.file() != to.file() && self.is_empty(to) && Some(to) == ep {
                    let captured = to.file().with(from.rank());
                    return Ok(Move::EnPassant { from, to, captured });
                }
                if to.rank() == Rank::promotion(colour) {
                    let promo = promotion.unwrap_or(PieceType::Queen);
                    if !promo.legal_promo() {
                        return Err(EngineError::InvalidPromotion(promo));
                    }
                    return Ok(Move::new_promotion(from, to, promo));
                }
                Ok(Move::new(from, to))
            }
            _ => Ok(Move::new(from, to)),
        }
    }
}
