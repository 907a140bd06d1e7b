use crate::{
    chess::{
        chessmove::CastleSide,
        piece::{Colour, Piece, PieceType},
        squareset::SquareSet,
        types::{File, Rank, Square},
    },
    errors::ReplayError,
    replay::{notation::Notation, position::Position},
};

/// The state a move log folds into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replayed {
    pub position: Position,
    pub side_to_move: Colour,
    pub en_passant: Option<Square>,
    /// Squares that have been moved from or moved onto. A king or rook whose
    /// home square is in here has lost its castling right.
    pub vacated: SquareSet,
}

impl Default for Replayed {
    fn default() -> Self {
        Self::new()
    }
}

impl Replayed {
    pub fn new() -> Self {
        Self {
            position: Position::startpos(),
            side_to_move: Colour::White,
            en_passant: None,
            vacated: SquareSet::EMPTY,
        }
    }

    /// Applies one log entry for the side to move. On error nothing changes.
    pub fn apply(&mut self, notation: &Notation) -> Result<(), ReplayError> {
        let colour = self.side_to_move;
        match *notation {
            Notation::Castle(side) => {
                let king_from = side.king_from(colour);
                let rook_from = side.rook_from(colour);
                let present = self.position.get(king_from) == Some((PieceType::King, colour))
                    && self.position.get(rook_from) == Some((PieceType::Rook, colour));
                if !present {
                    return Err(ReplayError::MissingCastlingPieces { colour, side });
                }
                self.position.remove(king_from);
                self.position.remove(rook_from);
                self.position.put(side.king_to(colour), PieceType::King, colour);
                self.position.put(side.rook_to(colour), PieceType::Rook, colour);
                self.vacated = self.vacated.add_square(king_from).add_square(rook_from);
                self.en_passant = None;
            }
            Notation::Piece { piece_type, origin_file, origin_rank, capture, to, promotion } => {
                let from = self
                    .find_origin_for(piece_type, to, origin_file, origin_rank, capture)
                    .ok_or(ReplayError::UnresolvedOrigin { colour, piece_type, to })?;
                let mut placed = piece_type;
                let mut next_ep = None;
                if piece_type == PieceType::Pawn {
                    if from.file() != to.file()
                        && !self.position.occupied(to)
                        && Some(to) == self.en_passant
                    {
                        self.position.remove(to.file().with(from.rank()));
                    }
                    if to.rank() == Rank::promotion(colour) {
                        placed = promotion.unwrap_or(PieceType::Queen);
                    }
                    if from.rank().abs_diff(to.rank()) == 2 {
                        next_ep = shift(from, 0, colour.forward());
                    }
                }
                self.position.remove(from);
                self.position.put(to, placed, colour);
                self.vacated = self.vacated.add_square(from).add_square(to);
                self.en_passant = next_ep;
            }
        }
        self.side_to_move = colour.flip();
        Ok(())
    }

    /// Counts a log entry that could not be applied as a ply anyway, so the
    /// side to move stays in step with the log.
    pub fn skip_ply(&mut self) {
        self.side_to_move = self.side_to_move.flip();
        self.en_passant = None;
    }

    /// Resolves which piece of the side to move a log entry refers to.
    ///
    /// Takes the first candidate in square order that satisfies the hints. No
    /// attempt is made to detect an ambiguous entry.
    fn find_origin_for(
        &self,
        piece_type: PieceType,
        to: Square,
        origin_file: Option<File>,
        origin_rank: Option<Rank>,
        capture: bool,
    ) -> Option<Square> {
        let colour = self.side_to_move;
        let hinted = |sq: Square| {
            origin_file.is_none_or(|f| sq.file() == f) && origin_rank.is_none_or(|r| sq.rank() == r)
        };
        let own_pawn = |sq: &Square| self.position.get(*sq) == Some((PieceType::Pawn, colour));

        if piece_type == PieceType::Pawn {
            let back = -colour.forward();
            if capture {
                return [-1, 1]
                    .into_iter()
                    .filter_map(|df| shift(to, df, back))
                    .filter(|&sq| hinted(sq))
                    .find(own_pawn);
            }
            if self.position.occupied(to) {
                return None;
            }
            let one = shift(to, 0, back)?;
            if own_pawn(&one) && hinted(one) {
                return Some(one);
            }
            let two = shift(one, 0, back).filter(|sq| sq.rank() == Rank::pawn_start(colour))?;
            return (!self.position.occupied(one) && own_pawn(&two) && hinted(two)).then_some(two);
        }

        if self.position.colour_at(to) == Some(colour) {
            return None;
        }
        Square::all().find(|&sq| {
            self.position.get(sq) == Some((piece_type, colour))
                && hinted(sq)
                && self.position.attacks(sq, to, piece_type, colour)
        })
    }

    /// Whether `colour` may still castle on `side` by the log: king and rook
    /// never left home, nothing between them, and the king's path is safe.
    fn castle_allowed(&self, colour: Colour, side: CastleSide) -> bool {
        let king_from = side.king_from(colour);
        let rook_from = side.rook_from(colour);
        if self.vacated.contains_square(king_from) || self.vacated.contains_square(rook_from) {
            return false;
        }
        if self.position.get(king_from) != Some((PieceType::King, colour))
            || self.position.get(rook_from) != Some((PieceType::Rook, colour))
            || !self.position.line_clear(king_from, rook_from)
        {
            return false;
        }
        let transit = side.rook_to(colour);
        [king_from, transit, side.king_to(colour)]
            .into_iter()
            .all(|sq| !self.position.is_attacked(sq, colour.flip()))
    }

    /// Whether `from -> to` fits the movement pattern of the piece on `from`.
    fn pattern_allows(&self, from: Square, to: Square, piece_type: PieceType, colour: Colour) -> bool {
        match piece_type {
            PieceType::Pawn => {
                let fwd = colour.forward();
                if shift(from, 0, fwd) == Some(to) {
                    return !self.position.occupied(to);
                }
                if from.rank() == Rank::pawn_start(colour) && shift(from, 0, 2 * fwd) == Some(to) {
                    return shift(from, 0, fwd).is_some_and(|mid| !self.position.occupied(mid))
                        && !self.position.occupied(to);
                }
                let diagonal = [-1, 1].into_iter().any(|df| shift(from, df, fwd) == Some(to));
                diagonal
                    && (self.position.colour_at(to) == Some(colour.flip())
                        || (Some(to) == self.en_passant
                            && self.position.get(to.file().with(from.rank()))
                                == Some((PieceType::Pawn, colour.flip()))))
            }
            PieceType::King => {
                if let Some(side) = CastleSide::from_king_move(colour, from, to) {
                    return self.castle_allowed(colour, side);
                }
                self.position.attacks(from, to, piece_type, colour)
            }
            PieceType::Knight | PieceType::Bishop | PieceType::Rook | PieceType::Queen => {
                self.position.attacks(from, to, piece_type, colour)
            }
        }
    }

    /// Validates a prospective move against the replayed position.
    ///
    /// The move is simulated on a copy of the map, so the replayed state is
    /// never disturbed.
    pub fn is_valid_move(&self, from: Square, piece_type: PieceType, piece: Piece, to: Square) -> bool {
        let colour = piece.colour();
        if colour != self.side_to_move || piece.piece_type() != piece_type {
            return false;
        }
        if self.position.get(from) != Some((piece_type, colour)) {
            return false;
        }
        if from == to || self.position.colour_at(to) == Some(colour) {
            return false;
        }
        if !self.pattern_allows(from, to, piece_type, colour) {
            return false;
        }

        let mut sim = self.position.clone();
        if piece_type == PieceType::Pawn
            && from.file() != to.file()
            && !sim.occupied(to)
            && Some(to) == self.en_passant
        {
            sim.remove(to.file().with(from.rank()));
        }
        if piece_type == PieceType::King
            && let Some(side) = CastleSide::from_king_move(colour, from, to)
        {
            sim.remove(side.rook_from(colour));
            sim.put(side.rook_to(colour), PieceType::Rook, colour);
        }
        sim.remove(to);
        sim.remove(from);
        sim.put(to, piece_type, colour);

        !sim.in_check(colour)
    }
}

/// Steps `sq` by `(df, dr)` using plain coordinate arithmetic.
fn shift(sq: Square, df: i8, dr: i8) -> Option<Square> {
    #![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    let f = sq.file() as i8 + df;
    let r = sq.rank() as i8 + dr;
    if !(0..8).contains(&f) || !(0..8).contains(&r) {
        return None;
    }
    Some(Square::from_rank_file(Rank::from_index(r as u8)?, File::from_index(f as u8)?))
}
