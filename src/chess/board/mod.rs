pub mod legality;
pub mod movegen;
pub mod validation;

use std::fmt::{self, Debug, Display, Formatter};

use arrayvec::ArrayVec;

use crate::{
    chess::{
        chessmove::Move,
        piece::{Colour, Piece, PieceType},
        types::{File, Rank, Square},
    },
    errors::EngineError,
};

use movegen::{DIAGONALS, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONALS};

/// Dense 8x8 occupancy grid, indexed by `rank * 8 + file`.
///
/// The placement primitives here do no rule checking at all. Rules live in
/// [`movegen`], [`legality`] and the game tracker.
#[derive(PartialEq, Eq, Clone)]
pub struct Board {
    mailbox: [Option<Piece>; 64],
}

impl Debug for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board").field("placement", &self.placement()).finish()
    }
}

impl Board {
    const BACK_RANK: [PieceType; 8] = [
        PieceType::Rook,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Queen,
        PieceType::King,
        PieceType::Bishop,
        PieceType::Knight,
        PieceType::Rook,
    ];

    pub const fn empty() -> Self {
        Self { mailbox: [None; 64] }
    }

    /// The standard initial position.
    pub fn startpos() -> Self {
        let mut out = Self::empty();
        for colour in Colour::all() {
            for (&piece_type, file) in Self::BACK_RANK.iter().zip(File::all()) {
                out.set(file.with(Rank::back(colour)), Some(Piece::new(colour, piece_type)));
            }
            for file in File::all() {
                out.set(file.with(Rank::pawn_start(colour)), Some(Piece::new(colour, PieceType::Pawn)));
            }
        }
        out
    }

    pub const fn get(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq.index()]
    }

    /// Raw placement. Callers running a trial must restore the cell themselves.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.mailbox[sq] = piece;
    }

    pub const fn is_empty(&self, sq: Square) -> bool {
        self.mailbox[sq.index()].is_none()
    }

    pub fn colour_at(&self, sq: Square) -> Option<Colour> {
        self.get(sq).map(Piece::colour)
    }

    /// All occupied squares of `colour`, in square order.
    pub fn pieces(&self, colour: Colour) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all()
            .filter_map(|sq| self.get(sq).map(|piece| (sq, piece)))
            .filter(move |(_, piece)| piece.colour() == colour)
    }

    pub fn king_position(&self, colour: Colour) -> Result<Square, EngineError> {
        Square::all()
            .find(|&sq| self.get(sq).is_some_and(|p| p.is(colour, PieceType::King)))
            .ok_or(EngineError::MissingKing(colour))
    }

    /// Whether `colour`'s king is attacked. A missing king counts as attacked.
    pub fn in_check(&self, colour: Colour) -> bool {
        self.king_position(colour)
            .map_or(true, |king| self.is_square_attacked(king, colour.flip()))
    }

    /// The squares strictly between `a` and `b`, walking from `a`.
    /// Empty unless the two share a rank, file or diagonal.
    pub fn squares_between(a: Square, b: Square) -> ArrayVec<Square, 6> {
        #![allow(clippy::cast_possible_wrap)]
        let mut out = ArrayVec::new();
        let df = b.file() as i8 - a.file() as i8;
        let dr = b.rank() as i8 - a.rank() as i8;
        if !(df == 0 || dr == 0 || df.abs() == dr.abs()) || a == b {
            return out;
        }
        let (step_f, step_r) = (df.signum(), dr.signum());
        let mut cursor = a;
        while let Some(next) = cursor.offset(step_f, step_r) {
            if next == b {
                break;
            }
            out.push(next);
            cursor = next;
        }
        out
    }

    pub fn path_clear(&self, a: Square, b: Square) -> bool {
        Self::squares_between(a, b).iter().all(|&sq| self.is_empty(sq))
    }

    /// The first piece met walking from `sq` along `(df, dr)`, if it belongs to
    /// `by` and is one of `sliders`.
    pub fn ray_attacker(
        &self,
        sq: Square,
        (df, dr): (i8, i8),
        by: Colour,
        sliders: [PieceType; 2],
    ) -> Option<Square> {
        let mut cursor = sq;
        while let Some(next) = cursor.offset(df, dr) {
            if let Some(piece) = self.get(next) {
                let hit = piece.colour() == by && sliders.contains(&piece.piece_type());
                return hit.then_some(next);
            }
            cursor = next;
        }
        None
    }

    fn has_piece_at(&self, sq: Option<Square>, by: Colour, piece_type: PieceType) -> bool {
        sq.and_then(|sq| self.get(sq)).is_some_and(|p| p.is(by, piece_type))
    }

    /// Determines if `sq` is attacked by `by`. Used both for check detection
    /// and for the safety of castling squares.
    pub fn is_square_attacked(&self, sq: Square, by: Colour) -> bool {
        // pawns of `by` attack diagonally forward, so look one rank behind `sq`.
        let behind = -by.forward();
        if [-1, 1].into_iter().any(|df| self.has_piece_at(sq.offset(df, behind), by, PieceType::Pawn)) {
            return true;
        }

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(df, dr)| self.has_piece_at(sq.offset(df, dr), by, PieceType::Knight))
        {
            return true;
        }

        let diagonal = [PieceType::Bishop, PieceType::Queen];
        if DIAGONALS.iter().any(|&dir| self.ray_attacker(sq, dir, by, diagonal).is_some()) {
            return true;
        }

        let orthogonal = [PieceType::Rook, PieceType::Queen];
        if ORTHOGONALS.iter().any(|&dir| self.ray_attacker(sq, dir, by, orthogonal).is_some()) {
            return true;
        }

        KING_OFFSETS
            .iter()
            .any(|&(df, dr)| self.has_piece_at(sq.offset(df, dr), by, PieceType::King))
    }

    /// Executes a classified move against the grid, returning the captured piece.
    ///
    /// Nothing is written unless every precondition holds, so a failed call
    /// leaves the board untouched.
    pub fn apply_move(&mut self, m: Move) -> Result<Option<Piece>, EngineError> {
        match m {
            Move::Castle { colour, side } => {
                let king_from = side.king_from(colour);
                let rook_from = side.rook_from(colour);
                let king = self.get(king_from).filter(|p| p.is(colour, PieceType::King));
                let rook = self.get(rook_from).filter(|p| p.is(colour, PieceType::Rook));
                let (Some(king), Some(rook)) = (king, rook) else {
                    return Err(EngineError::MissingCastlingPieces { colour, side });
                };
                self.set(king_from, None);
                self.set(rook_from, None);
                self.set(side.king_to(colour), Some(king));
                self.set(side.rook_to(colour), Some(rook));
                Ok(None)
            }
            Move::EnPassant { from, to, captured } => {
                let mover = self.get(from).ok_or(EngineError::NoPieceAtSource(from))?;
                let victim = self.get(captured);
                self.set(captured, None);
                self.set(from, None);
                self.set(to, Some(mover));
                Ok(victim)
            }
            Move::Normal { from, to, promotion } => {
                let mover = self.get(from).ok_or(EngineError::NoPieceAtSource(from))?;
                let placed = match promotion {
                    Some(pt) if !pt.legal_promo() => return Err(EngineError::InvalidPromotion(pt)),
                    Some(pt) => Piece::new(mover.colour(), pt),
                    None => mover,
                };
                let captured = self.get(to);
                self.set(from, None);
                self.set(to, Some(placed));
                Ok(captured)
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

/// Renders the board with rank 8 at the top, white in uppercase.
impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::all().rev() {
            write!(f, "{} ", rank.char())?;
            for file in File::all() {
                match self.get(file.with(rank)) {
                    Some(piece) => write!(f, "{piece} ")?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::chessmove::CastleSide;

    /// Brute force: does any piece of `by` reach `target` by its movement rules?
    fn attacked_by_scan(board: &Board, target: Square, by: Colour) -> bool {
        board.pieces(by).any(|(sq, piece)| {
            let df = target.file() as i8 - sq.file() as i8;
            let dr = target.rank() as i8 - sq.rank() as i8;
            match piece.piece_type() {
                PieceType::Pawn => dr == by.forward() && df.abs() == 1,
                PieceType::Knight => (df.abs(), dr.abs()) == (1, 2) || (df.abs(), dr.abs()) == (2, 1),
                PieceType::King => sq != target && df.abs() <= 1 && dr.abs() <= 1,
                PieceType::Bishop => df != 0 && df.abs() == dr.abs() && board.path_clear(sq, target),
                PieceType::Rook => (df == 0) != (dr == 0) && board.path_clear(sq, target),
                PieceType::Queen => {
                    sq != target
                        && (df == 0 || dr == 0 || df.abs() == dr.abs())
                        && board.path_clear(sq, target)
                }
            }
        })
    }

    #[test]
    fn startpos_layout() {
        let board = Board::startpos();
        assert_eq!(board.get(Square::E1), Some(Piece::new(Colour::White, PieceType::King)));
        assert_eq!(board.get(Square::D8), Some(Piece::new(Colour::Black, PieceType::Queen)));
        assert_eq!(board.get(Square::A2), Some(Piece::new(Colour::White, PieceType::Pawn)));
        assert_eq!(board.get(Square::H7), Some(Piece::new(Colour::Black, PieceType::Pawn)));
        assert!(board.is_empty(Square::E4));
        assert_eq!(board.pieces(Colour::White).count(), 16);
        assert_eq!(board.pieces(Colour::Black).count(), 16);
        assert_eq!(board.king_position(Colour::Black), Ok(Square::E8));
    }

    #[test]
    fn missing_king_reads_as_check() {
        let mut board = Board::startpos();
        board.set(Square::E1, None);
        assert_eq!(board.king_position(Colour::White), Err(EngineError::MissingKing(Colour::White)));
        assert!(board.in_check(Colour::White));
        assert!(!board.in_check(Colour::Black));
    }

    #[test]
    fn squares_between_lines() {
        assert_eq!(
            Board::squares_between(Square::A1, Square::A5).as_slice(),
            &[Square::A2, Square::A3, Square::A4]
        );
        assert_eq!(
            Board::squares_between(Square::H8, Square::E5).as_slice(),
            &[Square::G7, Square::F6]
        );
        assert_eq!(Board::squares_between(Square::E1, Square::H1).as_slice(), &[Square::F1, Square::G1]);
        assert!(Board::squares_between(Square::E4, Square::E5).is_empty());
        assert!(Board::squares_between(Square::A1, Square::B3).is_empty());
        assert!(Board::squares_between(Square::C3, Square::C3).is_empty());
        assert_eq!(Board::squares_between(Square::A1, Square::H8).len(), 6);
    }

    #[test]
    fn attacks_agree_with_brute_force_single_piece() {
        for colour in Colour::all() {
            for piece_type in PieceType::all() {
                for origin in Square::all() {
                    let mut board = Board::empty();
                    board.set(origin, Some(Piece::new(colour, piece_type)));
                    for target in Square::all() {
                        assert_eq!(
                            board.is_square_attacked(target, colour),
                            attacked_by_scan(&board, target, colour),
                            "{colour} {piece_type} on {origin} vs {target}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn attacks_agree_with_brute_force_crowded() {
        let board = Board::from_placement("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R")
            .unwrap();
        for by in Colour::all() {
            for target in Square::all() {
                assert_eq!(
                    board.is_square_attacked(target, by),
                    attacked_by_scan(&board, target, by),
                    "{by} attacking {target}"
                );
            }
        }
    }

    #[test]
    fn rays_stop_at_first_piece() {
        let board = Board::from_placement("4k3/8/8/8/4r3/8/4P3/4K3").unwrap();
        // the pawn on e2 shields the king from the rook.
        assert!(!board.is_square_attacked(Square::E1, Colour::Black));
        assert!(board.is_square_attacked(Square::E2, Colour::Black));
        assert!(board.is_square_attacked(Square::A4, Colour::Black));
    }

    #[test]
    fn apply_normal_capture_and_promotion() {
        let mut board = Board::from_placement("r3k3/1P6/8/8/8/8/8/4K3").unwrap();
        let captured = board.apply_move(Move::new_promotion(Square::B7, Square::A8, PieceType::Knight));
        assert_eq!(captured, Ok(Some(Piece::new(Colour::Black, PieceType::Rook))));
        assert_eq!(board.get(Square::A8), Some(Piece::new(Colour::White, PieceType::Knight)));
        assert!(board.is_empty(Square::B7));

        let before = board.clone();
        assert_eq!(
            board.apply_move(Move::new_promotion(Square::E1, Square::E2, PieceType::King)),
            Err(EngineError::InvalidPromotion(PieceType::King))
        );
        assert_eq!(board, before);
        assert_eq!(
            board.apply_move(Move::new(Square::C3, Square::C4)),
            Err(EngineError::NoPieceAtSource(Square::C3))
        );
    }

    #[test]
    fn apply_en_passant_removes_the_passed_pawn() {
        let mut board = Board::from_placement("4k3/8/8/3pP3/8/8/8/4K3").unwrap();
        let m = Move::EnPassant { from: Square::E5, to: Square::D6, captured: Square::D5 };
        assert_eq!(board.apply_move(m), Ok(Some(Piece::new(Colour::Black, PieceType::Pawn))));
        assert!(board.is_empty(Square::D5));
        assert!(board.is_empty(Square::E5));
        assert_eq!(board.get(Square::D6), Some(Piece::new(Colour::White, PieceType::Pawn)));
    }

    #[test]
    fn apply_castle_moves_both_pieces() {
        let mut board = Board::from_placement("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        board.apply_move(Move::Castle { colour: Colour::Black, side: CastleSide::Queen }).unwrap();
        assert!(board.get(Square::C8).is_some_and(|p| p.is(Colour::Black, PieceType::King)));
        assert!(board.get(Square::D8).is_some_and(|p| p.is(Colour::Black, PieceType::Rook)));
        assert!(board.is_empty(Square::A8));
        assert!(board.is_empty(Square::E8));

        let mut no_rook = Board::from_placement("4k3/8/8/8/8/8/8/4K2R").unwrap();
        assert_eq!(
            no_rook.apply_move(Move::Castle { colour: Colour::White, side: CastleSide::Queen }),
            Err(EngineError::MissingCastlingPieces { colour: Colour::White, side: CastleSide::Queen })
        );
    }

    #[test]
    fn ascii_rendering() {
        let text = Board::startpos().to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8 r n b q k b n r ");
        assert_eq!(lines[4], "4 . . . . . . . . ");
        assert_eq!(lines[7], "1 R N B Q K B N R ");
        assert_eq!(lines[8], "  a b c d e f g h");
    }
}
