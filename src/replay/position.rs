use fxhash::FxHashMap;

use crate::chess::{
    board::Board,
    piece::{Colour, PieceType},
    types::{File, Rank, Square},
};

/// A sparse square -> piece map, kept apart from the dense [`Board`] so that
/// the replay path shares no rule code with the live engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    squares: FxHashMap<Square, (PieceType, Colour)>,
}

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

impl Position {
    pub fn startpos() -> Self {
        let mut out = Self::default();
        for (colour, back, pawns) in [
            (Colour::White, Rank::One, Rank::Two),
            (Colour::Black, Rank::Eight, Rank::Seven),
        ] {
            for (file, piece_type) in File::all().zip(BACK_RANK) {
                out.put(file.with(back), piece_type, colour);
                out.put(file.with(pawns), PieceType::Pawn, colour);
            }
        }
        out
    }

    /// Snapshot of a live board, for comparing the two representations.
    pub fn from_board(board: &Board) -> Self {
        let squares = Square::all()
            .filter_map(|sq| board.get(sq).map(|p| (sq, (p.piece_type(), p.colour()))))
            .collect();
        Self { squares }
    }

    pub fn get(&self, sq: Square) -> Option<(PieceType, Colour)> {
        self.squares.get(&sq).copied()
    }

    pub fn put(&mut self, sq: Square, piece_type: PieceType, colour: Colour) {
        self.squares.insert(sq, (piece_type, colour));
    }

    pub fn remove(&mut self, sq: Square) -> Option<(PieceType, Colour)> {
        self.squares.remove(&sq)
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    pub fn occupied(&self, sq: Square) -> bool {
        self.squares.contains_key(&sq)
    }

    pub fn colour_at(&self, sq: Square) -> Option<Colour> {
        self.get(sq).map(|(_, c)| c)
    }

    pub fn king(&self, colour: Colour) -> Option<Square> {
        self.squares
            .iter()
            .find(|&(_, &(pt, c))| pt == PieceType::King && c == colour)
            .map(|(&sq, _)| sq)
    }

    /// Whether the straight or diagonal line from `a` to `b` has nothing on it.
    /// Squares that are not aligned have no clear path.
    pub fn line_clear(&self, a: Square, b: Square) -> bool {
        let (df, dr) = delta(a, b);
        if (df, dr) == (0, 0) || !(df == 0 || dr == 0 || df.abs() == dr.abs()) {
            return false;
        }
        let (sf, sr) = (df.signum(), dr.signum());
        let (mut f, mut r) = coords(a);
        let (tf, tr) = coords(b);
        loop {
            f += sf;
            r += sr;
            if (f, r) == (tf, tr) {
                return true;
            }
            if self.occupied(square_at(f, r)) {
                return false;
            }
        }
    }

    /// Whether a piece of `piece_type` and `colour` standing on `from` attacks `target`.
    pub fn attacks(&self, from: Square, target: Square, piece_type: PieceType, colour: Colour) -> bool {
        let (df, dr) = delta(from, target);
        let (adf, adr) = (df.abs(), dr.abs());
        match piece_type {
            PieceType::Pawn => adf == 1 && dr == colour.forward(),
            PieceType::Knight => (adf, adr) == (1, 2) || (adf, adr) == (2, 1),
            PieceType::King => adf.max(adr) == 1,
            PieceType::Bishop => adf == adr && self.line_clear(from, target),
            PieceType::Rook => (adf == 0 || adr == 0) && self.line_clear(from, target),
            PieceType::Queen => self.line_clear(from, target),
        }
    }

    /// Scans every piece of `by` for one that attacks `target`.
    pub fn is_attacked(&self, target: Square, by: Colour) -> bool {
        self.squares
            .iter()
            .any(|(&sq, &(pt, c))| c == by && sq != target && self.attacks(sq, target, pt, c))
    }

    /// Whether `colour`'s king is attacked. A missing king counts as attacked.
    pub fn in_check(&self, colour: Colour) -> bool {
        self.king(colour).is_none_or(|king| self.is_attacked(king, colour.flip()))
    }
}

fn coords(sq: Square) -> (i8, i8) {
    #![allow(clippy::cast_possible_wrap)]
    (sq.file() as i8, sq.rank() as i8)
}

fn delta(a: Square, b: Square) -> (i8, i8) {
    let (af, ar) = coords(a);
    let (bf, br) = coords(b);
    (bf - af, br - ar)
}

/// Square at file/rank coordinates already known to be on the board.
fn square_at(f: i8, r: i8) -> Square {
    #![allow(clippy::cast_sign_loss)]
    Square::from_rank_file(
        Rank::from_index(r as u8).unwrap_or(Rank::One),
        File::from_index(f as u8).unwrap_or(File::A),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_matches_the_board() {
        let pos = Position::startpos();
        assert_eq!(pos.len(), 32);
        assert_eq!(pos, Position::from_board(&Board::startpos()));
        assert_eq!(pos.king(Colour::White), Some(Square::E1));
        assert_eq!(pos.get(Square::D8), Some((PieceType::Queen, Colour::Black)));
        assert!(!pos.in_check(Colour::White));
    }

    #[test]
    fn attack_scan_agrees_with_the_board() {
        for placement in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8",
            "4k3/4r3/8/8/8/8/3BN3/4K3",
        ] {
            let board = Board::from_placement(placement).unwrap();
            let pos = Position::from_board(&board);
            for by in Colour::all() {
                for sq in Square::all() {
                    assert_eq!(
                        pos.is_attacked(sq, by),
                        board.is_square_attacked(sq, by),
                        "{placement}: {by} attacking {sq}"
                    );
                }
            }
        }
    }

    #[test]
    fn missing_king_reads_as_check() {
        let mut pos = Position::startpos();
        pos.remove(Square::E8);
        assert!(pos.in_check(Colour::Black));
        assert!(!pos.in_check(Colour::White));
    }

    #[test]
    fn lines() {
        let pos = Position::startpos();
        assert!(pos.line_clear(Square::A3, Square::H3));
        assert!(!pos.line_clear(Square::A1, Square::A3), "pawn on a2");
        assert!(pos.line_clear(Square::A1, Square::A2), "adjacent squares are always clear");
        assert!(!pos.line_clear(Square::B1, Square::C3), "not aligned");
        assert!(!pos.line_clear(Square::C3, Square::C3));
        assert!(pos.line_clear(Square::C3, Square::F6));
    }
}
