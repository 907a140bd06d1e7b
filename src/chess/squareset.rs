use crate::chess::types::Square;

/// A set of squares packed into a single `u64`, one bit per square.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct SquareSet {
    inner: u64,
}

impl SquareSet {
    pub const EMPTY: Self = Self { inner: 0 };

    pub const RANK_1: Self = Self {
        inner: 0x0000_0000_0000_00FF,
    };
    pub const RANK_8: Self = Self {
        inner: 0xFF00_0000_0000_0000,
    };

    pub const BACK_RANKS: Self = Self::union(Self::RANK_1, Self::RANK_8);

    pub const fn is_empty(self) -> bool {
        self.inner == 0
    }

    pub const fn contains_square(self, square: Square) -> bool {
        (self.inner & (1 << square.index())) != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self {
            inner: self.inner | other.inner,
        }
    }

    pub const fn add_square(self, square: Square) -> Self {
        Self {
            inner: self.inner | (1 << square.index()),
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    pub fn iter(self) -> SquareIter {
        SquareIter::new(self.inner)
    }
}

/// Iterator over the squares of a square-set.
/// The squares are returned in increasing order.
pub struct SquareIter {
    value: u64,
}

impl SquareIter {
    pub const fn new(value: u64) -> Self {
        Self { value }
    }
}

impl Iterator for SquareIter {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.value == 0 {
            None
        } else {
            #[allow(clippy::cast_possible_truncation)]
            let lsb: u8 = self.value.trailing_zeros() as u8;
            self.value &= self.value - 1;
            // SAFETY: u64::trailing_zeros can only return values within `0..64`
            // for a non-zero input, all of which correspond to valid squares.
            Some(unsafe { Square::new_unchecked(lsb) })
        }
    }
}

impl IntoIterator for SquareSet {
    type Item = Square;
    type IntoIter = SquareIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::add_square)
    }
}

#[cfg(test)]
mod tests {
    use crate::chess::{squareset::SquareSet, types::Square};

    #[test]
    fn membership() {
        let set = SquareSet::EMPTY.add_square(Square::E4).add_square(Square::A8);
        assert!(set.contains_square(Square::E4));
        assert!(set.contains_square(Square::A8));
        assert!(!set.contains_square(Square::E5));
        assert!(!set.is_empty());
        assert!(SquareSet::EMPTY.is_empty());
    }

    #[test]
    fn iteration_is_ordered() {
        let set: SquareSet = [Square::H8, Square::A1, Square::E4].into_iter().collect();
        let squares: Vec<_> = set.iter().collect();
        assert_eq!(squares, vec![Square::A1, Square::E4, Square::H8]);
    }

    #[test]
    fn back_ranks() {
        assert!(SquareSet::BACK_RANKS.contains_square(Square::A1));
        assert!(SquareSet::BACK_RANKS.contains_square(Square::H8));
        assert!(!SquareSet::BACK_RANKS.contains_square(Square::E2));
        assert_eq!(SquareSet::BACK_RANKS.iter().count(), 16);
    }
}
