use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::BLOCK_CAPACITY;

const C: usize = BLOCK_CAPACITY;

/// Random-access position inside a deque's block table.
///
/// A cursor is a `(block, offset)` pair with `offset < BLOCK_CAPACITY`. Its
/// absolute slot is `block * BLOCK_CAPACITY + offset`; distance and ordering
/// are taken on absolute slots, so arithmetic is exact across block
/// boundaries. The block is signed: stepping back from slot 0 yields a
/// cursor before the table, which the deque rejects as out of range.
///
/// A cursor does not borrow the deque. Any push, pop, insert, erase or clear
/// may relocate the block table, after which previously obtained cursors must
/// be reacquired from [`begin`](crate::ChunkedDeque::begin) /
/// [`end`](crate::ChunkedDeque::end). Dereferencing goes through the deque
/// and is checked against the live range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cursor {
    block: isize,
    offset: usize,
}

impl Cursor {
    pub(crate) const fn new(block: usize, offset: usize) -> Self {
        debug_assert!(offset < C);
        Self {
            block: block as isize,
            offset,
        }
    }

    pub(crate) const fn from_abs(abs: isize) -> Self {
        Self {
            block: abs.div_euclid(C as isize),
            offset: abs.rem_euclid(C as isize) as usize,
        }
    }

    pub const fn block(&self) -> isize {
        self.block
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Block index into the table. Only meaningful for cursors inside it.
    pub(crate) const fn block_index(&self) -> usize {
        debug_assert!(self.block >= 0);
        self.block as usize
    }

    pub(crate) const fn abs(&self) -> isize {
        self.block * C as isize + self.offset as isize
    }

    pub(crate) const fn shift_blocks(self, blocks: usize) -> Self {
        Self {
            block: self.block + blocks as isize,
            offset: self.offset,
        }
    }

    /// Moves to the next slot, rolling into the following block.
    pub fn inc(&mut self) {
        if self.offset == C - 1 {
            self.offset = 0;
            self.block += 1;
        } else {
            self.offset += 1;
        }
    }

    /// Moves to the previous slot, rolling into the preceding block.
    pub fn dec(&mut self) {
        if self.offset == 0 {
            self.offset = C - 1;
            self.block -= 1;
        } else {
            self.offset -= 1;
        }
    }

    pub fn advance(&mut self, n: isize) {
        if n >= 0 || n.unsigned_abs() <= self.offset {
            *self = Self::from_abs(self.abs() + n);
            return;
        }
        let rest = n.unsigned_abs() - self.offset - 1;
        self.block -= (rest / C + 1) as isize;
        self.offset = C - 1 - rest % C;
    }

    /// Signed number of slots from `other` to `self`.
    pub const fn distance(&self, other: &Self) -> isize {
        self.abs() - other.abs()
    }
}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance(other).cmp(&0)
    }
}

impl AddAssign<isize> for Cursor {
    fn add_assign(&mut self, n: isize) {
        self.advance(n);
    }
}

impl SubAssign<isize> for Cursor {
    fn sub_assign(&mut self, n: isize) {
        self.advance(-n);
    }
}

impl Add<isize> for Cursor {
    type Output = Cursor;

    fn add(mut self, n: isize) -> Cursor {
        self += n;
        self
    }
}

impl Sub<isize> for Cursor {
    type Output = Cursor;

    fn sub(mut self, n: isize) -> Cursor {
        self -= n;
        self
    }
}

impl Sub for Cursor {
    type Output = isize;

    fn sub(self, other: Cursor) -> isize {
        self.distance(&other)
    }
}

// Index mapping between logical positions and table slots.

/// Slot of the element at logical `index` when the front element sits at `front`.
pub(crate) const fn locate(front: Cursor, index: usize) -> Cursor {
    Cursor::from_abs(front.abs() + index as isize)
}

/// Logical index of `pos`, or `None` when `pos` lies before `front`.
pub(crate) fn index_of(front: Cursor, pos: Cursor) -> Option<usize> {
    usize::try_from(pos.distance(&front)).ok()
}

#[cfg(test)]
mod tests {
    use super::{C, Cursor, index_of, locate};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn inc_and_dec_wrap_at_block_boundary() {
        let mut cur = Cursor::new(3, C - 1);
        cur.inc();
        assert_eq!((cur.block(), cur.offset()), (4, 0));
        cur.dec();
        assert_eq!((cur.block(), cur.offset()), (3, C - 1));
        cur.dec();
        assert_eq!((cur.block(), cur.offset()), (3, C - 2));
    }

    #[test]
    fn negative_offset_skips_whole_blocks() {
        let start = Cursor::new(10, 5);
        assert_eq!(start - 5, Cursor::new(10, 0));
        assert_eq!(start - 6, Cursor::new(9, C - 1));
        assert_eq!(start - (C as isize + 6), Cursor::new(8, C - 1));
        assert_eq!(start - (3 * C as isize), Cursor::new(7, 5));
        assert_eq!(start + (-(C as isize) - 5), Cursor::new(9, 0));
    }

    #[test]
    fn positive_offset_rolls_forward() {
        let start = Cursor::new(2, C - 3);
        assert_eq!(start + 3, Cursor::new(3, 0));
        assert_eq!(start + (2 * C as isize), Cursor::new(4, C - 3));
    }

    #[test]
    fn ordering_follows_distance() {
        let a = Cursor::new(1, C - 1);
        let b = Cursor::new(2, 0);
        assert!(a < b);
        assert!(b > a);
        assert!(a <= a);
        assert_eq!(b - a, 1);
        assert_eq!(a - b, -1);
    }

    #[test]
    fn arithmetic_identities_hold() {
        let mut rng = StdRng::seed_from_u64(0xC0_FFEE);
        for _ in 0..10_000 {
            let it1 = Cursor::new(rng.random_range(100..200), rng.random_range(0..C));
            let it2 = Cursor::new(rng.random_range(100..200), rng.random_range(0..C));
            let n = rng.random_range(-40_000_i64..40_000) as isize;
            assert_eq!((it1 + n) - it1, n);
            assert_eq!(it1 + (it2 - it1), it2);
            let mut walked = it1;
            walked += n;
            walked -= n;
            assert_eq!(walked, it1);
        }
    }

    #[test]
    fn index_mapping_round_trips_through_front() {
        let front = Cursor::new(32, C / 2);
        let pos = locate(front, 700);
        assert_eq!((pos.block(), pos.offset()), (33, C / 2 + 700 - C));
        assert_eq!(index_of(front, pos), Some(700));
        assert_eq!(index_of(front, front - 1), None);
    }

    #[test]
    fn stepping_back_from_slot_zero() {
        let origin = Cursor::new(0, 0);
        let before = origin - 1;
        assert_eq!((before.block(), before.offset()), (-1, C - 1));
        assert!(before < origin);
        assert_eq!(origin - before, 1);
        assert_eq!(before + 1, origin);

        let mut walked = origin;
        walked.dec();
        assert_eq!(walked, before);
        walked -= 2 * C as isize;
        assert_eq!((walked.block(), walked.offset()), (-3, C - 1));
        walked.inc();
        assert_eq!((walked.block(), walked.offset()), (-2, 0));

        assert_eq!(index_of(origin, before), None);
        assert_eq!(index_of(before, origin), Some(1));
        assert_eq!(locate(before, 1), origin);
    }
}
