//! A chunked double-ended queue.
//!
//! Elements live in fixed-size blocks of [`BLOCK_CAPACITY`] slots. The deque
//! owns a table of block handles and two cursors delimiting the live range:
//!
//! ```text
//!   block table:  [ b0 | b1 | b2 | b3 | b4 | b5 ]
//!                          |              |
//!                  front --+              +-- end (one past the back)
//! ```
//!
//! - Pushing moves a cursor by one slot. When a cursor would leave the table,
//!   the table is tripled and the old handles land in the middle third, so
//!   only pointers move, never elements.
//! - After a pop, if at most a quarter of the table's slots are live, the
//!   table is halved (never below [`INITIAL_BLOCKS`]) and the live blocks are
//!   re-centered.
//! - Logical index `i` maps to slot `front + i`, split into
//!   `(slot / BLOCK_CAPACITY, slot % BLOCK_CAPACITY)`.
//!
//! Failure guarantees: element constructors run after storage is secured,
//! so a failing or panicking constructor leaves the deque unchanged. A
//! block-table allocation failure is reported as
//! [`Error::AllocationFailure`] after the deque has dropped all of its
//! elements and storage; callers get a valid, empty deque back.

mod cursor;
mod deque;
mod error;
mod iter;
mod strategy;
mod table;

#[cfg(test)]
mod testing;

pub use cursor::Cursor;
pub use deque::ChunkedDeque;
pub use error::{AllocError, Error};
pub use iter::{IntoIter, Iter, IterMut};
pub use strategy::{BlockAllocator, Global};

/// Slots per block.
pub const BLOCK_CAPACITY: usize = 512;

/// Blocks allocated on the first push; the table never shrinks below this.
pub const INITIAL_BLOCKS: usize = 64;

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::{BLOCK_CAPACITY, ChunkedDeque, Cursor};

    #[test]
    fn iteration_order_after_push_back() {
        let values: Vec<u64> = (0..3 * BLOCK_CAPACITY as u64 + 1).map(|v| v * 7).collect();
        let mut deque = ChunkedDeque::new();
        for &v in &values {
            deque.push_back(v).unwrap();
        }
        assert!(deque.iter().eq(values.iter()));
        assert!(deque.iter().rev().eq(values.iter().rev()));
        assert_eq!(deque.into_iter().collect::<Vec<_>>(), values);
    }

    #[test]
    fn cursor_walk_matches_indexing() {
        let mut deque: ChunkedDeque<u64> = (0..2 * BLOCK_CAPACITY as u64).collect();
        for v in 0..BLOCK_CAPACITY as u64 {
            deque.push_front(v + 10_000).unwrap();
        }
        let begin = deque.begin();
        let end = deque.end();
        assert_eq!((end - begin) as usize, deque.len());

        let mut cur = begin;
        let mut index: usize = 0;
        while cur != end {
            assert_eq!(deque[cur], deque[index]);
            cur.inc();
            index += 1;
        }
        assert_eq!(index, deque.len());

        let mut cur = end;
        while cur > begin {
            cur.dec();
            index -= 1;
            assert_eq!(deque.cursor_get(cur), deque.get(index));
        }

        let mut rng = StdRng::seed_from_u64(0x0C_0A5E);
        for _ in 0..1_000 {
            let i = rng.random_range(0..deque.len());
            let j = rng.random_range(0..deque.len());
            let a: Cursor = begin + i as isize;
            let b: Cursor = begin + j as isize;
            assert_eq!(b - a, j as isize - i as isize);
            assert_eq!(a + (b - a), b);
            assert_eq!(a.cmp(&b), i.cmp(&j));
            assert_eq!(deque[b - (j as isize - i as isize)], deque[i]);
        }
    }

    #[test]
    fn mixed_workload_matches_vecdeque() {
        let mut rng = StdRng::seed_from_u64(0x5EED_2026);
        let mut deque = ChunkedDeque::new();
        let mut oracle = VecDeque::new();
        for step in 0..30_000_u64 {
            match rng.random_range(0..10) {
                0..=2 => {
                    deque.push_back(step).unwrap();
                    oracle.push_back(step);
                }
                3..=5 => {
                    deque.push_front(step).unwrap();
                    oracle.push_front(step);
                }
                6 => assert_eq!(deque.pop_back().ok(), oracle.pop_back()),
                7 => assert_eq!(deque.pop_front().ok(), oracle.pop_front()),
                8 if !oracle.is_empty() => {
                    let index = rng.random_range(0..oracle.len());
                    assert_eq!(deque.remove_at(index).ok(), oracle.remove(index));
                }
                _ => {
                    let index = rng.random_range(0..=oracle.len());
                    deque.insert_at(index, step).unwrap();
                    oracle.insert(index, step);
                }
            }
        }
        assert_eq!(deque.len(), oracle.len());
        assert!(deque.iter().eq(oracle.iter()));
    }
}
