use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::{Index, IndexMut};

use crate::cursor::{Cursor, index_of, locate};
use crate::iter::{IntoIter, Iter, IterMut};
use crate::table::BlockTable;
use crate::{AllocError, BLOCK_CAPACITY, BlockAllocator, Error, Global, INITIAL_BLOCKS};

const C: usize = BLOCK_CAPACITY;

/// A double-ended queue stored as a table of fixed-size blocks.
///
/// Pushing and popping at either end is amortized O(1) and never moves
/// elements; indexing is O(1). See the [crate documentation](crate) for the
/// growth policy and failure guarantees.
pub struct ChunkedDeque<T, A: BlockAllocator = Global> {
    table: BlockTable<T, A>,
    // First live slot.
    front: Cursor,
    // One past the last live slot; equal to `front` when empty.
    end: Cursor,
    len: usize,
}

#[cold]
#[track_caller]
fn allocation_failed(err: AllocError) -> ! {
    panic!("chunked deque: {err}")
}

impl<T> ChunkedDeque<T> {
    /// Creates an empty deque. No blocks are allocated until the first push.
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a deque of `len` default elements.
    ///
    /// # Panics
    ///
    /// Panics if the block table cannot be allocated.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::try_with_len_in(len, Global).unwrap_or_else(|err| match err {
            Error::AllocationFailure(err) => allocation_failed(err),
            _ => unreachable!("default construction is infallible"),
        })
    }

    /// Creates a deque of `len` clones of `value`.
    ///
    /// # Panics
    ///
    /// Panics if the block table cannot be allocated.
    pub fn from_elem(len: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::try_from_elem_in(len, value, Global).unwrap_or_else(|err| match err {
            Error::AllocationFailure(err) => allocation_failed(err),
            _ => unreachable!("cloning is infallible"),
        })
    }
}

impl<T, A: BlockAllocator> ChunkedDeque<T, A> {
    pub const fn new_in(alloc: A) -> Self {
        Self {
            table: BlockTable::new(alloc),
            front: Cursor::new(0, 0),
            end: Cursor::new(0, 0),
            len: 0,
        }
    }

    /// Fallible [`with_len`](ChunkedDeque::with_len) with an explicit strategy.
    /// Nothing is leaked on failure.
    pub fn try_with_len_in(len: usize, alloc: A) -> Result<Self, Error>
    where
        T: Default,
    {
        let mut deque = Self::new_in(alloc);
        for _ in 0..len {
            deque.push_back(T::default())?;
        }
        Ok(deque)
    }

    pub fn try_from_elem_in(len: usize, value: T, alloc: A) -> Result<Self, Error>
    where
        T: Clone,
    {
        let mut deque = Self::new_in(alloc);
        for _ in 1..len {
            deque.push_back(value.clone())?;
        }
        if len > 0 {
            deque.push_back(value)?;
        }
        Ok(deque)
    }

    pub fn allocator(&self) -> &A {
        self.table.allocator()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of blocks currently owned, used or not.
    pub fn block_count(&self) -> usize {
        self.table.block_count()
    }

    /// Slots owned by the block table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    fn check_invariants(&self) {
        debug_assert_eq!(self.end - self.front, self.len as isize);
        debug_assert!(self.front.abs() >= 0);
        debug_assert!(self.end.abs() <= self.table.capacity() as isize);
    }


    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: `index < len`, so the slot is live.
        Some(unsafe { self.get_unchecked(index) })
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: `index < len`, so the slot is live.
        Some(unsafe { self.get_unchecked_mut(index) })
    }

    /// Checked access.
    pub fn at(&self, index: usize) -> Result<&T, Error> {
        let len = self.len;
        self.get(index).ok_or(Error::IndexOutOfRange { index, len })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        let len = self.len;
        self.get_mut(index).ok_or(Error::IndexOutOfRange { index, len })
    }

    /// # Safety
    ///
    /// `index` must be less than `len()`.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        let slot = self.table.slot(locate(self.front, index));
        unsafe { slot.assume_init_ref() }
    }

    /// # Safety
    ///
    /// `index` must be less than `len()`.
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        let slot = self.table.slot_mut(locate(self.front, index));
        unsafe { slot.assume_init_mut() }
    }

    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.len.checked_sub(1).and_then(|last| self.get_mut(last))
    }


    /// Cursor to the first element (equal to [`end`](Self::end) when empty).
    pub fn begin(&self) -> Cursor {
        self.front
    }

    /// Cursor one past the last element.
    pub fn end(&self) -> Cursor {
        self.end
    }

    /// Logical index of a cursor inside `[begin, end]`.
    fn position(&self, pos: Cursor, inclusive_end: bool) -> Result<usize, Error> {
        let len = self.len;
        let index = index_of(self.front, pos).ok_or(Error::IndexOutOfRange {
            index: usize::MAX,
            len,
        })?;
        if index < len || (inclusive_end && index == len) {
            Ok(index)
        } else {
            Err(Error::IndexOutOfRange { index, len })
        }
    }

    /// Dereferences a cursor; `None` when it is outside the live range.
    pub fn cursor_get(&self, pos: Cursor) -> Option<&T> {
        let index = self.position(pos, false).ok()?;
        self.get(index)
    }

    pub fn cursor_get_mut(&mut self, pos: Cursor) -> Option<&mut T> {
        let index = self.position(pos, false).ok()?;
        self.get_mut(index)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.table.blocks(), self.front, self.end)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.table.blocks_mut(), self.front, self.len)
    }


    fn initial_allocate(&mut self) -> Result<(), AllocError> {
        self.table.initial_allocate()?;
        self.front = Cursor::new(INITIAL_BLOCKS / 2, C / 2);
        self.end = self.front;
        Ok(())
    }

    /// Triples the table. If that fails the deque drops all of its elements
    /// and storage before reporting the error.
    fn grow(&mut self) -> Result<(), AllocError> {
        match self.table.grow() {
            Ok(shift) => {
                self.front = self.front.shift_blocks(shift);
                self.end = self.end.shift_blocks(shift);
                self.check_invariants();
                Ok(())
            }
            Err(err) => {
                self.release();
                Err(err)
            }
        }
    }

    fn reserve_back(&mut self) -> Result<(), AllocError> {
        if !self.table.is_allocated() {
            self.initial_allocate()
        } else if self.end.abs() == self.table.capacity() as isize {
            self.grow()
        } else {
            Ok(())
        }
    }

    fn reserve_front(&mut self) -> Result<(), AllocError> {
        if !self.table.is_allocated() {
            self.initial_allocate()
        } else if self.front.abs() == 0 {
            self.grow()
        } else {
            Ok(())
        }
    }

    /// Gives surplus blocks back once at most a quarter of the table is live.
    fn decrease_capacity(&mut self) {
        let blocks = self.table.block_count();
        if blocks <= INITIAL_BLOCKS || self.len * 4 > self.table.capacity() {
            return;
        }
        let live = if self.len == 0 {
            0..0
        } else {
            self.front.block_index()..(self.end - 1).block_index() + 1
        };
        let target = (blocks / 2).max(INITIAL_BLOCKS).max(live.len() + 2);
        if target >= blocks {
            return;
        }
        let lead = self.table.shrink(target, live);
        self.front = if self.len == 0 {
            Cursor::new(lead, C / 2)
        } else {
            Cursor::new(lead, self.front.offset())
        };
        self.end = locate(self.front, self.len);
        self.check_invariants();
    }

    fn release(&mut self) {
        self.drop_elements();
        self.table.release();
        self.front = Cursor::default();
        self.end = Cursor::default();
    }


    /// Appends an element.
    ///
    /// Fails only if the block table has to grow and cannot. In that case the
    /// deque is emptied and its storage released (basic guarantee).
    pub fn push_back(&mut self, value: T) -> Result<(), Error> {
        self.emplace_back(|| Ok(value))
    }

    pub fn push_front(&mut self, value: T) -> Result<(), Error> {
        self.emplace_front(|| Ok(value))
    }

    /// Appends the element produced by `make`.
    ///
    /// Storage is secured before `make` runs. If `make` fails or panics the
    /// deque is observably unchanged. Block table failure has the same basic
    /// guarantee as [`push_back`](Self::push_back).
    pub fn emplace_back<E, F>(&mut self, make: F) -> Result<(), Error<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.reserve_back()?;
        let value = make().map_err(Error::ElementConstruction)?;
        self.table.construct(self.end, value);
        self.end.inc();
        self.len += 1;
        self.check_invariants();
        Ok(())
    }

    /// Prepends the element produced by `make`; see
    /// [`emplace_back`](Self::emplace_back).
    pub fn emplace_front<E, F>(&mut self, make: F) -> Result<(), Error<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.reserve_front()?;
        let value = make().map_err(Error::ElementConstruction)?;
        let slot = self.front - 1;
        self.table.construct(slot, value);
        self.front = slot;
        self.len += 1;
        self.check_invariants();
        Ok(())
    }

    pub fn pop_back(&mut self) -> Result<T, Error> {
        if self.len == 0 {
            return Err(Error::EmptyContainer);
        }
        self.end.dec();
        self.len -= 1;
        // SAFETY: the slot was the last live one.
        let value = unsafe { self.table.take(self.end) };
        self.decrease_capacity();
        Ok(value)
    }

    pub fn pop_front(&mut self) -> Result<T, Error> {
        if self.len == 0 {
            return Err(Error::EmptyContainer);
        }
        let slot = self.front;
        self.front.inc();
        self.len -= 1;
        // SAFETY: the slot was the first live one.
        let value = unsafe { self.table.take(slot) };
        self.decrease_capacity();
        Ok(value)
    }

    /// Drops every element and trims the table back to
    /// [`INITIAL_BLOCKS`] blocks.
    pub fn clear(&mut self) {
        self.drop_elements();
        if self.table.block_count() > INITIAL_BLOCKS {
            let lead = self.table.shrink(INITIAL_BLOCKS, 0..0);
            self.front = Cursor::new(lead, C / 2);
            self.end = self.front;
        }
        self.check_invariants();
    }

    fn drop_elements(&mut self) {
        while self.len > 0 {
            let slot = self.front;
            self.front.inc();
            self.len -= 1;
            // SAFETY: the slot was the first live one and is no longer reachable.
            unsafe { self.table.destroy(slot) };
        }
        self.end = self.front;
    }


    /// Swaps the elements at logical indices `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn swap(&mut self, i: usize, j: usize) {
        assert!(i < self.len, "index out of bounds: the len is {} but the index is {i}", self.len);
        assert!(j < self.len, "index out of bounds: the len is {} but the index is {j}", self.len);
        self.table.swap(locate(self.front, i), locate(self.front, j));
    }

    /// Inserts `value` before `pos` and returns a cursor to it.
    ///
    /// Existing elements are shifted from whichever end is nearer, so the
    /// cost is O(min(k, len - k)) for logical position `k`. Inserting at
    /// `begin()` or `end()` is exactly `push_front` / `push_back`.
    pub fn insert(&mut self, pos: Cursor, value: T) -> Result<Cursor, Error> {
        self.emplace(pos, || Ok(value))
    }

    pub fn emplace<E, F>(&mut self, pos: Cursor, make: F) -> Result<Cursor, Error<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let index = self.position(pos, true).map_err(widen)?;
        self.emplace_at(index, make)?;
        Ok(locate(self.front, index))
    }

    pub fn insert_at(&mut self, index: usize, value: T) -> Result<(), Error> {
        if index > self.len {
            return Err(Error::IndexOutOfRange { index, len: self.len });
        }
        self.emplace_at(index, || Ok(value))
    }

    fn emplace_at<E, F>(&mut self, index: usize, make: F) -> Result<(), Error<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        debug_assert!(index <= self.len);
        if index < self.len - index {
            self.emplace_front(make)?;
            for i in 0..index {
                self.swap(i, i + 1);
            }
        } else {
            self.emplace_back(make)?;
            for i in (index..self.len - 1).rev() {
                self.swap(i, i + 1);
            }
        }
        Ok(())
    }

    /// Removes the element at `pos`, returning it together with a cursor to
    /// the element that followed it.
    ///
    /// Shifts from the nearer end. `erase(begin())` is exactly `pop_front`
    /// and `erase(end() - 1)` is exactly `pop_back`.
    pub fn erase(&mut self, pos: Cursor) -> Result<(T, Cursor), Error> {
        let index = self.position(pos, false)?;
        let value = self.remove_unchecked(index);
        Ok((value, locate(self.front, index)))
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T, Error> {
        if index >= self.len {
            return Err(Error::IndexOutOfRange { index, len: self.len });
        }
        Ok(self.remove_unchecked(index))
    }

    fn remove_unchecked(&mut self, index: usize) -> T {
        debug_assert!(index < self.len);
        let popped = if index < self.len - 1 - index {
            for i in (0..index).rev() {
                self.swap(i, i + 1);
            }
            self.pop_front()
        } else {
            for i in index..self.len - 1 {
                self.swap(i, i + 1);
            }
            self.pop_back()
        };
        match popped {
            Ok(value) => value,
            Err(_) => unreachable!("deque holds the element being removed"),
        }
    }


    /// Deep copy with a fallible per-element copy. On failure the partial
    /// copy is dropped and `self` is untouched.
    pub fn try_clone_with<E, F>(&self, mut copy: F) -> Result<Self, Error<E>>
    where
        F: FnMut(&T) -> Result<T, E>,
    {
        self.copy_into(Self::new_in(self.allocator().select_on_copy()), &mut copy)
    }

    pub fn try_clone(&self) -> Result<Self, Error>
    where
        T: Clone,
    {
        self.try_clone_with(|value| Ok(value.clone()))
    }

    /// Replaces the contents with a copy of `source`. The copy is built in
    /// full before anything is dropped, so on failure `self` is unchanged.
    ///
    /// The strategy is taken from `source` when
    /// [`BlockAllocator::PROPAGATE_ON_COPY_ASSIGN`] is set and kept otherwise.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), Error>
    where
        T: Clone,
    {
        let alloc = if A::PROPAGATE_ON_COPY_ASSIGN {
            source.allocator().clone()
        } else {
            self.allocator().clone()
        };
        let mut clone = |value: &T| Ok::<T, Infallible>(value.clone());
        let copy = source.copy_into(Self::new_in(alloc), &mut clone)?;
        *self = copy;
        Ok(())
    }

    fn copy_into<E, F>(&self, mut target: Self, copy: &mut F) -> Result<Self, Error<E>>
    where
        F: FnMut(&T) -> Result<T, E>,
    {
        for value in self.iter() {
            target.emplace_back(|| copy(value))?;
        }
        Ok(target)
    }

    /// Moves the contents out, leaving `self` empty with a copy of its
    /// strategy.
    pub fn take(&mut self) -> Self {
        let empty = Self::new_in(self.allocator().clone());
        mem::replace(self, empty)
    }
}

fn widen<E>(err: Error) -> Error<E> {
    match err {
        Error::EmptyContainer => Error::EmptyContainer,
        Error::IndexOutOfRange { index, len } => Error::IndexOutOfRange { index, len },
        Error::AllocationFailure(err) => Error::AllocationFailure(err),
        Error::ElementConstruction(never) => match never {},
    }
}

impl<T, A: BlockAllocator> Drop for ChunkedDeque<T, A> {
    fn drop(&mut self) {
        self.drop_elements();
    }
}

impl<T> Default for ChunkedDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: BlockAllocator> Clone for ChunkedDeque<T, A> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(Error::AllocationFailure(err)) => allocation_failed(err),
            Err(_) => unreachable!("cloning is infallible"),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        match self.try_clone_from(source) {
            Ok(()) => {}
            Err(Error::AllocationFailure(err)) => allocation_failed(err),
            Err(_) => unreachable!("cloning is infallible"),
        }
    }
}

impl<T: fmt::Debug, A: BlockAllocator> fmt::Debug for ChunkedDeque<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, A: BlockAllocator> Index<usize> for ChunkedDeque<T, A> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index out of bounds: the len is {} but the index is {index}", self.len),
        }
    }
}

impl<T, A: BlockAllocator> IndexMut<usize> for ChunkedDeque<T, A> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index out of bounds: the len is {len} but the index is {index}"),
        }
    }
}

impl<T, A: BlockAllocator> Index<Cursor> for ChunkedDeque<T, A> {
    type Output = T;

    #[track_caller]
    fn index(&self, pos: Cursor) -> &T {
        match self.cursor_get(pos) {
            Some(value) => value,
            None => panic!("cursor {pos:?} is outside the live range"),
        }
    }
}

impl<T, A: BlockAllocator> IndexMut<Cursor> for ChunkedDeque<T, A> {
    #[track_caller]
    fn index_mut(&mut self, pos: Cursor) -> &mut T {
        match self.cursor_get_mut(pos) {
            Some(value) => value,
            None => panic!("cursor {pos:?} is outside the live range"),
        }
    }
}

impl<T, A: BlockAllocator> Extend<T> for ChunkedDeque<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            if let Err(Error::AllocationFailure(err)) = self.push_back(value) {
                allocation_failed(err);
            }
        }
    }
}

impl<'a, T: Copy + 'a, A: BlockAllocator> Extend<&'a T> for ChunkedDeque<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for ChunkedDeque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T, const N: usize> From<[T; N]> for ChunkedDeque<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> From<Vec<T>> for ChunkedDeque<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T, A: BlockAllocator> IntoIterator for ChunkedDeque<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        IntoIter::new(self)
    }
}

impl<'a, T, A: BlockAllocator> IntoIterator for &'a ChunkedDeque<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, A: BlockAllocator> IntoIterator for &'a mut ChunkedDeque<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

impl<T: PartialEq<U>, U, A: BlockAllocator, B: BlockAllocator> PartialEq<ChunkedDeque<U, B>>
    for ChunkedDeque<T, A>
{
    fn eq(&self, other: &ChunkedDeque<U, B>) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq, A: BlockAllocator> Eq for ChunkedDeque<T, A> {}

macro_rules! impl_slice_eq {
    ([$($vars:tt)*] $rhs:ty) => {
        impl<T: PartialEq<U>, U, A: BlockAllocator, $($vars)*> PartialEq<$rhs> for ChunkedDeque<T, A> {
            fn eq(&self, other: &$rhs) -> bool {
                self.len == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
            }
        }
    };
}

impl_slice_eq! { [] Vec<U> }
impl_slice_eq! { [] &[U] }
impl_slice_eq! { [] &mut [U] }
impl_slice_eq! { [const N: usize] [U; N] }
impl_slice_eq! { [const N: usize] &[U; N] }

impl<T: PartialOrd, A: BlockAllocator> PartialOrd for ChunkedDeque<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: BlockAllocator> Ord for ChunkedDeque<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, A: BlockAllocator> Hash for ChunkedDeque<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        self.iter().for_each(|elem| elem.hash(state));
    }
}
