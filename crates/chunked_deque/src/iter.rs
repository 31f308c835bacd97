use std::fmt;
use std::iter::FusedIterator;
use std::mem::{self, MaybeUninit};
use std::slice;

use crate::cursor::{Cursor, locate};
use crate::table::Block;
use crate::{BlockAllocator, ChunkedDeque, Global};

/// Borrowing iterator over a [`ChunkedDeque`], created by
/// [`ChunkedDeque::iter`].
///
/// Walks the live range with a pair of cursors, so `nth` and `nth_back` are
/// O(1) regardless of how many blocks they skip.
pub struct Iter<'a, T> {
    blocks: &'a [Block<T>],
    front: Cursor,
    end: Cursor,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(blocks: &'a [Block<T>], front: Cursor, end: Cursor) -> Self {
        Self { blocks, front, end }
    }

    fn remaining(&self) -> usize {
        (self.end - self.front) as usize
    }

    fn read(&self, at: Cursor) -> &'a T {
        let blocks: &'a [Block<T>] = self.blocks;
        // SAFETY: every slot in `[front, end)` is live for the duration of `'a`.
        unsafe { blocks[at.block_index()][at.offset()].assume_init_ref() }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.end {
            return None;
        }
        let item = self.read(self.front);
        self.front.inc();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining();
        (len, Some(len))
    }

    fn nth(&mut self, n: usize) -> Option<&'a T> {
        if n >= self.remaining() {
            self.front = self.end;
            return None;
        }
        self.front = locate(self.front, n);
        self.next()
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }

    fn count(self) -> usize {
        self.remaining()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.end {
            return None;
        }
        self.end.dec();
        Some(self.read(self.end))
    }

    fn nth_back(&mut self, n: usize) -> Option<&'a T> {
        if n >= self.remaining() {
            self.end = self.front;
            return None;
        }
        self.end -= n as isize;
        self.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable iterator over a [`ChunkedDeque`], created by
/// [`ChunkedDeque::iter_mut`].
pub struct IterMut<'a, T> {
    head: slice::IterMut<'a, MaybeUninit<T>>,
    blocks: slice::IterMut<'a, Block<T>>,
    tail: slice::IterMut<'a, MaybeUninit<T>>,
    len: usize,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(blocks: &'a mut [Block<T>], front: Cursor, len: usize) -> Self {
        let mut iter = Self {
            head: Default::default(),
            blocks: Default::default(),
            tail: Default::default(),
            len,
        };
        if len == 0 {
            return iter;
        }
        let last = locate(front, len - 1);
        let live = &mut blocks[front.block_index()..=last.block_index()];
        match live {
            [only] => iter.head = only[front.offset()..=last.offset()].iter_mut(),
            [first, middle @ .., final_block] => {
                iter.head = first[front.offset()..].iter_mut();
                iter.blocks = middle.iter_mut();
                iter.tail = final_block[..=last.offset()].iter_mut();
            }
            [] => unreachable!("live range spans at least one block"),
        }
        iter
    }
}

impl<T: fmt::Debug> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("len", &self.len).finish()
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        loop {
            if let Some(slot) = self.head.next() {
                self.len -= 1;
                // SAFETY: only live slots are reachable through the sub-slices.
                return Some(unsafe { slot.assume_init_mut() });
            }
            match self.blocks.next() {
                Some(block) => self.head = block.iter_mut(),
                None if self.tail.len() == 0 => return None,
                None => self.head = mem::take(&mut self.tail),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn nth(&mut self, mut n: usize) -> Option<&'a mut T> {
        if n >= self.len {
            self.len = 0;
            self.head = Default::default();
            self.blocks = Default::default();
            self.tail = Default::default();
            return None;
        }
        if n >= self.head.len() {
            n -= self.head.len();
            self.len -= self.head.len();
            self.head = Default::default();
            let whole = (n / crate::BLOCK_CAPACITY).min(self.blocks.len());
            if whole > 0 {
                self.blocks.nth(whole - 1);
                n -= whole * crate::BLOCK_CAPACITY;
                self.len -= whole * crate::BLOCK_CAPACITY;
            }
        }
        while n > 0 {
            self.next();
            n -= 1;
        }
        self.next()
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        loop {
            if let Some(slot) = self.tail.next_back() {
                self.len -= 1;
                // SAFETY: only live slots are reachable through the sub-slices.
                return Some(unsafe { slot.assume_init_mut() });
            }
            match self.blocks.next_back() {
                Some(block) => self.tail = block.iter_mut(),
                None if self.head.len() == 0 => return None,
                None => self.tail = mem::take(&mut self.head),
            }
        }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator over a [`ChunkedDeque`], created by its
/// [`IntoIterator`] impl.
pub struct IntoIter<T, A: BlockAllocator = Global> {
    inner: ChunkedDeque<T, A>,
}

impl<T, A: BlockAllocator> IntoIter<T, A> {
    pub(crate) fn new(inner: ChunkedDeque<T, A>) -> Self {
        Self { inner }
    }
}

impl<T: fmt::Debug, A: BlockAllocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.inner).finish()
    }
}

impl<T, A: BlockAllocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.pop_front().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len();
        (len, Some(len))
    }
}

impl<T, A: BlockAllocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.pop_back().ok()
    }
}

impl<T, A: BlockAllocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: BlockAllocator> FusedIterator for IntoIter<T, A> {}
