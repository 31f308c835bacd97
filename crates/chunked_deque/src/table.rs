use std::mem::MaybeUninit;
use std::ops::Range;

use crate::cursor::Cursor;
use crate::{AllocError, BLOCK_CAPACITY, BlockAllocator, INITIAL_BLOCKS};

const C: usize = BLOCK_CAPACITY;

pub(crate) type Block<T> = Box<[MaybeUninit<T>]>;

/// Owned table of equally sized blocks.
///
/// The table never looks at slot contents: which slots are live is tracked by
/// the deque's cursors. Only block handles move when the table is resized.
pub(crate) struct BlockTable<T, A: BlockAllocator> {
    blocks: Vec<Block<T>>,
    alloc: A,
}

impl<T, A: BlockAllocator> BlockTable<T, A> {
    pub(crate) const fn new(alloc: A) -> Self {
        Self {
            blocks: Vec::new(),
            alloc,
        }
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    pub(crate) fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.blocks.len() * C
    }

    pub(crate) fn is_allocated(&self) -> bool {
        !self.blocks.is_empty()
    }

    pub(crate) fn blocks(&self) -> &[Block<T>] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut [Block<T>] {
        &mut self.blocks
    }

    fn allocate_block(&self) -> Result<Block<T>, AllocError> {
        let block = self.alloc.allocate::<T>(C)?;
        if block.len() != C {
            let len = block.len();
            self.alloc.deallocate(block, len);
            return Err(AllocError);
        }
        Ok(block)
    }

    /// Allocates the first batch of blocks. On failure nothing stays allocated.
    pub(crate) fn initial_allocate(&mut self) -> Result<(), AllocError> {
        debug_assert!(self.blocks.is_empty());
        self.blocks
            .try_reserve_exact(INITIAL_BLOCKS)
            .map_err(|_| AllocError)?;
        for _ in 0..INITIAL_BLOCKS {
            match self.allocate_block() {
                Ok(block) => self.blocks.push(block),
                Err(err) => {
                    self.release();
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Triples the block count. The existing blocks end up in the middle
    /// third; the returned value is how many blocks they moved right.
    ///
    /// On failure every block allocated by this call is returned and the
    /// table is left as it was.
    pub(crate) fn grow(&mut self) -> Result<usize, AllocError> {
        let old = self.blocks.len();
        debug_assert!(old > 0);
        let fresh = old.checked_mul(2).ok_or(AllocError)?;
        self.blocks
            .try_reserve_exact(fresh)
            .map_err(|_| AllocError)?;
        for _ in 0..fresh {
            match self.allocate_block() {
                Ok(block) => self.blocks.push(block),
                Err(err) => {
                    for block in self.blocks.drain(old..) {
                        self.alloc.deallocate(block, C);
                    }
                    return Err(err);
                }
            }
        }
        self.blocks.rotate_right(old);
        Ok(old)
    }

    /// Cuts the table down to `target` blocks, keeping the blocks in `live`
    /// and placing them in the middle. Returns the new index of `live.start`.
    pub(crate) fn shrink(&mut self, target: usize, live: Range<usize>) -> usize {
        let spanned = live.len();
        debug_assert!(spanned < target && target < self.blocks.len());
        let lead = (target - spanned) / 2;
        if live.start > lead {
            self.blocks.rotate_left(live.start - lead);
        } else {
            self.blocks.rotate_right(lead - live.start);
        }
        for block in self.blocks.drain(target..) {
            self.alloc.deallocate(block, C);
        }
        lead
    }

    /// Returns every block to the strategy. All slots must be vacant.
    pub(crate) fn release(&mut self) {
        for block in self.blocks.drain(..) {
            self.alloc.deallocate(block, C);
        }
        self.blocks = Vec::new();
    }

    pub(crate) fn slot(&self, at: Cursor) -> &MaybeUninit<T> {
        &self.blocks[at.block_index()][at.offset()]
    }

    pub(crate) fn slot_mut(&mut self, at: Cursor) -> &mut MaybeUninit<T> {
        &mut self.blocks[at.block_index()][at.offset()]
    }

    pub(crate) fn construct(&mut self, at: Cursor, value: T) {
        let slot = &mut self.blocks[at.block_index()][at.offset()];
        self.alloc.construct(slot, value);
    }

    /// # Safety
    ///
    /// The slot at `at` must be live.
    pub(crate) unsafe fn destroy(&mut self, at: Cursor) {
        let slot = &mut self.blocks[at.block_index()][at.offset()];
        unsafe { self.alloc.destroy(slot) }
    }

    /// # Safety
    ///
    /// The slot at `at` must be live.
    pub(crate) unsafe fn take(&mut self, at: Cursor) -> T {
        let slot = &mut self.blocks[at.block_index()][at.offset()];
        unsafe { self.alloc.take(slot) }
    }

    /// Exchanges the contents of two slots.
    pub(crate) fn swap(&mut self, a: Cursor, b: Cursor) {
        if a.block() == b.block() {
            self.blocks[a.block_index()].swap(a.offset(), b.offset());
            return;
        }
        let (lo, hi) = if a.block() < b.block() { (a, b) } else { (b, a) };
        let (left, right) = self.blocks.split_at_mut(hi.block_index());
        std::mem::swap(&mut left[lo.block_index()][lo.offset()], &mut right[0][hi.offset()]);
    }
}

impl<T, A: BlockAllocator> Drop for BlockTable<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}
