//! Instrumented strategy and element types shared by the unit tests.

use std::cell::Cell;
use std::fmt;
use std::mem::MaybeUninit;
use std::rc::Rc;

use crate::{AllocError, BlockAllocator, Global};

#[derive(Default)]
struct Counters {
    outstanding_blocks: Cell<usize>,
    peak_blocks: Cell<usize>,
    live_elements: Cell<usize>,
    block_budget: Cell<Option<usize>>,
}

/// Counts blocks and elements; optionally refuses blocks once a budget of
/// successful block allocations is spent.
#[derive(Clone, Default)]
pub(crate) struct CountingAlloc {
    counters: Rc<Counters>,
}

impl CountingAlloc {
    pub(crate) fn with_block_budget(budget: usize) -> Self {
        let alloc = Self::default();
        alloc.set_block_budget(Some(budget));
        alloc
    }

    pub(crate) fn set_block_budget(&self, budget: Option<usize>) {
        self.counters.block_budget.set(budget);
    }

    pub(crate) fn outstanding_blocks(&self) -> usize {
        self.counters.outstanding_blocks.get()
    }

    pub(crate) fn peak_blocks(&self) -> usize {
        self.counters.peak_blocks.get()
    }

    pub(crate) fn live_elements(&self) -> usize {
        self.counters.live_elements.get()
    }
}

impl BlockAllocator for CountingAlloc {
    fn allocate<T>(&self, capacity: usize) -> Result<Box<[MaybeUninit<T>]>, AllocError> {
        let c = &self.counters;
        if let Some(budget) = c.block_budget.get() {
            if budget == 0 {
                return Err(AllocError);
            }
            c.block_budget.set(Some(budget - 1));
        }
        let block = Global.allocate(capacity)?;
        c.outstanding_blocks.set(c.outstanding_blocks.get() + 1);
        c.peak_blocks
            .set(c.peak_blocks.get().max(c.outstanding_blocks.get()));
        Ok(block)
    }

    fn deallocate<T>(&self, block: Box<[MaybeUninit<T>]>, capacity: usize) {
        let c = &self.counters;
        c.outstanding_blocks.set(c.outstanding_blocks.get() - 1);
        Global.deallocate(block, capacity);
    }

    fn construct<T>(&self, slot: &mut MaybeUninit<T>, value: T) {
        let c = &self.counters;
        c.live_elements.set(c.live_elements.get() + 1);
        slot.write(value);
    }

    unsafe fn destroy<T>(&self, slot: &mut MaybeUninit<T>) {
        let c = &self.counters;
        c.live_elements.set(c.live_elements.get() - 1);
        unsafe { slot.assume_init_drop() }
    }

    unsafe fn take<T>(&self, slot: &mut MaybeUninit<T>) -> T {
        let c = &self.counters;
        c.live_elements.set(c.live_elements.get() - 1);
        unsafe { slot.assume_init_read() }
    }
}

/// Like [`CountingAlloc`] but hands its state to assignment targets.
#[derive(Clone, Default)]
pub(crate) struct PropagatingAlloc(pub(crate) CountingAlloc);

impl BlockAllocator for PropagatingAlloc {
    const PROPAGATE_ON_COPY_ASSIGN: bool = true;

    fn allocate<T>(&self, capacity: usize) -> Result<Box<[MaybeUninit<T>]>, AllocError> {
        self.0.allocate(capacity)
    }

    fn deallocate<T>(&self, block: Box<[MaybeUninit<T>]>, capacity: usize) {
        self.0.deallocate(block, capacity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConstructError;

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("constructor refused")
    }
}

/// Element factory whose `k`-th invocation (1-based) fails.
pub(crate) struct FailOnNth {
    calls: usize,
    fail_at: usize,
}

impl FailOnNth {
    pub(crate) fn new(fail_at: usize) -> Self {
        Self { calls: 0, fail_at }
    }

    pub(crate) fn make(&mut self, value: u64) -> Result<u64, ConstructError> {
        self.calls += 1;
        if self.calls == self.fail_at {
            Err(ConstructError)
        } else {
            Ok(value)
        }
    }
}

/// Counts its own drops through a shared counter.
#[derive(Debug)]
pub(crate) struct DropCounter {
    pub(crate) value: u64,
    drops: Rc<Cell<usize>>,
}

impl DropCounter {
    pub(crate) fn new(value: u64, drops: &Rc<Cell<usize>>) -> Self {
        Self {
            value,
            drops: Rc::clone(drops),
        }
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}
