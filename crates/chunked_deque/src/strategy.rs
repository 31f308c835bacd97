use std::mem::MaybeUninit;

use crate::AllocError;

/// Allocation strategy of a [`ChunkedDeque`](crate::ChunkedDeque).
///
/// The deque asks the strategy for whole blocks and routes every element
/// construction and destruction through it, so an instrumented strategy sees
/// the complete memory and object lifecycle of the container.
pub trait BlockAllocator: Clone {
    /// Whether `clone_from` replaces the target's strategy with the source's.
    const PROPAGATE_ON_COPY_ASSIGN: bool = false;

    /// Returns storage for exactly `capacity` vacant slots.
    fn allocate<T>(&self, capacity: usize) -> Result<Box<[MaybeUninit<T>]>, AllocError>;

    /// Takes back storage obtained from [`allocate`](Self::allocate). Every
    /// slot is vacant.
    fn deallocate<T>(&self, block: Box<[MaybeUninit<T>]>, capacity: usize);

    fn construct<T>(&self, slot: &mut MaybeUninit<T>, value: T) {
        slot.write(value);
    }

    /// Drops the element in `slot` in place.
    ///
    /// # Safety
    ///
    /// `slot` must hold an initialized element, which is vacant afterwards.
    unsafe fn destroy<T>(&self, slot: &mut MaybeUninit<T>) {
        unsafe { slot.assume_init_drop() }
    }

    /// Moves the element out of `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must hold an initialized element, which is vacant afterwards.
    unsafe fn take<T>(&self, slot: &mut MaybeUninit<T>) -> T {
        unsafe { slot.assume_init_read() }
    }

    /// Strategy used by a copy of a container owning `self`.
    fn select_on_copy(&self) -> Self {
        self.clone()
    }
}

/// The process-wide heap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

impl BlockAllocator for Global {
    fn allocate<T>(&self, capacity: usize) -> Result<Box<[MaybeUninit<T>]>, AllocError> {
        let mut block = Vec::new();
        block
            .try_reserve_exact(capacity)
            .map_err(|_| AllocError)?;
        block.resize_with(capacity, MaybeUninit::uninit);
        Ok(block.into_boxed_slice())
    }

    fn deallocate<T>(&self, block: Box<[MaybeUninit<T>]>, capacity: usize) {
        debug_assert_eq!(block.len(), capacity);
        drop(block);
    }
}
