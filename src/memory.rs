use std::marker::PhantomData;

use crate::block::Block;
use crate::params::Layout;

/// Working memory for a single derivation.
///
/// The matrix is allocated zero-filled, never resized, and every block is scrubbed when the
/// matrix is dropped, including on unwinding.
pub(crate) struct Memory {
    blocks: Vec<Block>,
    lanes: u32,
    lane_len: u32,
}

impl Memory {
    pub(crate) fn new(layout: &Layout) -> Self {
        Self {
            blocks: vec![Block::zero(); layout.block_count as usize],
            lanes: layout.lanes,
            lane_len: layout.lane_len,
        }
    }

    #[inline]
    fn offset(&self, lane: u32, column: u32) -> usize {
        assert!(
            lane < self.lanes && column < self.lane_len,
            "block index out of range"
        );
        lane as usize * self.lane_len as usize + column as usize
    }

    pub(crate) fn block(&self, lane: u32, column: u32) -> &Block {
        &self.blocks[self.offset(lane, column)]
    }

    pub(crate) fn block_mut(&mut self, lane: u32, column: u32) -> &mut Block {
        let offset = self.offset(lane, column);
        &mut self.blocks[offset]
    }

    /// XOR of the last block of every lane.
    pub(crate) fn last_column_xor(&self) -> Block {
        let last = self.lane_len - 1;
        let mut acc = self.block(0, last).clone();
        for lane in 1..self.lanes {
            acc.xor_with(self.block(lane, last));
        }
        acc
    }

    /// A view of the matrix that lane workers can share across threads.
    pub(crate) fn shared(&mut self) -> SharedMemory<'_> {
        SharedMemory {
            base: self.blocks.as_mut_ptr(),
            lanes: self.lanes,
            lane_len: self.lane_len,
            _memory: PhantomData,
        }
    }
}

/// Shared view of a [`Memory`] for the duration of one slice.
///
/// Within a slice every lane worker writes only the blocks of its own segment, and reads
/// only blocks of its own lane or blocks finished in earlier slices, so no two threads ever
/// touch the same block while one of them writes it. The accessors are `unsafe` because
/// that discipline is what makes them sound.
#[derive(Clone, Copy)]
pub(crate) struct SharedMemory<'a> {
    base: *mut Block,
    lanes: u32,
    lane_len: u32,
    _memory: PhantomData<&'a mut Memory>,
}

// SAFETY: workers access disjoint blocks for writing; see the type-level documentation.
unsafe impl Send for SharedMemory<'_> {}
unsafe impl Sync for SharedMemory<'_> {}

impl SharedMemory<'_> {
    #[inline]
    fn offset(&self, lane: u32, column: u32) -> usize {
        assert!(
            lane < self.lanes && column < self.lane_len,
            "block index out of range"
        );
        lane as usize * self.lane_len as usize + column as usize
    }

    /// # Safety
    ///
    /// No thread may hold a mutable reference to the block at `(lane, column)` while the
    /// returned reference is alive.
    #[inline]
    pub(crate) unsafe fn block(&self, lane: u32, column: u32) -> &Block {
        &*self.base.add(self.offset(lane, column))
    }

    /// # Safety
    ///
    /// The caller must be the only thread accessing the block at `(lane, column)` while the
    /// returned reference is alive.
    #[allow(clippy::mut_from_ref)]
    #[inline]
    pub(crate) unsafe fn block_mut(&self, lane: u32, column: u32) -> &mut Block {
        &mut *self.base.add(self.offset(lane, column))
    }
}
