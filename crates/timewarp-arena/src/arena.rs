//! The bump arena with per-shape free-list recycling.
//!
//! [`Arena`] hands out [`BlockRef`] offsets from a bump cursor over the
//! committed prefix of its [`Region`]. Released blocks are pushed onto a
//! free-list bucket keyed by their `(size, align)` shape and recycled in
//! O(1) by the next allocation of the same shape — the cursor never moves
//! backward. Every block ever returned stays in the allocation index,
//! released or not, so a snapshot can describe the full shape of the
//! live prefix.

use indexmap::IndexMap;
use smallvec::SmallVec;

use timewarp_core::{ArenaId, BlockRef};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::region::Region;

/// An allocation shape: `(size, align)` in bytes.
pub(crate) type Shape = (u32, u32);

/// A stack of released offsets sharing one shape.
pub(crate) type FreeBucket = SmallVec<[u32; 4]>;

/// Round `value` up to the next multiple of `align` (a power of two).
fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Bump allocator over one committed region, with free-list recycling.
///
/// The arena is a plain owned value: whichever component needs to
/// allocate from it takes it by `&mut` reference. There is no interior
/// mutability and no sharing — the host simulation is single-threaded
/// and save/load never overlap a step.
pub struct Arena {
    /// Unique identity, checked by snapshot restore.
    id: ArenaId,
    /// Backing reservation with committed prefix.
    pub(crate) region: Region,
    /// End of the live bump-allocated prefix, in bytes.
    pub(crate) cursor: usize,
    /// Released blocks, bucketed by shape. LIFO within a bucket so the
    /// most recently released block is reused first.
    pub(crate) free: IndexMap<Shape, FreeBucket>,
    /// Every block ever returned and not cleared: offset → shape.
    /// Released blocks stay indexed; only the free list marks them
    /// unused.
    pub(crate) index: IndexMap<u32, Shape>,
    config: ArenaConfig,
}

impl Arena {
    /// Create an arena, reserving `config.reserve_limit` bytes and
    /// committing `config.initial_commit` of them.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let mut region = Region::reserve(config.reserve_limit);
        region.commit(config.initial_commit)?;
        Ok(Self {
            id: ArenaId::next(),
            region,
            cursor: 0,
            free: IndexMap::new(),
            index: IndexMap::new(),
            config,
        })
    }

    /// This arena's unique identity.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Allocate `size` bytes at the given alignment.
    ///
    /// A free-list bucket of the exact `(size, align)` shape is consulted
    /// first; a hit pops its most recent entry in O(1) without moving the
    /// cursor. Otherwise the cursor is aligned and advanced, doubling the
    /// committed region (up to the reserve limit) if headroom runs out.
    /// The returned block is zero-filled either way.
    ///
    /// # Errors
    ///
    /// [`ArenaError::InvalidShape`] for a zero size or non-power-of-two
    /// alignment. [`ArenaError::CapacityExceeded`] if the allocation
    /// cannot fit under the reserve limit — checked before any state is
    /// mutated, so a failed call has no observable side effect. Both are
    /// unrecoverable: the arena was sized wrong for this run.
    pub fn alloc(&mut self, size: u32, align: u32) -> Result<BlockRef, ArenaError> {
        if size == 0 || !align.is_power_of_two() {
            return Err(ArenaError::InvalidShape { size, align });
        }

        // Exact-shape recycling.
        if let Some(bucket) = self.free.get_mut(&(size, align)) {
            if let Some(offset) = bucket.pop() {
                self.region
                    .bytes_mut(offset as usize, size as usize)
                    .fill(0);
                return Ok(BlockRef(offset));
            }
        }

        let offset = align_up(self.cursor, align as usize);
        let end = offset + size as usize;

        if end > self.region.committed() {
            if end > self.config.reserve_limit {
                return Err(ArenaError::CapacityExceeded {
                    requested: end,
                    limit: self.config.reserve_limit,
                });
            }
            let mut target = self.region.committed();
            while target < end {
                target *= 2;
            }
            self.region.commit(target.min(self.config.reserve_limit))?;
        }

        // Fresh commits are zeroed by the region, but after a restore the
        // bump space above the cursor can hold bytes from the discarded
        // timeline.
        self.region.bytes_mut(offset, size as usize).fill(0);
        self.index.insert(offset as u32, (size, align));
        self.cursor = end;
        Ok(BlockRef(offset as u32))
    }

    /// Release a block back to its shape's free-list bucket.
    ///
    /// The allocation index entry is kept — a later snapshot still needs
    /// to know the block's extent. Only the free list records that the
    /// block is currently unused.
    ///
    /// # Errors
    ///
    /// [`ArenaError::ForeignBlock`] if the offset was never returned by
    /// this arena, [`ArenaError::DoubleRelease`] if it is already on its
    /// free list. Both are programming errors and unrecoverable.
    pub fn release(&mut self, block: BlockRef) -> Result<(), ArenaError> {
        let shape = *self
            .index
            .get(&block.0)
            .ok_or(ArenaError::ForeignBlock { offset: block.0 })?;
        let bucket = self.free.entry(shape).or_default();
        if bucket.contains(&block.0) {
            return Err(ArenaError::DoubleRelease { offset: block.0 });
        }
        bucket.push(block.0);
        Ok(())
    }

    /// Reset the arena to empty: cursor to zero, free lists and index
    /// dropped. The committed region is kept for reuse.
    ///
    /// Only valid between unrelated simulation runs — every outstanding
    /// `BlockRef` and every snapshot of this arena becomes invalid.
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.free.clear();
        self.index.clear();
    }

    /// Shared access to a block's bytes.
    ///
    /// # Errors
    ///
    /// [`ArenaError::ForeignBlock`] if the offset is not in the
    /// allocation index.
    pub fn block_bytes(&self, block: BlockRef) -> Result<&[u8], ArenaError> {
        let &(size, _) = self
            .index
            .get(&block.0)
            .ok_or(ArenaError::ForeignBlock { offset: block.0 })?;
        Ok(self.region.bytes(block.0 as usize, size as usize))
    }

    /// Mutable access to a block's bytes.
    ///
    /// # Errors
    ///
    /// [`ArenaError::ForeignBlock`] if the offset is not in the
    /// allocation index.
    pub fn block_bytes_mut(&mut self, block: BlockRef) -> Result<&mut [u8], ArenaError> {
        let &(size, _) = self
            .index
            .get(&block.0)
            .ok_or(ArenaError::ForeignBlock { offset: block.0 })?;
        Ok(self.region.bytes_mut(block.0 as usize, size as usize))
    }

    /// The live bump-allocated prefix.
    pub fn live_bytes(&self) -> &[u8] {
        self.region.bytes(0, self.cursor)
    }

    /// Bytes used by the live prefix.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Bytes currently committed.
    pub fn committed(&self) -> usize {
        self.region.committed()
    }

    /// Number of blocks in the allocation index (released included).
    pub fn indexed_blocks(&self) -> usize {
        self.index.len()
    }
}
