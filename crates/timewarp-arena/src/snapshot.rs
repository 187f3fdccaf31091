//! Independently-owned arena snapshots.
//!
//! An [`ArenaSnapshot`] captures the live prefix of one arena together
//! with the shape of its free lists and allocation index. Snapshots own
//! their storage outright: any number of them, taken at different steps,
//! can coexist without aliasing, and restoring one does not disturb the
//! others. Freeing a snapshot is `Drop` and never touches the live arena.

use indexmap::IndexMap;

use timewarp_core::ArenaId;

use crate::arena::{Arena, FreeBucket, Shape};
use crate::error::ArenaError;

/// An immutable copy of one arena's state at a point in time.
///
/// The free-list offsets inside the snapshot are copied as raw values,
/// never dereferenced — they are opaque to the snapshot and only regain
/// meaning once restored into the arena they came from.
#[derive(Clone)]
pub struct ArenaSnapshot {
    /// Identity of the source arena. Restore rejects a mismatch.
    arena: ArenaId,
    /// The live prefix at capture time (`used()` bytes, not the full
    /// committed region).
    bytes: Vec<u8>,
    /// Deep copy of the free-list buckets.
    free: IndexMap<Shape, FreeBucket>,
    /// Deep copy of the allocation index.
    index: IndexMap<u32, Shape>,
}

impl ArenaSnapshot {
    /// Identity of the arena this snapshot was taken from.
    pub fn arena_id(&self) -> ArenaId {
        self.arena
    }

    /// Length of the captured live prefix in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the captured prefix is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The captured bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Arena {
    /// Capture the arena's current state into an owned snapshot.
    ///
    /// Copies the live prefix verbatim plus the free-list and index
    /// shape. Cost is linear in `used()`.
    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            arena: self.id(),
            bytes: self.live_bytes().to_vec(),
            free: self.free.clone(),
            index: self.index.clone(),
        }
    }

    /// Overwrite this arena with a snapshot of its own earlier state.
    ///
    /// Sets the cursor to the snapshot's length, copies the captured
    /// bytes back over the region, and replaces the free lists and
    /// allocation index with deep copies of the snapshot's. The backing
    /// region is never resized or moved, so every `BlockRef` handed out
    /// before the snapshot was taken is valid again afterwards.
    ///
    /// The snapshot is read-only: restoring it any number of times
    /// produces the same arena state.
    ///
    /// # Errors
    ///
    /// [`ArenaError::SnapshotMismatch`] if the snapshot was taken from a
    /// different arena, or if its extent exceeds the committed region
    /// (possible only for a foreign or stale snapshot, since commits are
    /// monotonic within a run). The arena is unchanged on error.
    pub fn restore(&mut self, snapshot: &ArenaSnapshot) -> Result<(), ArenaError> {
        if snapshot.arena != self.id() || snapshot.len() > self.region.committed() {
            return Err(ArenaError::SnapshotMismatch {
                snapshot_arena: snapshot.arena,
                arena: self.id(),
            });
        }
        self.region
            .bytes_mut(0, snapshot.len())
            .copy_from_slice(&snapshot.bytes);
        self.cursor = snapshot.len();
        self.free = snapshot.free.clone();
        self.index = snapshot.index.clone();
        Ok(())
    }
}
