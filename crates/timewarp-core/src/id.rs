//! Strongly-typed identifiers shared across the checkpoint subsystem.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing simulated-time counter.
///
/// Incremented each time the simulation advances one step. A keyframe
/// records the `StepId` it was captured at; loading it rewinds the
/// simulation to exactly that step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Counter for unique [`ArenaId`] allocation.
static ARENA_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for an arena.
///
/// Allocated from a monotonic atomic counter via [`ArenaId::next`]. Two
/// distinct arenas always have different IDs, even if they are configured
/// identically. Snapshots carry the ID of the arena they were taken from,
/// and restore rejects a snapshot whose ID does not match the target
/// arena — restoring a foreign snapshot would silently corrupt state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(u64);

impl ArenaId {
    /// Allocate a fresh, unique arena ID.
    ///
    /// Each call returns an ID that has never been returned before within
    /// this process. Thread-safe.
    pub fn next() -> Self {
        Self(ARENA_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An arena-relative reference to an allocated block.
///
/// `BlockRef` is the subsystem's "opaque pointer": a byte offset from the
/// owning arena's base rather than a raw address. Because the arena's
/// backing region never moves and restore reproduces the same offsets,
/// a `BlockRef` captured in a keyframe is still valid after the arena is
/// restored — it can be written to and read from a byte buffer verbatim.
///
/// [`BlockRef::NIL`] is the null link used to terminate intrusive lists
/// stored inside arena blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct BlockRef(pub u32);

impl BlockRef {
    /// The null reference. Never returned by an arena allocation.
    pub const NIL: BlockRef = BlockRef(u32::MAX);

    /// Whether this reference is the null link.
    pub fn is_nil(self) -> bool {
        self == Self::NIL
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            write!(f, "nil")
        } else {
            write!(f, "+{:#x}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_ids_are_unique() {
        let a = ArenaId::next();
        let b = ArenaId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn nil_block_ref() {
        assert!(BlockRef::NIL.is_nil());
        assert!(!BlockRef(0).is_nil());
    }

    #[test]
    fn step_id_ordering() {
        assert!(StepId(3) < StepId(4));
        assert_eq!(StepId::from(7), StepId(7));
    }
}
