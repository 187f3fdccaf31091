//! Arena-specific error types.
//!
//! Every variant here is unrecoverable by policy: an arena that has hit
//! its growth ceiling cannot shed simulation state, and a misused handle
//! means the program is already wrong. Callers must treat any `Err` as
//! the end of the simulation run — nothing in this workspace retries an
//! arena operation.

use std::error::Error;
use std::fmt;

use timewarp_core::ArenaId;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The allocation cannot fit even after growing the committed region
    /// to the configured reserve limit.
    CapacityExceeded {
        /// Number of bytes the allocation would require in total.
        requested: usize,
        /// The arena's reserve limit in bytes.
        limit: usize,
    },
    /// A `BlockRef` that was not obtained from this arena (or was wiped
    /// by `clear()`).
    ForeignBlock {
        /// The offending offset.
        offset: u32,
    },
    /// A `BlockRef` released twice without an intervening reallocation.
    DoubleRelease {
        /// The offending offset.
        offset: u32,
    },
    /// An allocation request with a zero size or a non-power-of-two
    /// alignment.
    InvalidShape {
        /// Requested size in bytes.
        size: u32,
        /// Requested alignment in bytes.
        align: u32,
    },
    /// A snapshot taken from a different arena, or one whose extent no
    /// longer fits the committed region.
    SnapshotMismatch {
        /// ID recorded in the snapshot.
        snapshot_arena: ArenaId,
        /// ID of the arena being restored.
        arena: ArenaId,
    },
    /// Arena configuration rejected at construction.
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { requested, limit } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} bytes, reserve limit {limit} bytes"
                )
            }
            Self::ForeignBlock { offset } => {
                write!(f, "block at offset {offset:#x} was not allocated by this arena")
            }
            Self::DoubleRelease { offset } => {
                write!(f, "block at offset {offset:#x} released twice")
            }
            Self::InvalidShape { size, align } => {
                write!(f, "invalid allocation shape: size {size}, align {align}")
            }
            Self::SnapshotMismatch {
                snapshot_arena,
                arena,
            } => {
                write!(
                    f,
                    "snapshot from arena {snapshot_arena} cannot restore arena {arena}"
                )
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid arena config: {reason}")
            }
        }
    }
}

impl Error for ArenaError {}
