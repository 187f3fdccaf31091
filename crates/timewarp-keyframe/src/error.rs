//! Keyframe codec and load error types.
//!
//! A keyframe that fails to load is corrupted or mismatched; per policy
//! it must never be partially applied, so every variant here ends the
//! run. `load_keyframe` documents that an `Err` leaves world state
//! undefined — the caller must discard the world, not resume it.

use std::error::Error;
use std::fmt;

use timewarp_arena::ArenaError;

/// Errors that can occur while reading or applying a keyframe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyframeError {
    /// A read ran past the end of the keyframe buffer.
    Underrun {
        /// Bytes the read required.
        needed: usize,
        /// Bytes remaining in the buffer.
        available: usize,
    },
    /// A collection count exceeds the destination's capacity.
    CountExceedsCapacity {
        /// Count read from the buffer.
        count: usize,
        /// Capacity of the destination collection.
        capacity: usize,
    },
    /// An element index in the buffer points outside its destination
    /// collection.
    IndexOutOfRange {
        /// Index read from the buffer.
        index: usize,
        /// Length of the destination collection.
        len: usize,
    },
    /// The keyframe carries a different number of arena snapshots than
    /// the world has arenas.
    SnapshotCount {
        /// Snapshots attached to the keyframe.
        found: usize,
        /// Arenas the world delegates to the subsystem.
        expected: usize,
    },
    /// An arena operation failed during save or restore.
    Arena(ArenaError),
}

impl fmt::Display for KeyframeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Underrun { needed, available } => {
                write!(
                    f,
                    "keyframe buffer underrun: read needs {needed} bytes, {available} remain"
                )
            }
            Self::CountExceedsCapacity { count, capacity } => {
                write!(
                    f,
                    "keyframe count {count} exceeds destination capacity {capacity}"
                )
            }
            Self::IndexOutOfRange { index, len } => {
                write!(
                    f,
                    "keyframe element index {index} outside destination of length {len}"
                )
            }
            Self::SnapshotCount { found, expected } => {
                write!(
                    f,
                    "keyframe carries {found} arena snapshots, world expects {expected}"
                )
            }
            Self::Arena(e) => write!(f, "arena error during keyframe operation: {e}"),
        }
    }
}

impl Error for KeyframeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for KeyframeError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}
