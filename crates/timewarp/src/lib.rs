//! Timewarp: a checkpoint and rewind subsystem for deterministic
//! simulations.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Timewarp sub-crates. For most users, adding `timewarp` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use timewarp::prelude::*;
//!
//! let mut world = World::new(WorldConfig::default()).unwrap();
//!
//! // Run forward, capture a keyframe, run further, rewind.
//! world.advance_by(50).unwrap();
//! let keyframe = world.save_keyframe();
//! let hash = world.state_hash();
//!
//! world.advance_by(100).unwrap();
//! world.load_keyframe(&keyframe).unwrap();
//!
//! assert_eq!(keyframe_time(&keyframe), world.step());
//! assert_eq!(world.state_hash(), hash);
//! free_keyframe(keyframe);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `timewarp-core` | IDs, block handles, dirty change logs |
//! | [`arena`] | `timewarp-arena` | Bump arena, block recycling, snapshots |
//! | [`keyframe`] | `timewarp-keyframe` | Byte codec and the keyframe container |
//! | [`sim`] | `timewarp-sim` | World state, stepping, save/load sequencing |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// IDs, block handles, and dirty change logs (`timewarp-core`).
pub use timewarp_core as types;

/// Bump arena allocation, recycling, and snapshots (`timewarp-arena`).
///
/// Most users only need [`arena::ArenaConfig`] for world construction;
/// [`arena::Arena`] itself is driven by the simulation.
pub use timewarp_arena as arena;

/// Byte codec and the keyframe container (`timewarp-keyframe`).
///
/// [`keyframe::Keyframe`] is the opaque capture handed back by save;
/// the cursors are for code embedding extra sections into a buffer.
pub use timewarp_keyframe as keyframe;

/// World state, stepping, and save/load sequencing (`timewarp-sim`).
pub use timewarp_sim as sim;

/// Common imports for typical Timewarp usage.
///
/// ```rust
/// use timewarp::prelude::*;
/// ```
pub mod prelude {
    pub use timewarp_arena::{ArenaConfig, ArenaError, ArenaSnapshot};
    pub use timewarp_core::{BlockRef, StepId};
    pub use timewarp_keyframe::{Keyframe, KeyframeError};
    pub use timewarp_sim::{free_keyframe, keyframe_time, World, WorldConfig};
}
