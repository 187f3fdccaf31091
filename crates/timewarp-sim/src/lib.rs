//! Deterministic simulation driver and keyframe save/load sequencing.
//!
//! This crate hosts the simulation side of the checkpoint subsystem: a
//! [`World`] whose mutable state (players, sectors, arena-backed thinker
//! and mover lists, RNG, demo cursor) can be captured into a
//! [`Keyframe`] and rewound to any previously captured step.
//!
//! # Public checkpoint surface
//!
//! Four calls, all synchronous and single-threaded:
//!
//! - [`World::save_keyframe`] — capture everything mutable at the
//!   current step
//! - [`World::load_keyframe`] — rewind the world to a keyframe's step
//! - [`checkpoint::keyframe_time`] — the step a keyframe represents
//! - [`checkpoint::free_keyframe`] — discard a keyframe
//!
//! Keyframes never touch persistent storage; they live and die in
//! memory with the run.
//!
//! [`Keyframe`]: timewarp_keyframe::Keyframe

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod checkpoint;
pub mod config;
pub mod hash;
pub mod state;
pub mod step;
pub mod thinker;

pub use checkpoint::{free_keyframe, keyframe_time};
pub use config::{ConfigError, WorldConfig};
pub use state::{PlayerState, Sector, World, MAX_PLAYERS};
pub use thinker::{MoverNode, Thinker, ThinkerKind};
