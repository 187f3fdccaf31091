//! Growable byte codec and keyframe container for Timewarp state capture.
//!
//! A keyframe is a flat, relocatable capture of all mutable simulation
//! state at one simulated step: one byte buffer written through
//! [`KeyframeWriter`], plus one [`ArenaSnapshot`] per arena the
//! simulation delegates to the allocator, attached as owned objects
//! rather than inlined.
//!
//! # Format
//!
//! Tightly packed little-endian primitives in the exact order the saver
//! wrote them. No magic bytes, no version tag, no checksum — keyframes
//! never leave the process and byte-exact reproducibility within one
//! build is the only guarantee. Collections are `(u32 count, element…)`;
//! the reader enforces a destination-capacity bound on every count.
//!
//! `BlockRef` tokens (arena-relative offsets) are written and read
//! verbatim: the arena restore path guarantees every offset captured at
//! save time is valid again after the matching snapshot is restored.
//!
//! [`ArenaSnapshot`]: timewarp_arena::ArenaSnapshot

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod keyframe;

pub use codec::{KeyframeReader, KeyframeWriter};
pub use error::KeyframeError;
pub use keyframe::Keyframe;
