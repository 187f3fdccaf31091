//! Core identifiers and shared types for the Timewarp checkpoint subsystem.
//!
//! Contains the strongly-typed IDs used across the workspace ([`StepId`],
//! [`ArenaId`], [`BlockRef`]) and the [`DirtyLog`] change-log consumed by
//! keyframe serialization. This crate has no allocator or codec logic of
//! its own — it exists so that `timewarp-arena` and `timewarp-keyframe`
//! can share vocabulary without depending on each other.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dirty;
pub mod id;

pub use dirty::DirtyLog;
pub use id::{ArenaId, BlockRef, StepId};
