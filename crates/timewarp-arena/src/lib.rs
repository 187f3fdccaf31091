//! Bump arena with free-list recycling and restorable snapshots.
//!
//! The arena is the storage layer of the checkpoint subsystem. It owns a
//! single [`Region`] (a reserved address range with a committed,
//! zero-initialized prefix) and hands out [`BlockRef`] offset handles
//! from a bump cursor, recycling released blocks through per-shape free
//! lists so checkpoint/restore churn does not grow the arena without
//! bound.
//!
//! # Architecture
//!
//! ```text
//! Arena
//! ├── Region (reserved range, committed prefix, stable base)
//! ├── bump cursor (live prefix end)
//! ├── free lists: (size, align) → stack of released offsets
//! └── allocation index: offset → (size, align), released blocks included
//! ```
//!
//! [`ArenaSnapshot`] copies the live prefix plus the free-list and index
//! shape into an independently owned value; [`Arena::restore`] overwrites
//! the arena with a snapshot, reproducing every offset handed out before
//! the snapshot was taken.
//!
//! All access is offset-based — there are no raw pointers and no
//! `unsafe` anywhere in this crate.
//!
//! [`BlockRef`]: timewarp_core::BlockRef

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod config;
pub mod error;
pub mod region;
pub mod snapshot;

pub use arena::Arena;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use region::Region;
pub use snapshot::ArenaSnapshot;
