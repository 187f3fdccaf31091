//! The keyframe container.

use timewarp_arena::ArenaSnapshot;
use timewarp_core::StepId;

/// A self-contained capture of all mutable simulation state at one step.
///
/// Holds the serialized byte buffer plus one arena snapshot per arena
/// the simulation delegates to the allocator, in a fixed order agreed
/// with the saver. A keyframe is immutable after save and read-only
/// during load: loading it twice produces identical state. Restoring it
/// must never require information from any other keyframe.
///
/// Dropping a keyframe releases its buffer and snapshots without
/// touching any live arena.
pub struct Keyframe {
    /// Simulated step this keyframe represents.
    step: StepId,
    /// The serialized state buffer.
    buf: Vec<u8>,
    /// One snapshot per delegated arena, in save order.
    snapshots: Vec<ArenaSnapshot>,
}

impl Keyframe {
    /// Assemble a keyframe from its parts. Called by the saver once the
    /// buffer is fully written and all snapshots are taken.
    pub fn new(step: StepId, buf: Vec<u8>, snapshots: Vec<ArenaSnapshot>) -> Self {
        Self {
            step,
            buf,
            snapshots,
        }
    }

    /// The simulated step this keyframe represents.
    pub fn step(&self) -> StepId {
        self.step
    }

    /// The serialized state buffer.
    pub fn buf(&self) -> &[u8] {
        &self.buf
    }

    /// The attached arena snapshots, in save order.
    pub fn snapshots(&self) -> &[ArenaSnapshot] {
        &self.snapshots
    }
}
