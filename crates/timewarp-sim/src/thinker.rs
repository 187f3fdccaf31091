//! Fixed-size records stored inside arena blocks.
//!
//! Thinkers form an intrusive doubly-linked list in the thinker arena;
//! mover nodes form a singly-linked list in the mover arena, each node
//! referencing a thinker across arenas. Both record types are encoded
//! as tightly packed little-endian fields inside their arena block, so
//! an arena snapshot captures the whole structure — links included —
//! byte for byte.

use timewarp_core::BlockRef;

fn read_u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().expect("4-byte field"))
}

fn read_i32_at(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes(bytes[at..at + 4].try_into().expect("4-byte field"))
}

fn write_u32_at(bytes: &mut [u8], at: usize, v: u32) {
    bytes[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn write_i32_at(bytes: &mut [u8], at: usize, v: i32) {
    bytes[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

/// What a thinker does to its sector each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThinkerKind {
    /// Raises or lowers the sector floor.
    FloorMover,
    /// Raises or lowers the sector ceiling.
    CeilingMover,
}

impl ThinkerKind {
    fn to_u32(self) -> u32 {
        match self {
            Self::FloorMover => 0,
            Self::CeilingMover => 1,
        }
    }

    fn from_u32(v: u32) -> Self {
        match v {
            0 => Self::FloorMover,
            _ => Self::CeilingMover,
        }
    }
}

/// A per-sector actuator living in the thinker arena.
///
/// Doubly linked through `next`/`prev` (both [`BlockRef`] offsets into
/// the same arena, [`BlockRef::NIL`]-terminated). Expires when
/// `countdown` reaches zero, at which point it is unlinked and its
/// block released for recycling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thinker {
    /// Next thinker in the list, or NIL.
    pub next: BlockRef,
    /// Previous thinker in the list, or NIL.
    pub prev: BlockRef,
    /// What this thinker drives.
    pub kind: ThinkerKind,
    /// Index of the sector it drives.
    pub sector: u32,
    /// Steps remaining before expiry.
    pub countdown: i32,
    /// Height delta applied per step (fixed-point map units).
    pub speed: i32,
}

impl Thinker {
    /// Encoded size in bytes.
    pub const SIZE: u32 = 24;
    /// Required alignment in bytes.
    pub const ALIGN: u32 = 4;

    /// Decode a thinker from its arena block.
    pub fn read(bytes: &[u8]) -> Self {
        Self {
            next: BlockRef(read_u32_at(bytes, 0)),
            prev: BlockRef(read_u32_at(bytes, 4)),
            kind: ThinkerKind::from_u32(read_u32_at(bytes, 8)),
            sector: read_u32_at(bytes, 12),
            countdown: read_i32_at(bytes, 16),
            speed: read_i32_at(bytes, 20),
        }
    }

    /// Encode this thinker into its arena block.
    pub fn write(&self, bytes: &mut [u8]) {
        write_u32_at(bytes, 0, self.next.0);
        write_u32_at(bytes, 4, self.prev.0);
        write_u32_at(bytes, 8, self.kind.to_u32());
        write_u32_at(bytes, 12, self.sector);
        write_i32_at(bytes, 16, self.countdown);
        write_i32_at(bytes, 20, self.speed);
    }
}

/// A node in the active-mover list.
///
/// Lives in the mover arena; `thinker` is a cross-arena reference into
/// the thinker arena. Singly linked, NIL-terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoverNode {
    /// Next node in the list, or NIL.
    pub next: BlockRef,
    /// The thinker this node tracks.
    pub thinker: BlockRef,
}

impl MoverNode {
    /// Encoded size in bytes.
    pub const SIZE: u32 = 8;
    /// Required alignment in bytes.
    pub const ALIGN: u32 = 4;

    /// Decode a node from its arena block.
    pub fn read(bytes: &[u8]) -> Self {
        Self {
            next: BlockRef(read_u32_at(bytes, 0)),
            thinker: BlockRef(read_u32_at(bytes, 4)),
        }
    }

    /// Encode this node into its arena block.
    pub fn write(&self, bytes: &mut [u8]) {
        write_u32_at(bytes, 0, self.next.0);
        write_u32_at(bytes, 4, self.thinker.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thinker_encodes_into_declared_size() {
        let t = Thinker {
            next: BlockRef(24),
            prev: BlockRef::NIL,
            kind: ThinkerKind::CeilingMover,
            sector: 9,
            countdown: 35,
            speed: -8,
        };
        let mut bytes = [0u8; Thinker::SIZE as usize];
        t.write(&mut bytes);
        assert_eq!(Thinker::read(&bytes), t);
    }

    #[test]
    fn mover_node_round_trips() {
        let n = MoverNode {
            next: BlockRef::NIL,
            thinker: BlockRef(48),
        };
        let mut bytes = [0u8; MoverNode::SIZE as usize];
        n.write(&mut bytes);
        assert_eq!(MoverNode::read(&bytes), n);
    }
}
