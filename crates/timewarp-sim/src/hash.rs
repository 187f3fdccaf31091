//! FNV-1a state hashing for divergence checks.
//!
//! The hash covers exactly what a keyframe captures: the serialized
//! fixed sections, the RNG and demo cursor, and both arenas' live byte
//! prefixes. Two worlds hash equal iff saving each would produce
//! interchangeable keyframes.

use timewarp_keyframe::KeyframeWriter;

use crate::state::World;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

fn fnv1a(hash: u64, bytes: &[u8]) -> u64 {
    let mut h = hash;
    for &b in bytes {
        h ^= u64::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

impl World {
    /// Hash all keyframe-visible state.
    ///
    /// Cheap enough to call every step in lockstep-verification runs.
    pub fn state_hash(&self) -> u64 {
        let mut w = KeyframeWriter::with_capacity(256);
        self.write_fixed(&mut w);
        self.write_rng(&mut w);
        w.write_u64(self.demo_pos);
        let buf = w.finish();

        let mut h = fnv1a(FNV_OFFSET, &buf);
        h = fnv1a(h, self.thinkers.live_bytes());
        fnv1a(h, self.movers.live_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::thinker::ThinkerKind;

    #[test]
    fn hash_is_stable_without_mutation() {
        let w = World::new(WorldConfig::default()).unwrap();
        assert_eq!(w.state_hash(), w.state_hash());
    }

    #[test]
    fn hash_sees_arena_contents() {
        let mut w = World::new(WorldConfig::default()).unwrap();
        let before = w.state_hash();
        let block = w.spawn_thinker(ThinkerKind::FloorMover, 0, 10, 1).unwrap();
        assert_ne!(w.state_hash(), before);

        let spawned = w.state_hash();
        let bytes = w.thinkers.block_bytes_mut(block).unwrap();
        bytes[16] = bytes[16].wrapping_add(1);
        assert_ne!(w.state_hash(), spawned);
    }

    #[test]
    fn hash_sees_line_specials() {
        let mut w = World::new(WorldConfig::default()).unwrap();
        let before = w.state_hash();
        w.set_line_special(0, 31);
        assert_ne!(w.state_hash(), before);
    }
}
