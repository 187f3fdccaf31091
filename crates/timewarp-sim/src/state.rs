//! The mutable simulation world.
//!
//! [`World`] owns everything a keyframe captures: the step counters, the
//! fixed per-player records, the sector and line collections, both
//! arenas with their intrusive lists, the shared RNG, and the demo
//! cursor. All mutating methods take `&mut self`; the host is
//! single-threaded and save/load never overlap a step.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use timewarp_arena::{Arena, ArenaError};
use timewarp_core::{BlockRef, DirtyLog, StepId};

use crate::config::{ConfigError, WorldConfig};
use crate::thinker::{MoverNode, Thinker, ThinkerKind};

/// Number of player slots, populated or not.
pub const MAX_PLAYERS: usize = 8;

/// Fixed-size per-player record, serialized field-for-field into every
/// keyframe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerState {
    /// Hit points.
    pub health: i32,
    /// Armor points.
    pub armor: i32,
    /// Map X position (fixed-point map units).
    pub pos_x: i32,
    /// Map Y position (fixed-point map units).
    pub pos_y: i32,
    /// X momentum applied each step.
    pub mom_x: i32,
    /// Y momentum applied each step.
    pub mom_y: i32,
}

impl PlayerState {
    /// Number of serialized i32 fields.
    pub const FIELD_COUNT: usize = 6;

    /// The record as an i32 field array, in serialization order.
    pub fn to_fields(self) -> [i32; Self::FIELD_COUNT] {
        [
            self.health,
            self.armor,
            self.pos_x,
            self.pos_y,
            self.mom_x,
            self.mom_y,
        ]
    }

    /// Rebuild the record from its i32 field array.
    pub fn from_fields(fields: [i32; Self::FIELD_COUNT]) -> Self {
        Self {
            health: fields[0],
            armor: fields[1],
            pos_x: fields[2],
            pos_y: fields[3],
            mom_x: fields[4],
            mom_y: fields[5],
        }
    }
}

/// One sector of the static-but-mutable world geometry.
///
/// Only these mutable fields are serialized; everything else about a
/// sector (its shape, its lines) is immutable after load and lives
/// outside this subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sector {
    /// Floor height (fixed-point map units).
    pub floor_height: i32,
    /// Ceiling height (fixed-point map units).
    pub ceiling_height: i32,
    /// Light level, 0..=255.
    pub light_level: i16,
    /// Active special effect, 0 = none.
    pub special: i16,
}

/// The full mutable simulation state.
pub struct World {
    pub(crate) config: WorldConfig,

    /// Monotonic step counter.
    pub(crate) step: StepId,
    /// Session-relative base; keyframes store `step - session_base`.
    pub(crate) session_base: StepId,
    /// Free-running event counter (never reset within a session).
    pub(crate) event_count: u64,

    /// Player slots in slot order. `None` = unpopulated.
    pub(crate) players: [Option<PlayerState>; MAX_PLAYERS],

    /// Sector mutable fields, serialized in bulk.
    pub(crate) sectors: Vec<Sector>,
    /// Line specials: mostly static, dirty-tracked.
    pub(crate) line_specials: Vec<i16>,
    /// Change log for `line_specials` since world creation.
    pub(crate) line_dirty: DirtyLog<i16>,

    /// Thinker arena (doubly-linked thinker records).
    pub(crate) thinkers: Arena,
    /// Head of the thinker list, or NIL.
    pub(crate) thinker_head: BlockRef,
    /// Live thinker count. Transient: re-derived from the restored list
    /// on load, never serialized.
    pub(crate) live_thinkers: u32,

    /// Mover-node arena (singly-linked active-mover list).
    pub(crate) movers: Arena,
    /// Head of the mover list, or NIL.
    pub(crate) mover_head: BlockRef,

    /// Shared deterministic RNG. Full internal state is captured
    /// verbatim by every keyframe.
    pub(crate) rng: ChaCha8Rng,

    /// Read position into the external command/demo log.
    pub(crate) demo_pos: u64,

    /// Exclusive-window flag: set for the duration of a keyframe load.
    /// Placement queries refuse to run while it is set.
    pub(crate) restore_in_progress: bool,
}

impl World {
    /// Build a world from a validated configuration.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut players = [None; MAX_PLAYERS];
        for (slot, player) in players.iter_mut().enumerate().take(config.player_count) {
            *player = Some(PlayerState {
                health: 100,
                armor: 0,
                pos_x: (slot as i32 + 1) << 16,
                pos_y: (slot as i32 + 1) << 17,
                mom_x: 0,
                mom_y: 0,
            });
        }

        let sectors = (0..config.sector_count)
            .map(|i| Sector {
                floor_height: 0,
                ceiling_height: 128 << 16,
                light_level: 160,
                special: (i % 4) as i16,
            })
            .collect();

        let line_specials = (0..config.line_count)
            .map(|i| ((i * 7) % 32) as i16)
            .collect();

        Ok(Self {
            step: StepId(0),
            session_base: StepId(0),
            event_count: 0,
            players,
            sectors,
            line_specials,
            line_dirty: DirtyLog::new(),
            thinkers: Arena::new(config.thinker_arena).map_err(ConfigError::Arena)?,
            thinker_head: BlockRef::NIL,
            live_thinkers: 0,
            movers: Arena::new(config.mover_arena).map_err(ConfigError::Arena)?,
            mover_head: BlockRef::NIL,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            demo_pos: 0,
            restore_in_progress: false,
            config,
        })
    }

    /// Current simulated step.
    pub fn step(&self) -> StepId {
        self.step
    }

    /// The configuration this world was built from.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Player record in the given slot, if populated.
    pub fn player(&self, slot: usize) -> Option<&PlayerState> {
        self.players[slot].as_ref()
    }

    /// Sector by index.
    pub fn sector(&self, index: usize) -> &Sector {
        &self.sectors[index]
    }

    /// Line special by index.
    pub fn line_special(&self, index: usize) -> i16 {
        self.line_specials[index]
    }

    /// Number of live (not yet expired) thinkers.
    pub fn live_thinkers(&self) -> u32 {
        self.live_thinkers
    }

    /// Current read position in the external demo log.
    pub fn demo_pos(&self) -> u64 {
        self.demo_pos
    }

    /// Whether a placement at `(x, y)` is unobstructed.
    ///
    /// This is the collision subsystem's entry point, and it doubles as
    /// the re-entrancy guard for the exclusive restore window: a
    /// placement query while a keyframe load is in progress would read
    /// half-restored state.
    ///
    /// # Panics
    ///
    /// Panics if called while a keyframe load is in progress.
    pub fn placement_clear(&self, x: i32, y: i32) -> bool {
        assert!(
            !self.restore_in_progress,
            "placement query during keyframe restore"
        );
        const MAP_EXTENT: i32 = 1 << 24;
        x.abs() < MAP_EXTENT && y.abs() < MAP_EXTENT
    }

    /// Overwrite a line special, recording the first-touch original in
    /// the dirty log.
    pub fn set_line_special(&mut self, index: usize, value: i16) {
        let original = self.line_specials[index];
        self.line_dirty.record(index as u32, original);
        self.line_specials[index] = value;
    }

    // ── Thinker list management ─────────────────────────────────

    /// Allocate a thinker and link it at the head of the list.
    pub fn spawn_thinker(
        &mut self,
        kind: ThinkerKind,
        sector: u32,
        countdown: i32,
        speed: i32,
    ) -> Result<BlockRef, ArenaError> {
        let block = self.thinkers.alloc(Thinker::SIZE, Thinker::ALIGN)?;
        let thinker = Thinker {
            next: self.thinker_head,
            prev: BlockRef::NIL,
            kind,
            sector,
            countdown,
            speed,
        };
        thinker.write(self.thinkers.block_bytes_mut(block)?);

        if !self.thinker_head.is_nil() {
            let head_bytes = self.thinkers.block_bytes_mut(self.thinker_head)?;
            let mut head = Thinker::read(head_bytes);
            head.prev = block;
            head.write(head_bytes);
        }
        self.thinker_head = block;
        self.live_thinkers += 1;
        Ok(block)
    }

    /// Unlink a thinker, release its block, and drop any mover nodes
    /// that reference it.
    pub fn remove_thinker(&mut self, block: BlockRef) -> Result<(), ArenaError> {
        let thinker = Thinker::read(self.thinkers.block_bytes(block)?);

        if !thinker.prev.is_nil() {
            let bytes = self.thinkers.block_bytes_mut(thinker.prev)?;
            let mut prev = Thinker::read(bytes);
            prev.next = thinker.next;
            prev.write(bytes);
        } else {
            self.thinker_head = thinker.next;
        }
        if !thinker.next.is_nil() {
            let bytes = self.thinkers.block_bytes_mut(thinker.next)?;
            let mut next = Thinker::read(bytes);
            next.prev = thinker.prev;
            next.write(bytes);
        }

        self.thinkers.release(block)?;
        self.live_thinkers -= 1;
        self.remove_movers_for(block)
    }

    /// Push a mover node tracking `thinker` onto the mover list.
    pub fn push_mover(&mut self, thinker: BlockRef) -> Result<BlockRef, ArenaError> {
        let block = self.movers.alloc(MoverNode::SIZE, MoverNode::ALIGN)?;
        let node = MoverNode {
            next: self.mover_head,
            thinker,
        };
        node.write(self.movers.block_bytes_mut(block)?);
        self.mover_head = block;
        Ok(block)
    }

    /// Unlink and release every mover node referencing `thinker`.
    fn remove_movers_for(&mut self, thinker: BlockRef) -> Result<(), ArenaError> {
        let mut prev = BlockRef::NIL;
        let mut cursor = self.mover_head;
        while !cursor.is_nil() {
            let node = MoverNode::read(self.movers.block_bytes(cursor)?);
            if node.thinker == thinker {
                if prev.is_nil() {
                    self.mover_head = node.next;
                } else {
                    let bytes = self.movers.block_bytes_mut(prev)?;
                    let mut p = MoverNode::read(bytes);
                    p.next = node.next;
                    p.write(bytes);
                }
                self.movers.release(cursor)?;
            } else {
                prev = cursor;
            }
            cursor = node.next;
        }
        Ok(())
    }

    /// Walk the thinker list, returning the blocks in list order.
    pub(crate) fn thinker_blocks(&self) -> Result<Vec<BlockRef>, ArenaError> {
        let mut blocks = Vec::new();
        let mut cursor = self.thinker_head;
        while !cursor.is_nil() {
            blocks.push(cursor);
            cursor = Thinker::read(self.thinkers.block_bytes(cursor)?).next;
        }
        Ok(blocks)
    }

    /// Count mover nodes in list order.
    ///
    /// A link pointing at a block the arena never allocated means the
    /// list is corrupted; the error propagates rather than shortening
    /// the count.
    pub fn mover_count(&self) -> Result<u32, ArenaError> {
        let mut count = 0;
        let mut cursor = self.mover_head;
        while !cursor.is_nil() {
            count += 1;
            cursor = MoverNode::read(self.movers.block_bytes(cursor)?).next;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(WorldConfig::default()).unwrap()
    }

    #[test]
    fn new_world_has_populated_slots_in_order() {
        let w = world();
        assert!(w.player(0).is_some());
        assert!(w.player(1).is_some());
        assert!(w.player(2).is_none());
    }

    #[test]
    fn spawn_links_at_head() {
        let mut w = world();
        let a = w.spawn_thinker(ThinkerKind::FloorMover, 0, 10, 1).unwrap();
        let b = w.spawn_thinker(ThinkerKind::FloorMover, 1, 10, 1).unwrap();
        assert_eq!(w.thinker_head, b);
        assert_eq!(w.thinker_blocks().unwrap(), vec![b, a]);
        assert_eq!(w.live_thinkers(), 2);
    }

    #[test]
    fn remove_middle_thinker_relinks() {
        let mut w = world();
        let a = w.spawn_thinker(ThinkerKind::FloorMover, 0, 10, 1).unwrap();
        let b = w.spawn_thinker(ThinkerKind::FloorMover, 1, 10, 1).unwrap();
        let c = w.spawn_thinker(ThinkerKind::FloorMover, 2, 10, 1).unwrap();

        w.remove_thinker(b).unwrap();
        assert_eq!(w.thinker_blocks().unwrap(), vec![c, a]);
        assert_eq!(w.live_thinkers(), 2);
    }

    #[test]
    fn removed_thinker_block_is_recycled() {
        let mut w = world();
        let a = w.spawn_thinker(ThinkerKind::FloorMover, 0, 10, 1).unwrap();
        w.remove_thinker(a).unwrap();
        let b = w.spawn_thinker(ThinkerKind::CeilingMover, 3, 5, 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn removing_thinker_drops_its_movers() {
        let mut w = world();
        let a = w.spawn_thinker(ThinkerKind::FloorMover, 0, 10, 1).unwrap();
        let b = w.spawn_thinker(ThinkerKind::FloorMover, 1, 10, 1).unwrap();
        let _ = w.push_mover(a).unwrap();
        let _ = w.push_mover(b).unwrap();
        let _ = w.push_mover(a).unwrap();
        assert_eq!(w.mover_count().unwrap(), 3);

        w.remove_thinker(a).unwrap();
        assert_eq!(w.mover_count().unwrap(), 1);
    }

    #[test]
    fn mover_count_surfaces_corrupted_links() {
        let mut w = world();
        let a = w.spawn_thinker(ThinkerKind::FloorMover, 0, 10, 1).unwrap();
        let _ = w.push_mover(a).unwrap();

        // A head pointing outside the arena's allocation index must
        // error, not read as a short list.
        w.mover_head = BlockRef(0xDEAD);
        assert!(matches!(
            w.mover_count(),
            Err(ArenaError::ForeignBlock { .. })
        ));
    }

    #[test]
    fn set_line_special_records_first_touch() {
        let mut w = world();
        let original = w.line_special(10);
        w.set_line_special(10, 99);
        w.set_line_special(10, 77);
        assert_eq!(w.line_dirty.original(10), Some(original));
        assert_eq!(w.line_special(10), 77);
    }

    #[test]
    #[should_panic(expected = "placement query during keyframe restore")]
    fn placement_query_refused_during_restore() {
        let mut w = world();
        w.restore_in_progress = true;
        let _ = w.placement_clear(0, 0);
    }
}
