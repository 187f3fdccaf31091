//! The per-step simulation tick.
//!
//! [`World::advance`] is the single mutation entry point between
//! checkpoints. Every source of change it applies is either a pure
//! function of current state or drawn from the captured RNG, so two
//! worlds with byte-identical state produce byte-identical successors.

use rand::RngCore;

use timewarp_arena::ArenaError;
use timewarp_core::{BlockRef, StepId};

use crate::state::World;
use crate::thinker::{Thinker, ThinkerKind};

/// Steps a freshly spawned thinker runs before expiring.
const THINKER_LIFETIME: i32 = 35;

/// A new thinker is spawned every this many steps.
const SPAWN_INTERVAL: u64 = 8;

/// A line special fires every this many steps.
const TRIGGER_INTERVAL: u64 = 16;

impl World {
    /// Advance the simulation by one step.
    ///
    /// Order within the step is fixed: players, thinkers, sector light
    /// flicker, line triggers, demo cursor, then the step counter
    /// itself. Reordering any of these would change the RNG draw
    /// sequence and fork the timeline.
    pub fn advance(&mut self) -> Result<(), ArenaError> {
        self.run_players();
        self.run_thinkers()?;
        self.run_flicker();
        self.run_triggers();

        self.demo_pos += 4;
        self.step = StepId(self.step.0 + 1);
        Ok(())
    }

    /// Advance the simulation by `count` steps.
    pub fn advance_by(&mut self, count: u64) -> Result<(), ArenaError> {
        for _ in 0..count {
            self.advance()?;
        }
        Ok(())
    }

    fn run_players(&mut self) {
        for slot in 0..self.players.len() {
            let Some(mut player) = self.players[slot] else {
                continue;
            };

            // Jitter momentum from the shared RNG, then apply it.
            let jitter_x = (self.rng.next_u32() & 0xFF) as i32 - 128;
            let jitter_y = (self.rng.next_u32() & 0xFF) as i32 - 128;
            player.mom_x = (player.mom_x + jitter_x).clamp(-(1 << 12), 1 << 12);
            player.mom_y = (player.mom_y + jitter_y).clamp(-(1 << 12), 1 << 12);

            let new_x = player.pos_x.wrapping_add(player.mom_x);
            let new_y = player.pos_y.wrapping_add(player.mom_y);
            if self.placement_clear(new_x, new_y) {
                player.pos_x = new_x;
                player.pos_y = new_y;
            } else {
                player.mom_x = 0;
                player.mom_y = 0;
                self.event_count += 1;
            }

            self.players[slot] = Some(player);
        }
    }

    fn run_thinkers(&mut self) -> Result<(), ArenaError> {
        // Snapshot the list order first: expiry unlinks and releases
        // blocks mid-walk.
        let blocks = self.thinker_blocks()?;
        for block in blocks {
            let mut thinker = Thinker::read(self.thinkers.block_bytes(block)?);

            let sector_index = thinker.sector as usize % self.sectors.len();
            let sector = &mut self.sectors[sector_index];
            match thinker.kind {
                ThinkerKind::FloorMover => {
                    sector.floor_height = sector.floor_height.wrapping_add(thinker.speed);
                }
                ThinkerKind::CeilingMover => {
                    sector.ceiling_height = sector.ceiling_height.wrapping_add(thinker.speed);
                }
            }

            thinker.countdown -= 1;
            if thinker.countdown <= 0 {
                self.remove_thinker(block)?;
                self.event_count += 1;
            } else {
                thinker.write(self.thinkers.block_bytes_mut(block)?);
            }
        }

        // Periodic spawn keeps the lists churning: allocate, link, and
        // register a mover node so both arenas see traffic.
        if self.step.0 % SPAWN_INTERVAL == 0 {
            let sector = self.rng.next_u32() % self.sectors.len() as u32;
            let kind = if self.rng.next_u32() & 1 == 0 {
                ThinkerKind::FloorMover
            } else {
                ThinkerKind::CeilingMover
            };
            let speed = (self.rng.next_u32() & 0x7) as i32 - 3;
            let block = self.spawn_thinker(kind, sector, THINKER_LIFETIME, speed)?;
            let _ = self.push_mover(block)?;
            self.event_count += 1;
        }
        Ok(())
    }

    fn run_flicker(&mut self) {
        for sector in &mut self.sectors {
            if sector.special == 1 {
                let draw = (self.rng.next_u32() & 0x1F) as i16;
                sector.light_level = (160 - draw).max(96);
            }
        }
    }

    fn run_triggers(&mut self) {
        if self.step.0 % TRIGGER_INTERVAL != 0 {
            return;
        }
        let index = (self.rng.next_u32() as usize) % self.line_specials.len();
        let current = self.line_specials[index];
        if current != 0 {
            // Fired specials switch off; one-shot triggers.
            self.set_line_special(index, 0);
            self.event_count += 1;
        }
    }

    /// Blocks of the thinker list in walk order. Test-visible handle on
    /// list structure.
    pub fn thinker_list(&self) -> Vec<BlockRef> {
        self.thinker_blocks().unwrap_or_default()
    }
}
