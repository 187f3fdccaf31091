//! World configuration and validation.

use std::error::Error;
use std::fmt;

use timewarp_arena::{ArenaConfig, ArenaError};

use crate::state::MAX_PLAYERS;

/// Configuration for building a [`World`](crate::World).
///
/// Arena sizing is the simulation driver's responsibility: the two
/// `ArenaConfig`s fix each arena's initial commit and growth ceiling for
/// the whole run.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Number of populated player slots. At most [`MAX_PLAYERS`].
    pub player_count: usize,
    /// Number of sectors in the world.
    pub sector_count: usize,
    /// Number of lines carrying a dirty-tracked special.
    pub line_count: usize,
    /// Seed for the shared deterministic RNG.
    pub seed: u64,
    /// Sizing for the thinker arena.
    pub thinker_arena: ArenaConfig,
    /// Sizing for the mover-node arena.
    pub mover_arena: ArenaConfig,
}

impl WorldConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_count == 0 || self.player_count > MAX_PLAYERS {
            return Err(ConfigError::PlayerCount {
                got: self.player_count,
            });
        }
        if self.sector_count == 0 {
            return Err(ConfigError::NoSectors);
        }
        if self.line_count == 0 {
            return Err(ConfigError::NoLines);
        }
        self.thinker_arena.validate().map_err(ConfigError::Arena)?;
        self.mover_arena.validate().map_err(ConfigError::Arena)?;
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            sector_count: 32,
            line_count: 64,
            seed: 0,
            thinker_arena: ArenaConfig::default(),
            mover_arena: ArenaConfig::with_limit(1 << 20),
        }
    }
}

/// Errors detected during [`WorldConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Player count is zero or above [`MAX_PLAYERS`].
    PlayerCount {
        /// The rejected count.
        got: usize,
    },
    /// Sector count is zero.
    NoSectors,
    /// Line count is zero.
    NoLines,
    /// An arena configuration is invalid.
    Arena(ArenaError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerCount { got } => {
                write!(f, "player_count must be in 1..={MAX_PLAYERS} (got {got})")
            }
            Self::NoSectors => write!(f, "sector_count must be nonzero"),
            Self::NoLines => write!(f, "line_count must be nonzero"),
            Self::Arena(e) => write!(f, "arena config: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}
