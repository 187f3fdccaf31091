//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for one arena.
///
/// The only tunables are the initial committed size and the growth
/// ceiling; both are supplied at arena construction and immutable
/// afterwards. Validated by [`ArenaConfig::validate`], which the arena
/// constructor calls.
#[derive(Clone, Copy, Debug)]
pub struct ArenaConfig {
    /// Bytes committed (zero-initialized and usable) at creation.
    ///
    /// Default: 64 KiB. Must be a power of two and at least 256.
    pub initial_commit: usize,

    /// Growth ceiling: the total reserved range in bytes.
    ///
    /// The committed region doubles on demand up to this limit; an
    /// allocation that cannot fit under it fails with
    /// [`ArenaError::CapacityExceeded`]. Default: 16 MiB. Must be a
    /// power of two, at least `initial_commit`, and at most `u32::MAX`
    /// so block offsets fit in a `BlockRef`.
    pub reserve_limit: usize,
}

impl ArenaConfig {
    /// Default initial committed size: 64 KiB.
    pub const DEFAULT_INITIAL_COMMIT: usize = 64 * 1024;

    /// Default reserve limit: 16 MiB.
    pub const DEFAULT_RESERVE_LIMIT: usize = 16 * 1024 * 1024;

    /// Minimum permitted initial commit.
    pub const MIN_INITIAL_COMMIT: usize = 256;

    /// Create a config with the given reserve limit and the default
    /// initial commit (clamped down to the limit if it is smaller).
    pub fn with_limit(reserve_limit: usize) -> Self {
        Self {
            initial_commit: Self::DEFAULT_INITIAL_COMMIT.min(reserve_limit),
            reserve_limit,
        }
    }

    /// Check structural invariants.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if either size is not a
    /// power of two, the initial commit is below the minimum or above
    /// the limit, or the limit does not fit in a `u32` offset.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if !self.initial_commit.is_power_of_two() || self.initial_commit < Self::MIN_INITIAL_COMMIT
        {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "initial_commit must be a power of two and >= {} (got {})",
                    Self::MIN_INITIAL_COMMIT,
                    self.initial_commit,
                ),
            });
        }
        if !self.reserve_limit.is_power_of_two() {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "reserve_limit must be a power of two (got {})",
                    self.reserve_limit
                ),
            });
        }
        if self.reserve_limit < self.initial_commit {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "reserve_limit {} is smaller than initial_commit {}",
                    self.reserve_limit, self.initial_commit,
                ),
            });
        }
        if self.reserve_limit > u32::MAX as usize {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "reserve_limit {} does not fit in a u32 block offset",
                    self.reserve_limit
                ),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_commit: Self::DEFAULT_INITIAL_COMMIT,
            reserve_limit: Self::DEFAULT_RESERVE_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ArenaConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_power_of_two() {
        let config = ArenaConfig {
            initial_commit: 300,
            reserve_limit: 1 << 20,
        };
        assert!(matches!(
            config.validate(),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_limit_below_initial() {
        let config = ArenaConfig {
            initial_commit: 1 << 16,
            reserve_limit: 1 << 12,
        };
        assert!(matches!(
            config.validate(),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn with_limit_clamps_initial() {
        let config = ArenaConfig::with_limit(4096);
        assert_eq!(config.initial_commit, 4096);
        assert!(config.validate().is_ok());
    }
}
