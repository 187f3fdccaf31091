//! Reserved address ranges with a committed, zero-initialized prefix.
//!
//! [`Region`] is the subsystem's virtual-memory analogue: `reserve`
//! claims the full range up front, `commit` makes a prefix of it usable
//! (zero-initialized), `decommit` gives it back. The base never moves —
//! the backing `Vec` is created with the full reserved capacity and its
//! length never exceeds that capacity, so committing more memory never
//! reallocates. Releasing the reservation is `Drop`.

use crate::error::ArenaError;

/// A contiguous reserved range with a committed prefix.
///
/// Invariant: `committed() <= reserved()` at all times. Only committed
/// bytes are readable or writable; the reserved-but-uncommitted tail is
/// address space only.
pub struct Region {
    /// Backing storage. Capacity is the reservation; length is the
    /// committed prefix.
    data: Vec<u8>,
    /// Size of the reservation in bytes. Fixed at creation.
    reserved: usize,
}

impl Region {
    /// Reserve a range of `bytes` with nothing committed.
    pub fn reserve(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            reserved: bytes,
        }
    }

    /// Grow the committed prefix to `bytes` (zero-initialized).
    ///
    /// Idempotent: committing at or below the current committed size is
    /// a no-op. Committing beyond the reservation fails without changing
    /// any state.
    pub fn commit(&mut self, bytes: usize) -> Result<(), ArenaError> {
        if bytes > self.reserved {
            return Err(ArenaError::CapacityExceeded {
                requested: bytes,
                limit: self.reserved,
            });
        }
        if bytes > self.data.len() {
            self.data.resize(bytes, 0);
        }
        Ok(())
    }

    /// Shrink the committed prefix to `bytes`, releasing the backing
    /// memory above it. The reservation is unchanged.
    ///
    /// Idempotent: decommitting at or above the committed size is a
    /// no-op.
    pub fn decommit(&mut self, bytes: usize) {
        if bytes < self.data.len() {
            self.data.truncate(bytes);
        }
    }

    /// Size of the reservation in bytes.
    pub fn reserved(&self) -> usize {
        self.reserved
    }

    /// Size of the committed prefix in bytes.
    pub fn committed(&self) -> usize {
        self.data.len()
    }

    /// Shared access to a committed byte range.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the committed prefix.
    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Mutable access to a committed byte range.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the committed prefix.
    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.data[offset..offset + len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_commits_nothing() {
        let region = Region::reserve(4096);
        assert_eq!(region.reserved(), 4096);
        assert_eq!(region.committed(), 0);
    }

    #[test]
    fn commit_zero_initializes() {
        let mut region = Region::reserve(4096);
        region.commit(128).unwrap();
        assert_eq!(region.committed(), 128);
        assert!(region.bytes(0, 128).iter().all(|&b| b == 0));
    }

    #[test]
    fn commit_is_idempotent() {
        let mut region = Region::reserve(4096);
        region.commit(256).unwrap();
        region.bytes_mut(0, 1)[0] = 7;
        region.commit(128).unwrap();
        assert_eq!(region.committed(), 256);
        assert_eq!(region.bytes(0, 1)[0], 7);
    }

    #[test]
    fn commit_beyond_reservation_fails_cleanly() {
        let mut region = Region::reserve(1024);
        region.commit(512).unwrap();
        let err = region.commit(2048).unwrap_err();
        assert!(matches!(err, ArenaError::CapacityExceeded { .. }));
        assert_eq!(region.committed(), 512);
    }

    #[test]
    fn decommit_truncates() {
        let mut region = Region::reserve(1024);
        region.commit(512).unwrap();
        region.decommit(256);
        assert_eq!(region.committed(), 256);
        // Recommitting the freed range hands back zeroed bytes.
        region.commit(512).unwrap();
        assert!(region.bytes(256, 256).iter().all(|&b| b == 0));
    }
}
