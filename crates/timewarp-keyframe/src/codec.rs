//! Write and read cursors over the keyframe byte buffer.
//!
//! All integers are little-endian and tightly packed. The writer owns a
//! growable buffer (explicit geometric doubling); the reader is a
//! sequential bounds-checked cursor over a byte slice. There is exactly
//! one write cursor and one read cursor per buffer — keyframe layout is
//! a straight-line sequence, not random access.

use timewarp_core::BlockRef;

use crate::error::KeyframeError;

/// Minimum buffer capacity once the first write lands.
const MIN_CAPACITY: usize = 64;

// ── Writer ──────────────────────────────────────────────────────

/// Append-only write cursor over a growable byte buffer.
///
/// Growth is geometric: when a write would overflow the current
/// capacity, capacity doubles until it fits. Growth preserves all
/// previously written bytes and the logical write offset.
#[derive(Default)]
pub struct KeyframeWriter {
    buf: Vec<u8>,
}

impl KeyframeWriter {
    /// Create a writer with an empty buffer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create a writer with a pre-sized buffer, for callers that know
    /// the approximate keyframe size from the previous save.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Double the capacity until `extra` more bytes fit.
    fn ensure(&mut self, extra: usize) {
        let needed = self.buf.len() + extra;
        if needed > self.buf.capacity() {
            let mut cap = self.buf.capacity().max(MIN_CAPACITY);
            while cap < needed {
                cap *= 2;
            }
            self.buf.reserve_exact(cap - self.buf.len());
        }
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, v: u8) {
        self.ensure(1);
        self.buf.push(v);
    }

    /// Write a little-endian u16.
    pub fn write_u16(&mut self, v: u16) {
        self.write_raw(&v.to_le_bytes());
    }

    /// Write a little-endian u32.
    pub fn write_u32(&mut self, v: u32) {
        self.write_raw(&v.to_le_bytes());
    }

    /// Write a little-endian u64.
    pub fn write_u64(&mut self, v: u64) {
        self.write_raw(&v.to_le_bytes());
    }

    /// Write a little-endian i16.
    pub fn write_i16(&mut self, v: i16) {
        self.write_raw(&v.to_le_bytes());
    }

    /// Write a little-endian i32.
    pub fn write_i32(&mut self, v: i32) {
        self.write_raw(&v.to_le_bytes());
    }

    /// Write a raw byte range verbatim.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_raw(bytes);
    }

    /// Write a `BlockRef` token verbatim (its raw u32 value, `NIL`
    /// included). The token regains meaning after the owning arena is
    /// restored from its snapshot.
    pub fn write_block_ref(&mut self, r: BlockRef) {
        self.write_u32(r.0);
    }

    /// Write a collection length prefix.
    pub fn write_count(&mut self, n: usize) {
        self.write_u32(n as u32);
    }

    /// Write several i32 fields in one call (one fixed-width record).
    pub fn write_i32_fields(&mut self, fields: &[i32]) {
        self.ensure(fields.len() * 4);
        for &v in fields {
            self.buf.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn write_raw(&mut self, bytes: &[u8]) {
        self.ensure(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer, returning the buffer.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

// ── Reader ──────────────────────────────────────────────────────

/// Sequential read cursor over a keyframe buffer.
///
/// Every read is bounds-checked: running past the written length is
/// [`KeyframeError::Underrun`], which by policy aborts the load — a
/// keyframe is never partially applied.
pub struct KeyframeReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> KeyframeReader<'a> {
    /// Create a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Take the next `n` bytes, or fail with `Underrun`.
    fn take(&mut self, n: usize) -> Result<&'a [u8], KeyframeError> {
        let available = self.buf.len() - self.pos;
        if n > available {
            return Err(KeyframeError::Underrun {
                needed: n,
                available,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, KeyframeError> {
        Ok(self.take(1)?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16(&mut self) -> Result<u16, KeyframeError> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().expect("take(2)")))
    }

    /// Read a little-endian u32.
    pub fn read_u32(&mut self) -> Result<u32, KeyframeError> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().expect("take(4)")))
    }

    /// Read a little-endian u64.
    pub fn read_u64(&mut self) -> Result<u64, KeyframeError> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().expect("take(8)")))
    }

    /// Read a little-endian i16.
    pub fn read_i16(&mut self) -> Result<i16, KeyframeError> {
        Ok(i16::from_le_bytes(self.take(2)?.try_into().expect("take(2)")))
    }

    /// Read a little-endian i32.
    pub fn read_i32(&mut self) -> Result<i32, KeyframeError> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().expect("take(4)")))
    }

    /// Read a raw byte range of the given length.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], KeyframeError> {
        self.take(len)
    }

    /// Read a `BlockRef` token verbatim.
    pub fn read_block_ref(&mut self) -> Result<BlockRef, KeyframeError> {
        Ok(BlockRef(self.read_u32()?))
    }

    /// Read a collection length prefix, rejecting counts beyond the
    /// destination's capacity.
    pub fn read_count(&mut self, capacity: usize) -> Result<usize, KeyframeError> {
        let count = self.read_u32()? as usize;
        if count > capacity {
            return Err(KeyframeError::CountExceedsCapacity { count, capacity });
        }
        Ok(count)
    }

    /// Read several i32 fields in one call, filling `fields` in order.
    pub fn read_i32_fields(&mut self, fields: &mut [i32]) -> Result<(), KeyframeError> {
        for field in fields.iter_mut() {
            *field = self.read_i32()?;
        }
        Ok(())
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the cursor has consumed the whole buffer.
    pub fn finished(&self) -> bool {
        self.pos == self.buf.len()
    }
}
