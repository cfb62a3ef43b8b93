//! Bounds-checked field cursors shared by every payload codec.

use bytes::{Buf, Bytes};

use crate::protocol::{Error, Result};

/// Reads little-endian fields from a payload, failing instead of reading
/// past the end.
#[derive(Debug, Clone)]
pub struct FieldReader {
    buf: Bytes,
}

impl FieldReader {
    /// Wrap a payload
    #[must_use]
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    /// Bytes left to read
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Whether all bytes were consumed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn ensure(&self, field: &'static str, needed: usize) -> Result<()> {
        if self.buf.len() < needed {
            return Err(Error::Truncated {
                field,
                needed,
                got: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Read one byte
    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        self.ensure(field, 1)?;
        Ok(self.buf.get_u8())
    }

    /// Read a little-endian `u16`
    pub fn read_u16(&mut self, field: &'static str) -> Result<u16> {
        self.ensure(field, 2)?;
        Ok(self.buf.get_u16_le())
    }

    /// Read a little-endian `u32`
    pub fn read_u32(&mut self, field: &'static str) -> Result<u32> {
        self.ensure(field, 4)?;
        Ok(self.buf.get_u32_le())
    }

    /// Read a little-endian `i32`
    pub fn read_i32(&mut self, field: &'static str) -> Result<i32> {
        self.ensure(field, 4)?;
        Ok(self.buf.get_i32_le())
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        self.ensure(field, N)?;
        let mut array = [0u8; N];
        self.buf.copy_to_slice(&mut array);
        Ok(array)
    }

    /// Take everything that is left (zero-copy)
    pub fn read_rest(&mut self) -> Bytes {
        std::mem::take(&mut self.buf)
    }

    /// Borrow everything that is left without consuming it
    #[must_use]
    pub fn peek_rest(&self) -> &[u8] {
        &self.buf
    }
}

/// Writes little-endian fields into a caller-owned buffer.
///
/// Writes past `capacity` fail with [`Error::CapacityExceeded`]; writes past
/// the end of the buffer fail with [`Error::BufferTooSmall`].
#[derive(Debug)]
pub struct FieldWriter<'a> {
    out: &'a mut [u8],
    position: usize,
    capacity: usize,
}

impl<'a> FieldWriter<'a> {
    /// Wrap an output buffer with a wire capacity limit
    #[must_use]
    pub fn new(out: &'a mut [u8], capacity: usize) -> Self {
        Self {
            out,
            position: 0,
            capacity,
        }
    }

    /// Bytes written so far
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Append raw bytes
    pub fn put_slice(&mut self, field: &'static str, bytes: &[u8]) -> Result<()> {
        let end = self.position + bytes.len();
        if end > self.capacity {
            return Err(Error::CapacityExceeded {
                field,
                size: end,
                max: self.capacity,
            });
        }
        if end > self.out.len() {
            return Err(Error::BufferTooSmall {
                needed: end,
                got: self.out.len(),
            });
        }
        self.out[self.position..end].copy_from_slice(bytes);
        self.position = end;
        Ok(())
    }

    /// Append one byte
    pub fn put_u8(&mut self, field: &'static str, value: u8) -> Result<()> {
        self.put_slice(field, &[value])
    }

    /// Append a little-endian `u16`
    pub fn put_u16(&mut self, field: &'static str, value: u16) -> Result<()> {
        self.put_slice(field, &value.to_le_bytes())
    }

    /// Append a little-endian `u32`
    pub fn put_u32(&mut self, field: &'static str, value: u32) -> Result<()> {
        self.put_slice(field, &value.to_le_bytes())
    }

    /// Append a little-endian `i32`
    pub fn put_i32(&mut self, field: &'static str, value: i32) -> Result<()> {
        self.put_slice(field, &value.to_le_bytes())
    }
}
