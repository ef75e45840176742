//! Bounds-checked sequential reader over an in-memory byte buffer.
//!
//! Every read either advances the cursor by exactly the bytes it consumed or
//! fails without advancing at all — callers never have to reason about a
//! partially-consumed read.

use super::error::{AltiumError, AltiumResult};

/// A fixed buffer plus a 0-based read position.
///
/// Endianness is always little-endian, regardless of host, since that's
/// what the file format uses.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over `data`, positioned at the start.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total buffer length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True iff `n` more bytes can be read without overrunning the buffer.
    #[must_use]
    pub fn check_available(&self, n: usize) -> bool {
        self.pos.saturating_add(n) <= self.data.len()
    }

    fn require(&self, n: usize) -> AltiumResult<()> {
        if self.check_available(n) {
            Ok(())
        } else {
            Err(AltiumError::parse_error(
                self.pos,
                format!("short read: need {n} bytes, have {}", self.data.len() - self.pos),
            ))
        }
    }

    /// Advances the cursor by `n` bytes without inspecting them.
    pub fn skip(&mut self, n: usize) -> AltiumResult<()> {
        self.require(n)?;
        self.pos += n;
        Ok(())
    }

    /// Moves the cursor to an absolute position (only ever used to
    /// reconcile a record against its declared length).
    pub fn seek(&mut self, pos: usize) -> AltiumResult<()> {
        if pos > self.data.len() {
            return Err(AltiumError::parse_error(
                self.pos,
                format!("seek past end of buffer: {pos} > {}", self.data.len()),
            ));
        }
        self.pos = pos;
        Ok(())
    }

    /// Copies `n` raw bytes and advances past them.
    pub fn bytes(&mut self, n: usize) -> AltiumResult<&'a [u8]> {
        self.require(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self) -> AltiumResult<u8> {
        let b = self.bytes(1)?;
        Ok(b[0])
    }

    pub fn u16(&mut self) -> AltiumResult<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn i16(&mut self) -> AltiumResult<i16> {
        Ok(self.u16()? as i16)
    }

    pub fn u32(&mut self) -> AltiumResult<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn i32(&mut self) -> AltiumResult<i32> {
        Ok(self.u32()? as i32)
    }

    pub fn f64(&mut self) -> AltiumResult<f64> {
        let b = self.bytes(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(f64::from_le_bytes(arr))
    }

    /// Reads `2 * n_units` bytes, decodes as UTF-16LE, and re-encodes as
    /// UTF-8. An odd requested unit count is fine (it's a unit count, not a
    /// byte count); a lone unpaired surrogate fails the read.
    pub fn utf16le(&mut self, n_units: usize) -> AltiumResult<String> {
        let start = self.pos;
        let raw = self.bytes(n_units * 2)?;
        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16(&units)
            .map_err(|_| AltiumError::parse_error(start, "invalid UTF-16LE sequence"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_fixed_width() {
        let data = [0x34, 0x12, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut c = Cursor::new(&data);
        assert_eq!(c.u16().unwrap(), 0x1234);
        assert_eq!(c.i32().unwrap(), -1);
    }

    #[test]
    fn check_available_boundary() {
        let data = [0u8; 4];
        let c = Cursor::new(&data);
        assert!(c.check_available(4));
        assert!(!c.check_available(5));
    }

    #[test]
    fn short_read_does_not_advance() {
        let data = [0u8; 2];
        let mut c = Cursor::new(&data);
        assert!(c.u32().is_err());
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn utf16le_roundtrip() {
        let units: Vec<u8> = "Hi".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let mut c = Cursor::new(&units);
        assert_eq!(c.utf16le(2).unwrap(), "Hi");
    }

    #[test]
    fn utf16le_rejects_unpaired_surrogate() {
        let data = [0x00, 0xD8]; // lone high surrogate
        let mut c = Cursor::new(&data);
        assert!(c.utf16le(1).is_err());
    }

    #[test]
    fn skip_and_seek() {
        let data = [0u8; 10];
        let mut c = Cursor::new(&data);
        c.skip(3).unwrap();
        assert_eq!(c.position(), 3);
        c.seek(7).unwrap();
        assert_eq!(c.position(), 7);
        assert!(c.seek(11).is_err());
    }
}
