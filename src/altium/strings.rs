//! The two framed string formats used throughout PcbLib/SchLib streams.

use tracing::warn;

use super::cursor::Cursor;
use super::error::AltiumResult;

/// `u32 length` followed by that many raw bytes, decoded lossily as UTF-8.
pub fn read_dword_prefixed_string(cursor: &mut Cursor<'_>) -> AltiumResult<String> {
    let len = cursor.u32()? as usize;
    let bytes = cursor.bytes(len)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// `u32 outer length`, `u8 inner length`, then `inner` bytes.
///
/// `outer == 1 + inner` is the norm (the outer count includes the inner
/// length byte itself). If both are zero the result is an empty string
/// without reading a payload. If they disagree, a warning is logged and the
/// inner length is trusted — this is the tolerant behavior observed in the
/// wild, not a hardening measure.
pub fn read_multi_prefixed_string(cursor: &mut Cursor<'_>) -> AltiumResult<String> {
    let outer = cursor.u32()?;
    let inner = cursor.u8()?;
    if outer == 0 && inner == 0 {
        return Ok(String::new());
    }
    if outer != u32::from(inner) + 1 {
        warn!(outer, inner, "multi-prefixed string length mismatch, trusting inner length");
    }
    let bytes = cursor.bytes(inner as usize)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// `u8 length` followed by that many raw bytes. Used by the SchLib binary
/// pin record's embedded Pascal-style strings (name, designator, note, and
/// friends) — not one of the two PcbLib framings, but the same idea scaled
/// down to a single length byte.
pub fn read_u8_prefixed_string(cursor: &mut Cursor<'_>) -> AltiumResult<String> {
    let len = cursor.u8()? as usize;
    let bytes = cursor.bytes(len)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_prefixed_string_decodes() {
        // S2: outer=5, inner=4, payload "Hell"
        let data = [0x05, 0x00, 0x00, 0x00, 0x04, b'H', b'e', b'l', b'l'];
        let mut c = Cursor::new(&data);
        let s = read_multi_prefixed_string(&mut c).unwrap();
        assert_eq!(s, "Hell");
        assert_eq!(c.position(), 9);
    }

    #[test]
    fn multi_prefixed_empty_zero_zero() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x00];
        let mut c = Cursor::new(&data);
        let s = read_multi_prefixed_string(&mut c).unwrap();
        assert_eq!(s, "");
        assert_eq!(c.position(), 5);
    }

    #[test]
    fn multi_prefixed_mismatch_trusts_inner() {
        let data = [0xFF, 0x00, 0x00, 0x00, 0x03, b'a', b'b', b'c'];
        let mut c = Cursor::new(&data);
        let s = read_multi_prefixed_string(&mut c).unwrap();
        assert_eq!(s, "abc");
    }

    #[test]
    fn dword_prefixed_string_decodes() {
        let data = [0x03, 0x00, 0x00, 0x00, b'f', b'o', b'o'];
        let mut c = Cursor::new(&data);
        assert_eq!(read_dword_prefixed_string(&mut c).unwrap(), "foo");
    }
}
