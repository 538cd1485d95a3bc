//! Varint byte representation for gap streams.
//!
//! Format: little-endian base-128 (LEB128-like): 7 bits per byte, MSB is continuation.
//! Each gap is written as its zero-extended bit pattern ([`GapInt::to_wire`]).

use crate::{Error, GapInt};

/// Encode a `u64` into varint bytes.
pub fn encode_u64(mut x: u64, out: &mut Vec<u8>) {
    while x >= 0x80 {
        out.push(((x as u8) & 0x7F) | 0x80);
        x >>= 7;
    }
    out.push(x as u8);
}

/// Decode a `u64` from varint bytes, returning (value, bytes_consumed).
///
/// Returns `None` on truncated input or a value wider than 64 bits.
pub fn decode_u64(bytes: &[u8]) -> Option<(u64, usize)> {
    let mut x: u64 = 0;
    let mut shift = 0u32;
    for (i, &b) in bytes.iter().enumerate() {
        let low = (b & 0x7F) as u64;
        if shift == 63 && low > 1 {
            return None;
        }
        x |= low << shift;
        if (b & 0x80) == 0 {
            return Some((x, i + 1));
        }
        shift += 7;
        if shift > 63 {
            return None;
        }
    }
    None
}

/// Append a gap stream as consecutive varints.
pub fn encode_gaps<T: GapInt>(gaps: &[T], out: &mut Vec<u8>) {
    for &g in gaps {
        encode_u64(g.to_wire(), out);
    }
}

/// Decode a whole byte slice of consecutive varints into gaps of width `T`.
pub fn decode_gaps<T: GapInt>(bytes: &[u8]) -> Result<Vec<T>, Error> {
    let mut out = Vec::new();
    let mut offset = 0usize;
    while offset < bytes.len() {
        let (raw, used) = decode_u64(&bytes[offset..]).ok_or(Error::InvalidVarint { offset })?;
        let gap = T::from_wire(raw).ok_or(Error::OutOfRange {
            index: out.len(),
            value: raw,
        })?;
        out.push(gap);
        offset += used;
    }
    Ok(out)
}
