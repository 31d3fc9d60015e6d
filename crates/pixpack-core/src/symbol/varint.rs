// crates/pixpack-core/src/symbol/varint.rs
//
// Unsigned varint (LEB128-like) for bundle headers and per-image records.

use crate::error::{PixError, Result};

pub fn put_u64(mut v: u64, out: &mut Vec<u8>) {
    while v >= 0x80 {
        out.push(((v as u8) & 0x7F) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

#[inline]
pub fn put_usize(v: usize, out: &mut Vec<u8>) {
    put_u64(v as u64, out);
}

pub fn get_u64(bytes: &[u8], i: &mut usize) -> Result<u64> {
    let mut acc: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        if *i >= bytes.len() {
            return Err(PixError::BundleFormat("varint: eof".into()));
        }
        let b = bytes[*i];
        *i += 1;

        let low = (b & 0x7F) as u64;
        if shift >= 64 || ((low << shift) >> shift) != low {
            return Err(PixError::BundleFormat("varint: overflow".into()));
        }
        acc |= low << shift;

        if (b & 0x80) == 0 {
            return Ok(acc);
        }
        shift += 7;
        if shift > 63 {
            return Err(PixError::BundleFormat("varint: too long".into()));
        }
    }
}

/// Read a varint that must fit the address space and stay below `limit`.
pub fn get_usize_max(bytes: &[u8], i: &mut usize, limit: usize, what: &str) -> Result<usize> {
    let v = get_u64(bytes, i)?;
    match usize::try_from(v) {
        Ok(v) if v <= limit => Ok(v),
        _ => Err(PixError::BundleFormat(format!(
            "{what} out of range: {v} (max {limit})"
        ))),
    }
}
