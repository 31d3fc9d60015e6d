// crates/pixpack-core/src/entropy/bits.rs

use crate::error::{PixError, Result};

const MAX_BITS: u8 = 8;

/// Append-only bit sink.
///
/// Bit order is MSB-first within the packed byte stream:
/// - The first bit written becomes the MSB of bytes[0].
/// - Bits flow left-to-right, byte by byte.
/// - The final partial byte is padded with zero bits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitWriter {
    bytes: Vec<u8>,
    len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        let bit_in_byte = self.len % 8;
        if bit_in_byte == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1u8 << (7 - bit_in_byte);
        }
        self.len += 1;
    }

    pub fn extend(&mut self, bits: &[bool]) {
        for &b in bits {
            self.push(b);
        }
    }

    /// Number of bits written (excluding padding).
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// MSB-first bit source over a packed byte slice, bounded by an explicit bit length.
#[derive(Clone, Debug)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    len: usize,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// `bit_len` must not exceed `bytes.len() * 8`.
    pub fn new(bytes: &'a [u8], bit_len: usize) -> Result<Self> {
        Self::window(bytes, 0, bit_len)
    }

    /// Reader over bits `start..start + bit_len` of `bytes`.
    pub fn window(bytes: &'a [u8], start: usize, bit_len: usize) -> Result<Self> {
        let end = start
            .checked_add(bit_len)
            .ok_or_else(|| PixError::BundleFormat("bit window overflow".into()))?;
        if end > bytes.len().saturating_mul(8) {
            return Err(PixError::BundleFormat(format!(
                "bitstream short: bits {}..{} requested, {} bytes present",
                start,
                end,
                bytes.len()
            )));
        }
        Ok(Self { bytes, len: end, pos: start })
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.pos >= self.len {
            return Err(PixError::BundleFormat("bitstream: eof".into()));
        }
        let byte = self.bytes[self.pos / 8];
        let bit = (byte >> (7 - self.pos % 8)) & 1;
        self.pos += 1;
        Ok(bit == 1)
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.len - self.pos
    }
}

/// Pack `symbols` where each symbol occupies exactly `bits_per_symbol` bits.
///
/// Same MSB-first layout as [`BitWriter`].
///
/// Requirements:
/// - `bits_per_symbol` must be in 1..=8.
/// - Each symbol must be <= (1<<bits_per_symbol)-1.
pub fn pack_symbols(bits_per_symbol: u8, symbols: &[u8]) -> Result<Vec<u8>> {
    validate_bits(bits_per_symbol)?;
    let mask: u8 = ((1u16 << bits_per_symbol) - 1) as u8;

    let mut w = BitWriter::new();
    for &sym in symbols.iter() {
        if sym & !mask != 0 {
            return Err(PixError::Validation(format!(
                "symbol out of range: sym={} bits_per_symbol={} mask=0x{:02x}",
                sym, bits_per_symbol, mask
            )));
        }
        for b in (0..bits_per_symbol).rev() {
            w.push((sym >> b) & 1 == 1);
        }
    }

    Ok(w.into_bytes())
}

/// Unpack `symbol_count` symbols, each `bits_per_symbol` bits, from a packed MSB-first bitstream.
///
/// Inverse of `pack_symbols` for the same `(bits_per_symbol, symbol_count)`.
pub fn unpack_symbols(bits_per_symbol: u8, packed: &[u8], symbol_count: usize) -> Result<Vec<u8>> {
    validate_bits(bits_per_symbol)?;

    let total_bits: usize = symbol_count
        .checked_mul(bits_per_symbol as usize)
        .ok_or_else(|| PixError::Validation("unpack_symbols overflow".into()))?;

    let mut r = BitReader::new(packed, total_bits)?;
    let mut out = Vec::with_capacity(symbol_count);
    for _ in 0..symbol_count {
        let mut sym: u8 = 0;
        for _ in 0..bits_per_symbol {
            sym = (sym << 1) | r.read_bit()? as u8;
        }
        out.push(sym);
    }

    Ok(out)
}

#[inline]
fn validate_bits(bits_per_symbol: u8) -> Result<()> {
    if bits_per_symbol == 0 || bits_per_symbol > MAX_BITS {
        return Err(PixError::Validation(format!(
            "bits_per_symbol must be in 1..=8, got {}",
            bits_per_symbol
        )));
    }
    Ok(())
}
