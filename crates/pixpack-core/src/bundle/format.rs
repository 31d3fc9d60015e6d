// crates/pixpack-core/src/bundle/format.rs
//
// PXB1 bundle layout (little-endian, varints are LEB128):
//   MAGIC[4] "PXB1"
//   version:u8
//   flags:u8            bit0 = full-alphabet trees (perm holds every symbol)
//   color_shift:u8
//   image_count:varint
//   5 x field table (dy, dx, runlen, value, color):
//     alphabet:varint
//     form_bits:varint, form bytes (1 bit per node, MSB-first, zero padded)
//     perm[alphabet]
//     data_bits:varint, data bytes (MSB-first, zero padded)
//   image_count x image record:
//     width:varint height:varint origin_x:varint origin_y:varint
//     palette_len:varint
//     field_bits: 5 x varint
//   crc32:u32           (over everything before crc32)
//   blake3_16:[16]      (over everything before blake3)

use crate::bundle::checksum::{blake3_16, crc32, hex16};
use crate::entropy::bits::{pack_symbols, unpack_symbols};
use crate::entropy::huffman::MAX_ALPHABET;
use crate::error::{PixError, Result};
use crate::lz::Field;
use crate::palette::PALETTE_SLOTS;
use crate::symbol::varint;

pub const MAGIC: [u8; 4] = *b"PXB1";
pub const VERSION: u8 = 1;
pub const FLAG_FULL_ALPHABET: u8 = 0x01;

/// Token fields plus the palette color field.
pub const FIELD_COUNT: usize = 5;
pub const COLOR_FIELD: usize = 4;
pub const FIELD_NAMES: [&str; FIELD_COUNT] = ["dy", "dx", "runlen", "value", "color"];

/// Alphabet each field table must declare for a given color shift.
pub fn field_alphabets(color_shift: u8) -> [usize; FIELD_COUNT] {
    let t = Field::ALL.map(Field::alphabet);
    [t[0], t[1], t[2], t[3], 256 >> color_shift]
}

/// Largest raster side a record may declare.
const MAX_SIDE: usize = 1 << 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldTable {
    pub alphabet: usize,
    pub form: Vec<bool>,
    pub perm: Vec<u8>,
    pub data_bits: usize,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRecord {
    pub width: usize,
    pub height: usize,
    pub origin_x: usize,
    pub origin_y: usize,
    /// One past the highest palette slot with colors in the color stream.
    pub palette_len: usize,
    /// Bits this image contributes to each field stream.
    pub field_bits: [usize; FIELD_COUNT],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bundle {
    pub color_shift: u8,
    pub fields: [FieldTable; FIELD_COUNT],
    pub images: Vec<ImageRecord>,
}

impl Bundle {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut b = Vec::with_capacity(256 + self.fields.iter().map(|f| f.data.len()).sum::<usize>());
        b.extend_from_slice(&MAGIC);
        b.push(VERSION);
        b.push(FLAG_FULL_ALPHABET);
        b.push(self.color_shift);
        varint::put_usize(self.images.len(), &mut b);

        for f in &self.fields {
            varint::put_usize(f.alphabet, &mut b);
            varint::put_usize(f.form.len(), &mut b);
            let form: Vec<u8> = f.form.iter().map(|&x| x as u8).collect();
            b.extend_from_slice(&pack_symbols(1, &form)?);
            b.extend_from_slice(&f.perm);
            varint::put_usize(f.data_bits, &mut b);
            b.extend_from_slice(&f.data);
        }

        for im in &self.images {
            varint::put_usize(im.width, &mut b);
            varint::put_usize(im.height, &mut b);
            varint::put_usize(im.origin_x, &mut b);
            varint::put_usize(im.origin_y, &mut b);
            varint::put_usize(im.palette_len, &mut b);
            for &bits in &im.field_bits {
                varint::put_usize(bits, &mut b);
            }
        }

        let c = crc32(&b);
        b.extend_from_slice(&c.to_le_bytes());

        let h = blake3_16(&b);
        b.extend_from_slice(&h);

        Ok(b)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MAGIC.len() + 3 + 4 + 16 || bytes[0..4] != MAGIC {
            return Err(PixError::BundleFormat("bad magic".into()));
        }

        let blake_off = bytes.len() - 16;
        if blake3_16(&bytes[..blake_off]) != bytes[blake_off..] {
            return Err(PixError::BundleFormat("blake3 mismatch".into()));
        }
        let crc_off = blake_off - 4;
        let crc_expected = read_u32_at(bytes, crc_off)?;
        if crc32(&bytes[..crc_off]) != crc_expected {
            return Err(PixError::BundleFormat("crc32 mismatch".into()));
        }
        let body = &bytes[..crc_off];

        let mut i = 4usize;
        let version = read_u8(body, &mut i)?;
        if version != VERSION {
            return Err(PixError::BundleFormat(format!("unsupported version {version}")));
        }
        let flags = read_u8(body, &mut i)?;
        if flags & FLAG_FULL_ALPHABET == 0 {
            return Err(PixError::BundleFormat("sparse-alphabet trees not supported".into()));
        }
        let color_shift = read_u8(body, &mut i)?;
        if color_shift > 7 {
            return Err(PixError::BundleFormat(format!("color_shift {color_shift} out of range")));
        }
        let image_count = varint::get_usize_max(body, &mut i, body.len(), "image_count")?;

        let expected = field_alphabets(color_shift);
        let mut fields = Vec::with_capacity(FIELD_COUNT);
        for k in 0..FIELD_COUNT {
            let alphabet = varint::get_usize_max(body, &mut i, MAX_ALPHABET, "alphabet")?;
            if alphabet != expected[k] {
                return Err(PixError::BundleFormat(format!(
                    "{} alphabet {} (expected {})",
                    FIELD_NAMES[k], alphabet, expected[k]
                )));
            }
            let form_bits = varint::get_usize_max(body, &mut i, 2 * MAX_ALPHABET, "form_bits")?;
            let form_bytes = take(body, &mut i, form_bits.div_ceil(8))?;
            let form = unpack_symbols(1, form_bytes, form_bits)
                .map_err(|e| PixError::BundleFormat(format!("form: {e}")))?
                .into_iter()
                .map(|x| x == 1)
                .collect();
            let perm = take(body, &mut i, alphabet)?.to_vec();
            let data_bits = varint::get_usize_max(body, &mut i, body.len().saturating_mul(8), "data_bits")?;
            let data = take(body, &mut i, data_bits.div_ceil(8))?.to_vec();
            fields.push(FieldTable { alphabet, form, perm, data_bits, data });
        }
        let fields: [FieldTable; FIELD_COUNT] = fields
            .try_into()
            .map_err(|_| PixError::BundleFormat("field count".into()))?;

        let mut images = Vec::with_capacity(image_count.min(1 << 16));
        for _ in 0..image_count {
            let width = varint::get_usize_max(body, &mut i, MAX_SIDE, "width")?;
            let height = varint::get_usize_max(body, &mut i, MAX_SIDE, "height")?;
            let origin_x = varint::get_usize_max(body, &mut i, MAX_SIDE, "origin_x")?;
            let origin_y = varint::get_usize_max(body, &mut i, MAX_SIDE, "origin_y")?;
            let palette_len = varint::get_usize_max(body, &mut i, PALETTE_SLOTS, "palette_len")?;
            let mut field_bits = [0usize; FIELD_COUNT];
            for (k, slot) in field_bits.iter_mut().enumerate() {
                *slot = varint::get_usize_max(body, &mut i, fields[k].data_bits, "field_bits")?;
            }
            images.push(ImageRecord { width, height, origin_x, origin_y, palette_len, field_bits });
        }

        if i != body.len() {
            return Err(PixError::BundleFormat(format!(
                "{} trailing bytes after image records",
                body.len() - i
            )));
        }
        for (k, f) in fields.iter().enumerate() {
            let total: usize = images.iter().map(|im| im.field_bits[k]).sum();
            if total != f.data_bits {
                return Err(PixError::BundleFormat(format!(
                    "{} segments sum to {} bits, stream holds {}",
                    FIELD_NAMES[k], total, f.data_bits
                )));
            }
        }

        Ok(Self { color_shift, fields, images })
    }

    /// Bit offset of image `k`'s segment inside each field stream.
    pub fn segment_starts(&self, k: usize) -> [usize; FIELD_COUNT] {
        let mut starts = [0usize; FIELD_COUNT];
        for im in &self.images[..k.min(self.images.len())] {
            for (s, &bits) in starts.iter_mut().zip(&im.field_bits) {
                *s += bits;
            }
        }
        starts
    }
}

/// Hex content id (blake3_16 trailer) of an encoded bundle.
pub fn bundle_id_hex(bytes: &[u8]) -> Result<String> {
    if bytes.len() < 16 {
        return Err(PixError::BundleFormat("bundle too small".into()));
    }
    let mut id = [0u8; 16];
    id.copy_from_slice(&bytes[bytes.len() - 16..]);
    Ok(hex16(&id))
}

fn take<'a>(bytes: &'a [u8], i: &mut usize, n: usize) -> Result<&'a [u8]> {
    let end = i
        .checked_add(n)
        .filter(|&e| e <= bytes.len())
        .ok_or_else(|| PixError::BundleFormat("unexpected eof".into()))?;
    let s = &bytes[*i..end];
    *i = end;
    Ok(s)
}

fn read_u8(bytes: &[u8], i: &mut usize) -> Result<u8> {
    Ok(take(bytes, i, 1)?[0])
}

fn read_u32_at(bytes: &[u8], at: usize) -> Result<u32> {
    let mut i = at;
    let s = take(bytes, &mut i, 4)?;
    Ok(u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
}
