// crates/pixpack-core/src/bundle/writer.rs

use crate::bundle::format::{Bundle, FieldTable, ImageRecord, COLOR_FIELD, FIELD_COUNT};
use crate::corpus::Optimized;
use crate::entropy::{BitWriter, HuffmanCode};
use crate::error::{PixError, Result};
use crate::lz::TOKEN_FIELDS;
use crate::palette::{ColorPair, IndexedImage, Rgb};
use crate::params::CodecParams;

/// Palette color symbols of one image: primary r,g,b per slot 1..palette_len,
/// then alternate r,g,b per slot. Empty slots emit zeros.
pub fn color_symbols(image: &IndexedImage) -> Vec<u8> {
    let len = image.palette.slot_span();
    let mut out = Vec::with_capacity(len.saturating_sub(1) * 6);
    let side = |pick: fn(&ColorPair) -> Option<Rgb>, out: &mut Vec<u8>| {
        for slot in 1..len {
            let c = image
                .palette
                .get(slot as u8)
                .and_then(|p| pick(&p))
                .unwrap_or_default();
            out.extend_from_slice(&c.channels());
        }
    };
    side(|p| p.primary, &mut out);
    side(|p| p.alternate, &mut out);
    out
}

/// Pack the final-round parse, codes and palettes into a bundle.
pub fn serialize(images: &[IndexedImage], optimized: &Optimized, params: &CodecParams) -> Result<(Bundle, HuffmanCode)> {
    if images.len() != optimized.parses.len() {
        return Err(PixError::Validation(format!(
            "{} images but {} parses",
            images.len(),
            optimized.parses.len()
        )));
    }

    let colors: Vec<Vec<u8>> = images.iter().map(color_symbols).collect();
    let pooled: Vec<u8> = colors.iter().flatten().copied().collect();
    let color_code = HuffmanCode::build(&pooled, params.color_alphabet())?;

    let mut writers: [BitWriter; FIELD_COUNT] = Default::default();
    let mut records = Vec::with_capacity(images.len());

    for ((im, tokens), cols) in images.iter().zip(&optimized.parses).zip(&colors) {
        let before: Vec<usize> = writers.iter().map(BitWriter::bit_len).collect();

        for t in tokens {
            for (k, sym) in t.fields().into_iter().enumerate() {
                if let Some(s) = sym {
                    optimized.codes[k].encode_symbol(s, &mut writers[k])?;
                }
            }
        }
        for &c in cols {
            color_code.encode_symbol(c, &mut writers[COLOR_FIELD])?;
        }

        let mut field_bits = [0usize; FIELD_COUNT];
        for (k, bits) in field_bits.iter_mut().enumerate() {
            *bits = writers[k].bit_len() - before[k];
        }
        records.push(ImageRecord {
            width: im.width,
            height: im.height,
            origin_x: im.origin_x,
            origin_y: im.origin_y,
            palette_len: im.palette.slot_span(),
            field_bits,
        });
    }

    let codes: [&HuffmanCode; FIELD_COUNT] = [
        &optimized.codes[0],
        &optimized.codes[1],
        &optimized.codes[2],
        &optimized.codes[3],
        &color_code,
    ];
    debug_assert_eq!(TOKEN_FIELDS + 1, FIELD_COUNT);

    let mut tables = Vec::with_capacity(FIELD_COUNT);
    for (code, w) in codes.into_iter().zip(writers) {
        tables.push(FieldTable {
            alphabet: code.alphabet(),
            form: code.form().to_vec(),
            perm: code.perm().to_vec(),
            data_bits: w.bit_len(),
            data: w.into_bytes(),
        });
    }
    let fields: [FieldTable; FIELD_COUNT] = tables
        .try_into()
        .map_err(|_| PixError::Validation("field table count".into()))?;

    Ok((
        Bundle { color_shift: params.color_shift, fields, images: records },
        color_code,
    ))
}
