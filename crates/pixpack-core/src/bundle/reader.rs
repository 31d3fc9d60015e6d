// crates/pixpack-core/src/bundle/reader.rs
//
// Reference consumer: everything an embedded decoder needs to do, in Rust.
// Trees come back from form+perm, each image's segments are located by
// summing earlier field_bits, and copies expand symbol by symbol.

use crate::bundle::format::{Bundle, COLOR_FIELD, FIELD_COUNT};
use crate::entropy::{BitReader, DecodeTree};
use crate::error::{PixError, Result};
use crate::image::PixelGrid;
use crate::lz::expand::copy_run;
use crate::lz::token::{Field, Token, LITERAL_DX, LITERAL_DY, VALUE_ALPHABET};
use crate::palette::{ColorPair, Palette, Rgb, Rgba8};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub origin_x: usize,
    pub origin_y: usize,
    pub pixels: Vec<u8>,
    pub palette: Palette,
}

impl DecodedImage {
    /// Primary and alternate RGBA8 rasters of the cropped image.
    pub fn to_grids(&self, color_shift: u8) -> Result<(PixelGrid, PixelGrid)> {
        let mut primary = Vec::with_capacity(self.pixels.len());
        let mut alternate = Vec::with_capacity(self.pixels.len());
        for &p in &self.pixels {
            let pair = self.palette.get(p).unwrap_or(ColorPair::TRANSPARENT);
            let px = |c: Option<Rgb>| c.map_or(Rgba8::TRANSPARENT, |c| c.expand(color_shift));
            primary.push(px(pair.primary));
            alternate.push(px(pair.alternate));
        }
        Ok((
            PixelGrid::new(self.width, self.height, primary)?,
            PixelGrid::new(self.width, self.height, alternate)?,
        ))
    }
}

fn trees(bundle: &Bundle) -> Result<Vec<DecodeTree>> {
    bundle
        .fields
        .iter()
        .map(|f| {
            if f.perm.len() != f.alphabet {
                return Err(PixError::BundleFormat("perm does not cover alphabet".into()));
            }
            DecodeTree::from_form_perm(&f.form, &f.perm)
        })
        .collect()
}

pub fn decode_image(bundle: &Bundle, k: usize) -> Result<DecodedImage> {
    let trees = trees(bundle)?;
    decode_with(bundle, &trees, k, bundle.segment_starts(k))
}

pub fn decode_all(bundle: &Bundle) -> Result<Vec<DecodedImage>> {
    let trees = trees(bundle)?;
    let mut starts = [0usize; FIELD_COUNT];
    let mut out = Vec::with_capacity(bundle.images.len());
    for (k, rec) in bundle.images.iter().enumerate() {
        out.push(decode_with(bundle, &trees, k, starts)?);
        for (s, &bits) in starts.iter_mut().zip(&rec.field_bits) {
            *s += bits;
        }
    }
    Ok(out)
}

#[inline]
fn next_symbol(trees: &[DecodeTree], readers: &mut [BitReader<'_>], f: Field) -> Result<u8> {
    trees[f.index()].decode_symbol(&mut readers[f.index()])
}

fn decode_with(
    bundle: &Bundle,
    trees: &[DecodeTree],
    k: usize,
    starts: [usize; FIELD_COUNT],
) -> Result<DecodedImage> {
    let rec = bundle
        .images
        .get(k)
        .ok_or_else(|| PixError::BundleFormat(format!("no image {k}")))?;

    let mut readers = Vec::with_capacity(FIELD_COUNT);
    for (f, (&start, &bits)) in bundle.fields.iter().zip(starts.iter().zip(&rec.field_bits)) {
        readers.push(BitReader::window(&f.data, start, bits)?);
    }

    let n = rec
        .width
        .checked_mul(rec.height)
        .ok_or_else(|| PixError::BundleFormat("image size overflow".into()))?;
    let mut pixels: Vec<u8> = Vec::with_capacity(n);
    while pixels.len() < n {
        let dy = next_symbol(trees, &mut readers, Field::Dy)?;
        let dx = next_symbol(trees, &mut readers, Field::Dx)?;
        if (dy, dx) == (LITERAL_DY, LITERAL_DX) {
            pixels.push(next_symbol(trees, &mut readers, Field::Value)?);
            continue;
        }
        let run = next_symbol(trees, &mut readers, Field::Runlen)? as usize;
        if run == 0 || pixels.len() + run > n {
            return Err(PixError::BundleFormat(format!("copy of {run} overruns image {k}")));
        }
        copy_run(&mut pixels, Token::displacement(dy, dx, rec.width), run)?;
        if pixels.len() < n {
            pixels.push(next_symbol(trees, &mut readers, Field::Value)?);
        }
    }
    if let Some(&bad) = pixels.iter().find(|&&p| p as usize >= VALUE_ALPHABET.min(rec.palette_len.max(1))) {
        return Err(PixError::BundleFormat(format!("pixel index {bad} outside palette of image {k}")));
    }

    let slots = rec.palette_len.saturating_sub(1);
    let mut channels = Vec::with_capacity(slots * 6);
    for _ in 0..slots * 6 {
        channels.push(trees[COLOR_FIELD].decode_symbol(&mut readers[COLOR_FIELD])?);
    }
    let (prim, alt) = channels.split_at(slots * 3);
    let colors: Vec<ColorPair> = prim
        .chunks_exact(3)
        .zip(alt.chunks_exact(3))
        .map(|(p, a)| ColorPair::opaque(Rgb::new(p[0], p[1], p[2]), Rgb::new(a[0], a[1], a[2])))
        .collect();

    for (f, r) in readers.iter().enumerate() {
        if r.remaining() != 0 {
            return Err(PixError::BundleFormat(format!(
                "image {k}: {} unread bits in field {f}",
                r.remaining()
            )));
        }
    }

    Ok(DecodedImage {
        width: rec.width,
        height: rec.height,
        origin_x: rec.origin_x,
        origin_y: rec.origin_y,
        pixels,
        palette: Palette::from_colors(&colors),
    })
}
