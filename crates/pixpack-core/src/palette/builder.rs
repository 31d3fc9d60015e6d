// crates/pixpack-core/src/palette/builder.rs
//
// Source pixel pairs -> palette + cropped index raster.
//
// - both sides transparent -> index 0
// - primary/alternate size differ -> ShapeMismatch (corrupt asset)
// - one side transparent   -> InconsistentAlpha (corrupt asset)
// - opaque pairs are ranked by descending frequency, ties in ColorPair order,
//   and take indices 1..=k; k > 15 -> PaletteOverflow

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::error::{PixError, Result};
use crate::image::SourceImage;
use crate::palette::color::ColorPair;
use crate::palette::{IndexedImage, Palette, MAX_OPAQUE_COLORS};

pub fn build_indexed(src: &SourceImage, color_shift: u8) -> Result<IndexedImage> {
    let (p, a) = (&src.primary, &src.alternate);
    if p.width() != a.width() || p.height() != a.height() {
        return Err(PixError::ShapeMismatch {
            primary_w: p.width(),
            primary_h: p.height(),
            alternate_w: a.width(),
            alternate_h: a.height(),
        });
    }
    let (w, h) = (p.width(), p.height());

    let mut counts: BTreeMap<ColorPair, u64> = BTreeMap::new();
    let mut bbox: Option<(usize, usize, usize, usize)> = None; // x0, y0, x1, y1 (exclusive)
    let mut pairs = Vec::with_capacity(w * h);

    for y in 0..h {
        for x in 0..w {
            let pair = pair_at(src, x, y, color_shift)?;
            if !pair.is_transparent() {
                *counts.entry(pair).or_insert(0) += 1;
                bbox = Some(match bbox {
                    None => (x, y, x + 1, y + 1),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
                });
            }
            pairs.push(pair);
        }
    }

    if counts.len() > MAX_OPAQUE_COLORS {
        return Err(PixError::PaletteOverflow { distinct: counts.len() });
    }

    let mut ranked: Vec<(ColorPair, u64)> = counts.into_iter().collect();
    ranked.sort_by_key(|&(pair, n)| (Reverse(n), pair));
    let colors: Vec<ColorPair> = ranked.iter().map(|&(pair, _)| pair).collect();
    let palette = Palette::from_colors(&colors);

    let Some((x0, y0, x1, y1)) = bbox else {
        return Ok(IndexedImage {
            name: src.name.clone(),
            width: 0,
            height: 0,
            origin_x: 0,
            origin_y: 0,
            pixels: Vec::new(),
            palette,
        });
    };

    let mut pixels = Vec::with_capacity((x1 - x0) * (y1 - y0));
    for y in y0..y1 {
        for x in x0..x1 {
            let pair = &pairs[y * w + x];
            let idx = palette
                .index_of(pair)
                .ok_or_else(|| PixError::Validation("pair missing from palette".into()))?;
            pixels.push(idx);
        }
    }

    Ok(IndexedImage {
        name: src.name.clone(),
        width: x1 - x0,
        height: y1 - y0,
        origin_x: x0,
        origin_y: y0,
        pixels,
        palette,
    })
}

fn pair_at(src: &SourceImage, x: usize, y: usize, shift: u8) -> Result<ColorPair> {
    let primary = src.primary.get(x, y).quantize(shift);
    let alternate = src.alternate.get(x, y).quantize(shift);
    if primary.is_some() != alternate.is_some() {
        return Err(PixError::InconsistentAlpha { x, y });
    }
    Ok(ColorPair { primary, alternate })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelGrid;
    use crate::palette::color::{Rgb, Rgba8};

    fn grid(w: usize, h: usize, px: &[Rgba8]) -> PixelGrid {
        PixelGrid::new(w, h, px.to_vec()).unwrap()
    }

    #[test]
    fn four_distinct_pixels_make_five_slots() {
        let prim = [
            Rgba8::opaque(8, 0, 0),
            Rgba8::opaque(0, 8, 0),
            Rgba8::opaque(0, 0, 8),
            Rgba8::opaque(8, 8, 8),
        ];
        let alt = [
            Rgba8::opaque(16, 0, 0),
            Rgba8::opaque(0, 16, 0),
            Rgba8::opaque(0, 0, 16),
            Rgba8::opaque(16, 16, 16),
        ];
        let src = SourceImage::paired("quad", grid(2, 2, &prim), grid(2, 2, &alt));
        let img = build_indexed(&src, 3).unwrap();

        assert_eq!(img.palette.slot_span(), 5);
        assert_eq!((img.width, img.height), (2, 2));
        // equal frequency: ColorPair order decides
        let expect_order = [
            ColorPair::opaque(Rgb::new(0, 0, 1), Rgb::new(0, 0, 2)),
            ColorPair::opaque(Rgb::new(0, 1, 0), Rgb::new(0, 2, 0)),
            ColorPair::opaque(Rgb::new(1, 0, 0), Rgb::new(2, 0, 0)),
            ColorPair::opaque(Rgb::new(1, 1, 1), Rgb::new(2, 2, 2)),
        ];
        for (i, pair) in expect_order.iter().enumerate() {
            assert_eq!(img.palette.get(i as u8 + 1), Some(*pair));
        }
        for (k, &idx) in img.pixels.iter().enumerate() {
            let pair = img.palette.get(idx).unwrap();
            assert_eq!(pair.primary, prim[k].quantize(3));
            assert_eq!(pair.alternate, alt[k].quantize(3));
        }
    }

    #[test]
    fn most_frequent_pair_gets_index_one() {
        let red = Rgba8::opaque(255, 0, 0);
        let blue = Rgba8::opaque(0, 0, 255);
        let src = SourceImage::single("freq", grid(3, 1, &[blue, red, red]));
        let img = build_indexed(&src, 3).unwrap();
        assert_eq!(img.pixels, vec![2, 1, 1]);
    }

    #[test]
    fn crops_to_opaque_bounding_box() {
        let t = Rgba8::TRANSPARENT;
        let c = Rgba8::opaque(40, 40, 40);
        #[rustfmt::skip]
        let px = [
            t, t, t, t,
            t, c, t, t,
            t, t, c, t,
            t, t, t, t,
        ];
        let img = build_indexed(&SourceImage::single("crop", grid(4, 4, &px)), 3).unwrap();
        assert_eq!((img.width, img.height), (2, 2));
        assert_eq!((img.origin_x, img.origin_y), (1, 1));
        assert_eq!(img.pixels, vec![1, 0, 0, 1]);
    }

    #[test]
    fn fully_transparent_image_is_empty() {
        let px = [Rgba8::TRANSPARENT; 6];
        let img = build_indexed(&SourceImage::single("void", grid(3, 2, &px)), 3).unwrap();
        assert_eq!((img.width, img.height), (0, 0));
        assert!(img.pixels.is_empty());
        assert_eq!(img.palette.slot_span(), 1);
    }

    #[test]
    fn sixteen_pairs_overflow() {
        let px: Vec<Rgba8> = (0..16u8).map(|i| Rgba8::opaque(i * 8, 0, 0)).collect();
        let err = build_indexed(&SourceImage::single("wide", grid(16, 1, &px)), 3).unwrap_err();
        assert!(matches!(err, PixError::PaletteOverflow { distinct: 16 }));
    }

    #[test]
    fn fifteen_pairs_fit() {
        let px: Vec<Rgba8> = (0..15u8).map(|i| Rgba8::opaque(i * 8, 0, 0)).collect();
        let img = build_indexed(&SourceImage::single("full", grid(15, 1, &px)), 3).unwrap();
        assert_eq!(img.palette.slot_span(), 16);
    }

    #[test]
    fn one_sided_alpha_is_corrupt() {
        let prim = [Rgba8::opaque(1, 2, 3), Rgba8::opaque(1, 2, 3)];
        let alt = [Rgba8::opaque(1, 2, 3), Rgba8::TRANSPARENT];
        let src = SourceImage::paired("bad", grid(2, 1, &prim), grid(2, 1, &alt));
        let err = build_indexed(&src, 3).unwrap_err();
        assert!(matches!(err, PixError::InconsistentAlpha { x: 1, y: 0 }));
        assert!(err.is_per_image());
    }

    #[test]
    fn mismatched_shapes_rejected() {
        let src = SourceImage::paired(
            "shape",
            grid(1, 1, &[Rgba8::opaque(1, 1, 1)]),
            grid(1, 2, &[Rgba8::opaque(1, 1, 1), Rgba8::opaque(1, 1, 1)]),
        );
        let err = build_indexed(&src, 3).unwrap_err();
        assert!(matches!(
            err,
            PixError::ShapeMismatch { primary_w: 1, primary_h: 1, alternate_w: 1, alternate_h: 2 }
        ));
        assert!(err.is_per_image());
    }
}
