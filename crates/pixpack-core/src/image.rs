// crates/pixpack-core/src/image.rs

use crate::error::{PixError, Result};
use crate::palette::Rgba8;

/// Row-major RGBA8 raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Rgba8>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize, pixels: Vec<Rgba8>) -> Result<Self> {
        let need = width
            .checked_mul(height)
            .ok_or_else(|| PixError::Validation("grid size overflow".into()))?;
        if pixels.len() != need {
            return Err(PixError::Validation(format!(
                "grid {}x{} needs {} pixels, got {}",
                width,
                height,
                need,
                pixels.len()
            )));
        }
        Ok(Self { width, height, pixels })
    }

    /// Build from tightly packed RGBA8 bytes.
    pub fn from_rgba_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(PixError::Validation("rgba byte length not a multiple of 4".into()));
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| Rgba8::new(c[0], c[1], c[2], c[3]))
            .collect();
        Self::new(width, height, pixels)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba8 {
        self.pixels[y * self.width + x]
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }
}

/// One asset as handed over by image acquisition: a primary grid and an
/// alternate grid of the same shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    pub name: String,
    /// Frames sharing a group key (and cropped geometry) are palette-aligned.
    pub group: Option<String>,
    pub primary: PixelGrid,
    pub alternate: PixelGrid,
}

impl SourceImage {
    /// Image whose alternate variant equals the primary one.
    pub fn single(name: impl Into<String>, grid: PixelGrid) -> Self {
        Self {
            name: name.into(),
            group: None,
            alternate: grid.clone(),
            primary: grid,
        }
    }

    pub fn paired(name: impl Into<String>, primary: PixelGrid, alternate: PixelGrid) -> Self {
        Self { name: name.into(), group: None, primary, alternate }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}
