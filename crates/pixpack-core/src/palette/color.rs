// crates/pixpack-core/src/palette/color.rs

/// 8-bit RGBA source pixel. Alpha 0 means transparent; any other alpha is opaque.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 0 };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Quantized color, or `None` when transparent.
    #[inline]
    pub fn quantize(self, shift: u8) -> Option<Rgb> {
        if self.is_transparent() {
            None
        } else {
            Some(Rgb::new(self.r >> shift, self.g >> shift, self.b >> shift))
        }
    }
}

/// Quantized color; each channel holds `8 - shift` significant bits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Expand back to 8-bit channels (full scale maps to 255).
    pub fn expand(self, shift: u8) -> Rgba8 {
        let max = (0xFFu32 >> shift).max(1);
        let up = |v: u8| ((v as u32).min(max) * 255 / max) as u8;
        Rgba8::opaque(up(self.r), up(self.g), up(self.b))
    }
}

/// Primary/alternate colors of one pixel. Both absent = fully transparent.
///
/// Ordering is lexicographic with absent sorting first; it is the palette
/// tie-break order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorPair {
    pub primary: Option<Rgb>,
    pub alternate: Option<Rgb>,
}

impl ColorPair {
    pub const TRANSPARENT: ColorPair = ColorPair { primary: None, alternate: None };

    pub const fn opaque(primary: Rgb, alternate: Rgb) -> Self {
        Self { primary: Some(primary), alternate: Some(alternate) }
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.primary.is_none() && self.alternate.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_and_expand() {
        let c = Rgba8::opaque(255, 128, 7).quantize(3).unwrap();
        assert_eq!(c, Rgb::new(31, 16, 0));
        assert_eq!(c.expand(3), Rgba8::opaque(255, 131, 0));
        assert_eq!(Rgba8::TRANSPARENT.quantize(3), None);
        assert_eq!(Rgb::new(9, 200, 0).expand(0), Rgba8::opaque(9, 200, 0));
    }

    #[test]
    fn absent_sorts_first() {
        let a = ColorPair::TRANSPARENT;
        let b = ColorPair::opaque(Rgb::new(0, 0, 0), Rgb::new(0, 0, 0));
        assert!(a < b);
    }
}
