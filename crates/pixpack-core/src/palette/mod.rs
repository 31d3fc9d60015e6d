pub mod align;
pub mod builder;
pub mod color;

pub use align::align_group;
pub use builder::build_indexed;
pub use color::{ColorPair, Rgb, Rgba8};

/// Index space of one image, sentinel included.
pub const PALETTE_SLOTS: usize = 16;

/// Opaque pairs a palette can hold next to the transparent sentinel.
pub const MAX_OPAQUE_COLORS: usize = PALETTE_SLOTS - 1;

/// Index -> color pair table. Slot 0 is always the transparent sentinel.
///
/// Slots may be empty after alignment moves colors to shared global indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    slots: [Option<ColorPair>; PALETTE_SLOTS],
}

impl Default for Palette {
    fn default() -> Self {
        let mut slots = [None; PALETTE_SLOTS];
        slots[0] = Some(ColorPair::TRANSPARENT);
        Self { slots }
    }
}

impl Palette {
    /// Palette with `colors` in slots 1..=colors.len(). Callers guarantee at
    /// most 15 distinct opaque pairs.
    pub fn from_colors(colors: &[ColorPair]) -> Self {
        let mut p = Self::default();
        for (slot, &c) in p.slots[1..].iter_mut().zip(colors) {
            *slot = Some(c);
        }
        p
    }

    pub fn get(&self, index: u8) -> Option<ColorPair> {
        self.slots.get(index as usize).copied().flatten()
    }

    pub fn index_of(&self, pair: &ColorPair) -> Option<u8> {
        self.slots
            .iter()
            .position(|s| s.as_ref() == Some(pair))
            .map(|i| i as u8)
    }

    /// One past the highest occupied slot (1 for a transparent-only palette).
    pub fn slot_span(&self) -> usize {
        self.slots
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |i| i + 1)
    }

    /// Occupied opaque slots.
    pub fn color_count(&self) -> usize {
        self.slots[1..].iter().filter(|s| s.is_some()).count()
    }

    /// Move every slot `i` to `mapping[i]`. `mapping` must be injective on
    /// occupied slots and keep 0 at 0.
    pub fn remapped(&self, mapping: &[u8; PALETTE_SLOTS]) -> Self {
        let mut slots = [None; PALETTE_SLOTS];
        for (i, s) in self.slots.iter().enumerate() {
            if s.is_some() {
                slots[mapping[i] as usize] = *s;
            }
        }
        Self { slots }
    }
}

/// Palette-indexed raster cropped to the opaque bounding box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedImage {
    pub name: String,
    pub width: usize,
    pub height: usize,
    /// Top-left corner of the crop inside the source grid.
    pub origin_x: usize,
    pub origin_y: usize,
    pub pixels: Vec<u8>,
    pub palette: Palette,
}
