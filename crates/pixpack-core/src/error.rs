use thiserror::Error;

pub type Result<T> = std::result::Result<T, PixError>;

#[derive(Debug, Error)]
pub enum PixError {
    #[error("palette overflow: {distinct} distinct opaque color pairs (max 15)")]
    PaletteOverflow { distinct: usize },

    #[error("inconsistent alpha at ({x}, {y}): primary and alternate disagree on transparency")]
    InconsistentAlpha { x: usize, y: usize },

    #[error("shape mismatch: primary {primary_w}x{primary_h} vs alternate {alternate_w}x{alternate_h}")]
    ShapeMismatch {
        primary_w: usize,
        primary_h: usize,
        alternate_w: usize,
        alternate_h: usize,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("bundle format error: {0}")]
    BundleFormat(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PixError {
    /// Errors that drop a single image from the corpus without failing the batch.
    pub fn is_per_image(&self) -> bool {
        matches!(
            self,
            PixError::PaletteOverflow { .. }
                | PixError::InconsistentAlpha { .. }
                | PixError::ShapeMismatch { .. }
        )
    }
}
