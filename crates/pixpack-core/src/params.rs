// crates/pixpack-core/src/params.rs

use crate::error::{PixError, Result};

/// Refinement rounds of the corpus optimizer.
pub const DEFAULT_ROUNDS: u32 = 3;

/// Longest copy a token can describe; runlen symbols live in a 256-entry alphabet.
pub const DEFAULT_MAX_RUN: usize = 255;

/// 8-bit channel -> 5-bit channel.
pub const DEFAULT_COLOR_SHIFT: u8 = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecParams {
    pub rounds: u32,
    pub max_run: usize,
    pub color_shift: u8,
    pub align_groups: bool,
}

impl Default for CodecParams {
    fn default() -> Self {
        default_params()
    }
}

impl CodecParams {
    /// Number of symbols in the color field alphabet.
    #[inline]
    pub fn color_alphabet(&self) -> usize {
        256 >> self.color_shift
    }
}

pub fn default_params() -> CodecParams {
    CodecParams {
        rounds: DEFAULT_ROUNDS,
        max_run: DEFAULT_MAX_RUN,
        color_shift: DEFAULT_COLOR_SHIFT,
        align_groups: true,
    }
}

pub fn validate_params(p: &CodecParams) -> Result<()> {
    if p.rounds == 0 {
        return Err(PixError::Validation("rounds must be >= 1".into()));
    }
    if p.max_run == 0 || p.max_run > DEFAULT_MAX_RUN {
        return Err(PixError::Validation(format!(
            "max_run must be in 1..={}, got {}",
            DEFAULT_MAX_RUN, p.max_run
        )));
    }
    if p.color_shift > 7 {
        return Err(PixError::Validation(format!(
            "color_shift must be in 0..=7, got {}",
            p.color_shift
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let p = default_params();
        assert!(validate_params(&p).is_ok());
        assert_eq!(p.rounds, 3);
        assert_eq!(p.color_alphabet(), 32);
    }

    #[test]
    fn rejects_out_of_range() {
        let mut p = default_params();
        p.max_run = 256;
        assert!(validate_params(&p).is_err());

        let mut p = default_params();
        p.rounds = 0;
        assert!(validate_params(&p).is_err());

        let mut p = default_params();
        p.color_shift = 8;
        assert!(validate_params(&p).is_err());
    }
}
