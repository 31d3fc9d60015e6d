// crates/pixpack-core/src/lz/expand.rs

use crate::error::{PixError, Result};
use crate::lz::token::Token;

/// Apply a copy to `out`, one symbol at a time so overlapping ranges repeat.
pub fn copy_run(out: &mut Vec<u8>, displacement: i64, runlen: usize) -> Result<()> {
    if displacement <= 0 || displacement as u64 > out.len() as u64 {
        return Err(PixError::BundleFormat(format!(
            "copy displacement {} out of range (have {} symbols)",
            displacement,
            out.len()
        )));
    }
    let start = out.len() - displacement as usize;
    for k in 0..runlen {
        let v = out[start + k];
        out.push(v);
    }
    Ok(())
}

/// Reproduce the symbol raster a token chain describes.
pub fn expand(tokens: &[Token], width: usize) -> Result<Vec<u8>> {
    let w = width.max(1);
    let mut out = Vec::new();
    for t in tokens {
        match *t {
            Token::Literal(v) => out.push(v),
            Token::Copy { dy, dx_biased, runlen, trailing } => {
                copy_run(&mut out, Token::displacement(dy, dx_biased, w), runlen as usize)?;
                if let Some(v) = trailing {
                    out.push(v);
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_copy_repeats() {
        let toks = [
            Token::Literal(1),
            Token::Literal(2),
            Token::Copy { dy: 0, dx_biased: 130, runlen: 5, trailing: Some(7) },
        ];
        assert_eq!(expand(&toks, 16).unwrap(), vec![1, 2, 1, 2, 1, 2, 1, 7]);
    }

    #[test]
    fn rejects_source_before_start() {
        let toks = [Token::Copy { dy: 0, dx_biased: 129, runlen: 1, trailing: None }];
        assert!(expand(&toks, 4).is_err());
    }
}
