// crates/pixpack-core/src/lz/cost.rs

use crate::entropy::HuffmanCode;
use crate::error::{PixError, Result};
use crate::lz::token::{Field, Token, TOKEN_FIELDS};

/// Per-field, per-symbol bit estimates that steer the parse.
///
/// Rebuilt wholesale every refinement round. Absent fields cost nothing.
/// Every constructor guarantees one entry per symbol of each field's alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostTable {
    fields: [Vec<u32>; TOKEN_FIELDS],
}

impl CostTable {
    /// Every symbol of every field costs one unit.
    pub fn uniform() -> Self {
        Self {
            fields: Field::ALL.map(|f| vec![1u32; f.alphabet()]),
        }
    }

    /// Code lengths of the given per-field codes, in `Field` order.
    pub fn from_codes(codes: &[HuffmanCode; TOKEN_FIELDS]) -> Result<Self> {
        Self::from_lengths([
            codes[0].lengths(),
            codes[1].lengths(),
            codes[2].lengths(),
            codes[3].lengths(),
        ])
    }

    /// Explicit per-symbol costs, in `Field` order; each table must cover its field's alphabet.
    pub fn from_lengths(fields: [Vec<u32>; TOKEN_FIELDS]) -> Result<Self> {
        for (f, table) in Field::ALL.iter().zip(fields.iter()) {
            if table.len() != f.alphabet() {
                return Err(PixError::Validation(format!(
                    "{} cost table has {} entries, alphabet is {}",
                    f.name(),
                    table.len(),
                    f.alphabet()
                )));
            }
        }
        Ok(Self { fields })
    }

    /// Cost of one field symbol. `symbol` must lie in the field's alphabet
    /// (value symbols are palette indices, below 16).
    #[inline]
    pub fn cost(&self, field: Field, symbol: Option<u8>) -> u32 {
        match symbol {
            Some(s) => self.fields[field.index()][s as usize],
            None => 0,
        }
    }

    pub fn token_cost(&self, token: &Token) -> u64 {
        Field::ALL
            .iter()
            .zip(token.fields())
            .map(|(&f, s)| self.cost(f, s) as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_counts_present_fields() {
        let t = CostTable::uniform();
        assert_eq!(t.token_cost(&Token::Literal(5)), 3);
        assert_eq!(
            t.token_cost(&Token::Copy { dy: 0, dx_biased: 129, runlen: 4, trailing: Some(1) }),
            4
        );
        assert_eq!(
            t.token_cost(&Token::Copy { dy: 0, dx_biased: 129, runlen: 4, trailing: None }),
            3
        );
        assert_eq!(t.cost(Field::Value, None), 0);
    }

    #[test]
    fn codes_with_wrong_alphabet_are_rejected() {
        let field_codes = Field::ALL.map(|f| HuffmanCode::build(&[0, 1], f.alphabet()).unwrap());
        let t = CostTable::from_codes(&field_codes).unwrap();
        assert_eq!(t.cost(Field::Value, Some(15)), field_codes[3].lengths()[15]);

        let mut bad = field_codes.clone();
        bad[3] = HuffmanCode::build(&[0, 1], 256).unwrap();
        assert!(matches!(CostTable::from_codes(&bad), Err(PixError::Validation(_))));
    }
}
