// crates/pixpack-core/src/lz/matcher.rs
//
// Bit-cost optimal parse over a raster of palette indices.
//
// dp[i] = cheapest encoding of data[i..], filled from the end:
//   dp[n] = 0
//   dp[i] = min( cost(Literal(data[i])) + dp[i+1],
//                cost(Copy(dy, dx, k, data.get(i+k))) + dp[min(i+k+1, n)] )
// over every source j < i and run k with data[j..j+k] == data[i..i+k].
// Source and destination may overlap (j + k > i), which is how runs of one
// symbol collapse into a single copy.
//
// Candidates are tried literal first, then j ascending, then k ascending; a
// candidate replaces the current best only when strictly cheaper.
// O(n^2 * max_run) per image.

use crate::lz::cost::CostTable;
use crate::lz::token::{Field, Token, DX_BIAS};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parse {
    pub tokens: Vec<Token>,
    /// Total cost of `tokens` under the table used to parse.
    pub cost: u64,
}

/// Cheapest token chain reproducing `data` laid out `width` symbols per row.
/// Symbols are palette indices (below 16).
pub fn optimal_parse(data: &[u8], width: usize, costs: &CostTable, max_run: usize) -> Parse {
    let n = data.len();
    if n == 0 {
        return Parse { tokens: Vec::new(), cost: 0 };
    }
    let w = width.max(1);
    let max_run = max_run.clamp(1, u8::MAX as usize);

    let mut dp = vec![0u64; n + 1];
    let mut choice: Vec<Token> = vec![Token::Literal(0); n];

    for i in (0..n).rev() {
        let literal = Token::Literal(data[i]);
        let mut best_cost = costs.token_cost(&literal) + dp[i + 1];
        let mut best = literal;

        let (yi, xi) = (i / w, i % w);
        for j in 0..i {
            let dy = yi - j / w;
            if dy > u8::MAX as usize {
                continue;
            }
            let dx = xi as i64 - (j % w) as i64 + DX_BIAS;
            if !(0..=u8::MAX as i64).contains(&dx) {
                continue;
            }
            let (dy, dx) = (dy as u8, dx as u8);
            let base = costs.cost(Field::Dy, Some(dy)) as u64 + costs.cost(Field::Dx, Some(dx)) as u64;

            let mut k = 0usize;
            while k < max_run && i + k < n && data[j + k] == data[i + k] {
                k += 1;
                let end = i + k;
                let trailing = data.get(end).copied();
                let next = (end + 1).min(n);
                let cost = base
                    + costs.cost(Field::Runlen, Some(k as u8)) as u64
                    + costs.cost(Field::Value, trailing) as u64
                    + dp[next];
                if cost < best_cost {
                    best_cost = cost;
                    best = Token::Copy { dy, dx_biased: dx, runlen: k as u8, trailing };
                }
            }
        }

        dp[i] = best_cost;
        choice[i] = best;
    }

    let mut tokens = Vec::new();
    let mut i = 0usize;
    while i < n {
        let t = choice[i];
        i += t.advance();
        tokens.push(t);
    }

    Parse { tokens, cost: dp[0] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lz::expand::expand;

    #[test]
    fn empty_and_single() {
        let t = CostTable::uniform();
        assert!(optimal_parse(&[], 4, &t, 255).tokens.is_empty());
        let p = optimal_parse(&[9], 4, &t, 255);
        assert_eq!(p.tokens, vec![Token::Literal(9)]);
        assert_eq!(p.cost, 3);
    }

    #[test]
    fn two_runs_in_one_row() {
        let data = [0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
        let t = CostTable::uniform();
        let p = optimal_parse(&data, 10, &t, 255);
        assert_eq!(expand(&p.tokens, 10).unwrap(), data.to_vec());
        // literal 0, self-overlapping copy of 4 + literal 1, copy of 4 to the end
        assert_eq!(
            p.tokens,
            vec![
                Token::Literal(0),
                Token::Copy { dy: 0, dx_biased: 129, runlen: 4, trailing: Some(1) },
                Token::Copy { dy: 0, dx_biased: 129, runlen: 4, trailing: None },
            ]
        );
        assert_eq!(p.cost, 3 + 4 + 3);
    }

    #[test]
    fn copies_from_previous_row() {
        let data = [1, 2, 3, 4, 1, 2, 3, 4];
        let t = CostTable::uniform();
        let p = optimal_parse(&data, 4, &t, 255);
        assert_eq!(expand(&p.tokens, 4).unwrap(), data.to_vec());
        assert!(p.tokens.contains(&Token::Copy { dy: 1, dx_biased: 128, runlen: 4, trailing: None }));
    }

    #[test]
    fn run_cap_is_respected() {
        let data = vec![5u8; 40];
        let t = CostTable::uniform();
        let p = optimal_parse(&data, 40, &t, 8);
        for tok in &p.tokens {
            if let Token::Copy { runlen, .. } = tok {
                assert!(*runlen <= 8);
            }
        }
        assert_eq!(expand(&p.tokens, 40).unwrap(), data);
    }
}
