// crates/pixpack-core/src/corpus/optimizer.rs
//
// Joint parse / entropy refinement:
//   round 1 parses under a uniform cost table,
//   every round pools the four token fields over the corpus (image order),
//   builds one Huffman code per field, and hands the code lengths to the next
//   round as its cost table.
// A fixed number of rounds; no convergence test.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::entropy::HuffmanCode;
use crate::error::{PixError, Result};
use crate::lz::token::split_fields;
use crate::lz::{optimal_parse, CostTable, Field, Token, TOKEN_FIELDS};
use crate::palette::IndexedImage;
use crate::params::{validate_params, CodecParams};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundReport {
    pub round: u32,
    pub tokens: usize,
    /// Bits of the four token fields under this round's codes.
    pub token_bits: u64,
}

#[derive(Clone, Debug)]
pub struct Optimized {
    /// Final-round token chain per image, in image order.
    pub parses: Vec<Vec<Token>>,
    /// Final-round code per token field, in `Field` order.
    pub codes: [HuffmanCode; TOKEN_FIELDS],
    pub rounds: Vec<RoundReport>,
}

pub fn optimize(images: &[IndexedImage], params: &CodecParams) -> Result<Optimized> {
    validate_params(params)?;

    let mut costs = CostTable::uniform();
    let mut rounds = Vec::with_capacity(params.rounds as usize);
    let mut last: Option<(Vec<Vec<Token>>, [HuffmanCode; TOKEN_FIELDS])> = None;

    for round in 1..=params.rounds {
        let parses: Vec<Vec<Token>> = images
            .par_iter()
            .map(|im| optimal_parse(&im.pixels, im.width, &costs, params.max_run).tokens)
            .collect();

        let mut streams: [Vec<u8>; TOKEN_FIELDS] = Default::default();
        for tokens in &parses {
            split_fields(tokens, &mut streams);
        }

        let codes = build_field_codes(&streams)?;
        for (f, code) in Field::ALL.iter().zip(codes.iter()) {
            debug!(
                round,
                field = f.name(),
                symbols = streams[f.index()].len(),
                bits = code.encoded_bits(),
                shannon = code.shannon_bits(),
                "field code"
            );
        }

        let report = RoundReport {
            round,
            tokens: parses.iter().map(Vec::len).sum(),
            token_bits: codes.iter().map(HuffmanCode::encoded_bits).sum(),
        };
        info!(round, tokens = report.tokens, token_bits = report.token_bits, "refinement round");
        rounds.push(report);

        costs = CostTable::from_codes(&codes)?;
        last = Some((parses, codes));
    }

    let (parses, codes) =
        last.ok_or_else(|| PixError::Validation("optimizer ran zero rounds".into()))?;
    Ok(Optimized { parses, codes, rounds })
}

/// One Huffman build per pooled field stream, run in parallel, returned in `Field` order.
pub fn build_field_codes(streams: &[Vec<u8>; TOKEN_FIELDS]) -> Result<[HuffmanCode; TOKEN_FIELDS]> {
    let codes: Vec<HuffmanCode> = Field::ALL
        .par_iter()
        .map(|f| HuffmanCode::build(&streams[f.index()], f.alphabet()))
        .collect::<Result<_>>()?;
    codes
        .try_into()
        .map_err(|_| PixError::Validation("field code count mismatch".into()))
}
