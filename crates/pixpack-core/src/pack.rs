// crates/pixpack-core/src/pack.rs
//
// images -> palettes (+ alignment) -> refinement rounds -> bundle

use tracing::info;

use crate::bundle::format::FIELD_NAMES;
use crate::bundle::{serialize, Bundle};
use crate::corpus::{build_corpus, optimize, RoundReport, Skipped};
use crate::entropy::HuffmanCode;
use crate::error::Result;
use crate::image::SourceImage;
use crate::params::{validate_params, CodecParams};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldReport {
    pub name: &'static str,
    pub alphabet: usize,
    pub bits: u64,
    /// Shannon bound of the same stream; diagnostic only.
    pub shannon: u64,
}

#[derive(Debug)]
pub struct PackReport {
    pub rounds: Vec<RoundReport>,
    pub fields: Vec<FieldReport>,
    pub skipped: Vec<Skipped>,
    pub images: usize,
    pub bundle_bytes: usize,
}

#[derive(Debug)]
pub struct Packed {
    pub bundle: Bundle,
    pub bytes: Vec<u8>,
    pub report: PackReport,
}

pub fn pack(sources: &[SourceImage], params: &CodecParams) -> Result<Packed> {
    validate_params(params)?;

    let corpus = build_corpus(sources, params)?;
    let optimized = optimize(&corpus.images, params)?;
    let (bundle, color_code) = serialize(&corpus.images, &optimized, params)?;
    let bytes = bundle.encode()?;

    let codes: Vec<&HuffmanCode> = optimized.codes.iter().chain([&color_code]).collect();
    let fields = codes
        .iter()
        .zip(FIELD_NAMES)
        .map(|(c, name)| FieldReport {
            name,
            alphabet: c.alphabet(),
            bits: c.encoded_bits(),
            shannon: c.shannon_bits(),
        })
        .collect();

    info!(
        images = corpus.images.len(),
        skipped = corpus.skipped.len(),
        bytes = bytes.len(),
        "bundle packed"
    );

    let report = PackReport {
        rounds: optimized.rounds,
        fields,
        skipped: corpus.skipped,
        images: corpus.images.len(),
        bundle_bytes: bytes.len(),
    };
    Ok(Packed { bundle, bytes, report })
}
