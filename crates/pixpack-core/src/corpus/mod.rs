// crates/pixpack-core/src/corpus/mod.rs

pub mod optimizer;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{PixError, Result};
use crate::image::SourceImage;
use crate::palette::{align_group, build_indexed, IndexedImage};
use crate::params::CodecParams;

pub use optimizer::{optimize, Optimized, RoundReport};

/// An image dropped from the batch, with the reason.
#[derive(Debug)]
pub struct Skipped {
    pub name: String,
    pub error: PixError,
}

#[derive(Debug, Default)]
pub struct Corpus {
    /// Surviving images in source order.
    pub images: Vec<IndexedImage>,
    pub skipped: Vec<Skipped>,
}

/// Index every source image, drop the ones with per-image errors, then align
/// palettes inside frame groups.
///
/// Errors other than the per-image kinds abort the whole batch.
pub fn build_corpus(sources: &[SourceImage], params: &CodecParams) -> Result<Corpus> {
    let indexed: Vec<Result<IndexedImage>> = sources
        .par_iter()
        .map(|src| build_indexed(src, params.color_shift))
        .collect();

    let mut corpus = Corpus::default();
    let mut groups: Vec<Option<&str>> = Vec::new();
    for (src, res) in sources.iter().zip(indexed) {
        match res {
            Ok(img) => {
                corpus.images.push(img);
                groups.push(src.group.as_deref());
            }
            Err(e) if e.is_per_image() => {
                warn!(image = %src.name, error = %e, "skipping image");
                corpus.skipped.push(Skipped { name: src.name.clone(), error: e });
            }
            Err(e) => return Err(e),
        }
    }

    if params.align_groups {
        align_frame_groups(&mut corpus.images, &groups)?;
    }

    Ok(corpus)
}

/// Align every set of images sharing (group key, width, height), in order of
/// first appearance.
fn align_frame_groups(images: &mut [IndexedImage], groups: &[Option<&str>]) -> Result<()> {
    let mut sets: Vec<((&str, usize, usize), Vec<usize>)> = Vec::new();
    for (i, (img, g)) in images.iter().zip(groups).enumerate() {
        let Some(key) = *g else { continue };
        let k = (key, img.width, img.height);
        match sets.iter_mut().find(|(sk, _)| *sk == k) {
            Some((_, members)) => members.push(i),
            None => sets.push((k, vec![i])),
        }
    }

    for ((key, w, h), members) in sets {
        if members.len() < 2 || w * h == 0 {
            continue;
        }
        let mut frames: Vec<IndexedImage> = members
            .iter()
            .map(|&i| std::mem::replace(&mut images[i], placeholder()))
            .collect();
        align_group(&mut frames)?;
        debug!(group = key, frames = frames.len(), width = w, height = h, "aligned palettes");
        for (&i, f) in members.iter().zip(frames) {
            images[i] = f;
        }
    }
    Ok(())
}

fn placeholder() -> IndexedImage {
    IndexedImage {
        name: String::new(),
        width: 0,
        height: 0,
        origin_x: 0,
        origin_y: 0,
        pixels: Vec::new(),
        palette: Default::default(),
    }
}
