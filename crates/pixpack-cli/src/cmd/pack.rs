// crates/pixpack-cli/src/cmd/pack.rs

use std::path::{Path, PathBuf};

use clap::Args;
use pixpack_core::params::{DEFAULT_COLOR_SHIFT, DEFAULT_MAX_RUN, DEFAULT_ROUNDS};
use pixpack_core::{pack, CodecParams, SourceImage};

use crate::io::{bundle_file, png_file};

#[derive(Args, Debug)]
pub struct PackArgs {
    /// Directory of primary-variant PNG sprites (all *.png, sorted by name)
    #[arg(long)]
    pub primary: PathBuf,

    /// Directory holding the alternate variant under the same file names
    /// (defaults to the primary directory)
    #[arg(long)]
    pub alternate: Option<PathBuf>,

    /// Output bundle path (.pxb)
    #[arg(long)]
    pub out: PathBuf,

    /// Refinement rounds (parse -> trees -> parse ...)
    #[arg(long, default_value_t = DEFAULT_ROUNDS)]
    pub rounds: u32,

    /// Longest copy run (1..=255)
    #[arg(long, default_value_t = DEFAULT_MAX_RUN)]
    pub max_run: usize,

    /// Bits dropped from each 8-bit channel before palette building
    #[arg(long, default_value_t = DEFAULT_COLOR_SHIFT)]
    pub color_shift: u8,

    /// Disable cross-frame palette alignment
    #[arg(long, default_value_t = false)]
    pub no_align: bool,

    /// Treat files sharing the stem before the last '_' or '-' as frames of one subject
    #[arg(long, default_value_t = false)]
    pub group_by_prefix: bool,
}

/// "walk_03" -> "walk", "idle-1" -> "idle", "logo" -> none.
pub fn frame_prefix(stem: &str) -> Option<&str> {
    stem.rfind(|c: char| c == '_' || c == '-')
        .map(|i| &stem[..i])
        .filter(|p| !p.is_empty())
}

fn load_source(path: &Path, alternate_dir: Option<&Path>, group: bool) -> anyhow::Result<SourceImage> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("non-utf8 file name: {}", path.display()))?;
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);

    let primary = png_file::read_rgba(path)?;
    let mut src = match alternate_dir {
        Some(dir) => {
            let alt_path = dir.join(name);
            if !alt_path.is_file() {
                anyhow::bail!("missing alternate variant {}", alt_path.display());
            }
            SourceImage::paired(name, primary, png_file::read_rgba(&alt_path)?)
        }
        None => SourceImage::single(name, primary),
    };
    if group {
        if let Some(prefix) = frame_prefix(stem) {
            src = src.with_group(prefix);
        }
    }
    Ok(src)
}

pub fn run(args: PackArgs) -> anyhow::Result<()> {
    let params = CodecParams {
        rounds: args.rounds,
        max_run: args.max_run,
        color_shift: args.color_shift,
        align_groups: !args.no_align,
    };

    let files = png_file::list_pngs(&args.primary)?;
    if files.is_empty() {
        anyhow::bail!("no *.png files in {}", args.primary.display());
    }
    let sources = files
        .iter()
        .map(|p| load_source(p, args.alternate.as_deref(), args.group_by_prefix))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let packed = pack(&sources, &params)?;
    bundle_file::write_bundle(&args.out, &packed.bytes)?;

    let report = &packed.report;
    for s in &report.skipped {
        eprintln!("skipped: image={} error={}", s.name, s.error);
    }
    for r in &report.rounds {
        eprintln!("round {}: tokens={} token_bits={}", r.round, r.tokens, r.token_bits);
    }
    for f in &report.fields {
        eprintln!(
            "field {:<6} alphabet={:<3} bits={} shannon={}",
            f.name, f.alphabet, f.bits, f.shannon
        );
    }
    eprintln!(
        "pack ok: images={} skipped={} bytes={} out={}",
        report.images,
        report.skipped.len(),
        report.bundle_bytes,
        args.out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::frame_prefix;

    #[test]
    fn prefix_splits_on_last_separator() {
        assert_eq!(frame_prefix("walk_03"), Some("walk"));
        assert_eq!(frame_prefix("hero-walk_3"), Some("hero-walk"));
        assert_eq!(frame_prefix("idle-1"), Some("idle"));
        assert_eq!(frame_prefix("logo"), None);
        assert_eq!(frame_prefix("_x"), None);
    }
}
