// crates/pixpack-cli/src/cmd/verify.rs

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pixpack_core::bundle::decode_all;

use crate::io::bundle_file;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Input bundle path
    #[arg(long)]
    pub r#in: PathBuf,
}

pub fn run(args: VerifyArgs) -> anyhow::Result<()> {
    let (bytes, bundle) = bundle_file::read_bundle(&args.r#in)?;
    let images = decode_all(&bundle).with_context(|| format!("decode images of {}", args.r#in.display()))?;

    let pixels: usize = images.iter().map(|im| im.pixels.len()).sum();
    let colors: usize = images.iter().map(|im| im.palette.color_count()).sum();
    eprintln!(
        "verify ok: images={} pixels={} palette_colors={} bytes={}",
        images.len(),
        pixels,
        colors,
        bytes.len()
    );
    Ok(())
}
