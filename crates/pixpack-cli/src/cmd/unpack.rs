// crates/pixpack-cli/src/cmd/unpack.rs

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pixpack_core::bundle::decode_all;

use crate::io::{bundle_file, png_file};

#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Input bundle path
    #[arg(long)]
    pub r#in: PathBuf,

    /// Output directory for NNNN_primary.png / NNNN_alternate.png
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: UnpackArgs) -> anyhow::Result<()> {
    let (_bytes, bundle) = bundle_file::read_bundle(&args.r#in)?;
    let images = decode_all(&bundle)?;
    std::fs::create_dir_all(&args.out).with_context(|| format!("create {}", args.out.display()))?;

    let mut written = 0usize;
    for (k, im) in images.iter().enumerate() {
        if im.width == 0 || im.height == 0 {
            eprintln!("image {:04}: fully transparent, no files written", k);
            continue;
        }
        let (primary, alternate) = im.to_grids(bundle.color_shift)?;
        png_file::write_rgba(&args.out.join(format!("{k:04}_primary.png")), &primary)?;
        png_file::write_rgba(&args.out.join(format!("{k:04}_alternate.png")), &alternate)?;
        written += 1;
    }

    eprintln!(
        "unpack ok: images={} written={} out={}",
        images.len(),
        written,
        args.out.display()
    );
    Ok(())
}
