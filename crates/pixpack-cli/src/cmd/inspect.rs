// crates/pixpack-cli/src/cmd/inspect.rs

use std::io::Cursor;
use std::path::PathBuf;

use clap::Args;
use pixpack_core::bundle::format::{bundle_id_hex, FIELD_NAMES};

use crate::io::bundle_file;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input bundle path
    #[arg(long)]
    pub r#in: PathBuf,

    /// Print the per-image record table
    #[arg(long, default_value_t = false)]
    pub images: bool,

    /// Zstd level for the compressibility scoreboard
    #[arg(long, default_value_t = 19)]
    pub zstd_level: i32,
}

pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let (bytes, bundle) = bundle_file::read_bundle(&args.r#in)?;

    eprintln!("--- inspect ---");
    eprintln!("file         = {}", args.r#in.display());
    eprintln!("bundle_ok    = true (magic + crc32 + blake3_16 verified)");
    eprintln!("bundle_id    = {}", bundle_id_hex(&bytes)?);
    eprintln!("bytes        = {}", bytes.len());
    eprintln!("color_shift  = {}", bundle.color_shift);
    eprintln!("images       = {}", bundle.images.len());

    eprintln!("--- fields ---");
    let mut payload_bits = 0usize;
    for (name, f) in FIELD_NAMES.iter().zip(&bundle.fields) {
        payload_bits += f.data_bits;
        eprintln!(
            "{:<6} alphabet={:<3} form_bits={:<3} data_bits={} ({} bytes)",
            name,
            f.alphabet,
            f.form.len(),
            f.data_bits,
            f.data.len()
        );
    }
    eprintln!("payload_bits = {}", payload_bits);

    let z = zstd::stream::encode_all(Cursor::new(&bytes), args.zstd_level)?;
    let ratio = if bytes.is_empty() { 0.0 } else { z.len() as f64 / bytes.len() as f64 };
    eprintln!("--- zstd ---");
    eprintln!("zstd_level   = {}", args.zstd_level);
    eprintln!("zstd_bytes   = {}", z.len());
    eprintln!("zstd/bundle  = {:.4}", ratio);

    if args.images {
        eprintln!("--- images ---");
        eprintln!("   #   w x h     origin    pal  dy/dx/runlen/value/color bits");
        for (k, im) in bundle.images.iter().enumerate() {
            let bits: Vec<String> = im.field_bits.iter().map(|b| b.to_string()).collect();
            eprintln!(
                "{:>4} {:>4}x{:<4} ({:>3},{:>3}) {:>3}  {}",
                k,
                im.width,
                im.height,
                im.origin_x,
                im.origin_y,
                im.palette_len,
                bits.join("/")
            );
        }
    }

    Ok(())
}
