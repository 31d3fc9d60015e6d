// crates/pixpack-cli/src/io/png_file.rs
//
// PNG <-> PixelGrid. Any 8/16-bit PNG is normalized to RGBA8 on load
// (palette and tRNS expanded, 16-bit stripped, missing alpha = 255).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use pixpack_core::PixelGrid;

pub fn read_rgba(path: &Path) -> anyhow::Result<PixelGrid> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .with_context(|| format!("png header {}", path.display()))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .with_context(|| format!("png data {}", path.display()))?;
    let bytes = &buf[..info.buffer_size()];

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => bytes.to_vec(),
        png::ColorType::Rgb => bytes.chunks_exact(3).flat_map(|c| [c[0], c[1], c[2], 0xFF]).collect(),
        png::ColorType::Grayscale => bytes.iter().flat_map(|&g| [g, g, g, 0xFF]).collect(),
        png::ColorType::GrayscaleAlpha => bytes
            .chunks_exact(2)
            .flat_map(|c| [c[0], c[0], c[0], c[1]])
            .collect(),
        png::ColorType::Indexed => anyhow::bail!("{}: palette was not expanded", path.display()),
    };

    Ok(PixelGrid::from_rgba_bytes(info.width as usize, info.height as usize, &rgba)?)
}

pub fn write_rgba(path: &Path, grid: &PixelGrid) -> anyhow::Result<()> {
    if grid.width() == 0 || grid.height() == 0 {
        anyhow::bail!("{}: png cannot hold a {}x{} image", path.display(), grid.width(), grid.height());
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), grid.width() as u32, grid.height() as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let mut rgba = Vec::with_capacity(grid.pixels().len() * 4);
    for p in grid.pixels() {
        rgba.extend_from_slice(&[p.r, p.g, p.b, p.a]);
    }
    writer.write_image_data(&rgba)?;
    writer.finish()?;
    Ok(())
}

/// `*.png` files of `dir`, sorted by file name.
pub fn list_pngs(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}
