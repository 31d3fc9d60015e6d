// crates/pixpack-cli/src/io/bundle_file.rs

use std::path::Path;

use anyhow::Context;
use pixpack_core::Bundle;

/// Read and fully validate a bundle (magic, version, crc32, blake3_16, segment sums).
/// Returns the raw bytes alongside so callers can report ids and sizes.
pub fn read_bundle(path: &Path) -> anyhow::Result<(Vec<u8>, Bundle)> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let bundle = Bundle::decode(&bytes).with_context(|| format!("decode {}", path.display()))?;
    Ok((bytes, bundle))
}

pub fn write_bundle(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}
