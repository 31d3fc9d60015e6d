// crates/pixpack-cli/src/io/mod.rs

pub mod bundle_file;
pub mod png_file;
