pub mod bits;
pub mod huffman;

pub use bits::{BitReader, BitWriter};
pub use huffman::{DecodeTree, HuffmanCode};
