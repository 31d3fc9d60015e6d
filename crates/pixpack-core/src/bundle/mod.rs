pub mod checksum;
pub mod format;
pub mod reader;
pub mod writer;

pub use format::{Bundle, FieldTable, ImageRecord, FIELD_COUNT};
pub use reader::{decode_all, decode_image, DecodedImage};
pub use writer::serialize;
