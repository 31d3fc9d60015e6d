pub mod error;
pub mod params;

pub mod symbol;
pub mod entropy;
pub mod lz;
pub mod image;
pub mod palette;
pub mod corpus;
pub mod bundle;
pub mod pack;

pub use crate::bundle::{Bundle, DecodedImage};
pub use crate::error::{PixError, Result};
pub use crate::image::{PixelGrid, SourceImage};
pub use crate::pack::{pack, PackReport, Packed};
pub use crate::params::CodecParams;
