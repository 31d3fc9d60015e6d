pub mod cost;
pub mod expand;
pub mod matcher;
pub mod token;

pub use cost::CostTable;
pub use expand::expand;
pub use matcher::{optimal_parse, Parse};
pub use token::{Field, Token, TOKEN_FIELDS};
