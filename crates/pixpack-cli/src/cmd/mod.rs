// crates/pixpack-cli/src/cmd/mod.rs

pub mod inspect;
pub mod pack;
pub mod unpack;
pub mod verify;
