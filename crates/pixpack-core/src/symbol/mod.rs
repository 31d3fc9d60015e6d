pub mod varint;
