//! Block codec implementations for mozLz40 payloads.

mod lz4_codec;

pub use lz4_codec::Lz4Codec;
