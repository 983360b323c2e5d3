use anyhow::Context;
use lz4_flex::block::{compress_into, decompress_into, get_maximum_output_size};
use mozlz4_core::BlockCodec;

/// Raw LZ4 block codec, the payload format of mozLz40 frames.
///
/// Blocks carry no size prefix and no checksum; the frame header supplies
/// the decompressed size. Decompression uses lz4_flex's bounds-checked
/// decoder, so a corrupt block can fail but never overrun the destination.
pub struct Lz4Codec;

impl BlockCodec for Lz4Codec {
    fn name(&self) -> &'static str {
        "lz4"
    }

    fn max_compressed_len(&self, input_len: usize) -> usize {
        get_maximum_output_size(input_len)
    }

    fn compress_into(&self, src: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
        compress_into(src, dst).context("lz4 compress error")
    }

    fn decompress_into(&self, src: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
        decompress_into(src, dst).context("lz4 decompress error")
    }
}
