/// Block compression boundary.
///
/// A mozLz40 payload is a single raw compressed block; the frame code never
/// looks inside it. Each `BlockCodec` implementation:
/// - Reports a worst-case compressed size for a given input length, used to
///   size the destination before compressing. It must never under-estimate.
/// - Compresses and decompresses whole buffers in one pass, writing into a
///   caller-provided destination and returning how many bytes it produced.
/// - Never writes past the end of the destination, even on malformed input.
///   This is what lets the declared size pre-size the decompression buffer.
pub trait BlockCodec: Send + Sync {
    /// Human-readable codec name for CLI display.
    fn name(&self) -> &'static str;

    /// Upper bound on the compressed size of any `input_len`-byte input.
    fn max_compressed_len(&self, input_len: usize) -> usize;

    /// Compress `src` into `dst`, which holds at least
    /// `max_compressed_len(src.len())` bytes.
    fn compress_into(&self, src: &[u8], dst: &mut [u8]) -> anyhow::Result<usize>;

    /// Decompress `src` into `dst`, producing at most `dst.len()` bytes.
    ///
    /// Producing fewer bytes than `dst.len()` is not an error here; the
    /// caller decides what a short result means.
    fn decompress_into(&self, src: &[u8], dst: &mut [u8]) -> anyhow::Result<usize>;
}
