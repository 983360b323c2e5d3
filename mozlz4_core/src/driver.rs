//! Conversion driver.
//!
//! A conversion is a straight line of stages, each of which may end it:
//!
//! ```text
//! decompress: read input -> validate frame -> allocate -> decompress -> write output
//! compress:   read input -> size bound     -> allocate -> compress   -> write output
//! ```
//!
//! Input and output buffers are owned by the stage functions and dropped on
//! every exit path. The destination is only opened by the write stage, after
//! everything upstream has succeeded.

use tracing::{debug, info, warn};

use crate::buffer::{alloc_zeroed, INITIAL_CAPACITY};
use crate::codec::BlockCodec;
use crate::endpoint::{Sink, Source};
use crate::error::{Mozlz4Error, Result};
use crate::format::{alloc_encoded, Frame, FrameHeader, HEADER_SIZE};

/// Knobs for a conversion.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Treat a declared-size mismatch as an error instead of a warning.
    pub strict_size: bool,
    /// Starting capacity when reading sources of unknown length.
    pub initial_capacity: usize,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            strict_size: false,
            initial_capacity: INITIAL_CAPACITY,
        }
    }
}

/// What a finished conversion did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub input_len: usize,
    pub output_len: usize,
    /// Value of the frame's size field (read when decompressing, written
    /// when compressing).
    pub declared_size: u32,
}

impl Conversion {
    /// Whether the uncompressed side matches the size field.
    pub fn size_matches(&self, uncompressed_len: usize) -> bool {
        u32::try_from(uncompressed_len).map_or(false, |n| n == self.declared_size)
    }
}

/// Decode a complete frame held in memory.
///
/// The output buffer is sized from the declared size. If the codec produces
/// a different amount, a warning is logged and the bytes actually produced
/// are returned, unless `opts.strict_size` asks for an error.
pub fn decode_frame(
    input: &[u8],
    codec: &dyn BlockCodec,
    opts: &DriverOptions,
) -> Result<(Vec<u8>, Conversion)> {
    let frame = Frame::parse(input)?;
    let declared = frame.declared_size();
    debug!(declared, payload = frame.payload.len(), "frame header ok");

    let out_len = usize::try_from(declared).map_err(|_| Mozlz4Error::Allocation {
        what: "output",
        bytes: None,
    })?;
    let mut out = alloc_zeroed(out_len, "output")?;

    let produced = if frame.payload.is_empty() {
        0
    } else {
        codec
            .decompress_into(frame.payload, &mut out)
            .map_err(|e| Mozlz4Error::codec("decompression", e))?
    };
    if produced > out.len() {
        return Err(Mozlz4Error::codec(
            "decompression",
            anyhow::anyhow!("{} reported {produced} bytes into a {out_len}-byte buffer", codec.name()),
        ));
    }
    out.truncate(produced);

    if produced != out_len {
        out.shrink_to_fit();
        if opts.strict_size {
            return Err(Mozlz4Error::SizeMismatch {
                declared,
                actual: produced,
            });
        }
        warn!(
            declared,
            actual = produced,
            "decompressed size differs from the size declared in the header"
        );
    }

    Ok((
        out,
        Conversion {
            input_len: input.len(),
            output_len: produced,
            declared_size: declared,
        },
    ))
}

/// Encode `input` as a complete frame.
pub fn encode_frame(input: &[u8], codec: &dyn BlockCodec) -> Result<(Vec<u8>, Conversion)> {
    let bound = codec.max_compressed_len(input.len());
    let mut out = alloc_encoded(input.len(), bound)?;
    debug!(input = input.len(), bound, "allocated frame");

    let written = codec
        .compress_into(input, &mut out[HEADER_SIZE..])
        .map_err(|e| Mozlz4Error::codec("compression", e))?;
    if written == 0 && !input.is_empty() {
        return Err(Mozlz4Error::codec(
            "compression",
            anyhow::anyhow!("{} produced no output", codec.name()),
        ));
    }
    if written > bound {
        return Err(Mozlz4Error::codec(
            "compression",
            anyhow::anyhow!("{} wrote {written} bytes past its {bound}-byte bound", codec.name()),
        ));
    }
    out.truncate(HEADER_SIZE + written);

    let declared_size = FrameHeader::for_input_len(input.len()).declared_size;
    Ok((
        out,
        Conversion {
            input_len: input.len(),
            output_len: HEADER_SIZE + written,
            declared_size,
        },
    ))
}

/// Decompress the frame read from `source` and write the result to `sink`.
pub fn decompress(
    source: &Source,
    sink: &Sink,
    codec: &dyn BlockCodec,
    opts: &DriverOptions,
) -> Result<Conversion> {
    let input = source.read_all(opts.initial_capacity)?;
    let (output, conversion) = decode_frame(&input, codec, opts)?;
    drop(input);

    sink.write_all(&output)?;
    info!(
        from = %source,
        to = %sink,
        compressed = conversion.input_len,
        decompressed = conversion.output_len,
        "decompressed"
    );
    Ok(conversion)
}

/// Compress everything read from `source` into a frame written to `sink`.
pub fn compress(
    source: &Source,
    sink: &Sink,
    codec: &dyn BlockCodec,
    opts: &DriverOptions,
) -> Result<Conversion> {
    let input = source.read_all(opts.initial_capacity)?;
    let (output, conversion) = encode_frame(&input, codec)?;
    drop(input);

    sink.write_all(&output)?;
    info!(
        from = %source,
        to = %sink,
        raw = conversion.input_len,
        compressed = conversion.output_len,
        "compressed"
    );
    Ok(conversion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MAGIC;

    /// Stores bytes verbatim; "decompression" copies as much as fits.
    struct Verbatim;

    impl BlockCodec for Verbatim {
        fn name(&self) -> &'static str {
            "verbatim"
        }
        fn max_compressed_len(&self, input_len: usize) -> usize {
            input_len
        }
        fn compress_into(&self, src: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
            dst[..src.len()].copy_from_slice(src);
            Ok(src.len())
        }
        fn decompress_into(&self, src: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
            if src.len() > dst.len() {
                anyhow::bail!("output buffer too small");
            }
            dst[..src.len()].copy_from_slice(src);
            Ok(src.len())
        }
    }

    /// Fails every call.
    struct Broken;

    impl BlockCodec for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn max_compressed_len(&self, input_len: usize) -> usize {
            input_len + 1
        }
        fn compress_into(&self, _: &[u8], _: &mut [u8]) -> anyhow::Result<usize> {
            anyhow::bail!("compressor exploded")
        }
        fn decompress_into(&self, _: &[u8], _: &mut [u8]) -> anyhow::Result<usize> {
            anyhow::bail!("corrupt block")
        }
    }

    /// Claims to have written more than it was given room for.
    struct Liar;

    impl BlockCodec for Liar {
        fn name(&self) -> &'static str {
            "liar"
        }
        fn max_compressed_len(&self, _: usize) -> usize {
            4
        }
        fn compress_into(&self, _: &[u8], _: &mut [u8]) -> anyhow::Result<usize> {
            Ok(0)
        }
        fn decompress_into(&self, _: &[u8], dst: &mut [u8]) -> anyhow::Result<usize> {
            Ok(dst.len() + 1)
        }
    }

    fn frame(declared_size: u32, payload: &[u8]) -> Vec<u8> {
        let mut buf = FrameHeader { declared_size }.to_bytes().to_vec();
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn encode_lays_out_magic_size_and_payload() {
        let (out, conv) = encode_frame(b"hello", &Verbatim).unwrap();
        assert_eq!(&out[..8], MAGIC);
        assert_eq!(&out[8..12], &[5, 0, 0, 0]);
        assert_eq!(&out[12..], b"hello");
        assert_eq!(conv.output_len, out.len());
        assert_eq!(conv.declared_size, 5);
    }

    #[test]
    fn decode_reverses_encode() {
        let data: Vec<u8> = (0..=255).collect();
        let (framed, _) = encode_frame(&data, &Verbatim).unwrap();
        let (out, conv) = decode_frame(&framed, &Verbatim, &DriverOptions::default()).unwrap();
        assert_eq!(out, data);
        assert!(conv.size_matches(out.len()));
    }

    #[test]
    fn bare_header_decodes_to_nothing_without_calling_codec() {
        let (out, conv) = decode_frame(&frame(0, &[]), &Broken, &DriverOptions::default()).unwrap();
        assert!(out.is_empty());
        assert_eq!(conv.output_len, 0);
    }

    #[test]
    fn short_output_is_a_warning_by_default() {
        let (out, conv) =
            decode_frame(&frame(100, b"abc"), &Verbatim, &DriverOptions::default()).unwrap();
        assert_eq!(out, b"abc");
        assert_eq!(conv.declared_size, 100);
        assert!(!conv.size_matches(out.len()));
    }

    #[test]
    fn short_output_is_an_error_in_strict_mode() {
        let opts = DriverOptions {
            strict_size: true,
            ..DriverOptions::default()
        };
        match decode_frame(&frame(100, b"abc"), &Verbatim, &opts) {
            Err(Mozlz4Error::SizeMismatch {
                declared: 100,
                actual: 3,
            }) => {}
            other => panic!("expected SizeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn undersized_declaration_surfaces_codec_error() {
        assert!(matches!(
            decode_frame(&frame(2, b"abc"), &Verbatim, &DriverOptions::default()),
            Err(Mozlz4Error::Codec { op: "decompression", .. })
        ));
    }

    #[test]
    fn codec_failures_are_codec_errors() {
        assert!(matches!(
            decode_frame(&frame(3, b"abc"), &Broken, &DriverOptions::default()),
            Err(Mozlz4Error::Codec { .. })
        ));
        assert!(matches!(
            encode_frame(b"abc", &Broken),
            Err(Mozlz4Error::Codec { op: "compression", .. })
        ));
    }

    #[test]
    fn overreporting_codec_is_rejected() {
        assert!(matches!(
            decode_frame(&frame(3, b"abc"), &Liar, &DriverOptions::default()),
            Err(Mozlz4Error::Codec { .. })
        ));
        assert!(matches!(
            encode_frame(b"abc", &Liar),
            Err(Mozlz4Error::Codec { .. })
        ));
    }

    #[test]
    fn bad_input_never_reaches_the_codec() {
        assert!(matches!(
            decode_frame(&[0u8; 64], &Broken, &DriverOptions::default()),
            Err(Mozlz4Error::Format(_))
        ));
    }

    #[test]
    fn failed_conversion_leaves_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonlz4");
        let output = dir.path().join("out.json");
        std::fs::write(&input, b"definitely not a frame").unwrap();

        let result = decompress(
            &Source::File(input),
            &Sink::File(output.clone()),
            &Verbatim,
            &DriverOptions::default(),
        );
        assert!(matches!(result, Err(Mozlz4Error::Format(_))));
        assert!(!output.exists());
    }

    #[test]
    fn file_to_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.json");
        let packed = dir.path().join("raw.jsonlz4");
        let unpacked = dir.path().join("unpacked.json");
        std::fs::write(&raw, br#"{"roots":{}}"#).unwrap();

        let opts = DriverOptions::default();
        let c = compress(&Source::File(raw), &Sink::File(packed.clone()), &Verbatim, &opts).unwrap();
        assert_eq!(c.declared_size, 12);
        let d = decompress(&Source::File(packed), &Sink::File(unpacked.clone()), &Verbatim, &opts)
            .unwrap();
        assert_eq!(d.output_len, 12);
        assert_eq!(std::fs::read(unpacked).unwrap(), br#"{"roots":{}}"#);
    }
}
