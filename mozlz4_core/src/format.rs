use crate::error::{FormatError, Mozlz4Error, Result};

/// Magic bytes opening every mozLz40 frame.
/// 8 bytes: ASCII "mozLz40" followed by a single NUL.
pub const MAGIC: &[u8; 8] = b"mozLz40\0";

/// Width of the declared-size field that follows the magic.
pub const SIZE_FIELD_LEN: usize = 4;

/// Fixed size of the frame header in bytes.
///   magic[8] + decompressed_size:u32 (LE)
///   = 8 + 4 = 12
pub const HEADER_SIZE: usize = MAGIC.len() + SIZE_FIELD_LEN;

// ── Size field ─────────────────────────────────────────────────────────────

/// Encode the declared-size field: unsigned 32-bit, least-significant byte
/// first. [`decode_size`] is its exact inverse.
#[inline]
pub fn encode_size(size: u32) -> [u8; SIZE_FIELD_LEN] {
    size.to_le_bytes()
}

/// Decode the declared-size field written by [`encode_size`].
#[inline]
pub fn decode_size(field: [u8; SIZE_FIELD_LEN]) -> u32 {
    u32::from_le_bytes(field)
}

// ── Header ─────────────────────────────────────────────────────────────────

/// Decoded representation of the 12-byte frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Expected length of the decompressed payload. Advisory: it sizes the
    /// output buffer but the codec decides how many bytes are produced.
    pub declared_size: u32,
}

impl FrameHeader {
    /// Header for an input of `input_len` bytes.
    ///
    /// The field only holds 32 bits; longer inputs wrap silently, which is a
    /// limitation of the format itself.
    pub fn for_input_len(input_len: usize) -> Self {
        Self {
            declared_size: input_len as u32,
        }
    }

    /// Serialize to exactly `HEADER_SIZE` bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..MAGIC.len()].copy_from_slice(MAGIC);
        buf[MAGIC.len()..].copy_from_slice(&encode_size(self.declared_size));
        buf
    }

    /// Deserialize from the start of `buf`, checking magic and length.
    ///
    /// The magic comparison only looks at bytes that exist, so buffers
    /// shorter than the magic are rejected without reading past their end.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let checked = buf.len().min(MAGIC.len());
        if buf[..checked] != MAGIC[..checked] {
            return Err(FormatError::BadMagic.into());
        }
        if buf.len() < HEADER_SIZE {
            return Err(FormatError::TooShort { len: buf.len() }.into());
        }
        let mut field = [0u8; SIZE_FIELD_LEN];
        field.copy_from_slice(&buf[MAGIC.len()..HEADER_SIZE]);
        Ok(Self {
            declared_size: decode_size(field),
        })
    }
}

// ── Frame ──────────────────────────────────────────────────────────────────

/// A validated view over a complete mozLz40 frame held in memory.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub header: FrameHeader,
    /// Everything after the header; may be empty.
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Validate `buf` as a frame and split off its payload.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        let header = FrameHeader::from_bytes(buf)?;
        Ok(Self {
            header,
            payload: &buf[HEADER_SIZE..],
        })
    }

    #[inline]
    pub fn declared_size(&self) -> u32 {
        self.header.declared_size
    }
}

/// Allocate the output buffer for an encoded frame of `input_len` raw bytes
/// whose compressed form is at most `bound` bytes, with the header already
/// written into `[0, HEADER_SIZE)`.
///
/// The compressor writes into `[HEADER_SIZE, HEADER_SIZE + bound)`; the
/// caller truncates to `HEADER_SIZE + written` afterwards.
pub fn alloc_encoded(input_len: usize, bound: usize) -> Result<Vec<u8>> {
    let total = bound
        .checked_add(HEADER_SIZE)
        .ok_or(Mozlz4Error::Allocation {
            what: "compressed frame",
            bytes: None,
        })?;
    let mut out = crate::buffer::alloc_zeroed(total, "compressed frame")?;
    out[..HEADER_SIZE].copy_from_slice(&FrameHeader::for_input_len(input_len).to_bytes());
    Ok(out)
}
