//! Error types for mozLz40 conversions.

use thiserror::Error;

/// Why a buffer was rejected as a mozLz40 frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("incorrect header: magic bytes are not \"mozLz40\\0\"")]
    BadMagic,

    #[error("file too small: {len} bytes is shorter than the 12-byte header")]
    TooShort { len: usize },
}

/// Every way a single conversion can fail. All variants are terminal.
#[derive(Debug, Error)]
pub enum Mozlz4Error {
    /// Source unreadable, truncated, or too large to buffer.
    ///
    /// I/O failures carry the `io::Error` as their source; other failures
    /// describe themselves in `reason`.
    #[error("cannot read {source_name}{}", detail(.reason))]
    Read {
        source_name: String,
        reason: Option<String>,
        #[source]
        io: Option<std::io::Error>,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    /// A buffer could not be sized or allocated.
    #[error("cannot allocate memory for {what}{}", byte_count(.bytes))]
    Allocation {
        what: &'static str,
        bytes: Option<usize>,
    },

    /// The block codec reported failure.
    #[error("{op} failed")]
    Codec {
        op: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Only raised when strict size checking is enabled.
    #[error("decompressed {actual} bytes but the header declares {declared}")]
    SizeMismatch { declared: u32, actual: usize },

    /// Destination unopenable or short write.
    #[error("cannot write to {sink_name}")]
    Write {
        sink_name: String,
        #[source]
        io: std::io::Error,
    },
}

impl Mozlz4Error {
    pub(crate) fn read(source_name: impl ToString, reason: impl ToString) -> Self {
        Self::Read {
            source_name: source_name.to_string(),
            reason: Some(reason.to_string()),
            io: None,
        }
    }

    pub(crate) fn read_io(source_name: impl ToString, io: std::io::Error) -> Self {
        Self::Read {
            source_name: source_name.to_string(),
            reason: None,
            io: Some(io),
        }
    }

    pub(crate) fn codec(op: &'static str, err: anyhow::Error) -> Self {
        Self::Codec {
            op,
            source: err.into(),
        }
    }

    pub(crate) fn write(sink_name: impl ToString, io: std::io::Error) -> Self {
        Self::Write {
            sink_name: sink_name.to_string(),
            io,
        }
    }
}

fn byte_count(bytes: &Option<usize>) -> String {
    match bytes {
        Some(n) => format!(" ({n} bytes)"),
        None => String::new(),
    }
}

fn detail(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {reason}"),
        None => String::new(),
    }
}

/// Result type alias using Mozlz4Error.
pub type Result<T> = std::result::Result<T, Mozlz4Error>;
