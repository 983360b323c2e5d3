pub mod buffer;
pub mod codec;
pub mod driver;
pub mod endpoint;
pub mod error;
pub mod format;
pub mod ingest;

pub use codec::BlockCodec;
pub use driver::{compress, decompress, decode_frame, encode_frame, Conversion, DriverOptions};
pub use endpoint::{BinaryTransfer, Sink, Source};
pub use error::{FormatError, Mozlz4Error, Result};
pub use format::{Frame, FrameHeader, HEADER_SIZE, MAGIC};
