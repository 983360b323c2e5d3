//! Whole-input ingestion.
//!
//! Both entry points return the complete content of a source as one
//! contiguous buffer, or an error with nothing surfaced. Partial input is
//! never returned as a successful read.
//!
//! - [`read_sized`] is for sources whose length is known up front (regular
//!   files): one exact allocation, one exact read.
//! - [`read_stream`] is for pipes and standard input: a growth loop that
//!   starts at a fixed capacity and doubles it every time the buffer fills
//!   before end-of-stream.

use std::io::{ErrorKind, Read};

use tracing::debug;

use crate::buffer::{alloc_zeroed, GrowableBuffer};
use crate::error::{Mozlz4Error, Result};

/// Read exactly `size` bytes from `reader`.
///
/// Fails if the size cannot be buffered or if the source ends early.
pub fn read_sized<R: Read>(mut reader: R, size: u64, name: &str) -> Result<Vec<u8>> {
    let len = usize::try_from(size)
        .map_err(|_| Mozlz4Error::read(name, format!("{size} bytes cannot be buffered")))?;
    let mut buf = alloc_zeroed(len, "input")
        .map_err(|e| Mozlz4Error::read(name, e))?;

    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => {
            Mozlz4Error::read(name, format!("source ended before its {size} bytes"))
        }
        _ => Mozlz4Error::read_io(name, e),
    })?;

    debug!(source = name, bytes = len, "read sized input");
    Ok(buf)
}

/// Read `reader` until end-of-stream, growing the buffer geometrically from
/// `initial_capacity`.
///
/// The result does not depend on how the source splits its data across
/// `read` calls. Growth overflow, allocator refusal and any read error all
/// discard what was accumulated so far.
pub fn read_stream<R: Read>(mut reader: R, initial_capacity: usize, name: &str) -> Result<Vec<u8>> {
    let mut buf = GrowableBuffer::with_capacity(initial_capacity)
        .map_err(|e| Mozlz4Error::read(name, e))?;

    loop {
        if buf.is_full() {
            buf.grow().map_err(|e| Mozlz4Error::read(name, e))?;
            debug!(source = name, capacity = buf.capacity(), "grew input buffer");
        }
        match reader.read(buf.spare_mut()) {
            Ok(0) => break,
            Ok(n) => buf.advance(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Mozlz4Error::read_io(name, e)),
        }
    }

    debug!(source = name, bytes = buf.len(), "read stream to end");
    Ok(buf.into_vec())
}
