use thiserror::Error;

use crate::error::{Mozlz4Error, Result};

/// Starting capacity of the growth loop: 32 KiB.
pub const INITIAL_CAPACITY: usize = 32 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrowthError {
    #[error("buffer size would overflow past {current} bytes")]
    Overflow { current: usize },

    #[error("out of memory growing buffer to {requested} bytes")]
    OutOfMemory { requested: usize },
}

/// Capacity that follows `current` in the growth loop: double it.
///
/// Returns `None` when doubling does not fit in a Rust allocation
/// (`isize::MAX` bytes), which the loop treats as a read failure.
pub fn next_capacity(current: usize) -> Option<usize> {
    current
        .checked_mul(2)
        .filter(|&next| next > current && next <= isize::MAX as usize)
}

/// Allocate `len` zeroed bytes, reporting allocator refusal instead of
/// aborting.
///
/// The buffer comes from the allocator's zeroed path, so pages the caller
/// never writes are never touched. A declared size of gigabytes costs
/// nothing until the codec actually produces that much.
pub fn alloc_zeroed(len: usize, what: &'static str) -> Result<Vec<u8>> {
    Vec::<u8>::new()
        .try_reserve_exact(len)
        .map_err(|_| Mozlz4Error::Allocation {
            what,
            bytes: Some(len),
        })?;
    Ok(vec![0u8; len])
}

/// Owned byte buffer filled front to back, whose logical length may trail
/// its capacity while it is being filled.
///
/// The whole capacity is initialized, so readers fill [`spare_mut`]
/// directly and report progress with [`advance`].
///
/// [`spare_mut`]: GrowableBuffer::spare_mut
/// [`advance`]: GrowableBuffer::advance
#[derive(Debug)]
pub struct GrowableBuffer {
    buf: Vec<u8>,
    filled: usize,
}

impl GrowableBuffer {
    /// Start with `capacity` bytes of room (at least one).
    pub fn with_capacity(capacity: usize) -> std::result::Result<Self, GrowthError> {
        let capacity = capacity.max(1);
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(|_| GrowthError::OutOfMemory {
                requested: capacity,
            })?;
        buf.resize(capacity, 0);
        Ok(Self { buf, filled: 0 })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.filled
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled == self.buf.len()
    }

    /// The unfilled tail of the buffer.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.filled..]
    }

    /// Mark `n` more bytes of the spare region as filled.
    pub fn advance(&mut self, n: usize) {
        assert!(
            n <= self.buf.len() - self.filled,
            "advance past capacity: {} + {} > {}",
            self.filled,
            n,
            self.buf.len()
        );
        self.filled += n;
    }

    /// Double the capacity, keeping the filled prefix.
    pub fn grow(&mut self) -> std::result::Result<(), GrowthError> {
        let current = self.buf.len();
        let next = next_capacity(current).ok_or(GrowthError::Overflow { current })?;
        self.buf
            .try_reserve_exact(next - current)
            .map_err(|_| GrowthError::OutOfMemory { requested: next })?;
        self.buf.resize(next, 0);
        Ok(())
    }

    /// The filled bytes, with the unused tail released.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.truncate(self.filled);
        self.buf.shrink_to_fit();
        self.buf
    }
}
