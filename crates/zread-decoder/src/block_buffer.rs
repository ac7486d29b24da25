use zread_wire::block::{BLOCK_HEADER_SIZE, BLOCK_SIZE_MAX};

use crate::error::ReadError;
use crate::source::PeekSource;

/// Capacity of the block buffer: one full block plus the header of the
/// block after it, which the engine asks for in the same request.
pub const BLOCK_CAPACITY: usize = BLOCK_SIZE_MAX + BLOCK_HEADER_SIZE;

/// Fixed-capacity staging buffer between the source and the engine.
///
/// ```text
///   0          consumed          filled          capacity
///   ├──────────────┼─────────────────┼───────────────┤
///   │ handed to    │ waiting for     │ unused        │
///   │ the engine   │ the engine      │               │
/// ```
///
/// `consumed <= filled <= capacity` holds after every operation.
pub struct BlockBuffer {
  buf: Box<[u8]>,
  consumed: usize,
  filled: usize,
}

impl BlockBuffer {
  /// Allocate a buffer of [`BLOCK_CAPACITY`] bytes.
  ///
  /// # Errors
  ///
  /// [`ReadError::AllocationFailure`] if the memory cannot be reserved.
  pub fn new() -> Result<Self, ReadError> {
    Self::with_capacity(BLOCK_CAPACITY)
  }

  pub(crate) fn with_capacity(capacity: usize) -> Result<Self, ReadError> {
    let mut buf = Vec::new();
    buf
      .try_reserve_exact(capacity)
      .map_err(|_| ReadError::AllocationFailure)?;
    buf.resize(capacity, 0);

    Ok(Self {
      buf: buf.into_boxed_slice(),
      consumed: 0,
      filled: 0,
    })
  }

  #[must_use]
  pub fn capacity(&self) -> usize {
    self.buf.len()
  }

  /// Whether everything read from the source has gone to the engine.
  #[must_use]
  pub fn is_drained(&self) -> bool {
    self.consumed == self.filled
  }

  /// Bytes read from the source but not yet taken by the engine.
  #[must_use]
  pub fn unconsumed(&self) -> &[u8] {
    &self.buf[self.consumed..self.filled]
  }

  /// Mark `n` more bytes as taken by the engine.
  pub fn advance(&mut self, n: usize) {
    debug_assert!(n <= self.filled - self.consumed);
    self.consumed = (self.consumed + n).min(self.filled);
  }

  /// Replace the contents with exactly `want` bytes from `source`
  /// (capped at the capacity).
  ///
  /// # Errors
  ///
  /// - [`ReadError::Io`] if the source fails.
  /// - [`ReadError::TruncatedBlock`] if the source ends first.
  pub fn refill<S: PeekSource + ?Sized>(
    &mut self,
    source: &mut S,
    want: usize,
  ) -> Result<usize, ReadError> {
    let want = want.min(self.capacity());
    self.clear();

    let n = source.read_full(&mut self.buf[..want])?;
    if n < want {
      return Err(ReadError::TruncatedBlock);
    }
    self.filled = n;
    Ok(n)
  }

  pub fn clear(&mut self) {
    self.consumed = 0;
    self.filled = 0;
  }
}
