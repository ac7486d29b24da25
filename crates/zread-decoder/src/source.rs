use std::io::{self, Cursor, Read};

/// A byte source with lookahead.
///
/// The frame reader peeks at the start of every frame to find out how
/// long the header is, then consumes exactly that many bytes. After the
/// header, block payloads are pulled with [`read_full`](Self::read_full).
///
/// Implementations must never lose peeked bytes: whatever `peek` returned
/// and was not yet consumed is what the next `peek` or `read_full` sees
/// first.
pub trait PeekSource {
  /// Copy up to `buf.len()` upcoming bytes into `buf` without consuming
  /// them.
  ///
  /// Returns fewer than `buf.len()` bytes only when the input ends.
  ///
  /// # Errors
  ///
  /// Any I/O error from the underlying reader.
  fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize>;

  /// Advance past `n` bytes previously returned by [`peek`](Self::peek).
  fn consume(&mut self, n: usize);

  /// Read until `buf` is full or the input ends, returning the count.
  ///
  /// # Errors
  ///
  /// Any I/O error from the underlying reader.
  fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize>;

  /// Total number of bytes consumed so far.
  fn position(&self) -> u64;
}

impl<S: PeekSource + ?Sized> PeekSource for &mut S {
  fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    (**self).peek(buf)
  }

  fn consume(&mut self, n: usize) {
    (**self).consume(n);
  }

  fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    (**self).read_full(buf)
  }

  fn position(&self) -> u64 {
    (**self).position()
  }
}

impl<T: AsRef<[u8]>> PeekSource for Cursor<T> {
  fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let data = self.get_ref().as_ref();
    let pos = usize::try_from(Cursor::position(self)).map_or(data.len(), |p| p.min(data.len()));
    let n = buf.len().min(data.len() - pos);
    buf[..n].copy_from_slice(&data[pos..pos + n]);
    Ok(n)
  }

  fn consume(&mut self, n: usize) {
    let pos = Cursor::position(self);
    self.set_position(pos + n as u64);
  }

  fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    // A cursor never returns a short read unless the data runs out.
    Read::read(self, buf)
  }

  fn position(&self) -> u64 {
    Cursor::position(self)
  }
}

/// Lookahead wrapper turning any [`Read`] into a [`PeekSource`].
///
/// Peeked bytes live in a small internal buffer until consumed. Bytes the
/// caller already pulled off the reader (for example to sniff the magic)
/// can be handed back with [`with_prefix`](Self::with_prefix) so the
/// decoder sees the stream from its true start.
///
/// ```text
///   prefix / peeked bytes        inner reader
///   ┌──────────────────────┐     ┌──────────────────────────┐
///   │ ahead[..]            │ ──▶ │ not yet read             │
///   └──────────────────────┘     └──────────────────────────┘
///   ▲ position() counts bytes consumed from the left edge
/// ```
pub struct PeekReader<R> {
  inner: R,
  ahead: Vec<u8>,
  position: u64,
}

impl<R: Read> PeekReader<R> {
  #[must_use]
  pub fn new(inner: R) -> Self {
    Self::with_prefix(inner, &[])
  }

  /// Wrap `inner`, presenting `prefix` as the first bytes of the stream.
  #[must_use]
  pub fn with_prefix(inner: R, prefix: &[u8]) -> Self {
    Self {
      inner,
      ahead: prefix.to_vec(),
      position: 0,
    }
  }

  #[must_use]
  pub fn get_ref(&self) -> &R {
    &self.inner
  }

  /// Bytes peeked from the inner reader but not consumed yet.
  #[must_use]
  pub fn buffered(&self) -> &[u8] {
    &self.ahead
  }

  /// Unwrap into the inner reader and any peeked-but-unconsumed bytes.
  pub fn into_parts(self) -> (R, Vec<u8>) {
    (self.inner, self.ahead)
  }

  /// Read from the inner reader until `ahead` holds `want` bytes or the
  /// input ends.
  fn fill_ahead(&mut self, want: usize) -> io::Result<()> {
    while self.ahead.len() < want {
      let old = self.ahead.len();
      self.ahead.resize(want, 0);
      let res = self.inner.read(&mut self.ahead[old..]);
      match res {
        Ok(0) => {
          self.ahead.truncate(old);
          break;
        }
        Ok(n) => self.ahead.truncate(old + n),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => self.ahead.truncate(old),
        Err(e) => {
          self.ahead.truncate(old);
          return Err(e);
        }
      }
    }
    Ok(())
  }
}

impl<R: Read> PeekSource for PeekReader<R> {
  fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.fill_ahead(buf.len())?;
    let n = buf.len().min(self.ahead.len());
    buf[..n].copy_from_slice(&self.ahead[..n]);
    Ok(n)
  }

  fn consume(&mut self, n: usize) {
    let n = n.min(self.ahead.len());
    self.ahead.drain(..n);
    self.position += n as u64;
  }

  fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let from_ahead = buf.len().min(self.ahead.len());
    buf[..from_ahead].copy_from_slice(&self.ahead[..from_ahead]);
    self.ahead.drain(..from_ahead);

    let mut filled = from_ahead;
    let mut failure = None;
    while filled < buf.len() {
      match self.inner.read(&mut buf[filled..]) {
        Ok(0) => break,
        Ok(n) => filled += n,
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
        Err(e) => {
          failure = Some(e);
          break;
        }
      }
    }

    self.position += filled as u64;
    match failure {
      Some(e) => Err(e),
      None => Ok(filled),
    }
  }

  fn position(&self) -> u64 {
    self.position
  }
}

impl<R: Read> Read for PeekReader<R> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    if self.ahead.is_empty() {
      let n = self.inner.read(buf)?;
      self.position += n as u64;
      return Ok(n);
    }
    let n = buf.len().min(self.ahead.len());
    buf[..n].copy_from_slice(&self.ahead[..n]);
    self.consume(n);
    Ok(n)
  }
}
