use std::io::{self, Read};

use log::{debug, trace};
use zread_wire::ContentSize;

use crate::block_buffer::BlockBuffer;
use crate::config::EngineConfig;
use crate::engine::{CodecEngine, ZstdEngine};
use crate::error::ReadError;
use crate::header::{self, FrameStart};
use crate::source::PeekSource;

/// Where a [`FrameDecoder`] stands in the current frame.
///
/// ```text
///   open / reopen ──▶ Active ──(pending == 0)──▶ AtFrameEnd
///                       │
///                       └──(any failure)──▶ Errored
/// ```
///
/// `Errored` is sticky: reads fail with [`ReadError::PendingError`] until a
/// successful [`reopen`](FrameDecoder::reopen).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
  Active,
  AtFrameEnd,
  Errored,
}

/// Reads one zstd frame at a time from a [`PeekSource`].
///
/// The decoder consumes exactly the bytes of the current frame, no more,
/// so when a frame ends the source sits at the first byte after it. Call
/// [`reopen`](Self::reopen) there to decode the next concatenated frame
/// with the same engine and block buffer.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use zread_decoder::FrameDecoder;
///
/// let frame = zstd::bulk::compress(b"hello, frame", 3).unwrap();
/// let mut decoder = FrameDecoder::open(Cursor::new(frame)).unwrap().unwrap();
///
/// let mut out = [0u8; 64];
/// let n = decoder.read(&mut out).unwrap();
/// assert_eq!(&out[..n], b"hello, frame");
/// assert_eq!(decoder.read(&mut out).unwrap(), 0);
/// ```
pub struct FrameDecoder<S, E = ZstdEngine> {
  source: S,
  engine: E,
  status: Status,
  /// Compressed bytes the engine wants next; 0 once the frame is done.
  pending: usize,
  content_size: ContentSize,
  block: BlockBuffer,
  /// Bytes produced for the current frame so far.
  decoded: u64,
}

impl<S: PeekSource> FrameDecoder<S, ZstdEngine> {
  /// Open the frame at the source's current position.
  ///
  /// Returns `Ok(None)` when the source is already at end of input: there
  /// is nothing to decode, which is not an error. To keep using an owned
  /// source afterwards, pass `&mut source`.
  ///
  /// # Errors
  ///
  /// Any [`ReadError`] from creating the engine or parsing the header.
  pub fn open(source: S) -> Result<Option<Self>, ReadError> {
    Self::open_with_config(source, &EngineConfig::default())
  }

  /// [`open`](Self::open) with an explicit engine configuration.
  ///
  /// # Errors
  ///
  /// Any [`ReadError`] from creating the engine or parsing the header.
  pub fn open_with_config(source: S, config: &EngineConfig) -> Result<Option<Self>, ReadError> {
    let engine = ZstdEngine::with_config(config)?;
    Self::open_with_engine(source, engine)
  }
}

impl<S: PeekSource, E: CodecEngine> FrameDecoder<S, E> {
  /// Open the frame at the source's current position using `engine`.
  ///
  /// On `Ok(None)` the engine is dropped along with the source.
  ///
  /// # Errors
  ///
  /// Any [`ReadError`] from parsing the header or allocating the block
  /// buffer.
  pub fn open_with_engine(mut source: S, mut engine: E) -> Result<Option<Self>, ReadError> {
    let (pending, content_size) = match header::begin(&mut source, &mut engine)? {
      FrameStart::Empty => {
        debug!("open: source is empty");
        return Ok(None);
      }
      FrameStart::Frame {
        pending,
        content_size,
      } => (pending, content_size),
    };

    let block = BlockBuffer::new()?;

    Ok(Some(Self {
      source,
      engine,
      status: Status::Active,
      pending,
      content_size,
      block,
      decoded: 0,
    }))
  }

  /// Start the next frame, keeping the engine and block buffer.
  ///
  /// With `Some(source)` the decoder switches to that source; with `None`
  /// it continues on the current one, which must sit right after the
  /// previous frame.
  ///
  /// Returns [`Status::Active`] when a new frame header was read and
  /// [`Status::AtFrameEnd`] when the source has no more input.
  ///
  /// # Errors
  ///
  /// Any [`ReadError`] from parsing the header. The decoder is then
  /// [`Status::Errored`].
  pub fn reopen(&mut self, source: Option<S>) -> Result<Status, ReadError> {
    if let Some(source) = source {
      self.source = source;
    }

    self.content_size = ContentSize::Unknown;
    self.pending = 0;
    self.decoded = 0;
    self.block.clear();

    match header::begin(&mut self.source, &mut self.engine) {
      Ok(FrameStart::Empty) => {
        debug!("reopen: no more input");
        self.status = Status::AtFrameEnd;
      }
      Ok(FrameStart::Frame {
        pending,
        content_size,
      }) => {
        self.pending = pending;
        self.content_size = content_size;
        self.status = Status::Active;
      }
      Err(err) => {
        debug!("reopen failed: {err}");
        self.status = Status::Errored;
        return Err(err);
      }
    }

    Ok(self.status)
  }

  /// Fill `out` with decompressed bytes from the current frame.
  ///
  /// Returns the number of bytes written. Fewer than `out.len()` bytes
  /// means the frame ended; 0 means there is nothing left in this frame.
  ///
  /// # Errors
  ///
  /// - [`ReadError::PendingError`] if a previous call failed.
  /// - [`ReadError::TruncatedBlock`] if the source ends inside a block.
  /// - [`ReadError::Io`] if the source fails.
  /// - [`ReadError::Codec`] if the engine rejects the data.
  pub fn read(&mut self, out: &mut [u8]) -> Result<usize, ReadError> {
    match self.status {
      Status::Errored => return Err(ReadError::PendingError),
      Status::AtFrameEnd => return Ok(0),
      Status::Active => {}
    }

    self.fill(out).inspect_err(|err| {
      debug!("read failed: {err}");
      self.status = Status::Errored;
    })
  }

  fn fill(&mut self, out: &mut [u8]) -> Result<usize, ReadError> {
    let mut written = 0;

    loop {
      if self.pending == 0 {
        self.finish_frame()?;
        break;
      }
      if written == out.len() {
        break;
      }

      if self.block.is_drained() {
        let n = self.block.refill(&mut self.source, self.pending)?;
        trace!("block refill: {n} bytes, source at {}", self.source.position());
      }

      let step = self
        .engine
        .step(self.block.unconsumed(), &mut out[written..])?;
      self.block.advance(step.consumed);
      written += step.produced;
      self.decoded += step.produced as u64;
      self.pending = step.pending;
    }

    Ok(written)
  }

  fn finish_frame(&mut self) -> Result<(), ReadError> {
    if !self.block.is_drained() {
      return Err(ReadError::Codec {
        origin: "read",
        message: "trailing bytes in block",
      });
    }
    self.status = Status::AtFrameEnd;
    debug!(
      "frame end: {} bytes decoded, source at {}",
      self.decoded,
      self.source.position()
    );
    Ok(())
  }

  /// Uncompressed size of the current frame, fixed when its header was
  /// read.
  #[must_use]
  pub fn content_size(&self) -> ContentSize {
    self.content_size
  }

  #[must_use]
  pub fn status(&self) -> Status {
    self.status
  }

  /// Bytes decoded from the current frame so far.
  #[must_use]
  pub fn decoded(&self) -> u64 {
    self.decoded
  }

  #[must_use]
  pub fn source(&self) -> &S {
    &self.source
  }

  /// Mutable access to the source. Consuming bytes from it mid-frame
  /// desynchronises the decoder.
  pub fn source_mut(&mut self) -> &mut S {
    &mut self.source
  }

  /// Free the engine and block buffer, handing back the source as is.
  pub fn release(self) -> S {
    self.source
  }
}

impl<S: PeekSource, E: CodecEngine> Read for FrameDecoder<S, E> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    FrameDecoder::read(self, buf).map_err(io::Error::from)
  }
}
