use std::io::{self, Read};

use log::debug;

use crate::config::EngineConfig;
use crate::decoder::{FrameDecoder, Status};
use crate::engine::{CodecEngine, ZstdEngine};
use crate::error::ReadError;
use crate::source::PeekSource;

/// Decodes a stream of concatenated zstd frames as one output stream.
///
/// Wraps a [`FrameDecoder`] and calls [`reopen`](FrameDecoder::reopen)
/// each time a frame ends, until the source runs out. Empty input decodes
/// to nothing.
pub struct MultiFrameDecoder<S, E = ZstdEngine> {
  decoder: Option<FrameDecoder<S, E>>,
  frames: u64,
}

impl<S: PeekSource> MultiFrameDecoder<S, ZstdEngine> {
  /// # Errors
  ///
  /// Any [`ReadError`] from opening the first frame.
  pub fn open(source: S) -> Result<Self, ReadError> {
    Self::open_with_config(source, &EngineConfig::default())
  }

  /// # Errors
  ///
  /// Any [`ReadError`] from opening the first frame.
  pub fn open_with_config(source: S, config: &EngineConfig) -> Result<Self, ReadError> {
    Ok(Self::from_decoder(FrameDecoder::open_with_config(source, config)?))
  }
}

impl<S: PeekSource, E: CodecEngine> MultiFrameDecoder<S, E> {
  /// Continue from an already opened frame, or from nothing at all.
  pub fn from_decoder(decoder: Option<FrameDecoder<S, E>>) -> Self {
    let frames = u64::from(decoder.is_some());
    Self { decoder, frames }
  }

  /// Number of frames started so far.
  #[must_use]
  pub fn frames(&self) -> u64 {
    self.frames
  }

  /// The inner frame decoder, if the input was not empty.
  pub fn into_inner(self) -> Option<FrameDecoder<S, E>> {
    self.decoder
  }

  /// Like [`FrameDecoder::read`], but crossing frame boundaries.
  ///
  /// # Errors
  ///
  /// Any [`ReadError`] from the current frame or the next header.
  pub fn read(&mut self, out: &mut [u8]) -> Result<usize, ReadError> {
    let Some(decoder) = self.decoder.as_mut() else {
      return Ok(0);
    };
    if out.is_empty() {
      return Ok(0);
    }

    loop {
      let n = decoder.read(out)?;
      if n > 0 {
        return Ok(n);
      }
      match decoder.reopen(None)? {
        Status::Active => {
          self.frames += 1;
          debug!("frame {} starts at {}", self.frames, decoder.source().position());
        }
        Status::AtFrameEnd | Status::Errored => return Ok(0),
      }
    }
  }
}

impl<S: PeekSource, E: CodecEngine> Read for MultiFrameDecoder<S, E> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    MultiFrameDecoder::read(self, buf).map_err(io::Error::from)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;

  fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts
      .iter()
      .flat_map(|p| zstd::bulk::compress(p, 3).unwrap())
      .collect()
  }

  #[test]
  fn joins_frames() {
    let stream = concat(&[b"one ", b"", b"two ", b"three"]);
    let mut decoder = MultiFrameDecoder::open(Cursor::new(stream)).unwrap();
    let mut out = String::new();
    decoder.read_to_string(&mut out).unwrap();
    assert_eq!(out, "one two three");
    assert_eq!(decoder.frames(), 4);
  }

  #[test]
  fn empty_input_reads_nothing() {
    let mut decoder = MultiFrameDecoder::open(Cursor::new(Vec::new())).unwrap();
    let mut out = Vec::new();
    assert_eq!(decoder.read_to_end(&mut out).unwrap(), 0);
    assert_eq!(decoder.frames(), 0);
    assert!(decoder.into_inner().is_none());
  }

  #[test]
  fn garbage_after_frame_is_an_error() {
    let mut stream = concat(&[b"payload"]);
    stream.extend_from_slice(b"junk");
    let mut decoder = MultiFrameDecoder::open(Cursor::new(stream)).unwrap();
    let mut buf = [0u8; 64];
    assert_eq!(decoder.read(&mut buf).unwrap(), 7);
    assert_eq!(decoder.read(&mut buf), Err(ReadError::BadMagic));
  }
}
