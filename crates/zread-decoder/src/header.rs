use log::debug;
use zread_wire::block::{self, BLOCK_HEADER_SIZE};
use zread_wire::frame::{self, FRAME_HEADER_SIZE_MIN, PEEK_WINDOW};
use zread_wire::{ContentSize, WireError};

use crate::engine::{CodecEngine, Step};
use crate::error::ReadError;
use crate::source::PeekSource;

/// What the source holds at the point a frame is expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStart {
  /// The source is at end of input. Not an error.
  Empty,
  /// A frame header was parsed and consumed.
  Frame {
    /// Compressed bytes the engine wants next; 0 for a frame without
    /// blocks left to read.
    pending: usize,
    content_size: ContentSize,
  },
}

/// Start decoding the frame at the source's current position.
///
/// The header is parsed from a peeked window: the engine is fed the
/// minimal header, tells us how many more bytes reach the first block
/// boundary, and is fed those too, all with no room for output. Only the
/// bytes the engine took are consumed from the source, so the cursor ends
/// up right before the first block's payload.
///
/// # Errors
///
/// - [`ReadError::Io`] if peeking fails.
/// - [`ReadError::TruncatedHeader`] if input ends inside the header.
/// - [`ReadError::BadMagic`] for anything but a zstd frame, skippable
///   frames included.
/// - [`ReadError::InvalidSize`] for a declared size above `i64::MAX`. The
///   header is already consumed by then, so the source sits past it.
/// - [`ReadError::Codec`] if the engine rejects the header.
pub fn begin<S, E>(source: &mut S, engine: &mut E) -> Result<FrameStart, ReadError>
where
  S: PeekSource + ?Sized,
  E: CodecEngine + ?Sized,
{
  engine.reset()?;

  let mut window = [0u8; PEEK_WINDOW];
  let n = source.peek(&mut window)?;
  if n == 0 {
    return Ok(FrameStart::Empty);
  }
  let peeked = &window[..n];

  frame::check_magic(peeked).map_err(|err| match err {
    WireError::UnexpectedEof { .. } => ReadError::TruncatedHeader,
    _ => ReadError::BadMagic,
  })?;
  if n < FRAME_HEADER_SIZE_MIN {
    return Err(ReadError::TruncatedHeader);
  }

  // With nowhere to write, the engine can only take header bytes.
  let mut sink = [0u8; 0];

  let first = engine.step(&peeked[..FRAME_HEADER_SIZE_MIN], &mut sink)?;
  expect_header_only(first, FRAME_HEADER_SIZE_MIN)?;

  // The remainder of the header plus the first block header.
  let extra = first.pending;
  if extra < BLOCK_HEADER_SIZE {
    return Err(ReadError::Codec {
      origin: "begin",
      message: "engine requested no block header",
    });
  }
  let consumed = FRAME_HEADER_SIZE_MIN + extra;
  if n < consumed {
    return Err(ReadError::TruncatedHeader);
  }

  let second = engine.step(&peeked[FRAME_HEADER_SIZE_MIN..consumed], &mut sink)?;
  expect_header_only(second, extra)?;

  source.consume(consumed);

  let header_len = consumed - BLOCK_HEADER_SIZE;
  let content_size = match engine.declared_content_size(&peeked[..header_len])? {
    // A lone "last block, size 0" means the frame holds at most a checksum.
    ContentSize::Unknown if block::is_empty_last_block(&peeked[header_len..consumed]) => {
      ContentSize::Known(0)
    }
    size => size,
  };

  debug!(
    "frame header: {header_len} bytes, content size {content_size}, first block wants {}",
    second.pending
  );

  Ok(FrameStart::Frame {
    pending: second.pending,
    content_size,
  })
}

fn expect_header_only(step: Step, len: usize) -> Result<(), ReadError> {
  if step.consumed == len && step.produced == 0 {
    Ok(())
  } else {
    Err(ReadError::Codec {
      origin: "ZSTD_decompressStream",
      message: "frame header not fully consumed",
    })
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;
  use crate::engine::ZstdEngine;

  fn start(bytes: &[u8]) -> (Result<FrameStart, ReadError>, u64) {
    let mut src = Cursor::new(bytes.to_vec());
    let mut engine = ZstdEngine::new().unwrap();
    let result = begin(&mut src, &mut engine);
    (result, src.position())
  }

  #[test]
  fn empty_source_is_not_an_error() {
    assert_eq!(start(&[]), (Ok(FrameStart::Empty), 0));
  }

  #[test]
  fn short_magic_is_truncated() {
    assert_eq!(start(&[0x28, 0xB5]).0, Err(ReadError::TruncatedHeader));
  }

  #[test]
  fn wrong_magic() {
    assert_eq!(start(b"PK\x03\x04 not zstd").0, Err(ReadError::BadMagic));
  }

  #[test]
  fn skippable_frame_is_bad_magic() {
    let mut bytes = vec![0x50, 0x2A, 0x4D, 0x18];
    bytes.extend_from_slice(&4u32.to_le_bytes());
    bytes.extend_from_slice(b"skip");
    assert_eq!(start(&bytes), (Err(ReadError::BadMagic), 0));
  }

  #[test]
  fn magic_without_descriptor_is_truncated() {
    assert_eq!(
      start(&[0x28, 0xB5, 0x2F, 0xFD, 0x00]).0,
      Err(ReadError::TruncatedHeader)
    );
  }

  #[test]
  fn missing_block_header_is_truncated() {
    // minimal header, no block header after it
    let (result, pos) = start(&[0x28, 0xB5, 0x2F, 0xFD, 0x00, 0x00, 0x01]);
    assert_eq!(result, Err(ReadError::TruncatedHeader));
    assert_eq!(pos, 0);
  }

  #[test]
  fn consumes_exactly_header_and_block_header() {
    let data = vec![b'z'; 5000];
    let compressed = zstd::bulk::compress(&data, 3).unwrap();
    let header_len = zread_wire::FrameHeader::parse(&compressed).unwrap().header_len;

    let (result, pos) = start(&compressed);
    let Ok(FrameStart::Frame {
      pending,
      content_size,
    }) = result
    else {
      panic!("expected a frame, got {result:?}");
    };
    assert_eq!(pos as usize, header_len + BLOCK_HEADER_SIZE);
    assert_eq!(content_size, ContentSize::Known(5000));
    assert!(pending > 0);
    assert!(pos as usize + pending <= compressed.len());
  }

  #[test]
  fn undeclared_size_is_unknown() {
    let mut compressor = zstd::bulk::Compressor::new(3).unwrap();
    compressor.include_contentsize(false).unwrap();
    let compressed = compressor.compress(&[1u8; 300]).unwrap();

    let (result, _) = start(&compressed);
    assert!(matches!(
      result,
      Ok(FrameStart::Frame {
        content_size: ContentSize::Unknown,
        ..
      })
    ));
  }

  #[test]
  fn lone_empty_last_block_means_zero() {
    // descriptor 0, window 1 KiB, then "last raw block, size 0"
    let bytes = [0x28, 0xB5, 0x2F, 0xFD, 0x00, 0x00, 0x01, 0x00, 0x00];
    let (result, pos) = start(&bytes);
    assert_eq!(
      result,
      Ok(FrameStart::Frame {
        pending: 0,
        content_size: ContentSize::Known(0),
      })
    );
    assert_eq!(pos, 9);
  }

  #[test]
  fn checksum_after_empty_block_is_pending() {
    // checksum flag set: the 4-byte checksum is all that is left
    let bytes = [
      0x28, 0xB5, 0x2F, 0xFD, 0x04, 0x00, 0x01, 0x00, 0x00, 0xAA, 0xBB, 0xCC, 0xDD,
    ];
    let (result, pos) = start(&bytes);
    assert_eq!(
      result,
      Ok(FrameStart::Frame {
        pending: 4,
        content_size: ContentSize::Known(0),
      })
    );
    assert_eq!(pos, 9);
  }

  #[test]
  fn oversized_declaration_still_consumes_header() {
    // FCS flag 3 with bit 63 set, then an empty last block
    let bytes = [
      0x28, 0xB5, 0x2F, 0xFD, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x01,
      0x00, 0x00,
    ];
    assert_eq!(start(&bytes), (Err(ReadError::InvalidSize), 17));
  }
}
