use zread_wire::ContentSize;
use zstd::zstd_safe::{self, DCtx, DParameter, InBuffer, OutBuffer, ResetDirective};

use crate::config::EngineConfig;
use crate::error::ReadError;

/// Outcome of one [`CodecEngine::step`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Step {
  /// Input bytes the engine took.
  pub consumed: usize,
  /// Output bytes the engine wrote.
  pub produced: usize,
  /// Input bytes the engine wants next. Zero once the frame is complete.
  pub pending: usize,
}

/// A streaming decompression engine.
///
/// The engine knows nothing about where its input comes from; the frame
/// reader decides how many bytes to hand over based on
/// [`Step::pending`]. Creating an engine is the implementor's constructor
/// and destroying it is `Drop`. One engine is reused across every frame a
/// reader decodes, so [`reset`](Self::reset) must not reallocate.
pub trait CodecEngine {
  /// Prepare for a new frame.
  ///
  /// # Errors
  ///
  /// [`ReadError::Codec`] if the engine cannot be reset.
  fn reset(&mut self) -> Result<(), ReadError>;

  /// Decode as much of `input` into `output` as possible.
  ///
  /// With an empty `output` only header bytes are accepted and nothing is
  /// produced.
  ///
  /// # Errors
  ///
  /// [`ReadError::Codec`] carrying the engine's diagnostic.
  fn step(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, ReadError>;

  /// The content size declared by a complete frame header.
  ///
  /// # Errors
  ///
  /// [`ReadError::InvalidSize`] for sizes above `i64::MAX`,
  /// [`ReadError::Codec`] if `header` is not a valid frame header.
  fn declared_content_size(&self, header: &[u8]) -> Result<ContentSize, ReadError>;
}

/// [`CodecEngine`] backed by libzstd's streaming decompression context.
pub struct ZstdEngine {
  dctx: DCtx<'static>,
}

impl ZstdEngine {
  /// Create an engine with the default configuration.
  ///
  /// # Errors
  ///
  /// [`ReadError::AllocationFailure`] if libzstd cannot allocate a context.
  pub fn new() -> Result<Self, ReadError> {
    Self::with_config(&EngineConfig::default())
  }

  /// Create an engine and apply `config`.
  ///
  /// # Errors
  ///
  /// [`ReadError::AllocationFailure`] if libzstd cannot allocate a context,
  /// [`ReadError::Codec`] if a parameter is rejected.
  pub fn with_config(config: &EngineConfig) -> Result<Self, ReadError> {
    let mut dctx = DCtx::try_create().ok_or(ReadError::AllocationFailure)?;
    if let Some(log) = config.window_log_max {
      dctx
        .set_parameter(DParameter::WindowLogMax(log))
        .map_err(|code| codec_error("ZSTD_DCtx_setParameter", code))?;
    }
    Ok(Self { dctx })
  }
}

impl CodecEngine for ZstdEngine {
  fn reset(&mut self) -> Result<(), ReadError> {
    // Session-only reset keeps parameters such as the window limit.
    self
      .dctx
      .reset(ResetDirective::SessionOnly)
      .map_err(|code| codec_error("ZSTD_DCtx_reset", code))?;
    Ok(())
  }

  fn step(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, ReadError> {
    let mut input = InBuffer::around(input);
    let mut output = OutBuffer::around(output);
    let pending = self
      .dctx
      .decompress_stream(&mut output, &mut input)
      .map_err(|code| codec_error("ZSTD_decompressStream", code))?;

    Ok(Step {
      consumed: input.pos(),
      produced: output.pos(),
      pending,
    })
  }

  fn declared_content_size(&self, header: &[u8]) -> Result<ContentSize, ReadError> {
    match zstd_safe::get_frame_content_size(header) {
      Ok(declared) => ContentSize::from_declared(declared).ok_or(ReadError::InvalidSize),
      Err(_) => Err(ReadError::Codec {
        origin: "ZSTD_getFrameContentSize",
        message: "corrupted frame header",
      }),
    }
  }
}

fn codec_error(origin: &'static str, code: usize) -> ReadError {
  ReadError::Codec {
    origin,
    message: zstd_safe::get_error_name(code),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn frame(data: &[u8]) -> Vec<u8> {
    zstd::bulk::compress(data, 3).unwrap()
  }

  #[test]
  fn header_steps_produce_nothing() {
    let compressed = frame(b"hello hello hello hello");
    let mut engine = ZstdEngine::new().unwrap();
    engine.reset().unwrap();

    let step = engine.step(&compressed[..6], &mut []).unwrap();
    assert_eq!(step.consumed, 6);
    assert_eq!(step.produced, 0);
    assert!(step.pending >= 3);
  }

  #[test]
  fn decodes_whole_frame() {
    let data = b"abcabcabcabcabcabcabcabcabcabc".repeat(10);
    let compressed = frame(&data);
    let mut engine = ZstdEngine::new().unwrap();
    engine.reset().unwrap();

    let mut out = vec![0u8; data.len()];
    let step = engine.step(&compressed, &mut out).unwrap();
    assert_eq!(step.consumed, compressed.len());
    assert_eq!(step.produced, data.len());
    assert_eq!(step.pending, 0);
    assert_eq!(out, data);
  }

  #[test]
  fn reports_declared_size() {
    let compressed = frame(&[7u8; 1000]);
    let engine = ZstdEngine::new().unwrap();
    let header_len = zread_wire::FrameHeader::parse(&compressed).unwrap().header_len;
    assert_eq!(
      engine.declared_content_size(&compressed[..header_len]).unwrap(),
      ContentSize::Known(1000)
    );
  }

  #[test]
  fn corrupt_input_is_a_codec_error() {
    let mut engine = ZstdEngine::new().unwrap();
    engine.reset().unwrap();
    // reserved descriptor bit set
    let result = engine.step(&[0x28, 0xB5, 0x2F, 0xFD, 0x08, 0x00], &mut []);
    assert!(matches!(
      result,
      Err(ReadError::Codec {
        origin: "ZSTD_decompressStream",
        ..
      })
    ));
  }

  #[test]
  fn window_limit_rejects_large_frames() {
    let config = EngineConfig::default().with_window_log_max(10);
    let mut engine = ZstdEngine::with_config(&config).unwrap();
    engine.reset().unwrap();
    // window descriptor exponent 10 → 1 MiB window
    let header = [0x28, 0xB5, 0x2F, 0xFD, 0x00, 10 << 3];
    assert!(engine.step(&header, &mut []).is_err());
  }
}
