//! Shared helpers for the zread integration tests and benchmarks.
//!
//! Everything here panics on failure: it only ever runs under test.

use zread_decoder::{CodecEngine, FrameDecoder, PeekSource};

/// Compression level used for every reference frame.
pub const LEVEL: i32 = 3;

/// Compress `data` into one frame that declares its content size.
#[must_use]
pub fn compress(data: &[u8]) -> Vec<u8> {
    zstd::bulk::compress(data, LEVEL).expect("reference compression failed")
}

/// Compress `data` into one frame without a content size field.
#[must_use]
pub fn compress_unsized(data: &[u8]) -> Vec<u8> {
    let mut compressor = zstd::bulk::Compressor::new(LEVEL).expect("compressor");
    compressor.include_contentsize(false).expect("contentsize flag");
    compressor.compress(data).expect("reference compression failed")
}

/// Compress `data` into one frame carrying a content checksum.
#[must_use]
pub fn compress_checksummed(data: &[u8]) -> Vec<u8> {
    let mut compressor = zstd::bulk::Compressor::new(LEVEL).expect("compressor");
    compressor.include_checksum(true).expect("checksum flag");
    compressor.compress(data).expect("reference compression failed")
}

/// Concatenate one frame per part.
#[must_use]
pub fn concat_frames(parts: &[&[u8]]) -> Vec<u8> {
    parts.iter().flat_map(|p| compress(p)).collect()
}

/// Log-like text: compresses well, never repeats exactly.
#[must_use]
pub fn text(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + 64);
    let mut line = 0u64;
    while out.len() < len {
        out.extend_from_slice(
            format!("{line:08} level=info target=zread frame={} ok\n", line * 7 % 13).as_bytes(),
        );
        line += 1;
    }
    out.truncate(len);
    out
}

/// Incompressible bytes from a xorshift generator; zstd stores these as
/// raw blocks.
#[must_use]
pub fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect()
}

/// Decode a hex fixture; whitespace is ignored.
#[must_use]
pub fn fixture(hex_text: &str) -> Vec<u8> {
    let compact: String = hex_text.split_whitespace().collect();
    hex::decode(compact).expect("bad hex fixture")
}

/// Read the current frame to its end in `chunk`-sized calls.
pub fn drain<S: PeekSource, E: CodecEngine>(decoder: &mut FrameDecoder<S, E>, chunk: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; chunk];
    loop {
        let n = decoder.read(&mut buf).expect("read failed");
        if n == 0 {
            return out;
        }
        out.extend_from_slice(&buf[..n]);
    }
}

#[must_use]
pub fn digest(data: &[u8]) -> blake3::Hash {
    blake3::hash(data)
}
