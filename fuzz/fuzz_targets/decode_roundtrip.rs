#![no_main]

use std::io::Cursor;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zread_decoder::{FrameDecoder, Status};
use zread_wire::ContentSize;

#[derive(Debug, Arbitrary)]
struct FuzzFrame {
    content: Vec<u8>,
    level: u8,
    declare_size: bool,
    checksum: bool,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    frames: Vec<FuzzFrame>,
    chunk: u16,
}

fn compress(frame: &FuzzFrame) -> Vec<u8> {
    let level = i32::from(frame.level % 20) + 1;
    let mut compressor = zstd::bulk::Compressor::new(level).unwrap();
    compressor.include_contentsize(frame.declare_size).unwrap();
    compressor.include_checksum(frame.checksum).unwrap();
    compressor.compress(&frame.content).unwrap()
}

// Fuzz target: compress→decode roundtrip across concatenated frames.
//
// Every frame the reference compressor emits must decode to its input,
// with the source cursor landing exactly on each frame boundary.
fuzz_target!(|input: FuzzInput| {
    let frames = &input.frames[..input.frames.len().min(8)];
    if frames.is_empty() {
        return;
    }

    let mut stream = Vec::new();
    let mut boundaries = Vec::new();
    for frame in frames {
        stream.extend_from_slice(&compress(frame));
        boundaries.push(stream.len() as u64);
    }

    let chunk = usize::from(input.chunk.max(1));
    let mut buf = vec![0u8; chunk];
    let mut decoder = FrameDecoder::open(Cursor::new(&stream)).unwrap().unwrap();

    for (i, frame) in frames.iter().enumerate() {
        if i > 0 {
            assert_eq!(decoder.reopen(None).unwrap(), Status::Active);
        }
        if frame.declare_size || frame.content.is_empty() {
            assert_eq!(
                decoder.content_size(),
                ContentSize::Known(frame.content.len() as u64)
            );
        }

        let mut out = Vec::new();
        loop {
            let n = decoder.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, frame.content);
        assert_eq!(decoder.source().position(), boundaries[i]);
    }

    assert_eq!(decoder.reopen(None).unwrap(), Status::AtFrameEnd);
});
