//! Error message snapshots.
//!
//! Every failure a caller can see is rendered as `origin: description`
//! from static strings. These snapshots pin the exact wording, both for
//! errors built directly and for errors produced by decoding bad input.
//!
//! A changed message fails here first; accept intended changes with
//! `cargo insta review`.

use std::io::{self, Cursor};

use insta::assert_snapshot;
use zread_decoder::{FrameDecoder, ReadError};
use zread_tests::{compress, fixture, text};

fn open_error(bytes: Vec<u8>) -> ReadError {
    match FrameDecoder::open(Cursor::new(bytes)) {
        Ok(_) => panic!("expected open to fail"),
        Err(err) => err,
    }
}

#[test]
fn static_messages() {
    let all = [
        ReadError::TruncatedHeader,
        ReadError::TruncatedBlock,
        ReadError::BadMagic,
        ReadError::InvalidSize,
        ReadError::AllocationFailure,
        ReadError::PendingError,
        ReadError::Io {
            kind: io::ErrorKind::NotFound,
        },
        ReadError::Io {
            kind: io::ErrorKind::Other,
        },
    ];
    let rendered: Vec<String> = all.iter().map(ToString::to_string).collect();
    assert_snapshot!(rendered.join("\n"), @r"
    begin: unexpected EOF
    read: unexpected EOF
    begin: bad zstd magic
    begin: content size out of range
    open: allocation failed
    read: pending error
    read: No such file or directory
    read: Unknown error
    ");
}

#[test]
fn truncated_header() {
    let err = open_error(fixture("28b52ffd 00"));
    assert_snapshot!(err.to_string(), @"begin: unexpected EOF");
}

#[test]
fn foreign_magic() {
    let err = open_error(b"PK\x03\x04 zip archive".to_vec());
    assert_snapshot!(err.to_string(), @"begin: bad zstd magic");
}

#[test]
fn skippable_frame_is_bad_magic() {
    let err = open_error(fixture("502a4d18 04000000 74657374"));
    assert_snapshot!(err.to_string(), @"begin: bad zstd magic");
}

#[test]
fn reserved_bit_reported_by_engine() {
    let err = open_error(fixture("28b52ffd 08 00 010000"));
    assert_snapshot!(err.to_string(), @"ZSTD_decompressStream: Unsupported frame parameter");
}

#[test]
fn truncated_block_and_pending() {
    let mut frame = compress(&text(5000));
    frame.truncate(frame.len() - 2);
    let mut decoder = FrameDecoder::open(Cursor::new(frame)).unwrap().unwrap();

    let mut buf = vec![0u8; 8192];
    let first = decoder.read(&mut buf).unwrap_err();
    let second = decoder.read(&mut buf).unwrap_err();
    assert_snapshot!(format!("{first}\n{second}"), @r"
    read: unexpected EOF
    read: pending error
    ");
}

#[test]
fn io_conversion_keeps_message() {
    let err = io::Error::from(ReadError::TruncatedBlock);
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    assert_snapshot!(err.to_string(), @"read: unexpected EOF");
}
