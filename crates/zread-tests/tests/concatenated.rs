//! Concatenated-frame tests: one decoder, many frames, and the source
//! cursor landing exactly on each frame boundary.

use std::io::{self, Cursor, Read};

use zread_decoder::{FrameDecoder, MultiFrameDecoder, PeekReader, PeekSource, ReadError, Status};
use zread_tests::{compress, compress_checksummed, compress_unsized, concat_frames, drain, text};
use zread_wire::ContentSize;

/// Reader that returns at most `chunk` bytes per call, to shake out any
/// assumption that one `read` fills a buffer.
struct Trickle<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn two_frames_back_to_back() {
    let a = compress(b"first");
    let b = compress(&text(70_000));
    let mut joined = a.clone();
    joined.extend_from_slice(&b);

    let mut src = Cursor::new(joined);
    let mut decoder = FrameDecoder::open(&mut src).unwrap().unwrap();
    assert_eq!(drain(&mut decoder, 64), b"first");
    assert_eq!(decoder.source().position(), a.len() as u64);

    assert_eq!(decoder.reopen(None).unwrap(), Status::Active);
    assert_eq!(decoder.content_size(), ContentSize::Known(70_000));
    assert_eq!(drain(&mut decoder, 4096), text(70_000));

    assert_eq!(decoder.reopen(None).unwrap(), Status::AtFrameEnd);
    decoder.release();
    assert_eq!(src.position(), (a.len() + b.len()) as u64);
}

#[test]
fn mixed_header_shapes() {
    let parts = [
        compress(b"declared"),
        compress_unsized(b"undeclared"),
        compress_checksummed(b"checksummed"),
        compress(b""),
        compress_unsized(b""),
        compress(&text(300_000)),
    ];
    let joined: Vec<u8> = parts.concat();

    let mut decoder = FrameDecoder::open(Cursor::new(&joined)).unwrap().unwrap();
    let mut boundary = 0u64;
    let mut outputs = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            assert_eq!(decoder.reopen(None).unwrap(), Status::Active, "frame {i}");
        }
        outputs.push(drain(&mut decoder, 1000));
        boundary += part.len() as u64;
        assert_eq!(decoder.source().position(), boundary, "frame {i}");
    }
    assert_eq!(decoder.reopen(None).unwrap(), Status::AtFrameEnd);

    assert_eq!(outputs[0], b"declared");
    assert_eq!(outputs[1], b"undeclared");
    assert_eq!(outputs[2], b"checksummed");
    assert!(outputs[3].is_empty());
    assert!(outputs[4].is_empty());
    assert_eq!(outputs[5], text(300_000));
}

#[test]
fn reads_never_cross_a_boundary() {
    let joined = concat_frames(&[b"abc", b"defgh"]);
    let mut decoder = FrameDecoder::open(Cursor::new(joined)).unwrap().unwrap();

    let mut buf = [0u8; 100];
    assert_eq!(decoder.read(&mut buf).unwrap(), 3);
    assert_eq!(decoder.read(&mut buf).unwrap(), 0);
    assert_eq!(decoder.reopen(None).unwrap(), Status::Active);
    assert_eq!(decoder.read(&mut buf).unwrap(), 5);
    assert_eq!(&buf[..5], b"defgh");
}

#[test]
fn trickling_reader() {
    let first = text(200_000);
    let second = text(5_000);
    let joined = concat_frames(&[&first, &second]);

    let source = PeekReader::new(Trickle {
        data: &joined,
        chunk: 5,
    });
    let mut decoder = MultiFrameDecoder::open(source).unwrap();
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).unwrap();

    let mut expected = first;
    expected.extend_from_slice(&second);
    assert_eq!(out, expected);
    assert_eq!(decoder.frames(), 2);
}

#[test]
fn reopen_switches_source() {
    let mut decoder = FrameDecoder::open(Cursor::new(compress(b"one")))
        .unwrap()
        .unwrap();
    assert_eq!(drain(&mut decoder, 16), b"one");

    let status = decoder
        .reopen(Some(Cursor::new(compress(b"two"))))
        .unwrap();
    assert_eq!(status, Status::Active);
    assert_eq!(drain(&mut decoder, 16), b"two");
}

#[test]
fn reopen_mid_frame_abandons_it() {
    // several blocks, so the first refill stops short of the frame end
    let data = text(400_000);
    let mut decoder = FrameDecoder::open(Cursor::new(compress(&data)))
        .unwrap()
        .unwrap();
    let mut buf = [0u8; 10];
    decoder.read(&mut buf).unwrap();

    // the source now sits inside a block, so no magic is found there
    assert_eq!(decoder.reopen(None), Err(ReadError::BadMagic));
    assert_eq!(decoder.status(), Status::Errored);

    decoder.reopen(Some(Cursor::new(compress(&data)))).unwrap();
    assert_eq!(drain(&mut decoder, 8192), data);
}

#[test]
fn multi_frame_stops_on_bad_tail() {
    let mut joined = concat_frames(&[b"ok ", b"still ok"]);
    joined.extend_from_slice(&[0x50, 0x2A, 0x4D, 0x18, 0, 0, 0, 0]);

    let mut decoder = MultiFrameDecoder::open(Cursor::new(joined)).unwrap();
    let mut out = Vec::new();
    let err = decoder.read_to_end(&mut out).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(out, b"ok still ok");
}

#[test]
fn position_counts_only_consumed_bytes() {
    let joined = concat_frames(&[b"x"]);
    let mut source = PeekReader::new(&joined[..]);
    let decoder = FrameDecoder::open(&mut source).unwrap().unwrap();
    // header and first block header are consumed, the payload is not
    assert!(decoder.source().position() < joined.len() as u64);
    drop(decoder);
    assert!(source.position() > 0);
}

#[test]
fn released_peek_reader_holds_the_next_frame() {
    let a = compress(b"first");
    let b = compress(&text(1000));
    let joined = [a.clone(), b.clone()].concat();

    let mut decoder = FrameDecoder::open(PeekReader::new(&joined[..]))
        .unwrap()
        .unwrap();
    assert_eq!(drain(&mut decoder, 64), b"first");
    let source = decoder.release();
    assert_eq!(source.position(), a.len() as u64);

    // the header peek ran past the end of the short first frame
    let ahead = source.buffered().len();
    assert!(ahead > 0);
    assert_eq!(ahead + source.get_ref().len(), b.len());

    let (rest, buffered) = source.into_parts();
    assert_eq!([buffered, rest.to_vec()].concat(), b);
}
