#![no_main]

use std::io::{Cursor, Read};

use libfuzzer_sys::fuzz_target;
use zread_decoder::{EngineConfig, FrameDecoder, MultiFrameDecoder, ReadError, Status};

// Fuzz target: decoding arbitrary bytes.
//
// Catches bugs in:
// - Header handling on malformed or truncated input
// - Block buffer cursor bookkeeping
// - Sticky error state and reopen after failure
fuzz_target!(|data: &[u8]| {
    // keep window allocations small
    let config = EngineConfig::default().with_window_log_max(20);

    if let Ok(mut decoder) = MultiFrameDecoder::open_with_config(Cursor::new(data), &config) {
        let mut sink = Vec::new();
        let _ = decoder.read_to_end(&mut sink);
    }

    let Ok(Some(mut decoder)) = FrameDecoder::open_with_config(Cursor::new(data), &config) else {
        return;
    };
    let mut buf = [0u8; 777];
    loop {
        match decoder.read(&mut buf) {
            Ok(0) => {
                assert_eq!(decoder.status(), Status::AtFrameEnd);
                break;
            }
            Ok(n) => assert!(n <= buf.len()),
            Err(_) => {
                assert_eq!(decoder.status(), Status::Errored);
                assert_eq!(decoder.read(&mut buf), Err(ReadError::PendingError));
                break;
            }
        }
    }
    assert!(decoder.source().position() <= data.len() as u64);
});
