#![no_main]

use libfuzzer_sys::fuzz_target;
use zread_wire::{BlockHeader, FrameHeader, FrameKind};

// Fuzz target: pure-Rust header parsing with arbitrary bytes.
//
// Catches bugs in:
// - Magic classification
// - Descriptor field lengths and the 2-byte size bias
// - Window descriptor arithmetic
// - Block header bit unpacking
fuzz_target!(|data: &[u8]| {
    let _ = FrameKind::classify(data);

    if let Ok(header) = FrameHeader::parse(data) {
        assert!(header.header_len <= data.len());
        assert!(header.header_len <= zread_wire::frame::FRAME_HEADER_SIZE_MAX);
        let _ = BlockHeader::parse(&data[header.header_len..]);
    }
});
