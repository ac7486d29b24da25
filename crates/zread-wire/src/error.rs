/// Errors raised while parsing zstd frame and block headers.
///
/// Every variant is plain data so the error can be copied around freely
/// and carries no heap allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete header could be read.
    #[error("unexpected end of input: need {needed} bytes, have {available}")]
    UnexpectedEof { needed: usize, available: usize },

    /// The first four bytes are not the zstd frame magic.
    #[error("bad zstd magic: {found:#010X}")]
    BadMagic { found: u32 },

    /// A skippable frame was found where a zstd frame was expected.
    #[error("skippable frame {magic:#010X} not supported")]
    SkippableFrame { magic: u32 },

    /// The reserved bit of the frame header descriptor was set.
    #[error("reserved bit set in frame header descriptor {descriptor:#04X}")]
    ReservedBit { descriptor: u8 },

    /// The window descriptor encodes a window larger than the format allows.
    #[error("window log {log} exceeds the maximum of {max}")]
    WindowTooLarge { log: u32, max: u32 },

    /// A block header uses the reserved block type.
    #[error("reserved block type in block header {raw:#08X}")]
    ReservedBlockType { raw: u32 },
}
