use crate::error::WireError;

/// Size of the header preceding every block.
pub const BLOCK_HEADER_SIZE: usize = 3;

/// Largest block payload the format allows (128 KiB).
pub const BLOCK_SIZE_MAX: usize = 128 * 1024;

/// Raw block header value for a last, raw block with no payload.
///
/// A frame whose only block carries this header holds nothing but an
/// optional checksum, so its uncompressed length is zero even when the
/// frame header does not declare one.
pub const EMPTY_LAST_BLOCK: u32 = 1;

/// Block type, bits 1-2 of the block header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockType {
    /// Payload is stored verbatim.
    Raw,
    /// Payload is a single byte repeated `size` times.
    Rle,
    /// Payload is entropy coded.
    Compressed,
}

impl BlockType {
    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Self::Raw),
            1 => Some(Self::Rle),
            2 => Some(Self::Compressed),
            _ => None,
        }
    }

    fn bits(self) -> u32 {
        match self {
            Self::Raw => 0,
            Self::Rle => 1,
            Self::Compressed => 2,
        }
    }
}

/// Block header — 3 bytes, little-endian.
///
/// ```text
/// ┌──────────┬───────────────────────────────────────┐
/// │ Bits     │ Description                           │
/// ├──────────┼───────────────────────────────────────┤
/// │ 0        │ Last_Block                            │
/// │ 1-2      │ Block_Type (raw, RLE, compressed)     │
/// │ 3-23     │ Block_Size                            │
/// └──────────┴───────────────────────────────────────┘
/// ```
///
/// For RLE blocks `size` is the regenerated length and the payload on the
/// wire is a single byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub last: bool,
    pub block_type: BlockType,
    pub size: u32,
}

impl BlockHeader {
    /// Parse a block header from the first 3 bytes of `buf`.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if `buf` is shorter than 3 bytes.
    /// - [`WireError::ReservedBlockType`] for block type 3.
    pub fn parse(buf: &[u8]) -> Result<Self, WireError> {
        let raw = raw_block_header(buf)?;
        let block_type = BlockType::from_bits((raw >> 1) & 0b11)
            .ok_or(WireError::ReservedBlockType { raw })?;

        Ok(Self {
            last: raw & 1 != 0,
            block_type,
            size: raw >> 3,
        })
    }

    /// Encode the header back into its 3-byte wire form.
    #[must_use]
    pub fn to_bytes(self) -> [u8; BLOCK_HEADER_SIZE] {
        let raw = (self.size << 3) | (self.block_type.bits() << 1) | u32::from(self.last);
        let le = raw.to_le_bytes();
        [le[0], le[1], le[2]]
    }

    /// Number of payload bytes that follow this header on the wire.
    #[must_use]
    pub fn payload_len(self) -> usize {
        match self.block_type {
            BlockType::Rle => 1,
            BlockType::Raw | BlockType::Compressed => self.size as usize,
        }
    }
}

/// Read the 24-bit little-endian block header value at the start of `buf`.
///
/// # Errors
///
/// Returns [`WireError::UnexpectedEof`] if `buf` is shorter than 3 bytes.
pub fn raw_block_header(buf: &[u8]) -> Result<u32, WireError> {
    match buf {
        [b0, b1, b2, ..] => Ok(u32::from_le_bytes([*b0, *b1, *b2, 0])),
        _ => Err(WireError::UnexpectedEof {
            needed: BLOCK_HEADER_SIZE,
            available: buf.len(),
        }),
    }
}

/// Whether `buf` starts with the "last block, size 0" header.
#[must_use]
pub fn is_empty_last_block(buf: &[u8]) -> bool {
    raw_block_header(buf) == Ok(EMPTY_LAST_BLOCK)
}
