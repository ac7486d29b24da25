use crate::block::BLOCK_HEADER_SIZE;
use crate::error::WireError;

/// Magic number of a zstd frame, as it appears on the wire.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Skippable frames use magic numbers `0x184D2A50..=0x184D2A5F`.
pub const SKIPPABLE_MAGIC_START: u32 = 0x184D_2A50;

/// Mask selecting the fixed part of a skippable-frame magic number.
pub const SKIPPABLE_MAGIC_MASK: u32 = 0xFFFF_FFF0;

/// Magic + descriptor + window descriptor: the shortest possible header.
pub const FRAME_HEADER_SIZE_MIN: usize = 6;

/// Magic + descriptor + window descriptor + 4-byte dictionary ID +
/// 8-byte content size.
pub const FRAME_HEADER_SIZE_MAX: usize = 18;

/// How many bytes a reader peeks before committing to a frame: the largest
/// header plus the first block header, rounded up to a multiple of 8.
pub const PEEK_WINDOW: usize = (FRAME_HEADER_SIZE_MAX + BLOCK_HEADER_SIZE + 7) & !7;

/// Smallest window log a window descriptor can encode.
pub const WINDOW_LOG_MIN: u32 = 10;

/// Largest window log accepted on 64-bit targets.
pub const WINDOW_LOG_MAX: u32 = 31;

/// What kind of frame a magic number announces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// A content-bearing zstd frame.
    Zstd,
    /// An auxiliary frame whose content a decoder would normally skip.
    Skippable { magic: u32 },
    /// Anything else.
    Unknown { magic: u32 },
}

impl FrameKind {
    /// Classify the frame starting at `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if `buf` holds fewer than 4 bytes.
    pub fn classify(buf: &[u8]) -> Result<Self, WireError> {
        let magic = read_magic(buf)?;
        if magic.to_le_bytes() == ZSTD_MAGIC {
            Ok(Self::Zstd)
        } else if magic & SKIPPABLE_MAGIC_MASK == SKIPPABLE_MAGIC_START {
            Ok(Self::Skippable { magic })
        } else {
            Ok(Self::Unknown { magic })
        }
    }
}

/// Accept only a zstd frame magic at the start of `buf`.
///
/// # Errors
///
/// - [`WireError::UnexpectedEof`] if `buf` holds fewer than 4 bytes.
/// - [`WireError::SkippableFrame`] for a skippable-frame magic.
/// - [`WireError::BadMagic`] for anything else.
pub fn check_magic(buf: &[u8]) -> Result<(), WireError> {
    match FrameKind::classify(buf)? {
        FrameKind::Zstd => Ok(()),
        FrameKind::Skippable { magic } => Err(WireError::SkippableFrame { magic }),
        FrameKind::Unknown { magic } => Err(WireError::BadMagic { found: magic }),
    }
}

fn read_magic(buf: &[u8]) -> Result<u32, WireError> {
    match buf {
        [b0, b1, b2, b3, ..] => Ok(u32::from_le_bytes([*b0, *b1, *b2, *b3])),
        _ => Err(WireError::UnexpectedEof {
            needed: 4,
            available: buf.len(),
        }),
    }
}

/// Frame header descriptor, the byte right after the magic.
///
/// Bit layout:
///   bits 6-7 = frame content size flag
///   bit 5    = single segment
///   bit 4    = unused
///   bit 3    = reserved (MUST be 0)
///   bit 2    = content checksum present
///   bits 0-1 = dictionary ID flag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor(u8);

impl Descriptor {
    const SINGLE_SEGMENT: u8 = 0b0010_0000;
    const RESERVED: u8 = 0b0000_1000;
    const CHECKSUM: u8 = 0b0000_0100;

    pub fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn single_segment(self) -> bool {
        self.0 & Self::SINGLE_SEGMENT != 0
    }

    pub fn has_checksum(self) -> bool {
        self.0 & Self::CHECKSUM != 0
    }

    pub fn reserved_set(self) -> bool {
        self.0 & Self::RESERVED != 0
    }

    /// Width of the dictionary ID field in bytes.
    pub fn dictionary_id_len(self) -> usize {
        [0, 1, 2, 4][usize::from(self.0 & 0b11)]
    }

    /// Width of the frame content size field in bytes.
    pub fn content_size_len(self) -> usize {
        match self.0 >> 6 {
            0 if self.single_segment() => 1,
            0 => 0,
            1 => 2,
            2 => 4,
            _ => 8,
        }
    }

    /// Total header length this descriptor implies, magic included.
    pub fn header_len(self) -> usize {
        let window = usize::from(!self.single_segment());
        ZSTD_MAGIC.len() + 1 + window + self.dictionary_id_len() + self.content_size_len()
    }
}

/// Decoded zstd frame header.
///
/// ```text
/// ┌─────────────────────────┬─────────┐
/// │ Field                   │ Size    │
/// ├─────────────────────────┼─────────┤
/// │ Magic 28 B5 2F FD       │ 4       │
/// │ Frame_Header_Descriptor │ 1       │
/// │ Window_Descriptor       │ 0-1     │
/// │ Dictionary_ID           │ 0-4     │
/// │ Frame_Content_Size      │ 0-8     │
/// └─────────────────────────┴─────────┘
/// ```
///
/// Decoding the frame itself is left to the codec engine; this type exists
/// for diagnostics and for callers that want the descriptor fields without
/// touching an engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub descriptor: Descriptor,
    /// Window size in bytes. For single-segment frames this is the content
    /// size.
    pub window_size: Option<u64>,
    pub dictionary_id: Option<u32>,
    pub content_size: Option<u64>,
    /// Length of the header in bytes, magic included.
    pub header_len: usize,
}

impl FrameHeader {
    /// Parse a frame header from the start of `buf`.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if `buf` ends inside the header.
    /// - [`WireError::SkippableFrame`] / [`WireError::BadMagic`] for a
    ///   magic other than the zstd one.
    /// - [`WireError::ReservedBit`] if descriptor bit 3 is set.
    /// - [`WireError::WindowTooLarge`] if the window descriptor exceeds
    ///   [`WINDOW_LOG_MAX`].
    pub fn parse(buf: &[u8]) -> Result<Self, WireError> {
        check_magic(buf)?;

        let Some(&raw) = buf.get(4) else {
            return Err(WireError::UnexpectedEof {
                needed: 5,
                available: buf.len(),
            });
        };
        let descriptor = Descriptor::from_raw(raw);
        if descriptor.reserved_set() {
            return Err(WireError::ReservedBit {
                descriptor: descriptor.raw(),
            });
        }

        let header_len = descriptor.header_len();
        if buf.len() < header_len {
            return Err(WireError::UnexpectedEof {
                needed: header_len,
                available: buf.len(),
            });
        }

        let mut pos = 5;
        let mut window_size = None;
        if !descriptor.single_segment() {
            window_size = Some(window_size_from(buf[pos])?);
            pos += 1;
        }

        let did_len = descriptor.dictionary_id_len();
        let dictionary_id = match read_le(&buf[pos..pos + did_len]) {
            0 => None,
            #[allow(clippy::cast_possible_truncation)]
            id => Some(id as u32),
        };
        pos += did_len;

        let fcs_len = descriptor.content_size_len();
        let content_size = match fcs_len {
            0 => None,
            2 => Some(read_le(&buf[pos..pos + 2]) + 256),
            n => Some(read_le(&buf[pos..pos + n])),
        };

        if descriptor.single_segment() {
            window_size = content_size;
        }

        Ok(Self {
            descriptor,
            window_size,
            dictionary_id,
            content_size,
            header_len,
        })
    }

    pub fn has_checksum(&self) -> bool {
        self.descriptor.has_checksum()
    }
}

fn window_size_from(descriptor: u8) -> Result<u64, WireError> {
    let log = WINDOW_LOG_MIN + u32::from(descriptor >> 3);
    if log > WINDOW_LOG_MAX {
        return Err(WireError::WindowTooLarge {
            log,
            max: WINDOW_LOG_MAX,
        });
    }
    let base = 1u64 << log;
    let mantissa = u64::from(descriptor & 0b111);
    Ok(base + (base / 8) * mantissa)
}

fn read_le(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}
