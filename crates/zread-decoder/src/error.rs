use std::io;

/// Errors that can occur while reading a zstd frame.
///
/// No variant owns heap memory: every message is a `&'static str`, so the
/// error can be copied, stored, and reported from any thread without
/// synchronisation. Each error is also available as an
/// `(origin, description)` pair through [`ReadError::origin`] and
/// [`ReadError::description`].
///
/// ```text
///   ReadError
///   ├── Io               ← the byte source failed to read
///   ├── TruncatedHeader  ← input ended inside the frame header
///   ├── TruncatedBlock   ← input ended inside a block
///   ├── BadMagic         ← not a zstd frame (skippable frames included)
///   ├── InvalidSize      ← declared content size out of range
///   ├── Codec            ← the engine rejected the input
///   ├── AllocationFailure← engine or buffer allocation failed
///   └── PendingError     ← read after the frame already failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// The byte source reported an I/O failure.
    ///
    /// Only the [`io::ErrorKind`] is kept; the message comes from a static
    /// table.
    #[error("read: {}", io_description(.kind))]
    Io { kind: io::ErrorKind },

    /// Input ended before the frame header (and first block header) was
    /// complete.
    #[error("begin: unexpected EOF")]
    TruncatedHeader,

    /// Input ended before the engine's pending block size could be read.
    #[error("read: unexpected EOF")]
    TruncatedBlock,

    /// The first four bytes are not the zstd magic. Skippable frames land
    /// here too; only content-bearing frames are decoded.
    #[error("begin: bad zstd magic")]
    BadMagic,

    /// The frame declares a content size above `i64::MAX`.
    #[error("begin: content size out of range")]
    InvalidSize,

    /// The codec engine failed; `message` is the engine's own diagnostic.
    #[error("{origin}: {message}")]
    Codec {
        origin: &'static str,
        message: &'static str,
    },

    #[error("open: allocation failed")]
    AllocationFailure,

    /// A read was attempted after the decoder entered the errored state.
    #[error("read: pending error")]
    PendingError,
}

impl ReadError {
    /// The operation the error originated from, typically a function name.
    #[must_use]
    pub fn origin(&self) -> &'static str {
        match self {
            Self::Io { .. } | Self::TruncatedBlock | Self::PendingError => "read",
            Self::TruncatedHeader | Self::BadMagic | Self::InvalidSize => "begin",
            Self::Codec { origin, .. } => *origin,
            Self::AllocationFailure => "open",
        }
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Io { kind } => io_description(kind),
            Self::TruncatedHeader | Self::TruncatedBlock => "unexpected EOF",
            Self::BadMagic => "bad zstd magic",
            Self::InvalidSize => "content size out of range",
            Self::Codec { message, .. } => *message,
            Self::AllocationFailure => "allocation failed",
            Self::PendingError => "pending error",
        }
    }

    /// Both halves of the report at once.
    #[must_use]
    pub fn parts(&self) -> (&'static str, &'static str) {
        (self.origin(), self.description())
    }
}

impl From<io::Error> for ReadError {
    fn from(err: io::Error) -> Self {
        Self::Io { kind: err.kind() }
    }
}

impl From<ReadError> for io::Error {
    fn from(err: ReadError) -> Self {
        let kind = match err {
            ReadError::Io { kind } => kind,
            ReadError::TruncatedHeader | ReadError::TruncatedBlock => io::ErrorKind::UnexpectedEof,
            ReadError::AllocationFailure => io::ErrorKind::OutOfMemory,
            ReadError::PendingError => io::ErrorKind::Other,
            ReadError::BadMagic
            | ReadError::InvalidSize
            | ReadError::Codec { .. } => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}

/// Static description of an I/O error kind.
///
/// `io::ErrorKind` has no `&'static str` accessor, so the common kinds are
/// spelled out here; the table is plain read-only data.
#[must_use]
pub fn io_description(kind: &io::ErrorKind) -> &'static str {
    use io::ErrorKind as K;

    match kind {
        K::NotFound => "No such file or directory",
        K::PermissionDenied => "Permission denied",
        K::ConnectionRefused => "Connection refused",
        K::ConnectionReset => "Connection reset by peer",
        K::ConnectionAborted => "Software caused connection abort",
        K::NotConnected => "Transport endpoint is not connected",
        K::BrokenPipe => "Broken pipe",
        K::WouldBlock => "Resource temporarily unavailable",
        K::InvalidInput => "Invalid argument",
        K::InvalidData => "Invalid data",
        K::TimedOut => "Connection timed out",
        K::Interrupted => "Interrupted system call",
        K::UnexpectedEof => "Unexpected end of file",
        K::OutOfMemory => "Cannot allocate memory",
        K::Unsupported => "Operation not supported",
        _ => "Unknown error",
    }
}
