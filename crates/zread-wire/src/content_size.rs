use std::fmt;

/// Largest content size a frame may declare and still be accepted.
///
/// Sizes are reported to callers as signed 64-bit lengths in several
/// places (file offsets, `seek`-style arithmetic), so anything above
/// `i64::MAX` is treated as corrupt rather than silently truncated.
#[allow(clippy::cast_sign_loss)]
pub const MAX_CONTENT_SIZE: u64 = i64::MAX as u64;

/// Uncompressed length of a frame, as far as it can be known up front.
///
/// `Unknown` is a distinct value, not a stand-in for zero: a frame that
/// declares (or is inferred to carry) an empty payload is `Known(0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentSize {
    #[default]
    Unknown,
    Known(u64),
}

impl ContentSize {
    /// Build a content size from a declared value, rejecting sizes above
    /// [`MAX_CONTENT_SIZE`].
    ///
    /// Returns `None` when the declared size is out of range.
    #[must_use]
    pub fn from_declared(declared: Option<u64>) -> Option<Self> {
        match declared {
            None => Some(Self::Unknown),
            Some(n) if n <= MAX_CONTENT_SIZE => Some(Self::Known(n)),
            Some(_) => None,
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// The declared length, if any.
    #[must_use]
    pub fn known(self) -> Option<u64> {
        match self {
            Self::Known(n) => Some(n),
            Self::Unknown => None,
        }
    }
}

impl From<ContentSize> for Option<u64> {
    fn from(size: ContentSize) -> Self {
        size.known()
    }
}

impl fmt::Display for ContentSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(n) => write!(f, "{n}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}
