#![warn(clippy::pedantic)]

pub mod block;
pub mod content_size;
pub mod error;
pub mod frame;

pub use block::{BlockHeader, BlockType};
pub use content_size::ContentSize;
pub use error::WireError;
pub use frame::{FrameHeader, FrameKind};
