#![warn(clippy::pedantic)]

pub mod block_buffer;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod multi;
pub mod source;

mod header;

pub use config::EngineConfig;
pub use decoder::{FrameDecoder, Status};
pub use engine::{CodecEngine, Step, ZstdEngine};
pub use error::ReadError;
pub use header::FrameStart;
pub use multi::MultiFrameDecoder;
pub use source::{PeekReader, PeekSource};
