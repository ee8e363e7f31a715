pub mod cli;
pub mod decoder;
pub mod error;
pub mod image;
pub mod notify;
pub mod record;

pub use decoder::{decode, DecoderOptions, EndOfFile, HexDecoder};
pub use error::{HexError, HexErrorKind, HexResult};
pub use image::MemoryImage;
