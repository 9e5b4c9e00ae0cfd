pub mod io;
pub mod errors;
pub mod compression;
pub mod tiff;
pub mod edf;
pub mod source;
pub mod stream;
pub mod utils;
pub mod commands;

pub use errors::{StreamError, StreamResult};
pub use source::{DataKind, FormatKind, ImageMetadata};
pub use stream::{FrameBuffer, FrameReader, ReadPolicy, ReaderConfig, Requisition, RoiSpec};
