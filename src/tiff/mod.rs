//! TIFF file format support
//!
//! This module reads the header and first directory of classic and BigTIFF
//! files and serves their strips one scanline at a time.

pub mod constants;
pub mod ifd;
pub mod reader;
pub mod source;
pub(crate) mod validation;
pub mod writer;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use source::{StripLayout, TiffSource};
pub use writer::StripWriter;

