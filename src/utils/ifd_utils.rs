//! IFD utilities
//!
//! Utilities for working with Image File Directories (IFDs) in TIFF files.

use crate::errors::StreamResult;
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;

/// Reads an IFD offset (the header's first offset or a chain link)
///
/// Classic TIFF stores offsets as 32-bit values, BigTIFF as 64-bit.
pub fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> StreamResult<u64> {
    if is_big_tiff {
        Ok(byte_order_handler.read_u64(reader)?)
    } else {
        Ok(byte_order_handler.read_u32(reader)? as u64)
    }
}

/// Reads the number of entries at the start of an IFD
pub fn read_entry_count(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> StreamResult<u64> {
    if is_big_tiff {
        Ok(byte_order_handler.read_u64(reader)?)
    } else {
        Ok(byte_order_handler.read_u16(reader)? as u64)
    }
}
