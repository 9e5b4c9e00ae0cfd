//! TIFF validation utilities
//!
//! Validation functions that keep the reader from following offsets
//! outside of a potentially malformed file.

use log::{debug, error};

use crate::errors::{StreamError, StreamResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;

/// Validates an IFD offset to ensure it lies inside the file
pub fn validate_ifd_offset(offset: u64, file_size: u64) -> StreamResult<()> {
    if offset >= file_size || offset < 8 {
        return Err(StreamError::GenericError(format!(
            "Invalid IFD offset: {} (file size: {})",
            offset, file_size
        )));
    }

    Ok(())
}

/// Validates the BigTIFF header
///
/// After the version number (43) BigTIFF stores the offset size, which must
/// be 8, followed by a reserved zero word.
pub fn validate_bigtiff_header(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler
) -> StreamResult<()> {
    let offset_size = byte_order_handler.read_u16(reader)?;
    let zeros = byte_order_handler.read_u16(reader)?;

    debug!("BigTIFF offset size: {}, reserved: {}", offset_size, zeros);

    if offset_size != header::BIGTIFF_OFFSET_SIZE || zeros != 0 {
        error!("Invalid BigTIFF header: offset_size={}, zeros={}", offset_size, zeros);
        return Err(StreamError::InvalidBigTIFFHeader);
    }

    Ok(())
}

/// Validates that a strip lies inside the file
pub fn validate_strip_range(offset: u64, byte_count: u64, file_size: u64) -> StreamResult<()> {
    match offset.checked_add(byte_count) {
        Some(end) if end <= file_size => Ok(()),
        _ => Err(StreamError::TruncatedRead {
            expected: byte_count as usize,
            actual: file_size.saturating_sub(offset) as usize,
        }),
    }
}
