//! TIFF directory reader
//!
//! This module parses the TIFF/BigTIFF header and the first Image File
//! Directory, using the Strategy pattern to handle different byte orders.

use log::debug;
use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::errors::{StreamError, StreamResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::{self, SeekableReader};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::tag_utils;

/// Reader for TIFF and BigTIFF directory structures
pub struct TiffReader {
    /// Current byte order handler
    pub(crate) byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    pub(crate) is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            is_big_tiff: false,
        }
    }

    /// Returns the byte order handler, with proper error handling for None case
    fn get_byte_order_handler_unwrapped(&self) -> StreamResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| StreamError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Reads the header and the first IFD from the given reader
    ///
    /// 1. Detect byte order (little/big endian)
    /// 2. Check for TIFF or BigTIFF format
    /// 3. Follow the first IFD offset and read its entries
    ///
    /// Only the first directory is read: every file holds a single frame.
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> StreamResult<IFD> {
        reader.seek(SeekFrom::Start(0))?;

        let handler = format_utils::detect_byte_order(reader)?;
        let (is_big_tiff, _) = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        self.is_big_tiff = is_big_tiff;
        self.byte_order_handler = Some(handler);

        let handler = self.get_byte_order_handler_unwrapped()?;
        let first_ifd_offset = ifd_utils::read_ifd_offset(reader, self.is_big_tiff, handler)?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = seekable::stream_len(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        self.read_ifd(reader, first_ifd_offset, 0)
    }

    /// Reads an IFD at the given offset
    ///
    /// An IFD consists of a count followed by a series of entries, each
    /// describing an aspect of the image (dimensions, compression, etc.)
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> StreamResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let handler = self.get_byte_order_handler_unwrapped()?;
        let entry_count = ifd_utils::read_entry_count(reader, self.is_big_tiff, handler)?;
        debug!("IFD #{} at offset {} has {} entries", number, offset, entry_count);

        let mut ifd = IFD::new(number, offset, self.is_big_tiff, handler.order() == ByteOrder::BigEndian);

        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            ifd.add_entry(entry);
        }

        Ok(ifd)
    }

    /// Reads a single IFD entry
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> StreamResult<IFDEntry> {
        let handler = self.get_byte_order_handler_unwrapped()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let field_size = if self.is_big_tiff { 8 } else { 4 };
        let mut raw_value = [0u8; 8];
        reader.read_exact(&mut raw_value[..field_size])?;

        let mut raw_cursor = Cursor::new(raw_value);
        let value_offset = ifd_utils::read_ifd_offset(&mut raw_cursor, self.is_big_tiff, handler)?;

        Ok(IFDEntry::new(tag, field_type, count, value_offset, raw_value))
    }

    /// Reads a tag's values as a vector of u64
    ///
    /// Inline values are decoded from the entry itself; larger arrays are
    /// read from the offset the entry points at.
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> StreamResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(StreamError::TagNotFound(tag))?;

        if entry.is_value_inline(self.is_big_tiff) {
            return Ok(tag_utils::decode_inline_values(entry, ifd.big_endian));
        }

        let mut values = Vec::with_capacity(entry.count as usize);
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let handler = self.get_byte_order_handler_unwrapped()?;
        tag_utils::read_tag_value_array(reader, entry, handler, &mut values)?;

        Ok(values)
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Byte order of the file read last, if any
    pub fn byte_order(&self) -> Option<ByteOrder> {
        self.byte_order_handler.as_ref().map(|h| h.order())
    }
}
