//! Byte order handling for image files
//!
//! This module implements the Strategy pattern for handling different
//! byte orders (little-endian vs big-endian) when reading binary headers,
//! and the in-place sample swapping used to bring raw image rows into
//! host order.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::errors::{StreamError, StreamResult};
use crate::io::seekable::SeekableReader;

/// Represents the byte order of a file or of sample data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from a TIFF header marker
    pub fn detect(reader: &mut dyn SeekableReader) -> StreamResult<Self> {
        let byte_order = reader.read_u16::<LittleEndian>()?;
        match byte_order {
            0x4949 => Ok(ByteOrder::LittleEndian), // "II" (Intel)
            0x4D4D => Ok(ByteOrder::BigEndian),    // "MM" (Motorola)
            _ => Err(StreamError::InvalidByteOrder(byte_order)),
        }
    }

    /// Byte order of the machine we are running on
    pub fn host() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    /// Maps a "big endian" flag as found in image metadata
    pub fn from_big_endian(big_endian: bool) -> Self {
        if big_endian {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }

    /// Whether data in this order must be swapped to be read natively
    pub fn differs_from_host(&self) -> bool {
        *self != ByteOrder::host()
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    /// Read a u16 value
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    /// Read a u32 value
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    /// Read a u64 value
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    /// The byte order this handler decodes
    fn order(&self) -> ByteOrder;
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn order(&self) -> ByteOrder {
        ByteOrder::LittleEndian
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn order(&self) -> ByteOrder {
        ByteOrder::BigEndian
    }
}

/// Reverses the bytes of every sample in `data`
///
/// Only 2, 4 and 8 byte samples are swapped; single-byte samples have no
/// byte order. A trailing partial sample is left untouched.
pub fn swap_samples_in_place(data: &mut [u8], bytes_per_sample: usize) {
    if bytes_per_sample < 2 {
        return;
    }

    for sample in data.chunks_exact_mut(bytes_per_sample) {
        sample.reverse();
    }
}

/// Converts samples stored in `order` into host byte order
///
/// Returns whether a swap took place.
pub fn to_host_order(data: &mut [u8], bytes_per_sample: usize, order: ByteOrder) -> bool {
    if !order.differs_from_host() || bytes_per_sample < 2 {
        return false;
    }

    swap_samples_in_place(data, bytes_per_sample);
    true
}
