//! TIFF tag utilities
//!
//! Utilities for working with TIFF tags and their values.

use std::io::Cursor;
use byteorder::ReadBytesExt;

use crate::errors::{StreamError, StreamResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{compression, field_types, tags};
use crate::tiff::ifd::IFDEntry;

/// Reads an array of tag values based on the field type
///
/// # Arguments
/// * `reader` - The seekable reader, positioned at the first value
/// * `entry` - The IFD entry with tag information
/// * `handler` - The byte order handler
/// * `values` - The vector to store values in
pub fn read_tag_value_array(
    reader: &mut dyn SeekableReader,
    entry: &IFDEntry,
    handler: &dyn ByteOrderHandler,
    values: &mut Vec<u64>
) -> StreamResult<()> {
    for _ in 0..entry.count {
        let value = match entry.field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => reader.read_u8()? as u64,
            field_types::SHORT | field_types::SSHORT => handler.read_u16(reader)? as u64,
            field_types::LONG | field_types::SLONG => handler.read_u32(reader)? as u64,
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => handler.read_u64(reader)?,
            _ => return Err(StreamError::UnsupportedFieldType(entry.field_type)),
        };

        values.push(value);
    }

    Ok(())
}

/// Decodes the values stored directly inside an entry's value field
///
/// Returns an empty vector for field types that cannot hold integer values.
pub fn decode_inline_values(entry: &IFDEntry, big_endian: bool) -> Vec<u64> {
    let handler = ByteOrder::from_big_endian(big_endian).create_handler();
    let mut cursor = Cursor::new(entry.raw_value);
    let mut values = Vec::with_capacity(entry.count as usize);

    match read_tag_value_array(&mut cursor, entry, handler.as_ref(), &mut values) {
        Ok(()) => values,
        Err(_) => Vec::new(),
    }
}

/// Determines if a tag's value is stored inline or at an offset
///
/// # Arguments
/// * `entry` - The IFD entry to check
/// * `is_big_tiff` - Whether the file is BigTIFF format
pub fn is_value_inline(entry: &IFDEntry, is_big_tiff: bool) -> bool {
    let size_per_value = match entry.field_type {
        field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::ASCII => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE |
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1, // Default for unknown types
    };

    let total_size = size_per_value * entry.count;

    if is_big_tiff {
        total_size <= 8 // In BigTIFF, 8 bytes are available for inline storage
    } else {
        total_size <= 4 // In standard TIFF, 4 bytes are available for inline storage
    }
}

/// Get the name of a TIFF tag
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::PREDICTOR => "Predictor",
        tags::TILE_WIDTH => "TileWidth",
        tags::TILE_OFFSETS => "TileOffsets",
        tags::SAMPLE_FORMAT => "SampleFormat",
        _ => "Unknown",
    }
}

/// Get the name of a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
pub fn get_compression_name(compression_code: u64) -> &'static str {
    match u16::try_from(compression_code).unwrap_or(0) {
        compression::NONE => "None",
        compression::LZW => "LZW",
        compression::JPEG => "JPEG",
        compression::DEFLATE => "Adobe Deflate",
        compression::PACKBITS => "PackBits",
        compression::DEFLATE_LEGACY => "Deflate",
        compression::ZSTD => "Zstandard",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_short_big_endian() {
        // SHORT 0x0010 stored left-justified in a big-endian value field
        let entry = IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 1, 0x0010_0000,
                                  [0x00, 0x10, 0x00, 0x00, 0, 0, 0, 0]);
        assert_eq!(decode_inline_values(&entry, true), vec![16]);
    }

    #[test]
    fn test_inline_short_pair_little_endian() {
        let entry = IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 2, 0,
                                  [8, 0, 16, 0, 0, 0, 0, 0]);
        assert!(is_value_inline(&entry, false));
        assert_eq!(decode_inline_values(&entry, false), vec![8, 16]);
    }

    #[test]
    fn test_three_shorts_are_not_inline_in_classic_tiff() {
        let entry = IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 3, 200, [0; 8]);
        assert!(!is_value_inline(&entry, false));
        assert!(is_value_inline(&entry, true));
    }
}
