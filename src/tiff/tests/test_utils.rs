use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::tiff::constants::{field_types, tags};

/// Builds a little-endian classic TIFF with one uncompressed strip
///
/// `entries` are `(tag, field type, value)` triples written inline; the
/// StripOffsets entry is added and pointed at `data`, which follows the IFD.
pub fn build_classic_le(entries: &[(u16, u16, u32)], data: &[u8]) -> Vec<u8> {
    let mut all: Vec<(u16, u16, u32)> = entries.to_vec();
    let entry_count = all.len() + 1;
    let data_offset = 8 + 2 + entry_count * 12 + 4;
    all.push((tags::STRIP_OFFSETS, field_types::LONG, data_offset as u32));
    all.sort_by_key(|e| e.0);

    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    buffer.write_u16::<LittleEndian>(entry_count as u16).unwrap();
    for (tag, field_type, value) in all {
        buffer.write_u16::<LittleEndian>(tag).unwrap();
        buffer.write_u16::<LittleEndian>(field_type).unwrap();
        buffer.write_u32::<LittleEndian>(1).unwrap();
        if field_type == field_types::SHORT {
            buffer.write_u16::<LittleEndian>(value as u16).unwrap();
            buffer.write_u16::<LittleEndian>(0).unwrap();
        } else {
            buffer.write_u32::<LittleEndian>(value).unwrap();
        }
    }
    buffer.write_u32::<LittleEndian>(0).unwrap();      // No next IFD

    std::assert_eq!(buffer.len(), data_offset);
    buffer.extend_from_slice(data);
    buffer
}

/// A 4x2 8-bit grayscale image in a single strip
pub fn create_test_tiff_buffer() -> Cursor<Vec<u8>> {
    let data = [1u8, 2, 3, 4, 10, 20, 30, 40];
    Cursor::new(build_classic_le(&[
        (tags::IMAGE_WIDTH, field_types::LONG, 4),
        (tags::IMAGE_LENGTH, field_types::LONG, 2),
        (tags::BITS_PER_SAMPLE, field_types::SHORT, 8),
        (tags::COMPRESSION, field_types::SHORT, 1),
        (tags::ROWS_PER_STRIP, field_types::LONG, 2),
        (tags::STRIP_BYTE_COUNTS, field_types::LONG, 8),
    ], &data))
}

/// A 2x1 8-bit RGB image whose BitsPerSample array lives outside the IFD
pub fn create_test_rgb_buffer() -> Cursor<Vec<u8>> {
    const ENTRIES: usize = 8;
    let ifd_end = 8 + 2 + ENTRIES * 12 + 4;
    let bits_offset = ifd_end as u32;
    let data_offset = bits_offset + 6;

    // (tag, type, count, value or offset)
    let entries: [(u16, u16, u32, u32); ENTRIES] = [
        (tags::IMAGE_WIDTH, field_types::LONG, 1, 2),
        (tags::IMAGE_LENGTH, field_types::LONG, 1, 1),
        (tags::BITS_PER_SAMPLE, field_types::SHORT, 3, bits_offset),
        (tags::COMPRESSION, field_types::SHORT, 1, 1),
        (tags::STRIP_OFFSETS, field_types::LONG, 1, data_offset),
        (tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1, 3),
        (tags::ROWS_PER_STRIP, field_types::LONG, 1, 1),
        (tags::STRIP_BYTE_COUNTS, field_types::LONG, 1, 6),
    ];

    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();

    buffer.write_u16::<LittleEndian>(ENTRIES as u16).unwrap();
    for (tag, field_type, count, value) in entries {
        buffer.write_u16::<LittleEndian>(tag).unwrap();
        buffer.write_u16::<LittleEndian>(field_type).unwrap();
        buffer.write_u32::<LittleEndian>(count).unwrap();
        if field_type == field_types::SHORT && count == 1 {
            buffer.write_u16::<LittleEndian>(value as u16).unwrap();
            buffer.write_u16::<LittleEndian>(0).unwrap();
        } else {
            buffer.write_u32::<LittleEndian>(value).unwrap();
        }
    }
    buffer.write_u32::<LittleEndian>(0).unwrap();
    std::assert_eq!(buffer.len(), ifd_end);

    for _ in 0..3 {
        buffer.write_u16::<LittleEndian>(8).unwrap();
    }
    buffer.extend_from_slice(&[10, 20, 30, 40, 50, 60]);
    Cursor::new(buffer)
}

/// A 3x2 16-bit big-endian BigTIFF holding the values 0x0102, 0x0304, ...
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let entries: [(u16, u16, u64); 7] = [
        (tags::IMAGE_WIDTH, field_types::LONG, 3),
        (tags::IMAGE_LENGTH, field_types::LONG, 2),
        (tags::BITS_PER_SAMPLE, field_types::SHORT, 16),
        (tags::COMPRESSION, field_types::SHORT, 1),
        (tags::STRIP_OFFSETS, field_types::LONG8, 16 + 8 + 7 * 20 + 8),
        (tags::ROWS_PER_STRIP, field_types::LONG, 2),
        (tags::STRIP_BYTE_COUNTS, field_types::LONG8, 12),
    ];

    let mut buffer = Vec::new();
    buffer.write_u16::<BigEndian>(0x4D4D).unwrap();    // MM for big-endian
    buffer.write_u16::<BigEndian>(43).unwrap();        // BigTIFF version
    buffer.write_u16::<BigEndian>(8).unwrap();         // Offset size
    buffer.write_u16::<BigEndian>(0).unwrap();         // Reserved
    buffer.write_u64::<BigEndian>(16).unwrap();        // IFD offset

    buffer.write_u64::<BigEndian>(entries.len() as u64).unwrap();
    for (tag, field_type, value) in entries {
        buffer.write_u16::<BigEndian>(tag).unwrap();
        buffer.write_u16::<BigEndian>(field_type).unwrap();
        buffer.write_u64::<BigEndian>(1).unwrap();
        match field_type {
            field_types::SHORT => {
                buffer.write_u16::<BigEndian>(value as u16).unwrap();
                buffer.extend_from_slice(&[0; 6]);
            }
            field_types::LONG => {
                buffer.write_u32::<BigEndian>(value as u32).unwrap();
                buffer.extend_from_slice(&[0; 4]);
            }
            _ => buffer.write_u64::<BigEndian>(value).unwrap(),
        }
    }
    buffer.write_u64::<BigEndian>(0).unwrap();         // No next IFD

    for value in [0x0102u16, 0x0304, 0x0506, 0x0708, 0x090A, 0x0B0C] {
        buffer.write_u16::<BigEndian>(value).unwrap();
    }

    Cursor::new(buffer)
}

/// Row-major ramp of `width * height` u16 samples in host byte order
pub fn ramp_u16(width: usize, height: usize) -> Vec<u8> {
    (0..width * height)
        .flat_map(|i| ((i * 7 % 65536) as u16).to_ne_bytes())
        .collect()
}

/// Row-major ramp of u32 samples in host byte order
pub fn ramp_u32(width: usize, height: usize) -> Vec<u8> {
    (0..width * height)
        .flat_map(|i| (i as u32 * 100_003).to_ne_bytes())
        .collect()
}
