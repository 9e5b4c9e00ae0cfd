//! Stripped single-image TIFF writer
//!
//! Writes grayscale frames back to disk in the layout the scanline reader
//! understands: strips first, then the out-of-line strip tables, then a
//! single IFD whose offset is patched into the header.

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::compression::CompressionFactory;
use crate::errors::{StreamError, StreamResult};
use crate::io::byte_order::{self, ByteOrder};
use crate::source::DataKind;
use crate::tiff::constants::{compression, field_types, header, predictor, sample_format, tags};

/// One directory entry waiting to be laid out
struct PendingEntry {
    tag: u16,
    field_type: u16,
    values: Vec<u64>,
}

/// Writer for single-image stripped TIFF files
#[derive(Debug, Clone, Copy)]
pub struct StripWriter {
    big_endian: bool,
    big_tiff: bool,
    compression: u16,
    predictor: u16,
    rows_per_strip: usize,
}

impl Default for StripWriter {
    fn default() -> Self {
        StripWriter {
            big_endian: false,
            big_tiff: false,
            compression: compression::NONE,
            predictor: predictor::NONE,
            rows_per_strip: 16,
        }
    }
}

impl StripWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn big_endian(mut self, big_endian: bool) -> Self {
        self.big_endian = big_endian;
        self
    }

    pub fn big_tiff(mut self, big_tiff: bool) -> Self {
        self.big_tiff = big_tiff;
        self
    }

    pub fn compression(mut self, code: u16) -> Self {
        self.compression = code;
        self
    }

    pub fn predictor(mut self, predictor: u16) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn rows_per_strip(mut self, rows: usize) -> Self {
        self.rows_per_strip = rows.max(1);
        self
    }

    /// Encodes `samples` (host byte order, row-major) as a TIFF file
    pub fn encode(&self, width: usize, height: usize, kind: DataKind, samples: &[u8]) -> StreamResult<Vec<u8>> {
        let bytes_per_sample = kind.bytes_per_sample();
        let row_bytes = width * bytes_per_sample;
        if samples.len() < row_bytes * height {
            return Err(StreamError::BufferTooSmall { required: row_bytes * height, actual: samples.len() });
        }

        let encoder = CompressionFactory::create_handler(self.compression as u64)?;
        let order = ByteOrder::from_big_endian(self.big_endian);

        let mut out = Vec::new();
        self.write_header(&mut out)?;

        let mut strip_offsets = Vec::new();
        let mut strip_counts = Vec::new();
        for first_row in (0..height).step_by(self.rows_per_strip) {
            let rows = self.rows_per_strip.min(height - first_row);
            let mut strip = samples[first_row * row_bytes..(first_row + rows) * row_bytes].to_vec();

            if self.predictor == predictor::HORIZONTAL_DIFFERENCING {
                apply_horizontal_predictor(&mut strip, row_bytes, bytes_per_sample);
            }
            if order.differs_from_host() {
                byte_order::swap_samples_in_place(&mut strip, bytes_per_sample);
            }

            let stored = encoder.compress(&strip)?;
            strip_offsets.push(out.len() as u64);
            strip_counts.push(stored.len() as u64);
            out.extend_from_slice(&stored);
        }

        let offset_type = if self.big_tiff { field_types::LONG8 } else { field_types::LONG };
        let mut entries = vec![
            PendingEntry { tag: tags::IMAGE_WIDTH, field_type: field_types::LONG, values: vec![width as u64] },
            PendingEntry { tag: tags::IMAGE_LENGTH, field_type: field_types::LONG, values: vec![height as u64] },
            PendingEntry { tag: tags::BITS_PER_SAMPLE, field_type: field_types::SHORT, values: vec![bytes_per_sample as u64 * 8] },
            PendingEntry { tag: tags::COMPRESSION, field_type: field_types::SHORT, values: vec![self.compression as u64] },
            PendingEntry { tag: tags::PHOTOMETRIC_INTERPRETATION, field_type: field_types::SHORT, values: vec![1] },
            PendingEntry { tag: tags::STRIP_OFFSETS, field_type: offset_type, values: strip_offsets },
            PendingEntry { tag: tags::SAMPLES_PER_PIXEL, field_type: field_types::SHORT, values: vec![1] },
            PendingEntry { tag: tags::ROWS_PER_STRIP, field_type: field_types::LONG, values: vec![self.rows_per_strip as u64] },
            PendingEntry { tag: tags::STRIP_BYTE_COUNTS, field_type: offset_type, values: strip_counts },
        ];
        if self.predictor != predictor::NONE {
            entries.push(PendingEntry { tag: tags::PREDICTOR, field_type: field_types::SHORT, values: vec![self.predictor as u64] });
        }
        entries.push(PendingEntry {
            tag: tags::SAMPLE_FORMAT,
            field_type: field_types::SHORT,
            values: vec![sample_format_of(kind) as u64],
        });

        self.write_directory(&mut out, &entries)?;
        debug!("Encoded {}x{} {} TIFF, {} bytes", width, height, kind, out.len());
        Ok(out)
    }

    /// Encodes a frame and writes it to `path`
    pub fn write_file(&self, path: &Path, width: usize, height: usize, kind: DataKind, samples: &[u8]) -> StreamResult<()> {
        let bytes = self.encode(width, height, kind, samples)?;
        info!("Writing TIFF to {}", path.display());

        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Byte order marker, version and a zeroed first-IFD offset
    fn write_header(&self, out: &mut Vec<u8>) -> StreamResult<()> {
        out.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        if self.big_tiff {
            self.put_u16(out, header::BIG_TIFF_VERSION)?;
            self.put_u16(out, header::BIGTIFF_OFFSET_SIZE)?;
            self.put_u16(out, 0)?;
            self.put_u64(out, 0)?;
        } else {
            self.put_u16(out, header::TIFF_VERSION)?;
            self.put_u32(out, 0)?;
        }
        Ok(())
    }

    /// Writes out-of-line arrays, then the IFD, and links it from the header
    fn write_directory(&self, out: &mut Vec<u8>, entries: &[PendingEntry]) -> StreamResult<()> {
        let inline_bytes = if self.big_tiff { 8 } else { 4 };

        let mut array_offsets = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.values.len() * field_size(entry.field_type) <= inline_bytes {
                array_offsets.push(None);
                continue;
            }
            if out.len() % 2 == 1 {
                out.push(0);
            }
            array_offsets.push(Some(out.len() as u64));
            for &value in &entry.values {
                self.put_value(out, entry.field_type, value)?;
            }
        }

        if out.len() % 2 == 1 {
            out.push(0);
        }
        let ifd_offset = out.len() as u64;

        if self.big_tiff {
            self.put_u64(out, entries.len() as u64)?;
        } else {
            self.put_u16(out, entries.len() as u16)?;
        }

        for (entry, array_offset) in entries.iter().zip(&array_offsets) {
            self.put_u16(out, entry.tag)?;
            self.put_u16(out, entry.field_type)?;
            if self.big_tiff {
                self.put_u64(out, entry.values.len() as u64)?;
            } else {
                self.put_u32(out, entry.values.len() as u32)?;
            }

            let field_start = out.len();
            match array_offset {
                Some(offset) if self.big_tiff => self.put_u64(out, *offset)?,
                Some(offset) => self.put_u32(out, *offset as u32)?,
                None => {
                    for &value in &entry.values {
                        self.put_value(out, entry.field_type, value)?;
                    }
                }
            }
            out.resize(field_start + inline_bytes, 0);
        }

        if self.big_tiff {
            self.put_u64(out, 0)?;
            let patched = if self.big_endian { ifd_offset.to_be_bytes() } else { ifd_offset.to_le_bytes() };
            out[8..16].copy_from_slice(&patched);
        } else {
            self.put_u32(out, 0)?;
            let offset = ifd_offset as u32;
            let patched = if self.big_endian { offset.to_be_bytes() } else { offset.to_le_bytes() };
            out[4..8].copy_from_slice(&patched);
        }
        Ok(())
    }

    fn put_value(&self, out: &mut Vec<u8>, field_type: u16, value: u64) -> StreamResult<()> {
        match field_type {
            field_types::SHORT => self.put_u16(out, value as u16),
            field_types::LONG => self.put_u32(out, value as u32),
            field_types::LONG8 => self.put_u64(out, value),
            other => Err(StreamError::UnsupportedFieldType(other)),
        }
    }

    fn put_u16(&self, out: &mut Vec<u8>, value: u16) -> StreamResult<()> {
        if self.big_endian {
            out.write_u16::<BigEndian>(value)?;
        } else {
            out.write_u16::<LittleEndian>(value)?;
        }
        Ok(())
    }

    fn put_u32(&self, out: &mut Vec<u8>, value: u32) -> StreamResult<()> {
        if self.big_endian {
            out.write_u32::<BigEndian>(value)?;
        } else {
            out.write_u32::<LittleEndian>(value)?;
        }
        Ok(())
    }

    fn put_u64(&self, out: &mut Vec<u8>, value: u64) -> StreamResult<()> {
        if self.big_endian {
            out.write_u64::<BigEndian>(value)?;
        } else {
            out.write_u64::<LittleEndian>(value)?;
        }
        Ok(())
    }
}

fn field_size(field_type: u16) -> usize {
    match field_type {
        field_types::SHORT => 2,
        field_types::LONG => 4,
        _ => 8,
    }
}

fn sample_format_of(kind: DataKind) -> u16 {
    match kind {
        DataKind::U8 | DataKind::U16 | DataKind::U32 => sample_format::UNSIGNED,
        DataKind::I32 => sample_format::SIGNED,
        DataKind::F32 => sample_format::FLOAT,
    }
}

/// Replaces every sample by its difference to the sample on its left
fn apply_horizontal_predictor(data: &mut [u8], row_bytes: usize, bytes_per_sample: usize) {
    if row_bytes == 0 {
        return;
    }

    for row in data.chunks_mut(row_bytes) {
        let samples = row.len() / bytes_per_sample;
        for i in (1..samples).rev() {
            let (cur, prev) = (i * bytes_per_sample, (i - 1) * bytes_per_sample);
            match bytes_per_sample {
                1 => row[cur] = row[cur].wrapping_sub(row[prev]),
                2 => {
                    let a = u16::from_ne_bytes([row[cur], row[cur + 1]]);
                    let b = u16::from_ne_bytes([row[prev], row[prev + 1]]);
                    row[cur..cur + 2].copy_from_slice(&a.wrapping_sub(b).to_ne_bytes());
                }
                4 => {
                    let a = u32::from_ne_bytes([row[cur], row[cur + 1], row[cur + 2], row[cur + 3]]);
                    let b = u32::from_ne_bytes([row[prev], row[prev + 1], row[prev + 2], row[prev + 3]]);
                    row[cur..cur + 4].copy_from_slice(&a.wrapping_sub(b).to_ne_bytes());
                }
                _ => {}
            }
        }
    }
}
