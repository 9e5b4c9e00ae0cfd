//! Scanline access to stripped TIFF files
//!
//! Stripped TIFFs organize image data in horizontal strips across the entire
//! width of the image. The scanline reader decodes the strip containing a
//! requested row once, keeps it cached for the following rows, and hands out
//! single rows in host byte order.

use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::errors::{StreamError, StreamResult};
use crate::io::byte_order::{self, ByteOrder};
use crate::io::seekable::{self, SeekableReader};
use crate::source::{DataKind, ImageMetadata};
use crate::stream::roi::RowSelection;
use crate::tiff::constants::{planar_config, predictor, tags};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::validation;

/// Strip organisation of a TIFF image
#[derive(Debug, Clone)]
pub struct StripLayout {
    /// Rows in every strip but possibly the last
    pub rows_per_strip: usize,
    /// File offsets of the strips
    pub offsets: Vec<u64>,
    /// Stored (possibly compressed) size of each strip
    pub byte_counts: Vec<u64>,
    /// Compression code
    pub compression: u64,
    /// Predictor code
    pub predictor: u16,
}

/// An open TIFF file positioned for scanline reads
pub struct TiffSource {
    /// Underlying file or in-memory stream
    reader: Box<dyn SeekableReader>,
    /// Layout and numeric kind of the image
    metadata: ImageMetadata,
    /// Strip organisation
    strips: StripLayout,
    /// Decoder for the strip compression
    decoder: Box<dyn CompressionHandler>,
    /// Byte order of the stored samples
    byte_order: ByteOrder,
    /// Total size of the stream
    file_size: u64,
    /// Last decoded strip, kept for consecutive scanlines
    cached_strip: Option<(usize, Vec<u8>)>,
}

impl TiffSource {
    /// Opens a TIFF file and reads the metadata of its first image
    ///
    /// `previous` carries the metadata of the image read before; depths
    /// other than 16 bit keep its numeric kind.
    pub fn open(path: &Path, previous: &ImageMetadata) -> StreamResult<Self> {
        info!("Opening TIFF file: {}", path.display());
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(1024 * 1024, file); // 1MB buffer
        Self::from_reader(Box::new(reader), previous)
    }

    /// Builds a source over any seekable stream holding a TIFF file
    pub fn from_reader(mut reader: Box<dyn SeekableReader>, previous: &ImageMetadata) -> StreamResult<Self> {
        let mut tiff_reader = TiffReader::new();
        let ifd = tiff_reader.read(reader.as_mut())?;
        debug!("{}", ifd);
        let byte_order = tiff_reader.byte_order().unwrap_or(ByteOrder::LittleEndian);

        let metadata = Self::read_metadata(&tiff_reader, reader.as_mut(), &ifd, byte_order, previous.data_kind)?;
        let strips = Self::read_strip_layout(&tiff_reader, reader.as_mut(), &ifd, &metadata)?;
        let decoder = CompressionFactory::create_handler(strips.compression)?;
        let file_size = seekable::stream_len(reader.as_mut())?;

        debug!("TIFF image {} with {} strips of {} rows ({})",
               metadata, strips.offsets.len(), strips.rows_per_strip, decoder.name());

        Ok(TiffSource {
            reader,
            metadata,
            strips,
            decoder,
            byte_order,
            file_size,
            cached_strip: None,
        })
    }

    /// Extracts dimensions, depth and sample count from the directory
    fn read_metadata(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        byte_order: ByteOrder,
        inherited_kind: DataKind,
    ) -> StreamResult<ImageMetadata> {
        let (width, height) = ifd.get_dimensions().ok_or(StreamError::MissingDimensions)?;
        let bits_per_sample = Self::first_value(tiff_reader, reader, ifd, tags::BITS_PER_SAMPLE, 1)? as u16;
        let samples_per_pixel = Self::first_value(tiff_reader, reader, ifd, tags::SAMPLES_PER_PIXEL, 1)? as u16;

        let data_kind = if bits_per_sample == 16 {
            DataKind::U16
        } else {
            inherited_kind
        };

        Ok(ImageMetadata {
            width: width as usize,
            height: height as usize,
            bits_per_sample,
            samples_per_pixel,
            data_kind,
            big_endian: byte_order == ByteOrder::BigEndian,
        })
    }

    /// First value of a tag, wherever it is stored, or `default` when absent
    ///
    /// Per-sample tags such as BitsPerSample hold one value per channel and
    /// spill out of the entry once there are more than fit inline.
    fn first_value(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        tag: u16,
        default: u64,
    ) -> StreamResult<u64> {
        if !ifd.has_tag(tag) {
            return Ok(default);
        }
        Ok(tiff_reader.read_tag_values(reader, ifd, tag)?.first().copied().unwrap_or(default))
    }

    /// Reads strip offsets and rejects layouts the scanline reader cannot serve
    fn read_strip_layout(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        metadata: &ImageMetadata,
    ) -> StreamResult<StripLayout> {
        if ifd.has_tag(tags::TILE_WIDTH) || ifd.has_tag(tags::TILE_OFFSETS) {
            return Err(StreamError::UnsupportedLayout("tiled images cannot be read by scanline".to_string()));
        }

        let planar = ifd.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(planar_config::CHUNKY as u64);
        if planar != planar_config::CHUNKY as u64 && metadata.samples_per_pixel > 1 {
            return Err(StreamError::UnsupportedLayout("separate sample planes".to_string()));
        }

        let predictor = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64) as u16;
        if predictor != predictor::NONE && predictor != predictor::HORIZONTAL_DIFFERENCING {
            return Err(StreamError::UnsupportedLayout(format!("predictor {}", predictor)));
        }

        let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP)
            .map(|rows| rows as usize)
            .unwrap_or(metadata.height)
            .clamp(1, metadata.height.max(1));

        let offsets = tiff_reader.read_tag_values(reader, ifd, tags::STRIP_OFFSETS)?;
        let byte_counts = tiff_reader.read_tag_values(reader, ifd, tags::STRIP_BYTE_COUNTS)?;
        if offsets.len() != byte_counts.len() {
            return Err(StreamError::GenericError(format!(
                "{} strip offsets but {} strip byte counts", offsets.len(), byte_counts.len())));
        }

        Ok(StripLayout {
            rows_per_strip,
            offsets,
            byte_counts,
            compression: ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1),
            predictor,
        })
    }

    /// Strip organisation of the open image
    pub fn strips(&self) -> &StripLayout {
        &self.strips
    }

    /// Reads and decodes one strip into host byte order
    fn decode_strip(&mut self, strip_index: usize) -> StreamResult<Vec<u8>> {
        let offset = self.strips.offsets[strip_index];
        let byte_count = self.strips.byte_counts[strip_index];
        validation::validate_strip_range(offset, byte_count, self.file_size)?;

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut stored = vec![0u8; byte_count as usize];
        let read = seekable::read_fully(self.reader.as_mut(), &mut stored)?;
        if read < stored.len() {
            return Err(StreamError::TruncatedRead { expected: stored.len(), actual: read });
        }

        let mut strip = self.decoder.decompress(&stored)?;
        let bytes_per_sample = self.metadata.bytes_per_sample();
        if self.metadata.bits_per_sample % 8 == 0 {
            byte_order::to_host_order(&mut strip, bytes_per_sample, self.byte_order);
        }

        if self.strips.predictor == predictor::HORIZONTAL_DIFFERENCING {
            undo_horizontal_predictor(&mut strip, &self.metadata);
        }

        debug!("Decoded strip {} ({} -> {} bytes)", strip_index, byte_count, strip.len());
        Ok(strip)
    }

    /// Reads source row `row` into `out`, which must hold one full row
    pub fn read_scanline(&mut self, row: usize, out: &mut [u8]) -> StreamResult<()> {
        if row >= self.metadata.height {
            return Err(StreamError::GenericError(format!(
                "Row {} outside image of height {}", row, self.metadata.height)));
        }

        let row_bytes = self.metadata.row_bytes();
        let strip_index = row / self.strips.rows_per_strip;
        if strip_index >= self.strips.offsets.len() {
            return Err(StreamError::TruncatedRead {
                expected: strip_index + 1,
                actual: self.strips.offsets.len(),
            });
        }

        let cached = matches!(&self.cached_strip, Some((index, _)) if *index == strip_index);
        if !cached {
            let strip = self.decode_strip(strip_index)?;
            self.cached_strip = Some((strip_index, strip));
        }

        let strip = match &self.cached_strip {
            Some((_, data)) => data,
            None => return Err(StreamError::GenericError("Strip cache empty".to_string())),
        };

        let start = (row % self.strips.rows_per_strip) * row_bytes;
        let available = strip.len().saturating_sub(start).min(row_bytes);
        out[..available].copy_from_slice(&strip[start..start + available]);

        if available < row_bytes {
            return Err(StreamError::TruncatedRead { expected: row_bytes, actual: available });
        }

        Ok(())
    }

    /// Reads the selected rows one scanline at a time into consecutive output rows
    pub fn read_rows(&mut self, rows: &RowSelection, out: &mut [u8]) -> StreamResult<()> {
        let row_bytes = self.metadata.row_bytes();

        for (index, row) in rows.rows().enumerate() {
            let target = &mut out[index * row_bytes..(index + 1) * row_bytes];
            self.read_scanline(row, target)?;
        }

        Ok(())
    }

    /// Metadata of the open image
    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }
}

/// Reverses horizontal differencing on host-order samples
///
/// Each sample becomes the sum of itself and the same channel of the pixel
/// to its left, row by row.
fn undo_horizontal_predictor(data: &mut [u8], metadata: &ImageMetadata) {
    let row_bytes = metadata.row_bytes();
    let channels = metadata.samples_per_pixel as usize;
    if row_bytes == 0 {
        return;
    }

    for row in data.chunks_mut(row_bytes) {
        match metadata.bits_per_sample {
            8 => {
                for i in channels..row.len() {
                    row[i] = row[i].wrapping_add(row[i - channels]);
                }
            }
            16 => {
                let stride = channels * 2;
                for i in (stride..row.len().saturating_sub(1)).step_by(2) {
                    let prev = u16::from_ne_bytes([row[i - stride], row[i - stride + 1]]);
                    let cur = u16::from_ne_bytes([row[i], row[i + 1]]);
                    row[i..i + 2].copy_from_slice(&cur.wrapping_add(prev).to_ne_bytes());
                }
            }
            32 => {
                let stride = channels * 4;
                for i in (stride..row.len().saturating_sub(3)).step_by(4) {
                    let prev = u32::from_ne_bytes([row[i - stride], row[i - stride + 1],
                                                   row[i - stride + 2], row[i - stride + 3]]);
                    let cur = u32::from_ne_bytes([row[i], row[i + 1], row[i + 2], row[i + 3]]);
                    row[i..i + 4].copy_from_slice(&cur.wrapping_add(prev).to_ne_bytes());
                }
            }
            _ => {}
        }
    }
}
