//! Block reads from EDF files
//!
//! An EDF file is a sequence of `header block + raw samples` images. The
//! source keeps track of its position so that, after every read, it sits
//! at the start of the next image's header.

use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::edf::header::{EdfHeader, HEADER_SIZE};
use crate::errors::{StreamError, StreamResult};
use crate::io::byte_order::{self, ByteOrder};
use crate::io::seekable::{self, SeekableReader};
use crate::source::ImageMetadata;
use crate::stream::roi::RowSelection;

/// An open EDF file, possibly holding several concatenated images
pub struct EdfSource {
    /// Underlying file or in-memory stream
    reader: Box<dyn SeekableReader>,
    /// Metadata of the current image
    metadata: ImageMetadata,
    /// Last parsed header
    header: EdfHeader,
    /// Total size of the stream
    file_size: u64,
    /// Current stream position
    position: u64,
    /// Offset of the current image's first sample
    data_start: u64,
}

impl EdfSource {
    /// Opens an EDF file and reads the header of its first image
    pub fn open(path: &Path, previous: &ImageMetadata) -> StreamResult<Self> {
        info!("Opening EDF file: {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(Box::new(BufReader::new(file)), previous)
    }

    /// Builds a source over any seekable stream holding EDF images
    ///
    /// `previous` supplies the values kept when a header omits a key.
    pub fn from_reader(mut reader: Box<dyn SeekableReader>, previous: &ImageMetadata) -> StreamResult<Self> {
        let file_size = seekable::stream_len(reader.as_mut())?;
        reader.seek(SeekFrom::Start(0))?;

        let mut source = EdfSource {
            reader,
            metadata: previous.clone(),
            header: EdfHeader::default(),
            file_size,
            position: 0,
            data_start: 0,
        };
        source.read_header()?;
        Ok(source)
    }

    /// Reads the header block at the current position
    ///
    /// A block shorter than 1024 bytes means the file holds no further
    /// image and is reported as a truncated read.
    pub fn read_header(&mut self) -> StreamResult<()> {
        let mut block = vec![0u8; HEADER_SIZE];
        let read = seekable::read_fully(self.reader.as_mut(), &mut block)?;
        self.position += read as u64;

        if read != HEADER_SIZE {
            return Err(StreamError::TruncatedRead { expected: HEADER_SIZE, actual: read });
        }

        self.header = EdfHeader::parse(&block);
        self.header.apply(&mut self.metadata);
        self.data_start = self.position;

        debug!("EDF image at offset {}: {}", self.data_start, self.metadata);
        Ok(())
    }

    /// Whether another image header follows the current position
    pub fn has_next_image(&self) -> bool {
        self.position < self.file_size
    }

    /// Reads the selected rows of the current image into `out`
    ///
    /// A window without stride is read in one block. With a stride the
    /// rows are read one at a time. Either way the stream is left at the
    /// start of the next image and the filled rows are brought into host
    /// byte order.
    pub fn read_rows(&mut self, rows: &RowSelection, out: &mut [u8]) -> StreamResult<()> {
        let row_bytes = self.metadata.row_bytes();
        let wanted = rows.row_count() * row_bytes;

        let result = self.read_selected(rows, &mut out[..wanted], row_bytes);
        self.skip_image()?;

        let order = ByteOrder::from_big_endian(self.metadata.big_endian);
        if byte_order::to_host_order(&mut out[..wanted], self.metadata.bytes_per_sample(), order) {
            debug!("Swapped {} bytes from {}", wanted, order.name());
        }

        result
    }

    /// Moves to the start of the next image without reading any samples
    pub fn skip_image(&mut self) -> StreamResult<()> {
        self.position = self.data_start + (self.metadata.height * self.metadata.row_bytes()) as u64;
        self.reader.seek(SeekFrom::Start(self.position))?;
        Ok(())
    }

    fn read_selected(&mut self, rows: &RowSelection, out: &mut [u8], row_bytes: usize) -> StreamResult<()> {
        if rows.step == 1 {
            let offset = self.data_start + (rows.start * row_bytes) as u64;
            self.reader.seek(SeekFrom::Start(offset))?;

            let read = seekable::read_fully(self.reader.as_mut(), out)?;
            if read != out.len() {
                return Err(StreamError::TruncatedRead { expected: out.len(), actual: read });
            }
            return Ok(());
        }

        for (index, row) in rows.rows().enumerate() {
            let offset = self.data_start + (row * row_bytes) as u64;
            self.reader.seek(SeekFrom::Start(offset))?;

            let target = &mut out[index * row_bytes..(index + 1) * row_bytes];
            let read = seekable::read_fully(self.reader.as_mut(), target)?;
            if read != row_bytes {
                return Err(StreamError::TruncatedRead { expected: row_bytes, actual: read });
            }
        }

        Ok(())
    }

    /// Metadata of the current image
    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    /// Last parsed header
    pub fn header(&self) -> &EdfHeader {
        &self.header
    }

    /// Current stream position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total size of the stream
    pub fn file_size(&self) -> u64 {
        self.file_size
    }
}
