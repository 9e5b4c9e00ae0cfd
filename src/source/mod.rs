//! Format detection and the common interface of the per-format readers

pub mod metadata;

pub use metadata::{DataKind, ImageMetadata};

use std::fmt;
use std::path::Path;

use crate::edf::EdfSource;
use crate::errors::{StreamError, StreamResult};
use crate::stream::roi::RowSelection;
use crate::tiff::TiffSource;

/// Container format, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Tiff,
    Edf,
    Invalid,
}

impl FormatKind {
    /// Maps `.tif`, `.tiff` and `.edf` (case-insensitive) to their format
    pub fn from_path(path: &Path) -> Self {
        let extension = path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("tif") | Some("tiff") => FormatKind::Tiff,
            Some("edf") => FormatKind::Edf,
            _ => FormatKind::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        *self != FormatKind::Invalid
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatKind::Tiff => write!(f, "TIFF"),
            FormatKind::Edf => write!(f, "EDF"),
            FormatKind::Invalid => write!(f, "invalid"),
        }
    }
}

/// An open image file the frame reader pulls rows from
///
/// Dropping a source closes its file.
pub trait ImageSource: Send {
    /// Metadata of the current image
    fn metadata(&self) -> &ImageMetadata;

    /// Reads the selected rows of the current image into consecutive rows
    /// of `out`, in host byte order
    fn read_rows(&mut self, rows: &RowSelection, out: &mut [u8]) -> StreamResult<()>;

    /// Whether the file holds another image after the current one
    fn has_next_image(&self) -> bool {
        false
    }

    /// Moves on to the next image of the file and reads its metadata
    fn next_image(&mut self) -> StreamResult<()> {
        Err(StreamError::GenericError("File holds a single image".to_string()))
    }

    /// Format of the underlying file
    fn format(&self) -> FormatKind;
}

impl ImageSource for TiffSource {
    fn metadata(&self) -> &ImageMetadata {
        TiffSource::metadata(self)
    }

    fn read_rows(&mut self, rows: &RowSelection, out: &mut [u8]) -> StreamResult<()> {
        TiffSource::read_rows(self, rows, out)
    }

    fn format(&self) -> FormatKind {
        FormatKind::Tiff
    }
}

impl ImageSource for EdfSource {
    fn metadata(&self) -> &ImageMetadata {
        EdfSource::metadata(self)
    }

    fn read_rows(&mut self, rows: &RowSelection, out: &mut [u8]) -> StreamResult<()> {
        EdfSource::read_rows(self, rows, out)
    }

    fn has_next_image(&self) -> bool {
        EdfSource::has_next_image(self)
    }

    fn next_image(&mut self) -> StreamResult<()> {
        self.read_header()
    }

    fn format(&self) -> FormatKind {
        FormatKind::Edf
    }
}

/// Opens `path` with the reader for `kind`
///
/// `previous` is the metadata of the image read before, whose kind is
/// inherited where the file does not decide it.
pub fn open_source(path: &Path, kind: FormatKind, previous: &ImageMetadata) -> StreamResult<Box<dyn ImageSource>> {
    match kind {
        FormatKind::Tiff => Ok(Box::new(TiffSource::open(path, previous)?)),
        FormatKind::Edf => Ok(Box::new(EdfSource::open(path, previous)?)),
        FormatKind::Invalid => Err(StreamError::GenericError(
            format!("No reader for {}", path.display()))),
    }
}
