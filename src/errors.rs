//! Custom error types for frame streaming

use std::fmt;
use std::io;

/// Errors raised while resolving, opening or reading image files
#[derive(Debug)]
pub enum StreamError {
    /// I/O error
    IoError(io::Error),
    /// The reader could not be set up (no files, bad window, bad worker index)
    Setup(String),
    /// A configuration value is out of range or cannot be parsed
    InvalidConfig(String),
    /// Fewer bytes were available than the header or rows require
    TruncatedRead { expected: usize, actual: usize },
    /// The output buffer cannot hold the requested frame
    BufferTooSmall { required: usize, actual: usize },
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Image data organisation the scanline reader cannot handle
    UnsupportedLayout(String),
    /// Image dimensions not found
    MissingDimensions,
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::IoError(e) => write!(f, "I/O error: {}", e),
            StreamError::Setup(msg) => write!(f, "Setup error: {}", msg),
            StreamError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            StreamError::TruncatedRead { expected, actual } => {
                write!(f, "Truncated read: expected {} bytes, got {}", expected, actual)
            }
            StreamError::BufferTooSmall { required, actual } => {
                write!(f, "Output buffer too small: {} bytes required, {} available", required, actual)
            }
            StreamError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            StreamError::InvalidBigTIFFHeader => write!(f, "Invalid BigTIFF header"),
            StreamError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            StreamError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            StreamError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            StreamError::UnsupportedCompression(c) => write!(f, "Unsupported compression method: {}", c),
            StreamError::UnsupportedLayout(msg) => write!(f, "Unsupported image layout: {}", msg),
            StreamError::MissingDimensions => write!(f, "Image dimensions not found"),
            StreamError::GenericError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StreamError {
    fn from(error: io::Error) -> Self {
        StreamError::IoError(error)
    }
}

impl From<String> for StreamError {
    fn from(msg: String) -> Self {
        StreamError::GenericError(msg)
    }
}

/// Result type for streaming operations
pub type StreamResult<T> = Result<T, StreamError>;
