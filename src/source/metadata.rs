//! Per-image metadata shared by the TIFF and EDF readers

use std::fmt;

use crate::errors::{StreamError, StreamResult};

/// Numeric representation of the samples in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// 8-bit unsigned integer
    U8,
    /// 16-bit unsigned integer
    U16,
    /// 32-bit signed integer
    I32,
    /// 32-bit unsigned integer
    U32,
    /// 32-bit IEEE float
    F32,
}

impl DataKind {
    /// Size of one sample in bytes
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            DataKind::U8 => 1,
            DataKind::U16 => 2,
            DataKind::I32 | DataKind::U32 | DataKind::F32 => 4,
        }
    }

    /// Short lowercase name, as used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            DataKind::U8 => "u8",
            DataKind::U16 => "u16",
            DataKind::I32 => "i32",
            DataKind::U32 => "u32",
            DataKind::F32 => "f32",
        }
    }

    /// Parses a kind from its configuration name
    pub fn from_name(name: &str) -> StreamResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "u8" => Ok(DataKind::U8),
            "u16" => Ok(DataKind::U16),
            "i32" => Ok(DataKind::I32),
            "u32" => Ok(DataKind::U32),
            "f32" => Ok(DataKind::F32),
            other => Err(StreamError::InvalidConfig(format!("Unknown data kind: {}", other))),
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Layout and numeric type of the image currently being read
///
/// Re-derived for every TIFF file and for every image block of an EDF file;
/// nothing here is assumed constant across a file set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Width in pixels
    pub width: usize,
    /// Full height in rows, before any region of interest is applied
    pub height: usize,
    /// Bits per sample as stored in the file
    pub bits_per_sample: u16,
    /// Samples per pixel
    pub samples_per_pixel: u16,
    /// Numeric kind the samples are interpreted as
    pub data_kind: DataKind,
    /// Whether multi-byte samples are stored big-endian
    pub big_endian: bool,
}

impl ImageMetadata {
    /// Empty metadata carrying only the kind a reader starts with
    pub fn with_kind(data_kind: DataKind) -> Self {
        ImageMetadata {
            width: 0,
            height: 0,
            bits_per_sample: 0,
            samples_per_pixel: 1,
            data_kind,
            big_endian: false,
        }
    }

    /// Bytes per stored sample (at least one)
    pub fn bytes_per_sample(&self) -> usize {
        ((self.bits_per_sample as usize + 7) / 8).max(1)
    }

    /// Bytes in one stored row of the image
    pub fn row_bytes(&self) -> usize {
        (self.width * self.samples_per_pixel as usize * self.bits_per_sample as usize + 7) / 8
    }
}

impl Default for ImageMetadata {
    fn default() -> Self {
        Self::with_kind(DataKind::F32)
    }
}

impl fmt::Display for ImageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}, {} bit x {} ({}, {})",
               self.width, self.height, self.bits_per_sample, self.samples_per_pixel,
               self.data_kind, if self.big_endian { "big endian" } else { "little endian" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_bytes() {
        let mut meta = ImageMetadata::with_kind(DataKind::U16);
        meta.width = 10;
        meta.bits_per_sample = 16;
        meta.samples_per_pixel = 3;
        assert_eq!(meta.row_bytes(), 60);
        assert_eq!(meta.bytes_per_sample(), 2);

        meta.bits_per_sample = 1;
        meta.samples_per_pixel = 1;
        assert_eq!(meta.row_bytes(), 2);
    }

    #[test]
    fn test_kind_names() {
        for kind in [DataKind::U8, DataKind::U16, DataKind::I32, DataKind::U32, DataKind::F32] {
            assert_eq!(DataKind::from_name(kind.name()).unwrap(), kind);
        }
        assert!(DataKind::from_name("f64").is_err());
    }
}
