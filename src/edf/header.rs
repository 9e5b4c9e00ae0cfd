//! EDF header block parsing and encoding
//!
//! An EDF image starts with a fixed 1024-byte ASCII block of
//! `key = value ;` pairs describing the raw samples that follow.

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

use crate::errors::{StreamError, StreamResult};
use crate::source::{DataKind, ImageMetadata};

/// Size of the header block preceding every image
pub const HEADER_SIZE: usize = 1024;

lazy_static! {
    // Leading integer of a header value, as C's atoi would see it
    static ref LEADING_INT: Regex = Regex::new(r"^\s*\+?(\d+)").unwrap();
}

/// Values recognised in an EDF header block
///
/// Keys that are absent stay `None` so the previous image's values can be
/// kept for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdfHeader {
    /// `Dim_1`: width in pixels
    pub dim_1: Option<usize>,
    /// `Dim_2`: height in rows
    pub dim_2: Option<usize>,
    /// `Size`: data block size in bytes (informational)
    pub size: Option<usize>,
    /// `DataType` as written in the file
    pub data_type: Option<String>,
    /// `ByteOrder` as written in the file
    pub byte_order: Option<String>,
}

impl EdfHeader {
    /// Describes an image for encoding
    pub fn new(width: usize, height: usize, kind: DataKind, big_endian: bool) -> Self {
        EdfHeader {
            dim_1: Some(width),
            dim_2: Some(height),
            size: Some(width * height * kind.bytes_per_sample()),
            data_type: Some(data_type_name(kind).to_string()),
            byte_order: Some(if big_endian { "HighByteFirst" } else { "LowByteFirst" }.to_string()),
        }
    }

    /// Parses a header block
    ///
    /// The block is split on `;`, every token on `=`, and both sides are
    /// whitespace-trimmed. Text after the first NUL byte is ignored.
    pub fn parse(block: &[u8]) -> Self {
        let end = block.iter().position(|&b| b == 0).unwrap_or(block.len());
        let text = String::from_utf8_lossy(&block[..end]);
        let mut header = EdfHeader::default();

        for token in text.split(';') {
            let mut key_value = token.split('=');
            let (key, value) = match (key_value.next(), key_value.next()) {
                (Some(key), Some(value)) => (key.trim(), value.trim()),
                _ => continue,
            };

            match key {
                "Dim_1" => header.dim_1 = Some(parse_leading_int(value)),
                "Dim_2" => header.dim_2 = Some(parse_leading_int(value)),
                "Size" => header.size = Some(parse_leading_int(value)),
                "DataType" => header.data_type = Some(value.to_string()),
                "ByteOrder" => header.byte_order = Some(value.to_string()),
                _ => {}
            }
        }

        header
    }

    /// Numeric kind and bit depth named by `DataType`, if recognised
    pub fn data_kind(&self) -> Option<(DataKind, u16)> {
        match self.data_type.as_deref()? {
            "UnsignedShort" => Some((DataKind::U16, 16)),
            "SignedInteger" => Some((DataKind::I32, 32)),
            // UnsignedLong is 32 bits wide in ESRF files
            "UnsignedLong" => Some((DataKind::U32, 32)),
            "Float" | "FloatValue" => Some((DataKind::F32, 32)),
            _ => None,
        }
    }

    /// Whether samples are stored big-endian
    pub fn is_big_endian(&self) -> bool {
        self.byte_order.as_deref() == Some("HighByteFirst")
    }

    /// Updates `metadata` for the image this header describes
    ///
    /// Byte order, depth and sample count are reset on every header; width,
    /// height and kind keep their previous values when the key is missing.
    /// An unknown `DataType` is logged and leaves the kind unchanged.
    pub fn apply(&self, metadata: &mut ImageMetadata) {
        metadata.big_endian = self.is_big_endian();
        metadata.bits_per_sample = 32;
        metadata.samples_per_pixel = 1;

        if let Some(width) = self.dim_1 {
            metadata.width = width;
        }
        if let Some(height) = self.dim_2 {
            metadata.height = height;
        }

        match (self.data_kind(), &self.data_type) {
            (Some((kind, bits)), _) => {
                metadata.data_kind = kind;
                metadata.bits_per_sample = bits;
            }
            (None, Some(name)) => warn!("Unsupported EDF data type `{}'", name),
            (None, None) => {}
        }
    }

    /// Encodes the header as a padded 1024-byte block
    pub fn encode(&self) -> StreamResult<Vec<u8>> {
        let mut text = String::from("{\nHeaderID = EH:000001:000000:000000 ;\nImage = 1 ;\n");

        if let Some(byte_order) = &self.byte_order {
            text.push_str(&format!("ByteOrder = {} ;\n", byte_order));
        }
        if let Some(data_type) = &self.data_type {
            text.push_str(&format!("DataType = {} ;\n", data_type));
        }
        if let Some(width) = self.dim_1 {
            text.push_str(&format!("Dim_1 = {} ;\n", width));
        }
        if let Some(height) = self.dim_2 {
            text.push_str(&format!("Dim_2 = {} ;\n", height));
        }
        if let Some(size) = self.size {
            text.push_str(&format!("Size = {} ;\n", size));
        }

        let closing = "}\n";
        if text.len() + closing.len() > HEADER_SIZE {
            return Err(StreamError::GenericError(format!(
                "EDF header needs {} bytes, only {} available", text.len() + closing.len(), HEADER_SIZE)));
        }

        let mut block = text.into_bytes();
        block.resize(HEADER_SIZE - closing.len(), b' ');
        block.extend_from_slice(closing.as_bytes());
        Ok(block)
    }
}

/// Name under which a kind is written to `DataType`
pub fn data_type_name(kind: DataKind) -> &'static str {
    match kind {
        DataKind::U8 => "UnsignedByte",
        DataKind::U16 => "UnsignedShort",
        DataKind::I32 => "SignedInteger",
        DataKind::U32 => "UnsignedLong",
        DataKind::F32 => "FloatValue",
    }
}

/// Parses the leading decimal digits of `value`, 0 when there are none
fn parse_leading_int(value: &str) -> usize {
    LEADING_INT.captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
        .unwrap_or(0)
}
