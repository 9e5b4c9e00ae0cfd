//! Image File Directory (IFD) structures and methods
//!
//! This module implements the TIFF IFD (Image File Directory) structures
//! that store metadata about an image. IFDs are organized as collections of
//! tag entries, with each tag describing an aspect of the image.

use std::collections::HashMap;
use std::fmt;
use log::trace;

use crate::tiff::constants::tags;
use crate::utils::tag_utils;

/// Represents an Image File Directory (IFD) in a TIFF file
///
/// An IFD contains metadata about an image, stored as a series of tag entries.
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Whether the owning file is a BigTIFF
    pub is_big_tiff: bool,
    /// Whether the owning file is big-endian ("MM")
    pub big_endian: bool,
    /// Cached tag values for quick lookup
    tag_map: HashMap<u16, IFDEntry>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// Each entry describes one aspect of the image using a tag-value pair.
/// Small values live directly in the entry's value field; `raw_value` keeps
/// those bytes exactly as stored so inline arrays decode in the file's
/// byte order.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value field interpreted as an offset
    pub value_offset: u64,
    /// Undecoded value field (4 bytes used in classic TIFF, 8 in BigTIFF)
    pub raw_value: [u8; 8],
}

impl IFDEntry {
    /// Creates a new IFD entry
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64, raw_value: [u8; 8]) -> Self {
        trace!("IFD entry: tag={} ({}), type={} ({}), count={}, offset/value={}",
               tag, tag_utils::get_tag_name(tag),
               field_type, tag_utils::get_field_type_name(field_type),
               count, value_offset);

        Self {
            tag,
            field_type,
            count,
            value_offset,
            raw_value,
        }
    }

    /// Determines if the value is stored inline in the entry itself
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        tag_utils::is_value_inline(self, is_big_tiff)
    }
}

impl IFD {
    /// Creates a new IFD
    pub fn new(number: usize, offset: u64, is_big_tiff: bool, big_endian: bool) -> Self {
        Self {
            entries: Vec::new(),
            number,
            offset,
            is_big_tiff,
            big_endian,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD
    pub fn add_entry(&mut self, entry: IFDEntry) {
        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets the number of entries in this IFD
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Gets the first value of a single-valued tag
    ///
    /// Works for inline SHORT, LONG and LONG8 values in either byte order.
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        let entry = self.get_entry(tag)?;
        if !entry.is_value_inline(self.is_big_tiff) {
            return None;
        }

        tag_utils::decode_inline_values(entry, self.big_endian).first().copied()
    }

    /// Gets the dimensions of the image described by this IFD
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;

        for entry in &self.entries {
            let value = self.get_tag_value(entry.tag).unwrap_or(entry.value_offset);
            let value_display = match entry.tag {
                tags::COMPRESSION => format!("{} ({})", value, tag_utils::get_compression_name(value)),
                _ => value.to_string(),
            };

            writeln!(f, "    {} ({}): {} [{}]",
                     entry.tag,
                     tag_utils::get_tag_name(entry.tag),
                     value_display,
                     tag_utils::get_field_type_name(entry.field_type))?;
        }

        Ok(())
    }
}
