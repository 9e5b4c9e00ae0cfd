//! Fixture files shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use framestream::edf::EdfHeader;
use framestream::tiff::StripWriter;
use framestream::{DataKind, FrameBuffer, FrameReader, StreamResult};

/// Writes a 16-bit TIFF whose sample at (x, y) is `first + y * width + x`
pub fn write_tiff_u16(dir: &Path, name: &str, width: usize, height: usize, first: u16) -> PathBuf {
    let samples: Vec<u8> = (0..width * height)
        .flat_map(|i| first.wrapping_add(i as u16).to_ne_bytes())
        .collect();

    let path = dir.join(name);
    StripWriter::new()
        .rows_per_strip(7)
        .write_file(&path, width, height, DataKind::U16, &samples)
        .unwrap();
    path
}

/// One EDF image of u32 samples counting up from `first`
pub fn edf_image(width: usize, height: usize, big_endian: bool, first: u32) -> Vec<u8> {
    let mut bytes = EdfHeader::new(width, height, DataKind::U32, big_endian).encode().unwrap();
    for i in 0..(width * height) as u32 {
        let value = first + i;
        let stored = if big_endian { value.to_be_bytes() } else { value.to_le_bytes() };
        bytes.extend_from_slice(&stored);
    }
    bytes
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// Pulls frames until the reader reports exhaustion
pub fn collect_frames(reader: &mut FrameReader) -> StreamResult<Vec<FrameBuffer>> {
    let mut frames = Vec::new();
    loop {
        let requisition = reader.requisition()?;
        let mut buffer = FrameBuffer::for_requisition(&requisition);
        if !reader.generate(&mut buffer, &requisition)? {
            return Ok(frames);
        }
        frames.push(buffer);
    }
}

/// First sample of every frame, as f32
pub fn first_values(frames: &[FrameBuffer]) -> Vec<f32> {
    frames.iter()
        .map(|frame| frame.to_f32_vec().unwrap()[0])
        .collect()
}

/// Glob pattern matching every `.tif` file in `dir`
pub fn tif_pattern(dir: &Path) -> String {
    format!("{}/*.tif", dir.display())
}
