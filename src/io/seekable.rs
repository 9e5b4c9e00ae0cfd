//! Seekable reader trait and helpers
//!
//! This module provides a unified trait for readers that support both
//! reading and seeking operations, plus the size and short-read helpers
//! shared by the format readers.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::errors::StreamResult;

/// Trait for readers that can both read and seek
///
/// This trait combines the Read and Seek traits for use with
/// the TIFF and EDF readers.
pub trait SeekableReader: Read + Seek + Send + Sync {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek + Send + Sync> SeekableReader for T {}

/// Gets the total size of a seekable stream, restoring the position afterwards
pub fn stream_len(reader: &mut dyn SeekableReader) -> StreamResult<u64> {
    let current_position = reader.stream_position()?;
    let size = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(current_position))?;
    Ok(size)
}

/// Reads until `buf` is full or the stream ends
///
/// Unlike `read_exact`, a short read is not an error; the number of bytes
/// actually read is returned so callers can decide how to degrade.
pub fn read_fully(reader: &mut dyn SeekableReader, buf: &mut [u8]) -> StreamResult<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_stream_len_restores_position() {
        let mut cursor = Cursor::new(vec![0u8; 32]);
        cursor.seek(SeekFrom::Start(5)).unwrap();

        assert_eq!(stream_len(&mut cursor).unwrap(), 32);
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn test_read_fully_reports_short_read() {
        let mut cursor = Cursor::new(vec![7u8; 10]);
        let mut buf = [0u8; 16];

        assert_eq!(read_fully(&mut cursor, &mut buf).unwrap(), 10);
        assert_eq!(&buf[..10], &[7u8; 10]);
    }
}
