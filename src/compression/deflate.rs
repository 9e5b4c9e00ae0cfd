//! Handler for Adobe Deflate compressed data

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use crate::errors::{StreamError, StreamResult};
use crate::tiff::constants::compression;
use super::handler::CompressionHandler;

/// Adobe Deflate (Zlib) compression handler (compression codes 8 and 32946)
pub struct AdobeDeflateHandler;

impl CompressionHandler for AdobeDeflateHandler {
    fn decompress(&self, data: &[u8]) -> StreamResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed_data = Vec::new();
        match decoder.read_to_end(&mut decompressed_data) {
            Ok(_) => Ok(decompressed_data),
            Err(e) => Err(StreamError::IoError(e))
        }
    }

    fn compress(&self, data: &[u8]) -> StreamResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn name(&self) -> &'static str {
        "Adobe Deflate"
    }

    fn code(&self) -> u64 {
        compression::DEFLATE as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_restores_strip() {
        let strip: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let handler = AdobeDeflateHandler;

        let packed = handler.compress(&strip).unwrap();
        assert!(packed.len() < strip.len());
        assert_eq!(handler.decompress(&packed).unwrap(), strip);
    }

    #[test]
    fn test_deflate_rejects_garbage() {
        assert!(AdobeDeflateHandler.decompress(&[0xFF, 0x00, 0x13]).is_err());
    }
}
