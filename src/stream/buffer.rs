//! Output frames and their requested shape

use crate::errors::{StreamError, StreamResult};
use crate::source::{DataKind, ImageMetadata};
use crate::stream::roi::RowSelection;

/// Shape of the frame the next `generate` call produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requisition {
    /// `[width, rows]` of the output
    pub dims: [usize; 2],
    /// Stored bytes per output row
    pub row_bytes: usize,
    /// Samples per pixel
    pub samples_per_pixel: usize,
    /// Numeric kind of the samples as read
    pub data_kind: DataKind,
}

impl Requisition {
    /// Shape of the selected rows of an image
    pub fn for_image(metadata: &ImageMetadata, rows: &RowSelection) -> Self {
        Requisition {
            dims: [metadata.width, rows.row_count()],
            row_bytes: metadata.row_bytes(),
            samples_per_pixel: metadata.samples_per_pixel as usize,
            data_kind: metadata.data_kind,
        }
    }

    /// Samples in the whole frame
    pub fn sample_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.samples_per_pixel
    }

    /// Bytes read from the file for this frame
    pub fn data_size(&self) -> usize {
        self.row_bytes * self.dims[1]
    }

    /// Buffer size needed, including room for conversion to f32
    pub fn byte_size(&self) -> usize {
        self.data_size().max(self.sample_count() * 4)
    }
}

/// A frame handed to `FrameReader::generate`
///
/// Samples are kept as raw bytes in host order, interpreted according to
/// `kind`.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    pub data: Vec<u8>,
    pub dims: [usize; 2],
    pub samples_per_pixel: usize,
    pub kind: Option<DataKind>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer large enough for `requisition`
    pub fn for_requisition(requisition: &Requisition) -> Self {
        let mut buffer = Self::new();
        buffer.allocate(requisition);
        buffer
    }

    /// Resizes the buffer for `requisition`, keeping the allocation where possible
    pub fn allocate(&mut self, requisition: &Requisition) {
        self.data.resize(requisition.byte_size(), 0);
        self.set_shape(requisition);
    }

    pub(crate) fn set_shape(&mut self, requisition: &Requisition) {
        self.dims = requisition.dims;
        self.samples_per_pixel = requisition.samples_per_pixel;
        self.kind = Some(requisition.data_kind);
    }

    /// Samples in the frame
    pub fn sample_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.samples_per_pixel
    }

    /// Bytes holding samples of the current kind
    pub fn as_bytes(&self) -> &[u8] {
        let size = self.sample_count() * self.kind.map(|k| k.bytes_per_sample()).unwrap_or(0);
        &self.data[..size.min(self.data.len())]
    }

    /// Converts the samples to 32-bit float in place
    ///
    /// Samples are widened back to front so that no sample is overwritten
    /// before it has been read.
    pub fn convert_to_f32(&mut self) -> StreamResult<()> {
        let kind = match self.kind {
            Some(DataKind::F32) => return Ok(()),
            Some(kind) => kind,
            None => return Err(StreamError::GenericError("Buffer has no data kind".to_string())),
        };

        let count = self.sample_count();
        let width = kind.bytes_per_sample();
        if self.data.len() < count * 4 {
            return Err(StreamError::BufferTooSmall { required: count * 4, actual: self.data.len() });
        }

        for i in (0..count).rev() {
            let src = &self.data[i * width..(i + 1) * width];
            let value = match kind {
                DataKind::U8 => src[0] as f32,
                DataKind::U16 => u16::from_ne_bytes([src[0], src[1]]) as f32,
                DataKind::I32 => i32::from_ne_bytes([src[0], src[1], src[2], src[3]]) as f32,
                DataKind::U32 => u32::from_ne_bytes([src[0], src[1], src[2], src[3]]) as f32,
                DataKind::F32 => f32::from_ne_bytes([src[0], src[1], src[2], src[3]]),
            };
            self.data[i * 4..(i + 1) * 4].copy_from_slice(&value.to_ne_bytes());
        }

        self.kind = Some(DataKind::F32);
        Ok(())
    }

    /// Copies out the samples of an f32 frame
    pub fn to_f32_vec(&self) -> Option<Vec<f32>> {
        if self.kind != Some(DataKind::F32) {
            return None;
        }
        Some(self.as_bytes()
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requisition(kind: DataKind, width: usize, rows: usize) -> Requisition {
        Requisition {
            dims: [width, rows],
            row_bytes: width * kind.bytes_per_sample(),
            samples_per_pixel: 1,
            data_kind: kind,
        }
    }

    #[test]
    fn test_byte_size_leaves_room_for_conversion() {
        assert_eq!(requisition(DataKind::U16, 10, 3).byte_size(), 120);
        assert_eq!(requisition(DataKind::F32, 10, 3).byte_size(), 120);
        assert_eq!(requisition(DataKind::U16, 10, 3).data_size(), 60);
    }

    #[test]
    fn test_convert_u16() {
        let mut buffer = FrameBuffer::for_requisition(&requisition(DataKind::U16, 3, 1));
        for (i, v) in [1u16, 300, 65535].iter().enumerate() {
            buffer.data[i * 2..i * 2 + 2].copy_from_slice(&v.to_ne_bytes());
        }

        buffer.convert_to_f32().unwrap();
        assert_eq!(buffer.to_f32_vec().unwrap(), vec![1.0, 300.0, 65535.0]);
    }

    #[test]
    fn test_convert_i32() {
        let mut buffer = FrameBuffer::for_requisition(&requisition(DataKind::I32, 2, 1));
        buffer.data[0..4].copy_from_slice(&(-7i32).to_ne_bytes());
        buffer.data[4..8].copy_from_slice(&(12i32).to_ne_bytes());

        buffer.convert_to_f32().unwrap();
        assert_eq!(buffer.to_f32_vec().unwrap(), vec![-7.0, 12.0]);
    }

    #[test]
    fn test_unconverted_frame_has_no_f32_view() {
        let buffer = FrameBuffer::for_requisition(&requisition(DataKind::U8, 4, 4));
        assert!(buffer.to_f32_vec().is_none());
        assert_eq!(buffer.as_bytes().len(), 16);
    }
}
