//! Pull-based frame generation
//!
//! A `FrameReader` walks its share of a file set and produces one frame
//! per `generate` call. The caller drives it in two steps:
//!
//! ```no_run
//! use framestream::{FrameBuffer, FrameReader, ReaderConfig};
//!
//! # fn main() -> framestream::StreamResult<()> {
//! let mut reader = FrameReader::new(ReaderConfig::new("/data/scan/*.tif"))?;
//! reader.setup(0, 1)?;
//!
//! let mut buffer = FrameBuffer::new();
//! loop {
//!     let requisition = reader.requisition()?;
//!     buffer.allocate(&requisition);
//!     if !reader.generate(&mut buffer, &requisition)? {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use log::{debug, info, warn};

use crate::errors::{StreamError, StreamResult};
use crate::source::{self, ImageMetadata, ImageSource};
use crate::stream::buffer::{FrameBuffer, Requisition};
use crate::stream::config::{ReadPolicy, ReaderConfig};
use crate::stream::files::{self, SourceFile};
use crate::stream::partition::{self, Partition};

/// Reads frames from the files owned by one worker
pub struct FrameReader {
    config: ReaderConfig,
    /// Selected files, set by `setup`
    files: Vec<SourceFile>,
    /// Files owned by this reader
    partition: Partition,
    /// Index of the current file in `files`
    file_index: usize,
    /// Open current file
    source: Option<Box<dyn ImageSource>>,
    /// Metadata of the current image, kept across files for kind inheritance
    metadata: ImageMetadata,
    /// The current image has been read; the next one must be prepared
    image_consumed: bool,
    /// The current file failed to open under the best-effort policy
    skip_current: bool,
    setup_done: bool,
}

impl FrameReader {
    /// Creates a reader, rejecting invalid options
    pub fn new(config: ReaderConfig) -> StreamResult<Self> {
        config.validate()?;
        let metadata = ImageMetadata::with_kind(config.data_kind);

        Ok(FrameReader {
            config,
            files: Vec::new(),
            partition: Partition::default(),
            file_index: 0,
            source: None,
            metadata,
            image_consumed: false,
            skip_current: false,
            setup_done: false,
        })
    }

    /// Resolves the file set and claims the share of worker `worker_index`
    pub fn setup(&mut self, worker_index: usize, worker_count: usize) -> StreamResult<()> {
        let files = files::resolve_files(&self.config.path, self.config.start, self.config.end, self.config.step)?;
        let partition = partition::assign(files.len(), worker_index, worker_count)?;

        info!("Worker {}/{} reads {} of {} files starting at #{}",
              worker_index, worker_count, partition.count, files.len(), partition.first);

        self.files = files;
        self.partition = partition;
        self.file_index = partition.first;
        self.source = None;
        self.image_consumed = false;
        self.skip_current = false;
        self.setup_done = true;
        Ok(())
    }

    /// Shape of the frame the next `generate` call produces
    ///
    /// Opens the next owned file, or moves to the next image of an EDF
    /// file, when the previous frame used up the current one.
    pub fn requisition(&mut self) -> StreamResult<Requisition> {
        self.ensure_setup()?;
        self.prepare()?;
        Ok(self.current_requisition())
    }

    /// Reads the next frame into `buffer`
    ///
    /// Returns `Ok(false)` once every owned file has been read, on this
    /// and all later calls.
    ///
    /// The partition counts files, not frames: an EDF file holding several
    /// images produces one frame per image, so a worker may return more
    /// frames than it owns files.
    pub fn generate(&mut self, buffer: &mut FrameBuffer, requisition: &Requisition) -> StreamResult<bool> {
        self.ensure_setup()?;
        if !self.partition.contains(self.file_index) {
            return Ok(false);
        }

        self.prepare()?;
        let current = self.current_requisition();
        if *requisition != current {
            warn!("Stale requisition {:?}, generating {:?}", requisition.dims, current.dims);
        }
        if buffer.data.len() < current.byte_size() {
            return Err(StreamError::BufferTooSmall { required: current.byte_size(), actual: buffer.data.len() });
        }
        buffer.set_shape(&current);

        let filled = &mut buffer.data[..current.data_size()];
        if self.skip_current {
            filled.fill(0);
            self.advance();
        } else {
            self.read_frame(filled)?;
        }

        if self.config.enable_conversion {
            buffer.convert_to_f32()?;
        }

        Ok(true)
    }

    /// Full height of the current image, before the region of interest
    pub fn total_height(&self) -> usize {
        self.metadata.height
    }

    /// Metadata of the current image
    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    /// Files selected at setup
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Files owned by this reader
    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    fn ensure_setup(&self) -> StreamResult<()> {
        if self.setup_done {
            Ok(())
        } else {
            Err(StreamError::Setup("Reader used before setup".to_string()))
        }
    }

    fn current_requisition(&self) -> Requisition {
        let rows = self.config.roi.select(self.metadata.height);
        Requisition::for_image(&self.metadata, &rows)
    }

    /// Reads the selected rows of the current image and advances the cursor
    fn read_frame(&mut self, out: &mut [u8]) -> StreamResult<()> {
        if self.config.read_policy == ReadPolicy::BestEffort {
            out.fill(0);
        }

        let rows = self.config.roi.select(self.metadata.height);
        let (result, more_images) = match self.source.as_mut() {
            Some(source) => (source.read_rows(&rows, out), source.has_next_image()),
            None => (Err(StreamError::GenericError("No open source".to_string())), false),
        };

        self.image_consumed = true;
        if !more_images {
            self.advance();
        }

        match result {
            Err(StreamError::TruncatedRead { expected, actual }) if self.config.read_policy == ReadPolicy::BestEffort => {
                warn!("Short read ({} of {} bytes), rest of the frame left zero", actual, expected);
                Ok(())
            }
            other => other,
        }
    }

    /// Makes the current image readable: opens the file or reads the next
    /// image header as needed
    fn prepare(&mut self) -> StreamResult<()> {
        if !self.partition.contains(self.file_index) || self.skip_current {
            return Ok(());
        }

        if let Some(source) = self.source.as_mut() {
            if !self.image_consumed {
                return Ok(());
            }

            match source.next_image() {
                Ok(()) => {
                    self.metadata = source.metadata().clone();
                    self.image_consumed = false;
                    debug!("Next image in file #{}: {}", self.file_index, self.metadata);
                    return Ok(());
                }
                Err(e) => {
                    self.source = None;
                    return self.recover(e);
                }
            }
        }

        let file = &self.files[self.file_index];
        match source::open_source(&file.path, file.kind, &self.metadata) {
            Ok(source) => {
                self.metadata = source.metadata().clone();
                self.source = Some(source);
                self.image_consumed = false;
                Ok(())
            }
            Err(e) => self.recover(e),
        }
    }

    /// Swallows a truncated read under the best-effort policy
    fn recover(&mut self, error: StreamError) -> StreamResult<()> {
        match (&error, self.config.read_policy) {
            (StreamError::TruncatedRead { .. }, ReadPolicy::BestEffort) => {
                warn!("Skipping rest of file #{}: {}", self.file_index, error);
                self.skip_current = true;
                Ok(())
            }
            _ => Err(error),
        }
    }

    /// Closes the current file and moves to the next one
    fn advance(&mut self) {
        self.source = None;
        self.file_index += 1;
        self.image_consumed = false;
        self.skip_current = false;
    }
}
