//! Frame streaming over a set of image files
//!
//! Resolves the file set, splits it among workers and turns every image
//! into one frame, cut down to the configured region of interest.

pub mod buffer;
pub mod config;
pub mod files;
pub mod partition;
pub mod reader;
pub mod roi;

pub use buffer::{FrameBuffer, Requisition};
pub use config::{ReadPolicy, ReaderConfig};
pub use files::SourceFile;
pub use partition::Partition;
pub use reader::FrameReader;
pub use roi::{RoiSpec, RowSelection};
