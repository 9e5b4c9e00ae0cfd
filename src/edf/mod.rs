//! ESRF Data Format (EDF) support

pub mod header;
pub mod source;

pub use header::{EdfHeader, HEADER_SIZE};
pub use source::EdfSource;
