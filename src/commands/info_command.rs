//! File-set inspection command
//!
//! Resolves the selection like the frame reader would and prints the
//! metadata of every image it contains.

use clap::{ArgMatches, Command as ClapCommand};
use log::{info, warn};

use crate::commands::command_traits::Command;
use crate::commands::reader_args;
use crate::edf::EdfSource;
use crate::errors::StreamResult;
use crate::source::{FormatKind, ImageMetadata};
use crate::stream::config::ReaderConfig;
use crate::stream::files::{self, SourceFile};
use crate::tiff::TiffSource;
use crate::utils::tag_utils;

/// Command printing per-file metadata
pub struct InfoCommand {
    config: ReaderConfig,
}

impl InfoCommand {
    /// Clap definition of the `info` subcommand
    pub fn definition() -> ClapCommand {
        ClapCommand::new("info")
            .about("Print the metadata of the selected files")
            .args(reader_args::selection_args())
    }

    pub fn new(args: &ArgMatches) -> StreamResult<Self> {
        Ok(InfoCommand {
            config: reader_args::config_from_args(args)?,
        })
    }

    /// Prints one line per image, returning the metadata to inherit from
    fn describe(&self, index: usize, file: &SourceFile, previous: &ImageMetadata) -> StreamResult<ImageMetadata> {
        match file.kind {
            FormatKind::Tiff => {
                let source = TiffSource::open(&file.path, previous)?;
                let strips = source.strips();
                println!("{:>5}  {}  TIFF  {}  {} strip(s) of {} rows, {}",
                         index, file.path.display(), source.metadata(),
                         strips.offsets.len(), strips.rows_per_strip,
                         tag_utils::get_compression_name(strips.compression));
                Ok(source.metadata().clone())
            }
            FormatKind::Edf => {
                let mut source = EdfSource::open(&file.path, previous)?;
                let mut image = 0;
                loop {
                    println!("{:>5}  {}  EDF[{}]  {}", index, file.path.display(), image, source.metadata());
                    source.skip_image()?;
                    if !source.has_next_image() {
                        break;
                    }
                    source.read_header()?;
                    image += 1;
                }
                Ok(source.metadata().clone())
            }
            FormatKind::Invalid => Ok(previous.clone()),
        }
    }
}

impl Command for InfoCommand {
    fn execute(&self) -> StreamResult<()> {
        let selected = files::resolve_files(&self.config.path, self.config.start, self.config.end, self.config.step)?;
        info!("Inspecting {} files", selected.len());

        let mut previous = ImageMetadata::with_kind(self.config.data_kind);
        for (index, file) in selected.iter().enumerate() {
            match self.describe(index, file, &previous) {
                Ok(metadata) => previous = metadata,
                Err(e) => {
                    warn!("Cannot read {}: {}", file.path.display(), e);
                    println!("{:>5}  {}  error: {}", index, file.path.display(), e);
                }
            }
        }

        Ok(())
    }
}

