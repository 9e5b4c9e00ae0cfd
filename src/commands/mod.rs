//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod reader_args;
pub mod info_command;
pub mod stream_command;

pub use command_traits::{Command, CommandFactory};
pub use info_command::InfoCommand;
pub use stream_command::StreamCommand;

use clap::ArgMatches;
use crate::errors::{StreamError, StreamResult};

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the selected subcommand and creates
/// the appropriate command instance for execution.
pub struct FramestreamCommandFactory;

impl FramestreamCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        FramestreamCommandFactory
    }
}

impl Default for FramestreamCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for FramestreamCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> StreamResult<Box<dyn Command>> {
        match args.subcommand() {
            Some(("info", sub_args)) => Ok(Box::new(InfoCommand::new(sub_args)?)),
            Some(("stream", sub_args)) => Ok(Box::new(StreamCommand::new(sub_args)?)),
            Some((other, _)) => Err(StreamError::GenericError(format!("Unknown command: {}", other))),
            None => Err(StreamError::GenericError("No command given, try `info' or `stream'".to_string())),
        }
    }
}
