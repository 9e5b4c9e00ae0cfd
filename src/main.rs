use clap::{Arg, ArgAction, Command as ClapCommand};
use log::error;
use std::process;

use framestream::commands::{CommandFactory, FramestreamCommandFactory, InfoCommand, StreamCommand};
use framestream::utils::logger::{self, Logger};

fn main() {
    let matches = ClapCommand::new("framestream")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Stream frames out of TIFF and EDF image sequences")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log output (repeat for more)")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write log records to this file as well as the console")
                .value_name("FILE")
                .global(true),
        )
        .subcommand(InfoCommand::definition())
        .subcommand(StreamCommand::definition())
        .get_matches();

    let level = logger::level_for_verbosity(matches.get_count("verbose"));

    match matches.get_one::<String>("log-file") {
        Some(log_file) => {
            let file_level = level.to_level().unwrap_or(log::Level::Warn);
            if let Err(e) = Logger::init_global_logger(log_file, file_level) {
                eprintln!("Error setting up global logger: {}", e);
                process::exit(1);
            }
        }
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_default_env()
                .init();
        }
    }

    let factory = FramestreamCommandFactory::new();

    match factory.create_command(&matches) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
