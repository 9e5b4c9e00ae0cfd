//! Command-line options shared by the commands that read frames
//!
//! A `--config` TOML file provides the base configuration; every flag given
//! on the command line overrides the matching option.

use clap::{value_parser, Arg, ArgAction, ArgMatches};

use crate::errors::StreamResult;
use crate::source::DataKind;
use crate::stream::config::{ReadPolicy, ReaderConfig};

/// Options choosing the files to read
pub fn selection_args() -> Vec<Arg> {
    vec![
        Arg::new("path")
            .help("File, directory or glob pattern (e.g. 'scan/*.tif')")
            .index(1),
        Arg::new("config")
            .long("config")
            .help("TOML file with reader options")
            .value_name("FILE"),
        Arg::new("start")
            .long("start")
            .help("Index of the first match to read")
            .value_name("INDEX")
            .value_parser(value_parser!(usize)),
        Arg::new("end")
            .long("end")
            .help("Index one past the last match to read")
            .value_name("INDEX")
            .value_parser(value_parser!(usize)),
        Arg::new("step")
            .long("step")
            .help("Read every STEP-th match")
            .value_name("STEP")
            .value_parser(value_parser!(usize)),
        Arg::new("data-kind")
            .long("data-kind")
            .help("Sample kind assumed for TIFF depths other than 16 bit (u8, u16, i32, u32, f32)")
            .value_name("KIND"),
    ]
}

/// Options shaping the frames
pub fn frame_args() -> Vec<Arg> {
    vec![
        Arg::new("y")
            .long("y")
            .help("First row of the region of interest")
            .value_name("ROW")
            .value_parser(value_parser!(usize)),
        Arg::new("height")
            .long("height")
            .help("Rows in the region of interest, 0 for all")
            .value_name("ROWS")
            .value_parser(value_parser!(usize)),
        Arg::new("y-step")
            .long("y-step")
            .help("Read every Y_STEP-th row")
            .value_name("Y_STEP")
            .value_parser(value_parser!(usize)),
        Arg::new("no-conversion")
            .long("no-conversion")
            .help("Keep samples in their stored kind instead of converting to f32")
            .action(ArgAction::SetTrue),
        Arg::new("read-policy")
            .long("read-policy")
            .help("Handling of short reads (strict, best-effort)")
            .value_name("POLICY"),
    ]
}

/// Builds the reader configuration from a config file and flags
pub fn config_from_args(args: &ArgMatches) -> StreamResult<ReaderConfig> {
    let mut config = match string_arg(args, "config") {
        Some(path) => ReaderConfig::from_file(path)?,
        None => ReaderConfig::default(),
    };

    if let Some(path) = string_arg(args, "path") {
        config.path = path.to_string();
    }
    if let Some(start) = usize_arg(args, "start") {
        config.start = start;
    }
    if let Some(end) = usize_arg(args, "end") {
        config.end = Some(end);
    }
    if let Some(step) = usize_arg(args, "step") {
        config.step = step;
    }
    if let Some(kind) = string_arg(args, "data-kind") {
        config.data_kind = DataKind::from_name(kind)?;
    }
    if let Some(y) = usize_arg(args, "y") {
        config.roi.y = y;
    }
    if let Some(height) = usize_arg(args, "height") {
        config.roi.height = height;
    }
    if let Some(y_step) = usize_arg(args, "y-step") {
        config.roi.y_step = y_step;
    }
    if flag_arg(args, "no-conversion") {
        config.enable_conversion = false;
    }
    if let Some(policy) = string_arg(args, "read-policy") {
        config.read_policy = ReadPolicy::from_name(policy)?;
    }

    config.validate()?;
    Ok(config)
}

// Lookups tolerate options the current subcommand does not define

fn string_arg<'a>(args: &'a ArgMatches, name: &str) -> Option<&'a str> {
    args.try_get_one::<String>(name).ok().flatten().map(|s| s.as_str())
}

fn usize_arg(args: &ArgMatches, name: &str) -> Option<usize> {
    args.try_get_one::<usize>(name).ok().flatten().copied()
}

fn flag_arg(args: &ArgMatches, name: &str) -> bool {
    args.try_get_one::<bool>(name).ok().flatten().copied().unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Command as ClapCommand;

    fn parse(argv: &[&str]) -> ArgMatches {
        ClapCommand::new("test")
            .args(selection_args())
            .args(frame_args())
            .get_matches_from(argv)
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse(&["test", "/data/*.edf", "--start", "2", "--y-step", "4", "--no-conversion"]);
        let config = config_from_args(&args).unwrap();
        assert_eq!(config.path, "/data/*.edf");
        assert_eq!(config.start, 2);
        assert_eq!(config.roi.y_step, 4);
        assert!(!config.enable_conversion);
        assert_eq!(config.read_policy, ReadPolicy::Strict);
    }

    #[test]
    fn test_config_file_as_base() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reader.toml");
        std::fs::write(&path, "path = \"a/*.tif\"\nheight = 64\nread-policy = \"best-effort\"\n").unwrap();

        let args = parse(&["test", "--config", path.to_str().unwrap(), "--height", "32"]);
        let config = config_from_args(&args).unwrap();
        assert_eq!(config.path, "a/*.tif");
        assert_eq!(config.roi.height, 32);
        assert_eq!(config.read_policy, ReadPolicy::BestEffort);
    }

    #[test]
    fn test_missing_frame_args_tolerated() {
        let args = ClapCommand::new("test").args(selection_args()).get_matches_from(["test", "x.tif"]);
        let config = config_from_args(&args).unwrap();
        assert_eq!(config.roi, ReaderConfig::default().roi);
    }
}
