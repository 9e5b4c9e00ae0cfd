//! Frame streaming command
//!
//! Runs one frame reader per worker, each on its own thread over its own
//! partition, and optionally writes every frame to disk as a TIFF file.

use clap::{value_parser, Arg, ArgMatches, Command as ClapCommand};
use indicatif::MultiProgress;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crate::commands::command_traits::Command;
use crate::commands::reader_args;
use crate::errors::{StreamError, StreamResult};
use crate::source::DataKind;
use crate::stream::{FrameBuffer, FrameReader, ReaderConfig};
use crate::tiff::StripWriter;
use crate::utils::progress::ProgressTracker;

/// Totals reported by one worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub worker: usize,
    pub frames: usize,
    pub bytes: usize,
}

/// Command streaming the frames of one or all workers
pub struct StreamCommand {
    config: ReaderConfig,
    workers: usize,
    /// Run only this worker instead of all of them
    only_worker: Option<usize>,
    dump_dir: Option<PathBuf>,
    show_progress: bool,
}

impl StreamCommand {
    /// Clap definition of the `stream` subcommand
    pub fn definition() -> ClapCommand {
        ClapCommand::new("stream")
            .about("Read every frame of the selected files, split among workers")
            .args(reader_args::selection_args())
            .args(reader_args::frame_args())
            .arg(
                Arg::new("workers")
                    .short('w')
                    .long("workers")
                    .help("Number of workers sharing the file set")
                    .value_name("COUNT")
                    .default_value("1")
                    .value_parser(value_parser!(usize)),
            )
            .arg(
                Arg::new("worker")
                    .long("worker")
                    .help("Run only the worker with this index")
                    .value_name("INDEX")
                    .value_parser(value_parser!(usize)),
            )
            .arg(
                Arg::new("dump")
                    .long("dump")
                    .help("Write every frame as a TIFF file into this directory")
                    .value_name("DIR"),
            )
            .arg(
                Arg::new("no-progress")
                    .long("no-progress")
                    .help("Do not draw progress bars")
                    .action(clap::ArgAction::SetTrue),
            )
    }

    pub fn new(args: &ArgMatches) -> StreamResult<Self> {
        let config = reader_args::config_from_args(args)?;
        let workers = args.get_one::<usize>("workers").copied().unwrap_or(1);
        let only_worker = args.get_one::<usize>("worker").copied();

        if workers == 0 {
            return Err(StreamError::InvalidConfig("At least one worker is needed".to_string()));
        }
        if let Some(index) = only_worker {
            if index >= workers {
                return Err(StreamError::InvalidConfig(format!(
                    "Worker index {} out of range for {} workers", index, workers)));
            }
        }

        Ok(StreamCommand {
            config,
            workers,
            only_worker,
            dump_dir: args.get_one::<String>("dump").map(PathBuf::from),
            show_progress: !args.get_flag("no-progress"),
        })
    }

    /// Worker indices this invocation runs
    fn worker_indices(&self) -> Vec<usize> {
        match self.only_worker {
            Some(index) => vec![index],
            None => (0..self.workers).collect(),
        }
    }

    fn run_workers(&self) -> Vec<StreamResult<WorkerSummary>> {
        let group = MultiProgress::new();

        thread::scope(|scope| {
            let handles: Vec<_> = self.worker_indices().into_iter()
                .map(|index| {
                    let group = &group;
                    scope.spawn(move || self.run_worker(index, group))
                })
                .collect();

            handles.into_iter()
                .map(|handle| handle.join().unwrap_or_else(|_| {
                    Err(StreamError::GenericError("Worker thread panicked".to_string()))
                }))
                .collect()
        })
    }

    fn run_worker(&self, index: usize, group: &MultiProgress) -> StreamResult<WorkerSummary> {
        let mut reader = FrameReader::new(self.config.clone())?;
        reader.setup(index, self.workers)?;

        let progress = if self.show_progress {
            ProgressTracker::in_group(group, reader.partition().count as u64, &format!("worker {}", index))
        } else {
            ProgressTracker::hidden()
        };

        let mut summary = WorkerSummary { worker: index, ..Default::default() };
        let mut buffer = FrameBuffer::new();

        loop {
            let requisition = reader.requisition()?;
            buffer.allocate(&requisition);
            if !reader.generate(&mut buffer, &requisition)? {
                break;
            }

            if let Some(dir) = &self.dump_dir {
                dump_frame(dir, index, summary.frames, &buffer)?;
            }

            summary.frames += 1;
            summary.bytes += buffer.as_bytes().len();
            progress.increment(1);
        }

        progress.finish();
        info!("Worker {} produced {} frames ({} bytes)", index, summary.frames, summary.bytes);
        Ok(summary)
    }
}

/// Writes one frame as `w<worker>_<frame>.tif`
fn dump_frame(dir: &Path, worker: usize, frame: usize, buffer: &FrameBuffer) -> StreamResult<()> {
    let kind = buffer.kind.unwrap_or(DataKind::F32);
    let path = dir.join(format!("w{:02}_{:06}.tif", worker, frame));
    let width = buffer.dims[0] * buffer.samples_per_pixel;

    StripWriter::new().write_file(&path, width, buffer.dims[1], kind, buffer.as_bytes())
}

impl Command for StreamCommand {
    fn execute(&self) -> StreamResult<()> {
        if let Some(dir) = &self.dump_dir {
            fs::create_dir_all(dir)?;
        }

        let mut total = WorkerSummary::default();
        let mut failures = 0;

        for result in self.run_workers() {
            match result {
                Ok(summary) => {
                    println!("worker {:>3}: {:>6} frames, {:>12} bytes", summary.worker, summary.frames, summary.bytes);
                    total.frames += summary.frames;
                    total.bytes += summary.bytes;
                }
                Err(e) => {
                    warn!("Worker failed: {}", e);
                    eprintln!("Error: {}", e);
                    failures += 1;
                }
            }
        }

        println!("total:      {:>6} frames, {:>12} bytes", total.frames, total.bytes);

        if failures > 0 {
            return Err(StreamError::GenericError(format!("{} worker(s) failed", failures)));
        }
        Ok(())
    }
}
