//! End-to-end tests of the frame reader over files on disk

extern crate std;

mod common;

use common::{collect_frames, edf_image, first_values, tif_pattern, write_file, write_tiff_u16};
use framestream::{DataKind, FrameBuffer, FrameReader, ReadPolicy, ReaderConfig, StreamError};

fn tif_set(count: usize) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..count {
        write_tiff_u16(dir.path(), &format!("scan_{:04}.tif", i), 4, 3, (i * 100) as u16);
    }
    dir
}

#[test]
fn test_selection_window() {
    let dir = tif_set(10);
    let config = ReaderConfig::new(tif_pattern(dir.path())).with_range(2, Some(9), 3);

    let mut reader = FrameReader::new(config).unwrap();
    reader.setup(0, 1).unwrap();
    std::assert_eq!(reader.files().len(), 3);

    let frames = collect_frames(&mut reader).unwrap();
    std::assert_eq!(first_values(&frames), std::vec![200.0, 500.0, 800.0]);
}

#[test]
fn test_directory_path_selects_its_files() {
    let dir = tif_set(3);
    write_file(dir.path(), "README.txt", b"not an image");

    let mut reader = FrameReader::new(ReaderConfig::new(dir.path().to_string_lossy())).unwrap();
    reader.setup(0, 1).unwrap();
    std::assert_eq!(reader.files().len(), 3);
}

#[test]
fn test_workers_read_disjoint_partitions() {
    let dir = tif_set(10);
    let mut seen = std::vec::Vec::new();

    for worker in 0..3 {
        let mut reader = FrameReader::new(ReaderConfig::new(tif_pattern(dir.path()))).unwrap();
        reader.setup(worker, 3).unwrap();
        std::assert_eq!(reader.partition().count, 3);

        let frames = collect_frames(&mut reader).unwrap();
        std::assert_eq!(frames.len(), 3);
        seen.extend(first_values(&frames));
    }

    std::assert_eq!(seen, (0..9).map(|i| (i * 100) as f32).collect::<std::vec::Vec<_>>());
}

#[test]
fn test_roi_with_stride() {
    let dir = tempfile::tempdir().unwrap();
    write_tiff_u16(dir.path(), "tall.tif", 2, 100, 0);

    let config = ReaderConfig::new(tif_pattern(dir.path())).with_roi(10, 50, 3);
    let mut reader = FrameReader::new(config).unwrap();
    reader.setup(0, 1).unwrap();

    let requisition = reader.requisition().unwrap();
    std::assert_eq!(requisition.dims, [2, 17]);
    std::assert_eq!(reader.total_height(), 100);

    let mut buffer = FrameBuffer::for_requisition(&requisition);
    std::assert!(reader.generate(&mut buffer, &requisition).unwrap());

    let values = buffer.to_f32_vec().unwrap();
    std::assert_eq!(values.len(), 34);
    for (index, row) in (10..60).step_by(3).enumerate() {
        std::assert_eq!(values[index * 2], (row * 2) as f32);
    }
}

#[test]
fn test_exhaustion_is_terminal() {
    let dir = tif_set(1);
    let mut reader = FrameReader::new(ReaderConfig::new(tif_pattern(dir.path()))).unwrap();
    reader.setup(0, 1).unwrap();

    std::assert_eq!(collect_frames(&mut reader).unwrap().len(), 1);

    for _ in 0..3 {
        let requisition = reader.requisition().unwrap();
        let mut buffer = FrameBuffer::for_requisition(&requisition);
        std::assert!(!reader.generate(&mut buffer, &requisition).unwrap());
    }
}

#[test]
fn test_multi_image_edf_then_next_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut stack = edf_image(3, 2, false, 1);
    stack.extend(edf_image(3, 4, true, 1000));
    write_file(dir.path(), "a_stack.edf", &stack);
    write_tiff_u16(dir.path(), "b_single.tif", 3, 2, 7);

    let pattern = format!("{}/*", dir.path().display());
    let mut reader = FrameReader::new(ReaderConfig::new(pattern)).unwrap();
    reader.setup(0, 1).unwrap();

    let frames = collect_frames(&mut reader).unwrap();
    std::assert_eq!(frames.len(), 3);
    std::assert_eq!(frames[0].dims, [3, 2]);
    std::assert_eq!(frames[1].dims, [3, 4]);
    std::assert_eq!(first_values(&frames), std::vec![1.0, 1000.0, 7.0]);
    std::assert_eq!(frames[1].to_f32_vec().unwrap()[11], 1011.0);
}

#[test]
fn test_partition_counts_files_not_images() {
    let dir = tempfile::tempdir().unwrap();
    let mut stack = edf_image(2, 2, false, 10);
    stack.extend(edf_image(2, 2, false, 20));
    write_file(dir.path(), "a_stack.edf", &stack);
    write_tiff_u16(dir.path(), "b_single.tif", 2, 2, 30);
    let pattern = format!("{}/*", dir.path().display());

    let mut first = FrameReader::new(ReaderConfig::new(pattern.clone())).unwrap();
    first.setup(0, 2).unwrap();
    std::assert_eq!(first.partition().count, 1);
    let frames = collect_frames(&mut first).unwrap();
    std::assert_eq!(first_values(&frames), std::vec![10.0, 20.0]);

    let mut second = FrameReader::new(ReaderConfig::new(pattern)).unwrap();
    second.setup(1, 2).unwrap();
    std::assert_eq!(first_values(&collect_frames(&mut second).unwrap()), std::vec![30.0]);
}

#[test]
fn test_selected_count_follows_window() {
    let dir = tif_set(10);

    for (start, end, step) in [(0, None, 1), (0, Some(10), 3), (1, Some(8), 2), (4, Some(20), 5), (9, None, 4)] {
        let config = ReaderConfig::new(tif_pattern(dir.path())).with_range(start, end, step);
        let mut reader = FrameReader::new(config).unwrap();
        reader.setup(0, 1).unwrap();

        let stop = end.unwrap_or(10).min(10);
        let expected = (stop - start + step - 1) / step;
        std::assert_eq!(reader.files().len(), expected, "window ({}, {:?}, {})", start, end, step);
    }
}

#[test]
fn test_divisible_workers_cover_selection() {
    let dir = tif_set(12);
    let mut total = 0;
    let mut seen = std::vec::Vec::new();

    for worker in 0..4 {
        let mut reader = FrameReader::new(ReaderConfig::new(tif_pattern(dir.path()))).unwrap();
        reader.setup(worker, 4).unwrap();
        total += reader.partition().count;
        seen.extend(first_values(&collect_frames(&mut reader).unwrap()));
    }

    std::assert_eq!(total, 12);
    std::assert_eq!(seen, (0..12).map(|i| (i * 100) as f32).collect::<std::vec::Vec<_>>());
}

#[test]
fn test_conversion_disabled_keeps_stored_kind() {
    let dir = tif_set(1);
    let config = ReaderConfig::new(tif_pattern(dir.path())).with_conversion(false);
    let mut reader = FrameReader::new(config).unwrap();
    reader.setup(0, 1).unwrap();

    let frames = collect_frames(&mut reader).unwrap();
    std::assert_eq!(frames[0].kind, Some(DataKind::U16));
    std::assert_eq!(frames[0].as_bytes().len(), 4 * 3 * 2);
    std::assert_eq!(&frames[0].as_bytes()[2..4], &1u16.to_ne_bytes());
}

#[test]
fn test_truncated_data_by_policy() {
    let dir = tempfile::tempdir().unwrap();
    let mut short = edf_image(4, 4, false, 5);
    short.truncate(short.len() - 32);
    write_file(dir.path(), "a_short.edf", &short);
    write_tiff_u16(dir.path(), "b_next.tif", 4, 4, 9);
    let pattern = format!("{}/*", dir.path().display());

    let mut strict = FrameReader::new(ReaderConfig::new(pattern.clone())).unwrap();
    strict.setup(0, 1).unwrap();
    std::assert!(std::matches!(collect_frames(&mut strict), Err(StreamError::TruncatedRead { .. })));

    let config = ReaderConfig::new(pattern).with_read_policy(ReadPolicy::BestEffort);
    let mut lenient = FrameReader::new(config).unwrap();
    lenient.setup(0, 1).unwrap();

    let frames = collect_frames(&mut lenient).unwrap();
    std::assert_eq!(frames.len(), 2);
    let values = frames[0].to_f32_vec().unwrap();
    std::assert_eq!(values[7], 12.0);
    std::assert!(values[8..].iter().all(|&v| v == 0.0));
    std::assert_eq!(first_values(&frames)[1], 9.0);
}

#[test]
fn test_truncated_header_by_policy() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a_broken.edf", &[b' '; 100]);
    write_tiff_u16(dir.path(), "b_next.tif", 2, 2, 3);
    let pattern = format!("{}/*", dir.path().display());

    let mut strict = FrameReader::new(ReaderConfig::new(pattern.clone())).unwrap();
    strict.setup(0, 1).unwrap();
    std::assert!(std::matches!(strict.requisition(), Err(StreamError::TruncatedRead { expected: 1024, actual: 100 })));

    let config = ReaderConfig::new(pattern).with_read_policy(ReadPolicy::BestEffort);
    let mut lenient = FrameReader::new(config).unwrap();
    lenient.setup(0, 1).unwrap();

    let frames = collect_frames(&mut lenient).unwrap();
    std::assert_eq!(frames.len(), 2);
    std::assert_eq!(frames[1].to_f32_vec().unwrap(), std::vec![3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn test_setup_errors() {
    let dir = tif_set(2);

    let mut reader = FrameReader::new(ReaderConfig::new(tif_pattern(dir.path())).with_range(3, Some(3), 1)).unwrap();
    std::assert!(std::matches!(reader.setup(0, 1), Err(StreamError::Setup(_))));

    let mut reader = FrameReader::new(ReaderConfig::new(tif_pattern(dir.path()))).unwrap();
    std::assert!(std::matches!(reader.setup(2, 2), Err(StreamError::Setup(_))));

    let mut reader = FrameReader::new(ReaderConfig::new(format!("{}/*.edf", dir.path().display()))).unwrap();
    std::assert!(std::matches!(reader.setup(0, 1), Err(StreamError::Setup(_))));
}

#[test]
fn test_config_file_drives_reader() {
    let dir = tif_set(4);
    let config_path = dir.path().join("reader.toml");
    std::fs::write(&config_path, std::format!(
        "path = \"{}\"\nstep = 2\nheight = 2\nenable-conversion = false\n", tif_pattern(dir.path()))).unwrap();

    let config = ReaderConfig::from_file(&config_path).unwrap();
    let mut reader = FrameReader::new(config).unwrap();
    reader.setup(0, 1).unwrap();

    let frames = collect_frames(&mut reader).unwrap();
    std::assert_eq!(frames.len(), 2);
    std::assert_eq!(frames[1].dims, [4, 2]);
    std::assert_eq!(&frames[1].as_bytes()[0..2], &200u16.to_ne_bytes());
}
