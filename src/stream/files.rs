//! File-set resolution
//!
//! Expands a path, directory or glob pattern into the sorted list of
//! matching files and applies the configured start/end/step window.

use ::glob::{glob_with, MatchOptions};
use log::{debug, warn};
use std::env;
use std::path::{Path, PathBuf};

use crate::errors::{StreamError, StreamResult};
use crate::source::FormatKind;

/// A selected file together with the format its extension names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: FormatKind,
}

/// Turns a bare directory path into a pattern matching its entries
///
/// A string without `*` that does not end in a known image extension is
/// taken as a directory.
pub fn expand_pattern(pattern: &str) -> String {
    if pattern.contains('*') || FormatKind::from_path(Path::new(pattern)).is_valid() {
        return pattern.to_string();
    }

    Path::new(pattern).join("*").to_string_lossy().into_owned()
}

/// Lists the paths matching a glob pattern, sorted lexicographically
///
/// Supports `*`, `?` and `[...]` in any path component and a leading `~`.
/// Wildcards never match a leading `.` of an entry name.
pub fn glob(pattern: &str) -> StreamResult<Vec<PathBuf>> {
    let pattern = expand_home(pattern);
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..Default::default()
    };

    let paths = glob_with(&pattern, options)
        .map_err(|e| StreamError::Setup(format!("Invalid pattern `{}': {}", pattern, e)))?;
    let mut matches = paths.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StreamError::Setup(format!("Cannot list `{}': {}", e.path().display(), e.error())))?;
    matches.sort();

    debug!("Pattern {} matched {} entries", pattern, matches.len());
    Ok(matches)
}

fn expand_home(pattern: &str) -> String {
    if pattern == "~" || pattern.starts_with("~/") {
        if let Ok(home) = env::var("HOME") {
            return format!("{}{}", home, &pattern[1..]);
        }
    }
    pattern.to_string()
}

/// Applies the `[start, min(end, n))` window with `step` to the matches
///
/// Entries without a TIFF or EDF extension are skipped with a warning.
pub fn select_window(matches: &[PathBuf], start: usize, end: Option<usize>, step: usize) -> Vec<SourceFile> {
    let stop = end.unwrap_or(usize::MAX).min(matches.len());
    if start >= stop {
        return Vec::new();
    }

    matches[start..stop].iter()
        .step_by(step.max(1))
        .filter_map(|path| {
            let kind = FormatKind::from_path(path);
            if kind.is_valid() {
                Some(SourceFile { path: path.clone(), kind })
            } else {
                warn!("Ignoring `{}', no TIFF or EDF extension", path.display());
                None
            }
        })
        .collect()
}

/// Resolves the pattern and window into the list of files to read
pub fn resolve_files(pattern: &str, start: usize, end: Option<usize>, step: usize) -> StreamResult<Vec<SourceFile>> {
    if let Some(end) = end {
        if end <= start {
            return Err(StreamError::Setup(format!("End {} must be greater than start {}", end, start)));
        }
    }

    let pattern = expand_pattern(pattern);
    let matches = glob(&pattern)?;
    let selected = select_window(&matches, start, end, step);

    if selected.is_empty() {
        return Err(StreamError::Setup(format!("No files found matching `{}'", pattern)));
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            File::create(dir.join(name)).unwrap();
        }
    }

    #[test]
    fn test_expand_pattern() {
        assert_eq!(expand_pattern("/data/scan"), "/data/scan/*");
        assert_eq!(expand_pattern("/data/scan/*.tif"), "/data/scan/*.tif");
        assert_eq!(expand_pattern("/data/flat.edf"), "/data/flat.edf");
    }

    #[test]
    fn test_glob_classes_and_wildcards() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["scan_01.tif", "scan_51.tif", "xscan_01.tif", "ab.edf", "cb.edf"]);

        let names = |pattern: &str| -> Vec<String> {
            glob(&format!("{}/{}", dir.path().display(), pattern)).unwrap().iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };

        assert_eq!(names("scan_[0-4]?.t*"), vec!["scan_01.tif"]);
        assert_eq!(names("[!a]b.edf"), vec!["cb.edf"]);
        assert!(names("nothing*").is_empty());
    }

    #[test]
    fn test_malformed_pattern_is_setup_error() {
        assert!(matches!(glob("scan[.tif"), Err(StreamError::Setup(_))));
        assert!(matches!(glob("a/***/b"), Err(StreamError::Setup(_))));
    }

    #[test]
    fn test_glob_sorted_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["b.tif", "a.tif", ".hidden.tif", "c.edf"]);

        let pattern = format!("{}/*.tif", dir.path().display());
        let names: Vec<String> = glob(&pattern).unwrap().iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.tif", "b.tif"]);
    }

    #[test]
    fn test_glob_in_directory_component() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["run1", "run2"] {
            fs::create_dir(dir.path().join(sub)).unwrap();
            touch(&dir.path().join(sub), &["x.edf"]);
        }

        let pattern = format!("{}/run?/*.edf", dir.path().display());
        assert_eq!(glob(&pattern).unwrap().len(), 2);
    }

    #[test]
    fn test_window_and_extension_filter() {
        let matches: Vec<PathBuf> = ["0.tif", "1.tif", "2.txt", "3.tif", "4.edf", "5.tif"]
            .iter().map(PathBuf::from).collect();

        let all = select_window(&matches, 0, None, 1);
        assert_eq!(all.len(), 5);

        let strided = select_window(&matches, 1, Some(5), 2);
        assert_eq!(strided.iter().map(|f| f.path.clone()).collect::<Vec<_>>(),
                   vec![PathBuf::from("1.tif"), PathBuf::from("3.tif")]);

        let skipped = select_window(&matches, 2, Some(3), 1);
        assert!(skipped.is_empty());
        assert!(select_window(&matches, 9, None, 1).is_empty());
    }

    #[test]
    fn test_resolve_errors() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().to_string_lossy().into_owned();

        assert!(matches!(resolve_files(&pattern, 5, Some(5), 1), Err(StreamError::Setup(_))));
        assert!(matches!(resolve_files(&pattern, 0, None, 1), Err(StreamError::Setup(_))));

        touch(dir.path(), &["a.tif", "b.tif"]);
        let files = resolve_files(&pattern, 0, None, 1).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].kind, FormatKind::Tiff);
    }
}
