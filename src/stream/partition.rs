//! Division of the selected files among workers

use crate::errors::{StreamError, StreamResult};

/// Contiguous range of the selected files owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Partition {
    /// Index of the first owned file
    pub first: usize,
    /// Number of owned files
    pub count: usize,
}

impl Partition {
    /// One past the last owned file
    pub fn end(&self) -> usize {
        self.first + self.count
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.first && index < self.end()
    }
}

/// Computes the files owned by worker `worker_index` of `worker_count`
///
/// Every worker gets `selected / worker_count` files; the remaining
/// `selected % worker_count` files at the end belong to nobody.
pub fn assign(selected: usize, worker_index: usize, worker_count: usize) -> StreamResult<Partition> {
    if worker_count == 0 {
        return Err(StreamError::Setup("Worker count must be at least 1".to_string()));
    }
    if worker_index >= worker_count {
        return Err(StreamError::Setup(format!(
            "Worker index {} out of range for {} workers", worker_index, worker_count)));
    }

    let per_worker = selected / worker_count;
    Ok(Partition {
        first: worker_index * per_worker,
        count: per_worker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        assert_eq!(assign(10, 1, 2).unwrap(), Partition { first: 5, count: 5 });
    }

    #[test]
    fn test_remainder_dropped() {
        let partitions: Vec<Partition> = (0..3).map(|i| assign(10, i, 3).unwrap()).collect();
        assert_eq!(partitions.iter().map(|p| p.count).sum::<usize>(), 9);
        for pair in partitions.windows(2) {
            assert_eq!(pair[0].end(), pair[1].first);
        }
        assert!(!partitions.iter().any(|p| p.contains(9)));
    }

    #[test]
    fn test_more_workers_than_files() {
        assert_eq!(assign(2, 3, 4).unwrap().count, 0);
    }

    #[test]
    fn test_bad_worker_indices() {
        assert!(matches!(assign(10, 0, 0), Err(StreamError::Setup(_))));
        assert!(matches!(assign(10, 2, 2), Err(StreamError::Setup(_))));
    }
}
