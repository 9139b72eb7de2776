//! # Paged Collection Mapper
//!
//! Decodes every entry of a page on a bounded worker pool. Output slot `i`
//! always holds the result for input `i`, and when several entries fail the
//! one with the lowest index is reported, no matter which worker finished
//! first. Either every entry maps or the caller gets a single error; partial
//! pages never escape.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::MAX_PAGE_WORKERS;

/// Worker settings for page decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperConfig {
    /// Pool size. Zero is treated as one.
    pub workers: usize,
}

impl MapperConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    fn effective_workers(&self) -> usize {
        self.workers.clamp(1, MAX_PAGE_WORKERS)
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        let available = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self {
            workers: available.min(MAX_PAGE_WORKERS),
        }
    }
}

#[derive(Debug, Error)]
pub enum PageError<E: std::error::Error + 'static> {
    /// The lowest-indexed entry that failed to map.
    #[error("page entry {index} failed: {source}")]
    Entry {
        index: usize,
        #[source]
        source: E,
    },

    #[error("could not start page workers: {0}")]
    Pool(#[from] ThreadPoolBuildError),
}

impl<E: std::error::Error + 'static> PageError<E> {
    /// Index of the failing entry, if an entry failed.
    pub fn index(&self) -> Option<usize> {
        match self {
            PageError::Entry { index, .. } => Some(*index),
            PageError::Pool(_) => None,
        }
    }
}

/// A reusable pool for mapping pages.
pub struct PageMapper {
    pool: ThreadPool,
}

impl PageMapper {
    pub fn new(config: &MapperConfig) -> Result<Self, ThreadPoolBuildError> {
        let workers = config.effective_workers();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("page-mapper-{i}"))
            .build()?;
        debug!(workers, "page mapper pool started");
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Maps `entries` through `f`, preserving order.
    pub fn map<T, R, E, F>(&self, entries: Vec<T>, f: F) -> Result<Vec<R>, PageError<E>>
    where
        T: Send,
        R: Send,
        E: std::error::Error + Send + 'static,
        F: Fn(T) -> Result<R, E> + Sync + Send,
    {
        let count = entries.len();
        // Every entry runs to completion; the scan below picks the winner.
        let results: Vec<Result<R, E>> = self
            .pool
            .install(|| entries.into_par_iter().map(&f).collect());

        let mut mapped = Vec::with_capacity(count);
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(value) => mapped.push(value),
                Err(source) => {
                    warn!(index, count, error = %source, "page entry failed to map");
                    return Err(PageError::Entry { index, source });
                }
            }
        }
        debug!(count, "page mapped");
        Ok(mapped)
    }
}

/// One-shot form of [`PageMapper::map`].
pub fn map_ordered<T, R, E, F>(
    entries: Vec<T>,
    config: &MapperConfig,
    f: F,
) -> Result<Vec<R>, PageError<E>>
where
    T: Send,
    R: Send,
    E: std::error::Error + Send + 'static,
    F: Fn(T) -> Result<R, E> + Sync + Send,
{
    PageMapper::new(config)?.map(entries, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, Error, PartialEq)]
    #[error("bad entry {0}")]
    struct BadEntry(usize);

    #[test]
    fn test_order_preserved() {
        let entries: Vec<usize> = (0..200).collect();
        let out = map_ordered(entries, &MapperConfig::with_workers(8), |i| {
            if i % 7 == 0 {
                std::thread::sleep(Duration::from_millis(1));
            }
            Ok::<_, BadEntry>(i * 2)
        })
        .unwrap();
        assert_eq!(out, (0..200).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_lowest_failing_index_wins() {
        let entries: Vec<usize> = (0..6).collect();
        let err = map_ordered(entries, &MapperConfig::with_workers(4), |i| match i {
            2 => {
                std::thread::sleep(Duration::from_millis(50));
                Err(BadEntry(2))
            }
            4 => Err(BadEntry(4)),
            _ => Ok(i),
        })
        .unwrap_err();

        assert_eq!(err.index(), Some(2));
        match err {
            PageError::Entry { source, .. } => assert_eq!(source, BadEntry(2)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_fast_failure_among_slow_entries() {
        let entries: Vec<usize> = (0..5).collect();
        let err = map_ordered(entries, &MapperConfig::with_workers(5), |i| {
            if i == 2 {
                return Err(BadEntry(2));
            }
            std::thread::sleep(Duration::from_millis(30));
            Ok(i)
        })
        .unwrap_err();

        assert_eq!(err.index(), Some(2));
    }

    #[test]
    fn test_every_entry_runs_despite_failure() {
        let calls = AtomicUsize::new(0);
        let result = map_ordered((0..10).collect(), &MapperConfig::with_workers(2), |i: usize| {
            calls.fetch_add(1, Ordering::SeqCst);
            if i == 0 {
                Err(BadEntry(0))
            } else {
                Ok(i)
            }
        });
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_empty_page() {
        let out = map_ordered(Vec::<u8>::new(), &MapperConfig::default(), |b| {
            Ok::<_, BadEntry>(b)
        })
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_worker_bounds() {
        assert_eq!(PageMapper::new(&MapperConfig::with_workers(0)).unwrap().workers(), 1);
        assert_eq!(
            PageMapper::new(&MapperConfig::with_workers(1000)).unwrap().workers(),
            MAX_PAGE_WORKERS
        );
        let default = MapperConfig::default();
        assert!(default.workers >= 1 && default.workers <= MAX_PAGE_WORKERS);
    }
}
