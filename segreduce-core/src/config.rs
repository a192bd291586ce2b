//! Reduction configuration: how many worker threads a reducer may use and how
//! much work a call needs before it leaves the sequential path.

use crate::error::SegReduceError;
use rayon::ThreadPool;
use std::sync::Arc;

/// Element count (`rows * cols` actually visited) from which reducers go parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 32_768;

/// User-facing reduction settings.
///
/// ```
/// use segreduce_core::ReductionConfig;
///
/// let executor = ReductionConfig::default()
///     .with_num_threads(4)
///     .with_parallel_threshold(1 << 16)
///     .build()
///     .unwrap();
/// assert_eq!(executor.current_num_threads(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionConfig {
    /// Size of a dedicated worker pool. `None` runs on rayon's global pool.
    pub num_threads: Option<usize>,
    /// Minimum visited element count for the parallel path.
    pub parallel_threshold: usize,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        ReductionConfig {
            num_threads: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ReductionConfig {
    /// A configuration that never leaves the calling thread.
    pub fn sequential() -> Self {
        ReductionConfig {
            num_threads: Some(1),
            parallel_threshold: usize::MAX,
        }
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    /// Builds the executor, creating a dedicated thread pool when `num_threads` is set.
    ///
    /// A single-thread configuration never spawns a pool.
    pub fn build(&self) -> Result<Executor, SegReduceError> {
        let pool = match self.num_threads {
            Some(n) if n > 1 => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("segreduce-{}", i))
                    .build()?;
                log::debug!("Executor: built dedicated pool with {} threads", n);
                Some(Arc::new(pool))
            }
            _ => None,
        };
        Ok(Executor {
            pool,
            single_threaded: matches!(self.num_threads, Some(n) if n <= 1),
            parallel_threshold: self.parallel_threshold,
        })
    }
}

/// Runs reduction kernels according to a `ReductionConfig`.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone)]
pub struct Executor {
    pool: Option<Arc<ThreadPool>>,
    single_threaded: bool,
    parallel_threshold: usize,
}

impl Default for Executor {
    /// Global rayon pool, default threshold.
    fn default() -> Self {
        Executor {
            pool: None,
            single_threaded: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl Executor {
    pub fn current_num_threads(&self) -> usize {
        if self.single_threaded {
            return 1;
        }
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Whether a call visiting `work` elements should use the parallel path.
    pub(crate) fn is_parallel(&self, work: usize) -> bool {
        work >= self.parallel_threshold && self.current_num_threads() > 1
    }

    /// Runs `op` inside the dedicated pool, or on the global pool otherwise.
    pub(crate) fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
