//! Serial and multi-threaded execution of the per-item and per-agent phases.
//!
//! Every primitive returns its outputs in index order, and reductions are
//! expressed as fixed partitions merged by the caller in partition order.
//! Worker scheduling therefore never changes a result: the parallel path is
//! bit-identical to the serial one.

use std::ops::Range;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AllocationError, AllocationResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecutionStrategy {
    #[default]
    Serial,
    /// Data-parallel via rayon. `threads: None` runs on the global pool.
    Parallel {
        #[serde(default)]
        threads: Option<usize>,
    },
}

impl ExecutionStrategy {
    pub fn parallel() -> Self {
        Self::Parallel { threads: None }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, Self::Parallel { .. })
    }

    /// Run `op` inside the worker pool this strategy asks for.
    ///
    /// Only `Parallel { threads: Some(k) }` builds a dedicated pool; the
    /// other variants run `op` directly on the calling thread.
    pub fn install<R, F>(&self, op: F) -> AllocationResult<R>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match *self {
            Self::Parallel {
                threads: Some(threads),
            } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| AllocationError::WorkerPool(e.to_string()))?;
                Ok(pool.install(op))
            }
            _ => Ok(op()),
        }
    }

    /// `f(0), f(1), .., f(len - 1)`, collected in index order.
    pub fn map_range<T, F>(&self, len: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            Self::Serial => (0..len).map(f).collect(),
            Self::Parallel { .. } => (0..len).into_par_iter().map(f).collect(),
        }
    }

    /// Split `0..len` into consecutive partitions of `size` indices (the last
    /// one may be shorter) and map each partition, in partition order.
    pub fn map_partitions<T, F>(&self, len: usize, size: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Range<usize>) -> T + Sync + Send,
    {
        let size = size.max(1);
        let partitions = len.div_ceil(size);
        let bounds = |p: usize| p * size..((p + 1) * size).min(len);
        match self {
            Self::Serial => (0..partitions).map(|p| f(bounds(p))).collect(),
            Self::Parallel { .. } => (0..partitions)
                .into_par_iter()
                .map(|p| f(bounds(p)))
                .collect(),
        }
    }
}
