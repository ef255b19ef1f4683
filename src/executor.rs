//! Injectable parallel executor for per-document stage work.
//!
//! Each pipeline stage fans its per-document tasks out through one of these.
//! `Pool` wraps a long-lived rayon thread pool, created once and reused
//! across every batch; `Serial` runs tasks inline on the caller thread and
//! exists for deterministic tests and single-core runs. Result order always
//! matches input order, which the alignment stage relies on.

use rayon::prelude::*;

use crate::error::{BookalignError, Result};

/// A parallel map strategy over a batch of independent tasks.
pub enum Executor {
    /// Run tasks inline, one at a time.
    Serial,
    /// Fan tasks out over a dedicated thread pool.
    Pool(rayon::ThreadPool),
}

impl Executor {
    /// Build an executor with `threads` workers.
    ///
    /// `threads == 1` selects the serial strategy; `threads == 0` sizes the
    /// pool to the number of available cores.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 1 {
            return Ok(Self::Serial);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| BookalignError::Other(format!("failed to build thread pool: {e}")))?;
        Ok(Self::Pool(pool))
    }

    /// Apply `f` to every item, returning results in input order.
    pub fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        match self {
            Self::Serial => items.into_iter().map(f).collect(),
            Self::Pool(pool) => pool.install(|| items.into_par_iter().map(f).collect()),
        }
    }

    /// Number of worker threads, 1 for the serial strategy.
    pub fn threads(&self) -> usize {
        match self {
            Self::Serial => 1,
            Self::Pool(pool) => pool.current_num_threads(),
        }
    }
}

/// Outcome of one per-document task.
///
/// Skips and failures are aggregated explicitly by the stage drivers
/// instead of vanishing inside the worker.
#[derive(Debug)]
pub enum TaskOutcome<T> {
    Ok(T),
    Skipped(String),
    Failed(String),
}

impl<T> TaskOutcome<T> {
    /// Convert to an option, handing skip/failure text to `on_drop`.
    pub fn into_option(self, on_drop: impl FnOnce(&str, bool)) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Skipped(reason) => {
                on_drop(&reason, false);
                None
            }
            Self::Failed(error) => {
                on_drop(&error, true);
                None
            }
        }
    }
}
