//! Solver configuration
//!
//! [`GaussConfig`] carries every tunable of a solve: worker count, chunk
//! size, schedule, pivot policy, and the dimension ceiling. It can be loaded
//! from and saved to JSON.

use crate::error::{GaussError, Result};
use crate::store::MAX_DIMENSION;
use crate::traits::Scalar;
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

/// Default number of rows per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// Default fail-fast pivot tolerance.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-30;

/// How the rows below a pivot are distributed over the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// Workers pull fixed-size chunks from a shared queue until it is empty.
    #[default]
    Dynamic,
    /// Each worker receives one contiguous block of rows.
    Static,
}

/// What to do when a pivot is zero or near zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PivotPolicy {
    /// Stop with [`GaussError::SingularPivot`] when `|pivot| <= tolerance`.
    FailFast {
        /// Magnitude at or below which a pivot is rejected
        tolerance: f64,
    },
    /// Divide anyway and let NaN/Infinity flow through the result.
    Propagate,
}

impl Default for PivotPolicy {
    fn default() -> Self {
        PivotPolicy::FailFast {
            tolerance: DEFAULT_PIVOT_TOLERANCE,
        }
    }
}

impl PivotPolicy {
    /// Screen a pivot value.
    ///
    /// Returns `Ok(true)` when the pivot is degenerate but the policy lets
    /// the division go ahead, `Ok(false)` for a usable pivot.
    pub fn screen<T: Scalar>(&self, row: usize, pivot: T) -> Result<bool> {
        match *self {
            PivotPolicy::FailFast { tolerance } => {
                if pivot.is_degenerate_pivot(tolerance) {
                    return Err(GaussError::SingularPivot {
                        row,
                        value: pivot.widen(),
                        tolerance,
                    });
                }
                Ok(false)
            }
            PivotPolicy::Propagate => Ok(pivot.is_degenerate_pivot(0.0)),
        }
    }
}

/// Pivot policy selected without a tolerance, as given on a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotMode {
    FailFast,
    Propagate,
}

/// Values that replace fields of a loaded [`GaussConfig`].
///
/// `None` keeps whatever the file (or the defaults) provided.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub workers: Option<usize>,
    pub chunk_size: Option<usize>,
    pub schedule: Option<Schedule>,
    pub pivot_mode: Option<PivotMode>,
    /// A tolerance on its own selects fail-fast
    pub tolerance: Option<f64>,
    pub progress_every: Option<usize>,
}

/// Complete solver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussConfig {
    /// Number of worker threads in the pool
    pub workers: usize,
    /// Rows per chunk for the dynamic schedule
    pub chunk_size: usize,
    /// Row distribution strategy
    pub schedule: Schedule,
    /// Degenerate pivot handling
    pub pivot_policy: PivotPolicy,
    /// Largest accepted dimension
    pub capacity: usize,
    /// Log progress every N elimination steps (0 = no output)
    pub progress_every: usize,
}

impl Default for GaussConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            chunk_size: DEFAULT_CHUNK_SIZE,
            schedule: Schedule::default(),
            pivot_policy: PivotPolicy::default(),
            capacity: MAX_DIMENSION,
            progress_every: 0,
        }
    }
}

impl GaussConfig {
    /// Configuration with an explicit worker count and chunk size.
    pub fn new(workers: usize, chunk_size: usize) -> Self {
        Self {
            workers,
            chunk_size,
            ..Self::default()
        }
    }

    /// Check the pre-flight constraints.
    pub fn validate(&self) -> Result<()> {
        if self.workers < 1 {
            return Err(GaussError::InvalidWorkerCount {
                workers: self.workers as i64,
            });
        }
        if self.chunk_size < 1 {
            return Err(GaussError::InvalidChunkSize {
                chunk_size: self.chunk_size,
            });
        }
        if self.capacity < 1 {
            return Err(GaussError::Config(format!(
                "capacity must be >= 1, got {}",
                self.capacity
            )));
        }
        if let PivotPolicy::FailFast { tolerance } = self.pivot_policy {
            if !(tolerance >= 0.0 && tolerance.is_finite()) {
                return Err(GaussError::Config(format!(
                    "pivot tolerance must be finite and >= 0, got {tolerance}"
                )));
            }
        }
        Ok(())
    }

    /// Replace every field named in `overrides`, then validate.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(chunk_size) = overrides.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(schedule) = overrides.schedule {
            self.schedule = schedule;
        }
        if let Some(progress_every) = overrides.progress_every {
            self.progress_every = progress_every;
        }

        let current_tolerance = match self.pivot_policy {
            PivotPolicy::FailFast { tolerance } => tolerance,
            PivotPolicy::Propagate => DEFAULT_PIVOT_TOLERANCE,
        };
        match (overrides.pivot_mode, overrides.tolerance) {
            (Some(PivotMode::Propagate), _) => self.pivot_policy = PivotPolicy::Propagate,
            (Some(PivotMode::FailFast), tolerance) => {
                self.pivot_policy = PivotPolicy::FailFast {
                    tolerance: tolerance.unwrap_or(current_tolerance),
                }
            }
            (None, Some(tolerance)) => self.pivot_policy = PivotPolicy::FailFast { tolerance },
            (None, None) => {}
        }

        self.validate()
    }

    /// Load configuration from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| GaussError::Config(format!("failed to read config file: {e}")))?;

        let config: GaussConfig = serde_json::from_str(&contents)
            .map_err(|e| GaussError::Config(format!("failed to parse JSON: {e}")))?;

        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GaussError::Config(format!("failed to serialize config: {e}")))?;

        fs::write(path, json)
            .map_err(|e| GaussError::Config(format!("failed to write config file: {e}")))?;

        Ok(())
    }
}
