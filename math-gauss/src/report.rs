//! Timing, residuals, and console formatting
//!
//! Nothing in this module affects computed values. Matrices and vectors are
//! only rendered for small systems (N < [`PRINT_LIMIT`]).

use crate::config::{GaussConfig, Schedule};
use crate::store::SystemStore;
use crate::traits::Scalar;
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;
use std::time::Duration;

/// Systems at or above this dimension are not printed.
pub const PRINT_LIMIT: usize = 10;

/// Time spent in each phase of one solve
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolveTiming {
    /// Forward elimination wall time (all pivot steps and their barriers)
    pub elimination: Duration,
    /// Sequential back-substitution wall time
    pub back_substitution: Duration,
    /// Process CPU time over both phases, summed across all threads.
    /// `None` when the platform has no process CPU clock.
    pub cpu: Option<Duration>,
    /// Number of elimination steps executed (N - 1)
    pub steps: usize,
}

impl SolveTiming {
    /// Elimination plus back-substitution
    pub fn total(&self) -> Duration {
        self.elimination + self.back_substitution
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Serializable summary of one benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    /// Matrix dimension N
    pub dimension: usize,
    /// Worker threads used
    pub workers: usize,
    /// Rows per chunk
    pub chunk_size: usize,
    /// Row distribution strategy
    pub schedule: Schedule,
    /// Random seed of the generated inputs
    pub seed: Option<u64>,
    /// Total elapsed wall time (ms)
    pub elapsed_ms: f64,
    /// Forward elimination wall time (ms)
    pub elimination_ms: f64,
    /// Back-substitution wall time (ms)
    pub back_substitution_ms: f64,
    /// Process CPU time over the solve (ms)
    pub cpu_ms: Option<f64>,
    /// `max_i |(A·X)_i - B_i|` against the original inputs, when checked
    pub max_residual: Option<f64>,
}

impl SolveReport {
    /// Build a report from a finished solve.
    pub fn new(config: &GaussConfig, dimension: usize, seed: Option<u64>, timing: &SolveTiming) -> Self {
        Self {
            dimension,
            workers: config.workers,
            chunk_size: config.chunk_size,
            schedule: config.schedule,
            seed,
            elapsed_ms: millis(timing.total()),
            elimination_ms: millis(timing.elimination),
            back_substitution_ms: millis(timing.back_substitution),
            cpu_ms: timing.cpu.map(millis),
            max_residual: None,
        }
    }

    /// Attach a residual measurement.
    pub fn with_residual(mut self, residual: f64) -> Self {
        self.max_residual = Some(residual);
        self
    }
}

/// `max_i |(A·X)_i - B_i|`, accumulated in `f64`.
///
/// Any NaN in the residual makes the result NaN.
pub fn max_residual<T: Scalar>(a: ArrayView2<'_, T>, b: ArrayView1<'_, T>, x: ArrayView1<'_, T>) -> f64 {
    a.outer_iter()
        .zip(b.iter())
        .map(|(row, &bi)| {
            let ax: f64 = row
                .iter()
                .zip(x.iter())
                .map(|(&aij, &xj)| aij.widen() * xj.widen())
                .sum();
            (ax - bi.widen()).abs()
        })
        .fold(0.0, |acc: f64, r| if r.is_nan() || r > acc { r } else { acc })
}

/// Render the run parameters.
pub fn format_parameters(config: &GaussConfig, dimension: usize, seed: Option<u64>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Matrix dimension N = {dimension}.");
    let _ = writeln!(out, "Number of workers P = {}.", config.workers);
    let _ = writeln!(out, "Chunk size = {} ({:?} schedule).", config.chunk_size, config.schedule);
    match seed {
        Some(seed) => {
            let _ = writeln!(out, "Random seed = {seed}");
        }
        None => {
            let _ = writeln!(out, "Random seed = (none)");
        }
    }
    out
}

fn format_vector<T: Scalar>(name: &str, v: ArrayView1<'_, T>) -> String {
    let mut out = format!("{name} = [");
    let n = v.len();
    for (i, value) in v.iter().enumerate() {
        let sep = if i + 1 < n { "; " } else { "]\n" };
        let _ = write!(out, "{value:5.2}{sep}");
    }
    out
}

/// Render A and B, or `None` when the system is too large to print.
pub fn format_inputs<T: Scalar>(store: &SystemStore<T>) -> Option<String> {
    let n = store.dim();
    if n >= PRINT_LIMIT {
        return None;
    }

    let mut out = String::from("A =\n\t");
    for row in store.a().outer_iter() {
        for (col, value) in row.iter().enumerate() {
            let sep = if col + 1 < n { ", " } else { ";\n\t" };
            let _ = write!(out, "{value:5.2}{sep}");
        }
    }
    out.push('\n');
    out.push_str(&format_vector("B", store.b()));
    Some(out)
}

/// Render X, or `None` when the system is too large to print.
pub fn format_solution<T: Scalar>(store: &SystemStore<T>) -> Option<String> {
    if store.dim() >= PRINT_LIMIT {
        return None;
    }
    Some(format_vector("X", store.x()))
}

/// Render the timing block of a report.
pub fn format_timing(report: &SolveReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Elapsed time = {:.3} ms.", report.elapsed_ms);
    let _ = writeln!(out, "  forward elimination = {:.3} ms", report.elimination_ms);
    let _ = writeln!(out, "  back substitution   = {:.3} ms", report.back_substitution_ms);
    if let Some(cpu_ms) = report.cpu_ms {
        let _ = writeln!(out, "CPU time = {cpu_ms:.3} ms (all threads).");
    }
    if let Some(residual) = report.max_residual {
        let _ = writeln!(out, "Max residual |A*X - B| = {residual:.3e}");
    }
    let _ = writeln!(out, "--------------------------------------------");
    out
}
