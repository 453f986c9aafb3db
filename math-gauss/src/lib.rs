//! Parallel dense Gaussian elimination for shared-memory benchmarking
//!
//! This crate solves `A·X = B` for a dense N×N system by Gaussian elimination
//! without pivoting. Forward elimination is parallelized across a fixed pool
//! of worker threads; back-substitution is sequential. It is meant for
//! measuring parallel kernels, not as a numerically robust solver.
//!
//! # Features
//!
//! - **Store**: owned, bounds-checked A/B/X with a capacity ceiling
//! - **Driver**: sequential loop over pivots with one barrier per step
//! - **Scheduler**: disjoint row chunks, dynamic (pull-based) or static
//! - **Back-substitution**: sequential, last row first
//! - **Pivot policy**: fail fast on a degenerate pivot, or let NaN/Infinity propagate
//! - **Generic Scalar Types**: `f32` and `f64`
//!
//! # Example
//!
//! ```
//! use math_gauss::solve;
//! use ndarray::array;
//!
//! let mut a = array![[2.0_f32, 1.0], [1.0, 3.0]];
//! let mut b = array![3.0_f32, 5.0];
//! let x = solve(&mut a, &mut b, 2, 5)?;
//! assert!((x[0] - 0.8).abs() < 1e-5);
//! assert!((x[1] - 1.4).abs() < 1e-5);
//! # Ok::<(), math_gauss::GaussError>(())
//! ```

pub mod back_substitution;
pub mod cancel;
pub mod config;
pub mod elimination;
pub mod error;
pub mod generate;
pub mod report;
pub mod scheduler;
pub mod store;
pub mod traits;

// Re-export main types
pub use cancel::CancelToken;
pub use config::{ConfigOverrides, GaussConfig, PivotMode, PivotPolicy, Schedule};
pub use elimination::{GaussSolver, solve};
pub use error::{GaussError, Result};
pub use scheduler::{RowReductionScheduler, partition_rows};
pub use store::{MAX_DIMENSION, SystemStore, checked_dimension, checked_workers};
pub use traits::Scalar;

// Re-export collaborators
pub use back_substitution::back_substitute;
pub use generate::{diagonally_dominant_system, random_system};
pub use report::{SolveReport, SolveTiming, max_residual};
