//! Elimination driver
//!
//! The outer loop over pivot positions is sequential: step `norm + 1` reads
//! `A[r][norm + 1]` and `A[norm + 1][norm + 1]`, which are final only once
//! step `norm` has finished for every row. Each step is handed to the
//! [`RowReductionScheduler`], which returns only after its barrier, so an
//! N×N solve performs exactly N - 1 barriers. Back-substitution follows on
//! the calling thread.

use crate::back_substitution::back_substitute_store;
use crate::cancel::CancelToken;
use crate::config::GaussConfig;
use crate::error::{GaussError, Result};
use crate::report::SolveTiming;
use crate::scheduler::RowReductionScheduler;
use crate::store::{SystemStore, validate_shape};
use crate::traits::Scalar;
use cpu_time::ProcessTime;
use ndarray::{Array1, Array2};
use std::time::Instant;

/// Parallel Gaussian elimination solver without pivoting.
///
/// Owns the worker pool; one solver can be reused for many systems.
#[derive(Debug)]
pub struct GaussSolver {
    config: GaussConfig,
    scheduler: RowReductionScheduler,
    cancel: Option<CancelToken>,
}

impl GaussSolver {
    /// Validate `config` and build the worker pool.
    pub fn new(config: GaussConfig) -> Result<Self> {
        config.validate()?;
        let scheduler =
            RowReductionScheduler::new(config.workers, config.chunk_size, config.schedule)?;
        Ok(Self {
            config,
            scheduler,
            cancel: None,
        })
    }

    /// Check `token` before every elimination step.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &GaussConfig {
        &self.config
    }

    /// Underlying row-reduction scheduler
    pub fn scheduler(&self) -> &RowReductionScheduler {
        &self.scheduler
    }

    /// Reduce A and B in place so that A is upper triangular.
    ///
    /// Diagonal entries are left unnormalized.
    pub fn forward_eliminate<T: Scalar>(&self, store: &mut SystemStore<T>) -> Result<usize> {
        let n = store.dim();
        let steps = n.saturating_sub(1);
        let mut warned = false;

        for norm in 0..steps {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                log::info!("elimination cancelled at step {norm}/{steps}");
                return Err(GaussError::Cancelled { step: norm });
            }

            let pivot = store.get(norm, norm)?;
            if self.config.pivot_policy.screen(norm, pivot)? && !warned {
                log::warn!("degenerate pivot at step {norm} ({pivot}); result will not be finite");
                warned = true;
            }

            self.scheduler.reduce_step(store, norm)?;

            if self.config.progress_every > 0 && (norm + 1) % self.config.progress_every == 0 {
                log::debug!("elimination step {}/{}", norm + 1, steps);
            }
        }

        Ok(steps)
    }

    /// Solve the system held by `store`, writing X into it.
    pub fn solve<T: Scalar>(&self, store: &mut SystemStore<T>) -> Result<SolveTiming> {
        let n = store.dim();
        if n > self.config.capacity {
            return Err(GaussError::InvalidDimension {
                dim: i64::try_from(n).unwrap_or(i64::MAX),
                capacity: self.config.capacity,
            });
        }

        log::info!(
            "solving N = {} with {} workers, chunk size {}, {:?} schedule",
            n,
            self.config.workers,
            self.config.chunk_size,
            self.config.schedule
        );

        store.clear_solution();

        let cpu_start = ProcessTime::try_now().ok();
        let start = Instant::now();
        let steps = self.forward_eliminate(store)?;
        let elimination = start.elapsed();

        let start = Instant::now();
        back_substitute_store(store, self.config.pivot_policy)?;
        let back_substitution = start.elapsed();

        // CPU time of the whole process, so worker threads are included
        let cpu = cpu_start.and_then(|begin| {
            ProcessTime::try_now()
                .ok()
                .map(|end| end.duration_since(begin))
        });

        let timing = SolveTiming {
            elimination,
            back_substitution,
            cpu,
            steps,
        };
        log::info!(
            "solved N = {} in {:.3} ms ({} steps)",
            n,
            timing.total().as_secs_f64() * 1000.0,
            steps
        );
        Ok(timing)
    }

    /// Solve `a·x = b` for arrays owned by the caller.
    ///
    /// `a` and `b` are reduced in place exactly as the store would be; they
    /// are handed back even when the solve fails part-way.
    pub fn solve_arrays<T: Scalar>(
        &self,
        a: &mut Array2<T>,
        b: &mut Array1<T>,
    ) -> Result<Array1<T>> {
        validate_shape(a.nrows(), a.ncols(), b.len(), self.config.capacity)?;

        let mut store = SystemStore::from_parts_with_capacity(
            std::mem::replace(a, Array2::zeros((0, 0))),
            std::mem::replace(b, Array1::zeros(0)),
            self.config.capacity,
        )?;
        let outcome = self.solve(&mut store);

        let (reduced_a, reduced_b, x) = store.into_parts();
        *a = reduced_a;
        *b = reduced_b;
        outcome.map(|_| x)
    }
}

/// Solve `a·x = b` with `workers` threads and `chunk_size` rows per chunk.
///
/// Uses the default pivot policy (fail fast) and the dynamic schedule. The
/// dimension and worker count are checked before the pool is built.
pub fn solve<T: Scalar>(
    a: &mut Array2<T>,
    b: &mut Array1<T>,
    workers: usize,
    chunk_size: usize,
) -> Result<Array1<T>> {
    let config = GaussConfig::new(workers, chunk_size);
    config.validate()?;
    validate_shape(a.nrows(), a.ncols(), b.len(), config.capacity)?;
    GaussSolver::new(config)?.solve_arrays(a, b)
}
