//! Row-reduction scheduler
//!
//! For one pivot step the rows strictly below the pivot are cut into
//! contiguous, disjoint chunks. Each chunk owns a mutable view of its rows of
//! A and B, so workers never touch the same row and no element-level locking
//! is needed. The pivot row and `B[norm]` are only read.
//!
//! Two schedules are supported:
//!
//! 1. **Dynamic**: chunks of `chunk_size` rows sit in a shared lock-free
//!    queue. Every worker pulls the next unclaimed chunk as soon as it
//!    finishes the previous one, without blocking. This absorbs scheduling-overhead variance across
//!    heterogeneous cores; the per-row cost is uniform within a step.
//!
//! 2. **Static**: one contiguous block of `ceil(rows / workers)` rows per
//!    worker, fixed up front.
//!
//! The worker pool is a dedicated rayon pool built once and reused for every
//! step. [`RowReductionScheduler::reduce_step`] runs inside a rayon scope and
//! returns only after every chunk of the step has been processed, which is
//! the end-of-step barrier.

use crate::config::Schedule;
use crate::error::Result;
use crate::store::SystemStore;
use crate::traits::Scalar;
use crossbeam::queue::SegQueue;
use ndarray::{ArrayView1, ArrayViewMut1, ArrayViewMut2, Axis, s};
use std::ops::Range;

/// Split `rows` into contiguous ranges of at most `chunk_size` rows.
///
/// The ranges are disjoint, in order, and their union is exactly `rows`.
/// A `chunk_size` of zero is treated as one.
pub fn partition_rows(rows: Range<usize>, chunk_size: usize) -> Vec<Range<usize>> {
    let chunk_size = chunk_size.max(1);
    let end = rows.end;
    rows.step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(end))
        .collect()
}

/// A contiguous block of rows owned by exactly one task.
#[derive(Debug)]
struct RowChunk<'a, T: Scalar> {
    rows: Range<usize>,
    a: ArrayViewMut2<'a, T>,
    b: ArrayViewMut1<'a, T>,
}

impl<T: Scalar> RowChunk<'_, T> {
    /// Eliminate column `norm` from every row of the chunk.
    #[inline]
    fn reduce(&mut self, norm: usize, pivot_row: &ArrayView1<'_, T>, pivot_rhs: T) {
        let pivot = pivot_row[norm];
        let pivot_tail = pivot_row.slice(s![norm..]);

        for (mut row, rhs) in self.a.outer_iter_mut().zip(self.b.iter_mut()) {
            let multiplier = row[norm] / pivot;
            row.slice_mut(s![norm..])
                .zip_mut_with(&pivot_tail, |a, &p| *a -= p * multiplier);
            *rhs -= pivot_rhs * multiplier;
        }
    }
}

/// Distributes the row updates of one elimination step over a worker pool.
#[derive(Debug)]
pub struct RowReductionScheduler {
    pool: rayon::ThreadPool,
    workers: usize,
    chunk_size: usize,
    schedule: Schedule,
}

impl RowReductionScheduler {
    /// Build the worker pool.
    ///
    /// `workers` and `chunk_size` are expected to be validated by the caller
    /// (see [`crate::GaussConfig::validate`]).
    pub fn new(workers: usize, chunk_size: usize, schedule: Schedule) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("gauss-worker-{i}"))
            .build()?;

        Ok(Self {
            pool,
            workers,
            chunk_size,
            schedule,
        })
    }

    /// Number of workers in the pool
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Rows per chunk for the dynamic schedule
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Active schedule
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Row ranges that step `norm` of an N×N system is cut into.
    pub fn plan(&self, dim: usize, norm: usize) -> Vec<Range<usize>> {
        let rows = (norm + 1)..dim;
        let chunk_size = match self.schedule {
            Schedule::Dynamic => self.chunk_size,
            Schedule::Static => rows.len().div_ceil(self.workers).max(1),
        };
        partition_rows(rows, chunk_size)
    }

    /// Update every row in `(norm, N)` against pivot row `norm`.
    ///
    /// Returns after all chunks have been drained.
    pub fn reduce_step<T: Scalar>(&self, store: &mut SystemStore<T>, norm: usize) -> Result<()> {
        let ranges = self.plan(store.dim(), norm);
        let views = store.split_for_step(norm)?;
        let pivot_row = views.pivot_row.view();
        let pivot_rhs = views.pivot_rhs;

        let mut chunks = Vec::with_capacity(ranges.len());
        let (mut rest_a, mut rest_b) = (views.rows, views.rhs);
        for range in ranges {
            let (a, tail_a) = rest_a.split_at(Axis(0), range.len());
            let (b, tail_b) = rest_b.split_at(Axis(0), range.len());
            chunks.push(RowChunk { rows: range, a, b });
            rest_a = tail_a;
            rest_b = tail_b;
        }
        debug_assert_eq!(rest_a.nrows(), 0);

        match self.schedule {
            Schedule::Dynamic => self.run_dynamic(chunks, norm, &pivot_row, pivot_rhs),
            Schedule::Static => self.run_static(chunks, norm, &pivot_row, pivot_rhs),
        }
        Ok(())
    }

    fn run_dynamic<T: Scalar>(
        &self,
        chunks: Vec<RowChunk<'_, T>>,
        norm: usize,
        pivot_row: &ArrayView1<'_, T>,
        pivot_rhs: T,
    ) {
        let active = self.workers.min(chunks.len());
        let queue = SegQueue::new();
        for chunk in chunks {
            queue.push(chunk);
        }

        self.pool.scope(|scope| {
            for _ in 0..active {
                let queue = &queue;
                scope.spawn(move |_| {
                    while let Some(mut chunk) = queue.pop() {
                        chunk.reduce(norm, pivot_row, pivot_rhs);
                    }
                });
            }
        });
        debug_assert!(queue.is_empty());
    }

    fn run_static<T: Scalar>(
        &self,
        chunks: Vec<RowChunk<'_, T>>,
        norm: usize,
        pivot_row: &ArrayView1<'_, T>,
        pivot_rhs: T,
    ) {
        self.pool.scope(|scope| {
            for mut chunk in chunks {
                scope.spawn(move |_| {
                    log::trace!("static block {:?} at step {}", chunk.rows, norm);
                    chunk.reduce(norm, pivot_row, pivot_rhs);
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    fn covers_exactly(ranges: &[Range<usize>], rows: Range<usize>) -> bool {
        let mut expected = rows.start;
        for r in ranges {
            if r.start != expected || r.is_empty() {
                return false;
            }
            expected = r.end;
        }
        expected == rows.end
    }

    #[test]
    fn test_partition_rows_disjoint_cover() {
        for start in 0..7 {
            for end in start..40 {
                for chunk in 1..9 {
                    let ranges = partition_rows(start..end, chunk);
                    assert!(covers_exactly(&ranges, start..end));
                    assert!(ranges.iter().all(|r| r.len() <= chunk));
                }
            }
        }
    }

    #[test]
    fn test_partition_rows_shapes() {
        assert_eq!(partition_rows(1..12, 5), vec![1..6, 6..11, 11..12]);
        assert_eq!(partition_rows(3..3, 5), Vec::<Range<usize>>::new());
        assert_eq!(partition_rows(0..4, 10), vec![0..4]);
    }

    #[test]
    fn test_plan_static_blocks() {
        let scheduler = RowReductionScheduler::new(3, 5, Schedule::Static).unwrap();
        let plan = scheduler.plan(11, 0);
        assert_eq!(plan, vec![1..5, 5..9, 9..11]);
        assert!(covers_exactly(&plan, 1..11));

        // fewer rows than workers
        let plan = scheduler.plan(11, 8);
        assert_eq!(plan, vec![9..10, 10..11]);
    }

    #[test]
    fn test_plan_dynamic_chunks() {
        let scheduler = RowReductionScheduler::new(2, 5, Schedule::Dynamic).unwrap();
        assert_eq!(scheduler.plan(13, 0), vec![1..6, 6..11, 11..13]);
        assert_eq!(scheduler.plan(13, 11), vec![12..13]);
    }

    #[test]
    fn test_reduce_step_single() {
        let a = array![[2.0_f64, 1.0], [1.0, 3.0]];
        let b = array![3.0_f64, 5.0];
        let mut store = SystemStore::from_parts(a, b).unwrap();

        let scheduler = RowReductionScheduler::new(1, 5, Schedule::Dynamic).unwrap();
        scheduler.reduce_step(&mut store, 0).unwrap();

        assert_eq!(store.get(0, 0).unwrap(), 2.0);
        assert_eq!(store.get(0, 1).unwrap(), 1.0);
        assert_eq!(store.get(1, 0).unwrap(), 0.0);
        assert_eq!(store.get(1, 1).unwrap(), 2.5);
        assert_eq!(store.get_b(0).unwrap(), 3.0);
        assert_eq!(store.get_b(1).unwrap(), 3.5);
    }

    #[test]
    fn test_reduce_step_leaves_upper_rows() {
        let n = 9;
        let a = Array2::from_shape_fn((n, n), |(i, j)| 1.0 + (i * n + j) as f64 * 0.25);
        let b = ndarray::Array1::from_shape_fn(n, |i| i as f64);
        let mut store = SystemStore::from_parts(a.clone(), b.clone()).unwrap();

        let scheduler = RowReductionScheduler::new(4, 2, Schedule::Dynamic).unwrap();
        scheduler.reduce_step(&mut store, 3).unwrap();

        for row in 0..=3 {
            for col in 0..n {
                assert_eq!(store.get(row, col).unwrap(), a[[row, col]]);
            }
            assert_eq!(store.get_b(row).unwrap(), b[row]);
        }
        for row in 4..n {
            // columns left of the pivot are untouched
            for col in 0..3 {
                assert_eq!(store.get(row, col).unwrap(), a[[row, col]]);
            }
            assert!(store.get(row, 3).unwrap().abs() < 1e-12);
        }
    }

    #[test]
    fn test_schedules_agree_bitwise() {
        let n = 23;
        let a = Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j { 50.0 } else { ((i * 7 + j * 3) % 11) as f32 * 0.5 }
        });
        let b = ndarray::Array1::from_shape_fn(n, |i| i as f32 - 4.0);

        let mut reference = SystemStore::from_parts(a.clone(), b.clone()).unwrap();
        let seq = RowReductionScheduler::new(1, 1, Schedule::Dynamic).unwrap();
        for norm in 0..n - 1 {
            seq.reduce_step(&mut reference, norm).unwrap();
        }

        for (workers, chunk, schedule) in [
            (2, 5, Schedule::Dynamic),
            (4, 3, Schedule::Dynamic),
            (3, 5, Schedule::Static),
            (8, 1, Schedule::Static),
        ] {
            let mut store = SystemStore::from_parts(a.clone(), b.clone()).unwrap();
            let scheduler = RowReductionScheduler::new(workers, chunk, schedule).unwrap();
            for norm in 0..n - 1 {
                scheduler.reduce_step(&mut store, norm).unwrap();
            }
            assert_eq!(store.a(), reference.a());
            assert_eq!(store.b(), reference.b());
        }
    }

    #[test]
    fn test_dynamic_more_chunks_than_workers() {
        // one row per chunk, far more chunks than workers: every row must be
        // claimed exactly once
        let n = 64;
        let a = Array2::from_shape_fn((n, n), |(i, j)| if i == j { 10.0 } else { 1.0_f64 });
        let b = ndarray::Array1::from_elem(n, 1.0_f64);

        let mut store = SystemStore::from_parts(a, b).unwrap();
        let scheduler = RowReductionScheduler::new(3, 1, Schedule::Dynamic).unwrap();
        scheduler.reduce_step(&mut store, 0).unwrap();

        for row in 1..n {
            assert_eq!(store.get(row, 0).unwrap(), 0.0);
            assert_eq!(store.get(row, row).unwrap(), 9.9);
            let off_diagonal = if row == 1 { 2 } else { 1 };
            assert_eq!(store.get(row, off_diagonal).unwrap(), 0.9);
            assert_eq!(store.get_b(row).unwrap(), 0.9);
        }
    }

    #[test]
    fn test_reduce_step_rejects_last_row() {
        let mut store = SystemStore::<f64>::new(3).unwrap();
        let scheduler = RowReductionScheduler::new(1, 5, Schedule::Dynamic).unwrap();
        assert!(scheduler.reduce_step(&mut store, 2).is_err());
    }
}
