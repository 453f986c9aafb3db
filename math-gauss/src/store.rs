//! Matrix/vector store for one solve
//!
//! [`SystemStore`] exclusively owns the coefficient matrix `A`, the
//! right-hand side `B`, and the solution `X` of an N×N system. The dimension
//! is fixed at construction and bounded by a capacity ceiling.
//!
//! Element access is bounds-checked. The elimination kernels do not go
//! through the checked accessors: they borrow disjoint row views via
//! [`SystemStore::split_for_step`] so that workers updating different rows
//! never have to synchronize.

use crate::error::{GaussError, Result};
use crate::traits::Scalar;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis};

/// Default dimension ceiling.
pub const MAX_DIMENSION: usize = 10_000;

/// Validate a signed dimension against a capacity ceiling.
///
/// Accepts `1..=capacity`; zero and negative values are rejected before any
/// allocation happens.
pub fn checked_dimension(dim: i64, capacity: usize) -> Result<usize> {
    match usize::try_from(dim) {
        Ok(n) if n >= 1 && n <= capacity => Ok(n),
        _ => Err(GaussError::InvalidDimension { dim, capacity }),
    }
}

/// Validate a signed worker count.
pub fn checked_workers(workers: i64) -> Result<usize> {
    match usize::try_from(workers) {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(GaussError::InvalidWorkerCount { workers }),
    }
}

fn dimension_error(dim: usize, capacity: usize) -> GaussError {
    GaussError::InvalidDimension {
        dim: i64::try_from(dim).unwrap_or(i64::MAX),
        capacity,
    }
}

/// Check that `(rows, cols, rhs_len)` describes a square system within capacity.
pub fn validate_shape(rows: usize, cols: usize, rhs_len: usize, capacity: usize) -> Result<()> {
    if rows < 1 || rows > capacity {
        return Err(dimension_error(rows, capacity));
    }
    if cols != rows {
        return Err(GaussError::DimensionMismatch {
            expected: rows,
            got: cols,
        });
    }
    if rhs_len != rows {
        return Err(GaussError::DimensionMismatch {
            expected: rows,
            got: rhs_len,
        });
    }
    Ok(())
}

/// Mutable views handed to the row-reduction scheduler for one pivot step.
///
/// `pivot_row` and `pivot_rhs` are the inputs of the step and are only ever
/// read; `rows` and `rhs` cover exactly the rows strictly below the pivot.
#[derive(Debug)]
pub struct StepViews<'a, T: Scalar> {
    /// Row `norm` of A
    pub pivot_row: ArrayViewMut1<'a, T>,
    /// `B[norm]`
    pub pivot_rhs: T,
    /// Rows `norm+1..N` of A
    pub rows: ArrayViewMut2<'a, T>,
    /// Entries `norm+1..N` of B
    pub rhs: ArrayViewMut1<'a, T>,
}

/// Dense N×N system `A·X = B`
#[derive(Debug, Clone)]
pub struct SystemStore<T: Scalar> {
    a: Array2<T>,
    b: Array1<T>,
    x: Array1<T>,
    capacity: usize,
}

impl<T: Scalar> SystemStore<T> {
    /// Zero-filled system of dimension `dim` with the default capacity.
    pub fn new(dim: usize) -> Result<Self> {
        Self::with_capacity(dim, MAX_DIMENSION)
    }

    /// Zero-filled system of dimension `dim`, accepting dimensions up to `capacity`.
    pub fn with_capacity(dim: usize, capacity: usize) -> Result<Self> {
        if dim < 1 || dim > capacity {
            return Err(dimension_error(dim, capacity));
        }
        Ok(Self {
            a: Array2::zeros((dim, dim)),
            b: Array1::zeros(dim),
            x: Array1::zeros(dim),
            capacity,
        })
    }

    /// Take ownership of existing arrays. X starts at zero.
    pub fn from_parts(a: Array2<T>, b: Array1<T>) -> Result<Self> {
        Self::from_parts_with_capacity(a, b, MAX_DIMENSION)
    }

    /// Take ownership of existing arrays under an explicit capacity.
    pub fn from_parts_with_capacity(a: Array2<T>, b: Array1<T>, capacity: usize) -> Result<Self> {
        validate_shape(a.nrows(), a.ncols(), b.len(), capacity)?;
        let x = Array1::zeros(b.len());
        Ok(Self { a, b, x, capacity })
    }

    /// System dimension N
    pub fn dim(&self) -> usize {
        self.b.len()
    }

    /// Dimension ceiling this store was created under
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read-only view of A
    pub fn a(&self) -> ArrayView2<'_, T> {
        self.a.view()
    }

    /// Read-only view of B
    pub fn b(&self) -> ArrayView1<'_, T> {
        self.b.view()
    }

    /// Read-only view of X
    pub fn x(&self) -> ArrayView1<'_, T> {
        self.x.view()
    }

    #[inline]
    fn check(&self, target: &'static str, index: usize) -> Result<()> {
        let dim = self.dim();
        if index < dim {
            Ok(())
        } else {
            Err(GaussError::OutOfRange { target, index, dim })
        }
    }

    /// `A[row][col]`
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.check("row", row)?;
        self.check("column", col)?;
        Ok(self.a[[row, col]])
    }

    /// `A[row][col] = value`
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        self.check("row", row)?;
        self.check("column", col)?;
        self.a[[row, col]] = value;
        Ok(())
    }

    /// `B[i]`
    pub fn get_b(&self, i: usize) -> Result<T> {
        self.check("B", i)?;
        Ok(self.b[i])
    }

    /// `B[i] = value`
    pub fn set_b(&mut self, i: usize, value: T) -> Result<()> {
        self.check("B", i)?;
        self.b[i] = value;
        Ok(())
    }

    /// `X[i]`
    pub fn get_x(&self, i: usize) -> Result<T> {
        self.check("X", i)?;
        Ok(self.x[i])
    }

    /// `X[i] = value`
    pub fn set_x(&mut self, i: usize, value: T) -> Result<()> {
        self.check("X", i)?;
        self.x[i] = value;
        Ok(())
    }

    /// Reset X to zero.
    pub fn clear_solution(&mut self) {
        self.x.fill(T::zero());
    }

    /// Borrow the pivot row read-only and the rows below it mutably.
    ///
    /// Requires `norm + 1 < N`.
    pub fn split_for_step(&mut self, norm: usize) -> Result<StepViews<'_, T>> {
        let dim = self.dim();
        if norm + 1 >= dim {
            return Err(GaussError::OutOfRange {
                target: "pivot",
                index: norm,
                dim,
            });
        }

        let (top, rows) = self.a.view_mut().split_at(Axis(0), norm + 1);
        let (top_rhs, rhs) = self.b.view_mut().split_at(Axis(0), norm + 1);
        let pivot_rhs = top_rhs[norm];
        let pivot_row = top.index_axis_move(Axis(0), norm);

        Ok(StepViews {
            pivot_row,
            pivot_rhs,
            rows,
            rhs,
        })
    }

    /// Borrow A and B read-only and X mutably for back-substitution.
    pub fn solution_parts(&mut self) -> (ArrayView2<'_, T>, ArrayView1<'_, T>, ArrayViewMut1<'_, T>) {
        (self.a.view(), self.b.view(), self.x.view_mut())
    }

    /// Release the store, returning `(A, B, X)`.
    pub fn into_parts(self) -> (Array2<T>, Array1<T>, Array1<T>) {
        (self.a, self.b, self.x)
    }

    /// Release the store, keeping only X.
    pub fn into_solution(self) -> Array1<T> {
        self.x
    }
}
