//! Back-substitution
//!
//! Derives X from the reduced system, last row first. Each `X[row]` needs
//! every `X[col]` with `col > row`, so this phase is strictly sequential.
//! Diagonal entries were never normalized during elimination; the division
//! by `A[row][row]` happens here.

use crate::config::PivotPolicy;
use crate::error::{GaussError, Result};
use crate::store::SystemStore;
use crate::traits::Scalar;
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1};

/// Solve the upper-triangular part of `a` for `x`.
///
/// Only entries on or above the diagonal of `a` are read. The inner sum runs
/// from the last column towards the diagonal.
pub fn back_substitute<T: Scalar>(
    a: ArrayView2<'_, T>,
    b: ArrayView1<'_, T>,
    mut x: ArrayViewMut1<'_, T>,
    policy: PivotPolicy,
) -> Result<()> {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return Err(GaussError::DimensionMismatch {
            expected: n,
            got: a.nrows().max(a.ncols()),
        });
    }
    if x.len() != n {
        return Err(GaussError::DimensionMismatch {
            expected: n,
            got: x.len(),
        });
    }

    let mut warned = false;
    for row in (0..n).rev() {
        let mut value = b[row];
        for col in ((row + 1)..n).rev() {
            value -= a[[row, col]] * x[col];
        }

        let diag = a[[row, row]];
        if policy.screen(row, diag)? && !warned {
            log::warn!("degenerate diagonal at row {row} ({diag}); result will not be finite");
            warned = true;
        }
        x[row] = value / diag;
    }

    Ok(())
}

/// Run back-substitution on a store whose A is already reduced.
pub fn back_substitute_store<T: Scalar>(
    store: &mut SystemStore<T>,
    policy: PivotPolicy,
) -> Result<()> {
    let (a, b, x) = store.solution_parts();
    back_substitute(a, b, x, policy)
}
