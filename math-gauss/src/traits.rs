//! Scalar abstraction for the elimination kernels
//!
//! The kernels are written once against [`Scalar`] and instantiated for
//! `f32` (the single-precision benchmark) and `f64`.

use num_traits::{Float, FromPrimitive, NumAssign, ToPrimitive};
use std::fmt::{Debug, Display};

/// Trait for real floating-point element types of the system.
///
/// # Implementations
///
/// Provided for:
/// - `f32` (default for the benchmark binary)
/// - `f64`
pub trait Scalar:
    Float + NumAssign + FromPrimitive + ToPrimitive + Send + Sync + Debug + Display + 'static
{
    /// Convert an `f64` constant into this type, saturating to zero when the
    /// value is not representable.
    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        Self::from_f64(value).unwrap_or_else(Self::zero)
    }

    /// Widen to `f64` for reporting.
    #[inline]
    fn widen(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    /// Check whether this value is unusable as a pivot.
    ///
    /// A pivot is degenerate when it is NaN or its magnitude does not exceed
    /// `tolerance`. A tolerance of zero therefore only rejects exact zeros.
    #[inline]
    fn is_degenerate_pivot(self, tolerance: f64) -> bool {
        !(self.abs() > Self::from_f64_lossy(tolerance))
    }
}

impl Scalar for f32 {}

impl Scalar for f64 {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_pivot_is_degenerate() {
        assert!(0.0_f32.is_degenerate_pivot(0.0));
        assert!((-0.0_f64).is_degenerate_pivot(0.0));
        assert!(!1e-20_f64.is_degenerate_pivot(0.0));
    }

    #[test]
    fn test_tolerance_bound() {
        assert!(1e-31_f64.is_degenerate_pivot(1e-30));
        assert!(1e-30_f64.is_degenerate_pivot(1e-30));
        assert!(!2e-30_f64.is_degenerate_pivot(1e-30));
        assert!(!(-0.5_f32).is_degenerate_pivot(1e-6));
    }

    #[test]
    fn test_nan_pivot_is_degenerate() {
        assert!(f32::NAN.is_degenerate_pivot(0.0));
        assert!(!f64::INFINITY.is_degenerate_pivot(1e-30));
    }

    #[test]
    fn test_widen() {
        assert_relative_eq!(0.25_f32.widen(), 0.25);
        assert_relative_eq!(<f32 as Scalar>::from_f64_lossy(1.5), 1.5_f32);
    }
}
