//! Random input generation
//!
//! Fills A and B with uniformly distributed entries from a seeded
//! [`StdRng`], and resets X to zero. The default range matches the scale of
//! `rand() / 32768.0` with a 31-bit `RAND_MAX`.

use crate::error::Result;
use crate::store::SystemStore;
use crate::traits::Scalar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default range of generated entries.
pub const DEFAULT_ENTRY_RANGE: Range<f64> = 0.0..65536.0;

/// Seed derived from the sub-second part of the wall clock.
pub fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_micros()))
        .unwrap_or(0)
}

#[inline]
fn sample<T: Scalar>(rng: &mut StdRng, range: &Range<f64>) -> T {
    T::from_f64_lossy(range.start + (range.end - range.start) * rng.random::<f64>())
}

/// Overwrite A and B with uniform entries drawn from `range`; X is zeroed.
///
/// Entries are drawn column by column, B[col] after column `col` of A.
pub fn fill_uniform<T: Scalar>(store: &mut SystemStore<T>, seed: u64, range: Range<f64>) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = store.dim();

    for col in 0..n {
        for row in 0..n {
            store.set(row, col, sample(&mut rng, &range))?;
        }
        store.set_b(col, sample(&mut rng, &range))?;
    }
    store.clear_solution();
    Ok(())
}

/// Overwrite A and B with a strictly diagonally dominant system; X is zeroed.
///
/// Off-diagonal entries lie in `[-1, 1)`, each diagonal entry is the row's
/// absolute off-diagonal sum plus `[1, 2)`, and B lies in `[-1, 1)`.
/// Elimination without pivoting is stable on such systems.
pub fn fill_diagonally_dominant<T: Scalar>(store: &mut SystemStore<T>, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = store.dim();
    let off = -1.0..1.0;

    for row in 0..n {
        let mut off_sum = 0.0;
        for col in 0..n {
            if col != row {
                let v: f64 = off.start + (off.end - off.start) * rng.random::<f64>();
                off_sum += v.abs();
                store.set(row, col, T::from_f64_lossy(v))?;
            }
        }
        let diag = off_sum + 1.0 + rng.random::<f64>();
        store.set(row, row, T::from_f64_lossy(diag))?;
        store.set_b(row, sample(&mut rng, &off))?;
    }
    store.clear_solution();
    Ok(())
}

/// New N×N system with uniform entries from `range`.
pub fn random_system<T: Scalar>(dim: usize, seed: u64, range: Range<f64>) -> Result<SystemStore<T>> {
    let mut store = SystemStore::new(dim)?;
    fill_uniform(&mut store, seed, range)?;
    Ok(store)
}

/// New N×N strictly diagonally dominant system.
pub fn diagonally_dominant_system<T: Scalar>(dim: usize, seed: u64) -> Result<SystemStore<T>> {
    let mut store = SystemStore::new(dim)?;
    fill_diagonally_dominant(&mut store, seed)?;
    Ok(store)
}
