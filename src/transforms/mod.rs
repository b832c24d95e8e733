//! Post-processing transforms over assembled line parameters.
//!
//! Each transform consumes a [`crate::line_params::LineParameters`] and
//! produces a new one, frequency slice by frequency slice, without touching
//! the assembly machinery. They stay generic over the numeric representation
//! so uncertainties survive post-processing; the shared dense linear algebra
//! below is hand-rolled over [`EngineScalar`] because the representation is
//! not a field nalgebra knows how to factorize.

pub mod bundle;
pub mod fortescue;
pub mod kron;
pub mod transposition;

pub use bundle::merge_bundles;
pub use fortescue::{fortescue_transform, FortescueResult};
pub use kron::kron_reduce;
pub use transposition::ideal_transposition;

use nalgebra::DMatrix;

use crate::errors::{LineParamError, Result};
use crate::numeric::EngineScalar;

/// Dense product `a · b`.
pub(crate) fn matmul<T: EngineScalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> DMatrix<T> {
    let (n, k, m) = (a.nrows(), a.ncols(), b.ncols());
    DMatrix::from_fn(n, m, |i, j| {
        let mut acc = T::zero();
        for p in 0..k {
            acc = acc + a[(i, p)] * b[(p, j)];
        }
        acc
    })
}

/// Solves `a · x = b` by Gaussian elimination with partial pivoting on the
/// nominal magnitude.
pub(crate) fn solve<T: EngineScalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> Result<DMatrix<T>> {
    let n = a.nrows();
    let mut work = a.clone();
    let mut x = b.clone();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&p, &q| {
                work[(p, col)]
                    .norm()
                    .total_cmp(&work[(q, col)].norm())
            })
            .ok_or_else(|| LineParamError::Transform("empty system".into()))?;
        if work[(pivot_row, col)].norm() == 0.0 {
            return Err(LineParamError::Transform(format!(
                "singular matrix at pivot column {col}"
            )));
        }
        if pivot_row != col {
            work.swap_rows(pivot_row, col);
            x.swap_rows(pivot_row, col);
        }
        let pivot = work[(col, col)];
        for row in (col + 1)..n {
            let factor = work[(row, col)] / pivot;
            for j in col..n {
                let delta = factor * work[(col, j)];
                work[(row, j)] = work[(row, j)] - delta;
            }
            for j in 0..x.ncols() {
                let delta = factor * x[(col, j)];
                x[(row, j)] = x[(row, j)] - delta;
            }
        }
    }
    for col in (0..n).rev() {
        let pivot = work[(col, col)];
        for j in 0..x.ncols() {
            let mut acc = x[(col, j)];
            for p in (col + 1)..n {
                acc = acc - work[(col, p)] * x[(p, j)];
            }
            x[(col, j)] = acc / pivot;
        }
    }
    Ok(x)
}
