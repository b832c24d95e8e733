//! Kron reduction: elimination of grounded conductors.
//!
//! A conductor bonded to the return path carries no independent voltage, so
//! its row and column can be folded into the retained block with the Schur
//! complement `Z' = Z₁₁ − Z₁₂ · Z₂₂⁻¹ · Z₂₁`. The same elimination applies
//! to the admittance matrix.

use nalgebra::DMatrix;

use crate::errors::{LineParamError, Result};
use crate::line_params::LineParameters;
use crate::numeric::EngineScalar;

use super::{matmul, solve};

/// Eliminates the conductors at the given indices from every frequency
/// slice. An empty index list returns the input unchanged; eliminating
/// every conductor is an error.
pub fn kron_reduce<T: EngineScalar>(
    params: &LineParameters<T>,
    grounded: &[usize],
) -> Result<LineParameters<T>> {
    let dim = params.dim();
    for &g in grounded {
        if g >= dim {
            return Err(LineParamError::Transform(format!(
                "grounded index {g} out of range for dimension {dim}"
            )));
        }
    }
    if grounded.is_empty() {
        return Ok(params.clone());
    }
    let keep: Vec<usize> = (0..dim).filter(|i| !grounded.contains(i)).collect();
    if keep.is_empty() {
        return Err(LineParamError::Transform(
            "cannot eliminate every conductor".into(),
        ));
    }
    let elim: Vec<usize> = grounded.to_vec();

    let reduce = |m: &DMatrix<T>| -> Result<DMatrix<T>> {
        let block = |rows: &[usize], cols: &[usize]| {
            DMatrix::from_fn(rows.len(), cols.len(), |i, j| m[(rows[i], cols[j])])
        };
        let m11 = block(&keep, &keep);
        let m12 = block(&keep, &elim);
        let m21 = block(&elim, &keep);
        let m22 = block(&elim, &elim);
        let folded = matmul(&m12, &solve(&m22, &m21)?);
        Ok(DMatrix::from_fn(keep.len(), keep.len(), |i, j| {
            m11[(i, j)] - folded[(i, j)]
        }))
    };

    let z = params.z.iter().map(&reduce).collect::<Result<Vec<_>>>()?;
    let y = params.y.iter().map(&reduce).collect::<Result<Vec<_>>>()?;
    LineParameters::new(z, y, params.frequencies.clone())
}
