//! Fortescue (symmetrical-component) transform.
//!
//! Uses the unitary n-phase DFT matrix `A[j][k] = a^{jk}/√n` with
//! `a = e^{j2π/n}`, so the inverse is the conjugate transpose and the
//! similarity `Z_seq = Aᴴ Z A` preserves norms. For a balanced (circulant)
//! system the sequence matrices come out diagonal; residual off-diagonal
//! coupling above the tolerance is reported as a diagnostic warning, never
//! an error.

use std::f64::consts::PI;

use nalgebra::DMatrix;
use num_complex::Complex;
use tracing::warn;

use crate::diagnostics::Diagnostics;
use crate::errors::{LineParamError, Result};
use crate::line_params::LineParameters;
use crate::math::{CMatrix, Scalar};
use crate::numeric::EngineScalar;

use super::matmul;

/// Sequence-domain parameters with the transform that produced them.
#[derive(Debug, Clone)]
pub struct FortescueResult<T> {
    /// Sequence impedance and admittance matrices, zero sequence first.
    pub params: LineParameters<T>,
    /// The unitary similarity matrix used.
    pub similarity: CMatrix,
    /// Balance findings collected while transforming.
    pub diagnostics: Diagnostics,
}

/// Transforms phase-domain parameters into symmetrical components.
///
/// `unbalance_tol` bounds the accepted ratio of the largest off-diagonal
/// magnitude to the smallest diagonal magnitude in every transformed slice;
/// slices above it are flagged in the diagnostics.
pub fn fortescue_transform<T: EngineScalar>(
    params: &LineParameters<T>,
    unbalance_tol: Scalar,
) -> Result<FortescueResult<T>> {
    let n = params.dim();
    if n == 0 {
        return Err(LineParamError::Transform(
            "cannot transform an empty system".into(),
        ));
    }
    let similarity = dft_matrix(n);
    let a = lift::<T>(&similarity);
    let a_h = lift::<T>(&similarity.adjoint());

    let mut diagnostics = Diagnostics::new();
    let transform = |stack: &[DMatrix<T>], name: &str, diagnostics: &mut Diagnostics| {
        stack
            .iter()
            .enumerate()
            .map(|(k, m)| {
                let seq = matmul(&a_h, &matmul(m, &a));
                let leakage = unbalance_ratio(&seq);
                if leakage > unbalance_tol {
                    let f = params.frequencies[k];
                    warn!(matrix = name, frequency = f, leakage, "sequence coupling above tolerance");
                    diagnostics.add_warning(
                        "fortescue.unbalanced",
                        format!(
                            "{name} at {f} Hz keeps {:.1}% inter-sequence coupling",
                            leakage * 100.0
                        ),
                    );
                }
                seq
            })
            .collect::<Vec<_>>()
    };
    let z = transform(&params.z, "Z", &mut diagnostics);
    let y = transform(&params.y, "Y", &mut diagnostics);

    Ok(FortescueResult {
        params: LineParameters::new(z, y, params.frequencies.clone())?,
        similarity,
        diagnostics,
    })
}

/// The unitary n-point DFT matrix.
fn dft_matrix(n: usize) -> CMatrix {
    let scale = 1.0 / (n as Scalar).sqrt();
    DMatrix::from_fn(n, n, |j, k| {
        let angle = 2.0 * PI * (j * k) as Scalar / n as Scalar;
        Complex::from_polar(scale, angle)
    })
}

fn lift<T: EngineScalar>(m: &CMatrix) -> DMatrix<T> {
    m.map(T::from_complex)
}

/// Largest off-diagonal magnitude over the smallest diagonal magnitude;
/// zero for a 1x1 or fully diagonal matrix, infinite when a diagonal entry
/// vanishes under off-diagonal leakage.
fn unbalance_ratio<T: EngineScalar>(m: &DMatrix<T>) -> Scalar {
    let n = m.nrows();
    let mut max_off: Scalar = 0.0;
    let mut min_diag = Scalar::INFINITY;
    for i in 0..n {
        min_diag = min_diag.min(m[(i, i)].norm());
        for j in 0..n {
            if i != j {
                max_off = max_off.max(m[(i, j)].norm());
            }
        }
    }
    if max_off == 0.0 {
        0.0
    } else {
        max_off / min_diag
    }
}
