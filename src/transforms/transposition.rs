//! Ideal transposition: averaging over every cyclic conductor permutation.
//!
//! A perfectly transposed line occupies each position for an equal fraction
//! of its length, which averages the parameter matrices over the cyclic
//! permutations. The average of a matrix over cyclic shifts is its nearest
//! circulant: entry `(i, j)` of the result depends only on `(j - i) mod n`.

use nalgebra::DMatrix;

use crate::errors::Result;
use crate::line_params::LineParameters;
use crate::numeric::EngineScalar;

/// Replaces every frequency slice of Z and Y with its circulant average.
pub fn ideal_transposition<T: EngineScalar>(
    params: &LineParameters<T>,
) -> Result<LineParameters<T>> {
    let z = params.z.iter().map(circulant_average).collect();
    let y = params.y.iter().map(circulant_average).collect();
    LineParameters::new(z, y, params.frequencies.clone())
}

fn circulant_average<T: EngineScalar>(m: &DMatrix<T>) -> DMatrix<T> {
    let n = m.nrows();
    if n == 0 {
        return m.clone();
    }
    let inv_n = T::from(1.0 / n as f64);
    let mut offsets = vec![T::zero(); n];
    for (k, slot) in offsets.iter_mut().enumerate() {
        let mut acc = T::zero();
        for i in 0..n {
            acc = acc + m[(i, (i + k) % n)];
        }
        *slot = acc * inv_n;
    }
    DMatrix::from_fn(n, n, |i, j| offsets[(j + n - i) % n])
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use num_complex::Complex;

    use crate::math::CScalar;

    use super::*;

    fn c(re: f64, im: f64) -> CScalar {
        Complex::new(re, im)
    }

    fn unbalanced_params() -> LineParameters<CScalar> {
        // Flat horizontal layout: outer-to-outer coupling weaker than
        // adjacent coupling.
        let z = DMatrix::from_row_slice(3, 3, &[
            c(1.0, 2.0), c(0.4, 0.8), c(0.2, 0.5),
            c(0.4, 0.8), c(1.1, 2.1), c(0.4, 0.8),
            c(0.2, 0.5), c(0.4, 0.8), c(1.0, 2.0),
        ]);
        let y = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![
            c(0.0, 1.0e-9),
            c(0.0, 1.2e-9),
            c(0.0, 1.0e-9),
        ]));
        LineParameters::new(vec![z], vec![y], vec![50.0]).unwrap()
    }

    #[test]
    fn diagonal_becomes_the_mean_self_term() {
        let out = ideal_transposition(&unbalanced_params()).unwrap();
        let mean = (1.0 + 1.1 + 1.0) / 3.0;
        for i in 0..3 {
            assert_relative_eq!(out.z[0][(i, i)].re, mean, max_relative = 1.0e-12);
        }
    }

    #[test]
    fn result_is_circulant() {
        let out = ideal_transposition(&unbalanced_params()).unwrap();
        let z = &out.z[0];
        // Offset-1 and offset-2 entries each uniform along their diagonal.
        assert_relative_eq!(z[(0, 1)].re, z[(1, 2)].re, max_relative = 1.0e-12);
        assert_relative_eq!(z[(0, 1)].re, z[(2, 0)].re, max_relative = 1.0e-12);
        assert_relative_eq!(z[(0, 2)].re, z[(1, 0)].re, max_relative = 1.0e-12);
    }

    #[test]
    fn circulant_input_is_a_fixed_point() {
        let z = DMatrix::from_row_slice(3, 3, &[
            c(1.0, 2.0), c(0.3, 0.6), c(0.2, 0.4),
            c(0.2, 0.4), c(1.0, 2.0), c(0.3, 0.6),
            c(0.3, 0.6), c(0.2, 0.4), c(1.0, 2.0),
        ]);
        let y = DMatrix::from_element(3, 3, c(0.0, 0.0));
        let params = LineParameters::new(vec![z], vec![y], vec![50.0]).unwrap();
        let out = ideal_transposition(&params).unwrap();
        // The average reassembles each entry from a sum, so compare to
        // rounding rather than bit-for-bit.
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(
                    out.z[0][(i, j)].re,
                    params.z[0][(i, j)].re,
                    max_relative = 1.0e-12
                );
                assert_relative_eq!(
                    out.z[0][(i, j)].im,
                    params.z[0][(i, j)].im,
                    max_relative = 1.0e-12
                );
            }
        }
    }
}
