//! Bundle merging: collapsing parallel sub-conductors into one equivalent
//! phase.
//!
//! Sub-conductors of a bundle share a voltage and split the current, so the
//! merged series impedance is the block average and the merged shunt
//! admittance the block sum of the original entries.

use nalgebra::DMatrix;

use crate::errors::{LineParamError, Result};
use crate::line_params::LineParameters;
use crate::numeric::EngineScalar;

/// Merges conductors that share a bundle id. `bundles[i]` names the bundle
/// of conductor `i`; the output keeps one row per distinct id, ordered by
/// first appearance.
pub fn merge_bundles<T: EngineScalar>(
    params: &LineParameters<T>,
    bundles: &[usize],
) -> Result<LineParameters<T>> {
    let dim = params.dim();
    if bundles.len() != dim {
        return Err(LineParamError::Transform(format!(
            "{} bundle ids for {dim} conductors",
            bundles.len()
        )));
    }
    // Distinct ids in first-appearance order, then member lists per group.
    let mut order: Vec<usize> = Vec::new();
    for &id in bundles {
        if !order.contains(&id) {
            order.push(id);
        }
    }
    let groups: Vec<Vec<usize>> = order
        .iter()
        .map(|&id| (0..dim).filter(|&i| bundles[i] == id).collect())
        .collect();
    if groups.len() == dim {
        return Ok(params.clone());
    }

    let merge = |m: &DMatrix<T>, sum: bool| {
        DMatrix::from_fn(groups.len(), groups.len(), |a, b| {
            let mut acc = T::zero();
            for &i in &groups[a] {
                for &j in &groups[b] {
                    acc = acc + m[(i, j)];
                }
            }
            if sum {
                acc
            } else {
                acc / T::from((groups[a].len() * groups[b].len()) as f64)
            }
        })
    };

    let z = params.z.iter().map(|m| merge(m, false)).collect();
    let y = params.y.iter().map(|m| merge(m, true)).collect();
    LineParameters::new(z, y, params.frequencies.clone())
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

    fn four_conductor_params() -> LineParameters<CScalar> {
        let z = DMatrix::from_row_slice(4, 4, &[
            c(1.0, 2.0), c(0.4, 0.8), c(0.2, 0.5), c(0.2, 0.5),
            c(0.4, 0.8), c(1.0, 2.0), c(0.2, 0.5), c(0.2, 0.5),
            c(0.2, 0.5), c(0.2, 0.5), c(1.2, 2.2), c(0.3, 0.6),
            c(0.2, 0.5), c(0.2, 0.5), c(0.3, 0.6), c(1.2, 2.2),
        ]);
        let y = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![
            c(0.0, 1.0e-9); 4
        ]));
        LineParameters::new(vec![z], vec![y], vec![50.0]).unwrap()
    }

    #[test]
    fn twin_bundles_average_z_and_sum_y() {
        let params = four_conductor_params();
        let merged = merge_bundles(&params, &[0, 0, 1, 1]).unwrap();
        assert_eq!(merged.dim(), 2);
        // Self entry of bundle 0: mean of its 2x2 block.
        let expected = (1.0 + 0.4 + 0.4 + 1.0) / 4.0;
        assert_relative_eq!(merged.z[0][(0, 0)].re, expected, max_relative = 1.0e-12);
        // Mutual block is uniform, the average equals any entry.
        assert_relative_eq!(merged.z[0][(0, 1)].re, 0.2, max_relative = 1.0e-12);
        // Shunt admittances of the sub-conductors add.
        assert_relative_eq!(merged.y[0][(0, 0)].im, 2.0e-9, max_relative = 1.0e-12);
    }

    #[test]
    fn distinct_ids_leave_the_parameters_untouched() {
        let params = four_conductor_params();
        let out = merge_bundles(&params, &[3, 1, 4, 1_000]).unwrap();
        assert_eq!(out, params);
    }

    #[test]
    fn id_count_mismatch_is_an_error() {
        let params = four_conductor_params();
        let err = merge_bundles(&params, &[0, 0]).unwrap_err();
        assert!(matches!(err, LineParamError::Transform(_)));
    }

    #[test]
    fn merged_matrix_stays_symmetric() {
        let params = four_conductor_params();
        let merged = merge_bundles(&params, &[0, 1, 1, 1]).unwrap();
        assert_relative_eq!(
            merged.z[0][(0, 1)].re,
            merged.z[0][(1, 0)].re,
            max_relative = 1.0e-12
        );
    }
}
