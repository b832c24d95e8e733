//! Shared numerical primitives anchored on `nalgebra`.

use nalgebra::DMatrix;
use num_complex::Complex;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Primary complex scalar type used for phasors and per-unit-length terms.
pub type CScalar = Complex<Scalar>;
/// Dense complex matrix, one per frequency slice.
pub type CMatrix = DMatrix<CScalar>;

/// Absolute tolerance used to detect degenerate geometry (solid conductors,
/// zero-thickness insulation). Radii are in meters; any dimension below a
/// nanometer is geometrically meaningless, and the tube formulas do not
/// approach their solid-conductor limits on their own as the bore closes.
pub const GEOMETRY_TOLERANCE: Scalar = 1.0e-9;

/// Returns true when `value` is indistinguishable from zero at the geometry
/// tolerance.
#[inline]
#[must_use]
pub fn approx_zero(value: Scalar) -> bool {
    value.abs() < GEOMETRY_TOLERANCE
}

/// Returns true when two radii coincide at the geometry tolerance.
#[inline]
#[must_use]
pub fn approx_equal(a: Scalar, b: Scalar) -> bool {
    (a - b).abs() < GEOMETRY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_zero_accepts_subnanometer_radii() {
        assert!(approx_zero(0.0));
        assert!(approx_zero(1.0e-12));
        assert!(!approx_zero(1.0e-6));
    }

    #[test]
    fn approx_equal_detects_coincident_radii() {
        assert!(approx_equal(0.01, 0.01));
        assert!(!approx_equal(0.01, 0.0100001));
    }
}
