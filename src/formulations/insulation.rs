//! Insulation admittance and series-impedance formulations.

use std::f64::consts::PI;

use crate::constants::{VACUUM_PERMEABILITY, VACUUM_PERMITTIVITY};
use crate::math::{approx_equal, Scalar};
use crate::numeric::EngineScalar;

/// Interchangeable insulation shunt-admittance formulations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsulationAdmittance {
    /// Lossless coaxial capacitance, the reference formulation.
    #[default]
    Lossless,
    /// Coaxial capacitance with dielectric loss via the loss tangent.
    LossTangent,
}

impl InsulationAdmittance {
    /// Per-unit-length shunt admittance (S/m) of a coaxial insulation layer
    /// between `r_in` and `r_out` with relative permittivity `eps_r`.
    ///
    /// Coincident radii mean a bare conductor: the admittance is an
    /// algorithmic zero, not a division by a vanishing logarithm.
    #[must_use]
    pub fn shunt_admittance<T: EngineScalar>(
        &self,
        r_in: T,
        r_out: T,
        eps_r: T,
        tan_delta: T,
        omega: Scalar,
    ) -> T {
        if approx_equal(r_in.nominal().re, r_out.nominal().re) {
            return T::zero();
        }
        let capacitance =
            T::from(2.0 * PI * VACUUM_PERMITTIVITY) * eps_r / (r_out / r_in).ln();
        let jwc = T::j() * T::from(omega) * capacitance;
        match self {
            Self::Lossless => jwc,
            // ε(1 - j·tanδ): conductance G = ω C tanδ appears in the real part.
            Self::LossTangent => jwc * (T::one() - T::j() * tan_delta),
        }
    }

    /// Per-unit-length series impedance (Ω/m) of the insulation annulus,
    /// `jωμ/2π · ln(r_out/r_in)`; zero for a bare conductor.
    #[must_use]
    pub fn series_impedance<T: EngineScalar>(
        &self,
        r_in: T,
        r_out: T,
        mu_r: T,
        omega: Scalar,
    ) -> T {
        if approx_equal(r_in.nominal().re, r_out.nominal().re) {
            return T::zero();
        }
        T::j() * T::from(omega) * mu_r * T::from(VACUUM_PERMEABILITY / (2.0 * PI))
            * (r_out / r_in).ln()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use num_complex::Complex;

    use crate::constants::angular_frequency;
    use crate::math::CScalar;

    use super::*;

    fn c(x: f64) -> CScalar {
        Complex::new(x, 0.0)
    }

    #[test]
    fn lossless_matches_coaxial_capacitance_closed_form() {
        let omega = angular_frequency(50.0);
        let y = InsulationAdmittance::Lossless.shunt_admittance(
            c(0.012),
            c(0.02),
            c(2.3),
            c(0.0),
            omega,
        );
        let c_ref = 2.0 * PI * VACUUM_PERMITTIVITY * 2.3 / (0.02f64 / 0.012).ln();
        assert_relative_eq!(y.im, omega * c_ref, max_relative = 1.0e-12);
        assert_relative_eq!(y.re, 0.0, epsilon = 1.0e-20);
    }

    #[test]
    fn bare_conductor_returns_zero_admittance() {
        let y = InsulationAdmittance::Lossless.shunt_admittance(
            c(0.01),
            c(0.01),
            c(2.3),
            c(0.0),
            angular_frequency(50.0),
        );
        assert_eq!(y, c(0.0));
    }

    #[test]
    fn loss_tangent_adds_conductance() {
        let omega = angular_frequency(50.0);
        let y = InsulationAdmittance::LossTangent.shunt_admittance(
            c(0.012),
            c(0.02),
            c(2.3),
            c(0.004),
            omega,
        );
        assert!(y.re > 0.0, "dielectric loss shows up as conductance");
        assert_relative_eq!(y.re / y.im, 0.004, max_relative = 1.0e-9);
    }

    #[test]
    fn series_impedance_is_inductive_and_zero_for_bare() {
        let omega = angular_frequency(50.0);
        let z = InsulationAdmittance::Lossless.series_impedance(c(0.012), c(0.02), c(1.0), omega);
        assert_relative_eq!(z.re, 0.0, epsilon = 1.0e-20);
        let l_ref = VACUUM_PERMEABILITY / (2.0 * PI) * (0.02f64 / 0.012).ln();
        assert_relative_eq!(z.im, omega * l_ref, max_relative = 1.0e-12);
        let bare = InsulationAdmittance::Lossless.series_impedance(c(0.01), c(0.01), c(1.0), omega);
        assert_eq!(bare, c(0.0));
    }
}
