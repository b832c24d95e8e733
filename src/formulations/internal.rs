//! Conductor internal impedance formulations.
//!
//! All variants satisfy the same three-term contract: the impedance seen from
//! the outer surface, the impedance seen from the inner surface, and the
//! transfer (mutual) impedance between the two surfaces, each in Ω/m. For a
//! solid conductor the inner surface does not exist and the inner and mutual
//! terms are algorithmic zeros.

use std::f64::consts::PI;

use crate::math::{approx_zero, Scalar};
use crate::numeric::EngineScalar;

/// The three per-unit-length terms of a tubular conductor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InternalTerms<T> {
    /// Impedance seen from the outer surface (Ω/m).
    pub outer: T,
    /// Impedance seen from the inner surface (Ω/m); zero for solid conductors.
    pub inner: T,
    /// Transfer impedance between the surfaces (Ω/m); zero for solid
    /// conductors.
    pub mutual: T,
}

impl<T: EngineScalar> InternalTerms<T> {
    fn solid(outer: T) -> Self {
        Self {
            outer,
            inner: T::zero(),
            mutual: T::zero(),
        }
    }
}

/// Interchangeable internal-impedance formulations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InternalImpedance {
    /// Exact Schelkunoff skin-effect solution built from scaled Bessel
    /// ratios; the reference formulation, stable at arbitrarily high
    /// frequency.
    #[default]
    Schelkunoff,
    /// Wedepohl–Wilcox hyperbolic approximation; accurate to a fraction of a
    /// percent once the tube is a few skin depths thick, cheaper than the
    /// Bessel evaluation.
    Approximate,
    /// DC resistance plus the low-frequency internal inductance; valid only
    /// well below the onset of skin effect.
    LowFrequency,
}

/// Hyperbolic cotangent written against decaying exponentials only.
fn coth<T: EngineScalar>(z: T) -> T {
    let e = (-(z + z)).exp();
    (T::one() + e) / (T::one() - e)
}

/// Hyperbolic cosecant written against decaying exponentials only.
fn csch<T: EngineScalar>(z: T) -> T {
    let e = (-z).exp();
    (e + e) / (T::one() - (-(z + z)).exp())
}

impl InternalImpedance {
    /// Evaluates the three-term contract for a conductor with inner radius
    /// `r_in`, outer radius `r_out`, resistivity `rho` (Ω·m) and relative
    /// permeability `mu_r`, at angular frequency `omega` (rad/s).
    ///
    /// The complex propagation term `m = √(jωμ/ρ)` keeps the sign convention
    /// uniform across variants; `m·r` grows with frequency and radius, which
    /// is why the Schelkunoff path works on scaled Bessel functions.
    #[must_use]
    pub fn evaluate<T: EngineScalar>(
        &self,
        r_in: T,
        r_out: T,
        rho: T,
        mu_r: T,
        omega: Scalar,
    ) -> InternalTerms<T> {
        let mu = mu_r * T::from(crate::constants::VACUUM_PERMEABILITY);
        let jw = T::j() * T::from(omega);
        let m = (jw * mu / rho).sqrt();
        let two_pi = T::from(2.0 * PI);
        let solid = approx_zero(r_in.nominal().re);

        match self {
            Self::Schelkunoff => {
                let z2 = m * r_out;
                if solid {
                    // I0/I1 ratio of scaled functions; the weights cancel.
                    let ratio = z2.bessel_i_scaled(0) / z2.bessel_i_scaled(1);
                    return InternalTerms::solid(rho * m / (two_pi * r_out) * ratio);
                }
                let z1 = m * r_in;
                // Every product I_a(z_x) K_b(z_y) equals the scaled pair times
                // e^{z_x - z_y}; factoring e^{z2 - z1} out of numerators and
                // denominator leaves only the decaying weight e^{-2(z2-z1)}.
                let decay = (-(T::from(2.0) * (z2 - z1))).exp();
                let is0_1 = z1.bessel_i_scaled(0);
                let is1_1 = z1.bessel_i_scaled(1);
                let ks0_1 = z1.bessel_k_scaled(0);
                let ks1_1 = z1.bessel_k_scaled(1);
                let is0_2 = z2.bessel_i_scaled(0);
                let is1_2 = z2.bessel_i_scaled(1);
                let ks0_2 = z2.bessel_k_scaled(0);
                let ks1_2 = z2.bessel_k_scaled(1);

                let denom = is1_2 * ks1_1 - is1_1 * ks1_2 * decay;
                let num_outer = is0_2 * ks1_1 + ks0_2 * is1_1 * decay;
                let num_inner = ks0_1 * is1_2 + is0_1 * ks1_2 * decay;

                let outer = rho * m / (two_pi * r_out) * (num_outer / denom);
                let inner = rho * m / (two_pi * r_in) * (num_inner / denom);
                let mutual =
                    rho * (-(z2 - z1)).exp() / (two_pi * r_in * r_out * denom);
                InternalTerms {
                    outer,
                    inner,
                    mutual,
                }
            }
            Self::Approximate => {
                if solid {
                    // Wedepohl–Wilcox solid-conductor fit.
                    let outer = rho * m / (two_pi * r_out) * coth(T::from(0.777) * m * r_out)
                        + T::from(0.356) * rho / (T::from(PI) * r_out * r_out);
                    return InternalTerms::solid(outer);
                }
                let wall = r_out - r_in;
                let rim_sum = r_in + r_out;
                let coth_md = coth(m * wall);
                let outer = rho * m / (two_pi * r_out) * coth_md
                    + rho / (two_pi * r_out * rim_sum);
                let inner = rho * m / (two_pi * r_in) * coth_md
                    + rho / (two_pi * r_in * rim_sum);
                let mutual = rho * m / (T::from(PI) * rim_sum) * csch(m * wall);
                InternalTerms {
                    outer,
                    inner,
                    mutual,
                }
            }
            Self::LowFrequency => {
                let area = if solid {
                    r_out * r_out
                } else {
                    r_out * r_out - r_in * r_in
                };
                let r_dc = rho / (T::from(PI) * area);
                if solid {
                    // Uniform current density: L_int = μ/8π.
                    let l_int = mu / T::from(8.0 * PI);
                    return InternalTerms::solid(r_dc + jw * l_int);
                }
                let denom_sq = {
                    let d = r_out * r_out - r_in * r_in;
                    d * d
                };
                let log_ratio = (r_out / r_in).ln();
                let quarter = T::from(0.25);
                // Internal inductance of a tube, seen from each surface.
                let l_outer = mu / (T::from(2.0 * PI))
                    * (r_in * r_in * r_in * r_in / denom_sq * log_ratio
                        - (T::from(3.0) * r_in * r_in - r_out * r_out)
                            / (r_out * r_out - r_in * r_in)
                            * quarter);
                let l_inner = mu / (T::from(2.0 * PI))
                    * (r_out * r_out * r_out * r_out / denom_sq * log_ratio
                        - (T::from(3.0) * r_out * r_out - r_in * r_in)
                            / (r_out * r_out - r_in * r_in)
                            * quarter);
                InternalTerms {
                    outer: r_dc + jw * l_outer,
                    inner: r_dc + jw * l_inner,
                    mutual: r_dc,
                }
            }
        }
    }
}
