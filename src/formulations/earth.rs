//! Earth-return impedance formulations.
//!
//! The reference formulation evaluates the Pollaczek/Carson family of
//! semi-infinite kernel integrals for the three conductor placements (both
//! overhead, both buried, mixed), using the propagation constants of the
//! layers the two conductors reside in. Closed-form alternatives (Carson's
//! equivalent-depth series, Saad–Gaba–Giroux, Deri complex images) trade the
//! quadrature for algebra and are valid only for homogeneous earth; their
//! doc comments state the accuracy loss. Kernel evaluations of Z(i,j) and
//! Z(j,i) are independent; reciprocity is restored downstream by the
//! assembly loop, not in here.

use std::f64::consts::PI;

use crate::constants::VACUUM_PERMEABILITY;
use crate::errors::{LineParamError, Result};
use crate::math::Scalar;
use crate::numeric::EngineScalar;
use crate::quad::{integrate_semi_infinite, QuadratureConfig};

/// Which layers the two conductors of a pair are declared to occupy.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Both conductors above ground.
    AirAir,
    /// One conductor above ground, one buried.
    AirEarth,
    /// Both conductors buried.
    EarthEarth,
}

/// Earth-layer properties at one frequency, one entry per layer (row 0 is
/// air). Extracted from the workspace matrices by the assembly loop.
#[derive(Debug, Clone)]
pub struct EarthSlice<T> {
    /// Conductivity per layer (S/m).
    pub sigma: Vec<T>,
    /// Absolute permittivity per layer (F/m).
    pub eps: Vec<T>,
    /// Absolute permeability per layer (H/m).
    pub mu: Vec<T>,
}

impl<T: EngineScalar> EarthSlice<T> {
    /// Propagation constant `γ = √(jωμ(σ + jωε))` of a layer.
    #[must_use]
    pub fn gamma(&self, layer: usize, omega: Scalar) -> T {
        let jw = T::j() * T::from(omega);
        (jw * self.mu[layer] * (self.sigma[layer] + jw * self.eps[layer])).sqrt()
    }
}

/// Geometry of one (source, target) conductor pair at one frequency.
///
/// `direct` is the direct distance between the conductors: the outer
/// insulation radius for a self term, the center-to-center distance for a
/// mutual term.
#[derive(Debug, Clone, Copy)]
pub struct EarthPair<T> {
    /// Vertical position of conductor i (m, negative below grade).
    pub y_i: T,
    /// Vertical position of conductor j.
    pub y_j: T,
    /// Horizontal separation (m).
    pub dx: T,
    /// Direct distance between the conductors (m).
    pub direct: T,
    /// Earth-model layer of conductor i.
    pub layer_i: usize,
    /// Earth-model layer of conductor j.
    pub layer_j: usize,
    /// Angular frequency (rad/s).
    pub omega: Scalar,
}

impl<T: EngineScalar> EarthPair<T> {
    fn height_i(&self) -> T {
        abs_vertical(self.y_i)
    }

    fn height_j(&self) -> T {
        abs_vertical(self.y_j)
    }

    /// Distance to the image conductor mirrored at the earth surface.
    fn image_distance(&self) -> T {
        let h = self.height_i() + self.height_j();
        (self.dx * self.dx + h * h).sqrt()
    }
}

fn abs_vertical<T: EngineScalar>(y: T) -> T {
    if y.nominal().re < 0.0 {
        -y
    } else {
        y
    }
}

/// Cosine evaluated through decomposition into complex exponentials, so it
/// stays defined for every [`EngineScalar`].
fn ccos<T: EngineScalar>(z: T) -> T {
    let jz = T::j() * z;
    (jz.exp() + (-jz).exp()) * T::from(0.5)
}

/// Interchangeable earth-return impedance formulations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EarthImpedance {
    /// Rigorous kernel integral for the configured placement, using the
    /// propagation constants of the layers the conductors reside in. The
    /// reference formulation; quadrature tolerance is the accuracy knob.
    Papadopoulos {
        /// Placement the formulation is configured for; conductors declared
        /// in other layers are a hard error, not a fallback.
        placement: Placement,
        /// Quadrature accuracy/iteration knobs.
        quad: QuadratureConfig,
    },
    /// Carson's equivalent-return-depth series for overhead conductors over
    /// homogeneous earth. First-order truncation: within a few percent of
    /// the kernel at power frequencies, degrading with `|γ|·h`.
    Carson,
    /// Saad–Gaba–Giroux closed form for buried conductors in homogeneous
    /// earth; percent-level agreement with the kernel while `|γ|·h` is
    /// small.
    Saad,
    /// Deri complex-image approximation for overhead conductors; replaces
    /// the kernel with a single complex penetration depth `p = 1/γ`.
    ComplexImage,
}

impl Default for EarthImpedance {
    fn default() -> Self {
        Self::Papadopoulos {
            placement: Placement::EarthEarth,
            quad: QuadratureConfig::default(),
        }
    }
}

impl EarthImpedance {
    /// Classifies the pair's actual placement from its declared layers.
    fn actual_placement<T: EngineScalar>(pair: &EarthPair<T>) -> Placement {
        match (pair.layer_i == 0, pair.layer_j == 0) {
            (true, true) => Placement::AirAir,
            (false, false) => Placement::EarthEarth,
            _ => Placement::AirEarth,
        }
    }

    /// The earth layer whose propagation constant drives the kernel: the top
    /// earth layer for overhead pairs, the conductors' shared layer for
    /// buried pairs.
    fn kernel_layer<T: EngineScalar>(pair: &EarthPair<T>) -> Result<usize> {
        match Self::actual_placement(pair) {
            Placement::AirAir => Ok(1),
            Placement::AirEarth => Ok(pair.layer_i.max(pair.layer_j)),
            Placement::EarthEarth => {
                if pair.layer_i == pair.layer_j {
                    Ok(pair.layer_i)
                } else {
                    Err(LineParamError::LayerMismatch(format!(
                        "conductors occupy earth layers {} and {}; apply an \
                         equivalent-homogeneous-earth reduction before the kernel",
                        pair.layer_i, pair.layer_j
                    )))
                }
            }
        }
    }

    fn require_placement<T: EngineScalar>(pair: &EarthPair<T>, wanted: Placement) -> Result<()> {
        let actual = Self::actual_placement(pair);
        if actual == wanted {
            Ok(())
        } else {
            Err(LineParamError::LayerMismatch(format!(
                "formulation configured for {wanted:?} but conductors in layers \
                 {} and {} form {actual:?}",
                pair.layer_i, pair.layer_j
            )))
        }
    }

    /// Evaluates the self (`i == j`) or mutual earth-return impedance (Ω/m)
    /// for the pair.
    pub fn evaluate<T: EngineScalar>(
        &self,
        pair: &EarthPair<T>,
        earth: &EarthSlice<T>,
    ) -> Result<T> {
        match self {
            Self::Papadopoulos { placement, quad } => {
                Self::require_placement(pair, *placement)?;
                let layer = Self::kernel_layer(pair)?;
                let gamma = earth.gamma(layer, pair.omega);
                match placement {
                    Placement::EarthEarth => {
                        Self::pollaczek(pair, gamma, earth.mu[layer], quad)
                    }
                    Placement::AirAir => Self::carson_integral(pair, gamma, quad),
                    Placement::AirEarth => Self::mixed_integral(pair, gamma, quad),
                }
            }
            Self::Carson => {
                Self::require_placement(pair, Placement::AirAir)?;
                Ok(Self::carson_series(pair, earth))
            }
            Self::Saad => {
                Self::require_placement(pair, Placement::EarthEarth)?;
                let layer = Self::kernel_layer(pair)?;
                Ok(Self::saad(pair, earth.gamma(layer, pair.omega)))
            }
            Self::ComplexImage => {
                Self::require_placement(pair, Placement::AirAir)?;
                Ok(Self::complex_image(pair, earth.gamma(1, pair.omega)))
            }
        }
    }

    /// Pollaczek's integral for two buried conductors sharing a layer:
    /// `Z = jωμ/2π · [K0(γd) − K0(γD) + 2J]` with
    /// `J = ∫₀^∞ e^{-(hᵢ+hⱼ)√(λ²+γ²)} / (λ + √(λ²+γ²)) · cos(λ·dx) dλ`.
    fn pollaczek<T: EngineScalar>(
        pair: &EarthPair<T>,
        gamma: T,
        mu: T,
        quad: &QuadratureConfig,
    ) -> Result<T> {
        let depth_sum = pair.height_i() + pair.height_j();
        let dx = pair.dx;
        let integral: T = integrate_semi_infinite(
            |lambda| {
                let l = T::from(lambda);
                let u = (l * l + gamma * gamma).sqrt();
                (-(depth_sum * u)).exp() / (l + u) * ccos(l * dx)
            },
            kernel_scale(depth_sum.nominal().re),
            quad,
        )?;
        let closed = (gamma * pair.direct).bessel_k(0) - (gamma * pair.image_distance()).bessel_k(0);
        let factor = T::j() * T::from(pair.omega) * mu * T::from(1.0 / (2.0 * PI));
        Ok(factor * (closed + T::from(2.0) * integral))
    }

    /// Carson's integral for two overhead conductors:
    /// `Z = jωμ₀/2π · [ln(D/d) + 2∫₀^∞ e^{-(hᵢ+hⱼ)λ} / (λ + √(λ²+γ²)) · cos(λ·dx) dλ]`.
    fn carson_integral<T: EngineScalar>(
        pair: &EarthPair<T>,
        gamma: T,
        quad: &QuadratureConfig,
    ) -> Result<T> {
        let height_sum = pair.height_i() + pair.height_j();
        let dx = pair.dx;
        let integral: T = integrate_semi_infinite(
            |lambda| {
                let l = T::from(lambda);
                let u = (l * l + gamma * gamma).sqrt();
                (-(height_sum * l)).exp() / (l + u) * ccos(l * dx)
            },
            kernel_scale(height_sum.nominal().re),
            quad,
        )?;
        let geometric = (pair.image_distance() / pair.direct).ln();
        let factor = T::j() * T::from(pair.omega * VACUUM_PERMEABILITY / (2.0 * PI));
        Ok(factor * (geometric + T::from(2.0) * integral))
    }

    /// Mixed overhead/buried mutual term; the direct and image logarithms
    /// cancel into the single integral
    /// `Z = jωμ₀/2π · 2∫₀^∞ e^{-h_air·λ} e^{-h_earth·√(λ²+γ²)} / (λ + √(λ²+γ²)) · cos(λ·dx) dλ`.
    fn mixed_integral<T: EngineScalar>(
        pair: &EarthPair<T>,
        gamma: T,
        quad: &QuadratureConfig,
    ) -> Result<T> {
        let (h_air, h_earth) = if pair.layer_i == 0 {
            (pair.height_i(), pair.height_j())
        } else {
            (pair.height_j(), pair.height_i())
        };
        let dx = pair.dx;
        let scale = kernel_scale((h_air + h_earth).nominal().re);
        let integral: T = integrate_semi_infinite(
            |lambda| {
                let l = T::from(lambda);
                let u = (l * l + gamma * gamma).sqrt();
                (-(h_air * l) - h_earth * u).exp() / (l + u) * ccos(l * dx)
            },
            scale,
            quad,
        )?;
        let factor = T::j() * T::from(pair.omega * VACUUM_PERMEABILITY / PI);
        Ok(factor * integral)
    }

    /// Carson's first-order series with the equivalent return depth
    /// `Dₑ = 658.87·√(ρ/f)`.
    fn carson_series<T: EngineScalar>(pair: &EarthPair<T>, earth: &EarthSlice<T>) -> T {
        let omega = pair.omega;
        let f = omega / (2.0 * PI);
        let rho = T::one() / earth.sigma[1];
        let depth = T::from(658.87) * (rho / T::from(f)).sqrt();
        let resistive = T::from(omega * VACUUM_PERMEABILITY / 8.0);
        let reactive =
            T::j() * T::from(omega * VACUUM_PERMEABILITY / (2.0 * PI)) * (depth / pair.direct).ln();
        resistive + reactive
    }

    /// Saad–Gaba–Giroux closed form for buried conductors:
    /// `Z = jωμ₀/2π · [K0(γd) + 2·e^{-(hᵢ+hⱼ)γ} / (4 + γ²·dx²)]`.
    fn saad<T: EngineScalar>(pair: &EarthPair<T>, gamma: T) -> T {
        let depth_sum = pair.height_i() + pair.height_j();
        let dx = pair.dx;
        let term = (gamma * pair.direct).bessel_k(0)
            + T::from(2.0) * (-(depth_sum * gamma)).exp()
                / (T::from(4.0) + gamma * gamma * dx * dx);
        T::j() * T::from(pair.omega * VACUUM_PERMEABILITY / (2.0 * PI)) * term
    }

    /// Deri complex-image form for overhead conductors: images recede by the
    /// complex penetration depth `p = 1/γ`.
    fn complex_image<T: EngineScalar>(pair: &EarthPair<T>, gamma: T) -> T {
        let p = T::one() / gamma;
        let shifted = pair.height_i() + pair.height_j() + T::from(2.0) * p;
        let image = (pair.dx * pair.dx + shifted * shifted).sqrt();
        T::j() * T::from(pair.omega * VACUUM_PERMEABILITY / (2.0 * PI))
            * (image / pair.direct).ln()
    }
}

/// First-panel width for the kernel quadrature: the reciprocal of the
/// exponential decay length, floored so surface-laid conductors do not
/// degenerate the panel layout.
fn kernel_scale(depth_sum: Scalar) -> Scalar {
    1.0 / depth_sum.max(1.0e-3)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use num_complex::Complex;

    use crate::constants::{angular_frequency, VACUUM_PERMITTIVITY};
    use crate::math::CScalar;

    use super::*;

    fn c(x: f64) -> CScalar {
        Complex::new(x, 0.0)
    }

    /// Homogeneous 100 Ω·m earth under air.
    fn slice() -> EarthSlice<CScalar> {
        EarthSlice {
            sigma: vec![c(0.0), c(0.01)],
            eps: vec![c(VACUUM_PERMITTIVITY), c(10.0 * VACUUM_PERMITTIVITY)],
            mu: vec![c(VACUUM_PERMEABILITY), c(VACUUM_PERMEABILITY)],
        }
    }

    fn buried_pair(y_i: f64, y_j: f64, dx: f64, direct: f64, f_hz: f64) -> EarthPair<CScalar> {
        EarthPair {
            y_i: c(y_i),
            y_j: c(y_j),
            dx: c(dx),
            direct: c(direct),
            layer_i: 1,
            layer_j: 1,
            omega: angular_frequency(f_hz),
        }
    }

    fn overhead_pair(y_i: f64, y_j: f64, dx: f64, direct: f64, f_hz: f64) -> EarthPair<CScalar> {
        EarthPair {
            y_i: c(y_i),
            y_j: c(y_j),
            dx: c(dx),
            direct: c(direct),
            layer_i: 0,
            layer_j: 0,
            omega: angular_frequency(f_hz),
        }
    }

    fn kernel(placement: Placement) -> EarthImpedance {
        EarthImpedance::Papadopoulos {
            placement,
            quad: QuadratureConfig::default(),
        }
    }

    #[test]
    fn buried_self_impedance_has_positive_loss() {
        let pair = buried_pair(-1.0, -1.0, 0.0, 0.02, 50.0);
        let z = kernel(Placement::EarthEarth).evaluate(&pair, &slice()).unwrap();
        assert!(z.re > 0.0, "earth return loss must be positive, got {z}");
        assert!(z.im > 0.0, "earth return is inductive, got {z}");
    }

    #[test]
    fn saad_tracks_the_pollaczek_kernel_at_power_frequency() {
        let pair = buried_pair(-1.0, -1.2, 0.3, 0.36, 50.0);
        let rigorous = kernel(Placement::EarthEarth).evaluate(&pair, &slice()).unwrap();
        let closed = EarthImpedance::Saad.evaluate(&pair, &slice()).unwrap();
        assert_relative_eq!(closed.re, rigorous.re, max_relative = 0.1);
        assert_relative_eq!(closed.im, rigorous.im, max_relative = 0.1);
    }

    #[test]
    fn mutual_kernel_is_symmetric_within_quadrature_tolerance() {
        let ij = buried_pair(-0.9, -1.4, 0.5, 0.707, 50.0);
        let ji = buried_pair(-1.4, -0.9, 0.5, 0.707, 50.0);
        let form = kernel(Placement::EarthEarth);
        let z_ij = form.evaluate(&ij, &slice()).unwrap();
        let z_ji = form.evaluate(&ji, &slice()).unwrap();
        assert_relative_eq!(z_ij.re, z_ji.re, max_relative = 1.0e-5);
        assert_relative_eq!(z_ij.im, z_ji.im, max_relative = 1.0e-5);
    }

    #[test]
    fn overhead_closed_forms_track_the_carson_integral() {
        let pair = overhead_pair(10.0, 10.0, 0.0, 0.01, 50.0);
        let rigorous = kernel(Placement::AirAir).evaluate(&pair, &slice()).unwrap();
        let series = EarthImpedance::Carson.evaluate(&pair, &slice()).unwrap();
        let deri = EarthImpedance::ComplexImage.evaluate(&pair, &slice()).unwrap();
        assert_relative_eq!(series.re, rigorous.re, max_relative = 0.1);
        assert_relative_eq!(series.im, rigorous.im, max_relative = 0.1);
        assert_relative_eq!(deri.re, rigorous.re, max_relative = 0.1);
        assert_relative_eq!(deri.im, rigorous.im, max_relative = 0.1);
    }

    #[test]
    fn mixed_placement_couples_overhead_and_buried_conductors() {
        let pair = EarthPair {
            y_i: c(8.0),
            y_j: c(-1.0),
            dx: c(2.0),
            direct: c(9.2),
            layer_i: 0,
            layer_j: 1,
            omega: angular_frequency(50.0),
        };
        let z = kernel(Placement::AirEarth).evaluate(&pair, &slice()).unwrap();
        assert!(z.re > 0.0);
        assert!(z.norm() > 0.0 && z.norm().is_finite());
    }

    #[test]
    fn placement_mismatch_is_a_hard_error() {
        let buried = buried_pair(-1.0, -1.0, 0.0, 0.02, 50.0);
        let err = kernel(Placement::AirAir).evaluate(&buried, &slice()).unwrap_err();
        assert!(matches!(err, LineParamError::LayerMismatch(_)));
        let err = EarthImpedance::Carson.evaluate(&buried, &slice()).unwrap_err();
        assert!(matches!(err, LineParamError::LayerMismatch(_)));
    }

    #[test]
    fn impedance_grows_with_earth_resistivity() {
        let pair = buried_pair(-1.0, -1.0, 0.0, 0.02, 50.0);
        let soft = slice();
        let stiff = EarthSlice {
            sigma: vec![c(0.0), c(0.001)],
            ..slice()
        };
        let form = kernel(Placement::EarthEarth);
        let z_soft = form.evaluate(&pair, &soft).unwrap();
        let z_stiff = form.evaluate(&pair, &stiff).unwrap();
        assert!(
            z_stiff.im > z_soft.im,
            "higher resistivity pushes the return deeper: {z_stiff} vs {z_soft}"
        );
    }
}
