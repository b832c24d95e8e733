//! Uncertainty-aware numeric tower.
//!
//! The engine runs every computation in a single numeric representation,
//! resolved once at workspace construction: plain `Complex<f64>` when all
//! inputs are exact, or [`UComplex`] when any input carries a measurement
//! uncertainty. [`UComplex`] propagates independent first-order (delta-method)
//! variances through arithmetic using the analytic derivative of each
//! operation; special functions go through the finite-difference wrapper in
//! [`crate::special`].

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_complex::Complex;

use crate::math::{CScalar, Scalar};
use crate::special;

/// A measured input: nominal value plus symmetric standard uncertainty.
/// `sigma == 0` means the value is exact.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measure {
    /// Nominal value in SI units.
    pub value: Scalar,
    /// Standard uncertainty (one sigma), same units as `value`.
    pub sigma: Scalar,
}

impl Measure {
    /// An exact value with zero uncertainty.
    #[must_use]
    pub const fn exact(value: Scalar) -> Self {
        Self { value, sigma: 0.0 }
    }

    /// A value with a symmetric standard uncertainty.
    #[must_use]
    pub const fn with_sigma(value: Scalar, sigma: Scalar) -> Self {
        Self { value, sigma }
    }

    /// Returns true when the measure carries no uncertainty.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.sigma == 0.0
    }
}

impl From<Scalar> for Measure {
    fn from(value: Scalar) -> Self {
        Self::exact(value)
    }
}

/// Numeric representation selected for an entire computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericMode {
    /// All inputs exact; the engine runs on plain `Complex<f64>`.
    Plain,
    /// At least one input carries uncertainty; the engine runs on [`UComplex`].
    Uncertain,
}

/// Resolves the numeric mode for a computation by inspecting every input
/// measure. Pure function, run exactly once per workspace build.
#[must_use]
pub fn resolve_numeric_mode<I>(measures: I) -> NumericMode
where
    I: IntoIterator<Item = Measure>,
{
    if measures.into_iter().all(|m| m.is_exact()) {
        NumericMode::Plain
    } else {
        NumericMode::Uncertain
    }
}

/// Real scalar carrying an independent first-order variance.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UReal {
    /// Nominal value.
    pub value: Scalar,
    /// Variance (sigma squared).
    pub var: Scalar,
}

impl UReal {
    /// Builds an uncertain real from a measure.
    #[must_use]
    pub fn from_measure(m: Measure) -> Self {
        Self {
            value: m.value,
            var: m.sigma * m.sigma,
        }
    }

    /// Standard uncertainty (one sigma).
    #[must_use]
    pub fn sigma(&self) -> Scalar {
        self.var.sqrt()
    }
}

/// Complex scalar carrying independent per-axis first-order variances.
///
/// Variances on the real and imaginary axes are propagated with the Jacobian
/// of each operation; for an analytic `f` with derivative `a + jb` the
/// Jacobian is `[[a, -b], [b, a]]`, so a variance pair `(vr, vi)` maps to
/// `(a²vr + b²vi, b²vr + a²vi)`. Cross-covariances between distinct values
/// are not tracked.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UComplex {
    /// Real part of the nominal value.
    pub re: Scalar,
    /// Imaginary part of the nominal value.
    pub im: Scalar,
    /// Variance of the real part.
    pub var_re: Scalar,
    /// Variance of the imaginary part.
    pub var_im: Scalar,
}

impl UComplex {
    /// An exact complex value.
    #[must_use]
    pub fn certain(value: CScalar) -> Self {
        Self {
            re: value.re,
            im: value.im,
            var_re: 0.0,
            var_im: 0.0,
        }
    }

    /// Builds from nominal value and per-axis variances.
    #[must_use]
    pub const fn with_variances(re: Scalar, im: Scalar, var_re: Scalar, var_im: Scalar) -> Self {
        Self {
            re,
            im,
            var_re,
            var_im,
        }
    }

    /// Nominal value as a plain complex number.
    #[must_use]
    pub fn value(&self) -> CScalar {
        Complex::new(self.re, self.im)
    }

    /// Standard uncertainties of the real and imaginary parts.
    #[must_use]
    pub fn sigmas(&self) -> (Scalar, Scalar) {
        (self.var_re.sqrt(), self.var_im.sqrt())
    }

    /// Propagates this value's variances through an analytic function with
    /// value `f` and complex derivative `df` at the nominal point.
    #[must_use]
    pub fn lift(&self, f: CScalar, df: CScalar) -> Self {
        let (a, b) = (df.re, df.im);
        Self {
            re: f.re,
            im: f.im,
            var_re: a * a * self.var_re + b * b * self.var_im,
            var_im: b * b * self.var_re + a * a * self.var_im,
        }
    }

    fn accumulate(var: &mut (Scalar, Scalar), input: &UComplex, deriv: CScalar) {
        let (a, b) = (deriv.re, deriv.im);
        var.0 += a * a * input.var_re + b * b * input.var_im;
        var.1 += b * b * input.var_re + a * a * input.var_im;
    }

    /// Combines two independent inputs through a bivariate analytic function
    /// with partial derivatives `dz` and `dw` at the nominal point.
    #[must_use]
    pub fn combine(z: &UComplex, w: &UComplex, f: CScalar, dz: CScalar, dw: CScalar) -> Self {
        let mut var = (0.0, 0.0);
        Self::accumulate(&mut var, z, dz);
        Self::accumulate(&mut var, w, dw);
        Self {
            re: f.re,
            im: f.im,
            var_re: var.0,
            var_im: var.1,
        }
    }
}

impl fmt::Display for UComplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sr, si) = self.sigmas();
        write!(f, "({}±{}) + ({}±{})j", self.re, sr, self.im, si)
    }
}

impl From<Scalar> for UComplex {
    fn from(value: Scalar) -> Self {
        Self::certain(Complex::new(value, 0.0))
    }
}

impl Add for UComplex {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
            var_re: self.var_re + rhs.var_re,
            var_im: self.var_im + rhs.var_im,
        }
    }
}

impl Sub for UComplex {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
            var_re: self.var_re + rhs.var_re,
            var_im: self.var_im + rhs.var_im,
        }
    }
}

impl Neg for UComplex {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
            ..self
        }
    }
}

impl Mul for UComplex {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let (z, w) = (self.value(), rhs.value());
        Self::combine(&self, &rhs, z * w, w, z)
    }
}

impl Div for UComplex {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let (z, w) = (self.value(), rhs.value());
        let inv_w = Complex::new(1.0, 0.0) / w;
        Self::combine(&self, &rhs, z * inv_w, inv_w, -z * inv_w * inv_w)
    }
}

/// The single numeric representation threaded through the whole engine.
///
/// Implemented for plain `Complex<f64>` (no propagation overhead) and for
/// [`UComplex`] (first-order propagation). Formulations, quadrature and
/// post-processing are generic over this trait so the uncertainty path and
/// the plain path share one code body.
pub trait EngineScalar:
    Copy
    + Clone
    + fmt::Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + From<Scalar>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Lifts an exact complex constant into the representation.
    fn from_complex(c: CScalar) -> Self;
    /// Lifts a measured real input, attaching its uncertainty when carried.
    fn from_measure(m: Measure) -> Self;
    /// The nominal complex value (uncertainty discarded).
    fn nominal(self) -> CScalar;
    /// Per-axis standard uncertainties, if the representation carries them.
    fn std_dev(self) -> Option<(Scalar, Scalar)>;
    /// Principal square root.
    fn sqrt(self) -> Self;
    /// Principal natural logarithm.
    fn ln(self) -> Self;
    /// Complex exponential.
    fn exp(self) -> Self;
    /// Modified Bessel function of the first kind, order `nu` ∈ {0, 1}.
    fn bessel_i(self, nu: u32) -> Self;
    /// Modified Bessel function of the second kind, order `nu` ∈ {0, 1}.
    fn bessel_k(self, nu: u32) -> Self;
    /// Scaled variant `I_ν(z)·e^{-z}`, stable for large `Re z > 0`.
    fn bessel_i_scaled(self, nu: u32) -> Self;
    /// Scaled variant `K_ν(z)·e^{+z}`, stable for large `Re z > 0`.
    fn bessel_k_scaled(self, nu: u32) -> Self;

    /// Magnitude of the nominal value.
    fn norm(self) -> Scalar {
        self.nominal().norm()
    }
    /// Additive identity.
    fn zero() -> Self {
        Self::from(0.0)
    }
    /// Multiplicative identity.
    fn one() -> Self {
        Self::from(1.0)
    }
    /// The imaginary unit.
    fn j() -> Self {
        Self::from_complex(Complex::new(0.0, 1.0))
    }
}

impl EngineScalar for CScalar {
    fn from_complex(c: CScalar) -> Self {
        c
    }

    fn from_measure(m: Measure) -> Self {
        Complex::new(m.value, 0.0)
    }

    fn nominal(self) -> CScalar {
        self
    }

    fn std_dev(self) -> Option<(Scalar, Scalar)> {
        None
    }

    fn sqrt(self) -> Self {
        Complex::sqrt(self)
    }

    fn ln(self) -> Self {
        Complex::ln(self)
    }

    fn exp(self) -> Self {
        Complex::exp(self)
    }

    fn bessel_i(self, nu: u32) -> Self {
        special::bessel_i(nu, self)
    }

    fn bessel_k(self, nu: u32) -> Self {
        special::bessel_k(nu, self)
    }

    fn bessel_i_scaled(self, nu: u32) -> Self {
        special::bessel_i_scaled(nu, self)
    }

    fn bessel_k_scaled(self, nu: u32) -> Self {
        special::bessel_k_scaled(nu, self)
    }
}

impl EngineScalar for UComplex {
    fn from_complex(c: CScalar) -> Self {
        Self::certain(c)
    }

    fn from_measure(m: Measure) -> Self {
        Self::with_variances(m.value, 0.0, m.sigma * m.sigma, 0.0)
    }

    fn nominal(self) -> CScalar {
        self.value()
    }

    fn std_dev(self) -> Option<(Scalar, Scalar)> {
        Some(self.sigmas())
    }

    fn sqrt(self) -> Self {
        let f = self.value().sqrt();
        // d/dz sqrt(z) = 1 / (2 sqrt(z))
        self.lift(f, Complex::new(0.5, 0.0) / f)
    }

    fn ln(self) -> Self {
        let z = self.value();
        self.lift(z.ln(), Complex::new(1.0, 0.0) / z)
    }

    fn exp(self) -> Self {
        let f = self.value().exp();
        self.lift(f, f)
    }

    fn bessel_i(self, nu: u32) -> Self {
        special::propagate_c2c(self, |z| special::bessel_i(nu, z))
    }

    fn bessel_k(self, nu: u32) -> Self {
        special::propagate_c2c(self, |z| special::bessel_k(nu, z))
    }

    fn bessel_i_scaled(self, nu: u32) -> Self {
        special::propagate_c2c(self, |z| special::bessel_i_scaled(nu, z))
    }

    fn bessel_k_scaled(self, nu: u32) -> Self {
        special::propagate_c2c(self, |z| special::bessel_k_scaled(nu, z))
    }
}
