//! Frequency-indexed series-impedance and shunt-admittance matrices.
//!
//! [`LineParameters`] is the engine's output container: one square Z and one
//! square Y matrix per frequency sample, all of the same dimension, in the
//! order the frequency vector was given. The container is generic over the
//! numeric representation; [`LineParametersResult`] in the assembly module
//! carries whichever representation the inputs resolved to.

use nalgebra::DMatrix;
use num_complex::Complex;

use crate::errors::{LineParamError, Result};
use crate::math::{CMatrix, Scalar};
use crate::numeric::EngineScalar;

/// Per-unit-length RLGC parameters extracted from one (phase, frequency)
/// entry of the matrices.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rlgc {
    /// Series resistance per meter (Ω/m).
    pub r_per_m: Scalar,
    /// Series inductance per meter (H/m).
    pub l_per_m: Scalar,
    /// Shunt conductance per meter (S/m).
    pub g_per_m: Scalar,
    /// Shunt capacitance per meter (F/m).
    pub c_per_m: Scalar,
}

impl Rlgc {
    /// Same parameters scaled to per-kilometer units.
    #[must_use]
    pub fn per_km(&self) -> Self {
        Self {
            r_per_m: self.r_per_m * 1.0e3,
            l_per_m: self.l_per_m * 1.0e3,
            g_per_m: self.g_per_m * 1.0e3,
            c_per_m: self.c_per_m * 1.0e3,
        }
    }
}

/// Series-impedance (Ω/m) and shunt-admittance (S/m) matrices over a
/// frequency sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct LineParameters<T> {
    /// Series impedance matrices, one per frequency.
    pub z: Vec<DMatrix<T>>,
    /// Shunt admittance matrices, one per frequency.
    pub y: Vec<DMatrix<T>>,
    /// Frequency samples (Hz), in input order.
    pub frequencies: Vec<Scalar>,
}

impl<T: EngineScalar + nalgebra::Scalar> LineParameters<T> {
    /// Wraps the per-frequency matrices, checking that every matrix is
    /// square, of a common dimension, and that the three vectors agree in
    /// length.
    pub fn new(
        z: Vec<DMatrix<T>>,
        y: Vec<DMatrix<T>>,
        frequencies: Vec<Scalar>,
    ) -> Result<Self> {
        if z.len() != frequencies.len() || y.len() != frequencies.len() {
            return Err(LineParamError::Config(format!(
                "{} Z and {} Y matrices for {} frequencies",
                z.len(),
                y.len(),
                frequencies.len()
            )));
        }
        let dim = z.first().map_or(0, DMatrix::nrows);
        for (k, m) in z.iter().chain(y.iter()).enumerate() {
            if m.nrows() != dim || m.ncols() != dim {
                return Err(LineParamError::Config(format!(
                    "matrix {k} is {}x{}, expected {dim}x{dim}",
                    m.nrows(),
                    m.ncols()
                )));
            }
        }
        Ok(Self { z, y, frequencies })
    }

    /// Matrix dimension (number of retained conductors).
    #[must_use]
    pub fn dim(&self) -> usize {
        self.z.first().map_or(0, DMatrix::nrows)
    }

    /// Number of frequency samples.
    #[must_use]
    pub fn frequency_count(&self) -> usize {
        self.frequencies.len()
    }

    /// The single-frequency slice at sample `k`.
    #[must_use]
    pub fn at(&self, k: usize) -> Option<(&DMatrix<T>, &DMatrix<T>, Scalar)> {
        Some((self.z.get(k)?, self.y.get(k)?, *self.frequencies.get(k)?))
    }

    /// A copy restricted to the frequency samples in `range`.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Result<Self> {
        if range.end > self.frequency_count() || range.start > range.end {
            return Err(LineParamError::Config(format!(
                "slice {range:?} out of range for {} samples",
                self.frequency_count()
            )));
        }
        Ok(Self {
            z: self.z[range.clone()].to_vec(),
            y: self.y[range.clone()].to_vec(),
            frequencies: self.frequencies[range].to_vec(),
        })
    }

    /// Nominal-value projection of both matrix stacks, discarding any
    /// uncertainty the representation carries.
    #[must_use]
    pub fn nominal(&self) -> (Vec<CMatrix>, Vec<CMatrix>) {
        let project = |stack: &[DMatrix<T>]| {
            stack
                .iter()
                .map(|m| m.map(|entry| entry.nominal()))
                .collect()
        };
        (project(&self.z), project(&self.y))
    }

    /// One-sigma standard deviations of both matrix stacks, packed as
    /// `Complex(sigma_re, sigma_im)` per entry. All zero for the plain
    /// representation.
    #[must_use]
    pub fn sigmas(&self) -> (Vec<CMatrix>, Vec<CMatrix>) {
        let project = |stack: &[DMatrix<T>]| {
            stack
                .iter()
                .map(|m| {
                    m.map(|entry| {
                        let (sr, si) = entry.std_dev().unwrap_or((0.0, 0.0));
                        Complex::new(sr, si)
                    })
                })
                .collect()
        };
        (project(&self.z), project(&self.y))
    }

    /// Nominal RLGC parameters of entry `(i, j)` at frequency sample `k`.
    /// The diagonal gives a phase's self parameters, off-diagonal entries
    /// the coupling terms.
    pub fn rlgc(&self, i: usize, j: usize, k: usize) -> Result<Rlgc> {
        let (z, y, f) = self.at(k).ok_or_else(|| {
            LineParamError::Config(format!(
                "frequency index {k} out of range ({} samples)",
                self.frequency_count()
            ))
        })?;
        let dim = self.dim();
        if i >= dim || j >= dim {
            return Err(LineParamError::Config(format!(
                "entry ({i}, {j}) out of range for dimension {dim}"
            )));
        }
        let omega = crate::constants::angular_frequency(f);
        let z_ij = z[(i, j)].nominal();
        let y_ij = y[(i, j)].nominal();
        Ok(Rlgc {
            r_per_m: z_ij.re,
            l_per_m: z_ij.im / omega,
            g_per_m: y_ij.re,
            c_per_m: y_ij.im / omega,
        })
    }
}
