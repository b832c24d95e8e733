//! Baseline physical constants and utility functions.
//!
//! Constants marked "exact" have zero uncertainty by SI definition (2019
//! revision). Measured constants (ε₀, μ₀) are provided with 11-12 significant
//! figures, suitable for engineering applications; for latest values consult
//! NIST directly.

use std::f64::consts::PI;

/// Vacuum permittivity ε₀ in farads per meter (F/m).
/// Approximate value: 8.8541878128 × 10⁻¹² F/m (11 significant figures).
pub const VACUUM_PERMITTIVITY: f64 = 8.854_187_812_8e-12;
/// Vacuum permeability μ₀ in henries per meter (H/m).
/// Approximate value: 1.25663706212 × 10⁻⁶ H/m (12 significant figures).
pub const VACUUM_PERMEABILITY: f64 = 1.256_637_062_12e-6;
/// Speed of light in vacuum _c_ in meters per second (m/s).
/// Exact value by SI definition (2019): 299,792,458 m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// Resistivity of annealed copper at 20 °C in ohm-meters (IEC 60028).
pub const COPPER_RESISTIVITY_20C: f64 = 1.724_1e-8;
/// Temperature coefficient of resistance for annealed copper (1/K, at 20 °C).
pub const COPPER_ALPHA_20C: f64 = 3.93e-3;
/// Reference temperature for material resistivities (°C).
pub const REFERENCE_TEMPERATURE: f64 = 20.0;

/// Returns the angular frequency corresponding to a linear frequency `hz`.
#[inline]
#[must_use]
pub fn angular_frequency(hz: f64) -> f64 {
    2.0 * PI * hz
}

/// Corrects a resistivity from the reference temperature to `temperature`
/// (°C) using the linear coefficient `alpha` (1/K).
#[inline]
#[must_use]
pub fn resistivity_at_temperature(rho_20: f64, alpha: f64, temperature: f64) -> f64 {
    rho_20 * (1.0 + alpha * (temperature - REFERENCE_TEMPERATURE))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn angular_frequency_at_50_hz() {
        assert_relative_eq!(angular_frequency(50.0), 100.0 * PI, epsilon = 1.0e-12);
    }

    #[test]
    fn copper_resistivity_rises_with_temperature() {
        let rho_90 = resistivity_at_temperature(COPPER_RESISTIVITY_20C, COPPER_ALPHA_20C, 90.0);
        assert!(rho_90 > COPPER_RESISTIVITY_20C);
        assert_relative_eq!(
            rho_90 / COPPER_RESISTIVITY_20C,
            1.0 + 70.0 * COPPER_ALPHA_20C,
            epsilon = 1.0e-12
        );
    }
}
