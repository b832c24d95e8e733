//! Special-function layer: modified Bessel functions of complex argument.
//!
//! Provides `I_ν` and `K_ν` for ν ∈ {0, 1}, the orders the skin-effect and
//! earth-return kernels need, together with the exponentially weighted
//! variants `I_ν(z)·e^{-z}` and `K_ν(z)·e^{+z}` used to keep Schelkunoff
//! Bessel ratios finite at large |z|. Small arguments use the ascending
//! series (A&S 9.6.10/9.6.11), large arguments the asymptotic expansions
//! (A&S 9.7.1/9.7.2). All entry points assume `Re z ≥ 0`, which holds for
//! every argument the engine produces (arg z = π/4 for skin-effect terms,
//! positive real multiples for earth kernels).
//!
//! Uncertainty-carrying arguments enter through [`propagate_c2c`], which
//! evaluates the underlying function at the nominal point, forms the 2×2
//! Jacobian by central finite differences and applies first-order (delta
//! method) propagation. Plain arguments never touch that path.

use num_complex::Complex;

use crate::math::{CScalar, Scalar};
use crate::numeric::UComplex;

/// Euler–Mascheroni constant γ.
const EULER_GAMMA: Scalar = 0.577_215_664_901_532_9;

/// Crossover |z| between the ascending series and the asymptotic expansion
/// for `I_ν`. The `I` series has non-alternating coefficients and loses at
/// most a few digits to phase cancellation at the engine's argument phases,
/// so it stays accurate well past the point where the asymptotic expansion
/// takes over.
const I_SERIES_CUTOFF: Scalar = 30.0;

/// Crossover |z| for `K_ν`. The `K` series subtracts two `I`-sized sums to
/// produce an exponentially small result, so its rounding error grows like
/// `e^{2·Re z}·ε`; past `|z| ≈ 10` the asymptotic expansion (truncated at
/// its smallest term, error below 1e-10 there) is the accurate branch.
const K_SERIES_CUTOFF: Scalar = 10.0;

/// Maximum ascending-series terms; the series converges far earlier for any
/// |z| below either cutoff.
const MAX_SERIES_TERMS: usize = 200;

/// Relative term size at which summation stops.
const TERM_TOLERANCE: Scalar = 1.0e-16;

fn half_z_squared(z: CScalar) -> CScalar {
    let h = z * Complex::new(0.5, 0.0);
    h * h
}

/// Ascending series for `I_ν(z)`, ν ∈ {0, 1}.
fn bessel_i_series(nu: u32, z: CScalar) -> CScalar {
    let q = half_z_squared(z);
    // term_0 = (z/2)^nu / nu!
    let mut term = match nu {
        0 => Complex::new(1.0, 0.0),
        _ => z * Complex::new(0.5, 0.0),
    };
    let mut sum = term;
    for k in 1..MAX_SERIES_TERMS {
        let k_f = k as Scalar;
        term = term * q / Complex::new(k_f * (k_f + nu as Scalar), 0.0);
        sum += term;
        if term.norm() < TERM_TOLERANCE * sum.norm() {
            break;
        }
    }
    sum
}

/// Ascending series for `K_ν(z)`, ν ∈ {0, 1} (A&S 9.6.11).
fn bessel_k_series(nu: u32, z: CScalar) -> CScalar {
    let q = half_z_squared(z);
    let log_half_z = (z * Complex::new(0.5, 0.0)).ln();
    match nu {
        0 => {
            // K0 = -(ln(z/2) + γ) I0 + Σ_{k≥1} H_k (z²/4)^k / (k!)²
            let mut sum = Complex::new(0.0, 0.0);
            let mut term = Complex::new(1.0, 0.0);
            let mut harmonic = 0.0;
            for k in 1..MAX_SERIES_TERMS {
                let k_f = k as Scalar;
                term = term * q / Complex::new(k_f * k_f, 0.0);
                harmonic += 1.0 / k_f;
                let contribution = term * Complex::new(harmonic, 0.0);
                sum += contribution;
                if contribution.norm() < TERM_TOLERANCE * (sum.norm() + 1.0) {
                    break;
                }
            }
            -(log_half_z + Complex::new(EULER_GAMMA, 0.0)) * bessel_i_series(0, z) + sum
        }
        _ => {
            // K1 = 1/z + ln(z/2) I1
            //      - (z/4) Σ_{k≥0} (ψ(k+1) + ψ(k+2)) (z²/4)^k / (k! (k+1)!)
            let mut sum = Complex::new(0.0, 0.0);
            let mut term = Complex::new(1.0, 0.0);
            let mut harmonic_k = 0.0; // H_k
            for k in 0..MAX_SERIES_TERMS {
                let k_f = k as Scalar;
                if k > 0 {
                    harmonic_k += 1.0 / k_f;
                    term = term * q / Complex::new(k_f * (k_f + 1.0), 0.0);
                }
                // ψ(k+1) + ψ(k+2) = -2γ + H_k + H_{k+1}
                let digamma_pair = -2.0 * EULER_GAMMA + 2.0 * harmonic_k + 1.0 / (k_f + 1.0);
                let contribution = term * Complex::new(digamma_pair, 0.0);
                sum += contribution;
                if k > 2 && contribution.norm() < TERM_TOLERANCE * (sum.norm() + 1.0) {
                    break;
                }
            }
            Complex::new(1.0, 0.0) / z + log_half_z * bessel_i_series(1, z)
                - z * Complex::new(0.25, 0.0) * sum
        }
    }
}

/// Asymptotic tail Σ_k (±1)^k a_k(ν) / z^k shared by the large-argument
/// expansions. `alternating` selects the `I` form (signs alternate).
fn asymptotic_tail(nu: u32, z: CScalar, alternating: bool) -> CScalar {
    let mu = 4.0 * (nu * nu) as Scalar;
    let mut sum = Complex::new(1.0, 0.0);
    let mut term = Complex::new(1.0, 0.0);
    let mut previous_norm = Scalar::INFINITY;
    for k in 1..30 {
        let k_f = k as Scalar;
        let odd = 2.0 * k_f - 1.0;
        let mut factor = Complex::new(mu - odd * odd, 0.0) / (z * Complex::new(8.0 * k_f, 0.0));
        if alternating {
            factor = -factor;
        }
        term *= factor;
        let n = term.norm();
        // The expansion is asymptotic: stop at the smallest term.
        if n >= previous_norm {
            break;
        }
        sum += term;
        if n < TERM_TOLERANCE * sum.norm() {
            break;
        }
        previous_norm = n;
    }
    sum
}

fn sqrt_two_pi_z(z: CScalar) -> CScalar {
    (z * Complex::new(2.0 * std::f64::consts::PI, 0.0)).sqrt()
}

/// Modified Bessel function of the first kind `I_ν(z)`, ν ∈ {0, 1}.
///
/// # Panics
/// Panics if `nu > 1`; the engine never needs higher orders.
#[must_use]
pub fn bessel_i(nu: u32, z: CScalar) -> CScalar {
    assert!(nu <= 1, "bessel_i supports orders 0 and 1, got {nu}");
    if z.norm() <= I_SERIES_CUTOFF {
        bessel_i_series(nu, z)
    } else {
        z.exp() / sqrt_two_pi_z(z) * asymptotic_tail(nu, z, true)
    }
}

/// Modified Bessel function of the second kind `K_ν(z)`, ν ∈ {0, 1}.
///
/// # Panics
/// Panics if `nu > 1`.
#[must_use]
pub fn bessel_k(nu: u32, z: CScalar) -> CScalar {
    assert!(nu <= 1, "bessel_k supports orders 0 and 1, got {nu}");
    if z.norm() <= K_SERIES_CUTOFF {
        bessel_k_series(nu, z)
    } else {
        let half_pi_over_z = Complex::new(std::f64::consts::FRAC_PI_2, 0.0) / z;
        (-z).exp() * half_pi_over_z.sqrt() * asymptotic_tail(nu, z, false)
    }
}

/// Exponentially weighted `I_ν(z)·e^{-z}`; finite for arbitrarily large
/// `Re z > 0` where the bare function overflows.
#[must_use]
pub fn bessel_i_scaled(nu: u32, z: CScalar) -> CScalar {
    assert!(nu <= 1, "bessel_i_scaled supports orders 0 and 1, got {nu}");
    if z.norm() <= I_SERIES_CUTOFF {
        bessel_i_series(nu, z) * (-z).exp()
    } else {
        asymptotic_tail(nu, z, true) / sqrt_two_pi_z(z)
    }
}

/// Exponentially weighted `K_ν(z)·e^{+z}`; finite for arbitrarily large
/// `Re z > 0` where the bare function underflows.
#[must_use]
pub fn bessel_k_scaled(nu: u32, z: CScalar) -> CScalar {
    assert!(nu <= 1, "bessel_k_scaled supports orders 0 and 1, got {nu}");
    if z.norm() <= K_SERIES_CUTOFF {
        bessel_k_series(nu, z) * z.exp()
    } else {
        let half_pi_over_z = Complex::new(std::f64::consts::FRAC_PI_2, 0.0) / z;
        half_pi_over_z.sqrt() * asymptotic_tail(nu, z, false)
    }
}

/// First-order propagation of an uncertain complex argument through a
/// complex-valued function.
///
/// Evaluates `f` at the nominal point, forms the four partial derivatives of
/// (Re f, Im f) with respect to (Re z, Im z) by central finite differences,
/// and maps the input variances through the squared Jacobian entries.
#[must_use]
pub fn propagate_c2c<F>(u: UComplex, f: F) -> UComplex
where
    F: Fn(CScalar) -> CScalar,
{
    let z = u.value();
    let value = f(z);
    // Central-difference step ~ eps^(1/3), scaled to the argument magnitude.
    let h = Scalar::EPSILON.cbrt() * z.norm().max(1.0);
    let step_re = Complex::new(h, 0.0);
    let step_im = Complex::new(0.0, h);
    let d_dx = (f(z + step_re) - f(z - step_re)) / (2.0 * h);
    let d_dy = (f(z + step_im) - f(z - step_im)) / (2.0 * h);
    UComplex::with_variances(
        value.re,
        value.im,
        d_dx.re * d_dx.re * u.var_re + d_dy.re * d_dy.re * u.var_im,
        d_dx.im * d_dx.im * u.var_re + d_dy.im * d_dy.im * u.var_im,
    )
}
