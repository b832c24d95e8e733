//! Adaptive semi-infinite quadrature for earth-return kernels.
//!
//! The earth formulations integrate decaying oscillatory kernels over
//! `[0, ∞)`. Each finite panel is evaluated with a Gauss–Kronrod 7/15 pair
//! (QUADPACK `dqk15` abscissae); panels whose embedded error estimate exceeds
//! the local tolerance are bisected. Panels march outward with geometrically
//! growing width until two consecutive panels contribute less than the
//! configured tolerance, which bounds the tail without assuming an analytic
//! decay rate. Iteration is capped; exhausting the cap is a convergence
//! error, never a silent truncation.
//!
//! The integrand returns an [`EngineScalar`], so uncertainty-carrying values
//! ride through the weighted sums unchanged; error control always acts on the
//! nominal part.

use crate::errors::{LineParamError, Result};
use crate::math::Scalar;
use crate::numeric::EngineScalar;

/// Kronrod abscissae for the 15-point rule on [-1, 1] (QUADPACK dqk15).
const XGK: [Scalar; 8] = [
    0.991_455_371_120_813,
    0.949_107_912_342_759,
    0.864_864_423_359_769,
    0.741_531_185_599_394,
    0.586_087_235_467_691,
    0.405_845_151_377_397,
    0.207_784_955_007_898,
    0.0,
];

/// Kronrod weights matching `XGK`.
const WGK: [Scalar; 8] = [
    0.022_935_322_010_529,
    0.063_092_092_629_979,
    0.104_790_010_322_250,
    0.140_653_259_715_525,
    0.169_004_726_639_267,
    0.190_350_578_064_785,
    0.204_432_940_075_298,
    0.209_482_141_084_728,
];

/// Weights of the embedded 7-point Gauss rule (odd-indexed abscissae).
const WG: [Scalar; 4] = [
    0.129_484_966_168_870,
    0.279_705_391_489_277,
    0.381_830_050_505_119,
    0.417_959_183_673_469,
];

/// Accuracy and iteration knobs for the semi-infinite quadrature.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureConfig {
    /// Absolute tolerance on each panel and on the tail cutoff.
    pub abs_tol: Scalar,
    /// Relative tolerance against the accumulated integral.
    pub rel_tol: Scalar,
    /// Maximum bisection depth inside one panel.
    pub max_depth: usize,
    /// Maximum number of outward panels before giving up on the tail.
    pub max_panels: usize,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            abs_tol: 1.0e-8,
            rel_tol: 1.0e-6,
            max_depth: 24,
            max_panels: 64,
        }
    }
}

/// One Gauss–Kronrod 7/15 evaluation over `[a, b]`.
/// Returns the Kronrod estimate and the |K15 − G7| error estimate.
fn kronrod_panel<T, F>(f: &F, a: Scalar, b: Scalar) -> (T, Scalar)
where
    T: EngineScalar,
    F: Fn(Scalar) -> T,
{
    let half = 0.5 * (b - a);
    let center = 0.5 * (a + b);

    let mut kronrod = T::zero();
    let mut gauss = T::zero();
    for (i, (&x, &wk)) in XGK.iter().zip(WGK.iter()).enumerate() {
        let sample = if i == 7 {
            f(center)
        } else {
            f(center - half * x) + f(center + half * x)
        };
        kronrod = kronrod + T::from(wk) * sample;
        if i % 2 == 1 {
            gauss = gauss + T::from(WG[i / 2]) * sample;
        }
    }
    let kronrod = T::from(half) * kronrod;
    let gauss = T::from(half) * gauss;
    let err = (kronrod - gauss).norm();
    (kronrod, err)
}

/// Adaptively integrates `f` over the finite interval `[a, b]`.
fn adaptive_interval<T, F>(f: &F, a: Scalar, b: Scalar, tol: Scalar, cfg: &QuadratureConfig) -> Result<T>
where
    T: EngineScalar,
    F: Fn(Scalar) -> T,
{
    // Explicit worklist of (a, b, depth); avoids recursion depth limits.
    let mut stack = vec![(a, b, 0usize)];
    let mut total = T::zero();
    while let Some((lo, hi, depth)) = stack.pop() {
        let (value, err) = kronrod_panel(f, lo, hi);
        let width_fraction = (hi - lo) / (b - a);
        if err <= tol * width_fraction.max(Scalar::EPSILON) || err <= cfg.abs_tol {
            total = total + value;
        } else if depth >= cfg.max_depth {
            return Err(LineParamError::Convergence(format!(
                "panel [{lo:.6e}, {hi:.6e}] still at error {err:.3e} after {depth} bisections"
            )));
        } else {
            let mid = 0.5 * (lo + hi);
            stack.push((lo, mid, depth + 1));
            stack.push((mid, hi, depth + 1));
        }
    }
    Ok(total)
}

/// Integrates `f` over `[0, ∞)`.
///
/// `scale` is the characteristic decay length of the kernel (the first panel
/// width); panels widen geometrically from there. The integration stops when
/// two consecutive panels fall below tolerance, and fails with
/// [`LineParamError::Convergence`] if `max_panels` is exhausted first.
pub fn integrate_semi_infinite<T, F>(f: F, scale: Scalar, cfg: &QuadratureConfig) -> Result<T>
where
    T: EngineScalar,
    F: Fn(Scalar) -> T,
{
    debug_assert!(scale.is_finite() && scale > 0.0);
    let mut total = T::zero();
    let mut a = 0.0;
    let mut width = scale;
    let mut quiet_panels = 0;
    for _ in 0..cfg.max_panels {
        let tol = cfg.abs_tol.max(cfg.rel_tol * total.norm());
        let panel = adaptive_interval(&f, a, a + width, tol, cfg)?;
        total = total + panel;
        if panel.norm() <= tol {
            quiet_panels += 1;
            if quiet_panels >= 2 {
                return Ok(total);
            }
        } else {
            quiet_panels = 0;
        }
        a += width;
        width *= 1.6;
    }
    Err(LineParamError::Convergence(format!(
        "tail still contributing after {} panels (reached x = {a:.3e})",
        cfg.max_panels
    )))
}
