//! Frequency sweep builders for the engine's frequency axis.

use crate::constants::angular_frequency;
use crate::math::Scalar;

/// Generates `n` linearly spaced samples in [start, stop].
#[must_use]
pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as Scalar - 1.0);
            (0..n).map(|i| start + step * i as Scalar).collect()
        }
    }
}

/// Generates `n` logarithmically spaced samples between `start` and `stop` (Hz).
/// Requires start > 0 and stop > 0.
#[must_use]
pub fn logspace_hz(start_hz: Scalar, stop_hz: Scalar, n: usize) -> Vec<Scalar> {
    assert!(start_hz > 0.0 && stop_hz > 0.0);
    match n {
        0 => Vec::new(),
        1 => vec![start_hz],
        _ => {
            let log_start = start_hz.log10();
            let log_stop = stop_hz.log10();
            let step = (log_stop - log_start) / (n as Scalar - 1.0);
            (0..n)
                .map(|i| 10f64.powf(log_start + step * i as Scalar))
                .collect()
        }
    }
}

/// Angular frequency sweep with linear spacing between f_start and f_stop (Hz).
#[must_use]
pub fn angular_freq_linspace(f_start_hz: Scalar, f_stop_hz: Scalar, n: usize) -> Vec<Scalar> {
    linspace(f_start_hz, f_stop_hz, n)
        .into_iter()
        .map(angular_frequency)
        .collect()
}

/// Angular frequency sweep with logarithmic spacing between f_start and f_stop (Hz).
#[must_use]
pub fn angular_freq_logspace(f_start_hz: Scalar, f_stop_hz: Scalar, n: usize) -> Vec<Scalar> {
    logspace_hz(f_start_hz, f_stop_hz, n)
        .into_iter()
        .map(angular_frequency)
        .collect()
}
