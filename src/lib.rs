#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Fundamental physical constants used throughout the library.
pub mod constants;
/// Scalar and complex-matrix aliases plus numeric tolerances.
pub mod math;
/// Error types shared across the engine.
pub mod errors;
/// Measured inputs, numeric-mode resolution, and the uncertainty-carrying
/// scalar representation.
pub mod numeric;
/// Complex modified Bessel functions with derivative-based uncertainty
/// propagation.
pub mod special;
/// Adaptive Gauss-Kronrod quadrature over semi-infinite intervals.
pub mod quad;
/// Frequency sweep builders.
pub mod sweep;
/// Hierarchical cable, insulation, and earth-model description types.
pub mod geometry;
/// Input validation and the flattened per-phase workspace.
pub mod workspace;
/// Physical formulation strategies: internal impedance, insulation
/// admittance, earth return, and earth-layer reduction.
pub mod formulations;
/// Per-frequency assembly of the Z and Y matrices.
pub mod assembly;
/// The frequency-indexed parameter matrices and RLGC extraction.
pub mod line_params;
/// Post-processing transforms: Kron reduction, bundle merging, transposition,
/// symmetrical components.
pub mod transforms;
/// Non-fatal findings reported by transforms.
pub mod diagnostics;

/// Common exports for downstream crates.
pub mod prelude;
