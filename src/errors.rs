//! Shared error types used across submodules.

use thiserror::Error;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum LineParamError {
    /// Raised when a formulation or reduction is configured inconsistently
    /// (invalid EHEM layer index, malformed bundle map, all phases grounded).
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised by the pre-flight validation pass when a geometric or material
    /// input is non-finite or outside its physical domain.
    #[error("invalid input for {field} of phase {phase}: {message}")]
    Validation {
        /// Name of the offending descriptor field.
        field: &'static str,
        /// Flattened phase index of the offending entry.
        phase: usize,
        /// Human-readable description of the violation.
        message: String,
    },
    /// Raised when a conductor's declared earth layer does not match the
    /// placement an earth-return formulation was configured for.
    #[error("earth layer mismatch: {0}")]
    LayerMismatch(String),
    /// Raised when the semi-infinite quadrature exhausts its iteration budget
    /// before reaching the requested tolerance.
    #[error("quadrature failed to converge: {0}")]
    Convergence(String),
    /// Raised by post-processing transforms on structurally invalid input.
    #[error("transform error: {0}")]
    Transform(String),
}

/// Convenience result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, LineParamError>;
