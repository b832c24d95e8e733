//! Convenience re-exports for setting up cable-parameter computations.

pub use crate::assembly::{compute_line_parameters, EngineConfig, LineParametersResult};
pub use crate::constants::*;
pub use crate::diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use crate::errors::LineParamError;
pub use crate::formulations::{
    EarthImpedance, EhemReduction, InsulationAdmittance, InternalImpedance, LayerIndex, Placement,
};
pub use crate::geometry::{
    Cable, CableComponent, CableSystem, ConductorGroup, EarthLayer, EarthModel, InsulationGroup,
    LayerProperty,
};
pub use crate::line_params::{LineParameters, Rlgc};
pub use crate::math::{CMatrix, CScalar, Scalar};
pub use crate::numeric::{Measure, NumericMode, UComplex};
pub use crate::quad::QuadratureConfig;
pub use crate::sweep::{linspace, logspace_hz};
pub use crate::transforms::{
    fortescue_transform, ideal_transposition, kron_reduce, merge_bundles, FortescueResult,
};
