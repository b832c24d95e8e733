//! Physical formulation strategies evaluated by the assembly loop.
//!
//! Each family is a closed set of tagged variants selected at configuration
//! time: conductor internal impedance, insulation admittance, earth-return
//! impedance, and the equivalent-homogeneous-earth reduction. Variants are
//! stateless (or carry only configuration such as a quadrature tolerance) and
//! are shared read-only across frequencies and worker threads.

pub mod earth;
pub mod ehem;
pub mod insulation;
pub mod internal;

pub use earth::{EarthImpedance, EarthPair, EarthSlice, Placement};
pub use ehem::{EhemReduction, LayerIndex};
pub use insulation::InsulationAdmittance;
pub use internal::{InternalImpedance, InternalTerms};
