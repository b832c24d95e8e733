//! Equivalent-homogeneous-earth reduction.
//!
//! Collapses a multi-layer earth model to air plus one chosen earth layer,
//! so that formulations restricted to homogeneous earth (the closed forms,
//! and buried pairs that would otherwise straddle layers) become applicable.
//! The reduction rewrites the workspace: the earth property matrices keep
//! only the air row and the target layer's row, and every buried conductor
//! is remapped into that single earth layer.

use nalgebra::DMatrix;

use crate::errors::{LineParamError, Result};
use crate::numeric::EngineScalar;
use crate::workspace::NumericWorkspace;

/// Selects which earth layer survives the reduction. Indices are 1-based
/// over the full stack, air included, so the shallowest earth layer is 2.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerIndex {
    /// The deepest (semi-infinite) layer.
    #[default]
    Last,
    /// An explicit 1-based layer index; must name an earth layer.
    At(usize),
}

impl LayerIndex {
    /// Builds a selector from a signed offset: `-1` addresses the deepest
    /// layer, positive values are the 1-based index.
    #[must_use]
    pub fn from_offset(offset: isize) -> Self {
        if offset == -1 {
            Self::Last
        } else {
            Self::At(offset.max(0).unsigned_abs())
        }
    }

    /// Resolves to a 0-based row of the earth property matrices.
    fn resolve(self, layer_count: usize) -> Result<usize> {
        let index = match self {
            Self::Last => layer_count,
            Self::At(n) => n,
        };
        if index < 2 || index > layer_count {
            return Err(LineParamError::Config(format!(
                "reduction target {index} is out of range; earth layers are \
                 indexed 2 through {layer_count}"
            )));
        }
        Ok(index - 1)
    }
}

/// Configuration of the equivalent-homogeneous-earth reduction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EhemReduction {
    /// The earth layer whose properties represent the whole earth.
    pub target: LayerIndex,
}

impl EhemReduction {
    /// Reduction keeping the given layer.
    #[must_use]
    pub fn new(target: LayerIndex) -> Self {
        Self { target }
    }

    /// Applies the reduction, producing a two-layer workspace (air plus the
    /// target layer) with every buried conductor remapped into layer 1.
    /// Conductor positions and geometry are untouched.
    pub fn apply<T: EngineScalar>(
        &self,
        workspace: &NumericWorkspace<T>,
    ) -> Result<NumericWorkspace<T>> {
        let row = self.target.resolve(workspace.layer_count())?;
        let freq_count = workspace.frequency_count();
        let pick = |source: &DMatrix<T>| {
            DMatrix::from_fn(2, freq_count, |l, k| {
                if l == 0 {
                    source[(0, k)]
                } else {
                    source[(row, k)]
                }
            })
        };
        let mut phases = workspace.phases.clone();
        for phase in &mut phases {
            if phase.layer > 0 {
                phase.layer = 1;
            }
        }
        Ok(NumericWorkspace {
            phases,
            frequencies: workspace.frequencies.clone(),
            earth_sigma: pick(&workspace.earth_sigma),
            earth_eps: pick(&workspace.earth_eps),
            earth_mu: pick(&workspace.earth_mu),
            layer_tops: vec![0.0, 0.0],
            temperature: workspace.temperature,
            cable_count: workspace.cable_count,
        })
    }
}
