//! Input contract between the external cable-geometry model and the engine.
//!
//! The geometry library flattens its layered construction (stranded cores,
//! screens, armor, jackets) into the aggregate groups below before calling the
//! engine: one [`ConductorGroup`] and one [`InsulationGroup`] per coaxial
//! component, positions per cable, and an ordered [`EarthModel`]. Every
//! physical quantity is a [`Measure`], so measurement uncertainty can ride in
//! from the outside; exact inputs keep σ = 0.

use crate::constants::REFERENCE_TEMPERATURE;
use crate::math::Scalar;
use crate::numeric::Measure;

/// Aggregate electrical description of one tubular conductor.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConductorGroup {
    /// Inner radius in meters (zero for a solid conductor).
    pub inner_radius: Measure,
    /// Outer radius in meters.
    pub outer_radius: Measure,
    /// DC resistivity at the reference temperature, Ω·m.
    pub resistivity: Measure,
    /// Relative magnetic permeability.
    pub mu_r: Measure,
    /// Relative permittivity of the conductor material.
    pub eps_r: Measure,
    /// Linear temperature coefficient of resistivity (1/K); zero disables
    /// the operating-temperature correction.
    pub alpha: Scalar,
}

impl ConductorGroup {
    /// Solid conductor of the given outer radius and resistivity, with
    /// non-magnetic material defaults.
    #[must_use]
    pub fn solid(outer_radius: Measure, resistivity: Measure) -> Self {
        Self {
            inner_radius: Measure::exact(0.0),
            outer_radius,
            resistivity,
            mu_r: Measure::exact(1.0),
            eps_r: Measure::exact(1.0),
            alpha: 0.0,
        }
    }

    /// Tubular conductor (sheath, screen, armor) between the given radii.
    #[must_use]
    pub fn tubular(inner_radius: Measure, outer_radius: Measure, resistivity: Measure) -> Self {
        Self {
            inner_radius,
            outer_radius,
            resistivity,
            mu_r: Measure::exact(1.0),
            eps_r: Measure::exact(1.0),
            alpha: 0.0,
        }
    }
}

/// Aggregate description of the insulation wrapped around a conductor.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsulationGroup {
    /// Inner radius in meters (the conductor's outer radius).
    pub inner_radius: Measure,
    /// Outer radius in meters; equal to `inner_radius` for a bare conductor.
    pub outer_radius: Measure,
    /// Relative permittivity.
    pub eps_r: Measure,
    /// Relative permeability.
    pub mu_r: Measure,
    /// Dielectric loss tangent tan δ.
    pub loss_tangent: Measure,
}

impl InsulationGroup {
    /// Insulation layer between the given radii with the given permittivity.
    #[must_use]
    pub fn new(inner_radius: Measure, outer_radius: Measure, eps_r: Measure) -> Self {
        Self {
            inner_radius,
            outer_radius,
            eps_r,
            mu_r: Measure::exact(1.0),
            loss_tangent: Measure::exact(0.0),
        }
    }

    /// Degenerate zero-thickness insulation marking a bare conductor.
    #[must_use]
    pub fn bare(radius: Measure) -> Self {
        Self::new(radius, radius, Measure::exact(1.0))
    }
}

/// One coaxial component of a cable: conductor plus surrounding insulation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CableComponent {
    /// Conductor group of the component.
    pub conductor: ConductorGroup,
    /// Insulation group of the component.
    pub insulation: InsulationGroup,
}

/// One cable at a position, carrying an ordered list of coaxial components.
///
/// The vertical coordinate is positive above ground and negative below; a
/// buried cable therefore has `y < 0`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Cable {
    /// Horizontal position in meters.
    pub x: Measure,
    /// Vertical position in meters (negative below grade).
    pub y: Measure,
    /// Coaxial components, innermost first (core, sheath, armor, ...).
    pub components: Vec<CableComponent>,
    /// Physical phase label per component; label 0 marks a grounded
    /// conductor for Kron elimination.
    pub phase_labels: Vec<usize>,
}

impl Cable {
    /// Empty cable at the given position.
    #[must_use]
    pub fn new(x: Measure, y: Measure) -> Self {
        Self {
            x,
            y,
            components: Vec::new(),
            phase_labels: Vec::new(),
        }
    }

    /// Appends a component with its physical phase label.
    pub fn add_component(&mut self, component: CableComponent, phase_label: usize) {
        self.components.push(component);
        self.phase_labels.push(phase_label);
    }
}

/// The full system handed to the engine.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CableSystem {
    /// Cables in the system.
    pub cables: Vec<Cable>,
    /// Operating temperature in °C, used for the resistivity correction.
    pub temperature: Scalar,
}

impl CableSystem {
    /// Empty system at the reference temperature.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cables: Vec::new(),
            temperature: REFERENCE_TEMPERATURE,
        }
    }

    /// Adds a cable.
    pub fn add_cable(&mut self, cable: Cable) {
        self.cables.push(cable);
    }

    /// Total number of phases (cable components) in the system.
    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.cables.iter().map(|c| c.components.len()).sum()
    }
}

impl Default for CableSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// A possibly frequency-dependent earth-layer property.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum LayerProperty {
    /// One value for all frequencies.
    Constant(Measure),
    /// One value per entry of the frequency vector.
    PerFrequency(Vec<Measure>),
}

impl LayerProperty {
    /// Value at frequency index `k`.
    ///
    /// # Panics
    /// Panics if a per-frequency table is shorter than `k + 1`; the workspace
    /// builder validates table lengths before any lookup.
    #[must_use]
    pub fn at(&self, k: usize) -> Measure {
        match self {
            Self::Constant(m) => *m,
            Self::PerFrequency(values) => values[k],
        }
    }

    /// Length of a per-frequency table, if any.
    #[must_use]
    pub fn table_len(&self) -> Option<usize> {
        match self {
            Self::Constant(_) => None,
            Self::PerFrequency(values) => Some(values.len()),
        }
    }

    fn measures(&self) -> Vec<Measure> {
        match self {
            Self::Constant(m) => vec![*m],
            Self::PerFrequency(values) => values.clone(),
        }
    }
}

/// One horizontal earth (or air) layer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EarthLayer {
    /// Resistivity in Ω·m (infinite for the air layer).
    pub resistivity: LayerProperty,
    /// Relative permittivity.
    pub eps_r: LayerProperty,
    /// Relative permeability.
    pub mu_r: LayerProperty,
    /// Layer thickness in meters; the last layer is semi-infinite.
    pub thickness: Scalar,
}

impl EarthLayer {
    /// The semi-infinite air layer above ground.
    #[must_use]
    pub fn air() -> Self {
        Self {
            resistivity: LayerProperty::Constant(Measure::exact(Scalar::INFINITY)),
            eps_r: LayerProperty::Constant(Measure::exact(1.0)),
            mu_r: LayerProperty::Constant(Measure::exact(1.0)),
            thickness: Scalar::INFINITY,
        }
    }

    /// Uniform earth layer of the given resistivity and thickness.
    #[must_use]
    pub fn uniform(resistivity: Measure, eps_r: Measure, thickness: Scalar) -> Self {
        Self {
            resistivity: LayerProperty::Constant(resistivity),
            eps_r: LayerProperty::Constant(eps_r),
            mu_r: LayerProperty::Constant(Measure::exact(1.0)),
            thickness,
        }
    }
}

/// Ordered earth model: air first, then earth layers downward, last layer
/// semi-infinite.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EarthModel {
    /// Layers from air downward.
    pub layers: Vec<EarthLayer>,
}

impl EarthModel {
    /// Homogeneous earth: air plus one semi-infinite layer.
    #[must_use]
    pub fn homogeneous(resistivity: Measure, eps_r: Measure) -> Self {
        Self {
            layers: vec![
                EarthLayer::air(),
                EarthLayer::uniform(resistivity, eps_r, Scalar::INFINITY),
            ],
        }
    }

    /// Air plus the given earth layers, top first.
    #[must_use]
    pub fn layered(earth_layers: Vec<EarthLayer>) -> Self {
        let mut layers = vec![EarthLayer::air()];
        layers.extend(earth_layers);
        Self { layers }
    }

    /// Number of layers including air.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Every measure in the model, for numeric-mode resolution.
    #[must_use]
    pub fn all_measures(&self) -> Vec<Measure> {
        self.layers
            .iter()
            .flat_map(|l| {
                let mut m = l.resistivity.measures();
                m.extend(l.eps_r.measures());
                m.extend(l.mu_r.measures());
                m
            })
            .collect()
    }
}
