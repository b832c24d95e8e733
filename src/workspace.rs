//! Workspace builder: flattens the hierarchical cable/earth description into
//! contiguous per-phase and per-frequency arrays.
//!
//! The workspace is built once per computation, after a validation pass over
//! every input, and is read-only from then on. The numeric representation
//! (plain complex or uncertainty-carrying) is resolved before construction by
//! [`crate::numeric::resolve_numeric_mode`] over [`collect_measures`]; the
//! chosen type parameter `T` then threads through every array below.

use nalgebra::DMatrix;

use crate::constants::{
    resistivity_at_temperature, REFERENCE_TEMPERATURE, VACUUM_PERMEABILITY, VACUUM_PERMITTIVITY,
};
use crate::errors::{LineParamError, Result};
use crate::geometry::{CableSystem, EarthModel, LayerProperty};
use crate::math::Scalar;
use crate::numeric::{EngineScalar, Measure};

/// Flattened description of one phase (one cable component).
#[derive(Debug, Clone)]
pub struct PhaseDescriptor<T> {
    /// Horizontal position (m).
    pub x: T,
    /// Vertical position (m, negative below grade).
    pub y: T,
    /// Conductor inner radius (m).
    pub con_inner: T,
    /// Conductor outer radius (m).
    pub con_outer: T,
    /// Conductor resistivity at the operating temperature (Ω·m).
    pub con_rho: T,
    /// Conductor relative permeability.
    pub con_mu_r: T,
    /// Conductor relative permittivity.
    pub con_eps_r: T,
    /// Insulation inner radius (m).
    pub ins_inner: T,
    /// Insulation outer radius (m).
    pub ins_outer: T,
    /// Insulation relative permittivity.
    pub ins_eps_r: T,
    /// Insulation relative permeability.
    pub ins_mu_r: T,
    /// Insulation loss tangent.
    pub ins_tan_delta: T,
    /// Physical phase label (0 = grounded).
    pub phase_label: usize,
    /// Index of the parent cable, for bundle merging.
    pub cable_index: usize,
    /// Earth-model layer the conductor resides in (0 = air).
    pub layer: usize,
}

impl<T: EngineScalar> PhaseDescriptor<T> {
    /// Nominal horizontal position.
    #[must_use]
    pub fn x_nominal(&self) -> Scalar {
        self.x.nominal().re
    }

    /// Nominal vertical position.
    #[must_use]
    pub fn y_nominal(&self) -> Scalar {
        self.y.nominal().re
    }

    /// Nominal conductor inner radius.
    #[must_use]
    pub fn con_inner_nominal(&self) -> Scalar {
        self.con_inner.nominal().re
    }
}

/// The flattened, type-resolved container consumed by the assembly loop.
#[derive(Debug, Clone)]
pub struct NumericWorkspace<T> {
    /// One descriptor per phase, in flattening order.
    pub phases: Vec<PhaseDescriptor<T>>,
    /// Frequency vector (Hz).
    pub frequencies: Vec<Scalar>,
    /// Earth conductivity per (layer, frequency), S/m; zero in the air row.
    pub earth_sigma: DMatrix<T>,
    /// Earth absolute permittivity per (layer, frequency), F/m.
    pub earth_eps: DMatrix<T>,
    /// Earth absolute permeability per (layer, frequency), H/m.
    pub earth_mu: DMatrix<T>,
    /// Depth of each layer's top surface below grade (m, nominal); entry 0 is
    /// the air/earth interface at zero.
    pub layer_tops: Vec<Scalar>,
    /// Operating temperature (°C).
    pub temperature: Scalar,
    /// Number of cables.
    pub cable_count: usize,
}

impl<T: EngineScalar> NumericWorkspace<T> {
    /// Number of phases (matrix dimension).
    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// Number of frequency samples.
    #[must_use]
    pub fn frequency_count(&self) -> usize {
        self.frequencies.len()
    }

    /// Number of earth-model layers, including air.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.earth_sigma.nrows()
    }
}

/// Collects every measured input of a computation, in a deterministic order,
/// for numeric-mode resolution.
#[must_use]
pub fn collect_measures(system: &CableSystem, earth: &EarthModel) -> Vec<Measure> {
    let mut out = Vec::new();
    for cable in &system.cables {
        out.push(cable.x);
        out.push(cable.y);
        for component in &cable.components {
            let c = &component.conductor;
            out.extend([c.inner_radius, c.outer_radius, c.resistivity, c.mu_r, c.eps_r]);
            let i = &component.insulation;
            out.extend([i.inner_radius, i.outer_radius, i.eps_r, i.mu_r, i.loss_tangent]);
        }
    }
    out.extend(earth.all_measures());
    out
}

fn check(
    condition: bool,
    field: &'static str,
    phase: usize,
    message: impl Into<String>,
) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(LineParamError::Validation {
            field,
            phase,
            message: message.into(),
        })
    }
}

fn positive_finite(m: Measure, field: &'static str, phase: usize) -> Result<()> {
    check(
        m.value.is_finite() && m.value > 0.0,
        field,
        phase,
        format!("expected a positive finite value, got {}", m.value),
    )
}

fn finite(m: Measure, field: &'static str, phase: usize) -> Result<()> {
    check(
        m.value.is_finite(),
        field,
        phase,
        format!("expected a finite value, got {}", m.value),
    )
}

/// Validates every geometric and material input before any formulation runs.
/// Violations abort the whole computation; nothing is silently coerced.
pub fn validate_inputs(
    system: &CableSystem,
    earth: &EarthModel,
    frequencies: &[Scalar],
) -> Result<()> {
    if system.cables.is_empty() || system.phase_count() == 0 {
        return Err(LineParamError::Config(
            "cable system contains no components".into(),
        ));
    }
    if frequencies.is_empty() {
        return Err(LineParamError::Config("frequency vector is empty".into()));
    }
    for (k, &f) in frequencies.iter().enumerate() {
        if !(f.is_finite() && f > 0.0) {
            return Err(LineParamError::Config(format!(
                "frequency sample {k} must be positive and finite, got {f}"
            )));
        }
    }
    if !system.temperature.is_finite() {
        return Err(LineParamError::Config(format!(
            "operating temperature must be finite, got {}",
            system.temperature
        )));
    }

    let mut phase = 0;
    for cable in &system.cables {
        if cable.components.len() != cable.phase_labels.len() {
            return Err(LineParamError::Config(format!(
                "cable has {} components but {} phase labels",
                cable.components.len(),
                cable.phase_labels.len()
            )));
        }
        finite(cable.x, "x", phase)?;
        finite(cable.y, "y", phase)?;
        let mut enclosed_radius: Option<Scalar> = None;
        for component in &cable.components {
            let c = &component.conductor;
            check(
                c.inner_radius.value >= 0.0 && c.inner_radius.value.is_finite(),
                "conductor.inner_radius",
                phase,
                format!("expected a non-negative finite radius, got {}", c.inner_radius.value),
            )?;
            // Components are coaxial, innermost first; each tube must clear
            // the insulation of the component it encloses.
            if let Some(enclosed) = enclosed_radius {
                check(
                    c.inner_radius.value >= enclosed,
                    "conductor.inner_radius",
                    phase,
                    format!(
                        "inner radius {} overlaps the enclosed insulation radius {}",
                        c.inner_radius.value, enclosed
                    ),
                )?;
            }
            positive_finite(c.outer_radius, "conductor.outer_radius", phase)?;
            check(
                c.outer_radius.value > c.inner_radius.value,
                "conductor.outer_radius",
                phase,
                format!(
                    "outer radius {} must exceed inner radius {}",
                    c.outer_radius.value, c.inner_radius.value
                ),
            )?;
            positive_finite(c.resistivity, "conductor.resistivity", phase)?;
            positive_finite(c.mu_r, "conductor.mu_r", phase)?;
            positive_finite(c.eps_r, "conductor.eps_r", phase)?;

            let i = &component.insulation;
            positive_finite(i.inner_radius, "insulation.inner_radius", phase)?;
            positive_finite(i.outer_radius, "insulation.outer_radius", phase)?;
            check(
                i.outer_radius.value >= i.inner_radius.value,
                "insulation.outer_radius",
                phase,
                format!(
                    "outer radius {} must not be below inner radius {}",
                    i.outer_radius.value, i.inner_radius.value
                ),
            )?;
            positive_finite(i.eps_r, "insulation.eps_r", phase)?;
            positive_finite(i.mu_r, "insulation.mu_r", phase)?;
            check(
                i.loss_tangent.value >= 0.0 && i.loss_tangent.value.is_finite(),
                "insulation.loss_tangent",
                phase,
                format!("expected a non-negative loss tangent, got {}", i.loss_tangent.value),
            )?;
            enclosed_radius = Some(i.outer_radius.value);
            phase += 1;
        }
    }

    if earth.layers.len() < 2 {
        return Err(LineParamError::Config(
            "earth model needs at least an air layer and one earth layer".into(),
        ));
    }
    for (index, layer) in earth.layers.iter().enumerate() {
        for (name, property) in [
            ("earth.resistivity", &layer.resistivity),
            ("earth.eps_r", &layer.eps_r),
            ("earth.mu_r", &layer.mu_r),
        ] {
            if let Some(len) = property.table_len() {
                if len != frequencies.len() {
                    return Err(LineParamError::Config(format!(
                        "{name} of layer {index} has {len} entries for {} frequencies",
                        frequencies.len()
                    )));
                }
            }
            for k in 0..frequencies.len() {
                let m = match property {
                    LayerProperty::Constant(m) => *m,
                    LayerProperty::PerFrequency(v) => v[k],
                };
                // Air is allowed (and expected) to have infinite resistivity.
                let infinite_ok = index == 0 && name == "earth.resistivity";
                if !(m.value > 0.0 && (m.value.is_finite() || infinite_ok)) {
                    return Err(LineParamError::Validation {
                        field: name,
                        phase: index,
                        message: format!("invalid layer value {} at frequency index {k}", m.value),
                    });
                }
            }
        }
        let last = index == earth.layers.len() - 1;
        if !last && !(layer.thickness.is_finite() && layer.thickness > 0.0) && index != 0 {
            return Err(LineParamError::Validation {
                field: "earth.thickness",
                phase: index,
                message: format!("interior layer thickness must be positive and finite, got {}", layer.thickness),
            });
        }
    }
    Ok(())
}

/// Resolves which earth layer a conductor at vertical position `y` sits in.
fn layer_of(y: Scalar, layer_tops: &[Scalar]) -> usize {
    if y >= 0.0 {
        return 0;
    }
    let depth = -y;
    let mut layer = 1;
    for (index, &top) in layer_tops.iter().enumerate().skip(2) {
        if depth >= top {
            layer = index;
        }
    }
    layer
}

/// Builds the numeric workspace. Runs [`validate_inputs`] first; the returned
/// workspace is immutable for the rest of the computation.
pub fn build_workspace<T: EngineScalar>(
    system: &CableSystem,
    earth: &EarthModel,
    frequencies: &[Scalar],
) -> Result<NumericWorkspace<T>> {
    validate_inputs(system, earth, frequencies)?;

    // Top depth of each layer below grade: air gets 0, earth layers stack.
    let mut layer_tops = vec![0.0; earth.layers.len()];
    let mut depth = 0.0;
    for (index, layer) in earth.layers.iter().enumerate().skip(1) {
        layer_tops[index] = depth;
        if layer.thickness.is_finite() {
            depth += layer.thickness;
        }
    }

    let mut phases = Vec::with_capacity(system.phase_count());
    for (cable_index, cable) in system.cables.iter().enumerate() {
        for (component, &label) in cable.components.iter().zip(&cable.phase_labels) {
            let c = &component.conductor;
            let i = &component.insulation;
            let rho = Measure::with_sigma(
                resistivity_at_temperature(c.resistivity.value, c.alpha, system.temperature),
                c.resistivity.sigma
                    * (1.0 + c.alpha * (system.temperature - REFERENCE_TEMPERATURE)),
            );
            phases.push(PhaseDescriptor {
                x: T::from_measure(cable.x),
                y: T::from_measure(cable.y),
                con_inner: T::from_measure(c.inner_radius),
                con_outer: T::from_measure(c.outer_radius),
                con_rho: T::from_measure(rho),
                con_mu_r: T::from_measure(c.mu_r),
                con_eps_r: T::from_measure(c.eps_r),
                ins_inner: T::from_measure(i.inner_radius),
                ins_outer: T::from_measure(i.outer_radius),
                ins_eps_r: T::from_measure(i.eps_r),
                ins_mu_r: T::from_measure(i.mu_r),
                ins_tan_delta: T::from_measure(i.loss_tangent),
                phase_label: label,
                cable_index,
                layer: layer_of(cable.y.value, &layer_tops),
            });
        }
    }

    let layer_count = earth.layers.len();
    let freq_count = frequencies.len();
    let earth_sigma = DMatrix::from_fn(layer_count, freq_count, |l, k| {
        let rho = earth.layers[l].resistivity.at(k);
        if rho.value.is_infinite() {
            T::zero()
        } else {
            // sigma = 1/rho; first-order sigma scaling handled by division.
            T::one() / T::from_measure(rho)
        }
    });
    let earth_eps = DMatrix::from_fn(layer_count, freq_count, |l, k| {
        T::from_measure(earth.layers[l].eps_r.at(k)) * T::from(VACUUM_PERMITTIVITY)
    });
    let earth_mu = DMatrix::from_fn(layer_count, freq_count, |l, k| {
        T::from_measure(earth.layers[l].mu_r.at(k)) * T::from(VACUUM_PERMEABILITY)
    });

    Ok(NumericWorkspace {
        phases,
        frequencies: frequencies.to_vec(),
        earth_sigma,
        earth_eps,
        earth_mu,
        layer_tops,
        temperature: system.temperature,
        cable_count: system.cables.len(),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::geometry::{Cable, CableComponent, ConductorGroup, InsulationGroup};
    use crate::math::CScalar;
    use crate::numeric::{resolve_numeric_mode, NumericMode, UComplex};

    use super::*;

    fn test_system() -> (CableSystem, EarthModel) {
        let mut system = CableSystem::new();
        let mut cable = Cable::new(Measure::exact(0.0), Measure::exact(-1.2));
        cable.add_component(
            CableComponent {
                conductor: ConductorGroup::solid(Measure::exact(0.012), Measure::exact(1.7241e-8)),
                insulation: InsulationGroup::new(
                    Measure::exact(0.012),
                    Measure::exact(0.02),
                    Measure::exact(2.3),
                ),
            },
            1,
        );
        system.add_cable(cable);
        let earth = EarthModel::homogeneous(Measure::exact(100.0), Measure::exact(10.0));
        (system, earth)
    }

    #[test]
    fn builds_one_descriptor_per_component() {
        let (system, earth) = test_system();
        let ws: NumericWorkspace<CScalar> =
            build_workspace(&system, &earth, &[50.0, 60.0]).unwrap();
        assert_eq!(ws.phase_count(), 1);
        assert_eq!(ws.frequency_count(), 2);
        assert_eq!(ws.layer_count(), 2);
        assert_eq!(ws.phases[0].layer, 1, "buried conductor is in the earth layer");
        assert_relative_eq!(ws.phases[0].y_nominal(), -1.2, epsilon = 1.0e-12);
    }

    #[test]
    fn air_layer_has_zero_conductivity() {
        let (system, earth) = test_system();
        let ws: NumericWorkspace<CScalar> = build_workspace(&system, &earth, &[50.0]).unwrap();
        assert_relative_eq!(ws.earth_sigma[(0, 0)].re, 0.0, epsilon = 1.0e-30);
        assert_relative_eq!(ws.earth_sigma[(1, 0)].re, 0.01, epsilon = 1.0e-12);
    }

    #[test]
    fn temperature_correction_scales_conductor_resistivity() {
        let (mut system, earth) = test_system();
        system.temperature = 90.0;
        system.cables[0].components[0].conductor.alpha = crate::constants::COPPER_ALPHA_20C;
        let ws: NumericWorkspace<CScalar> = build_workspace(&system, &earth, &[50.0]).unwrap();
        let expected = 1.7241e-8 * (1.0 + 70.0 * crate::constants::COPPER_ALPHA_20C);
        assert_relative_eq!(ws.phases[0].con_rho.re, expected, max_relative = 1.0e-12);
    }

    #[test]
    fn negative_radius_is_rejected_with_field_and_phase() {
        let (mut system, earth) = test_system();
        system.cables[0].components[0].conductor.outer_radius = Measure::exact(-0.01);
        let err = build_workspace::<CScalar>(&system, &earth, &[50.0]).unwrap_err();
        match err {
            LineParamError::Validation { field, phase, .. } => {
                assert_eq!(field, "conductor.outer_radius");
                assert_eq!(phase, 0);
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn overlapping_coaxial_components_are_rejected() {
        let (mut system, earth) = test_system();
        // A sheath whose bore sits inside the core insulation.
        system.cables[0].add_component(
            CableComponent {
                conductor: ConductorGroup::tubular(
                    Measure::exact(0.015),
                    Measure::exact(0.021),
                    Measure::exact(2.8e-8),
                ),
                insulation: InsulationGroup::new(
                    Measure::exact(0.021),
                    Measure::exact(0.03),
                    Measure::exact(2.3),
                ),
            },
            2,
        );
        let err = build_workspace::<CScalar>(&system, &earth, &[50.0]).unwrap_err();
        match err {
            LineParamError::Validation { field, phase, .. } => {
                assert_eq!(field, "conductor.inner_radius");
                assert_eq!(phase, 1);
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn uncertain_input_switches_numeric_mode() {
        let (mut system, earth) = test_system();
        system.cables[0].components[0].conductor.resistivity =
            Measure::with_sigma(1.7241e-8, 1.0e-10);
        let mode = resolve_numeric_mode(collect_measures(&system, &earth));
        assert_eq!(mode, NumericMode::Uncertain);
        let ws: NumericWorkspace<UComplex> =
            build_workspace(&system, &earth, &[50.0]).unwrap();
        let (sigma_re, _) = ws.phases[0].con_rho.sigmas();
        assert_relative_eq!(sigma_re, 1.0e-10, max_relative = 1.0e-9);
    }

    #[test]
    fn empty_frequency_vector_is_a_config_error() {
        let (system, earth) = test_system();
        let err = build_workspace::<CScalar>(&system, &earth, &[]).unwrap_err();
        assert!(matches!(err, LineParamError::Config(_)));
    }
}
