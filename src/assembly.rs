//! Per-frequency assembly of the series-impedance and shunt-admittance
//! matrices.
//!
//! One square Z and one square Y matrix are assembled for every frequency
//! sample. Within a cable the coaxial components are stacked as nested
//! current loops (core against sheath, sheath against armor, outermost
//! against the earth return) and the loop quantities are folded back to the
//! conductor basis; distinct cables couple through the earth alone. The Y
//! matrix is the nodal ladder of the insulation layers, with the outermost
//! layer referenced to earth.
//!
//! Frequencies are independent of each other, so the sweep runs on a rayon
//! parallel iterator over frequency indices; each worker reads the shared
//! workspace and writes only its own slice. Kernel evaluations of Z(i,j) and
//! Z(j,i) across cables are independent, so every assembled slice is
//! symmetrized with its transpose before it leaves the worker.

use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::constants::angular_frequency;
use crate::errors::Result;
use crate::formulations::{
    EarthImpedance, EarthPair, EarthSlice, EhemReduction, InsulationAdmittance, InternalImpedance,
    InternalTerms,
};
use crate::geometry::{CableSystem, EarthModel};
use crate::line_params::LineParameters;
use crate::math::{CMatrix, CScalar, Scalar};
use crate::numeric::{resolve_numeric_mode, EngineScalar, NumericMode, UComplex};
use crate::workspace::{build_workspace, collect_measures, NumericWorkspace, PhaseDescriptor};

/// Formulation selection for one computation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineConfig {
    /// Conductor internal-impedance formulation.
    pub internal: InternalImpedance,
    /// Insulation admittance formulation.
    pub insulation: InsulationAdmittance,
    /// Earth-return impedance formulation.
    pub earth: EarthImpedance,
    /// Optional reduction of a layered earth to a homogeneous one, applied
    /// to the workspace before any formulation runs.
    pub ehem: Option<EhemReduction>,
}

/// Output of [`compute_line_parameters`], in whichever numeric
/// representation the inputs resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum LineParametersResult {
    /// Every input was exact; plain complex arithmetic was used.
    Plain(LineParameters<CScalar>),
    /// At least one input carried a standard deviation; first-order
    /// uncertainties were propagated alongside the nominal values.
    Uncertain(LineParameters<UComplex>),
}

impl LineParametersResult {
    /// Nominal Z and Y matrix stacks, whichever representation was used.
    #[must_use]
    pub fn nominal(&self) -> (Vec<CMatrix>, Vec<CMatrix>) {
        match self {
            Self::Plain(p) => p.nominal(),
            Self::Uncertain(p) => p.nominal(),
        }
    }

    /// Frequency samples (Hz).
    #[must_use]
    pub fn frequencies(&self) -> &[Scalar] {
        match self {
            Self::Plain(p) => &p.frequencies,
            Self::Uncertain(p) => &p.frequencies,
        }
    }

    /// The uncertainty-carrying parameters, if that representation was used.
    #[must_use]
    pub fn as_uncertain(&self) -> Option<&LineParameters<UComplex>> {
        match self {
            Self::Plain(_) => None,
            Self::Uncertain(p) => Some(p),
        }
    }
}

/// Computes the per-unit-length Z and Y matrices of the cable system over
/// the frequency sweep.
///
/// The numeric representation is resolved from the inputs: if every
/// [`crate::numeric::Measure`] is exact the computation runs in plain
/// complex arithmetic, otherwise first-order uncertainties propagate through
/// every formulation into the result.
pub fn compute_line_parameters(
    system: &CableSystem,
    earth: &EarthModel,
    frequencies: &[Scalar],
    config: &EngineConfig,
) -> Result<LineParametersResult> {
    let mode = resolve_numeric_mode(collect_measures(system, earth));
    info!(
        phases = system.phase_count(),
        frequencies = frequencies.len(),
        ?mode,
        "assembling line parameters"
    );
    match mode {
        NumericMode::Plain => Ok(LineParametersResult::Plain(run::<CScalar>(
            system,
            earth,
            frequencies,
            config,
        )?)),
        NumericMode::Uncertain => Ok(LineParametersResult::Uncertain(run::<UComplex>(
            system,
            earth,
            frequencies,
            config,
        )?)),
    }
}

/// Runs the whole computation in one numeric representation.
pub fn run<T: EngineScalar>(
    system: &CableSystem,
    earth: &EarthModel,
    frequencies: &[Scalar],
    config: &EngineConfig,
) -> Result<LineParameters<T>> {
    let mut workspace = build_workspace::<T>(system, earth, frequencies)?;
    if let Some(reduction) = &config.ehem {
        workspace = reduction.apply(&workspace)?;
    }
    let slices: Vec<(DMatrix<T>, DMatrix<T>)> = (0..workspace.frequency_count())
        .into_par_iter()
        .map(|k| assemble_slice(&workspace, k, config))
        .collect::<Result<_>>()?;
    let (z, y) = slices.into_iter().unzip();
    LineParameters::new(z, y, workspace.frequencies.clone())
}

/// Assembles the Z and Y matrices of one frequency sample.
fn assemble_slice<T: EngineScalar>(
    workspace: &NumericWorkspace<T>,
    k: usize,
    config: &EngineConfig,
) -> Result<(DMatrix<T>, DMatrix<T>)> {
    let n = workspace.phase_count();
    let omega = angular_frequency(workspace.frequencies[k]);
    debug!(frequency = workspace.frequencies[k], "assembling slice");

    let layer_count = workspace.layer_count();
    let earth = EarthSlice {
        sigma: (0..layer_count).map(|l| workspace.earth_sigma[(l, k)]).collect(),
        eps: (0..layer_count).map(|l| workspace.earth_eps[(l, k)]).collect(),
        mu: (0..layer_count).map(|l| workspace.earth_mu[(l, k)]).collect(),
    };

    let mut z = DMatrix::from_element(n, n, T::zero());
    let mut y = DMatrix::from_element(n, n, T::zero());

    // Cable-diagonal blocks: phases of one cable are contiguous in
    // flattening order.
    let mut start = 0;
    while start < n {
        let cable = workspace.phases[start].cable_index;
        let mut end = start + 1;
        while end < n && workspace.phases[end].cable_index == cable {
            end += 1;
        }
        fill_cable_block(workspace, start, end, omega, config, &earth, &mut z, &mut y)?;
        start = end;
    }

    // Off-diagonal blocks: earth coupling between distinct cables.
    for i in 0..n {
        let phase = &workspace.phases[i];
        for j in 0..i {
            let other = &workspace.phases[j];
            if phase.cable_index != other.cable_index {
                z[(i, j)] = mutual_impedance(phase, other, omega, config, &earth)?;
                z[(j, i)] = mutual_impedance(other, phase, omega, config, &earth)?;
            }
        }
    }

    symmetrize(&mut z);
    Ok((z, y))
}

/// Fills the diagonal block of one cable, phases `start..end` of the
/// workspace, innermost component first.
///
/// The natural unknowns of a coaxial stack are the loop currents between
/// adjacent tubes; the loop system is tridiagonal, with each loop's
/// impedance on the diagonal and the enclosing tube's transfer impedance
/// coupling it to the next loop out. Folding back to conductor currents
/// sums every loop term radially outward of the row and column component,
/// which collapses to
///
/// ```text
/// Z(a, a) = d[a]
/// Z(a, b) = d[b] - zm[b]        (a < b)
/// ```
///
/// where `zeta[k]` is the impedance of loop k (conductor k outer surface,
/// its insulation, and the inner surface of the next tube, or the earth
/// return for the outermost loop), `zm[k]` the transfer impedance of tube k
/// and `d[k] = zeta[k] + d[k + 1] - 2 zm[k + 1]` the accumulated stack.
///
/// The Y block is the nodal ladder of the insulation admittances: layer k
/// joins conductors k and k + 1, the outermost layer joins the last
/// conductor to earth.
#[allow(clippy::too_many_arguments)]
fn fill_cable_block<T: EngineScalar>(
    workspace: &NumericWorkspace<T>,
    start: usize,
    end: usize,
    omega: Scalar,
    config: &EngineConfig,
    earth: &EarthSlice<T>,
    z: &mut DMatrix<T>,
    y: &mut DMatrix<T>,
) -> Result<()> {
    let phases = &workspace.phases[start..end];
    let m = phases.len();

    let internals: Vec<InternalTerms<T>> = phases
        .iter()
        .map(|p| {
            config
                .internal
                .evaluate(p.con_inner, p.con_outer, p.con_rho, p.con_mu_r, omega)
        })
        .collect();
    // The earth only sees the outermost surface of the cable.
    let ground = config.earth.evaluate(&self_pair(&phases[m - 1], omega), earth)?;

    let mut zeta = Vec::with_capacity(m);
    for (k, phase) in phases.iter().enumerate() {
        let insulation = config.insulation.series_impedance(
            phase.ins_inner,
            phase.ins_outer,
            phase.ins_mu_r,
            omega,
        );
        let enclosure = if k + 1 < m {
            internals[k + 1].inner
        } else {
            ground
        };
        zeta.push(internals[k].outer + insulation + enclosure);
    }

    let mut d = vec![T::zero(); m];
    d[m - 1] = zeta[m - 1];
    for k in (0..m - 1).rev() {
        let zm = internals[k + 1].mutual;
        d[k] = zeta[k] + d[k + 1] - zm - zm;
    }

    for a in 0..m {
        z[(start + a, start + a)] = d[a];
        for b in (a + 1)..m {
            let coupling = d[b] - internals[b].mutual;
            z[(start + a, start + b)] = coupling;
            z[(start + b, start + a)] = coupling;
        }
    }

    for (k, phase) in phases.iter().enumerate() {
        let admittance = config.insulation.shunt_admittance(
            phase.ins_inner,
            phase.ins_outer,
            phase.ins_eps_r,
            phase.ins_tan_delta,
            omega,
        );
        y[(start + k, start + k)] = y[(start + k, start + k)] + admittance;
        if k + 1 < m {
            y[(start + k + 1, start + k + 1)] = y[(start + k + 1, start + k + 1)] + admittance;
            y[(start + k, start + k + 1)] = y[(start + k, start + k + 1)] - admittance;
            y[(start + k + 1, start + k)] = y[(start + k + 1, start + k)] - admittance;
        }
    }

    Ok(())
}

/// Earth pair for a conductor's own return path: the direct distance is the
/// outer insulation radius.
fn self_pair<T: EngineScalar>(phase: &PhaseDescriptor<T>, omega: Scalar) -> EarthPair<T> {
    EarthPair {
        y_i: phase.y,
        y_j: phase.y,
        dx: T::zero(),
        direct: phase.ins_outer,
        layer_i: phase.layer,
        layer_j: phase.layer,
        omega,
    }
}

/// Mutual impedance between phases of distinct cables, which couple through
/// the earth alone at their center-to-center distance.
fn mutual_impedance<T: EngineScalar>(
    a: &PhaseDescriptor<T>,
    b: &PhaseDescriptor<T>,
    omega: Scalar,
    config: &EngineConfig,
    earth: &EarthSlice<T>,
) -> Result<T> {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let pair = EarthPair {
        y_i: a.y,
        y_j: b.y,
        dx,
        direct: (dx * dx + dy * dy).sqrt(),
        layer_i: a.layer,
        layer_j: b.layer,
        omega,
    };
    config.earth.evaluate(&pair, earth)
}

/// Replaces the matrix with the mean of itself and its transpose.
fn symmetrize<T: EngineScalar>(m: &mut DMatrix<T>) {
    let half = T::from(0.5);
    for i in 0..m.nrows() {
        for j in 0..i {
            let mean = (m[(i, j)] + m[(j, i)]) * half;
            m[(i, j)] = mean;
            m[(j, i)] = mean;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::formulations::Placement;
    use crate::quad::QuadratureConfig;
    use crate::geometry::{Cable, CableComponent, ConductorGroup, InsulationGroup};
    use crate::numeric::Measure;

    use super::*;

    fn buried_cable(x: f64, y: f64, label: usize) -> Cable {
        let mut cable = Cable::new(Measure::exact(x), Measure::exact(y));
        cable.add_component(
            CableComponent {
                conductor: ConductorGroup::solid(Measure::exact(0.012), Measure::exact(1.7241e-8)),
                insulation: InsulationGroup::new(
                    Measure::exact(0.012),
                    Measure::exact(0.02),
                    Measure::exact(2.3),
                ),
            },
            label,
        );
        cable
    }

    fn two_phase_system() -> (CableSystem, EarthModel) {
        let mut system = CableSystem::new();
        system.add_cable(buried_cable(0.0, -1.0, 1));
        system.add_cable(buried_cable(0.5, -1.0, 2));
        let earth = EarthModel::homogeneous(Measure::exact(100.0), Measure::exact(10.0));
        (system, earth)
    }

    #[test]
    fn symmetric_layout_gives_a_symmetric_matrix() {
        let (system, earth) = two_phase_system();
        let result =
            compute_line_parameters(&system, &earth, &[50.0], &EngineConfig::default()).unwrap();
        let (z, y) = result.nominal();
        assert_eq!(z[0].nrows(), 2);
        // Mirror-image conductors: equal diagonals, exact reciprocity.
        assert_relative_eq!(z[0][(0, 0)].re, z[0][(1, 1)].re, max_relative = 1.0e-10);
        assert_relative_eq!(z[0][(0, 1)].re, z[0][(1, 0)].re, max_relative = 1.0e-12);
        assert_relative_eq!(z[0][(0, 1)].im, z[0][(1, 0)].im, max_relative = 1.0e-12);
        assert_relative_eq!(y[0][(0, 1)].norm(), 0.0, epsilon = 1.0e-30);
        assert!(y[0][(0, 0)].im > 0.0, "shunt admittance is capacitive");
    }

    #[test]
    fn mutual_coupling_decays_with_separation() {
        let mut near = CableSystem::new();
        near.add_cable(buried_cable(0.0, -1.0, 1));
        near.add_cable(buried_cable(0.3, -1.0, 2));
        let mut far = CableSystem::new();
        far.add_cable(buried_cable(0.0, -1.0, 1));
        far.add_cable(buried_cable(5.0, -1.0, 2));
        let earth = EarthModel::homogeneous(Measure::exact(100.0), Measure::exact(10.0));
        let config = EngineConfig::default();
        let (zn, _) = compute_line_parameters(&near, &earth, &[50.0], &config)
            .unwrap()
            .nominal();
        let (zf, _) = compute_line_parameters(&far, &earth, &[50.0], &config)
            .unwrap()
            .nominal();
        assert!(zn[0][(0, 1)].norm() > zf[0][(0, 1)].norm());
    }

    #[test]
    fn uncertain_inputs_produce_uncertain_output() {
        let (mut system, earth) = two_phase_system();
        system.cables[0].components[0].conductor.resistivity =
            Measure::with_sigma(1.7241e-8, 5.0e-10);
        let result =
            compute_line_parameters(&system, &earth, &[50.0], &EngineConfig::default()).unwrap();
        let params = result.as_uncertain().unwrap();
        let (sz, _) = params.sigmas();
        assert!(
            sz[0][(0, 0)].re > 0.0,
            "resistivity uncertainty must reach the self impedance"
        );
        // Nominals agree with the plain computation.
        let (mut exact_system, _) = two_phase_system();
        exact_system.cables[0].components[0].conductor.resistivity = Measure::exact(1.7241e-8);
        let plain =
            compute_line_parameters(&exact_system, &earth, &[50.0], &EngineConfig::default())
                .unwrap();
        let (zn, _) = result.nominal();
        let (zp, _) = plain.nominal();
        assert_relative_eq!(zn[0][(0, 0)].re, zp[0][(0, 0)].re, max_relative = 1.0e-9);
    }

    #[test]
    fn frequency_sweep_preserves_input_order() {
        let (system, earth) = two_phase_system();
        let freqs = [1.0e3, 50.0, 1.0e5];
        let result =
            compute_line_parameters(&system, &earth, &freqs, &EngineConfig::default()).unwrap();
        assert_eq!(result.frequencies(), &freqs);
        let (z, _) = result.nominal();
        assert_eq!(z.len(), 3);
        // Resistance grows with frequency; compare the 50 Hz and 100 kHz slices.
        assert!(z[2][(0, 0)].re > z[1][(0, 0)].re);
    }

    #[test]
    fn coaxial_components_couple_through_the_sheath_transfer_impedance() {
        let mut cable = Cable::new(Measure::exact(0.0), Measure::exact(-1.0));
        cable.add_component(
            CableComponent {
                conductor: ConductorGroup::solid(Measure::exact(0.01), Measure::exact(1.7241e-8)),
                insulation: InsulationGroup::new(
                    Measure::exact(0.01),
                    Measure::exact(0.02),
                    Measure::exact(2.3),
                ),
            },
            1,
        );
        cable.add_component(
            CableComponent {
                conductor: ConductorGroup::tubular(
                    Measure::exact(0.02),
                    Measure::exact(0.022),
                    Measure::exact(2.8e-8),
                ),
                insulation: InsulationGroup::new(
                    Measure::exact(0.022),
                    Measure::exact(0.03),
                    Measure::exact(2.3),
                ),
            },
            2,
        );
        let mut system = CableSystem::new();
        system.add_cable(cable);
        let earth = EarthModel::homogeneous(Measure::exact(100.0), Measure::exact(10.0));
        let result =
            compute_line_parameters(&system, &earth, &[50.0], &EngineConfig::default()).unwrap();
        let (z, _) = result.nominal();
        assert!(z[0][(0, 1)].norm() > 0.0);
        assert_relative_eq!(z[0][(0, 1)].re, z[0][(1, 0)].re, max_relative = 1.0e-12);
    }

    #[test]
    fn sheath_reroutes_the_core_return_and_splits_the_shunt_path() {
        let core = CableComponent {
            conductor: ConductorGroup::solid(Measure::exact(0.01), Measure::exact(1.7241e-8)),
            insulation: InsulationGroup::new(
                Measure::exact(0.01),
                Measure::exact(0.02),
                Measure::exact(2.3),
            ),
        };
        let sheath = CableComponent {
            conductor: ConductorGroup::tubular(
                Measure::exact(0.02),
                Measure::exact(0.022),
                Measure::exact(2.8e-8),
            ),
            insulation: InsulationGroup::new(
                Measure::exact(0.022),
                Measure::exact(0.03),
                Measure::exact(2.3),
            ),
        };
        let earth = EarthModel::homogeneous(Measure::exact(100.0), Measure::exact(10.0));
        let config = EngineConfig::default();

        let mut bare = CableSystem::new();
        let mut cable = Cable::new(Measure::exact(0.0), Measure::exact(-1.0));
        cable.add_component(core, 1);
        bare.add_cable(cable);
        let (zb, _) = compute_line_parameters(&bare, &earth, &[50.0], &config)
            .unwrap()
            .nominal();

        let mut sheathed = CableSystem::new();
        let mut cable = Cable::new(Measure::exact(0.0), Measure::exact(-1.0));
        cable.add_component(core, 1);
        cable.add_component(sheath, 2);
        sheathed.add_cable(cable);
        let (zs, ys) = compute_line_parameters(&sheathed, &earth, &[50.0], &config)
            .unwrap()
            .nominal();

        // The sheathed core loop picks up the sheath surfaces, the outer
        // insulation and the tube transfer terms; its self impedance must
        // move away from the bare-core value.
        let shift = (zs[0][(0, 0)] - zb[0][(0, 0)]).norm();
        assert!(shift > 1.0e-6 * zb[0][(0, 0)].norm());

        // Core-to-sheath coupling is the sheath loop minus the tube
        // transfer impedance.
        let zm = InternalImpedance::default()
            .evaluate(
                CScalar::from(0.02),
                CScalar::from(0.022),
                CScalar::from(2.8e-8),
                CScalar::from(1.0),
                angular_frequency(50.0),
            )
            .mutual;
        let expected = zs[0][(1, 1)] - zm;
        assert_relative_eq!(zs[0][(0, 1)].re, expected.re, max_relative = 1.0e-10);
        assert_relative_eq!(zs[0][(0, 1)].im, expected.im, max_relative = 1.0e-10);

        // The core node sees only the core-sheath dielectric, with the
        // matching negative coupling entry.
        assert!(ys[0][(0, 1)].norm() > 0.0);
        assert_relative_eq!(
            (ys[0][(0, 0)] + ys[0][(0, 1)]).norm(),
            0.0,
            epsilon = 1.0e-30
        );
    }

    #[test]
    fn layered_earth_without_reduction_fails_but_succeeds_with_it() {
        use crate::formulations::{EhemReduction, LayerIndex};
        use crate::geometry::EarthLayer;

        let mut system = CableSystem::new();
        system.add_cable(buried_cable(0.0, -1.0, 1));
        system.add_cable(buried_cable(0.5, -8.0, 2));
        let earth = EarthModel::layered(vec![
            EarthLayer::uniform(Measure::exact(100.0), Measure::exact(10.0), 5.0),
            EarthLayer::uniform(Measure::exact(30.0), Measure::exact(15.0), f64::INFINITY),
        ]);
        let err = compute_line_parameters(&system, &earth, &[50.0], &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, crate::errors::LineParamError::LayerMismatch(_)));
        let config = EngineConfig {
            ehem: Some(EhemReduction::new(LayerIndex::Last)),
            ..EngineConfig::default()
        };
        assert!(compute_line_parameters(&system, &earth, &[50.0], &config).is_ok());
    }

    #[test]
    fn quadrature_knobs_reach_the_kernel() {
        let (system, earth) = two_phase_system();
        let config = EngineConfig {
            earth: EarthImpedance::Papadopoulos {
                placement: Placement::EarthEarth,
                quad: QuadratureConfig {
                    rel_tol: 1.0e-9,
                    ..QuadratureConfig::default()
                },
            },
            ..EngineConfig::default()
        };
        assert!(compute_line_parameters(&system, &earth, &[50.0], &config).is_ok());
    }
}
