use cable_params::prelude::*;

fn main() -> Result<(), LineParamError> {
    // Flat three-phase buried circuit, 1.2 m deep, 0.25 m spacing.
    let mut system = CableSystem::new();
    for (i, x) in [-0.25, 0.0, 0.25].iter().enumerate() {
        let mut cable = Cable::new(Measure::exact(*x), Measure::exact(-1.2));
        cable.add_component(
            CableComponent {
                // 12 mm copper core, sigma given as 1.7% one-sigma spread.
                conductor: ConductorGroup::solid(
                    Measure::exact(0.012),
                    Measure::with_sigma(1.7241e-8, 3.0e-10),
                ),
                insulation: InsulationGroup::new(
                    Measure::exact(0.012),
                    Measure::exact(0.02),
                    Measure::exact(2.3), // XLPE
                ),
            },
            i + 1,
        );
        system.add_cable(cable);
    }
    let earth = EarthModel::homogeneous(Measure::exact(100.0), Measure::exact(10.0));

    let frequencies = logspace_hz(1.0, 1.0e6, 25);
    let result = compute_line_parameters(&system, &earth, &frequencies, &EngineConfig::default())?;

    println!("f (Hz)         R (Ω/km)       L (mH/km)      C (nF/km)");
    match &result {
        LineParametersResult::Plain(params) => {
            for k in 0..params.frequency_count() {
                print_row(params.rlgc(0, 0, k)?, params.frequencies[k], None);
            }
        }
        LineParametersResult::Uncertain(params) => {
            let (sigma_z, _) = params.sigmas();
            for k in 0..params.frequency_count() {
                let sigma_r = sigma_z[k][(0, 0)].re * 1.0e3;
                print_row(params.rlgc(0, 0, k)?, params.frequencies[k], Some(sigma_r));
            }
        }
    }

    // Sequence impedances of the transposed circuit at power frequency.
    if let LineParametersResult::Uncertain(params) = &result {
        let transposed = ideal_transposition(params)?;
        let seq = fortescue_transform(&transposed, 1.0e-3)?;
        let (z, _) = seq.params.nominal();
        println!("\nZ0 = {:.6} Ω/m, Z1 = {:.6} Ω/m", z[0][(0, 0)], z[0][(1, 1)]);
        for issue in seq.diagnostics.issues() {
            println!("note: {issue}");
        }
    }
    Ok(())
}

fn print_row(rlgc: Rlgc, f: f64, sigma_r_per_km: Option<f64>) {
    let per_km = rlgc.per_km();
    match sigma_r_per_km {
        Some(s) => println!(
            "{:<14.4e} {:>8.4} ± {:<8.4} {:>10.4} {:>14.2}",
            f,
            per_km.r_per_m,
            s,
            per_km.l_per_m * 1.0e3,
            per_km.c_per_m * 1.0e9
        ),
        None => println!(
            "{:<14.4e} {:>14.4} {:>14.4} {:>14.2}",
            f,
            per_km.r_per_m,
            per_km.l_per_m * 1.0e3,
            per_km.c_per_m * 1.0e9
        ),
    }
}
