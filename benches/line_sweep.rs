use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cable_params::prelude::*;

fn build_three_phase_system() -> (CableSystem, EarthModel) {
    let mut system = CableSystem::new();
    for (i, x) in [-0.25, 0.0, 0.25].iter().enumerate() {
        let mut cable = Cable::new(Measure::exact(*x), Measure::exact(-1.2));
        cable.add_component(
            CableComponent {
                conductor: ConductorGroup::solid(Measure::exact(0.012), Measure::exact(1.7241e-8)),
                insulation: InsulationGroup::new(
                    Measure::exact(0.012),
                    Measure::exact(0.02),
                    Measure::exact(2.3),
                ),
            },
            i + 1,
        );
        system.add_cable(cable);
    }
    let earth = EarthModel::homogeneous(Measure::exact(100.0), Measure::exact(10.0));
    (system, earth)
}

fn bench_line_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_sweep");
    let (system, earth) = build_three_phase_system();
    let config = EngineConfig::default();

    for samples in [8usize, 64] {
        let freqs = logspace_hz(1.0, 1.0e6, samples);
        group.bench_function(BenchmarkId::new("buried_three_phase", samples), |b| {
            b.iter(|| {
                let _ = compute_line_parameters(&system, &earth, &freqs, &config);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_line_sweep);
criterion_main!(benches);
