//! Performance benchmarks for rideshare_core using Criterion.rs.

use bevy_ecs::prelude::World;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rideshare_core::runner::{run_ticks, simulation_schedule};
use rideshare_core::scenario::{build_scenario, ScenarioParams};

fn bench_simulation_run(c: &mut Criterion) {
    let scenarios = vec![
        ("small", 5, 10),
        ("medium", 20, 30),
        ("large", 50, 60),
    ];

    let mut group = c.benchmark_group("simulation_run");
    for (name, drivers, size) in scenarios {
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(drivers, size),
            |b, &(drivers, size)| {
                b.iter(|| {
                    let mut world = World::new();
                    let params = ScenarioParams::default()
                        .with_seed(42)
                        .with_num_drivers(drivers)
                        .with_size(size)
                        .with_multi_pass(true)
                        .with_rate(2);

                    build_scenario(&mut world, params).expect("valid params");
                    let mut schedule = simulation_schedule();
                    run_ticks(&mut world, &mut schedule, 500);
                    black_box(world);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_simulation_run);
criterion_main!(benches);
