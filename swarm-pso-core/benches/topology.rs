use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use swarm_pso_core::config::SwarmConfig;
use swarm_pso_core::state::SwarmState;
use swarm_pso_core::topology::Neighborhood;

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighborhood_nearest");

    for &(particles, dims) in &[(30usize, 10usize), (100, 100), (200, 500)] {
        let config = SwarmConfig {
            particles,
            min_pos: -100.0,
            max_pos: 100.0,
            ..SwarmConfig::default()
        }
        .resolve(dims)
        .expect("valid bench config");
        let state = SwarmState::seeded(&config, &mut StdRng::seed_from_u64(42));
        let mut hood = Neighborhood::new(particles);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{particles}x{dims}")),
            &config.neighbors,
            |b, &k| {
                b.iter(|| {
                    let neighbors = hood.nearest(black_box(&state), black_box(0), k);
                    black_box(neighbors.len())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_nearest);
criterion_main!(benches);
