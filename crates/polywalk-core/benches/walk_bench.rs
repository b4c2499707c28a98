use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use polywalk_core::{Dimension, IndexKind, WalkConfig, WalkVariant, seeded_rng};
use std::time::Duration;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn bench_continuum_walks(c: &mut Criterion) {
    let mut group = c.benchmark_group("continuum_walk");
    group.sample_size(env_or("PW_BENCH_SAMPLES", 30_usize).max(10));
    group.warm_up_time(Duration::from_secs(env_or("PW_BENCH_WARMUP_SECS", 2)));
    group.measurement_time(Duration::from_secs(env_or("PW_BENCH_MEASURE_SECS", 8)));
    let lengths: Vec<usize> = std::env::var("PW_BENCH_LENGTHS")
        .ok()
        .map(|s| {
            s.split(',')
                .filter_map(|t| t.trim().parse::<usize>().ok())
                .collect::<Vec<_>>()
        })
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| vec![100_usize, 1_000]);

    for &length in &lengths {
        for index in [IndexKind::Linear, IndexKind::Grid] {
            // Tiny spheres so long walks actually finish and the full path gets scanned.
            let config = WalkConfig {
                index,
                ..WalkConfig::new(
                    WalkVariant::Continuum {
                        dimension: Dimension::Three,
                        radius: 0.01,
                    },
                    length,
                    true,
                )
            };
            group.bench_function(format!("len{length}_{index:?}"), |b| {
                let mut rng = seeded_rng(Some(0xBEEF));
                b.iter_batched(
                    || config.build().expect("walk"),
                    |mut walk| walk.run(&mut rng),
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_lattice_walks(c: &mut Criterion) {
    let mut group = c.benchmark_group("lattice_walk");
    let config = WalkConfig::new(
        WalkVariant::Lattice {
            dimension: Dimension::Three,
        },
        75,
        true,
    );
    group.bench_function("len75_3d", |b| {
        let mut rng = seeded_rng(Some(0xFACE));
        b.iter_batched(
            || config.build().expect("walk"),
            |mut walk| walk.run(&mut rng),
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_continuum_walks, bench_lattice_walks);
criterion_main!(benches);
