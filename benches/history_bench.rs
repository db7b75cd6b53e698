use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use terraforge::{generate_world, WorldConfig, WorldIndexes};

fn bench_config(width: u32, end_year: i32) -> WorldConfig {
    let mut config = WorldConfig::with_seed(123);
    config.planet.map_width = width;
    config.planet.map_height = width / 2;
    config.planet.num_continents = 4;
    config.societies.num_polities = 40;
    config.societies.num_culture_groups = 12;
    config.societies.ending_year = end_year;
    config
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_world");
    group.sample_size(10);

    for width in [40u32, 80, 160] {
        let config = bench_config(width, 200);
        group.bench_with_input(BenchmarkId::new("width", width), &config, |b, config| {
            b.iter(|| generate_world(config))
        });
    }

    group.finish();
}

fn bench_indexes(c: &mut Criterion) {
    let Ok(bundle) = generate_world(&bench_config(80, 400)) else {
        return;
    };

    c.bench_function("index_build", |b| b.iter(|| WorldIndexes::build(&bundle)));

    let indexes = WorldIndexes::build(&bundle);
    c.bench_function("search_war", |b| b.iter(|| indexes.search("war", 50)));
    c.bench_function("state_at_mid", |b| b.iter(|| indexes.state_at(205)));
}

criterion_group!(history_benches, bench_generate, bench_indexes);
criterion_main!(history_benches);
