use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use randcloud::{sampling::UniformSampler, DEFAULT_NUM_POINTS};

fn sampling_benchmark(c: &mut Criterion) {
    c.bench_function("uniform sampling 1000 points", |b| {
        let sampler = UniformSampler::new(DEFAULT_NUM_POINTS);
        let mut rng = StdRng::seed_from_u64(5);
        b.iter(|| black_box(sampler.sample_using(&mut rng).unwrap()));
    });

    c.bench_function("uniform sampling 1M points", |b| {
        let sampler = UniformSampler::new(1_000_000);
        let mut rng = StdRng::seed_from_u64(5);
        b.iter(|| black_box(sampler.sample_using(&mut rng).unwrap()));
    });

    c.bench_function("bounding sphere 1M points", |b| {
        let point_cloud = UniformSampler::new(1_000_000)
            .seed(Some(5))
            .sample_point_cloud()
            .unwrap();
        b.iter(|| black_box(point_cloud.bounding_sphere()));
    });
}

criterion_group!(benches, sampling_benchmark);
criterion_main!(benches);
