//! Benchmarks comparing the simple and Hermite-like projection operators

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use surfcrate_algorithms::{noise_along_normal, sample_sphere, KdTree};
use surfcrate_core::{NormalPoint3f, Point3f, PointCloud};
use surfcrate_reconstruction::{Kernel, MLSProjector, ProjectionConfig};

fn generate_noisy_sphere(num_points: usize) -> PointCloud<NormalPoint3f> {
    let mut rng = StdRng::seed_from_u64(17);
    let mut cloud = sample_sphere(num_points, 1.0, &mut rng);
    noise_along_normal(&mut cloud, 0.01, &mut rng);
    cloud
}

fn bench_projection(c: &mut Criterion) {
    let sizes = [1_000, 10_000];
    let mut rng = StdRng::seed_from_u64(5);
    let queries: Vec<Point3f> = sample_sphere(100, 1.1, &mut rng)
        .iter()
        .map(|p| p.position)
        .collect();

    let mut group = c.benchmark_group("mls_projection");

    for &size in &sizes {
        let cloud = generate_noisy_sphere(size);
        let index = KdTree::new(&cloud.positions()).unwrap();

        for kernel in [Kernel::Gaussian, Kernel::Wendland] {
            let configs = [
                ("simple", ProjectionConfig::simple()),
                ("hermite", ProjectionConfig::hermite()),
            ];
            for (name, config) in configs {
                let config = config.with_kernel(kernel).with_support_radius(0.1);
                let projector = MLSProjector::new(&cloud, &index, config).unwrap();

                group.bench_with_input(
                    BenchmarkId::new(format!("{}_{}", name, kernel), size),
                    &queries,
                    |b, queries| {
                        b.iter(|| {
                            let result = projector.project_all(black_box(queries)).unwrap();
                            black_box(result);
                        });
                    },
                );
            }
        }
    }

    group.finish();
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);
