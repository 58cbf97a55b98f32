//! Benchmarks for index computation and classification

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use landclass_algorithms::classification::{classify_spectral, Classifier};
use landclass_algorithms::imagery::{rgb_indices, SpectralIndexCalculator, IndexProducer};
use landclass_algorithms::statistics::class_statistics;
use landclass_core::{Band, EngineConfig, MultiBandRaster, PixelImage, Raster};

fn create_image(size: usize) -> PixelImage {
    PixelImage::from_rgb_fn(size, size, |row, col| {
        [
            ((row * 7 + col * 13) % 256) as u8,
            ((row * 11 + col * 3) % 256) as u8,
            ((row * 5 + col * 17) % 256) as u8,
        ]
    })
}

fn create_band(size: usize, base: f64) -> Raster<f64> {
    Raster::from_fn(size, size, |row, col| base + ((row * 7 + col * 13) % 200) as f64 / 1000.0)
}

fn create_composite(size: usize) -> MultiBandRaster {
    MultiBandRaster::from_bands([
        (Band::Red, create_band(size, 0.05)),
        (Band::Green, create_band(size, 0.08)),
        (Band::Blue, create_band(size, 0.03)),
        (Band::Nir, create_band(size, 0.3)),
        (Band::Swir1, create_band(size, 0.2)),
        (Band::Swir2, create_band(size, 0.1)),
    ])
    .unwrap()
}

fn bench_rgb_indices(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/rgb_indices");
    for size in [256, 512, 1024] {
        let image = create_image(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| rgb_indices(black_box(&image)))
        });
    }
    group.finish();
}

fn bench_spectral_indices(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/spectral_indices");
    for size in [256, 512, 1024] {
        let composite = create_composite(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| SpectralIndexCalculator::default().indices(black_box(&composite)))
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let config = EngineConfig::default();
    let classifier = Classifier::rgb(&config);
    let mut group = c.benchmark_group("classification/rgb_rules");
    for size in [256, 512, 1024] {
        let indices = rgb_indices(&create_image(size)).into_value();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| classifier.classify(black_box(&indices)))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("classification/spectral_pipeline");
    for size in [256, 512] {
        let composite = create_composite(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| classify_spectral(black_box(&composite), &config))
        });
    }
    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut group = c.benchmark_group("statistics/class_statistics");
    for size in [512, 2048] {
        let labels = Raster::from_fn(size, size, |row, col| ((row + col) % 5) as u8);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| class_statistics(black_box(&labels), &config.labels, 0.0009))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_rgb_indices,
    bench_spectral_indices,
    bench_classify,
    bench_stats
);
criterion_main!(benches);
