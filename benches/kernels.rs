//! Kernel throughput benchmarks.
//!
//! Each group measures one operation at a few common frame sizes and, where
//! vector backends exist, compares the auto-selected backend against the
//! scalar one on the same input. Throughput is reported in bytes of source
//! consumed so the numbers compare across frame sizes.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simdpix::{features, CompareKind, FeatureSet};

/// QVGA, HD and Full HD.
const FRAME_SIZES: &[(usize, usize)] = &[(320, 240), (1280, 720), (1920, 1080)];

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.random()).collect()
}

fn backends() -> Vec<(&'static str, FeatureSet)> {
    let host = *features();
    let mut list = vec![("auto", host)];
    if host.avx2 || host.sse41 || host.neon {
        list.push(("scalar", FeatureSet::none()));
    }
    list
}

fn bench_reduce(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(100);
    let mut group = c.benchmark_group("reduce_gray_2x2");
    for &(w, h) in FRAME_SIZES {
        let src = random_bytes(&mut rng, w * h);
        let (dw, dh) = (w / 2, h / 2);
        let mut dst = vec![0u8; dw * dh];
        group.throughput(Throughput::Bytes((w * h) as u64));
        for (name, set) in backends() {
            group.bench_with_input(BenchmarkId::new(name, format!("{w}x{h}")), &set, |b, set| {
                b.iter(|| {
                    simdpix::simd::dispatch::reduce_gray_2x2_with(
                        set,
                        black_box(&src),
                        w,
                        h,
                        w,
                        &mut dst,
                        dw,
                        dh,
                        dw,
                    )
                })
            });
        }
    }
    group.finish();
}

fn bench_blur(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(101);
    let mut group = c.benchmark_group("gaussian_blur_3x3_bgr");
    for &(w, h) in FRAME_SIZES {
        let stride = w * 3;
        let src = random_bytes(&mut rng, stride * h);
        let mut dst = vec![0u8; stride * h];
        group.throughput(Throughput::Bytes((stride * h) as u64));
        for (name, set) in backends() {
            group.bench_with_input(BenchmarkId::new(name, format!("{w}x{h}")), &set, |b, set| {
                b.iter(|| {
                    simdpix::simd::dispatch::gaussian_blur_3x3_with(
                        set,
                        black_box(&src),
                        stride,
                        w,
                        h,
                        3,
                        &mut dst,
                        stride,
                    )
                })
            });
        }
    }
    group.finish();
}

fn bench_bgr_to_gray(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(102);
    let mut group = c.benchmark_group("bgr_to_gray");
    for &(w, h) in FRAME_SIZES {
        let stride = w * 3;
        let bgr = random_bytes(&mut rng, stride * h);
        let mut gray = vec![0u8; w * h];
        group.throughput(Throughput::Bytes((stride * h) as u64));
        for (name, set) in backends() {
            group.bench_with_input(BenchmarkId::new(name, format!("{w}x{h}")), &set, |b, set| {
                b.iter(|| {
                    simdpix::simd::dispatch::bgr_to_gray_with(
                        set,
                        black_box(&bgr),
                        stride,
                        w,
                        h,
                        &mut gray,
                        w,
                    )
                })
            });
        }
    }
    group.finish();
}

fn bench_bgr_to_yuv420p(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(103);
    let mut group = c.benchmark_group("bgr_to_yuv420p");
    for &(w, h) in FRAME_SIZES {
        let stride = w * 3;
        let bgr = random_bytes(&mut rng, stride * h);
        let (cw, ch) = (w / 2, h / 2);
        let mut y = vec![0u8; w * h];
        let mut u = vec![0u8; cw * ch];
        let mut v = vec![0u8; cw * ch];
        group.throughput(Throughput::Bytes((stride * h) as u64));
        for (name, set) in backends() {
            group.bench_with_input(BenchmarkId::new(name, format!("{w}x{h}")), &set, |b, set| {
                b.iter(|| {
                    simdpix::simd::dispatch::bgr_to_yuv420p_with(
                        set,
                        black_box(&bgr),
                        stride,
                        w,
                        h,
                        &mut y,
                        w,
                        &mut u,
                        cw,
                        &mut v,
                        cw,
                    )
                })
            });
        }
    }
    group.finish();
}

fn bench_binarization(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(104);
    let mut group = c.benchmark_group("binarization");
    for &(w, h) in FRAME_SIZES {
        let src = random_bytes(&mut rng, w * h);
        let mut dst = vec![0u8; w * h];
        group.throughput(Throughput::Bytes((w * h) as u64));
        for (name, set) in backends() {
            group.bench_with_input(BenchmarkId::new(name, format!("{w}x{h}")), &set, |b, set| {
                b.iter(|| {
                    simdpix::simd::dispatch::binarization_with(
                        set,
                        black_box(&src),
                        w,
                        w,
                        h,
                        128,
                        255,
                        0,
                        &mut dst,
                        w,
                        CompareKind::Greater,
                    )
                })
            });
        }
    }
    group.finish();
}

fn bench_reductions(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(105);
    let mut group = c.benchmark_group("reductions");
    let (w, h) = (1920usize, 1080usize);
    let a = random_bytes(&mut rng, w * h);
    let b_img = random_bytes(&mut rng, w * h);
    group.throughput(Throughput::Bytes((w * h) as u64));
    for (name, set) in backends() {
        group.bench_with_input(
            BenchmarkId::new("get_statistic", name),
            &set,
            |bench, set| {
                bench.iter(|| {
                    simdpix::simd::dispatch::get_statistic_with(set, black_box(&a), w, w, h)
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("abs_difference_sum", name),
            &set,
            |bench, set| {
                bench.iter(|| {
                    simdpix::simd::dispatch::abs_difference_sum_with(
                        set,
                        black_box(&a),
                        w,
                        black_box(&b_img),
                        w,
                        w,
                        h,
                    )
                })
            },
        );
    }
    group.bench_function("histogram", |bench| {
        bench.iter(|| simdpix::histogram(black_box(&a), w, w, h))
    });
    group.finish();
}

fn bench_sigmoid(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(106);
    let mut group = c.benchmark_group("neural_rough_sigmoid");
    for &len in &[4_096usize, 65_536, 1_048_576] {
        let src: Vec<f32> = (0..len).map(|_| rng.random_range(-10.0..10.0)).collect();
        let mut dst = vec![0.0f32; len];
        group.throughput(Throughput::Elements(len as u64));
        for (name, set) in backends() {
            group.bench_with_input(BenchmarkId::new(name, len), &set, |b, set| {
                b.iter(|| {
                    simdpix::simd::dispatch::neural_rough_sigmoid_with(
                        set,
                        black_box(&src),
                        1.0,
                        &mut dst,
                    )
                })
            });
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_reduce,
    bench_blur,
    bench_bgr_to_gray,
    bench_bgr_to_yuv420p,
    bench_binarization,
    bench_reductions,
    bench_sigmoid
);
criterion_main!(benches);
