// Timing walkthrough over the kernel catalogue on a synthetic image.
// Useful for a quick sanity check of the selected backend; the real
// measurements live in benches/kernels.rs.

use std::time::Instant;

use simdpix::{features, CompareKind};

const WIDTH: usize = 1920;
const HEIGHT: usize = 1080;
const REPEAT: u32 = 50;

fn time<F: FnMut()>(name: &str, mut f: F) {
    // warm up once so page faults do not land in the measurement
    f();
    let start = Instant::now();
    for _ in 0..REPEAT {
        f();
    }
    let per_call = start.elapsed() / REPEAT;
    println!("  {name:<24} {per_call:>10.1?} per call");
}

fn gradient_gray(width: usize, height: usize) -> Vec<u8> {
    let mut img = vec![0u8; width * height];
    for row in 0..height {
        for col in 0..width {
            img[row * width + col] = ((row * 3 + col * 7) % 256) as u8;
        }
    }
    img
}

fn gradient_bgr(width: usize, height: usize) -> Vec<u8> {
    let mut img = vec![0u8; width * height * 3];
    for row in 0..height {
        for col in 0..width {
            let p = (row * width + col) * 3;
            img[p] = (col % 256) as u8;
            img[p + 1] = (row % 256) as u8;
            img[p + 2] = ((col + row) % 256) as u8;
        }
    }
    img
}

fn main() {
    let caps = features();
    println!("detected features: {caps:?}");
    println!("image: {WIDTH}x{HEIGHT}, {REPEAT} runs per kernel\n");

    let gray = gradient_gray(WIDTH, HEIGHT);
    let bgr = gradient_bgr(WIDTH, HEIGHT);

    let (rw, rh) = (WIDTH.div_ceil(2), HEIGHT.div_ceil(2));
    let mut reduced = vec![0u8; rw * rh];
    time("reduce_gray_2x2", || {
        simdpix::reduce_gray_2x2(&gray, WIDTH, HEIGHT, WIDTH, &mut reduced, rw, rh, rw);
    });

    let mut blurred = vec![0u8; WIDTH * HEIGHT * 3];
    time("gaussian_blur_3x3 (bgr)", || {
        simdpix::gaussian_blur_3x3(&bgr, WIDTH * 3, WIDTH, HEIGHT, 3, &mut blurred, WIDTH * 3);
    });

    let mut luma = vec![0u8; WIDTH * HEIGHT];
    time("bgr_to_gray", || {
        simdpix::bgr_to_gray(&bgr, WIDTH * 3, WIDTH, HEIGHT, &mut luma, WIDTH);
    });

    let mut y = vec![0u8; WIDTH * HEIGHT];
    let mut u = vec![0u8; rw * rh];
    let mut v = vec![0u8; rw * rh];
    time("bgr_to_yuv420p", || {
        simdpix::bgr_to_yuv420p(
            &bgr,
            WIDTH * 3,
            WIDTH,
            HEIGHT,
            &mut y,
            WIDTH,
            &mut u,
            rw,
            &mut v,
            rw,
        );
    });

    let mut uv = vec![0u8; rw * rh * 2];
    time("interleave_uv", || {
        simdpix::interleave_uv(&u, rw, &v, rw, rw, rh, &mut uv, rw * 2);
    });
    time("deinterleave_uv", || {
        simdpix::deinterleave_uv(&uv, rw * 2, rw, rh, &mut u, rw, &mut v, rw);
    });

    let mut mask = vec![0u8; WIDTH * HEIGHT];
    time("binarization", || {
        simdpix::binarization(
            &gray,
            WIDTH,
            WIDTH,
            HEIGHT,
            128,
            255,
            0,
            &mut mask,
            WIDTH,
            CompareKind::Greater,
        );
    });
    time("averaging_binarization", || {
        simdpix::averaging_binarization(
            &gray,
            WIDTH,
            WIDTH,
            HEIGHT,
            128,
            6,
            128,
            255,
            0,
            &mut mask,
            WIDTH,
            CompareKind::Greater,
        );
    });

    time("get_statistic", || {
        simdpix::get_statistic(&gray, WIDTH, WIDTH, HEIGHT);
    });
    time("histogram", || {
        simdpix::histogram(&gray, WIDTH, WIDTH, HEIGHT);
    });
    time("abs_difference_sum", || {
        simdpix::abs_difference_sum(&gray, WIDTH, &luma, WIDTH, WIDTH, HEIGHT);
    });

    let activations: Vec<f32> = (0..WIDTH * HEIGHT)
        .map(|i| (i as f32 / 1000.0).sin() * 8.0)
        .collect();
    let mut out = vec![0.0f32; activations.len()];
    time("neural_rough_sigmoid", || {
        simdpix::neural_rough_sigmoid(&activations, 1.0, &mut out);
    });

    let (min, max, avg) = simdpix::get_statistic(&gray, WIDTH, WIDTH, HEIGHT);
    println!("\ngray statistic: min={min} max={max} avg={avg}");
}
