//! Semantic tests against straightforward reference implementations.
//!
//! The backend equivalence suite proves all backends agree with each other;
//! this one proves the agreed-upon answer is the right one, by checking the
//! public entry points against naive per-pixel formulas written out inline.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simdpix::CompareKind;

fn random_image(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random()).collect()
}

#[test]
fn reduce_handles_odd_dimensions() {
    // 17x5 -> 9x3: last column averages 2 pixels, last row averages 2,
    // the bottom-right corner copies a single pixel through average2.
    let (sw, sh) = (17usize, 5usize);
    let (dw, dh) = (9usize, 3usize);
    let src = random_image(10, sw * sh);
    let mut dst = vec![0u8; dw * dh];
    simdpix::reduce_gray_2x2(&src, sw, sh, sw, &mut dst, dw, dh, dw);

    for row in 0..dh {
        for col in 0..dw {
            let x0 = 2 * col;
            let y0 = 2 * row;
            let x1 = (x0 + 1).min(sw - 1);
            let y1 = (y0 + 1).min(sh - 1);
            let expected = if x1 > x0 && y1 > y0 {
                let sum = src[y0 * sw + x0] as u32
                    + src[y0 * sw + x1] as u32
                    + src[y1 * sw + x0] as u32
                    + src[y1 * sw + x1] as u32;
                ((sum + 2) / 4) as u8
            } else {
                // an edge averages the two live pixels, the corner repeats one
                let a = src[y0 * sw + x0] as u32;
                let b = src[y1 * sw + x1] as u32;
                ((a + b + 1) / 2) as u8
            };
            assert_eq!(dst[row * dw + col], expected, "({col},{row})");
        }
    }
}

#[test]
fn blur_of_impulse_spreads_1_2_1() {
    // single bright pixel in a black 7x7 field
    let n = 7usize;
    let mut src = vec![0u8; n * n];
    src[3 * n + 3] = 160;
    let mut dst = vec![0u8; n * n];
    simdpix::gaussian_blur_3x3(&src, n, n, n, 1, &mut dst, n);

    // 160 / 16 = 10 at the corners, 20 at the edges, 40 in the middle
    let expected = [
        (2, 2, 10),
        (3, 2, 20),
        (4, 2, 10),
        (2, 3, 20),
        (3, 3, 40),
        (4, 3, 20),
        (2, 4, 10),
        (3, 4, 20),
        (4, 4, 10),
    ];
    for &(x, y, value) in &expected {
        assert_eq!(dst[y * n + x], value, "({x},{y})");
    }
    assert_eq!(dst[0], 0);
    assert_eq!(dst[n * n - 1], 0);
}

#[test]
fn blur_matches_naive_windowed_sum() {
    let (w, h, ch) = (21usize, 6usize, 3usize);
    let size = w * ch;
    let src = random_image(11, size * h);
    let mut dst = vec![0u8; size * h];
    simdpix::gaussian_blur_3x3(&src, size, w, h, ch, &mut dst, size);

    let at = |x: isize, y: isize, c: usize| {
        let x = x.clamp(0, w as isize - 1) as usize;
        let y = y.clamp(0, h as isize - 1) as usize;
        src[y * size + x * ch + c] as u32
    };
    for y in 0..h as isize {
        for x in 0..w as isize {
            for c in 0..ch {
                let mut sum = 0;
                for (dy, wy) in [(-1, 1), (0, 2), (1, 1)] {
                    for (dx, wx) in [(-1, 1), (0, 2), (1, 1)] {
                        sum += wx * wy * at(x + dx, y + dy, c);
                    }
                }
                let expected = ((sum + 8) / 16) as u8;
                assert_eq!(
                    dst[y as usize * size + x as usize * ch + c],
                    expected,
                    "({x},{y},{c})"
                );
            }
        }
    }
}

#[test]
fn binarization_applies_each_comparison() {
    let src = [50u8, 100, 100, 150, 200];
    let cases = [
        (CompareKind::Equal, [0u8, 255, 255, 0, 0]),
        (CompareKind::NotEqual, [255, 0, 0, 255, 255]),
        (CompareKind::Greater, [0, 0, 0, 255, 255]),
        (CompareKind::GreaterOrEqual, [0, 255, 255, 255, 255]),
        (CompareKind::Lesser, [255, 0, 0, 0, 0]),
        (CompareKind::LesserOrEqual, [255, 255, 255, 0, 0]),
    ];
    for (kind, expected) in cases {
        let mut dst = [0u8; 5];
        simdpix::binarization(&src, 5, 5, 1, 100, 255, 0, &mut dst, 5, kind);
        assert_eq!(dst, expected, "{kind:?}");
    }
}

#[test]
fn averaging_binarization_matches_window_count() {
    let (w, h) = (23usize, 17usize);
    let neighborhood = 3usize;
    let threshold = 128u8;
    let src = random_image(12, w * h);
    let mut dst = vec![0u8; w * h];
    simdpix::averaging_binarization(
        &src,
        w,
        w,
        h,
        100,
        neighborhood,
        threshold,
        255,
        0,
        &mut dst,
        w,
        CompareKind::Greater,
    );

    for y in 0..h {
        for x in 0..w {
            let x0 = x.saturating_sub(neighborhood);
            let y0 = y.saturating_sub(neighborhood);
            let x1 = (x + neighborhood + 1).min(w);
            let y1 = (y + neighborhood + 1).min(h);
            let mut hits = 0u32;
            let area = ((x1 - x0) * (y1 - y0)) as u32;
            for wy in y0..y1 {
                for wx in x0..x1 {
                    if src[wy * w + wx] > 100 {
                        hits += 1;
                    }
                }
            }
            let expected = if hits * 255 > area * threshold as u32 {
                255
            } else {
                0
            };
            assert_eq!(dst[y * w + x], expected, "({x},{y})");
        }
    }
}

#[test]
fn statistic_matches_naive_scan() {
    let (w, h) = (37usize, 9usize);
    let stride = w + 4;
    let src = random_image(13, stride * h);
    let (min, max, avg) = simdpix::get_statistic(&src, stride, w, h);

    let mut naive_min = u8::MAX;
    let mut naive_max = 0u8;
    let mut sum = 0u64;
    for row in 0..h {
        for &p in &src[row * stride..row * stride + w] {
            naive_min = naive_min.min(p);
            naive_max = naive_max.max(p);
            sum += p as u64;
        }
    }
    let count = (w * h) as u64;
    assert_eq!(min, naive_min);
    assert_eq!(max, naive_max);
    assert_eq!(avg as u64, (sum + count / 2) / count);
}

#[test]
fn statistic_of_constant_image() {
    let src = vec![77u8; 40 * 8];
    assert_eq!(simdpix::get_statistic(&src, 40, 40, 8), (77, 77, 77));
}

#[test]
fn histogram_counts_every_pixel_once() {
    let (w, h) = (33usize, 7usize);
    let stride = w + 2;
    let src = random_image(14, stride * h);
    let hist = simdpix::histogram(&src, stride, w, h);

    assert_eq!(hist.iter().map(|&c| c as usize).sum::<usize>(), w * h);
    let mut naive = [0u32; 256];
    for row in 0..h {
        for &p in &src[row * stride..row * stride + w] {
            naive[p as usize] += 1;
        }
    }
    assert_eq!(hist, naive);
}

#[test]
fn abs_difference_sum_matches_naive() {
    let (w, h) = (50usize, 6usize);
    let a = random_image(15, w * h);
    let b = random_image(16, w * h);
    let sad = simdpix::abs_difference_sum(&a, w, &b, w, w, h);

    let naive: u64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x as i64 - y as i64).unsigned_abs())
        .sum();
    assert_eq!(sad, naive);
}

#[test]
fn abs_difference_sum_of_identical_images_is_zero() {
    let img = random_image(17, 64 * 4);
    assert_eq!(simdpix::abs_difference_sum(&img, 64, &img, 64, 64, 4), 0);
}

#[test]
fn rough_sigmoid_tracks_exact_logistic() {
    let src: Vec<f32> = (0..2000).map(|i| (i as f32 - 1000.0) / 100.0).collect();
    let mut dst = vec![0.0f32; src.len()];
    simdpix::neural_rough_sigmoid(&src, 1.0, &mut dst);

    for (&x, &approx) in src.iter().zip(dst.iter()) {
        let exact = 1.0 / (1.0 + (-x).exp());
        assert!(
            (approx - exact).abs() < 2.4e-3,
            "x={x}: approx={approx}, exact={exact}"
        );
    }
    // saturation and midpoint; the polynomial leaves ~2.7e-6 at |x| = 40
    let mut ends = [0.0f32; 3];
    simdpix::neural_rough_sigmoid(&[-40.0, 0.0, 40.0], 1.0, &mut ends);
    assert!(ends[0] > 1e-6 && ends[0] < 1e-5);
    assert!((ends[1] - 0.5).abs() < 1e-6);
    assert!(ends[2] > 1.0 - 1e-5 && ends[2] < 1.0 - 1e-6);
}
