//! Scalar reference backend.
//!
//! Every operation has a plain scalar implementation here. It is the
//! correctness oracle for the vector backends (which must match it bit for
//! bit) and the fallback the dispatcher selects when the CPU lacks vector
//! extensions or the image is narrower than one register.
//!
//! Callers pass full pixel buffers plus a row stride in elements; the
//! dispatcher has already validated the geometry, so indexing here only
//! carries `debug_assert` guards.

pub mod math;

use crate::simd::traits::{
    CompareKind, CompareOp, Equal, Greater, GreaterOrEqual, Lesser, LesserOrEqual, NotEqual,
};
use crate::simd::utils::align_lo;
use math::*;

/// Downscales a gray image by 2x2 box averaging with rounding.
///
/// Odd source dimensions are handled by duplication: an odd last row averages
/// the same source row twice, an odd last column averages a 2x1 block.
pub fn reduce_gray_2x2(
    src: &[u8],
    src_width: usize,
    src_height: usize,
    src_stride: usize,
    dst: &mut [u8],
    dst_width: usize,
    dst_height: usize,
    dst_stride: usize,
) {
    debug_assert_eq!(src_width.div_ceil(2), dst_width);
    debug_assert_eq!(src_height.div_ceil(2), dst_height);

    let even_width = align_lo(src_width, 2);
    for dst_row in 0..dst_height {
        let src_row = dst_row * 2;
        let s0 = &src[src_row * src_stride..src_row * src_stride + src_width];
        let s1 = if src_row + 1 < src_height {
            &src[(src_row + 1) * src_stride..(src_row + 1) * src_stride + src_width]
        } else {
            s0
        };
        let d = &mut dst[dst_row * dst_stride..dst_row * dst_stride + dst_width];

        for dst_col in 0..even_width / 2 {
            let c = dst_col * 2;
            d[dst_col] = average4(s0[c], s0[c + 1], s1[c], s1[c + 1]);
        }
        if even_width != src_width {
            d[dst_width - 1] = average2(s0[even_width], s1[even_width]);
        }
    }
}

#[inline(always)]
fn blur_tap(row: &[u8], x: usize, channels: usize, size: usize) -> u16 {
    let left = if x >= channels { x - channels } else { x };
    let right = if x + channels < size { x + channels } else { x };
    row[left] as u16 + 2 * row[x] as u16 + row[right] as u16
}

/// 3x3 Gaussian blur with the 1-2-1 separable kernel and edge replication.
///
/// Interleaved multichannel rows are handled by using a neighbor step of
/// `channels` elements, which filters each channel independently.
pub fn gaussian_blur_3x3(
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    channels: usize,
    dst: &mut [u8],
    dst_stride: usize,
) {
    let size = width * channels;
    for row in 0..height {
        let top = if row > 0 { row - 1 } else { row };
        let bottom = if row + 1 < height { row + 1 } else { row };
        let r0 = &src[top * src_stride..top * src_stride + size];
        let r1 = &src[row * src_stride..row * src_stride + size];
        let r2 = &src[bottom * src_stride..bottom * src_stride + size];
        let d = &mut dst[row * dst_stride..row * dst_stride + size];

        for x in 0..size {
            let sum = blur_tap(r0, x, channels, size)
                + 2 * blur_tap(r1, x, channels, size)
                + blur_tap(r2, x, channels, size);
            d[x] = divide_by_16(sum) as u8;
        }
    }
}

/// Converts packed BGR pixels to 8-bit gray.
pub fn bgr_to_gray(
    bgr: &[u8],
    bgr_stride: usize,
    width: usize,
    height: usize,
    gray: &mut [u8],
    gray_stride: usize,
) {
    for row in 0..height {
        let s = &bgr[row * bgr_stride..row * bgr_stride + 3 * width];
        let d = &mut gray[row * gray_stride..row * gray_stride + width];
        for col in 0..width {
            let p = &s[3 * col..3 * col + 3];
            d[col] = math::bgr_to_gray(p[0] as i32, p[1] as i32, p[2] as i32);
        }
    }
}

/// Converts packed BGR to planar YUV 4:2:0.
///
/// Luma is computed per pixel; each chroma sample comes from the
/// rounding-averaged BGR values of its 2x2 block. Width and height must be
/// even.
pub fn bgr_to_yuv420p(
    bgr: &[u8],
    bgr_stride: usize,
    width: usize,
    height: usize,
    y: &mut [u8],
    y_stride: usize,
    u: &mut [u8],
    u_stride: usize,
    v: &mut [u8],
    v_stride: usize,
) {
    debug_assert!(width % 2 == 0 && height % 2 == 0);

    for row in (0..height).step_by(2) {
        let s0 = &bgr[row * bgr_stride..row * bgr_stride + 3 * width];
        let s1 = &bgr[(row + 1) * bgr_stride..(row + 1) * bgr_stride + 3 * width];
        let (y0, rest) = y[row * y_stride..].split_at_mut(y_stride);
        let y1 = &mut rest[..width];
        let y0 = &mut y0[..width];
        let ur = &mut u[(row / 2) * u_stride..(row / 2) * u_stride + width / 2];
        let vr = &mut v[(row / 2) * v_stride..(row / 2) * v_stride + width / 2];

        for col in (0..width).step_by(2) {
            let p00 = &s0[3 * col..3 * col + 3];
            let p01 = &s0[3 * col + 3..3 * col + 6];
            let p10 = &s1[3 * col..3 * col + 3];
            let p11 = &s1[3 * col + 3..3 * col + 6];

            y0[col] = bgr_to_y(p00[0] as i32, p00[1] as i32, p00[2] as i32);
            y0[col + 1] = bgr_to_y(p01[0] as i32, p01[1] as i32, p01[2] as i32);
            y1[col] = bgr_to_y(p10[0] as i32, p10[1] as i32, p10[2] as i32);
            y1[col + 1] = bgr_to_y(p11[0] as i32, p11[1] as i32, p11[2] as i32);

            let blue = average4(p00[0], p01[0], p10[0], p11[0]) as i32;
            let green = average4(p00[1], p01[1], p10[1], p11[1]) as i32;
            let red = average4(p00[2], p01[2], p10[2], p11[2]) as i32;
            ur[col / 2] = bgr_to_u(blue, green, red);
            vr[col / 2] = bgr_to_v(blue, green, red);
        }
    }
}

/// Splits an interleaved UV plane into separate U and V planes.
pub fn deinterleave_uv(
    uv: &[u8],
    uv_stride: usize,
    width: usize,
    height: usize,
    u: &mut [u8],
    u_stride: usize,
    v: &mut [u8],
    v_stride: usize,
) {
    for row in 0..height {
        let s = &uv[row * uv_stride..row * uv_stride + 2 * width];
        let ur = &mut u[row * u_stride..row * u_stride + width];
        let vr = &mut v[row * v_stride..row * v_stride + width];
        for col in 0..width {
            ur[col] = s[2 * col];
            vr[col] = s[2 * col + 1];
        }
    }
}

/// Merges separate U and V planes into one interleaved UV plane.
pub fn interleave_uv(
    u: &[u8],
    u_stride: usize,
    v: &[u8],
    v_stride: usize,
    width: usize,
    height: usize,
    uv: &mut [u8],
    uv_stride: usize,
) {
    for row in 0..height {
        let ur = &u[row * u_stride..row * u_stride + width];
        let vr = &v[row * v_stride..row * v_stride + width];
        let d = &mut uv[row * uv_stride..row * uv_stride + 2 * width];
        for col in 0..width {
            d[2 * col] = ur[col];
            d[2 * col + 1] = vr[col];
        }
    }
}

fn binarization_op<C: CompareOp>(
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    value: u8,
    positive: u8,
    negative: u8,
    dst: &mut [u8],
    dst_stride: usize,
) {
    for row in 0..height {
        let s = &src[row * src_stride..row * src_stride + width];
        let d = &mut dst[row * dst_stride..row * dst_stride + width];
        for col in 0..width {
            d[col] = if C::scalar(s[col], value) { positive } else { negative };
        }
    }
}

/// Per-pixel thresholding against a fixed value.
#[allow(clippy::too_many_arguments)]
pub fn binarization(
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    value: u8,
    positive: u8,
    negative: u8,
    dst: &mut [u8],
    dst_stride: usize,
    compare: CompareKind,
) {
    match compare {
        CompareKind::Equal => binarization_op::<Equal>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
        CompareKind::NotEqual => binarization_op::<NotEqual>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
        CompareKind::Greater => binarization_op::<Greater>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
        CompareKind::GreaterOrEqual => binarization_op::<GreaterOrEqual>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
        CompareKind::Lesser => binarization_op::<Lesser>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
        CompareKind::LesserOrEqual => binarization_op::<LesserOrEqual>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
    }
}

fn averaging_binarization_op<C: CompareOp>(
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    value: u8,
    neighborhood: usize,
    threshold: u8,
    positive: u8,
    negative: u8,
    dst: &mut [u8],
    dst_stride: usize,
) {
    // Per-column counters over the sliding row window. Each in-window pixel
    // contributes 0x10000 for area and one extra for a positive compare, so
    // the low half counts positives and the high half counts pixels. With
    // neighborhood < 0x7F both halves stay below 2^16.
    let mut sa = vec![0u32; width];

    let add_row = |sa: &mut [u32], row: usize| {
        let s = &src[row * src_stride..row * src_stride + width];
        for col in 0..width {
            sa[col] += if C::scalar(s[col], value) { 0x10001 } else { 0x10000 };
        }
    };
    let sub_row = |sa: &mut [u32], row: usize| {
        let s = &src[row * src_stride..row * src_stride + width];
        for col in 0..width {
            sa[col] -= if C::scalar(s[col], value) { 0x10001 } else { 0x10000 };
        }
    };

    for row in 0..neighborhood.min(height) {
        add_row(&mut sa, row);
    }

    for row in 0..height {
        if row + neighborhood < height {
            add_row(&mut sa, row + neighborhood);
        }
        if row > neighborhood {
            sub_row(&mut sa, row - neighborhood - 1);
        }

        let d = &mut dst[row * dst_stride..row * dst_stride + width];
        let mut sum: u32 = sa[..neighborhood].iter().sum();
        for col in 0..width {
            if col + neighborhood < width {
                sum += sa[col + neighborhood];
            }
            if col > neighborhood {
                sum -= sa[col - neighborhood - 1];
            }
            let positives = sum & 0xFFFF;
            let area = sum >> 16;
            d[col] = if positives * 0xFF > threshold as u32 * area {
                positive
            } else {
                negative
            };
        }
    }
}

/// Adaptive thresholding: each pixel is classified by the fraction of
/// positive compares within its `(2n+1) x (2n+1)` neighborhood, clipped at
/// the image borders. A pixel turns `positive` when
/// `positives * 255 > threshold * area`.
#[allow(clippy::too_many_arguments)]
pub fn averaging_binarization(
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    value: u8,
    neighborhood: usize,
    threshold: u8,
    positive: u8,
    negative: u8,
    dst: &mut [u8],
    dst_stride: usize,
    compare: CompareKind,
) {
    debug_assert!(width > neighborhood && height > neighborhood && neighborhood < 0x7F);
    match compare {
        CompareKind::Equal => averaging_binarization_op::<Equal>(
            src, src_stride, width, height, value, neighborhood, threshold, positive, negative,
            dst, dst_stride,
        ),
        CompareKind::NotEqual => averaging_binarization_op::<NotEqual>(
            src, src_stride, width, height, value, neighborhood, threshold, positive, negative,
            dst, dst_stride,
        ),
        CompareKind::Greater => averaging_binarization_op::<Greater>(
            src, src_stride, width, height, value, neighborhood, threshold, positive, negative,
            dst, dst_stride,
        ),
        CompareKind::GreaterOrEqual => averaging_binarization_op::<GreaterOrEqual>(
            src, src_stride, width, height, value, neighborhood, threshold, positive, negative,
            dst, dst_stride,
        ),
        CompareKind::Lesser => averaging_binarization_op::<Lesser>(
            src, src_stride, width, height, value, neighborhood, threshold, positive, negative,
            dst, dst_stride,
        ),
        CompareKind::LesserOrEqual => averaging_binarization_op::<LesserOrEqual>(
            src, src_stride, width, height, value, neighborhood, threshold, positive, negative,
            dst, dst_stride,
        ),
    }
}

/// Minimum, maximum and rounding mean of a gray image.
pub fn get_statistic(src: &[u8], src_stride: usize, width: usize, height: usize) -> (u8, u8, u8) {
    let mut min = u8::MAX;
    let mut max = 0u8;
    let mut sum = 0u64;
    for row in 0..height {
        let s = &src[row * src_stride..row * src_stride + width];
        let mut row_sum = 0u32;
        for &value in s {
            min = min.min(value);
            max = max.max(value);
            row_sum += value as u32;
        }
        sum += row_sum as u64;
    }
    let count = (width * height) as u64;
    let average = ((sum + count / 2) / count) as u8;
    (min, max, average)
}

/// 256-bin histogram of a gray image.
///
/// Four interleaved sub-histograms break the store-to-load dependency chain
/// on repeated pixel values; they are summed at the end.
pub fn histogram(src: &[u8], src_stride: usize, width: usize, height: usize) -> [u32; 256] {
    let mut parts = [[0u32; 256]; 4];
    let aligned_width = align_lo(width, 4);
    for row in 0..height {
        let s = &src[row * src_stride..row * src_stride + width];
        for col in (0..aligned_width).step_by(4) {
            parts[0][s[col] as usize] += 1;
            parts[1][s[col + 1] as usize] += 1;
            parts[2][s[col + 2] as usize] += 1;
            parts[3][s[col + 3] as usize] += 1;
        }
        for col in aligned_width..width {
            parts[0][s[col] as usize] += 1;
        }
    }
    let mut histogram = [0u32; 256];
    for bin in 0..256 {
        histogram[bin] = parts[0][bin] + parts[1][bin] + parts[2][bin] + parts[3][bin];
    }
    histogram
}

/// Sum of absolute differences between two gray images.
pub fn abs_difference_sum(
    a: &[u8],
    a_stride: usize,
    b: &[u8],
    b_stride: usize,
    width: usize,
    height: usize,
) -> u64 {
    let mut sum = 0u64;
    for row in 0..height {
        let ra = &a[row * a_stride..row * a_stride + width];
        let rb = &b[row * b_stride..row * b_stride + width];
        let mut row_sum = 0u32;
        for col in 0..width {
            row_sum += ra[col].abs_diff(rb[col]) as u32;
        }
        sum += row_sum as u64;
    }
    sum
}

/// Applies the rough sigmoid to `src * slope` elementwise.
pub fn neural_rough_sigmoid(src: &[f32], slope: f32, dst: &mut [f32]) {
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d = rough_sigmoid(s * slope);
    }
}
