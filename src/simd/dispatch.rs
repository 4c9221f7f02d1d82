//! Public entry points with runtime backend selection.
//!
//! Every operation comes in two forms: the plain function, which consults
//! the cached host [`FeatureSet`], and a `_with` sibling taking an explicit
//! feature set so callers (and the equivalence tests) can pin any backend.
//!
//! Selection walks a fixed cascade, widest backend first: AVX2, then SSE4.1,
//! then NEON, then the scalar fallback. A vector backend is taken only when
//! its cfg flag was compiled in, the feature set reports the CPU supports
//! it, and the image is at least one register wide; narrower images go to
//! the scalar backend, never to a partial-only vector loop. Masking a
//! feature off can therefore only move an operation down the cascade, and
//! every rung produces bit-identical output.
//!
//! Geometry is validated here with plain `assert!` so misuse fails loudly in
//! release builds too; the per-backend code only carries `debug_assert`.

#![cfg_attr(fallback, allow(unused_variables))]

use crate::simd::base;
use crate::simd::features::{features, FeatureSet};
#[cfg(any(sse41, avx2, neon))]
use crate::simd::kernels;
use crate::simd::traits::CompareKind;
#[cfg(any(sse41, avx2, neon))]
use crate::simd::traits::{
    Equal, Greater, GreaterOrEqual, Lesser, LesserOrEqual, NotEqual, PixelVec,
};

#[cfg(avx2)]
use crate::simd::avx2;
#[cfg(neon)]
use crate::simd::neon;
#[cfg(sse41)]
use crate::simd::sse41;

#[inline]
fn check_plane(buf: &[u8], stride: usize, width: usize, height: usize) {
    assert!(width > 0 && height > 0, "empty image");
    assert!(stride >= width, "stride shorter than row");
    assert!(
        buf.len() >= (height - 1) * stride + width,
        "buffer too small for geometry"
    );
}

/// Downscales a gray image by averaging 2x2 blocks with rounding.
///
/// `dst_width` and `dst_height` must equal the source dimensions divided by
/// two, rounded up. Odd edges average the available pixels only.
#[allow(clippy::too_many_arguments)]
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
    reduce_gray_2x2_with(
        features(),
        src,
        src_width,
        src_height,
        src_stride,
        dst,
        dst_width,
        dst_height,
        dst_stride,
    )
}

/// [`reduce_gray_2x2`] with an explicit feature set.
#[allow(clippy::too_many_arguments)]
pub fn reduce_gray_2x2_with(
    features: &FeatureSet,
    src: &[u8],
    src_width: usize,
    src_height: usize,
    src_stride: usize,
    dst: &mut [u8],
    dst_width: usize,
    dst_height: usize,
    dst_stride: usize,
) {
    check_plane(src, src_stride, src_width, src_height);
    check_plane(dst, dst_stride, dst_width, dst_height);
    assert_eq!(dst_width, src_width.div_ceil(2), "dst width mismatch");
    assert_eq!(dst_height, src_height.div_ceil(2), "dst height mismatch");

    #[cfg(avx2)]
    if features.avx2 && src_width >= 64 {
        return kernels::reduce_gray_2x2::<avx2::U8x32>(
            src, src_width, src_height, src_stride, dst, dst_width, dst_height, dst_stride,
        );
    }
    #[cfg(sse41)]
    if features.sse41 && src_width >= 32 {
        return kernels::reduce_gray_2x2::<sse41::U8x16>(
            src, src_width, src_height, src_stride, dst, dst_width, dst_height, dst_stride,
        );
    }
    #[cfg(neon)]
    if features.neon && src_width >= 32 {
        return kernels::reduce_gray_2x2::<neon::U8x16>(
            src, src_width, src_height, src_stride, dst, dst_width, dst_height, dst_stride,
        );
    }
    base::reduce_gray_2x2(
        src, src_width, src_height, src_stride, dst, dst_width, dst_height, dst_stride,
    )
}

/// 3x3 Gaussian blur (1-2-1 separable kernel, divide by 16 with rounding)
/// with edge replication. `channels` is the interleaved channel count, 1 to
/// 4; each channel is filtered independently.
pub fn gaussian_blur_3x3(
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    channels: usize,
    dst: &mut [u8],
    dst_stride: usize,
) {
    gaussian_blur_3x3_with(features(), src, src_stride, width, height, channels, dst, dst_stride)
}

/// [`gaussian_blur_3x3`] with an explicit feature set.
#[allow(clippy::too_many_arguments)]
pub fn gaussian_blur_3x3_with(
    features: &FeatureSet,
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    channels: usize,
    dst: &mut [u8],
    dst_stride: usize,
) {
    assert!((1..=4).contains(&channels), "channels out of range");
    let size = width * channels;
    check_plane(src, src_stride, size, height);
    check_plane(dst, dst_stride, size, height);

    #[cfg(avx2)]
    if features.avx2 && size >= 64 {
        return kernels::gaussian_blur_3x3::<avx2::U8x32>(
            src, src_stride, width, height, channels, dst, dst_stride,
        );
    }
    #[cfg(sse41)]
    if features.sse41 && size >= 32 {
        return kernels::gaussian_blur_3x3::<sse41::U8x16>(
            src, src_stride, width, height, channels, dst, dst_stride,
        );
    }
    #[cfg(neon)]
    if features.neon && size >= 32 {
        return kernels::gaussian_blur_3x3::<neon::U8x16>(
            src, src_stride, width, height, channels, dst, dst_stride,
        );
    }
    base::gaussian_blur_3x3(src, src_stride, width, height, channels, dst, dst_stride)
}

/// Converts packed BGR pixels to 8-bit gray using the BT.601 weights.
pub fn bgr_to_gray(
    bgr: &[u8],
    bgr_stride: usize,
    width: usize,
    height: usize,
    gray: &mut [u8],
    gray_stride: usize,
) {
    bgr_to_gray_with(features(), bgr, bgr_stride, width, height, gray, gray_stride)
}

/// [`bgr_to_gray`] with an explicit feature set.
pub fn bgr_to_gray_with(
    features: &FeatureSet,
    bgr: &[u8],
    bgr_stride: usize,
    width: usize,
    height: usize,
    gray: &mut [u8],
    gray_stride: usize,
) {
    assert!(bgr_stride >= 3 * width, "bgr stride shorter than row");
    check_plane(gray, gray_stride, width, height);
    assert!(bgr.len() >= (height - 1) * bgr_stride + 3 * width);

    #[cfg(avx2)]
    if features.avx2 && width >= 32 {
        return kernels::bgr_to_gray::<avx2::U8x32>(
            bgr, bgr_stride, width, height, gray, gray_stride,
        );
    }
    #[cfg(sse41)]
    if features.sse41 && width >= 16 {
        return kernels::bgr_to_gray::<sse41::U8x16>(
            bgr, bgr_stride, width, height, gray, gray_stride,
        );
    }
    #[cfg(neon)]
    if features.neon && width >= 16 {
        return kernels::bgr_to_gray::<neon::U8x16>(
            bgr, bgr_stride, width, height, gray, gray_stride,
        );
    }
    base::bgr_to_gray(bgr, bgr_stride, width, height, gray, gray_stride)
}

/// Converts packed BGR to planar YUV 4:2:0 (studio swing). Luma is computed
/// per pixel; each chroma sample comes from the averaged BGR values of its
/// 2x2 block. `width` and `height` must be even; the chroma planes are half
/// size in both dimensions.
#[allow(clippy::too_many_arguments)]
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
    bgr_to_yuv420p_with(
        features(),
        bgr,
        bgr_stride,
        width,
        height,
        y,
        y_stride,
        u,
        u_stride,
        v,
        v_stride,
    )
}

/// [`bgr_to_yuv420p`] with an explicit feature set.
#[allow(clippy::too_many_arguments)]
pub fn bgr_to_yuv420p_with(
    features: &FeatureSet,
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
    assert!(width % 2 == 0 && height % 2 == 0, "odd yuv420p dimensions");
    assert!(bgr_stride >= 3 * width, "bgr stride shorter than row");
    assert!(bgr.len() >= (height - 1) * bgr_stride + 3 * width);
    check_plane(y, y_stride, width, height);
    check_plane(u, u_stride, width / 2, height / 2);
    check_plane(v, v_stride, width / 2, height / 2);

    #[cfg(avx2)]
    if features.avx2 && width >= 32 {
        return kernels::bgr_to_yuv420p::<avx2::U8x32>(
            bgr, bgr_stride, width, height, y, y_stride, u, u_stride, v, v_stride,
        );
    }
    #[cfg(sse41)]
    if features.sse41 && width >= 16 {
        return kernels::bgr_to_yuv420p::<sse41::U8x16>(
            bgr, bgr_stride, width, height, y, y_stride, u, u_stride, v, v_stride,
        );
    }
    #[cfg(neon)]
    if features.neon && width >= 16 {
        return kernels::bgr_to_yuv420p::<neon::U8x16>(
            bgr, bgr_stride, width, height, y, y_stride, u, u_stride, v, v_stride,
        );
    }
    base::bgr_to_yuv420p(
        bgr, bgr_stride, width, height, y, y_stride, u, u_stride, v, v_stride,
    )
}

/// Splits an interleaved UV plane (as in NV12) into separate U and V planes.
/// `width` and `height` are the chroma plane dimensions.
#[allow(clippy::too_many_arguments)]
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
    deinterleave_uv_with(
        features(),
        uv,
        uv_stride,
        width,
        height,
        u,
        u_stride,
        v,
        v_stride,
    )
}

/// [`deinterleave_uv`] with an explicit feature set.
#[allow(clippy::too_many_arguments)]
pub fn deinterleave_uv_with(
    features: &FeatureSet,
    uv: &[u8],
    uv_stride: usize,
    width: usize,
    height: usize,
    u: &mut [u8],
    u_stride: usize,
    v: &mut [u8],
    v_stride: usize,
) {
    assert!(uv_stride >= 2 * width, "uv stride shorter than row");
    assert!(uv.len() >= (height - 1) * uv_stride + 2 * width);
    check_plane(u, u_stride, width, height);
    check_plane(v, v_stride, width, height);

    #[cfg(avx2)]
    if features.avx2 && width >= 32 {
        return kernels::deinterleave_uv::<avx2::U8x32>(
            uv, uv_stride, width, height, u, u_stride, v, v_stride,
        );
    }
    #[cfg(sse41)]
    if features.sse41 && width >= 16 {
        return kernels::deinterleave_uv::<sse41::U8x16>(
            uv, uv_stride, width, height, u, u_stride, v, v_stride,
        );
    }
    #[cfg(neon)]
    if features.neon && width >= 16 {
        return kernels::deinterleave_uv::<neon::U8x16>(
            uv, uv_stride, width, height, u, u_stride, v, v_stride,
        );
    }
    base::deinterleave_uv(uv, uv_stride, width, height, u, u_stride, v, v_stride)
}

/// Merges separate U and V planes into one interleaved UV plane, the inverse
/// of [`deinterleave_uv`].
#[allow(clippy::too_many_arguments)]
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
    interleave_uv_with(
        features(),
        u,
        u_stride,
        v,
        v_stride,
        width,
        height,
        uv,
        uv_stride,
    )
}

/// [`interleave_uv`] with an explicit feature set.
#[allow(clippy::too_many_arguments)]
pub fn interleave_uv_with(
    features: &FeatureSet,
    u: &[u8],
    u_stride: usize,
    v: &[u8],
    v_stride: usize,
    width: usize,
    height: usize,
    uv: &mut [u8],
    uv_stride: usize,
) {
    check_plane(u, u_stride, width, height);
    check_plane(v, v_stride, width, height);
    assert!(uv_stride >= 2 * width, "uv stride shorter than row");
    assert!(uv.len() >= (height - 1) * uv_stride + 2 * width);

    #[cfg(avx2)]
    if features.avx2 && width >= 32 {
        return kernels::interleave_uv::<avx2::U8x32>(
            u, u_stride, v, v_stride, width, height, uv, uv_stride,
        );
    }
    #[cfg(sse41)]
    if features.sse41 && width >= 16 {
        return kernels::interleave_uv::<sse41::U8x16>(
            u, u_stride, v, v_stride, width, height, uv, uv_stride,
        );
    }
    #[cfg(neon)]
    if features.neon && width >= 16 {
        return kernels::interleave_uv::<neon::U8x16>(
            u, u_stride, v, v_stride, width, height, uv, uv_stride,
        );
    }
    base::interleave_uv(u, u_stride, v, v_stride, width, height, uv, uv_stride)
}

#[cfg(any(sse41, avx2, neon))]
#[allow(clippy::too_many_arguments)]
fn binarization_vec<V: PixelVec>(
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
        CompareKind::Equal => kernels::binarization::<Equal, V>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
        CompareKind::NotEqual => kernels::binarization::<NotEqual, V>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
        CompareKind::Greater => kernels::binarization::<Greater, V>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
        CompareKind::GreaterOrEqual => kernels::binarization::<GreaterOrEqual, V>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
        CompareKind::Lesser => kernels::binarization::<Lesser, V>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
        CompareKind::LesserOrEqual => kernels::binarization::<LesserOrEqual, V>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride,
        ),
    }
}

/// Thresholds every pixel against `value` with the given comparison; pixels
/// that satisfy it become `positive`, the rest `negative`.
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
    binarization_with(
        features(),
        src,
        src_stride,
        width,
        height,
        value,
        positive,
        negative,
        dst,
        dst_stride,
        compare,
    )
}

/// [`binarization`] with an explicit feature set.
#[allow(clippy::too_many_arguments)]
pub fn binarization_with(
    features: &FeatureSet,
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
    check_plane(src, src_stride, width, height);
    check_plane(dst, dst_stride, width, height);

    #[cfg(avx2)]
    if features.avx2 && width >= 32 {
        return binarization_vec::<avx2::U8x32>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare,
        );
    }
    #[cfg(sse41)]
    if features.sse41 && width >= 16 {
        return binarization_vec::<sse41::U8x16>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare,
        );
    }
    #[cfg(neon)]
    if features.neon && width >= 16 {
        return binarization_vec::<neon::U8x16>(
            src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare,
        );
    }
    base::binarization(
        src, src_stride, width, height, value, positive, negative, dst, dst_stride, compare,
    )
}

/// Adaptive thresholding over a `(2 * neighborhood + 1)` square window,
/// clipped at the image borders: a pixel becomes `positive` when the
/// positive compares in its window exceed `threshold / 255` of the window
/// area. Runs on the scalar backend on every CPU.
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
    check_plane(src, src_stride, width, height);
    check_plane(dst, dst_stride, width, height);
    assert!(
        width > neighborhood && height > neighborhood && neighborhood < 0x7F,
        "neighborhood out of range"
    );
    base::averaging_binarization(
        src,
        src_stride,
        width,
        height,
        value,
        neighborhood,
        threshold,
        positive,
        negative,
        dst,
        dst_stride,
        compare,
    )
}

/// Returns `(min, max, average)` of a gray image; the average rounds to
/// nearest.
pub fn get_statistic(src: &[u8], src_stride: usize, width: usize, height: usize) -> (u8, u8, u8) {
    get_statistic_with(features(), src, src_stride, width, height)
}

/// [`get_statistic`] with an explicit feature set.
pub fn get_statistic_with(
    features: &FeatureSet,
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
) -> (u8, u8, u8) {
    check_plane(src, src_stride, width, height);

    #[cfg(avx2)]
    if features.avx2 && width >= 32 {
        return kernels::get_statistic::<avx2::U8x32>(src, src_stride, width, height);
    }
    #[cfg(sse41)]
    if features.sse41 && width >= 16 {
        return kernels::get_statistic::<sse41::U8x16>(src, src_stride, width, height);
    }
    #[cfg(neon)]
    if features.neon && width >= 16 {
        return kernels::get_statistic::<neon::U8x16>(src, src_stride, width, height);
    }
    base::get_statistic(src, src_stride, width, height)
}

/// 256-bin histogram of a gray image. The memory-bound inner loop gains
/// nothing from vector registers, so this always runs on the scalar backend
/// (with four interleaved sub-histograms to break dependency chains).
pub fn histogram(src: &[u8], src_stride: usize, width: usize, height: usize) -> [u32; 256] {
    check_plane(src, src_stride, width, height);
    base::histogram(src, src_stride, width, height)
}

/// Sum of absolute differences between two gray images of equal geometry.
pub fn abs_difference_sum(
    a: &[u8],
    a_stride: usize,
    b: &[u8],
    b_stride: usize,
    width: usize,
    height: usize,
) -> u64 {
    abs_difference_sum_with(features(), a, a_stride, b, b_stride, width, height)
}

/// [`abs_difference_sum`] with an explicit feature set.
pub fn abs_difference_sum_with(
    features: &FeatureSet,
    a: &[u8],
    a_stride: usize,
    b: &[u8],
    b_stride: usize,
    width: usize,
    height: usize,
) -> u64 {
    check_plane(a, a_stride, width, height);
    check_plane(b, b_stride, width, height);

    #[cfg(avx2)]
    if features.avx2 && width >= 32 {
        return kernels::abs_difference_sum::<avx2::U8x32>(a, a_stride, b, b_stride, width, height);
    }
    #[cfg(sse41)]
    if features.sse41 && width >= 16 {
        return kernels::abs_difference_sum::<sse41::U8x16>(a, a_stride, b, b_stride, width, height);
    }
    #[cfg(neon)]
    if features.neon && width >= 16 {
        return kernels::abs_difference_sum::<neon::U8x16>(a, a_stride, b, b_stride, width, height);
    }
    base::abs_difference_sum(a, a_stride, b, b_stride, width, height)
}

/// Applies the rough sigmoid approximation to `src * slope` elementwise.
/// The approximation is within 2.3e-3 of the exact logistic function.
pub fn neural_rough_sigmoid(src: &[f32], slope: f32, dst: &mut [f32]) {
    neural_rough_sigmoid_with(features(), src, slope, dst)
}

/// [`neural_rough_sigmoid`] with an explicit feature set.
pub fn neural_rough_sigmoid_with(features: &FeatureSet, src: &[f32], slope: f32, dst: &mut [f32]) {
    assert_eq!(src.len(), dst.len(), "length mismatch");

    #[cfg(avx2)]
    if features.avx2 && src.len() >= 8 {
        return kernels::neural_rough_sigmoid::<avx2::F32x8>(src, slope, dst);
    }
    #[cfg(sse41)]
    if features.sse41 && src.len() >= 4 {
        return kernels::neural_rough_sigmoid::<sse41::F32x4>(src, slope, dst);
    }
    #[cfg(neon)]
    if features.neon && src.len() >= 4 {
        return kernels::neural_rough_sigmoid::<neon::F32x4>(src, slope, dst);
    }
    base::neural_rough_sigmoid(src, slope, dst)
}
