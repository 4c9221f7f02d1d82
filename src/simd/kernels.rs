//! Vector kernels, written once against [`PixelVec`] / [`SimdF32`] and
//! monomorphized per backend.
//!
//! Each operation follows the same loop shape: an aligned body of whole
//! registers, then one masked partial step for the ragged tail, so every
//! pixel goes through the same arithmetic and the vector output matches the
//! scalar backend bit for bit. The `ALIGN` const parameter builds an aligned
//! and an unaligned variant of each body; the safe entry points below pick
//! one after probing the buffer pointers and strides.
//!
//! Strides are in elements and may exceed the row width; nothing here reads
//! or writes past `width` elements of any row.

use crate::simd::base::math::*;
use crate::simd::traits::{CompareOp, PixelVec, SimdF32, SimdVec};
use crate::simd::utils::{align_lo, AlignedBuffer};

/// Loads `size` bytes, switching to a full register load when the tail
/// happens to fill one exactly.
#[inline(always)]
unsafe fn load_up_to<V: PixelVec>(ptr: *const u8, size: usize) -> V {
    debug_assert!(size <= V::LANES);
    if size == V::LANES {
        V::load_unaligned(ptr)
    } else if size == 0 {
        V::zero()
    } else {
        V::load_partial(ptr, size)
    }
}

#[inline(always)]
unsafe fn store_up_to<V: PixelVec>(vec: V, ptr: *mut u8, size: usize) {
    debug_assert!(size <= V::LANES);
    if size == V::LANES {
        vec.store_unaligned(ptr);
    } else if size > 0 {
        vec.store_partial(ptr, size);
    }
}

#[inline(always)]
fn rows_aligned<V: SimdVec<u8>>(ptr: *const u8, stride: usize) -> bool {
    V::is_aligned(ptr) && stride % V::ALIGNMENT == 0
}

/// `(even + odd + even + odd + 2) >> 2` over a vertical register pair:
/// the rounding 2x2 average, one u16 lane per destination pixel.
#[inline(always)]
unsafe fn average_2x2_u16<V: PixelVec>(row0: V, row1: V, two: V) -> V {
    row0.even_u16()
        .add_u16(row0.odd_u16())
        .add_u16(row1.even_u16().add_u16(row1.odd_u16()))
        .add_u16(two)
        .shr_u16::<2>()
}

unsafe fn reduce_gray_2x2_body<V: PixelVec, const ALIGN: bool>(
    src: *const u8,
    src_width: usize,
    src_height: usize,
    src_stride: usize,
    dst: *mut u8,
    dst_width: usize,
    dst_stride: usize,
) {
    debug_assert!(src_width >= 2 * V::LANES);
    let even_width = align_lo(src_width, 2);
    let body = align_lo(even_width / 2, V::LANES);
    let two = V::splat_u16(2);

    for src_row in (0..src_height).step_by(2) {
        let s0 = src.add(src_row * src_stride);
        let s1 = if src_row + 1 < src_height {
            s0.add(src_stride)
        } else {
            s0
        };
        let d = dst.add((src_row / 2) * dst_stride);

        let mut dst_col = 0;
        let mut src_col = 0;
        while dst_col < body {
            let lo = average_2x2_u16(
                V::load::<ALIGN>(s0.add(src_col)),
                V::load::<ALIGN>(s1.add(src_col)),
                two,
            );
            let hi = average_2x2_u16(
                V::load::<ALIGN>(s0.add(src_col + V::LANES)),
                V::load::<ALIGN>(s1.add(src_col + V::LANES)),
                two,
            );
            V::pack_u16_u8(lo, hi).store::<ALIGN>(d.add(dst_col));
            dst_col += V::LANES;
            src_col += 2 * V::LANES;
        }

        let rem = even_width / 2 - body;
        if rem > 0 {
            // Up to 2 * LANES - 2 source bytes remain; zero-padded lanes are
            // discarded by the partial store.
            let n0 = (2 * rem).min(V::LANES);
            let n1 = 2 * rem - n0;
            let lo = average_2x2_u16(
                load_up_to::<V>(s0.add(src_col), n0),
                load_up_to::<V>(s1.add(src_col), n0),
                two,
            );
            let hi = if n1 > 0 {
                average_2x2_u16(
                    load_up_to::<V>(s0.add(src_col + V::LANES), n1),
                    load_up_to::<V>(s1.add(src_col + V::LANES), n1),
                    two,
                )
            } else {
                V::zero()
            };
            V::pack_u16_u8(lo, hi).store_partial(d.add(dst_col), rem);
        }

        if even_width != src_width {
            *d.add(dst_width - 1) = average2(*s0.add(even_width), *s1.add(even_width));
        }
    }
}

pub(crate) fn reduce_gray_2x2<V: PixelVec>(
    src: &[u8],
    src_width: usize,
    src_height: usize,
    src_stride: usize,
    dst: &mut [u8],
    dst_width: usize,
    dst_height: usize,
    dst_stride: usize,
) {
    assert!(src.len() >= (src_height - 1) * src_stride + src_width);
    assert!(dst.len() >= (dst_height - 1) * dst_stride + dst_width);
    let aligned = rows_aligned::<V>(src.as_ptr(), src_stride)
        && rows_aligned::<V>(dst.as_ptr(), dst_stride);
    unsafe {
        if aligned {
            reduce_gray_2x2_body::<V, true>(
                src.as_ptr(),
                src_width,
                src_height,
                src_stride,
                dst.as_mut_ptr(),
                dst_width,
                dst_stride,
            );
        } else {
            reduce_gray_2x2_body::<V, false>(
                src.as_ptr(),
                src_width,
                src_height,
                src_stride,
                dst.as_mut_ptr(),
                dst_width,
                dst_stride,
            );
        }
    }
}

/// Horizontal 1-2-1 pass of one row into u16 sums, edges replicated.
unsafe fn blur_row_u16<V: PixelVec>(src: *const u8, size: usize, channels: usize, dst: *mut u16) {
    for x in 0..channels {
        let right = if x + channels < size { x + channels } else { x };
        *dst.add(x) = *src.add(x) as u16 * 3 + *src.add(right) as u16;
    }

    let body_end = size - channels;
    let mut x = channels;
    while x + V::LANES <= body_end {
        let left = V::load_unaligned(src.add(x - channels));
        let mid = V::load_unaligned(src.add(x));
        let right = V::load_unaligned(src.add(x + channels));
        let lo = left
            .widen_lo_u16()
            .add_u16(mid.widen_lo_u16().shl_u16::<1>())
            .add_u16(right.widen_lo_u16());
        let hi = left
            .widen_hi_u16()
            .add_u16(mid.widen_hi_u16().shl_u16::<1>())
            .add_u16(right.widen_hi_u16());
        // The register holds LANES / 2 u16 sums; two stores cover LANES
        // source pixels.
        lo.store_unaligned(dst.add(x) as *mut u8);
        hi.store_unaligned(dst.add(x + V::LANES / 2) as *mut u8);
        x += V::LANES;
    }
    while x < body_end {
        *dst.add(x) =
            *src.add(x - channels) as u16 + 2 * *src.add(x) as u16 + *src.add(x + channels) as u16;
        x += 1;
    }

    for x in body_end.max(channels)..size {
        let left = x - channels;
        *dst.add(x) = *src.add(left) as u16 + *src.add(x) as u16 * 3;
    }
}

/// Vertical 1-2-1 pass over three horizontally filtered rows, with the
/// rounding division by 16 and the u8 pack.
unsafe fn blur_vertical<V: PixelVec, const ALIGN: bool>(
    top: *const u16,
    mid: *const u16,
    bottom: *const u16,
    size: usize,
    dst: *mut u8,
) {
    let eight = V::splat_u16(8);

    #[inline(always)]
    unsafe fn column_sum<V: PixelVec>(
        top: *const u16,
        mid: *const u16,
        bottom: *const u16,
        x: usize,
        eight: V,
    ) -> V {
        let t = V::load_aligned(top.add(x) as *const u8);
        let m = V::load_aligned(mid.add(x) as *const u8);
        let b = V::load_aligned(bottom.add(x) as *const u8);
        t.add_u16(m.shl_u16::<1>())
            .add_u16(b)
            .add_u16(eight)
            .shr_u16::<4>()
    }

    let mut x = 0;
    // Scratch rows are allocated at register alignment, so both element
    // offsets land on aligned addresses.
    while x + V::LANES <= size {
        let lo = column_sum::<V>(top, mid, bottom, x, eight);
        let hi = column_sum::<V>(top, mid, bottom, x + V::LANES / 2, eight);
        V::pack_u16_u8(lo, hi).store::<ALIGN>(dst.add(x));
        x += V::LANES;
    }
    while x < size {
        let sum = *top.add(x) + 2 * *mid.add(x) + *bottom.add(x);
        *dst.add(x) = divide_by_16(sum) as u8;
        x += 1;
    }
}

unsafe fn gaussian_blur_3x3_body<V: PixelVec, const ALIGN: bool>(
    src: *const u8,
    src_stride: usize,
    size: usize,
    height: usize,
    channels: usize,
    dst: *mut u8,
    dst_stride: usize,
) {
    debug_assert!(size >= 2 * V::LANES);
    let mut top = AlignedBuffer::<u16>::new_zeroed(size, V::ALIGNMENT);
    let mut mid = AlignedBuffer::<u16>::new_zeroed(size, V::ALIGNMENT);
    let mut bottom = AlignedBuffer::<u16>::new_zeroed(size, V::ALIGNMENT);

    // The first row is its own top neighbor; the last is its own bottom.
    blur_row_u16::<V>(src, size, channels, mid.as_mut_ptr());
    top.copy_from_slice(&mid);

    for row in 0..height {
        if row + 1 < height {
            blur_row_u16::<V>(src.add((row + 1) * src_stride), size, channels, bottom.as_mut_ptr());
        } else {
            bottom.copy_from_slice(&mid);
        }
        blur_vertical::<V, ALIGN>(
            top.as_ptr(),
            mid.as_ptr(),
            bottom.as_ptr(),
            size,
            dst.add(row * dst_stride),
        );
        std::mem::swap(&mut top, &mut mid);
        std::mem::swap(&mut mid, &mut bottom);
    }
}

pub(crate) fn gaussian_blur_3x3<V: PixelVec>(
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    channels: usize,
    dst: &mut [u8],
    dst_stride: usize,
) {
    let size = width * channels;
    assert!(src.len() >= (height - 1) * src_stride + size);
    assert!(dst.len() >= (height - 1) * dst_stride + size);
    // Source rows are read unaligned regardless (the taps sit at +-channels),
    // so only the destination picks the aligned store path.
    let aligned = rows_aligned::<V>(dst.as_ptr(), dst_stride);
    unsafe {
        if aligned {
            gaussian_blur_3x3_body::<V, true>(
                src.as_ptr(),
                src_stride,
                size,
                height,
                channels,
                dst.as_mut_ptr(),
                dst_stride,
            );
        } else {
            gaussian_blur_3x3_body::<V, false>(
                src.as_ptr(),
                src_stride,
                size,
                height,
                channels,
                dst.as_mut_ptr(),
                dst_stride,
            );
        }
    }
}

/// Weighted sum of three u16-lane channel registers in i32 precision:
/// `((wb*b + wg*g + wr*r + round) >> SHIFT) + adjust`, packed back to u16
/// lanes with unsigned saturation.
#[inline(always)]
unsafe fn weighted_u16<V: PixelVec, const SHIFT: i32>(
    b: V,
    g: V,
    r: V,
    weights: (V, V, V),
    round: V,
    adjust: V,
) -> V {
    #[inline(always)]
    unsafe fn quarter<V: PixelVec, const SHIFT: i32>(
        b: V,
        g: V,
        r: V,
        weights: (V, V, V),
        round: V,
        adjust: V,
    ) -> V {
        b.mul_i32(weights.0)
            .add_i32(g.mul_i32(weights.1))
            .add_i32(r.mul_i32(weights.2))
            .add_i32(round)
            .shr_i32::<SHIFT>()
            .add_i32(adjust)
    }

    let lo = quarter::<V, SHIFT>(
        b.widen_lo_i32(),
        g.widen_lo_i32(),
        r.widen_lo_i32(),
        weights,
        round,
        adjust,
    );
    let hi = quarter::<V, SHIFT>(
        b.widen_hi_i32(),
        g.widen_hi_i32(),
        r.widen_hi_i32(),
        weights,
        round,
        adjust,
    );
    V::pack_i32_u16(lo, hi)
}

/// Full-register weighted sum of three byte channel registers.
#[inline(always)]
unsafe fn weighted_u8<V: PixelVec, const SHIFT: i32>(
    b: V,
    g: V,
    r: V,
    weights: (V, V, V),
    round: V,
    adjust: V,
) -> V {
    let lo = weighted_u16::<V, SHIFT>(
        b.widen_lo_u16(),
        g.widen_lo_u16(),
        r.widen_lo_u16(),
        weights,
        round,
        adjust,
    );
    let hi = weighted_u16::<V, SHIFT>(
        b.widen_hi_u16(),
        g.widen_hi_u16(),
        r.widen_hi_u16(),
        weights,
        round,
        adjust,
    );
    V::pack_u16_u8(lo, hi)
}

unsafe fn bgr_to_gray_body<V: PixelVec, const ALIGN: bool>(
    bgr: *const u8,
    bgr_stride: usize,
    width: usize,
    height: usize,
    gray: *mut u8,
    gray_stride: usize,
) {
    debug_assert!(width >= V::LANES);
    let body = align_lo(width, V::LANES);
    let weights = (
        V::splat_i32(BLUE_TO_GRAY),
        V::splat_i32(GREEN_TO_GRAY),
        V::splat_i32(RED_TO_GRAY),
    );
    let round = V::splat_i32(BGR_TO_GRAY_ROUND);
    let zero_adjust = V::splat_i32(0);

    for row in 0..height {
        let s = bgr.add(row * bgr_stride);
        let d = gray.add(row * gray_stride);

        let mut col = 0;
        while col < body {
            let (b, g, r) = V::load_bgr(s.add(3 * col));
            weighted_u8::<V, BGR_TO_GRAY_SHIFT>(b, g, r, weights, round, zero_adjust)
                .store::<ALIGN>(d.add(col));
            col += V::LANES;
        }
        if col < width {
            let rem = width - col;
            let (b, g, r) = V::load_bgr_partial(s.add(3 * col), rem);
            weighted_u8::<V, BGR_TO_GRAY_SHIFT>(b, g, r, weights, round, zero_adjust)
                .store_partial(d.add(col), rem);
        }
    }
}

pub(crate) fn bgr_to_gray<V: PixelVec>(
    bgr: &[u8],
    bgr_stride: usize,
    width: usize,
    height: usize,
    gray: &mut [u8],
    gray_stride: usize,
) {
    assert!(bgr.len() >= (height - 1) * bgr_stride + 3 * width);
    assert!(gray.len() >= (height - 1) * gray_stride + width);
    let aligned = rows_aligned::<V>(gray.as_ptr(), gray_stride);
    unsafe {
        if aligned {
            bgr_to_gray_body::<V, true>(
                bgr.as_ptr(),
                bgr_stride,
                width,
                height,
                gray.as_mut_ptr(),
                gray_stride,
            );
        } else {
            bgr_to_gray_body::<V, false>(
                bgr.as_ptr(),
                bgr_stride,
                width,
                height,
                gray.as_mut_ptr(),
                gray_stride,
            );
        }
    }
}

struct YuvWeights<V> {
    y: (V, V, V),
    u: (V, V, V),
    v: (V, V, V),
    round: V,
    y_adjust: V,
    uv_adjust: V,
}

impl<V: PixelVec> YuvWeights<V> {
    #[inline(always)]
    unsafe fn new() -> Self {
        YuvWeights {
            y: (
                V::splat_i32(BLUE_TO_Y),
                V::splat_i32(GREEN_TO_Y),
                V::splat_i32(RED_TO_Y),
            ),
            u: (
                V::splat_i32(BLUE_TO_U),
                V::splat_i32(GREEN_TO_U),
                V::splat_i32(RED_TO_U),
            ),
            v: (
                V::splat_i32(BLUE_TO_V),
                V::splat_i32(GREEN_TO_V),
                V::splat_i32(RED_TO_V),
            ),
            round: V::splat_i32(BGR_TO_YUV_ROUND),
            y_adjust: V::splat_i32(Y_ADJUST),
            uv_adjust: V::splat_i32(UV_ADJUST),
        }
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn bgr_to_yuv420p_body<V: PixelVec, const ALIGN: bool>(
    bgr: *const u8,
    bgr_stride: usize,
    width: usize,
    height: usize,
    y: *mut u8,
    y_stride: usize,
    u: *mut u8,
    u_stride: usize,
    v: *mut u8,
    v_stride: usize,
) {
    debug_assert!(width >= V::LANES && width % 2 == 0 && height % 2 == 0);
    let w = YuvWeights::<V>::new();
    let two = V::splat_u16(2);

    for row in (0..height).step_by(2) {
        let s0 = bgr.add(row * bgr_stride);
        let s1 = s0.add(bgr_stride);
        let y0 = y.add(row * y_stride);
        let y1 = y0.add(y_stride);
        let ur = u.add((row / 2) * u_stride);
        let vr = v.add((row / 2) * v_stride);

        let mut col = 0;
        while col < width {
            let pixels = (width - col).min(V::LANES);
            let partial = pixels < V::LANES;

            let (b0, g0, r0) = if partial {
                V::load_bgr_partial(s0.add(3 * col), pixels)
            } else {
                V::load_bgr(s0.add(3 * col))
            };
            let (b1, g1, r1) = if partial {
                V::load_bgr_partial(s1.add(3 * col), pixels)
            } else {
                V::load_bgr(s1.add(3 * col))
            };

            let luma0 = weighted_u8::<V, BGR_TO_YUV_SHIFT>(b0, g0, r0, w.y, w.round, w.y_adjust);
            let luma1 = weighted_u8::<V, BGR_TO_YUV_SHIFT>(b1, g1, r1, w.y, w.round, w.y_adjust);
            if partial {
                luma0.store_partial(y0.add(col), pixels);
                luma1.store_partial(y1.add(col), pixels);
            } else {
                luma0.store::<ALIGN>(y0.add(col));
                luma1.store::<ALIGN>(y1.add(col));
            }

            // Chroma from the rounding-averaged 2x2 block channels, one u16
            // lane per chroma sample.
            let ba = average_2x2_u16(b0, b1, two);
            let ga = average_2x2_u16(g0, g1, two);
            let ra = average_2x2_u16(r0, r1, two);
            let cu = weighted_u16::<V, BGR_TO_YUV_SHIFT>(ba, ga, ra, w.u, w.round, w.uv_adjust);
            let cv = weighted_u16::<V, BGR_TO_YUV_SHIFT>(ba, ga, ra, w.v, w.round, w.uv_adjust);
            V::pack_u16_u8(cu, cu).store_partial(ur.add(col / 2), pixels / 2);
            V::pack_u16_u8(cv, cv).store_partial(vr.add(col / 2), pixels / 2);

            col += pixels;
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn bgr_to_yuv420p<V: PixelVec>(
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
    assert!(bgr.len() >= (height - 1) * bgr_stride + 3 * width);
    assert!(y.len() >= (height - 1) * y_stride + width);
    assert!(u.len() >= (height / 2 - 1) * u_stride + width / 2);
    assert!(v.len() >= (height / 2 - 1) * v_stride + width / 2);
    let aligned = rows_aligned::<V>(y.as_ptr(), y_stride);
    unsafe {
        if aligned {
            bgr_to_yuv420p_body::<V, true>(
                bgr.as_ptr(),
                bgr_stride,
                width,
                height,
                y.as_mut_ptr(),
                y_stride,
                u.as_mut_ptr(),
                u_stride,
                v.as_mut_ptr(),
                v_stride,
            );
        } else {
            bgr_to_yuv420p_body::<V, false>(
                bgr.as_ptr(),
                bgr_stride,
                width,
                height,
                y.as_mut_ptr(),
                y_stride,
                u.as_mut_ptr(),
                u_stride,
                v.as_mut_ptr(),
                v_stride,
            );
        }
    }
}

unsafe fn deinterleave_uv_body<V: PixelVec, const ALIGN: bool>(
    uv: *const u8,
    uv_stride: usize,
    width: usize,
    height: usize,
    u: *mut u8,
    u_stride: usize,
    v: *mut u8,
    v_stride: usize,
) {
    debug_assert!(width >= V::LANES);
    let body = align_lo(width, V::LANES);

    for row in 0..height {
        let s = uv.add(row * uv_stride);
        let ur = u.add(row * u_stride);
        let vr = v.add(row * v_stride);

        let mut col = 0;
        while col < body {
            let a = V::load::<ALIGN>(s.add(2 * col));
            let b = V::load::<ALIGN>(s.add(2 * col + V::LANES));
            V::pack_u16_u8(a.even_u16(), b.even_u16()).store::<ALIGN>(ur.add(col));
            V::pack_u16_u8(a.odd_u16(), b.odd_u16()).store::<ALIGN>(vr.add(col));
            col += V::LANES;
        }
        if col < width {
            let rem = width - col;
            let n0 = (2 * rem).min(V::LANES);
            let n1 = 2 * rem - n0;
            let a = load_up_to::<V>(s.add(2 * col), n0);
            let b = if n1 > 0 {
                load_up_to::<V>(s.add(2 * col + V::LANES), n1)
            } else {
                V::zero()
            };
            V::pack_u16_u8(a.even_u16(), b.even_u16()).store_partial(ur.add(col), rem);
            V::pack_u16_u8(a.odd_u16(), b.odd_u16()).store_partial(vr.add(col), rem);
        }
    }
}

pub(crate) fn deinterleave_uv<V: PixelVec>(
    uv: &[u8],
    uv_stride: usize,
    width: usize,
    height: usize,
    u: &mut [u8],
    u_stride: usize,
    v: &mut [u8],
    v_stride: usize,
) {
    assert!(uv.len() >= (height - 1) * uv_stride + 2 * width);
    assert!(u.len() >= (height - 1) * u_stride + width);
    assert!(v.len() >= (height - 1) * v_stride + width);
    let aligned = rows_aligned::<V>(uv.as_ptr(), uv_stride)
        && rows_aligned::<V>(u.as_ptr(), u_stride)
        && rows_aligned::<V>(v.as_ptr(), v_stride);
    unsafe {
        if aligned {
            deinterleave_uv_body::<V, true>(
                uv.as_ptr(),
                uv_stride,
                width,
                height,
                u.as_mut_ptr(),
                u_stride,
                v.as_mut_ptr(),
                v_stride,
            );
        } else {
            deinterleave_uv_body::<V, false>(
                uv.as_ptr(),
                uv_stride,
                width,
                height,
                u.as_mut_ptr(),
                u_stride,
                v.as_mut_ptr(),
                v_stride,
            );
        }
    }
}

unsafe fn interleave_uv_body<V: PixelVec, const ALIGN: bool>(
    u: *const u8,
    u_stride: usize,
    v: *const u8,
    v_stride: usize,
    width: usize,
    height: usize,
    uv: *mut u8,
    uv_stride: usize,
) {
    debug_assert!(width >= V::LANES);
    let body = align_lo(width, V::LANES);

    for row in 0..height {
        let ur = u.add(row * u_stride);
        let vr = v.add(row * v_stride);
        let d = uv.add(row * uv_stride);

        let mut col = 0;
        while col < body {
            let (lo, hi) = V::load::<ALIGN>(ur.add(col)).zip(V::load::<ALIGN>(vr.add(col)));
            lo.store::<ALIGN>(d.add(2 * col));
            hi.store::<ALIGN>(d.add(2 * col + V::LANES));
            col += V::LANES;
        }
        if col < width {
            let rem = width - col;
            let (lo, hi) =
                V::load_partial(ur.add(col), rem).zip(V::load_partial(vr.add(col), rem));
            let n0 = (2 * rem).min(V::LANES);
            store_up_to::<V>(lo, d.add(2 * col), n0);
            if 2 * rem > n0 {
                store_up_to::<V>(hi, d.add(2 * col + V::LANES), 2 * rem - n0);
            }
        }
    }
}

pub(crate) fn interleave_uv<V: PixelVec>(
    u: &[u8],
    u_stride: usize,
    v: &[u8],
    v_stride: usize,
    width: usize,
    height: usize,
    uv: &mut [u8],
    uv_stride: usize,
) {
    assert!(u.len() >= (height - 1) * u_stride + width);
    assert!(v.len() >= (height - 1) * v_stride + width);
    assert!(uv.len() >= (height - 1) * uv_stride + 2 * width);
    let aligned = rows_aligned::<V>(u.as_ptr(), u_stride)
        && rows_aligned::<V>(v.as_ptr(), v_stride)
        && rows_aligned::<V>(uv.as_ptr(), uv_stride);
    unsafe {
        if aligned {
            interleave_uv_body::<V, true>(
                u.as_ptr(),
                u_stride,
                v.as_ptr(),
                v_stride,
                width,
                height,
                uv.as_mut_ptr(),
                uv_stride,
            );
        } else {
            interleave_uv_body::<V, false>(
                u.as_ptr(),
                u_stride,
                v.as_ptr(),
                v_stride,
                width,
                height,
                uv.as_mut_ptr(),
                uv_stride,
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn binarization_body<C: CompareOp, V: PixelVec, const ALIGN: bool>(
    src: *const u8,
    src_stride: usize,
    width: usize,
    height: usize,
    value: u8,
    positive: u8,
    negative: u8,
    dst: *mut u8,
    dst_stride: usize,
) {
    debug_assert!(width >= V::LANES);
    let body = align_lo(width, V::LANES);
    let value_v = V::splat(value);
    let positive_v = V::splat(positive);
    let negative_v = V::splat(negative);

    for row in 0..height {
        let s = src.add(row * src_stride);
        let d = dst.add(row * dst_stride);

        let mut col = 0;
        while col < body {
            let mask = C::vector(V::load::<ALIGN>(s.add(col)), value_v);
            V::blend(mask, positive_v, negative_v).store::<ALIGN>(d.add(col));
            col += V::LANES;
        }
        if col < width {
            let rem = width - col;
            let mask = C::vector(V::load_partial(s.add(col), rem), value_v);
            V::blend(mask, positive_v, negative_v).store_partial(d.add(col), rem);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn binarization<C: CompareOp, V: PixelVec>(
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
    assert!(src.len() >= (height - 1) * src_stride + width);
    assert!(dst.len() >= (height - 1) * dst_stride + width);
    let aligned = rows_aligned::<V>(src.as_ptr(), src_stride)
        && rows_aligned::<V>(dst.as_ptr(), dst_stride);
    unsafe {
        if aligned {
            binarization_body::<C, V, true>(
                src.as_ptr(),
                src_stride,
                width,
                height,
                value,
                positive,
                negative,
                dst.as_mut_ptr(),
                dst_stride,
            );
        } else {
            binarization_body::<C, V, false>(
                src.as_ptr(),
                src_stride,
                width,
                height,
                value,
                positive,
                negative,
                dst.as_mut_ptr(),
                dst_stride,
            );
        }
    }
}

unsafe fn get_statistic_body<V: PixelVec, const ALIGN: bool>(
    src: *const u8,
    src_stride: usize,
    width: usize,
    height: usize,
) -> (u8, u8, u8) {
    debug_assert!(width >= V::LANES);
    let body = align_lo(width, V::LANES);
    let zero = V::zero();
    let mut vmin = V::ones();
    let mut vmax = V::zero();
    let mut min = u8::MAX;
    let mut max = 0u8;
    let mut sum = 0u64;

    for row in 0..height {
        let s = src.add(row * src_stride);
        // One SAD accumulator per row keeps the per-lane partial sums small
        // on every backend.
        let mut acc = V::zero();
        let mut col = 0;
        while col < body {
            let v = V::load::<ALIGN>(s.add(col));
            vmin = vmin.min_u8(v);
            vmax = vmax.max_u8(v);
            acc = v.sad_accum(zero, acc);
            col += V::LANES;
        }
        sum += V::sad_reduce(acc);
        while col < width {
            let value = *s.add(col);
            min = min.min(value);
            max = max.max(value);
            sum += value as u64;
            col += 1;
        }
    }

    min = min.min(V::min_reduce_u8(vmin));
    max = max.max(V::max_reduce_u8(vmax));
    let count = (width * height) as u64;
    let average = ((sum + count / 2) / count) as u8;
    (min, max, average)
}

pub(crate) fn get_statistic<V: PixelVec>(
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
) -> (u8, u8, u8) {
    assert!(src.len() >= (height - 1) * src_stride + width);
    unsafe {
        if rows_aligned::<V>(src.as_ptr(), src_stride) {
            get_statistic_body::<V, true>(src.as_ptr(), src_stride, width, height)
        } else {
            get_statistic_body::<V, false>(src.as_ptr(), src_stride, width, height)
        }
    }
}

unsafe fn abs_difference_sum_body<V: PixelVec, const ALIGN: bool>(
    a: *const u8,
    a_stride: usize,
    b: *const u8,
    b_stride: usize,
    width: usize,
    height: usize,
) -> u64 {
    debug_assert!(width >= V::LANES);
    let body = align_lo(width, V::LANES);
    let mut sum = 0u64;

    for row in 0..height {
        let ra = a.add(row * a_stride);
        let rb = b.add(row * b_stride);
        let mut acc = V::zero();
        let mut col = 0;
        while col < body {
            acc = V::load::<ALIGN>(ra.add(col)).sad_accum(V::load::<ALIGN>(rb.add(col)), acc);
            col += V::LANES;
        }
        sum += V::sad_reduce(acc);
        while col < width {
            sum += (*ra.add(col)).abs_diff(*rb.add(col)) as u64;
            col += 1;
        }
    }
    sum
}

pub(crate) fn abs_difference_sum<V: PixelVec>(
    a: &[u8],
    a_stride: usize,
    b: &[u8],
    b_stride: usize,
    width: usize,
    height: usize,
) -> u64 {
    assert!(a.len() >= (height - 1) * a_stride + width);
    assert!(b.len() >= (height - 1) * b_stride + width);
    let aligned =
        rows_aligned::<V>(a.as_ptr(), a_stride) && rows_aligned::<V>(b.as_ptr(), b_stride);
    unsafe {
        if aligned {
            abs_difference_sum_body::<V, true>(a.as_ptr(), a_stride, b.as_ptr(), b_stride, width, height)
        } else {
            abs_difference_sum_body::<V, false>(a.as_ptr(), a_stride, b.as_ptr(), b_stride, width, height)
        }
    }
}

unsafe fn neural_rough_sigmoid_body<V: SimdF32, const ALIGN: bool>(
    src: *const f32,
    size: usize,
    slope: f32,
    dst: *mut f32,
) {
    debug_assert!(size >= V::LANES);
    let body = align_lo(size, V::LANES);
    let slope_v = V::splat(slope);
    let one = V::splat(1.0);
    let a1 = V::splat(0.5417);
    let a2 = V::splat(0.1460);

    #[inline(always)]
    unsafe fn sigmoid<V: SimdF32>(value: V, one: V, a1: V, a2: V) -> V {
        // Same operation order as the scalar rough_sigmoid, so the results
        // match bitwise.
        let x = value.abs();
        let x2 = x * x;
        let e = one + x + x2 * a1 + x2 * x2 * a2;
        let exp = V::select_gt_zero(value, one / e, e);
        one / (one + exp)
    }

    let mut i = 0;
    while i < body {
        let value = V::load::<ALIGN>(src.add(i)) * slope_v;
        sigmoid(value, one, a1, a2).store::<ALIGN>(dst.add(i));
        i += V::LANES;
    }
    if i < size {
        let rem = size - i;
        let value = V::load_partial(src.add(i), rem) * slope_v;
        sigmoid(value, one, a1, a2).store_partial(dst.add(i), rem);
    }
}

pub(crate) fn neural_rough_sigmoid<V: SimdF32>(src: &[f32], slope: f32, dst: &mut [f32]) {
    assert_eq!(src.len(), dst.len());
    let aligned = V::is_aligned(src.as_ptr()) && V::is_aligned(dst.as_ptr());
    unsafe {
        if aligned {
            neural_rough_sigmoid_body::<V, true>(src.as_ptr(), src.len(), slope, dst.as_mut_ptr());
        } else {
            neural_rough_sigmoid_body::<V, false>(src.as_ptr(), src.len(), slope, dst.as_mut_ptr());
        }
    }
}
