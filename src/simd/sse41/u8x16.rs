//! SSE4.1 16-lane byte vector.
//!
//! `U8x16` wraps `__m128i` and implements the [`PixelVec`] surface the image
//! kernels are generic over. SSE4.1 is the baseline x86 tier: it is the
//! lowest extension level with the 32-bit lane multiply (`pmulld`) and the
//! `i32 -> u16` saturating pack (`packusdw`) the fixed-point color
//! conversions need, which is why the crate has no plain SSE2 backend.
//!
//! The 128-bit packs and unpacks already work in element order, so unlike
//! the AVX2 sibling no cross-lane fixups are required here.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::traits::{PixelVec, SimdVec};
use crate::simd::utils::bgr_shuffle;

/// 16 packed u8 lanes in one SSE register.
#[derive(Copy, Clone, Debug)]
pub struct U8x16(pub(crate) __m128i);

static B_SHUFFLE: [[u8; 16]; 3] = [bgr_shuffle(0, 0), bgr_shuffle(0, 1), bgr_shuffle(0, 2)];
static G_SHUFFLE: [[u8; 16]; 3] = [bgr_shuffle(1, 0), bgr_shuffle(1, 1), bgr_shuffle(1, 2)];
static R_SHUFFLE: [[u8; 16]; 3] = [bgr_shuffle(2, 0), bgr_shuffle(2, 1), bgr_shuffle(2, 2)];

#[inline(always)]
unsafe fn gather_channel(
    group0: __m128i,
    group1: __m128i,
    group2: __m128i,
    table: &[[u8; 16]; 3],
) -> __m128i {
    let m0 = _mm_loadu_si128(table[0].as_ptr() as *const __m128i);
    let m1 = _mm_loadu_si128(table[1].as_ptr() as *const __m128i);
    let m2 = _mm_loadu_si128(table[2].as_ptr() as *const __m128i);
    _mm_or_si128(
        _mm_or_si128(_mm_shuffle_epi8(group0, m0), _mm_shuffle_epi8(group1, m1)),
        _mm_shuffle_epi8(group2, m2),
    )
}

impl SimdVec<u8> for U8x16 {
    const LANES: usize = 16;
    const ALIGNMENT: usize = 16;

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        debug_assert!(Self::is_aligned(ptr));
        Self(_mm_load_si128(ptr as *const __m128i))
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        Self(_mm_loadu_si128(ptr as *const __m128i))
    }

    #[inline(always)]
    unsafe fn load_partial(ptr: *const u8, size: usize) -> Self {
        debug_assert!(size > 0 && size < Self::LANES);
        let mut staged = [0u8; 16];
        std::ptr::copy_nonoverlapping(ptr, staged.as_mut_ptr(), size);
        Self(_mm_loadu_si128(staged.as_ptr() as *const __m128i))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut u8) {
        debug_assert!(Self::is_aligned(ptr));
        _mm_store_si128(ptr as *mut __m128i, self.0)
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut u8) {
        _mm_storeu_si128(ptr as *mut __m128i, self.0)
    }

    #[inline(always)]
    unsafe fn store_partial(self, ptr: *mut u8, size: usize) {
        debug_assert!(size > 0 && size < Self::LANES);
        let mut staged = [0u8; 16];
        _mm_storeu_si128(staged.as_mut_ptr() as *mut __m128i, self.0);
        std::ptr::copy_nonoverlapping(staged.as_ptr(), ptr, size);
    }

    #[inline(always)]
    unsafe fn splat(value: u8) -> Self {
        Self(_mm_set1_epi8(value as i8))
    }
}

impl PixelVec for U8x16 {
    #[inline(always)]
    unsafe fn zero() -> Self {
        Self(_mm_setzero_si128())
    }

    #[inline(always)]
    unsafe fn ones() -> Self {
        Self(_mm_set1_epi8(-1))
    }

    #[inline(always)]
    unsafe fn andnot(self, other: Self) -> Self {
        Self(_mm_andnot_si128(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn min_u8(self, other: Self) -> Self {
        Self(_mm_min_epu8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn max_u8(self, other: Self) -> Self {
        Self(_mm_max_epu8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn cmp_eq_u8(self, other: Self) -> Self {
        Self(_mm_cmpeq_epi8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn blend(mask: Self, positive: Self, negative: Self) -> Self {
        Self(_mm_blendv_epi8(negative.0, positive.0, mask.0))
    }

    #[inline(always)]
    unsafe fn splat_u16(value: u16) -> Self {
        Self(_mm_set1_epi16(value as i16))
    }

    #[inline(always)]
    unsafe fn even_u16(self) -> Self {
        Self(_mm_and_si128(self.0, _mm_set1_epi16(0x00FF)))
    }

    #[inline(always)]
    unsafe fn odd_u16(self) -> Self {
        Self(_mm_srli_epi16::<8>(self.0))
    }

    #[inline(always)]
    unsafe fn widen_lo_u16(self) -> Self {
        Self(_mm_cvtepu8_epi16(self.0))
    }

    #[inline(always)]
    unsafe fn widen_hi_u16(self) -> Self {
        Self(_mm_cvtepu8_epi16(_mm_srli_si128::<8>(self.0)))
    }

    #[inline(always)]
    unsafe fn add_u16(self, other: Self) -> Self {
        Self(_mm_add_epi16(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn shl_u16<const N: i32>(self) -> Self {
        Self(_mm_slli_epi16::<N>(self.0))
    }

    #[inline(always)]
    unsafe fn shr_u16<const N: i32>(self) -> Self {
        Self(_mm_srli_epi16::<N>(self.0))
    }

    #[inline(always)]
    unsafe fn pack_u16_u8(lo: Self, hi: Self) -> Self {
        Self(_mm_packus_epi16(lo.0, hi.0))
    }

    #[inline(always)]
    unsafe fn splat_i32(value: i32) -> Self {
        Self(_mm_set1_epi32(value))
    }

    #[inline(always)]
    unsafe fn widen_lo_i32(self) -> Self {
        Self(_mm_cvtepu16_epi32(self.0))
    }

    #[inline(always)]
    unsafe fn widen_hi_i32(self) -> Self {
        Self(_mm_cvtepu16_epi32(_mm_srli_si128::<8>(self.0)))
    }

    #[inline(always)]
    unsafe fn add_i32(self, other: Self) -> Self {
        Self(_mm_add_epi32(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn mul_i32(self, other: Self) -> Self {
        Self(_mm_mullo_epi32(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn shr_i32<const N: i32>(self) -> Self {
        Self(_mm_srai_epi32::<N>(self.0))
    }

    #[inline(always)]
    unsafe fn pack_i32_u16(lo: Self, hi: Self) -> Self {
        Self(_mm_packus_epi32(lo.0, hi.0))
    }

    #[inline(always)]
    unsafe fn zip(self, other: Self) -> (Self, Self) {
        (
            Self(_mm_unpacklo_epi8(self.0, other.0)),
            Self(_mm_unpackhi_epi8(self.0, other.0)),
        )
    }

    #[inline(always)]
    unsafe fn load_bgr(ptr: *const u8) -> (Self, Self, Self) {
        let group0 = _mm_loadu_si128(ptr as *const __m128i);
        let group1 = _mm_loadu_si128(ptr.add(16) as *const __m128i);
        let group2 = _mm_loadu_si128(ptr.add(32) as *const __m128i);
        (
            Self(gather_channel(group0, group1, group2, &B_SHUFFLE)),
            Self(gather_channel(group0, group1, group2, &G_SHUFFLE)),
            Self(gather_channel(group0, group1, group2, &R_SHUFFLE)),
        )
    }

    #[inline(always)]
    unsafe fn load_bgr_partial(ptr: *const u8, pixels: usize) -> (Self, Self, Self) {
        debug_assert!(pixels > 0 && pixels < Self::LANES);
        let mut staged = [0u8; 48];
        std::ptr::copy_nonoverlapping(ptr, staged.as_mut_ptr(), 3 * pixels);
        Self::load_bgr(staged.as_ptr())
    }

    #[inline(always)]
    unsafe fn sad_accum(self, other: Self, acc: Self) -> Self {
        Self(_mm_add_epi64(acc.0, _mm_sad_epu8(self.0, other.0)))
    }

    #[inline(always)]
    unsafe fn sad_reduce(acc: Self) -> u64 {
        let mut lanes = [0u64; 2];
        _mm_storeu_si128(lanes.as_mut_ptr() as *mut __m128i, acc.0);
        lanes[0] + lanes[1]
    }

    #[inline(always)]
    unsafe fn min_reduce_u8(self) -> u8 {
        let mut bytes = [0u8; 16];
        _mm_storeu_si128(bytes.as_mut_ptr() as *mut __m128i, self.0);
        bytes.iter().fold(u8::MAX, |m, &b| m.min(b))
    }

    #[inline(always)]
    unsafe fn max_reduce_u8(self) -> u8 {
        let mut bytes = [0u8; 16];
        _mm_storeu_si128(bytes.as_mut_ptr() as *mut __m128i, self.0);
        bytes.iter().fold(0, |m, &b| m.max(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq() -> [u8; 16] {
        std::array::from_fn(|i| (i * 9 + 3) as u8)
    }

    unsafe fn to_array(v: U8x16) -> [u8; 16] {
        let mut out = [0u8; 16];
        v.store_unaligned(out.as_mut_ptr());
        out
    }

    #[test]
    fn unaligned_round_trip() {
        unsafe {
            let data = seq();
            let v = U8x16::load_unaligned(data.as_ptr());
            assert_eq!(to_array(v), data);
        }
    }

    #[test]
    fn partial_load_zero_fills_and_partial_store_preserves_tail() {
        unsafe {
            let data = seq();
            let v = U8x16::load_partial(data.as_ptr(), 5);
            let loaded = to_array(v);
            assert_eq!(&loaded[..5], &data[..5]);
            assert!(loaded[5..].iter().all(|&b| b == 0));

            let mut out = [0xAAu8; 16];
            v.store_partial(out.as_mut_ptr(), 5);
            assert_eq!(&out[..5], &data[..5]);
            assert!(out[5..].iter().all(|&b| b == 0xAA));
        }
    }

    #[test]
    fn even_odd_u16_split_bytes() {
        unsafe {
            let data = seq();
            let v = U8x16::load_unaligned(data.as_ptr());
            let even = to_array(v.even_u16());
            let odd = to_array(v.odd_u16());
            for lane in 0..8 {
                assert_eq!(even[2 * lane], data[2 * lane]);
                assert_eq!(even[2 * lane + 1], 0);
                assert_eq!(odd[2 * lane], data[2 * lane + 1]);
                assert_eq!(odd[2 * lane + 1], 0);
            }
        }
    }

    #[test]
    fn widen_then_pack_is_identity() {
        unsafe {
            let data = seq();
            let v = U8x16::load_unaligned(data.as_ptr());
            let packed = U8x16::pack_u16_u8(v.widen_lo_u16(), v.widen_hi_u16());
            assert_eq!(to_array(packed), data);
        }
    }

    #[test]
    fn pack_i32_u16_saturates_and_keeps_order() {
        unsafe {
            let lo = U8x16::splat_i32(-7);
            let hi = U8x16::splat_i32(70000);
            let packed = U8x16::pack_i32_u16(lo, hi);
            let bytes = to_array(packed);
            // first four u16 lanes clamp to 0, last four to 65535
            assert!(bytes[..8].iter().all(|&b| b == 0));
            assert!(bytes[8..].iter().all(|&b| b == 0xFF));
        }
    }

    #[test]
    fn zip_interleaves_in_store_order() {
        unsafe {
            let a: [u8; 16] = std::array::from_fn(|i| i as u8);
            let b: [u8; 16] = std::array::from_fn(|i| 100 + i as u8);
            let (lo, hi) = U8x16::load_unaligned(a.as_ptr()).zip(U8x16::load_unaligned(b.as_ptr()));
            let mut out = [0u8; 32];
            lo.store_unaligned(out.as_mut_ptr());
            hi.store_unaligned(out.as_mut_ptr().add(16));
            for i in 0..16 {
                assert_eq!(out[2 * i], a[i]);
                assert_eq!(out[2 * i + 1], b[i]);
            }
        }
    }

    #[test]
    fn load_bgr_deinterleaves_channels() {
        unsafe {
            let mut bgr = [0u8; 48];
            for pixel in 0..16 {
                bgr[3 * pixel] = pixel as u8;
                bgr[3 * pixel + 1] = 50 + pixel as u8;
                bgr[3 * pixel + 2] = 200 - pixel as u8;
            }
            let (b, g, r) = U8x16::load_bgr(bgr.as_ptr());
            for pixel in 0..16 {
                assert_eq!(to_array(b)[pixel], pixel as u8);
                assert_eq!(to_array(g)[pixel], 50 + pixel as u8);
                assert_eq!(to_array(r)[pixel], 200 - pixel as u8);
            }
        }
    }

    #[test]
    fn sad_and_minmax_reductions() {
        unsafe {
            let a: [u8; 16] = std::array::from_fn(|i| (i * 3) as u8);
            let b: [u8; 16] = std::array::from_fn(|i| (i * 5 + 1) as u8);
            let va = U8x16::load_unaligned(a.as_ptr());
            let vb = U8x16::load_unaligned(b.as_ptr());
            let expected: u64 = (0..16).map(|i| a[i].abs_diff(b[i]) as u64).sum();
            assert_eq!(U8x16::sad_reduce(va.sad_accum(vb, U8x16::zero())), expected);
            assert_eq!(va.min_reduce_u8(), 0);
            assert_eq!(va.max_reduce_u8(), 45);
        }
    }

    #[test]
    fn blend_selects_by_mask() {
        unsafe {
            let v = U8x16::load_unaligned(seq().as_ptr());
            let mask = v.cmp_eq_u8(U8x16::splat(3));
            let out = to_array(U8x16::blend(mask, U8x16::splat(0xFF), U8x16::splat(1)));
            assert_eq!(out[0], 0xFF); // lane 0 holds 3
            assert!(out[1..].iter().all(|&b| b == 1));
        }
    }
}
