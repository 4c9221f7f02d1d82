//! AVX2 32-lane byte vector.
//!
//! `U8x32` wraps `__m256i`. AVX2 integer packs, unpacks and widening moves
//! operate per 128-bit lane, which would scramble element order if used
//! naively; every method here that crosses lane boundaries carries the
//! `permute4x64` / `permute2x128` fixup needed to keep the whole-register
//! element order the [`PixelVec`] contract requires. The BGR deinterleave
//! runs as two independent 16-pixel halves, which sidesteps the lane
//! problem entirely.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::traits::{PixelVec, SimdVec};
use crate::simd::utils::bgr_shuffle;

/// 32 packed u8 lanes in one AVX2 register.
#[derive(Copy, Clone, Debug)]
pub struct U8x32(pub(crate) __m256i);

static B_SHUFFLE: [[u8; 16]; 3] = [bgr_shuffle(0, 0), bgr_shuffle(0, 1), bgr_shuffle(0, 2)];
static G_SHUFFLE: [[u8; 16]; 3] = [bgr_shuffle(1, 0), bgr_shuffle(1, 1), bgr_shuffle(1, 2)];
static R_SHUFFLE: [[u8; 16]; 3] = [bgr_shuffle(2, 0), bgr_shuffle(2, 1), bgr_shuffle(2, 2)];

/// Gathers one channel of 16 packed BGR pixels from three 16-byte groups.
#[inline(always)]
unsafe fn gather_channel_half(
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

/// Restores whole-register order after a per-lane pack: qwords (0,2,1,3).
#[inline(always)]
unsafe fn fix_pack_order(v: __m256i) -> __m256i {
    _mm256_permute4x64_epi64::<0b11_01_10_00>(v)
}

impl SimdVec<u8> for U8x32 {
    const LANES: usize = 32;
    const ALIGNMENT: usize = 32;

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        debug_assert!(Self::is_aligned(ptr));
        Self(_mm256_load_si256(ptr as *const __m256i))
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        Self(_mm256_loadu_si256(ptr as *const __m256i))
    }

    #[inline(always)]
    unsafe fn load_partial(ptr: *const u8, size: usize) -> Self {
        debug_assert!(size > 0 && size < Self::LANES);
        let mut staged = [0u8; 32];
        std::ptr::copy_nonoverlapping(ptr, staged.as_mut_ptr(), size);
        Self(_mm256_loadu_si256(staged.as_ptr() as *const __m256i))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut u8) {
        debug_assert!(Self::is_aligned(ptr));
        _mm256_store_si256(ptr as *mut __m256i, self.0)
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut u8) {
        _mm256_storeu_si256(ptr as *mut __m256i, self.0)
    }

    #[inline(always)]
    unsafe fn store_partial(self, ptr: *mut u8, size: usize) {
        debug_assert!(size > 0 && size < Self::LANES);
        let mut staged = [0u8; 32];
        _mm256_storeu_si256(staged.as_mut_ptr() as *mut __m256i, self.0);
        std::ptr::copy_nonoverlapping(staged.as_ptr(), ptr, size);
    }

    #[inline(always)]
    unsafe fn splat(value: u8) -> Self {
        Self(_mm256_set1_epi8(value as i8))
    }
}

impl PixelVec for U8x32 {
    #[inline(always)]
    unsafe fn zero() -> Self {
        Self(_mm256_setzero_si256())
    }

    #[inline(always)]
    unsafe fn ones() -> Self {
        Self(_mm256_set1_epi8(-1))
    }

    #[inline(always)]
    unsafe fn andnot(self, other: Self) -> Self {
        Self(_mm256_andnot_si256(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn min_u8(self, other: Self) -> Self {
        Self(_mm256_min_epu8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn max_u8(self, other: Self) -> Self {
        Self(_mm256_max_epu8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn cmp_eq_u8(self, other: Self) -> Self {
        Self(_mm256_cmpeq_epi8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn blend(mask: Self, positive: Self, negative: Self) -> Self {
        Self(_mm256_blendv_epi8(negative.0, positive.0, mask.0))
    }

    #[inline(always)]
    unsafe fn splat_u16(value: u16) -> Self {
        Self(_mm256_set1_epi16(value as i16))
    }

    #[inline(always)]
    unsafe fn even_u16(self) -> Self {
        Self(_mm256_and_si256(self.0, _mm256_set1_epi16(0x00FF)))
    }

    #[inline(always)]
    unsafe fn odd_u16(self) -> Self {
        Self(_mm256_srli_epi16::<8>(self.0))
    }

    #[inline(always)]
    unsafe fn widen_lo_u16(self) -> Self {
        Self(_mm256_cvtepu8_epi16(_mm256_castsi256_si128(self.0)))
    }

    #[inline(always)]
    unsafe fn widen_hi_u16(self) -> Self {
        Self(_mm256_cvtepu8_epi16(_mm256_extracti128_si256::<1>(self.0)))
    }

    #[inline(always)]
    unsafe fn add_u16(self, other: Self) -> Self {
        Self(_mm256_add_epi16(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn shl_u16<const N: i32>(self) -> Self {
        Self(_mm256_slli_epi16::<N>(self.0))
    }

    #[inline(always)]
    unsafe fn shr_u16<const N: i32>(self) -> Self {
        Self(_mm256_srli_epi16::<N>(self.0))
    }

    #[inline(always)]
    unsafe fn pack_u16_u8(lo: Self, hi: Self) -> Self {
        Self(fix_pack_order(_mm256_packus_epi16(lo.0, hi.0)))
    }

    #[inline(always)]
    unsafe fn splat_i32(value: i32) -> Self {
        Self(_mm256_set1_epi32(value))
    }

    #[inline(always)]
    unsafe fn widen_lo_i32(self) -> Self {
        Self(_mm256_cvtepu16_epi32(_mm256_castsi256_si128(self.0)))
    }

    #[inline(always)]
    unsafe fn widen_hi_i32(self) -> Self {
        Self(_mm256_cvtepu16_epi32(_mm256_extracti128_si256::<1>(self.0)))
    }

    #[inline(always)]
    unsafe fn add_i32(self, other: Self) -> Self {
        Self(_mm256_add_epi32(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn mul_i32(self, other: Self) -> Self {
        Self(_mm256_mullo_epi32(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn shr_i32<const N: i32>(self) -> Self {
        Self(_mm256_srai_epi32::<N>(self.0))
    }

    #[inline(always)]
    unsafe fn pack_i32_u16(lo: Self, hi: Self) -> Self {
        Self(fix_pack_order(_mm256_packus_epi32(lo.0, hi.0)))
    }

    #[inline(always)]
    unsafe fn zip(self, other: Self) -> (Self, Self) {
        let lo = _mm256_unpacklo_epi8(self.0, other.0);
        let hi = _mm256_unpackhi_epi8(self.0, other.0);
        // unpacklo/hi interleave per lane; regroup so pairs 0..15 come first.
        (
            Self(_mm256_permute2x128_si256::<0x20>(lo, hi)),
            Self(_mm256_permute2x128_si256::<0x31>(lo, hi)),
        )
    }

    #[inline(always)]
    unsafe fn load_bgr(ptr: *const u8) -> (Self, Self, Self) {
        let g0 = _mm_loadu_si128(ptr as *const __m128i);
        let g1 = _mm_loadu_si128(ptr.add(16) as *const __m128i);
        let g2 = _mm_loadu_si128(ptr.add(32) as *const __m128i);
        let g3 = _mm_loadu_si128(ptr.add(48) as *const __m128i);
        let g4 = _mm_loadu_si128(ptr.add(64) as *const __m128i);
        let g5 = _mm_loadu_si128(ptr.add(80) as *const __m128i);
        let channel = |table: &[[u8; 16]; 3]| {
            _mm256_set_m128i(
                gather_channel_half(g3, g4, g5, table),
                gather_channel_half(g0, g1, g2, table),
            )
        };
        (
            Self(channel(&B_SHUFFLE)),
            Self(channel(&G_SHUFFLE)),
            Self(channel(&R_SHUFFLE)),
        )
    }

    #[inline(always)]
    unsafe fn load_bgr_partial(ptr: *const u8, pixels: usize) -> (Self, Self, Self) {
        debug_assert!(pixels > 0 && pixels < Self::LANES);
        let mut staged = [0u8; 96];
        std::ptr::copy_nonoverlapping(ptr, staged.as_mut_ptr(), 3 * pixels);
        Self::load_bgr(staged.as_ptr())
    }

    #[inline(always)]
    unsafe fn sad_accum(self, other: Self, acc: Self) -> Self {
        Self(_mm256_add_epi64(acc.0, _mm256_sad_epu8(self.0, other.0)))
    }

    #[inline(always)]
    unsafe fn sad_reduce(acc: Self) -> u64 {
        let mut lanes = [0u64; 4];
        _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, acc.0);
        lanes[0] + lanes[1] + lanes[2] + lanes[3]
    }

    #[inline(always)]
    unsafe fn min_reduce_u8(self) -> u8 {
        let mut bytes = [0u8; 32];
        _mm256_storeu_si256(bytes.as_mut_ptr() as *mut __m256i, self.0);
        bytes.iter().fold(u8::MAX, |m, &b| m.min(b))
    }

    #[inline(always)]
    unsafe fn max_reduce_u8(self) -> u8 {
        let mut bytes = [0u8; 32];
        _mm256_storeu_si256(bytes.as_mut_ptr() as *mut __m256i, self.0);
        bytes.iter().fold(0, |m, &b| m.max(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq() -> [u8; 32] {
        std::array::from_fn(|i| (i * 7 + 2) as u8)
    }

    unsafe fn to_array(v: U8x32) -> [u8; 32] {
        let mut out = [0u8; 32];
        v.store_unaligned(out.as_mut_ptr());
        out
    }

    #[test]
    fn widen_then_pack_is_identity() {
        unsafe {
            let data = seq();
            let v = U8x32::load_unaligned(data.as_ptr());
            let packed = U8x32::pack_u16_u8(v.widen_lo_u16(), v.widen_hi_u16());
            assert_eq!(to_array(packed), data);
        }
    }

    #[test]
    fn pack_i32_u16_keeps_whole_register_order() {
        unsafe {
            // distinct value per i32 lane, then verify u16 lane order
            let values: [i32; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
            let lo = U8x32::load_unaligned(values.as_ptr() as *const u8);
            let values_hi: [i32; 8] = [8, 9, 10, 11, 12, 13, 14, 15];
            let hi = U8x32::load_unaligned(values_hi.as_ptr() as *const u8);
            let packed = to_array(U8x32::pack_i32_u16(lo, hi));
            for lane in 0..16 {
                assert_eq!(packed[2 * lane], lane as u8, "u16 lane {lane}");
                assert_eq!(packed[2 * lane + 1], 0);
            }
        }
    }

    #[test]
    fn even_odd_then_pack_deinterleaves() {
        unsafe {
            // pack(even(a), even(b)) must be byte-order a0 a2 .. b0 b2 ..
            let a: [u8; 32] = std::array::from_fn(|i| i as u8);
            let b: [u8; 32] = std::array::from_fn(|i| 64 + i as u8);
            let va = U8x32::load_unaligned(a.as_ptr());
            let vb = U8x32::load_unaligned(b.as_ptr());
            let even = to_array(U8x32::pack_u16_u8(va.even_u16(), vb.even_u16()));
            for i in 0..16 {
                assert_eq!(even[i], a[2 * i]);
                assert_eq!(even[16 + i], b[2 * i]);
            }
        }
    }

    #[test]
    fn zip_interleaves_in_store_order() {
        unsafe {
            let a: [u8; 32] = std::array::from_fn(|i| i as u8);
            let b: [u8; 32] = std::array::from_fn(|i| 128 + i as u8);
            let (lo, hi) = U8x32::load_unaligned(a.as_ptr()).zip(U8x32::load_unaligned(b.as_ptr()));
            let mut out = [0u8; 64];
            lo.store_unaligned(out.as_mut_ptr());
            hi.store_unaligned(out.as_mut_ptr().add(32));
            for i in 0..32 {
                assert_eq!(out[2 * i], a[i]);
                assert_eq!(out[2 * i + 1], b[i]);
            }
        }
    }

    #[test]
    fn load_bgr_deinterleaves_channels() {
        unsafe {
            let mut bgr = [0u8; 96];
            for pixel in 0..32 {
                bgr[3 * pixel] = pixel as u8;
                bgr[3 * pixel + 1] = 64 + pixel as u8;
                bgr[3 * pixel + 2] = 128 + pixel as u8;
            }
            let (b, g, r) = U8x32::load_bgr(bgr.as_ptr());
            let (b, g, r) = (to_array(b), to_array(g), to_array(r));
            for pixel in 0..32 {
                assert_eq!(b[pixel], pixel as u8);
                assert_eq!(g[pixel], 64 + pixel as u8);
                assert_eq!(r[pixel], 128 + pixel as u8);
            }
        }
    }

    #[test]
    fn partial_load_zero_fills() {
        unsafe {
            let data = seq();
            let v = to_array(U8x32::load_partial(data.as_ptr(), 19));
            assert_eq!(&v[..19], &data[..19]);
            assert!(v[19..].iter().all(|&x| x == 0));
        }
    }

    #[test]
    fn sad_matches_scalar() {
        unsafe {
            let a = seq();
            let b: [u8; 32] = std::array::from_fn(|i| (255 - i * 3) as u8);
            let acc = U8x32::load_unaligned(a.as_ptr())
                .sad_accum(U8x32::load_unaligned(b.as_ptr()), U8x32::zero());
            let expected: u64 = (0..32).map(|i| a[i].abs_diff(b[i]) as u64).sum();
            assert_eq!(U8x32::sad_reduce(acc), expected);
        }
    }
}
