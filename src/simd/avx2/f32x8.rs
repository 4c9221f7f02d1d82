//! AVX2 8-lane f32 vector used by the neural kernels.
//!
//! Partial loads and stores use `maskload` / `maskstore`, so ragged tails
//! never touch memory past the requested elements and need no staging
//! buffer.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use std::ops::{Add, Div, Mul};

use crate::simd::traits::{SimdF32, SimdVec};

/// 8 packed f32 lanes in one AVX register.
#[derive(Copy, Clone, Debug)]
pub struct F32x8(pub(crate) __m256);

/// All-ones in the first `size` i32 lanes, the mask form `maskload` expects.
#[inline(always)]
unsafe fn partial_mask(size: usize) -> __m256i {
    debug_assert!(size > 0 && size < 8);
    let indices = _mm256_setr_epi32(0, 1, 2, 3, 4, 5, 6, 7);
    _mm256_cmpgt_epi32(_mm256_set1_epi32(size as i32), indices)
}

impl SimdVec<f32> for F32x8 {
    const LANES: usize = 8;
    const ALIGNMENT: usize = 32;

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert!(Self::is_aligned(ptr));
        Self(_mm256_load_ps(ptr))
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self {
        Self(_mm256_loadu_ps(ptr))
    }

    #[inline(always)]
    unsafe fn load_partial(ptr: *const f32, size: usize) -> Self {
        Self(_mm256_maskload_ps(ptr, partial_mask(size)))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        debug_assert!(Self::is_aligned(ptr));
        _mm256_store_ps(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut f32) {
        _mm256_storeu_ps(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn store_partial(self, ptr: *mut f32, size: usize) {
        _mm256_maskstore_ps(ptr, partial_mask(size), self.0)
    }

    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        Self(_mm256_set1_ps(value))
    }
}

impl Add for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { Self(_mm256_add_ps(self.0, rhs.0)) }
    }
}

impl Mul for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { Self(_mm256_mul_ps(self.0, rhs.0)) }
    }
}

impl Div for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        unsafe { Self(_mm256_div_ps(self.0, rhs.0)) }
    }
}

impl SimdF32 for F32x8 {
    #[inline(always)]
    unsafe fn abs(self) -> Self {
        Self(_mm256_andnot_ps(_mm256_set1_ps(-0.0), self.0))
    }

    #[inline(always)]
    unsafe fn select_gt_zero(v: Self, a: Self, b: Self) -> Self {
        let mask = _mm256_cmp_ps::<_CMP_GT_OQ>(v.0, _mm256_setzero_ps());
        Self(_mm256_blendv_ps(b.0, a.0, mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn to_array(v: F32x8) -> [f32; 8] {
        let mut out = [0.0f32; 8];
        v.store_unaligned(out.as_mut_ptr());
        out
    }

    #[test]
    fn masked_partial_load_zero_fills() {
        unsafe {
            let data = [1.0f32, 2.0, 3.0];
            let v = F32x8::load_partial(data.as_ptr(), 3);
            assert_eq!(to_array(v), [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn masked_partial_store_preserves_tail() {
        unsafe {
            let v = F32x8::splat(9.0);
            let mut out = [1.0f32; 8];
            v.store_partial(out.as_mut_ptr(), 6);
            assert_eq!(out, [9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 1.0, 1.0]);
        }
    }

    #[test]
    fn abs_and_select() {
        unsafe {
            let v = F32x8::load_unaligned([-3.0f32, -0.5, 0.0, 0.5, 3.0, -0.0, 8.0, -8.0].as_ptr());
            let abs = to_array(v.abs());
            assert_eq!(abs, [3.0, 0.5, 0.0, 0.5, 3.0, 0.0, 8.0, 8.0]);
            let picked = F32x8::select_gt_zero(v, F32x8::splat(1.0), F32x8::splat(0.0));
            assert_eq!(to_array(picked), [0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0]);
        }
    }
}
