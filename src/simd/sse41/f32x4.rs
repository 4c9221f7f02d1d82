//! SSE4.1 4-lane f32 vector used by the neural kernels.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use std::ops::{Add, Div, Mul};

use crate::simd::traits::{SimdF32, SimdVec};

/// 4 packed f32 lanes in one SSE register.
#[derive(Copy, Clone, Debug)]
pub struct F32x4(pub(crate) __m128);

impl SimdVec<f32> for F32x4 {
    const LANES: usize = 4;
    const ALIGNMENT: usize = 16;

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert!(Self::is_aligned(ptr));
        Self(_mm_load_ps(ptr))
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self {
        Self(_mm_loadu_ps(ptr))
    }

    #[inline(always)]
    unsafe fn load_partial(ptr: *const f32, size: usize) -> Self {
        debug_assert!(size > 0 && size < Self::LANES);
        let mut staged = [0.0f32; 4];
        std::ptr::copy_nonoverlapping(ptr, staged.as_mut_ptr(), size);
        Self(_mm_loadu_ps(staged.as_ptr()))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        debug_assert!(Self::is_aligned(ptr));
        _mm_store_ps(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut f32) {
        _mm_storeu_ps(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn store_partial(self, ptr: *mut f32, size: usize) {
        debug_assert!(size > 0 && size < Self::LANES);
        let mut staged = [0.0f32; 4];
        _mm_storeu_ps(staged.as_mut_ptr(), self.0);
        std::ptr::copy_nonoverlapping(staged.as_ptr(), ptr, size);
    }

    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        Self(_mm_set1_ps(value))
    }
}

impl Add for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { Self(_mm_add_ps(self.0, rhs.0)) }
    }
}

impl Mul for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { Self(_mm_mul_ps(self.0, rhs.0)) }
    }
}

impl Div for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        unsafe { Self(_mm_div_ps(self.0, rhs.0)) }
    }
}

impl SimdF32 for F32x4 {
    #[inline(always)]
    unsafe fn abs(self) -> Self {
        // Clears the sign bit.
        Self(_mm_andnot_ps(_mm_set1_ps(-0.0), self.0))
    }

    #[inline(always)]
    unsafe fn select_gt_zero(v: Self, a: Self, b: Self) -> Self {
        let mask = _mm_cmpgt_ps(v.0, _mm_setzero_ps());
        Self(_mm_blendv_ps(b.0, a.0, mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn to_array(v: F32x4) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        v.store_unaligned(out.as_mut_ptr());
        out
    }

    #[test]
    fn arithmetic_is_lanewise() {
        unsafe {
            let a = F32x4::load_unaligned([1.0, 2.0, 3.0, 4.0].as_ptr());
            let b = F32x4::splat(2.0);
            assert_eq!(to_array(a + b), [3.0, 4.0, 5.0, 6.0]);
            assert_eq!(to_array(a * b), [2.0, 4.0, 6.0, 8.0]);
            assert_eq!(to_array(a / b), [0.5, 1.0, 1.5, 2.0]);
        }
    }

    #[test]
    fn abs_and_select() {
        unsafe {
            let v = F32x4::load_unaligned([-1.5, 0.0, 2.5, -0.0].as_ptr());
            assert_eq!(to_array(v.abs()), [1.5, 0.0, 2.5, 0.0]);
            let picked = F32x4::select_gt_zero(v, F32x4::splat(1.0), F32x4::splat(-1.0));
            assert_eq!(to_array(picked), [-1.0, -1.0, 1.0, -1.0]);
        }
    }

    #[test]
    fn partial_load_store() {
        unsafe {
            let data = [7.0f32, 8.0, 9.0];
            let v = F32x4::load_partial(data.as_ptr(), 3);
            assert_eq!(to_array(v), [7.0, 8.0, 9.0, 0.0]);
            let mut out = [5.0f32; 4];
            v.store_partial(out.as_mut_ptr(), 2);
            assert_eq!(out, [7.0, 8.0, 5.0, 5.0]);
        }
    }
}
