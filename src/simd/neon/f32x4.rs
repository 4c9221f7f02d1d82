//! NEON 4-lane f32 vector used by the neural kernels.

use std::arch::aarch64::*;

use std::ops::{Add, Div, Mul};

use crate::simd::traits::{SimdF32, SimdVec};

/// 4 packed f32 lanes in one NEON register.
#[derive(Copy, Clone, Debug)]
pub struct F32x4(pub(crate) float32x4_t);

impl SimdVec<f32> for F32x4 {
    const LANES: usize = 4;
    const ALIGNMENT: usize = 16;

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self {
        debug_assert!(Self::is_aligned(ptr));
        Self(vld1q_f32(ptr))
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self {
        Self(vld1q_f32(ptr))
    }

    #[inline(always)]
    unsafe fn load_partial(ptr: *const f32, size: usize) -> Self {
        debug_assert!(size > 0 && size < Self::LANES);
        let mut staged = [0.0f32; 4];
        std::ptr::copy_nonoverlapping(ptr, staged.as_mut_ptr(), size);
        Self(vld1q_f32(staged.as_ptr()))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut f32) {
        debug_assert!(Self::is_aligned(ptr));
        vst1q_f32(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut f32) {
        vst1q_f32(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn store_partial(self, ptr: *mut f32, size: usize) {
        debug_assert!(size > 0 && size < Self::LANES);
        let mut staged = [0.0f32; 4];
        vst1q_f32(staged.as_mut_ptr(), self.0);
        std::ptr::copy_nonoverlapping(staged.as_ptr(), ptr, size);
    }

    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        Self(vdupq_n_f32(value))
    }
}

impl Add for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { Self(vaddq_f32(self.0, rhs.0)) }
    }
}

impl Mul for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { Self(vmulq_f32(self.0, rhs.0)) }
    }
}

impl Div for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        unsafe { Self(vdivq_f32(self.0, rhs.0)) }
    }
}

impl SimdF32 for F32x4 {
    #[inline(always)]
    unsafe fn abs(self) -> Self {
        Self(vabsq_f32(self.0))
    }

    #[inline(always)]
    unsafe fn select_gt_zero(v: Self, a: Self, b: Self) -> Self {
        let mask = vcgtq_f32(v.0, vdupq_n_f32(0.0));
        Self(vbslq_f32(mask, a.0, b.0))
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
            let b = F32x4::splat(4.0);
            assert_eq!(to_array(a + b), [5.0, 6.0, 7.0, 8.0]);
            assert_eq!(to_array(a * b), [4.0, 8.0, 12.0, 16.0]);
            assert_eq!(to_array(a / b), [0.25, 0.5, 0.75, 1.0]);
        }
    }

    #[test]
    fn abs_and_select() {
        unsafe {
            let v = F32x4::load_unaligned([-2.0, 0.0, 0.5, -0.0].as_ptr());
            assert_eq!(to_array(v.abs()), [2.0, 0.0, 0.5, 0.0]);
            let picked = F32x4::select_gt_zero(v, F32x4::splat(1.0), F32x4::splat(-1.0));
            assert_eq!(to_array(picked), [-1.0, -1.0, 1.0, -1.0]);
        }
    }

    #[test]
    fn partial_load_store() {
        unsafe {
            let data = [6.0f32, 7.0];
            let v = F32x4::load_partial(data.as_ptr(), 2);
            assert_eq!(to_array(v), [6.0, 7.0, 0.0, 0.0]);
            let mut out = [3.0f32; 4];
            v.store_partial(out.as_mut_ptr(), 1);
            assert_eq!(out, [6.0, 3.0, 3.0, 3.0]);
        }
    }
}
