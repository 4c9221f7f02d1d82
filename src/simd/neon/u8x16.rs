//! NEON 16-lane byte vector for AArch64.
//!
//! `U8x16` wraps `uint8x16_t`. NEON covers the whole [`PixelVec`] surface
//! directly: `vld3q_u8` deinterleaves packed BGR in one instruction, the
//! `vzip1q`/`vzip2q` pair interleaves in store order, and the horizontal
//! reductions (`vminvq`, `vmaxvq`, `vaddlvq`) replace the store-and-fold
//! loops the x86 backends need. Methods whose name carries a lane type
//! reinterpret the register; reinterprets compile to nothing.

use std::arch::aarch64::*;

use crate::simd::traits::{PixelVec, SimdVec};

/// 16 packed u8 lanes in one NEON register.
#[derive(Copy, Clone, Debug)]
pub struct U8x16(pub(crate) uint8x16_t);

impl SimdVec<u8> for U8x16 {
    const LANES: usize = 16;
    const ALIGNMENT: usize = 16;

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        debug_assert!(Self::is_aligned(ptr));
        Self(vld1q_u8(ptr))
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        Self(vld1q_u8(ptr))
    }

    #[inline(always)]
    unsafe fn load_partial(ptr: *const u8, size: usize) -> Self {
        debug_assert!(size > 0 && size < Self::LANES);
        let mut staged = [0u8; 16];
        std::ptr::copy_nonoverlapping(ptr, staged.as_mut_ptr(), size);
        Self(vld1q_u8(staged.as_ptr()))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut u8) {
        debug_assert!(Self::is_aligned(ptr));
        vst1q_u8(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn store_unaligned(self, ptr: *mut u8) {
        vst1q_u8(ptr, self.0)
    }

    #[inline(always)]
    unsafe fn store_partial(self, ptr: *mut u8, size: usize) {
        debug_assert!(size > 0 && size < Self::LANES);
        let mut staged = [0u8; 16];
        vst1q_u8(staged.as_mut_ptr(), self.0);
        std::ptr::copy_nonoverlapping(staged.as_ptr(), ptr, size);
    }

    #[inline(always)]
    unsafe fn splat(value: u8) -> Self {
        Self(vdupq_n_u8(value))
    }
}

impl PixelVec for U8x16 {
    #[inline(always)]
    unsafe fn zero() -> Self {
        Self(vdupq_n_u8(0))
    }

    #[inline(always)]
    unsafe fn ones() -> Self {
        Self(vdupq_n_u8(0xFF))
    }

    #[inline(always)]
    unsafe fn andnot(self, other: Self) -> Self {
        // vbic computes first & !second
        Self(vbicq_u8(other.0, self.0))
    }

    #[inline(always)]
    unsafe fn min_u8(self, other: Self) -> Self {
        Self(vminq_u8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn max_u8(self, other: Self) -> Self {
        Self(vmaxq_u8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn cmp_eq_u8(self, other: Self) -> Self {
        Self(vceqq_u8(self.0, other.0))
    }

    #[inline(always)]
    unsafe fn blend(mask: Self, positive: Self, negative: Self) -> Self {
        Self(vbslq_u8(mask.0, positive.0, negative.0))
    }

    #[inline(always)]
    unsafe fn splat_u16(value: u16) -> Self {
        Self(vreinterpretq_u8_u16(vdupq_n_u16(value)))
    }

    #[inline(always)]
    unsafe fn even_u16(self) -> Self {
        Self(vreinterpretq_u8_u16(vandq_u16(
            vreinterpretq_u16_u8(self.0),
            vdupq_n_u16(0x00FF),
        )))
    }

    #[inline(always)]
    unsafe fn odd_u16(self) -> Self {
        Self(vreinterpretq_u8_u16(vshrq_n_u16::<8>(
            vreinterpretq_u16_u8(self.0),
        )))
    }

    #[inline(always)]
    unsafe fn widen_lo_u16(self) -> Self {
        Self(vreinterpretq_u8_u16(vmovl_u8(vget_low_u8(self.0))))
    }

    #[inline(always)]
    unsafe fn widen_hi_u16(self) -> Self {
        Self(vreinterpretq_u8_u16(vmovl_u8(vget_high_u8(self.0))))
    }

    #[inline(always)]
    unsafe fn add_u16(self, other: Self) -> Self {
        Self(vreinterpretq_u8_u16(vaddq_u16(
            vreinterpretq_u16_u8(self.0),
            vreinterpretq_u16_u8(other.0),
        )))
    }

    #[inline(always)]
    unsafe fn shl_u16<const N: i32>(self) -> Self {
        Self(vreinterpretq_u8_u16(vshlq_n_u16::<N>(
            vreinterpretq_u16_u8(self.0),
        )))
    }

    #[inline(always)]
    unsafe fn shr_u16<const N: i32>(self) -> Self {
        Self(vreinterpretq_u8_u16(vshrq_n_u16::<N>(
            vreinterpretq_u16_u8(self.0),
        )))
    }

    #[inline(always)]
    unsafe fn pack_u16_u8(lo: Self, hi: Self) -> Self {
        Self(vcombine_u8(
            vqmovn_u16(vreinterpretq_u16_u8(lo.0)),
            vqmovn_u16(vreinterpretq_u16_u8(hi.0)),
        ))
    }

    #[inline(always)]
    unsafe fn splat_i32(value: i32) -> Self {
        Self(vreinterpretq_u8_s32(vdupq_n_s32(value)))
    }

    #[inline(always)]
    unsafe fn widen_lo_i32(self) -> Self {
        let u16s = vreinterpretq_u16_u8(self.0);
        Self(vreinterpretq_u8_u32(vmovl_u16(vget_low_u16(u16s))))
    }

    #[inline(always)]
    unsafe fn widen_hi_i32(self) -> Self {
        let u16s = vreinterpretq_u16_u8(self.0);
        Self(vreinterpretq_u8_u32(vmovl_u16(vget_high_u16(u16s))))
    }

    #[inline(always)]
    unsafe fn add_i32(self, other: Self) -> Self {
        Self(vreinterpretq_u8_s32(vaddq_s32(
            vreinterpretq_s32_u8(self.0),
            vreinterpretq_s32_u8(other.0),
        )))
    }

    #[inline(always)]
    unsafe fn mul_i32(self, other: Self) -> Self {
        Self(vreinterpretq_u8_s32(vmulq_s32(
            vreinterpretq_s32_u8(self.0),
            vreinterpretq_s32_u8(other.0),
        )))
    }

    #[inline(always)]
    unsafe fn shr_i32<const N: i32>(self) -> Self {
        Self(vreinterpretq_u8_s32(vshrq_n_s32::<N>(
            vreinterpretq_s32_u8(self.0),
        )))
    }

    #[inline(always)]
    unsafe fn pack_i32_u16(lo: Self, hi: Self) -> Self {
        Self(vreinterpretq_u8_u16(vcombine_u16(
            vqmovun_s32(vreinterpretq_s32_u8(lo.0)),
            vqmovun_s32(vreinterpretq_s32_u8(hi.0)),
        )))
    }

    #[inline(always)]
    unsafe fn zip(self, other: Self) -> (Self, Self) {
        (
            Self(vzip1q_u8(self.0, other.0)),
            Self(vzip2q_u8(self.0, other.0)),
        )
    }

    #[inline(always)]
    unsafe fn load_bgr(ptr: *const u8) -> (Self, Self, Self) {
        let planes = vld3q_u8(ptr);
        (Self(planes.0), Self(planes.1), Self(planes.2))
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
        // u32 accumulator lanes; the caller reduces per row, so the lanes
        // stay far below overflow.
        let diff_sums = vpaddlq_u8(vabdq_u8(self.0, other.0));
        Self(vreinterpretq_u8_u32(vpadalq_u16(
            vreinterpretq_u32_u8(acc.0),
            diff_sums,
        )))
    }

    #[inline(always)]
    unsafe fn sad_reduce(acc: Self) -> u64 {
        vaddlvq_u32(vreinterpretq_u32_u8(acc.0))
    }

    #[inline(always)]
    unsafe fn min_reduce_u8(self) -> u8 {
        vminvq_u8(self.0)
    }

    #[inline(always)]
    unsafe fn max_reduce_u8(self) -> u8 {
        vmaxvq_u8(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq() -> [u8; 16] {
        std::array::from_fn(|i| (i * 11 + 5) as u8)
    }

    unsafe fn to_array(v: U8x16) -> [u8; 16] {
        let mut out = [0u8; 16];
        v.store_unaligned(out.as_mut_ptr());
        out
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
    fn pack_i32_u16_saturates_both_ends() {
        unsafe {
            let packed = U8x16::pack_i32_u16(U8x16::splat_i32(-100), U8x16::splat_i32(100_000));
            let bytes = to_array(packed);
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
            let (b, g, r) = (to_array(b), to_array(g), to_array(r));
            for pixel in 0..16 {
                assert_eq!(b[pixel], pixel as u8);
                assert_eq!(g[pixel], 50 + pixel as u8);
                assert_eq!(r[pixel], 200 - pixel as u8);
            }
        }
    }

    #[test]
    fn sad_and_reductions_match_scalar() {
        unsafe {
            let a = seq();
            let b: [u8; 16] = std::array::from_fn(|i| (i * 13) as u8);
            let va = U8x16::load_unaligned(a.as_ptr());
            let vb = U8x16::load_unaligned(b.as_ptr());
            let expected: u64 = (0..16).map(|i| a[i].abs_diff(b[i]) as u64).sum();
            assert_eq!(U8x16::sad_reduce(va.sad_accum(vb, U8x16::zero())), expected);
            assert_eq!(va.min_reduce_u8(), *a.iter().min().unwrap());
            assert_eq!(va.max_reduce_u8(), *a.iter().max().unwrap());
        }
    }

    #[test]
    fn partial_load_zero_fills() {
        unsafe {
            let data = seq();
            let v = to_array(U8x16::load_partial(data.as_ptr(), 11));
            assert_eq!(&v[..11], &data[..11]);
            assert!(v[11..].iter().all(|&b| b == 0));
        }
    }
}
