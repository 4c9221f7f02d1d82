//! Backend-independent trait surface for the vector kernels.
//!
//! Every instruction-set backend provides one byte-vector type and one f32
//! vector type implementing the traits below. The image kernels in
//! [`crate::simd::kernels`] are written once against this surface and
//! monomorphized per backend, instead of being hand-duplicated per
//! instruction set.

/// Core load/store surface shared by every vector type.
///
/// All pointer-based methods are `unsafe`: the caller guarantees the pointer
/// is valid for the accessed range and, for the `_aligned` variants, that it
/// meets [`SimdVec::ALIGNMENT`].
pub trait SimdVec<T>: Copy {
    /// Number of `T` elements per vector register.
    const LANES: usize;

    /// Required byte alignment for the aligned load/store fast path.
    const ALIGNMENT: usize;

    fn is_aligned(ptr: *const T) -> bool {
        ptr as usize % Self::ALIGNMENT == 0
    }

    /// # Safety
    /// `ptr` must be valid for `LANES` reads and meet `ALIGNMENT`.
    unsafe fn load_aligned(ptr: *const T) -> Self;

    /// # Safety
    /// `ptr` must be valid for `LANES` reads.
    unsafe fn load_unaligned(ptr: *const T) -> Self;

    /// Loads only `size` elements; the remaining lanes are zero.
    ///
    /// # Safety
    /// `ptr` must be valid for `size` reads, `0 < size < LANES`.
    unsafe fn load_partial(ptr: *const T, size: usize) -> Self;

    /// # Safety
    /// `ptr` must be valid for `LANES` writes and meet `ALIGNMENT`.
    unsafe fn store_aligned(self, ptr: *mut T);

    /// # Safety
    /// `ptr` must be valid for `LANES` writes.
    unsafe fn store_unaligned(self, ptr: *mut T);

    /// Writes only the first `size` lanes; memory past them is untouched.
    ///
    /// # Safety
    /// `ptr` must be valid for `size` writes, `0 < size < LANES`.
    unsafe fn store_partial(self, ptr: *mut T, size: usize);

    /// # Safety
    /// Requires the backend's instruction set.
    unsafe fn splat(value: T) -> Self;

    /// Aligned/unaligned load selected at compile time, so each kernel can be
    /// monomorphized into an aligned and an unaligned variant.
    ///
    /// # Safety
    /// Same contract as the selected variant.
    #[inline(always)]
    unsafe fn load<const ALIGN: bool>(ptr: *const T) -> Self {
        if ALIGN {
            Self::load_aligned(ptr)
        } else {
            Self::load_unaligned(ptr)
        }
    }

    /// Aligned/unaligned store selected at compile time.
    ///
    /// # Safety
    /// Same contract as the selected variant.
    #[inline(always)]
    unsafe fn store<const ALIGN: bool>(self, ptr: *mut T) {
        if ALIGN {
            self.store_aligned(ptr)
        } else {
            self.store_unaligned(ptr)
        }
    }
}

/// The narrow vector-ops interface the u8 image kernels are built on.
///
/// The register is untyped; methods whose name carries `_u16` or `_i32`
/// reinterpret it as packed 16-bit or 32-bit lanes. The widening and packing
/// methods preserve element order across the whole register (backends whose
/// pack instructions work per 128-bit lane fix the order up internally), so
/// `pack_u16_u8(v.widen_lo_u16(), v.widen_hi_u16()) == v` for byte values
/// that fit.
#[allow(clippy::missing_safety_doc)]
pub trait PixelVec: SimdVec<u8> {
    unsafe fn zero() -> Self;
    unsafe fn ones() -> Self;

    /// `(!self) & other`, the `andnot` of the x86 ISA.
    unsafe fn andnot(self, other: Self) -> Self;

    unsafe fn min_u8(self, other: Self) -> Self;
    unsafe fn max_u8(self, other: Self) -> Self;
    /// Per-byte equality mask: `0xFF` where equal, `0x00` elsewhere.
    unsafe fn cmp_eq_u8(self, other: Self) -> Self;
    /// `(mask & positive) | (!mask & negative)` per byte.
    unsafe fn blend(mask: Self, positive: Self, negative: Self) -> Self;

    unsafe fn splat_u16(value: u16) -> Self;
    /// Even-indexed bytes zero-extended into the u16 lanes.
    unsafe fn even_u16(self) -> Self;
    /// Odd-indexed bytes zero-extended into the u16 lanes.
    unsafe fn odd_u16(self) -> Self;
    /// Bytes `0 .. LANES/2` zero-extended to u16, in order.
    unsafe fn widen_lo_u16(self) -> Self;
    /// Bytes `LANES/2 .. LANES` zero-extended to u16, in order.
    unsafe fn widen_hi_u16(self) -> Self;
    unsafe fn add_u16(self, other: Self) -> Self;
    unsafe fn shl_u16<const N: i32>(self) -> Self;
    unsafe fn shr_u16<const N: i32>(self) -> Self;
    /// Saturating u16 -> u8 pack; `lo` supplies the first `LANES/2` bytes.
    unsafe fn pack_u16_u8(lo: Self, hi: Self) -> Self;

    unsafe fn splat_i32(value: i32) -> Self;
    /// u16 lanes `0 .. LANES/4` zero-extended to i32, in order.
    unsafe fn widen_lo_i32(self) -> Self;
    /// u16 lanes `LANES/4 .. LANES/2` zero-extended to i32, in order.
    unsafe fn widen_hi_i32(self) -> Self;
    unsafe fn add_i32(self, other: Self) -> Self;
    unsafe fn mul_i32(self, other: Self) -> Self;
    /// Arithmetic right shift of the i32 lanes.
    unsafe fn shr_i32<const N: i32>(self) -> Self;
    /// Saturating i32 -> u16 pack (negative lanes clamp to zero);
    /// `lo` supplies the first `LANES/4` u16 lanes.
    unsafe fn pack_i32_u16(lo: Self, hi: Self) -> Self;

    /// Byte interleave of two registers in store order: writing the returned
    /// pair to consecutive memory yields `a0 b0 a1 b1 ..`.
    unsafe fn zip(self, other: Self) -> (Self, Self);

    /// Deinterleaves `LANES` packed BGR pixels (`3 * LANES` bytes) into
    /// planar `(b, g, r)` registers.
    unsafe fn load_bgr(ptr: *const u8) -> (Self, Self, Self);
    /// Deinterleaves only `pixels` BGR pixels; missing lanes are zero.
    unsafe fn load_bgr_partial(ptr: *const u8, pixels: usize) -> (Self, Self, Self);

    /// Folds the sum of absolute byte differences of `self` and `other` into
    /// the accumulator register. The accumulator lane layout is
    /// backend-defined; only [`PixelVec::sad_reduce`] may interpret it.
    unsafe fn sad_accum(self, other: Self, acc: Self) -> Self;
    unsafe fn sad_reduce(acc: Self) -> u64;

    unsafe fn min_reduce_u8(self) -> u8;
    unsafe fn max_reduce_u8(self) -> u8;
}

/// f32 vector surface used by the neural kernels. Arithmetic comes from the
/// `std::ops` impls on the concrete types.
pub trait SimdF32:
    SimdVec<f32>
    + std::ops::Add<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Div<Output = Self>
{
    /// # Safety
    /// Requires the backend's instruction set.
    unsafe fn abs(self) -> Self;

    /// Lanewise `if v > 0.0 { a } else { b }`.
    ///
    /// # Safety
    /// Requires the backend's instruction set.
    unsafe fn select_gt_zero(v: Self, a: Self, b: Self) -> Self;
}

/// Relational operator accepted by the thresholding entry points.
///
/// The dispatcher maps each variant to a compile-time specialized predicate
/// ([`CompareOp`]), so no per-pixel branch on the enum survives into the
/// inner loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareKind {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Lesser,
    LesserOrEqual,
}

/// Compile-time comparison predicate with a scalar and a vector form.
///
/// The vector forms are derived from `cmp_eq` + `min`/`max`, which every
/// backend has for unsigned bytes (x86 below AVX-512 has no unsigned byte
/// greater-than compare).
pub trait CompareOp {
    fn scalar(a: u8, b: u8) -> bool;

    /// # Safety
    /// Requires the backend's instruction set.
    unsafe fn vector<V: PixelVec>(a: V, b: V) -> V;
}

pub struct Equal;
pub struct NotEqual;
pub struct Greater;
pub struct GreaterOrEqual;
pub struct Lesser;
pub struct LesserOrEqual;

impl CompareOp for Equal {
    #[inline(always)]
    fn scalar(a: u8, b: u8) -> bool {
        a == b
    }

    #[inline(always)]
    unsafe fn vector<V: PixelVec>(a: V, b: V) -> V {
        a.cmp_eq_u8(b)
    }
}

impl CompareOp for NotEqual {
    #[inline(always)]
    fn scalar(a: u8, b: u8) -> bool {
        a != b
    }

    #[inline(always)]
    unsafe fn vector<V: PixelVec>(a: V, b: V) -> V {
        V::andnot(a.cmp_eq_u8(b), V::ones())
    }
}

impl CompareOp for Greater {
    #[inline(always)]
    fn scalar(a: u8, b: u8) -> bool {
        a > b
    }

    // a > b  <=>  min(a, b) != a
    #[inline(always)]
    unsafe fn vector<V: PixelVec>(a: V, b: V) -> V {
        V::andnot(V::min_u8(a, b).cmp_eq_u8(a), V::ones())
    }
}

impl CompareOp for GreaterOrEqual {
    #[inline(always)]
    fn scalar(a: u8, b: u8) -> bool {
        a >= b
    }

    #[inline(always)]
    unsafe fn vector<V: PixelVec>(a: V, b: V) -> V {
        V::max_u8(a, b).cmp_eq_u8(a)
    }
}

impl CompareOp for Lesser {
    #[inline(always)]
    fn scalar(a: u8, b: u8) -> bool {
        a < b
    }

    #[inline(always)]
    unsafe fn vector<V: PixelVec>(a: V, b: V) -> V {
        V::andnot(V::max_u8(a, b).cmp_eq_u8(a), V::ones())
    }
}

impl CompareOp for LesserOrEqual {
    #[inline(always)]
    fn scalar(a: u8, b: u8) -> bool {
        a <= b
    }

    #[inline(always)]
    unsafe fn vector<V: PixelVec>(a: V, b: V) -> V {
        V::min_u8(a, b).cmp_eq_u8(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check<C: CompareOp>(expected: fn(u8, u8) -> bool) {
        for a in [0u8, 1, 17, 128, 254, 255] {
            for b in [0u8, 1, 17, 128, 254, 255] {
                assert_eq!(C::scalar(a, b), expected(a, b), "a={a} b={b}");
            }
        }
    }

    #[test]
    fn scalar_predicates() {
        check::<Equal>(|a, b| a == b);
        check::<NotEqual>(|a, b| a != b);
        check::<Greater>(|a, b| a > b);
        check::<GreaterOrEqual>(|a, b| a >= b);
        check::<Lesser>(|a, b| a < b);
        check::<LesserOrEqual>(|a, b| a <= b);
    }
}
