//! Alignment arithmetic and aligned scratch buffers shared by the kernels.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

/// Rounds `value` down to a multiple of `align`.
///
/// `align` must be a power of two; the hot loops rely on the bit-mask form.
#[inline(always)]
pub const fn align_lo(value: usize, align: usize) -> usize {
    value & !(align - 1)
}

/// Rounds `value` up to a multiple of `align`.
#[inline(always)]
pub const fn align_hi(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Whether `ptr` meets an `align`-byte boundary.
#[inline(always)]
pub fn is_aligned<T>(ptr: *const T, align: usize) -> bool {
    ptr as usize % align == 0
}

/// Builds the `pshufb` control bytes that gather one BGR channel from one of
/// the three 16-byte groups covering 16 packed pixels. Output lane `i` wants
/// packed byte `3 * i + channel`; lanes whose byte lives in a different
/// group get `0x80`, which makes the shuffle produce zero there, so the
/// three shuffled groups can simply be or-ed together.
#[cfg(any(sse41, avx2))]
pub(crate) const fn bgr_shuffle(channel: usize, group: usize) -> [u8; 16] {
    let mut mask = [0x80u8; 16];
    let mut i = 0;
    while i < 16 {
        let byte = 3 * i + channel;
        if byte / 16 == group {
            mask[i] = (byte % 16) as u8;
        }
        i += 1;
    }
    mask
}

/// Heap buffer with an explicit alignment, used for the row scratch of the
/// separable filters. `Vec<T>` cannot guarantee alignment above that of `T`,
/// and handing a custom-layout allocation to `Vec::from_raw_parts` would pair
/// it with the wrong layout on drop, so this owns the allocation directly.
pub struct AlignedBuffer<T> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
}

impl<T> AlignedBuffer<T> {
    /// Allocates `len` zero-initialized elements at `align` bytes.
    ///
    /// # Panics
    /// Panics if `align` is not a power of two, is below the natural
    /// alignment of `T`, or if the allocation size overflows. Allocation
    /// failure goes through [`handle_alloc_error`].
    pub fn new_zeroed(len: usize, align: usize) -> Self {
        assert!(align.is_power_of_two());
        assert!(align >= std::mem::align_of::<T>());
        assert!(len > 0);

        let layout = Layout::from_size_align(len * std::mem::size_of::<T>(), align)
            .expect("invalid layout for aligned buffer");

        let ptr = unsafe { alloc_zeroed(layout) };
        let ptr = match NonNull::new(ptr as *mut T) {
            Some(p) => p,
            None => handle_alloc_error(layout),
        };

        AlignedBuffer { ptr, len, layout }
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        unsafe {
            dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
        }
    }
}

impl<T> Deref for AlignedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> DerefMut for AlignedBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

// The buffer owns its allocation exclusively, like a Vec.
unsafe impl<T: Send> Send for AlignedBuffer<T> {}
unsafe impl<T: Sync> Sync for AlignedBuffer<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_lo_rounds_down() {
        assert_eq!(align_lo(0, 16), 0);
        assert_eq!(align_lo(15, 16), 0);
        assert_eq!(align_lo(16, 16), 16);
        assert_eq!(align_lo(17, 16), 16);
        assert_eq!(align_lo(63, 32), 32);
    }

    #[test]
    fn align_hi_rounds_up() {
        assert_eq!(align_hi(0, 16), 0);
        assert_eq!(align_hi(1, 16), 16);
        assert_eq!(align_hi(16, 16), 16);
        assert_eq!(align_hi(17, 16), 32);
    }

    #[test]
    fn aligned_buffer_meets_alignment_and_is_zeroed() {
        let buf = AlignedBuffer::<u16>::new_zeroed(1000, 64);
        assert!(is_aligned(buf.as_ptr(), 64));
        assert_eq!(buf.len(), 1000);
        assert!(buf.iter().all(|&v| v == 0));
    }

    #[test]
    #[should_panic]
    fn aligned_buffer_rejects_non_power_of_two() {
        let _ = AlignedBuffer::<u8>::new_zeroed(16, 24);
    }
}
