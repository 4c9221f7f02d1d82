//! NEON backend: 128-bit vector types for AArch64.
//!
//! NEON is mandatory on AArch64, so on Apple Silicon, Graviton and similar
//! hosts this backend is always compiled in; the dispatcher still consults
//! the runtime [`FeatureSet`] so tests can mask it off.
//!
//! [`FeatureSet`]: crate::simd::features::FeatureSet

mod f32x4;
mod u8x16;

pub use f32x4::F32x4;
pub use u8x16::U8x16;
