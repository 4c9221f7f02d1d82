//! SSE4.1 backend: 128-bit vector types for x86 / x86_64.
//!
//! Compiled in only when `build.rs` detects SSE4.1 on the build host; the
//! dispatcher additionally checks the runtime [`FeatureSet`] before routing
//! work here.
//!
//! [`FeatureSet`]: crate::simd::features::FeatureSet

mod f32x4;
mod u8x16;

pub use f32x4::F32x4;
pub use u8x16::U8x16;
