//! AVX2 backend: 256-bit vector types for x86 / x86_64.
//!
//! Available on Intel Haswell (2013+) and AMD Excavator (2015+). Compiled in
//! only when `build.rs` detects AVX2 on the build host; the dispatcher
//! additionally checks the runtime [`FeatureSet`] before routing work here,
//! and prefers this backend over SSE4.1 whenever the image is wide enough.
//!
//! [`FeatureSet`]: crate::simd::features::FeatureSet

mod f32x8;
mod u8x32;

pub use f32x8::F32x8;
pub use u8x32::U8x32;
