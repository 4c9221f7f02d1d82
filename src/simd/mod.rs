pub mod base;
pub mod dispatch;
pub mod features;
pub mod traits;
pub mod utils;

#[cfg(any(sse41, avx2, neon))]
pub(crate) mod kernels;

#[cfg(avx2)]
pub mod avx2;

#[cfg(neon)]
pub mod neon;

#[cfg(sse41)]
pub mod sse41;
