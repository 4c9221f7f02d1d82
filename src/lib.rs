//! Image processing kernels with runtime CPU dispatch.
//!
//! Every operation has a scalar implementation and vectorized variants for
//! SSE4.1, AVX2 and NEON. The available instruction sets are detected once
//! at startup and each call picks the widest backend the host supports; all
//! backends produce bit-identical results on the same input.
//!
//! Images are passed as flat byte slices with an explicit row stride, so
//! padded and sub-image views work without copying.
//!
//! ```
//! let bgr = vec![0u8; 64 * 64 * 3];
//! let mut gray = vec![0u8; 64 * 64];
//! simdpix::bgr_to_gray(&bgr, 64 * 3, 64, 64, &mut gray, 64);
//! assert!(gray.iter().all(|&g| g == 0));
//! ```

pub mod simd;

pub use simd::dispatch::{
    abs_difference_sum, averaging_binarization, bgr_to_gray, bgr_to_yuv420p, binarization,
    deinterleave_uv, gaussian_blur_3x3, get_statistic, histogram, interleave_uv,
    neural_rough_sigmoid, reduce_gray_2x2,
};
pub use simd::features::{features, FeatureSet};
pub use simd::traits::CompareKind;
