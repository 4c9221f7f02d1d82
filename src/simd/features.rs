//! Runtime CPU capability snapshot driving backend selection.
//!
//! Compile-time gating (the `sse41` / `avx2` / `neon` cfg flags emitted by
//! `build.rs`) decides which backends exist in the binary at all; this module
//! decides which of those the running CPU can actually execute. The snapshot
//! is taken once per process and cached.

use std::sync::OnceLock;

/// Immutable description of the vector extensions the host CPU supports.
///
/// Dispatch entry points take `&FeatureSet` in their `_with` form, so tests
/// can force any backend (including the scalar one) on any machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSet {
    pub sse41: bool,
    pub avx2: bool,
    /// Detected and reported, but never selected: no AVX-512 backend is
    /// built on the stable toolchain.
    pub avx512bw: bool,
    pub neon: bool,
}

static DETECTED: OnceLock<FeatureSet> = OnceLock::new();

impl FeatureSet {
    /// Queries the host CPU. Prefer [`features`], which caches the result.
    pub fn detect() -> Self {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            FeatureSet {
                sse41: is_x86_feature_detected!("sse4.1"),
                avx2: is_x86_feature_detected!("avx2"),
                avx512bw: is_x86_feature_detected!("avx512bw"),
                neon: false,
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            FeatureSet {
                sse41: false,
                avx2: false,
                avx512bw: false,
                neon: std::arch::is_aarch64_feature_detected!("neon"),
            }
        }

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
        {
            FeatureSet::none()
        }
    }

    /// No vector extensions; forces the scalar backend.
    pub const fn none() -> Self {
        FeatureSet {
            sse41: false,
            avx2: false,
            avx512bw: false,
            neon: false,
        }
    }

    /// Copy of `self` with AVX2 masked off, for exercising the next rung of
    /// the dispatch cascade.
    pub const fn without_avx2(self) -> Self {
        FeatureSet {
            avx2: false,
            ..self
        }
    }

    pub const fn without_sse41(self) -> Self {
        FeatureSet {
            sse41: false,
            avx2: false,
            ..self
        }
    }
}

/// The cached host capability snapshot.
pub fn features() -> &'static FeatureSet {
    DETECTED.get_or_init(FeatureSet::detect)
}
