//! CPU feature detection.

use once_cell::sync::OnceCell;

/// Instruction set available to the packed microkernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SimdLevel {
    /// Portable scalar code (auto-vectorized at the compiler's discretion).
    Scalar,
    /// x86_64 AVX2, 8 x u32 per register.
    Avx2,
}

static LEVEL: OnceCell<SimdLevel> = OnceCell::new();

/// The best level supported by the running CPU, detected once per process.
///
/// Always [`SimdLevel::Scalar`] when the `simd` feature is disabled.
pub fn simd_level() -> SimdLevel {
    *LEVEL.get_or_init(|| {
        let level = detect();
        log::debug!("pir-gemm: detected SIMD level {:?}", level);
        level
    })
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
fn detect() -> SimdLevel {
    if is_x86_feature_detected!("avx2") {
        SimdLevel::Avx2
    } else {
        SimdLevel::Scalar
    }
}

#[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
fn detect() -> SimdLevel {
    SimdLevel::Scalar
}
