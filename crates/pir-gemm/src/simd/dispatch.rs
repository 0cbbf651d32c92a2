//! Runtime kernel selection.

#[cfg(target_arch = "x86_64")]
use super::detect::{simd_level, SimdLevel};
#[cfg(target_arch = "x86_64")]
use super::kernels::Avx2Microkernel;
use super::kernels::PortableMicrokernel;
use crate::core::{
    matmul_transposed_packed_inner, matvec_packed_accumulate_inner, matvec_packed_centered_inner,
    PackedMicrokernel, COL_BLOCK, ROW_BLOCK,
};
use crate::types::Elem;

/// A packed microkernel chosen at runtime.
#[derive(Debug, Clone, Copy)]
pub enum Kernel {
    /// Scalar kernel, available everywhere.
    Portable(PortableMicrokernel),
    /// 8-row AVX2 kernel, only built when AVX2 was detected.
    #[cfg(target_arch = "x86_64")]
    Avx2(Avx2Microkernel),
}

impl Kernel {
    /// The fastest kernel for the running CPU.
    pub fn select() -> Self {
        #[cfg(target_arch = "x86_64")]
        if simd_level() >= SimdLevel::Avx2 {
            if let Some(k) = Avx2Microkernel::detect() {
                return Kernel::Avx2(k);
            }
        }
        Self::portable()
    }

    /// The portable reference kernel.
    pub fn portable() -> Self {
        Kernel::Portable(PortableMicrokernel)
    }
}

impl PackedMicrokernel for Kernel {
    #[inline]
    fn rows(&self, a: &[Elem], lda: usize, b: &[Elem], k: usize, sub: Elem) -> [Elem; ROW_BLOCK] {
        match self {
            Kernel::Portable(kernel) => kernel.rows(a, lda, b, k, sub),
            #[cfg(target_arch = "x86_64")]
            Kernel::Avx2(kernel) => kernel.rows(a, lda, b, k, sub),
        }
    }

    #[inline]
    fn cols(&self, a: &[Elem], b: &[Elem], ldb: usize, k: usize) -> [Elem; COL_BLOCK] {
        match self {
            Kernel::Portable(kernel) => kernel.cols(a, b, ldb, k),
            #[cfg(target_arch = "x86_64")]
            Kernel::Avx2(kernel) => kernel.cols(a, b, ldb, k),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Kernel::Portable(kernel) => kernel.name(),
            #[cfg(target_arch = "x86_64")]
            Kernel::Avx2(kernel) => kernel.name(),
        }
    }
}

/// [`matvec_packed_accumulate_inner`] with the best available kernel.
pub fn matvec_packed_accumulate_dispatch(
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
) {
    matvec_packed_accumulate_inner(&Kernel::select(), out, a, b, a_rows, a_cols);
}

/// [`matvec_packed_centered_inner`] with the best available kernel.
pub fn matvec_packed_centered_dispatch(
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    sub: Elem,
) {
    matvec_packed_centered_inner(&Kernel::select(), out, a, b, a_rows, a_cols, sub);
}

/// [`matmul_transposed_packed_inner`] with the best available kernel.
pub fn matmul_transposed_packed_dispatch(
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_rows: usize,
    b_cols: usize,
) {
    matmul_transposed_packed_inner(&Kernel::select(), out, a, b, a_rows, a_cols, b_rows, b_cols);
}
