//! SIMD packed microkernels and runtime dispatch.
//!
//! # Supported Architectures
//!
//! | Architecture | Instruction Set | Register Width | Kernel |
//! |--------------|-----------------|----------------|--------|
//! | x86_64 | AVX2 | 256-bit (8 x u32) | [`Avx2Microkernel`] |
//! | Any | Portable | Scalar | [`PortableMicrokernel`] |
//!
//! # Runtime Dispatch
//!
//! 1. [`simd_level()`] detects CPU features once per process
//! 2. [`Kernel::select`] picks the matching microkernel
//! 3. The `*_dispatch` functions run the portable loop structure from
//!    [`crate::core`] with that microkernel
//!
//! Every microkernel returns bit-identical results to the portable one.
//!
//! # Microkernel Design
//!
//! With AVX2 the 8 row accumulators of a block live in one register:
//!
//! ```text
//! for j in 0..k:
//!     w   = gather(A[row + 0..8][j])          // 8 packed words
//!     acc += ((w      ) & 0x3FF) * broadcast(b[3j])
//!     acc += ((w >> 10) & 0x3FF) * broadcast(b[3j + 1])
//!     acc += ((w >> 20) & 0x3FF) * broadcast(b[3j + 2])
//! ```
//!
//! # Module Contents
//!
//! - [`detect`](detect): CPU feature detection ([`SimdLevel`])
//! - [`dispatch`](dispatch): Runtime kernel selection ([`Kernel`])
//! - [`kernels`](kernels): Architecture-specific microkernels

pub mod detect;
pub mod dispatch;
pub mod kernels;

pub use detect::{simd_level, SimdLevel};
pub use dispatch::{
    matmul_transposed_packed_dispatch, matvec_packed_accumulate_dispatch,
    matvec_packed_centered_dispatch, Kernel,
};
pub use kernels::*;
