//! Portable kernel implementations.
//!
//! This module holds the semantic definition of every kernel. The SIMD layer
//! only swaps the [`PackedMicrokernel`] plugged into the packed loops; the
//! loop structure, remainder handling and accumulate/overwrite behavior all
//! live here.
//!
//! # Kernels
//!
//! | Function | Operands | Output |
//! |----------|----------|--------|
//! | [`transpose_inner`] | `rows x cols` | overwrite `cols x rows` |
//! | [`matmul_accumulate_inner`] | A `m x k`, B `k x n` | accumulate `m x n` |
//! | [`matvec_inner`] | A `m x k`, b `k` | overwrite `m` |
//! | [`matvec_packed_accumulate_inner`] | packed A `m x k`, expanded b `3k` | accumulate `m` |
//! | [`matvec_packed_centered_inner`] | packed A `m x k`, expanded b `3k`, `sub` | overwrite `m` |
//! | [`matmul_transposed_packed_inner`] | packed A `m x k`, B `n` rows of stride `>= 3k` | overwrite `m x n` |
//!
//! # Blocking
//!
//! The packed vector kernels reduce [`ROW_BLOCK`] rows at a time:
//!
//! ```text
//! for each block of 8 rows:
//!     acc[0..8] = 0
//!     for j in 0..k:
//!         for c in 0..8:
//!             w = A[row + c][j]
//!             acc[c] += lane0(w) * b[3j] + lane1(w) * b[3j+1] + lane2(w) * b[3j+2]
//! rows past the last full block: one packed dot product each
//! ```
//!
//! The packed multiply-transpose kernel has two loop orders selected by
//! [`Strategy::select`]; see [`Strategy`].
//!
//! # Module Contents
//!
//! - [`dense`](dense): Unpacked reference kernels
//! - [`kernel`](kernel): Microkernel trait and portable implementation
//! - [`packed`](packed): Packed-decode kernels
//! - [`tiling`](tiling): Block sizes, loop-order selection, block iteration

mod dense;
mod kernel;
mod packed;
mod tiling;

pub use dense::{matmul_accumulate_inner, matvec_inner, transpose_inner};
pub use kernel::{packed_dot, PackedMicrokernel, PortableMicrokernel};
pub use packed::{
    matmul_transposed_packed_inner, matvec_packed_accumulate_inner, matvec_packed_centered_inner,
};
pub use tiling::{BlockIterator, Strategy, COL_BLOCK, ROW_BLOCK};
