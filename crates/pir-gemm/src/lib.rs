//! Dense and packed-integer matrix kernels for a PIR server.
//!
//! The server holds its database as a matrix of 32-bit words, three 10-bit
//! entries per word. Answering a query is a product between that matrix and
//! a query vector or matrix; the kernels here decode the packed words inline
//! while multiplying. All arithmetic wraps modulo 2^32.
//!
//! # Quick Start
//!
//! ```
//! use pir_gemm::{expand_vector, matvec_packed, pack_rows, packed_cols};
//!
//! // 2x4 database of 10-bit entries
//! let db = [1, 2, 3, 4, 5, 6, 7, 8];
//! let packed = pack_rows(&db, 2, 4).unwrap();
//! let words = packed_cols(4); // 2 words per row
//!
//! // select column 3
//! let query = expand_vector(&[0, 0, 0, 1], words).unwrap();
//! let answer = matvec_packed(&packed, &query, 2, words).unwrap();
//! assert_eq!(answer, vec![4, 8]);
//! ```
//!
//! # Owned Matrices
//!
//! ```
//! use pir_gemm::Matrix;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let db = Matrix::random(64, 30, 1024, &mut rng).unwrap();
//! let packed = db.squish().unwrap(); // 64 x 10 words
//!
//! let query = Matrix::random(30, 1, 0, &mut rng).unwrap();
//! assert_eq!(packed.mul_vec_packed(&query).unwrap(), db.mul(&query).unwrap());
//! ```
//!
//! # Write Modes
//!
//! Functions ending in `_accumulate` add into their output; functions ending
//! in `_into` overwrite it. The allocating forms start from zero.
//!
//! | Operation | Checked entry point | Output |
//! |-----------|---------------------|--------|
//! | Transpose | [`transpose_into`] | overwrite |
//! | Dense multiply | [`matmul_accumulate`] | accumulate |
//! | Dense matrix-vector | [`matvec_into`] | overwrite |
//! | Packed matrix-vector | [`matvec_packed_accumulate`] | accumulate |
//! | Centered packed matrix-vector | [`matvec_packed_centered_into`] | overwrite |
//! | Packed multiply-transpose | [`matmul_transposed_packed_into`] | overwrite |
//!
//! # Features
//!
//! - `simd` (default): AVX2 microkernels, selected at runtime on x86_64
//! - `parallel`: split packed kernels across a rayon thread pool
//!
//! # Module Organization
//!
//! - [`api`]: Checked entry points returning [`Result`]
//! - [`core`]: Portable kernels, generic over [`core::PackedMicrokernel`]
//! - [`simd`]: SIMD microkernels and runtime dispatch
//! - [`types`]: Element type, packed word format, [`Matrix`]
//! - [`error`]: [`KernelError`]

pub mod api;
pub mod core;
pub mod error;
pub mod simd;
pub mod types;

pub use api::{
    matmul, matmul_accumulate, matmul_transposed_packed, matmul_transposed_packed_into, matvec,
    matvec_into, matvec_packed, matvec_packed_accumulate, matvec_packed_batched,
    matvec_packed_centered, matvec_packed_centered_into, transpose, transpose_into,
};
pub use error::{KernelError, Result};
pub use simd::{simd_level, Kernel, SimdLevel};
pub use types::{
    decode_lane, expand_vector, pack_rows, pack_word, packed_cols, unpack_rows, unpack_word,
    Elem, Matrix, LANES, LANE_BITS, LANE_MASK,
};
