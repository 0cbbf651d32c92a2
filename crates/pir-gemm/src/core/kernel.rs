//! Packed microkernel trait and the portable reference implementation.

use super::tiling::{COL_BLOCK, ROW_BLOCK};
use crate::types::{unpack_word, Elem, LANES};

/// An 8-wide block of packed dot products.
///
/// Every implementation must return exactly what [`PortableMicrokernel`]
/// returns; the trait only exists so SIMD paths can sit behind the same loop
/// structure.
pub trait PackedMicrokernel: Copy + Send + Sync {
    /// Dot products of [`ROW_BLOCK`] packed rows against one expanded vector.
    ///
    /// Row `c` starts at `a[c * lda]` and has `k` words; `b` holds `3 * k`
    /// expanded entries. Each decoded lane has `sub` subtracted (wrapping)
    /// before it is multiplied; pass `0` for a plain product.
    fn rows(&self, a: &[Elem], lda: usize, b: &[Elem], k: usize, sub: Elem) -> [Elem; ROW_BLOCK];

    /// Dot products of one packed row against [`COL_BLOCK`] expanded vectors.
    ///
    /// `a` holds `k` words; vector `c` starts at `b[c * ldb]` and has `3 * k`
    /// entries.
    fn cols(&self, a: &[Elem], b: &[Elem], ldb: usize, k: usize) -> [Elem; COL_BLOCK];

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// Scalar microkernel written so the compiler can vectorize the 8-wide
/// accumulator updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableMicrokernel;

impl PackedMicrokernel for PortableMicrokernel {
    #[inline]
    fn rows(&self, a: &[Elem], lda: usize, b: &[Elem], k: usize, sub: Elem) -> [Elem; ROW_BLOCK] {
        debug_assert!(k == 0 || a.len() >= (ROW_BLOCK - 1) * lda + k);
        debug_assert!(b.len() >= LANES * k);

        let mut acc = [0 as Elem; ROW_BLOCK];
        for j in 0..k {
            let q = &b[LANES * j..LANES * j + LANES];
            for (c, slot) in acc.iter_mut().enumerate() {
                let [v0, v1, v2] = unpack_word(a[c * lda + j]);
                *slot = slot
                    .wrapping_add(v0.wrapping_sub(sub).wrapping_mul(q[0]))
                    .wrapping_add(v1.wrapping_sub(sub).wrapping_mul(q[1]))
                    .wrapping_add(v2.wrapping_sub(sub).wrapping_mul(q[2]));
            }
        }
        acc
    }

    #[inline]
    fn cols(&self, a: &[Elem], b: &[Elem], ldb: usize, k: usize) -> [Elem; COL_BLOCK] {
        debug_assert!(a.len() >= k);
        debug_assert!(k == 0 || b.len() >= (COL_BLOCK - 1) * ldb + LANES * k);

        let mut acc = [0 as Elem; COL_BLOCK];
        for (j, &word) in a[..k].iter().enumerate() {
            let [v0, v1, v2] = unpack_word(word);
            let base = LANES * j;
            for (c, slot) in acc.iter_mut().enumerate() {
                let q = &b[c * ldb + base..c * ldb + base + LANES];
                *slot = slot
                    .wrapping_add(v0.wrapping_mul(q[0]))
                    .wrapping_add(v1.wrapping_mul(q[1]))
                    .wrapping_add(v2.wrapping_mul(q[2]));
            }
        }
        acc
    }

    fn name(&self) -> &'static str {
        "portable"
    }
}

/// Dot product of one packed row with one expanded vector, each lane offset
/// by `-sub`. Used for rows and columns left over after full blocks.
#[inline]
pub fn packed_dot(a: &[Elem], b: &[Elem], sub: Elem) -> Elem {
    debug_assert!(b.len() >= LANES * a.len());

    a.iter()
        .zip(b.chunks_exact(LANES))
        .fold(0 as Elem, |acc, (&word, q)| {
            let [v0, v1, v2] = unpack_word(word);
            acc.wrapping_add(v0.wrapping_sub(sub).wrapping_mul(q[0]))
                .wrapping_add(v1.wrapping_sub(sub).wrapping_mul(q[1]))
                .wrapping_add(v2.wrapping_sub(sub).wrapping_mul(q[2]))
        })
}
