//! Packed-decode kernels, generic over the microkernel.
//!
//! Every function here reads a packed left operand (3 lanes per word, see
//! [`crate::types`]) and pairs lane `l` of word `j` with entry `3 * j + l` of
//! an expanded right operand. Full blocks of 8 go through the microkernel;
//! leftover rows or columns go through [`packed_dot`].

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::kernel::{packed_dot, PackedMicrokernel};
use super::tiling::{BlockIterator, Strategy, COL_BLOCK, ROW_BLOCK};
use crate::types::{unpack_word, Elem, LANES};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Write {
    Accumulate,
    Overwrite,
}

/// Reduces one chunk of at most [`ROW_BLOCK`] output rows starting at
/// `first_row`.
#[inline]
fn row_block<K: PackedMicrokernel>(
    kernel: &K,
    chunk: &mut [Elem],
    first_row: usize,
    a: &[Elem],
    b: &[Elem],
    a_cols: usize,
    sub: Elem,
    write: Write,
) {
    let base = first_row * a_cols;
    if chunk.len() == ROW_BLOCK {
        let sums = kernel.rows(&a[base..], a_cols, b, a_cols, sub);
        for (o, s) in chunk.iter_mut().zip(sums) {
            *o = match write {
                Write::Accumulate => o.wrapping_add(s),
                Write::Overwrite => s,
            };
        }
    } else {
        for (r, o) in chunk.iter_mut().enumerate() {
            let row = &a[base + r * a_cols..base + (r + 1) * a_cols];
            let s = packed_dot(row, b, sub);
            *o = match write {
                Write::Accumulate => o.wrapping_add(s),
                Write::Overwrite => s,
            };
        }
    }
}

fn matvec_packed_blocks<K: PackedMicrokernel>(
    kernel: &K,
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    sub: Elem,
    write: Write,
) {
    debug_assert!(a.len() >= a_rows * a_cols);
    debug_assert!(b.len() >= LANES * a_cols);
    debug_assert!(out.len() >= a_rows);

    let out = &mut out[..a_rows];
    let b = &b[..LANES * a_cols];

    #[cfg(feature = "parallel")]
    {
        out.par_chunks_mut(ROW_BLOCK)
            .enumerate()
            .for_each(|(blk, chunk)| {
                row_block(kernel, chunk, blk * ROW_BLOCK, a, b, a_cols, sub, write)
            });
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (blk, chunk) in out.chunks_mut(ROW_BLOCK).enumerate() {
            row_block(kernel, chunk, blk * ROW_BLOCK, a, b, a_cols, sub, write);
        }
    }
}

/// `out[i] += Σ_j Σ_l decode(a[i][j], l) * b[3j + l]`.
///
/// `a` is `a_rows x a_cols` packed words, `b` holds `3 * a_cols` expanded
/// entries. Accumulates; zero `out` first for a fresh product. `a_rows` need
/// not be a multiple of [`ROW_BLOCK`].
pub fn matvec_packed_accumulate_inner<K: PackedMicrokernel>(
    kernel: &K,
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
) {
    matvec_packed_blocks(kernel, out, a, b, a_rows, a_cols, 0, Write::Accumulate);
}

/// `out[i] = Σ_j Σ_l (decode(a[i][j], l) - sub) * b[3j + l]`, subtraction
/// wrapping mod 2^32.
///
/// Overwrites `out[..a_rows]`.
pub fn matvec_packed_centered_inner<K: PackedMicrokernel>(
    kernel: &K,
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    sub: Elem,
) {
    matvec_packed_blocks(kernel, out, a, b, a_rows, a_cols, sub, Write::Overwrite);
}

/// `out[i][j] = Σ_k Σ_l decode(a[i][k], l) * b[j * b_cols + 3k + l]`.
///
/// `a` is `a_rows x a_cols` packed words; `b` has `b_rows` rows of stride
/// `b_cols >= 3 * a_cols`. Writes the full `a_rows x b_rows` output,
/// overwriting it. The loop order is picked by [`Strategy::select`].
pub fn matmul_transposed_packed_inner<K: PackedMicrokernel>(
    kernel: &K,
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_rows: usize,
    b_cols: usize,
) {
    match Strategy::select(a_rows, a_cols) {
        Strategy::Tall => tall(out, a, b, a_rows, a_cols, b_rows, b_cols),
        Strategy::Wide => wide(kernel, out, a, b, a_rows, a_cols, b_rows, b_cols),
    }
}

fn check_transposed_shapes(
    out: &[Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_rows: usize,
    b_cols: usize,
) {
    debug_assert!(a.len() >= a_rows * a_cols);
    debug_assert!(b_cols >= LANES * a_cols);
    debug_assert!(b.len() >= b_rows * b_cols);
    debug_assert!(out.len() >= a_rows * b_rows);
}

/// One output row of the tall ordering: clear, then broadcast every decoded
/// lane of `a_row` across all `b_rows` outputs.
#[inline]
fn tall_row(out_row: &mut [Elem], a_row: &[Elem], b: &[Elem], b_cols: usize) {
    out_row.fill(0);
    for (k, &word) in a_row.iter().enumerate() {
        let [v0, v1, v2] = unpack_word(word);
        let col = LANES * k;
        for (j, o) in out_row.iter_mut().enumerate() {
            let q = &b[j * b_cols + col..j * b_cols + col + LANES];
            *o = o
                .wrapping_add(v0.wrapping_mul(q[0]))
                .wrapping_add(v1.wrapping_mul(q[1]))
                .wrapping_add(v2.wrapping_mul(q[2]));
        }
    }
}

pub(crate) fn tall(
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_rows: usize,
    b_cols: usize,
) {
    check_transposed_shapes(out, a, b, a_rows, a_cols, b_rows, b_cols);
    if a_rows == 0 || b_rows == 0 {
        return;
    }
    let out = &mut out[..a_rows * b_rows];

    #[cfg(feature = "parallel")]
    {
        out.par_chunks_mut(b_rows).enumerate().for_each(|(i, out_row)| {
            tall_row(out_row, &a[i * a_cols..(i + 1) * a_cols], b, b_cols)
        });
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (i, out_row) in out.chunks_mut(b_rows).enumerate() {
            tall_row(out_row, &a[i * a_cols..(i + 1) * a_cols], b, b_cols);
        }
    }
}

/// Output cells `j0..j0 + dst.len()` of one row of the wide ordering.
#[inline]
fn wide_cells<K: PackedMicrokernel>(
    kernel: &K,
    dst: &mut [Elem],
    a_row: &[Elem],
    b: &[Elem],
    j0: usize,
    a_cols: usize,
    b_cols: usize,
) {
    if dst.len() == COL_BLOCK {
        dst.copy_from_slice(&kernel.cols(a_row, &b[j0 * b_cols..], b_cols, a_cols));
    } else {
        for (t, o) in dst.iter_mut().enumerate() {
            let start = (j0 + t) * b_cols;
            *o = packed_dot(a_row, &b[start..start + LANES * a_cols], 0);
        }
    }
}

pub(crate) fn wide<K: PackedMicrokernel>(
    kernel: &K,
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_rows: usize,
    b_cols: usize,
) {
    check_transposed_shapes(out, a, b, a_rows, a_cols, b_rows, b_cols);
    if a_rows == 0 || b_rows == 0 {
        return;
    }
    let out = &mut out[..a_rows * b_rows];

    #[cfg(feature = "parallel")]
    {
        out.par_chunks_mut(b_rows).enumerate().for_each(|(i, out_row)| {
            let a_row = &a[i * a_cols..(i + 1) * a_cols];
            for (j0, width) in BlockIterator::new(b_rows, COL_BLOCK) {
                wide_cells(kernel, &mut out_row[j0..j0 + width], a_row, b, j0, a_cols, b_cols);
            }
        });
    }

    #[cfg(not(feature = "parallel"))]
    {
        // Block of B outermost so its 8 rows stay in cache while A is swept.
        for (j0, width) in BlockIterator::new(b_rows, COL_BLOCK) {
            for i in 0..a_rows {
                let a_row = &a[i * a_cols..(i + 1) * a_cols];
                let dst = &mut out[i * b_rows + j0..i * b_rows + j0 + width];
                wide_cells(kernel, dst, a_row, b, j0, a_cols, b_cols);
            }
        }
    }
}
