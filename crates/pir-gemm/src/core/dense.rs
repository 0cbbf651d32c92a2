//! Unpacked reference kernels.
//!
//! These are the baselines every packed kernel is checked against once its
//! packed operand is unpacked.

use crate::types::Elem;

/// Writes the `cols x rows` transpose of a `rows x cols` matrix into `out`.
///
/// Overwrites `out[..rows * cols]`.
pub fn transpose_inner(out: &mut [Elem], input: &[Elem], rows: usize, cols: usize) {
    debug_assert!(input.len() >= rows * cols);
    debug_assert!(out.len() >= rows * cols);

    if rows == 0 || cols == 0 {
        return;
    }
    for (i, row) in input.chunks_exact(cols).take(rows).enumerate() {
        for (j, &v) in row.iter().enumerate() {
            out[j * rows + i] = v;
        }
    }
}

/// `out += a * b` for `a` of `a_rows x a_cols` and `b` of `a_cols x b_cols`.
///
/// Accumulates; zero `out` first for a fresh product.
pub fn matmul_accumulate_inner(
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_cols: usize,
) {
    debug_assert!(a.len() >= a_rows * a_cols);
    debug_assert!(b.len() >= a_cols * b_cols);
    debug_assert!(out.len() >= a_rows * b_cols);

    if a_cols == 0 || b_cols == 0 {
        return;
    }
    for (a_row, out_row) in a
        .chunks_exact(a_cols)
        .zip(out.chunks_exact_mut(b_cols))
        .take(a_rows)
    {
        for (&x, b_row) in a_row.iter().zip(b.chunks_exact(b_cols)) {
            for (o, &y) in out_row.iter_mut().zip(b_row) {
                *o = o.wrapping_add(x.wrapping_mul(y));
            }
        }
    }
}

/// `out = a * b` for `a` of `a_rows x a_cols` and `b` of length `a_cols`.
///
/// Overwrites `out[..a_rows]`.
pub fn matvec_inner(out: &mut [Elem], a: &[Elem], b: &[Elem], a_rows: usize, a_cols: usize) {
    debug_assert!(a.len() >= a_rows * a_cols);
    debug_assert!(b.len() >= a_cols);
    debug_assert!(out.len() >= a_rows);

    let b = &b[..a_cols];
    for (i, o) in out[..a_rows].iter_mut().enumerate() {
        let row = &a[i * a_cols..(i + 1) * a_cols];
        *o = row
            .iter()
            .zip(b)
            .fold(0 as Elem, |acc, (&x, &y)| acc.wrapping_add(x.wrapping_mul(y)));
    }
}
