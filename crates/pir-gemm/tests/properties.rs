//! Property-based tests for the packed kernels.
//!
//! Each property compares a packed or blocked kernel against a plain scalar
//! formula over the unpacked values:
//! - packed vs unpacked matrix-vector products
//! - both loop orders of the multiply-transpose kernel
//! - accumulate and overwrite write modes
//! - selected microkernel vs the portable one

use proptest::prelude::*;

use pir_gemm::core::{
    matmul_transposed_packed_inner, matvec_packed_accumulate_inner, matvec_packed_centered_inner,
};
use pir_gemm::{
    expand_vector, matmul_transposed_packed, matmul_transposed_packed_into, matvec,
    matvec_packed, matvec_packed_accumulate, matvec_packed_centered,
    matvec_packed_centered_into, pack_rows, packed_cols, transpose, Elem, Kernel,
};

/// A `rows x cols` matrix of 10-bit lane values.
fn arb_lanes(max_rows: usize, max_cols: usize) -> impl Strategy<Value = (usize, usize, Vec<Elem>)> {
    (1..=max_rows, 1..=max_cols).prop_flat_map(|(rows, cols)| {
        (
            Just(rows),
            Just(cols),
            prop::collection::vec(0..1024u32, rows * cols),
        )
    })
}

fn dot(row: &[Elem], v: &[Elem], sub: Elem) -> Elem {
    row.iter()
        .zip(v)
        .fold(0, |acc, (&x, &y)| acc.wrapping_add(x.wrapping_sub(sub).wrapping_mul(y)))
}

/// `out[i][j] = Σ_c a[i][c] * b[j][c]` over the logical columns.
fn reference_transposed(a: &[Elem], b: &[Elem], rows: usize, cols: usize, b_rows: usize, b_stride: usize) -> Vec<Elem> {
    let mut out = Vec::with_capacity(rows * b_rows);
    for i in 0..rows {
        for j in 0..b_rows {
            out.push(dot(
                &a[i * cols..(i + 1) * cols],
                &b[j * b_stride..j * b_stride + cols],
                0,
            ));
        }
    }
    out
}

/// Expanded B with `b_rows` rows whose first `cols` entries come from
/// `values` and whose padding entries are zero.
fn expand_rows(values: &[Elem], b_rows: usize, cols: usize, stride: usize) -> Vec<Elem> {
    let mut b = vec![0; b_rows * stride];
    for j in 0..b_rows {
        b[j * stride..j * stride + cols].copy_from_slice(&values[j * cols..(j + 1) * cols]);
    }
    b
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Packed matrix-vector product equals the dense product over unpacked lanes.
    #[test]
    fn prop_matvec_packed_matches_unpacked(
        (rows, cols, values) in arb_lanes(40, 20),
        seed in any::<u32>(),
    ) {
        let query: Vec<Elem> = (0..cols as u32).map(|c| seed.wrapping_mul(c + 1) ^ c).collect();
        let packed = pack_rows(&values, rows, cols).unwrap();
        let words = packed_cols(cols);
        let expanded = expand_vector(&query, words).unwrap();

        prop_assert_eq!(
            matvec_packed(&packed, &expanded, rows, words).unwrap(),
            matvec(&values, &query, rows, cols).unwrap()
        );
    }

    /// Centered product equals `Σ (v - sub) * q` over the logical columns.
    #[test]
    fn prop_matvec_centered_matches_formula(
        (rows, cols, values) in arb_lanes(40, 20),
        sub in any::<u32>(),
        seed in any::<u32>(),
    ) {
        let query: Vec<Elem> = (0..cols as u32).map(|c| seed.rotate_left(c) ^ c).collect();
        let packed = pack_rows(&values, rows, cols).unwrap();
        let words = packed_cols(cols);
        let expanded = expand_vector(&query, words).unwrap();

        let expected: Vec<Elem> = values.chunks(cols).map(|row| dot(row, &query, sub)).collect();
        prop_assert_eq!(
            matvec_packed_centered(&packed, &expanded, rows, words, sub).unwrap(),
            expected
        );
    }

    /// Packed multiply-transpose equals the dense `A * B^T` for any shape,
    /// whichever loop order the shape selects.
    #[test]
    fn prop_transposed_packed_matches_dense(
        (rows, cols, values) in arb_lanes(24, 24),
        b_rows in 1usize..20,
        extra_stride in 0usize..4,
        seed in any::<u32>(),
    ) {
        let words = packed_cols(cols);
        let stride = 3 * words + extra_stride;
        let b_values: Vec<Elem> = (0..(b_rows * cols) as u32)
            .map(|x| x.wrapping_mul(0x9E37_79B9) ^ seed)
            .collect();
        let b = expand_rows(&b_values, b_rows, cols, stride);
        let packed = pack_rows(&values, rows, cols).unwrap();

        prop_assert_eq!(
            matmul_transposed_packed(&packed, &b, rows, words, b_rows, stride).unwrap(),
            reference_transposed(&values, &b_values, rows, cols, b_rows, cols)
        );
    }

    /// Padding A with zero words until it is no longer tall flips the loop
    /// order without changing the product.
    #[test]
    fn prop_zero_padding_flips_strategy(
        (rows, cols, values) in arb_lanes(32, 6),
        b_rows in 1usize..20,
        seed in any::<u32>(),
    ) {
        let words = packed_cols(cols);
        prop_assume!(rows > words);

        let packed = pack_rows(&values, rows, cols).unwrap();
        let stride = 3 * rows;
        // B entries past the original columns pair with zero lanes
        let b: Vec<Elem> = (0..(b_rows * stride) as u32).map(|x| x.wrapping_mul(seed | 1)).collect();

        let mut padded = vec![0; rows * rows];
        for i in 0..rows {
            padded[i * rows..i * rows + words].copy_from_slice(&packed[i * words..(i + 1) * words]);
        }

        prop_assert_eq!(
            matmul_transposed_packed(&packed, &b, rows, words, b_rows, stride).unwrap(),
            matmul_transposed_packed(&padded, &b, rows, rows, b_rows, stride).unwrap()
        );
    }

    /// Accumulating the same product twice doubles it.
    #[test]
    fn prop_accumulate_twice_doubles(
        (rows, cols, values) in arb_lanes(30, 10),
        seed in any::<u32>(),
    ) {
        let packed = pack_rows(&values, rows, cols).unwrap();
        let words = packed_cols(cols);
        let b: Vec<Elem> = (0..3 * words as u32).map(|x| x ^ seed).collect();

        let once = matvec_packed(&packed, &b, rows, words).unwrap();
        let mut out = vec![0; rows];
        matvec_packed_accumulate(&mut out, &packed, &b, rows, words).unwrap();
        matvec_packed_accumulate(&mut out, &packed, &b, rows, words).unwrap();

        let doubled: Vec<Elem> = once.iter().map(|v| v.wrapping_mul(2)).collect();
        prop_assert_eq!(out, doubled);
    }

    /// Overwriting kernels ignore whatever the output held before.
    #[test]
    fn prop_overwrite_ignores_prior_output(
        (rows, cols, values) in arb_lanes(30, 10),
        garbage in any::<u32>(),
        sub in 0u32..1024,
    ) {
        let packed = pack_rows(&values, rows, cols).unwrap();
        let words = packed_cols(cols);
        let b: Vec<Elem> = (0..3 * words as u32).map(|x| x * 7 + 1).collect();

        let fresh = matvec_packed_centered(&packed, &b, rows, words, sub).unwrap();
        let mut out = vec![garbage; rows];
        matvec_packed_centered_into(&mut out, &packed, &b, rows, words, sub).unwrap();
        prop_assert_eq!(&out, &fresh);
        matvec_packed_centered_into(&mut out, &packed, &b, rows, words, sub).unwrap();
        prop_assert_eq!(&out, &fresh);

        let b_rows = 9;
        let stride = 3 * words;
        let b_mat: Vec<Elem> = (0..(b_rows * stride) as u32).collect();
        let fresh = matmul_transposed_packed(&packed, &b_mat, rows, words, b_rows, stride).unwrap();
        let mut out = vec![garbage; rows * b_rows];
        matmul_transposed_packed_into(&mut out, &packed, &b_mat, rows, words, b_rows, stride).unwrap();
        prop_assert_eq!(out, fresh);
    }

    /// Transposing twice is the identity.
    #[test]
    fn prop_transpose_twice(
        (rows, cols, values) in arb_lanes(20, 20),
    ) {
        let t = transpose(&values, rows, cols).unwrap();
        prop_assert_eq!(transpose(&t, cols, rows).unwrap(), values);
    }

    /// The runtime-selected microkernel matches the portable one.
    #[test]
    fn prop_selected_kernel_matches_portable(
        (rows, cols, values) in arb_lanes(40, 12),
        sub in any::<u32>(),
        seed in any::<u32>(),
    ) {
        let packed = pack_rows(&values, rows, cols).unwrap();
        let words = packed_cols(cols);
        let b: Vec<Elem> = (0..3 * words as u32).map(|x| x.wrapping_mul(seed)).collect();
        let portable = Kernel::portable();
        let selected = Kernel::select();

        let mut lhs = vec![1; rows];
        let mut rhs = vec![1; rows];
        matvec_packed_accumulate_inner(&selected, &mut lhs, &packed, &b, rows, words);
        matvec_packed_accumulate_inner(&portable, &mut rhs, &packed, &b, rows, words);
        prop_assert_eq!(&lhs, &rhs);

        matvec_packed_centered_inner(&selected, &mut lhs, &packed, &b, rows, words, sub);
        matvec_packed_centered_inner(&portable, &mut rhs, &packed, &b, rows, words, sub);
        prop_assert_eq!(&lhs, &rhs);

        let b_rows = 17;
        let b_mat: Vec<Elem> = (0..(b_rows * 3 * words) as u32).map(|x| x ^ seed).collect();
        let mut lhs = vec![0; rows * b_rows];
        let mut rhs = vec![0; rows * b_rows];
        matmul_transposed_packed_inner(&selected, &mut lhs, &packed, &b_mat, rows, words, b_rows, 3 * words);
        matmul_transposed_packed_inner(&portable, &mut rhs, &packed, &b_mat, rows, words, b_rows, 3 * words);
        prop_assert_eq!(lhs, rhs);
    }
}
