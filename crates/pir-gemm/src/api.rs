use crate::core::{
    matmul_accumulate_inner, matvec_inner, transpose_inner, PackedMicrokernel, Strategy,
};
use crate::error::{extent, require_len, zeroed, KernelError, Result};
use crate::simd::{
    matmul_transposed_packed_dispatch, matvec_packed_accumulate_dispatch,
    matvec_packed_centered_dispatch, Kernel,
};
use crate::types::{Elem, LANES};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Transpose a row-major matrix into a caller-supplied buffer.
///
/// Writes `out[j * rows + i] = input[i * cols + j]`, overwriting the first
/// `rows * cols` entries of `out`.
///
/// # Example
///
/// ```
/// use pir_gemm::transpose_into;
///
/// let input = [1, 2, 3, 4, 5, 6]; // 2x3
/// let mut out = [0; 6];
/// transpose_into(&mut out, &input, 2, 3).unwrap();
/// assert_eq!(out, [1, 4, 2, 5, 3, 6]); // 3x2
/// ```
pub fn transpose_into(out: &mut [Elem], input: &[Elem], rows: usize, cols: usize) -> Result<()> {
    let len = check_transpose(input, rows, cols)?;
    require_len("out", out.len(), len)?;

    transpose_inner(out, input, rows, cols);
    Ok(())
}

/// Transpose a row-major `rows x cols` matrix, returning `cols x rows`.
pub fn transpose(input: &[Elem], rows: usize, cols: usize) -> Result<Vec<Elem>> {
    let mut out = zeroed(check_transpose(input, rows, cols)?)?;
    transpose_into(&mut out, input, rows, cols)?;
    Ok(out)
}

/// Checks the input of a transpose; returns the output length.
fn check_transpose(input: &[Elem], rows: usize, cols: usize) -> Result<usize> {
    let len = extent(rows, cols)?;
    require_len("input", input.len(), len)?;
    Ok(len)
}

/// Dense matrix product, accumulated into `out`: C += A * B
///
/// # Arguments
/// - `out`: Matrix C, `a_rows x b_cols`, added to in place
/// - `a`: Matrix A data in row-major order, `a_rows x a_cols`
/// - `b`: Matrix B data in row-major order, `a_cols x b_cols`
///
/// # Example
///
/// ```
/// use pir_gemm::matmul_accumulate;
///
/// let a = [1, 2, 3, 4];
/// let b = [5, 6, 7, 8];
/// let mut c = [0; 4];
///
/// matmul_accumulate(&mut c, &a, &b, 2, 2, 2).unwrap();
/// assert_eq!(c, [19, 22, 43, 50]);
///
/// matmul_accumulate(&mut c, &a, &b, 2, 2, 2).unwrap();
/// assert_eq!(c, [38, 44, 86, 100]);
/// ```
pub fn matmul_accumulate(
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_cols: usize,
) -> Result<()> {
    let len = check_matmul(a, b, a_rows, a_cols, b_cols)?;
    require_len("out", out.len(), len)?;

    matmul_accumulate_inner(out, a, b, a_rows, a_cols, b_cols);
    Ok(())
}

/// Dense matrix product into a fresh zeroed `a_rows x b_cols` buffer.
pub fn matmul(
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_cols: usize,
) -> Result<Vec<Elem>> {
    let mut out = zeroed(check_matmul(a, b, a_rows, a_cols, b_cols)?)?;
    matmul_accumulate(&mut out, a, b, a_rows, a_cols, b_cols)?;
    Ok(out)
}

/// Checks dense product operands; returns the output length.
fn check_matmul(
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_cols: usize,
) -> Result<usize> {
    require_len("a", a.len(), extent(a_rows, a_cols)?)?;
    require_len("b", b.len(), extent(a_cols, b_cols)?)?;
    extent(a_rows, b_cols)
}

/// Dense matrix-vector product: `out[i] = Σ_j A[i][j] * b[j]`.
///
/// Overwrites the first `a_rows` entries of `out`.
pub fn matvec_into(
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
) -> Result<()> {
    check_matvec(a, b, a_rows, a_cols)?;
    require_len("out", out.len(), a_rows)?;

    matvec_inner(out, a, b, a_rows, a_cols);
    Ok(())
}

/// Dense matrix-vector product into a fresh buffer of length `a_rows`.
pub fn matvec(a: &[Elem], b: &[Elem], a_rows: usize, a_cols: usize) -> Result<Vec<Elem>> {
    check_matvec(a, b, a_rows, a_cols)?;
    let mut out = zeroed(a_rows)?;
    matvec_into(&mut out, a, b, a_rows, a_cols)?;
    Ok(out)
}

fn check_matvec(a: &[Elem], b: &[Elem], a_rows: usize, a_cols: usize) -> Result<()> {
    require_len("a", a.len(), extent(a_rows, a_cols)?)?;
    require_len("b", b.len(), a_cols)
}

fn check_packed_vector(a: &[Elem], b: &[Elem], a_rows: usize, a_cols: usize) -> Result<()> {
    require_len("a", a.len(), extent(a_rows, a_cols)?)?;
    require_len("b", b.len(), extent(LANES, a_cols)?)
}

/// Packed matrix times expanded vector, accumulated into `out`.
///
/// Computes `out[i] += Σ_j Σ_l decode(A[i][j], l) * b[3j + l]`.
///
/// # Arguments
/// - `out`: Output vector, at least `a_rows` entries, added to in place
/// - `a`: Packed matrix, `a_rows x a_cols` words
/// - `b`: Expanded vector, at least `3 * a_cols` entries
///
/// # Example
///
/// ```
/// use pir_gemm::matvec_packed_accumulate;
///
/// let a = [0x0000_0001]; // lanes [1, 0, 0]
/// let b = [5, 7, 9];
/// let mut out = [0];
///
/// matvec_packed_accumulate(&mut out, &a, &b, 1, 1).unwrap();
/// assert_eq!(out, [5]);
/// ```
pub fn matvec_packed_accumulate(
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
) -> Result<()> {
    check_packed_vector(a, b, a_rows, a_cols)?;
    require_len("out", out.len(), a_rows)?;
    log::trace!("matvec_packed_accumulate: {}x{} words", a_rows, a_cols);

    matvec_packed_accumulate_dispatch(out, a, b, a_rows, a_cols);
    Ok(())
}

/// Packed matrix times expanded vector into a fresh buffer of length `a_rows`.
pub fn matvec_packed(a: &[Elem], b: &[Elem], a_rows: usize, a_cols: usize) -> Result<Vec<Elem>> {
    check_packed_vector(a, b, a_rows, a_cols)?;
    let mut out = zeroed(a_rows)?;
    matvec_packed_accumulate(&mut out, a, b, a_rows, a_cols)?;
    Ok(out)
}

/// Packed matrix times expanded vector with every decoded lane shifted by
/// `-sub` first.
///
/// Computes `out[i] = Σ_j Σ_l (decode(A[i][j], l) - sub) * b[3j + l]` with the
/// subtraction wrapping modulo 2^32. Overwrites the first `a_rows` entries of
/// `out`.
///
/// # Example
///
/// ```
/// use pir_gemm::matvec_packed_centered_into;
///
/// // lane 0 decodes to 0, so 0 - 1 wraps to u32::MAX
/// let a = [0];
/// let b = [1, 0, 0];
/// let mut out = [42];
///
/// matvec_packed_centered_into(&mut out, &a, &b, 1, 1, 1).unwrap();
/// assert_eq!(out, [u32::MAX]);
/// ```
pub fn matvec_packed_centered_into(
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    sub: Elem,
) -> Result<()> {
    check_packed_vector(a, b, a_rows, a_cols)?;
    require_len("out", out.len(), a_rows)?;
    log::trace!(
        "matvec_packed_centered_into: {}x{} words, sub={}",
        a_rows,
        a_cols,
        sub
    );

    matvec_packed_centered_dispatch(out, a, b, a_rows, a_cols, sub);
    Ok(())
}

/// Centered packed matrix-vector product into a fresh buffer.
pub fn matvec_packed_centered(
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    sub: Elem,
) -> Result<Vec<Elem>> {
    check_packed_vector(a, b, a_rows, a_cols)?;
    let mut out = zeroed(a_rows)?;
    matvec_packed_centered_into(&mut out, a, b, a_rows, a_cols, sub)?;
    Ok(out)
}

/// Checks multiply-transpose operands; returns the output length.
fn check_transposed(
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_rows: usize,
    b_cols: usize,
) -> Result<usize> {
    let expanded = extent(LANES, a_cols)?;
    if b_cols < expanded {
        return Err(KernelError::DimensionMismatch(format!(
            "B stride {} is shorter than 3 * {} packed columns",
            b_cols, a_cols
        )));
    }
    require_len("a", a.len(), extent(a_rows, a_cols)?)?;
    require_len("b", b.len(), extent(b_rows, b_cols)?)?;
    extent(a_rows, b_rows)
}

/// Packed matrix times a pre-transposed expanded matrix.
///
/// Computes
/// `out[i * b_rows + j] = Σ_k Σ_l decode(A[i][k], l) * B[j * b_cols + 3k + l]`
/// for the full `a_rows x b_rows` output, overwriting it. The loop order is
/// picked from the shape of A; both orders give identical results.
///
/// # Arguments
/// - `a`: Packed matrix, `a_rows x a_cols` words
/// - `b`: `b_rows` expanded rows of stride `b_cols`
/// - `b_cols`: Row stride of B, at least `3 * a_cols`
///
/// # Example
///
/// ```
/// use pir_gemm::{matmul_transposed_packed_into, pack_word};
///
/// let a = [pack_word([1, 2, 3])]; // 1x1 packed
/// let b = [
///     1, 1, 1, // row 0
///     1, 0, 2, // row 1
/// ];
/// let mut out = [0; 2];
///
/// matmul_transposed_packed_into(&mut out, &a, &b, 1, 1, 2, 3).unwrap();
/// assert_eq!(out, [6, 7]);
/// ```
pub fn matmul_transposed_packed_into(
    out: &mut [Elem],
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_rows: usize,
    b_cols: usize,
) -> Result<()> {
    let len = check_transposed(a, b, a_rows, a_cols, b_rows, b_cols)?;
    require_len("out", out.len(), len)?;

    log::debug!(
        "matmul_transposed_packed: A {}x{} words, B {}x{}, {:?} strategy, {} kernel",
        a_rows,
        a_cols,
        b_rows,
        b_cols,
        Strategy::select(a_rows, a_cols),
        Kernel::select().name()
    );

    matmul_transposed_packed_dispatch(out, a, b, a_rows, a_cols, b_rows, b_cols);
    Ok(())
}

/// Packed multiply-transpose into a fresh `a_rows x b_rows` buffer.
pub fn matmul_transposed_packed(
    a: &[Elem],
    b: &[Elem],
    a_rows: usize,
    a_cols: usize,
    b_rows: usize,
    b_cols: usize,
) -> Result<Vec<Elem>> {
    let mut out = zeroed(check_transposed(a, b, a_rows, a_cols, b_rows, b_cols)?)?;
    matmul_transposed_packed_into(&mut out, a, b, a_rows, a_cols, b_rows, b_cols)?;
    Ok(out)
}

/// Answer a batch of expanded queries against one packed matrix.
///
/// Each query is multiplied with [`matvec_packed`]; the matrix is shared by
/// every product. With the `parallel` feature the queries run concurrently.
///
/// # Example
///
/// ```
/// use pir_gemm::{matvec_packed_batched, pack_word};
///
/// let db = [pack_word([1, 2, 3]), pack_word([4, 5, 6])]; // 2x1 packed
/// let queries = vec![vec![1, 0, 0], vec![0, 0, 1]];
///
/// let answers = matvec_packed_batched(&db, &queries, 2, 1).unwrap();
/// assert_eq!(answers, vec![vec![1, 4], vec![3, 6]]);
/// ```
pub fn matvec_packed_batched(
    a: &[Elem],
    queries: &[Vec<Elem>],
    a_rows: usize,
    a_cols: usize,
) -> Result<Vec<Vec<Elem>>> {
    require_len("a", a.len(), extent(a_rows, a_cols)?)?;
    let expanded = extent(LANES, a_cols)?;
    for (i, q) in queries.iter().enumerate() {
        if q.len() < expanded {
            return Err(KernelError::DimensionMismatch(format!(
                "query {} has {} entries, need {}",
                i,
                q.len(),
                expanded
            )));
        }
    }

    if queries.is_empty() {
        return Ok(Vec::new());
    }
    log::trace!(
        "matvec_packed_batched: {} queries, {}x{} words",
        queries.len(),
        a_rows,
        a_cols
    );

    #[cfg(feature = "parallel")]
    {
        queries
            .par_iter()
            .map(|q| matvec_packed(a, q, a_rows, a_cols))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        queries
            .iter()
            .map(|q| matvec_packed(a, q, a_rows, a_cols))
            .collect()
    }
}
