//! AVX2 packed microkernel.
//!
//! One `__m256i` holds the 8 accumulators of a block. Lanes are decoded with
//! a shift and mask per lane; `_mm256_mullo_epi32` keeps the low 32 bits of
//! each product, which is exactly the wrapping product the portable kernel
//! computes.

use std::arch::x86_64::*;

use crate::core::{PackedMicrokernel, COL_BLOCK, ROW_BLOCK};
use crate::types::{unpack_word, Elem, LANES, LANE_BITS, LANE_MASK};

const SHIFT_LANE1: i32 = LANE_BITS as i32;
const SHIFT_LANE2: i32 = 2 * LANE_BITS as i32;

/// AVX2 implementation of [`PackedMicrokernel`].
///
/// Can only be obtained through [`Avx2Microkernel::detect`], so holding one
/// proves the CPU supports AVX2.
#[derive(Debug, Clone, Copy)]
pub struct Avx2Microkernel {
    _private: (),
}

impl Avx2Microkernel {
    /// Returns the kernel if the running CPU supports AVX2.
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("avx2") {
            Some(Self { _private: () })
        } else {
            None
        }
    }
}

impl PackedMicrokernel for Avx2Microkernel {
    #[inline]
    fn rows(&self, a: &[Elem], lda: usize, b: &[Elem], k: usize, sub: Elem) -> [Elem; ROW_BLOCK] {
        if k == 0 {
            return [0; ROW_BLOCK];
        }
        assert!(fits(a.len(), ROW_BLOCK - 1, lda, k), "packed rows out of bounds");
        assert!(
            LANES.checked_mul(k).map_or(false, |n| b.len() >= n),
            "expanded vector out of bounds"
        );
        // SAFETY: `self` exists only if AVX2 was detected; bounds checked above.
        unsafe { rows_avx2(a, lda, b, k, sub) }
    }

    #[inline]
    fn cols(&self, a: &[Elem], b: &[Elem], ldb: usize, k: usize) -> [Elem; COL_BLOCK] {
        if k == 0 {
            return [0; COL_BLOCK];
        }
        assert!(a.len() >= k, "packed row out of bounds");
        assert!(
            LANES.checked_mul(k).map_or(false, |span| fits(b.len(), COL_BLOCK - 1, ldb, span)),
            "expanded vectors out of bounds"
        );
        // SAFETY: as above.
        unsafe { cols_avx2(a, b, ldb, k) }
    }

    fn name(&self) -> &'static str {
        "avx2"
    }
}

/// `len >= strides * ld + span`, false if the bound overflows.
#[inline]
fn fits(len: usize, strides: usize, ld: usize, span: usize) -> bool {
    strides
        .checked_mul(ld)
        .and_then(|n| n.checked_add(span))
        .map_or(false, |n| len >= n)
}

#[target_feature(enable = "avx2")]
#[inline]
unsafe fn store(acc: __m256i) -> [Elem; 8] {
    let mut out = [0 as Elem; 8];
    _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, acc);
    out
}

/// # Safety
///
/// Requires AVX2, `a.len() >= 7 * lda + k` and `b.len() >= 3 * k`.
#[target_feature(enable = "avx2")]
unsafe fn rows_avx2(a: &[Elem], lda: usize, b: &[Elem], k: usize, sub: Elem) -> [Elem; ROW_BLOCK] {
    let mask = _mm256_set1_epi32(LANE_MASK as i32);
    let offset = _mm256_set1_epi32(sub as i32);
    let mut acc = _mm256_setzero_si256();

    let p = a.as_ptr();
    let q = b.as_ptr();
    for j in 0..k {
        let words = _mm256_setr_epi32(
            *p.add(j) as i32,
            *p.add(lda + j) as i32,
            *p.add(2 * lda + j) as i32,
            *p.add(3 * lda + j) as i32,
            *p.add(4 * lda + j) as i32,
            *p.add(5 * lda + j) as i32,
            *p.add(6 * lda + j) as i32,
            *p.add(7 * lda + j) as i32,
        );

        let l0 = _mm256_sub_epi32(_mm256_and_si256(words, mask), offset);
        let l1 = _mm256_sub_epi32(
            _mm256_and_si256(_mm256_srli_epi32::<SHIFT_LANE1>(words), mask),
            offset,
        );
        let l2 = _mm256_sub_epi32(
            _mm256_and_si256(_mm256_srli_epi32::<SHIFT_LANE2>(words), mask),
            offset,
        );

        let e = LANES * j;
        acc = _mm256_add_epi32(acc, _mm256_mullo_epi32(l0, _mm256_set1_epi32(*q.add(e) as i32)));
        acc = _mm256_add_epi32(acc, _mm256_mullo_epi32(l1, _mm256_set1_epi32(*q.add(e + 1) as i32)));
        acc = _mm256_add_epi32(acc, _mm256_mullo_epi32(l2, _mm256_set1_epi32(*q.add(e + 2) as i32)));
    }

    store(acc)
}

/// # Safety
///
/// Requires AVX2, `a.len() >= k` and `b.len() >= 7 * ldb + 3 * k`.
#[target_feature(enable = "avx2")]
unsafe fn cols_avx2(a: &[Elem], b: &[Elem], ldb: usize, k: usize) -> [Elem; COL_BLOCK] {
    let mut acc = _mm256_setzero_si256();

    let q = b.as_ptr();
    for (j, &word) in a[..k].iter().enumerate() {
        let lanes = unpack_word(word);
        for (l, &v) in lanes.iter().enumerate() {
            let e = LANES * j + l;
            let column = _mm256_setr_epi32(
                *q.add(e) as i32,
                *q.add(ldb + e) as i32,
                *q.add(2 * ldb + e) as i32,
                *q.add(3 * ldb + e) as i32,
                *q.add(4 * ldb + e) as i32,
                *q.add(5 * ldb + e) as i32,
                *q.add(6 * ldb + e) as i32,
                *q.add(7 * ldb + e) as i32,
            );
            acc = _mm256_add_epi32(acc, _mm256_mullo_epi32(_mm256_set1_epi32(v as i32), column));
        }
    }

    store(acc)
}
