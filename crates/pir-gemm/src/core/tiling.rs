//! Blocking parameters and loop-order selection.

/// Rows of a packed matrix reduced together by the vector kernels.
pub const ROW_BLOCK: usize = 8;

/// Output columns produced together by the wide matrix strategy.
pub const COL_BLOCK: usize = 8;

/// Loop ordering for the packed multiply-transpose kernel.
///
/// Both orderings compute the same product; the choice only changes which
/// operand stays hot in registers and cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Decode each packed word once and broadcast it across every output
    /// column. Used when A has more rows than packed columns.
    Tall,
    /// Sweep A once per block of [`COL_BLOCK`] output columns, keeping the
    /// block's accumulators in registers.
    Wide,
}

impl Strategy {
    /// Picks the ordering for a packed `a_rows x a_cols` left operand.
    #[inline]
    pub fn select(a_rows: usize, a_cols: usize) -> Self {
        if a_rows > a_cols {
            Strategy::Tall
        } else {
            Strategy::Wide
        }
    }
}

/// Iterator over `(start, len)` blocks covering `0..total`.
///
/// Every block has length `block` except possibly the last.
#[derive(Debug, Clone)]
pub struct BlockIterator {
    total: usize,
    block: usize,
    current: usize,
}

impl BlockIterator {
    /// Tiles of `block` over `0..total`; the last may be shorter.
    pub fn new(total: usize, block: usize) -> Self {
        assert!(block > 0, "block size must be positive");
        Self {
            total,
            block,
            current: 0,
        }
    }
}

impl Iterator for BlockIterator {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.total {
            return None;
        }
        let start = self.current;
        let len = self.block.min(self.total - start);
        self.current += len;
        Some((start, len))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total.saturating_sub(self.current) + self.block - 1) / self.block;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BlockIterator {}
