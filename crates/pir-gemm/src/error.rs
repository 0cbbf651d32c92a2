//! Error types for the checked kernel API.

use thiserror::Error;

use crate::types::Elem;

/// Errors reported by the checked entry points in [`crate::api`] and by
/// [`crate::types::Matrix`].
///
/// The raw kernels in [`crate::core`] and [`crate::simd`] never return these;
/// they only carry `debug_assert!` checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// Operand shapes are inconsistent with each other.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A buffer is shorter than its declared extents require.
    #[error("Buffer `{name}` too small: need {expected} elements, got {actual}")]
    BufferTooSmall {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A value handed to the packing layer does not fit in one lane.
    #[error("Lane value {value} at index {index} does not fit in 10 bits")]
    LaneOverflow { value: Elem, index: usize },

    /// An output buffer of the requested size could not be allocated.
    #[error("Cannot allocate {len} output elements")]
    AllocationFailed { len: usize },

    /// A packed word has its reserved top bits set.
    #[error("Packed word {word:#010x} at index {index} uses reserved bits")]
    ReservedBits { index: usize, word: Elem },
}

/// Result type for checked kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;

/// `rows * cols`, or a [`KernelError::DimensionMismatch`] if it overflows.
pub(crate) fn extent(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols).ok_or_else(|| {
        KernelError::DimensionMismatch(format!("{}x{} overflows usize", rows, cols))
    })
}

/// Fails with [`KernelError::BufferTooSmall`] if `actual < expected`.
pub(crate) fn require_len(name: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual < expected {
        return Err(KernelError::BufferTooSmall {
            name,
            expected,
            actual,
        });
    }
    Ok(())
}

/// A zeroed buffer of `len` elements, or [`KernelError::AllocationFailed`].
pub(crate) fn zeroed(len: usize) -> Result<Vec<Elem>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| KernelError::AllocationFailed { len })?;
    out.resize(len, 0);
    Ok(out)
}
