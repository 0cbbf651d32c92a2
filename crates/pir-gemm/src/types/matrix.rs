//! Owned row-major matrix.

use rand::Rng;

use super::packing::{pack_rows, packed_cols, unpack_rows, Elem, LANES};
use crate::api;
use crate::error::{extent, zeroed, KernelError, Result};

/// A row-major matrix of [`Elem`] that owns its storage.
///
/// Operations allocate a fresh result and go through the checked functions in
/// [`crate::api`], so a shape error comes back as a [`KernelError`] rather
/// than a panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Elem>,
}

impl Matrix {
    /// Create a zeroed `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Ok(Self {
            rows,
            cols,
            data: zeroed(extent(rows, cols)?)?,
        })
    }

    /// Wrap row-major data. The length must be exactly `rows * cols`.
    pub fn from_values(data: Vec<Elem>, rows: usize, cols: usize) -> Result<Self> {
        let len = extent(rows, cols)?;
        if data.len() != len {
            return Err(KernelError::DimensionMismatch(format!(
                "Expected {} elements, got {}",
                len,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// A column vector holding `values`.
    pub fn column(values: Vec<Elem>) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values,
        }
    }

    /// Fill a matrix with values uniform in `0..modulus`.
    ///
    /// A modulus of 0 means the full 32-bit range.
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        modulus: Elem,
        rng: &mut R,
    ) -> Result<Self> {
        let mut data = zeroed(extent(rows, cols)?)?;
        for x in data.iter_mut() {
            *x = if modulus == 0 {
                rng.gen()
            } else {
                rng.gen_range(0..modulus)
            };
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the matrix stores no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major elements.
    pub fn as_slice(&self) -> &[Elem] {
        &self.data
    }

    /// Mutable row-major elements.
    pub fn as_mut_slice(&mut self) -> &mut [Elem] {
        &mut self.data
    }

    /// Consume the matrix, returning its row-major data.
    pub fn into_vec(self) -> Vec<Elem> {
        self.data
    }

    /// Element at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<Elem> {
        if i < self.rows && j < self.cols {
            Some(self.data[i * self.cols + j])
        } else {
            None
        }
    }

    /// Overwrite the element at row `i`, column `j`.
    pub fn set(&mut self, i: usize, j: usize, value: Elem) -> Result<()> {
        if i >= self.rows || j >= self.cols {
            return Err(KernelError::DimensionMismatch(format!(
                "index ({}, {}) out of bounds for {}x{}",
                i, j, self.rows, self.cols
            )));
        }
        self.data[i * self.cols + j] = value;
        Ok(())
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> Option<&[Elem]> {
        if i < self.rows {
            Some(&self.data[i * self.cols..(i + 1) * self.cols])
        } else {
            None
        }
    }

    /// The `cols x rows` transpose.
    pub fn transpose(&self) -> Result<Matrix> {
        let data = api::transpose(&self.data, self.rows, self.cols)?;
        Ok(Self {
            rows: self.cols,
            cols: self.rows,
            data,
        })
    }

    /// Dense product `self * other`.
    ///
    /// A single-column `other` goes through [`Matrix::mul_vec`].
    pub fn mul(&self, other: &Matrix) -> Result<Matrix> {
        if other.cols == 1 {
            return self.mul_vec(other);
        }
        if self.cols != other.rows {
            return Err(shape_mismatch(self, other));
        }
        let data = api::matmul(&self.data, &other.data, self.rows, self.cols, other.cols)?;
        Ok(Self {
            rows: self.rows,
            cols: other.cols,
            data,
        })
    }

    /// Dense matrix-vector product.
    ///
    /// `v` may be up to two entries longer than `self.cols()`: a query built
    /// for a packed matrix is padded to a multiple of 3, and the extra
    /// entries are ignored.
    pub fn mul_vec(&self, v: &Matrix) -> Result<Matrix> {
        if v.cols != 1 || v.rows < self.cols || v.rows - self.cols >= LANES {
            return Err(shape_mismatch(self, v));
        }
        let data = api::matvec(&self.data, &v.data, self.rows, self.cols)?;
        Ok(Self::column(data))
    }

    /// Packed product with an expanded vector of exactly `3 * self.cols()`
    /// entries. `self` holds packed words.
    pub fn mul_vec_packed(&self, v: &Matrix) -> Result<Matrix> {
        self.check_expanded(v)?;
        let data = api::matvec_packed(&self.data, &v.data, self.rows, self.cols)?;
        Ok(Self::column(data))
    }

    /// Like [`Matrix::mul_vec_packed`] with every decoded lane shifted by
    /// `-sub`.
    pub fn mul_vec_packed_centered(&self, v: &Matrix, sub: Elem) -> Result<Matrix> {
        self.check_expanded(v)?;
        let data = api::matvec_packed_centered(&self.data, &v.data, self.rows, self.cols, sub)?;
        Ok(Self::column(data))
    }

    /// Packed `self` times the transpose of the expanded matrix `b`.
    ///
    /// The result is `self.rows() x b.rows()`.
    pub fn mul_transposed_packed(&self, b: &Matrix) -> Result<Matrix> {
        let data = api::matmul_transposed_packed(
            &self.data,
            &b.data,
            self.rows,
            self.cols,
            b.rows,
            b.cols,
        )?;
        Ok(Self {
            rows: self.rows,
            cols: b.rows,
            data,
        })
    }

    /// Pack every row, three lane values per word.
    pub fn squish(&self) -> Result<Matrix> {
        let data = pack_rows(&self.data, self.rows, self.cols)?;
        Ok(Self {
            rows: self.rows,
            cols: packed_cols(self.cols),
            data,
        })
    }

    /// Inverse of [`Matrix::squish`], keeping `cols` logical columns.
    pub fn unsquish(&self, cols: usize) -> Result<Matrix> {
        if packed_cols(cols) != self.cols {
            return Err(KernelError::DimensionMismatch(format!(
                "{} packed columns cannot hold {} columns",
                self.cols, cols
            )));
        }
        let data = unpack_rows(&self.data, self.rows, cols)?;
        Ok(Self {
            rows: self.rows,
            cols,
            data,
        })
    }

    /// Grow the matrix by `n` zero rows.
    pub fn append_zero_rows(&mut self, n: usize) -> Result<()> {
        let rows = self.rows.checked_add(n).ok_or_else(|| {
            KernelError::DimensionMismatch(format!("{} + {} rows overflows usize", self.rows, n))
        })?;
        self.data.resize(extent(rows, self.cols)?, 0);
        self.rows = rows;
        Ok(())
    }

    /// Copy out `num_rows` rows starting at `offset`.
    ///
    /// A range running past the last row is cut short at the end of the
    /// matrix; an `offset` past the end is an error.
    pub fn select_rows(&self, offset: usize, num_rows: usize) -> Result<Matrix> {
        if offset > self.rows {
            return Err(KernelError::DimensionMismatch(format!(
                "row offset {} past {} rows",
                offset, self.rows
            )));
        }
        let rows = num_rows.min(self.rows - offset);
        let start = offset * self.cols;
        Ok(Self {
            rows,
            cols: self.cols,
            data: self.data[start..start + rows * self.cols].to_vec(),
        })
    }

    fn check_expanded(&self, v: &Matrix) -> Result<()> {
        if v.cols != 1 || Some(v.rows) != self.cols.checked_mul(LANES) {
            return Err(shape_mismatch(self, v));
        }
        Ok(())
    }
}

fn shape_mismatch(a: &Matrix, b: &Matrix) -> KernelError {
    KernelError::DimensionMismatch(format!(
        "{}-by-{} vs. {}-by-{}",
        a.rows, a.cols, b.rows, b.cols
    ))
}
