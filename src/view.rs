//! Borrowed row-major matrices with an explicit row stride.
//!
//! A view never owns its storage: the caller allocates the buffer and the
//! view describes an `nrows x ncols` window into it, with consecutive rows
//! `stride` elements apart (the BLAS/LAPACK leading dimension). Sub-block
//! views share the parent's buffer and stride, so no element is copied.
//!
//! ```
//! use numeris_gsvd::MatrixViewMut;
//!
//! // 2x3 matrix stored with leading dimension 4 (one padding column).
//! let mut buf = [1.0_f64, 2.0, 3.0, -1.0, 4.0, 5.0, 6.0, -1.0];
//! let mut a = MatrixViewMut::new(&mut buf, 2, 3, 4).unwrap();
//! assert_eq!(a[(1, 2)], 6.0);
//!
//! let mut tail = a.block_mut(0, 1, 2, 2);
//! tail[(1, 1)] = 0.0;
//! assert_eq!(buf[6], 0.0);
//! ```

use core::ops::{Index, IndexMut};

use crate::linalg::LinalgError;
use crate::traits::{MatrixMut, MatrixRef};

/// Smallest buffer length that holds an `nrows x ncols` matrix with `stride`.
#[inline]
fn required_len(nrows: usize, ncols: usize, stride: usize) -> usize {
    if nrows == 0 || ncols == 0 {
        0
    } else {
        (nrows - 1) * stride + ncols
    }
}

fn check_layout(len: usize, nrows: usize, ncols: usize, stride: usize) -> Result<(), LinalgError> {
    if stride < ncols.max(1) {
        return Err(LinalgError::InvalidStride { stride, ncols });
    }
    let needed = required_len(nrows, ncols, stride);
    if len < needed {
        return Err(LinalgError::BufferTooShort {
            what: "matrix data",
            needed,
            got: len,
        });
    }
    Ok(())
}

/// Element range of a block inside its parent's buffer. Empty blocks map to
/// an empty range so that they never index past the end of the buffer.
#[inline]
fn block_range(i: usize, j: usize, rows: usize, cols: usize, stride: usize) -> (usize, usize) {
    let len = required_len(rows, cols, stride);
    if len == 0 {
        (0, 0)
    } else {
        let start = i * stride + j;
        (start, start + len)
    }
}

#[inline]
fn check_block(i: usize, j: usize, rows: usize, cols: usize, nrows: usize, ncols: usize) {
    assert!(
        i + rows <= nrows && j + cols <= ncols,
        "block ({},{}) size {}x{} out of bounds for {}x{} matrix",
        i, j, rows, cols, nrows, ncols,
    );
}

// ── MatrixView ──────────────────────────────────────────────────────

/// Read-only strided view into a caller-owned buffer.
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a, T> {
    data: &'a [T],
    nrows: usize,
    ncols: usize,
    stride: usize,
}

impl<'a, T> MatrixView<'a, T> {
    /// Wrap `data` as an `nrows x ncols` matrix with row stride `stride`.
    ///
    /// Fails if `stride < max(1, ncols)` or `data` is too short.
    pub fn new(
        data: &'a [T],
        nrows: usize,
        ncols: usize,
        stride: usize,
    ) -> Result<Self, LinalgError> {
        check_layout(data.len(), nrows, ncols, stride)?;
        Ok(Self { data, nrows, ncols, stride })
    }

    /// Densely packed rows; the caller guarantees `data.len() == nrows * ncols`.
    #[inline]
    pub(crate) fn contiguous(data: &'a [T], nrows: usize, ncols: usize) -> Self {
        debug_assert_eq!(data.len(), nrows * ncols);
        Self { data, nrows, ncols, stride: ncols.max(1) }
    }

    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Distance in elements between the starts of consecutive rows.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// View row `i` as a slice of length `ncols`.
    #[inline]
    pub fn row(&self, i: usize) -> &'a [T] {
        let start = i * self.stride;
        &self.data[start..start + self.ncols]
    }

    /// Zero-copy view of the `rows x cols` block starting at `(i, j)`.
    ///
    /// Panics if the block extends beyond the view.
    pub fn block(&self, i: usize, j: usize, rows: usize, cols: usize) -> MatrixView<'a, T> {
        check_block(i, j, rows, cols, self.nrows, self.ncols);
        let (start, end) = block_range(i, j, rows, cols, self.stride);
        MatrixView {
            data: &self.data[start..end],
            nrows: rows,
            ncols: cols,
            stride: self.stride,
        }
    }
}

impl<T> MatrixRef<T> for MatrixView<'_, T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        debug_assert!(row < self.nrows && col < self.ncols);
        &self.data[row * self.stride + col]
    }
}

impl<T> Index<(usize, usize)> for MatrixView<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        self.get(row, col)
    }
}

// ── MatrixViewMut ───────────────────────────────────────────────────

/// Mutable strided view into a caller-owned buffer.
#[derive(Debug)]
pub struct MatrixViewMut<'a, T> {
    data: &'a mut [T],
    nrows: usize,
    ncols: usize,
    stride: usize,
}

impl<'a, T> MatrixViewMut<'a, T> {
    /// Wrap `data` as an `nrows x ncols` matrix with row stride `stride`.
    ///
    /// Fails if `stride < max(1, ncols)` or `data` is too short.
    ///
    /// ```
    /// use numeris_gsvd::MatrixViewMut;
    /// use numeris_gsvd::linalg::LinalgError;
    ///
    /// let mut buf = [0.0_f64; 6];
    /// assert!(MatrixViewMut::new(&mut buf, 2, 3, 3).is_ok());
    /// assert_eq!(
    ///     MatrixViewMut::new(&mut buf, 2, 3, 2).unwrap_err(),
    ///     LinalgError::InvalidStride { stride: 2, ncols: 3 },
    /// );
    /// ```
    pub fn new(
        data: &'a mut [T],
        nrows: usize,
        ncols: usize,
        stride: usize,
    ) -> Result<Self, LinalgError> {
        check_layout(data.len(), nrows, ncols, stride)?;
        Ok(Self { data, nrows, ncols, stride })
    }

    /// Densely packed rows; the caller guarantees `data.len() == nrows * ncols`.
    #[inline]
    pub(crate) fn contiguous(data: &'a mut [T], nrows: usize, ncols: usize) -> Self {
        debug_assert_eq!(data.len(), nrows * ncols);
        Self { data, nrows, ncols, stride: ncols.max(1) }
    }

    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Distance in elements between the starts of consecutive rows.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Zero-copy mutable view of the `rows x cols` block starting at `(i, j)`.
    ///
    /// Panics if the block extends beyond the view.
    pub fn block_mut(
        &mut self,
        i: usize,
        j: usize,
        rows: usize,
        cols: usize,
    ) -> MatrixViewMut<'_, T> {
        check_block(i, j, rows, cols, self.nrows, self.ncols);
        let (start, end) = block_range(i, j, rows, cols, self.stride);
        MatrixViewMut {
            data: &mut self.data[start..end],
            nrows: rows,
            ncols: cols,
            stride: self.stride,
        }
    }
}

impl<T> MatrixRef<T> for MatrixViewMut<'_, T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        debug_assert!(row < self.nrows && col < self.ncols);
        &self.data[row * self.stride + col]
    }
}

impl<T> MatrixMut<T> for MatrixViewMut<'_, T> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        debug_assert!(row < self.nrows && col < self.ncols);
        &mut self.data[row * self.stride + col]
    }
}

impl<T> Index<(usize, usize)> for MatrixViewMut<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        self.get(row, col)
    }
}

impl<T> IndexMut<(usize, usize)> for MatrixViewMut<'_, T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        self.get_mut(row, col)
    }
}
