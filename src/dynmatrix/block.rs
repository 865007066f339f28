use crate::traits::Scalar;

use super::DynMatrix;

impl<T: Scalar> DynMatrix<T> {
    /// Extract a sub-matrix of size `rows x cols` starting at `(i, j)`.
    ///
    /// Panics if the block extends beyond the matrix bounds.
    ///
    /// ```
    /// use numeris_gsvd::DynMatrix;
    /// let m = DynMatrix::from_fn(3, 3, |i, j| (i * 3 + j) as f64);
    /// let b = m.block(1, 1, 2, 2);
    /// assert_eq!(b[(0, 0)], 4.0);
    /// assert_eq!(b[(1, 1)], 8.0);
    /// ```
    pub fn block(&self, i: usize, j: usize, rows: usize, cols: usize) -> Self {
        assert!(
            i + rows <= self.nrows && j + cols <= self.ncols,
            "block ({},{}) size {}x{} out of bounds for {}x{} matrix",
            i, j, rows, cols, self.nrows, self.ncols,
        );
        DynMatrix::from_fn(rows, cols, |r, c| self[(i + r, j + c)])
    }

    /// Write a sub-matrix into self starting at position `(i, j)`.
    ///
    /// Panics if the block extends beyond the matrix bounds.
    ///
    /// ```
    /// use numeris_gsvd::DynMatrix;
    /// let mut m = DynMatrix::zeros(3, 3, 0.0_f64);
    /// let patch = DynMatrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    /// m.set_block(1, 1, &patch);
    /// assert_eq!(m[(1, 1)], 1.0);
    /// assert_eq!(m[(2, 2)], 4.0);
    /// ```
    pub fn set_block(&mut self, i: usize, j: usize, src: &DynMatrix<T>) {
        assert!(
            i + src.nrows <= self.nrows && j + src.ncols <= self.ncols,
            "set_block ({},{}) size {}x{} out of bounds for {}x{} matrix",
            i, j, src.nrows, src.ncols, self.nrows, self.ncols,
        );
        for r in 0..src.nrows {
            let dst = (i + r) * self.ncols + j;
            self.data[dst..dst + src.ncols].copy_from_slice(src.row(r));
        }
    }

    /// Row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.ncols;
        &self.data[start..start + self.ncols]
    }

    /// Extract the last `n` columns.
    pub fn right_cols(&self, n: usize) -> Self {
        self.block(0, self.ncols - n, self.nrows, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_roundtrip_through_set_block() {
        let m = DynMatrix::from_fn(4, 5, |i, j| (10 * i + j) as f64);
        let b = m.block(1, 2, 3, 2);
        assert_eq!(b.as_slice(), &[12.0, 13.0, 22.0, 23.0, 32.0, 33.0]);
        let mut z = DynMatrix::zeros(4, 5, 0.0);
        z.set_block(1, 2, &b);
        assert_eq!(z[(3, 3)], 33.0);
        assert_eq!(z[(0, 2)], 0.0);
        assert_eq!(z[(1, 4)], 0.0);
    }

    #[test]
    fn edges() {
        let m = DynMatrix::from_fn(3, 4, |i, j| (10 * i + j) as f64);
        assert_eq!(m.right_cols(1).as_slice(), &[3.0, 13.0, 23.0]);
        assert_eq!(m.row(2), &[20.0, 21.0, 22.0, 23.0]);
        assert_eq!(m.block(1, 1, 0, 3).nrows(), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn set_block_out_of_bounds() {
        let mut m = DynMatrix::zeros(2, 2, 0.0_f64);
        m.set_block(1, 0, &DynMatrix::zeros(2, 1, 0.0));
    }
}
