use core::ops::{Mul, Sub};

use crate::linalg::{gemm, Transpose};
use crate::traits::Scalar;

use super::DynMatrix;

impl<T: Scalar> DynMatrix<T> {
    /// Transpose.
    ///
    /// ```
    /// use numeris_gsvd::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let t = m.transpose();
    /// assert_eq!(t.nrows(), 3);
    /// assert_eq!(t[(2, 1)], 6.0);
    /// ```
    pub fn transpose(&self) -> Self {
        DynMatrix::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)])
    }

    /// `selfᵀ · rhs` without forming the transpose.
    ///
    /// ```
    /// use numeris_gsvd::DynMatrix;
    /// let q = DynMatrix::from_rows(2, 2, &[0.6_f64, -0.8, 0.8, 0.6]);
    /// let qtq = q.tr_mul(&q);
    /// assert!((qtq[(0, 0)] - 1.0).abs() < 1e-15);
    /// assert!(qtq[(0, 1)].abs() < 1e-15);
    /// ```
    pub fn tr_mul(&self, rhs: &DynMatrix<T>) -> Self {
        let mut out = DynMatrix::zeros(self.ncols, rhs.ncols, T::zero());
        gemm(Transpose::Yes, Transpose::No, T::one(), self, rhs, T::zero(), &mut out);
        out
    }
}

// ── Matrix multiplication ───────────────────────────────────────────

impl<T: Scalar> Mul<&DynMatrix<T>> for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    /// ```
    /// use numeris_gsvd::DynMatrix;
    /// let a = DynMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let b = DynMatrix::from_rows(3, 1, &[1.0, 0.0, -1.0]);
    /// let c = &a * &b;
    /// assert_eq!(c.as_slice(), &[-2.0, -2.0]);
    /// ```
    fn mul(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
        assert_eq!(
            self.ncols, rhs.nrows,
            "dimension mismatch: {}x{} * {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let mut out = DynMatrix::zeros(self.nrows, rhs.ncols, T::zero());
        gemm(Transpose::No, Transpose::No, T::one(), self, rhs, T::zero(), &mut out);
        out
    }
}

impl<T: Scalar> Mul for DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn mul(self, rhs: DynMatrix<T>) -> DynMatrix<T> {
        &self * &rhs
    }
}

impl<T: Scalar> Mul<&DynMatrix<T>> for DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn mul(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
        &self * rhs
    }
}

// ── Element-wise subtraction ────────────────────────────────────────

impl<T: Scalar> Sub<&DynMatrix<T>> for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn sub(self, rhs: &DynMatrix<T>) -> DynMatrix<T> {
        assert_eq!(
            (self.nrows, self.ncols),
            (rhs.nrows, rhs.ncols),
            "dimension mismatch: {}x{} - {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(&a, &b)| a - b)
            .collect();
        DynMatrix {
            data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_rectangular() {
        let a = DynMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = DynMatrix::from_rows(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = &a * &b;
        assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);
        assert_eq!((a.clone() * b.clone()).as_slice(), c.as_slice());
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn mul_mismatch() {
        let a = DynMatrix::zeros(2, 3, 0.0_f64);
        let _ = &a * &a;
    }

    #[test]
    fn tr_mul_matches_transpose() {
        let a = DynMatrix::from_fn(3, 2, |i, j| (i as f64) - 2.0 * (j as f64));
        let b = DynMatrix::from_fn(3, 4, |i, j| (i * j) as f64 + 1.0);
        assert_eq!(a.tr_mul(&b), &a.transpose() * &b);
    }

    #[test]
    fn sub_elementwise() {
        let a = DynMatrix::from_rows(1, 2, &[3.0, 5.0]);
        let b = DynMatrix::from_rows(1, 2, &[1.0, 1.0]);
        assert_eq!((&a - &b).as_slice(), &[2.0, 4.0]);
    }
}
