use crate::linalg::norm::{frobenius_norm, norm_one, orthogonality_residual};
use crate::traits::FloatScalar;

use super::DynMatrix;

impl<T: FloatScalar> DynMatrix<T> {
    /// Frobenius norm.
    ///
    /// ```
    /// use numeris_gsvd::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 2, &[3.0_f64, 0.0, 0.0, 4.0]);
    /// assert!((m.frobenius_norm() - 5.0).abs() < 1e-15);
    /// ```
    pub fn frobenius_norm(&self) -> T {
        frobenius_norm(self)
    }

    /// Maximum absolute column sum.
    pub fn norm_one(&self) -> T {
        norm_one(self)
    }

    /// Largest absolute element.
    pub fn max_abs(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc.max(x.abs()))
    }

    /// `‖I - selfᵀ·self‖₁`; zero for an orthogonal matrix.
    ///
    /// Panics if the matrix is not square.
    pub fn orthogonality_residual(&self) -> T {
        orthogonality_residual(self)
    }
}
