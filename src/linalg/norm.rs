use crate::traits::{FloatScalar, MatrixRef};

/// Frobenius norm `sqrt(Σ |a_ij|²)`.
///
/// Accumulates a scaled sum of squares so that the result neither overflows
/// nor underflows unless the norm itself does.
pub fn frobenius_norm<T: FloatScalar>(m: &impl MatrixRef<T>) -> T {
    let mut scale = T::zero();
    let mut ssq = T::one();
    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            let v = *m.get(i, j);
            if v != T::zero() {
                let absv = v.abs();
                if scale < absv {
                    let r = scale / absv;
                    ssq = T::one() + ssq * r * r;
                    scale = absv;
                } else {
                    let r = absv / scale;
                    ssq = ssq + r * r;
                }
            }
        }
    }
    scale * ssq.sqrt()
}

/// One-norm: maximum absolute column sum.
pub fn norm_one<T: FloatScalar>(m: &impl MatrixRef<T>) -> T {
    let mut best = T::zero();
    for j in 0..m.ncols() {
        let mut sum = T::zero();
        for i in 0..m.nrows() {
            sum = sum + m.get(i, j).abs();
        }
        best = best.max(sum);
    }
    best
}

/// Departure from orthogonality: the one-norm of `I - MᵀM`.
///
/// `m` must be square. Returns `0` for an empty matrix.
///
/// ```
/// use numeris_gsvd::linalg::orthogonality_residual;
/// use numeris_gsvd::DynMatrix;
///
/// let c = 0.6_f64;
/// let s = 0.8_f64;
/// let q = DynMatrix::from_rows(2, 2, &[c, -s, s, c]);
/// assert!(orthogonality_residual(&q) < 1e-15);
/// ```
pub fn orthogonality_residual<T: FloatScalar>(m: &impl MatrixRef<T>) -> T {
    let n = m.ncols();
    assert_eq!(m.nrows(), n, "orthogonality_residual requires a square matrix");
    let mut best = T::zero();
    for j in 0..n {
        let mut sum = T::zero();
        for i in 0..n {
            let mut dot = T::zero();
            for r in 0..n {
                dot = dot + *m.get(r, i) * *m.get(r, j);
            }
            let target = if i == j { T::one() } else { T::zero() };
            sum = sum + (target - dot).abs();
        }
        best = best.max(sum);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::MatrixView;

    #[test]
    fn frobenius_simple() {
        let a = [3.0_f64, 0.0, 0.0, 4.0];
        let v = MatrixView::new(&a, 2, 2, 2).unwrap();
        assert!((frobenius_norm(&v) - 5.0).abs() < 1e-15);
    }

    #[test]
    fn frobenius_extreme_scale() {
        let a = [3e200_f64, 4e200];
        let v = MatrixView::new(&a, 1, 2, 2).unwrap();
        assert!((frobenius_norm(&v) / 5e200 - 1.0).abs() < 1e-15);

        let a = [3e-200_f64, 4e-200];
        let v = MatrixView::new(&a, 1, 2, 2).unwrap();
        assert!((frobenius_norm(&v) / 5e-200 - 1.0).abs() < 1e-15);
    }

    #[test]
    fn frobenius_empty_and_zero() {
        let a: [f64; 0] = [];
        let v = MatrixView::new(&a, 0, 0, 1).unwrap();
        assert_eq!(frobenius_norm(&v), 0.0);
        let z = [0.0_f64; 4];
        let v = MatrixView::new(&z, 2, 2, 2).unwrap();
        assert_eq!(frobenius_norm(&v), 0.0);
    }

    #[test]
    fn one_norm_is_max_column_sum() {
        let a = [1.0_f64, -7.0, -2.0, 1.0];
        let v = MatrixView::new(&a, 2, 2, 2).unwrap();
        assert_eq!(norm_one(&v), 8.0);
    }

    #[test]
    fn non_orthogonal_residual() {
        // Columns (1,0) and (1,1): MᵀM = [[1,1],[1,2]], I-MᵀM = [[0,-1],[-1,-1]]
        let a = [1.0_f64, 1.0, 0.0, 1.0];
        let v = MatrixView::new(&a, 2, 2, 2).unwrap();
        assert_eq!(orthogonality_residual(&v), 2.0);
    }
}
