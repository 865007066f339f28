use crate::traits::{MatrixMut, MatrixRef, Scalar};

/// Whether an operand of [`gemm`] is used as stored or transposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transpose {
    No,
    Yes,
}

impl Transpose {
    #[inline]
    fn dims<T>(self, m: &impl MatrixRef<T>) -> (usize, usize) {
        match self {
            Transpose::No => (m.nrows(), m.ncols()),
            Transpose::Yes => (m.ncols(), m.nrows()),
        }
    }

    #[inline]
    fn at<T: Copy>(self, m: &impl MatrixRef<T>, i: usize, j: usize) -> T {
        match self {
            Transpose::No => *m.get(i, j),
            Transpose::Yes => *m.get(j, i),
        }
    }
}

/// General matrix multiply: `C ← alpha·op(A)·op(B) + beta·C`.
///
/// When `beta` is zero the previous contents of `C` are not read, so `C`
/// may hold NaN on entry.
///
/// # Panics
///
/// Panics if the operand shapes are incompatible.
///
/// ```
/// use numeris_gsvd::linalg::{gemm, Transpose};
/// use numeris_gsvd::DynMatrix;
///
/// let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
/// let mut c = DynMatrix::fill(2, 2, f64::NAN);
/// gemm(Transpose::Yes, Transpose::No, 1.0, &a, &a, 0.0, &mut c);
/// assert_eq!(c[(0, 0)], 10.0);
/// assert_eq!(c[(0, 1)], 14.0);
/// ```
pub fn gemm<T: Scalar>(
    trans_a: Transpose,
    trans_b: Transpose,
    alpha: T,
    a: &impl MatrixRef<T>,
    b: &impl MatrixRef<T>,
    beta: T,
    c: &mut impl MatrixMut<T>,
) {
    let (m, ka) = trans_a.dims(a);
    let (kb, n) = trans_b.dims(b);
    assert_eq!(ka, kb, "gemm: inner dimensions differ ({} vs {})", ka, kb);
    assert_eq!(
        (c.nrows(), c.ncols()),
        (m, n),
        "gemm: output has the wrong shape"
    );

    for i in 0..m {
        for j in 0..n {
            let mut acc = T::zero();
            for p in 0..ka {
                acc = acc + trans_a.at(a, i, p) * trans_b.at(b, p, j);
            }
            let out = c.get_mut(i, j);
            *out = if beta == T::zero() {
                alpha * acc
            } else {
                alpha * acc + beta * *out
            };
        }
    }
}
