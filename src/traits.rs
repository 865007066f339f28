use core::fmt::Debug;
use num_traits::{Float, Num, One, Zero};

/// Trait for types that can be used as matrix elements.
///
/// Blanket-implemented for all types satisfying the bounds.
/// Covers `f32`, `f64`, and all integer types.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Trait for real floating-point matrix elements.
///
/// Required by the rotation kernels, norms and the GSVD driver
/// (`sqrt`, `abs`, `hypot`, `epsilon`, `min_positive_value`, ...).
pub trait FloatScalar: Scalar + Float {}

impl<T: Scalar + Float> FloatScalar for T {}

/// Read-only access to a matrix-like type.
///
/// Every algorithm in this crate is written against this trait, so it works
/// unchanged on owned [`DynMatrix`](crate::DynMatrix) storage and on borrowed
/// strided [`MatrixView`](crate::MatrixView)s.
pub trait MatrixRef<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> &T;
}

/// Mutable access to a matrix-like type.
///
/// Extends `MatrixRef` with mutable element access, enabling
/// in-place algorithms (plane rotations, row scaling, ...) to work generically.
pub trait MatrixMut<T>: MatrixRef<T> {
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T;
}

impl<T, M: MatrixRef<T> + ?Sized> MatrixRef<T> for &M {
    #[inline]
    fn nrows(&self) -> usize {
        (**self).nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        (**self).ncols()
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        (**self).get(row, col)
    }
}

impl<T, M: MatrixRef<T> + ?Sized> MatrixRef<T> for &mut M {
    #[inline]
    fn nrows(&self) -> usize {
        (**self).nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        (**self).ncols()
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        (**self).get(row, col)
    }
}

impl<T, M: MatrixMut<T> + ?Sized> MatrixMut<T> for &mut M {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        (**self).get_mut(row, col)
    }
}

/// Fill a square matrix with the identity.
pub(crate) fn set_identity<T: Scalar>(m: &mut impl MatrixMut<T>) {
    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            *m.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
        }
    }
}

/// Whether every element of `m` is finite.
pub(crate) fn all_finite<T: FloatScalar>(m: &impl MatrixRef<T>) -> bool {
    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            if !m.get(i, j).is_finite() {
                return false;
            }
        }
    }
    true
}
