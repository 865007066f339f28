use super::Problem;
use crate::linalg::givens::{lartg, scale_col, scale_row};
use crate::traits::{FloatScalar, MatrixMut};

impl<'p, T, A, B, M> Problem<'p, T, A, B, M>
where
    T: FloatScalar,
    A: MatrixMut<T>,
    B: MatrixMut<T>,
    M: MatrixMut<T>,
{
    /// Extract `(alpha, beta)` from the converged pair and leave `R` in `A`.
    ///
    /// For each active row `i` the rows `A(k+i, ·)` and `B(i, ·)` are
    /// parallel; `(beta, alpha)` is the unit vector along
    /// `(|b_ii|, |a_ii|)`. `B`'s row and `V`'s column are negated when the
    /// diagonal entries differ in sign so that `alpha, beta >= 0`.
    pub(crate) fn finalize(&mut self, alpha: &mut [T], beta: &mut [T]) {
        let super::BlockShape { m, n, k, l, .. } = self.shape;
        let c0 = self.shape.first_l_col();
        let zero = T::zero();
        let one = T::one();

        for i in 0..k {
            alpha[i] = one;
            beta[i] = zero;
        }

        for i in 0..self.shape.active_rows() {
            let a1 = *self.a.get(k + i, c0 + i);
            let b1 = *self.b.get(i, c0 + i);
            let len = l - i;

            if a1 != zero && b1 != zero && (a1 < zero) != (b1 < zero) {
                scale_row(self.b, i, c0 + i, len, -one);
                if let Some(v) = self.v.as_deref_mut() {
                    scale_col(v, i, -one);
                }
            }

            let rot = lartg(b1.abs(), a1.abs());
            let (cos, sin) = (rot.s, rot.c);
            alpha[k + i] = cos;
            beta[k + i] = sin;

            if cos >= sin {
                scale_row(self.a, k + i, c0 + i, len, one / cos);
            } else {
                scale_row(self.b, i, c0 + i, len, one / sin);
                for t in 0..len {
                    let v = *self.b.get(i, c0 + i + t);
                    *self.a.get_mut(k + i, c0 + i + t) = v;
                }
            }
        }

        for i in m.min(k + l)..(k + l) {
            alpha[i] = zero;
            beta[i] = one;
        }
        for i in (k + l)..n {
            alpha[i] = zero;
            beta[i] = zero;
        }
    }
}
