use super::pair::{lags2, Triangle};
use super::Problem;
use crate::traits::{FloatScalar, MatrixMut};

impl<'p, T, A, B, M> Problem<'p, T, A, B, M>
where
    T: FloatScalar,
    A: MatrixMut<T>,
    B: MatrixMut<T>,
    M: MatrixMut<T>,
{
    /// One cyclic sweep over the `l`-block: every pair `(i, j)`, `i < j`,
    /// row-major (`i` outer, `j` inner), so identical input always produces
    /// the same rotation sequence.
    ///
    /// Pairs whose targeted `A` and `B` entries are both at most
    /// `threshold` in magnitude are left alone. Returns whether any
    /// rotation was applied.
    pub(crate) fn sweep(&mut self, triangle: Triangle, threshold: T) -> bool {
        let l = self.shape.l;
        let mut applied = false;
        for i in 0..l.saturating_sub(1) {
            for j in (i + 1)..l {
                let [a1, a2, a3, b1, b2, b3] = self.pair_entries(i, j, triangle);
                if a2.abs() <= threshold && b2.abs() <= threshold {
                    continue;
                }
                let rot = lags2(triangle, a1, a2, a3, b1, b2, b3);
                self.annihilate(i, j, triangle, &rot);
                applied = true;
            }
        }
        applied
    }
}
