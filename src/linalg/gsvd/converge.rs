use super::pair::Triangle;
use super::{JacobiReport, Problem};
use crate::linalg::givens::las2;
use crate::traits::{FloatScalar, MatrixMut};

// ── Residual ────────────────────────────────────────────────────────

/// Euclidean norm of `x` without intermediate overflow.
fn nrm2<T: FloatScalar>(x: &[T]) -> T {
    x.iter().fold(T::zero(), |acc, &v| acc.hypot(v))
}

/// Generate an elementary reflector `H = I - tau·[1; v]·[1; v]ᵀ` with
/// `H·x = [beta; 0]`.
///
/// On return `x[0]` holds `beta`, `x[1..]` holds `v`, and `tau` is
/// returned. `tau = 0` (with `x` untouched) when `x[1..]` is already zero.
fn householder<T: FloatScalar>(x: &mut [T]) -> T {
    let zero = T::zero();
    let one = T::one();
    if x.len() <= 1 {
        return zero;
    }
    let (head, tail) = x.split_at_mut(1);
    let mut alpha = head[0];
    let mut xnorm = nrm2(tail);
    if xnorm == zero {
        return zero;
    }

    let mut beta = -alpha.hypot(xnorm).copysign(alpha);
    let safmin = T::min_positive_value() / T::epsilon();
    let rsafmn = one / safmin;
    let mut rescaled = 0;
    if beta.abs() < safmin {
        // beta may be inaccurate; scale x up and recompute.
        while beta.abs() < safmin && rescaled < 20 {
            rescaled += 1;
            tail.iter_mut().for_each(|v| *v = *v * rsafmn);
            beta = beta * rsafmn;
            alpha = alpha * rsafmn;
        }
        xnorm = nrm2(tail);
        beta = -alpha.hypot(xnorm).copysign(alpha);
    }

    let tau = (beta - alpha) / beta;
    let scale = one / (alpha - beta);
    tail.iter_mut().for_each(|v| *v = *v * scale);
    for _ in 0..rescaled {
        beta = beta * safmin;
    }
    head[0] = beta;
    tau
}

/// Smallest singular value of the `len×2` matrix `[x y]`, measuring how far
/// `x` and `y` are from parallel. Both slices are overwritten.
pub(crate) fn smallest_singular_value<T: FloatScalar>(x: &mut [T], y: &mut [T]) -> T {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    if n <= 1 {
        return T::zero();
    }

    // QR factorization of [x y].
    let tau = householder(x);
    let a11 = x[0];
    x[0] = T::one();
    let dot = x.iter().zip(y.iter()).fold(T::zero(), |acc, (&xi, &yi)| acc + xi * yi);
    let c = -tau * dot;
    for (yi, &xi) in y.iter_mut().zip(x.iter()) {
        *yi = *yi + c * xi;
    }
    householder(&mut y[1..]);
    let a12 = y[0];
    let a22 = y[1];

    las2(a11, a12, a22).0
}

impl<'p, T, A, B, M> Problem<'p, T, A, B, M>
where
    T: FloatScalar,
    A: MatrixMut<T>,
    B: MatrixMut<T>,
    M: MatrixMut<T>,
{
    /// Largest departure from parallelism over the active rows of the
    /// `l`-block. Only meaningful while both blocks are upper triangular.
    pub(crate) fn residual(&self, work: &mut [T]) -> T {
        let k = self.shape.k;
        let l = self.shape.l;
        let c0 = self.shape.first_l_col();
        let (xs, ys) = work.split_at_mut(l);
        let mut error = T::zero();
        for i in 0..self.shape.active_rows() {
            let len = l - i;
            for t in 0..len {
                xs[t] = *self.a.get(k + i, c0 + i + t);
                ys[t] = *self.b.get(i, c0 + i + t);
            }
            let ssmin = smallest_singular_value(&mut xs[..len], &mut ys[..len]);
            error = error.max(ssmin);
        }
        error
    }

    /// Sweep until the residual drops to `tol` or `max_cycles` sweeps have
    /// run.
    ///
    /// Sweeps alternate between the upper triangle (odd cycles) and the
    /// lower triangle (even cycles); the blocks are upper triangular again
    /// only after an even sweep, or after a sweep that changed nothing, so
    /// those are the points where the residual is measured. The residual is
    /// also measured once before the first sweep: input that already meets
    /// the tolerance converges with zero cycles.
    pub(crate) fn iterate(&mut self, tol: T, max_cycles: usize, work: &mut [T]) -> JacobiReport {
        let threshold = tol * T::epsilon();

        let error = self.residual(work);
        log::trace!("tgsja: cycle 0 residual {:?}", error);
        if error <= tol {
            log::debug!("tgsja: converged before the first sweep (residual {:?})", error);
            return JacobiReport {
                cycles: 0,
                converged: true,
            };
        }

        for cycle in 1..=max_cycles {
            let triangle = if cycle % 2 == 1 {
                Triangle::Upper
            } else {
                Triangle::Lower
            };
            let applied = self.sweep(triangle, threshold);
            if triangle == Triangle::Upper && applied {
                continue;
            }
            let error = self.residual(work);
            log::trace!("tgsja: cycle {} residual {:?}", cycle, error);
            if error <= tol {
                log::debug!("tgsja: converged after {} cycles (residual {:?})", cycle, error);
                return JacobiReport {
                    cycles: cycle,
                    converged: true,
                };
            }
        }

        log::warn!(
            "tgsja: no convergence after {} cycles (tolerance {:?})",
            max_cycles,
            tol
        );
        JacobiReport {
            cycles: max_cycles,
            converged: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_vectors_have_zero_residual() {
        let mut x = [1.0_f64, 2.0, -3.0];
        let mut y = [-2.0_f64, -4.0, 6.0];
        assert!(smallest_singular_value(&mut x, &mut y) < 1e-15);
    }

    #[test]
    fn orthogonal_vectors() {
        // [x y] has orthogonal columns of norms 5 and 2.
        let mut x = [3.0_f64, 4.0, 0.0];
        let mut y = [0.0_f64, 0.0, 2.0];
        let s = smallest_singular_value(&mut x, &mut y);
        assert!((s - 2.0).abs() < 1e-14, "s = {}", s);
    }

    #[test]
    fn short_rows() {
        let mut x = [5.0_f64];
        let mut y = [1.0_f64];
        assert_eq!(smallest_singular_value(&mut x, &mut y), 0.0);
        let mut x: [f64; 0] = [];
        let mut y: [f64; 0] = [];
        assert_eq!(smallest_singular_value(&mut x, &mut y), 0.0);
    }

    #[test]
    fn two_by_two() {
        // [x y] = [[1, 1], [0, 1]]: smallest singular value 1/φ.
        let mut x = [1.0_f64, 0.0];
        let mut y = [1.0_f64, 1.0];
        let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
        let s = smallest_singular_value(&mut x, &mut y);
        assert!((s - 1.0 / phi).abs() < 1e-15, "s = {}", s);
    }

    #[test]
    fn reflector_maps_onto_first_axis() {
        let x0 = [3.0_f64, 4.0, 12.0];
        let mut x = x0;
        let tau = householder(&mut x);
        let beta = x[0];
        assert!((beta.abs() - 13.0).abs() < 1e-14);
        // Apply H = I - tau·v·vᵀ, v = [1, x[1], x[2]], to the original x.
        let v = [1.0, x[1], x[2]];
        let vtx: f64 = v.iter().zip(x0.iter()).map(|(a, b)| a * b).sum();
        let hx: Vec<f64> = (0..3).map(|i| x0[i] - tau * v[i] * vtx).collect();
        assert!((hx[0] - beta).abs() < 1e-13);
        assert!(hx[1].abs() < 1e-13);
        assert!(hx[2].abs() < 1e-13);
    }

    #[test]
    fn tiny_vector_is_rescaled() {
        let mut x = [3e-300_f64, 4e-300];
        let tau = householder(&mut x);
        assert!((x[0].abs() / 5e-300 - 1.0).abs() < 1e-14);
        assert!(tau > 0.0 && tau <= 2.0);
    }
}
