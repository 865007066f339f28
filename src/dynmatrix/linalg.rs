use alloc::vec;
use alloc::vec::Vec;

use crate::linalg::{BlockShape, CyclicJacobi, Factors, GsvdKernel, LinalgError, Tolerances};
use crate::traits::FloatScalar;

use super::DynMatrix;

// ── DynGsvd ─────────────────────────────────────────────────────────

/// Generalized singular value decomposition of a pre-reduced pair.
///
/// Holds orthogonal `U` (m×m), `V` (p×p), `Q` (n×n), the pairs
/// `(alpha, beta)` and the common upper triangular factor `R` such that
///
/// ```text
///   Uᵀ·A·Q = D1·[0 R],   Vᵀ·B·Q = D2·[0 R]
/// ```
///
/// `A` and `B` must already be in the `(k, l)` block form described in
/// [`crate::linalg::gsvd`]; they are copied, not modified.
///
/// # Example
///
/// ```
/// use numeris_gsvd::DynMatrix;
///
/// // k = 1, l = 2 on 3×3 matrices.
/// let a = DynMatrix::from_rows(3, 3, &[
///     2.0_f64, 1.0, -1.0,
///     0.0, 3.0, 0.5,
///     0.0, 0.0, 1.5,
/// ]);
/// let b = DynMatrix::from_rows(2, 3, &[
///     0.0_f64, 1.0, 2.0,
///     0.0, 0.0, -1.0,
/// ]);
/// let gsvd = a.gsvd_reduced(&b, 1, 2).unwrap();
/// let (alpha, beta) = (gsvd.alpha(), gsvd.beta());
/// assert_eq!((alpha[0], beta[0]), (1.0, 0.0));
/// for i in 1..3 {
///     assert!((alpha[i] * alpha[i] + beta[i] * beta[i] - 1.0).abs() < 1e-14);
/// }
///
/// let lhs = &gsvd.u().tr_mul(&a) * gsvd.q();
/// let rhs = &gsvd.d1() * &gsvd.zero_r();
/// assert!((&lhs - &rhs).max_abs() < 1e-13);
/// ```
#[derive(Debug, Clone)]
pub struct DynGsvd<T> {
    u: DynMatrix<T>,
    v: DynMatrix<T>,
    q: DynMatrix<T>,
    a: DynMatrix<T>,
    b: DynMatrix<T>,
    alpha: Vec<T>,
    beta: Vec<T>,
    k: usize,
    l: usize,
    cycles: usize,
}

impl<T: FloatScalar> DynGsvd<T> {
    /// Decompose with [`CyclicJacobi`] and tolerances from
    /// [`Tolerances::from_matrices`].
    ///
    /// Returns [`LinalgError::ConvergenceFailure`] if the cycle budget is
    /// exhausted.
    pub fn new(
        a: &DynMatrix<T>,
        b: &DynMatrix<T>,
        k: usize,
        l: usize,
    ) -> Result<Self, LinalgError> {
        Self::with_kernel(a, b, k, l, &CyclicJacobi::default())
    }

    /// Decompose with a caller-chosen engine.
    pub fn with_kernel<K: GsvdKernel<T>>(
        a: &DynMatrix<T>,
        b: &DynMatrix<T>,
        k: usize,
        l: usize,
        kernel: &K,
    ) -> Result<Self, LinalgError> {
        let shape = BlockShape::of(a, b, k, l);
        let BlockShape { m, p, n, .. } = shape;
        let tol = Tolerances::from_matrices(a, b);

        let mut a = a.clone();
        let mut b = b.clone();
        let mut u = DynMatrix::zeros(m, m, T::zero());
        let mut v = DynMatrix::zeros(p, p, T::zero());
        let mut q = DynMatrix::zeros(n, n, T::zero());
        let mut alpha = vec![T::zero(); n];
        let mut beta = vec![T::zero(); n];
        let mut work = vec![T::zero(); 2 * n];

        let report = kernel.reduce(
            &mut a,
            &mut b,
            shape,
            tol,
            &mut alpha,
            &mut beta,
            Factors::compute(&mut u, &mut v, &mut q),
            &mut work,
        )?;
        if !report.converged {
            return Err(LinalgError::ConvergenceFailure);
        }

        Ok(Self {
            u,
            v,
            q,
            a,
            b,
            alpha,
            beta,
            k,
            l,
            cycles: report.cycles,
        })
    }

    /// Left factor for `A` (m×m).
    #[inline]
    pub fn u(&self) -> &DynMatrix<T> {
        &self.u
    }

    /// Left factor for `B` (p×p).
    #[inline]
    pub fn v(&self) -> &DynMatrix<T> {
        &self.v
    }

    /// Common right factor (n×n).
    #[inline]
    pub fn q(&self) -> &DynMatrix<T> {
        &self.q
    }

    /// Diagonal of `D1`, padded to length `n`.
    #[inline]
    pub fn alpha(&self) -> &[T] {
        &self.alpha
    }

    /// Diagonal of `D2`, padded to length `n`.
    #[inline]
    pub fn beta(&self) -> &[T] {
        &self.beta
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn l(&self) -> usize {
        self.l
    }

    /// Sweeps the iteration needed.
    #[inline]
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Range of the `l`-block rows that have both an `alpha` and a `beta`.
    fn paired(&self) -> core::ops::Range<usize> {
        self.k..(self.k + self.l).min(self.a.nrows())
    }

    /// `alpha` entries of the `l`-block rows present in `A`.
    pub fn cosines(&self) -> &[T] {
        &self.alpha[self.paired()]
    }

    /// `beta` entries of the `l`-block rows present in `A`.
    pub fn sines(&self) -> &[T] {
        &self.beta[self.paired()]
    }

    /// `alpha_i / beta_i` over the same rows as [`cosines`](Self::cosines),
    /// `+∞` where `beta_i` is zero.
    pub fn generalized_singular_values(&self) -> Vec<T> {
        self.cosines()
            .iter()
            .zip(self.sines())
            .map(|(&c, &s)| if s == T::zero() { T::infinity() } else { c / s })
            .collect()
    }

    /// `[0 R]`, the `(k+l)×n` matrix whose trailing `(k+l)×(k+l)` block is
    /// `R`. Only the upper triangle of the stored factor is read.
    pub fn zero_r(&self) -> DynMatrix<T> {
        let (m, n) = (self.a.nrows(), self.a.ncols());
        let kl = self.k + self.l;
        let c0 = n - kl;
        let mut out = DynMatrix::zeros(kl, n, T::zero());
        for i in 0..kl.min(m) {
            for j in i..kl {
                out[(i, c0 + j)] = self.a[(i, c0 + j)];
            }
        }
        // Rows m..k+l of R are held in B.
        for i in m.min(kl)..kl {
            for j in i..kl {
                out[(i, c0 + j)] = self.b[(i - self.k, c0 + j)];
            }
        }
        out
    }

    /// The upper triangular `(k+l)×(k+l)` factor `R`.
    pub fn r(&self) -> DynMatrix<T> {
        self.zero_r().right_cols(self.k + self.l)
    }

    /// `D1` (m×(k+l)): identity on the `k`-block, `alpha` on the paired
    /// `l`-block rows.
    pub fn d1(&self) -> DynMatrix<T> {
        let m = self.a.nrows();
        let kl = self.k + self.l;
        let mut d = DynMatrix::zeros(m, kl, T::zero());
        for i in 0..self.k {
            d[(i, i)] = T::one();
        }
        for i in self.paired() {
            d[(i, i)] = self.alpha[i];
        }
        d
    }

    /// `D2` (p×(k+l)): `beta` on the paired `l`-block rows, identity on the
    /// rows of `R` held in `B`.
    pub fn d2(&self) -> DynMatrix<T> {
        let p = self.b.nrows();
        let kl = self.k + self.l;
        let mut d = DynMatrix::zeros(p, kl, T::zero());
        let paired = self.paired().len();
        for i in 0..paired {
            d[(i, self.k + i)] = self.beta[self.k + i];
        }
        for i in paired..self.l {
            d[(i, self.k + i)] = T::one();
        }
        d
    }
}

// ── Convenience methods on DynMatrix ────────────────────────────────

impl<T: FloatScalar> DynMatrix<T> {
    /// GSVD of the pre-reduced pair `(self, b)` with block sizes `k`, `l`.
    ///
    /// ```
    /// use numeris_gsvd::DynMatrix;
    /// let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 0.0, 3.0]);
    /// let b = DynMatrix::from_rows(2, 2, &[4.0_f64, 1.0, 0.0, 2.0]);
    /// let gsvd = a.gsvd_reduced(&b, 0, 2).unwrap();
    /// assert!(gsvd.u().orthogonality_residual() < 1e-14);
    /// assert!(gsvd.generalized_singular_values().iter().all(|&s| s > 0.0));
    /// ```
    pub fn gsvd_reduced(
        &self,
        b: &DynMatrix<T>,
        k: usize,
        l: usize,
    ) -> Result<DynGsvd<T>, LinalgError> {
        DynGsvd::new(self, b, k, l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
        assert!((a - b).abs() <= tol, "{}: {} vs {} (diff {})", msg, a, b, (a - b).abs());
    }

    fn check_reconstruction(a: &DynMatrix<f64>, b: &DynMatrix<f64>, g: &DynGsvd<f64>) {
        let zr = g.zero_r();
        let lhs_a = &g.u().tr_mul(a) * g.q();
        let lhs_b = &g.v().tr_mul(b) * g.q();
        assert_close(&lhs_a, &(&g.d1() * &zr), "UᵀAQ != D1·[0 R]");
        assert_close(&lhs_b, &(&g.d2() * &zr), "VᵀBQ != D2·[0 R]");
        for (f, name) in [(g.u(), "U"), (g.v(), "V"), (g.q(), "Q")] {
            assert!(f.orthogonality_residual() <= 1e-14, "{} not orthogonal", name);
        }
    }

    /// Elementwise, absolute or relative within 1e-14.
    fn assert_close(got: &DynMatrix<f64>, want: &DynMatrix<f64>, msg: &str) {
        for i in 0..want.nrows() {
            for j in 0..want.ncols() {
                let (x, y) = (got[(i, j)], want[(i, j)]);
                let diff = (x - y).abs();
                assert!(
                    diff <= 1e-14 || diff <= 1e-14 * y.abs().max(x.abs()),
                    "{} at ({}, {}): {} vs {}",
                    msg,
                    i,
                    j,
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn r_is_upper_triangular() {
        let a = DynMatrix::from_rows(2, 3, &[0.0_f64, 1.0, 2.0, 0.0, 0.0, 3.0]);
        let b = DynMatrix::from_rows(2, 3, &[0.0_f64, -1.0, 0.5, 0.0, 0.0, 4.0]);
        let g = a.gsvd_reduced(&b, 0, 2).unwrap();
        let r = g.r();
        assert_eq!((r.nrows(), r.ncols()), (2, 2));
        assert_eq!(r[(1, 0)], 0.0);
        // The stored factor itself has a vanishing subdiagonal.
        assert!(g.a[(1, 1)].abs() < 1e-14);
        assert_eq!(g.zero_r().block(0, 0, 2, 1).max_abs(), 0.0);
        check_reconstruction(&a, &b, &g);
    }

    #[test]
    fn rows_of_r_from_b_when_m_small() {
        // m = 1 < k + l = 3: the last two rows of R live in B.
        let a = DynMatrix::from_rows(1, 3, &[2.0_f64, 1.0, 1.0]);
        let b = DynMatrix::from_rows(2, 3, &[0.0_f64, 3.0, 1.0, 0.0, 0.0, 2.0]);
        let g = a.gsvd_reduced(&b, 1, 2).unwrap();
        assert_eq!(g.cosines().len(), 0);
        assert_eq!(&g.alpha()[..3], &[1.0, 0.0, 0.0]);
        assert_eq!(&g.beta()[..3], &[0.0, 1.0, 1.0]);
        let d2 = g.d2();
        assert_eq!(d2[(0, 1)], 1.0);
        assert_eq!(d2[(1, 2)], 1.0);
        check_reconstruction(&a, &b, &g);
    }

    #[test]
    fn generalized_singular_values_handle_zero_beta() {
        // B's l-block is zero: every pair is (1, 0).
        let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 0.0, 3.0]);
        let b = DynMatrix::zeros(2, 2, 0.0_f64);
        let g = a.gsvd_reduced(&b, 0, 2).unwrap();
        for (&c, &s) in g.cosines().iter().zip(g.sines()) {
            assert_eq!((c, s), (1.0, 0.0));
        }
        assert!(g.generalized_singular_values().iter().all(|s| s.is_infinite()));
        assert_eq!(g.cycles(), 0);
    }

    #[test]
    fn diagonal_pair_values() {
        let a = DynMatrix::from_rows(2, 2, &[3.0_f64, 0.0, 0.0, 1.0]);
        let b = DynMatrix::from_rows(2, 2, &[4.0_f64, 0.0, 0.0, -1.0]);
        let g = a.gsvd_reduced(&b, 0, 2).unwrap();
        assert_eq!(g.cycles(), 0);
        assert_near(g.alpha()[0], 0.6, 1e-15, "alpha0");
        assert_near(g.beta()[0], 0.8, 1e-15, "beta0");
        let h = 0.5_f64.sqrt();
        assert_near(g.alpha()[1], h, 1e-15, "alpha1");
        assert_near(g.beta()[1], h, 1e-15, "beta1");
        // Negative b_11 flips the sign of V's second column.
        assert_eq!(g.v()[(1, 1)], -1.0);
        let gsv = g.generalized_singular_values();
        assert_near(gsv[0], 0.75, 1e-15, "sigma0");
        assert_near(gsv[1], 1.0, 1e-15, "sigma1");
        check_reconstruction(&a, &b, &g);
    }

    #[test]
    fn convergence_failure_is_an_error() {
        let a = DynMatrix::from_rows(3, 3, &[1.0_f64, 2.0, 3.0, 0.0, 4.0, 5.0, 0.0, 0.0, 6.0]);
        let b = DynMatrix::from_rows(3, 3, &[7.0_f64, -1.0, 2.0, 0.0, 1.0, 3.0, 0.0, 0.0, 2.0]);
        let none = CyclicJacobi::with_max_cycles(0);
        assert_eq!(
            DynGsvd::with_kernel(&a, &b, 0, 3, &none).unwrap_err(),
            LinalgError::ConvergenceFailure
        );
        let g = DynGsvd::with_kernel(&a, &b, 0, 3, &CyclicJacobi::default()).unwrap();
        assert!(g.cycles() > 0);
        check_reconstruction(&a, &b, &g);
    }
}
