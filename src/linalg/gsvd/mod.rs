//! Generalized singular value decomposition of a pre-reduced matrix pair.
//!
//! Given `A` (m×n) and `B` (p×n) already brought to the blocked upper
//! triangular form
//!
//! ```text
//!            n-k-l  k    l                n-k-l  k    l
//!   A =  k ( 0     A12  A13 )     B =  l ( 0     0    B13 )
//!        l ( 0     0    A23 )        p-l ( 0     0    0   )
//!      m-k-l ( 0     0    0 )
//! ```
//!
//! (when `m < k+l` the last `k+l-m` rows of the `l`-block live in `B`),
//! a cyclic Jacobi iteration of plane rotations drives `A23` and `B13` to
//! parallel rows. On return
//!
//! ```text
//!   Uᵀ·A·Q = D1·[0 R],   Vᵀ·B·Q = D2·[0 R]
//! ```
//!
//! with `R` upper triangular and held in the trailing columns of `A`, and
//! the diagonals of `D1`, `D2` given by `alpha`, `beta`.
//!
//! The kernel works in place on any [`MatrixMut`] storage, so it runs on
//! caller-owned strided buffers through [`MatrixViewMut`](crate::MatrixViewMut)
//! without allocating. [`DynGsvd`](crate::dynmatrix::DynGsvd) is the owned
//! convenience wrapper.

mod converge;
mod finalize;
mod pair;
mod sweep;


use core::marker::PhantomData;

use crate::linalg::norm::frobenius_norm;
use crate::linalg::LinalgError;
use crate::traits::{all_finite, set_identity, FloatScalar, MatrixMut, MatrixRef};

/// Default cycle budget of [`CyclicJacobi`].
pub const MAX_CYCLES: usize = 30;

/// What to do with one of the accumulated orthogonal factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GsvdJob {
    /// Initialize to the identity, then accumulate the rotations.
    Compute,
    /// Accumulate the rotations into the matrix supplied by the caller.
    Update,
    /// Do not form the factor.
    Skip,
}

/// One accumulator matrix together with its job.
#[derive(Debug)]
pub enum Factor<'a, M> {
    Compute(&'a mut M),
    Update(&'a mut M),
    Skip,
}

impl<'a, M> Factor<'a, M> {
    pub fn job(&self) -> GsvdJob {
        match self {
            Factor::Compute(_) => GsvdJob::Compute,
            Factor::Update(_) => GsvdJob::Update,
            Factor::Skip => GsvdJob::Skip,
        }
    }

    /// The matrix to accumulate into, set to the identity for `Compute`.
    fn prepare<T: FloatScalar>(self) -> Option<&'a mut M>
    where
        M: MatrixMut<T>,
    {
        match self {
            Factor::Compute(m) => {
                set_identity(&mut *m);
                Some(m)
            }
            Factor::Update(m) => Some(m),
            Factor::Skip => None,
        }
    }
}

/// The three accumulators `U` (m×m), `V` (p×p) and `Q` (n×n).
#[derive(Debug)]
pub struct Factors<'a, M> {
    pub u: Factor<'a, M>,
    pub v: Factor<'a, M>,
    pub q: Factor<'a, M>,
}

impl<'a, M> Factors<'a, M> {
    /// No accumulation at all.
    pub fn skip() -> Self {
        Self {
            u: Factor::Skip,
            v: Factor::Skip,
            q: Factor::Skip,
        }
    }

    /// Form all three factors from the identity.
    pub fn compute(u: &'a mut M, v: &'a mut M, q: &'a mut M) -> Self {
        Self {
            u: Factor::Compute(u),
            v: Factor::Compute(v),
            q: Factor::Compute(q),
        }
    }
}

/// Block shape `(m, p, n, k, l)` of a pre-reduced pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockShape {
    /// Rows of `A`.
    pub m: usize,
    /// Rows of `B`.
    pub p: usize,
    /// Columns of `A` and `B`.
    pub n: usize,
    /// Size of the block already in final form.
    pub k: usize,
    /// Size of the block diagonalized by the iteration.
    pub l: usize,
}

impl BlockShape {
    /// Read `m`, `p` and `n` from the matrices.
    pub fn of<T>(a: &impl MatrixRef<T>, b: &impl MatrixRef<T>, k: usize, l: usize) -> Self {
        Self {
            m: a.nrows(),
            p: b.nrows(),
            n: a.ncols(),
            k,
            l,
        }
    }

    /// First column of the `l`-block, `n - l`.
    #[inline]
    pub fn first_l_col(&self) -> usize {
        self.n.saturating_sub(self.l)
    }

    /// Rows of the `l`-block present in `A`, `min(l, m - k)`.
    #[inline]
    pub fn active_rows(&self) -> usize {
        self.l.min(self.m.saturating_sub(self.k))
    }

    fn validate(&self) -> Result<(), LinalgError> {
        let BlockShape { m, p, n, k, l } = *self;
        if k.checked_add(l).map_or(true, |kl| kl > n) || k > m || l > p {
            return Err(LinalgError::InvalidBlockShape { m, p, n, k, l });
        }
        Ok(())
    }
}

/// Convergence tolerances for `A` and `B`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances<T> {
    pub a: T,
    pub b: T,
}

impl<T: FloatScalar> Tolerances<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    /// The customary choice `max(m, n)·‖A‖_F·ε` and `max(p, n)·‖B‖_F·ε`.
    ///
    /// ```
    /// use numeris_gsvd::linalg::Tolerances;
    /// use numeris_gsvd::DynMatrix;
    ///
    /// let a = DynMatrix::from_rows(1, 2, &[3.0_f64, 4.0]);
    /// let b = DynMatrix::from_rows(1, 2, &[0.0_f64, 1.0]);
    /// let tol = Tolerances::from_matrices(&a, &b);
    /// assert_eq!(tol.a, 2.0 * 5.0 * f64::EPSILON);
    /// assert_eq!(tol.combined(), tol.b);
    /// ```
    pub fn from_matrices(a: &impl MatrixRef<T>, b: &impl MatrixRef<T>) -> Self {
        let scaled = |rows: usize, cols: usize, norm: T| -> T {
            T::from(rows.max(cols)).unwrap_or_else(T::max_value) * norm * T::epsilon()
        };
        Self {
            a: scaled(a.nrows(), a.ncols(), frobenius_norm(a)),
            b: scaled(b.nrows(), b.ncols(), frobenius_norm(b)),
        }
    }

    /// Threshold the residual is compared against, `min(a, b)`.
    #[inline]
    pub fn combined(&self) -> T {
        self.a.min(self.b)
    }

    fn validate(&self) -> Result<(), LinalgError> {
        let ok = |t: T| t.is_finite() && t >= T::zero();
        if ok(self.a) && ok(self.b) {
            Ok(())
        } else {
            Err(LinalgError::InvalidTolerance)
        }
    }
}

/// Outcome of the iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JacobiReport {
    /// Number of sweeps performed.
    pub cycles: usize,
    /// Whether the residual met the tolerance. When `false`, `A`, `B` and
    /// the factors hold the last iterate and `alpha`/`beta` are untouched.
    pub converged: bool,
}

/// A GSVD engine for pre-reduced matrix pairs.
///
/// `a` (m×n) and `b` (p×n) are overwritten: on success the trailing
/// `k+l` columns of `a` hold `R` (with the rows beyond `m` in `b` when
/// `m < k+l`). `alpha` and `beta` need length `n`, `work` length `2n`.
pub trait GsvdKernel<T: FloatScalar> {
    #[allow(clippy::too_many_arguments)]
    fn reduce<A, B, M>(
        &self,
        a: &mut A,
        b: &mut B,
        shape: BlockShape,
        tol: Tolerances<T>,
        alpha: &mut [T],
        beta: &mut [T],
        factors: Factors<'_, M>,
        work: &mut [T],
    ) -> Result<JacobiReport, LinalgError>
    where
        A: MatrixMut<T>,
        B: MatrixMut<T>,
        M: MatrixMut<T>;
}

/// Kogbetliantz-type cyclic Jacobi iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclicJacobi {
    /// Sweep budget; the iteration reports non-convergence past it.
    pub max_cycles: usize,
}

impl Default for CyclicJacobi {
    fn default() -> Self {
        Self {
            max_cycles: MAX_CYCLES,
        }
    }
}

impl CyclicJacobi {
    pub fn with_max_cycles(max_cycles: usize) -> Self {
        Self { max_cycles }
    }
}

impl<T: FloatScalar> GsvdKernel<T> for CyclicJacobi {
    fn reduce<A, B, M>(
        &self,
        a: &mut A,
        b: &mut B,
        shape: BlockShape,
        tol: Tolerances<T>,
        alpha: &mut [T],
        beta: &mut [T],
        factors: Factors<'_, M>,
        work: &mut [T],
    ) -> Result<JacobiReport, LinalgError>
    where
        A: MatrixMut<T>,
        B: MatrixMut<T>,
        M: MatrixMut<T>,
    {
        validate(a, b, shape, tol, alpha, beta, &factors, work)?;

        let Factors { u, v, q } = factors;
        let mut problem = Problem {
            a,
            b,
            u: u.prepare::<T>(),
            v: v.prepare::<T>(),
            q: q.prepare::<T>(),
            shape,
            _scalar: PhantomData,
        };

        log::debug!(
            "tgsja: m={} p={} n={} k={} l={} tola={:?} tolb={:?}",
            shape.m,
            shape.p,
            shape.n,
            shape.k,
            shape.l,
            tol.a,
            tol.b
        );

        let report = problem.iterate(tol.combined(), self.max_cycles, work);
        if report.converged {
            problem.finalize(alpha, beta);
        }
        Ok(report)
    }
}

/// Run [`CyclicJacobi`] with the default cycle budget.
///
/// ```
/// use numeris_gsvd::linalg::{tgsja, BlockShape, Factors, Tolerances};
/// use numeris_gsvd::DynMatrix;
///
/// // k = 0, l = 2: both matrices are 2×2 upper triangular.
/// let mut a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 0.0, 3.0]);
/// let mut b = DynMatrix::from_rows(2, 2, &[4.0_f64, 1.0, 0.0, 2.0]);
/// let shape = BlockShape::of(&a, &b, 0, 2);
/// let tol = Tolerances::from_matrices(&a, &b);
/// let mut u = DynMatrix::zeros(2, 2, 0.0);
/// let mut v = DynMatrix::zeros(2, 2, 0.0);
/// let mut q = DynMatrix::zeros(2, 2, 0.0);
/// let mut alpha = [0.0; 2];
/// let mut beta = [0.0; 2];
/// let mut work = [0.0; 4];
///
/// let report = tgsja(
///     &mut a, &mut b, shape, tol, &mut alpha, &mut beta,
///     Factors::compute(&mut u, &mut v, &mut q), &mut work,
/// ).unwrap();
/// assert!(report.converged);
/// for i in 0..2 {
///     assert!((alpha[i] * alpha[i] + beta[i] * beta[i] - 1.0).abs() < 1e-14);
/// }
/// ```
#[allow(clippy::too_many_arguments)]
pub fn tgsja<T, A, B, M>(
    a: &mut A,
    b: &mut B,
    shape: BlockShape,
    tol: Tolerances<T>,
    alpha: &mut [T],
    beta: &mut [T],
    factors: Factors<'_, M>,
    work: &mut [T],
) -> Result<JacobiReport, LinalgError>
where
    T: FloatScalar,
    A: MatrixMut<T>,
    B: MatrixMut<T>,
    M: MatrixMut<T>,
{
    CyclicJacobi::default().reduce(a, b, shape, tol, alpha, beta, factors, work)
}

// ── Validation ──────────────────────────────────────────────────────

fn check_shape<T>(
    what: &'static str,
    m: &impl MatrixRef<T>,
    rows: usize,
    cols: usize,
) -> Result<(), LinalgError> {
    if (m.nrows(), m.ncols()) != (rows, cols) {
        return Err(LinalgError::DimensionMismatch {
            what,
            expected: (rows, cols),
            got: (m.nrows(), m.ncols()),
        });
    }
    Ok(())
}

fn check_len<T>(what: &'static str, buf: &[T], needed: usize) -> Result<(), LinalgError> {
    if buf.len() < needed {
        return Err(LinalgError::BufferTooShort {
            what,
            needed,
            got: buf.len(),
        });
    }
    Ok(())
}

fn check_factor<T: FloatScalar, M: MatrixMut<T>>(
    what: &'static str,
    factor: &Factor<'_, M>,
    dim: usize,
) -> Result<(), LinalgError> {
    match factor {
        Factor::Skip => Ok(()),
        Factor::Compute(m) => check_shape(what, &**m, dim, dim),
        Factor::Update(m) => {
            check_shape(what, &**m, dim, dim)?;
            if all_finite(&**m) {
                Ok(())
            } else {
                Err(LinalgError::NonFinite)
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn validate<T: FloatScalar, M: MatrixMut<T>>(
    a: &impl MatrixRef<T>,
    b: &impl MatrixRef<T>,
    shape: BlockShape,
    tol: Tolerances<T>,
    alpha: &[T],
    beta: &[T],
    factors: &Factors<'_, M>,
    work: &[T],
) -> Result<(), LinalgError> {
    shape.validate()?;
    let BlockShape { m, p, n, .. } = shape;
    check_shape("A", a, m, n)?;
    check_shape("B", b, p, n)?;
    tol.validate()?;
    check_len("alpha", alpha, n)?;
    check_len("beta", beta, n)?;
    check_len("work", work, 2 * n)?;
    check_factor("U", &factors.u, m)?;
    check_factor("V", &factors.v, p)?;
    check_factor("Q", &factors.q, n)?;
    if !all_finite(a) || !all_finite(b) {
        return Err(LinalgError::NonFinite);
    }
    Ok(())
}

// ── Working state ───────────────────────────────────────────────────

/// Borrowed state shared by the pair step, the sweep, the convergence
/// loop and the finalizer.
pub(crate) struct Problem<'p, T, A, B, M> {
    pub(crate) a: &'p mut A,
    pub(crate) b: &'p mut B,
    pub(crate) u: Option<&'p mut M>,
    pub(crate) v: Option<&'p mut M>,
    pub(crate) q: Option<&'p mut M>,
    pub(crate) shape: BlockShape,
    _scalar: PhantomData<T>,
}

impl<'p, T, A, B, M> Problem<'p, T, A, B, M>
where
    T: FloatScalar,
    A: MatrixMut<T>,
    B: MatrixMut<T>,
    M: MatrixMut<T>,
{
    /// `A(row, col)` of the `l`-block, reading rows beyond `m` as zero.
    #[inline]
    pub(crate) fn a_at(&self, row: usize, col: usize) -> T {
        if row < self.shape.m {
            *self.a.get(row, col)
        } else {
            T::zero()
        }
    }
}
