use numeris_gsvd::linalg::{tgsja, BlockShape, Factor, Factors, JacobiReport, Tolerances};
use numeris_gsvd::{DynGsvd, DynMatrix, MatrixViewMut};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

const TOL: f64 = 1e-14;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Blocked upper triangular test matrix: the first `min(rows, t)` rows have
/// a nonzero diagonal at column `i + cols - t` and random entries to its
/// right, where `t = k + l` for `A` and `t = l` for `B`.
fn blocked_upper(
    rng: &mut StdRng,
    rows: usize,
    cols: usize,
    k: usize,
    l: usize,
    kblock: bool,
) -> DynMatrix<f64> {
    let t = if kblock { k + l } else { l };
    let mut m = DynMatrix::zeros(rows, cols, 0.0);
    for i in 0..rows.min(t) {
        let d = i + cols - t;
        let mut diag = 0.0;
        while diag == 0.0 {
            diag = rng.sample(StandardNormal);
        }
        m[(i, d)] = diag;
        for j in (d + 1)..cols {
            m[(i, j)] = rng.sample(StandardNormal);
        }
    }
    m
}

/// A row-major buffer whose row stride may exceed the column count.
/// Padding starts as NaN so any stray write or read shows up.
struct Strided {
    buf: Vec<f64>,
    rows: usize,
    cols: usize,
    stride: usize,
}

impl Strided {
    fn from_matrix(m: &DynMatrix<f64>, stride: usize) -> Self {
        let mut s = Self::nan(m.nrows(), m.ncols(), stride);
        for i in 0..m.nrows() {
            let start = i * s.stride;
            s.buf[start..start + m.ncols()].copy_from_slice(m.row(i));
        }
        s
    }

    fn nan(rows: usize, cols: usize, stride: usize) -> Self {
        let stride = stride.max(cols);
        Self {
            buf: vec![f64::NAN; rows * stride],
            rows,
            cols,
            stride,
        }
    }

    fn view_mut(&mut self) -> MatrixViewMut<'_, f64> {
        MatrixViewMut::new(&mut self.buf, self.rows, self.cols, self.stride).unwrap()
    }

    fn to_dyn(&self) -> DynMatrix<f64> {
        DynMatrix::from_fn(self.rows, self.cols, |i, j| self.buf[i * self.stride + j])
    }

    fn padding_is_nan(&self) -> bool {
        self.buf
            .iter()
            .enumerate()
            .filter(|(idx, _)| idx % self.stride >= self.cols)
            .all(|(_, x)| x.is_nan())
    }
}

struct Case {
    m: usize,
    p: usize,
    n: usize,
    k: usize,
    l: usize,
    // Row strides of A, B, U, V, Q; 0 means densely packed.
    strides: [usize; 5],
}

const fn case(m: usize, p: usize, n: usize, k: usize, l: usize, strides: [usize; 5]) -> Case {
    Case { m, p, n, k, l, strides }
}

const CASES: [Case; 18] = [
    case(5, 5, 5, 2, 2, [0; 5]),
    case(5, 5, 5, 4, 1, [0; 5]),
    case(5, 5, 10, 2, 2, [0; 5]),
    case(5, 5, 10, 4, 1, [0; 5]),
    case(5, 5, 10, 4, 2, [0; 5]),
    case(10, 5, 5, 2, 2, [0; 5]),
    case(10, 5, 5, 4, 1, [0; 5]),
    case(10, 10, 10, 5, 3, [0; 5]),
    case(10, 10, 10, 6, 4, [0; 5]),
    case(5, 5, 5, 2, 2, [10, 10, 10, 10, 10]),
    case(5, 5, 5, 4, 1, [10, 10, 10, 10, 10]),
    case(5, 5, 10, 2, 2, [20, 20, 10, 10, 20]),
    case(5, 5, 10, 4, 1, [20, 20, 10, 10, 20]),
    case(5, 5, 10, 4, 2, [20, 20, 10, 10, 20]),
    case(10, 5, 5, 2, 2, [10, 10, 20, 10, 10]),
    case(10, 5, 5, 4, 1, [10, 10, 20, 10, 10]),
    case(10, 10, 10, 5, 3, [20, 20, 20, 20, 20]),
    case(10, 10, 10, 6, 4, [20, 20, 20, 20, 20]),
];

/// Everything a converged run produces, copied out of the caller buffers.
struct Solution {
    a: DynMatrix<f64>,
    b: DynMatrix<f64>,
    u: DynMatrix<f64>,
    v: DynMatrix<f64>,
    q: DynMatrix<f64>,
    alpha: Vec<f64>,
    beta: Vec<f64>,
    report: JacobiReport,
}

fn solve_strided(a0: &DynMatrix<f64>, b0: &DynMatrix<f64>, c: &Case) -> Solution {
    let Case { m, p, n, k, l, strides } = *c;
    let mut a = Strided::from_matrix(a0, strides[0]);
    let mut b = Strided::from_matrix(b0, strides[1]);
    let mut u = Strided::nan(m, m, strides[2]);
    let mut v = Strided::nan(p, p, strides[3]);
    let mut q = Strided::nan(n, n, strides[4]);
    let mut alpha = vec![0.0; n];
    let mut beta = vec![0.0; n];
    let mut work = vec![0.0; 2 * n];

    let shape = BlockShape { m, p, n, k, l };
    let tol = Tolerances::from_matrices(a0, b0);
    let report = {
        let mut uv = u.view_mut();
        let mut vv = v.view_mut();
        let mut qv = q.view_mut();
        tgsja(
            &mut a.view_mut(),
            &mut b.view_mut(),
            shape,
            tol,
            &mut alpha,
            &mut beta,
            Factors::compute(&mut uv, &mut vv, &mut qv),
            &mut work,
        )
        .unwrap()
    };

    for s in [&a, &b, &u, &v, &q] {
        assert!(s.padding_is_nan(), "padding was written");
    }

    Solution {
        a: a.to_dyn(),
        b: b.to_dyn(),
        u: u.to_dyn(),
        v: v.to_dyn(),
        q: q.to_dyn(),
        alpha,
        beta,
        report,
    }
}

/// `[0 R]`, `D1` and `D2` assembled from a converged run.
fn construct(sol: &Solution, c: &Case) -> (DynMatrix<f64>, DynMatrix<f64>, DynMatrix<f64>) {
    let Case { m, p, n, k, l, .. } = *c;
    let kl = k + l;
    let c0 = n - kl;

    let mut zero_r = DynMatrix::zeros(kl, n, 0.0);
    for i in 0..kl {
        for j in i..kl {
            zero_r[(i, c0 + j)] = if i < m {
                sol.a[(i, c0 + j)]
            } else {
                sol.b[(i - k, c0 + j)]
            };
        }
    }

    let paired = l.min(m.saturating_sub(k));
    let mut d1 = DynMatrix::zeros(m, kl, 0.0);
    for i in 0..k {
        d1[(i, i)] = 1.0;
    }
    for i in k..(k + paired) {
        d1[(i, i)] = sol.alpha[i];
    }

    let mut d2 = DynMatrix::zeros(p, kl, 0.0);
    for i in 0..paired {
        d2[(i, k + i)] = sol.beta[k + i];
    }
    for i in paired..l {
        d2[(i, k + i)] = 1.0;
    }
    (zero_r, d1, d2)
}

fn assert_close(lhs: &DynMatrix<f64>, rhs: &DynMatrix<f64>, tol: f64, msg: &str) {
    let err = (lhs - rhs).max_abs();
    assert!(err <= tol, "{}: max error {:e} > {:e}", msg, err, tol);
}

fn check_solution(
    a0: &DynMatrix<f64>,
    b0: &DynMatrix<f64>,
    sol: &Solution,
    c: &Case,
    cas: usize,
) {
    let Case { m, n, k, l, .. } = *c;
    assert!(sol.report.converged, "case {}: no convergence", cas);

    for (name, f) in [("U", &sol.u), ("V", &sol.v), ("Q", &sol.q)] {
        let resid = f.orthogonality_residual();
        assert!(resid <= TOL, "case {}: {} not orthogonal, resid {:e}", cas, name, resid);
    }

    for i in k..(k + l).min(m) {
        let d = sol.alpha[i] * sol.alpha[i] + sol.beta[i] * sol.beta[i];
        assert!((d - 1.0).abs() <= TOL, "case {}: alpha_{i}^2 + beta_{i}^2 = {}", cas, d);
        assert!(sol.alpha[i] >= 0.0 && sol.beta[i] >= 0.0);
    }
    for i in 0..k {
        assert_eq!((sol.alpha[i], sol.beta[i]), (1.0, 0.0), "case {}: k-block", cas);
    }
    for i in (k + l)..n {
        assert_eq!((sol.alpha[i], sol.beta[i]), (0.0, 0.0), "case {}: padding", cas);
    }

    let (zero_r, d1, d2) = construct(sol, c);
    let ua = &sol.u.tr_mul(a0) * &sol.q;
    assert_close(&ua, &(&d1 * &zero_r), TOL, &format!("case {}: UᵀAQ", cas));
    let vb = &sol.v.tr_mul(b0) * &sol.q;
    assert_close(&vb, &(&d2 * &zero_r), TOL, &format!("case {}: VᵀBQ", cas));
}

#[test]
fn reference_cases() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(1);
    for (cas, c) in CASES.iter().enumerate() {
        let a0 = blocked_upper(&mut rng, c.m, c.n, c.k, c.l, true);
        let b0 = blocked_upper(&mut rng, c.p, c.n, c.k, c.l, false);
        let sol = solve_strided(&a0, &b0, c);
        check_solution(&a0, &b0, &sol, c, cas);
    }
}

#[test]
fn many_random_pairs() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x9e37_79b9);
    for cas in 0..40 {
        let n = rng.random_range(1..9);
        let k = rng.random_range(0..=n);
        let l = rng.random_range(0..=(n - k));
        let m = rng.random_range(k.max(1)..=(k + l + 2));
        let p = rng.random_range(l.max(1)..=(l + 2));
        let c = case(m, p, n, k, l, [0; 5]);
        let a0 = blocked_upper(&mut rng, m, n, k, l, true);
        let b0 = blocked_upper(&mut rng, p, n, k, l, false);
        let sol = solve_strided(&a0, &b0, &c);
        check_solution(&a0, &b0, &sol, &c, cas);
    }
}

#[test]
fn identical_input_gives_identical_output() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(7);
    let c = &CASES[8];
    let a0 = blocked_upper(&mut rng, c.m, c.n, c.k, c.l, true);
    let b0 = blocked_upper(&mut rng, c.p, c.n, c.k, c.l, false);
    let first = solve_strided(&a0, &b0, c);
    let second = solve_strided(&a0, &b0, c);
    assert_eq!(first.report, second.report);
    assert_eq!(first.alpha, second.alpha);
    assert_eq!(first.beta, second.beta);
    assert_eq!(first.u, second.u);
    assert_eq!(first.q, second.q);
    assert_eq!(first.a, second.a);
}

#[test]
fn converged_output_is_a_fixed_point() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(11);
    let c = &CASES[7];
    let a0 = blocked_upper(&mut rng, c.m, c.n, c.k, c.l, true);
    let b0 = blocked_upper(&mut rng, c.p, c.n, c.k, c.l, false);
    let first = solve_strided(&a0, &b0, c);
    assert!(first.report.cycles > 0);

    // The reduced pair is already parallel row by row.
    let again = solve_strided(&first.a, &first.b, c);
    assert!(again.report.converged);
    assert_eq!(again.report.cycles, 0);
    check_solution(&first.a, &first.b, &again, c, 7);
}

#[test]
fn update_job_composes_with_previous_factors() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(3);
    let c = &CASES[0];
    let a0 = blocked_upper(&mut rng, c.m, c.n, c.k, c.l, true);
    let b0 = blocked_upper(&mut rng, c.p, c.n, c.k, c.l, false);
    let reference = solve_strided(&a0, &b0, c);

    // Q starts as the permutation swapping the first two coordinates.
    let mut w = DynMatrix::eye(c.n, 0.0);
    w[(0, 0)] = 0.0;
    w[(0, 1)] = 1.0;
    w[(1, 0)] = 1.0;
    w[(1, 1)] = 0.0;
    let mut q = w.clone();
    let (mut a, mut b) = (a0.clone(), b0.clone());
    let mut alpha = vec![0.0; c.n];
    let mut beta = vec![0.0; c.n];
    let mut work = vec![0.0; 2 * c.n];
    let report = tgsja(
        &mut a,
        &mut b,
        BlockShape::of(&a0, &b0, c.k, c.l),
        Tolerances::from_matrices(&a0, &b0),
        &mut alpha,
        &mut beta,
        Factors {
            u: Factor::Skip,
            v: Factor::Skip,
            q: Factor::Update(&mut q),
        },
        &mut work,
    )
    .unwrap();

    assert_eq!(report, reference.report);
    assert_eq!(alpha, reference.alpha);
    assert_close(&q, &(&w * &reference.q), 0.0, "Q = W·Q_ref");
}

#[test]
fn trivial_tolerance_skips_the_iteration() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(5);
    let c = &CASES[2];
    let (k, l) = (c.k, c.l);
    let c0 = c.n - l;
    let mut a0 = blocked_upper(&mut rng, c.m, c.n, k, l, true);
    let mut b0 = blocked_upper(&mut rng, c.p, c.n, k, l, false);
    // Matching diagonal signs, so the finalizer flips nothing.
    for i in 0..l {
        a0[(k + i, c0 + i)] = a0[(k + i, c0 + i)].abs();
        b0[(i, c0 + i)] = b0[(i, c0 + i)].abs();
    }

    let (mut a, mut b) = (a0.clone(), b0.clone());
    let mut u = DynMatrix::zeros(c.m, c.m, 0.0);
    let mut v = DynMatrix::zeros(c.p, c.p, 0.0);
    let mut q = DynMatrix::zeros(c.n, c.n, 0.0);
    let mut alpha = vec![0.0; c.n];
    let mut beta = vec![0.0; c.n];
    let mut work = vec![0.0; 2 * c.n];
    let shape = BlockShape { m: c.m, p: c.p, n: c.n, k, l };
    let report = tgsja(
        &mut a,
        &mut b,
        shape,
        Tolerances::new(1e6, 1e6),
        &mut alpha,
        &mut beta,
        Factors::compute(&mut u, &mut v, &mut q),
        &mut work,
    )
    .unwrap();
    assert_eq!(report, JacobiReport { cycles: 0, converged: true });
    assert_eq!(u, DynMatrix::eye(c.m, 0.0));
    assert_eq!(v, DynMatrix::eye(c.p, 0.0));
    assert_eq!(q, DynMatrix::eye(c.n, 0.0));

    // Rows outside the l-block are untouched.
    let active = shape.active_rows();
    assert_eq!(active, l);
    for i in (0..k).chain(k + active..c.m) {
        assert_eq!(a.row(i), a0.row(i), "A row {}", i);
    }
    for i in active..c.p {
        assert_eq!(b.row(i), b0.row(i), "B row {}", i);
    }

    // Each l-block row pair is only rescaled from its diagonal onwards.
    for i in 0..active {
        let (ai, bi) = (k + i, i);
        let (cos, sin) = (alpha[ai], beta[ai]);
        let (a1, b1) = (a0[(ai, c0 + i)], b0[(bi, c0 + i)]);
        assert!((cos * cos + sin * sin - 1.0).abs() <= TOL);
        assert!((cos * b1 - sin * a1).abs() <= TOL * a1.max(b1));
        assert_eq!(&a.row(ai)[..c0 + i], &a0.row(ai)[..c0 + i]);
        assert_eq!(&b.row(bi)[..c0 + i], &b0.row(bi)[..c0 + i]);
        for j in (c0 + i)..c.n {
            if cos >= sin {
                assert_eq!(a[(ai, j)], (1.0 / cos) * a0[(ai, j)]);
                assert_eq!(b[(bi, j)], b0[(bi, j)]);
            } else {
                assert_eq!(b[(bi, j)], (1.0 / sin) * b0[(bi, j)]);
                assert_eq!(a[(ai, j)], b[(bi, j)]);
            }
        }
    }
}

#[test]
fn owned_wrapper_matches_kernel() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(13);
    for c in [&CASES[3], &CASES[5], &CASES[8]] {
        let a0 = blocked_upper(&mut rng, c.m, c.n, c.k, c.l, true);
        let b0 = blocked_upper(&mut rng, c.p, c.n, c.k, c.l, false);
        let kernel = solve_strided(&a0, &b0, c);
        let g = DynGsvd::new(&a0, &b0, c.k, c.l).unwrap();

        assert_eq!(g.alpha(), &kernel.alpha[..]);
        assert_eq!(g.beta(), &kernel.beta[..]);
        assert_eq!(g.cycles(), kernel.report.cycles);
        assert_eq!(g.q(), &kernel.q);

        let (zero_r, d1, d2) = construct(&kernel, c);
        assert_eq!(g.zero_r(), zero_r);
        assert_eq!(g.d1(), d1);
        assert_eq!(g.d2(), d2);

        let sigma = g.generalized_singular_values();
        for ((s, &cos), &sin) in sigma.iter().zip(g.cosines()).zip(g.sines()) {
            if sin == 0.0 {
                assert!(s.is_infinite());
            } else {
                assert!((s * sin - cos).abs() <= TOL * 10.0);
            }
        }
    }
}
