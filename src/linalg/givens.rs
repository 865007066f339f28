//! Plane rotations and 2×2 triangular singular value kernels.
//!
//! Everything here is scalar arithmetic on a handful of values plus
//! element-wise updates through [`MatrixMut`]; nothing allocates.

use crate::traits::{FloatScalar, MatrixMut};

/// A plane rotation `[[c, s], [-s, c]]` together with the length `r` of the
/// rotated vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation<T> {
    pub c: T,
    pub s: T,
    pub r: T,
}

/// Generate a plane rotation with
///
/// ```text
/// [  c  s ] [ f ]   [ r ]
/// [ -s  c ] [ g ] = [ 0 ]
/// ```
///
/// and `c² + s² = 1`. By convention `r >= 0` for finite input, so the sign
/// of `c` follows `f` and the sign of `s` follows `g`. `(0, 0)` yields the
/// identity rotation. Operands are rescaled when their magnitudes are near
/// the overflow or underflow threshold.
///
/// ```
/// use numeris_gsvd::linalg::givens::lartg;
///
/// let rot = lartg(3.0_f64, 4.0);
/// assert!((rot.r - 5.0).abs() < 1e-15);
/// assert!((rot.c - 0.6).abs() < 1e-15);
/// assert!((rot.s - 0.8).abs() < 1e-15);
/// assert!((-rot.s * 3.0 + rot.c * 4.0).abs() < 1e-15);
/// ```
pub fn lartg<T: FloatScalar>(f: T, g: T) -> Rotation<T> {
    let zero = T::zero();
    let one = T::one();
    if g == zero {
        if f < zero {
            return Rotation { c: -one, s: zero, r: -f };
        }
        return Rotation { c: one, s: zero, r: f };
    }
    if f == zero {
        return Rotation {
            c: zero,
            s: one.copysign(g),
            r: g.abs(),
        };
    }

    let safmin = T::min_positive_value();
    let safmax = one / safmin;
    let rtmin = safmin.sqrt();
    let rtmax = (safmax / (one + one)).sqrt();

    let f1 = f.abs();
    let g1 = g.abs();
    if rtmin < f1 && f1 < rtmax && rtmin < g1 && g1 < rtmax {
        let d = (f * f + g * g).sqrt();
        return Rotation {
            c: f / d,
            s: g / d,
            r: d,
        };
    }

    let u = safmin.max(f1.max(g1)).min(safmax);
    let fs = f / u;
    let gs = g / u;
    let d = (fs * fs + gs * gs).sqrt();
    Rotation {
        c: fs / d,
        s: gs / d,
        r: d * u,
    }
}

/// Apply a plane rotation to two rows of `m`, over columns
/// `col_start..col_start + len`:
///
/// ```text
/// row_x ←  c·row_x + s·row_y
/// row_y ← -s·row_x + c·row_y
/// ```
pub fn rot_rows<T: FloatScalar>(
    m: &mut impl MatrixMut<T>,
    row_x: usize,
    row_y: usize,
    col_start: usize,
    len: usize,
    c: T,
    s: T,
) {
    debug_assert_ne!(row_x, row_y);
    for col in col_start..col_start + len {
        let x = *m.get(row_x, col);
        let y = *m.get(row_y, col);
        *m.get_mut(row_x, col) = c * x + s * y;
        *m.get_mut(row_y, col) = c * y - s * x;
    }
}

/// Apply a plane rotation to two columns of `m`, over rows
/// `row_start..row_start + len`:
///
/// ```text
/// col_x ←  c·col_x + s·col_y
/// col_y ← -s·col_x + c·col_y
/// ```
pub fn rot_cols<T: FloatScalar>(
    m: &mut impl MatrixMut<T>,
    col_x: usize,
    col_y: usize,
    row_start: usize,
    len: usize,
    c: T,
    s: T,
) {
    debug_assert_ne!(col_x, col_y);
    for row in row_start..row_start + len {
        let x = *m.get(row, col_x);
        let y = *m.get(row, col_y);
        *m.get_mut(row, col_x) = c * x + s * y;
        *m.get_mut(row, col_y) = c * y - s * x;
    }
}

/// Scale `m[row, col_start..col_start + len]` by `alpha`.
pub(crate) fn scale_row<T: FloatScalar>(
    m: &mut impl MatrixMut<T>,
    row: usize,
    col_start: usize,
    len: usize,
    alpha: T,
) {
    for col in col_start..col_start + len {
        let v = *m.get(row, col);
        *m.get_mut(row, col) = alpha * v;
    }
}

/// Scale column `col` of `m` by `alpha`.
pub(crate) fn scale_col<T: FloatScalar>(m: &mut impl MatrixMut<T>, col: usize, alpha: T) {
    for row in 0..m.nrows() {
        let v = *m.get(row, col);
        *m.get_mut(row, col) = alpha * v;
    }
}

/// Singular values of the 2×2 upper triangular matrix `[[f, g], [0, h]]`.
///
/// Returns `(ssmin, ssmax)`. Intermediate quantities are formed as ratios
/// so that the result does not overflow unless `ssmax` itself does.
pub fn las2<T: FloatScalar>(f: T, g: T, h: T) -> (T, T) {
    let zero = T::zero();
    let one = T::one();
    let two = one + one;

    let fa = f.abs();
    let ga = g.abs();
    let ha = h.abs();
    let fhmn = fa.min(ha);
    let fhmx = fa.max(ha);

    if fhmn == zero {
        let ssmax = if fhmx == zero {
            ga
        } else {
            let big = fhmx.max(ga);
            let small = fhmx.min(ga);
            big * (one + (small / big) * (small / big)).sqrt()
        };
        return (zero, ssmax);
    }

    if ga < fhmx {
        let as_ = one + fhmn / fhmx;
        let at = (fhmx - fhmn) / fhmx;
        let au = (ga / fhmx) * (ga / fhmx);
        let c = two / ((as_ * as_ + au).sqrt() + (at * at + au).sqrt());
        return (fhmn * c, fhmx / c);
    }

    let au = fhmx / ga;
    if au == zero {
        // Avoid underflow of fhmn * fhmx when ga is huge.
        return ((fhmn * fhmx) / ga, ga);
    }
    let as_ = one + fhmn / fhmx;
    let at = (fhmx - fhmn) / fhmx;
    let c = one
        / ((one + (as_ * au) * (as_ * au)).sqrt() + (one + (at * au) * (at * au)).sqrt());
    let ssmin = (fhmn * c) * au;
    (ssmin + ssmin, ga / (c + c))
}

/// Full singular value decomposition of a 2×2 upper triangular matrix.
///
/// ```text
/// [  csl  snl ] [ f  g ] [ csr -snr ]   [ ssmax   0   ]
/// [ -snl  csl ] [ 0  h ] [ snr  csr ] = [   0   ssmin ]
/// ```
///
/// `|ssmax| >= |ssmin|`; the signs of the singular values are chosen so
/// that the identity holds exactly with the returned rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangularSvd2<T> {
    pub ssmin: T,
    pub ssmax: T,
    pub snr: T,
    pub csr: T,
    pub snl: T,
    pub csl: T,
}

/// Compute [`TriangularSvd2`] of `[[f, g], [0, h]]`.
///
/// ```
/// use numeris_gsvd::linalg::givens::lasv2;
///
/// let svd = lasv2(3.0_f64, 0.0, 4.0);
/// assert!((svd.ssmax.abs() - 4.0).abs() < 1e-15);
/// assert!((svd.ssmin.abs() - 3.0).abs() < 1e-15);
/// ```
pub fn lasv2<T: FloatScalar>(f: T, g: T, h: T) -> TriangularSvd2<T> {
    let zero = T::zero();
    let one = T::one();
    let two = one + one;
    let four = two + two;
    let half = one / two;

    let mut ft = f;
    let mut fa = ft.abs();
    let mut ht = h;
    let mut ha = h.abs();

    // pmax marks the entry of largest magnitude: 1 = f, 2 = g, 3 = h.
    let mut pmax = 1;
    let swap = ha > fa;
    if swap {
        pmax = 3;
        core::mem::swap(&mut ft, &mut ht);
        core::mem::swap(&mut fa, &mut ha);
    }

    let gt = g;
    let ga = gt.abs();

    if ga > fa && ga != zero {
        pmax = 2;
    }

    // (ssmin, ssmax, clt, slt, crt, srt) before undoing the swap.
    let (mut ssmin, mut ssmax, clt, slt, crt, srt) = if ga == zero {
        // Diagonal matrix.
        (ha, fa, one, zero, one, zero)
    } else if ga > fa && fa / ga < T::epsilon() {
        // g dominates to working precision.
        let smin = if ha > one { fa / (ga / ha) } else { (fa / ga) * ha };
        (smin, ga, one, ht / gt, ft / gt, one)
    } else {
        let d = fa - ha;
        // d == fa copes with infinite f or h.
        let l = if d == fa { one } else { d / fa };
        let m = gt / ft;
        let t = two - l;
        let mm = m * m;
        let s = (t * t + mm).sqrt();
        let r = if l == zero { m.abs() } else { (l * l + mm).sqrt() };
        let a = half * (s + r);
        let t = if mm == zero {
            if l == zero {
                two.copysign(ft) * one.copysign(gt)
            } else {
                gt / d.copysign(ft) + m / t
            }
        } else {
            (m / (s + t) + m / (r + l)) * (one + a)
        };
        let l = (t * t + four).sqrt();
        let crt = two / l;
        let srt = t / l;
        let clt = (crt + srt * m) / a;
        let slt = (ht / ft) * srt / a;
        (ha / a, fa * a, clt, slt, crt, srt)
    };

    let (csl, snl, csr, snr) = if swap {
        (srt, crt, slt, clt)
    } else {
        (clt, slt, crt, srt)
    };

    let tsign = match pmax {
        1 => one.copysign(csr) * one.copysign(csl) * one.copysign(f),
        2 => one.copysign(snr) * one.copysign(csl) * one.copysign(g),
        _ => one.copysign(snr) * one.copysign(snl) * one.copysign(h),
    };
    ssmax = ssmax.copysign(tsign);
    ssmin = ssmin.copysign(tsign * one.copysign(f) * one.copysign(h));

    TriangularSvd2 {
        ssmin,
        ssmax,
        snr,
        csr,
        snl,
        csl,
    }
}
