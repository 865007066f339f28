use super::Problem;
use crate::linalg::givens::{lartg, lasv2, rot_cols, rot_rows};
use crate::traits::{FloatScalar, MatrixMut};

/// Which triangle of the 2×2 pair is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Triangle {
    Upper,
    Lower,
}

/// Rotations `(U, V, Q)` of a 2×2 triangular pair GSVD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PairRotation<T> {
    pub csu: T,
    pub snu: T,
    pub csv: T,
    pub snv: T,
    pub csq: T,
    pub snq: T,
}

/// Orthogonal `U`, `V`, `Q` such that for the upper triangular pair
///
/// ```text
///   Uᵀ·[a1 a2]·Q = [x  0]     Vᵀ·[b1 b2]·Q = [x  0]
///      [0  a3]     [x  x]        [0  b3]     [x  x]
/// ```
///
/// (for a lower triangular pair the zero lands at `(2,1)` instead), with
/// `U = [[csu, snu], [-snu, csu]]` and likewise for `V` and `Q`.
///
/// The `Q` rotation is computed from whichever of `A` or `B` has the
/// smaller relative off-diagonal mass after the left rotation, which keeps
/// the zero it produces accurate in both.
pub(crate) fn lags2<T: FloatScalar>(
    triangle: Triangle,
    a1: T,
    a2: T,
    a3: T,
    b1: T,
    b2: T,
    b3: T,
) -> PairRotation<T> {
    let zero = T::zero();

    // Q rotation from the (reduced, full) entries of the row to zero,
    // preferring A unless its relative off-diagonal mass is larger.
    let pick = |ua_red: T, ua_full: T, aua: T, vb_red: T, vb_full: T, avb: T| {
        let ua_mass = ua_red.abs() + ua_full.abs();
        if ua_mass != zero && aua / ua_mass <= avb / (vb_red.abs() + vb_full.abs()) {
            (ua_red, ua_full)
        } else {
            (vb_red, vb_full)
        }
    };

    match triangle {
        Triangle::Upper => {
            // C = A·adj(B) = [[a, b], [0, d]]
            let a = a1 * b3;
            let d = a3 * b1;
            let b = a2 * b1 - a1 * b2;
            let svd = lasv2(a, b, d);
            let (csl, snl, csr, snr) = (svd.csl, svd.snl, svd.csr, svd.snr);

            if csl.abs() >= snl.abs() || csr.abs() >= snr.abs() {
                // Zero the (1,2) entries of UᵀA and VᵀB.
                let ua11r = csl * a1;
                let ua12 = csl * a2 + snl * a3;
                let vb11r = csr * b1;
                let vb12 = csr * b2 + snr * b3;
                let aua12 = csl.abs() * a2.abs() + snl.abs() * a3.abs();
                let avb12 = csr.abs() * b2.abs() + snr.abs() * b3.abs();
                let (f, g) = pick(ua11r, ua12, aua12, vb11r, vb12, avb12);
                let q = lartg(-f, g);
                PairRotation {
                    csu: csl,
                    snu: -snl,
                    csv: csr,
                    snv: -snr,
                    csq: q.c,
                    snq: q.s,
                }
            } else {
                // Zero the (2,2) entries of UᵀA and VᵀB, then swap rows.
                let ua21 = -snl * a1;
                let ua22 = -snl * a2 + csl * a3;
                let vb21 = -snr * b1;
                let vb22 = -snr * b2 + csr * b3;
                let aua22 = snl.abs() * a2.abs() + csl.abs() * a3.abs();
                let avb22 = snr.abs() * b2.abs() + csr.abs() * b3.abs();
                let (f, g) = pick(ua21, ua22, aua22, vb21, vb22, avb22);
                let q = lartg(-f, g);
                PairRotation {
                    csu: snl,
                    snu: csl,
                    csv: snr,
                    snv: csr,
                    csq: q.c,
                    snq: q.s,
                }
            }
        }
        Triangle::Lower => {
            // C = A·adj(B) = [[a, 0], [c, d]]
            let a = a1 * b3;
            let d = a3 * b1;
            let c = a2 * b3 - a3 * b2;
            let svd = lasv2(a, c, d);
            let (csl, snl, csr, snr) = (svd.csl, svd.snl, svd.csr, svd.snr);

            if csr.abs() >= snr.abs() || csl.abs() >= snl.abs() {
                // Zero the (2,1) entries of UᵀA and VᵀB.
                let ua21 = -snr * a1 + csr * a2;
                let ua22r = csr * a3;
                let vb21 = -snl * b1 + csl * b2;
                let vb22r = csl * b3;
                let aua21 = snr.abs() * a1.abs() + csr.abs() * a2.abs();
                let avb21 = snl.abs() * b1.abs() + csl.abs() * b2.abs();
                let (f, g) = pick(ua22r, ua21, aua21, vb22r, vb21, avb21);
                let q = lartg(f, g);
                PairRotation {
                    csu: csr,
                    snu: -snr,
                    csv: csl,
                    snv: -snl,
                    csq: q.c,
                    snq: q.s,
                }
            } else {
                // Zero the (1,1) entries of UᵀA and VᵀB, then swap rows.
                let ua11 = csr * a1 + snr * a2;
                let ua12 = snr * a3;
                let vb11 = csl * b1 + snl * b2;
                let vb12 = snl * b3;
                let aua11 = csr.abs() * a1.abs() + snr.abs() * a2.abs();
                let avb11 = csl.abs() * b1.abs() + snl.abs() * b2.abs();
                let (f, g) = pick(ua12, ua11, aua11, vb12, vb11, avb11);
                let q = lartg(f, g);
                PairRotation {
                    csu: snr,
                    snu: csr,
                    csv: snl,
                    snv: csl,
                    csq: q.c,
                    snq: q.s,
                }
            }
        }
    }
}

impl<'p, T, A, B, M> Problem<'p, T, A, B, M>
where
    T: FloatScalar,
    A: MatrixMut<T>,
    B: MatrixMut<T>,
    M: MatrixMut<T>,
{
    /// The six entries `(a1, a2, a3, b1, b2, b3)` of pair `(i, j)`, `i < j`,
    /// with `a2`/`b2` taken from the populated triangle.
    pub(crate) fn pair_entries(&self, i: usize, j: usize, triangle: Triangle) -> [T; 6] {
        let k = self.shape.k;
        let c0 = self.shape.first_l_col();
        let (a2, b2) = match triangle {
            Triangle::Upper => (self.a_at(k + i, c0 + j), *self.b.get(i, c0 + j)),
            Triangle::Lower => (self.a_at(k + j, c0 + i), *self.b.get(j, c0 + i)),
        };
        [
            self.a_at(k + i, c0 + i),
            a2,
            self.a_at(k + j, c0 + j),
            *self.b.get(i, c0 + i),
            b2,
            *self.b.get(j, c0 + j),
        ]
    }

    /// Apply `rot` to pair `(i, j)` of the `l`-block: rotate rows `k+i`,
    /// `k+j` of `A` and `i`, `j` of `B` from the left, columns `n-l+i`,
    /// `n-l+j` of both from the right, zero the targeted entry and
    /// accumulate into whichever factors are being formed.
    pub(crate) fn annihilate(
        &mut self,
        i: usize,
        j: usize,
        triangle: Triangle,
        rot: &PairRotation<T>,
    ) {
        let super::BlockShape { m, p, n, k, l } = self.shape;
        let c0 = self.shape.first_l_col();
        let a_rows = (k + l).min(m);
        // Row k+i of A exists whenever row k+j does.
        let has_j = k + j < m;

        if has_j {
            rot_rows(self.a, k + j, k + i, c0, l, rot.csu, rot.snu);
        }
        rot_rows(self.b, j, i, c0, l, rot.csv, rot.snv);

        rot_cols(self.a, c0 + j, c0 + i, 0, a_rows, rot.csq, rot.snq);
        rot_cols(self.b, c0 + j, c0 + i, 0, l, rot.csq, rot.snq);

        match triangle {
            Triangle::Upper => {
                if k + i < m {
                    *self.a.get_mut(k + i, c0 + j) = T::zero();
                }
                *self.b.get_mut(i, c0 + j) = T::zero();
            }
            Triangle::Lower => {
                if has_j {
                    *self.a.get_mut(k + j, c0 + i) = T::zero();
                }
                *self.b.get_mut(j, c0 + i) = T::zero();
            }
        }

        if let (true, Some(u)) = (has_j, self.u.as_deref_mut()) {
            rot_cols(u, k + j, k + i, 0, m, rot.csu, rot.snu);
        }
        if let Some(v) = self.v.as_deref_mut() {
            rot_cols(v, j, i, 0, p, rot.csv, rot.snv);
        }
        if let Some(q) = self.q.as_deref_mut() {
            rot_cols(q, c0 + j, c0 + i, 0, n, rot.csq, rot.snq);
        }
    }
}
