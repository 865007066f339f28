pub mod gemm;
pub mod givens;
pub mod gsvd;
pub mod norm;

pub use gemm::{gemm, Transpose};
pub use gsvd::{
    tgsja, BlockShape, CyclicJacobi, Factor, Factors, GsvdJob, GsvdKernel, JacobiReport,
    Tolerances, MAX_CYCLES,
};
pub use norm::{frobenius_norm, norm_one, orthogonality_residual};

/// Errors from linear algebra operations.
///
/// Configuration errors (shapes, strides, buffers, tolerances, non-finite
/// input) are caller bugs and are reported before any element is touched.
/// `ConvergenceFailure` is only produced by the owned wrappers; the in-place
/// kernel reports non-convergence through [`JacobiReport::converged`].
///
/// ```
/// use numeris_gsvd::linalg::LinalgError;
///
/// let err = LinalgError::InvalidStride { stride: 2, ncols: 3 };
/// assert_eq!(err.to_string(), "row stride 2 is smaller than the column count 3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinalgError {
    /// Iterative algorithm did not converge within the cycle budget.
    ConvergenceFailure,
    /// A matrix does not have the shape the block descriptor requires.
    DimensionMismatch {
        /// Which operand is wrong (`"A"`, `"B"`, `"U"`, ...).
        what: &'static str,
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Got `(rows, cols)`.
        got: (usize, usize),
    },
    /// The `(m, p, n, k, l)` block descriptor is inconsistent
    /// (requires `k + l <= n`, `k <= m`, `l <= p`).
    InvalidBlockShape {
        m: usize,
        p: usize,
        n: usize,
        k: usize,
        l: usize,
    },
    /// Row stride smaller than the number of columns.
    InvalidStride { stride: usize, ncols: usize },
    /// A caller-supplied buffer is too short.
    BufferTooShort {
        what: &'static str,
        needed: usize,
        got: usize,
    },
    /// A tolerance is negative, NaN or infinite.
    InvalidTolerance,
    /// An input matrix contains NaN or infinity.
    NonFinite,
}

impl core::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinalgError::ConvergenceFailure => write!(f, "iterative algorithm did not converge"),
            LinalgError::DimensionMismatch { what, expected, got } => write!(
                f,
                "{} has shape {}x{}, expected {}x{}",
                what, got.0, got.1, expected.0, expected.1
            ),
            LinalgError::InvalidBlockShape { m, p, n, k, l } => write!(
                f,
                "invalid block shape m={} p={} n={} k={} l={} (need k+l<=n, k<=m, l<=p)",
                m, p, n, k, l
            ),
            LinalgError::InvalidStride { stride, ncols } => write!(
                f,
                "row stride {} is smaller than the column count {}",
                stride, ncols
            ),
            LinalgError::BufferTooShort { what, needed, got } => write!(
                f,
                "{} buffer too short: need {} elements, got {}",
                what, needed, got
            ),
            LinalgError::InvalidTolerance => {
                write!(f, "tolerances must be finite and non-negative")
            }
            LinalgError::NonFinite => write!(f, "matrix contains NaN or infinite entries"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LinalgError {}
