//! # numeris-gsvd
//!
//! Generalized singular value decomposition of pre-reduced matrix pairs by
//! cyclic Jacobi iteration, no-std compatible. The core kernel never
//! allocates: it works in place on caller-owned, strided buffers.
//!
//! ## Quick start
//!
//! ```
//! use numeris_gsvd::DynMatrix;
//!
//! // A (2×2) and B (2×2), both upper triangular: k = 0, l = 2.
//! let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 0.0, 3.0]);
//! let b = DynMatrix::from_rows(2, 2, &[4.0_f64, 1.0, 0.0, 2.0]);
//! let gsvd = a.gsvd_reduced(&b, 0, 2).unwrap();
//!
//! // Uᵀ·A·Q = D1·R and Vᵀ·B·Q = D2·R
//! let ua = &gsvd.u().tr_mul(&a) * gsvd.q();
//! assert!((&ua - &(&gsvd.d1() * &gsvd.r())).max_abs() < 1e-13);
//! let vb = &gsvd.v().tr_mul(&b) * gsvd.q();
//! assert!((&vb - &(&gsvd.d2() * &gsvd.r())).max_abs() < 1e-13);
//! ```
//!
//! ## Modules
//!
//! - [`linalg`] — The in-place GSVD kernel ([`linalg::tgsja`],
//!   [`linalg::CyclicJacobi`] behind the [`linalg::GsvdKernel`] trait), plane
//!   rotations and 2×2 singular value kernels ([`linalg::givens`]), `gemm`
//!   and norms. Free functions operate on `&mut impl MatrixMut<T>`.
//!
//! - [`view`] — [`MatrixView`] / [`MatrixViewMut`]: borrowed row-major
//!   matrices with an explicit row stride (leading dimension) and zero-copy
//!   sub-blocks.
//!
//! - [`dynmatrix`] — Heap-allocated `DynMatrix<T>` with runtime dimensions
//!   (requires `alloc` feature, included with `std`). `Vec<T>` row-major
//!   storage. Implements [`MatrixRef`] / [`MatrixMut`], so all linalg free
//!   functions work automatically. Includes the `DynGsvd` wrapper.
//!
//! - [`traits`] — Element trait hierarchy:
//!   - [`Scalar`] — all matrix elements (`Copy + PartialEq + Debug + Zero + One + Num`)
//!   - [`FloatScalar`] — real floats (`Scalar + Float`), used by every algorithm
//!   - [`MatrixRef`] / [`MatrixMut`] — generic read/write access for algorithms
//!
//! ## Logging
//!
//! The kernel reports through the [`log`](https://docs.rs/log) facade:
//! `debug` on entry and convergence, `trace` for every residual evaluation
//! and `warn` when the cycle budget runs out. No logger is installed by the
//! crate.
//!
//! ## Cargo features
//!
//! | Feature   | Default  | Description |
//! |-----------|----------|-------------|
//! | `std`     | yes      | Implies `alloc`. Hardware FPU via system libm, `std::error::Error` |
//! | `alloc`   | via std  | `DynMatrix` / `DynGsvd` (heap-allocated, runtime-sized) |
//! | `libm`    | baseline | Pure-Rust software float fallback |
//! | `all`     | no       | All features |

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
pub mod dynmatrix;
pub mod linalg;
pub mod traits;
pub mod view;

#[cfg(feature = "alloc")]
pub use dynmatrix::{DynGsvd, DynMatrix};
pub use linalg::LinalgError;
pub use traits::{FloatScalar, MatrixMut, MatrixRef, Scalar};
pub use view::{MatrixView, MatrixViewMut};
