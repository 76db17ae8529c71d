//! # tensorex - N-Dimensional Arrays and Lazy Expressions
//!
//! tensorex is a dynamic-rank array library. Arithmetic on tensors builds
//! lazy expression trees that broadcast their operands and are only
//! evaluated when assigned. Views share storage with the tensor they were
//! taken from, so writes through a view reach the original.
//!
//! ## Core Features
//!
//! - **Tensors**: row-major or column-major storage, strided views, reshape,
//!   transpose, broadcasting
//! - **Expressions**: element-wise arithmetic, comparisons, `where`, math
//!   functions and casts, fused on evaluation
//! - **Views**: ranges, steps, `newaxis`, ellipsis, integer and boolean
//!   indexing, `cat`/`stack`
//! - **Routines**: reductions, cumulative ops, sorting, set operations,
//!   norms, `matmul`, padding, rolling, diagonals
//! - **Statistics**: NaN-skipping reductions, histograms, `bincount`
//! - **Random**: seedable uniform, normal, integer and binomial sampling
//! - **IO**: NumPy `.npy` and CSV files
//!
//! # Quick Start
//!
//! ```rust
//! use tensorex::prelude::*;
//!
//! let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
//! let bias = Tensor::from_vec(vec![10.0, 20.0], &[2]).unwrap();
//!
//! let out = (&a * &a + &bias).eval().unwrap();
//! assert_eq!(out.to_vec(), vec![11.0, 24.0, 19.0, 36.0]);
//!
//! let total = tensorex::reduce::sum(&out, &ReduceOptions::axis(0)).unwrap();
//! assert_eq!(total.to_vec(), vec![30.0, 60.0]);
//! ```
//!
//! # Feature Flags
//!
//! - `io` (default): NPY and CSV reading and writing
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

// =============================================================================
// Core Re-exports
// =============================================================================

pub use tensorex_core::{DType, EngineConfig, Error, Layout, PrintOptions, Result};

// =============================================================================
// Tensor Re-exports
// =============================================================================

pub use tensorex_tensor as tensor;
pub use tensorex_tensor::{
    accumulate, axis_iter, creation, histogram, linalg, manipulation, math, nan, norm, ops, random,
    reduce, set_ops, sort, view, Expression, IntoExpression, ReduceOptions, Tensor,
};

// =============================================================================
// IO Re-exports
// =============================================================================

#[cfg(feature = "io")]
pub use tensorex_io as io;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports.
///
/// ```rust
/// use tensorex::prelude::*;
/// ```
pub mod prelude {
    pub use tensorex_tensor::prelude::*;
    pub use tensorex_tensor::{math, ops, reduce};

    #[cfg(feature = "io")]
    pub use tensorex_io::{dump_npy, load_npy, AnyTensor};
}
