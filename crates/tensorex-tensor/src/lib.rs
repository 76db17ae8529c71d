//! Tensorex Tensor - N-Dimensional Arrays with Lazy Expressions
//!
//! This crate provides the `Tensor` container and the lazy expression system
//! built on top of it. Arithmetic and math functions build expression trees
//! that are evaluated with broadcasting when assigned; views share storage
//! with the tensor they were taken from.
//!
//! # Key Features
//! - Dynamic-rank tensors in row-major or column-major layout
//! - Lazy, broadcasting element-wise expressions
//! - Zero-copy views, slicing and strided reshapes
//! - Reductions, scans, sorting, set operations and norms
//! - NaN-aware reductions, histograms and axis iterators
//! - Seedable random sampling and NumPy-style printing
//!
//! # Example
//! ```rust
//! use tensorex_tensor::prelude::*;
//!
//! let a = arange::<f64>(0.0, 6.0).reshape(&[2, 3]).unwrap();
//! let b = Tensor::from_vec(vec![10.0, 20.0, 30.0], &[3]).unwrap();
//!
//! // Builds an expression; nothing is computed yet.
//! let expr = &a * 2.0 + &b;
//!
//! let c = expr.eval().unwrap();
//! assert_eq!(c.to_vec(), vec![10.0, 22.0, 34.0, 16.0, 28.0, 40.0]);
//!
//! let row = c.view(&[index(1), all()]).unwrap();
//! assert_eq!(row.sum_all(), 84.0);
//! ```
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Numeric-library allowances
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::type_complexity)]
#![allow(clippy::type_repetition_in_bounds)]
#![allow(clippy::iter_without_into_iter)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::float_cmp)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::missing_fields_in_debug)]

// =============================================================================
// Modules
// =============================================================================

pub mod accumulate;
pub mod assign;
pub mod axis_iter;
pub mod creation;
pub mod display;
pub mod expr;
pub mod histogram;
pub mod index;
pub mod iter;
pub mod linalg;
pub mod manipulation;
pub mod math;
pub mod nan;
pub mod norm;
pub mod ops;
pub mod random;
pub mod reduce;
pub mod set_ops;
pub mod shape;
pub mod sort;
pub mod tensor;
pub mod view;

// =============================================================================
// Re-exports
// =============================================================================

pub use tensorex_core::{DType, Error, Float, Layout, Numeric, PrintOptions, Result, Scalar};

pub use axis_iter::{AxisIter, AxisSliceIter};
pub use assign::{assign, assign_broadcast, assign_view, eval, eval_with_layout};
pub use creation::*;
pub use display::{DisplayElement, TensorDisplay};
pub use expr::{
    Binary, BinaryFn, Broadcast, Expression, Generator, IntoExpression, ScalarExpr, Ternary,
    TernaryFn, Unary, UnaryFn,
};
pub use histogram::BinAlgorithm;
pub use index::IndexView;
pub use iter::Stepper;
pub use manipulation::{PadMode, Trim};
pub use reduce::ReduceOptions;
pub use shape::{Shape, Strides};
pub use sort::{Side, TopK};
pub use tensor::Tensor;
pub use view::{cat, hstack, stack, vstack, SliceSpec};

// =============================================================================
// Prelude
// =============================================================================

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::creation::{
        arange, eye, full, full_like, linspace, ones, ones_like, zeros, zeros_like,
    };
    pub use crate::expr::{Expression, IntoExpression};
    pub use crate::reduce::ReduceOptions;
    pub use crate::tensor::Tensor;
    pub use crate::view::{all, ellipsis, index, newaxis, range, range_step, SliceSpec};
    pub use tensorex_core::{DType, Error, Float, Layout, Numeric, Result, Scalar};
}
