//! Tensorex Core - Foundation Layer for the Tensorex Array Library
//!
//! This crate provides the core abstractions that underpin tensorex: element
//! types, shared storage, memory layouts, engine configuration and the common
//! error type.
//!
//! # Key Features
//! - Type-safe element system (bool, signed/unsigned integers, f32, f64)
//! - Reference-counted storage shared between tensor views
//! - Row-major and column-major layouts
//! - TOML-backed engine configuration (print options, parallel threshold)
//! - Slice kernels for reductions and GEMM
//!
//! # Example
//! ```rust
//! use tensorex_core::{Layout, Storage};
//!
//! let storage = Storage::<f32>::zeros(1024);
//! assert_eq!(storage.len(), 1024);
//! assert_eq!(Layout::default(), Layout::RowMajor);
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
#![allow(clippy::needless_range_loop)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::items_after_statements)]

// =============================================================================
// Modules
// =============================================================================

pub mod config;
pub mod dtype;
pub mod error;
pub mod kernels;
pub mod layout;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{EngineConfig, PrintOptions};
pub use dtype::{DType, Float, Numeric, Scalar};
pub use error::{Error, Result};
pub use kernels::CpuKernels;
pub use layout::Layout;
pub use storage::Storage;

// =============================================================================
// Prelude
// =============================================================================

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::config::{EngineConfig, PrintOptions};
    pub use crate::dtype::{DType, Float, Numeric, Scalar};
    pub use crate::error::{Error, Result};
    pub use crate::layout::Layout;
    pub use crate::storage::Storage;
}
