//! Tensorex IO - Array File Formats
//!
//! Reading and writing tensors as NumPy `.npy` files and delimited text.
//!
//! # Supported Formats
//!
//! - **NPY** (.npy) - NumPy binary arrays, all fixed-size element types
//! - **CSV** (.csv, .tsv) - Delimited text, one row per line
//!
//! Files whose element type is only known at runtime load into
//! [`AnyTensor`].
//!
//! # Example
//!
//! ```rust
//! use tensorex_io::npy::{from_npy_bytes, to_npy_bytes};
//! use tensorex_tensor::Tensor;
//!
//! let t = Tensor::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
//! let bytes = to_npy_bytes(&t);
//! let back: Tensor<f32> = from_npy_bytes(&bytes).unwrap();
//! assert_eq!(back.to_vec(), t.to_vec());
//! ```
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::large_enum_variant)]

// =============================================================================
// Modules
// =============================================================================

pub mod any;
pub mod csv;
pub mod format;
pub mod npy;

// =============================================================================
// Re-exports
// =============================================================================

pub use any::AnyTensor;
pub use csv::{dump_csv, load_csv, CsvOptions};
pub use format::{detect_format, detect_format_from_bytes, Format};
pub use npy::{
    dump_npy, from_npy_bytes, load_npy, parse_header, read_header, to_npy_bytes, NpyElement,
    NpyHeader,
};
