//! Commands - CLI Command Implementations
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

pub mod config;
pub mod convert;
pub mod inspect;
pub mod print;
pub mod stats;

pub(crate) mod utils;
