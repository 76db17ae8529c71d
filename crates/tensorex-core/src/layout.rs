//! Layout - Memory Ordering of Tensor Elements
//!
//! A layout decides which dimension varies fastest in memory. Row-major
//! (C order) puts the last dimension innermost; column-major (Fortran order)
//! puts the first dimension innermost.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use serde::{Deserialize, Serialize};

/// Memory layout of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// C order: the last dimension has the smallest stride.
    #[default]
    RowMajor,
    /// Fortran order: the first dimension has the smallest stride.
    ColumnMajor,
}

impl Layout {
    /// Returns the conventional short name (`"C"` or `"F"`).
    #[must_use]
    pub const fn order_char(self) -> char {
        match self {
            Self::RowMajor => 'C',
            Self::ColumnMajor => 'F',
        }
    }

    /// Returns true for column-major (Fortran) order.
    #[must_use]
    pub const fn is_fortran(self) -> bool {
        matches!(self, Self::ColumnMajor)
    }
}

impl core::fmt::Display for Layout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::RowMajor => write!(f, "row_major"),
            Self::ColumnMajor => write!(f, "column_major"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_default_and_display() {
        assert_eq!(Layout::default(), Layout::RowMajor);
        assert_eq!(Layout::ColumnMajor.to_string(), "column_major");
        assert_eq!(Layout::ColumnMajor.order_char(), 'F');
        assert!(!Layout::RowMajor.is_fortran());
    }
}
