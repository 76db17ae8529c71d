//! Iteration - Multi-Index Steppers and Offset Walks
//!
//! The stepper is an odometer over a shape: it increments the innermost
//! index and carries into outer ones. Row-major steppers treat the last axis
//! as innermost, column-major steppers the first.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use tensorex_core::Layout;

use crate::shape::numel;

// =============================================================================
// Stepper
// =============================================================================

/// Multi-index odometer over a shape.
#[derive(Debug, Clone)]
pub struct Stepper {
    shape: Vec<usize>,
    index: Vec<usize>,
    layout: Layout,
    remaining: usize,
}

impl Stepper {
    /// Creates a stepper positioned at the all-zero index.
    #[must_use]
    pub fn new(shape: &[usize], layout: Layout) -> Self {
        Self {
            shape: shape.to_vec(),
            index: vec![0; shape.len()],
            layout,
            remaining: numel(shape),
        }
    }

    /// Returns the current multi-index.
    #[must_use]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Returns the number of positions not yet visited, including the
    /// current one.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Returns true when every position has been visited.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.remaining == 0
    }

    /// Moves to the next position. Returns false once the walk is complete.
    pub fn step(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            return false;
        }

        let ndim = self.shape.len();
        for k in 0..ndim {
            let axis = match self.layout {
                Layout::RowMajor => ndim - 1 - k,
                Layout::ColumnMajor => k,
            };
            self.index[axis] += 1;
            if self.index[axis] < self.shape[axis] {
                return true;
            }
            self.index[axis] = 0;
        }
        true
    }
}

impl Iterator for Stepper {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done() {
            return None;
        }
        let current = self.index.clone();
        self.step();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Stepper {}

// =============================================================================
// Offset Walk
// =============================================================================

/// Calls `f` with the storage offset of every element of a strided tensor,
/// in row-major logical order.
///
/// The offset is updated incrementally, so negative strides are allowed as
/// long as every reachable offset is non-negative.
pub fn for_each_offset(shape: &[usize], strides: &[isize], base: usize, mut f: impl FnMut(usize)) {
    let total = numel(shape);
    if total == 0 {
        return;
    }

    let ndim = shape.len();
    let mut index = vec![0usize; ndim];
    let mut offset = base as isize;

    for _ in 0..total {
        f(offset as usize);
        for axis in (0..ndim).rev() {
            index[axis] += 1;
            offset += strides[axis];
            if index[axis] < shape[axis] {
                break;
            }
            offset -= strides[axis] * shape[axis] as isize;
            index[axis] = 0;
        }
    }
}

/// Collects the storage offsets of a strided tensor in row-major order.
#[must_use]
pub fn offsets(shape: &[usize], strides: &[isize], base: usize) -> Vec<usize> {
    let mut result = Vec::with_capacity(numel(shape));
    for_each_offset(shape, strides, base, |o| result.push(o));
    result
}

// =============================================================================
// Tests
// =============================================================================
