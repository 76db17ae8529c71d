//! Axis Iterators - Views Along and Across a Dimension
//!
//! `axis_iter` walks the sub-tensors obtained by fixing one index, the same
//! views `select` returns. `axis_slice_iter` walks the 1-D lanes that run
//! parallel to an axis, one per combination of the other indices, visited
//! in the tensor's own layout order. Every item shares storage with the
//! source tensor.
//!
//! # Example
//! ```rust
//! use tensorex_tensor::prelude::*;
//!
//! let t = arange::<f64>(0.0, 6.0).reshape(&[2, 3]).unwrap();
//! let rows: Vec<Vec<f64>> = t.axis_iter(0).unwrap().map(|r| r.to_vec()).collect();
//! assert_eq!(rows, vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]);
//!
//! let cols: Vec<Vec<f64>> = t.axis_slice_iter(0).unwrap().map(|c| c.to_vec()).collect();
//! assert_eq!(cols[2], vec![2.0, 5.0]);
//! ```
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use std::ops::Range;

use tensorex_core::dtype::Scalar;
use tensorex_core::error::Result;

use crate::iter::Stepper;
use crate::shape::{normalize_dim, Shape, Strides};
use crate::tensor::Tensor;

// =============================================================================
// AxisIter
// =============================================================================

/// Iterator over the sub-tensors `t.select(axis, i)` for every `i`.
#[derive(Debug, Clone)]
pub struct AxisIter<T: Scalar> {
    source: Tensor<T>,
    shape: Shape,
    strides: Strides,
    stride: isize,
    positions: Range<usize>,
}

impl<T: Scalar> AxisIter<T> {
    fn new(source: &Tensor<T>, axis: usize) -> Self {
        let mut shape = Shape::from_slice(source.shape());
        let mut strides = Strides::from_slice(source.strides());
        let len = shape.remove(axis);
        let stride = strides.remove(axis);
        Self {
            source: source.clone(),
            shape,
            strides,
            stride,
            positions: 0..len,
        }
    }

    fn view(&self, i: usize) -> Tensor<T> {
        let offset = (self.source.offset() as isize + i as isize * self.stride) as usize;
        self.source
            .with_geometry(self.shape.clone(), self.strides.clone(), offset)
    }
}

impl<T: Scalar> Iterator for AxisIter<T> {
    type Item = Tensor<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.positions.next().map(|i| self.view(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl<T: Scalar> DoubleEndedIterator for AxisIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.positions.next_back().map(|i| self.view(i))
    }
}

impl<T: Scalar> ExactSizeIterator for AxisIter<T> {}

// =============================================================================
// AxisSliceIter
// =============================================================================

/// Iterator over the 1-D lanes running along one axis.
#[derive(Debug, Clone)]
pub struct AxisSliceIter<T: Scalar> {
    source: Tensor<T>,
    len: usize,
    stride: isize,
    bases: Vec<usize>,
    positions: Range<usize>,
}

impl<T: Scalar> AxisSliceIter<T> {
    fn new(source: &Tensor<T>, axis: usize) -> Self {
        let shape = source.shape();
        let strides = source.strides();
        let others: Vec<usize> = (0..shape.len()).filter(|&d| d != axis).collect();
        let outer: Vec<usize> = others.iter().map(|&d| shape[d]).collect();

        let bases: Vec<usize> = Stepper::new(&outer, source.layout())
            .map(|index| {
                let delta: isize = index
                    .iter()
                    .zip(&others)
                    .map(|(&i, &d)| i as isize * strides[d])
                    .sum();
                (source.offset() as isize + delta) as usize
            })
            .collect();

        Self {
            source: source.clone(),
            len: shape[axis],
            stride: strides[axis],
            positions: 0..bases.len(),
            bases,
        }
    }

    fn view(&self, i: usize) -> Tensor<T> {
        let shape: Shape = std::iter::once(self.len).collect();
        let strides: Strides = std::iter::once(self.stride).collect();
        self.source.with_geometry(shape, strides, self.bases[i])
    }
}

impl<T: Scalar> Iterator for AxisSliceIter<T> {
    type Item = Tensor<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.positions.next().map(|i| self.view(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl<T: Scalar> DoubleEndedIterator for AxisSliceIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.positions.next_back().map(|i| self.view(i))
    }
}

impl<T: Scalar> ExactSizeIterator for AxisSliceIter<T> {}

// =============================================================================
// Tensor Entry Points
// =============================================================================

impl<T: Scalar> Tensor<T> {
    /// Iterates over the sub-tensors with `axis` fixed at each index in turn.
    ///
    /// # Arguments
    /// * `axis` - Dimension to walk (negative counts from the end)
    pub fn axis_iter(&self, axis: i64) -> Result<AxisIter<T>> {
        let axis = normalize_dim(axis, self.ndim())?;
        Ok(AxisIter::new(self, axis))
    }

    /// Iterates over the 1-D views running along `axis`, one for each
    /// combination of the remaining indices.
    pub fn axis_slice_iter(&self, axis: i64) -> Result<AxisSliceIter<T>> {
        let axis = normalize_dim(axis, self.ndim())?;
        Ok(AxisSliceIter::new(self, axis))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creation::arange;
    use tensorex_core::Layout;

    fn cube() -> Tensor<i32> {
        arange::<i32>(0, 24).reshape(&[2, 3, 4]).unwrap()
    }

    #[test]
    fn test_axis_iter_matches_select() {
        let t = cube();
        for axis in 0..3i64 {
            let views: Vec<Tensor<i32>> = t.axis_iter(axis).unwrap().collect();
            assert_eq!(views.len(), t.shape()[axis as usize]);
            for (i, v) in views.iter().enumerate() {
                assert_eq!(v.to_vec(), t.select(axis, i as isize).unwrap().to_vec());
            }
        }
    }

    #[test]
    fn test_axis_iter_reverse_and_len() {
        let t = cube();
        let mut it = t.axis_iter(-1).unwrap();
        assert_eq!(it.len(), 4);
        let last = it.next_back().unwrap();
        assert_eq!(last.shape(), &[2, 3]);
        assert_eq!(last.to_vec(), vec![3, 7, 11, 15, 19, 23]);
        assert_eq!(it.len(), 3);
        assert!(t.axis_iter(3).is_err());
    }

    #[test]
    fn test_axis_slice_iter_orders_lanes() {
        let t = cube();
        let along0: Vec<Vec<i32>> = t.axis_slice_iter(0).unwrap().map(|s| s.to_vec()).collect();
        assert_eq!(along0.len(), 12);
        assert_eq!(along0[1], vec![1, 13]);

        let mut along1 = t.axis_slice_iter(1).unwrap();
        assert_eq!(along1.len(), 8);
        let second: Vec<i32> = along1.nth(1).unwrap().to_vec();
        assert_eq!(second, vec![1, 5, 9]);

        let along2: Vec<Vec<i32>> = t.axis_slice_iter(2).unwrap().map(|s| s.to_vec()).collect();
        assert_eq!(along2.len(), 6);
        assert_eq!(along2[1], vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_axis_slice_iter_writes_through() {
        let t = cube();
        for lane in t.axis_slice_iter(2).unwrap() {
            lane.apply_(|v| v * 10);
        }
        assert_eq!(t.to_vec()[5], 50);
    }

    #[test]
    fn test_axis_slice_iter_column_major_order() {
        let t = Tensor::from_vec_with_layout(vec![0, 1, 2, 3, 4, 5], &[2, 3], Layout::ColumnMajor)
            .unwrap();
        let rows: Vec<Vec<i32>> = t.axis_slice_iter(1).unwrap().map(|s| s.to_vec()).collect();
        assert_eq!(rows, vec![vec![0, 2, 4], vec![1, 3, 5]]);
    }

    #[test]
    fn test_axis_slice_iter_on_view_and_empty() {
        let t = cube();
        let tail = t.select(0, 1).unwrap();
        let lanes: Vec<Vec<i32>> = tail.axis_slice_iter(0).unwrap().map(|s| s.to_vec()).collect();
        assert_eq!(lanes[0], vec![12, 16, 20]);

        let empty = Tensor::<f32>::from_vec(vec![], &[0, 3]).unwrap();
        assert_eq!(empty.axis_slice_iter(0).unwrap().len(), 3);
        assert_eq!(empty.axis_slice_iter(1).unwrap().len(), 0);
    }
}
