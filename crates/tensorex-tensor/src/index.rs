//! Indexing - Integer and Boolean Selection
//!
//! Selection by flat positions, multi-indices and masks. [`IndexView`]
//! reads and writes an arbitrary set of positions of a tensor and takes part
//! in expressions like any other operand.
//!
//! # Key Features
//! - `nonzero` / `argwhere` in per-dimension and per-element forms
//! - Assignable flat-index and mask views
//! - `take`, `put_`, `gather` and masked selection
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use tensorex_core::dtype::Scalar;
use tensorex_core::error::{Error, Result};
use tensorex_core::Layout;

use crate::assign::evaluate;
use crate::creation::packed;
use crate::expr::{fill_from_indices, Expression, IntoExpression};
use crate::shape::{normalize_dim, normalize_index, unravel_index, Shape};
use crate::tensor::Tensor;

// =============================================================================
// Index View
// =============================================================================

/// A 1-D view of selected positions of a tensor.
///
/// Reading yields the selected elements in selection order; writing goes to
/// the underlying tensor.
#[derive(Clone)]
pub struct IndexView<T: Scalar> {
    source: Tensor<T>,
    offsets: Vec<usize>,
}

impl<T: Scalar> IndexView<T> {
    fn new(source: &Tensor<T>, offsets: Vec<usize>) -> Self {
        Self {
            source: source.clone(),
            offsets,
        }
    }

    /// Number of selected positions.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Copies the selected elements into a new 1-D tensor.
    pub fn to_tensor(&self) -> Tensor<T> {
        let data = {
            let storage = self.source.storage.as_slice();
            self.offsets.iter().map(|&o| storage[o]).collect()
        };
        packed(data, &[self.len()])
    }

    /// Writes an expression, broadcast to `[len]`, into the selected
    /// positions.
    pub fn assign_from<X: IntoExpression<Elem = T>>(&self, expr: X) -> Result<()> {
        let target = [self.len()];
        let expr = expr.into_expr().broadcast(&target);
        expr.try_shape()?;
        let data = evaluate(&expr, &target);

        let mut storage = self.source.storage.as_slice_mut();
        for (&pos, value) in self.offsets.iter().zip(data) {
            storage[pos] = value;
        }
        Ok(())
    }

    /// Storage position read for a broadcast multi-index.
    fn position(&self, index: &[usize]) -> usize {
        let i = match index.last() {
            Some(&i) if self.len() != 1 => i,
            _ => 0,
        };
        self.offsets[i]
    }

    /// Sets every selected position to `value`.
    pub fn fill(&self, value: T) {
        let mut storage = self.source.storage.as_slice_mut();
        for &pos in &self.offsets {
            storage[pos] = value;
        }
    }
}

impl<T: Scalar> Expression for IndexView<T> {
    type Elem = T;

    fn try_shape(&self) -> Result<Shape> {
        Ok(smallvec::smallvec![self.len()])
    }

    fn at(&self, index: &[usize]) -> T {
        self.source.storage.as_slice()[self.position(index)]
    }

    fn linear_access(&self, shape: &[usize]) -> bool {
        shape == [self.len()]
    }

    fn linear(&self, i: usize) -> T {
        self.source.storage.as_slice()[self.offsets[i]]
    }

    fn fill_linear(&self, start: usize, out: &mut [T]) {
        let data = self.source.storage.as_slice();
        for (slot, &pos) in out.iter_mut().zip(&self.offsets[start..]) {
            *slot = data[pos];
        }
    }

    fn fill_at(&self, rank: usize, indices: &[usize], out: &mut [T]) {
        let data = self.source.storage.as_slice();
        fill_from_indices(rank, indices, out, |index| data[self.position(index)]);
    }
}

impl<T: Scalar> core::fmt::Debug for IndexView<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IndexView")
            .field("len", &self.len())
            .field("data", &self.to_tensor().to_vec())
            .finish()
    }
}

// =============================================================================
// Index Extraction
// =============================================================================

/// Indices of non-zero elements, one vector per dimension.
///
/// `result[d][k]` is the `d`-th coordinate of the `k`-th non-zero element
/// in row-major order.
pub fn nonzero<T: Scalar>(t: &Tensor<T>) -> Vec<Vec<usize>> {
    let mut result = vec![Vec::new(); t.ndim()];
    for idx in argwhere(t) {
        for (d, i) in idx.into_iter().enumerate() {
            result[d].push(i);
        }
    }
    result
}

/// Multi-indices of non-zero elements in row-major order.
pub fn argwhere<T: Scalar>(t: &Tensor<T>) -> Vec<Vec<usize>> {
    let zero = T::default();
    t.indexed_iter()
        .filter(|(_, v)| *v != zero)
        .map(|(idx, _)| idx)
        .collect()
}

/// Packs a list of multi-indices into an `[n, ndim]` tensor.
pub fn from_indices(indices: &[Vec<usize>]) -> Result<Tensor<u64>> {
    let width = indices.first().map_or(0, Vec::len);
    if let Some(bad) = indices.iter().find(|idx| idx.len() != width) {
        return Err(Error::invalid_operation(format!(
            "Index {bad:?} has {} components, expected {width}",
            bad.len()
        )));
    }
    let data = indices.iter().flatten().map(|&i| i as u64).collect();
    Ok(packed(data, &[indices.len(), width]))
}

// =============================================================================
// Tensor Selection
// =============================================================================

impl<T: Scalar> Tensor<T> {
    fn flat_offset(&self, flat: isize) -> Result<usize> {
        let flat = normalize_index(flat, self.numel())?;
        Ok(self.storage_offset(&unravel_index(flat, &self.shape, Layout::RowMajor)))
    }

    fn mask_offsets(&self, mask: &Tensor<bool>) -> Result<Vec<usize>> {
        let mask = mask.broadcast_to(&self.shape)?.to_vec();
        Ok(self
            .element_offsets()
            .into_iter()
            .zip(mask)
            .filter_map(|(o, keep)| keep.then_some(o))
            .collect())
    }

    /// Returns an assignable view of the elements at flat row-major
    /// positions. Negative positions count from the end.
    pub fn index_view(&self, flat: &[isize]) -> Result<IndexView<T>> {
        let offsets = flat
            .iter()
            .map(|&i| self.flat_offset(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(IndexView::new(self, offsets))
    }

    /// Returns an assignable view of the elements where `mask` is true.
    ///
    /// The mask must have exactly this tensor's shape.
    pub fn filter(&self, mask: &Tensor<bool>) -> Result<IndexView<T>> {
        if mask.shape() != self.shape() {
            return Err(Error::shape_mismatch(&self.shape, mask.shape()));
        }
        Ok(IndexView::new(self, self.mask_offsets(mask)?))
    }

    /// Copies the elements where `mask`, broadcast to this shape, is true.
    pub fn masked_select(&self, mask: &Tensor<bool>) -> Result<Self> {
        Ok(IndexView::new(self, self.mask_offsets(mask)?).to_tensor())
    }

    /// Sets the elements where `mask`, broadcast to this shape, is true.
    pub fn masked_fill_(&self, mask: &Tensor<bool>, value: T) -> Result<()> {
        IndexView::new(self, self.mask_offsets(mask)?).fill(value);
        Ok(())
    }

    /// Copies the elements at flat row-major positions into a 1-D tensor.
    pub fn take(&self, flat: &[isize]) -> Result<Self> {
        Ok(self.index_view(flat)?.to_tensor())
    }

    /// Writes `values` at flat row-major positions, cycling through
    /// `values` when it is shorter than `flat`.
    pub fn put_(&self, flat: &[isize], values: &[T]) -> Result<()> {
        if values.is_empty() && !flat.is_empty() {
            return Err(Error::invalid_operation("put_() needs at least one value"));
        }
        let offsets = flat
            .iter()
            .map(|&i| self.flat_offset(i))
            .collect::<Result<Vec<_>>>()?;

        let mut storage = self.storage.as_slice_mut();
        for (pos, &value) in offsets.into_iter().zip(values.iter().cycle()) {
            storage[pos] = value;
        }
        Ok(())
    }

    /// Gathers values along `dim`: the result has `index`'s shape and
    /// `out[i][j] = self[index[i][j]][j]` for `dim = 0`.
    pub fn gather(&self, dim: i64, index: &Tensor<u64>) -> Result<Self> {
        let dim = normalize_dim(dim, self.ndim())?;
        if index.ndim() != self.ndim() {
            return Err(Error::invalid_operation(format!(
                "gather() index must have {} dimensions, got {}",
                self.ndim(),
                index.ndim()
            )));
        }
        if let Some(d) = (0..self.ndim()).find(|&d| d != dim && index.shape()[d] > self.shape[d]) {
            return Err(Error::IndexOutOfBounds {
                index: index.shape()[d] as i64,
                size: self.shape[d],
            });
        }

        let data = {
            let storage = self.storage.as_slice();
            index
                .indexed_iter()
                .map(|(mut idx, i)| {
                    let i = i as usize;
                    if i >= self.shape[dim] {
                        return Err(Error::IndexOutOfBounds {
                            index: i as i64,
                            size: self.shape[dim],
                        });
                    }
                    idx[dim] = i;
                    Ok(storage[self.storage_offset(&idx)])
                })
                .collect::<Result<Vec<_>>>()?
        };
        Ok(packed(data, index.shape()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Tensor<i32> {
        Tensor::from_vec(vec![0, 1, 0, 2, 0, 3], &[2, 3]).unwrap()
    }

    #[test]
    fn test_nonzero_and_argwhere() {
        let t = grid();
        assert_eq!(nonzero(&t), vec![vec![0, 1, 1], vec![1, 0, 2]]);
        assert_eq!(argwhere(&t), vec![vec![0, 1], vec![1, 0], vec![1, 2]]);

        let packed = from_indices(&argwhere(&t)).unwrap();
        assert_eq!(packed.shape(), &[3, 2]);
        assert_eq!(packed.to_vec(), vec![0, 1, 1, 0, 1, 2]);
        assert!(from_indices(&[vec![1], vec![1, 2]]).is_err());
    }

    #[test]
    fn test_index_view_reads_and_writes() {
        let t = grid();
        let v = t.index_view(&[5, -1, 1]).unwrap();
        assert_eq!(v.to_tensor().to_vec(), vec![3, 3, 1]);
        assert_eq!(v.eval().unwrap().to_vec(), vec![3, 3, 1]);

        let picked = t.index_view(&[0, 2]).unwrap();
        picked.assign_from(7).unwrap();
        assert_eq!(t.to_vec(), vec![7, 1, 7, 2, 0, 3]);
        assert!(t.index_view(&[6]).is_err());
    }

    #[test]
    fn test_index_view_in_expressions() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[4]).unwrap();
        let v = t.index_view(&[3, 0]).unwrap();
        let doubled = (v * 2.0).eval().unwrap();
        assert_eq!(doubled.to_vec(), vec![8.0, 2.0]);
    }

    #[test]
    fn test_filter_and_masks() {
        let t = Tensor::from_vec(vec![-1.0, 2.0, -3.0, 4.0], &[2, 2]).unwrap();
        let mask = crate::ops::less(&t, 0.0).eval().unwrap();

        let negatives = t.filter(&mask).unwrap();
        assert_eq!(negatives.len(), 2);
        negatives.assign_from(0.0).unwrap();
        assert_eq!(t.to_vec(), vec![0.0, 2.0, 0.0, 4.0]);

        let column = Tensor::from_vec(vec![false, true], &[2]).unwrap();
        assert_eq!(t.masked_select(&column).unwrap().to_vec(), vec![2.0, 4.0]);
        t.masked_fill_(&column, 9.0).unwrap();
        assert_eq!(t.to_vec(), vec![0.0, 9.0, 0.0, 9.0]);

        assert!(t.filter(&column).is_err());
    }

    #[test]
    fn test_take_and_put() {
        let t = Tensor::from_vec(vec![10, 20, 30, 40], &[2, 2]).unwrap();
        assert_eq!(t.transpose().take(&[0, 1]).unwrap().to_vec(), vec![10, 30]);

        t.put_(&[0, 1, 2], &[1, 2]).unwrap();
        assert_eq!(t.to_vec(), vec![1, 2, 1, 40]);
        assert!(t.put_(&[0], &[]).is_err());
    }

    #[test]
    fn test_gather() {
        let t = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let idx = Tensor::from_vec(vec![0u64, 0, 1, 0], &[2, 2]).unwrap();
        assert_eq!(t.gather(1, &idx).unwrap().to_vec(), vec![1, 1, 4, 3]);
        assert_eq!(t.gather(0, &idx).unwrap().to_vec(), vec![1, 2, 3, 2]);

        let bad = Tensor::from_vec(vec![2u64], &[1, 1]).unwrap();
        assert!(t.gather(0, &bad).is_err());
    }
}
