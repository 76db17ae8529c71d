//! Views and Slicing - Strided Windows Into Tensors
//!
//! Provides slicing, selection and joining. Views share storage with the
//! tensor they come from: writing through a view writes the parent.
//!
//! # Key Features
//! - Python slice semantics (negative indices, negative steps, clamping)
//! - New axes and a single ellipsis per slice list
//! - Index-list selections (`Keep`, `Drop`), which copy
//! - Assignment through any slice, including index-list slices
//! - Concatenation and stacking
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use core::ops::{Range, RangeFrom, RangeFull, RangeTo};

use tensorex_core::dtype::Scalar;
use tensorex_core::error::{Error, Result};
use tensorex_core::Layout;

use crate::assign::{assign_view, evaluate};
use crate::expr::{Expression, IntoExpression};
use crate::iter::Stepper;
use crate::shape::{normalize_dim, normalize_index, Shape, Strides};
use crate::tensor::Tensor;

// =============================================================================
// Slice Specification
// =============================================================================

/// Specifies how to slice along a single dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceSpec {
    /// Select a single index, removing the dimension. Negative counts from
    /// the end.
    Index(isize),
    /// Select `start..stop` by `step`, with Python slice semantics.
    Range {
        /// Start index, `None` = beginning (end for negative steps).
        start: Option<isize>,
        /// Stop index (exclusive), `None` = end (beginning for negative steps).
        stop: Option<isize>,
        /// Step size; must not be zero.
        step: isize,
    },
    /// Keep the whole dimension.
    All,
    /// Insert a dimension of extent 1.
    NewAxis,
    /// Expand to `All` over every dimension not named by other specs.
    Ellipsis,
    /// Keep only the listed indices, in order. Produces a copy.
    Keep(Vec<isize>),
    /// Remove the listed indices. Produces a copy.
    Drop(Vec<isize>),
}

impl SliceSpec {
    /// Creates a range slice from start to stop.
    #[must_use]
    pub fn range(start: isize, stop: isize) -> Self {
        Self::range_step(start, stop, 1)
    }

    /// Creates a range slice with step.
    #[must_use]
    pub fn range_step(start: isize, stop: isize, step: isize) -> Self {
        Self::Range {
            start: Some(start),
            stop: Some(stop),
            step,
        }
    }

    /// Creates a slice from start to end.
    #[must_use]
    pub fn from(start: isize) -> Self {
        Self::Range {
            start: Some(start),
            stop: None,
            step: 1,
        }
    }

    /// Creates a slice from beginning to stop.
    #[must_use]
    pub fn to(stop: isize) -> Self {
        Self::Range {
            start: None,
            stop: Some(stop),
            step: 1,
        }
    }

    /// Creates a full slice with a step; `-1` reverses the dimension.
    #[must_use]
    pub fn step(step: isize) -> Self {
        Self::Range {
            start: None,
            stop: None,
            step,
        }
    }

    fn consumes_dim(&self) -> bool {
        !matches!(self, Self::NewAxis | Self::Ellipsis)
    }
}

impl From<isize> for SliceSpec {
    fn from(index: isize) -> Self {
        Self::Index(index)
    }
}

impl From<Range<isize>> for SliceSpec {
    fn from(r: Range<isize>) -> Self {
        Self::range(r.start, r.end)
    }
}

impl From<RangeFrom<isize>> for SliceSpec {
    fn from(r: RangeFrom<isize>) -> Self {
        Self::from(r.start)
    }
}

impl From<RangeTo<isize>> for SliceSpec {
    fn from(r: RangeTo<isize>) -> Self {
        Self::to(r.end)
    }
}

impl From<RangeFull> for SliceSpec {
    fn from(_: RangeFull) -> Self {
        Self::All
    }
}

// =============================================================================
// Constructor Shorthands
// =============================================================================

/// Selects one index. See [`SliceSpec::Index`].
#[must_use]
pub fn index(i: isize) -> SliceSpec {
    SliceSpec::Index(i)
}

/// Selects `start..stop`.
#[must_use]
pub fn range(start: isize, stop: isize) -> SliceSpec {
    SliceSpec::range(start, stop)
}

/// Selects `start..stop` by `step`.
#[must_use]
pub fn range_step(start: isize, stop: isize, step: isize) -> SliceSpec {
    SliceSpec::range_step(start, stop, step)
}

/// Keeps a whole dimension.
#[must_use]
pub fn all() -> SliceSpec {
    SliceSpec::All
}

/// Inserts a new axis.
#[must_use]
pub fn newaxis() -> SliceSpec {
    SliceSpec::NewAxis
}

/// Expands over the remaining dimensions.
#[must_use]
pub fn ellipsis() -> SliceSpec {
    SliceSpec::Ellipsis
}

/// Keeps only the listed indices.
#[must_use]
pub fn keep(indices: &[isize]) -> SliceSpec {
    SliceSpec::Keep(indices.to_vec())
}

/// Drops the listed indices.
#[must_use]
pub fn drop_(indices: &[isize]) -> SliceSpec {
    SliceSpec::Drop(indices.to_vec())
}

// =============================================================================
// Slice Resolution
// =============================================================================

/// Resolves a Python-style range over an extent into `(start, len, step)`.
fn resolve_range(
    start: Option<isize>,
    stop: Option<isize>,
    step: isize,
    size: usize,
) -> Result<(isize, usize, isize)> {
    if step == 0 {
        return Err(Error::invalid_operation("Slice step cannot be zero"));
    }
    let n = size as isize;
    let wrap = |i: isize| if i < 0 { i + n } else { i };

    let (first, len) = if step > 0 {
        let first = start.map_or(0, |s| wrap(s).clamp(0, n));
        let end = stop.map_or(n, |s| wrap(s).clamp(0, n));
        let len = if end > first {
            (end - first + step - 1) / step
        } else {
            0
        };
        (first, len)
    } else {
        let first = start.map_or(n - 1, |s| wrap(s).clamp(-1, n - 1));
        let end = stop.map_or(-1, |s| wrap(s).clamp(-1, n - 1));
        let len = if first > end {
            (first - end + (-step) - 1) / (-step)
        } else {
            0
        };
        (first, len)
    };

    Ok((first, len as usize, step))
}

/// A strided view plus per-axis index lists still to be applied.
struct Selection<T: Scalar> {
    base: Tensor<T>,
    lists: Vec<(usize, Vec<usize>)>,
}

impl<T: Scalar> Selection<T> {
    fn shape(&self) -> Shape {
        let mut shape = Shape::from_slice(self.base.shape());
        for (axis, list) in &self.lists {
            shape[*axis] = list.len();
        }
        shape
    }

    /// Storage offsets of every selected element in row-major order.
    fn offsets(&self) -> Vec<usize> {
        let shape = self.shape();
        let mut base_index = vec![0; shape.len()];
        Stepper::new(&shape, Layout::RowMajor)
            .map(|idx| {
                base_index.copy_from_slice(&idx);
                for (axis, list) in &self.lists {
                    base_index[*axis] = list[idx[*axis]];
                }
                self.base.storage_offset(&base_index)
            })
            .collect()
    }
}

impl<T: Scalar> Tensor<T> {
    fn select_specs(&self, specs: &[SliceSpec]) -> Result<Selection<T>> {
        let ellipses = specs
            .iter()
            .filter(|s| matches!(s, SliceSpec::Ellipsis))
            .count();
        if ellipses > 1 {
            return Err(Error::invalid_operation(
                "A slice list may contain at most one ellipsis",
            ));
        }

        let consumed = specs.iter().filter(|s| s.consumes_dim()).count();
        if consumed > self.ndim() {
            return Err(Error::invalid_operation(format!(
                "Too many indices: {} for a tensor with {} dimensions",
                consumed,
                self.ndim()
            )));
        }

        let mut shape = Shape::new();
        let mut strides = Strides::new();
        let mut offset = self.offset as isize;
        let mut lists = Vec::new();
        let mut dim = 0;

        let push_all = |dim: usize, shape: &mut Shape, strides: &mut Strides| {
            shape.push(self.shape[dim]);
            strides.push(self.strides[dim]);
        };

        for spec in specs {
            match spec {
                SliceSpec::Index(i) => {
                    let i = normalize_index(*i, self.shape[dim])?;
                    offset += i as isize * self.strides[dim];
                    dim += 1;
                }
                SliceSpec::Range { start, stop, step } => {
                    let (first, len, step) =
                        resolve_range(*start, *stop, *step, self.shape[dim])?;
                    if len > 0 {
                        offset += first * self.strides[dim];
                    }
                    shape.push(len);
                    strides.push(self.strides[dim] * step);
                    dim += 1;
                }
                SliceSpec::All => {
                    push_all(dim, &mut shape, &mut strides);
                    dim += 1;
                }
                SliceSpec::NewAxis => {
                    shape.push(1);
                    strides.push(0);
                }
                SliceSpec::Ellipsis => {
                    for _ in 0..self.ndim() - consumed {
                        push_all(dim, &mut shape, &mut strides);
                        dim += 1;
                    }
                }
                SliceSpec::Keep(indices) => {
                    let size = self.shape[dim];
                    let list = indices
                        .iter()
                        .map(|&i| normalize_index(i, size))
                        .collect::<Result<Vec<_>>>()?;
                    lists.push((shape.len(), list));
                    push_all(dim, &mut shape, &mut strides);
                    dim += 1;
                }
                SliceSpec::Drop(indices) => {
                    let size = self.shape[dim];
                    let dropped = indices
                        .iter()
                        .map(|&i| normalize_index(i, size))
                        .collect::<Result<Vec<_>>>()?;
                    let list = (0..size).filter(|i| !dropped.contains(i)).collect();
                    lists.push((shape.len(), list));
                    push_all(dim, &mut shape, &mut strides);
                    dim += 1;
                }
            }
        }

        while dim < self.ndim() {
            push_all(dim, &mut shape, &mut strides);
            dim += 1;
        }

        Ok(Selection {
            base: self.with_geometry(shape, strides, offset as usize),
            lists,
        })
    }

    // =========================================================================
    // Slicing
    // =========================================================================

    /// Returns the tensor selected by a list of slice specs.
    ///
    /// Missing trailing specs mean `All`. The result shares storage unless
    /// a `Keep` or `Drop` spec is present, in which case it is a copy.
    pub fn view(&self, specs: &[SliceSpec]) -> Result<Self> {
        let selection = self.select_specs(specs)?;
        if selection.lists.is_empty() {
            return Ok(selection.base);
        }

        let shape = selection.shape();
        let data = {
            let storage = self.storage.as_slice();
            selection
                .offsets()
                .into_iter()
                .map(|o| storage[o])
                .collect()
        };
        Self::from_vec(data, &shape)
    }

    /// Writes an expression into the elements selected by `specs`.
    ///
    /// The expression is broadcast to the selection's shape. Works for
    /// index-list specs too, which write back into this tensor.
    pub fn assign_slice<X: IntoExpression<Elem = T>>(
        &self,
        specs: &[SliceSpec],
        expr: X,
    ) -> Result<()> {
        let selection = self.select_specs(specs)?;
        let shape = selection.shape();
        let expr = expr.into_expr().broadcast(&shape);
        expr.try_shape()?;

        let data = evaluate(&expr, &shape);
        let positions = selection.offsets();
        let mut storage = self.storage.as_slice_mut();
        for (pos, value) in positions.into_iter().zip(data) {
            storage[pos] = value;
        }
        Ok(())
    }

    /// Returns a slice of the tensor along the first dimension.
    ///
    /// # Arguments
    /// * `start` - Start index (inclusive)
    /// * `end` - End index (exclusive)
    pub fn slice_dim0(&self, start: usize, end: usize) -> Result<Self> {
        self.narrow(0, start, end.saturating_sub(start))
    }

    /// Returns a view selecting a single index along a dimension, removing
    /// that dimension.
    ///
    /// # Arguments
    /// * `dim` - Dimension to select from (negative counts from the end)
    /// * `index` - Index to select (negative counts from the end)
    pub fn select(&self, dim: i64, index: isize) -> Result<Self> {
        let dim = normalize_dim(dim, self.ndim())?;
        let index = normalize_index(index, self.shape[dim])?;

        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        shape.remove(dim);
        let stride = strides.remove(dim);
        let offset = (self.offset as isize + index as isize * stride) as usize;

        Ok(self.with_geometry(shape, strides, offset))
    }

    /// Returns a view of `length` entries along `dim` starting at `start`.
    pub fn narrow(&self, dim: i64, start: usize, length: usize) -> Result<Self> {
        let dim = normalize_dim(dim, self.ndim())?;
        let size = self.shape[dim];
        if start + length > size {
            return Err(Error::IndexOutOfBounds {
                index: (start + length) as i64,
                size,
            });
        }

        let mut shape = self.shape.clone();
        shape[dim] = length;
        let offset = if length == 0 {
            self.offset
        } else {
            (self.offset as isize + start as isize * self.strides[dim]) as usize
        };

        Ok(self.with_geometry(shape, self.strides.clone(), offset))
    }

    /// Splits into `chunks` views of near-equal size along `dim`.
    pub fn chunk(&self, chunks: usize, dim: i64) -> Result<Vec<Self>> {
        if chunks == 0 {
            return Err(Error::invalid_operation("Number of chunks must be positive"));
        }
        let axis = normalize_dim(dim, self.ndim())?;
        let size = self.shape[axis];
        let chunk_size = size.div_ceil(chunks).max(1);

        let mut result = Vec::new();
        let mut start = 0;
        while start < size {
            let length = chunk_size.min(size - start);
            result.push(self.narrow(dim, start, length)?);
            start += length;
        }
        Ok(result)
    }

    /// Splits into views of the given sizes along `dim`.
    pub fn split(&self, sizes: &[usize], dim: i64) -> Result<Vec<Self>> {
        let axis = normalize_dim(dim, self.ndim())?;
        let total: usize = sizes.iter().sum();
        if total != self.shape[axis] {
            return Err(Error::invalid_operation(format!(
                "Split sizes {:?} don't sum to dimension size {}",
                sizes, self.shape[axis]
            )));
        }

        let mut result = Vec::with_capacity(sizes.len());
        let mut start = 0;
        for &size in sizes {
            result.push(self.narrow(dim, start, size)?);
            start += size;
        }
        Ok(result)
    }

    /// Returns row `i` of a 2-D tensor as a view.
    pub fn row(&self, i: isize) -> Result<Self> {
        self.require_2d("row")?;
        self.select(0, i)
    }

    /// Returns column `j` of a 2-D tensor as a view.
    pub fn col(&self, j: isize) -> Result<Self> {
        self.require_2d("col")?;
        self.select(1, j)
    }

    /// Returns the `offset`-th diagonal of a 2-D tensor as a view.
    ///
    /// Positive offsets select diagonals above the main one.
    pub fn diagonal(&self, offset: isize) -> Result<Self> {
        self.require_2d("diagonal")?;
        let (rows, cols) = (self.shape[0] as isize, self.shape[1] as isize);
        let (row0, col0) = if offset >= 0 { (0, offset) } else { (-offset, 0) };
        let len = (rows - row0).min(cols - col0).max(0) as usize;

        let start = if len == 0 {
            self.offset
        } else {
            (self.offset as isize + row0 * self.strides[0] + col0 * self.strides[1]) as usize
        };
        Ok(self.with_geometry(
            smallvec::smallvec![len],
            smallvec::smallvec![self.strides[0] + self.strides[1]],
            start,
        ))
    }

    fn require_2d(&self, op: &str) -> Result<()> {
        if self.ndim() == 2 {
            Ok(())
        } else {
            Err(Error::invalid_operation(format!(
                "{op}() requires a 2-D tensor, got {} dimensions",
                self.ndim()
            )))
        }
    }

    /// Creates a view with arbitrary geometry over this tensor's storage.
    ///
    /// Every reachable position must lie inside the storage.
    pub fn strided_view(&self, shape: &[usize], strides: &[isize], offset: usize) -> Result<Self> {
        if shape.len() != strides.len() {
            return Err(Error::invalid_operation(format!(
                "Shape {shape:?} and strides {strides:?} differ in length"
            )));
        }

        if shape.iter().all(|&d| d > 0) {
            let (mut lo, mut hi) = (offset as isize, offset as isize);
            for (&d, &s) in shape.iter().zip(strides) {
                let span = (d as isize - 1) * s;
                if span < 0 {
                    lo += span;
                } else {
                    hi += span;
                }
            }
            if lo < 0 || hi >= self.storage.len() as isize {
                return Err(Error::IndexOutOfBounds {
                    index: if lo < 0 { lo as i64 } else { hi as i64 },
                    size: self.storage.len(),
                });
            }
        }

        Ok(self.with_geometry(
            Shape::from_slice(shape),
            Strides::from_slice(strides),
            offset,
        ))
    }

    /// Copies the entries at `indices` along `dim`.
    pub fn index_select(&self, dim: i64, indices: &[isize]) -> Result<Self> {
        let axis = normalize_dim(dim, self.ndim())?;
        let mut specs = vec![SliceSpec::All; axis];
        specs.push(SliceSpec::Keep(indices.to_vec()));
        self.view(&specs)
    }
}

// =============================================================================
// Joining
// =============================================================================

/// Concatenates tensors along an existing dimension.
pub fn cat<T: Scalar>(tensors: &[Tensor<T>], dim: i64) -> Result<Tensor<T>> {
    let first = tensors
        .first()
        .ok_or_else(|| Error::invalid_operation("Cannot concatenate empty list"))?;
    if first.ndim() == 0 {
        return Err(Error::invalid_operation(
            "Zero-dimensional tensors cannot be concatenated",
        ));
    }
    let axis = normalize_dim(dim, first.ndim())?;

    let mut shape = Shape::from_slice(first.shape());
    shape[axis] = 0;
    for t in tensors {
        let compatible = t.ndim() == first.ndim()
            && t.shape()
                .iter()
                .zip(first.shape())
                .enumerate()
                .all(|(i, (a, b))| i == axis || a == b);
        if !compatible {
            return Err(Error::shape_mismatch(first.shape(), t.shape()));
        }
        shape[axis] += t.shape()[axis];
    }

    let result = Tensor::full_with_layout(&shape, T::default(), Layout::RowMajor);
    let mut start = 0;
    for t in tensors {
        let length = t.shape()[axis];
        assign_view(&result.narrow(axis as i64, start, length)?, t)?;
        start += length;
    }

    tracing::debug!(count = tensors.len(), axis, shape = ?shape.as_slice(), "concatenated");
    Ok(result)
}

/// Stacks tensors of identical shape along a new dimension.
pub fn stack<T: Scalar>(tensors: &[Tensor<T>], dim: i64) -> Result<Tensor<T>> {
    let first = tensors
        .first()
        .ok_or_else(|| Error::invalid_operation("Cannot stack empty list"))?;
    if let Some(t) = tensors.iter().find(|t| t.shape() != first.shape()) {
        return Err(Error::shape_mismatch(first.shape(), t.shape()));
    }

    let expanded = tensors
        .iter()
        .map(|t| t.unsqueeze(dim))
        .collect::<Result<Vec<_>>>()?;
    cat(&expanded, dim)
}

/// Stacks horizontally: along axis 0 for 1-D inputs, axis 1 otherwise.
pub fn hstack<T: Scalar>(tensors: &[Tensor<T>]) -> Result<Tensor<T>> {
    let one_d = tensors.first().is_some_and(|t| t.ndim() == 1);
    cat(tensors, if one_d { 0 } else { 1 })
}

/// Stacks vertically: 1-D inputs become rows.
pub fn vstack<T: Scalar>(tensors: &[Tensor<T>]) -> Result<Tensor<T>> {
    let rows = tensors
        .iter()
        .map(|t| {
            if t.ndim() == 1 {
                t.unsqueeze(0)
            } else {
                Ok(t.clone())
            }
        })
        .collect::<Result<Vec<_>>>()?;
    cat(&rows, 0)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Tensor<i32> {
        Tensor::from_vec((0..12).collect(), &[3, 4]).unwrap()
    }

    #[test]
    fn test_resolve_range_python_semantics() {
        assert_eq!(resolve_range(Some(1), Some(3), 1, 5).unwrap(), (1, 2, 1));
        assert_eq!(resolve_range(Some(-2), None, 1, 5).unwrap(), (3, 2, 1));
        assert_eq!(resolve_range(None, None, -1, 5).unwrap(), (4, 5, -1));
        assert_eq!(resolve_range(Some(3), Some(0), -2, 5).unwrap(), (3, 2, -2));
        assert_eq!(resolve_range(Some(7), Some(9), 1, 5).unwrap().1, 0);
        assert_eq!(resolve_range(Some(0), Some(100), 3, 5).unwrap(), (0, 2, 3));
        assert!(resolve_range(None, None, 0, 5).is_err());
    }

    #[test]
    fn test_view_index_and_range() {
        let t = grid();
        let v = t.view(&[index(1), range(1, 3)]).unwrap();
        assert_eq!(v.shape(), &[2]);
        assert_eq!(v.to_vec(), vec![5, 6]);
        assert!(v.shares_storage(&t));

        let last = t.view(&[index(-1)]).unwrap();
        assert_eq!(last.to_vec(), vec![8, 9, 10, 11]);
    }

    #[test]
    fn test_view_negative_step() {
        let t = grid();
        let v = t.view(&[SliceSpec::step(-1), range_step(3, 0, -2)]).unwrap();
        assert_eq!(v.shape(), &[3, 2]);
        assert_eq!(v.to_vec(), vec![11, 9, 7, 5, 3, 1]);
    }

    #[test]
    fn test_view_newaxis_and_ellipsis() {
        let t = Tensor::<i32>::from_vec((0..24).collect(), &[2, 3, 4]).unwrap();
        let v = t.view(&[ellipsis(), index(0)]).unwrap();
        assert_eq!(v.shape(), &[2, 3]);
        assert_eq!(v.to_vec(), vec![0, 4, 8, 12, 16, 20]);

        let v = t.view(&[newaxis(), index(1), ellipsis(), newaxis()]).unwrap();
        assert_eq!(v.shape(), &[1, 3, 4, 1]);
        assert_eq!(v.get(&[0, 2, 3, 0]).unwrap(), 23);

        assert!(t.view(&[ellipsis(), all(), ellipsis()]).is_err());
        assert!(t.view(&[all(), all(), all(), all()]).is_err());
    }

    #[test]
    fn test_view_keep_drop_copy() {
        let t = grid();
        let kept = t.view(&[keep(&[2, 0]), drop_(&[1, -1])]).unwrap();
        assert_eq!(kept.shape(), &[2, 2]);
        assert_eq!(kept.to_vec(), vec![8, 10, 0, 2]);
        assert!(!kept.shares_storage(&t));
        assert!(t.view(&[keep(&[3])]).is_err());
    }

    #[test]
    fn test_view_writes_through() {
        let t = grid();
        let col = t.view(&[all(), index(0)]).unwrap();
        col.fill_(-1);
        assert_eq!(t.get(&[2, 0]).unwrap(), -1);
        assert_eq!(t.get(&[2, 1]).unwrap(), 9);
    }

    #[test]
    fn test_assign_slice_broadcasts() {
        let t = grid();
        t.assign_slice(&[range(0, 2), SliceSpec::from(2)], 0).unwrap();
        assert_eq!(t.to_vec()[..8], [0, 1, 0, 0, 4, 5, 0, 0]);

        t.assign_slice(&[keep(&[0, 2]), index(0)], 100).unwrap();
        assert_eq!(t.get(&[0, 0]).unwrap(), 100);
        assert_eq!(t.get(&[1, 0]).unwrap(), 4);
        assert_eq!(t.get(&[2, 0]).unwrap(), 100);

        let wrong = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
        assert!(t.assign_slice(&[all(), range(0, 2)], &wrong).is_err());
    }

    #[test]
    fn test_select_narrow_chunk_split() {
        let t = grid();
        assert_eq!(t.select(1, -1).unwrap().to_vec(), vec![3, 7, 11]);
        assert_eq!(t.narrow(1, 1, 2).unwrap().to_vec(), vec![1, 2, 5, 6, 9, 10]);
        assert!(t.narrow(0, 2, 2).is_err());

        let chunks = t.chunk(2, 0).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].shape(), &[2, 4]);
        assert_eq!(chunks[1].shape(), &[1, 4]);

        let parts = t.split(&[1, 3], -1).unwrap();
        assert_eq!(parts[1].to_vec(), vec![1, 2, 3, 5, 6, 7, 9, 10, 11]);
        assert!(t.split(&[1, 1], 0).is_err());
    }

    #[test]
    fn test_row_col_diagonal() {
        let t = grid();
        assert_eq!(t.row(1).unwrap().to_vec(), vec![4, 5, 6, 7]);
        assert_eq!(t.col(2).unwrap().to_vec(), vec![2, 6, 10]);
        assert_eq!(t.diagonal(0).unwrap().to_vec(), vec![0, 5, 10]);
        assert_eq!(t.diagonal(1).unwrap().to_vec(), vec![1, 6, 11]);
        assert_eq!(t.diagonal(-1).unwrap().to_vec(), vec![4, 9]);
        assert_eq!(t.diagonal(9).unwrap().numel(), 0);

        // The transposed diagonal is the same memory.
        assert_eq!(t.transpose().diagonal(0).unwrap().to_vec(), vec![0, 5, 10]);
    }

    #[test]
    fn test_strided_view_bounds() {
        let t = grid();
        let every_other = t.strided_view(&[6], &[2], 0).unwrap();
        assert_eq!(every_other.to_vec(), vec![0, 2, 4, 6, 8, 10]);
        assert!(t.strided_view(&[7], &[2], 0).is_err());
        assert!(t.strided_view(&[3], &[-1], 1).is_err());
        assert_eq!(t.strided_view(&[3], &[-1], 2).unwrap().to_vec(), vec![2, 1, 0]);
    }

    #[test]
    fn test_index_select() {
        let t = grid();
        let picked = t.index_select(1, &[3, 3, 0]).unwrap();
        assert_eq!(picked.shape(), &[3, 3]);
        assert_eq!(picked.to_vec(), vec![3, 3, 0, 7, 7, 4, 11, 11, 8]);
    }

    #[test]
    fn test_cat_and_stack() {
        let a = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let b = Tensor::from_vec(vec![5, 6], &[1, 2]).unwrap();

        let rows = cat(&[a.clone(), b.clone()], 0).unwrap();
        assert_eq!(rows.shape(), &[3, 2]);
        assert_eq!(rows.to_vec(), vec![1, 2, 3, 4, 5, 6]);

        let cols = cat(&[a.clone(), a.transpose()], 1).unwrap();
        assert_eq!(cols.to_vec(), vec![1, 2, 1, 3, 3, 4, 2, 4]);

        assert!(cat(&[a.clone(), b.transpose()], 0).is_err());

        let s = stack(&[a.clone(), a.clone()], -1).unwrap();
        assert_eq!(s.shape(), &[2, 2, 2]);
        assert_eq!(s.to_vec(), vec![1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn test_hstack_vstack() {
        let x = Tensor::from_vec(vec![1, 2], &[2]).unwrap();
        let y = Tensor::from_vec(vec![3, 4], &[2]).unwrap();
        assert_eq!(hstack(&[x.clone(), y.clone()]).unwrap().to_vec(), vec![1, 2, 3, 4]);

        let v = vstack(&[x, y]).unwrap();
        assert_eq!(v.shape(), &[2, 2]);
        assert_eq!(v.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_from_ranges() {
        let t = grid();
        let specs: [SliceSpec; 2] = [(1isize..3).into(), (..2isize).into()];
        assert_eq!(t.view(&specs).unwrap().to_vec(), vec![4, 5, 8, 9]);

        let specs: [SliceSpec; 2] = [(..).into(), (-1isize).into()];
        assert_eq!(t.view(&specs).unwrap().to_vec(), vec![3, 7, 11]);
    }
}
