//! Tensor - Strided N-Dimensional Container
//!
//! The `Tensor` struct is the container at the centre of tensorex. It pairs
//! reference-counted storage with a shape, signed strides, a base offset and
//! a memory layout. Views are tensors too: they share storage with the
//! tensor they were taken from and write through to it.
//!
//! # Key Features
//! - Generic over element type (bool, integers, f32, f64)
//! - Row-major and column-major layouts
//! - Zero-copy reshape, transpose, permute and broadcast where strides allow
//! - Negative strides for reversed views
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use core::fmt;

use tensorex_core::dtype::{Numeric, Scalar};
use tensorex_core::error::{Error, Result};
use tensorex_core::{EngineConfig, Layout, Storage};

use crate::iter::{for_each_offset, offsets, Stepper};
use crate::shape::{
    broadcast_shape, broadcast_strides, contiguous_strides, is_contiguous, linear_index,
    normalize_dim, numel, reshape, squeeze, transpose_shape, unsqueeze, validate_indices, Shape,
    Strides,
};

// =============================================================================
// Tensor Struct
// =============================================================================

/// An N-dimensional strided array.
///
/// Cloning a `Tensor` copies the handle: both clones see the same elements.
/// Use [`Tensor::clone_deep`] for an independent copy.
#[derive(Clone)]
pub struct Tensor<T: Scalar> {
    /// Underlying data storage (reference-counted).
    pub(crate) storage: Storage<T>,
    /// Extent of each dimension.
    pub(crate) shape: Shape,
    /// Signed element step of each dimension.
    pub(crate) strides: Strides,
    /// Storage position of the all-zero index.
    pub(crate) offset: usize,
    /// Layout this tensor was created with.
    pub(crate) layout: Layout,
}

impl<T: Scalar> Tensor<T> {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a row-major tensor over existing storage.
    pub fn from_storage(storage: Storage<T>, shape: &[usize]) -> Result<Self> {
        Self::from_storage_with_layout(storage, shape, Layout::RowMajor)
    }

    /// Creates a tensor over existing storage, whose elements are in
    /// `layout` order.
    pub fn from_storage_with_layout(
        storage: Storage<T>,
        shape: &[usize],
        layout: Layout,
    ) -> Result<Self> {
        let total = numel(shape);
        if total != storage.len() {
            return Err(Error::shape_mismatch(&[storage.len()], shape));
        }

        Ok(Self {
            storage,
            shape: Shape::from_slice(shape),
            strides: contiguous_strides(shape, layout),
            offset: 0,
            layout,
        })
    }

    /// Creates a row-major tensor from a vector.
    ///
    /// # Arguments
    /// * `data` - Elements in row-major order
    /// * `shape` - Shape of the tensor
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        Self::from_storage(Storage::from_vec(data), shape)
    }

    /// Creates a tensor from a vector whose elements are in `layout` order.
    pub fn from_vec_with_layout(data: Vec<T>, shape: &[usize], layout: Layout) -> Result<Self> {
        Self::from_storage_with_layout(Storage::from_vec(data), shape, layout)
    }

    /// Creates a row-major tensor by copying a slice.
    pub fn from_slice(data: &[T], shape: &[usize]) -> Result<Self> {
        Self::from_storage(Storage::from_slice(data), shape)
    }

    /// Creates a 0-dimensional tensor holding one value.
    pub fn scalar(value: T) -> Self {
        Self {
            storage: Storage::from_vec(vec![value]),
            shape: Shape::new(),
            strides: Strides::new(),
            offset: 0,
            layout: Layout::RowMajor,
        }
    }

    /// Creates a tensor filled with `value`, in the given layout.
    pub fn full_with_layout(shape: &[usize], value: T, layout: Layout) -> Self {
        Self {
            storage: Storage::full(numel(shape), value),
            shape: Shape::from_slice(shape),
            strides: contiguous_strides(shape, layout),
            offset: 0,
            layout,
        }
    }

    /// Creates a tensor filled with `value` in the configured default layout.
    pub fn full(shape: &[usize], value: T) -> Self {
        Self::full_with_layout(shape, value, EngineConfig::current().default_layout)
    }

    /// Assembles a tensor from raw parts. The caller guarantees that every
    /// reachable offset lies inside the storage.
    pub(crate) fn from_parts(
        storage: Storage<T>,
        shape: Shape,
        strides: Strides,
        offset: usize,
        layout: Layout,
    ) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            storage,
            shape,
            strides,
            offset,
            layout,
        }
    }

    /// Returns a tensor sharing this storage with a new shape, strides and
    /// offset.
    pub(crate) fn with_geometry(&self, shape: Shape, strides: Strides, offset: usize) -> Self {
        Self::from_parts(self.storage.clone(), shape, strides, offset, self.layout)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the strides of the tensor.
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Returns the storage offset of the all-zero index.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the layout the tensor was created with.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements.
    pub fn numel(&self) -> usize {
        numel(&self.shape)
    }

    /// Returns true if the tensor has no elements.
    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Returns the extent of a dimension, supporting negative indexing.
    pub fn size(&self, dim: i64) -> Result<usize> {
        let idx = normalize_dim(dim, self.ndim())?;
        Ok(self.shape[idx])
    }

    /// Returns true if the tensor is 0-dimensional.
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Returns true if the elements are packed in this tensor's layout.
    pub fn is_contiguous(&self) -> bool {
        is_contiguous(&self.shape, &self.strides, self.layout)
    }

    /// Returns true if the elements are packed in row-major order.
    pub fn is_row_major_contiguous(&self) -> bool {
        is_contiguous(&self.shape, &self.strides, Layout::RowMajor)
    }

    /// Returns true if this tensor is packed in its layout, starts at the
    /// beginning of its storage and covers all of it. Only such tensors are
    /// resized by assignment.
    pub fn owns_buffer(&self) -> bool {
        self.offset == 0 && self.is_contiguous() && self.numel() == self.storage.len()
    }

    /// Returns the underlying storage.
    pub fn storage(&self) -> &Storage<T> {
        &self.storage
    }

    /// Returns true if both tensors read the same buffer.
    pub fn shares_storage(&self, other: &Self) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    // =========================================================================
    // Data Access
    // =========================================================================

    /// Storage position of a full multi-index. Extent-1 dimensions read
    /// index 0 so that broadcasting callers can pass larger indices.
    pub(crate) fn storage_offset(&self, indices: &[usize]) -> usize {
        let mut pos = self.offset as isize;
        for ((&idx, &dim), &stride) in indices.iter().zip(&self.shape).zip(&self.strides) {
            if dim != 1 {
                pos += idx as isize * stride;
            }
        }
        pos as usize
    }

    /// Returns the storage offsets of every element in row-major order.
    pub(crate) fn element_offsets(&self) -> Vec<usize> {
        offsets(&self.shape, &self.strides, self.offset)
    }

    /// Returns the element at the given indices.
    ///
    /// # Arguments
    /// * `indices` - One index per dimension
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        validate_indices(indices, &self.shape)?;
        let offset = (self.offset as isize + linear_index(indices, &self.strides)) as usize;
        Ok(self.storage.as_slice()[offset])
    }

    /// Sets the element at the given indices.
    ///
    /// # Arguments
    /// * `indices` - One index per dimension
    /// * `value` - Value to store
    pub fn set(&self, indices: &[usize], value: T) -> Result<()> {
        validate_indices(indices, &self.shape)?;
        let offset = (self.offset as isize + linear_index(indices, &self.strides)) as usize;
        self.storage.as_slice_mut()[offset] = value;
        Ok(())
    }

    /// Returns the value of a single-element tensor.
    pub fn item(&self) -> Result<T> {
        if self.numel() != 1 {
            return Err(Error::invalid_operation(format!(
                "item() requires a single element, tensor has shape {:?}",
                self.shape()
            )));
        }
        Ok(self.storage.as_slice()[self.offset])
    }

    /// Returns the elements in row-major logical order.
    pub fn to_vec(&self) -> Vec<T> {
        let data = self.storage.as_slice();
        if self.is_row_major_contiguous() {
            return data[self.offset..self.offset + self.numel()].to_vec();
        }

        let mut result = Vec::with_capacity(self.numel());
        for_each_offset(&self.shape, &self.strides, self.offset, |o| {
            result.push(data[o]);
        });
        result
    }

    /// Returns the elements in the traversal order of `layout`.
    pub fn to_vec_in(&self, layout: Layout) -> Vec<T> {
        match layout {
            Layout::RowMajor => self.to_vec(),
            Layout::ColumnMajor => {
                let data = self.storage.as_slice();
                Stepper::new(&self.shape, Layout::ColumnMajor)
                    .map(|idx| data[self.storage_offset(&idx)])
                    .collect()
            }
        }
    }

    /// Iterates over the elements in row-major logical order.
    pub fn iter(&self) -> std::vec::IntoIter<T> {
        self.to_vec().into_iter()
    }

    /// Iterates over the elements in the traversal order of `layout`.
    pub fn iter_layout(&self, layout: Layout) -> std::vec::IntoIter<T> {
        self.to_vec_in(layout).into_iter()
    }

    /// Iterates over `(multi-index, element)` pairs in row-major order.
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Vec<usize>, T)> + '_ {
        Stepper::new(&self.shape, Layout::RowMajor).zip(self.iter())
    }

    /// Writes `data`, given in row-major logical order, through the strides.
    pub(crate) fn write_logical(&self, data: &[T]) {
        debug_assert_eq!(data.len(), self.numel());
        let positions = if self.is_row_major_contiguous() {
            None
        } else {
            Some(self.element_offsets())
        };

        let mut dst = self.storage.as_slice_mut();
        match positions {
            None => dst[self.offset..self.offset + data.len()].copy_from_slice(data),
            Some(positions) => {
                for (&pos, &value) in positions.iter().zip(data) {
                    dst[pos] = value;
                }
            }
        }
    }

    /// Copies the elements of `other`, which must have the same shape.
    pub fn copy_from(&self, other: &Self) -> Result<()> {
        if self.shape != other.shape {
            return Err(Error::shape_mismatch(&self.shape, &other.shape));
        }
        let data = other.to_vec();
        self.write_logical(&data);
        Ok(())
    }

    /// Replaces every element by `f(element)` in place.
    pub fn apply_(&self, f: impl Fn(T) -> T) {
        let positions = self.element_offsets();
        let mut data = self.storage.as_slice_mut();
        for pos in positions {
            data[pos] = f(data[pos]);
        }
    }

    /// Fills the tensor with a value.
    pub fn fill_(&self, value: T) {
        if self.owns_buffer() {
            tensorex_core::CpuKernels::fill(&mut self.storage.as_slice_mut(), value);
            return;
        }
        self.apply_(|_| value);
    }

    // =========================================================================
    // Shape Operations
    // =========================================================================

    /// Returns a tensor with the same elements in a new shape.
    ///
    /// Elements are taken in row-major order. Supports one `-1` extent.
    /// Row-major contiguous tensors are reshaped without copying.
    ///
    /// # Arguments
    /// * `new_shape` - Target shape
    pub fn reshape(&self, new_shape: &[isize]) -> Result<Self> {
        let shape = reshape(&self.shape, new_shape)?;

        if self.is_row_major_contiguous() {
            let strides = contiguous_strides(&shape, Layout::RowMajor);
            return Ok(Self::from_parts(
                self.storage.clone(),
                shape,
                strides,
                self.offset,
                Layout::RowMajor,
            ));
        }

        Self::from_vec(self.to_vec(), &shape)
    }

    /// Returns a tensor with extent-1 dimensions removed.
    ///
    /// # Arguments
    /// * `dim` - Optional specific dimension to squeeze
    pub fn squeeze(&self, dim: Option<i64>) -> Result<Self> {
        let dim = dim.map(|d| normalize_dim(d, self.ndim())).transpose()?;

        let new_shape = squeeze(&self.shape, dim);
        let new_strides: Strides = self
            .shape
            .iter()
            .zip(self.strides.iter())
            .enumerate()
            .filter(|&(i, (&extent, _))| extent != 1 || dim.is_some_and(|d| d != i))
            .map(|(_, (_, &stride))| stride)
            .collect();

        Ok(self.with_geometry(new_shape, new_strides, self.offset))
    }

    /// Returns a tensor with an extent-1 dimension inserted at `dim`.
    ///
    /// Negative `dim` counts from the end of the result.
    pub fn unsqueeze(&self, dim: i64) -> Result<Self> {
        let normalized = normalize_dim(dim, self.ndim() + 1)?;

        let new_shape = unsqueeze(&self.shape, normalized)?;
        let mut new_strides = Strides::from_slice(&self.strides);
        let inserted = self
            .strides
            .get(normalized)
            .map_or(1, |&s| s * self.shape[normalized] as isize);
        new_strides.insert(normalized, inserted);

        Ok(self.with_geometry(new_shape, new_strides, self.offset))
    }

    /// Swaps two dimensions without copying.
    pub fn swapaxes(&self, dim0: i64, dim1: i64) -> Result<Self> {
        let d0 = normalize_dim(dim0, self.ndim())?;
        let d1 = normalize_dim(dim1, self.ndim())?;

        let new_shape = transpose_shape(&self.shape, d0, d1)?;
        let mut new_strides = self.strides.clone();
        new_strides.swap(d0, d1);

        Ok(self.with_geometry(new_shape, new_strides, self.offset))
    }

    /// Reverses the order of all dimensions without copying.
    pub fn transpose(&self) -> Self {
        let shape: Shape = self.shape.iter().rev().copied().collect();
        let strides: Strides = self.strides.iter().rev().copied().collect();
        self.with_geometry(shape, strides, self.offset)
    }

    /// Returns the transpose of a 2-D tensor.
    pub fn t(&self) -> Result<Self> {
        if self.ndim() != 2 {
            return Err(Error::invalid_operation(format!(
                "t() requires a 2-D tensor, got {} dimensions",
                self.ndim()
            )));
        }
        Ok(self.transpose())
    }

    /// Reorders dimensions without copying.
    ///
    /// # Arguments
    /// * `dims` - New order of dimensions; must be a permutation
    pub fn permute(&self, dims: &[usize]) -> Result<Self> {
        if dims.len() != self.ndim() {
            return Err(Error::invalid_operation(format!(
                "Expected {} dimensions, got {}",
                self.ndim(),
                dims.len()
            )));
        }

        let mut seen = vec![false; self.ndim()];
        for &d in dims {
            if d >= self.ndim() {
                return Err(Error::InvalidDimension {
                    index: d as i64,
                    ndim: self.ndim(),
                });
            }
            if seen[d] {
                return Err(Error::invalid_operation("Duplicate dimension in permute"));
            }
            seen[d] = true;
        }

        let new_shape: Shape = dims.iter().map(|&d| self.shape[d]).collect();
        let new_strides: Strides = dims.iter().map(|&d| self.strides[d]).collect();

        Ok(self.with_geometry(new_shape, new_strides, self.offset))
    }

    /// Returns a view reading this tensor as `shape` under broadcasting.
    ///
    /// Broadcast dimensions have stride 0, so writing through the result
    /// writes repeated positions.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self> {
        let target = broadcast_shape(&self.shape, shape)?;
        if target.as_slice() != shape || self.ndim() > shape.len() {
            return Err(Error::broadcast(&self.shape, shape));
        }
        let strides = broadcast_strides(&self.shape, &self.strides, shape);
        Ok(self.with_geometry(target, strides, self.offset))
    }

    /// Returns a row-major packed tensor; a handle copy if already packed.
    pub fn contiguous(&self) -> Self {
        if self.is_row_major_contiguous() && self.owns_buffer() {
            return self.clone();
        }
        self.to_layout(Layout::RowMajor)
    }

    /// Returns a packed copy of this tensor in the given layout.
    pub fn to_layout(&self, layout: Layout) -> Self {
        Self::from_parts(
            Storage::from_vec(self.to_vec_in(layout)),
            self.shape.clone(),
            contiguous_strides(&self.shape, layout),
            0,
            layout,
        )
    }

    /// Creates a deep copy with its own storage, keeping the layout.
    pub fn clone_deep(&self) -> Self {
        self.to_layout(self.layout)
    }
}

impl<T: Numeric> Tensor<T> {
    /// Sets every element to zero.
    pub fn zero_(&self) {
        self.fill_(T::ZERO);
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T: Scalar> PartialEq for Tensor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.to_vec() == other.to_vec()
    }
}

impl<T: Scalar> From<Vec<T>> for Tensor<T> {
    fn from(data: Vec<T>) -> Self {
        let len = data.len();
        Self::from_parts(
            Storage::from_vec(data),
            smallvec::smallvec![len],
            smallvec::smallvec![1],
            0,
            Layout::RowMajor,
        )
    }
}

impl<T: Scalar> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tensor(shape={:?}, dtype={}, layout={}",
            self.shape(),
            T::DTYPE,
            self.layout
        )?;
        if self.numel() <= 10 {
            write!(f, ", data={:?}", self.to_vec())?;
        }
        write!(f, ")")
    }
}

// =============================================================================
// Tests
// =============================================================================
