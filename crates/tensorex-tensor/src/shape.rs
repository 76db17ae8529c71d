//! Shape and Strides - Dimension Bookkeeping and Broadcasting
//!
//! Free functions over shapes and strides: stride computation for both
//! memory layouts, contiguity checks, index conversions, NumPy broadcasting
//! and the shape arithmetic behind reshape/squeeze/transpose.
//!
//! # Key Features
//! - Small-vector shapes (no heap allocation up to 6 dimensions)
//! - Row-major and column-major strides
//! - Broadcasting following `NumPy` rules
//! - Negative axis normalization
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use smallvec::SmallVec;

use tensorex_core::error::{Error, Result};
use tensorex_core::Layout;

// =============================================================================
// Type Aliases
// =============================================================================

/// Shape type - extents of a tensor.
pub type Shape = SmallVec<[usize; 6]>;

/// Strides type - signed element steps per dimension.
pub type Strides = SmallVec<[isize; 6]>;

// =============================================================================
// Shape Utilities
// =============================================================================

/// Computes the total number of elements from a shape.
///
/// The empty shape describes a 0-d tensor and holds one element.
#[must_use]
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Computes contiguous strides for a shape in the given layout.
///
/// # Arguments
/// * `shape` - The tensor shape
/// * `layout` - Row-major puts the last axis innermost, column-major the first
#[must_use]
pub fn contiguous_strides(shape: &[usize], layout: Layout) -> Strides {
    let mut strides: Strides = smallvec::smallvec![0; shape.len()];
    let mut stride = 1isize;

    match layout {
        Layout::RowMajor => {
            for (s, &dim) in strides.iter_mut().zip(shape.iter()).rev() {
                *s = stride;
                stride *= dim.max(1) as isize;
            }
        }
        Layout::ColumnMajor => {
            for (s, &dim) in strides.iter_mut().zip(shape.iter()) {
                *s = stride;
                stride *= dim.max(1) as isize;
            }
        }
    }

    strides
}

/// Checks if strides describe a contiguous buffer in `layout`.
///
/// Dimensions of extent 1 are never stepped over, so their stride is
/// ignored. Empty shapes are contiguous.
#[must_use]
pub fn is_contiguous(shape: &[usize], strides: &[isize], layout: Layout) -> bool {
    if numel(shape) == 0 {
        return true;
    }
    let expected = contiguous_strides(shape, layout);
    shape
        .iter()
        .zip(strides.iter().zip(expected.iter()))
        .all(|(&dim, (&s, &e))| dim == 1 || s == e)
}

/// Computes the storage offset of a multi-index relative to the base offset.
///
/// # Arguments
/// * `indices` - Multi-dimensional indices, one per dimension
/// * `strides` - Tensor strides
#[must_use]
pub fn linear_index(indices: &[usize], strides: &[isize]) -> isize {
    debug_assert_eq!(indices.len(), strides.len());
    indices
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx as isize * stride)
        .sum()
}

/// Converts a flat position into a multi-index.
///
/// The flat position counts elements in `layout` order.
#[must_use]
pub fn unravel_index(mut linear: usize, shape: &[usize], layout: Layout) -> Vec<usize> {
    let mut indices = vec![0; shape.len()];
    let mut visit = |i: usize| {
        let dim = shape[i].max(1);
        indices[i] = linear % dim;
        linear /= dim;
    };

    match layout {
        Layout::RowMajor => (0..shape.len()).rev().for_each(&mut visit),
        Layout::ColumnMajor => (0..shape.len()).for_each(&mut visit),
    }

    indices
}

/// Converts a multi-index into a flat position in `layout` order.
#[must_use]
pub fn ravel_index(indices: &[usize], shape: &[usize], layout: Layout) -> usize {
    let strides = contiguous_strides(shape, layout);
    linear_index(indices, &strides) as usize
}

// =============================================================================
// Broadcasting
// =============================================================================

/// Computes the broadcast shape of two shapes.
///
/// Broadcasting follows `NumPy` rules:
/// 1. Shapes are aligned from the right
/// 2. Extents are compatible if equal or one of them is 1
/// 3. Missing leading dimensions are treated as 1
pub fn broadcast_shape(shape1: &[usize], shape2: &[usize]) -> Result<Shape> {
    let max_ndim = shape1.len().max(shape2.len());
    let mut result: Shape = smallvec::smallvec![0; max_ndim];

    for i in 0..max_ndim {
        let d1 = trailing_dim(shape1, i);
        let d2 = trailing_dim(shape2, i);

        result[max_ndim - 1 - i] = if d1 == d2 || d2 == 1 {
            d1
        } else if d1 == 1 {
            d2
        } else {
            return Err(Error::broadcast(shape1, shape2));
        };
    }

    Ok(result)
}

/// Folds [`broadcast_shape`] over any number of shapes.
pub fn broadcast_shapes(shapes: &[&[usize]]) -> Result<Shape> {
    shapes
        .iter()
        .try_fold(Shape::new(), |acc, shape| broadcast_shape(&acc, shape))
}

fn trailing_dim(shape: &[usize], i: usize) -> usize {
    if i < shape.len() {
        shape[shape.len() - 1 - i]
    } else {
        1
    }
}

/// Returns true when `shape` broadcasts to exactly `target`.
#[must_use]
pub fn broadcasts_to(shape: &[usize], target: &[usize]) -> bool {
    shape.len() <= target.len()
        && broadcast_shape(shape, target).is_ok_and(|s| s.as_slice() == target)
}

/// Computes strides that read `shape`/`strides` as if it had `target_shape`.
///
/// Prepended and extent-1 dimensions get stride 0. The caller guarantees
/// that `shape` broadcasts to `target_shape`.
#[must_use]
pub fn broadcast_strides(shape: &[usize], strides: &[isize], target_shape: &[usize]) -> Strides {
    let shape_offset = target_shape.len() - shape.len();

    target_shape
        .iter()
        .enumerate()
        .map(|(i, &target_dim)| {
            if i < shape_offset {
                return 0;
            }
            let orig = i - shape_offset;
            if shape[orig] == 1 && target_dim != 1 {
                0
            } else {
                strides[orig]
            }
        })
        .collect()
}

// =============================================================================
// Shape Manipulation
// =============================================================================

/// Resolves a reshape target, validating the element count.
///
/// Supports a single `-1` entry whose extent is inferred.
pub fn reshape(old_shape: &[usize], new_shape: &[isize]) -> Result<Shape> {
    let old_numel = numel(old_shape);
    let mut result = Shape::with_capacity(new_shape.len());
    let mut infer_idx = None;
    let mut known_numel = 1usize;

    for (i, &dim) in new_shape.iter().enumerate() {
        if dim == -1 {
            if infer_idx.is_some() {
                return Err(Error::invalid_operation("Can only have one -1 in reshape"));
            }
            infer_idx = Some(i);
            result.push(0);
        } else if dim < 0 {
            return Err(Error::invalid_operation(format!(
                "Invalid extent {dim} in reshape"
            )));
        } else {
            known_numel *= dim as usize;
            result.push(dim as usize);
        }
    }

    if let Some(idx) = infer_idx {
        if known_numel == 0 || old_numel % known_numel != 0 {
            return Err(Error::invalid_operation(format!(
                "Cannot reshape {old_shape:?} into {new_shape:?}"
            )));
        }
        result[idx] = old_numel / known_numel;
    } else if known_numel != old_numel {
        return Err(Error::shape_mismatch(old_shape, &result));
    }

    Ok(result)
}

/// Computes the shape after removing extent-1 dimensions.
///
/// With `dim`, only that dimension is removed, and only if its extent is 1.
#[must_use]
pub fn squeeze(shape: &[usize], dim: Option<usize>) -> Shape {
    match dim {
        Some(d) => {
            let mut result = Shape::from_slice(shape);
            if d < shape.len() && shape[d] == 1 {
                result.remove(d);
            }
            result
        }
        None => shape.iter().copied().filter(|&d| d != 1).collect(),
    }
}

/// Computes the shape after inserting an extent-1 dimension at `dim`.
pub fn unsqueeze(shape: &[usize], dim: usize) -> Result<Shape> {
    if dim > shape.len() {
        return Err(Error::InvalidDimension {
            index: dim as i64,
            ndim: shape.len(),
        });
    }

    let mut result = Shape::with_capacity(shape.len() + 1);
    result.extend_from_slice(&shape[..dim]);
    result.push(1);
    result.extend_from_slice(&shape[dim..]);
    Ok(result)
}

/// Computes the shape after swapping two dimensions.
pub fn transpose_shape(shape: &[usize], dim0: usize, dim1: usize) -> Result<Shape> {
    if dim0 >= shape.len() || dim1 >= shape.len() {
        return Err(Error::InvalidDimension {
            index: dim0.max(dim1) as i64,
            ndim: shape.len(),
        });
    }

    let mut result = Shape::from_slice(shape);
    result.swap(dim0, dim1);
    Ok(result)
}

// =============================================================================
// Validation
// =============================================================================

/// Normalizes a dimension index, supporting negative indexing.
pub fn normalize_dim(dim: i64, ndim: usize) -> Result<usize> {
    let ndim_i64 = ndim as i64;
    let normalized = if dim < 0 { dim + ndim_i64 } else { dim };

    if normalized < 0 || normalized >= ndim_i64 {
        return Err(Error::InvalidDimension { index: dim, ndim });
    }

    Ok(normalized as usize)
}

/// Normalizes a list of axes; `None` selects every axis.
///
/// The result is sorted. Repeated axes are an error.
pub fn normalize_axes(axes: Option<&[i64]>, ndim: usize) -> Result<Vec<usize>> {
    let Some(axes) = axes else {
        return Ok((0..ndim).collect());
    };

    let mut result = axes
        .iter()
        .map(|&a| normalize_dim(a, ndim))
        .collect::<Result<Vec<_>>>()?;
    result.sort_unstable();

    if result.windows(2).any(|w| w[0] == w[1]) {
        return Err(Error::invalid_operation(format!(
            "Repeated axis in {axes:?}"
        )));
    }
    Ok(result)
}

/// Normalizes an element index along an axis of `size`, allowing negatives.
pub fn normalize_index(index: isize, size: usize) -> Result<usize> {
    let normalized = if index < 0 {
        index + size as isize
    } else {
        index
    };
    if normalized < 0 || normalized as usize >= size {
        return Err(Error::IndexOutOfBounds {
            index: index as i64,
            size,
        });
    }
    Ok(normalized as usize)
}

/// Validates that a multi-index is within bounds for a shape.
pub fn validate_indices(indices: &[usize], shape: &[usize]) -> Result<()> {
    if indices.len() != shape.len() {
        return Err(Error::invalid_operation(format!(
            "Expected {} indices, got {}",
            shape.len(),
            indices.len()
        )));
    }

    for (&idx, &dim) in indices.iter().zip(shape.iter()) {
        if idx >= dim {
            return Err(Error::IndexOutOfBounds {
                index: idx as i64,
                size: dim,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numel() {
        assert_eq!(numel(&[2, 3, 4]), 24);
        assert_eq!(numel(&[]), 1);
        assert_eq!(numel(&[3, 0]), 0);
    }

    #[test]
    fn test_contiguous_strides_both_layouts() {
        assert_eq!(
            contiguous_strides(&[2, 3, 4], Layout::RowMajor).as_slice(),
            &[12, 4, 1]
        );
        assert_eq!(
            contiguous_strides(&[2, 3, 4], Layout::ColumnMajor).as_slice(),
            &[1, 2, 6]
        );
        assert!(contiguous_strides(&[], Layout::RowMajor).is_empty());
    }

    #[test]
    fn test_is_contiguous_ignores_unit_dims() {
        assert!(is_contiguous(&[2, 3], &[3, 1], Layout::RowMajor));
        assert!(!is_contiguous(&[2, 3], &[1, 2], Layout::RowMajor));
        assert!(is_contiguous(&[2, 3], &[1, 2], Layout::ColumnMajor));
        assert!(is_contiguous(&[1, 3], &[99, 1], Layout::RowMajor));
    }

    #[test]
    fn test_broadcast_shape() {
        assert_eq!(broadcast_shape(&[2, 3], &[3]).unwrap().as_slice(), &[2, 3]);
        assert_eq!(
            broadcast_shape(&[2, 1], &[1, 3]).unwrap().as_slice(),
            &[2, 3]
        );
        assert_eq!(
            broadcast_shape(&[5, 1, 3], &[2, 3]).unwrap().as_slice(),
            &[5, 2, 3]
        );
        assert_eq!(broadcast_shape(&[4], &[]).unwrap().as_slice(), &[4]);
        assert!(broadcast_shape(&[2, 3], &[2, 4]).is_err());
    }

    #[test]
    fn test_broadcast_shapes_fold() {
        let shape = broadcast_shapes(&[&[3, 1], &[1, 4], &[4]]).unwrap();
        assert_eq!(shape.as_slice(), &[3, 4]);
        assert!(broadcast_shapes(&[&[3], &[4]]).is_err());
        assert!(broadcast_shapes(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_broadcasts_to() {
        assert!(broadcasts_to(&[3], &[2, 3]));
        assert!(!broadcasts_to(&[2, 3], &[3]));
        assert!(!broadcasts_to(&[2, 3], &[1, 3]));
    }

    #[test]
    fn test_broadcast_strides() {
        let strides = broadcast_strides(&[3, 1], &[1, 1], &[2, 3, 4]);
        assert_eq!(strides.as_slice(), &[0, 1, 0]);
    }

    #[test]
    fn test_reshape() {
        let old_shape = [2, 3, 4];
        assert_eq!(reshape(&old_shape, &[6, 4]).unwrap().as_slice(), &[6, 4]);
        assert_eq!(reshape(&old_shape, &[-1, 4]).unwrap().as_slice(), &[6, 4]);
        assert!(reshape(&old_shape, &[5, 5]).is_err());
        assert!(reshape(&old_shape, &[-1, -1]).is_err());
        assert!(reshape(&old_shape, &[-1, 5]).is_err());
    }

    #[test]
    fn test_squeeze_unsqueeze() {
        let shape = [1, 2, 1, 3, 1];
        assert_eq!(squeeze(&shape, None).as_slice(), &[2, 3]);
        assert_eq!(squeeze(&shape, Some(0)).as_slice(), &[2, 1, 3, 1]);
        assert_eq!(squeeze(&shape, Some(1)).as_slice(), &shape);

        assert_eq!(unsqueeze(&[2, 3], 2).unwrap().as_slice(), &[2, 3, 1]);
        assert!(unsqueeze(&[2, 3], 3).is_err());
    }

    #[test]
    fn test_normalize_dim_and_axes() {
        assert_eq!(normalize_dim(-1, 3).unwrap(), 2);
        assert!(normalize_dim(3, 3).is_err());
        assert!(normalize_dim(-4, 3).is_err());

        assert_eq!(normalize_axes(None, 3).unwrap(), vec![0, 1, 2]);
        assert_eq!(normalize_axes(Some(&[-1, 0]), 3).unwrap(), vec![0, 2]);
        assert!(normalize_axes(Some(&[1, -2]), 3).is_err());
    }

    #[test]
    fn test_normalize_index() {
        assert_eq!(normalize_index(-1, 4).unwrap(), 3);
        assert!(normalize_index(4, 4).is_err());
        assert!(normalize_index(-5, 4).is_err());
    }

    #[test]
    fn test_linear_index_negative_strides() {
        assert_eq!(linear_index(&[1, 2], &[3, 1]), 5);
        assert_eq!(linear_index(&[2], &[-1]), -2);
    }

    #[test]
    fn test_unravel_ravel() {
        let shape = [2, 3, 4];
        assert_eq!(unravel_index(4, &shape, Layout::RowMajor), vec![0, 1, 0]);
        assert_eq!(unravel_index(4, &shape, Layout::ColumnMajor), vec![0, 2, 0]);
        assert_eq!(ravel_index(&[1, 2, 3], &shape, Layout::RowMajor), 23);
        assert_eq!(ravel_index(&[1, 0, 0], &shape, Layout::ColumnMajor), 1);
    }

    #[test]
    fn test_validate_indices() {
        assert!(validate_indices(&[1, 2], &[2, 3]).is_ok());
        assert!(validate_indices(&[2, 0], &[2, 3]).is_err());
        assert!(validate_indices(&[0], &[2, 3]).is_err());
    }
}
