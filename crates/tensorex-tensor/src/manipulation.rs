//! Manipulation - Reshaping, Reordering and Padding
//!
//! Operations that rearrange elements without changing their values.
//! Flips, rotations, axis moves and contiguous ravels are views; anything
//! stride arithmetic cannot express is a copy.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use tensorex_core::dtype::Scalar;
use tensorex_core::error::{Error, Result};
use tensorex_core::Layout;

use crate::creation::{from_fn, packed};
use crate::reduce::{axis_last, restore_axis};
use crate::shape::{is_contiguous, normalize_dim, Shape};
use crate::tensor::Tensor;

// =============================================================================
// Options
// =============================================================================

/// Which ends [`Tensor::trim_zeros`] trims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trim {
    /// Leading zeros only.
    Front,
    /// Trailing zeros only.
    Back,
    /// Both ends.
    #[default]
    Both,
}

/// How [`Tensor::pad`] fills the new border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadMode<T> {
    /// A constant value.
    Constant(T),
    /// The nearest edge element.
    Edge,
    /// Mirror image without repeating the edge.
    Reflect,
    /// Periodic continuation from the other end.
    Wrap,
}

fn pad_source(i: usize, before: usize, n: usize, mode: &PadMode<impl Copy>) -> Option<usize> {
    let idx = i as isize - before as isize;
    let len = n as isize;
    if (0..len).contains(&idx) {
        return Some(idx as usize);
    }
    match mode {
        PadMode::Constant(_) => None,
        PadMode::Edge => Some(idx.clamp(0, len - 1) as usize),
        PadMode::Wrap => Some(idx.rem_euclid(len) as usize),
        PadMode::Reflect => {
            if len == 1 {
                return Some(0);
            }
            let period = 2 * (len - 1);
            let m = idx.rem_euclid(period);
            Some(if m >= len { period - m } else { m } as usize)
        }
    }
}

impl<T: Scalar> Tensor<T> {
    // =========================================================================
    // Flattening
    // =========================================================================

    /// Copies the elements into a 1-D tensor in `layout` traversal order.
    #[must_use]
    pub fn flatten(&self, layout: Layout) -> Self {
        let data = self.to_vec_in(layout);
        let len = data.len();
        packed(data, &[len])
    }

    /// Returns the elements as a 1-D tensor in `layout` traversal order,
    /// without copying when the tensor is packed in that order.
    #[must_use]
    pub fn ravel(&self, layout: Layout) -> Self {
        if is_contiguous(&self.shape, &self.strides, layout) {
            let n = self.numel();
            return self.with_geometry(smallvec::smallvec![n], smallvec::smallvec![1], self.offset);
        }
        self.flatten(layout)
    }

    // =========================================================================
    // Axis Reordering
    // =========================================================================

    /// Inserts an extent-1 axis at `axis`; alias of [`Tensor::unsqueeze`].
    pub fn expand_dims(&self, axis: i64) -> Result<Self> {
        self.unsqueeze(axis)
    }

    /// Moves axis `source` to position `destination`, keeping the order of
    /// the others.
    pub fn moveaxis(&self, source: i64, destination: i64) -> Result<Self> {
        let src = normalize_dim(source, self.ndim())?;
        let dst = normalize_dim(destination, self.ndim())?;
        let mut order: Vec<usize> = (0..self.ndim()).filter(|&d| d != src).collect();
        order.insert(dst, src);
        self.permute(&order)
    }

    /// Reverses the order of elements along `axis`, or along every axis.
    pub fn flip(&self, axis: Option<i64>) -> Result<Self> {
        let axes: Vec<usize> = match axis {
            Some(a) => vec![normalize_dim(a, self.ndim())?],
            None => (0..self.ndim()).collect(),
        };

        let mut strides = self.strides.clone();
        let mut offset = self.offset as isize;
        for d in axes {
            if self.shape[d] > 1 {
                offset += (self.shape[d] as isize - 1) * strides[d];
            }
            strides[d] = -strides[d];
        }
        Ok(self.with_geometry(self.shape.clone(), strides, offset as usize))
    }

    /// Rotates by 90 degrees `k` times in the plane of the first two axes,
    /// from the first towards the second.
    pub fn rot90(&self, k: i32) -> Result<Self> {
        if self.ndim() < 2 {
            return Err(Error::invalid_operation(format!(
                "rot90() requires at least 2 dimensions, got {}",
                self.ndim()
            )));
        }
        match k.rem_euclid(4) {
            0 => Ok(self.clone()),
            1 => self.flip(Some(1))?.swapaxes(0, 1),
            2 => self.flip(Some(0))?.flip(Some(1)),
            _ => self.swapaxes(0, 1)?.flip(Some(1)),
        }
    }

    // =========================================================================
    // Copying Rearrangements
    // =========================================================================

    /// Shifts elements cyclically by `shift` along `axis`.
    ///
    /// With `axis = None` the row-major flattening is rolled and the shape
    /// kept.
    pub fn roll(&self, shift: isize, axis: Option<i64>) -> Result<Self> {
        let rotate = |lane: &mut [T]| {
            let n = lane.len();
            if n > 0 {
                lane.rotate_right(shift.rem_euclid(n as isize) as usize);
            }
        };

        match axis {
            None => {
                let mut data = self.to_vec();
                rotate(&mut data);
                Ok(packed(data, &self.shape))
            }
            Some(axis) => {
                let axis = normalize_dim(axis, self.ndim())?;
                let (mut data, lane_len) = axis_last(self, axis)?;
                if lane_len > 0 {
                    data.chunks_mut(lane_len).for_each(rotate);
                }
                restore_axis(data, &self.shape, axis, lane_len)
            }
        }
    }

    /// Repeats each element `repeats` times along `axis`.
    ///
    /// With `axis = None` the row-major flattening is repeated.
    pub fn repeat(&self, repeats: usize, axis: Option<i64>) -> Result<Self> {
        let stretch = |lane: &[T]| -> Vec<T> {
            lane.iter()
                .flat_map(|&v| core::iter::repeat(v).take(repeats))
                .collect()
        };

        match axis {
            None => {
                let data = stretch(&self.to_vec());
                let len = data.len();
                Ok(packed(data, &[len]))
            }
            Some(axis) => {
                let axis = normalize_dim(axis, self.ndim())?;
                let (data, lane_len) = axis_last(self, axis)?;
                let out_len = lane_len * repeats;
                let out: Vec<T> = if lane_len == 0 {
                    Vec::new()
                } else {
                    data.chunks(lane_len).flat_map(stretch).collect()
                };
                let mut shape = self.shape.to_vec();
                shape[axis] = out_len;
                restore_axis(out, &shape, axis, out_len)
            }
        }
    }

    /// Repeats the whole tensor `reps[d]` times along each axis.
    ///
    /// Shorter `reps` are padded with leading ones; a longer `reps` adds
    /// leading axes to the tensor.
    #[must_use]
    pub fn tile(&self, reps: &[usize]) -> Self {
        let ndim = self.ndim().max(reps.len());
        let mut src_shape: Shape = Shape::from_elem(1, ndim - self.ndim());
        src_shape.extend_from_slice(&self.shape);
        let mut all_reps = vec![1; ndim - reps.len()];
        all_reps.extend_from_slice(reps);

        let out_shape: Vec<usize> = src_shape.iter().zip(&all_reps).map(|(n, r)| n * r).collect();
        let source = self.with_geometry(
            src_shape.clone(),
            {
                let mut s = smallvec::SmallVec::from_elem(0, ndim - self.ndim());
                s.extend_from_slice(&self.strides);
                s
            },
            self.offset,
        );

        let data = self.storage.as_slice();
        from_fn(&out_shape, |idx| {
            let local: Vec<usize> = idx.iter().zip(&src_shape).map(|(i, n)| i % n).collect();
            data[source.storage_offset(&local)]
        })
    }

    /// Splits into `sections` equal views along `axis`.
    ///
    /// The axis extent must be divisible by `sections`.
    pub fn split_equal(&self, sections: usize, axis: i64) -> Result<Vec<Self>> {
        let extent = self.size(axis)?;
        if sections == 0 || extent % sections != 0 {
            return Err(Error::invalid_operation(format!(
                "Cannot split an axis of extent {extent} into {sections} equal sections"
            )));
        }
        self.split(&vec![extent / sections; sections], axis)
    }

    /// Pads every axis with `pad_width[d] = (before, after)` elements.
    ///
    /// A single pair applies to every axis.
    pub fn pad(&self, pad_width: &[(usize, usize)], mode: PadMode<T>) -> Result<Self> {
        let widths: Vec<(usize, usize)> = match pad_width.len() {
            1 => vec![pad_width[0]; self.ndim()],
            n if n == self.ndim() => pad_width.to_vec(),
            n => {
                return Err(Error::invalid_operation(format!(
                    "pad() needs 1 or {} width pairs, got {n}",
                    self.ndim()
                )))
            }
        };

        let fill = match mode {
            PadMode::Constant(v) => Some(v),
            _ => None,
        };
        if fill.is_none() {
            let empty_padded = self
                .shape
                .iter()
                .zip(&widths)
                .any(|(&n, &(b, a))| n == 0 && b + a > 0);
            if empty_padded {
                return Err(Error::invalid_operation(
                    "Cannot pad an empty axis by copying its elements",
                ));
            }
        }

        let out_shape: Vec<usize> = self
            .shape
            .iter()
            .zip(&widths)
            .map(|(&n, &(b, a))| n + b + a)
            .collect();

        let data = self.storage.as_slice();
        let mut local = vec![0; self.ndim()];
        Ok(from_fn(&out_shape, |idx| {
            for (d, &i) in idx.iter().enumerate() {
                match pad_source(i, widths[d].0, self.shape[d], &mode) {
                    Some(src) => local[d] = src,
                    None => return fill.unwrap_or_default(),
                }
            }
            data[self.storage_offset(&local)]
        }))
    }

    /// Removes leading and/or trailing zeros from a 1-D tensor, as a view.
    pub fn trim_zeros(&self, trim: Trim) -> Result<Self> {
        if self.ndim() != 1 {
            return Err(Error::invalid_operation(format!(
                "trim_zeros() requires a 1-D tensor, got {} dimensions",
                self.ndim()
            )));
        }
        let values = self.to_vec();
        let zero = T::default();
        let n = values.len();

        let start = match trim {
            Trim::Front | Trim::Both => values.iter().position(|&v| v != zero).unwrap_or(n),
            Trim::Back => 0,
        };
        let end = match trim {
            Trim::Back | Trim::Both => values
                .iter()
                .rposition(|&v| v != zero)
                .map_or(start, |p| p + 1),
            Trim::Front => n,
        };
        self.narrow(0, start, end.max(start) - start)
    }
}

// =============================================================================
// Rank Promotion
// =============================================================================

/// Views a 0-d tensor as shape `[1]`; other tensors are returned as is.
pub fn atleast_1d<T: Scalar>(t: &Tensor<T>) -> Result<Tensor<T>> {
    match t.ndim() {
        0 => t.unsqueeze(0),
        _ => Ok(t.clone()),
    }
}

/// Views lower-rank tensors as 2-D: `[] -> [1, 1]`, `[n] -> [1, n]`.
pub fn atleast_2d<T: Scalar>(t: &Tensor<T>) -> Result<Tensor<T>> {
    match t.ndim() {
        0 => t.unsqueeze(0)?.unsqueeze(0),
        1 => t.unsqueeze(0),
        _ => Ok(t.clone()),
    }
}

/// Views lower-rank tensors as 3-D: `[n] -> [1, n, 1]`, `[m, n] -> [m, n, 1]`.
pub fn atleast_3d<T: Scalar>(t: &Tensor<T>) -> Result<Tensor<T>> {
    match t.ndim() {
        0 => t.unsqueeze(0)?.unsqueeze(0)?.unsqueeze(0),
        1 => t.unsqueeze(0)?.unsqueeze(2),
        2 => t.unsqueeze(2),
        _ => Ok(t.clone()),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Tensor<i32> {
        Tensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap()
    }

    #[test]
    fn test_flatten_and_ravel() {
        let t = grid();
        assert_eq!(t.flatten(Layout::ColumnMajor).to_vec(), vec![1, 4, 2, 5, 3, 6]);

        let r = t.ravel(Layout::RowMajor);
        assert!(r.shares_storage(&t));
        assert_eq!(r.to_vec(), vec![1, 2, 3, 4, 5, 6]);

        let tr = t.transpose();
        let copied = tr.ravel(Layout::RowMajor);
        assert!(!copied.shares_storage(&t));
        assert_eq!(copied.to_vec(), vec![1, 4, 2, 5, 3, 6]);

        let view = tr.ravel(Layout::ColumnMajor);
        assert!(view.shares_storage(&t));
        assert_eq!(view.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_moveaxis_and_expand_dims() {
        let t = Tensor::<i32>::from_vec((0..24).collect(), &[2, 3, 4]).unwrap();
        assert_eq!(t.moveaxis(0, -1).unwrap().shape(), &[3, 4, 2]);
        assert_eq!(t.moveaxis(2, 0).unwrap().shape(), &[4, 2, 3]);
        assert_eq!(t.expand_dims(-1).unwrap().shape(), &[2, 3, 4, 1]);
    }

    #[test]
    fn test_flip_is_view() {
        let t = grid();
        let f = t.flip(Some(1)).unwrap();
        assert_eq!(f.to_vec(), vec![3, 2, 1, 6, 5, 4]);
        assert!(f.shares_storage(&t));
        assert_eq!(t.flip(None).unwrap().to_vec(), vec![6, 5, 4, 3, 2, 1]);

        f.set(&[0, 0], 30).unwrap();
        assert_eq!(t.get(&[0, 2]).unwrap(), 30);
    }

    #[test]
    fn test_rot90() {
        let m = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        assert_eq!(m.rot90(1).unwrap().to_vec(), vec![2, 4, 1, 3]);
        assert_eq!(m.rot90(2).unwrap().to_vec(), vec![4, 3, 2, 1]);
        assert_eq!(m.rot90(3).unwrap().to_vec(), vec![3, 1, 4, 2]);
        assert_eq!(m.rot90(-1).unwrap(), m.rot90(3).unwrap());
        assert_eq!(m.rot90(4).unwrap(), m);
    }

    #[test]
    fn test_roll() {
        let t = grid();
        assert_eq!(t.roll(1, None).unwrap().to_vec(), vec![6, 1, 2, 3, 4, 5]);
        assert_eq!(t.roll(-1, Some(1)).unwrap().to_vec(), vec![2, 3, 1, 5, 6, 4]);
        assert_eq!(t.roll(3, Some(0)).unwrap().to_vec(), vec![4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_repeat() {
        let t = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        assert_eq!(t.repeat(2, None).unwrap().to_vec(), vec![1, 1, 2, 2, 3, 3, 4, 4]);

        let rows = t.repeat(2, Some(0)).unwrap();
        assert_eq!(rows.shape(), &[4, 2]);
        assert_eq!(rows.to_vec(), vec![1, 2, 1, 2, 3, 4, 3, 4]);

        let cols = t.repeat(3, Some(1)).unwrap();
        assert_eq!(cols.shape(), &[2, 6]);
        assert_eq!(cols.to_vec(), vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn test_tile() {
        let v = Tensor::from_vec(vec![1, 2], &[2]).unwrap();
        assert_eq!(v.tile(&[3]).to_vec(), vec![1, 2, 1, 2, 1, 2]);

        let grown = v.tile(&[2, 2]);
        assert_eq!(grown.shape(), &[2, 4]);
        assert_eq!(grown.to_vec(), vec![1, 2, 1, 2, 1, 2, 1, 2]);

        let m = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        assert_eq!(m.tile(&[2]).shape(), &[2, 4]);
    }

    #[test]
    fn test_split_equal() {
        let t = grid();
        let parts = t.split_equal(3, 1).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].to_vec(), vec![3, 6]);
        assert!(t.split_equal(2, 1).is_err());
    }

    #[test]
    fn test_pad_modes() {
        let v = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
        assert_eq!(
            v.pad(&[(2, 1)], PadMode::Constant(0)).unwrap().to_vec(),
            vec![0, 0, 1, 2, 3, 0]
        );
        assert_eq!(v.pad(&[(2, 2)], PadMode::Edge).unwrap().to_vec(), vec![1, 1, 1, 2, 3, 3, 3]);
        assert_eq!(
            v.pad(&[(2, 2)], PadMode::Reflect).unwrap().to_vec(),
            vec![3, 2, 1, 2, 3, 2, 1]
        );
        assert_eq!(v.pad(&[(2, 2)], PadMode::Wrap).unwrap().to_vec(), vec![2, 3, 1, 2, 3, 1, 2]);

        let m = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let padded = m.pad(&[(1, 0), (0, 1)], PadMode::Constant(9)).unwrap();
        assert_eq!(padded.shape(), &[3, 3]);
        assert_eq!(padded.to_vec(), vec![9, 9, 9, 1, 2, 9, 3, 4, 9]);

        let empty = Tensor::<i32>::from_vec(vec![], &[0]).unwrap();
        assert!(empty.pad(&[(1, 1)], PadMode::Edge).is_err());
        assert!(m.pad(&[(1, 1); 3], PadMode::Edge).is_err());
    }

    #[test]
    fn test_trim_zeros() {
        let v = Tensor::from_vec(vec![0, 0, 1, 0, 2, 0], &[6]).unwrap();
        assert_eq!(v.trim_zeros(Trim::Both).unwrap().to_vec(), vec![1, 0, 2]);
        assert_eq!(v.trim_zeros(Trim::Front).unwrap().to_vec(), vec![1, 0, 2, 0]);
        assert_eq!(v.trim_zeros(Trim::Back).unwrap().to_vec(), vec![0, 0, 1, 0, 2]);

        let zeros = Tensor::from_vec(vec![0.0; 3], &[3]).unwrap();
        assert_eq!(zeros.trim_zeros(Trim::Both).unwrap().numel(), 0);
    }

    #[test]
    fn test_atleast() {
        let s = Tensor::scalar(5);
        assert_eq!(atleast_1d(&s).unwrap().shape(), &[1]);
        assert_eq!(atleast_2d(&s).unwrap().shape(), &[1, 1]);
        assert_eq!(atleast_3d(&s).unwrap().shape(), &[1, 1, 1]);

        let v = Tensor::from_vec(vec![1, 2], &[2]).unwrap();
        assert_eq!(atleast_2d(&v).unwrap().shape(), &[1, 2]);
        assert_eq!(atleast_3d(&v).unwrap().shape(), &[1, 2, 1]);
        assert_eq!(atleast_3d(&grid()).unwrap().shape(), &[2, 3, 1]);
    }
}
