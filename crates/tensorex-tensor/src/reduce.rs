//! Reducers - Folding Tensors Along Axes
//!
//! Reductions move the reduced axes to the end, read the tensor into
//! contiguous lanes (one lane per retained index) and fold each lane. Large
//! inputs with many lanes are folded in parallel.
//!
//! # Key Features
//! - Reduction over any set of axes, or all of them
//! - Optional retention of reduced axes as extent-1 dimensions
//! - Sum, product, mean, extrema, variance, truthiness and arg-extrema
//! - A generic fold for user reductions
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use rayon::prelude::*;

use tensorex_core::dtype::{Float, Numeric, Scalar};
use tensorex_core::error::{Error, Result};
use tensorex_core::CpuKernels;

use crate::creation::packed;
use crate::shape::{normalize_axes, normalize_dim, Shape};
use crate::tensor::Tensor;

// =============================================================================
// Options
// =============================================================================

/// Selects the axes of a reduction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReduceOptions {
    /// Axes to reduce; `None` reduces all of them. Negative axes count from
    /// the end.
    pub axes: Option<Vec<i64>>,
    /// Keep reduced axes as extent-1 dimensions.
    pub keep_dims: bool,
}

impl ReduceOptions {
    /// Reduces every axis.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Reduces a single axis.
    #[must_use]
    pub fn axis(axis: i64) -> Self {
        Self::axes(&[axis])
    }

    /// Reduces the given axes.
    #[must_use]
    pub fn axes(axes: &[i64]) -> Self {
        Self {
            axes: Some(axes.to_vec()),
            keep_dims: false,
        }
    }

    /// Sets whether reduced axes are kept.
    #[must_use]
    pub fn keep_dims(mut self, keep: bool) -> Self {
        self.keep_dims = keep;
        self
    }
}

// =============================================================================
// Lanes
// =============================================================================

/// A tensor read into contiguous lanes over the reduced axes.
pub(crate) struct Lanes<T> {
    /// Row-major data with reduced axes last.
    pub data: Vec<T>,
    /// Elements per lane.
    pub lane_len: usize,
    /// Number of lanes.
    pub count: usize,
    /// Result shape.
    pub out_shape: Shape,
}

impl<T: Scalar> Lanes<T> {
    pub(crate) fn new(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Self> {
        let ndim = t.ndim();
        let reduced = normalize_axes(opts.axes.as_deref(), ndim)?;
        let kept: Vec<usize> = (0..ndim).filter(|d| !reduced.contains(d)).collect();

        let order: Vec<usize> = kept.iter().chain(&reduced).copied().collect();
        let data = t.permute(&order)?.to_vec();

        let lane_len = reduced.iter().map(|&d| t.shape()[d]).product();
        let count = kept.iter().map(|&d| t.shape()[d]).product();

        let out_shape = if opts.keep_dims {
            t.shape()
                .iter()
                .enumerate()
                .map(|(d, &n)| if reduced.contains(&d) { 1 } else { n })
                .collect()
        } else {
            kept.iter().map(|&d| t.shape()[d]).collect()
        };

        Ok(Self {
            data,
            lane_len,
            count,
            out_shape,
        })
    }

    /// Folds every lane with `f`, in parallel for large inputs.
    pub(crate) fn fold<U, F>(&self, f: F) -> Result<Vec<U>>
    where
        U: Send,
        F: Fn(&[T]) -> Result<U> + Sync,
    {
        if self.lane_len == 0 {
            return (0..self.count).map(|_| f(&[])).collect();
        }

        if self.count > 1 && CpuKernels::is_parallel(self.data.len()) {
            tracing::trace!(lanes = self.count, lane_len = self.lane_len, "parallel reduction");
            self.data.par_chunks(self.lane_len).map(&f).collect()
        } else {
            self.data.chunks(self.lane_len).map(&f).collect()
        }
    }
}

/// Reads `t` with `axis` moved last; returns the data and the lane length.
pub(crate) fn axis_last<T: Scalar>(t: &Tensor<T>, axis: usize) -> Result<(Vec<T>, usize)> {
    let mut order: Vec<usize> = (0..t.ndim()).filter(|&d| d != axis).collect();
    order.push(axis);
    Ok((t.permute(&order)?.to_vec(), t.shape()[axis]))
}

/// Inverse of [`axis_last`]: rebuilds a row-major tensor of `shape` from
/// data whose `axis` was moved last, with `lane_len` entries per lane.
pub(crate) fn restore_axis<T: Scalar>(
    data: Vec<T>,
    shape: &[usize],
    axis: usize,
    lane_len: usize,
) -> Result<Tensor<T>> {
    let mut moved: Vec<usize> = shape
        .iter()
        .enumerate()
        .filter(|&(d, _)| d != axis)
        .map(|(_, &n)| n)
        .collect();
    moved.push(lane_len);

    let last = moved.len() - 1;
    let order: Vec<usize> = (0..moved.len())
        .map(|d| match d.cmp(&axis) {
            core::cmp::Ordering::Less => d,
            core::cmp::Ordering::Equal => last,
            core::cmp::Ordering::Greater => d - 1,
        })
        .collect();

    Ok(packed(data, &moved).permute(&order)?.contiguous())
}

pub(crate) fn reduce_lanes<T, U, F>(t: &Tensor<T>, opts: &ReduceOptions, f: F) -> Result<Tensor<U>>
where
    T: Scalar,
    U: Scalar,
    F: Fn(&[T]) -> Result<U> + Sync,
{
    let lanes = Lanes::new(t, opts)?;
    let data = lanes.fold(f)?;
    Ok(packed(data, &lanes.out_shape))
}

fn non_empty<T>(lane: &[T]) -> Result<&[T]> {
    if lane.is_empty() {
        Err(Error::EmptyTensor)
    } else {
        Ok(lane)
    }
}

// =============================================================================
// Reductions
// =============================================================================

/// Sum over the selected axes. An empty extent sums to zero.
pub fn sum<T: Numeric>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| Ok(CpuKernels::sum(lane)))
}

/// Product over the selected axes. An empty extent multiplies to one.
pub fn prod<T: Numeric>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| Ok(CpuKernels::prod(lane)))
}

/// Arithmetic mean over the selected axes.
///
/// Returns `Error::EmptyTensor` when a reduced extent is empty.
pub fn mean<T: Float>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| {
        let lane = non_empty(lane)?;
        Ok(CpuKernels::sum(lane) / T::cast_from(lane.len()))
    })
}

/// Maximum over the selected axes. NaN is ignored unless a lane holds
/// nothing else.
pub fn max<T: Numeric>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| CpuKernels::max(lane).ok_or(Error::EmptyTensor))
}

/// Minimum over the selected axes. NaN is ignored unless a lane holds
/// nothing else.
pub fn min<T: Numeric>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| CpuKernels::min(lane).ok_or(Error::EmptyTensor))
}

/// Alias of [`max`].
pub fn amax<T: Numeric>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    max(t, opts)
}

/// Alias of [`min`].
pub fn amin<T: Numeric>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    min(t, opts)
}

fn lane_variance<T: Float>(lane: &[T], ddof: usize) -> Result<T> {
    let lane = non_empty(lane)?;
    let n = lane.len();
    let mean = CpuKernels::sum(lane) / T::cast_from(n);
    let squares = lane.iter().fold(T::ZERO, |acc, &x| acc + (x - mean) * (x - mean));
    if n <= ddof {
        return Ok(T::NAN);
    }
    Ok(squares / T::cast_from(n - ddof))
}

/// Variance over the selected axes with `ddof` delta degrees of freedom.
///
/// A lane no longer than `ddof` yields NaN.
pub fn variance<T: Float>(t: &Tensor<T>, opts: &ReduceOptions, ddof: usize) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| lane_variance(lane, ddof))
}

/// Standard deviation over the selected axes; see [`variance`].
pub fn stddev<T: Float>(t: &Tensor<T>, opts: &ReduceOptions, ddof: usize) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| Ok(lane_variance(lane, ddof)?.sqrt()))
}

/// True where any element of the lane is non-zero (`true` for `bool`).
pub fn any<T: Scalar>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<bool>> {
    reduce_lanes(t, opts, |lane| Ok(lane.iter().any(|&v| v != T::default())))
}

/// True where every element of the lane is non-zero. Empty lanes are true.
pub fn all<T: Scalar>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<bool>> {
    reduce_lanes(t, opts, |lane| Ok(lane.iter().all(|&v| v != T::default())))
}

/// Number of non-zero elements per lane.
pub fn count_nonzero<T: Scalar>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<u64>> {
    reduce_lanes(t, opts, |lane| {
        Ok(lane.iter().filter(|&&v| v != T::default()).count() as u64)
    })
}

/// Index of the maximum along `axis`; the first occurrence wins.
pub fn argmax_axis<T: Numeric>(t: &Tensor<T>, axis: i64) -> Result<Tensor<u64>> {
    let axis = normalize_dim(axis, t.ndim())?;
    reduce_lanes(t, &ReduceOptions::axis(axis as i64), |lane| {
        CpuKernels::argmax(lane)
            .map(|i| i as u64)
            .ok_or(Error::EmptyTensor)
    })
}

/// Index of the minimum along `axis`; the first occurrence wins.
pub fn argmin_axis<T: Numeric>(t: &Tensor<T>, axis: i64) -> Result<Tensor<u64>> {
    let axis = normalize_dim(axis, t.ndim())?;
    reduce_lanes(t, &ReduceOptions::axis(axis as i64), |lane| {
        CpuKernels::argmin(lane)
            .map(|i| i as u64)
            .ok_or(Error::EmptyTensor)
    })
}

/// Folds every lane with `f`, starting from `init`.
pub fn reduce<T, U, F>(t: &Tensor<T>, opts: &ReduceOptions, init: U, f: F) -> Result<Tensor<U>>
where
    T: Scalar,
    U: Scalar,
    F: Fn(U, T) -> U + Sync,
{
    reduce_lanes(t, opts, |lane| Ok(lane.iter().fold(init, |acc, &x| f(acc, x))))
}

// =============================================================================
// Tensor Conveniences
// =============================================================================

impl<T: Numeric> Tensor<T> {
    /// Sum of all elements as a 0-d tensor.
    #[must_use]
    pub fn sum(&self) -> Self {
        Self::scalar(self.sum_all())
    }

    /// Sum of all elements.
    pub fn sum_all(&self) -> T {
        CpuKernels::sum(&self.to_vec())
    }

    /// Product of all elements as a 0-d tensor.
    #[must_use]
    pub fn prod(&self) -> Self {
        Self::scalar(CpuKernels::prod(&self.to_vec()))
    }

    /// Maximum of all elements as a 0-d tensor.
    pub fn max(&self) -> Result<Self> {
        CpuKernels::max(&self.to_vec())
            .map(Self::scalar)
            .ok_or(Error::EmptyTensor)
    }

    /// Minimum of all elements as a 0-d tensor.
    pub fn min(&self) -> Result<Self> {
        CpuKernels::min(&self.to_vec())
            .map(Self::scalar)
            .ok_or(Error::EmptyTensor)
    }
}

impl<T: Float> Tensor<T> {
    /// Mean of all elements as a 0-d tensor.
    pub fn mean(&self) -> Result<Self> {
        let data = self.to_vec();
        let data = non_empty(&data)?;
        Ok(Self::scalar(CpuKernels::sum(data) / T::cast_from(data.len())))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Tensor<f64> {
        Tensor::from_vec((0..6).map(f64::from).collect(), &[2, 3]).unwrap()
    }

    #[test]
    fn test_sum_axes() {
        let t = grid();
        let all = sum(&t, &ReduceOptions::all()).unwrap();
        assert!(all.is_scalar());
        assert_eq!(all.item().unwrap(), 15.0);

        assert_eq!(sum(&t, &ReduceOptions::axis(0)).unwrap().to_vec(), vec![3.0, 5.0, 7.0]);
        assert_eq!(sum(&t, &ReduceOptions::axis(-1)).unwrap().to_vec(), vec![3.0, 12.0]);

        let kept = sum(&t, &ReduceOptions::axis(1).keep_dims(true)).unwrap();
        assert_eq!(kept.shape(), &[2, 1]);
    }

    #[test]
    fn test_duplicate_axis_rejected() {
        assert!(sum(&grid(), &ReduceOptions::axes(&[0, -2])).is_err());
        assert!(sum(&grid(), &ReduceOptions::axis(2)).is_err());
    }

    #[test]
    fn test_three_d_over_two_axes() {
        let t = Tensor::<i32>::from_vec((0..24).collect(), &[2, 3, 4]).unwrap();
        let s = sum(&t, &ReduceOptions::axes(&[0, 2])).unwrap();
        assert_eq!(s.shape(), &[3]);
        // Row j sums i*12 + j*4 + k over i in 0..2 and k in 0..4.
        assert_eq!(s.to_vec(), vec![60, 92, 124]);
    }

    #[test]
    fn test_prod_mean_extrema() {
        let t = grid();
        assert_eq!(prod(&t, &ReduceOptions::axis(1)).unwrap().to_vec(), vec![0.0, 60.0]);
        assert_eq!(mean(&t, &ReduceOptions::axis(0)).unwrap().to_vec(), vec![1.5, 2.5, 3.5]);
        assert_eq!(max(&t, &ReduceOptions::axis(1)).unwrap().to_vec(), vec![2.0, 5.0]);
        assert_eq!(amin(&t, &ReduceOptions::all()).unwrap().item().unwrap(), 0.0);
    }

    #[test]
    fn test_empty_extent() {
        let empty = Tensor::<f64>::from_vec(vec![], &[2, 0]).unwrap();
        assert_eq!(sum(&empty, &ReduceOptions::axis(1)).unwrap().to_vec(), vec![0.0, 0.0]);
        assert_eq!(prod(&empty, &ReduceOptions::axis(1)).unwrap().to_vec(), vec![1.0, 1.0]);
        assert!(matches!(
            mean(&empty, &ReduceOptions::axis(1)),
            Err(Error::EmptyTensor)
        ));
        assert!(max(&empty, &ReduceOptions::all()).is_err());
        assert_eq!(max(&empty, &ReduceOptions::axis(0)).unwrap().numel(), 0);
    }

    #[test]
    fn test_variance_and_stddev() {
        let t = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0], &[4]).unwrap();
        assert_eq!(variance(&t, &ReduceOptions::all(), 0).unwrap().item().unwrap(), 1.25);
        let sample = variance(&t, &ReduceOptions::all(), 1).unwrap().item().unwrap();
        assert!((sample - 5.0 / 3.0).abs() < 1e-12);
        let sd = stddev(&t, &ReduceOptions::all(), 0).unwrap().item().unwrap();
        assert!((sd - 1.25_f64.sqrt()).abs() < 1e-12);
        assert!(variance(&t, &ReduceOptions::all(), 4).unwrap().item().unwrap().is_nan());
    }

    #[test]
    fn test_any_all_count() {
        let b = Tensor::from_vec(vec![true, false, false, false], &[2, 2]).unwrap();
        assert_eq!(any(&b, &ReduceOptions::axis(1)).unwrap().to_vec(), vec![true, false]);
        assert_eq!(all(&b, &ReduceOptions::axis(0)).unwrap().to_vec(), vec![false, false]);

        let n = Tensor::from_vec(vec![0, 3, 0, 7, 1, 0], &[2, 3]).unwrap();
        assert_eq!(count_nonzero(&n, &ReduceOptions::axis(1)).unwrap().to_vec(), vec![1, 2]);
        assert!(all(&Tensor::<i32>::from_vec(vec![], &[0]).unwrap(), &ReduceOptions::all())
            .unwrap()
            .item()
            .unwrap());
    }

    #[test]
    fn test_arg_extrema_axis() {
        let t = Tensor::from_vec(vec![3, 9, 9, 1, 0, 4], &[2, 3]).unwrap();
        assert_eq!(argmax_axis(&t, 1).unwrap().to_vec(), vec![1, 2]);
        assert_eq!(argmin_axis(&t, 0).unwrap().to_vec(), vec![1, 1, 1]);
    }

    #[test]
    fn test_generic_reduce() {
        let t = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let max_abs = reduce(&t, &ReduceOptions::axis(0), 0_i64, |acc, x| acc.max(i64::from(x)));
        assert_eq!(max_abs.unwrap().to_vec(), vec![3, 4]);
    }

    #[test]
    fn test_parallel_reduction_matches_serial() {
        let t = Tensor::<f64>::from_vec(vec![1.0; 64 * 128], &[64, 128]).unwrap();
        let rows = sum(&t, &ReduceOptions::axis(1)).unwrap();
        assert!(rows.iter().all(|v| v == 128.0));
    }

    #[test]
    fn test_tensor_conveniences() {
        let t = grid();
        assert_eq!(t.sum().item().unwrap(), 15.0);
        assert_eq!(t.sum_all(), 15.0);
        assert_eq!(t.mean().unwrap().item().unwrap(), 2.5);
        assert_eq!(t.max().unwrap().item().unwrap(), 5.0);
        assert_eq!(t.min().unwrap().item().unwrap(), 0.0);
        assert_eq!(t.prod().item().unwrap(), 0.0);
    }

    #[test]
    fn test_restore_axis_round_trip() {
        let t = Tensor::<i32>::from_vec((0..24).collect(), &[2, 3, 4]).unwrap();
        let (data, lane_len) = axis_last(&t, 1).unwrap();
        let back = restore_axis(data, t.shape(), 1, lane_len).unwrap();
        assert_eq!(back, t);
    }
}
