//! Sorting and Order Statistics
//!
//! Sorting, partitioning, selection and quantiles. All orderings place NaN
//! after every other value, so NaN counts as the largest element.
//!
//! # Key Features
//! - Stable `sort` / `argsort` along an axis or over the flattening
//! - `partition` / `argpartition` around a k-th element
//! - `unique`, `median`, `quantile`, `topk`, `searchsorted`
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use core::cmp::Ordering;

use tensorex_core::dtype::{Float, Numeric, Scalar};
use tensorex_core::error::{Error, Result};

use crate::creation::packed;
use crate::reduce::{axis_last, restore_axis, Lanes, ReduceOptions};
use crate::shape::normalize_dim;
use crate::tensor::Tensor;

// =============================================================================
// Ordering
// =============================================================================

/// Returns true for values unordered with themselves (NaN).
pub(crate) fn is_unordered<T: PartialOrd>(v: &T) -> bool {
    v.partial_cmp(v).is_none()
}

/// Total order over partially ordered values with NaN last.
pub fn nan_last_cmp<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    match a.partial_cmp(b) {
        Some(order) => order,
        None => {
            match (is_unordered(a), is_unordered(b)) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                _ => Ordering::Less,
            }
        }
    }
}

/// Applies a length-preserving lane function along `axis`, or over the
/// row-major flattening when `axis` is `None`.
fn map_lanes<T, U, F>(t: &Tensor<T>, axis: Option<i64>, f: F) -> Result<Tensor<U>>
where
    T: Scalar,
    U: Scalar,
    F: Fn(&[T]) -> Vec<U>,
{
    match axis {
        None => {
            let data = f(&t.to_vec());
            let len = data.len();
            Ok(packed(data, &[len]))
        }
        Some(axis) => {
            let axis = normalize_dim(axis, t.ndim())?;
            let (data, lane_len) = axis_last(t, axis)?;
            let out = if lane_len == 0 {
                Vec::new()
            } else {
                data.chunks(lane_len).flat_map(f).collect()
            };
            restore_axis(out, t.shape(), axis, lane_len)
        }
    }
}

fn sorted_indices<T: PartialOrd>(lane: &[T]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..lane.len()).collect();
    indices.sort_by(|&a, &b| nan_last_cmp(&lane[a], &lane[b]));
    indices
}

fn check_kth(kth: usize, len: usize) -> Result<()> {
    if kth < len {
        Ok(())
    } else {
        Err(Error::IndexOutOfBounds {
            index: kth as i64,
            size: len,
        })
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// Sorts along `axis` (stable); `None` sorts the flattening.
pub fn sort<T: Scalar + PartialOrd>(t: &Tensor<T>, axis: Option<i64>) -> Result<Tensor<T>> {
    map_lanes(t, axis, |lane| {
        let mut lane = lane.to_vec();
        lane.sort_by(nan_last_cmp);
        lane
    })
}

/// Indices that sort along `axis` (stable); `None` sorts the flattening.
pub fn argsort<T: Scalar + PartialOrd>(t: &Tensor<T>, axis: Option<i64>) -> Result<Tensor<u64>> {
    map_lanes(t, axis, |lane| {
        sorted_indices(lane).into_iter().map(|i| i as u64).collect()
    })
}

/// Flat row-major index of the largest element, NaN ignored.
pub fn argmax<T: Numeric>(t: &Tensor<T>) -> Result<usize> {
    tensorex_core::CpuKernels::argmax(&t.to_vec()).ok_or(Error::EmptyTensor)
}

/// Flat row-major index of the smallest element, NaN ignored.
pub fn argmin<T: Numeric>(t: &Tensor<T>) -> Result<usize> {
    tensorex_core::CpuKernels::argmin(&t.to_vec()).ok_or(Error::EmptyTensor)
}

/// Reorders each lane along `axis` so that position `kth` holds the value
/// it would hold after sorting, smaller values before it and larger after.
pub fn partition<T: Scalar + PartialOrd>(t: &Tensor<T>, kth: usize, axis: i64) -> Result<Tensor<T>> {
    let axis_index = normalize_dim(axis, t.ndim())?;
    check_kth(kth, t.shape()[axis_index])?;
    map_lanes(t, Some(axis), |lane| {
        let mut lane = lane.to_vec();
        lane.select_nth_unstable_by(kth, nan_last_cmp);
        lane
    })
}

/// Indices that [`partition`] the lanes along `axis` around `kth`.
pub fn argpartition<T: Scalar + PartialOrd>(
    t: &Tensor<T>,
    kth: usize,
    axis: i64,
) -> Result<Tensor<u64>> {
    let axis_index = normalize_dim(axis, t.ndim())?;
    check_kth(kth, t.shape()[axis_index])?;
    map_lanes(t, Some(axis), |lane| {
        let mut indices: Vec<usize> = (0..lane.len()).collect();
        indices.select_nth_unstable_by(kth, |&a, &b| nan_last_cmp(&lane[a], &lane[b]));
        indices.into_iter().map(|i| i as u64).collect()
    })
}

/// Sorted distinct elements of the flattening. NaNs collapse into one.
pub fn unique<T: Scalar + PartialOrd>(t: &Tensor<T>) -> Tensor<T> {
    let mut data = t.to_vec();
    data.sort_by(nan_last_cmp);
    data.dedup_by(|a, b| nan_last_cmp(a, b) == Ordering::Equal);
    let len = data.len();
    packed(data, &[len])
}

// =============================================================================
// Order Statistics
// =============================================================================

fn lane_quantile<T: Float>(lane: &[T], q: f64) -> Result<T> {
    if lane.is_empty() {
        return Err(Error::EmptyTensor);
    }
    if lane.iter().any(|v| v.is_nan()) {
        return Ok(T::NAN);
    }

    let mut sorted = lane.to_vec();
    sorted.sort_by(nan_last_cmp);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = T::cast_from(pos - lo as f64);
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// The `q`-th quantile (`0 <= q <= 1`) with linear interpolation.
///
/// `axis = None` reduces every axis to a 0-d result. A lane holding NaN
/// yields NaN.
pub fn quantile<T: Float>(t: &Tensor<T>, q: f64, axis: Option<i64>) -> Result<Tensor<T>> {
    if !(0.0..=1.0).contains(&q) {
        return Err(Error::invalid_operation(format!(
            "Quantile must lie in [0, 1], got {q}"
        )));
    }
    let opts = match axis {
        Some(a) => ReduceOptions::axis(a),
        None => ReduceOptions::all(),
    };
    let lanes = Lanes::new(t, &opts)?;
    let data = lanes.fold(|lane| lane_quantile(lane, q))?;
    Ok(packed(data, &lanes.out_shape))
}

/// Median; see [`quantile`].
pub fn median<T: Float>(t: &Tensor<T>, axis: Option<i64>) -> Result<Tensor<T>> {
    quantile(t, 0.5, axis)
}

/// Values and indices of the `k` largest elements along the last axis.
#[derive(Debug, Clone)]
pub struct TopK<T: Scalar> {
    /// Largest values, in descending order.
    pub values: Tensor<T>,
    /// Positions of those values along the last axis.
    pub indices: Tensor<u64>,
}

/// Returns the `k` largest elements along the last axis, largest first.
/// Equal values keep their original order.
pub fn topk<T: Scalar + PartialOrd>(t: &Tensor<T>, k: usize) -> Result<TopK<T>> {
    if t.ndim() == 0 {
        return Err(Error::invalid_operation("topk() requires at least one dimension"));
    }
    let axis = t.ndim() - 1;
    let n = t.shape()[axis];
    if k > n {
        return Err(Error::invalid_operation(format!(
            "topk() k = {k} exceeds axis extent {n}"
        )));
    }

    let (data, lane_len) = axis_last(t, axis)?;
    let mut values = Vec::new();
    let mut indices = Vec::new();
    if lane_len > 0 {
        for lane in data.chunks(lane_len) {
            let mut order: Vec<usize> = (0..lane.len()).collect();
            order.sort_by(|&a, &b| nan_last_cmp(&lane[b], &lane[a]));
            for &i in &order[..k] {
                values.push(lane[i]);
                indices.push(i as u64);
            }
        }
    }

    let mut shape = t.shape().to_vec();
    shape[axis] = k;
    Ok(TopK {
        values: packed(values, &shape),
        indices: packed(indices, &shape),
    })
}

/// Which insertion point [`searchsorted`] reports for equal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// Before any equal elements.
    #[default]
    Left,
    /// After any equal elements.
    Right,
}

/// Insertion points of `values` into the sorted 1-D tensor `sorted` that
/// keep it sorted. The result has the shape of `values`.
pub fn searchsorted<T: Scalar + PartialOrd>(
    sorted: &Tensor<T>,
    values: &Tensor<T>,
    side: Side,
) -> Result<Tensor<u64>> {
    if sorted.ndim() != 1 {
        return Err(Error::invalid_operation(format!(
            "searchsorted() requires a 1-D sorted tensor, got {} dimensions",
            sorted.ndim()
        )));
    }
    let haystack = sorted.to_vec();
    let data = values
        .iter()
        .map(|v| {
            let pos = match side {
                Side::Left => haystack.partition_point(|h| nan_last_cmp(h, &v) == Ordering::Less),
                Side::Right => {
                    haystack.partition_point(|h| nan_last_cmp(h, &v) != Ordering::Greater)
                }
            };
            pos as u64
        })
        .collect();
    Ok(packed(data, values.shape()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_sorts_last() {
        let t = Tensor::from_vec(vec![3.0, f64::NAN, 1.0, 2.0], &[4]).unwrap();
        let s = sort(&t, None).unwrap().to_vec();
        assert_eq!(&s[..3], &[1.0, 2.0, 3.0]);
        assert!(s[3].is_nan());
        assert_eq!(argsort(&t, Some(0)).unwrap().to_vec(), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_sort_along_axes() {
        let t = Tensor::from_vec(vec![3, 1, 2, 0, 5, 4], &[2, 3]).unwrap();
        assert_eq!(sort(&t, Some(1)).unwrap().to_vec(), vec![1, 2, 3, 0, 4, 5]);
        assert_eq!(sort(&t, Some(0)).unwrap().to_vec(), vec![0, 1, 2, 3, 5, 4]);
        assert_eq!(sort(&t, None).unwrap().shape(), &[6]);
        assert_eq!(argsort(&t, Some(-1)).unwrap().to_vec(), vec![1, 2, 0, 0, 2, 1]);
    }

    #[test]
    fn test_argsort_is_stable() {
        let t = Tensor::from_vec(vec![2, 1, 2, 1], &[4]).unwrap();
        assert_eq!(argsort(&t, None).unwrap().to_vec(), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_flat_argmax_argmin() {
        let t = Tensor::from_vec(vec![1.0, 7.0, f64::NAN, -2.0], &[2, 2]).unwrap();
        assert_eq!(argmax(&t).unwrap(), 1);
        assert_eq!(argmin(&t).unwrap(), 3);
        assert!(argmax(&Tensor::<f64>::from_vec(vec![], &[0]).unwrap()).is_err());
    }

    #[test]
    fn test_partition() {
        let t = Tensor::from_vec(vec![7, 2, 9, 1, 5], &[5]).unwrap();
        let p = partition(&t, 2, 0).unwrap().to_vec();
        assert_eq!(p[2], 5);
        assert!(p[..2].iter().all(|&v| v <= 5));
        assert!(p[3..].iter().all(|&v| v >= 5));

        let idx = argpartition(&t, 0, 0).unwrap().to_vec();
        assert_eq!(idx[0], 3);
        assert!(partition(&t, 5, 0).is_err());
    }

    #[test]
    fn test_unique() {
        let t = Tensor::from_vec(vec![3, 1, 3, 2, 1], &[5]).unwrap();
        assert_eq!(unique(&t).to_vec(), vec![1, 2, 3]);

        let f = Tensor::from_vec(vec![f64::NAN, 1.0, f64::NAN], &[3]).unwrap();
        let u = unique(&f).to_vec();
        assert_eq!(u.len(), 2);
        assert!(u[1].is_nan());
    }

    #[test]
    fn test_median_and_quantile() {
        let t = Tensor::from_vec(vec![4.0, 1.0, 3.0, 2.0], &[4]).unwrap();
        assert_eq!(median(&t, None).unwrap().item().unwrap(), 2.5);
        assert_eq!(quantile(&t, 0.0, None).unwrap().item().unwrap(), 1.0);
        assert_eq!(quantile(&t, 1.0, None).unwrap().item().unwrap(), 4.0);
        assert_eq!(quantile(&t, 0.25, None).unwrap().item().unwrap(), 1.75);
        assert!(quantile(&t, 1.5, None).is_err());

        let m = Tensor::from_vec(vec![1.0, 5.0, 3.0, 2.0, 8.0, 4.0], &[2, 3]).unwrap();
        assert_eq!(median(&m, Some(1)).unwrap().to_vec(), vec![3.0, 4.0]);
        let with_nan = Tensor::from_vec(vec![1.0, f64::NAN], &[2]).unwrap();
        assert!(median(&with_nan, None).unwrap().item().unwrap().is_nan());
    }

    #[test]
    fn test_topk() {
        let t = Tensor::from_vec(vec![1, 5, 3, 9, 2, 9], &[2, 3]).unwrap();
        let top = topk(&t, 2).unwrap();
        assert_eq!(top.values.shape(), &[2, 2]);
        assert_eq!(top.values.to_vec(), vec![5, 3, 9, 9]);
        assert_eq!(top.indices.to_vec(), vec![1, 2, 0, 2]);
        assert!(topk(&t, 4).is_err());
    }

    #[test]
    fn test_searchsorted() {
        let sorted = Tensor::from_vec(vec![1, 2, 2, 4], &[4]).unwrap();
        let values = Tensor::from_vec(vec![0, 2, 3, 5], &[2, 2]).unwrap();
        let left = searchsorted(&sorted, &values, Side::Left).unwrap();
        assert_eq!(left.shape(), &[2, 2]);
        assert_eq!(left.to_vec(), vec![0, 1, 3, 4]);
        assert_eq!(
            searchsorted(&sorted, &values, Side::Right).unwrap().to_vec(),
            vec![0, 3, 3, 4]
        );
    }
}
