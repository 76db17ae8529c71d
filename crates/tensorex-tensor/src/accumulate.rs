//! Accumulators - Running Folds and Differences
//!
//! Scans along one axis (or over the row-major flattening), discrete
//! differences and trapezoidal integration.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use tensorex_core::dtype::{Float, Numeric, Scalar};
use tensorex_core::error::Result;

use crate::creation::packed;
use crate::reduce::{axis_last, restore_axis, Lanes, ReduceOptions};
use crate::shape::normalize_dim;
use crate::tensor::Tensor;

// =============================================================================
// Scans
// =============================================================================

fn scan_lane<T: Copy>(lane: &mut [T], f: &impl Fn(T, T) -> T) {
    for i in 1..lane.len() {
        lane[i] = f(lane[i - 1], lane[i]);
    }
}

/// Running fold with `f` along `axis`.
///
/// With `axis = None` the tensor is flattened in row-major order first and
/// the result is 1-D.
pub fn accumulate<T, F>(t: &Tensor<T>, axis: Option<i64>, f: F) -> Result<Tensor<T>>
where
    T: Scalar,
    F: Fn(T, T) -> T,
{
    match axis {
        None => {
            let mut data = t.to_vec();
            scan_lane(&mut data, &f);
            let len = data.len();
            Ok(packed(data, &[len]))
        }
        Some(axis) => {
            let axis = normalize_dim(axis, t.ndim())?;
            let (mut data, lane_len) = axis_last(t, axis)?;
            if lane_len > 0 {
                for lane in data.chunks_mut(lane_len) {
                    scan_lane(lane, &f);
                }
            }
            restore_axis(data, t.shape(), axis, lane_len)
        }
    }
}

/// Cumulative sum along `axis`; see [`accumulate`].
pub fn cumsum<T: Numeric>(t: &Tensor<T>, axis: Option<i64>) -> Result<Tensor<T>> {
    accumulate(t, axis, |a, b| a + b)
}

/// Cumulative product along `axis`; see [`accumulate`].
pub fn cumprod<T: Numeric>(t: &Tensor<T>, axis: Option<i64>) -> Result<Tensor<T>> {
    accumulate(t, axis, |a, b| a * b)
}

// =============================================================================
// Differences and Integration
// =============================================================================

/// `n`-th discrete difference along `axis`.
///
/// The axis shrinks by `n`, down to zero.
pub fn diff<T: Numeric>(t: &Tensor<T>, n: usize, axis: i64) -> Result<Tensor<T>> {
    let axis = normalize_dim(axis, t.ndim())?;
    let (data, lane_len) = axis_last(t, axis)?;
    let out_len = lane_len.saturating_sub(n);

    let mut out = Vec::with_capacity(data.len());
    if lane_len > 0 {
        for lane in data.chunks(lane_len) {
            let mut current = lane.to_vec();
            for _ in 0..n.min(lane_len) {
                current = current.windows(2).map(|w| w[1] - w[0]).collect();
            }
            out.extend(current);
        }
    }

    let mut shape = t.shape().to_vec();
    shape[axis] = out_len;
    restore_axis(out, &shape, axis, out_len)
}

/// Integrates along `axis` with the trapezoidal rule and spacing `dx`.
pub fn trapz<T: Float>(y: &Tensor<T>, dx: T, axis: i64) -> Result<Tensor<T>> {
    let lanes = Lanes::new(y, &ReduceOptions::axis(axis))?;
    let half = T::cast_from(0.5);
    let data = lanes.fold(|lane| {
        Ok(lane
            .windows(2)
            .fold(T::ZERO, |acc, w| acc + (w[0] + w[1]) * half * dx))
    })?;
    Ok(packed(data, &lanes.out_shape))
}

// =============================================================================
// Tests
// =============================================================================
