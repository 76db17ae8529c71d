//! Norms - Vector Norms Over Selected Axes
//!
//! Every norm reduces over the axes chosen by [`ReduceOptions`] and returns
//! a tensor of the reduced shape. NaN in a lane makes that lane's norm NaN.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use tensorex_core::dtype::{Float, Numeric};
use tensorex_core::error::{Error, Result};

use crate::reduce::{reduce_lanes, ReduceOptions};
use crate::sort::is_unordered;
use crate::tensor::Tensor;

/// Number of non-zero elements, in the element type.
pub fn norm_l0<T: Numeric>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| {
        Ok(lane
            .iter()
            .fold(T::ZERO, |acc, &v| if v != T::ZERO { acc + T::ONE } else { acc }))
    })
}

/// Sum of absolute values.
pub fn norm_l1<T: Numeric>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| {
        Ok(lane.iter().fold(T::ZERO, |acc, &v| acc + v.abs_value()))
    })
}

/// Sum of squares.
pub fn norm_sq<T: Numeric>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| Ok(lane.iter().fold(T::ZERO, |acc, &v| acc + v * v)))
}

/// Euclidean norm.
pub fn norm_l2<T: Float>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| {
        Ok(lane.iter().fold(T::ZERO, |acc, &v| acc + v * v).sqrt())
    })
}

/// Largest absolute value. An empty lane has norm zero.
pub fn norm_linf<T: Numeric>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| {
        Ok(lane.iter().fold(T::ZERO, |acc, &v| {
            let a = v.abs_value();
            // NaN is sticky.
            if is_unordered(&acc) {
                acc
            } else if is_unordered(&a) || a > acc {
                a
            } else {
                acc
            }
        }))
    })
}

/// `p`-norm `(sum |x|^p)^(1/p)`. `p` must be positive; an infinite `p`
/// is [`norm_linf`].
pub fn norm_lp<T: Float>(t: &Tensor<T>, p: T, opts: &ReduceOptions) -> Result<Tensor<T>> {
    if p.is_nan() || p <= T::ZERO {
        return Err(Error::invalid_operation(format!(
            "norm_lp() requires p > 0, got {p:?}"
        )));
    }
    if p.is_infinite() {
        return norm_linf(t, opts);
    }
    let inv = T::ONE / p;
    reduce_lanes(t, opts, |lane| {
        Ok(lane
            .iter()
            .fold(T::ZERO, |acc, &v| acc + v.abs().powf(p))
            .powf(inv))
    })
}

// =============================================================================
// Tests
// =============================================================================
