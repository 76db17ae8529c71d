//! NaN-Aware Routines - Reductions and Scans That Skip Missing Values
//!
//! Each routine treats NaN as absent: sums skip it, products skip it, and
//! means, extrema and variances only see the remaining values. A lane that
//! holds nothing but NaN reduces to NaN, except for sums and products,
//! which reduce to 0 and 1.
//!
//! # Example
//! ```rust
//! use tensorex_tensor::prelude::*;
//! use tensorex_tensor::nan::{nanmean, nansum};
//!
//! let t = Tensor::from_vec(vec![1.0, f64::NAN, 3.0, 4.0], &[2, 2]).unwrap();
//! assert_eq!(nansum(&t, &ReduceOptions::all()).unwrap().item().unwrap(), 8.0);
//! assert_eq!(nanmean(&t, &ReduceOptions::axis(0)).unwrap().to_vec(), vec![2.0, 4.0]);
//! ```
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use num_traits::Float as _;
use tensorex_core::dtype::{Float, Numeric};
use tensorex_core::error::{Error, Result};

use crate::accumulate::accumulate;
use crate::expr::{Expression, IntoExpression, Unary, UnaryFn};
use crate::math::MathExpr;
use crate::reduce::{reduce_lanes, ReduceOptions};
use crate::tensor::Tensor;

// =============================================================================
// Lane Helpers
// =============================================================================

fn present<T: Float>(lane: &[T]) -> impl Iterator<Item = T> + '_ {
    lane.iter().copied().filter(|v| !v.is_nan())
}

fn lane_nanmean<T: Float>(lane: &[T]) -> Result<T> {
    if lane.is_empty() {
        return Err(Error::EmptyTensor);
    }
    let (sum, n) = present(lane).fold((T::ZERO, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        return Ok(T::NAN);
    }
    Ok(sum / T::cast_from(n))
}

fn lane_nanvar<T: Float>(lane: &[T], ddof: usize) -> Result<T> {
    let mean = lane_nanmean(lane)?;
    let (squares, n) = present(lane).fold((T::ZERO, 0usize), |(s, n), v| {
        (s + (v - mean) * (v - mean), n + 1)
    });
    if n <= ddof {
        return Ok(T::NAN);
    }
    Ok(squares / T::cast_from(n - ddof))
}

fn lane_extreme<T: Float>(lane: &[T], keep: fn(T, T) -> bool) -> Result<T> {
    if lane.is_empty() {
        return Err(Error::EmptyTensor);
    }
    Ok(present(lane)
        .reduce(|best, v| if keep(v, best) { v } else { best })
        .unwrap_or(T::NAN))
}

// =============================================================================
// Reductions
// =============================================================================

/// Sum over the selected axes with NaN counted as zero.
pub fn nansum<T: Float>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| Ok(present(lane).fold(T::ZERO, |acc, v| acc + v)))
}

/// Product over the selected axes with NaN counted as one.
pub fn nanprod<T: Float>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| Ok(present(lane).fold(T::ONE, |acc, v| acc * v)))
}

/// Number of non-NaN elements per lane.
pub fn count_nonnan<T: Float>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<u64>> {
    reduce_lanes(t, opts, |lane| Ok(present(lane).count() as u64))
}

/// Mean of the non-NaN elements.
///
/// An all-NaN lane yields NaN; an empty extent is `Error::EmptyTensor`.
pub fn nanmean<T: Float>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, lane_nanmean)
}

/// Minimum of the non-NaN elements; an all-NaN lane yields NaN.
pub fn nanmin<T: Float>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| lane_extreme(lane, |v, best| v < best))
}

/// Maximum of the non-NaN elements; an all-NaN lane yields NaN.
pub fn nanmax<T: Float>(t: &Tensor<T>, opts: &ReduceOptions) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| lane_extreme(lane, |v, best| v > best))
}

/// Variance of the non-NaN elements with `ddof` delta degrees of freedom.
///
/// Lanes with no more than `ddof` present values yield NaN.
pub fn nanvar<T: Float>(t: &Tensor<T>, opts: &ReduceOptions, ddof: usize) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| lane_nanvar(lane, ddof))
}

/// Standard deviation of the non-NaN elements; see [`nanvar`].
pub fn nanstd<T: Float>(t: &Tensor<T>, opts: &ReduceOptions, ddof: usize) -> Result<Tensor<T>> {
    reduce_lanes(t, opts, |lane| Ok(lane_nanvar(lane, ddof)?.sqrt()))
}

// =============================================================================
// Scans
// =============================================================================

/// Cumulative sum along `axis` with NaN counted as zero.
///
/// `axis = None` scans the row-major flattening.
pub fn nancumsum<T: Float>(t: &Tensor<T>, axis: Option<i64>) -> Result<Tensor<T>> {
    let zeroed = t.clone().map(|v: T| if v.is_nan() { T::ZERO } else { v }).eval()?;
    accumulate(&zeroed, axis, |a, b| a + b)
}

/// Cumulative product along `axis` with NaN counted as one.
pub fn nancumprod<T: Float>(t: &Tensor<T>, axis: Option<i64>) -> Result<Tensor<T>> {
    let ones = t.clone().map(|v: T| if v.is_nan() { T::ONE } else { v }).eval()?;
    accumulate(&ones, axis, |a, b| a * b)
}

// =============================================================================
// Replacement
// =============================================================================

/// Lazily replaces NaN with zero and infinities with the largest finite
/// values of the same sign.
pub fn nan_to_num<X>(e: X) -> MathExpr<X>
where
    X: IntoExpression,
    X::Elem: Float,
{
    let f: UnaryFn<X::Elem, X::Elem> = |x| {
        if x.is_nan() {
            <X::Elem as Numeric>::ZERO
        } else if x == <X::Elem as Float>::INFINITY {
            <X::Elem as Numeric>::max_value()
        } else if x == <X::Elem as Float>::NEG_INFINITY {
            <X::Elem as Numeric>::min_value()
        } else {
            x
        }
    };
    Unary::new(e.into_expr(), f)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const N: f64 = f64::NAN;

    /// The 3x4 missing-value grid used throughout.
    fn grid() -> Tensor<f64> {
        Tensor::from_vec(
            vec![N, N, 123.0, 3.0, 1.0, 2.0, N, 3.0, 1.0, 1.0, N, 3.0],
            &[3, 4],
        )
        .unwrap()
    }

    #[test]
    fn test_nansum_and_nanprod() {
        let t = grid();
        let all = ReduceOptions::all();
        assert_eq!(nansum(&t, &all).unwrap().item().unwrap(), 137.0);
        assert_eq!(nanprod(&t, &all).unwrap().item().unwrap(), 6642.0);
        assert_eq!(
            nansum(&t, &ReduceOptions::axis(0)).unwrap().to_vec(),
            vec![2.0, 3.0, 123.0, 9.0]
        );
        assert_eq!(
            nanprod(&t, &ReduceOptions::axis(1)).unwrap().to_vec(),
            vec![369.0, 6.0, 3.0]
        );
    }

    #[test]
    fn test_count_nonnan() {
        let t = Tensor::from_vec(
            vec![0.0, 1.0, 2.0, 3.0, N, N, N, N, 3.0, N, 1.0, N],
            &[3, 4],
        )
        .unwrap();
        assert_eq!(count_nonnan(&t, &ReduceOptions::all()).unwrap().item().unwrap(), 6);
        assert_eq!(
            count_nonnan(&t, &ReduceOptions::axis(0)).unwrap().to_vec(),
            vec![2, 1, 2, 1]
        );
        assert_eq!(
            count_nonnan(&t, &ReduceOptions::axis(1)).unwrap().to_vec(),
            vec![4, 0, 2]
        );
    }

    #[test]
    fn test_nanmean() {
        let t = grid();
        assert_eq!(
            nanmean(&t, &ReduceOptions::axis(0)).unwrap().to_vec(),
            vec![1.0, 1.5, 123.0, 3.0]
        );
        let rows = nanmean(&t, &ReduceOptions::axis(1)).unwrap().to_vec();
        assert_eq!(rows, vec![63.0, 2.0, 5.0 / 3.0]);

        let empty_lane = Tensor::from_vec(vec![N, N], &[2]).unwrap();
        assert!(nanmean(&empty_lane, &ReduceOptions::all()).unwrap().item().unwrap().is_nan());
        let nothing = Tensor::<f64>::from_vec(vec![], &[0]).unwrap();
        assert!(nanmean(&nothing, &ReduceOptions::all()).is_err());
    }

    #[test]
    fn test_nanmin_nanmax() {
        let t = grid();
        let all = ReduceOptions::all();
        assert_eq!(nanmin(&t, &all).unwrap().item().unwrap(), 1.0);
        assert_eq!(nanmax(&t, &all).unwrap().item().unwrap(), 123.0);
        assert_eq!(
            nanmax(&t, &ReduceOptions::axis(1)).unwrap().to_vec(),
            vec![123.0, 3.0, 3.0]
        );

        let cube = Tensor::from_vec(vec![N, N, 1.0, 2.0, 3.0, N, N, 5.0], &[2, 2, 2]).unwrap();
        let m = nanmin(&cube, &ReduceOptions::axis(2)).unwrap().to_vec();
        assert!(m[0].is_nan());
        assert_eq!(&m[1..], &[1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_nanvar_nanstd() {
        let t = grid();
        assert_eq!(nanvar(&t, &ReduceOptions::all(), 0).unwrap().item().unwrap(), 1602.109375);
        assert_eq!(
            nanvar(&t, &ReduceOptions::axis(0), 0).unwrap().to_vec(),
            vec![0.0, 0.25, 0.0, 0.0]
        );
        let rows = nanvar(&t, &ReduceOptions::axis(1), 0).unwrap().to_vec();
        let expected = [3600.0, 2.0 / 3.0, 8.0 / 9.0];
        assert!(rows.iter().zip(expected).all(|(a, b)| (a - b).abs() < 1e-12));

        let sd = nanstd(&t, &ReduceOptions::axis(1), 0).unwrap().to_vec();
        assert_eq!(sd[0], 60.0);
        let single = Tensor::from_vec(vec![N, 4.0], &[2]).unwrap();
        assert!(nanvar(&single, &ReduceOptions::all(), 1).unwrap().item().unwrap().is_nan());
    }

    #[test]
    fn test_nancumsum_nancumprod() {
        let t = grid();
        assert_eq!(
            nancumsum(&t, Some(1)).unwrap().to_vec(),
            vec![0.0, 0.0, 123.0, 126.0, 1.0, 3.0, 3.0, 6.0, 1.0, 2.0, 2.0, 5.0]
        );
        assert_eq!(
            nancumprod(&t, Some(0)).unwrap().to_vec(),
            vec![1.0, 1.0, 123.0, 3.0, 1.0, 2.0, 123.0, 9.0, 1.0, 2.0, 123.0, 27.0]
        );
        let flat = nancumsum(&t, None).unwrap();
        assert_eq!(flat.shape(), &[12]);
        assert_eq!(flat.to_vec()[11], 137.0);
        assert!(t.to_vec()[0].is_nan());
    }

    #[test]
    fn test_nan_to_num() {
        let t = Tensor::from_vec(vec![N, 0.5, f64::NEG_INFINITY, f64::INFINITY], &[4]).unwrap();
        assert_eq!(
            nan_to_num(&t).eval().unwrap().to_vec(),
            vec![0.0, 0.5, f64::MIN, f64::MAX]
        );
    }
}
