//! Set Operations - Membership and Sorted Set Algebra
//!
//! Membership tests against a set of values and the 1-D set routines. Set
//! results are sorted and free of duplicates. NaN is never a member.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use core::cmp::Ordering;

use tensorex_core::dtype::Scalar;
use tensorex_core::error::Result;

use crate::creation::packed;
use crate::expr::{Expression, IntoExpression};
use crate::sort::{is_unordered, nan_last_cmp};
use crate::tensor::Tensor;

/// Sorted, deduplicated values with NaN removed.
fn sorted_set<T: Scalar + PartialOrd>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut data: Vec<T> = values.into_iter().filter(|v| !is_unordered(v)).collect();
    data.sort_by(nan_last_cmp);
    data.dedup_by(|a, b| nan_last_cmp(a, b) == Ordering::Equal);
    data
}

fn contains<T: PartialOrd>(set: &[T], value: &T) -> bool {
    !is_unordered(value) && set.binary_search_by(|probe| nan_last_cmp(probe, value)).is_ok()
}

fn vector<T: Scalar>(data: Vec<T>) -> Tensor<T> {
    let len = data.len();
    packed(data, &[len])
}

// =============================================================================
// Membership
// =============================================================================

/// Element-wise membership of `e` in `test`. The result has the shape of
/// `e`.
pub fn isin<T, E>(e: E, test: &Tensor<T>) -> Result<Tensor<bool>>
where
    T: Scalar + PartialOrd,
    E: IntoExpression<Elem = T>,
{
    let values = e.into_expr().eval()?;
    let set = sorted_set(test.iter());
    let data = values.iter().map(|v| contains(&set, &v)).collect();
    Ok(packed(data, values.shape()))
}

/// Membership of each element of the flattening of `a` in `b`, as a 1-D
/// mask.
pub fn in1d<T: Scalar + PartialOrd>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<bool> {
    let set = sorted_set(b.iter());
    vector(a.iter().map(|v| contains(&set, &v)).collect())
}

// =============================================================================
// Set Algebra
// =============================================================================

/// Sorted unique values present in both inputs.
pub fn intersect1d<T: Scalar + PartialOrd>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    let other = sorted_set(b.iter());
    vector(
        sorted_set(a.iter())
            .into_iter()
            .filter(|v| contains(&other, v))
            .collect(),
    )
}

/// Sorted unique values present in either input.
pub fn union1d<T: Scalar + PartialOrd>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    vector(sorted_set(a.iter().chain(b.iter())))
}

/// Sorted unique values of `a` that are not in `b`.
pub fn setdiff1d<T: Scalar + PartialOrd>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    let other = sorted_set(b.iter());
    vector(
        sorted_set(a.iter())
            .into_iter()
            .filter(|v| !contains(&other, v))
            .collect(),
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isin_keeps_shape() {
        let t = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let test = Tensor::from_vec(vec![4, 2, 9], &[3]).unwrap();
        let mask = isin(&t, &test).unwrap();
        assert_eq!(mask.shape(), &[2, 2]);
        assert_eq!(mask.to_vec(), vec![false, true, false, true]);
    }

    #[test]
    fn test_isin_expression_and_nan() {
        let a = Tensor::from_vec(vec![1.0, f64::NAN, 3.0], &[3]).unwrap();
        let test = Tensor::from_vec(vec![2.0, f64::NAN, 6.0], &[3]).unwrap();
        let mask = isin(&a * 2.0, &test).unwrap();
        assert_eq!(mask.to_vec(), vec![true, false, true]);
    }

    #[test]
    fn test_in1d_flattens() {
        let a = Tensor::from_vec(vec![5, 6, 7, 8], &[2, 2]).unwrap();
        let b = Tensor::from_vec(vec![8, 5], &[2]).unwrap();
        let mask = in1d(&a, &b);
        assert_eq!(mask.shape(), &[4]);
        assert_eq!(mask.to_vec(), vec![true, false, false, true]);
    }

    #[test]
    fn test_set_algebra() {
        let a = Tensor::from_vec(vec![3, 1, 2, 3, 5], &[5]).unwrap();
        let b = Tensor::from_vec(vec![5, 4, 3, 3], &[4]).unwrap();
        assert_eq!(intersect1d(&a, &b).to_vec(), vec![3, 5]);
        assert_eq!(union1d(&a, &b).to_vec(), vec![1, 2, 3, 4, 5]);
        assert_eq!(setdiff1d(&a, &b).to_vec(), vec![1, 2]);
        assert_eq!(setdiff1d(&b, &b).shape(), &[0]);
    }
}
