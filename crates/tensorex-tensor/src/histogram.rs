//! Histogram - Binning, Bin Edges and Integer Occurrence Counts
//!
//! Histograms flatten their input. Bins are half-open `[e_i, e_{i+1})` except
//! the last, which also holds its right edge; values outside the edges and
//! NaN are not counted.
//!
//! # Example
//! ```rust
//! use tensorex_tensor::prelude::*;
//! use tensorex_tensor::histogram::{histogram_bin_edges, histogram, BinAlgorithm};
//!
//! let data = Tensor::from_vec(vec![1.0, 2.0, 1.0], &[3]).unwrap();
//! let edges = histogram_bin_edges(&data, None, None, 2, BinAlgorithm::Linspace).unwrap();
//! assert_eq!(edges.to_vec(), vec![1.0, 1.5, 2.0]);
//! assert_eq!(histogram(&data, &edges, None, false).unwrap().to_vec(), vec![2.0, 1.0]);
//! ```
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use num_traits::{Float as _, ToPrimitive};
use tensorex_core::dtype::{Float, Numeric};
use tensorex_core::error::{Error, Result};

use crate::creation::{linspace, logspace, packed};
use crate::sort::nan_last_cmp;
use crate::tensor::Tensor;

// =============================================================================
// Bin Algorithms
// =============================================================================

/// Strategy used by [`histogram_bin_edges`] to place bin edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinAlgorithm {
    /// Currently the same as [`BinAlgorithm::Linspace`].
    #[default]
    Automatic,
    /// Edges equally spaced between the bounds.
    Linspace,
    /// Edges equally spaced in `log10` between the bounds.
    Logspace,
    /// Edges chosen so every bin holds roughly the same total weight.
    Uniform,
}

// =============================================================================
// Helpers
// =============================================================================

fn finite_values<T: Float>(data: &Tensor<T>) -> Vec<T> {
    data.to_vec().into_iter().filter(|v| !v.is_nan()).collect()
}

fn check_weights<T: Float>(data: &Tensor<T>, weights: Option<&Tensor<T>>) -> Result<Vec<T>> {
    match weights {
        Some(w) if w.numel() != data.numel() => Err(Error::shape_mismatch(data.shape(), w.shape())),
        Some(w) => Ok(w.to_vec()),
        None => Ok(vec![T::ONE; data.numel()]),
    }
}

/// Returns the lower and upper bound, defaulting to the NaN-free extrema.
fn bounds<T: Float>(values: &[T], range: Option<(T, T)>) -> Result<(T, T)> {
    let (left, right) = match range {
        Some(r) => r,
        None if values.is_empty() => (T::ZERO, T::ONE),
        None => values.iter().fold((values[0], values[0]), |(lo, hi), &v| {
            (if v < lo { v } else { lo }, if v > hi { v } else { hi })
        }),
    };
    if left.is_nan() || right.is_nan() || left > right {
        return Err(Error::invalid_operation(format!(
            "histogram range must satisfy left <= right, got ({left:?}, {right:?})"
        )));
    }
    if left == right {
        let half = T::cast_from(0.5);
        return Ok((left - half, right + half));
    }
    Ok((left, right))
}

fn uniform_edges<T: Float>(
    data: &Tensor<T>,
    weights: &[T],
    left: T,
    right: T,
    bins: usize,
) -> Vec<T> {
    let mut pairs: Vec<(T, T)> = data
        .to_vec()
        .into_iter()
        .zip(weights.iter().copied())
        .filter(|(v, _)| !v.is_nan() && *v >= left && *v <= right)
        .collect();
    pairs.sort_by(|a, b| nan_last_cmp(&a.0, &b.0));

    let total = pairs.iter().fold(T::ZERO, |acc, &(_, w)| acc + w);
    let per_bin = total / T::cast_from(bins);

    let mut edges = vec![left; bins + 1];
    edges[bins] = right;
    let mut next = 1;
    let mut seen = T::ZERO;
    for (v, w) in pairs {
        if next >= bins {
            break;
        }
        seen = seen + w;
        if seen >= per_bin * T::cast_from(next) {
            edges[next] = v;
            next += 1;
        }
    }
    for i in next..bins {
        edges[i] = edges[i - 1];
    }
    edges
}

// =============================================================================
// Histogram
// =============================================================================

/// Computes `bins + 1` bin edges for `data`.
///
/// # Arguments
/// * `weights` - Per-element weights, only used by [`BinAlgorithm::Uniform`]
/// * `range` - Explicit `(left, right)`; defaults to the data extrema
///
/// A degenerate range `left == right` is widened by one half on each side,
/// and empty data spans `(0, 1)`.
pub fn histogram_bin_edges<T: Float>(
    data: &Tensor<T>,
    weights: Option<&Tensor<T>>,
    range: Option<(T, T)>,
    bins: usize,
    algorithm: BinAlgorithm,
) -> Result<Tensor<T>> {
    if bins == 0 {
        return Err(Error::invalid_operation("histogram requires at least one bin"));
    }
    let weights = check_weights(data, weights)?;
    let (left, right) = bounds(&finite_values(data), range)?;

    let edges = match algorithm {
        BinAlgorithm::Automatic | BinAlgorithm::Linspace => linspace(left, right, bins + 1, true),
        BinAlgorithm::Logspace => {
            if left <= T::ZERO {
                return Err(Error::invalid_operation(format!(
                    "logarithmic bins require a positive lower bound, got {left:?}"
                )));
            }
            let ten = T::cast_from(10.0);
            logspace(left.log10(), right.log10(), bins + 1, ten, true)
        }
        BinAlgorithm::Uniform => {
            let edges = uniform_edges(data, &weights, left, right, bins);
            packed(edges, &[bins + 1])
        }
    };
    tracing::debug!(bins, ?algorithm, "computed histogram bin edges");
    Ok(edges)
}

/// Counts (or sums the weights of) the elements falling into each bin.
///
/// `edges` must be 1-D, hold at least two values, and never decrease. With
/// `density` the result is normalised so that it integrates to one over
/// the edges.
pub fn histogram<T: Float>(
    data: &Tensor<T>,
    edges: &Tensor<T>,
    weights: Option<&Tensor<T>>,
    density: bool,
) -> Result<Tensor<T>> {
    if edges.ndim() != 1 || edges.numel() < 2 {
        return Err(Error::invalid_operation(format!(
            "histogram edges must be 1-D with at least two values, got shape {:?}",
            edges.shape()
        )));
    }
    let edges = edges.to_vec();
    if edges.windows(2).any(|w| !(w[0] <= w[1])) {
        return Err(Error::invalid_operation("histogram edges must be non-decreasing"));
    }
    let weights = check_weights(data, weights)?;

    let bins = edges.len() - 1;
    let (first, last) = (edges[0], edges[bins]);
    let mut counts = vec![T::ZERO; bins];
    for (v, w) in data.to_vec().into_iter().zip(weights) {
        if !(v >= first && v <= last) {
            continue;
        }
        let bin = edges.partition_point(|&e| e <= v).saturating_sub(1).min(bins - 1);
        counts[bin] = counts[bin] + w;
    }

    if density {
        let total = counts.iter().fold(T::ZERO, |acc, &c| acc + c);
        for (c, w) in counts.iter_mut().zip(edges.windows(2)) {
            *c = *c / (total * (w[1] - w[0]));
        }
    }
    Ok(packed(counts, &[bins]))
}

/// Bins `data` into `bins` equal-width bins and returns `(counts, edges)`.
pub fn histogram_with_bins<T: Float>(
    data: &Tensor<T>,
    bins: usize,
    range: Option<(T, T)>,
) -> Result<(Tensor<T>, Tensor<T>)> {
    let edges = histogram_bin_edges(data, None, range, bins, BinAlgorithm::Automatic)?;
    let counts = histogram(data, &edges, None, false)?;
    Ok((counts, edges))
}

// =============================================================================
// Bincount
// =============================================================================

fn bin_indices<T: Numeric>(data: &Tensor<T>) -> Result<Vec<usize>> {
    if !T::DTYPE.is_integer() {
        return Err(Error::invalid_operation(format!(
            "bincount() requires integer input, got {}",
            T::DTYPE
        )));
    }
    if data.ndim() != 1 {
        return Err(Error::invalid_operation(format!(
            "bincount() requires 1-D input, got shape {:?}",
            data.shape()
        )));
    }
    data.to_vec()
        .into_iter()
        .map(|v| {
            v.to_usize().ok_or_else(|| {
                Error::invalid_operation(format!(
                    "bincount() requires non-negative values, got {v:?}"
                ))
            })
        })
        .collect()
}

/// Counts occurrences of each non-negative integer in 1-D `data`.
///
/// The result has length `max(data) + 1`, or `minlength` if that is larger.
pub fn bincount<T: Numeric>(data: &Tensor<T>, minlength: usize) -> Result<Tensor<u64>> {
    let indices = bin_indices(data)?;
    let len = indices.iter().map(|&i| i + 1).max().unwrap_or(0).max(minlength);
    let mut counts = vec![0u64; len];
    for i in indices {
        counts[i] += 1;
    }
    Ok(packed(counts, &[len]))
}

/// Like [`bincount`], summing `weights` instead of counting.
pub fn bincount_weighted<T: Numeric, W: Numeric>(
    data: &Tensor<T>,
    weights: &Tensor<W>,
    minlength: usize,
) -> Result<Tensor<W>> {
    if weights.shape() != data.shape() {
        return Err(Error::shape_mismatch(data.shape(), weights.shape()));
    }
    let indices = bin_indices(data)?;
    let len = indices.iter().map(|&i| i + 1).max().unwrap_or(0).max(minlength);
    let mut sums = vec![W::ZERO; len];
    for (i, w) in indices.into_iter().zip(weights.to_vec()) {
        sums[i] = sums[i] + w;
    }
    Ok(packed(sums, &[len]))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(data: Vec<f64>) -> Tensor<f64> {
        let n = data.len();
        Tensor::from_vec(data, &[n]).unwrap()
    }

    #[test]
    fn test_linspace_edges_and_counts() {
        let data = vector(vec![1.0, 2.0, 1.0]);
        let (counts, edges) = histogram_with_bins(&data, 2, None).unwrap();
        assert_eq!(edges.to_vec(), vec![1.0, 1.5, 2.0]);
        assert_eq!(counts.to_vec(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_last_bin_is_closed_and_outliers_skipped() {
        let data = vector(vec![0.5, 1.5, 1.5, 3.9, 4.0, 5.0, -1.0, f64::NAN]);
        let (counts, edges) = histogram_with_bins(&data, 4, Some((0.0, 4.0))).unwrap();
        assert_eq!(edges.to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(counts.to_vec(), vec![1.0, 2.0, 0.0, 2.0]);
    }

    #[test]
    fn test_weights_and_density() {
        let edges = vector(vec![0.0, 1.0, 2.0, 3.0]);
        let data = vector(vec![0.5, 2.5]);
        let weights = vector(vec![2.0, 3.0]);
        let h = histogram(&data, &edges, Some(&weights), false).unwrap();
        assert_eq!(h.to_vec(), vec![2.0, 0.0, 3.0]);

        let edges = vector(vec![0.0, 1.0, 2.0, 4.0]);
        let data = vector(vec![0.5, 1.5, 1.5, 2.5]);
        let d = histogram(&data, &edges, None, true).unwrap();
        assert_eq!(d.to_vec(), vec![0.25, 0.5, 0.125]);

        let short = vector(vec![1.0]);
        assert!(matches!(
            histogram(&data, &edges, Some(&short), false),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_degenerate_and_empty_ranges() {
        let data = vector(vec![3.0, 3.0]);
        let (counts, edges) = histogram_with_bins(&data, 2, None).unwrap();
        assert_eq!(edges.to_vec(), vec![2.5, 3.0, 3.5]);
        assert_eq!(counts.to_vec(), vec![0.0, 2.0]);

        let empty = vector(vec![]);
        let (counts, edges) = histogram_with_bins(&empty, 2, None).unwrap();
        assert_eq!(edges.to_vec(), vec![0.0, 0.5, 1.0]);
        assert_eq!(counts.to_vec(), vec![0.0, 0.0]);

        assert!(histogram_with_bins(&data, 0, None).is_err());
        assert!(histogram_with_bins(&data, 2, Some((1.0, 0.0))).is_err());
    }

    #[test]
    fn test_logspace_edges() {
        let data = vector(vec![1.0, 10.0, 100.0]);
        let edges = histogram_bin_edges(&data, None, None, 2, BinAlgorithm::Logspace).unwrap();
        let e = edges.to_vec();
        assert_eq!(e[0], 1.0);
        assert!((e[1] - 10.0).abs() < 1e-9);
        assert!((e[2] - 100.0).abs() < 1e-9);

        let zero = vector(vec![0.0, 1.0]);
        assert!(histogram_bin_edges(&zero, None, None, 2, BinAlgorithm::Logspace).is_err());
    }

    #[test]
    fn test_uniform_edges_balance_weight() {
        let data = vector(vec![5.0, 1.0, 7.0, 3.0, 2.0, 8.0, 4.0, 6.0]);
        let edges = histogram_bin_edges(&data, None, None, 2, BinAlgorithm::Uniform).unwrap();
        assert_eq!(edges.to_vec(), vec![1.0, 4.0, 8.0]);
        let counts = histogram(&data, &edges, None, false).unwrap();
        assert_eq!(counts.to_vec(), vec![3.0, 5.0]);
    }

    #[test]
    fn test_rejects_bad_edges() {
        let data = vector(vec![1.0]);
        assert!(histogram(&data, &vector(vec![1.0]), None, false).is_err());
        assert!(histogram(&data, &vector(vec![2.0, 1.0]), None, false).is_err());
        let grid = Tensor::from_vec(vec![0.0, 1.0, 2.0, 3.0], &[2, 2]).unwrap();
        assert!(histogram(&data, &grid, None, false).is_err());
    }

    #[test]
    fn test_bincount() {
        let data = Tensor::from_vec(vec![0i64, 1, 1, 3], &[4]).unwrap();
        assert_eq!(bincount(&data, 0).unwrap().to_vec(), vec![1, 2, 0, 1]);
        assert_eq!(bincount(&data, 6).unwrap().to_vec(), vec![1, 2, 0, 1, 0, 0]);

        let weights = Tensor::from_vec(vec![0.5, 1.0, 2.0, 2.0], &[4]).unwrap();
        assert_eq!(
            bincount_weighted(&data, &weights, 0).unwrap().to_vec(),
            vec![0.5, 3.0, 0.0, 2.0]
        );

        let empty = Tensor::<u32>::from_vec(vec![], &[0]).unwrap();
        assert_eq!(bincount(&empty, 0).unwrap().shape(), &[0]);
    }

    #[test]
    fn test_bincount_rejects_bad_input() {
        let negative = Tensor::from_vec(vec![1i32, -1], &[2]).unwrap();
        assert!(bincount(&negative, 0).is_err());
        let floats = Tensor::from_vec(vec![1.0f64, 2.0], &[2]).unwrap();
        assert!(bincount(&floats, 0).is_err());
        let grid = Tensor::from_vec(vec![0u8, 1, 2, 3], &[2, 2]).unwrap();
        assert!(bincount(&grid, 0).is_err());
    }
}
