//! Tensor Creation Functions
//!
//! Builders for filled tensors, identity and triangular matrices, ranges,
//! grids and tensors computed from their index. Random builders live in
//! [`crate::random`].
//!
//! # Key Features
//! - Factory functions in the configured default layout
//! - Range and linspace functions with checked parameters
//! - Lazy generators that are only evaluated on assignment
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use tensorex_core::dtype::{Float, Numeric, Scalar};
use tensorex_core::error::{Error, Result};
use tensorex_core::{Layout, Storage};

use crate::expr::Generator;
use crate::iter::Stepper;
use crate::shape::{contiguous_strides, numel, Shape};
use crate::tensor::Tensor;

/// Wraps a row-major buffer whose length matches `shape`.
pub(crate) fn packed<T: Scalar>(data: Vec<T>, shape: &[usize]) -> Tensor<T> {
    debug_assert_eq!(data.len(), numel(shape));
    Tensor::from_parts(
        Storage::from_vec(data),
        Shape::from_slice(shape),
        contiguous_strides(shape, Layout::RowMajor),
        0,
        Layout::RowMajor,
    )
}

// =============================================================================
// Filled Tensors
// =============================================================================

/// Creates a tensor filled with zeros (`false` for `bool`).
///
/// # Example
/// ```rust,ignore
/// use tensorex_tensor::zeros;
/// let t = zeros::<f32>(&[2, 3]);
/// ```
#[must_use]
pub fn zeros<T: Scalar>(shape: &[usize]) -> Tensor<T> {
    Tensor::full(shape, T::default())
}

/// Creates a tensor filled with ones.
#[must_use]
pub fn ones<T: Numeric>(shape: &[usize]) -> Tensor<T> {
    Tensor::full(shape, T::ONE)
}

/// Creates a tensor filled with a specific value.
pub fn full<T: Scalar>(shape: &[usize], value: T) -> Tensor<T> {
    Tensor::full(shape, value)
}

/// Creates a tensor whose contents are unspecified.
///
/// Elements are zero-initialized in practice; callers must not rely on it.
#[must_use]
pub fn empty<T: Scalar>(shape: &[usize]) -> Tensor<T> {
    zeros(shape)
}

/// Creates a zero tensor with the shape and layout of `other`.
#[must_use]
pub fn zeros_like<T: Scalar>(other: &Tensor<T>) -> Tensor<T> {
    full_like(other, T::default())
}

/// Creates a tensor of ones with the shape and layout of `other`.
#[must_use]
pub fn ones_like<T: Numeric>(other: &Tensor<T>) -> Tensor<T> {
    full_like(other, T::ONE)
}

/// Creates a tensor with the shape and layout of `other`, filled with a value.
pub fn full_like<T: Scalar>(other: &Tensor<T>, value: T) -> Tensor<T> {
    Tensor::full_with_layout(other.shape(), value, other.layout())
}

// =============================================================================
// Identity, Diagonal and Triangular
// =============================================================================

/// Creates an `n x n` identity matrix.
#[must_use]
pub fn eye<T: Numeric>(n: usize) -> Tensor<T> {
    eye_offset(n, n, 0)
}

/// Creates a `rows x cols` matrix with ones on the `k`-th diagonal.
///
/// Positive `k` selects diagonals above the main one.
#[must_use]
pub fn eye_offset<T: Numeric>(rows: usize, cols: usize, k: isize) -> Tensor<T> {
    let mut data = vec![T::ZERO; rows * cols];
    for r in 0..rows {
        let c = r as isize + k;
        if (0..cols as isize).contains(&c) {
            data[r * cols + c as usize] = T::ONE;
        }
    }
    packed(data, &[rows, cols])
}

/// Lazy identity matrix of shape `[n, n]`, diagonal offset by `k`.
pub fn eye_lazy<T: Numeric>(
    n: usize,
    k: isize,
) -> Generator<T, impl Fn(&[usize]) -> T + Sync + Clone> {
    Generator::new(&[n, n], move |idx: &[usize]| {
        if idx[1] as isize - idx[0] as isize == k {
            T::ONE
        } else {
            T::ZERO
        }
    })
}

/// Builds a diagonal matrix from a 1-D tensor, or extracts the `k`-th
/// diagonal of a 2-D tensor as a copy.
pub fn diag<T: Scalar>(v: &Tensor<T>, k: isize) -> Result<Tensor<T>> {
    match v.ndim() {
        1 => {
            let values = v.to_vec();
            let n = values.len() + k.unsigned_abs();
            let mut data = vec![T::default(); n * n];
            let (row0, col0) = if k >= 0 { (0, k as usize) } else { (k.unsigned_abs(), 0) };
            for (i, value) in values.into_iter().enumerate() {
                data[(row0 + i) * n + col0 + i] = value;
            }
            Ok(packed(data, &[n, n]))
        }
        2 => Ok(v.diagonal(k)?.contiguous()),
        n => Err(Error::invalid_operation(format!(
            "diag() requires a 1-D or 2-D tensor, got {n} dimensions"
        ))),
    }
}

/// Keeps elements on and below the `k`-th diagonal of the last two axes.
pub fn tril<T: Scalar>(t: &Tensor<T>, k: isize) -> Result<Tensor<T>> {
    triangle(t, "tril", |row, col| col as isize - row as isize <= k)
}

/// Keeps elements on and above the `k`-th diagonal of the last two axes.
pub fn triu<T: Scalar>(t: &Tensor<T>, k: isize) -> Result<Tensor<T>> {
    triangle(t, "triu", |row, col| col as isize - row as isize >= k)
}

fn triangle<T: Scalar>(
    t: &Tensor<T>,
    op: &str,
    keep: impl Fn(usize, usize) -> bool,
) -> Result<Tensor<T>> {
    let nd = t.ndim();
    if nd < 2 {
        return Err(Error::invalid_operation(format!(
            "{op}() requires at least 2 dimensions, got {nd}"
        )));
    }

    let data = t
        .indexed_iter()
        .map(|(idx, value)| {
            if keep(idx[nd - 2], idx[nd - 1]) {
                value
            } else {
                T::default()
            }
        })
        .collect();
    Ok(packed(data, t.shape()))
}

// =============================================================================
// Ranges
// =============================================================================

fn range_len<T: Numeric>(start: T, stop: T, step: T) -> Result<usize> {
    if step == T::ZERO {
        return Err(Error::invalid_operation("arange step cannot be zero"));
    }
    let span = (stop.to_f64_lossy() - start.to_f64_lossy()) / step.to_f64_lossy();
    if !span.is_finite() {
        return Err(Error::invalid_operation(format!(
            "arange bounds produce a non-finite length: {start:?}..{stop:?} by {step:?}"
        )));
    }
    Ok(span.ceil().max(0.0) as usize)
}

/// Creates `start, start + step, ...` up to `stop` (exclusive).
///
/// Returns `Error::InvalidOperation` for a zero step.
pub fn try_arange<T: Numeric>(start: T, stop: T, step: T) -> Result<Tensor<T>> {
    let len = range_len(start, stop, step)?;
    let data = (0..len).map(|i| start + T::cast_from(i) * step).collect();
    Ok(packed(data, &[len]))
}

/// Creates `start, start + 1, ...` up to `stop` (exclusive).
pub fn arange<T: Numeric>(start: T, stop: T) -> Tensor<T> {
    let len = range_len(start, stop, T::ONE).unwrap_or(0);
    let data = (0..len).map(|i| start + T::cast_from(i)).collect();
    packed(data, &[len])
}

/// Creates `0, 1, ..., n - 1`.
#[must_use]
pub fn arange_n<T: Numeric>(n: usize) -> Tensor<T> {
    packed((0..n).map(T::cast_from).collect(), &[n])
}

/// Lazy counterpart of [`try_arange`].
pub fn arange_lazy<T: Numeric>(
    start: T,
    stop: T,
    step: T,
) -> Result<Generator<T, impl Fn(&[usize]) -> T + Sync + Clone>> {
    let len = range_len(start, stop, step)?;
    Ok(Generator::new(&[len], move |idx: &[usize]| {
        start + T::cast_from(idx[0]) * step
    }))
}

/// Creates `num` evenly spaced values from `start` to `stop`.
///
/// # Arguments
/// * `endpoint` - Whether `stop` is the last value
pub fn linspace<T: Float>(start: T, stop: T, num: usize, endpoint: bool) -> Tensor<T> {
    let divisor = if endpoint { num.saturating_sub(1) } else { num };
    let step = if divisor == 0 {
        T::ZERO
    } else {
        (stop - start) / T::cast_from(divisor)
    };

    let mut data: Vec<T> = (0..num).map(|i| start + step * T::cast_from(i)).collect();
    if endpoint && num > 1 {
        data[num - 1] = stop;
    }
    packed(data, &[num])
}

/// Creates `num` values spaced evenly on a log scale, `base^start` to
/// `base^stop`.
pub fn logspace<T: Float>(start: T, stop: T, num: usize, base: T, endpoint: bool) -> Tensor<T> {
    let exponents = linspace(start, stop, num, endpoint);
    exponents.apply_(|e| base.powf(e));
    exponents
}

// =============================================================================
// Grids and Generators
// =============================================================================

/// Returns coordinate matrices from 1-D coordinate vectors, with `xy`
/// indexing: the first two output axes are swapped relative to the inputs.
pub fn meshgrid<T: Scalar>(vectors: &[Tensor<T>]) -> Result<Vec<Tensor<T>>> {
    if let Some(bad) = vectors.iter().find(|v| v.ndim() != 1) {
        return Err(Error::invalid_operation(format!(
            "meshgrid() requires 1-D inputs, got shape {:?}",
            bad.shape()
        )));
    }

    let n = vectors.len();
    let axis_of = |i: usize| match (n >= 2, i) {
        (true, 0) => 1,
        (true, 1) => 0,
        _ => i,
    };

    let mut shape = vec![0; n];
    for (i, v) in vectors.iter().enumerate() {
        shape[axis_of(i)] = v.numel();
    }

    vectors
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let mut local = vec![1_isize; n];
            local[axis_of(i)] = v.numel() as isize;
            Ok(v.reshape(&local)?.broadcast_to(&shape)?.contiguous())
        })
        .collect()
}

/// Creates a tensor whose element at each multi-index is `f(index)`.
pub fn from_fn<T: Scalar>(shape: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Tensor<T> {
    let mut stepper = Stepper::new(shape, Layout::RowMajor);
    let mut data = Vec::with_capacity(numel(shape));
    while !stepper.is_done() {
        data.push(f(stepper.index()));
        stepper.step();
    }
    packed(data, shape)
}

/// Lazy counterpart of [`from_fn`].
pub fn from_fn_lazy<T, F>(shape: &[usize], f: F) -> Generator<T, F>
where
    T: Scalar,
    F: Fn(&[usize]) -> T + Sync,
{
    Generator::new(shape, f)
}

impl<T: Numeric> Tensor<T> {
    /// Creates a tensor of zeros in the configured default layout.
    #[must_use]
    pub fn zeros(shape: &[usize]) -> Self {
        zeros(shape)
    }

    /// Creates a tensor of ones in the configured default layout.
    #[must_use]
    pub fn ones(shape: &[usize]) -> Self {
        ones(shape)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expression;

    #[test]
    fn test_zeros_ones_full() {
        let z = zeros::<f32>(&[2, 3]);
        assert_eq!(z.shape(), &[2, 3]);
        assert!(z.iter().all(|v| v == 0.0));

        let o = ones::<i64>(&[4]);
        assert_eq!(o.to_vec(), vec![1; 4]);

        let f = full(&[2], true);
        assert_eq!(f.to_vec(), vec![true, true]);
        assert_eq!(zeros::<bool>(&[1]).to_vec(), vec![false]);
    }

    #[test]
    fn test_like_keeps_layout() {
        let cm = Tensor::<f64>::full_with_layout(&[2, 3], 1.0, Layout::ColumnMajor);
        let z = zeros_like(&cm);
        assert_eq!(z.layout(), Layout::ColumnMajor);
        assert_eq!(z.shape(), &[2, 3]);
        assert_eq!(ones_like(&cm).to_vec(), vec![1.0; 6]);
        assert_eq!(full_like(&cm, 7.0).get(&[1, 2]).unwrap(), 7.0);
    }

    #[test]
    fn test_eye_and_offset() {
        let i = eye::<i32>(3);
        assert_eq!(i.to_vec(), vec![1, 0, 0, 0, 1, 0, 0, 0, 1]);

        let upper = eye_offset::<i32>(2, 3, 1);
        assert_eq!(upper.to_vec(), vec![0, 1, 0, 0, 0, 1]);

        let lower = eye_offset::<i32>(3, 2, -1);
        assert_eq!(lower.to_vec(), vec![0, 0, 1, 0, 0, 1]);

        let lazy = eye_lazy::<f64>(3, 0).eval().unwrap();
        assert_eq!(lazy, eye::<f64>(3));
    }

    #[test]
    fn test_diag_build_and_extract() {
        let v = Tensor::from_vec(vec![1, 2], &[2]).unwrap();
        assert_eq!(diag(&v, 0).unwrap().to_vec(), vec![1, 0, 0, 2]);
        let shifted = diag(&v, 1).unwrap();
        assert_eq!(shifted.shape(), &[3, 3]);
        assert_eq!(shifted.to_vec(), vec![0, 1, 0, 0, 0, 2, 0, 0, 0]);

        let m = Tensor::from_vec((0..9).collect::<Vec<i32>>(), &[3, 3]).unwrap();
        assert_eq!(diag(&m, 0).unwrap().to_vec(), vec![0, 4, 8]);
        assert_eq!(diag(&m, -1).unwrap().to_vec(), vec![3, 7]);
    }

    #[test]
    fn test_tril_triu() {
        let m = Tensor::from_vec((1..=9).collect::<Vec<i32>>(), &[3, 3]).unwrap();
        assert_eq!(tril(&m, 0).unwrap().to_vec(), vec![1, 0, 0, 4, 5, 0, 7, 8, 9]);
        assert_eq!(triu(&m, 1).unwrap().to_vec(), vec![0, 2, 3, 0, 0, 6, 0, 0, 0]);
        assert!(tril(&Tensor::from_vec(vec![1], &[1]).unwrap(), 0).is_err());
    }

    #[test]
    fn test_arange_variants() {
        assert_eq!(arange(0_i32, 5).to_vec(), vec![0, 1, 2, 3, 4]);
        assert_eq!(arange(3_i32, 1).numel(), 0);
        assert_eq!(arange_n::<u8>(3).to_vec(), vec![0, 1, 2]);

        let stepped = try_arange(1.0, 2.0, 0.25).unwrap();
        assert_eq!(stepped.to_vec(), vec![1.0, 1.25, 1.5, 1.75]);

        let down = try_arange(5_i64, 0, -2).unwrap();
        assert_eq!(down.to_vec(), vec![5, 3, 1]);

        assert!(matches!(
            try_arange(0.0, 1.0, 0.0),
            Err(Error::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_arange_lazy_matches_eager() {
        let lazy = arange_lazy(0.0, 3.0, 0.5).unwrap();
        assert_eq!(lazy.eval().unwrap(), try_arange(0.0, 3.0, 0.5).unwrap());
        assert!(arange_lazy(0, 3, 0).is_err());
    }

    #[test]
    fn test_linspace() {
        let t = linspace(0.0, 1.0, 5, true);
        assert_eq!(t.to_vec(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);

        let open = linspace(0.0, 1.0, 4, false);
        assert_eq!(open.to_vec(), vec![0.0, 0.25, 0.5, 0.75]);

        assert_eq!(linspace(2.0, 5.0, 1, true).to_vec(), vec![2.0]);
        assert_eq!(linspace(2.0, 5.0, 0, true).numel(), 0);
    }

    #[test]
    fn test_logspace() {
        let t = logspace(0.0_f64, 2.0, 3, 10.0, true);
        let values = t.to_vec();
        assert!((values[0] - 1.0).abs() < 1e-12);
        assert!((values[1] - 10.0).abs() < 1e-12);
        assert!((values[2] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_meshgrid_xy() {
        let x = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
        let y = Tensor::from_vec(vec![10, 20], &[2]).unwrap();
        let grids = meshgrid(&[x, y]).unwrap();

        assert_eq!(grids[0].shape(), &[2, 3]);
        assert_eq!(grids[0].to_vec(), vec![1, 2, 3, 1, 2, 3]);
        assert_eq!(grids[1].to_vec(), vec![10, 10, 10, 20, 20, 20]);
    }

    #[test]
    fn test_from_fn() {
        let t = from_fn(&[2, 3], |idx| (idx[0] * 10 + idx[1]) as i32);
        assert_eq!(t.to_vec(), vec![0, 1, 2, 10, 11, 12]);

        let lazy = from_fn_lazy(&[2, 2], |idx: &[usize]| idx[0] == idx[1]);
        assert_eq!(lazy.eval().unwrap().to_vec(), vec![true, false, false, true]);
    }
}
