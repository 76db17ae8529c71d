//! Linear Algebra - Products and Traces
//!
//! Matrix products on the CPU kernels. Batched products broadcast their
//! leading dimensions.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use rayon::prelude::*;

use tensorex_core::dtype::Numeric;
use tensorex_core::error::{Error, Result};
use tensorex_core::CpuKernels;

use crate::creation::packed;
use crate::shape::{broadcast_shape, numel};
use crate::tensor::Tensor;

// =============================================================================
// Products
// =============================================================================

impl<T: Numeric> Tensor<T> {
    /// Matrix multiplication with batching support.
    ///
    /// - 2D @ 2D: `[m, k] @ [k, n] -> [m, n]`
    /// - ND @ ND: `[..., m, k] @ [..., k, n] -> [..., m, n]`, the leading
    ///   dimensions broadcast against each other
    pub fn matmul(&self, other: &Self) -> Result<Self> {
        if self.ndim() < 2 || other.ndim() < 2 {
            return Err(Error::invalid_operation("matmul requires at least 2D tensors"));
        }

        let m = self.shape()[self.ndim() - 2];
        let k1 = self.shape()[self.ndim() - 1];
        let k2 = other.shape()[other.ndim() - 2];
        let n = other.shape()[other.ndim() - 1];

        if k1 != k2 {
            return Err(Error::invalid_operation(format!(
                "matmul inner dimensions must match: {k1} vs {k2}"
            )));
        }

        if self.ndim() == 2 && other.ndim() == 2 {
            let a_data = self.to_vec();
            let b_data = other.to_vec();
            let mut c_data = vec![T::ZERO; m * n];
            CpuKernels::matmul(&mut c_data, &a_data, &b_data, m, n, k1);
            return Ok(packed(c_data, &[m, n]));
        }

        let batch = broadcast_shape(
            &self.shape()[..self.ndim() - 2],
            &other.shape()[..other.ndim() - 2],
        )?;
        let with_tail = |r: usize, c: usize| {
            let mut shape = batch.to_vec();
            shape.push(r);
            shape.push(c);
            shape
        };

        let a_data = self.broadcast_to(&with_tail(m, k1))?.to_vec();
        let b_data = other.broadcast_to(&with_tail(k1, n))?.to_vec();
        let out_shape = with_tail(m, n);
        let (a_stride, b_stride, c_stride) = (m * k1, k1 * n, m * n);

        let mut c_data = vec![T::ZERO; numel(&out_shape)];
        if c_stride > 0 {
            let per_batch = |(i, c): (usize, &mut [T])| {
                let a = &a_data[i * a_stride..(i + 1) * a_stride];
                let b = &b_data[i * b_stride..(i + 1) * b_stride];
                CpuKernels::matmul(c, a, b, m, n, k1);
            };
            if CpuKernels::is_parallel(c_data.len() * k1.max(1)) {
                tracing::trace!(batches = c_data.len() / c_stride, "parallel batched matmul");
                c_data.par_chunks_mut(c_stride).enumerate().for_each(per_batch);
            } else {
                c_data.chunks_mut(c_stride).enumerate().for_each(per_batch);
            }
        }

        Ok(packed(c_data, &out_shape))
    }

    /// Dot product for 1D tensors, as a 0-d tensor.
    pub fn dot(&self, other: &Self) -> Result<Self> {
        if self.ndim() != 1 || other.ndim() != 1 {
            return Err(Error::invalid_operation("dot requires 1D tensors"));
        }

        if self.shape()[0] != other.shape()[0] {
            return Err(Error::shape_mismatch(self.shape(), other.shape()));
        }

        let result = CpuKernels::dot(&self.to_vec(), &other.to_vec());
        Ok(Self::scalar(result))
    }

    /// Sum of the main diagonal of a 2-D tensor.
    pub fn trace(&self) -> Result<T> {
        Ok(self.diagonal(0)?.sum_all())
    }
}

/// Outer product of the flattenings of `a` and `b`: `[a.numel(), b.numel()]`.
pub fn outer<T: Numeric>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    let lhs = a.to_vec();
    let rhs = b.to_vec();
    let data = lhs
        .iter()
        .flat_map(|&x| rhs.iter().map(move |&y| x * y))
        .collect();
    packed(data, &[lhs.len(), rhs.len()])
}

/// Functional form of [`Tensor::matmul`].
pub fn matmul<T: Numeric>(a: &Tensor<T>, b: &Tensor<T>) -> Result<Tensor<T>> {
    a.matmul(b)
}

/// Functional form of [`Tensor::dot`], returning the scalar.
pub fn dot<T: Numeric>(a: &Tensor<T>, b: &Tensor<T>) -> Result<T> {
    a.dot(b)?.item()
}

/// Functional form of [`Tensor::trace`].
pub fn trace<T: Numeric>(t: &Tensor<T>) -> Result<T> {
    t.trace()
}

// =============================================================================
// Tests
// =============================================================================
