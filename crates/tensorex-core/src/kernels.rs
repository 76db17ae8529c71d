//! CPU Kernels - Slice-Level Numeric Routines
//!
//! Provides the flat-slice building blocks used by the tensor layer:
//! parallel fills, reductions, dot products and matrix multiplication.
//!
//! # Key Features
//! - Multi-threaded execution via rayon above a configurable threshold
//! - matrixmultiply crate for optimized GEMM on `f32`/`f64`
//! - Tiled fallback GEMM for integer element types
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::dtype::{Numeric, Scalar};

/// Elements handed to each rayon task by the parallel fills.
const CHUNK_SIZE: usize = 1024;

// =============================================================================
// CPU Kernels Struct
// =============================================================================

/// Namespace for CPU slice kernels.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuKernels;

// =============================================================================
// Fill Operations
// =============================================================================

impl CpuKernels {
    /// Fills a slice with a value.
    pub fn fill<T: Scalar>(dst: &mut [T], value: T) {
        for elem in dst.iter_mut() {
            *elem = value;
        }
    }

    /// Fills `dst[i] = f(i)`, splitting the work across threads when the
    /// slice reaches the configured parallel threshold.
    pub fn fill_indexed<T, F>(dst: &mut [T], f: F)
    where
        T: Scalar,
        F: Fn(usize) -> T + Sync,
    {
        if dst.len() >= EngineConfig::current().parallel_threshold {
            dst.par_chunks_mut(CHUNK_SIZE)
                .enumerate()
                .for_each(|(chunk, out)| {
                    let base = chunk * CHUNK_SIZE;
                    for (i, elem) in out.iter_mut().enumerate() {
                        *elem = f(base + i);
                    }
                });
        } else {
            for (i, elem) in dst.iter_mut().enumerate() {
                *elem = f(i);
            }
        }
    }

    /// Calls `f(start, block)` for consecutive blocks of `dst`, where
    /// `start` is the block's position in `dst`. Blocks go to worker threads
    /// when the slice reaches the configured parallel threshold.
    pub fn fill_chunks<T, F>(dst: &mut [T], f: F)
    where
        T: Scalar,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if dst.len() >= EngineConfig::current().parallel_threshold {
            dst.par_chunks_mut(CHUNK_SIZE)
                .enumerate()
                .for_each(|(chunk, out)| f(chunk * CHUNK_SIZE, out));
        } else {
            for (chunk, out) in dst.chunks_mut(CHUNK_SIZE).enumerate() {
                f(chunk * CHUNK_SIZE, out);
            }
        }
    }

    /// Block length used by [`CpuKernels::fill_chunks`].
    #[must_use]
    pub const fn chunk_size() -> usize {
        CHUNK_SIZE
    }

    /// Returns true if a slice of `len` elements would be processed in
    /// parallel.
    #[must_use]
    pub fn is_parallel(len: usize) -> bool {
        len >= EngineConfig::current().parallel_threshold
    }
}

// =============================================================================
// Reduction Operations
// =============================================================================

impl CpuKernels {
    /// Computes the sum of all elements.
    pub fn sum<T: Numeric>(a: &[T]) -> T {
        let mut result = T::ZERO;
        for &val in a {
            result = result + val;
        }
        result
    }

    /// Computes the product of all elements.
    pub fn prod<T: Numeric>(a: &[T]) -> T {
        let mut result = T::ONE;
        for &val in a {
            result = result * val;
        }
        result
    }

    /// Finds the maximum element. NaN entries are skipped.
    pub fn max<T: Numeric>(a: &[T]) -> Option<T> {
        Self::argmax(a).map(|i| a[i])
    }

    /// Finds the minimum element. NaN entries are skipped.
    pub fn min<T: Numeric>(a: &[T]) -> Option<T> {
        Self::argmin(a).map(|i| a[i])
    }

    /// Finds the index of the first maximum element.
    pub fn argmax<T: Numeric>(a: &[T]) -> Option<usize> {
        Self::arg_best(a, |candidate, best| candidate > best)
    }

    /// Finds the index of the first minimum element.
    pub fn argmin<T: Numeric>(a: &[T]) -> Option<usize> {
        Self::arg_best(a, |candidate, best| candidate < best)
    }

    fn arg_best<T: Numeric>(a: &[T], better: impl Fn(T, T) -> bool) -> Option<usize> {
        // NaN is unordered against itself.
        let mut iter = a
            .iter()
            .enumerate()
            .filter(|(_, v)| v.partial_cmp(v).is_some());
        let (mut best_idx, mut best_val) = match iter.next() {
            Some((i, &v)) => (i, v),
            None => return if a.is_empty() { None } else { Some(0) },
        };
        for (i, &val) in iter {
            if better(val, best_val) {
                best_val = val;
                best_idx = i;
            }
        }
        Some(best_idx)
    }

    /// Computes the dot product of two equal-length slices.
    pub fn dot<T: Numeric>(a: &[T], b: &[T]) -> T {
        debug_assert_eq!(a.len(), b.len());
        let mut result = T::ZERO;
        for (&x, &y) in a.iter().zip(b.iter()) {
            result = result + x * y;
        }
        result
    }
}

// =============================================================================
// Matrix Operations
// =============================================================================

impl CpuKernels {
    /// Performs matrix multiplication: C = A @ B.
    ///
    /// A is (m x k), B is (k x n), C is (m x n), all row-major.
    /// Uses optimized GEMM from matrixmultiply for f32/f64 and a tiled
    /// implementation for other types.
    pub fn matmul<T: Numeric>(c: &mut [T], a: &[T], b: &[T], m: usize, n: usize, k: usize) {
        debug_assert_eq!(a.len(), m * k);
        debug_assert_eq!(b.len(), k * n);
        debug_assert_eq!(c.len(), m * n);

        use std::any::TypeId;
        if TypeId::of::<T>() == TypeId::of::<f32>() {
            // SAFETY: T is f32, so the slice casts preserve layout and length.
            unsafe {
                let a_f32: &[f32] = &*(a as *const [T] as *const [f32]);
                let b_f32: &[f32] = &*(b as *const [T] as *const [f32]);
                let c_f32: &mut [f32] = &mut *(c as *mut [T] as *mut [f32]);
                Self::sgemm(c_f32, a_f32, b_f32, m, n, k);
            }
            return;
        }

        if TypeId::of::<T>() == TypeId::of::<f64>() {
            // SAFETY: T is f64, so the slice casts preserve layout and length.
            unsafe {
                let a_f64: &[f64] = &*(a as *const [T] as *const [f64]);
                let b_f64: &[f64] = &*(b as *const [T] as *const [f64]);
                let c_f64: &mut [f64] = &mut *(c as *mut [T] as *mut [f64]);
                Self::dgemm(c_f64, a_f64, b_f64, m, n, k);
            }
            return;
        }

        const BLOCK_SIZE: usize = 64;

        Self::fill(c, T::ZERO);
        for i0 in (0..m).step_by(BLOCK_SIZE) {
            let i_end = (i0 + BLOCK_SIZE).min(m);
            for p0 in (0..k).step_by(BLOCK_SIZE) {
                let p_end = (p0 + BLOCK_SIZE).min(k);
                for j0 in (0..n).step_by(BLOCK_SIZE) {
                    let j_end = (j0 + BLOCK_SIZE).min(n);
                    for i in i0..i_end {
                        for p in p0..p_end {
                            let a_val = a[i * k + p];
                            for j in j0..j_end {
                                c[i * n + j] = c[i * n + j] + a_val * b[p * n + j];
                            }
                        }
                    }
                }
            }
        }
    }

    fn sgemm(c: &mut [f32], a: &[f32], b: &[f32], m: usize, n: usize, k: usize) {
        if m == 0 || n == 0 {
            return;
        }
        // SAFETY: the slices hold m*k, k*n and m*n elements with the
        // row-major strides passed below.
        unsafe {
            matrixmultiply::sgemm(
                m,
                k,
                n,
                1.0,
                a.as_ptr(),
                k as isize,
                1,
                b.as_ptr(),
                n as isize,
                1,
                0.0,
                c.as_mut_ptr(),
                n as isize,
                1,
            );
        }
    }

    fn dgemm(c: &mut [f64], a: &[f64], b: &[f64], m: usize, n: usize, k: usize) {
        if m == 0 || n == 0 {
            return;
        }
        // SAFETY: the slices hold m*k, k*n and m*n elements with the
        // row-major strides passed below.
        unsafe {
            matrixmultiply::dgemm(
                m,
                k,
                n,
                1.0,
                a.as_ptr(),
                k as isize,
                1,
                b.as_ptr(),
                n as isize,
                1,
                0.0,
                c.as_mut_ptr(),
                n as isize,
                1,
            );
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_chunks_covers_every_block() {
        for len in [0usize, 5, CHUNK_SIZE + 3, 20_000] {
            let mut dst = vec![0u64; len];
            CpuKernels::fill_chunks(&mut dst, |start, block| {
                assert!(block.len() <= CHUNK_SIZE);
                for (k, v) in block.iter_mut().enumerate() {
                    *v = (start + k) as u64;
                }
            });
            assert!(dst.iter().enumerate().all(|(i, &v)| v == i as u64));
        }
    }

    #[test]
    fn test_fill_indexed_serial_and_parallel() {
        let mut small = vec![0u64; 10];
        CpuKernels::fill_indexed(&mut small, |i| i as u64 * 2);
        assert_eq!(small[9], 18);

        let mut large = vec![0u64; 10_000];
        CpuKernels::fill_indexed(&mut large, |i| i as u64);
        assert!(large.iter().enumerate().all(|(i, &v)| v == i as u64));
    }

    #[test]
    fn test_sum_prod() {
        let a = [1.0_f32, 2.0, 3.0, 4.0];
        assert_eq!(CpuKernels::sum(&a), 10.0);
        assert_eq!(CpuKernels::prod(&a), 24.0);
        assert_eq!(CpuKernels::sum::<i32>(&[]), 0);
    }

    #[test]
    fn test_max_min_skip_nan() {
        let a = [f64::NAN, 5.0, 3.0, 7.0, 1.0];
        assert_eq!(CpuKernels::max(&a), Some(7.0));
        assert_eq!(CpuKernels::min(&a), Some(1.0));
        assert_eq!(CpuKernels::argmax(&a), Some(3));
        assert_eq!(CpuKernels::argmin::<f32>(&[]), None);
    }

    #[test]
    fn test_argmax_first_occurrence() {
        assert_eq!(CpuKernels::argmax(&[1, 4, 4, 2]), Some(1));
    }

    #[test]
    fn test_dot() {
        assert_eq!(CpuKernels::dot(&[1, 2, 3], &[4, 5, 6]), 32);
    }

    #[test]
    fn test_matmul_float_and_int() {
        // [[1, 2], [3, 4]] @ [[5, 6], [7, 8]] = [[19, 22], [43, 50]]
        let mut c = [0.0_f64; 4];
        CpuKernels::matmul(&mut c, &[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0, 8.0], 2, 2, 2);
        assert_eq!(c, [19.0, 22.0, 43.0, 50.0]);

        let mut ci = [0i64; 4];
        CpuKernels::matmul(&mut ci, &[1, 2, 3, 4], &[5, 6, 7, 8], 2, 2, 2);
        assert_eq!(ci, [19, 22, 43, 50]);
    }
}
