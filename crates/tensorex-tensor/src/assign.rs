//! Assignment - Evaluating Expressions Into Containers
//!
//! Every expression is evaluated into a temporary row-major buffer and then
//! written into the destination through its strides, so an expression may
//! freely read the tensor it is assigned to.
//!
//! Two evaluation paths exist. When every operand has the target shape and
//! is row-major packed, elements are read with a flat index and, above the
//! configured parallel threshold, filled in parallel chunks. Otherwise a
//! multi-index stepper walks the target shape like an odometer. Both paths
//! hand the expression one block of positions at a time, so each tensor
//! operand locks its storage once per block.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use tensorex_core::error::{Error, Result};
use tensorex_core::{CpuKernels, Layout, Scalar};

use crate::expr::{Expression, IntoExpression};
use crate::iter::Stepper;
use crate::shape::{numel, Shape};
use crate::tensor::Tensor;

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates `expr` over `shape` into a row-major buffer.
pub(crate) fn evaluate<E: Expression>(expr: &E, shape: &[usize]) -> Vec<E::Elem> {
    let total = numel(shape);
    let mut buffer = vec![E::Elem::default(); total];

    if expr.linear_access(shape) {
        tracing::trace!(
            path = "linear",
            elements = total,
            parallel = CpuKernels::is_parallel(total),
            "evaluating expression"
        );
        CpuKernels::fill_chunks(&mut buffer, |start, block| expr.fill_linear(start, block));
    } else {
        tracing::trace!(path = "stepper", elements = total, "evaluating expression");
        let rank = shape.len();
        let mut stepper = Stepper::new(shape, Layout::RowMajor);
        let mut indices = Vec::with_capacity(rank * CpuKernels::chunk_size());
        for block in buffer.chunks_mut(CpuKernels::chunk_size()) {
            indices.clear();
            for _ in 0..block.len() {
                indices.extend_from_slice(stepper.index());
                stepper.step();
            }
            expr.fill_at(rank, &indices, block);
        }
    }

    buffer
}

/// Packs a row-major buffer into a new tensor with the given layout.
fn pack<T: Scalar>(data: Vec<T>, shape: Shape, layout: Layout) -> Result<Tensor<T>> {
    let row_major = Tensor::from_vec(data, &shape)?;
    Ok(match layout {
        Layout::RowMajor => row_major,
        Layout::ColumnMajor => row_major.to_layout(Layout::ColumnMajor),
    })
}

/// Evaluates an expression into a fresh tensor with the given layout.
pub(crate) fn eval_expr<E: Expression>(expr: &E, layout: Layout) -> Result<Tensor<E::Elem>> {
    let shape = expr.try_shape()?;
    let data = evaluate(expr, &shape);
    pack(data, shape, layout)
}

/// Evaluates an expression into a fresh row-major tensor.
pub fn eval<X: IntoExpression>(expr: X) -> Result<Tensor<X::Elem>> {
    eval_expr(&expr.into_expr(), Layout::RowMajor)
}

/// Evaluates an expression into a fresh tensor with the given layout.
pub fn eval_with_layout<X: IntoExpression>(expr: X, layout: Layout) -> Result<Tensor<X::Elem>> {
    eval_expr(&expr.into_expr(), layout)
}

// =============================================================================
// Assignment
// =============================================================================

/// Assigns an expression to a tensor.
///
/// If the expression's shape differs from the destination's, a tensor that
/// owns its buffer is resized to a new packed buffer in its layout; any
/// other tensor (a view, a broadcast) yields `Error::ShapeMismatch`.
pub fn assign<X: IntoExpression>(dst: &mut Tensor<X::Elem>, expr: X) -> Result<()> {
    let expr = expr.into_expr();
    let shape = expr.try_shape()?;
    let data = evaluate(&expr, &shape);

    if shape.as_slice() == dst.shape() {
        dst.write_logical(&data);
        return Ok(());
    }

    if !dst.owns_buffer() {
        return Err(Error::shape_mismatch(dst.shape(), &shape));
    }

    tracing::debug!(from = ?dst.shape(), to = ?shape.as_slice(), "resizing destination");
    let layout = dst.layout();
    let resized = pack(data, shape, layout)?;
    *dst = resized;
    Ok(())
}

/// Assigns an expression through a tensor handle without resizing.
///
/// Used for views: the elements are written into the shared storage.
pub fn assign_view<X: IntoExpression>(dst: &Tensor<X::Elem>, expr: X) -> Result<()> {
    let expr = expr.into_expr();
    let shape = expr.try_shape()?;
    if shape.as_slice() != dst.shape() {
        return Err(Error::shape_mismatch(dst.shape(), &shape));
    }

    let data = evaluate(&expr, &shape);
    dst.write_logical(&data);
    Ok(())
}

/// Evaluates an expression and broadcasts the result into `dst`.
///
/// The expression must broadcast to `dst`'s shape.
pub fn assign_broadcast<X: IntoExpression>(dst: &Tensor<X::Elem>, expr: X) -> Result<()> {
    let expr = expr.into_expr();
    assign_view(dst, expr.broadcast(dst.shape()))
}

impl<T: Scalar> Tensor<T> {
    /// Assigns an expression, resizing when this tensor owns its buffer.
    pub fn assign<X: IntoExpression<Elem = T>>(&mut self, expr: X) -> Result<()> {
        assign(self, expr)
    }

    /// Writes an expression of the same shape into this tensor's elements.
    pub fn assign_from<X: IntoExpression<Elem = T>>(&self, expr: X) -> Result<()> {
        assign_view(self, expr)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Binary, BinaryFn, ScalarExpr};

    fn add(a: f64, b: f64) -> f64 {
        a + b
    }

    #[test]
    fn test_eval_linear_and_stepper_agree() {
        let a = Tensor::from_vec((0..6).map(f64::from).collect(), &[2, 3]).unwrap();
        let b = Tensor::from_vec(vec![10.0, 20.0, 30.0], &[3]).unwrap();

        let same = eval(Binary::new(a.clone(), a.clone(), add as BinaryFn<f64, f64, f64>)).unwrap();
        assert_eq!(same.to_vec(), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);

        let broadcast = eval(Binary::new(a, b, add as BinaryFn<f64, f64, f64>)).unwrap();
        assert_eq!(broadcast.to_vec(), vec![10.0, 21.0, 32.0, 13.0, 24.0, 35.0]);
    }

    #[test]
    fn test_parallel_linear_path() {
        let n = 20_000;
        let a = Tensor::from_vec((0..n).map(|i| i as f64).collect(), &[n]).unwrap();
        let out = eval(Binary::new(a, ScalarExpr(1.0), add as BinaryFn<f64, f64, f64>)).unwrap();
        assert_eq!(out.get(&[n - 1]).unwrap(), n as f64);
        assert_eq!(out.get(&[0]).unwrap(), 1.0);
    }

    #[test]
    fn test_stepper_path_across_blocks() {
        let base = Tensor::from_vec((0..2400).map(f64::from).collect(), &[40, 60]).unwrap();
        let view = base.transpose();
        let out = eval(Binary::new(view.clone(), ScalarExpr(0.5), add as BinaryFn<f64, f64, f64>))
            .unwrap();
        assert_eq!(out.shape(), &[60, 40]);
        let expected: Vec<f64> = view.to_vec().into_iter().map(|v| v + 0.5).collect();
        assert_eq!(out.to_vec(), expected);
    }

    #[test]
    fn test_parallel_linear_path_on_offset_view() {
        let base = Tensor::from_vec((0..30_000).map(|i| i as f64).collect(), &[3, 10_000]).unwrap();
        let row = base.slice_dim0(1, 3).unwrap();
        let out = eval(Binary::new(row.clone(), row, add as BinaryFn<f64, f64, f64>)).unwrap();
        assert_eq!(out.shape(), &[2, 10_000]);
        assert_eq!(out.get(&[0, 0]).unwrap(), 20_000.0);
        assert_eq!(out.get(&[1, 9_999]).unwrap(), 2.0 * 29_999.0);
    }

    #[test]
    fn test_assign_resizes_owned_buffer() {
        let mut dst = Tensor::<f64>::from_vec(vec![0.0; 2], &[2]).unwrap();
        let src = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        assign(&mut dst, &src).unwrap();
        assert_eq!(dst.shape(), &[2, 2]);
        assert_eq!(dst.to_vec(), src.to_vec());
        assert!(!dst.shares_storage(&src));
    }

    #[test]
    fn test_assign_keeps_column_major_layout_on_resize() {
        let mut dst = Tensor::<i32>::full_with_layout(&[1], 0, Layout::ColumnMajor);
        let src = Tensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        dst.assign(&src).unwrap();
        assert_eq!(dst.layout(), Layout::ColumnMajor);
        assert_eq!(dst.strides(), &[1, 2]);
        assert_eq!(dst.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_assign_view_rejects_shape_change() {
        let base = Tensor::<f64>::from_vec(vec![0.0; 6], &[2, 3]).unwrap();
        let mut view = base.transpose();
        let src = Tensor::from_vec(vec![1.0; 4], &[4]).unwrap();

        assert!(matches!(
            assign(&mut view, &src),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(view.assign_from(&src).is_err());
    }

    #[test]
    fn test_assign_is_alias_safe() {
        // Reversing through an aliasing view needs the temporary buffer.
        let t = Tensor::from_vec(vec![1, 2, 3, 4], &[4]).unwrap();
        let reversed = t.with_geometry(smallvec::smallvec![4], smallvec::smallvec![-1], 3);
        t.assign_from(&reversed).unwrap();
        assert_eq!(t.to_vec(), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_assign_broadcast() {
        let dst = Tensor::<u8>::from_vec(vec![0; 6], &[2, 3]).unwrap();
        assign_broadcast(&dst, 7u8).unwrap();
        assert!(dst.iter().all(|v| v == 7));

        let row = Tensor::from_vec(vec![1u8, 2, 3], &[3]).unwrap();
        assign_broadcast(&dst, &row).unwrap();
        assert_eq!(dst.to_vec(), vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_eval_with_layout() {
        let src = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let out = eval_with_layout(&src, Layout::ColumnMajor).unwrap();
        assert_eq!(out.layout(), Layout::ColumnMajor);
        assert_eq!(out.to_vec(), vec![1, 2, 3, 4]);
        assert_eq!(out.to_vec_in(Layout::ColumnMajor), vec![1, 3, 2, 4]);
    }
}
