//! Operators - Lazy Arithmetic Overloads
//!
//! The `+ - * / %` and unary `-` operators build lazy [`Binary`] and
//! [`Unary`] nodes. They are implemented for tensors, tensor references and
//! every expression node, with any [`IntoExpression`] right-hand side of the
//! same element type, and with `f32`, `f64`, `i32` and `i64` scalars on the
//! left. Compound assignment operators evaluate immediately.
//!
//! # Example
//! ```rust
//! use tensorex_tensor::{Expression, Tensor};
//!
//! let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
//! let b = Tensor::from_vec(vec![10.0], &[1]).unwrap();
//!
//! let c = (&a + &b) * 2.0;
//! assert_eq!(c.eval().unwrap().to_vec(), vec![22.0, 24.0, 26.0]);
//! ```
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use core::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};

use tensorex_core::dtype::{Numeric, Scalar};
use tensorex_core::error::Result;

use crate::assign::assign_view;
use crate::expr::{
    Binary, BinaryFn, Broadcast, Generator, IntoExpression, ScalarExpr, Ternary, Unary, UnaryFn,
};
use crate::index::IndexView;
use crate::tensor::Tensor;

pub mod compare;

pub use compare::{
    equal, greater, greater_equal, less, less_equal, logical_and, logical_not, logical_or,
    logical_xor, not_equal, where_,
};

// =============================================================================
// Element Functions
// =============================================================================

fn add_fn<T: Numeric>(a: T, b: T) -> T {
    a + b
}

fn sub_fn<T: Numeric>(a: T, b: T) -> T {
    a - b
}

fn mul_fn<T: Numeric>(a: T, b: T) -> T {
    a * b
}

fn div_fn<T: Numeric>(a: T, b: T) -> T {
    a / b
}

fn rem_fn<T: Numeric>(a: T, b: T) -> T {
    a % b
}

fn neg_fn<T: Numeric + Neg<Output = T>>(a: T) -> T {
    -a
}

/// Node produced by arithmetic between `L` and `R`.
pub type ArithExpr<L, R> = Binary<
    <L as IntoExpression>::Expr,
    <R as IntoExpression>::Expr,
    BinaryFn<<L as IntoExpression>::Elem, <L as IntoExpression>::Elem, <L as IntoExpression>::Elem>,
>;

/// Node produced by negating `E`.
pub type NegExpr<E> = Unary<
    <E as IntoExpression>::Expr,
    UnaryFn<<E as IntoExpression>::Elem, <E as IntoExpression>::Elem>,
>;

fn arith<L, R>(lhs: L, rhs: R, f: BinaryFn<L::Elem, L::Elem, L::Elem>) -> ArithExpr<L, R>
where
    L: IntoExpression,
    R: IntoExpression<Elem = L::Elem>,
{
    Binary::new(lhs.into_expr(), rhs.into_expr(), f)
}

fn negate<E>(expr: E) -> NegExpr<E>
where
    E: IntoExpression,
    E::Elem: Numeric + Neg<Output = E::Elem>,
{
    let f: UnaryFn<E::Elem, E::Elem> = neg_fn;
    Unary::new(expr.into_expr(), f)
}

// =============================================================================
// Operator Impls
// =============================================================================

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $func:ident, [$($gen:tt)*], $lhs:ty) => {
        impl<$($gen)* Rhs> $trait<Rhs> for $lhs
        where
            $lhs: IntoExpression,
            <$lhs as IntoExpression>::Elem: Numeric,
            Rhs: IntoExpression<Elem = <$lhs as IntoExpression>::Elem>,
        {
            type Output = ArithExpr<$lhs, Rhs>;

            fn $method(self, rhs: Rhs) -> Self::Output {
                arith(self, rhs, $func)
            }
        }
    };
}

macro_rules! impl_scalar_lhs_operator {
    (@one $trait:ident, $method:ident, $func:ident, [$($gen:tt)*], $rhs:ty, $scalar:ty) => {
        impl<$($gen)*> $trait<$rhs> for $scalar
        where
            $rhs: IntoExpression<Elem = $scalar>,
        {
            type Output = ArithExpr<$scalar, $rhs>;

            fn $method(self, rhs: $rhs) -> Self::Output {
                arith(self, rhs, $func)
            }
        }
    };
    ($trait:ident, $method:ident, $func:ident, $gen:tt, $rhs:ty, $($scalar:ty),*) => {
        $(
            impl_scalar_lhs_operator!(@one $trait, $method, $func, $gen, $rhs, $scalar);
        )*
    };
}

macro_rules! impl_expression_operators {
    ([$($gen:tt)*], $node:ty) => {
        impl_binary_operator!(Add, add, add_fn, [$($gen)*], $node);
        impl_binary_operator!(Sub, sub, sub_fn, [$($gen)*], $node);
        impl_binary_operator!(Mul, mul, mul_fn, [$($gen)*], $node);
        impl_binary_operator!(Div, div, div_fn, [$($gen)*], $node);
        impl_binary_operator!(Rem, rem, rem_fn, [$($gen)*], $node);

        impl<$($gen)*> Neg for $node
        where
            $node: IntoExpression,
            <$node as IntoExpression>::Elem: Numeric + Neg<Output = <$node as IntoExpression>::Elem>,
        {
            type Output = NegExpr<$node>;

            fn neg(self) -> Self::Output {
                negate(self)
            }
        }

        impl_scalar_lhs_operator!(Add, add, add_fn, [$($gen)*], $node, f32, f64, i32, i64);
        impl_scalar_lhs_operator!(Sub, sub, sub_fn, [$($gen)*], $node, f32, f64, i32, i64);
        impl_scalar_lhs_operator!(Mul, mul, mul_fn, [$($gen)*], $node, f32, f64, i32, i64);
        impl_scalar_lhs_operator!(Div, div, div_fn, [$($gen)*], $node, f32, f64, i32, i64);
        impl_scalar_lhs_operator!(Rem, rem, rem_fn, [$($gen)*], $node, f32, f64, i32, i64);
    };
}

impl_expression_operators!([T: Scalar,], Tensor<T>);
impl_expression_operators!(['a, T: Scalar,], &'a Tensor<T>);
impl_expression_operators!([T: Scalar,], ScalarExpr<T>);
impl_expression_operators!([E, F,], Unary<E, F>);
impl_expression_operators!([L, R, F,], Binary<L, R, F>);
impl_expression_operators!([A, B, C, F,], Ternary<A, B, C, F>);
impl_expression_operators!([E,], Broadcast<E>);
impl_expression_operators!([T, F,], Generator<T, F>);
impl_expression_operators!([T: Scalar,], IndexView<T>);

// =============================================================================
// Compound Assignment
// =============================================================================

impl<T: Numeric> Tensor<T> {
    fn compound<R>(&self, rhs: R, f: BinaryFn<T, T, T>) -> Result<()>
    where
        R: IntoExpression<Elem = T>,
    {
        let expr = Binary::new(self.clone(), rhs.into_expr(), f);
        assign_view(self, expr)
    }

    /// `self += rhs`, failing if the result's shape differs from `self`'s.
    pub fn try_add_assign<R: IntoExpression<Elem = T>>(&self, rhs: R) -> Result<()> {
        self.compound(rhs, add_fn)
    }

    /// `self -= rhs`, failing if the result's shape differs from `self`'s.
    pub fn try_sub_assign<R: IntoExpression<Elem = T>>(&self, rhs: R) -> Result<()> {
        self.compound(rhs, sub_fn)
    }

    /// `self *= rhs`, failing if the result's shape differs from `self`'s.
    pub fn try_mul_assign<R: IntoExpression<Elem = T>>(&self, rhs: R) -> Result<()> {
        self.compound(rhs, mul_fn)
    }

    /// `self /= rhs`, failing if the result's shape differs from `self`'s.
    pub fn try_div_assign<R: IntoExpression<Elem = T>>(&self, rhs: R) -> Result<()> {
        self.compound(rhs, div_fn)
    }

    /// `self %= rhs`, failing if the result's shape differs from `self`'s.
    pub fn try_rem_assign<R: IntoExpression<Elem = T>>(&self, rhs: R) -> Result<()> {
        self.compound(rhs, rem_fn)
    }
}

macro_rules! impl_compound_assign {
    ($trait:ident, $method:ident, $try_method:ident) => {
        impl<T, R> $trait<R> for Tensor<T>
        where
            T: Numeric,
            R: IntoExpression<Elem = T>,
        {
            fn $method(&mut self, rhs: R) {
                if let Err(err) = self.$try_method(rhs) {
                    panic!("{err}");
                }
            }
        }
    };
}

impl_compound_assign!(AddAssign, add_assign, try_add_assign);
impl_compound_assign!(SubAssign, sub_assign, try_sub_assign);
impl_compound_assign!(MulAssign, mul_assign, try_mul_assign);
impl_compound_assign!(DivAssign, div_assign, try_div_assign);
impl_compound_assign!(RemAssign, rem_assign, try_rem_assign);

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expression;

    fn vector() -> Tensor<f64> {
        Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap()
    }

    #[test]
    fn test_arithmetic() {
        let a = vector();
        let b = Tensor::from_vec(vec![4.0, 5.0, 6.0], &[3]).unwrap();

        assert_eq!((&a + &b).eval().unwrap().to_vec(), vec![5.0, 7.0, 9.0]);
        assert_eq!((&a * &b).eval().unwrap().to_vec(), vec![4.0, 10.0, 18.0]);
        assert_eq!((&b - &a).eval().unwrap().to_vec(), vec![3.0, 3.0, 3.0]);
        assert_eq!((&b / &a).eval().unwrap().to_vec(), vec![4.0, 2.5, 2.0]);
    }

    #[test]
    fn test_broadcasting() {
        let row = vector();
        let col = Tensor::from_vec(vec![10.0, 20.0], &[2, 1]).unwrap();

        let c = (&row + &col).eval().unwrap();
        assert_eq!(c.shape(), &[2, 3]);
        assert_eq!(c.to_vec(), vec![11.0, 12.0, 13.0, 21.0, 22.0, 23.0]);
    }

    #[test]
    fn test_chained_nodes_and_scalars() {
        let a = vector();
        let e = -(&a * 2.0 + 1.0) - &a;
        assert_eq!(e.eval().unwrap().to_vec(), vec![-4.0, -7.0, -10.0]);

        let left = 10.0 - &a;
        assert_eq!(left.eval().unwrap().to_vec(), vec![9.0, 8.0, 7.0]);

        let ints = Tensor::from_vec(vec![7i64, 8, 9], &[3]).unwrap();
        assert_eq!((&ints % 4i64).eval().unwrap().to_vec(), vec![3, 0, 1]);
        assert_eq!((2i64 * &ints).eval().unwrap().to_vec(), vec![14, 16, 18]);
    }

    #[test]
    fn test_scalar_left_for_every_node_kind() {
        let a = vector();
        assert_eq!((1.0 + (&a + &a)).eval().unwrap().to_vec(), vec![3.0, 5.0, 7.0]);
        assert_eq!((2.0 * -(&a)).eval().unwrap().to_vec(), vec![-2.0, -4.0, -6.0]);
        assert_eq!((6.0 / a.clone()).eval().unwrap().to_vec(), vec![6.0, 3.0, 2.0]);

        let singles = Tensor::from_vec(vec![1.0f32, 2.0], &[2]).unwrap();
        assert_eq!((1.5f32 * &singles).eval().unwrap().to_vec(), vec![1.5, 3.0]);

        let ints = Tensor::from_vec(vec![5i32, 6], &[2]).unwrap();
        assert_eq!((10i32 - &ints).eval().unwrap().to_vec(), vec![5, 4]);
        assert_eq!((17i32 % ints).eval().unwrap().to_vec(), vec![2, 5]);
    }

    #[test]
    fn test_shape_error_surfaces_on_eval() {
        let a = vector();
        let b = Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        let expr = &a + &b;
        assert!(expr.eval().is_err());
    }

    #[test]
    fn test_compound_assign() {
        let mut a = vector();
        a += 1.0;
        assert_eq!(a.to_vec(), vec![2.0, 3.0, 4.0]);

        let b = a.clone();
        a *= &b;
        assert_eq!(a.to_vec(), vec![4.0, 9.0, 16.0]);

        a -= &vector() * 2.0;
        assert_eq!(a.to_vec(), vec![2.0, 5.0, 10.0]);

        a /= 2.0;
        assert_eq!(a.to_vec(), vec![1.0, 2.5, 5.0]);
    }

    #[test]
    fn test_compound_assign_through_view() {
        let base = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let mut view = base.transpose();
        let row = Tensor::from_vec(vec![10, 100], &[2]).unwrap();
        view += &row;
        // view[i][j] = base[j][i], so base row j gains row[j].
        assert_eq!(base.to_vec(), vec![11, 12, 103, 104]);
    }

    #[test]
    fn test_try_compound_rejects_resize() {
        let a = vector();
        let m = Tensor::from_vec(vec![1.0; 6], &[2, 3]).unwrap();
        assert!(a.try_add_assign(&m).is_err());
        assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    #[should_panic(expected = "Cannot broadcast")]
    fn test_compound_assign_panics_on_mismatch() {
        let mut a = vector();
        a += &Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
    }
}
