//! Comparison and Logical Expressions
//!
//! Element-wise comparisons that produce `bool` expressions, logical
//! combinators over `bool` expressions, and `where_` selection. All of them
//! broadcast their operands.
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use crate::expr::{Binary, BinaryFn, IntoExpression, Ternary, TernaryFn, Unary, UnaryFn};

/// Node produced by comparing `A` with `B`.
pub type CompareExpr<A, B> = Binary<
    <A as IntoExpression>::Expr,
    <B as IntoExpression>::Expr,
    BinaryFn<<A as IntoExpression>::Elem, <A as IntoExpression>::Elem, bool>,
>;

/// Node produced by `where_`.
pub type WhereExpr<C, A, B> = Ternary<
    <C as IntoExpression>::Expr,
    <A as IntoExpression>::Expr,
    <B as IntoExpression>::Expr,
    TernaryFn<
        bool,
        <A as IntoExpression>::Elem,
        <A as IntoExpression>::Elem,
        <A as IntoExpression>::Elem,
    >,
>;

fn compare<A, B>(a: A, b: B, f: BinaryFn<A::Elem, A::Elem, bool>) -> CompareExpr<A, B>
where
    A: IntoExpression,
    B: IntoExpression<Elem = A::Elem>,
{
    Binary::new(a.into_expr(), b.into_expr(), f)
}

macro_rules! comparison {
    ($(#[$doc:meta])* $name:ident, $bound:path, $op:tt) => {
        $(#[$doc])*
        pub fn $name<A, B>(a: A, b: B) -> CompareExpr<A, B>
        where
            A: IntoExpression,
            A::Elem: $bound,
            B: IntoExpression<Elem = A::Elem>,
        {
            compare(a, b, |x, y| x $op y)
        }
    };
}

comparison!(
    /// Element-wise `a == b`.
    equal, PartialEq, ==
);
comparison!(
    /// Element-wise `a != b`.
    not_equal, PartialEq, !=
);
comparison!(
    /// Element-wise `a < b`.
    less, PartialOrd, <
);
comparison!(
    /// Element-wise `a <= b`.
    less_equal, PartialOrd, <=
);
comparison!(
    /// Element-wise `a > b`.
    greater, PartialOrd, >
);
comparison!(
    /// Element-wise `a >= b`.
    greater_equal, PartialOrd, >=
);

/// Element-wise logical and.
pub fn logical_and<A, B>(a: A, b: B) -> CompareExpr<A, B>
where
    A: IntoExpression<Elem = bool>,
    B: IntoExpression<Elem = bool>,
{
    compare(a, b, |x, y| x && y)
}

/// Element-wise logical or.
pub fn logical_or<A, B>(a: A, b: B) -> CompareExpr<A, B>
where
    A: IntoExpression<Elem = bool>,
    B: IntoExpression<Elem = bool>,
{
    compare(a, b, |x, y| x || y)
}

/// Element-wise logical exclusive or.
pub fn logical_xor<A, B>(a: A, b: B) -> CompareExpr<A, B>
where
    A: IntoExpression<Elem = bool>,
    B: IntoExpression<Elem = bool>,
{
    compare(a, b, |x, y| x != y)
}

/// Element-wise logical not.
pub fn logical_not<A>(a: A) -> Unary<A::Expr, UnaryFn<bool, bool>>
where
    A: IntoExpression<Elem = bool>,
{
    let f: UnaryFn<bool, bool> = |x| !x;
    Unary::new(a.into_expr(), f)
}

/// Selects `a` where `cond` is true and `b` elsewhere, broadcasting all
/// three operands.
pub fn where_<C, A, B>(cond: C, a: A, b: B) -> WhereExpr<C, A, B>
where
    C: IntoExpression<Elem = bool>,
    A: IntoExpression,
    B: IntoExpression<Elem = A::Elem>,
{
    let f: TernaryFn<bool, A::Elem, A::Elem, A::Elem> = |c, x, y| if c { x } else { y };
    Ternary::new(cond.into_expr(), a.into_expr(), b.into_expr(), f)
}

// =============================================================================
// Tests
// =============================================================================
