//! Math Functions - Lazy Element-wise Mathematics
//!
//! Every function here takes any [`IntoExpression`] and returns a lazy node
//! built from plain function pointers, so the result type can be named and
//! stored. Binary functions broadcast their operands.
//!
//! # Key Features
//! - Basic, exponential, trigonometric, hyperbolic and rounding functions
//! - `pow` with a scalar exponent and `clip` with scalar bounds
//! - Classification (`isnan`, `isinf`, `isfinite`) into `bool` expressions
//! - Eager closeness checks (`isclose`, `allclose`, `array_equal`)
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use num_traits::Float as _;
use tensorex_core::dtype::{Float, Numeric};
use tensorex_core::error::Result;

use crate::expr::{
    Binary, BinaryFn, Expression, IntoExpression, ScalarExpr, Ternary, TernaryFn, Unary, UnaryFn,
};
use crate::ops::ArithExpr;
use crate::tensor::Tensor;

/// Node produced by a unary math function.
pub type MathExpr<X> = Unary<
    <X as IntoExpression>::Expr,
    UnaryFn<<X as IntoExpression>::Elem, <X as IntoExpression>::Elem>,
>;

/// Node produced by a classification function.
pub type PredicateExpr<X> =
    Unary<<X as IntoExpression>::Expr, UnaryFn<<X as IntoExpression>::Elem, bool>>;

/// Node produced by [`pow`].
pub type PowExpr<X> = Binary<
    <X as IntoExpression>::Expr,
    ScalarExpr<<X as IntoExpression>::Elem>,
    BinaryFn<<X as IntoExpression>::Elem, <X as IntoExpression>::Elem, <X as IntoExpression>::Elem>,
>;

/// Node produced by [`clip`].
pub type ClipExpr<X> = Ternary<
    <X as IntoExpression>::Expr,
    ScalarExpr<<X as IntoExpression>::Elem>,
    ScalarExpr<<X as IntoExpression>::Elem>,
    TernaryFn<
        <X as IntoExpression>::Elem,
        <X as IntoExpression>::Elem,
        <X as IntoExpression>::Elem,
        <X as IntoExpression>::Elem,
    >,
>;

// =============================================================================
// Unary Functions
// =============================================================================

macro_rules! unary_math {
    ($bound:ident; $($(#[$doc:meta])* $name:ident => |$x:ident| $body:expr;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<X>(e: X) -> MathExpr<X>
            where
                X: IntoExpression,
                X::Elem: $bound,
            {
                let f: UnaryFn<X::Elem, X::Elem> = |$x| $body;
                Unary::new(e.into_expr(), f)
            }
        )*
    };
}

unary_math! {
    Numeric;
    /// Absolute value.
    abs => |x| x.abs_value();
    /// `-1`, `0` or `1` following the sign; NaN stays NaN.
    sign => |x| {
        if x > <X::Elem as Numeric>::ZERO {
            <X::Elem as Numeric>::ONE
        } else if x < <X::Elem as Numeric>::ZERO {
            <X::Elem as Numeric>::ZERO - <X::Elem as Numeric>::ONE
        } else {
            x
        }
    };
    /// `x * x`.
    square => |x| x * x;
    /// `max(x, 0)`.
    relu => |x| if x > <X::Elem as Numeric>::ZERO { x } else { <X::Elem as Numeric>::ZERO };
}

unary_math! {
    Float;
    /// Square root.
    sqrt => |x| x.sqrt();
    /// Cube root.
    cbrt => |x| x.cbrt();
    /// `e^x`.
    exp => |x| x.exp();
    /// `2^x`.
    exp2 => |x| x.exp2();
    /// `e^x - 1`, accurate near zero.
    expm1 => |x| x.exp_m1();
    /// Natural logarithm.
    ln => |x| x.ln();
    /// Base-2 logarithm.
    log2 => |x| x.log2();
    /// Base-10 logarithm.
    log10 => |x| x.log10();
    /// `ln(1 + x)`, accurate near zero.
    log1p => |x| x.ln_1p();
    /// Sine.
    sin => |x| x.sin();
    /// Cosine.
    cos => |x| x.cos();
    /// Tangent.
    tan => |x| x.tan();
    /// Arcsine.
    asin => |x| x.asin();
    /// Arccosine.
    acos => |x| x.acos();
    /// Arctangent.
    atan => |x| x.atan();
    /// Hyperbolic sine.
    sinh => |x| x.sinh();
    /// Hyperbolic cosine.
    cosh => |x| x.cosh();
    /// Hyperbolic tangent.
    tanh => |x| x.tanh();
    /// Largest integer not above `x`.
    floor => |x| x.floor();
    /// Smallest integer not below `x`.
    ceil => |x| x.ceil();
    /// Nearest integer, halves away from zero.
    round => |x| x.round();
    /// Integer part.
    trunc => |x| x.trunc();
    /// `1 / x`.
    reciprocal => |x| x.recip();
    /// Logistic function `1 / (1 + e^-x)`.
    sigmoid => |x| <X::Elem as Numeric>::ONE / (<X::Elem as Numeric>::ONE + (-x).exp());
}

macro_rules! classify {
    ($($(#[$doc:meta])* $name:ident => $method:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<X>(e: X) -> PredicateExpr<X>
            where
                X: IntoExpression,
                X::Elem: Float,
            {
                let f: UnaryFn<X::Elem, bool> = |x| x.$method();
                Unary::new(e.into_expr(), f)
            }
        )*
    };
}

classify! {
    /// True where the element is NaN.
    isnan => is_nan;
    /// True where the element is positive or negative infinity.
    isinf => is_infinite;
    /// True where the element is neither NaN nor infinite.
    isfinite => is_finite;
}

// =============================================================================
// Binary Functions
// =============================================================================

macro_rules! binary_math {
    ($bound:ident; $($(#[$doc:meta])* $name:ident => |$a:ident, $b:ident| $body:expr;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<A, B>(a: A, b: B) -> ArithExpr<A, B>
            where
                A: IntoExpression,
                A::Elem: $bound,
                B: IntoExpression<Elem = A::Elem>,
            {
                let f: BinaryFn<A::Elem, A::Elem, A::Elem> = |$a, $b| $body;
                Binary::new(a.into_expr(), b.into_expr(), f)
            }
        )*
    };
}

binary_math! {
    Numeric;
    /// Element-wise maximum; NaN in either operand propagates.
    maximum => |x, y| if x.partial_cmp(&x).is_none() || x >= y { x } else { y };
    /// Element-wise minimum; NaN in either operand propagates.
    minimum => |x, y| if x.partial_cmp(&x).is_none() || x <= y { x } else { y };
}

binary_math! {
    Float;
    /// Element-wise `a^b`.
    powf => |x, y| x.powf(y);
    /// Four-quadrant arctangent of `a / b`.
    atan2 => |y, x| y.atan2(x);
    /// `sqrt(a^2 + b^2)` without intermediate overflow.
    hypot => |x, y| x.hypot(y);
    /// Floating remainder with the sign of the dividend.
    fmod => |x, y| x % y;
}

/// Raises every element to a scalar power.
pub fn pow<X>(e: X, exponent: X::Elem) -> PowExpr<X>
where
    X: IntoExpression,
    X::Elem: Float,
{
    let f: BinaryFn<X::Elem, X::Elem, X::Elem> = |x, p| x.powf(p);
    Binary::new(e.into_expr(), ScalarExpr(exponent), f)
}

/// Limits every element to `[lo, hi]`.
pub fn clip<X>(e: X, lo: X::Elem, hi: X::Elem) -> ClipExpr<X>
where
    X: IntoExpression,
    X::Elem: Numeric,
{
    let f: TernaryFn<X::Elem, X::Elem, X::Elem, X::Elem> = |x, lo, hi| {
        if x < lo {
            lo
        } else if x > hi {
            hi
        } else {
            x
        }
    };
    Ternary::new(e.into_expr(), ScalarExpr(lo), ScalarExpr(hi), f)
}

// =============================================================================
// Closeness
// =============================================================================

/// Element-wise `|a - b| <= atol + rtol * |b|`, broadcasting.
///
/// Equal infinities compare close. NaNs compare close only with
/// `equal_nan`.
pub fn isclose<A, B>(
    a: A,
    b: B,
    rtol: A::Elem,
    atol: A::Elem,
    equal_nan: bool,
) -> Result<Tensor<bool>>
where
    A: IntoExpression,
    A::Elem: Float,
    B: IntoExpression<Elem = A::Elem>,
{
    Binary::new(a.into_expr(), b.into_expr(), move |x: A::Elem, y: A::Elem| {
        if x.is_nan() || y.is_nan() {
            equal_nan && x.is_nan() && y.is_nan()
        } else if x == y {
            true
        } else {
            (x - y).abs() <= atol + rtol * y.abs()
        }
    })
    .eval()
}

/// True when every element pair is close; see [`isclose`].
pub fn allclose<A, B>(a: A, b: B, rtol: A::Elem, atol: A::Elem) -> Result<bool>
where
    A: IntoExpression,
    A::Elem: Float,
    B: IntoExpression<Elem = A::Elem>,
{
    Ok(isclose(a, b, rtol, atol, false)?.iter().all(|v| v))
}

/// True when both expressions have the same shape and elements.
///
/// Shapes must match exactly; broadcasting is not applied.
pub fn array_equal<A, B>(a: A, b: B) -> bool
where
    A: IntoExpression,
    B: IntoExpression<Elem = A::Elem>,
{
    match (a.into_expr().eval(), b.into_expr().eval()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

// =============================================================================
// Tests
// =============================================================================
