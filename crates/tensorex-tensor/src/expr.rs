//! Expressions - Lazy Element-Wise Computation Trees
//!
//! Arithmetic, comparisons and math functions do not compute anything when
//! called: they build a tree of expression nodes. The tree is evaluated when
//! it is assigned to a container, either element by element through a
//! broadcast multi-index or, when every operand is packed and
//! shape-identical, through a flat index.
//!
//! # Key Features
//! - `Expression` trait implemented by tensors, scalars and every node
//! - Broadcasting resolved at evaluation time
//! - Nameable node types (`fn` pointers) so operators chain freely
//! - `IntoExpression` so operands can be tensors, references or scalars
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use smallvec::SmallVec;

use tensorex_core::dtype::{Numeric, Scalar};
use tensorex_core::error::{Error, Result};
use tensorex_core::Layout;

use crate::assign;
use crate::shape::{broadcast_shape, numel, unravel_index, Shape};
use crate::tensor::Tensor;

// =============================================================================
// Function Pointer Aliases
// =============================================================================

/// Unary element function.
pub type UnaryFn<A, U> = fn(A) -> U;

/// Binary element function.
pub type BinaryFn<A, B, U> = fn(A, B) -> U;

/// Ternary element function.
pub type TernaryFn<A, B, C, U> = fn(A, B, C) -> U;

// =============================================================================
// Expression Trait
// =============================================================================

/// A lazily evaluated N-dimensional value.
pub trait Expression: Sync {
    /// Element type produced by the expression.
    type Elem: Scalar;

    /// Computes the broadcast shape. Fails when operands are incompatible.
    fn try_shape(&self) -> Result<Shape>;

    /// Element at a multi-index of a broadcast target.
    ///
    /// `index` may be longer than this expression's rank; the trailing
    /// components are used and extent-1 dimensions read position 0.
    fn at(&self, index: &[usize]) -> Self::Elem;

    /// Returns true if the expression can be read with a flat row-major
    /// index over `shape`.
    fn linear_access(&self, shape: &[usize]) -> bool;

    /// Element at a flat row-major position. Only valid when
    /// [`Expression::linear_access`] holds for the evaluated shape.
    fn linear(&self, i: usize) -> Self::Elem;

    /// Writes the elements at flat positions `start..start + out.len()`.
    ///
    /// Same validity condition as [`Expression::linear`]. Storage-backed
    /// leaves take their read lock once per call.
    fn fill_linear(&self, start: usize, out: &mut [Self::Elem]) {
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = self.linear(start + k);
        }
    }

    /// Writes the elements at a block of multi-indices stored back to back,
    /// `rank` components each.
    fn fill_at(&self, rank: usize, indices: &[usize], out: &mut [Self::Elem]) {
        fill_from_indices(rank, indices, out, |index| self.at(index));
    }

    /// Number of dimensions of the broadcast shape.
    fn ndim(&self) -> Result<usize> {
        Ok(self.try_shape()?.len())
    }

    /// Number of elements of the broadcast shape.
    fn size(&self) -> Result<usize> {
        Ok(numel(&self.try_shape()?))
    }

    /// Evaluates into a fresh row-major tensor.
    fn eval(&self) -> Result<Tensor<Self::Elem>>
    where
        Self: Sized,
    {
        assign::eval_expr(self, Layout::RowMajor)
    }

    /// Evaluates into a fresh tensor with the given layout.
    fn eval_with_layout(&self, layout: Layout) -> Result<Tensor<Self::Elem>>
    where
        Self: Sized,
    {
        assign::eval_expr(self, layout)
    }

    /// Applies `f` to every element.
    fn map<U, F>(self, f: F) -> Unary<Self, F>
    where
        Self: Sized,
        U: Scalar,
        F: Fn(Self::Elem) -> U + Sync,
    {
        Unary::new(self, f)
    }

    /// Converts every element with `NumCast`; unrepresentable values
    /// become zero.
    fn cast<U: Numeric>(self) -> Unary<Self, UnaryFn<Self::Elem, U>>
    where
        Self: Sized,
        Self::Elem: Numeric,
    {
        let f: UnaryFn<Self::Elem, U> = |x| U::cast_from(x);
        Unary::new(self, f)
    }

    /// Broadcasts to an explicit shape.
    fn broadcast(self, shape: &[usize]) -> Broadcast<Self>
    where
        Self: Sized,
    {
        Broadcast::new(self, shape)
    }
}

/// Sets `out[k]` from the `k`-th `rank`-component multi-index in `indices`.
pub(crate) fn fill_from_indices<U, F>(rank: usize, indices: &[usize], out: &mut [U], mut f: F)
where
    F: FnMut(&[usize]) -> U,
{
    if rank == 0 {
        for slot in out {
            *slot = f(&[]);
        }
    } else {
        for (slot, index) in out.iter_mut().zip(indices.chunks_exact(rank)) {
            *slot = f(index);
        }
    }
}

fn linear_block<E: Expression>(expr: &E, start: usize, len: usize) -> Vec<E::Elem> {
    let mut block = vec![E::Elem::default(); len];
    expr.fill_linear(start, &mut block);
    block
}

fn indexed_block<E: Expression>(expr: &E, rank: usize, indices: &[usize], len: usize) -> Vec<E::Elem> {
    let mut block = vec![E::Elem::default(); len];
    expr.fill_at(rank, indices, &mut block);
    block
}

// =============================================================================
// Conversion Into Expressions
// =============================================================================

/// Types usable as operands of lazy operations.
///
/// Implemented by every expression, by `&Tensor<T>` (which shares the
/// tensor's storage) and by primitive scalars.
pub trait IntoExpression {
    /// Element type of the produced expression.
    type Elem: Scalar;
    /// The produced expression.
    type Expr: Expression<Elem = Self::Elem>;

    /// Converts into an expression.
    fn into_expr(self) -> Self::Expr;
}

impl<E: Expression> IntoExpression for E {
    type Elem = E::Elem;
    type Expr = E;

    fn into_expr(self) -> Self::Expr {
        self
    }
}

impl<T: Scalar> IntoExpression for &Tensor<T> {
    type Elem = T;
    type Expr = Tensor<T>;

    fn into_expr(self) -> Self::Expr {
        self.clone()
    }
}

macro_rules! impl_scalar_into_expr {
    ($($ty:ty),*) => {
        $(
            impl IntoExpression for $ty {
                type Elem = $ty;
                type Expr = ScalarExpr<$ty>;

                fn into_expr(self) -> Self::Expr {
                    ScalarExpr(self)
                }
            }
        )*
    };
}

impl_scalar_into_expr!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

// =============================================================================
// Tensor Leaf
// =============================================================================

impl<T: Scalar> Expression for Tensor<T> {
    type Elem = T;

    fn try_shape(&self) -> Result<Shape> {
        Ok(self.shape.clone())
    }

    fn at(&self, index: &[usize]) -> T {
        let skip = index.len().saturating_sub(self.ndim());
        let pos = self.storage_offset(&index[skip..]);
        self.storage.as_slice()[pos]
    }

    fn linear_access(&self, shape: &[usize]) -> bool {
        self.shape.as_slice() == shape && self.is_row_major_contiguous()
    }

    fn linear(&self, i: usize) -> T {
        self.storage.as_slice()[self.offset + i]
    }

    fn fill_linear(&self, start: usize, out: &mut [T]) {
        let data = self.storage.as_slice();
        let begin = self.offset + start;
        out.copy_from_slice(&data[begin..begin + out.len()]);
    }

    fn fill_at(&self, rank: usize, indices: &[usize], out: &mut [T]) {
        let data = self.storage.as_slice();
        let skip = rank.saturating_sub(self.ndim());
        fill_from_indices(rank, indices, out, |index| {
            data[self.storage_offset(&index[skip..])]
        });
    }
}

// =============================================================================
// Scalar
// =============================================================================

/// A 0-d expression that broadcasts to any shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarExpr<T: Scalar>(pub T);

impl<T: Scalar> Expression for ScalarExpr<T> {
    type Elem = T;

    fn try_shape(&self) -> Result<Shape> {
        Ok(Shape::new())
    }

    fn at(&self, _index: &[usize]) -> T {
        self.0
    }

    fn linear_access(&self, _shape: &[usize]) -> bool {
        true
    }

    fn linear(&self, _i: usize) -> T {
        self.0
    }

    fn fill_linear(&self, _start: usize, out: &mut [T]) {
        out.fill(self.0);
    }

    fn fill_at(&self, _rank: usize, _indices: &[usize], out: &mut [T]) {
        out.fill(self.0);
    }
}

// =============================================================================
// Unary Node
// =============================================================================

/// Element-wise function of one expression.
#[derive(Debug, Clone)]
pub struct Unary<E, F> {
    inner: E,
    f: F,
}

impl<E, F> Unary<E, F> {
    /// Creates the node.
    pub fn new(inner: E, f: F) -> Self {
        Self { inner, f }
    }
}

impl<E, F, U> Expression for Unary<E, F>
where
    E: Expression,
    U: Scalar,
    F: Fn(E::Elem) -> U + Sync,
{
    type Elem = U;

    fn try_shape(&self) -> Result<Shape> {
        self.inner.try_shape()
    }

    fn at(&self, index: &[usize]) -> U {
        (self.f)(self.inner.at(index))
    }

    fn linear_access(&self, shape: &[usize]) -> bool {
        self.inner.linear_access(shape)
    }

    fn linear(&self, i: usize) -> U {
        (self.f)(self.inner.linear(i))
    }

    fn fill_linear(&self, start: usize, out: &mut [U]) {
        let inner = linear_block(&self.inner, start, out.len());
        for (slot, x) in out.iter_mut().zip(inner) {
            *slot = (self.f)(x);
        }
    }

    fn fill_at(&self, rank: usize, indices: &[usize], out: &mut [U]) {
        let inner = indexed_block(&self.inner, rank, indices, out.len());
        for (slot, x) in out.iter_mut().zip(inner) {
            *slot = (self.f)(x);
        }
    }
}

// =============================================================================
// Binary Node
// =============================================================================

/// Element-wise function of two broadcast expressions.
///
/// Incompatible shapes are reported by `try_shape`, not at construction.
#[derive(Debug, Clone)]
pub struct Binary<L, R, F> {
    lhs: L,
    rhs: R,
    f: F,
}

impl<L, R, F> Binary<L, R, F> {
    /// Creates the node.
    pub fn new(lhs: L, rhs: R, f: F) -> Self {
        Self { lhs, rhs, f }
    }
}

impl<L, R, F, U> Expression for Binary<L, R, F>
where
    L: Expression,
    R: Expression,
    U: Scalar,
    F: Fn(L::Elem, R::Elem) -> U + Sync,
{
    type Elem = U;

    fn try_shape(&self) -> Result<Shape> {
        broadcast_shape(&self.lhs.try_shape()?, &self.rhs.try_shape()?)
    }

    fn at(&self, index: &[usize]) -> U {
        (self.f)(self.lhs.at(index), self.rhs.at(index))
    }

    fn linear_access(&self, shape: &[usize]) -> bool {
        self.lhs.linear_access(shape) && self.rhs.linear_access(shape)
    }

    fn linear(&self, i: usize) -> U {
        (self.f)(self.lhs.linear(i), self.rhs.linear(i))
    }

    fn fill_linear(&self, start: usize, out: &mut [U]) {
        let lhs = linear_block(&self.lhs, start, out.len());
        let rhs = linear_block(&self.rhs, start, out.len());
        for ((slot, a), b) in out.iter_mut().zip(lhs).zip(rhs) {
            *slot = (self.f)(a, b);
        }
    }

    fn fill_at(&self, rank: usize, indices: &[usize], out: &mut [U]) {
        let lhs = indexed_block(&self.lhs, rank, indices, out.len());
        let rhs = indexed_block(&self.rhs, rank, indices, out.len());
        for ((slot, a), b) in out.iter_mut().zip(lhs).zip(rhs) {
            *slot = (self.f)(a, b);
        }
    }
}

// =============================================================================
// Ternary Node
// =============================================================================

/// Element-wise function of three broadcast expressions.
#[derive(Debug, Clone)]
pub struct Ternary<A, B, C, F> {
    a: A,
    b: B,
    c: C,
    f: F,
}

impl<A, B, C, F> Ternary<A, B, C, F> {
    /// Creates the node.
    pub fn new(a: A, b: B, c: C, f: F) -> Self {
        Self { a, b, c, f }
    }
}

impl<A, B, C, F, U> Expression for Ternary<A, B, C, F>
where
    A: Expression,
    B: Expression,
    C: Expression,
    U: Scalar,
    F: Fn(A::Elem, B::Elem, C::Elem) -> U + Sync,
{
    type Elem = U;

    fn try_shape(&self) -> Result<Shape> {
        let ab = broadcast_shape(&self.a.try_shape()?, &self.b.try_shape()?)?;
        broadcast_shape(&ab, &self.c.try_shape()?)
    }

    fn at(&self, index: &[usize]) -> U {
        (self.f)(self.a.at(index), self.b.at(index), self.c.at(index))
    }

    fn linear_access(&self, shape: &[usize]) -> bool {
        self.a.linear_access(shape) && self.b.linear_access(shape) && self.c.linear_access(shape)
    }

    fn linear(&self, i: usize) -> U {
        (self.f)(self.a.linear(i), self.b.linear(i), self.c.linear(i))
    }

    fn fill_linear(&self, start: usize, out: &mut [U]) {
        let a = linear_block(&self.a, start, out.len());
        let b = linear_block(&self.b, start, out.len());
        let c = linear_block(&self.c, start, out.len());
        for (((slot, x), y), z) in out.iter_mut().zip(a).zip(b).zip(c) {
            *slot = (self.f)(x, y, z);
        }
    }

    fn fill_at(&self, rank: usize, indices: &[usize], out: &mut [U]) {
        let a = indexed_block(&self.a, rank, indices, out.len());
        let b = indexed_block(&self.b, rank, indices, out.len());
        let c = indexed_block(&self.c, rank, indices, out.len());
        for (((slot, x), y), z) in out.iter_mut().zip(a).zip(b).zip(c) {
            *slot = (self.f)(x, y, z);
        }
    }
}

// =============================================================================
// Broadcast Node
// =============================================================================

/// Explicit broadcast of an expression to a larger shape.
#[derive(Debug, Clone)]
pub struct Broadcast<E> {
    inner: E,
    shape: Shape,
}

impl<E> Broadcast<E> {
    /// Creates the node. Compatibility is checked by `try_shape`.
    pub fn new(inner: E, shape: &[usize]) -> Self {
        Self {
            inner,
            shape: Shape::from_slice(shape),
        }
    }
}

impl<E: Expression> Expression for Broadcast<E> {
    type Elem = E::Elem;

    fn try_shape(&self) -> Result<Shape> {
        let inner = self.inner.try_shape()?;
        let result = broadcast_shape(&inner, &self.shape)?;
        if result != self.shape {
            return Err(Error::broadcast(&inner, &self.shape));
        }
        Ok(result)
    }

    fn at(&self, index: &[usize]) -> E::Elem {
        self.inner.at(index)
    }

    fn linear_access(&self, shape: &[usize]) -> bool {
        self.shape.as_slice() == shape && self.inner.linear_access(shape)
    }

    fn linear(&self, i: usize) -> E::Elem {
        self.inner.linear(i)
    }

    fn fill_linear(&self, start: usize, out: &mut [E::Elem]) {
        self.inner.fill_linear(start, out);
    }

    fn fill_at(&self, rank: usize, indices: &[usize], out: &mut [E::Elem]) {
        self.inner.fill_at(rank, indices, out);
    }
}

// =============================================================================
// Generator Node
// =============================================================================

/// Expression whose elements are computed from their multi-index.
#[derive(Debug, Clone)]
pub struct Generator<T, F> {
    shape: Shape,
    f: F,
    _marker: core::marker::PhantomData<fn() -> T>,
}

impl<T, F> Generator<T, F>
where
    T: Scalar,
    F: Fn(&[usize]) -> T + Sync,
{
    /// Creates a generator of the given shape.
    pub fn new(shape: &[usize], f: F) -> Self {
        Self {
            shape: Shape::from_slice(shape),
            f,
            _marker: core::marker::PhantomData,
        }
    }
}

impl<T, F> Expression for Generator<T, F>
where
    T: Scalar,
    F: Fn(&[usize]) -> T + Sync,
{
    type Elem = T;

    fn try_shape(&self) -> Result<Shape> {
        Ok(self.shape.clone())
    }

    fn at(&self, index: &[usize]) -> T {
        let skip = index.len().saturating_sub(self.shape.len());
        let local: SmallVec<[usize; 6]> = index[skip..]
            .iter()
            .zip(&self.shape)
            .map(|(&i, &dim)| if dim == 1 { 0 } else { i })
            .collect();
        (self.f)(&local)
    }

    fn linear_access(&self, _shape: &[usize]) -> bool {
        false
    }

    fn linear(&self, i: usize) -> T {
        (self.f)(&unravel_index(i, &self.shape, Layout::RowMajor))
    }
}

// =============================================================================
// Tests
// =============================================================================
