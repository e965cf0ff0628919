/* ************************************************************************ **
** This file is part of rsp2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of rsp2 is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

//! Lazily-evaluated elementwise arithmetic.
//!
//! Arithmetic operators on vectors and matrices return an [`Expr`] instead of
//! computing anything. An `Expr` is a tree whose leaves borrow the containers
//! named in the source expression and whose interior nodes own their
//! children, so `a * &x + &y * b` builds three nodes and no buffers.
//! Nothing is computed until the tree is assigned into a container, at which
//! point every element is computed by walking the tree once for that index.
//!
//! Because leaves are shared borrows, a container cannot be assigned an
//! expression that reads from it. (`v.assign(&v * 2.0)` does not compile.)

use crate::container::{ReadableVector, ReadableMatrix};
use crate::errors::{Error, Result};
use crate::layout::{Layout, LayoutKind};
use crate::traits::Ring;
use crate::traits::internal::PrimitiveRing;

use std::fmt;

/// The extent of an expression: a length for vectors, [`Dims`] for matrices.
pub trait Shape: Copy + PartialEq + fmt::Debug {
    type Index: Copy + fmt::Debug;

    /// Number of elements.
    fn len(self) -> usize;

    /// Offset of an element in a flat buffer with the given layout.
    ///
    /// Panics if `index` is out of bounds.
    fn offset(self, index: Self::Index, layout: Layout) -> usize;

    /// Index of the element at `offset` in a flat buffer with the given layout.
    fn index_of(self, offset: usize, layout: Layout) -> Self::Index;

    /// The error for an operand of shape `actual` where `expected` was needed.
    fn mismatch(expected: Self, actual: Self) -> Error;
}

impl Shape for usize {
    type Index = usize;

    #[inline(always)]
    fn len(self) -> usize { self }

    #[inline(always)]
    fn offset(self, index: usize, _: Layout) -> usize { index }

    #[inline(always)]
    fn index_of(self, offset: usize, _: Layout) -> usize { offset }

    #[inline]
    fn mismatch(expected: usize, actual: usize) -> Error
    { Error::VectorSizeMismatch { expected, actual } }
}

/// The shape of a matrix.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Dims {
    pub rows: usize,
    pub cols: usize,
}

impl Dims {
    #[inline(always)]
    pub fn new(rows: usize, cols: usize) -> Self { Dims { rows, cols } }

    #[inline(always)]
    pub fn pair(self) -> (usize, usize) { (self.rows, self.cols) }
}

impl Shape for Dims {
    type Index = (usize, usize);

    #[inline(always)]
    fn len(self) -> usize { self.rows * self.cols }

    #[inline]
    fn offset(self, (row, col): (usize, usize), layout: Layout) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds for a {}x{} matrix", row, col, self.rows, self.cols,
        );
        layout.offset((row, col), self.pair())
    }

    #[inline(always)]
    fn index_of(self, offset: usize, layout: Layout) -> (usize, usize)
    { layout.index_of(offset, self.pair()) }

    #[inline]
    fn mismatch(expected: Dims, actual: Dims) -> Error
    { Error::MatrixSizeMismatch { expected: expected.pair(), actual: actual.pair() } }
}

// ---------------------------------------------------------------------------

/// A borrowed view of a stored container.
#[derive(Copy, Clone)]
pub struct Leaf<'a, X, Sh> {
    data: &'a [X],
    shape: Sh,
    layout: Layout,
}

impl<'a, X, Sh: Shape> Leaf<'a, X, Sh> {
    /// Panics if `data` does not have exactly `shape.len()` elements.
    #[inline]
    pub fn new(data: &'a [X], shape: Sh, layout: Layout) -> Self {
        assert_eq!(data.len(), shape.len(), "leaf buffer does not match its shape");
        Leaf { data, shape, layout }
    }

    #[inline(always)] pub fn data(&self) -> &'a [X] { self.data }
    #[inline(always)] pub fn shape(&self) -> Sh { self.shape }
    #[inline(always)] pub fn layout(&self) -> Layout { self.layout }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOp { Neg }

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOp { Add, Sub }

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarOp { Mul, Div }

impl UnaryOp {
    #[inline(always)]
    fn apply<X: PrimitiveRing>(self, x: X) -> X {
        match self {
            UnaryOp::Neg => -x,
        }
    }
}

impl BinaryOp {
    #[inline(always)]
    fn apply<X: PrimitiveRing>(self, a: X, b: X) -> X {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
        }
    }
}

impl ScalarOp {
    #[inline(always)]
    fn apply<X: PrimitiveRing>(self, a: X, scalar: X) -> X {
        match self {
            ScalarOp::Mul => a * scalar,
            ScalarOp::Div => a / scalar,
        }
    }
}

/// A node in an elementwise evaluation tree.
///
/// Nodes do not cache anything; [`Expr::get`] recomputes the whole subtree
/// for the requested element.
#[derive(Clone)]
pub enum Expr<'a, X, Sh: Shape = usize> {
    Leaf(Leaf<'a, X, Sh>),
    Unary { op: UnaryOp, arg: Box<Expr<'a, X, Sh>> },
    Binary { op: BinaryOp, left: Box<Expr<'a, X, Sh>>, right: Box<Expr<'a, X, Sh>> },
    Scalar { op: ScalarOp, arg: Box<Expr<'a, X, Sh>>, scalar: X },
}

pub type VectorExpr<'a, X> = Expr<'a, X, usize>;
pub type MatrixExpr<'a, X> = Expr<'a, X, Dims>;

impl<'a, X, Sh: Shape> Expr<'a, X, Sh> {
    #[inline]
    pub fn leaf(data: &'a [X], shape: Sh, layout: Layout) -> Self
    { Expr::Leaf(Leaf::new(data, shape, layout)) }

    #[inline]
    pub fn unary(op: UnaryOp, arg: Self) -> Self
    { Expr::Unary { op, arg: Box::new(arg) } }

    /// Combine two operands elementwise.
    ///
    /// Fails if the shapes differ.
    pub fn binary(op: BinaryOp, left: Self, right: Self) -> Result<Self> {
        let (expected, actual) = (left.shape(), right.shape());
        if expected != actual {
            return Err(Sh::mismatch(expected, actual));
        }
        Ok(Expr::Binary { op, left: Box::new(left), right: Box::new(right) })
    }

    #[inline]
    pub fn scalar(op: ScalarOp, arg: Self, scalar: X) -> Self
    { Expr::Scalar { op, arg: Box::new(arg), scalar } }

    /// Shape of the result, taken from the leftmost operand.
    pub fn shape(&self) -> Sh {
        match self {
            Expr::Leaf(leaf) => leaf.shape,
            Expr::Unary { arg, .. } => arg.shape(),
            Expr::Binary { left, .. } => left.shape(),
            Expr::Scalar { arg, .. } => arg.shape(),
        }
    }

    /// Number of elements in the result.
    #[inline]
    pub fn len(&self) -> usize { self.shape().len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Number of nodes on the longest path from this node to a leaf,
    /// counting both ends.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Leaf(_) => 1,
            Expr::Unary { arg, .. } => 1 + arg.depth(),
            Expr::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
            Expr::Scalar { arg, .. } => 1 + arg.depth(),
        }
    }

    /// The storage order shared by every leaf, or `AnyMajor` if they disagree.
    pub fn layout_kind(&self) -> LayoutKind {
        match self {
            Expr::Leaf(leaf) => leaf.layout.kind(),
            Expr::Unary { arg, .. } => arg.layout_kind(),
            Expr::Binary { left, right, .. } => left.layout_kind().merge(right.layout_kind()),
            Expr::Scalar { arg, .. } => arg.layout_kind(),
        }
    }
}

impl<'a, X, Sh> Expr<'a, X, Sh>
where
    X: Ring + PrimitiveRing,
    Sh: Shape,
{
    /// Compute one element of the result.
    ///
    /// Panics if `index` is out of bounds.
    pub fn get(&self, index: Sh::Index) -> X {
        match self {
            Expr::Leaf(leaf) => leaf.data[leaf.shape.offset(index, leaf.layout)],
            Expr::Unary { op, arg } => op.apply(arg.get(index)),
            Expr::Binary { op, left, right } => op.apply(left.get(index), right.get(index)),
            Expr::Scalar { op, arg, scalar } => op.apply(arg.get(index), *scalar),
        }
    }

    /// Compute the element at `offset` in storage order.
    ///
    /// Only meaningful when every leaf has the same layout, since leaves are
    /// read at `offset` directly.
    pub(crate) fn get_flat(&self, offset: usize) -> X {
        match self {
            Expr::Leaf(leaf) => leaf.data[offset],
            Expr::Unary { op, arg } => op.apply(arg.get_flat(offset)),
            Expr::Binary { op, left, right } => op.apply(left.get_flat(offset), right.get_flat(offset)),
            Expr::Scalar { op, arg, scalar } => op.apply(arg.get_flat(offset), *scalar),
        }
    }

    /// Call `write(offset, value)` for every element, where `offset` is a
    /// position in a buffer stored with `layout`.
    pub(crate) fn for_each_in(&self, layout: Layout, mut write: impl FnMut(usize, X)) {
        let shape = self.shape();
        trace!(
            "materializing {:?} (depth {}) into {:?} storage",
            shape, self.depth(), layout,
        );
        if self.layout_kind().concrete() == Some(layout) {
            for offset in 0..shape.len() {
                write(offset, self.get_flat(offset));
            }
        } else {
            for offset in 0..shape.len() {
                write(offset, self.get(shape.index_of(offset, layout)));
            }
        }
    }
}

impl<'a, X: fmt::Debug, Sh: Shape> fmt::Debug for Leaf<'a, X, Sh> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("shape", &self.shape)
            .field("layout", &self.layout)
            .finish()
    }
}

impl<'a, X: fmt::Debug, Sh: Shape> fmt::Debug for Expr<'a, X, Sh> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Leaf(leaf) => fmt::Debug::fmt(leaf, f),
            Expr::Unary { op, arg } => write!(f, "{:?}({:?})", op, arg),
            Expr::Binary { op, left, right } => write!(f, "{:?}({:?}, {:?})", op, left, right),
            Expr::Scalar { op, arg, scalar } => write!(f, "{:?}({:?}, {:?})", op, arg, scalar),
        }
    }
}

impl<'a, X> ReadableVector for Expr<'a, X, usize>
where X: Ring + PrimitiveRing,
{
    type Elem = X;

    #[inline(always)]
    fn size(&self) -> usize { self.len() }

    #[inline(always)]
    fn get(&self, i: usize) -> X { Expr::get(self, i) }
}

impl<'a, X> ReadableMatrix for Expr<'a, X, Dims>
where X: Ring + PrimitiveRing,
{
    type Elem = X;

    #[inline(always)]
    fn rows(&self) -> usize { self.shape().rows }

    #[inline(always)]
    fn cols(&self) -> usize { self.shape().cols }

    #[inline(always)]
    fn get(&self, row: usize, col: usize) -> X { Expr::get(self, (row, col)) }
}

// ---------------------------------------------------------------------------

/// Conversion of an operand into an expression node.
///
/// Stored containers become leaves that borrow them; expressions are moved in.
pub trait IntoExpr<'a> {
    type Elem: 'a;
    type Shape: Shape;

    fn into_expr(self) -> Expr<'a, Self::Elem, Self::Shape>;
}

impl<'a, X: 'a, Sh: Shape> IntoExpr<'a> for Expr<'a, X, Sh> {
    type Elem = X;
    type Shape = Sh;

    #[inline(always)]
    fn into_expr(self) -> Self { self }
}

impl<'a, X: 'a> IntoExpr<'a> for &'a [X] {
    type Elem = X;
    type Shape = usize;

    #[inline]
    fn into_expr(self) -> VectorExpr<'a, X>
    { Expr::leaf(self, self.len(), Layout::RowMajor) }
}

/// Build an elementwise node, panicking on mismatched shapes.
///
/// This is what the `+` and `-` operators use.
#[inline]
pub(crate) fn binary_or_panic<'a, X, Sh: Shape>(op: BinaryOp, left: Expr<'a, X, Sh>, right: Expr<'a, X, Sh>) -> Expr<'a, X, Sh> {
    match Expr::binary(op, left, right) {
        Ok(expr) => expr,
        Err(e) => panic!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vleaf(data: &[f64]) -> VectorExpr<'_, f64> { data.into_expr() }

    #[test]
    fn evaluates_on_demand() {
        let x = [1.0, 2.0, 3.0];
        let y = [10.0, 20.0, 30.0];

        // 2x - y/10
        let e = Expr::binary(
            BinaryOp::Sub,
            Expr::scalar(ScalarOp::Mul, vleaf(&x), 2.0),
            Expr::scalar(ScalarOp::Div, vleaf(&y), 10.0),
        ).unwrap();

        assert_eq!(e.len(), 3);
        assert_eq!(e.depth(), 3);
        assert_eq!((0..3).map(|i| e.get(i)).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);

        let neg = Expr::unary(UnaryOp::Neg, e);
        assert_eq!(neg.get(2), -3.0);
        assert_eq!(neg.depth(), 4);
    }

    #[test]
    fn shape_comes_from_the_left() {
        let x = [1, 2, 3];
        let y = [1, 2];
        let err = Expr::binary(BinaryOp::Add, x[..].into_expr(), y[..].into_expr()).unwrap_err();
        assert_eq!(err, Error::VectorSizeMismatch { expected: 3, actual: 2 });
    }

    #[test]
    #[should_panic(expected = "incompatible vector sizes")]
    fn operators_panic_on_mismatch() {
        let x = [1, 2, 3];
        let y = [1, 2];
        binary_or_panic(BinaryOp::Add, x[..].into_expr(), y[..].into_expr());
    }

    #[test]
    fn mixed_layouts() {
        // the same logical 2x3 matrix, stored both ways
        let rows = [1, 2, 3, 4, 5, 6];
        let cols = [1, 4, 2, 5, 3, 6];
        let shape = Dims::new(2, 3);
        let a = Expr::leaf(&rows[..], shape, Layout::RowMajor);
        let b = Expr::leaf(&cols[..], shape, Layout::ColMajor);

        for r in 0..2 {
            for c in 0..3 {
                assert_eq!(a.get((r, c)), b.get((r, c)));
            }
        }

        let sum = Expr::binary(BinaryOp::Add, a.clone(), b).unwrap();
        assert_eq!(sum.layout_kind(), LayoutKind::AnyMajor);
        assert_eq!(a.layout_kind(), LayoutKind::RowMajor);

        let mut out = vec![0; 6];
        sum.for_each_in(Layout::ColMajor, |k, x| out[k] = x);
        assert_eq!(out, vec![2, 8, 4, 10, 6, 12]);

        let mut out = vec![0; 6];
        sum.for_each_in(Layout::RowMajor, |k, x| out[k] = x);
        assert_eq!(out, vec![2, 4, 6, 8, 10, 12]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn matrix_index_is_checked() {
        let data = [1, 2, 3, 4, 5, 6];
        // (0, 4) would land inside the buffer for a row-major 2x3
        Expr::leaf(&data[..], Dims::new(2, 3), Layout::RowMajor).get((0, 4));
    }

    #[test]
    fn readable_expressions() {
        let x = [3.0, 4.0];
        let e = Expr::scalar(ScalarOp::Mul, vleaf(&x), 0.5);
        assert_eq!(ReadableVector::size(&e), 2);
        assert_eq!(ReadableVector::get(&e, 1), 2.0);
    }
}
