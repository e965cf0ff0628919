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

//! Operators.
//!
//! `+`, `-`, unary `-`, and `*`/`/` by a scalar never compute anything;
//! they build an [`Expr`]. The operands of `+` and `-` must have the same
//! shape, or the operator panics (use [`Expr::binary`] to get an error
//! instead). The compound assignment operators evaluate directly into the
//! left-hand side.

use crate::expr::{BinaryOp, Dims, Expr, IntoExpr, MatrixExpr, ScalarOp, Shape, UnaryOp, VectorExpr};
use crate::expr::binary_or_panic;
use crate::layout::{Layout, StorageLayout};
use crate::matrix::Matrix;
use crate::storage::{MatrixStorage, VectorStorage};
use crate::traits::Ring;
use crate::traits::internal::PrimitiveRing;
use crate::vector::{Vector, check_same_size};

use std::ops::{Add, Sub, Neg, Mul, Div};
use std::ops::{AddAssign, SubAssign, MulAssign, DivAssign};

// ---------------------------------------------------------------------------
// expression `op` operand

impl<'a, X, Sh, R> Add<R> for Expr<'a, X, Sh>
where
    X: Ring + PrimitiveRing,
    Sh: Shape,
    R: IntoExpr<'a, Elem=X, Shape=Sh>,
{
    type Output = Expr<'a, X, Sh>;

    #[inline]
    fn add(self, other: R) -> Self::Output
    { binary_or_panic(BinaryOp::Add, self, other.into_expr()) }
}

impl<'a, X, Sh, R> Sub<R> for Expr<'a, X, Sh>
where
    X: Ring + PrimitiveRing,
    Sh: Shape,
    R: IntoExpr<'a, Elem=X, Shape=Sh>,
{
    type Output = Expr<'a, X, Sh>;

    #[inline]
    fn sub(self, other: R) -> Self::Output
    { binary_or_panic(BinaryOp::Sub, self, other.into_expr()) }
}

impl<'a, X, Sh> Neg for Expr<'a, X, Sh>
where
    X: Ring + PrimitiveRing,
    Sh: Shape,
{
    type Output = Expr<'a, X, Sh>;

    #[inline]
    fn neg(self) -> Self::Output
    { Expr::unary(UnaryOp::Neg, self) }
}

impl<'a, X, Sh> Mul<X> for Expr<'a, X, Sh>
where
    X: Ring + PrimitiveRing,
    Sh: Shape,
{
    type Output = Expr<'a, X, Sh>;

    #[inline]
    fn mul(self, scalar: X) -> Self::Output
    { Expr::scalar(ScalarOp::Mul, self, scalar) }
}

impl<'a, X, Sh> Div<X> for Expr<'a, X, Sh>
where
    X: Ring + PrimitiveRing,
    Sh: Shape,
{
    type Output = Expr<'a, X, Sh>;

    #[inline]
    fn div(self, scalar: X) -> Self::Output
    { Expr::scalar(ScalarOp::Div, self, scalar) }
}

// ---------------------------------------------------------------------------
// &container `op` operand
//
// These all turn the container into a leaf and defer to the impls above.

impl<'a, S, R> Add<R> for &'a Vector<S>
where
    S: VectorStorage,
    S::Elem: Ring + PrimitiveRing + 'a,
    R: IntoExpr<'a, Elem=S::Elem, Shape=usize>,
{
    type Output = VectorExpr<'a, S::Elem>;

    #[inline]
    fn add(self, other: R) -> Self::Output { self.expr() + other }
}

impl<'a, S, R> Sub<R> for &'a Vector<S>
where
    S: VectorStorage,
    S::Elem: Ring + PrimitiveRing + 'a,
    R: IntoExpr<'a, Elem=S::Elem, Shape=usize>,
{
    type Output = VectorExpr<'a, S::Elem>;

    #[inline]
    fn sub(self, other: R) -> Self::Output { self.expr() - other }
}

impl<'a, S> Neg for &'a Vector<S>
where
    S: VectorStorage,
    S::Elem: Ring + PrimitiveRing + 'a,
{
    type Output = VectorExpr<'a, S::Elem>;

    #[inline]
    fn neg(self) -> Self::Output { -self.expr() }
}

impl<'a, X, S> Mul<X> for &'a Vector<S>
where
    S: VectorStorage<Elem=X>,
    X: Ring + PrimitiveRing + 'a,
{
    type Output = VectorExpr<'a, X>;

    #[inline]
    fn mul(self, scalar: X) -> Self::Output { self.expr() * scalar }
}

impl<'a, X, S> Div<X> for &'a Vector<S>
where
    S: VectorStorage<Elem=X>,
    X: Ring + PrimitiveRing + 'a,
{
    type Output = VectorExpr<'a, X>;

    #[inline]
    fn div(self, scalar: X) -> Self::Output { self.expr() / scalar }
}

impl<'a, S, L, R> Add<R> for &'a Matrix<S, L>
where
    S: MatrixStorage,
    S::Elem: Ring + PrimitiveRing + 'a,
    L: StorageLayout,
    R: IntoExpr<'a, Elem=S::Elem, Shape=Dims>,
{
    type Output = MatrixExpr<'a, S::Elem>;

    #[inline]
    fn add(self, other: R) -> Self::Output { self.expr() + other }
}

impl<'a, S, L, R> Sub<R> for &'a Matrix<S, L>
where
    S: MatrixStorage,
    S::Elem: Ring + PrimitiveRing + 'a,
    L: StorageLayout,
    R: IntoExpr<'a, Elem=S::Elem, Shape=Dims>,
{
    type Output = MatrixExpr<'a, S::Elem>;

    #[inline]
    fn sub(self, other: R) -> Self::Output { self.expr() - other }
}

impl<'a, S, L> Neg for &'a Matrix<S, L>
where
    S: MatrixStorage,
    S::Elem: Ring + PrimitiveRing + 'a,
    L: StorageLayout,
{
    type Output = MatrixExpr<'a, S::Elem>;

    #[inline]
    fn neg(self) -> Self::Output { -self.expr() }
}

impl<'a, X, S, L> Mul<X> for &'a Matrix<S, L>
where
    S: MatrixStorage<Elem=X>,
    X: Ring + PrimitiveRing + 'a,
    L: StorageLayout,
{
    type Output = MatrixExpr<'a, X>;

    #[inline]
    fn mul(self, scalar: X) -> Self::Output { self.expr() * scalar }
}

impl<'a, X, S, L> Div<X> for &'a Matrix<S, L>
where
    S: MatrixStorage<Elem=X>,
    X: Ring + PrimitiveRing + 'a,
    L: StorageLayout,
{
    type Output = MatrixExpr<'a, X>;

    #[inline]
    fn div(self, scalar: X) -> Self::Output { self.expr() / scalar }
}

// ---------------------------------------------------------------------------
// scalar * operand

gen_each!{
    // NOTE: the orphan rules prevent us from impl-ing these ops "for X" so
    //       we must generate a separate impl for each Ring type rather than
    //       being generic over X: Ring
    @{ring}
    impl_scalar_mul!({$X:ty}) => {
        // scalar * expression
        impl<'a, Sh: Shape> Mul<Expr<'a, $X, Sh>> for $X {
            type Output = Expr<'a, $X, Sh>;

            #[inline(always)]
            fn mul(self, expr: Expr<'a, $X, Sh>) -> Self::Output { expr * self }
        }

        // scalar * vector
        impl<'a, S: VectorStorage<Elem=$X>> Mul<&'a Vector<S>> for $X {
            type Output = VectorExpr<'a, $X>;

            #[inline(always)]
            fn mul(self, vector: &'a Vector<S>) -> Self::Output { vector * self }
        }

        // scalar * matrix
        impl<'a, S: MatrixStorage<Elem=$X>, L: StorageLayout> Mul<&'a Matrix<S, L>> for $X {
            type Output = MatrixExpr<'a, $X>;

            #[inline(always)]
            fn mul(self, matrix: &'a Matrix<S, L>) -> Self::Output { matrix * self }
        }
    };
}

// ---------------------------------------------------------------------------
// assign ops

impl<'a, S, R> AddAssign<R> for Vector<S>
where
    S: VectorStorage,
    S::Elem: Ring + PrimitiveRing + 'a,
    R: IntoExpr<'a, Elem=S::Elem, Shape=usize>,
{
    #[inline]
    fn add_assign(&mut self, other: R)
    { vector_update(self, other.into_expr(), |a, b| a + b) }
}

impl<'a, S, R> SubAssign<R> for Vector<S>
where
    S: VectorStorage,
    S::Elem: Ring + PrimitiveRing + 'a,
    R: IntoExpr<'a, Elem=S::Elem, Shape=usize>,
{
    #[inline]
    fn sub_assign(&mut self, other: R)
    { vector_update(self, other.into_expr(), |a, b| a - b) }
}

impl<X, S> MulAssign<X> for Vector<S>
where
    S: VectorStorage<Elem=X>,
    X: Ring + PrimitiveRing,
{
    #[inline]
    fn mul_assign(&mut self, scalar: X) {
        for x in self.iter_mut() {
            *x = *x * scalar;
        }
    }
}

impl<X, S> DivAssign<X> for Vector<S>
where
    S: VectorStorage<Elem=X>,
    X: Ring + PrimitiveRing,
{
    #[inline]
    fn div_assign(&mut self, scalar: X) {
        for x in self.iter_mut() {
            *x = *x / scalar;
        }
    }
}

impl<'a, S, L, R> AddAssign<R> for Matrix<S, L>
where
    S: MatrixStorage,
    S::Elem: Ring + PrimitiveRing + 'a,
    L: StorageLayout,
    R: IntoExpr<'a, Elem=S::Elem, Shape=Dims>,
{
    #[inline]
    fn add_assign(&mut self, other: R)
    { matrix_update(self, other.into_expr(), |a, b| a + b) }
}

impl<'a, S, L, R> SubAssign<R> for Matrix<S, L>
where
    S: MatrixStorage,
    S::Elem: Ring + PrimitiveRing + 'a,
    L: StorageLayout,
    R: IntoExpr<'a, Elem=S::Elem, Shape=Dims>,
{
    #[inline]
    fn sub_assign(&mut self, other: R)
    { matrix_update(self, other.into_expr(), |a, b| a - b) }
}

impl<X, S, L> MulAssign<X> for Matrix<S, L>
where
    S: MatrixStorage<Elem=X>,
    X: Ring + PrimitiveRing,
    L: StorageLayout,
{
    #[inline]
    fn mul_assign(&mut self, scalar: X) {
        for x in self.as_mut_slice() {
            *x = *x * scalar;
        }
    }
}

impl<X, S, L> DivAssign<X> for Matrix<S, L>
where
    S: MatrixStorage<Elem=X>,
    X: Ring + PrimitiveRing,
    L: StorageLayout,
{
    #[inline]
    fn div_assign(&mut self, scalar: X) {
        for x in self.as_mut_slice() {
            *x = *x / scalar;
        }
    }
}

fn vector_update<S, F>(dest: &mut Vector<S>, expr: VectorExpr<'_, S::Elem>, f: F)
where
    S: VectorStorage,
    S::Elem: Ring + PrimitiveRing,
    F: Fn(S::Elem, S::Elem) -> S::Elem,
{
    if let Err(e) = check_same_size(dest.size(), expr.len()) {
        panic!("{}", e);
    }
    let dest = dest.as_mut_slice();
    expr.for_each_in(Layout::RowMajor, |k, x| dest[k] = f(dest[k], x));
}

fn matrix_update<S, L, F>(dest: &mut Matrix<S, L>, expr: MatrixExpr<'_, S::Elem>, f: F)
where
    S: MatrixStorage,
    S::Elem: Ring + PrimitiveRing,
    L: StorageLayout,
    F: Fn(S::Elem, S::Elem) -> S::Elem,
{
    let (expected, actual) = (dest.shape(), expr.shape());
    if expected != actual {
        panic!("{}", Dims::mismatch(expected, actual));
    }
    let dest = dest.as_mut_slice();
    expr.for_each_in(L::LAYOUT, |k, x| dest[k] = f(dest[k], x));
}

#[cfg(test)]
mod tests {
    use crate::{V3, VecD, MatD, M22, ColMajor};

    #[test]
    fn operators_build_lazy_trees() {
        let x = V3::from([1.0, 2.0, 3.0]);
        let y = V3::from([4.0, 5.0, 6.0]);

        let e = 2.0_f64 * &x - &y / 2.0;
        assert_eq!(e.depth(), 3);
        assert_eq!(V3::from_expr(e).unwrap().into_array(), [0.0, 1.5, 3.0]);

        let e = -(&x + &y) + &x;
        assert_eq!(V3::from_expr(e).unwrap().into_array(), [-4.0, -5.0, -6.0]);
    }

    #[test]
    fn fixed_and_dynamic_operands_mix() {
        let x = V3::from([1, 2, 3]);
        let y = VecD::<i32>::from([10, 20, 30]);
        let z = VecD::<i32>::from_expr(&y - &x * 3).unwrap();
        assert_eq!(z.as_slice(), &[7, 14, 21]);
    }

    #[test]
    #[should_panic(expected = "incompatible vector sizes: expected 3, got 2")]
    fn addition_panics_on_mismatch() {
        let x = VecD::<f64>::from([1.0, 2.0, 3.0]);
        let y = VecD::<f64>::from([1.0, 2.0]);
        let _ = &x + &y;
    }

    #[test]
    fn compound_assignment() {
        let mut v = V3::from([1.0, 2.0, 3.0]);
        let w = VecD::<f64>::from([1.0, 1.0, 1.0]);
        v += &w;
        v -= &w * 4.0;
        v *= 2.0;
        v /= 4.0;
        assert_eq!(v.into_array(), [-1.0, -0.5, 0.0]);
    }

    #[test]
    #[should_panic(expected = "incompatible matrix sizes: expected 2x2, got 1x4")]
    fn compound_assignment_panics_on_mismatch() {
        let mut m = M22::<i32>::new();
        let n = MatD::<i32>::with_shape(1, 4).unwrap();
        m += &n;
    }

    #[test]
    fn matrix_ops_across_layouts() {
        let a = MatD::<f64>::from([[1.0, 2.0], [3.0, 4.0]]);
        let b = MatD::<f64, ColMajor>::from([[1.0, 2.0], [3.0, 4.0]]);

        let mut c = MatD::<f64, ColMajor>::from_expr(&a * 0.5 + &b).unwrap();
        assert_eq!(c.get(0, 1), 3.0);
        assert_eq!(c.get(1, 0), 4.5);

        c -= &a;
        c *= 2.0;
        assert_eq!(c.as_slice(), &[1.0, 3.0, 2.0, 4.0]);
    }
}
