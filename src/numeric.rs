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

use crate::container::{ReadableVector, WritableVector};
use crate::traits::{Semiring, Field};
use crate::traits::internal::{PrimitiveSemiring, PrimitiveFloat};

/// Inner product of two vectors (or vector expressions).
///
/// # Panics
///
/// Panics if the sizes differ.
pub fn dot<X, A, B>(a: &A, b: &B) -> X
where
    X: Semiring + PrimitiveSemiring,
    A: ReadableVector<Elem=X> + ?Sized,
    B: ReadableVector<Elem=X> + ?Sized,
{
    assert_eq!(a.size(), b.size(), "dot product of vectors with different sizes");
    (0..a.size()).map(|i| a.get(i) * b.get(i)).sum()
}

/// Squared Euclidean norm.
#[inline]
pub fn length_squared<X, V>(v: &V) -> X
where
    X: Semiring + PrimitiveSemiring,
    V: ReadableVector<Elem=X> + ?Sized,
{ dot(v, v) }

/// Euclidean norm.
#[inline]
pub fn length<X, V>(v: &V) -> X
where
    X: Field + PrimitiveFloat,
    V: ReadableVector<Elem=X> + ?Sized,
{ length_squared(v).sqrt() }

/// Divide every element by the length.
///
/// There is no check for a zero vector, which produces NaNs.
pub fn normalize<X, V>(v: &mut V)
where
    X: Field + PrimitiveFloat,
    V: WritableVector<Elem=X> + ?Sized,
{
    let norm = length(v);
    for i in 0..v.size() {
        let x = v.get(i);
        v.set(i, x / norm);
    }
}

/// `acos`, with the argument first clamped to `[-1, 1]`.
///
/// Dot products of unit vectors can overshoot slightly, and a plain `acos`
/// would produce NaN.
#[inline]
pub fn acos_safe<X: Field + PrimitiveFloat>(x: X) -> X
{ x.max(-X::one()).min(X::one()).acos() }
