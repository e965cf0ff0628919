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
use crate::dynamic::{DynBuf, Global, RawAlloc};
use crate::errors::{Error, Result};
use crate::expr::{Expr, IntoExpr, VectorExpr};
use crate::layout::Layout;
use crate::storage::VectorStorage;
use crate::traits::{Dim, Semiring, Ring, Field, check_dim};
use crate::traits::internal::{PrimitiveSemiring, PrimitiveRing, PrimitiveFloat};

use std::fmt;
use std::ops::{Index, IndexMut};

/// A vector with operations for linear algebra.
///
/// `S` is the storage: `[X; N]` for a fixed size, or [`DynBuf`] for a size
/// chosen at runtime. See [`VecN`] and [`VecD`].
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Vector<S> {
    storage: S,
}

/// A vector with a size fixed at compile time.
pub type VecN<X, const N: usize> = Vector<[X; N]>;
/// A heap-allocated vector whose size can change.
pub type VecD<X, A = Global> = Vector<DynBuf<X, A>>;

pub type V2<X = f64> = VecN<X, 2>;
pub type V3<X = f64> = VecN<X, 3>;
pub type V4<X = f64> = VecN<X, 4>;

pub type Iter<'a, X> = std::slice::Iter<'a, X>;
pub type IterMut<'a, X> = std::slice::IterMut<'a, X>;

// ---------------------------------------------------------------------------
// all storage

impl<S: VectorStorage> Vector<S> {
    /// An empty dynamic vector, or a fixed vector of default values.
    #[inline]
    pub fn new() -> Self
    where S::Elem: Default,
    { Vector { storage: S::new_default() } }

    #[inline(always)]
    pub fn from_storage(storage: S) -> Self { Vector { storage } }

    #[inline(always)]
    pub fn into_storage(self) -> S { self.storage }

    /// Materialize an expression (or copy a vector) into a new vector.
    ///
    /// Fails if the storage is fixed and the size does not match.
    pub fn from_expr<'a, E>(expr: E) -> Result<Self>
    where
        E: IntoExpr<'a, Elem=S::Elem, Shape=usize>,
        S::Elem: Ring + PrimitiveRing + 'a,
    {
        let mut out = Self::new();
        out.assign(expr)?;
        Ok(out)
    }

    #[inline(always)]
    pub fn size(&self) -> usize { self.storage.len() }

    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.size() == 0 }

    /// Panics if `i` is out of bounds.
    #[inline(always)]
    pub fn get(&self, i: usize) -> S::Elem
    where S::Elem: Copy,
    { self.as_slice()[i] }

    /// Write an element, returning `self` for chaining.
    ///
    /// Panics if `i` is out of bounds.
    #[inline(always)]
    pub fn set(&mut self, i: usize, value: S::Elem) -> &mut Self {
        self.as_mut_slice()[i] = value;
        self
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[S::Elem] { self.storage.as_slice() }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [S::Elem] { self.storage.as_mut_slice() }

    /// Pointer to the first element. Null if the vector is dynamic and empty.
    #[inline(always)]
    pub fn as_ptr(&self) -> *const S::Elem { self.storage.as_ptr() }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut S::Elem { self.storage.as_mut_ptr() }

    #[inline(always)]
    pub fn iter(&self) -> Iter<'_, S::Elem> { self.as_slice().iter() }

    #[inline(always)]
    pub fn iter_mut(&mut self) -> IterMut<'_, S::Elem> { self.as_mut_slice().iter_mut() }

    /// A leaf expression borrowing this vector.
    #[inline]
    pub fn expr(&self) -> VectorExpr<'_, S::Elem>
    { Expr::leaf(self.as_slice(), self.size(), Layout::RowMajor) }

    /// Evaluate an expression into this vector.
    ///
    /// Dynamic vectors are resized (discarding their contents) if the size
    /// differs. Fixed vectors of the wrong size produce
    /// [`Error::VectorSizeMismatch`] and are left untouched.
    pub fn assign<'a, E>(&mut self, expr: E) -> Result<&mut Self>
    where
        E: IntoExpr<'a, Elem=S::Elem, Shape=usize>,
        S::Elem: Ring + PrimitiveRing + 'a,
    {
        let expr = expr.into_expr();
        self.storage.ensure_len(expr.len())?;

        let dest = self.storage.as_mut_slice();
        expr.for_each_in(Layout::RowMajor, |k, x| dest[k] = x);
        Ok(self)
    }

    /// Copy a list of elements into this vector.
    ///
    /// Sizing follows the same rules as [`Vector::assign`].
    pub fn assign_slice(&mut self, values: &[S::Elem]) -> Result<&mut Self>
    where S::Elem: Clone + Default,
    {
        self.storage.ensure_len(values.len())?;
        for (dest, x) in itertools::zip_eq(self.storage.as_mut_slice(), values) {
            *dest = x.clone();
        }
        Ok(self)
    }

    /// Inner product.
    ///
    /// Panics if the sizes differ.
    #[inline]
    pub fn dot<V>(&self, other: &V) -> S::Elem
    where
        V: ReadableVector<Elem=S::Elem> + ?Sized,
        S::Elem: Semiring + PrimitiveSemiring,
    { crate::numeric::dot(self, other) }

    /// Squared Euclidean norm.
    #[inline]
    pub fn length_squared(&self) -> S::Elem
    where S::Elem: Semiring + PrimitiveSemiring,
    { crate::numeric::length_squared(self) }

    /// Euclidean norm.
    #[inline]
    pub fn length(&self) -> S::Elem
    where S::Elem: Field + PrimitiveFloat,
    { crate::numeric::length(self) }

    /// Divide by the length, in place.
    ///
    /// A zero vector produces NaNs.
    #[inline]
    pub fn normalize(&mut self) -> &mut Self
    where S::Elem: Field + PrimitiveFloat,
    {
        crate::numeric::normalize(self);
        self
    }
}

// ---------------------------------------------------------------------------
// dynamic storage

impl<X, A: RawAlloc> Vector<DynBuf<X, A>> {
    /// A vector of `size` default values.
    ///
    /// Fails with [`Error::InvalidArgument`] if `size` is negative.
    pub fn with_size(size: impl Dim) -> Result<Self>
    where X: Default,
    {
        let size = check_dim("vector size", size)?;
        Ok(Vector { storage: DynBuf::with_len(size)? })
    }

    /// A vector holding a copy of `values`.
    #[inline]
    pub fn from_slice(values: &[X]) -> Result<Self>
    where X: Clone,
    { Ok(Vector { storage: DynBuf::from_slice(values)? }) }

    /// Change the size, keeping the leading elements.
    ///
    /// New elements are defaulted. A negative size fails with
    /// [`Error::InvalidArgument`] and changes nothing; so does a failed
    /// allocation, or a panicking `clone`.
    pub fn resize(&mut self, size: impl Dim) -> Result<&mut Self>
    where X: Clone + Default,
    {
        let size = check_dim("vector size", size)?;
        self.storage.resize(size)?;
        Ok(self)
    }

    /// Change the size, discarding the contents.
    ///
    /// Every element afterwards is the default value. A negative size or a
    /// failed allocation changes nothing, but if `default` panics the vector
    /// is left empty.
    pub fn resize_fast(&mut self, size: impl Dim) -> Result<&mut Self>
    where X: Default,
    {
        let size = check_dim("vector size", size)?;
        self.storage.resize_fast(size)?;
        Ok(self)
    }

    /// Fallible clone.
    #[inline]
    pub fn try_clone(&self) -> Result<Self>
    where X: Clone,
    { Ok(Vector { storage: self.storage.try_clone()? }) }
}

impl<X, A: RawAlloc, const N: usize> From<[X; N]> for Vector<DynBuf<X, A>> {
    #[inline]
    fn from(array: [X; N]) -> Self { Vector { storage: DynBuf::from(array) } }
}

impl<X, const N: usize> From<[X; N]> for Vector<[X; N]> {
    #[inline(always)]
    fn from(array: [X; N]) -> Self { Vector { storage: array } }
}

impl<X, const N: usize> From<Vector<[X; N]>> for [X; N] {
    #[inline(always)]
    fn from(v: Vector<[X; N]>) -> Self { v.storage }
}

impl<X, const N: usize> Vector<[X; N]> {
    #[inline(always)]
    pub const fn from_array(array: [X; N]) -> Self { Vector { storage: array } }

    #[inline(always)]
    pub fn into_array(self) -> [X; N] { self.storage }

    /// Construct from a function on indices.
    #[inline]
    pub fn from_fn<F>(mut f: F) -> Self
    where F: FnMut(usize) -> X,
    {
        let mut i = 0;
        Vector::from_array([(); N].map(|()| { i += 1; f(i - 1) }))
    }
}

// ---------------------------------------------------------------------------

impl<S: VectorStorage> Default for Vector<S>
where S::Elem: Default,
{
    #[inline]
    fn default() -> Self { Self::new() }
}

impl<S: VectorStorage> Index<usize> for Vector<S> {
    type Output = S::Elem;

    #[inline(always)]
    fn index(&self, i: usize) -> &S::Elem { &self.as_slice()[i] }
}

impl<S: VectorStorage> IndexMut<usize> for Vector<S> {
    #[inline(always)]
    fn index_mut(&mut self, i: usize) -> &mut S::Elem { &mut self.as_mut_slice()[i] }
}

impl<'a, S: VectorStorage> IntoIterator for &'a Vector<S> {
    type Item = &'a S::Elem;
    type IntoIter = Iter<'a, S::Elem>;

    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl<'a, S: VectorStorage> IntoIterator for &'a mut Vector<S> {
    type Item = &'a mut S::Elem;
    type IntoIter = IterMut<'a, S::Elem>;

    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter { self.iter_mut() }
}

impl<S: VectorStorage> ReadableVector for Vector<S>
where S::Elem: Copy,
{
    type Elem = S::Elem;

    #[inline(always)]
    fn size(&self) -> usize { Vector::size(self) }

    #[inline(always)]
    fn get(&self, i: usize) -> S::Elem { Vector::get(self, i) }
}

impl<S: VectorStorage> WritableVector for Vector<S>
where S::Elem: Copy + Default,
{
    #[inline(always)]
    fn set(&mut self, i: usize, value: S::Elem) -> &mut Self { Vector::set(self, i, value) }

    #[inline(always)]
    fn ensure_size(&mut self, size: usize) -> Result<()> { self.storage.ensure_len(size) }
}

impl<'a, S: VectorStorage> IntoExpr<'a> for &'a Vector<S>
where S::Elem: 'a,
{
    type Elem = S::Elem;
    type Shape = usize;

    #[inline(always)]
    fn into_expr(self) -> VectorExpr<'a, S::Elem> { self.expr() }
}

// forward the debug impl without a surrounding "Vector { storage: ... }",
// which keeps the output valid JSON for most element types
impl<S: VectorStorage> fmt::Debug for Vector<S>
where S::Elem: fmt::Debug,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    { fmt::Debug::fmt(self.as_slice(), f) }
}

// fmt traits apply the format to each element for convenience.
gen_each!{
    [{Display} {LowerExp} {UpperExp}]
    impl_vector_fmt!({$Format:ident}) => {
        impl<S: VectorStorage> fmt::$Format for Vector<S>
        where S::Elem: fmt::$Format,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "[")?;
                let mut iter = self.iter();
                if let Some(first) = iter.next() {
                    fmt::$Format::fmt(first, f)?;
                }
                for x in iter {
                    write!(f, ", ")?;
                    fmt::$Format::fmt(x, f)?;
                }
                write!(f, "]")
            }
        }
    };
}

/// Fails with a size mismatch unless both sizes agree.
#[inline]
pub(crate) fn check_same_size(expected: usize, actual: usize) -> Result<()> {
    match expected == actual {
        true => Ok(()),
        false => Err(Error::VectorSizeMismatch { expected, actual }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction() {
        let v = VecD::<f64>::new();
        assert_eq!(v.size(), 0);
        assert!(v.as_ptr().is_null());

        let v = VecD::<f64>::with_size(3).unwrap();
        assert_eq!(v.as_slice(), &[0.0; 3]);

        assert!(matches!(VecD::<f64>::with_size(-2), Err(Error::InvalidArgument(_))));

        let v = V3::<i32>::new();
        assert_eq!(v.into_array(), [0, 0, 0]);

        let v = VecD::<i32>::from([1, 2, 3, 4]);
        assert_eq!(v.size(), 4);
        assert_eq!(v[3], 4);

        let v = V4::from_fn(|i| i * i);
        assert_eq!(v.into_array(), [0, 1, 4, 9]);
    }

    #[test]
    fn chained_set() {
        let mut v = V3::<f64>::new();
        v.set(0, 1.0).set(2, 3.0);
        assert_eq!(v.into_array(), [1.0, 0.0, 3.0]);
    }

    #[test]
    fn from_expr_sizes_dynamic_destinations() {
        let a = V3::from([1.0, 2.0, 3.0]);
        let v = VecD::<f64>::from_expr(&a * 2.0).unwrap();
        assert_eq!(v.as_slice(), &[2.0, 4.0, 6.0]);

        // fixed destinations must already agree
        let err = VecN::<f64, 2>::from_expr(&a).unwrap_err();
        assert_eq!(err, Error::VectorSizeMismatch { expected: 2, actual: 3 });
    }

    #[test]
    fn assign_slice() {
        let mut v = VecD::<i32>::new();
        v.assign_slice(&[5, 6, 7]).unwrap();
        assert_eq!(v.as_slice(), &[5, 6, 7]);

        let mut w = V2::<i32>::new();
        assert!(w.assign_slice(&[1, 2, 3]).is_err());
        assert_eq!(w.into_array(), [0, 0]);
    }

    #[test]
    fn resize_validates_before_touching() {
        let mut v = VecD::<f64>::from([1.0, 2.0, 3.0]);
        assert!(matches!(v.resize(-1), Err(Error::InvalidArgument(_))));
        assert!(matches!(v.resize_fast(-1_i64), Err(Error::InvalidArgument(_))));
        assert_eq!(v.as_slice(), &[1.0, 2.0, 3.0]);

        v.resize(5_u8).unwrap();
        assert_eq!(v.as_slice(), &[1.0, 2.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn formatting() {
        let v = V3::from([1.0, 0.5, 0.25]);
        assert_eq!(format!("{}", v), "[1, 0.5, 0.25]");
        assert_eq!(format!("{:.2}", v), "[1.00, 0.50, 0.25]");
        assert_eq!(format!("{:?}", v), "[1.0, 0.5, 0.25]");
        assert_eq!(format!("{}", VecD::<f64>::new()), "[]");
    }

    #[test]
    fn size_check() {
        assert_eq!(check_same_size(3, 3), Ok(()));
        assert!(check_same_size(3, 2).is_err());
    }
}
