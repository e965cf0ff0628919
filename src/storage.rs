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

//! The closed set of buffers that can back a vector or matrix.
//!
//! Fixed storage lives inline and can never change size; asking it to do so
//! is reported as a size mismatch. Dynamic storage is a [`DynBuf`].
//!
//! Vectors and matrices get separate traits because `[[X; C]; R]` is also
//! an array, and one trait could not tell it apart from `[X; N]`.

use crate::dynamic::{DynBuf, RawAlloc};
use crate::errors::{Error, Result};

use slice_of_array::prelude::*;

/// Storage for a 1-dimensional container.
pub trait VectorStorage: Sized {
    type Elem;

    /// `Some(n)` if every instance has exactly `n` elements.
    const FIXED_LEN: Option<usize>;

    fn as_slice(&self) -> &[Self::Elem];
    fn as_mut_slice(&mut self) -> &mut [Self::Elem];

    /// Null for empty dynamic storage.
    fn as_ptr(&self) -> *const Self::Elem;
    fn as_mut_ptr(&mut self) -> *mut Self::Elem;

    /// Fixed storage full of defaults, or empty dynamic storage.
    fn new_default() -> Self
    where Self::Elem: Default;

    /// Make room for exactly `len` elements, discarding the contents if
    /// the length changes.
    fn ensure_len(&mut self, len: usize) -> Result<()>
    where Self::Elem: Default;

    #[inline(always)]
    fn len(&self) -> usize { self.as_slice().len() }
}

/// Storage for a 2-dimensional container, as a flat buffer.
///
/// The shape of dynamic storage is tracked by the matrix; the buffer only
/// knows the element count.
pub trait MatrixStorage: Sized {
    type Elem;

    /// `Some((rows, cols))` if every instance has exactly this shape.
    const FIXED_SHAPE: Option<(usize, usize)>;

    fn as_slice(&self) -> &[Self::Elem];
    fn as_mut_slice(&mut self) -> &mut [Self::Elem];
    fn as_ptr(&self) -> *const Self::Elem;
    fn as_mut_ptr(&mut self) -> *mut Self::Elem;

    fn new_default() -> Self
    where Self::Elem: Default;

    /// Make room for exactly `rows * cols` elements, discarding the contents
    /// if the element count changes.
    fn ensure_shape(&mut self, shape: (usize, usize)) -> Result<()>
    where Self::Elem: Default;
}

// ---------------------------------------------------------------------------

impl<X, const N: usize> VectorStorage for [X; N] {
    type Elem = X;

    const FIXED_LEN: Option<usize> = Some(N);

    #[inline(always)] fn as_slice(&self) -> &[X] { self }
    #[inline(always)] fn as_mut_slice(&mut self) -> &mut [X] { self }
    #[inline(always)] fn as_ptr(&self) -> *const X { <[X]>::as_ptr(self) }
    #[inline(always)] fn as_mut_ptr(&mut self) -> *mut X { <[X]>::as_mut_ptr(self) }

    #[inline]
    fn new_default() -> Self
    where X: Default,
    { [(); N].map(|()| X::default()) }

    #[inline]
    fn ensure_len(&mut self, len: usize) -> Result<()> {
        match len == N {
            true => Ok(()),
            false => Err(Error::VectorSizeMismatch { expected: N, actual: len }),
        }
    }
}

impl<X, const R: usize, const C: usize> MatrixStorage for [[X; C]; R] {
    type Elem = X;

    const FIXED_SHAPE: Option<(usize, usize)> = Some((R, C));

    #[inline(always)] fn as_slice(&self) -> &[X] { self.flat() }
    #[inline(always)] fn as_mut_slice(&mut self) -> &mut [X] { self.flat_mut() }
    #[inline(always)] fn as_ptr(&self) -> *const X { self.flat().as_ptr() }
    #[inline(always)] fn as_mut_ptr(&mut self) -> *mut X { self.flat_mut().as_mut_ptr() }

    #[inline]
    fn new_default() -> Self
    where X: Default,
    { [(); R].map(|()| [(); C].map(|()| X::default())) }

    #[inline]
    fn ensure_shape(&mut self, shape: (usize, usize)) -> Result<()> {
        match shape == (R, C) {
            true => Ok(()),
            false => Err(Error::MatrixSizeMismatch { expected: (R, C), actual: shape }),
        }
    }
}

impl<X, A: RawAlloc> VectorStorage for DynBuf<X, A> {
    type Elem = X;

    const FIXED_LEN: Option<usize> = None;

    #[inline(always)] fn as_slice(&self) -> &[X] { DynBuf::as_slice(self) }
    #[inline(always)] fn as_mut_slice(&mut self) -> &mut [X] { DynBuf::as_mut_slice(self) }
    #[inline(always)] fn as_ptr(&self) -> *const X { DynBuf::as_ptr(self) }
    #[inline(always)] fn as_mut_ptr(&mut self) -> *mut X { DynBuf::as_mut_ptr(self) }

    #[inline(always)]
    fn new_default() -> Self { DynBuf::new() }

    #[inline]
    fn ensure_len(&mut self, len: usize) -> Result<()>
    where X: Default,
    { self.resize_fast(len) }
}

impl<X, A: RawAlloc> MatrixStorage for DynBuf<X, A> {
    type Elem = X;

    const FIXED_SHAPE: Option<(usize, usize)> = None;

    #[inline(always)] fn as_slice(&self) -> &[X] { DynBuf::as_slice(self) }
    #[inline(always)] fn as_mut_slice(&mut self) -> &mut [X] { DynBuf::as_mut_slice(self) }
    #[inline(always)] fn as_ptr(&self) -> *const X { DynBuf::as_ptr(self) }
    #[inline(always)] fn as_mut_ptr(&mut self) -> *mut X { DynBuf::as_mut_ptr(self) }

    #[inline(always)]
    fn new_default() -> Self { DynBuf::new() }

    #[inline]
    fn ensure_shape(&mut self, (rows, cols): (usize, usize)) -> Result<()>
    where X: Default,
    {
        let count = rows.checked_mul(cols)
            .ok_or_else(|| Error::allocation_failure::<X>(rows.saturating_mul(cols)))?;
        self.resize_fast(count)
    }
}
