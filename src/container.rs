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

//! The capabilities shared by stored containers and lazy expressions.
//!
//! Anything readable can be fed to [`dot`](crate::dot) and friends;
//! anything writable can be the destination of sampling and assignment.

use crate::errors::Result;

/// Elementwise read access to something vector-shaped.
pub trait ReadableVector {
    type Elem: Copy;

    fn size(&self) -> usize;

    /// Panics if `i >= self.size()`.
    fn get(&self, i: usize) -> Self::Elem;
}

/// A readable vector that can also be written.
pub trait WritableVector: ReadableVector {
    /// Panics if `i >= self.size()`.
    fn set(&mut self, i: usize, value: Self::Elem) -> &mut Self;

    /// Make the size equal to `size`.
    ///
    /// Dynamic storage is resized with its contents discarded;
    /// fixed storage of a different size produces a size mismatch error.
    fn ensure_size(&mut self, size: usize) -> Result<()>;
}

/// Elementwise read access to something matrix-shaped.
pub trait ReadableMatrix {
    type Elem: Copy;

    fn rows(&self) -> usize;
    fn cols(&self) -> usize;

    #[inline]
    fn size(&self) -> usize { self.rows() * self.cols() }

    /// Panics if either index is out of bounds.
    fn get(&self, row: usize, col: usize) -> Self::Elem;
}

/// A readable matrix that can also be written.
pub trait WritableMatrix: ReadableMatrix {
    /// Panics if either index is out of bounds.
    fn set(&mut self, row: usize, col: usize, value: Self::Elem) -> &mut Self;

    /// Make the shape equal to `(rows, cols)`.
    fn ensure_shape(&mut self, rows: usize, cols: usize) -> Result<()>;
}

impl<X: Copy> ReadableVector for [X] {
    type Elem = X;

    #[inline(always)]
    fn size(&self) -> usize { self.len() }

    #[inline(always)]
    fn get(&self, i: usize) -> X { self[i] }
}

impl<'a, V: ReadableVector + ?Sized> ReadableVector for &'a V {
    type Elem = V::Elem;

    #[inline(always)]
    fn size(&self) -> usize { (**self).size() }

    #[inline(always)]
    fn get(&self, i: usize) -> V::Elem { (**self).get(i) }
}

impl<'a, M: ReadableMatrix + ?Sized> ReadableMatrix for &'a M {
    type Elem = M::Elem;

    #[inline(always)]
    fn rows(&self) -> usize { (**self).rows() }

    #[inline(always)]
    fn cols(&self) -> usize { (**self).cols() }

    #[inline(always)]
    fn get(&self, row: usize, col: usize) -> M::Elem { (**self).get(row, col) }
}
