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

use crate::container::{ReadableMatrix, WritableMatrix};
use crate::dynamic::{DynBuf, Global, RawAlloc};
use crate::errors::{Error, Result};
use crate::expr::{Dims, Expr, IntoExpr, MatrixExpr, Shape};
use crate::layout::{HasLayoutTag, Layout, RowMajor, StorageLayout};
use crate::storage::MatrixStorage;
use crate::traits::{Dim, Ring, check_dim};
use crate::traits::internal::PrimitiveRing;

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A matrix stored as a flat buffer in the order chosen by `L`.
///
/// `S` is `[[X; C]; R]` for a shape fixed at compile time (the nesting only
/// fixes the element count; the buffer is always read through `L`), or
/// [`DynBuf`] for a shape chosen at runtime. See [`MatN`] and [`MatD`].
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Matrix<S, L = RowMajor> {
    storage: S,
    rows: usize,
    cols: usize,
    _layout: PhantomData<L>,
}

/// A matrix with a shape fixed at compile time.
pub type MatN<X, const R: usize, const C: usize, L = RowMajor> = Matrix<[[X; C]; R], L>;
/// A heap-allocated matrix whose shape can change.
pub type MatD<X, L = RowMajor, A = Global> = Matrix<DynBuf<X, A>, L>;

pub type M22<X = f64> = MatN<X, 2, 2>;
pub type M33<X = f64> = MatN<X, 3, 3>;
pub type M44<X = f64> = MatN<X, 4, 4>;

// ---------------------------------------------------------------------------
// all storage

impl<S: MatrixStorage, L: StorageLayout> Matrix<S, L> {
    /// An empty dynamic matrix, or a fixed matrix of default values.
    #[inline]
    pub fn new() -> Self
    where S::Elem: Default,
    {
        let (rows, cols) = S::FIXED_SHAPE.unwrap_or((0, 0));
        Matrix { storage: S::new_default(), rows, cols, _layout: PhantomData }
    }

    /// Materialize an expression (or copy a matrix of any layout) into a new matrix.
    ///
    /// Fails if the storage is fixed and the shape does not match.
    pub fn from_expr<'a, E>(expr: E) -> Result<Self>
    where
        E: IntoExpr<'a, Elem=S::Elem, Shape=Dims>,
        S::Elem: Ring + PrimitiveRing + 'a,
    {
        let mut out = Self::new();
        out.assign(expr)?;
        Ok(out)
    }

    /// Build a matrix from its rows.
    ///
    /// Dynamic matrices are sized to fit; fixed matrices must already agree.
    pub fn from_rows<const C: usize>(rows: &[[S::Elem; C]]) -> Result<Self>
    where S::Elem: Clone + Default,
    {
        let mut out = Self::new();
        out.ensure_shape_impl(rows.len(), C)?;
        for (r, row) in rows.iter().enumerate() {
            for (c, x) in row.iter().enumerate() {
                out.set(r, c, x.clone());
            }
        }
        Ok(out)
    }

    #[inline(always)] pub fn rows(&self) -> usize { self.rows }
    #[inline(always)] pub fn cols(&self) -> usize { self.cols }
    #[inline(always)] pub fn size(&self) -> usize { self.rows * self.cols }
    #[inline(always)] pub fn shape(&self) -> Dims { Dims::new(self.rows, self.cols) }

    /// The storage order of the flat buffer.
    #[inline(always)]
    pub fn layout(&self) -> Layout { L::LAYOUT }

    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> S::Elem
    where S::Elem: Copy,
    { self[(row, col)] }

    /// Write an element, returning `self` for chaining.
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: S::Elem) -> &mut Self {
        self[(row, col)] = value;
        self
    }

    /// The flat buffer, in storage order.
    #[inline(always)]
    pub fn as_slice(&self) -> &[S::Elem] { self.storage.as_slice() }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [S::Elem] { self.storage.as_mut_slice() }

    /// Pointer to the first element. Null if the matrix is dynamic and empty.
    #[inline(always)]
    pub fn as_ptr(&self) -> *const S::Elem { self.storage.as_ptr() }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut S::Elem { self.storage.as_mut_ptr() }

    /// Iterate over the elements in storage order.
    #[inline(always)]
    pub fn iter(&self) -> std::slice::Iter<'_, S::Elem> { self.as_slice().iter() }

    /// A leaf expression borrowing this matrix.
    #[inline]
    pub fn expr(&self) -> MatrixExpr<'_, S::Elem>
    { Expr::leaf(self.as_slice(), self.shape(), L::LAYOUT) }

    /// Evaluate an expression into this matrix.
    ///
    /// Dynamic matrices take on the shape of the expression, discarding their
    /// contents if the element count changes. Fixed matrices of the wrong
    /// shape produce [`Error::MatrixSizeMismatch`] and are left untouched.
    pub fn assign<'a, E>(&mut self, expr: E) -> Result<&mut Self>
    where
        E: IntoExpr<'a, Elem=S::Elem, Shape=Dims>,
        S::Elem: Ring + PrimitiveRing + 'a,
    {
        let expr = expr.into_expr();
        let shape = expr.shape();
        self.ensure_shape_impl(shape.rows, shape.cols)?;

        let dest = self.storage.as_mut_slice();
        expr.for_each_in(L::LAYOUT, |k, x| dest[k] = x);
        Ok(self)
    }

    fn ensure_shape_impl(&mut self, rows: usize, cols: usize) -> Result<()>
    where S::Elem: Default,
    { self.reshape_with(rows, cols, |storage| storage.ensure_shape((rows, cols))) }

    /// Run a storage mutation that may empty the buffer if it panics, and
    /// adopt the new shape if it succeeds.
    fn reshape_with<F>(&mut self, rows: usize, cols: usize, mutate: F) -> Result<()>
    where F: FnOnce(&mut S) -> Result<()>,
    {
        let old = (self.rows, self.cols);
        self.rows = 0;
        self.cols = 0;
        match mutate(&mut self.storage) {
            Ok(()) => {
                self.rows = rows;
                self.cols = cols;
                Ok(())
            },
            Err(e) => {
                self.rows = old.0;
                self.cols = old.1;
                Err(e)
            },
        }
    }

    #[inline]
    fn offset(&self, index: (usize, usize)) -> usize
    { self.shape().offset(index, L::LAYOUT) }
}

// ---------------------------------------------------------------------------
// dynamic storage

impl<X, L: StorageLayout, A: RawAlloc> Matrix<DynBuf<X, A>, L> {
    /// A `rows x cols` matrix of default values.
    ///
    /// Fails with [`Error::InvalidArgument`] if either dimension is negative.
    pub fn with_shape(rows: impl Dim, cols: impl Dim) -> Result<Self>
    where X: Default,
    {
        let (rows, cols) = checked_shape::<X, _, _>(rows, cols)?;
        let storage = DynBuf::with_len(rows * cols)?;
        Ok(Matrix { storage, rows, cols, _layout: PhantomData })
    }

    /// A matrix holding a copy of `values`, which are given row by row.
    pub fn from_slice(rows: impl Dim, cols: impl Dim, values: &[X]) -> Result<Self>
    where X: Clone,
    {
        let (rows, cols) = checked_shape::<X, _, _>(rows, cols)?;
        if values.len() != rows * cols {
            return Err(Error::invalid_argument(format!(
                "{} values cannot fill a {}x{} matrix", values.len(), rows, cols,
            )));
        }
        let shape = Dims::new(rows, cols);
        let storage = DynBuf::from_fn(rows * cols, |k| {
            let index = shape.index_of(k, L::LAYOUT);
            values[Layout::RowMajor.offset(index, (rows, cols))].clone()
        })?;
        Ok(Matrix { storage, rows, cols, _layout: PhantomData })
    }

    /// Change the shape, keeping the leading elements of the flat buffer.
    ///
    /// New elements are defaulted. If the element count does not change,
    /// the buffer is left alone and only the shape is updated. A negative
    /// dimension fails with [`Error::InvalidArgument`] and changes nothing;
    /// so does a failed allocation, or a panicking `clone`.
    pub fn resize(&mut self, rows: impl Dim, cols: impl Dim) -> Result<&mut Self>
    where X: Clone + Default,
    {
        let (rows, cols) = checked_shape::<X, _, _>(rows, cols)?;
        self.storage.resize(rows * cols)?;
        self.rows = rows;
        self.cols = cols;
        Ok(self)
    }

    /// Change the shape, discarding the contents.
    ///
    /// Every element afterwards is the default value (unless the element
    /// count is unchanged, in which case the buffer is left alone). A negative
    /// dimension or a failed allocation changes nothing, but if `default`
    /// panics the matrix is left empty.
    pub fn resize_fast(&mut self, rows: impl Dim, cols: impl Dim) -> Result<&mut Self>
    where X: Default,
    {
        let (rows, cols) = checked_shape::<X, _, _>(rows, cols)?;
        self.reshape_with(rows, cols, |storage| storage.resize_fast(rows * cols))?;
        Ok(self)
    }

    /// Fallible clone.
    #[inline]
    pub fn try_clone(&self) -> Result<Self>
    where X: Clone,
    {
        let storage = self.storage.try_clone()?;
        Ok(Matrix { storage, rows: self.rows, cols: self.cols, _layout: PhantomData })
    }
}

fn checked_shape<X, R: Dim, C: Dim>(rows: R, cols: C) -> Result<(usize, usize)> {
    let rows = check_dim("row count", rows)?;
    let cols = check_dim("column count", cols)?;
    match rows.checked_mul(cols) {
        Some(_) => Ok((rows, cols)),
        None => Err(Error::allocation_failure::<X>(rows.saturating_mul(cols))),
    }
}

impl<X, L: StorageLayout, const R: usize, const C: usize> From<[[X; C]; R]> for Matrix<[[X; C]; R], L>
where X: Copy + Default,
{
    /// Interpret nested arrays as a list of rows.
    fn from(rows: [[X; C]; R]) -> Self {
        let mut out = Self::new();
        for r in 0..R {
            for c in 0..C {
                out.set(r, c, rows[r][c]);
            }
        }
        out
    }
}

impl<X, L: StorageLayout, A: RawAlloc, const R: usize, const C: usize> From<[[X; C]; R]> for Matrix<DynBuf<X, A>, L>
where X: Copy,
{
    /// Interpret nested arrays as a list of rows.
    fn from(rows: [[X; C]; R]) -> Self {
        let shape = Dims::new(R, C);
        let storage = DynBuf::from_fn(R * C, |k| {
            let (r, c) = shape.index_of(k, L::LAYOUT);
            rows[r][c]
        }).unwrap_or_else(|_| crate::dynamic::on_alloc_failure::<X>(R * C));
        Matrix { storage, rows: R, cols: C, _layout: PhantomData }
    }
}

// ---------------------------------------------------------------------------

impl<S: MatrixStorage, L: StorageLayout> Default for Matrix<S, L>
where S::Elem: Default,
{
    #[inline]
    fn default() -> Self { Self::new() }
}

impl<S: MatrixStorage, L: StorageLayout> Index<(usize, usize)> for Matrix<S, L> {
    type Output = S::Elem;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &S::Elem {
        let offset = self.offset(index);
        &self.as_slice()[offset]
    }
}

impl<S: MatrixStorage, L: StorageLayout> IndexMut<(usize, usize)> for Matrix<S, L> {
    #[inline]
    fn index_mut(&mut self, index: (usize, usize)) -> &mut S::Elem {
        let offset = self.offset(index);
        &mut self.as_mut_slice()[offset]
    }
}

impl<'a, S: MatrixStorage, L: StorageLayout> IntoIterator for &'a Matrix<S, L> {
    type Item = &'a S::Elem;
    type IntoIter = std::slice::Iter<'a, S::Elem>;

    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl<S, L: StorageLayout> HasLayoutTag for Matrix<S, L> {
    type Tag = L;
}

impl<S: MatrixStorage, L: StorageLayout> ReadableMatrix for Matrix<S, L>
where S::Elem: Copy,
{
    type Elem = S::Elem;

    #[inline(always)] fn rows(&self) -> usize { self.rows }
    #[inline(always)] fn cols(&self) -> usize { self.cols }

    #[inline(always)]
    fn get(&self, row: usize, col: usize) -> S::Elem { Matrix::get(self, row, col) }
}

impl<S: MatrixStorage, L: StorageLayout> WritableMatrix for Matrix<S, L>
where S::Elem: Copy + Default,
{
    #[inline(always)]
    fn set(&mut self, row: usize, col: usize, value: S::Elem) -> &mut Self
    { Matrix::set(self, row, col, value) }

    #[inline(always)]
    fn ensure_shape(&mut self, rows: usize, cols: usize) -> Result<()>
    { self.ensure_shape_impl(rows, cols) }
}

impl<'a, S: MatrixStorage, L: StorageLayout> IntoExpr<'a> for &'a Matrix<S, L>
where S::Elem: 'a,
{
    type Elem = S::Elem;
    type Shape = Dims;

    #[inline(always)]
    fn into_expr(self) -> MatrixExpr<'a, S::Elem> { self.expr() }
}

// Both print as a list of rows, regardless of layout.
impl<S: MatrixStorage, L: StorageLayout> fmt::Debug for Matrix<S, L>
where S::Elem: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries((0..self.rows).map(|r| RowDebug(self, r)))
            .finish()
    }
}

struct RowDebug<'m, S, L>(&'m Matrix<S, L>, usize);

impl<'m, S: MatrixStorage, L: StorageLayout> fmt::Debug for RowDebug<'m, S, L>
where S::Elem: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let RowDebug(matrix, r) = *self;
        f.debug_list()
            .entries((0..matrix.cols).map(|c| &matrix[(r, c)]))
            .finish()
    }
}

impl<S: MatrixStorage, L: StorageLayout> fmt::Display for Matrix<S, L>
where S::Elem: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for r in 0..self.rows {
            if r > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for c in 0..self.cols {
                if c > 0 {
                    write!(f, ", ")?;
                }
                fmt::Display::fmt(&self[(r, c)], f)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ColMajor, LayoutKind, layout_kind_of};

    #[test]
    fn layouts_agree_on_logical_contents() {
        let rows = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let a = MatN::<f64, 2, 3, RowMajor>::from(rows);
        let b = MatN::<f64, 2, 3, ColMajor>::from(rows);

        assert_eq!(a.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(b.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        for r in 0..2 {
            for c in 0..3 {
                assert_eq!(a.get(r, c), b.get(r, c));
            }
        }
        assert_eq!(format!("{:?}", a), format!("{:?}", b));
        assert_eq!(format!("{}", b), "[[1, 2, 3], [4, 5, 6]]");
    }

    #[test]
    fn dynamic_shapes() {
        let mut m = MatD::<i32>::with_shape(2, 3).unwrap();
        assert_eq!((m.rows(), m.cols(), m.size()), (2, 3, 6));

        assert!(matches!(MatD::<i32>::with_shape(2, -3), Err(Error::InvalidArgument(_))));
        assert!(matches!(m.resize(-1, 3), Err(Error::InvalidArgument(_))));
        assert!(matches!(m.resize_fast(1, -3), Err(Error::InvalidArgument(_))));
        assert_eq!((m.rows(), m.cols()), (2, 3));

        m.set(0, 0, 7).set(0, 1, 8);
        // same element count: buffer kept, shape adopted
        m.resize(3, 2).unwrap();
        assert_eq!((m.rows(), m.cols()), (3, 2));
        assert_eq!(&m.as_slice()[..2], &[7, 8]);

        m.resize(1, 4).unwrap();
        assert_eq!(m.as_slice(), &[7, 8, 0, 0]);

        m.resize_fast(2, 2).unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 2));

        m.resize(0, 5).unwrap();
        assert!(m.as_ptr().is_null());
    }

    #[test]
    fn from_slice_is_row_by_row() {
        let values = [1, 2, 3, 4, 5, 6];
        let m = MatD::<i32, ColMajor>::from_slice(3, 2, &values).unwrap();
        assert_eq!(m.get(0, 1), 2);
        assert_eq!(m.get(2, 0), 5);
        assert_eq!(m.as_slice(), &[1, 3, 5, 2, 4, 6]);

        assert!(MatD::<i32>::from_slice(4, 2, &values).is_err());
    }

    #[test]
    fn from_rows() {
        let m = MatD::<f32>::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap();
        assert_eq!((m.rows(), m.cols()), (3, 2));
        assert_eq!(m[(2, 1)], 6.0);

        let err = M22::<f32>::from_rows(&[[1.0, 2.0, 3.0]]).unwrap_err();
        assert_eq!(err, Error::MatrixSizeMismatch { expected: (2, 2), actual: (1, 3) });
    }

    #[test]
    fn assignment_converts_layout() {
        let a = MatD::<i32, RowMajor>::from([[1, 2], [3, 4], [5, 6]]);
        let mut b = MatD::<i32, ColMajor>::new();
        b.assign(&a).unwrap();

        assert_eq!((b.rows(), b.cols()), (3, 2));
        assert_eq!(b.as_slice(), &[1, 3, 5, 2, 4, 6]);

        let mut fixed = MatN::<i32, 2, 2>::new();
        assert!(fixed.assign(&a).is_err());
        assert_eq!(fixed.as_slice(), &[0; 4]);
    }

    #[test]
    fn mixed_layout_sum_is_logical() {
        let r = MatN::<i32, 2, 3, RowMajor>::from([[1, 2, 3], [4, 5, 6]]);
        let c = MatN::<i32, 2, 3, ColMajor>::from([[1, 2, 3], [4, 5, 6]]);
        let expected = [[2, 4, 6], [8, 10, 12]];

        let row_dest = MatD::<i32, RowMajor>::from_expr(&r + &c).unwrap();
        let col_dest = MatD::<i32, ColMajor>::from_expr(&c + &r).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(row_dest[(i, j)], expected[i][j]);
                assert_eq!(col_dest[(i, j)], expected[i][j]);
            }
        }

        let mut acc = MatD::<i32, ColMajor>::from([[0, 0, 0], [0, 0, 0]]);
        acc += &r;
        acc -= &c * 2;
        assert_eq!(acc.get(1, 2), -6);
        assert_eq!(acc.get(0, 1), -2);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn indices_are_checked_per_dimension() {
        let m = M33::<f64>::new();
        m.get(0, 3);
    }

    #[test]
    fn layout_tags() {
        assert_eq!(layout_kind_of::<MatD<f64, ColMajor>>(), LayoutKind::ColMajor);
        assert_eq!(layout_kind_of::<M33>(), LayoutKind::RowMajor);
        assert_eq!(MatD::<f64, ColMajor>::new().layout(), Layout::ColMajor);
    }
}
