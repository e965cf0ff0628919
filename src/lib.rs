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

//! Dense vectors and matrices, with either a size fixed at compile time or
//! heap storage that can be resized.
//!
//! Arithmetic is lazy: `a * &x + &y * b` builds an [`Expr`] that borrows `x`
//! and `y`, and nothing is computed until it is assigned into a container
//! (with [`Vector::assign`], [`Vector::from_expr`], or the matrix versions).
//!
//! ```
//! use rsp2_dense::{V3, VecD};
//!
//! let x = V3::from([1.0, 2.0, 3.0]);
//! let y = VecD::<f64>::from([0.5, 0.5, 0.5]);
//!
//! let mut z = VecD::<f64>::new();
//! z.assign(&x * 2.0 - &y).unwrap();
//! assert_eq!(z.as_slice(), &[1.5, 3.5, 5.5]);
//! ```

#[macro_use] extern crate log;

#[cfg(test)]
#[macro_use]
extern crate rsp2_assert_close;

#[macro_use] mod macros;
mod errors;
mod traits;
mod layout;
mod dynamic;
mod storage;
mod container;
mod expr;
mod vector;
mod matrix;
mod ops;
mod numeric;
mod random;
#[cfg(feature = "serde")]
mod serde_impls;
#[cfg(test)]
mod test_util;

pub use crate::errors::{Error, Result};
pub use crate::traits::{Semiring, Ring, Field, Dim};
pub use crate::layout::{Layout, LayoutKind, Outer};
pub use crate::layout::{LayoutTag, StorageLayout, HasLayoutTag, layout_kind_of};
pub use crate::layout::{RowMajor, ColMajor, AnyMajor};
pub use crate::dynamic::{DynBuf, RawAlloc, Global};
pub use crate::storage::{VectorStorage, MatrixStorage};
pub use crate::container::{ReadableVector, WritableVector, ReadableMatrix, WritableMatrix};
pub use crate::expr::{Expr, VectorExpr, MatrixExpr, IntoExpr, Leaf, Shape, Dims};
pub use crate::expr::{UnaryOp, BinaryOp, ScalarOp};
pub use crate::vector::{Vector, VecN, VecD, V2, V3, V4};
pub use crate::matrix::{Matrix, MatN, MatD, M22, M33, M44};
pub use crate::numeric::{dot, length, length_squared, normalize, acos_safe};
pub use crate::random::{random_unit, random_unit_with};
pub use crate::random::{random_unit_in_cone, random_unit_in_cone_with};

#[doc(hidden)]
pub use crate::traits::internal;
