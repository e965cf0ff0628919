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

//! Storage order of 2-dimensional containers.
//!
//! [`Layout`] is the concrete decision made by a matrix's storage.
//! [`LayoutKind`] additionally has `AnyMajor`, which is what you get when
//! you ask for the layout of something that doesn't have a single one
//! (e.g. the sum of a row-major and a column-major matrix).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};

/// How `(row, col)` maps to an offset into a flat buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Layout {
    /// `row * cols + col`
    RowMajor,
    /// `col * rows + row`
    ColMajor,
}

/// Which index is constant along a contiguous run of the flat buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outer { Rows, Cols }

impl Layout {
    /// Offset of element `(row, col)` in a buffer holding a `rows x cols` matrix.
    ///
    /// Bounds are not checked here.
    #[inline(always)]
    pub fn offset(self, (row, col): (usize, usize), (rows, cols): (usize, usize)) -> usize {
        match self {
            Layout::RowMajor => row * cols + col,
            Layout::ColMajor => col * rows + row,
        }
    }

    /// Inverse of [`Layout::offset`].
    #[inline(always)]
    pub fn index_of(self, offset: usize, (rows, cols): (usize, usize)) -> (usize, usize) {
        match self {
            Layout::RowMajor => (offset / cols, offset % cols),
            Layout::ColMajor => (offset % rows, offset / rows),
        }
    }

    #[inline]
    pub fn outer(self) -> Outer {
        match self {
            Layout::RowMajor => Outer::Rows,
            Layout::ColMajor => Outer::Cols,
        }
    }

    #[inline]
    pub fn kind(self) -> LayoutKind {
        match self {
            Layout::RowMajor => LayoutKind::RowMajor,
            Layout::ColMajor => LayoutKind::ColMajor,
        }
    }
}

/// A layout, or the absence of a requirement on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum LayoutKind {
    RowMajor = 1,
    ColMajor = 2,
    AnyMajor = 3,
}

impl LayoutKind {
    pub const COUNT: usize = 3;

    /// Does a container stored with `layout` satisfy this kind?
    #[inline]
    pub fn accepts(self, layout: Layout) -> bool {
        match self {
            LayoutKind::AnyMajor => true,
            _ => self == layout.kind(),
        }
    }

    /// The concrete layout, unless this is `AnyMajor`.
    #[inline]
    pub fn concrete(self) -> Option<Layout> {
        match self {
            LayoutKind::RowMajor => Some(Layout::RowMajor),
            LayoutKind::ColMajor => Some(Layout::ColMajor),
            LayoutKind::AnyMajor => None,
        }
    }

    /// The kind shared by two operands; `AnyMajor` if they disagree.
    #[inline]
    pub fn merge(self, other: LayoutKind) -> LayoutKind {
        match self == other {
            true => self,
            false => LayoutKind::AnyMajor,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayoutKind::RowMajor => "row-major",
            LayoutKind::ColMajor => "column-major",
            LayoutKind::AnyMajor => "any layout",
        })
    }
}

// ---------------------------------------------------------------------------

/// Type-level layout marker.
pub trait LayoutTag: Copy + Default + fmt::Debug + 'static {
    const KIND: LayoutKind;
}

/// A layout marker that can decide how a matrix is stored.
///
/// `AnyMajor` is deliberately not one of these.
pub trait StorageLayout: LayoutTag {
    const LAYOUT: Layout;
}

/// Row major tag.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct RowMajor;

/// Column major tag.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ColMajor;

/// Arbitrary layout tag.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct AnyMajor;

impl LayoutTag for RowMajor { const KIND: LayoutKind = LayoutKind::RowMajor; }
impl LayoutTag for ColMajor { const KIND: LayoutKind = LayoutKind::ColMajor; }
impl LayoutTag for AnyMajor { const KIND: LayoutKind = LayoutKind::AnyMajor; }

impl StorageLayout for RowMajor { const LAYOUT: Layout = Layout::RowMajor; }
impl StorageLayout for ColMajor { const LAYOUT: Layout = Layout::ColMajor; }

/// Get the layout tag of a type that has one.
pub trait HasLayoutTag {
    type Tag: LayoutTag;
}

/// The [`LayoutKind`] of a type that has a layout tag.
#[inline]
pub fn layout_kind_of<T: HasLayoutTag + ?Sized>() -> LayoutKind
{ <T::Tag as LayoutTag>::KIND }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets() {
        let shape = (2, 3);
        assert_eq!(Layout::RowMajor.offset((1, 2), shape), 5);
        assert_eq!(Layout::ColMajor.offset((1, 2), shape), 5);
        assert_eq!(Layout::RowMajor.offset((1, 0), shape), 3);
        assert_eq!(Layout::ColMajor.offset((1, 0), shape), 1);

        for &layout in &[Layout::RowMajor, Layout::ColMajor] {
            for k in 0..6 {
                assert_eq!(layout.offset(layout.index_of(k, shape), shape), k);
            }
        }
    }

    #[test]
    fn kinds() {
        assert!(LayoutKind::AnyMajor.accepts(Layout::RowMajor));
        assert!(LayoutKind::AnyMajor.accepts(Layout::ColMajor));
        assert!(LayoutKind::RowMajor.accepts(Layout::RowMajor));
        assert!(!LayoutKind::RowMajor.accepts(Layout::ColMajor));

        assert_eq!(LayoutKind::RowMajor.merge(LayoutKind::RowMajor), LayoutKind::RowMajor);
        assert_eq!(LayoutKind::RowMajor.merge(LayoutKind::ColMajor), LayoutKind::AnyMajor);
        assert_eq!(LayoutKind::AnyMajor.concrete(), None);

        assert_eq!(Layout::ColMajor.outer(), Outer::Cols);
        assert_eq!(LayoutKind::ColMajor as u8, 2);
        assert_eq!(<AnyMajor as LayoutTag>::KIND, LayoutKind::AnyMajor);
        assert_eq!(<ColMajor as StorageLayout>::LAYOUT.kind(), ColMajor::KIND);
    }
}
