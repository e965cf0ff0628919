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

//! `assert_close!` for floats of either precision and for sequences of them.
//!
//! ```
//! #[macro_use] extern crate rsp2_assert_close;
//! # fn main() {
//! assert_close!(1.0, 1.0 + 1e-12);
//! assert_close!(abs=1e-6, 0.0_f32, 1e-7_f32);
//! assert_close!(rel=1e-3, &[1.0, 2.0][..], &[1.0001, 2.0001][..]);
//! # }
//! ```

use std::fmt;

pub const DEFAULT_NONZERO_TOL: f64 = 1e-9;

#[macro_export]
macro_rules! assert_close {
    ($($t:tt)*) => {assert_close_impl!{@parsing [$($t)*] [[@rel $crate::DEFAULT_NONZERO_TOL] [@abs 0.0]]}};
}

#[macro_export]
macro_rules! debug_assert_close {
    ($($t:tt)*) => {{
        #[cfg(debug_assertions)] {
            assert_close!{$($t)*}
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! assert_close_impl {
    (@parsing [rel=$tol:expr, $($rest:tt)*] [$($assignment:tt)*]) => {
        assert_close_impl!(@parsing [$($rest)*] [$($assignment)* [@rel $tol]]);
    };
    (@parsing [abs=$tol:expr, $($rest:tt)*] [$($assignment:tt)*]) => {
        assert_close_impl!(@parsing [$($rest)*] [$($assignment)* [@abs $tol]]);
    };
    (@parsing [$a:expr, $b:expr $(,)*] $assignments:tt) => {
        assert_close_impl!(@expand $assignments [@comp $a, $b] [@fmt "not nearly equal!"])
    };
    (@parsing [$a:expr, $b:expr, $($fmt:tt)+] $assignments:tt) => {
        assert_close_impl!(@expand $assignments [@comp $a, $b] [@fmt $($fmt)+])
    };
    (@expand [$($assignment:tt)*] [@comp $a:expr, $b:expr] [@fmt $($fmt:tt)+] ) => {
        #[allow(unused_mut)]
        #[allow(unused_assignments)]
        {
            let a = $a;
            let b = $b;

            let mut abs: f64;
            let mut rel: f64;
            $(
                assert_close_impl!{@stmt::assign [abs, rel] $assignment}
            )*

            if let Err(e) = $crate::CheckClose::check_close(&a, &b, $crate::Tolerances { abs, rel }) {
                panic!(
                "{} (tolerances: rel={}, abs={})\n left: {:?}\nright: {:?}\n{}",
                 format!($($fmt)*), rel, abs, a, b, e);
            }
        }
    };
    (@stmt::assign [$abs:ident, $rel:ident] [@abs $tol:expr]) => { $abs = $tol; };
    (@stmt::assign [$abs:ident, $rel:ident] [@rel $tol:expr]) => { $rel = $tol; };
}

/// Python's `math.isclose`, evaluated in double precision.
#[inline]
pub fn is_close(a: f64, b: f64, Tolerances { abs, rel }: Tolerances) -> bool {
    assert!(rel >= 0.0);
    assert!(abs >= 0.0);

    // infinities of the same sign
    if a == b { return true; }

    // infinities of opposite sign would otherwise get an infinite relative tolerance
    if a.is_infinite() || b.is_infinite() { return false; }

    // NaN falls through to here and compares false
    (a - b).abs() <= abs.max(rel * a.abs()).max(rel * b.abs())
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

/// The first pair of elements found to differ.
#[derive(Debug, thiserror::Error)]
pub struct CheckCloseError {
    /// Position of the failing pair within a sequence, if the values came from one.
    pub index: Option<usize>,
    pub values: (f64, f64),
    pub tol: Tolerances,
}

impl fmt::Display for CheckCloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (left, right) = self.values;
        if let Some(index) = self.index {
            writeln!(f, "failed at index {}:", index)?;
        } else {
            writeln!(f, "failed at:")?;
        }
        write!(f, "  left: {:?}\n right: {:?}\n   tol: {:?}", left, right, self.tol)
    }
}

pub trait CheckClose<Rhs: ?Sized = Self> {
    /// Test that all values of self and other are close.
    fn check_close(&self, other: &Rhs, tol: Tolerances) -> Result<(), CheckCloseError>;
}

macro_rules! impl_float {
    ($($F:ty)*) => {$(
        impl CheckClose for $F {
            #[inline]
            fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
                let values = (*self as f64, *other as f64);
                match is_close(values.0, values.1, tol) {
                    true => Ok(()),
                    false => Err(CheckCloseError { index: None, values, tol }),
                }
            }
        }
    )*};
}

impl_float!{ f32 f64 }

impl<'a, T: ?Sized + CheckClose> CheckClose for &'a T {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    { CheckClose::check_close(*self, *other, tol) }
}

impl<T: CheckClose> CheckClose for [T] {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError> {
        assert_eq!(self.len(), other.len(), "cannot compare sequences of different length");
        for (index, (a, b)) in self.iter().zip(other).enumerate() {
            a.check_close(b, tol).map_err(|e| CheckCloseError { index: Some(index), ..e })?;
        }
        Ok(())
    }
}

impl<T: CheckClose> CheckClose for Vec<T> {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    { self[..].check_close(&other[..], tol) }
}

impl<T: CheckClose, const N: usize> CheckClose for [T; N] {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    { self[..].check_close(&other[..], tol) }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    #[test]
    fn macro_output_can_compile() {
        assert_close!(1.0, 1.0);
        assert_close!(abs=1e-8, 1.0, 1.0);
        assert_close!(rel=1e-8, abs=1e-8, 1.0, 1.0);
        assert_close!(1.0, 1.0,);
        assert_close!(abs=1e-8, 1.0_f32, 1.0_f32,);
        assert_close!(rel=1e-8, abs=1e-8, [1.0, 2.0], [1.0, 2.0],);
        assert_close!(abs=1e-8, vec![1.0], vec![1.0], "{}", "with a message");
    }

    #[test]
    fn single_precision_is_widened() {
        assert_close!(abs=1e-6, 0.1_f32, 0.1_f32 + 1e-7);
    }

    #[test]
    fn sequence_error_reports_index() {
        let err = crate::CheckClose::check_close(
            &[1.0, 2.0, 3.0][..],
            &[1.0, 2.5, 3.0][..],
            crate::Tolerances { abs: 1e-3, rel: 0.0 },
        ).unwrap_err();
        assert_eq!(err.index, Some(1));
        assert_eq!(err.values, (2.0, 2.5));
    }

    #[test]
    #[should_panic]
    fn not_close() {
        assert_close!(abs=0.0, rel=0.0, 1.0, 1.1);
    }

    #[test]
    #[should_panic]
    fn nan_is_never_close() {
        assert_close!(abs=1.0, ::std::f64::NAN, ::std::f64::NAN);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic)]
    fn debug_not_close() {
        debug_assert_close!(abs=0.0, rel=0.0, 1.0, 1.1);
    }
}
