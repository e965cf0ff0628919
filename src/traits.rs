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

// Traits exposed in public interfaces,
// implemented on finite sets of types rather than more general
//  generic bounds in order to reduce coupling with client crates.

use crate::errors::{Error, Result};

pub use self::semiring::Semiring;
mod semiring {
    /// Trait for scalars with addition and multiplication.
    ///
    /// You get primitive floats and integers.
    /// This trait is sealed to avoid accidental commitments.
    pub trait Semiring : Sealed { }

    pub(super) use self::private::Sealed;
    pub(super) mod private {
        pub trait Sealed { }
    }
}

pub use self::ring::Ring;
mod ring {
    use super::Semiring;

    /// Trait for scalars with addition, multiplication, and subtraction.
    ///
    /// This is the bound for elements of lazy expressions, which must be
    /// closed under negation. Unsigned integers are therefore excluded.
    pub trait Ring : Semiring + Sealed { }

    pub(super) use self::private::Sealed;
    pub(super) mod private {
        pub trait Sealed { }
    }
}

pub use self::field::Field;
mod field {
    use super::Ring;

    /// Trait for real floating point scalars.
    ///
    /// Anything that needs `sqrt`, trig functions, or random draws
    /// (normalization, sampling) is bounded on this, so handing an
    /// integer vector to those functions is a compile-time error.
    pub trait Field : Ring + Sealed { }

    pub(super) use self::private::Sealed;
    pub(super) mod private {
        pub trait Sealed { }
    }
}

gen_each!{
    @{field}
    impl_field!({$T:ty}) => {
        impl Field for $T { }
        impl field::Sealed for $T { }
    };
}

gen_each!{
    @{ring}
    impl_ring!({$T:ty}) => {
        impl Ring for $T { }
        impl ring::Sealed for $T { }
    };
}

gen_each!{
    @{semiring}
    impl_semiring!({$T:ty}) => {
        impl Semiring for $T { }
        impl semiring::Sealed for $T { }
    };
}

// ---------------------------------------------------------------------------

/// An integer that can be requested as a size or dimension.
///
/// Negative values are accepted by the type system and rejected at runtime
/// with [`Error::InvalidArgument`], leaving the target untouched.
pub trait Dim: Copy + std::fmt::Display {
    /// `None` if the value is negative or does not fit in a `usize`.
    fn to_usize(self) -> Option<usize>;
}

gen_each!{
    @{dim}
    impl_dim!({$T:ty}) => {
        impl Dim for $T {
            #[inline(always)]
            fn to_usize(self) -> Option<usize> {
                use std::convert::TryFrom;
                usize::try_from(self).ok()
            }
        }
    };
}

pub(crate) fn check_dim<D: Dim>(what: &str, value: D) -> Result<usize> {
    value.to_usize().ok_or_else(|| {
        Error::invalid_argument(format!("cannot use {} as a {}", value, what))
    })
}

// ---------------------------------------------------------------------------

/// Internal-use traits carrying the actual arithmetic.
///
/// These are bounds on public functions, but they are implemented for exactly
/// the same types as the sealed public traits, and nothing outside the crate
/// should need to name them.
#[doc(hidden)]
pub mod internal {
    use std::fmt;
    use std::ops::{Add, Sub, Mul, Div, Neg};
    use rand::Rng;
    use rand::distributions::{Distribution, Standard};

    macro_rules! markers {
        ($( $name:ident[$($bound:tt)+]; )+)
        => {$(
            pub trait $name: $($bound)+ { }
            impl<T> $name for T where T: $($bound)+ { }
        )+};
    }

    markers!{
        SelfAdd[Sized + Add<Self, Output=Self>];
        SelfSub[Sized + Sub<Self, Output=Self>];
        SelfMul[Sized + Mul<Self, Output=Self>];
        SelfDiv[Sized + Div<Self, Output=Self>];
        SelfNeg[Sized + Neg<Output=Self>];
    }

    pub trait PrimitiveSemiring
        : Sized + Copy + Clone + Default
        + PartialEq + PartialOrd + fmt::Debug
        + SelfAdd + SelfMul
        + num_traits::Zero
        + num_traits::One
        + std::iter::Sum
    { }

    gen_each!{
        @{semiring}
        impl_primitive_semiring!({$T:ty}) => {
            impl PrimitiveSemiring for $T { }
        };
    }

    /// Everything a node of an expression tree may ask of its elements.
    ///
    /// (`Div` is included because scalar division is one of the node kinds;
    ///  for integers it truncates, as usual)
    pub trait PrimitiveRing
        : PrimitiveSemiring
        + SelfSub + SelfNeg + SelfDiv
    { }

    gen_each!{
        @{ring}
        impl_primitive_ring!({$T:ty}) => {
            impl PrimitiveRing for $T { }
        };
    }

    pub trait PrimitiveFloat: PrimitiveRing {
        // (allow(unused) because these are arbitrarily added as they're needed,
        //  and it's annoying to have to remove them only to possibly later have
        //  to add them back)
        #[allow(unused)] fn sqrt(self) -> Self;
        #[allow(unused)] fn sin(self) -> Self;
        #[allow(unused)] fn cos(self) -> Self;
        #[allow(unused)] fn acos(self) -> Self;
        #[allow(unused)] fn min(self, b: Self) -> Self;
        #[allow(unused)] fn max(self, b: Self) -> Self;
        #[allow(unused)] fn frac_pi_2() -> Self;

        /// A draw from the standard normal distribution.
        fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> Self;

        /// A draw from the uniform distribution on `[lo, hi)`.
        fn uniform_with<R: Rng + ?Sized>(rng: &mut R, range: (Self, Self)) -> Self;
    }

    gen_each!{
        @{field}
        impl_primitive_float!({$T:ty}) => {
            impl PrimitiveFloat for $T {
                #[inline(always)] fn sqrt(self) -> $T { self.sqrt() }
                #[inline(always)] fn sin(self) -> $T { self.sin() }
                #[inline(always)] fn cos(self) -> $T { self.cos() }
                #[inline(always)] fn acos(self) -> $T { self.acos() }
                #[inline(always)] fn min(self, b: Self) -> $T { self.min(b) }
                #[inline(always)] fn max(self, b: Self) -> $T { self.max(b) }
                #[inline(always)] fn frac_pi_2() -> $T { std::f64::consts::FRAC_PI_2 as $T }

                #[inline(always)]
                fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> $T {
                    rand_distr::StandardNormal.sample(rng)
                }

                #[inline(always)]
                fn uniform_with<R: Rng + ?Sized>(rng: &mut R, (lo, hi): ($T, $T)) -> $T {
                    let alpha: $T = Standard.sample(rng);
                    lo + (hi - lo) * alpha
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims() {
        assert_eq!(check_dim("size", 3), Ok(3));
        assert_eq!(check_dim("size", 0_u8), Ok(0));
        assert!(matches!(check_dim("size", -1), Err(Error::InvalidArgument(_))));
        assert!(matches!(check_dim("row count", std::i64::MIN), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn uniform_stays_in_range() {
        use rand::SeedableRng;
        use self::internal::PrimitiveFloat;

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let x = f32::uniform_with(&mut rng, (-0.5, 0.25));
            assert!(-0.5 <= x && x <= 0.25, "{}", x);
        }
    }
}
