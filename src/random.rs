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

//! Random unit vectors.
//!
//! Every sampler takes the generator as an argument. The variants without
//! one seed a fresh generator from the OS for each call; nothing here keeps
//! global state.

use crate::container::{ReadableVector, WritableVector};
use crate::errors::{Error, Result};
use crate::numeric::{acos_safe, dot, length, length_squared, normalize};
use crate::traits::Field;
use crate::traits::internal::PrimitiveFloat;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

/// Overwrite `n` with a unit vector whose direction is uniformly distributed.
///
/// Each coordinate is drawn from the standard normal distribution, and the
/// draw is repeated in the (practically impossible) event that every
/// coordinate is zero.
///
/// Fails with [`Error::InvalidArgument`] if `n` is empty.
pub fn random_unit_with<X, V, R>(n: &mut V, rng: &mut R) -> Result<()>
where
    X: Field + PrimitiveFloat,
    V: WritableVector<Elem=X> + ?Sized,
    R: Rng + ?Sized,
{
    let size = n.size();
    if size == 0 {
        return Err(Error::invalid_argument("cannot produce a unit vector of size 0"));
    }

    loop {
        for i in 0..size {
            n.set(i, X::standard_normal(rng));
        }
        let sqnorm = length_squared(n);
        if sqnorm > X::zero() {
            let norm = sqnorm.sqrt();
            for i in 0..size {
                let x = n.get(i);
                n.set(i, x / norm);
            }
            return Ok(());
        }
        debug!("random unit vector: drew a zero vector of size {}; drawing again", size);
    }
}

/// [`random_unit_with`], using a generator seeded from the OS.
pub fn random_unit<X, V>(n: &mut V) -> Result<()>
where
    X: Field + PrimitiveFloat,
    V: WritableVector<Elem=X> + ?Sized,
{ random_unit_with(n, &mut StdRng::from_entropy()) }

/// Overwrite `n` with a random unit vector at most `half_angle` radians
/// away from `direction`.
///
/// `direction` does not need to be normalized. `n` is resized to match it
/// if its storage is dynamic.
///
/// In two dimensions, `direction` is rotated by an angle drawn uniformly
/// from `[-half_angle, half_angle]`. In higher dimensions, an unconstrained
/// draw is folded into the hemisphere around `direction`, moved onto the
/// boundary of the cone by spherical interpolation, and then brought back
/// inside in proportion to how far it originally was from `direction`.
///
/// Fails with [`Error::InvalidArgument`] if `half_angle` is not in
/// `(0, pi/2]`, if `direction` has fewer than two elements or is zero,
/// or with a size mismatch if `n` is fixed and has the wrong size.
pub fn random_unit_in_cone_with<X, V, D, R>(
    n: &mut V,
    direction: &D,
    half_angle: X,
    rng: &mut R,
) -> Result<()>
where
    X: Field + PrimitiveFloat,
    V: WritableVector<Elem=X> + ?Sized,
    D: ReadableVector<Elem=X> + ?Sized,
    R: Rng + ?Sized,
{
    if !(half_angle > X::zero() && half_angle <= X::frac_pi_2()) {
        return Err(Error::invalid_argument(format!(
            "cone half-angle must be in (0, pi/2], not {:?}", half_angle,
        )));
    }

    let size = direction.size();
    if size < 2 {
        return Err(Error::invalid_argument(format!(
            "cannot sample a cone around a direction of size {}", size,
        )));
    }

    let dir_norm = length(direction);
    if !(dir_norm > X::zero()) {
        return Err(Error::invalid_argument("cone direction must be a nonzero vector"));
    }
    let unit_dir = |i: usize| direction.get(i) / dir_norm;

    n.ensure_size(size)?;

    if size == 2 {
        let theta = X::uniform_with(rng, (-half_angle, half_angle));
        let (sin, cos) = (theta.sin(), theta.cos());
        let (dx, dy) = (unit_dir(0), unit_dir(1));
        n.set(0, cos * dx - sin * dy);
        n.set(1, sin * dx + cos * dy);
        normalize(n);
        return Ok(());
    }

    random_unit_with(n, rng)?;

    // fold into the hemisphere around the direction
    let mut cos_theta = dot(n, direction) / dir_norm;
    if cos_theta < X::zero() {
        for i in 0..size {
            let x = n.get(i);
            n.set(i, -x);
        }
        cos_theta = -cos_theta;
    }

    let theta = acos_safe(cos_theta);
    let sin_theta = theta.sin();
    if sin_theta == X::zero() {
        for i in 0..size {
            n.set(i, unit_dir(i));
        }
        return Ok(());
    }

    // slerp from the direction to n, stopping on the boundary of the cone
    let to_dir = (theta - half_angle).sin() / sin_theta;
    let to_n = half_angle.sin() / sin_theta;
    for i in 0..size {
        let x = n.get(i);
        n.set(i, to_dir * unit_dir(i) + to_n * x);
    }

    // slerp from the direction back toward that point on the boundary
    let t = theta / X::frac_pi_2();
    let sin_span = half_angle.sin();
    let to_dir = ((X::one() - t) * half_angle).sin() / sin_span;
    let to_boundary = (t * half_angle).sin() / sin_span;
    for i in 0..size {
        let x = n.get(i);
        n.set(i, to_dir * unit_dir(i) + to_boundary * x);
    }

    // remove rounding drift from the two interpolations
    normalize(n);
    Ok(())
}

/// [`random_unit_in_cone_with`], using a generator seeded from the OS.
pub fn random_unit_in_cone<X, V, D>(n: &mut V, direction: &D, half_angle: X) -> Result<()>
where
    X: Field + PrimitiveFloat,
    V: WritableVector<Elem=X> + ?Sized,
    D: ReadableVector<Elem=X> + ?Sized,
{ random_unit_in_cone_with(n, direction, half_angle, &mut StdRng::from_entropy()) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{V2, V3, VecD};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn rng() -> StdRng { StdRng::seed_from_u64(0x5eed) }

    fn angle_between<V: ReadableVector<Elem=f64>>(a: &V, b: &V) -> f64
    { acos_safe(dot(a, b) / (length(a) * length(b))) }

    #[test]
    fn unit_vectors() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut rng = rng();

        let mut v = V3::<f64>::new();
        for _ in 0..100 {
            random_unit_with(&mut v, &mut rng).unwrap();
            assert_close!(abs=1e-12, v.length(), 1.0);
        }

        let mut w = VecD::<f32>::with_size(7).unwrap();
        random_unit_with(&mut w, &mut rng).unwrap();
        assert_close!(abs=1e-6, w.length(), 1.0);

        let mut one = VecD::<f64>::with_size(1).unwrap();
        random_unit(&mut one).unwrap();
        assert_eq!(one[0].abs(), 1.0);
    }

    #[test]
    fn empty_destination() {
        let mut v = VecD::<f64>::new();
        assert!(matches!(random_unit(&mut v), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn bad_cones() {
        let mut rng = rng();
        let mut n = VecD::<f64>::new();
        let dir = V3::from([0.0, 0.0, 1.0]);

        for &angle in &[0.0, -0.1, FRAC_PI_2 + 1e-9, PI, std::f64::NAN] {
            let result = random_unit_in_cone_with(&mut n, &dir, angle, &mut rng);
            assert!(matches!(result, Err(Error::InvalidArgument(_))), "{}", angle);
        }

        let short = VecD::<f64>::from([1.0]);
        let result = random_unit_in_cone_with(&mut n, &short, 0.5, &mut rng);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let zero = V3::<f64>::new();
        let result = random_unit_in_cone_with(&mut n, &zero, 0.5, &mut rng);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        // fixed destinations are not resized
        let mut fixed = V2::<f64>::new();
        let result = random_unit_in_cone_with(&mut fixed, &dir, 0.5, &mut rng);
        assert_eq!(result, Err(Error::VectorSizeMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn cone_resizes_dynamic_destination() {
        let mut rng = rng();
        let mut n = VecD::<f64>::new();
        let dir = VecD::<f64>::from([1.0, 1.0, 1.0, 1.0, 1.0]);
        random_unit_in_cone_with(&mut n, &dir, FRAC_PI_4, &mut rng).unwrap();
        assert_eq!(n.size(), 5);
        assert_close!(abs=1e-12, n.length(), 1.0);
        assert!(angle_between(&n, &dir) <= FRAC_PI_4 + 1e-9);
    }

    #[test]
    fn two_dimensional_cone() {
        let mut rng = rng();
        // not normalized on purpose
        let dir = V2::from([0.0, 3.0]);
        let mut n = V2::<f64>::new();
        for _ in 0..200 {
            random_unit_in_cone_with(&mut n, &dir, 0.25, &mut rng).unwrap();
            assert_close!(abs=1e-12, n.length(), 1.0);
            assert!(angle_between(&n, &dir) <= 0.25 + 1e-9);
        }
    }

    #[test]
    fn narrow_cone_in_three_dimensions() {
        let mut rng = rng();
        let dir = V3::from([1.0, -2.0, 0.5]);
        let mut n = V3::<f64>::new();
        for _ in 0..200 {
            random_unit_in_cone_with(&mut n, &dir, 0.01, &mut rng).unwrap();
            assert!(angle_between(&n, &dir) <= 0.01 + 1e-9);
        }
    }
}
