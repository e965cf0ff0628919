#[macro_use] extern crate rsp2_assert_close;
extern crate rsp2_dense;
extern crate rand;

use rsp2_dense::{V2, V3, VecD, Error};
use rsp2_dense::{acos_safe, dot, random_unit, random_unit_with};
use rsp2_dense::{random_unit_in_cone, random_unit_in_cone_with};

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6};

const TRIALS: usize = 1000;

#[test]
fn unconstrained_unit_vectors() {
    let mut rng = StdRng::seed_from_u64(1);
    for size in 1..6 {
        let mut v = VecD::<f64>::with_size(size).unwrap();
        for _ in 0..TRIALS {
            random_unit_with(&mut v, &mut rng).unwrap();
            assert_close!(abs=1e-6, v.length(), 1.0);
        }
    }

    let mut v = V3::<f64>::new();
    random_unit(&mut v).unwrap();
    assert_close!(abs=1e-6, v.length(), 1.0);
}

#[test]
fn unit_vectors_need_room() {
    let mut v = VecD::<f32>::new();
    assert!(matches!(random_unit(&mut v), Err(Error::InvalidArgument(_))));
}

#[test]
fn cone_in_three_dimensions() {
    let mut rng = StdRng::seed_from_u64(2);
    let d = V3::from([0.0, 0.0, 1.0]);
    let mut n = V3::<f64>::new();

    let mut max_angle = 0.0_f64;
    for _ in 0..TRIALS {
        random_unit_in_cone_with(&mut n, &d, FRAC_PI_6, &mut rng).unwrap();
        assert_close!(abs=1e-6, n.length(), 1.0);
        max_angle = max_angle.max(acos_safe(dot(&n, &d)));
    }
    assert!(max_angle <= FRAC_PI_6 + 1e-6, "{}", max_angle);
}

#[test]
fn hemisphere_cone_reaches_both_ends() {
    let mut rng = StdRng::seed_from_u64(3);
    let d = V3::from([0.0, 1.0, 0.0]);
    let mut n = VecD::<f64>::new();

    let (mut near, mut far) = (false, false);
    for _ in 0..TRIALS {
        random_unit_in_cone_with(&mut n, &d, FRAC_PI_2, &mut rng).unwrap();
        let angle = acos_safe(dot(&n, &d));
        assert!(angle <= FRAC_PI_2 + 1e-6);
        near |= angle < 0.2;
        far |= angle > FRAC_PI_2 - 0.2;
    }
    assert!(near && far);
}

#[test]
fn cone_in_two_dimensions() {
    let mut rng = StdRng::seed_from_u64(4);
    let d = V2::from([1.0, 0.0]);
    let mut n = V2::<f64>::new();

    for _ in 0..TRIALS {
        random_unit_in_cone_with(&mut n, &d, FRAC_PI_4, &mut rng).unwrap();
        assert_close!(abs=1e-6, n.length(), 1.0);
        let signed_angle = n[1].atan2(n[0]);
        assert!(-FRAC_PI_4 - 1e-6 <= signed_angle && signed_angle <= FRAC_PI_4 + 1e-6);
    }

    random_unit_in_cone(&mut n, &d, FRAC_PI_4).unwrap();
    assert_close!(abs=1e-6, n.length(), 1.0);
}

#[test]
fn cone_rejects_bad_half_angles() {
    let d = V3::from([0.0, 0.0, 1.0]);
    let mut n = V3::<f64>::new();
    for &angle in &[0.0, -FRAC_PI_4, FRAC_PI_2 * 1.01] {
        assert!(matches!(
            random_unit_in_cone(&mut n, &d, angle),
            Err(Error::InvalidArgument(_)),
        ));
    }
}
