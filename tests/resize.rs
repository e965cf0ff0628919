extern crate rsp2_dense;

use rsp2_dense::{VecD, MatD, Error};

fn counting(n: usize) -> VecD<i32> {
    VecD::from_slice(&(0..n as i32).map(|i| 10 * i + 1).collect::<Vec<_>>()).unwrap()
}

#[test]
fn resize_preserves_the_common_prefix() {
    for n1 in 0..6 {
        for n2 in 0..6 {
            let original = counting(8);

            let mut v = original.clone();
            v.resize(n1).unwrap();
            v.resize(n2).unwrap();

            let keep = n1.min(n2);
            assert_eq!(v.size(), n2);
            assert_eq!(&v.as_slice()[..keep], &original.as_slice()[..keep]);
            assert!(v.as_slice()[keep..].iter().all(|&x| x == 0));
        }
    }
}

#[test]
fn resize_fast_only_promises_a_size() {
    let mut v = counting(4);
    v.resize_fast(9).unwrap();
    assert_eq!(v.size(), 9);
    v.resize_fast(2_u16).unwrap();
    assert_eq!(v.size(), 2);
}

#[test]
fn negative_sizes_change_nothing() {
    let mut v = counting(3);
    let before = v.clone();
    let ptr = v.as_ptr();

    assert!(matches!(v.resize(-1), Err(Error::InvalidArgument(_))));
    assert!(matches!(v.resize_fast(-1), Err(Error::InvalidArgument(_))));
    assert_eq!(v, before);
    assert_eq!(v.as_ptr(), ptr);

    let mut m = MatD::<f64>::with_shape(2, 2).unwrap();
    assert!(matches!(m.resize(-1, 2), Err(Error::InvalidArgument(_))));
    assert!(matches!(m.resize_fast(2, -1), Err(Error::InvalidArgument(_))));
    assert_eq!((m.rows(), m.cols()), (2, 2));
}

#[test]
fn moving_out_leaves_an_empty_container() {
    let mut b = counting(5);
    let b_values = b.as_slice().to_vec();

    let a = std::mem::take(&mut b);
    assert_eq!(a.as_slice(), &b_values[..]);
    assert_eq!(b.size(), 0);
    assert!(b.as_ptr().is_null());

    // still usable
    b.resize(1).unwrap();
    assert_eq!(b.as_slice(), &[0]);
}

#[test]
fn clones_are_deep() {
    let a = counting(4);
    let mut b = a.clone();
    b.set(0, -1);
    assert_eq!(a[0], 1);
    assert_ne!(a.as_ptr(), b.as_ptr());

    let c = b.try_clone().unwrap();
    assert_eq!(c, b);
}
