use super::*;

#[test]
fn window_clamps_and_scales() {
    assert_eq!(window(0.1, 0.2, 0.1), 0.0);
    assert!((window(0.25, 0.2, 0.1) - 0.5).abs() < 1e-9);
    assert_eq!(window(0.9, 0.2, 0.1), 1.0);
    assert_eq!(window(0.2, 0.2, 0.0), 1.0);
    assert_eq!(window(0.1, 0.2, 0.0), 0.0);
}

#[test]
fn fnv_is_stable_and_sensitive() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"frame");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"frame");
    let mut c = Fnv1a64::new_default();
    c.write_bytes(b"framf");
    let (a, b, c) = (a.finish(), b.finish(), c.finish());
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(0, 255), 0);
}
