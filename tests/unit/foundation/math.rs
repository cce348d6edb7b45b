use super::*;

#[test]
fn fnv_matches_reference_vector() {
    let mut h = Fnv1a64::new_default();
    h.write(b"a");
    assert_eq!(h.finish(), 0xaf63_dc4c_8601_ec8c);
}

#[test]
fn fnv_chunking_does_not_matter() {
    let mut a = Fnv1a64::new_default();
    a.write(b"reel");
    let mut b = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    b.write_u8(b'r');
    b.write(b"eel");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn fnv_distinguishes_float_bits() {
    let mut a = Fnv1a64::new_default();
    a.write_f64(0.0);
    let mut b = Fnv1a64::new_default();
    b.write_f64(-0.0);
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u8(255, 128), 128);
    assert_eq!(mul_div255_u8(1, 127), 0);
}
