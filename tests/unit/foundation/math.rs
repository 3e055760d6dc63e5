use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u16(100, 128), 50);
}

#[test]
fn premultiply_then_unpremultiply_is_stable_for_opaque_and_clear() {
    let mut px = vec![10, 20, 30, 255, 200, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 0, 0, 0, 0]);
}

#[test]
fn unpremul_half_alpha() {
    assert_eq!(unpremul_u8(64, 128), 128);
    assert_eq!(unpremul_u8(0, 0), 0);
}
