use super::*;

#[test]
fn opaque_source_replaces_destination() {
    assert_eq!(over([10, 20, 30, 255], [200, 100, 50, 255], 1.0), [200, 100, 50, 255]);
}

#[test]
fn zero_opacity_and_transparent_source_are_noops() {
    let d = [10, 20, 30, 255];
    assert_eq!(over(d, [200, 100, 50, 255], 0.0), d);
    assert_eq!(over(d, [0, 0, 0, 0], 1.0), d);
}

#[test]
fn half_opacity_mixes_evenly() {
    let out = over([0, 0, 0, 255], [255, 255, 255, 255], 0.5);
    assert_eq!(out[3], 255);
    assert!((127..=129).contains(&out[0]));
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
}

#[test]
fn straight_overlay_respects_its_alpha() {
    let mut dst = vec![0, 0, 0, 255, 0, 0, 0, 255];
    let overlay = [255, 0, 0, 0, 255, 0, 0, 255];
    blend_straight_in_place(&mut dst, &overlay, 1.0).unwrap();
    assert_eq!(&dst[..4], &[0, 0, 0, 255]);
    assert_eq!(&dst[4..], &[255, 0, 0, 255]);
}
