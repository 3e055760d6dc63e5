use super::*;
use crate::foundation::core::Region;

fn tile(samples: Vec<f32>) -> ScalarTile {
    let n = samples.len() as u32;
    let region = Region::new(0, 0, n, 1, 1.0).unwrap();
    ScalarTile::single_band(region, n, 1, samples).unwrap()
}

#[test]
fn resolve_prefers_exact_then_case_insensitive() {
    let mut reg = ColorMapRegistry::builtin();
    reg.insert(
        ColorMap::from_stops("viridis", vec![Color::BLACK, Color::WHITE]).unwrap(),
    );
    assert_eq!(reg.resolve("viridis").unwrap().name(), "viridis");
    assert_eq!(reg.resolve("Viridis").unwrap().name(), "Viridis");
    assert_eq!(reg.resolve("MAGMA").unwrap().name(), "Magma");
}

#[test]
fn resolve_falls_back_to_first_map() {
    let reg = ColorMapRegistry::builtin();
    assert_eq!(reg.resolve("does-not-exist").unwrap().name(), "Viridis");
}

#[test]
fn resolve_fails_only_on_empty_registry() {
    let reg = ColorMapRegistry::empty();
    assert!(matches!(reg.resolve("Viridis"), Err(SlidefigError::Config(_))));
}

#[test]
fn gray_ramp_endpoints_and_clamping() {
    let reg = ColorMapRegistry::builtin();
    let gray = reg.resolve("Gray").unwrap();
    assert_eq!(gray.color(0.0, 0.0, 10.0) & 0xFFFFFF, 0x000000);
    assert_eq!(gray.color(10.0, 0.0, 10.0) & 0xFFFFFF, 0xFFFFFF);
    assert_eq!(gray.color(-5.0, 0.0, 10.0) & 0xFFFFFF, 0x000000);
    assert_eq!(gray.color(50.0, 0.0, 10.0) & 0xFFFFFF, 0xFFFFFF);
    assert_eq!(gray.color(5.0, 0.0, 10.0) & 0xFFFFFF, 0x808080);
}

#[test]
fn degenerate_range_maps_to_low_end() {
    let reg = ColorMapRegistry::builtin();
    let viridis = reg.resolve("Viridis").unwrap();
    assert_eq!(viridis.color(3.0, 2.0, 2.0) & 0xFFFFFF, 0x440154);
}

#[test]
fn colorize_alpha_is_opaque_for_finite_and_clear_for_nan() {
    let reg = ColorMapRegistry::builtin();
    let map = reg.resolve("Viridis").unwrap();
    let t = tile(vec![0.0, 1e30, -1e30, f32::NAN, 5.0]);
    let out = colorize(&t, 0, map, 0.0, 10.0);
    let alphas: Vec<u8> = out.pixels().map(|p| p.0[3]).collect();
    assert_eq!(alphas, vec![255, 255, 255, 0, 255]);
    assert_eq!(out.get_pixel(3, 0).0, [0, 0, 0, 0]);
}

#[test]
fn min_max_ignores_non_finite() {
    let t = tile(vec![f32::NAN, 3.0, f32::INFINITY, -2.0, 7.5]);
    assert_eq!(compute_min_max(&t, 0), (-2.0, 7.5));
}

#[test]
fn min_max_of_all_nan_is_unit_range() {
    let t = tile(vec![f32::NAN; 4]);
    let (min, max) = compute_min_max(&t, 0);
    assert_eq!((min, max), (0.0, 1.0));
    assert!(min <= max);
}

#[test]
fn min_max_reads_requested_band_only() {
    let region = Region::new(0, 0, 2, 1, 1.0).unwrap();
    let t = ScalarTile::new(region, 2, 1, 2, vec![1.0, 100.0, 2.0, 200.0]).unwrap();
    assert_eq!(compute_min_max(&t, 0), (1.0, 2.0));
    assert_eq!(compute_min_max(&t, 1), (100.0, 200.0));
}
