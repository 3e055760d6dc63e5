use super::*;

#[test]
fn auto_font_size_uses_divisor_with_floor() {
    assert_eq!(resolve_font_size(0, 1000, SCALE_BAR_FONT), 20);
    assert_eq!(resolve_font_size(0, 300, SCALE_BAR_FONT), 12);
    assert_eq!(resolve_font_size(0, 1000, PANEL_LABEL_FONT), 40);
    assert_eq!(resolve_font_size(0, 100, PANEL_LABEL_FONT), 14);
    assert_eq!(resolve_font_size(0, 1000, INFO_LABEL_FONT), 25);
}

#[test]
fn explicit_font_size_is_clamped() {
    assert_eq!(resolve_font_size(1, 1000, SCALE_BAR_FONT), 4);
    assert_eq!(resolve_font_size(36, 1000, SCALE_BAR_FONT), 36);
    assert_eq!(resolve_font_size(999, 1000, SCALE_BAR_FONT), 200);
}

#[test]
fn margin_has_floor_of_ten() {
    assert_eq!(corner_margin(100), 10);
    assert_eq!(corner_margin(1000), 25);
}

#[test]
fn corners_report_edges() {
    assert!(Corner::TopLeft.is_top() && Corner::TopLeft.is_left());
    assert!(!Corner::BottomRight.is_top() && !Corner::BottomRight.is_left());
}

#[test]
fn decorations_deserialize_with_defaults() {
    let d: Decorations = serde_json::from_str(
        r##"{"scale_bar": {"show": true, "corner": "top-left", "color": "#ff0000"}, "inset": {"show": true}}"##,
    )
    .unwrap();
    assert!(d.scale_bar.show);
    assert_eq!(d.scale_bar.corner, Corner::TopLeft);
    assert_eq!(d.scale_bar.color, Color::rgb(255, 0, 0));
    assert!(d.scale_bar.bold);
    assert!(d.inset.show && d.inset.guide_lines);
    assert_eq!(d.inset.magnification, 4.0);
    assert!(!d.panel_label.show);
}

#[test]
fn default_inset_and_legend_use_different_corners() {
    let d = Decorations::default();
    assert_ne!(d.inset.corner, d.color_legend.corner);
    assert_eq!(d.inset.corner, Corner::BottomLeft);
}
