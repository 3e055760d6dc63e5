use super::*;

#[test]
fn outline_copies_precede_primary() {
    let ops = outlined_ops(
        "5 µm",
        Point::new(10.0, 20.0),
        TextAnchor::Middle,
        12.0,
        true,
        Color::WHITE,
        Color::BLACK,
    );
    assert_eq!(ops.len(), 9);
    for op in &ops[..8] {
        let DrawOp::Text { color, origin, .. } = op else {
            panic!("expected text op");
        };
        assert_eq!(*color, Color::BLACK);
        assert!((origin.x - 10.0).abs() <= 1.0 && (origin.y - 20.0).abs() <= 1.0);
        assert!(*origin != Point::new(10.0, 20.0));
    }
    let DrawOp::Text { color, origin, .. } = &ops[8] else {
        panic!("expected text op");
    };
    assert_eq!(*color, Color::WHITE);
    assert_eq!(*origin, Point::new(10.0, 20.0));
}

#[test]
fn stamp_derives_outline_from_primary() {
    let ctx = DrawContext::new(100, 100).with_color(Color::YELLOW);
    let mut layer = Layer::new("t");
    stamp(&mut layer, &ctx, "A", Point::new(5.0, 5.0), TextAnchor::Start);
    let DrawOp::Text { color, .. } = &layer.ops[0] else {
        panic!("expected text op");
    };
    assert_eq!(*color, Color::BLACK);
}

#[test]
fn empty_text_stamps_nothing() {
    let ctx = DrawContext::new(100, 100);
    let mut layer = Layer::new("t");
    stamp(&mut layer, &ctx, "", Point::ZERO, TextAnchor::Start);
    assert!(layer.ops.is_empty());
}

#[test]
fn metrics_scale_with_size_and_weight() {
    let m = measure("abcd", 10.0, false);
    assert_eq!(m.ascent, 8.0);
    assert_eq!(m.descent, 2.0);
    assert!((m.width - 22.4).abs() < 1e-9);
    assert!(measure("abcd", 10.0, true).width > m.width);
}
