use super::*;
use crate::foundation::core::{BezPath, Rect};

#[test]
fn ids_are_sanitized() {
    assert_eq!(sanitize_id("Tumor-12"), "Tumor-12");
    assert_eq!(sanitize_id("Tumor cells/42"), "Tumor_cells_42");
    assert_eq!(sanitize_id("3d"), "_3d");
    assert_eq!(sanitize_id(""), "_");
}

#[test]
fn numbers_are_compact() {
    assert_eq!(num(10.0), "10");
    assert_eq!(num(2.5), "2.5");
    assert_eq!(num(1.0 / 3.0), "0.33");
    assert_eq!(num(-0.001), "0");
}

#[test]
fn text_is_escaped_and_anchored() {
    let mut out = String::new();
    text_element(
        &mut out,
        "a<b & \"c\"",
        Point::new(5.0, 7.5),
        12.0,
        true,
        TextAnchor::Middle,
        Color::WHITE,
    );
    assert!(out.contains("a&lt;b &amp; &quot;c&quot;"));
    assert!(out.contains(r#"text-anchor="middle""#));
    assert!(out.contains(r#"font-weight="bold""#));
    assert!(out.contains(r##"fill="#ffffff""##));
    assert!(out.contains(r#"y="7.5""#));
}

#[test]
fn document_groups_layers_and_keeps_ids_unique() {
    let mut tri = BezPath::new();
    tri.move_to((0.0, 0.0));
    tri.line_to((4.0, 0.0));
    tri.line_to((0.0, 4.0));
    tri.close_path();

    let mut objects = Layer::new("objects");
    let mut class = Layer::new("Tumor");
    for _ in 0..2 {
        class.push(DrawOp::Path {
            id: Some("Tumor-1".to_owned()),
            path: tri.clone(),
            fill: None,
            stroke: Some(StrokeStyle::solid(Color::rgb(255, 0, 0), 2.0)),
        });
    }
    objects.children.push(class);
    let mut bar = Layer::new("scale-bar");
    bar.push(DrawOp::Rect {
        rect: Rect::new(1.0, 2.0, 5.0, 4.0),
        fill: Some(Color::WHITE.with_alpha(128)),
        stroke: Some(StrokeStyle::dashed(Color::BLACK, 1.0, 3.0, 2.0)),
    });

    let mut plan = FigurePlan::new(8, 6);
    plan.push_layer(objects);
    plan.push_layer(bar);
    let bg = image::RgbaImage::from_pixel(8, 6, image::Rgba([0, 0, 0, 255]));
    let svg = write_document(&bg, &plan).unwrap();

    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains(r#"viewBox="0 0 8 6""#));
    assert!(svg.contains("data:image/png;base64,"));
    assert!(svg.contains(r#"<g id="objects">"#));
    assert!(svg.contains(r#"<g id="Tumor">"#));
    assert!(svg.contains(r#"id="Tumor-1""#));
    assert!(svg.contains(r#"id="Tumor-1-2""#));
    assert!(svg.contains(r#"fill-opacity="0.5""#));
    assert!(svg.contains(r#"stroke-dasharray="3 2""#));
    let bg_pos = svg.find(r#"id="background""#).unwrap();
    assert!(bg_pos < svg.find(r#"id="objects""#).unwrap());
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn text_window_sets_view_box_origin() {
    let op = DrawOp::Text {
        text: "A".to_owned(),
        origin: Point::new(20.0, 30.0),
        size: 10.0,
        bold: false,
        anchor: TextAnchor::Start,
        color: Color::WHITE,
    };
    let svg = text_window_document(&[&op], 15, 18, 40, 20);
    assert!(svg.contains(r#"viewBox="15 18 40 20""#));
    assert!(svg.contains(">A</text>"));
}
