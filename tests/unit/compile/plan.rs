use super::*;

fn text(s: &str) -> DrawOp {
    DrawOp::Text {
        text: s.to_owned(),
        origin: Point::new(0.0, 10.0),
        size: 10.0,
        bold: false,
        anchor: TextAnchor::Start,
        color: Color::WHITE,
    }
}

#[test]
fn flatten_visits_own_ops_before_children() {
    let mut root = Layer::new("root");
    root.push(text("a"));
    let mut child = Layer::new("child");
    child.push(text("b"));
    root.children.push(child);
    root.push(text("c"));

    let order: Vec<&str> = root
        .flatten()
        .into_iter()
        .map(|op| match op {
            DrawOp::Text { text, .. } => text.as_str(),
            _ => "",
        })
        .collect();
    assert_eq!(order, vec!["a", "c", "b"]);
    assert_eq!(root.op_count(), 3);
}

#[test]
fn empty_layers_are_not_added_to_plan() {
    let mut plan = FigurePlan::new(10, 10);
    let mut nested = Layer::new("objects");
    nested.children.push(Layer::new("Tumor"));
    assert!(nested.is_empty());
    plan.push_layer(nested);
    plan.push_layer(Layer::new("scale-bar"));
    assert!(plan.layers.is_empty());

    let mut l = Layer::new("panel-label");
    l.push(text("A"));
    plan.push_layer(l);
    assert!(plan.layer("panel-label").is_some());
}

#[test]
fn draw_context_is_copied_not_mutated() {
    let base = DrawContext::new(300, 200);
    let derived = base.with_color(Color::BLACK).with_font(20, true);
    assert_eq!(base.color, Color::WHITE);
    assert_eq!(base.font_size, 12);
    assert_eq!(derived.font_size, 20);
    assert!(derived.bold);
    assert_eq!(derived.min_dimension(), 200);
}

#[test]
fn anchors_map_to_svg_keywords() {
    assert_eq!(TextAnchor::Middle.svg_keyword(), "middle");
    assert_eq!(TextAnchor::default().svg_keyword(), "start");
}
