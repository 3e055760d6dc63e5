use super::*;

#[test]
fn boxes_sit_inside_margins_for_every_corner() {
    let tl = place_box(Corner::TopLeft, 50.0, 20.0, 400, 300, 10.0);
    assert_eq!((tl.x, tl.y), (10.0, 10.0));
    let br = place_box(Corner::BottomRight, 50.0, 20.0, 400, 300, 10.0);
    assert_eq!((br.x, br.y), (340.0, 270.0));
    let tr = place_box(Corner::TopRight, 50.0, 20.0, 400, 300, 10.0);
    assert_eq!((tr.x, tr.y), (340.0, 10.0));
    let bl = place_box(Corner::BottomLeft, 50.0, 20.0, 400, 300, 10.0);
    assert_eq!((bl.x, bl.y), (10.0, 270.0));
}

#[test]
fn oversized_box_is_pinned_to_margin() {
    let p = place_box(Corner::BottomRight, 500.0, 500.0, 100, 100, 10.0);
    assert_eq!((p.x, p.y), (10.0, 10.0));
}

#[test]
fn text_origin_uses_end_anchor_on_right() {
    let (p, a) = corner_text_origin(Corner::TopRight, 8.0, 2.0, 200, 100, 10.0);
    assert_eq!(a, TextAnchor::End);
    assert_eq!((p.x, p.y), (190.0, 18.0));
    let (p, a) = corner_text_origin(Corner::BottomLeft, 8.0, 2.0, 200, 100, 10.0);
    assert_eq!(a, TextAnchor::Start);
    assert_eq!((p.x, p.y), (10.0, 88.0));
}
