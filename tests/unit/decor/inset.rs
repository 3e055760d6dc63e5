use super::*;
use crate::foundation::core::Color;
use crate::scene::decoration::Corner;

fn spec() -> InsetSpec {
    InsetSpec {
        show: true,
        ..InsetSpec::default()
    }
}

#[test]
fn magnification_is_reduced_to_fit_half_the_figure() {
    let l = layout(&spec(), 1000, 1000).unwrap();
    assert_eq!(
        l.source,
        PixelRect {
            x: 400,
            y: 400,
            width: 200,
            height: 200
        }
    );
    assert_eq!(l.magnification, 2);
    assert_eq!((l.target.width, l.target.height), (400, 400));
    // bottom-left, margin 25
    assert_eq!((l.target.x, l.target.y), (25, 575));
    assert_eq!(l.frame_width, 3.0);
}

#[test]
fn magnification_is_clamped_and_rounded() {
    let mut s = spec();
    s.width = 0.02;
    s.height = 0.02;
    s.magnification = 40.0;
    let l = layout(&s, 1000, 1000).unwrap();
    assert_eq!(l.magnification, 16);
    s.magnification = 0.5;
    assert_eq!(layout(&s, 1000, 1000).unwrap().magnification, 2);
    s.magnification = 2.6;
    assert_eq!(layout(&s, 1000, 1000).unwrap().magnification, 3);
}

#[test]
fn tiny_crops_are_skipped() {
    let mut s = spec();
    s.width = 0.001;
    // floored to 0.01 of 500px = 5px
    assert!(layout(&s, 500, 500).is_none());
}

#[test]
fn crop_is_clamped_to_the_figure() {
    let mut s = spec();
    s.x = 0.95;
    s.y = 0.0;
    s.width = 0.5;
    s.height = 0.02;
    let l = layout(&s, 1000, 1000).unwrap();
    assert_eq!(l.source.x + l.source.width, 1000);
    assert_eq!(l.source.width, 50);
}

#[test]
fn guides_connect_facing_corners() {
    // Inset top-right, source centered: dominant axis is horizontal, inset to the right.
    let mut s = spec();
    s.corner = Corner::TopRight;
    let l = layout(&s, 1000, 1000).unwrap();
    let src = l.source.to_rect();
    let dst = l.target.to_rect();
    assert_eq!(l.guides[0], (Point::new(src.x1, src.y0), Point::new(dst.x0, dst.y0)));
    assert_eq!(l.guides[1], (Point::new(src.x1, src.y1), Point::new(dst.x0, dst.y1)));

    // Source at the top-left, inset bottom-left: vertical, inset below.
    let mut s = spec();
    s.x = 0.05;
    s.y = 0.05;
    s.width = 0.1;
    s.height = 0.1;
    s.corner = Corner::BottomLeft;
    let l = layout(&s, 1000, 1000).unwrap();
    let src = l.source.to_rect();
    let dst = l.target.to_rect();
    assert_eq!(l.guides[0], (Point::new(src.x0, src.y1), Point::new(dst.x0, dst.y0)));
    assert_eq!(l.guides[1], (Point::new(src.x1, src.y1), Point::new(dst.x1, dst.y0)));
}

#[test]
fn magnify_repeats_pixels() {
    let mut s = spec();
    s.width = 0.1;
    s.height = 0.1;
    let l = layout(&s, 200, 200).unwrap();
    assert_eq!(l.source.width, 20);
    let crop = image::RgbaImage::from_fn(20, 20, |x, _| {
        if x < 10 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 255, 255])
        }
    });
    let big = magnify(&crop, &l);
    let m = l.magnification;
    assert_eq!(big.width(), 20 * m);
    assert_eq!(big.get_pixel(10 * m - 1, 0).0, [255, 0, 0, 255]);
    assert_eq!(big.get_pixel(10 * m, 0).0, [0, 0, 255, 255]);
}

#[test]
fn layer_draws_image_then_frames() {
    let l = layout(&spec(), 1000, 1000).unwrap();
    let crop = image::RgbaImage::new(200, 200);
    let layer = inset_layer(&spec(), &l, &crop);
    assert!(matches!(layer.ops[0], DrawOp::Image(_)));
    assert_eq!(layer.ops.len(), 4);
    let DrawOp::Path { stroke, .. } = &layer.ops[2] else {
        panic!("guide lines expected");
    };
    assert_eq!(stroke.unwrap().color, Color::YELLOW);
    assert!(stroke.unwrap().dash.is_some());

    let mut s = spec();
    s.guide_lines = false;
    assert_eq!(inset_layer(&s, &l, &crop).ops.len(), 3);
}
