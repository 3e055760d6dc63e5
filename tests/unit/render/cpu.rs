use std::sync::Arc;

use super::*;
use crate::compile::plan::ImagePlacement;
use crate::foundation::core::Rect;

fn opaque(w: u32, h: u32) -> Frame {
    Frame::from_straight(&image::RgbaImage::from_pixel(
        w,
        h,
        image::Rgba([0, 0, 0, 255]),
    ))
}

#[test]
fn filled_rect_covers_its_pixels_only() {
    let mut frame = opaque(20, 20);
    let mut layer = Layer::new("r");
    layer.push(DrawOp::Rect {
        rect: Rect::new(5.0, 5.0, 15.0, 15.0),
        fill: Some(Color::rgb(255, 0, 0)),
        stroke: None,
    });
    CpuPainter::new().paint_layer(&mut frame, &layer).unwrap();
    assert_eq!(frame.pixel(10, 10), [255, 0, 0, 255]);
    assert_eq!(frame.pixel(2, 2), [0, 0, 0, 255]);
}

#[test]
fn stroke_without_fill_leaves_interior() {
    let mut frame = opaque(40, 40);
    let mut layer = Layer::new("s");
    layer.push(DrawOp::Rect {
        rect: Rect::new(10.0, 10.0, 30.0, 30.0),
        fill: None,
        stroke: Some(StrokeStyle::solid(Color::WHITE, 2.0)),
    });
    CpuPainter::new().paint_layer(&mut frame, &layer).unwrap();
    assert_eq!(frame.pixel(20, 20), [0, 0, 0, 255]);
    assert_eq!(frame.pixel(10, 20), [255, 255, 255, 255]);
}

#[test]
fn image_ops_blit_nearest_neighbour() {
    let mut frame = opaque(10, 10);
    let mut pixels = image::RgbaImage::new(2, 1);
    pixels.put_pixel(0, 0, image::Rgba([0, 255, 0, 255]));
    pixels.put_pixel(1, 0, image::Rgba([0, 0, 255, 255]));
    let mut layer = Layer::new("i");
    layer.push(DrawOp::Image(ImagePlacement {
        pixels: Arc::new(pixels),
        x: 2,
        y: 2,
        width: 4,
        height: 2,
    }));
    CpuPainter::new().paint_layer(&mut frame, &layer).unwrap();
    assert_eq!(frame.pixel(3, 3), [0, 255, 0, 255]);
    assert_eq!(frame.pixel(4, 2), [0, 0, 255, 255]);
    assert_eq!(frame.pixel(6, 2), [0, 0, 0, 255]);
}

#[test]
fn painting_is_deterministic() {
    let mut layer = Layer::new("p");
    let mut tri = BezPath::new();
    tri.move_to((1.0, 1.0));
    tri.line_to((30.0, 4.0));
    tri.line_to((12.0, 28.0));
    tri.close_path();
    layer.push(DrawOp::Path {
        id: None,
        path: tri,
        fill: Some(Color::rgb(10, 200, 30).with_alpha(100)),
        stroke: Some(StrokeStyle::dashed(Color::YELLOW, 1.5, 4.0, 2.0)),
    });
    let mut a = opaque(32, 32);
    let mut b = opaque(32, 32);
    let mut painter = CpuPainter::new();
    painter.paint_layer(&mut a, &layer).unwrap();
    painter.paint_layer(&mut b, &layer).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, opaque(32, 32));
}
