//! Magnified inset of a sub-rectangle of the composited figure.

use std::sync::Arc;

use crate::compile::plan::{DrawOp, ImagePlacement, Layer, StrokeStyle};
use crate::decor::place_box;
use crate::foundation::core::{BezPath, Point, Rect};
use crate::scene::decoration::{InsetSpec, corner_margin};

/// Crops narrower or shorter than this are not inset.
pub const MIN_CROP_PX: u32 = 10;
/// Smallest configurable magnification.
pub const MIN_MAGNIFICATION: f64 = 2.0;
/// Largest configurable magnification.
pub const MAX_MAGNIFICATION: f64 = 16.0;

/// Integer pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl PixelRect {
    /// As a float rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x + self.width),
            f64::from(self.y + self.height),
        )
    }
}

/// Resolved inset geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct InsetLayout {
    /// Cropped area of the figure.
    pub source: PixelRect,
    /// Where the magnified copy goes.
    pub target: PixelRect,
    /// Applied integer magnification.
    pub magnification: u32,
    /// Frame line width.
    pub frame_width: f64,
    /// Guide line end points `(source corner, target corner)`.
    pub guides: [(Point, Point); 2],
}

fn fraction_span(start: f64, len: f64, total: u32) -> (u32, u32) {
    let start = if start.is_finite() { start.clamp(0.0, 1.0) } else { 0.0 };
    let len = if len.is_finite() { len.max(0.01).min(1.0) } else { 0.01 };
    let total_f = f64::from(total);
    let x0 = ((start * total_f).round() as u32).min(total);
    let w = ((len * total_f).round() as u32).min(total - x0);
    (x0, w)
}

fn corners(r: Rect) -> [Point; 4] {
    [
        Point::new(r.x0, r.y0),
        Point::new(r.x1, r.y0),
        Point::new(r.x0, r.y1),
        Point::new(r.x1, r.y1),
    ]
}

/// Pick the two corner pairs facing each other along the dominant axis between centers.
fn guide_pairs(source: Rect, target: Rect) -> [(Point, Point); 2] {
    const TL: usize = 0;
    const TR: usize = 1;
    const BL: usize = 2;
    const BR: usize = 3;
    let s = corners(source);
    let t = corners(target);
    let d = target.center() - source.center();
    if d.x.abs() >= d.y.abs() {
        if d.x >= 0.0 {
            [(s[TR], t[TL]), (s[BR], t[BL])]
        } else {
            [(s[TL], t[TR]), (s[BL], t[BR])]
        }
    } else if d.y >= 0.0 {
        [(s[BL], t[TL]), (s[BR], t[TR])]
    } else {
        [(s[TL], t[BL]), (s[TR], t[BR])]
    }
}

/// Lay out the inset for a `width x height` figure; `None` if the crop is too small or
/// cannot be magnified within half the figure.
pub fn layout(spec: &InsetSpec, width: u32, height: u32) -> Option<InsetLayout> {
    let (sx, sw) = fraction_span(spec.x, spec.width, width);
    let (sy, sh) = fraction_span(spec.y, spec.height, height);
    if sw < MIN_CROP_PX || sh < MIN_CROP_PX {
        tracing::debug!(sw, sh, "inset crop below {MIN_CROP_PX}px; skipping");
        return None;
    }

    let requested = if spec.magnification.is_finite() {
        spec.magnification
    } else {
        MIN_MAGNIFICATION
    };
    let mut mag = requested
        .clamp(MIN_MAGNIFICATION, MAX_MAGNIFICATION)
        .round() as u32;
    let (half_w, half_h) = (width / 2, height / 2);
    if sw * mag > half_w || sh * mag > half_h {
        mag = (half_w / sw).min(half_h / sh);
    }
    if mag == 0 {
        tracing::debug!(sw, sh, "inset cannot fit within half the figure; skipping");
        return None;
    }

    let (tw, th) = (sw * mag, sh * mag);
    let margin = f64::from(corner_margin(width.min(height)));
    let origin = place_box(spec.corner, f64::from(tw), f64::from(th), width, height, margin);
    let source = PixelRect {
        x: sx,
        y: sy,
        width: sw,
        height: sh,
    };
    let target = PixelRect {
        x: origin.x.round() as u32,
        y: origin.y.round() as u32,
        width: tw,
        height: th,
    };
    Some(InsetLayout {
        source,
        target,
        magnification: mag,
        frame_width: f64::from(2u32.max(width.min(height) / 300)),
        guides: guide_pairs(source.to_rect(), target.to_rect()),
    })
}

/// Nearest-neighbour upscale of `crop` by the layout's magnification.
pub fn magnify(crop: &image::RgbaImage, layout: &InsetLayout) -> image::RgbaImage {
    image::imageops::resize(
        crop,
        layout.target.width,
        layout.target.height,
        image::imageops::FilterType::Nearest,
    )
}

/// Magnified pixels, both frames and the optional dashed guides.
///
/// `crop` holds the source rectangle's pixels from the already-decorated figure.
pub fn inset_layer(spec: &InsetSpec, layout: &InsetLayout, crop: &image::RgbaImage) -> Layer {
    let mut layer = Layer::new("inset");
    layer.push(DrawOp::Image(ImagePlacement {
        pixels: Arc::new(magnify(crop, layout)),
        x: i64::from(layout.target.x),
        y: i64::from(layout.target.y),
        width: layout.target.width,
        height: layout.target.height,
    }));

    let frame = StrokeStyle::solid(spec.color, layout.frame_width);
    layer.push(DrawOp::Rect {
        rect: layout.source.to_rect(),
        fill: None,
        stroke: Some(frame),
    });
    if spec.guide_lines {
        let mut path = BezPath::new();
        for (a, b) in layout.guides {
            path.move_to(a);
            path.line_to(b);
        }
        let w = layout.frame_width;
        layer.push(DrawOp::Path {
            id: None,
            path,
            fill: None,
            stroke: Some(StrokeStyle::dashed(spec.color, w, 3.0 * w, 2.0 * w)),
        });
    }
    layer.push(DrawOp::Rect {
        rect: layout.target.to_rect(),
        fill: None,
        stroke: Some(frame),
    });
    layer
}

#[cfg(test)]
#[path = "../../tests/unit/decor/inset.rs"]
mod tests;
