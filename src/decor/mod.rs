//! Decorators: scale bar, color legend, labels and inset.
//!
//! Every decorator is a pure function from settings plus a [`DrawContext`] to a [`Layer`] of
//! draw ops; none of them touch pixels.
//!
//! [`DrawContext`]: crate::compile::plan::DrawContext
//! [`Layer`]: crate::compile::plan::Layer

pub(crate) mod inset;
pub(crate) mod label;
pub(crate) mod legend;
pub(crate) mod scale_bar;
pub(crate) mod text;

use crate::compile::plan::TextAnchor;
use crate::foundation::core::Point;
use crate::scene::decoration::Corner;

/// Top-left corner of a `box_w x box_h` box anchored in `corner` of a `width x height` canvas.
///
/// Boxes larger than the canvas are pinned to the margin on the anchored side.
pub fn place_box(
    corner: Corner,
    box_w: f64,
    box_h: f64,
    width: u32,
    height: u32,
    margin: f64,
) -> Point {
    let x = if corner.is_left() {
        margin
    } else {
        (f64::from(width) - margin - box_w).max(margin.min(f64::from(width)))
    };
    let y = if corner.is_top() {
        margin
    } else {
        (f64::from(height) - margin - box_h).max(margin.min(f64::from(height)))
    };
    Point::new(x, y)
}

/// Anchor point and alignment for a single text line in `corner`.
///
/// Right corners anchor the text end at the margin, so no glyph width is needed.
pub fn corner_text_origin(
    corner: Corner,
    ascent: f64,
    descent: f64,
    width: u32,
    height: u32,
    margin: f64,
) -> (Point, TextAnchor) {
    let (x, anchor) = if corner.is_left() {
        (margin, TextAnchor::Start)
    } else {
        (f64::from(width) - margin, TextAnchor::End)
    };
    let baseline = if corner.is_top() {
        margin + ascent
    } else {
        f64::from(height) - margin - descent
    };
    (Point::new(x, baseline), anchor)
}

#[cfg(test)]
#[path = "../../tests/unit/decor/mod.rs"]
mod tests;
