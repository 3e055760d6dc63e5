//! Outlined text stamps and the estimated metrics used to lay them out.

use crate::color::contrast::outline_for;
use crate::compile::plan::{DrawContext, DrawOp, Layer, TextAnchor};
use crate::foundation::core::{Color, Point};

/// Offsets of the outline copies, every 1px neighbour except the origin.
pub const OUTLINE_OFFSETS: [(f64, f64); 8] = [
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, -1.0),
    (-1.0, 0.0),
    (1.0, 0.0),
    (-1.0, 1.0),
    (0.0, 1.0),
    (1.0, 1.0),
];

/// Estimated extent of a single text line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    /// Height above the baseline.
    pub ascent: f64,
    /// Depth below the baseline.
    pub descent: f64,
    /// Advance width.
    pub width: f64,
}

/// Deterministic metrics for `text` at `size` pixels.
///
/// Widths are an average-advance estimate so layout never depends on installed fonts.
pub fn measure(text: &str, size: f64, bold: bool) -> TextMetrics {
    let advance = if bold { 0.6 } else { 0.56 };
    TextMetrics {
        ascent: 0.8 * size,
        descent: 0.2 * size,
        width: text.chars().count() as f64 * advance * size,
    }
}

/// Metrics for `text` in the context's font.
pub fn measure_in(ctx: &DrawContext, text: &str) -> TextMetrics {
    measure(text, f64::from(ctx.font_size), ctx.bold)
}

/// Ops drawing `text` in `primary` with an 8-direction halo in `outline`.
pub fn outlined_ops(
    text: &str,
    origin: Point,
    anchor: TextAnchor,
    size: f64,
    bold: bool,
    primary: Color,
    outline: Color,
) -> Vec<DrawOp> {
    let mut ops = Vec::with_capacity(OUTLINE_OFFSETS.len() + 1);
    for (dx, dy) in OUTLINE_OFFSETS {
        ops.push(DrawOp::Text {
            text: text.to_owned(),
            origin: Point::new(origin.x + dx, origin.y + dy),
            size,
            bold,
            anchor,
            color: outline,
        });
    }
    ops.push(DrawOp::Text {
        text: text.to_owned(),
        origin,
        size,
        bold,
        anchor,
        color: primary,
    });
    ops
}

/// Stamp `text` into `layer` in the context's color and font, outlined for contrast.
pub fn stamp(layer: &mut Layer, ctx: &DrawContext, text: &str, origin: Point, anchor: TextAnchor) {
    if text.is_empty() {
        return;
    }
    layer.ops.extend(outlined_ops(
        text,
        origin,
        anchor,
        f64::from(ctx.font_size),
        ctx.bold,
        ctx.color,
        outline_for(ctx.color),
    ));
}

#[cfg(test)]
#[path = "../../tests/unit/decor/text.rs"]
mod tests;
