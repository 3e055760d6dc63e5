//! Physical scale bar: nice-length selection, label formatting and corner layout.

use crate::color::contrast::outline_for;
use crate::compile::plan::{DrawContext, DrawOp, Layer, StrokeStyle, TextAnchor};
use crate::decor::text::{measure_in, stamp};
use crate::foundation::core::{Point, Rect};
use crate::scene::decoration::{SCALE_BAR_FONT, ScaleBarSpec, corner_margin, resolve_font_size};

/// Candidate bar lengths in micrometres, scanned in this order.
pub const NICE_LENGTHS_UM: [f64; 19] = [
    0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 250.0, 500.0, 1000.0,
    2000.0, 5000.0, 10000.0, 20000.0, 50000.0,
];

/// Fraction of the figure width the bar aims to cover.
pub const TARGET_WIDTH_FRACTION: f64 = 0.15;

/// Bars shorter than this many pixels are not drawn.
pub const MIN_BAR_PX: f64 = 2.0;

/// Gap between label baseline and bar.
const LABEL_GAP: f64 = 4.0;

/// Closest nice length to `target_um`.
///
/// The scan keeps the first candidate on exact ties (1500 selects 1000, not 2000).
pub fn nice_length(target_um: f64) -> f64 {
    let mut best = NICE_LENGTHS_UM[0];
    let mut best_diff = (target_um - best).abs();
    for &candidate in &NICE_LENGTHS_UM[1..] {
        let diff = (target_um - candidate).abs();
        if diff < best_diff {
            best = candidate;
            best_diff = diff;
        }
    }
    best
}

/// Human label for a length: millimetres from 1000 µm up, otherwise micrometres.
pub fn format_length(um: f64) -> String {
    if um >= 1000.0 {
        let mm = um / 1000.0;
        if mm.fract() == 0.0 {
            format!("{} mm", mm as i64)
        } else {
            format!("{mm:.1} mm")
        }
    } else if um.fract() == 0.0 {
        format!("{} µm", um as i64)
    } else if um >= 1.0 {
        format!("{um:.1} µm")
    } else {
        format!("{um:.2} µm")
    }
}

/// Resolved geometry of a scale bar.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleBarLayout {
    /// Selected physical length in micrometres.
    pub length_um: f64,
    /// Bar rectangle in output pixels.
    pub bar: Rect,
    /// Label text.
    pub label: String,
    /// Label baseline center.
    pub label_origin: Point,
    /// Resolved label font size.
    pub font_size: u32,
}

/// Lay out a bar for a figure whose output pixels are `pixel_size_um` wide.
///
/// Returns `None` when calibration is missing, the bar would be shorter than
/// [`MIN_BAR_PX`], or it would not fit between the side margins.
pub fn layout(spec: &ScaleBarSpec, ctx: &DrawContext, pixel_size_um: Option<f64>) -> Option<ScaleBarLayout> {
    let px_um = pixel_size_um.filter(|p| p.is_finite() && *p > 0.0)?;
    let target = f64::from(ctx.width) * px_um * TARGET_WIDTH_FRACTION;
    let length_um = nice_length(target);
    let bar_px = (length_um / px_um).round();
    if bar_px < MIN_BAR_PX {
        tracing::debug!(length_um, bar_px, "scale bar too short; skipping");
        return None;
    }

    let min_dim = ctx.min_dimension();
    let margin = f64::from(corner_margin(min_dim));
    let (w, h) = (f64::from(ctx.width), f64::from(ctx.height));
    if bar_px > w - 2.0 * margin {
        tracing::debug!(length_um, bar_px, "scale bar wider than the figure; skipping");
        return None;
    }

    let font_size = resolve_font_size(spec.font_size, min_dim, SCALE_BAR_FONT);
    let text_ctx = ctx.with_font(font_size, spec.bold);
    let label = format_length(length_um);
    let metrics = measure_in(&text_ctx, &label);

    let bar_h = f64::from(4u32.max(ctx.height / 150));

    let bar_x = if spec.corner.is_left() {
        margin
    } else {
        w - margin - bar_px
    };
    let bar_y = if spec.corner.is_top() {
        margin + metrics.ascent + LABEL_GAP
    } else {
        h - margin - bar_h
    };
    let bar = Rect::new(bar_x, bar_y, bar_x + bar_px, bar_y + bar_h);
    let label_origin = Point::new(bar_x + bar_px / 2.0, bar_y - LABEL_GAP);

    Some(ScaleBarLayout {
        length_um,
        bar,
        label,
        label_origin,
        font_size,
    })
}

/// Bar plus centered label, both outlined for contrast.
pub fn scale_bar_layer(spec: &ScaleBarSpec, ctx: DrawContext, pixel_size_um: Option<f64>) -> Option<Layer> {
    let layout = layout(spec, &ctx, pixel_size_um)?;
    let ctx = ctx
        .with_color(spec.color)
        .with_font(layout.font_size, spec.bold);

    let mut layer = Layer::new("scale-bar");
    layer.push(DrawOp::Rect {
        rect: layout.bar,
        fill: Some(ctx.color),
        stroke: Some(StrokeStyle::solid(outline_for(ctx.color), 1.0)),
    });
    stamp(
        &mut layer,
        &ctx,
        &layout.label,
        layout.label_origin,
        TextAnchor::Middle,
    );
    Some(layer)
}

#[cfg(test)]
#[path = "../../tests/unit/decor/scale_bar.rs"]
mod tests;
