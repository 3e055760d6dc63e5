//! Vertical gradient legend for density overlays.

use crate::color::colormap::ColorMap;
use crate::color::contrast::outline_for;
use crate::compile::plan::{DrawContext, DrawOp, Layer, StrokeStyle, TextAnchor};
use crate::decor::text::{measure_in, stamp};
use crate::foundation::core::{BezPath, Point, Rect};
use crate::scene::decoration::{ColorLegendSpec, LEGEND_FONT, corner_margin, resolve_font_size};

/// Number of labelled ticks (0%, 25%, 50%, 75%, 100%).
pub const TICK_COUNT: usize = 5;

const TICK_LEN: f64 = 4.0;
const TICK_GAP: f64 = 2.0;

/// Tick label: integers without decimals, tiny magnitudes in scientific notation.
pub fn format_tick(value: f64) -> String {
    if value == 0.0 {
        "0".to_owned()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else if value.abs() < 0.01 {
        format!("{value:.1e}")
    } else {
        format!("{value:.2}")
    }
}

/// Resolved legend geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendLayout {
    /// Gradient column.
    pub column: Rect,
    /// `(value, tick y)` from min (bottom) to max (top).
    pub ticks: Vec<(f64, f64)>,
    /// Resolved label font size.
    pub font_size: u32,
}

/// Column height: a quarter of the figure, at least 60px, never taller than the space
/// between the margins.
pub fn bar_height(height: u32, margin: u32) -> u32 {
    60u32
        .max(height / 4)
        .min(height.saturating_sub(2 * margin))
}

/// Lay out the column and tick positions. `None` when the figure is too small to hold it.
pub fn layout(spec: &ColorLegendSpec, ctx: &DrawContext, min: f64, max: f64) -> Option<LegendLayout> {
    let min_dim = ctx.min_dimension();
    let margin = corner_margin(min_dim);
    let bh = bar_height(ctx.height, margin);
    if bh < 2 {
        return None;
    }
    let col_w = 10u32.max(bh / 6);
    let (m, bh_f, col_w_f) = (f64::from(margin), f64::from(bh), f64::from(col_w));

    let x = if spec.corner.is_left() {
        m
    } else {
        f64::from(ctx.width) - m - col_w_f
    };
    let y = if spec.corner.is_top() {
        m
    } else {
        f64::from(ctx.height) - m - bh_f
    };
    let column = Rect::new(x, y, x + col_w_f, y + bh_f);

    let ticks = (0..TICK_COUNT)
        .map(|i| {
            let frac = i as f64 / (TICK_COUNT - 1) as f64;
            (min + frac * (max - min), y + (1.0 - frac) * bh_f)
        })
        .collect();

    Some(LegendLayout {
        column,
        ticks,
        font_size: resolve_font_size(spec.font_size, min_dim, LEGEND_FONT),
    })
}

/// Gradient column, contrasting outline, tick marks and labels.
pub fn legend_layer(
    spec: &ColorLegendSpec,
    ctx: DrawContext,
    map: &ColorMap,
    min: f64,
    max: f64,
) -> Option<Layer> {
    let layout = layout(spec, &ctx, min, max)?;
    let ctx = ctx.with_color(spec.color).with_font(layout.font_size, spec.bold);
    let col = layout.column;
    let rows = col.height().round() as u32;

    let mut layer = Layer::new("color-legend");
    for row in 0..rows {
        let t = if rows > 1 {
            f64::from(row) / f64::from(rows - 1)
        } else {
            0.0
        };
        let value = max - t * (max - min);
        let y = col.y0 + f64::from(row);
        layer.push(DrawOp::Rect {
            rect: Rect::new(col.x0, y, col.x1, y + 1.0),
            fill: Some(map.color_of(value, min, max)),
            stroke: None,
        });
    }
    let mid = map.color_of((min + max) / 2.0, min, max);
    layer.push(DrawOp::Rect {
        rect: col,
        fill: None,
        stroke: Some(StrokeStyle::solid(outline_for(mid), 1.0)),
    });

    let labels_right = spec.corner.is_left();
    let mut ticks = BezPath::new();
    for &(_, ty) in &layout.ticks {
        let (x0, x1) = if labels_right {
            (col.x1, col.x1 + TICK_LEN)
        } else {
            (col.x0 - TICK_LEN, col.x0)
        };
        ticks.move_to(Point::new(x0, ty));
        ticks.line_to(Point::new(x1, ty));
    }
    layer.push(DrawOp::Path {
        id: None,
        path: ticks,
        fill: None,
        stroke: Some(StrokeStyle::solid(ctx.color, 1.0)),
    });

    for &(value, ty) in &layout.ticks {
        let label = format_tick(value);
        let metrics = measure_in(&ctx, &label);
        let lo = col.y0 + metrics.ascent;
        let hi = (col.y1 - metrics.descent).max(lo);
        let baseline = (ty + metrics.ascent / 2.0).clamp(lo, hi);
        let (x, anchor) = if labels_right {
            (col.x1 + TICK_LEN + TICK_GAP, TextAnchor::Start)
        } else {
            (col.x0 - TICK_LEN - TICK_GAP, TextAnchor::End)
        };
        stamp(&mut layer, &ctx, &label, Point::new(x, baseline), anchor);
    }
    Some(layer)
}

#[cfg(test)]
#[path = "../../tests/unit/decor/legend.rs"]
mod tests;
