//! Panel letters and templated info text.

use chrono::{DateTime, Local};

use crate::compile::plan::{DrawContext, Layer};
use crate::decor::corner_text_origin;
use crate::decor::text::{measure_in, stamp};
use crate::scene::decoration::{
    INFO_LABEL_FONT, InfoLabelSpec, PANEL_LABEL_FONT, PanelLabelSpec, corner_margin,
    resolve_font_size,
};

/// Fallback for `{pixelSize}` when the image has no calibration.
pub const UNCALIBRATED: &str = "uncalibrated";
/// Fallback for `{classifier}` outside classifier mode.
pub const NO_CLASSIFIER: &str = "none";

/// Bijective base-26 letters: 0 -> "A", 25 -> "Z", 26 -> "AA", 52 -> "BA".
pub fn panel_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Values substituted into info label templates.
#[derive(Clone, Debug)]
pub struct InfoContext {
    /// Source image name.
    pub image_name: String,
    /// Full-resolution pixel size, if calibrated.
    pub pixel_size_um: Option<f64>,
    /// Figure width in output pixels.
    pub width: u32,
    /// Figure height in output pixels.
    pub height: u32,
    /// Classifier name in classifier mode.
    pub classifier: Option<String>,
    /// Timestamp for `{date}` and `{time}`, captured once per run.
    pub timestamp: DateTime<Local>,
}

/// Replace every known placeholder; unknown `{...}` sequences are left as written.
pub fn expand_template(template: &str, info: &InfoContext) -> String {
    let pixel_size = info
        .pixel_size_um
        .filter(|p| p.is_finite() && *p > 0.0)
        .map(|p| format!("{p:.4} µm"))
        .unwrap_or_else(|| UNCALIBRATED.to_owned());
    let replacements: [(&str, String); 7] = [
        ("{imageName}", info.image_name.clone()),
        ("{pixelSize}", pixel_size),
        ("{date}", info.timestamp.format("%Y-%m-%d").to_string()),
        ("{time}", info.timestamp.format("%H:%M:%S").to_string()),
        ("{width}", info.width.to_string()),
        ("{height}", info.height.to_string()),
        (
            "{classifier}",
            info.classifier
                .clone()
                .unwrap_or_else(|| NO_CLASSIFIER.to_owned()),
        ),
    ];
    let mut out = template.to_owned();
    for (key, value) in &replacements {
        if out.contains(key) {
            out = out.replace(key, value);
        }
    }
    out
}

fn corner_label(
    id: &str,
    text: &str,
    corner: crate::scene::decoration::Corner,
    ctx: DrawContext,
) -> Option<Layer> {
    if text.trim().is_empty() {
        return None;
    }
    let margin = f64::from(corner_margin(ctx.min_dimension()));
    let metrics = measure_in(&ctx, text);
    let (origin, anchor) = corner_text_origin(
        corner,
        metrics.ascent,
        metrics.descent,
        ctx.width,
        ctx.height,
        margin,
    );
    let mut layer = Layer::new(id);
    stamp(&mut layer, &ctx, text, origin, anchor);
    Some(layer)
}

/// Panel letter (or fixed text) for the panel at `index`.
pub fn panel_label_layer(spec: &PanelLabelSpec, ctx: DrawContext, index: usize) -> Option<Layer> {
    let text = spec.text.clone().unwrap_or_else(|| panel_letter(index));
    let size = resolve_font_size(spec.font_size, ctx.min_dimension(), PANEL_LABEL_FONT);
    corner_label(
        "panel-label",
        &text,
        spec.corner,
        ctx.with_color(spec.color).with_font(size, spec.bold),
    )
}

/// Expanded info template.
pub fn info_label_layer(spec: &InfoLabelSpec, ctx: DrawContext, info: &InfoContext) -> Option<Layer> {
    let text = expand_template(&spec.template, info);
    let size = resolve_font_size(spec.font_size, ctx.min_dimension(), INFO_LABEL_FONT);
    corner_label(
        "info-label",
        &text,
        spec.corner,
        ctx.with_color(spec.color).with_font(size, spec.bold),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/decor/label.rs"]
mod tests;
