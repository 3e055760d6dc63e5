//! SVG 1.1 writer for figure plans over an embedded raster background.

use std::collections::HashSet;
use std::fmt::Write as _;

use base64::Engine as _;

use crate::compile::plan::{DrawOp, FigurePlan, ImagePlacement, Layer, StrokeStyle, TextAnchor};
use crate::foundation::core::{Color, Point};
use crate::foundation::error::{SlidefigError, SlidefigResult};

/// Font stack used for every text element.
pub const FONT_FAMILY: &str = "Arial, Helvetica, 'Liberation Sans', 'DejaVu Sans', sans-serif";

/// Escape the five XML special characters.
pub fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Make `raw` a valid XML id: letters, digits, `-`, `_`, `.`; never starting with a digit.
pub fn sanitize_id(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !out.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        out.insert(0, '_');
    }
    out
}

/// Compact decimal: at most two fractional digits, trailing zeros dropped.
pub fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

fn paint_attrs(out: &mut String, fill: Option<Color>, stroke: Option<&StrokeStyle>) {
    match fill {
        Some(c) => {
            let _ = write!(out, r#" fill="{}""#, c.to_hex_rgb());
            if c.a < 255 {
                let _ = write!(out, r#" fill-opacity="{}""#, num(f64::from(c.a) / 255.0));
            }
        }
        None => out.push_str(r#" fill="none""#),
    }
    if let Some(s) = stroke {
        let _ = write!(
            out,
            r#" stroke="{}" stroke-width="{}""#,
            s.color.to_hex_rgb(),
            num(s.width)
        );
        if s.color.a < 255 {
            let _ = write!(out, r#" stroke-opacity="{}""#, num(f64::from(s.color.a) / 255.0));
        }
        if let Some([on, off]) = s.dash {
            let _ = write!(out, r#" stroke-dasharray="{} {}""#, num(on), num(off));
        }
    }
}

/// One `<text>` element; `origin.y` is the baseline.
pub fn text_element(
    out: &mut String,
    text: &str,
    origin: Point,
    size: f64,
    bold: bool,
    anchor: TextAnchor,
    color: Color,
) {
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{}""#,
        num(origin.x),
        num(origin.y),
        num(size)
    );
    if bold {
        out.push_str(r#" font-weight="bold""#);
    }
    if anchor != TextAnchor::Start {
        let _ = write!(out, r#" text-anchor="{}""#, anchor.svg_keyword());
    }
    paint_attrs(out, Some(color), None);
    let _ = writeln!(out, r#" xml:space="preserve">{}</text>"#, xml_escape(text));
}

/// Base64 PNG `data:` URI for straight-alpha pixels.
pub fn png_data_uri(image: &image::RgbaImage) -> SlidefigResult<String> {
    let mut buf = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| SlidefigError::render(format!("encode embedded png: {e}")))?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&buf)
    ))
}

fn image_element(out: &mut String, placement: &ImagePlacement, id: Option<&str>) -> SlidefigResult<()> {
    let uri = png_data_uri(&placement.pixels)?;
    out.push_str("<image");
    if let Some(id) = id {
        let _ = write!(out, r#" id="{id}""#);
    }
    let _ = writeln!(
        out,
        r#" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none" image-rendering="optimizeSpeed" xlink:href="{uri}"/>"#,
        placement.x, placement.y, placement.width, placement.height
    );
    Ok(())
}

/// Streaming writer that keeps element ids unique.
struct SvgWriter {
    out: String,
    ids: HashSet<String>,
}

impl SvgWriter {
    fn unique_id(&mut self, raw: &str) -> String {
        let base = sanitize_id(raw);
        if self.ids.insert(base.clone()) {
            return base;
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}-{n}");
            if self.ids.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    fn op(&mut self, op: &DrawOp) -> SlidefigResult<()> {
        match op {
            DrawOp::Rect { rect, fill, stroke } => {
                let _ = write!(
                    self.out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                    num(rect.x0),
                    num(rect.y0),
                    num(rect.width()),
                    num(rect.height())
                );
                paint_attrs(&mut self.out, *fill, stroke.as_ref());
                self.out.push_str("/>\n");
            }
            DrawOp::Path {
                id,
                path,
                fill,
                stroke,
            } => {
                self.out.push_str("<path");
                if let Some(id) = id {
                    let id = self.unique_id(id);
                    let _ = write!(self.out, r#" id="{id}""#);
                }
                let _ = write!(self.out, r#" d="{}" fill-rule="evenodd""#, path.to_svg());
                paint_attrs(&mut self.out, *fill, stroke.as_ref());
                self.out.push_str("/>\n");
            }
            DrawOp::Text {
                text,
                origin,
                size,
                bold,
                anchor,
                color,
            } => text_element(&mut self.out, text, *origin, *size, *bold, *anchor, *color),
            DrawOp::Image(placement) => image_element(&mut self.out, placement, None)?,
        }
        Ok(())
    }

    fn layer(&mut self, layer: &Layer) -> SlidefigResult<()> {
        let id = self.unique_id(&layer.id);
        let _ = writeln!(self.out, r#"<g id="{id}">"#);
        for op in &layer.ops {
            self.op(op)?;
        }
        for child in &layer.children {
            self.layer(child)?;
        }
        self.out.push_str("</g>\n");
        Ok(())
    }
}

/// Full SVG document: the background raster first, then every layer of `plan`.
pub fn write_document(background: &image::RgbaImage, plan: &FigurePlan) -> SlidefigResult<String> {
    let (w, h) = (plan.width, plan.height);
    let mut writer = SvgWriter {
        out: String::new(),
        ids: HashSet::new(),
    };
    let _ = writeln!(writer.out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        writer.out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" version="1.1" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );

    let bg_id = writer.unique_id("background");
    let _ = writeln!(writer.out, r#"<g id="{bg_id}">"#);
    image_element(
        &mut writer.out,
        &ImagePlacement {
            pixels: std::sync::Arc::new(background.clone()),
            x: 0,
            y: 0,
            width: w,
            height: h,
        },
        None,
    )?;
    writer.out.push_str("</g>\n");

    for layer in &plan.layers {
        writer.layer(layer)?;
    }
    writer.out.push_str("</svg>\n");
    Ok(writer.out)
}

/// Standalone SVG holding only the given text ops, with its viewBox at `(x, y)`.
pub fn text_window_document(ops: &[&DrawOp], x: i64, y: i64, width: u32, height: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="{x} {y} {width} {height}">"#
    );
    for op in ops {
        if let DrawOp::Text {
            text,
            origin,
            size,
            bold,
            anchor,
            color,
        } = op
        {
            text_element(&mut out, text, *origin, *size, *bold, *anchor, *color);
        }
    }
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
