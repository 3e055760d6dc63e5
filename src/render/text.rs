//! Text rasterization through `usvg`/`resvg` with a process-wide font database.

use std::sync::{Arc, OnceLock};

use crate::compile::plan::{DrawOp, TextAnchor};
use crate::decor::text::measure;
use crate::foundation::error::{SlidefigError, SlidefigResult};
use crate::render::surface::Frame;
use crate::render::svg::text_window_document;

static FONT_DB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

/// System fonts, loaded once.
pub fn font_db() -> Arc<usvg::fontdb::Database> {
    FONT_DB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            if db.is_empty() {
                tracing::warn!("no system fonts found; text decorations will not be visible");
            }
            Arc::new(db)
        })
        .clone()
}

/// Generous pixel bounds `(x0, y0, x1, y1)` of a text op.
fn text_bounds(op: &DrawOp) -> Option<(f64, f64, f64, f64)> {
    let DrawOp::Text {
        text,
        origin,
        size,
        bold,
        anchor,
        ..
    } = op
    else {
        return None;
    };
    // Estimated advances can undershoot real glyphs; pad the window.
    let w = measure(text, *size, *bold).width * 1.5 + size;
    let (x0, x1) = match anchor {
        TextAnchor::Start => (origin.x - size, origin.x + w),
        TextAnchor::Middle => (origin.x - w / 2.0, origin.x + w / 2.0),
        TextAnchor::End => (origin.x - w, origin.x + size),
    };
    Some((x0, origin.y - size * 1.2, x1, origin.y + size * 0.5))
}

/// Rasterize consecutive text ops into `frame` in one pass.
pub fn paint_text_run(frame: &mut Frame, ops: &[&DrawOp]) -> SlidefigResult<()> {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for (a0, b0, a1, b1) in ops.iter().filter_map(|op| text_bounds(op)) {
        bounds = Some(match bounds {
            None => (a0, b0, a1, b1),
            Some((x0, y0, x1, y1)) => (x0.min(a0), y0.min(b0), x1.max(a1), y1.max(b1)),
        });
    }
    let Some((x0, y0, x1, y1)) = bounds else {
        return Ok(());
    };
    let x0 = x0.floor().max(0.0) as i64;
    let y0 = y0.floor().max(0.0) as i64;
    let x1 = (x1.ceil() as i64).min(i64::from(frame.width));
    let y1 = (y1.ceil() as i64).min(i64::from(frame.height));
    if x1 <= x0 || y1 <= y0 {
        return Ok(());
    }
    let (w, h) = ((x1 - x0) as u32, (y1 - y0) as u32);

    let svg = text_window_document(ops, x0, y0, w, h);
    let opts = usvg::Options {
        fontdb: font_db(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| SlidefigError::render(format!("parse text svg: {e}")))?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| SlidefigError::render("failed to allocate text pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    let window = Frame::from_premul(w, h, pixmap.data().to_vec())?;
    frame.composite_at(&window, x0, y0)
}
