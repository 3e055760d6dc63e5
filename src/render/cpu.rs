//! CPU raster backend: geometry through `vello_cpu`, text through `resvg`, pixel blocks by
//! direct nearest-neighbour blit.

use kurbo::Shape as _;

use crate::compile::plan::{DrawOp, Layer, StrokeStyle};
use crate::foundation::core::{BezPath, Color};
use crate::foundation::error::{SlidefigError, SlidefigResult};
use crate::render::composite::over_in_place;
use crate::render::surface::Frame;
use crate::render::text::paint_text_run;

/// Paints figure plans onto premultiplied frames, reusing one render context.
#[derive(Default)]
pub struct CpuPainter {
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for CpuPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuPainter").finish_non_exhaustive()
    }
}

impl CpuPainter {
    /// Painter with no context allocated yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> SlidefigResult<R>,
    ) -> SlidefigResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    /// Paint one layer (and its children), batching consecutive ops of the same kind.
    pub fn paint_layer(&mut self, frame: &mut Frame, layer: &Layer) -> SlidefigResult<()> {
        let ops = layer.flatten();
        let mut i = 0;
        while i < ops.len() {
            match ops[i] {
                DrawOp::Text { .. } => {
                    let end = run_end(&ops, i, |op| matches!(op, DrawOp::Text { .. }));
                    paint_text_run(frame, &ops[i..end])?;
                    i = end;
                }
                DrawOp::Image(placement) => {
                    let src = Frame::from_straight(&placement.pixels);
                    frame.composite_scaled(
                        &src,
                        placement.x,
                        placement.y,
                        placement.width,
                        placement.height,
                    )?;
                    i += 1;
                }
                DrawOp::Rect { .. } | DrawOp::Path { .. } => {
                    let end = run_end(&ops, i, |op| {
                        matches!(op, DrawOp::Rect { .. } | DrawOp::Path { .. })
                    });
                    self.paint_geometry(frame, &ops[i..end])?;
                    i = end;
                }
            }
        }
        Ok(())
    }

    fn paint_geometry(&mut self, frame: &mut Frame, ops: &[&DrawOp]) -> SlidefigResult<()> {
        let w: u16 = frame
            .width
            .try_into()
            .map_err(|_| SlidefigError::render("figure width exceeds u16"))?;
        let h: u16 = frame
            .height
            .try_into()
            .map_err(|_| SlidefigError::render("figure height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Ok(());
        }
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.with_ctx_mut(w, h, |ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            for op in ops {
                match op {
                    DrawOp::Rect { rect, fill, stroke } => draw_shape(
                        ctx,
                        &rect.to_path(0.1),
                        *fill,
                        stroke.as_ref(),
                        vello_cpu::peniko::Fill::NonZero,
                    ),
                    DrawOp::Path {
                        path, fill, stroke, ..
                    } => draw_shape(
                        ctx,
                        path,
                        *fill,
                        stroke.as_ref(),
                        vello_cpu::peniko::Fill::EvenOdd,
                    ),
                    DrawOp::Text { .. } | DrawOp::Image(_) => {}
                }
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        })?;
        over_in_place(&mut frame.data, pixmap.data_as_u8_slice(), 1.0)
    }
}

fn run_end(ops: &[&DrawOp], start: usize, same: impl Fn(&DrawOp) -> bool) -> usize {
    let mut end = start + 1;
    while end < ops.len() && same(ops[end]) {
        end += 1;
    }
    end
}

fn cpu_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn draw_shape(
    ctx: &mut vello_cpu::RenderContext,
    path: &BezPath,
    fill: Option<Color>,
    stroke: Option<&StrokeStyle>,
    rule: vello_cpu::peniko::Fill,
) {
    if let Some(c) = fill.filter(|c| c.a > 0) {
        ctx.set_fill_rule(rule);
        ctx.set_paint(cpu_color(c));
        ctx.fill_path(&bezpath_to_cpu(path));
    }
    if let Some(s) = stroke.filter(|s| s.color.a > 0 && s.width > 0.0) {
        let outline = match s.dash {
            Some(pattern) => kurbo::dash(path.iter(), 0.0, &pattern).collect::<BezPath>(),
            None => path.clone(),
        };
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(s.width));
        ctx.set_paint(cpu_color(s.color));
        ctx.stroke_path(&bezpath_to_cpu(&outline));
    }
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
