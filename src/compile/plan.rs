use std::sync::Arc;

use crate::foundation::core::{BezPath, Color, Point, Rect};

/// Horizontal text alignment relative to the op origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    /// Origin is the left edge of the text.
    #[default]
    Start,
    /// Origin is the horizontal center.
    Middle,
    /// Origin is the right edge.
    End,
}

impl TextAnchor {
    /// SVG `text-anchor` keyword.
    pub fn svg_keyword(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Outline parameters for rects and paths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color (straight alpha).
    pub color: Color,
    /// Width in output pixels.
    pub width: f64,
    /// `[on, off]` dash lengths in output pixels.
    pub dash: Option<[f64; 2]>,
}

impl StrokeStyle {
    /// Solid stroke.
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    /// Dashed stroke.
    pub fn dashed(color: Color, width: f64, on: f64, off: f64) -> Self {
        Self {
            color,
            width,
            dash: Some([on, off]),
        }
    }
}

/// Pixel block placed at an integer position, scaled nearest-neighbour to `width x height`.
#[derive(Clone, Debug)]
pub struct ImagePlacement {
    /// Straight-alpha pixels.
    pub pixels: Arc<image::RgbaImage>,
    /// Left edge in output pixels.
    pub x: i64,
    /// Top edge in output pixels.
    pub y: i64,
    /// Placed width.
    pub width: u32,
    /// Placed height.
    pub height: u32,
}

#[derive(Clone, Debug)]
/// Draw operation emitted by decorators and overlay painters.
///
/// All coordinates are in output pixels of the figure being composed.
pub enum DrawOp {
    /// Axis-aligned rectangle.
    Rect {
        /// Geometry.
        rect: Rect,
        /// Fill color, if any.
        fill: Option<Color>,
        /// Outline, if any.
        stroke: Option<StrokeStyle>,
    },
    /// Arbitrary vector path.
    Path {
        /// Addressable identifier in vector output.
        id: Option<String>,
        /// Geometry.
        path: BezPath,
        /// Fill color (even-odd rule), if any.
        fill: Option<Color>,
        /// Outline, if any.
        stroke: Option<StrokeStyle>,
    },
    /// Single-line text run; `origin.y` is the baseline.
    Text {
        /// UTF-8 text.
        text: String,
        /// Anchor point.
        origin: Point,
        /// Font size in pixels.
        size: f64,
        /// Bold weight.
        bold: bool,
        /// Alignment relative to `origin.x`.
        anchor: TextAnchor,
        /// Fill color.
        color: Color,
    },
    /// Pixel block.
    Image(ImagePlacement),
}

/// Named group of draw ops; children are drawn after the layer's own ops.
#[derive(Clone, Debug, Default)]
pub struct Layer {
    /// Group identifier (becomes an SVG `id`).
    pub id: String,
    /// Ops in paint order.
    pub ops: Vec<DrawOp>,
    /// Nested groups in paint order.
    pub children: Vec<Layer>,
}

impl Layer {
    /// Empty layer.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ops: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append one op.
    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Whether neither the layer nor any child draws anything.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty() && self.children.iter().all(Layer::is_empty)
    }

    /// Total op count including children.
    pub fn op_count(&self) -> usize {
        self.ops.len() + self.children.iter().map(Layer::op_count).sum::<usize>()
    }

    /// Ops of this layer and its children in paint order.
    pub fn flatten(&self) -> Vec<&DrawOp> {
        let mut out = Vec::with_capacity(self.op_count());
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a DrawOp>) {
        out.extend(self.ops.iter());
        for child in &self.children {
            child.flatten_into(out);
        }
    }
}

/// Immutable drawing state handed to each decorator by value.
///
/// Replaces save/restore of a mutable graphics context: decorators derive what they need
/// with the `with_*` methods and never hand anything back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawContext {
    /// Figure width in output pixels.
    pub width: u32,
    /// Figure height in output pixels.
    pub height: u32,
    /// Primary color.
    pub color: Color,
    /// Resolved font size in pixels.
    pub font_size: u32,
    /// Bold text.
    pub bold: bool,
}

impl DrawContext {
    /// Context for a `width x height` figure with white, 12px regular text.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color: Color::WHITE,
            font_size: 12,
            bold: false,
        }
    }

    /// Smaller of width and height.
    pub fn min_dimension(&self) -> u32 {
        self.width.min(self.height)
    }

    /// Same context with a different color.
    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    /// Same context with a different font.
    pub fn with_font(self, font_size: u32, bold: bool) -> Self {
        Self {
            font_size,
            bold,
            ..self
        }
    }
}

/// Everything drawn on top of a figure's background, in paint order.
#[derive(Clone, Debug, Default)]
pub struct FigurePlan {
    /// Figure width in output pixels.
    pub width: u32,
    /// Figure height in output pixels.
    pub height: u32,
    /// Layers in paint order.
    pub layers: Vec<Layer>,
}

impl FigurePlan {
    /// Empty plan.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
        }
    }

    /// Append a layer unless it draws nothing.
    pub fn push_layer(&mut self, layer: Layer) {
        if !layer.is_empty() {
            self.layers.push(layer);
        }
    }

    /// Layer by id.
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
