//! Object shapes as classification-grouped, individually addressable path ops.

use crate::compile::plan::{DrawOp, Layer, StrokeStyle};
use crate::foundation::core::Region;
use crate::source::objects::{ObjectKind, ObjectShape};

/// Which shapes are drawn and how.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectPaint {
    /// Fill annotation interiors with their fill color.
    pub fill_annotations: bool,
    /// Draw detections (never filled).
    pub include_detections: bool,
    /// Outline width in output pixels.
    pub stroke_width: f64,
}

/// Per-object identifier: `<class>-<objectId>`.
pub fn object_id(shape: &ObjectShape) -> String {
    format!("{}-{}", shape.class_name(), shape.id)
}

/// Build the `objects` layer for `region`.
///
/// One child layer per classification, in order of first appearance; shapes keep source
/// order within their group. Geometry is mapped into output pixels with
/// [`Region::source_to_output`]; shapes entirely outside the region are dropped.
pub fn object_layer(shapes: &[ObjectShape], region: &Region, paint: ObjectPaint) -> Layer {
    let to_output = region.source_to_output();
    let bounds = region.bounds();
    let mut root = Layer::new("objects");

    for shape in shapes {
        if shape.kind == ObjectKind::Detection && !paint.include_detections {
            continue;
        }
        let b = shape.bounds();
        if b.x1 < bounds.x0 || b.x0 > bounds.x1 || b.y1 < bounds.y0 || b.y0 > bounds.y1 {
            continue;
        }
        let fill = (shape.kind == ObjectKind::Annotation && paint.fill_annotations)
            .then_some(shape.style.fill);
        let op = DrawOp::Path {
            id: Some(object_id(shape)),
            path: to_output * shape.geometry.clone(),
            fill,
            stroke: Some(StrokeStyle::solid(shape.style.stroke, paint.stroke_width)),
        };

        let class = shape.class_name();
        match root.children.iter_mut().find(|g| g.id == class) {
            Some(group) => group.push(op),
            None => {
                let mut group = Layer::new(class);
                group.push(op);
                root.children.push(group);
            }
        }
    }
    root
}

#[cfg(test)]
#[path = "../../tests/unit/compile/objects.rs"]
mod tests;
