//! Region selection: whole images or padded per-annotation crops.

use crate::foundation::core::{Rect, Region};
use crate::foundation::error::SlidefigResult;
use crate::source::objects::{ObjectKind, ObjectShape};

/// Padded annotation bounds clamped to a `width` x `height` image.
///
/// Returns `None` when the clamped box has no area.
pub fn padded_region(
    bounds: Rect,
    padding: u32,
    width: u32,
    height: u32,
    downsample: f64,
) -> SlidefigResult<Option<Region>> {
    if !(bounds.x0.is_finite()
        && bounds.y0.is_finite()
        && bounds.x1.is_finite()
        && bounds.y1.is_finite())
    {
        return Ok(None);
    }
    let pad = f64::from(padding);
    let clamp = |v: f64, hi: u32| v.clamp(0.0, f64::from(hi)) as u32;
    let x0 = clamp(bounds.x0.floor() - pad, width);
    let y0 = clamp(bounds.y0.floor() - pad, height);
    let x1 = clamp(bounds.x1.ceil() + pad, width);
    let y1 = clamp(bounds.y1.ceil() + pad, height);
    if x1 <= x0 || y1 <= y0 {
        return Ok(None);
    }
    Region::new(x0, y0, x1 - x0, y1 - y0, downsample).map(Some)
}

/// One annotation crop and the classification it is named after.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationRegion {
    /// Classification name of the annotation.
    pub class_name: String,
    /// Source object id.
    pub object_id: String,
    /// Clamped, padded crop.
    pub region: Region,
}

/// Regions for every annotation in `shapes` (detections are ignored).
///
/// Annotations whose clamped box collapses are skipped with a debug log.
pub fn annotation_regions(
    shapes: &[ObjectShape],
    padding: u32,
    width: u32,
    height: u32,
    downsample: f64,
) -> SlidefigResult<Vec<AnnotationRegion>> {
    let mut out = Vec::new();
    for shape in shapes.iter().filter(|s| s.kind == ObjectKind::Annotation) {
        match padded_region(shape.bounds(), padding, width, height, downsample)? {
            Some(region) => out.push(AnnotationRegion {
                class_name: shape.class_name().to_owned(),
                object_id: shape.id.clone(),
                region,
            }),
            None => tracing::debug!(
                object = %shape.id,
                class = shape.class_name(),
                "annotation bounds collapse to zero area; skipped"
            ),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/export/region.rs"]
mod tests;
