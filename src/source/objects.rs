//! Object shapes (annotations and detections) as read-only snapshots.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context as _;
use kurbo::Shape as _;
use serde::Deserialize;

use crate::foundation::core::{BezPath, Color, Point, Rect};
use crate::foundation::error::{SlidefigError, SlidefigResult};
use crate::source::ObjectSource;

/// Name used for shapes without a classification.
pub const UNCLASSIFIED: &str = "Unclassified";

/// Default stroke for shapes whose source carries no class color.
pub const DEFAULT_STROKE: Color = Color::rgb(255, 0, 0);

/// Whether a shape is a user annotation or a machine detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Hand-drawn or imported region of interest; eligible for fill.
    Annotation,
    /// Detected cell/object; always outline-only.
    Detection,
}

/// Stroke and fill colors carried by a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeStyle {
    /// Outline color.
    pub stroke: Color,
    /// Fill color, used only when filling is enabled for annotations.
    pub fill: Color,
}

impl ShapeStyle {
    /// Stroke in `color`, fill with the same color at 25% alpha.
    pub fn from_class_color(color: Color) -> Self {
        Self {
            stroke: color,
            fill: color.with_alpha(64),
        }
    }
}

/// One object as delivered by an [`ObjectSource`].
#[derive(Clone, Debug)]
pub struct ObjectShape {
    /// Source identifier, unique within one image.
    pub id: String,
    /// Annotation or detection.
    pub kind: ObjectKind,
    /// Classification name, `None` when unclassified.
    pub classification: Option<String>,
    /// Geometry in full-resolution source pixels.
    pub geometry: BezPath,
    /// Colors.
    pub style: ShapeStyle,
}

impl ObjectShape {
    /// Classification name, or [`UNCLASSIFIED`].
    pub fn class_name(&self) -> &str {
        self.classification.as_deref().unwrap_or(UNCLASSIFIED)
    }

    /// Axis-aligned bounds in source pixels.
    pub fn bounds(&self) -> Rect {
        self.geometry.bounding_box()
    }
}

/// Classification-name filter; empty means "everything".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassFilter {
    names: BTreeSet<String>,
}

impl ClassFilter {
    /// Accept every classification.
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept only the given names (use [`UNCLASSIFIED`] for shapes without a class).
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `class_name` passes.
    pub fn accepts(&self, class_name: &str) -> bool {
        self.names.is_empty() || self.names.contains(class_name)
    }
}

/// Object source over an owned list of shapes.
#[derive(Clone, Debug, Default)]
pub struct VecObjectSource {
    shapes: Vec<ObjectShape>,
}

impl VecObjectSource {
    /// Wrap shapes in source order.
    pub fn new(shapes: Vec<ObjectShape>) -> Self {
        Self { shapes }
    }

    /// Load a GeoJSON `FeatureCollection` (or bare feature array).
    pub fn from_geojson_path(path: &Path) -> SlidefigResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read objects '{}'", path.display()))?;
        Self::from_geojson_str(&text)
    }

    /// Parse GeoJSON text. Features without usable geometry are skipped.
    pub fn from_geojson_str(text: &str) -> SlidefigResult<Self> {
        let doc: GeoJsonDoc = serde_json::from_str(text)
            .map_err(|e| SlidefigError::serde(format!("invalid object GeoJSON: {e}")))?;
        let features = match doc {
            GeoJsonDoc::Collection { features } => features,
            GeoJsonDoc::Features(features) => features,
        };

        let mut shapes = Vec::with_capacity(features.len());
        for (i, feature) in features.into_iter().enumerate() {
            let Some(geometry) = feature.geometry.as_ref().and_then(geometry_to_path) else {
                tracing::debug!(index = i, "skipping feature without drawable geometry");
                continue;
            };
            let props = feature.properties.unwrap_or_default();
            let kind = match props.object_type.as_deref() {
                Some(t) if t.eq_ignore_ascii_case("detection") || t.eq_ignore_ascii_case("cell") => {
                    ObjectKind::Detection
                }
                _ => ObjectKind::Annotation,
            };
            let (classification, color) = match props.classification {
                Some(c) => (Some(c.name), c.color.map(ClassColor::to_color)),
                None => (None, None),
            };
            let id = match feature.id {
                Some(serde_json::Value::String(s)) => s,
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => format!("object{}", i + 1),
            };
            shapes.push(ObjectShape {
                id,
                kind,
                classification,
                geometry,
                style: ShapeStyle::from_class_color(color.unwrap_or(DEFAULT_STROKE)),
            });
        }
        Ok(Self::new(shapes))
    }
}

impl ObjectSource for VecObjectSource {
    fn shapes(&self, filter: &ClassFilter) -> SlidefigResult<Vec<ObjectShape>> {
        Ok(self
            .shapes
            .iter()
            .filter(|s| filter.accepts(s.class_name()))
            .cloned()
            .collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GeoJsonDoc {
    Collection { features: Vec<Feature> },
    Features(Vec<Feature>),
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Properties>,
}

#[derive(Deserialize, Default)]
struct Properties {
    #[serde(rename = "objectType", default)]
    object_type: Option<String>,
    #[serde(default)]
    classification: Option<Classification>,
}

#[derive(Deserialize)]
struct Classification {
    name: String,
    #[serde(default)]
    color: Option<ClassColor>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassColor {
    Rgb([u8; 3]),
    Hex(Color),
}

impl ClassColor {
    fn to_color(self) -> Color {
        match self {
            Self::Rgb([r, g, b]) => Color::rgb(r, g, b),
            Self::Hex(c) => c,
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: Vec<f64> },
    LineString { coordinates: Vec<Vec<f64>> },
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

const POINT_RADIUS: f64 = 4.0;

fn to_point(c: &[f64]) -> Option<Point> {
    match c {
        [x, y, ..] if x.is_finite() && y.is_finite() => Some(Point::new(*x, *y)),
        _ => None,
    }
}

fn push_ring(path: &mut BezPath, ring: &[Vec<f64>], close: bool) {
    let mut pts = ring.iter().filter_map(|c| to_point(c));
    let Some(first) = pts.next() else {
        return;
    };
    path.move_to(first);
    for p in pts {
        path.line_to(p);
    }
    if close {
        path.close_path();
    }
}

fn geometry_to_path(geometry: &Geometry) -> Option<BezPath> {
    let mut path = BezPath::new();
    match geometry {
        Geometry::Point { coordinates } => {
            let c = to_point(coordinates)?;
            return Some(kurbo::Circle::new(c, POINT_RADIUS).to_path(0.1));
        }
        Geometry::LineString { coordinates } => push_ring(&mut path, coordinates, false),
        Geometry::Polygon { coordinates } => {
            for ring in coordinates {
                push_ring(&mut path, ring, true);
            }
        }
        Geometry::MultiPolygon { coordinates } => {
            for polygon in coordinates {
                for ring in polygon {
                    push_ring(&mut path, ring, true);
                }
            }
        }
        Geometry::Unsupported => return None,
    }
    if path.elements().is_empty() {
        None
    } else {
        Some(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/objects.rs"]
mod tests;
