//! Scalar-to-color lookup.
//!
//! A [`ColorMap`] turns `(value, min, max)` into a packed RGB value by linear interpolation
//! over evenly spaced stops. Maps live in a [`ColorMapRegistry`], which resolves names
//! case-sensitively first, then case-insensitively, and finally falls back to the first
//! registered map with a warning.

use crate::foundation::core::Color;
use crate::foundation::error::{SlidefigError, SlidefigResult};
use crate::source::tile::ScalarTile;

/// Immutable named color map.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMap {
    name: String,
    stops: Vec<Color>,
}

impl ColorMap {
    /// Build a map from at least two evenly spaced stops (low end first).
    pub fn from_stops(name: impl Into<String>, stops: Vec<Color>) -> SlidefigResult<Self> {
        let name = name.into();
        if stops.len() < 2 {
            return Err(SlidefigError::config(format!(
                "color map '{name}' needs at least two stops"
            )));
        }
        Ok(Self { name, stops })
    }

    fn from_hex_table(name: &str, table: &[u32]) -> Self {
        Self {
            name: name.to_owned(),
            stops: table.iter().map(|&v| Color::from_packed_rgb(v)).collect(),
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Packed `0xFFRRGGBB` color for `value` normalized against `[min, max]`.
    ///
    /// Values outside the range clamp to the ends; a degenerate range (`max <= min`)
    /// maps everything to the low end. Callers handle NaN before calling.
    pub fn color(&self, value: f64, min: f64, max: f64) -> u32 {
        let range = max - min;
        let t = if range > 0.0 && range.is_finite() {
            ((value - min) / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let t = if t.is_nan() { 0.0 } else { t };

        let segments = (self.stops.len() - 1) as f64;
        let pos = t * segments;
        let i = (pos.floor() as usize).min(self.stops.len() - 2);
        let frac = pos - i as f64;
        let a = self.stops[i];
        let b = self.stops[i + 1];

        let lerp = |x: u8, y: u8| -> u32 {
            (f64::from(x) + (f64::from(y) - f64::from(x)) * frac)
                .round()
                .clamp(0.0, 255.0) as u32
        };
        0xFF00_0000 | (lerp(a.r, b.r) << 16) | (lerp(a.g, b.g) << 8) | lerp(a.b, b.b)
    }

    /// Opaque [`Color`] for `value`.
    pub fn color_of(&self, value: f64, min: f64, max: f64) -> Color {
        Color::from_packed_rgb(self.color(value, min, max))
    }
}

const VIRIDIS: [u32; 9] = [
    0x440154, 0x472d7b, 0x3b528b, 0x2c728e, 0x21918c, 0x28ae80, 0x5ec962, 0xaddc30, 0xfde725,
];
const MAGMA: [u32; 9] = [
    0x000004, 0x1c1044, 0x4f127b, 0x812581, 0xb5367a, 0xe55064, 0xfb8761, 0xfec287, 0xfcfdbf,
];
const INFERNO: [u32; 9] = [
    0x000004, 0x1f0c48, 0x550f6d, 0x88226a, 0xba3655, 0xe35933, 0xf98e09, 0xf9cb35, 0xfcffa4,
];
const PLASMA: [u32; 9] = [
    0x0d0887, 0x4c02a1, 0x7e03a8, 0xa92395, 0xcc4778, 0xe56b5d, 0xf89540, 0xfdc328, 0xf0f921,
];
const JET: [u32; 9] = [
    0x00007f, 0x0000ff, 0x007fff, 0x00ffff, 0x7fff7f, 0xffff00, 0xff7f00, 0xff0000, 0x7f0000,
];

/// Ordered collection of color maps.
#[derive(Clone, Debug, Default)]
pub struct ColorMapRegistry {
    maps: Vec<ColorMap>,
}

impl ColorMapRegistry {
    /// Registry with no maps; [`ColorMapRegistry::resolve`] fails until one is inserted.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in maps in their fixed order.
    pub fn builtin() -> Self {
        let ramp = |name: &str, c: u32| ColorMap::from_hex_table(name, &[0x000000, c]);
        Self {
            maps: vec![
                ColorMap::from_hex_table("Viridis", &VIRIDIS),
                ColorMap::from_hex_table("Magma", &MAGMA),
                ColorMap::from_hex_table("Inferno", &INFERNO),
                ColorMap::from_hex_table("Plasma", &PLASMA),
                ColorMap::from_hex_table("Jet", &JET),
                ramp("Gray", 0xffffff),
                ramp("Red", 0xff0000),
                ramp("Green", 0x00ff00),
                ramp("Blue", 0x0000ff),
                ramp("Cyan", 0x00ffff),
                ramp("Magenta", 0xff00ff),
                ramp("Yellow", 0xffff00),
            ],
        }
    }

    /// Add a map, replacing any existing map with the exact same name.
    pub fn insert(&mut self, map: ColorMap) {
        match self.maps.iter_mut().find(|m| m.name == map.name) {
            Some(slot) => *slot = map,
            None => self.maps.push(map),
        }
    }

    /// Names in registry order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.maps.iter().map(|m| m.name.as_str())
    }

    /// Resolve `name`: exact match, then case-insensitive, then the first map (with a warning).
    pub fn resolve(&self, name: &str) -> SlidefigResult<&ColorMap> {
        if let Some(m) = self.maps.iter().find(|m| m.name == name) {
            return Ok(m);
        }
        if let Some(m) = self
            .maps
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
        {
            return Ok(m);
        }
        let fallback = self
            .maps
            .first()
            .ok_or_else(|| SlidefigError::config("no color maps are available"))?;
        tracing::warn!(
            requested = name,
            fallback = fallback.name(),
            "color map not found; using fallback"
        );
        Ok(fallback)
    }
}

/// Map every sample of `band` through `map`, producing straight-alpha RGBA.
///
/// NaN samples become fully transparent `(0, 0, 0, 0)`; everything else is opaque.
pub fn colorize(
    tile: &ScalarTile,
    band: usize,
    map: &ColorMap,
    min: f64,
    max: f64,
) -> image::RgbaImage {
    let mut out = image::RgbaImage::new(tile.width(), tile.height());
    for (px, v) in out.pixels_mut().zip(tile.band(band)) {
        *px = if v.is_nan() {
            image::Rgba([0, 0, 0, 0])
        } else {
            let c = Color::from_packed_rgb(map.color(f64::from(v), min, max) & 0x00FF_FFFF);
            image::Rgba([c.r, c.g, c.b, 255])
        };
    }
    out
}

/// Minimum and maximum over the finite samples of `band`.
///
/// Returns `(0, 1)` when no sample is finite.
pub fn compute_min_max(tile: &ScalarTile, band: usize) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in tile.band(band).filter(|v| v.is_finite()) {
        let v = f64::from(v);
        min = min.min(v);
        max = max.max(v);
    }
    if min > max { (0.0, 1.0) } else { (min, max) }
}

#[cfg(test)]
#[path = "../../tests/unit/color/colormap.rs"]
mod tests;
