use crate::foundation::error::{SlidefigError, SlidefigResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Rectangular area of a source image plus the downsample it is read at.
///
/// Coordinates are in full-resolution source pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Region {
    /// Left edge in source pixels.
    pub x: u32,
    /// Top edge in source pixels.
    pub y: u32,
    /// Width in source pixels, always > 0.
    pub width: u32,
    /// Height in source pixels, always > 0.
    pub height: u32,
    /// Source pixels per output pixel, always >= 1.
    pub downsample: f64,
}

impl Region {
    /// Create a validated region.
    pub fn new(x: u32, y: u32, width: u32, height: u32, downsample: f64) -> SlidefigResult<Self> {
        if width == 0 || height == 0 {
            return Err(SlidefigError::source(format!(
                "region must have non-zero area (got {width}x{height})"
            )));
        }
        if !downsample.is_finite() || downsample < 1.0 {
            return Err(SlidefigError::source(format!(
                "region downsample must be finite and >= 1 (got {downsample})"
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
            downsample,
        })
    }

    /// Region covering a whole `width` x `height` source.
    pub fn full(width: u32, height: u32, downsample: f64) -> SlidefigResult<Self> {
        Self::new(0, 0, width, height, downsample)
    }

    /// Output width in pixels after downsampling.
    pub fn out_width(&self) -> u32 {
        scaled_len(self.width, self.downsample)
    }

    /// Output height in pixels after downsampling.
    pub fn out_height(&self) -> u32 {
        scaled_len(self.height, self.downsample)
    }

    /// Bounds of the region in source pixel space.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x) + f64::from(self.width),
            f64::from(self.y) + f64::from(self.height),
        )
    }

    /// Affine mapping source coordinates into this region's output pixels.
    ///
    /// Scales by `1/downsample` after moving the region origin to zero, so the
    /// translation is expressed in source units and lands in post-scale pixels.
    pub fn source_to_output(&self) -> Affine {
        Affine::scale(1.0 / self.downsample)
            * Affine::translate(Vec2::new(-f64::from(self.x), -f64::from(self.y)))
    }
}

fn scaled_len(len: u32, downsample: f64) -> u32 {
    ((f64::from(len) / downsample).round() as u32).max(1)
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Opaque yellow.
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    /// Create a color from explicit RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opaque color from the low 24 bits of a packed `0xRRGGBB` value.
    pub const fn from_packed_rgb(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xFF) as u8,
            ((rgb >> 8) & 0xFF) as u8,
            (rgb & 0xFF) as u8,
        )
    }

    /// Pack as `0xRRGGBB`, dropping alpha.
    pub const fn packed_rgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Premultiplied RGBA8 bytes.
    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional, case-insensitive).
    pub fn from_hex(s: &str) -> SlidefigResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> SlidefigResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| SlidefigError::config(format!("invalid hex byte \"{pair}\"")))
        }

        if !s.is_ascii() {
            return Err(SlidefigError::config("hex color must be ASCII"));
        }
        match s.len() {
            6 => Ok(Self::rgb(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self::new(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
                hex_byte(&s[6..8])?,
            )),
            _ => Err(SlidefigError::config(
                "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
            )),
        }
    }

    /// `#rrggbb` form used in SVG attributes.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.a == 255 {
            serializer.serialize_str(&self.to_hex_rgb())
        } else {
            serializer.serialize_str(&format!("{}{:02x}", self.to_hex_rgb(), self.a))
        }
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Raw byte layout `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
