//! In-memory, raster-backed collaborators (optionally loaded from image files).

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Region;
use crate::foundation::error::{SlidefigError, SlidefigResult};
use crate::source::tile::{RgbaTile, ScalarTile};
use crate::source::{ClassificationSource, DensitySource, ImageSource};

pub(crate) fn check_bounds(region: &Region, width: u32, height: u32) -> SlidefigResult<()> {
    let right = u64::from(region.x) + u64::from(region.width);
    let bottom = u64::from(region.y) + u64::from(region.height);
    if right > u64::from(width) || bottom > u64::from(height) {
        return Err(SlidefigError::source(format!(
            "region {}x{}+{}+{} exceeds image bounds {width}x{height}",
            region.width, region.height, region.x, region.y
        )));
    }
    Ok(())
}

/// Source-space coordinate of output pixel `i`'s center.
pub(crate) fn sample_coord(origin: u32, i: u32, downsample: f64, len: u32) -> u32 {
    let v = f64::from(origin) + (f64::from(i) + 0.5) * downsample;
    (v.floor() as u32).min(origin + len - 1)
}

fn read_rgba(
    image: &image::RgbaImage,
    region: &Region,
    filter: image::imageops::FilterType,
) -> SlidefigResult<RgbaTile> {
    check_bounds(region, image.width(), image.height())?;
    let crop =
        image::imageops::crop_imm(image, region.x, region.y, region.width, region.height)
            .to_image();
    let (ow, oh) = (region.out_width(), region.out_height());
    let pixels = if crop.width() == ow && crop.height() == oh {
        crop
    } else {
        image::imageops::resize(&crop, ow, oh, filter)
    };
    RgbaTile::new(*region, pixels)
}

fn read_nearest_rgba(image: &image::RgbaImage, region: &Region) -> SlidefigResult<RgbaTile> {
    check_bounds(region, image.width(), image.height())?;
    let (ow, oh) = (region.out_width(), region.out_height());
    let mut out = image::RgbaImage::new(ow, oh);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let sx = sample_coord(region.x, x, region.downsample, region.width);
        let sy = sample_coord(region.y, y, region.downsample, region.height);
        *px = *image.get_pixel(sx, sy);
    }
    RgbaTile::new(*region, out)
}

fn load_rgba(path: &Path) -> SlidefigResult<image::RgbaImage> {
    let img = image::open(path).with_context(|| format!("open image '{}'", path.display()))?;
    Ok(img.to_rgba8())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image")
        .to_owned()
}

/// RGB image held in memory.
#[derive(Clone, Debug)]
pub struct RasterImageSource {
    name: String,
    image: image::RgbaImage,
}

impl RasterImageSource {
    /// Wrap a decoded image. Alpha is ignored on reads (base layers are opaque).
    pub fn new(name: impl Into<String>, image: image::RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    /// Decode any format supported by the `image` crate; the name is the file stem.
    pub fn open(path: &Path) -> SlidefigResult<Self> {
        Ok(Self::new(file_stem(path), load_rgba(path)?))
    }
}

impl ImageSource for RasterImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn read_region(&self, region: &Region) -> SlidefigResult<RgbaTile> {
        let mut tile = read_rgba(&self.image, region, image::imageops::FilterType::Triangle)?;
        for px in tile.image.pixels_mut() {
            px.0[3] = 255;
        }
        Ok(tile)
    }
}

/// Classification map held in memory; read with nearest-neighbour sampling so class colors
/// never blend.
#[derive(Clone, Debug)]
pub struct RasterClassSource {
    name: String,
    image: image::RgbaImage,
}

impl RasterClassSource {
    /// Wrap a full-resolution class-color map.
    pub fn new(name: impl Into<String>, image: image::RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    /// Load a class-color map from disk.
    pub fn open(name: impl Into<String>, path: &Path) -> SlidefigResult<Self> {
        Ok(Self::new(name, load_rgba(path)?))
    }
}

impl ClassificationSource for RasterClassSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_region(&self, region: &Region) -> SlidefigResult<RgbaTile> {
        read_nearest_rgba(&self.image, region)
    }
}

/// Single-band density raster held in memory.
#[derive(Clone, Debug)]
pub struct RasterDensitySource {
    name: String,
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl RasterDensitySource {
    /// Wrap row-major values of a `width x height` grid.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        values: Vec<f32>,
    ) -> SlidefigResult<Self> {
        if values.len() != (width as usize) * (height as usize) {
            return Err(SlidefigError::source("density grid size mismatch"));
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            values,
        })
    }

    /// Load a grayscale raster; fully transparent pixels become NaN and the remaining
    /// luminance (0..1) is multiplied by `scale`.
    pub fn open(name: impl Into<String>, path: &Path, scale: f32) -> SlidefigResult<Self> {
        let img = image::open(path)
            .with_context(|| format!("open density map '{}'", path.display()))?;
        let luma = img.to_luma_alpha32f();
        let (width, height) = luma.dimensions();
        let values = luma
            .pixels()
            .map(|p| {
                if p.0[1] <= 0.0 {
                    f32::NAN
                } else {
                    p.0[0] * scale
                }
            })
            .collect();
        Self::new(name, width, height, values)
    }
}

impl DensitySource for RasterDensitySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_region(&self, region: &Region) -> SlidefigResult<ScalarTile> {
        check_bounds(region, self.width, self.height)?;
        let (ow, oh) = (region.out_width(), region.out_height());
        let mut samples = Vec::with_capacity((ow as usize) * (oh as usize));
        for y in 0..oh {
            let sy = sample_coord(region.y, y, region.downsample, region.height);
            for x in 0..ow {
                let sx = sample_coord(region.x, x, region.downsample, region.width);
                samples.push(self.values[(sy as usize) * (self.width as usize) + sx as usize]);
            }
        }
        ScalarTile::single_band(*region, ow, oh, samples)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/raster.rs"]
mod tests;
