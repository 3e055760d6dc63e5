use crate::foundation::core::Region;
use crate::foundation::error::{SlidefigError, SlidefigResult};

/// Straight-alpha RGBA8 pixels read for a [`Region`].
///
/// Base layers are opaque; classification tiles use alpha 0 for unclassified pixels.
#[derive(Clone, Debug)]
pub struct RgbaTile {
    /// Region the pixels were read for.
    pub region: Region,
    /// Pixel buffer, `region.out_width() x region.out_height()`.
    pub image: image::RgbaImage,
}

impl RgbaTile {
    /// Wrap a buffer, checking that its size matches the region's output size.
    pub fn new(region: Region, image: image::RgbaImage) -> SlidefigResult<Self> {
        if image.width() != region.out_width() || image.height() != region.out_height() {
            return Err(SlidefigError::source(format!(
                "tile is {}x{} but region expects {}x{}",
                image.width(),
                image.height(),
                region.out_width(),
                region.out_height()
            )));
        }
        Ok(Self { region, image })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Band-interleaved `f32` samples read for a [`Region`].
///
/// NaN marks undefined cells.
#[derive(Clone, Debug)]
pub struct ScalarTile {
    /// Region the samples were read for.
    pub region: Region,
    width: u32,
    height: u32,
    bands: usize,
    samples: Vec<f32>,
}

impl ScalarTile {
    /// Build a tile from interleaved samples (`width * height * bands` values).
    pub fn new(
        region: Region,
        width: u32,
        height: u32,
        bands: usize,
        samples: Vec<f32>,
    ) -> SlidefigResult<Self> {
        if bands == 0 {
            return Err(SlidefigError::source("scalar tile needs at least one band"));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(bands);
        if samples.len() != expected {
            return Err(SlidefigError::source(format!(
                "scalar tile sample count mismatch: got {}, expected {expected}",
                samples.len()
            )));
        }
        Ok(Self {
            region,
            width,
            height,
            bands,
            samples,
        })
    }

    /// Single-band tile.
    pub fn single_band(
        region: Region,
        width: u32,
        height: u32,
        samples: Vec<f32>,
    ) -> SlidefigResult<Self> {
        Self::new(region, width, height, 1, samples)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of interleaved bands.
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// All samples, band-interleaved, row-major.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Iterate one band in row-major order. Out-of-range bands yield nothing.
    pub fn band(&self, band: usize) -> impl Iterator<Item = f32> + '_ {
        let step = self.bands;
        let take = if band < step { self.samples.len() } else { 0 };
        self.samples[..take]
            .iter()
            .skip(band)
            .step_by(step)
            .copied()
    }

    /// Sample at `(x, y)` in `band`, if in range.
    pub fn get(&self, x: u32, y: u32, band: usize) -> Option<f32> {
        if x >= self.width || y >= self.height || band >= self.bands {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * self.bands + band;
        self.samples.get(idx).copied()
    }
}
