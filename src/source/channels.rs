//! Multi-channel sources and the display transform that turns them into RGB views.

use crate::color::colormap::compute_min_max;
use crate::foundation::core::{Color, Region};
use crate::foundation::error::{SlidefigError, SlidefigResult};
use crate::source::raster::{check_bounds, sample_coord};
use crate::source::tile::{RgbaTile, ScalarTile};
use crate::source::{ChannelSource, DisplaySettings, ImageSource};

/// Name, pseudocolor and visibility of one channel.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChannelInfo {
    /// Channel name (e.g. "DAPI").
    pub name: String,
    /// Pseudocolor used in merged views.
    pub color: Color,
    /// Whether the channel takes part in merged views and split panels.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl ChannelInfo {
    /// Visible channel.
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            visible: true,
        }
    }
}

/// Fixed per-channel display ranges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FixedDisplaySettings {
    ranges: Vec<Option<(f64, f64)>>,
}

impl FixedDisplaySettings {
    /// Ranges indexed by channel; `None` falls back to the data range.
    pub fn new(ranges: Vec<Option<(f64, f64)>>) -> Self {
        Self { ranges }
    }
}

impl DisplaySettings for FixedDisplaySettings {
    fn channel_range(&self, channel: usize) -> Option<(f64, f64)> {
        self.ranges.get(channel).copied().flatten()
    }
}

/// Channel planes held in memory.
#[derive(Clone, Debug)]
pub struct MemoryChannelSource {
    name: String,
    width: u32,
    height: u32,
    channels: Vec<ChannelInfo>,
    planes: Vec<Vec<f32>>,
}

impl MemoryChannelSource {
    /// One row-major plane per channel.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        channels: Vec<ChannelInfo>,
        planes: Vec<Vec<f32>>,
    ) -> SlidefigResult<Self> {
        let n = (width as usize) * (height as usize);
        if channels.len() != planes.len() {
            return Err(SlidefigError::source(
                "channel count does not match plane count",
            ));
        }
        if planes.iter().any(|p| p.len() != n) {
            return Err(SlidefigError::source("channel plane size mismatch"));
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            channels,
            planes,
        })
    }
}

impl ChannelSource for MemoryChannelSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    fn read_channel(&self, region: &Region, channel: usize) -> SlidefigResult<ScalarTile> {
        let plane = self
            .planes
            .get(channel)
            .ok_or_else(|| SlidefigError::source(format!("no channel {channel}")))?;
        check_bounds(region, self.width, self.height)?;
        let (ow, oh) = (region.out_width(), region.out_height());
        let mut samples = Vec::with_capacity((ow as usize) * (oh as usize));
        for y in 0..oh {
            let sy = sample_coord(region.y, y, region.downsample, region.height);
            for x in 0..ow {
                let sx = sample_coord(region.x, x, region.downsample, region.width);
                samples.push(plane[(sy as usize) * (self.width as usize) + sx as usize]);
            }
        }
        ScalarTile::single_band(*region, ow, oh, samples)
    }
}

/// Which channels a [`ChannelRgbView`] renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelSelection {
    /// Additive blend of every visible channel in its pseudocolor.
    Merge,
    /// One channel, either in grayscale or its pseudocolor.
    Single {
        /// Channel index.
        channel: usize,
        /// Render as gray instead of pseudocolor.
        grayscale: bool,
    },
}

/// Display transform: presents a [`ChannelSource`] as an RGB [`ImageSource`].
pub struct ChannelRgbView<'a> {
    source: &'a dyn ChannelSource,
    display: Option<&'a dyn DisplaySettings>,
    selection: ChannelSelection,
}

impl<'a> ChannelRgbView<'a> {
    /// Build a view. Without display settings each tile is stretched to its own data range.
    /// Missing display settings are reported by the caller, once per image.
    pub fn new(
        source: &'a dyn ChannelSource,
        display: Option<&'a dyn DisplaySettings>,
        selection: ChannelSelection,
    ) -> Self {
        Self {
            source,
            display,
            selection,
        }
    }

    fn range_for(&self, channel: usize, tile: &ScalarTile) -> (f64, f64) {
        self.display
            .and_then(|d| d.channel_range(channel))
            .filter(|(lo, hi)| lo.is_finite() && hi.is_finite())
            .unwrap_or_else(|| compute_min_max(tile, 0))
    }

    fn accumulate(
        &self,
        acc: &mut [f64],
        region: &Region,
        channel: usize,
        color: Color,
    ) -> SlidefigResult<()> {
        let tile = self.source.read_channel(region, channel)?;
        let (lo, hi) = self.range_for(channel, &tile);
        let span = hi - lo;
        for (px, v) in acc.chunks_exact_mut(3).zip(tile.band(0)) {
            let t = if span > 0.0 && v.is_finite() {
                ((f64::from(v) - lo) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            px[0] += t * f64::from(color.r);
            px[1] += t * f64::from(color.g);
            px[2] += t * f64::from(color.b);
        }
        Ok(())
    }
}

impl ImageSource for ChannelRgbView<'_> {
    fn name(&self) -> &str {
        self.source.name()
    }

    fn width(&self) -> u32 {
        self.source.width()
    }

    fn height(&self) -> u32 {
        self.source.height()
    }

    fn read_region(&self, region: &Region) -> SlidefigResult<RgbaTile> {
        let (ow, oh) = (region.out_width(), region.out_height());
        let mut acc = vec![0.0f64; (ow as usize) * (oh as usize) * 3];
        match self.selection {
            ChannelSelection::Merge => {
                for (i, info) in self.source.channels().iter().enumerate() {
                    if info.visible {
                        self.accumulate(&mut acc, region, i, info.color)?;
                    }
                }
            }
            ChannelSelection::Single { channel, grayscale } => {
                let info = self
                    .source
                    .channels()
                    .get(channel)
                    .ok_or_else(|| SlidefigError::source(format!("no channel {channel}")))?;
                let color = if grayscale { Color::WHITE } else { info.color };
                self.accumulate(&mut acc, region, channel, color)?;
            }
        }

        let mut image = image::RgbaImage::new(ow, oh);
        for (px, rgb) in image.pixels_mut().zip(acc.chunks_exact(3)) {
            let c = |v: f64| v.round().clamp(0.0, 255.0) as u8;
            *px = image::Rgba([c(rgb[0]), c(rgb[1]), c(rgb[2]), 255]);
        }
        RgbaTile::new(*region, image)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/channels.rs"]
mod tests;
