//! Boundary contracts for the external collaborators a render consumes.
//!
//! Compositors never own a source; they borrow one per render call, read the tiles they
//! need, and drop them before returning.

pub(crate) mod channels;
pub(crate) mod objects;
pub(crate) mod raster;
pub(crate) mod tile;

use crate::foundation::core::Region;
use crate::foundation::error::SlidefigResult;
use crate::source::objects::{ClassFilter, ObjectShape};
use crate::source::tile::{RgbaTile, ScalarTile};

/// Pyramidal (or flat) RGB image that can be read at any region and downsample.
pub trait ImageSource {
    /// Human-readable image name, used for output filenames and info labels.
    fn name(&self) -> &str;

    /// Full-resolution width in pixels.
    fn width(&self) -> u32;

    /// Full-resolution height in pixels.
    fn height(&self) -> u32;

    /// Read an opaque RGB view of `region`.
    fn read_region(&self, region: &Region) -> SlidefigResult<RgbaTile>;
}

/// Pixel classifier output rendered as class colors (alpha 0 = unclassified).
pub trait ClassificationSource {
    /// Classifier name.
    fn name(&self) -> &str;

    /// Read classified pixels for `region`.
    fn read_region(&self, region: &Region) -> SlidefigResult<RgbaTile>;
}

/// Single-band scalar density map; NaN marks undefined cells.
pub trait DensitySource {
    /// Density map name.
    fn name(&self) -> &str;

    /// Read density values for `region`.
    fn read_region(&self, region: &Region) -> SlidefigResult<ScalarTile>;
}

/// Snapshot provider for annotation and detection shapes.
pub trait ObjectSource {
    /// Shapes whose classification passes `filter`, in source order.
    fn shapes(&self, filter: &ClassFilter) -> SlidefigResult<Vec<ObjectShape>>;
}

/// Per-channel access to a multi-channel (e.g. fluorescence) image.
pub trait ChannelSource {
    /// Human-readable image name.
    fn name(&self) -> &str;

    /// Full-resolution width in pixels.
    fn width(&self) -> u32;

    /// Full-resolution height in pixels.
    fn height(&self) -> u32;

    /// Channel descriptions in channel order.
    fn channels(&self) -> &[channels::ChannelInfo];

    /// Read one channel of `region` as a single-band tile.
    fn read_channel(&self, region: &Region, channel: usize) -> SlidefigResult<ScalarTile>;
}

/// Channel contrast settings used to build display views.
pub trait DisplaySettings {
    /// Display range `(min, max)` for `channel`, if known.
    fn channel_range(&self, channel: usize) -> Option<(f64, f64)>;
}
