//! slidefig renders publication-ready figures from large scientific images.
//!
//! A run takes a validated [`ExportConfiguration`] and a batch of [`ImageItem`]s:
//!
//! - Select regions (whole image or one crop per annotation)
//! - Blend a classifier or density overlay and paint object shapes
//! - Decorate with scale bar, color legend, panel/info labels and a magnified inset
//! - Write flattened rasters or hybrid SVG documents into an [`OutputSink`]
//!
//! Multi-channel images can additionally be split into a merge panel plus one panel per
//! visible channel.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod color;
pub(crate) mod compile;
pub(crate) mod decor;
pub(crate) mod export;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod source;

pub use crate::foundation::core::{Affine, BezPath, Color, Point, Rect, Region, Rgba8Premul};
pub use crate::foundation::error::{SlidefigError, SlidefigResult};

pub use crate::color::colormap::{ColorMap, ColorMapRegistry, colorize, compute_min_max};
pub use crate::color::contrast::{luminance, outline_for};
pub use crate::compile::plan::{
    DrawContext, DrawOp, FigurePlan, ImagePlacement, Layer, StrokeStyle, TextAnchor,
};
pub use crate::decor::label::panel_letter;
pub use crate::decor::scale_bar::nice_length;
pub use crate::export::batch::{CancelToken, ExportSummary, Exporter, ImageInput, ImageItem};
pub use crate::export::output::{
    DirectorySink, FigurePayload, MemorySink, OutputSink, Sidecar, SidecarChannel, SidecarOutput,
};
pub use crate::export::raster::{Composition, FigureInputs, PanelRole, RasterCompositor, Stage};
pub use crate::export::split::{ChannelPanel, SplitChannelExpander};
pub use crate::export::vector::VectorCompositor;
pub use crate::render::surface::Frame;
pub use crate::scene::config::{
    ExportConfigBuilder, ExportConfiguration, OutputKind, RasterFormat, RegionSelection,
    RenderMode, SplitChannelOptions, effective_downsample,
};
pub use crate::scene::decoration::{
    ColorLegendSpec, Corner, Decorations, InfoLabelSpec, InsetSpec, PanelLabelSpec, ScaleBarSpec,
};
pub use crate::source::channels::{
    ChannelInfo, ChannelRgbView, ChannelSelection, FixedDisplaySettings, MemoryChannelSource,
};
pub use crate::source::objects::{
    ClassFilter, ObjectKind, ObjectShape, ShapeStyle, UNCLASSIFIED, VecObjectSource,
};
pub use crate::source::raster::{RasterClassSource, RasterDensitySource, RasterImageSource};
pub use crate::source::tile::{RgbaTile, ScalarTile};
pub use crate::source::{
    ChannelSource, ClassificationSource, DensitySource, DisplaySettings, ImageSource, ObjectSource,
};
