//! Raster compositor: a fixed-order stage machine from base pixels to a decorated figure.
//!
//! Every stage may be skipped by configuration, but never reordered. Object overlays are
//! painted before any text so labels stay legible, and the inset runs last because it
//! magnifies the fully decorated result.

use chrono::{DateTime, Local};

use crate::color::colormap::{ColorMap, ColorMapRegistry, colorize, compute_min_max};
use crate::compile::objects::{ObjectPaint, object_layer};
use crate::compile::plan::{DrawContext, FigurePlan, Layer};
use crate::decor::inset;
use crate::decor::label::{InfoContext, info_label_layer, panel_label_layer};
use crate::decor::legend::legend_layer;
use crate::decor::scale_bar::scale_bar_layer;
use crate::export::split::channel_marks;
use crate::foundation::core::Region;
use crate::foundation::error::SlidefigResult;
use crate::render::composite::blend_straight_in_place;
use crate::render::cpu::CpuPainter;
use crate::render::surface::Frame;
use crate::scene::config::{ExportConfiguration, RenderMode, SplitChannelOptions};
use crate::source::channels::ChannelInfo;
use crate::source::objects::ObjectShape;
use crate::source::{ClassificationSource, DensitySource, ImageSource};

/// Compositor stages in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Read the base image region.
    ReadBase,
    /// Alpha-blend the classifier or density overlay.
    BlendOverlay,
    /// Paint annotation/detection shapes.
    PaintObjects,
    /// Border and swatch legend of a per-channel panel.
    ChannelMarks,
    /// Physical scale bar.
    ScaleBar,
    /// Density color legend.
    ColorLegend,
    /// Panel letter.
    PanelLabel,
    /// Info text.
    InfoLabel,
    /// Magnified inset of the decorated figure.
    Inset,
    /// Finished.
    Done,
}

impl Stage {
    /// Stage that follows `self`; `Done` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::ReadBase => Self::BlendOverlay,
            Self::BlendOverlay => Self::PaintObjects,
            Self::PaintObjects => Self::ChannelMarks,
            Self::ChannelMarks => Self::ScaleBar,
            Self::ScaleBar => Self::ColorLegend,
            Self::ColorLegend => Self::PanelLabel,
            Self::PanelLabel => Self::InfoLabel,
            Self::InfoLabel => Self::Inset,
            Self::Inset | Self::Done => Self::Done,
        }
    }
}

/// What kind of panel is being composed.
#[derive(Clone, Copy, Debug)]
pub enum PanelRole<'a> {
    /// A regular figure (or the merge panel of a split set): full render-mode pipeline.
    Figure,
    /// A single-channel panel: channel marks, optional scale bar, panel label.
    Channel {
        /// Displayed channel.
        info: &'a ChannelInfo,
        /// Split options.
        options: &'a SplitChannelOptions,
    },
}

/// Borrowed inputs of one render call.
pub struct FigureInputs<'a> {
    /// Name shown by `{imageName}`.
    pub image_name: &'a str,
    /// Base RGB view.
    pub base: &'a dyn ImageSource,
    /// Region and downsample.
    pub region: Region,
    /// Full-resolution pixel size in µm, if calibrated.
    pub pixel_size_um: Option<f64>,
    /// Shape snapshot, already filtered by classification.
    pub objects: &'a [ObjectShape],
    /// Classifier output for classifier mode.
    pub classification: Option<&'a dyn ClassificationSource>,
    /// Density map for density mode.
    pub density: Option<&'a dyn DensitySource>,
    /// Panel index for the panel letter.
    pub panel_index: usize,
    /// Run timestamp for `{date}`/`{time}`.
    pub timestamp: DateTime<Local>,
    /// Panel role.
    pub role: PanelRole<'a>,
}

/// Result of composing one figure.
#[derive(Clone, Debug)]
pub struct Composition {
    /// Base image with the raster overlay blended in.
    pub background: Frame,
    /// Vector layers in paint order.
    pub plan: FigurePlan,
    /// Fully painted figure; `None` when only the plan was requested.
    pub frame: Option<Frame>,
    /// Density display range used for the overlay and legend.
    pub density_range: Option<(f64, f64)>,
}

struct ComposeState<'m> {
    background: Frame,
    plan: FigurePlan,
    frame: Option<Frame>,
    density: Option<(&'m ColorMap, f64, f64)>,
}

/// Composes figures for one configuration. Holds the CPU painter between renders.
pub struct RasterCompositor<'c> {
    config: &'c ExportConfiguration,
    color_maps: &'c ColorMapRegistry,
    painter: CpuPainter,
}

impl<'c> RasterCompositor<'c> {
    /// Compositor for a validated configuration.
    pub fn new(config: &'c ExportConfiguration, color_maps: &'c ColorMapRegistry) -> Self {
        Self {
            config,
            color_maps,
            painter: CpuPainter::new(),
        }
    }

    /// Compose and flatten to straight-alpha pixels.
    pub fn render(&mut self, inputs: &FigureInputs<'_>) -> SlidefigResult<image::RgbaImage> {
        let composition = self.compose(inputs, true)?;
        match composition.frame {
            Some(frame) => frame.to_straight(),
            None => composition.background.to_straight(),
        }
    }

    /// Run every stage. With `paint` off, layers are planned but only the background is
    /// rasterized (the inset still paints, since it crops decorated pixels).
    #[tracing::instrument(skip_all, fields(image = inputs.image_name, panel = inputs.panel_index))]
    pub fn compose(&mut self, inputs: &FigureInputs<'_>, paint: bool) -> SlidefigResult<Composition> {
        let (w, h) = (inputs.region.out_width(), inputs.region.out_height());
        let mut state = ComposeState {
            background: Frame::new(w, h),
            plan: FigurePlan::new(w, h),
            frame: None,
            density: None,
        };
        let paint = paint || (self.is_figure(inputs) && self.config.decorations.inset.show);

        let mut stage = Stage::ReadBase;
        while stage != Stage::Done {
            self.run_stage(stage, inputs, &mut state, paint)?;
            stage = stage.next();
        }

        if paint && state.frame.is_none() {
            state.frame = Some(state.background.clone());
        }
        Ok(Composition {
            background: state.background,
            plan: state.plan,
            frame: state.frame,
            density_range: state.density.map(|(_, lo, hi)| (lo, hi)),
        })
    }

    fn is_figure(&self, inputs: &FigureInputs<'_>) -> bool {
        matches!(inputs.role, PanelRole::Figure)
    }

    fn run_stage(
        &mut self,
        stage: Stage,
        inputs: &FigureInputs<'_>,
        state: &mut ComposeState<'c>,
        paint: bool,
    ) -> SlidefigResult<()> {
        let config: &'c ExportConfiguration = self.config;
        let decorations = &config.decorations;
        let ctx = DrawContext::new(state.background.width, state.background.height);
        let figure = self.is_figure(inputs);

        match stage {
            Stage::ReadBase => {
                let tile = inputs.base.read_region(&inputs.region)?;
                state.background = Frame::from_straight(&tile.image);
            }
            Stage::BlendOverlay => {
                if figure {
                    self.blend_overlay(inputs, state)?;
                }
            }
            Stage::PaintObjects => {
                if figure && let Some(object_paint) = self.object_paint() {
                    let layer = object_layer(inputs.objects, &inputs.region, object_paint);
                    self.add_layer(state, layer, paint)?;
                }
            }
            Stage::ChannelMarks => {
                if let PanelRole::Channel { info, options } = inputs.role {
                    for layer in channel_marks(info, options, ctx) {
                        self.add_layer(state, layer, paint)?;
                    }
                }
            }
            Stage::ScaleBar => {
                let wanted = match inputs.role {
                    PanelRole::Figure => true,
                    PanelRole::Channel { options, .. } => options.scale_bar,
                };
                if wanted && decorations.scale_bar.show {
                    let physical = inputs
                        .pixel_size_um
                        .filter(|p| p.is_finite() && *p > 0.0)
                        .map(|p| p * inputs.region.downsample);
                    if physical.is_none() {
                        tracing::warn!(
                            image = inputs.image_name,
                            "no pixel calibration; scale bar skipped"
                        );
                    }
                    match scale_bar_layer(&decorations.scale_bar, ctx, physical) {
                        Some(layer) => self.add_layer(state, layer, paint)?,
                        None if physical.is_some() => {
                            tracing::debug!(image = inputs.image_name, "scale bar does not fit");
                        }
                        None => {}
                    }
                }
            }
            Stage::ColorLegend => {
                if figure
                    && decorations.color_legend.show
                    && let Some((map, lo, hi)) = state.density
                    && let Some(layer) = legend_layer(&decorations.color_legend, ctx, map, lo, hi)
                {
                    self.add_layer(state, layer, paint)?;
                }
            }
            Stage::PanelLabel => {
                if decorations.panel_label.show
                    && let Some(layer) =
                        panel_label_layer(&decorations.panel_label, ctx, inputs.panel_index)
                {
                    self.add_layer(state, layer, paint)?;
                }
            }
            Stage::InfoLabel => {
                if figure && decorations.info_label.show {
                    let info = self.info_context(inputs, ctx);
                    if let Some(layer) = info_label_layer(&decorations.info_label, ctx, &info) {
                        self.add_layer(state, layer, paint)?;
                    }
                }
            }
            Stage::Inset => {
                if figure && decorations.inset.show {
                    self.paint_inset(inputs, state)?;
                }
            }
            Stage::Done => {}
        }
        Ok(())
    }

    fn blend_overlay(
        &self,
        inputs: &FigureInputs<'_>,
        state: &mut ComposeState<'c>,
    ) -> SlidefigResult<()> {
        let opacity = self.config.opacity as f32;
        match &self.config.mode {
            RenderMode::ObjectOverlay { .. } => {}
            RenderMode::ClassifierOverlay { classifier } => {
                if opacity <= 0.0 {
                    return Ok(());
                }
                let Some(source) = inputs.classification else {
                    tracing::warn!(
                        image = inputs.image_name,
                        classifier = classifier.as_str(),
                        "classifier unavailable for image; overlay skipped"
                    );
                    return Ok(());
                };
                let tile = source.read_region(&inputs.region)?;
                blend_straight_in_place(&mut state.background.data, tile.image.as_raw(), opacity)?;
            }
            RenderMode::DensityMapOverlay {
                density_map,
                color_map,
                min,
                max,
            } => {
                if opacity <= 0.0 && !self.config.decorations.color_legend.show {
                    return Ok(());
                }
                let Some(source) = inputs.density else {
                    tracing::warn!(
                        image = inputs.image_name,
                        density_map = density_map.as_str(),
                        "density map unavailable for image; overlay skipped"
                    );
                    return Ok(());
                };
                let tile = source.read_region(&inputs.region)?;
                let (lo, hi) = match (min, max) {
                    (Some(lo), Some(hi)) => (*lo, *hi),
                    _ => {
                        let (data_lo, data_hi) = compute_min_max(&tile, 0);
                        (min.unwrap_or(data_lo), max.unwrap_or(data_hi))
                    }
                };
                let color_maps: &'c ColorMapRegistry = self.color_maps;
                let map = color_maps.resolve(color_map)?;
                state.density = Some((map, lo, hi));
                if opacity > 0.0 {
                    let colored = colorize(&tile, 0, map, lo, hi);
                    blend_straight_in_place(&mut state.background.data, colored.as_raw(), opacity)?;
                }
            }
        }
        Ok(())
    }

    fn object_paint(&self) -> Option<ObjectPaint> {
        match &self.config.mode {
            RenderMode::ObjectOverlay {
                fill_annotations,
                include_detections,
                ..
            } => Some(ObjectPaint {
                fill_annotations: *fill_annotations,
                include_detections: *include_detections,
                stroke_width: self.config.stroke_width,
            }),
            _ if self.config.annotation_outlines => Some(ObjectPaint {
                fill_annotations: false,
                include_detections: false,
                stroke_width: self.config.stroke_width,
            }),
            _ => None,
        }
    }

    fn info_context(&self, inputs: &FigureInputs<'_>, ctx: DrawContext) -> InfoContext {
        let classifier = match &self.config.mode {
            RenderMode::ClassifierOverlay { classifier } => Some(classifier.clone()),
            _ => None,
        };
        InfoContext {
            image_name: inputs.image_name.to_owned(),
            pixel_size_um: inputs.pixel_size_um,
            width: ctx.width,
            height: ctx.height,
            classifier,
            timestamp: inputs.timestamp,
        }
    }

    fn paint_inset(
        &mut self,
        inputs: &FigureInputs<'_>,
        state: &mut ComposeState<'c>,
    ) -> SlidefigResult<()> {
        let config: &'c ExportConfiguration = self.config;
        let spec = &config.decorations.inset;
        let (w, h) = (state.background.width, state.background.height);
        let Some(layout) = inset::layout(spec, w, h) else {
            tracing::debug!(image = inputs.image_name, "inset region too small; skipped");
            return Ok(());
        };
        let decorated = state.frame.as_ref().unwrap_or(&state.background);
        let src = layout.source;
        let crop = decorated
            .crop(src.x, src.y, src.width, src.height)?
            .to_straight()?;
        let layer = inset::inset_layer(spec, &layout, &crop);
        self.add_layer(state, layer, true)
    }

    fn add_layer(
        &mut self,
        state: &mut ComposeState<'c>,
        layer: Layer,
        paint: bool,
    ) -> SlidefigResult<()> {
        if layer.is_empty() {
            return Ok(());
        }
        if paint {
            let frame = state
                .frame
                .get_or_insert_with(|| state.background.clone());
            self.painter.paint_layer(frame, &layer)?;
        }
        state.plan.push_layer(layer);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/raster.rs"]
mod tests;
