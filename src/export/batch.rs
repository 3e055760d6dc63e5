//! Batch export: expands images into regions and panels, renders each, and keeps score.
//!
//! One figure is composed and written before the next starts. Failures are contained to
//! the figure that raised them; the run itself never fails.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};

use crate::color::colormap::ColorMapRegistry;
use crate::export::output::{FigurePayload, OutputSink, Sidecar, SidecarChannel, SidecarOutput};
use crate::export::raster::{FigureInputs, PanelRole, RasterCompositor};
use crate::export::region::annotation_regions;
use crate::export::split::SplitChannelExpander;
use crate::export::vector::VectorCompositor;
use crate::foundation::core::Region;
use crate::foundation::error::{SlidefigError, SlidefigResult};
use crate::scene::config::{ExportConfiguration, OutputKind, RasterFormat, RegionSelection, RenderMode};
use crate::source::channels::{ChannelRgbView, ChannelSelection};
use crate::source::objects::{ClassFilter, ObjectShape};
use crate::source::{
    ChannelSource, ClassificationSource, DensitySource, DisplaySettings, ImageSource, ObjectSource,
};

/// Pixels behind an image: plain RGB, or channels shown through a display transform.
#[derive(Clone, Copy)]
pub enum ImageInput<'a> {
    /// RGB image.
    Rgb(&'a dyn ImageSource),
    /// Multi-channel image.
    Channels {
        /// Channel data.
        source: &'a dyn ChannelSource,
        /// Contrast settings; raw ranges are used when absent.
        display: Option<&'a dyn DisplaySettings>,
    },
}

/// One image and its optional collaborators.
#[derive(Clone, Copy)]
pub struct ImageItem<'a> {
    /// Base pixels.
    pub input: ImageInput<'a>,
    /// Full-resolution pixel size in µm.
    pub pixel_size_um: Option<f64>,
    /// Annotations and detections.
    pub objects: Option<&'a dyn ObjectSource>,
    /// Classifier output.
    pub classification: Option<&'a dyn ClassificationSource>,
    /// Density map.
    pub density: Option<&'a dyn DensitySource>,
}

impl<'a> ImageItem<'a> {
    /// RGB image without collaborators.
    pub fn rgb(source: &'a dyn ImageSource) -> Self {
        Self::from_input(ImageInput::Rgb(source))
    }

    /// Multi-channel image without collaborators.
    pub fn channels(source: &'a dyn ChannelSource, display: Option<&'a dyn DisplaySettings>) -> Self {
        Self::from_input(ImageInput::Channels { source, display })
    }

    fn from_input(input: ImageInput<'a>) -> Self {
        Self {
            input,
            pixel_size_um: None,
            objects: None,
            classification: None,
            density: None,
        }
    }

    /// Pixel calibration.
    pub fn with_pixel_size(mut self, pixel_size_um: Option<f64>) -> Self {
        self.pixel_size_um = pixel_size_um;
        self
    }

    /// Object source.
    pub fn with_objects(mut self, objects: &'a dyn ObjectSource) -> Self {
        self.objects = Some(objects);
        self
    }

    /// Classifier source.
    pub fn with_classification(mut self, classification: &'a dyn ClassificationSource) -> Self {
        self.classification = Some(classification);
        self
    }

    /// Density source.
    pub fn with_density(mut self, density: &'a dyn DensitySource) -> Self {
        self.density = Some(density);
        self
    }

    /// Image name.
    pub fn name(&self) -> &'a str {
        match self.input {
            ImageInput::Rgb(s) => s.name(),
            ImageInput::Channels { source, .. } => source.name(),
        }
    }

    /// Full-resolution size.
    pub fn dimensions(&self) -> (u32, u32) {
        match self.input {
            ImageInput::Rgb(s) => (s.width(), s.height()),
            ImageInput::Channels { source, .. } => (source.width(), source.height()),
        }
    }
}

/// Outcome counts of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExportSummary {
    /// Figures written.
    pub succeeded: usize,
    /// Figures or images skipped for a recoverable reason.
    pub skipped: usize,
    /// Figures that failed to render or write.
    pub failed: usize,
    /// Whether the run stopped early on request.
    pub cancelled: bool,
}

/// Cooperative cancellation flag, checked between figures.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

enum Renderer<'c> {
    Raster(RasterCompositor<'c>, RasterFormat),
    Vector(VectorCompositor<'c>),
}

impl Renderer<'_> {
    fn render(&mut self, inputs: &FigureInputs<'_>) -> SlidefigResult<FigurePayload> {
        match self {
            Self::Raster(compositor, format) => Ok(FigurePayload::Raster {
                image: compositor.render(inputs)?,
                format: *format,
            }),
            Self::Vector(compositor) => compositor.render(inputs).map(FigurePayload::Vector),
        }
    }
}

struct RunState {
    summary: ExportSummary,
    class_index: HashMap<String, usize>,
    panel_index: usize,
    timestamp: DateTime<Local>,
}

impl RunState {
    fn record_failure(&mut self, item: &str, err: &SlidefigError) {
        match err {
            SlidefigError::Source(_) => {
                tracing::warn!(item, error = %err, "skipped");
                self.summary.skipped += 1;
            }
            _ => {
                tracing::warn!(item, error = %err, "failed");
                self.summary.failed += 1;
            }
        }
    }
}

/// Runs a validated configuration over a batch of images.
#[derive(Clone, Debug)]
pub struct Exporter {
    config: ExportConfiguration,
    color_maps: ColorMapRegistry,
}

impl Exporter {
    /// Validate `config` and use the built-in color maps.
    pub fn new(config: ExportConfiguration) -> SlidefigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            color_maps: ColorMapRegistry::builtin(),
        })
    }

    /// Replace the color map registry.
    ///
    /// In density-map mode the configured color map must resolve against `color_maps`,
    /// so an unusable registry is rejected here instead of failing every figure.
    pub fn with_color_maps(mut self, color_maps: ColorMapRegistry) -> SlidefigResult<Self> {
        if let RenderMode::DensityMapOverlay { color_map, .. } = &self.config.mode {
            color_maps.resolve(color_map)?;
        }
        self.color_maps = color_maps;
        Ok(self)
    }

    /// Configuration in use.
    pub fn config(&self) -> &ExportConfiguration {
        &self.config
    }

    /// Export every item. Never fails; per-figure problems are counted and logged.
    pub fn run(
        &self,
        items: &[ImageItem<'_>],
        sink: &mut dyn OutputSink,
        cancel: &CancelToken,
    ) -> ExportSummary {
        let mut renderer = match self.config.output {
            OutputKind::Raster { format } => {
                Renderer::Raster(RasterCompositor::new(&self.config, &self.color_maps), format)
            }
            OutputKind::Vector => {
                Renderer::Vector(VectorCompositor::new(&self.config, &self.color_maps))
            }
        };
        let mut run = RunState {
            summary: ExportSummary::default(),
            class_index: HashMap::new(),
            panel_index: self.config.decorations.panel_label.start_index,
            timestamp: Local::now(),
        };

        for item in items {
            if cancel.is_cancelled() {
                run.summary.cancelled = true;
                break;
            }
            self.export_item(item, &mut renderer, sink, &mut run, cancel);
        }
        if cancel.is_cancelled() {
            run.summary.cancelled = true;
        }

        let s = run.summary;
        tracing::info!(
            succeeded = s.succeeded,
            skipped = s.skipped,
            failed = s.failed,
            cancelled = s.cancelled,
            "export finished"
        );
        s
    }

    #[tracing::instrument(skip_all, fields(image = item.name()))]
    fn export_item(
        &self,
        item: &ImageItem<'_>,
        renderer: &mut Renderer<'_>,
        sink: &mut dyn OutputSink,
        run: &mut RunState,
        cancel: &CancelToken,
    ) {
        let name = item.name();
        let downsample = self.config.effective_downsample(item.pixel_size_um);
        tracing::debug!(downsample, "rendering image");
        if let ImageInput::Channels { display: None, .. } = item.input {
            tracing::warn!("display settings unavailable; using raw channel ranges");
        }

        let overlay_shapes = match self.overlay_shapes(item) {
            Ok(shapes) => shapes,
            Err(e) => {
                run.record_failure(name, &e);
                return;
            }
        };
        let regions = match self.regions(item, downsample, run) {
            Ok(Some(regions)) => regions,
            Ok(None) => {
                run.summary.skipped += 1;
                return;
            }
            Err(e) => {
                run.record_failure(name, &e);
                return;
            }
        };

        let mut written = Vec::new();
        for (stem, region) in regions {
            if cancel.is_cancelled() {
                return;
            }
            match (&self.config.split_channels, item.input) {
                (Some(options), ImageInput::Channels { source, display }) => {
                    let expander = SplitChannelExpander::new(source, display, options);
                    for panel in expander.panels() {
                        if cancel.is_cancelled() {
                            return;
                        }
                        let view = expander.view(&panel);
                        let role = match &panel.channel {
                            Some(info) => PanelRole::Channel { info, options },
                            None => PanelRole::Figure,
                        };
                        let stem = format!("{stem}_{}", panel.suffix);
                        let inputs = self.inputs(item, &view, region, &overlay_shapes, run, role);
                        if let Some(file) = emit(renderer, sink, run, &stem, &inputs) {
                            written.push(SidecarOutput { file, region });
                        }
                    }
                }
                (_, ImageInput::Rgb(base)) => {
                    let inputs =
                        self.inputs(item, base, region, &overlay_shapes, run, PanelRole::Figure);
                    if let Some(file) = emit(renderer, sink, run, &stem, &inputs) {
                        written.push(SidecarOutput { file, region });
                    }
                }
                (None, ImageInput::Channels { source, display }) => {
                    let view = ChannelRgbView::new(source, display, ChannelSelection::Merge);
                    let inputs =
                        self.inputs(item, &view, region, &overlay_shapes, run, PanelRole::Figure);
                    if let Some(file) = emit(renderer, sink, run, &stem, &inputs) {
                        written.push(SidecarOutput { file, region });
                    }
                }
            }
        }

        if self.config.write_sidecar && !written.is_empty() {
            self.write_sidecar(item, name, downsample, written, sink);
        }
    }

    fn inputs<'a>(
        &self,
        item: &ImageItem<'a>,
        base: &'a dyn ImageSource,
        region: Region,
        objects: &'a [ObjectShape],
        run: &RunState,
        role: PanelRole<'a>,
    ) -> FigureInputs<'a> {
        FigureInputs {
            image_name: item.name(),
            base,
            region,
            pixel_size_um: item.pixel_size_um,
            objects,
            classification: item.classification,
            density: item.density,
            panel_index: run.panel_index,
            timestamp: run.timestamp,
            role,
        }
    }

    /// Shapes drawn on top of figures, fetched once per image.
    fn overlay_shapes(&self, item: &ImageItem<'_>) -> SlidefigResult<Vec<ObjectShape>> {
        let filter = match &self.config.mode {
            RenderMode::ObjectOverlay { classes, .. } => ClassFilter::only(classes.clone()),
            _ if self.config.annotation_outlines => ClassFilter::all(),
            _ => return Ok(Vec::new()),
        };
        match item.objects {
            Some(objects) => objects.shapes(&filter),
            None => {
                tracing::warn!(image = item.name(), "no object source; shapes not drawn");
                Ok(Vec::new())
            }
        }
    }

    /// `(stem, region)` pairs for an image; `None` when the image has nothing to export.
    fn regions(
        &self,
        item: &ImageItem<'_>,
        downsample: f64,
        run: &mut RunState,
    ) -> SlidefigResult<Option<Vec<(String, Region)>>> {
        let (width, height) = item.dimensions();
        let name = item.name();
        match &self.config.region {
            RegionSelection::WholeImage => Ok(Some(vec![(
                name.to_owned(),
                Region::full(width, height, downsample)?,
            )])),
            RegionSelection::PerAnnotation { padding, .. } => {
                let Some(objects) = item.objects else {
                    tracing::warn!(image = name, "per-annotation export without an object source");
                    return Ok(None);
                };
                let shapes = objects.shapes(&self.config.annotation_filter())?;
                let regions = annotation_regions(&shapes, *padding, width, height, downsample)?;
                if regions.is_empty() {
                    tracing::info!(image = name, "no exportable annotations");
                }
                Ok(Some(
                    regions
                        .into_iter()
                        .map(|r| {
                            let n = run.class_index.entry(r.class_name.clone()).or_insert(0);
                            *n += 1;
                            (format!("{name}_{}_{n}", r.class_name), r.region)
                        })
                        .collect(),
                ))
            }
        }
    }

    fn write_sidecar(
        &self,
        item: &ImageItem<'_>,
        name: &str,
        downsample: f64,
        outputs: Vec<SidecarOutput>,
        sink: &mut dyn OutputSink,
    ) {
        let (width, height) = item.dimensions();
        let channels = match item.input {
            ImageInput::Channels { source, display } => source
                .channels()
                .iter()
                .enumerate()
                .map(|(i, c)| SidecarChannel {
                    name: c.name.clone(),
                    color: c.color.to_hex_rgb(),
                    visible: c.visible,
                    display_range: display.and_then(|d| d.channel_range(i)),
                })
                .collect(),
            ImageInput::Rgb(_) => Vec::new(),
        };
        let sidecar = Sidecar {
            image: name.to_owned(),
            width,
            height,
            pixel_size_um: item.pixel_size_um,
            effective_downsample: downsample,
            mode: self.config.mode.label().to_owned(),
            channels,
            outputs,
        };
        if let Err(e) = sidecar
            .to_json()
            .and_then(|json| sink.write_sidecar(name, &json))
        {
            tracing::warn!(image = name, error = %e, "sidecar not written");
        }
    }
}

/// Render and write one figure, updating counters. Returns the written file name.
fn emit(
    renderer: &mut Renderer<'_>,
    sink: &mut dyn OutputSink,
    run: &mut RunState,
    stem: &str,
    inputs: &FigureInputs<'_>,
) -> Option<String> {
    match renderer
        .render(inputs)
        .and_then(|payload| sink.write_figure(stem, &payload))
    {
        Ok(file) => {
            tracing::info!(file = file.as_str(), "figure written");
            run.summary.succeeded += 1;
            run.panel_index += 1;
            Some(file)
        }
        Err(e) => {
            run.record_failure(stem, &e);
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/batch.rs"]
mod tests;
