//! Export configuration: what to render, where, and how it is decorated.
//!
//! A configuration is built once per run (from JSON or [`ExportConfigBuilder`]), validated,
//! and then only ever borrowed.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{SlidefigError, SlidefigResult};
use crate::scene::decoration::Decorations;
use crate::source::objects::ClassFilter;

/// What is blended over the base image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RenderMode {
    /// Pixel classifier output.
    ClassifierOverlay {
        /// Classifier name; required.
        classifier: String,
    },
    /// Annotation and detection shapes.
    ObjectOverlay {
        /// Fill annotation shapes (detections are never filled).
        #[serde(default)]
        fill_annotations: bool,
        /// Draw detections as well as annotations.
        #[serde(default = "default_true")]
        include_detections: bool,
        /// Only draw these classifications; empty = all.
        #[serde(default)]
        classes: Vec<String>,
    },
    /// Scalar density map through a color map.
    DensityMapOverlay {
        /// Density map name; required.
        density_map: String,
        /// Color map name, resolved leniently.
        #[serde(default = "default_color_map")]
        color_map: String,
        /// Fixed lower bound; computed from data when absent.
        #[serde(default)]
        min: Option<f64>,
        /// Fixed upper bound; computed from data when absent.
        #[serde(default)]
        max: Option<f64>,
    },
}

impl RenderMode {
    /// Short identifier used in logs and sidecars.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ClassifierOverlay { .. } => "classifier-overlay",
            Self::ObjectOverlay { .. } => "object-overlay",
            Self::DensityMapOverlay { .. } => "density-map-overlay",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_color_map() -> String {
    "Viridis".to_owned()
}

/// Which part of each image becomes a figure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RegionSelection {
    /// The whole image.
    #[default]
    WholeImage,
    /// One figure per matching annotation, cropped to its padded bounds.
    PerAnnotation {
        /// Padding around the annotation bounds in source pixels.
        #[serde(default)]
        padding: u32,
        /// Annotation classifications to export; empty = all.
        #[serde(default)]
        classes: Vec<String>,
    },
}

/// Raster container formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    /// Lossless PNG (keeps alpha).
    #[default]
    Png,
    /// JPEG (alpha flattened).
    Jpeg,
    /// TIFF.
    Tiff,
}

impl RasterFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Tiff => "tif",
        }
    }
}

/// Flattened raster or hybrid vector output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutputKind {
    /// Flattened pixels.
    Raster {
        /// Container format.
        #[serde(default)]
        format: RasterFormat,
    },
    /// SVG with an embedded raster background and vector shapes/text.
    Vector,
}

impl Default for OutputKind {
    fn default() -> Self {
        Self::Raster {
            format: RasterFormat::Png,
        }
    }
}

impl OutputKind {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Raster { format } => format.extension(),
            Self::Vector => "svg",
        }
    }
}

/// Per-channel panel options for multi-channel images.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitChannelOptions {
    /// Render channel panels in gray instead of their pseudocolor.
    pub grayscale: bool,
    /// Frame each channel panel in its pseudocolor.
    pub border: bool,
    /// Stamp a color swatch and the channel name.
    pub legend: bool,
    /// Draw the scale bar on channel panels too.
    pub scale_bar: bool,
}

impl Default for SplitChannelOptions {
    fn default() -> Self {
        Self {
            grayscale: true,
            border: true,
            legend: true,
            scale_bar: false,
        }
    }
}

/// Complete, validated description of an export run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportConfiguration {
    /// Directory that receives output files.
    pub output_dir: PathBuf,
    /// Overlay mode.
    pub mode: RenderMode,
    /// Region selection.
    #[serde(default)]
    pub region: RegionSelection,
    /// Explicit downsample (>= 1).
    #[serde(default = "default_downsample")]
    pub downsample: f64,
    /// Target print resolution; lowers the downsample when calibration allows.
    #[serde(default)]
    pub target_dpi: Option<f64>,
    /// Overlay opacity in `[0, 1]`; `0` skips blending.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Output kind.
    #[serde(default)]
    pub output: OutputKind,
    /// Object outline width in output pixels.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    /// Draw annotation outlines in classifier and density modes too.
    #[serde(default)]
    pub annotation_outlines: bool,
    /// Decorations.
    #[serde(default)]
    pub decorations: Decorations,
    /// Split multi-channel images into per-channel panels.
    #[serde(default)]
    pub split_channels: Option<SplitChannelOptions>,
    /// Write a JSON sidecar next to each figure.
    #[serde(default)]
    pub write_sidecar: bool,
}

fn default_downsample() -> f64 {
    1.0
}

fn default_opacity() -> f64 {
    0.5
}

fn default_stroke_width() -> f64 {
    2.0
}

impl ExportConfiguration {
    /// Parse and validate JSON text.
    pub fn from_json_str(text: &str) -> SlidefigResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| SlidefigError::serde(format!("invalid export configuration: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: &Path) -> SlidefigResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read configuration '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Check every field that would otherwise fail mid-run.
    pub fn validate(&self) -> SlidefigResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(SlidefigError::config("output directory is required"));
        }
        match &self.mode {
            RenderMode::ClassifierOverlay { classifier } if classifier.trim().is_empty() => {
                return Err(SlidefigError::config(
                    "classifier-overlay mode requires a classifier name",
                ));
            }
            RenderMode::DensityMapOverlay {
                density_map,
                min,
                max,
                ..
            } => {
                if density_map.trim().is_empty() {
                    return Err(SlidefigError::config(
                        "density-map-overlay mode requires a density map name",
                    ));
                }
                if let (Some(lo), Some(hi)) = (min, max)
                    && !(lo < hi)
                {
                    return Err(SlidefigError::config(format!(
                        "density display range must satisfy min < max (got {lo}..{hi})"
                    )));
                }
            }
            _ => {}
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(SlidefigError::config(format!(
                "opacity must be within [0, 1] (got {})",
                self.opacity
            )));
        }
        if !self.downsample.is_finite() || self.downsample < 1.0 {
            return Err(SlidefigError::config(format!(
                "downsample must be finite and >= 1 (got {})",
                self.downsample
            )));
        }
        if let Some(dpi) = self.target_dpi
            && !(dpi.is_finite() && dpi > 0.0)
        {
            return Err(SlidefigError::config(format!(
                "target DPI must be positive (got {dpi})"
            )));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(SlidefigError::config("stroke width must be positive"));
        }
        Ok(())
    }

    /// Effective downsample for an image with the given calibration.
    pub fn effective_downsample(&self, pixel_size_um: Option<f64>) -> f64 {
        effective_downsample(self.downsample, self.target_dpi, pixel_size_um)
    }

    /// Filter for per-annotation region selection.
    pub fn annotation_filter(&self) -> ClassFilter {
        match &self.region {
            RegionSelection::PerAnnotation { classes, .. } => ClassFilter::only(classes.clone()),
            RegionSelection::WholeImage => ClassFilter::all(),
        }
    }
}

/// Smaller of `explicit` and the downsample that reaches `target_dpi`, never below 1.
///
/// Without calibration (or a DPI target) the explicit downsample is used unchanged.
pub fn effective_downsample(explicit: f64, target_dpi: Option<f64>, pixel_size_um: Option<f64>) -> f64 {
    let derived = match (target_dpi, pixel_size_um) {
        (Some(dpi), Some(px)) if dpi > 0.0 && px > 0.0 && px.is_finite() => {
            Some(25_400.0 / dpi / px)
        }
        _ => None,
    };
    match derived {
        Some(d) => explicit.min(d).max(1.0),
        None => explicit.max(1.0),
    }
}

/// Fluent builder that validates on [`ExportConfigBuilder::build`].
#[derive(Clone, Debug)]
pub struct ExportConfigBuilder {
    cfg: ExportConfiguration,
}

impl ExportConfigBuilder {
    /// Start from a mode with every other field at its default.
    pub fn new(mode: RenderMode) -> Self {
        Self {
            cfg: ExportConfiguration {
                output_dir: PathBuf::new(),
                mode,
                region: RegionSelection::default(),
                downsample: default_downsample(),
                target_dpi: None,
                opacity: default_opacity(),
                output: OutputKind::default(),
                stroke_width: default_stroke_width(),
                annotation_outlines: false,
                decorations: Decorations::default(),
                split_channels: None,
                write_sidecar: false,
            },
        }
    }

    /// Output directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cfg.output_dir = dir.into();
        self
    }

    /// Region selection.
    pub fn region(mut self, region: RegionSelection) -> Self {
        self.cfg.region = region;
        self
    }

    /// Explicit downsample.
    pub fn downsample(mut self, downsample: f64) -> Self {
        self.cfg.downsample = downsample;
        self
    }

    /// Target DPI.
    pub fn target_dpi(mut self, dpi: Option<f64>) -> Self {
        self.cfg.target_dpi = dpi;
        self
    }

    /// Overlay opacity.
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.cfg.opacity = opacity;
        self
    }

    /// Output kind.
    pub fn output(mut self, output: OutputKind) -> Self {
        self.cfg.output = output;
        self
    }

    /// Object outline width.
    pub fn stroke_width(mut self, width: f64) -> Self {
        self.cfg.stroke_width = width;
        self
    }

    /// Draw annotation outlines outside object mode.
    pub fn annotation_outlines(mut self, on: bool) -> Self {
        self.cfg.annotation_outlines = on;
        self
    }

    /// Decorations.
    pub fn decorations(mut self, decorations: Decorations) -> Self {
        self.cfg.decorations = decorations;
        self
    }

    /// Split-channel panels.
    pub fn split_channels(mut self, options: Option<SplitChannelOptions>) -> Self {
        self.cfg.split_channels = options;
        self
    }

    /// JSON sidecars.
    pub fn write_sidecar(mut self, on: bool) -> Self {
        self.cfg.write_sidecar = on;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> SlidefigResult<ExportConfiguration> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
