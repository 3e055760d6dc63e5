//! Output boundary: where finished figures and sidecars go.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Serialize;

use crate::foundation::core::Region;
use crate::foundation::error::SlidefigResult;
use crate::scene::config::RasterFormat;

/// Encoded-or-encodable figure.
#[derive(Clone, Debug)]
pub enum FigurePayload {
    /// Straight-alpha pixels and the container to write them in.
    Raster {
        /// Pixels.
        image: image::RgbaImage,
        /// Container format.
        format: RasterFormat,
    },
    /// Complete SVG document.
    Vector(String),
}

impl FigurePayload {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Raster { format, .. } => format.extension(),
            Self::Vector(_) => "svg",
        }
    }
}

/// Receives finished figures. Implementations decide where bytes end up.
pub trait OutputSink {
    /// Store one figure under `stem`; returns the name it was stored as.
    fn write_figure(&mut self, stem: &str, payload: &FigurePayload) -> SlidefigResult<String>;

    /// Store a JSON sidecar under `stem`.
    fn write_sidecar(&mut self, stem: &str, json: &str) -> SlidefigResult<String>;
}

/// Replace characters that are unsafe in file names.
pub fn file_stem(raw: &str) -> String {
    let stem: String = raw
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim().trim_matches('.').to_owned();
    if stem.is_empty() { "figure".to_owned() } else { stem }
}

/// Writes into a directory, creating it on construction.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> SlidefigResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for DirectorySink {
    fn write_figure(&mut self, stem: &str, payload: &FigurePayload) -> SlidefigResult<String> {
        let name = format!("{}.{}", file_stem(stem), payload.extension());
        let path = self.dir.join(&name);
        match payload {
            FigurePayload::Raster { image, format } => match format {
                RasterFormat::Png => image
                    .save_with_format(&path, image::ImageFormat::Png)
                    .with_context(|| format!("write '{}'", path.display()))?,
                RasterFormat::Jpeg => image::DynamicImage::ImageRgba8(image.clone())
                    .to_rgb8()
                    .save_with_format(&path, image::ImageFormat::Jpeg)
                    .with_context(|| format!("write '{}'", path.display()))?,
                RasterFormat::Tiff => image
                    .save_with_format(&path, image::ImageFormat::Tiff)
                    .with_context(|| format!("write '{}'", path.display()))?,
            },
            FigurePayload::Vector(svg) => std::fs::write(&path, svg)
                .with_context(|| format!("write '{}'", path.display()))?,
        }
        Ok(name)
    }

    fn write_sidecar(&mut self, stem: &str, json: &str) -> SlidefigResult<String> {
        let name = format!("{}.json", file_stem(stem));
        let path = self.dir.join(&name);
        std::fs::write(&path, json).with_context(|| format!("write '{}'", path.display()))?;
        Ok(name)
    }
}

/// Keeps everything in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    /// Figures in write order, keyed by file name.
    pub figures: Vec<(String, FigurePayload)>,
    /// Sidecars in write order, keyed by file name.
    pub sidecars: Vec<(String, String)>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// File names of every figure written so far.
    pub fn names(&self) -> Vec<&str> {
        self.figures.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl OutputSink for MemorySink {
    fn write_figure(&mut self, stem: &str, payload: &FigurePayload) -> SlidefigResult<String> {
        let name = format!("{}.{}", file_stem(stem), payload.extension());
        self.figures.push((name.clone(), payload.clone()));
        Ok(name)
    }

    fn write_sidecar(&mut self, stem: &str, json: &str) -> SlidefigResult<String> {
        let name = format!("{}.json", file_stem(stem));
        self.sidecars.push((name.clone(), json.to_owned()));
        Ok(name)
    }
}

/// Channel entry of a sidecar.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SidecarChannel {
    /// Channel name.
    pub name: String,
    /// Pseudocolor as `#rrggbb`.
    pub color: String,
    /// Whether the channel is shown.
    pub visible: bool,
    /// Display range, when display settings supplied one.
    pub display_range: Option<(f64, f64)>,
}

/// Output entry of a sidecar.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SidecarOutput {
    /// Written file name.
    pub file: String,
    /// Source region.
    pub region: Region,
}

/// Human-readable description of everything written for one image.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sidecar {
    /// Image name.
    pub image: String,
    /// Full-resolution size.
    pub width: u32,
    /// Full-resolution size.
    pub height: u32,
    /// Full-resolution pixel size, if calibrated.
    pub pixel_size_um: Option<f64>,
    /// Downsample the figures were rendered at.
    pub effective_downsample: f64,
    /// Render mode label.
    pub mode: String,
    /// Channels of a multi-channel image.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<SidecarChannel>,
    /// Figures written.
    pub outputs: Vec<SidecarOutput>,
}

impl Sidecar {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> SlidefigResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::foundation::error::SlidefigError::serde(format!("sidecar: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/output.rs"]
mod tests;
