//! Hybrid vector output: the raster background embedded once, everything else as SVG.

use crate::color::colormap::ColorMapRegistry;
use crate::export::raster::{FigureInputs, RasterCompositor};
use crate::foundation::error::SlidefigResult;
use crate::render::svg::write_document;
use crate::scene::config::ExportConfiguration;

/// Writes figures as SVG documents.
///
/// The background holds the base image plus the blended raster overlay only; shapes,
/// decorations and text stay vector. The inset's magnified pixels come from a raster
/// render of the decorated figure.
pub struct VectorCompositor<'c> {
    raster: RasterCompositor<'c>,
}

impl<'c> VectorCompositor<'c> {
    /// Compositor for a validated configuration.
    pub fn new(config: &'c ExportConfiguration, color_maps: &'c ColorMapRegistry) -> Self {
        Self {
            raster: RasterCompositor::new(config, color_maps),
        }
    }

    /// Compose and serialize one figure.
    pub fn render(&mut self, inputs: &FigureInputs<'_>) -> SlidefigResult<String> {
        let composition = self.raster.compose(inputs, false)?;
        let background = composition.background.to_straight()?;
        write_document(&background, &composition.plan)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/vector.rs"]
mod tests;
