//! Decoration settings and the shared sizing rules every decorator uses.

use serde::{Deserialize, Serialize};

use crate::foundation::core::Color;

/// Image corner a decoration is anchored to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    /// Upper left.
    TopLeft,
    /// Upper right.
    TopRight,
    /// Lower left.
    BottomLeft,
    /// Lower right.
    #[default]
    BottomRight,
}

impl Corner {
    /// Whether the corner is on the top edge.
    pub fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    /// Whether the corner is on the left edge.
    pub fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }
}

/// Auto font-size rule: `max(lower_bound, min_dimension / divisor)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontRule {
    /// Smallest automatic size in pixels.
    pub lower_bound: u32,
    /// Divisor applied to the smaller image dimension.
    pub divisor: u32,
}

/// Scale bar label sizing.
pub const SCALE_BAR_FONT: FontRule = FontRule {
    lower_bound: 12,
    divisor: 50,
};
/// Panel letters are intentionally larger than other stamps.
pub const PANEL_LABEL_FONT: FontRule = FontRule {
    lower_bound: 14,
    divisor: 25,
};
/// Info text sizing.
pub const INFO_LABEL_FONT: FontRule = FontRule {
    lower_bound: 12,
    divisor: 40,
};
/// Color legend tick labels.
pub const LEGEND_FONT: FontRule = FontRule {
    lower_bound: 10,
    divisor: 60,
};

/// Smallest explicit font size.
pub const MIN_FONT_SIZE: u32 = 4;
/// Largest explicit font size.
pub const MAX_FONT_SIZE: u32 = 200;

/// Resolve a configured font size; `0` means automatic.
pub fn resolve_font_size(requested: u32, min_dimension: u32, rule: FontRule) -> u32 {
    if requested == 0 {
        rule.lower_bound.max(min_dimension / rule.divisor.max(1))
    } else {
        requested.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    }
}

/// Distance between a decoration and the image edge.
pub fn corner_margin(min_dimension: u32) -> u32 {
    10u32.max(min_dimension / 40)
}

fn default_true() -> bool {
    true
}

/// Physical scale bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleBarSpec {
    /// Draw the bar.
    pub show: bool,
    /// Anchor corner.
    pub corner: Corner,
    /// Label size in pixels, `0` = auto.
    pub font_size: u32,
    /// Bold label.
    pub bold: bool,
    /// Bar and label color.
    pub color: Color,
}

impl Default for ScaleBarSpec {
    fn default() -> Self {
        Self {
            show: false,
            corner: Corner::BottomRight,
            font_size: 0,
            bold: true,
            color: Color::WHITE,
        }
    }
}

/// Gradient legend for density-map overlays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorLegendSpec {
    /// Draw the legend (density mode only).
    pub show: bool,
    /// Anchor corner.
    pub corner: Corner,
    /// Tick label size, `0` = auto.
    pub font_size: u32,
    /// Bold tick labels.
    pub bold: bool,
    /// Tick and label color.
    pub color: Color,
}

impl Default for ColorLegendSpec {
    fn default() -> Self {
        Self {
            show: false,
            corner: Corner::TopRight,
            font_size: 0,
            bold: false,
            color: Color::WHITE,
        }
    }
}

/// Panel letter ("A", "B", ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelLabelSpec {
    /// Draw the label.
    pub show: bool,
    /// Anchor corner.
    pub corner: Corner,
    /// Size, `0` = auto.
    pub font_size: u32,
    /// Bold text.
    pub bold: bool,
    /// Text color.
    pub color: Color,
    /// Fixed text; when absent the letter comes from the panel index.
    pub text: Option<String>,
    /// Index of the first panel written in a run.
    pub start_index: usize,
}

impl Default for PanelLabelSpec {
    fn default() -> Self {
        Self {
            show: false,
            corner: Corner::TopLeft,
            font_size: 0,
            bold: true,
            color: Color::WHITE,
            text: None,
            start_index: 0,
        }
    }
}

/// Free-form text with placeholders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoLabelSpec {
    /// Draw the label.
    pub show: bool,
    /// Anchor corner.
    pub corner: Corner,
    /// Size, `0` = auto.
    pub font_size: u32,
    /// Bold text.
    pub bold: bool,
    /// Text color.
    pub color: Color,
    /// Template, e.g. `"{imageName} ({pixelSize})"`.
    pub template: String,
}

impl Default for InfoLabelSpec {
    fn default() -> Self {
        Self {
            show: false,
            corner: Corner::BottomLeft,
            font_size: 0,
            bold: false,
            color: Color::WHITE,
            template: "{imageName}".to_owned(),
        }
    }
}

/// Magnified inset of a sub-rectangle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsetSpec {
    /// Draw the inset.
    pub show: bool,
    /// Anchor corner of the magnified view.
    pub corner: Corner,
    /// Left of the source rectangle as a fraction of image width.
    pub x: f64,
    /// Top of the source rectangle as a fraction of image height.
    pub y: f64,
    /// Width fraction, floored at 0.01.
    pub width: f64,
    /// Height fraction, floored at 0.01.
    pub height: f64,
    /// Magnification factor, clamped to `[2, 16]`.
    pub magnification: f64,
    /// Frame color.
    pub color: Color,
    /// Draw dashed guide lines between source and inset.
    #[serde(default = "default_true")]
    pub guide_lines: bool,
}

impl Default for InsetSpec {
    fn default() -> Self {
        Self {
            show: false,
            corner: Corner::BottomLeft,
            x: 0.4,
            y: 0.4,
            width: 0.2,
            height: 0.2,
            magnification: 4.0,
            color: Color::YELLOW,
            guide_lines: true,
        }
    }
}

/// Every decoration of a figure. Drawing order is fixed by the compositor, not by this struct.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Decorations {
    /// Scale bar.
    pub scale_bar: ScaleBarSpec,
    /// Color legend.
    pub color_legend: ColorLegendSpec,
    /// Panel letter.
    pub panel_label: PanelLabelSpec,
    /// Info text.
    pub info_label: InfoLabelSpec,
    /// Magnified inset.
    pub inset: InsetSpec,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/decoration.rs"]
mod tests;
