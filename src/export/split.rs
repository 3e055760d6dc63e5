//! Split-channel expansion: one merge panel plus one panel per visible channel.

use crate::color::contrast::outline_for;
use crate::compile::plan::{DrawContext, DrawOp, Layer, StrokeStyle, TextAnchor};
use crate::decor::text::{measure_in, stamp};
use crate::foundation::core::{Color, Point, Rect};
use crate::render::svg::sanitize_id;
use crate::scene::config::SplitChannelOptions;
use crate::scene::decoration::{INFO_LABEL_FONT, corner_margin, resolve_font_size};
use crate::source::channels::{ChannelInfo, ChannelRgbView, ChannelSelection};
use crate::source::{ChannelSource, DisplaySettings};

/// Filename suffix of the merged panel.
pub const MERGE_SUFFIX: &str = "merge";

/// One panel of a split-channel figure set.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelPanel {
    /// Filename suffix (`merge` or the channel name).
    pub suffix: String,
    /// What the panel's RGB view shows.
    pub selection: ChannelSelection,
    /// Channel shown by a per-channel panel; `None` for the merge panel.
    pub channel: Option<ChannelInfo>,
}

impl ChannelPanel {
    /// Whether this is the merged panel.
    pub fn is_merge(&self) -> bool {
        self.channel.is_none()
    }
}

/// Expands a channel source into panels and their RGB views.
pub struct SplitChannelExpander<'a> {
    source: &'a dyn ChannelSource,
    display: Option<&'a dyn DisplaySettings>,
    options: &'a SplitChannelOptions,
}

impl<'a> SplitChannelExpander<'a> {
    /// Borrow a source for the duration of one image.
    pub fn new(
        source: &'a dyn ChannelSource,
        display: Option<&'a dyn DisplaySettings>,
        options: &'a SplitChannelOptions,
    ) -> Self {
        Self {
            source,
            display,
            options,
        }
    }

    /// Merge panel first, then visible channels in channel order.
    pub fn panels(&self) -> Vec<ChannelPanel> {
        let mut panels = vec![ChannelPanel {
            suffix: MERGE_SUFFIX.to_owned(),
            selection: ChannelSelection::Merge,
            channel: None,
        }];
        for (i, info) in self.source.channels().iter().enumerate() {
            if !info.visible {
                continue;
            }
            panels.push(ChannelPanel {
                suffix: sanitize_id(&info.name),
                selection: ChannelSelection::Single {
                    channel: i,
                    grayscale: self.options.grayscale,
                },
                channel: Some(info.clone()),
            });
        }
        panels
    }

    /// RGB view a panel is read through; each channel panel reads its own channel.
    pub fn view(&self, panel: &ChannelPanel) -> ChannelRgbView<'a> {
        ChannelRgbView::new(self.source, self.display, panel.selection)
    }
}

/// Border width for a channel panel.
pub fn border_width(min_dimension: u32) -> f64 {
    f64::from(2u32.max(min_dimension / 100))
}

/// Pseudocolor frame and swatch legend for a per-channel panel.
pub fn channel_marks(info: &ChannelInfo, options: &SplitChannelOptions, ctx: DrawContext) -> Vec<Layer> {
    let mut layers = Vec::new();
    let (w, h) = (f64::from(ctx.width), f64::from(ctx.height));
    let bw = border_width(ctx.min_dimension());

    if options.border {
        let mut border = Layer::new("channel-border");
        let half = bw / 2.0;
        border.push(DrawOp::Rect {
            rect: Rect::new(half, half, w - half, h - half),
            fill: None,
            stroke: Some(StrokeStyle::solid(info.color.with_alpha(255), bw)),
        });
        layers.push(border);
    }

    if options.legend {
        let size = resolve_font_size(0, ctx.min_dimension(), INFO_LABEL_FONT);
        let ctx = ctx.with_color(Color::WHITE).with_font(size, true);
        let s = f64::from(size);
        let mut margin = f64::from(corner_margin(ctx.min_dimension()));
        if options.border {
            margin += bw;
        }
        let swatch = Rect::new(margin, h - margin - s, margin + s, h - margin);
        let swatch_color = info.color.with_alpha(255);

        let mut legend = Layer::new("channel-legend");
        legend.push(DrawOp::Rect {
            rect: swatch,
            fill: Some(swatch_color),
            stroke: Some(StrokeStyle::solid(outline_for(swatch_color), 1.0)),
        });
        let metrics = measure_in(&ctx, &info.name);
        let origin = Point::new(swatch.x1 + 0.4 * s, swatch.y1 - metrics.descent);
        stamp(&mut legend, &ctx, &info.name, origin, TextAnchor::Start);
        layers.push(legend);
    }
    layers
}

#[cfg(test)]
#[path = "../../tests/unit/export/split.rs"]
mod tests;
