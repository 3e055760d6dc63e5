use kurbo::Shape as _;

use super::*;
use crate::color::colormap::ColorMap;
use crate::export::output::MemorySink;
use crate::foundation::core::{Color, Rect};
use crate::scene::config::{ExportConfigBuilder, SplitChannelOptions};
use crate::source::channels::{ChannelInfo, FixedDisplaySettings, MemoryChannelSource};
use crate::source::objects::{ObjectKind, ShapeStyle, VecObjectSource};
use crate::source::raster::RasterImageSource;
use crate::source::tile::RgbaTile;

fn object_mode() -> RenderMode {
    RenderMode::ObjectOverlay {
        fill_annotations: false,
        include_detections: true,
        classes: Vec::new(),
    }
}

fn gray(name: &str, w: u32, h: u32) -> RasterImageSource {
    RasterImageSource::new(name, image::RgbaImage::from_pixel(w, h, image::Rgba([90, 90, 90, 255])))
}

fn annotation(id: &str, class: &str, rect: Rect) -> ObjectShape {
    ObjectShape {
        id: id.to_owned(),
        kind: ObjectKind::Annotation,
        classification: Some(class.to_owned()),
        geometry: rect.to_path(0.1),
        style: ShapeStyle::from_class_color(Color::rgb(255, 0, 0)),
    }
}

struct BrokenSource(SlidefigError);

impl ImageSource for BrokenSource {
    fn name(&self) -> &str {
        "broken"
    }

    fn width(&self) -> u32 {
        10
    }

    fn height(&self) -> u32 {
        10
    }

    fn read_region(&self, _region: &Region) -> SlidefigResult<RgbaTile> {
        Err(match &self.0 {
            SlidefigError::Source(m) => SlidefigError::source(m.clone()),
            other => SlidefigError::render(other.to_string()),
        })
    }
}

#[test]
fn whole_image_export_writes_one_figure_per_image() {
    let cfg = ExportConfigBuilder::new(object_mode()).output_dir("out").build().unwrap();
    let a = gray("a", 20, 10);
    let b = gray("b", 10, 20);
    let mut sink = MemorySink::new();
    let summary = Exporter::new(cfg).unwrap().run(
        &[ImageItem::rgb(&a), ImageItem::rgb(&b)],
        &mut sink,
        &CancelToken::new(),
    );
    assert_eq!(
        summary,
        ExportSummary {
            succeeded: 2,
            skipped: 0,
            failed: 0,
            cancelled: false
        }
    );
    assert_eq!(sink.names(), vec!["a.png", "b.png"]);
    let FigurePayload::Raster { image, .. } = &sink.figures[0].1 else {
        panic!("raster expected");
    };
    assert_eq!(image.dimensions(), (20, 10));
}

#[test]
fn failures_are_counted_and_the_run_continues() {
    let cfg = ExportConfigBuilder::new(object_mode()).output_dir("out").build().unwrap();
    let unreadable = BrokenSource(SlidefigError::source("tile missing"));
    let broken = BrokenSource(SlidefigError::render("boom"));
    let ok = gray("ok", 8, 8);
    let mut sink = MemorySink::new();
    let summary = Exporter::new(cfg).unwrap().run(
        &[
            ImageItem::rgb(&unreadable),
            ImageItem::rgb(&broken),
            ImageItem::rgb(&ok),
        ],
        &mut sink,
        &CancelToken::new(),
    );
    assert_eq!((summary.succeeded, summary.skipped, summary.failed), (1, 1, 1));
    assert_eq!(sink.names(), vec!["ok.png"]);
}

#[test]
fn cancelled_runs_write_nothing() {
    let cfg = ExportConfigBuilder::new(object_mode()).output_dir("out").build().unwrap();
    let a = gray("a", 8, 8);
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut sink = MemorySink::new();
    let summary = Exporter::new(cfg)
        .unwrap()
        .run(&[ImageItem::rgb(&a)], &mut sink, &cancel.clone());
    assert!(summary.cancelled);
    assert_eq!(summary.succeeded, 0);
    assert!(sink.figures.is_empty());
}

#[test]
fn per_annotation_names_count_per_class_across_images() {
    let cfg = ExportConfigBuilder::new(object_mode())
        .output_dir("out")
        .region(RegionSelection::PerAnnotation {
            padding: 2,
            classes: Vec::new(),
        })
        .build()
        .unwrap();
    let first = gray("s1", 100, 100);
    let second = gray("s2", 100, 100);
    let objects_1 = VecObjectSource::new(vec![
        annotation("1", "Tumor", Rect::new(10.0, 10.0, 30.0, 30.0)),
        annotation("2", "Stroma", Rect::new(50.0, 50.0, 70.0, 60.0)),
        annotation("3", "Tumor", Rect::new(400.0, 400.0, 420.0, 420.0)),
    ]);
    let objects_2 = VecObjectSource::new(vec![annotation(
        "9",
        "Tumor",
        Rect::new(0.0, 0.0, 10.0, 10.0),
    )]);
    let mut sink = MemorySink::new();
    let summary = Exporter::new(cfg).unwrap().run(
        &[
            ImageItem::rgb(&first).with_objects(&objects_1),
            ImageItem::rgb(&second).with_objects(&objects_2),
        ],
        &mut sink,
        &CancelToken::new(),
    );
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(
        sink.names(),
        vec!["s1_Tumor_1.png", "s1_Stroma_1.png", "s2_Tumor_2.png"]
    );
    let FigurePayload::Raster { image, .. } = &sink.figures[0].1 else {
        panic!("raster expected");
    };
    assert_eq!(image.dimensions(), (24, 24));
}

#[test]
fn per_annotation_without_objects_skips_the_image() {
    let cfg = ExportConfigBuilder::new(object_mode())
        .output_dir("out")
        .region(RegionSelection::PerAnnotation {
            padding: 0,
            classes: Vec::new(),
        })
        .build()
        .unwrap();
    let a = gray("a", 8, 8);
    let mut sink = MemorySink::new();
    let summary = Exporter::new(cfg)
        .unwrap()
        .run(&[ImageItem::rgb(&a)], &mut sink, &CancelToken::new());
    assert_eq!(summary.skipped, 1);
    assert!(sink.figures.is_empty());
}

#[test]
fn panel_letters_advance_per_written_figure() {
    let mut cfg = ExportConfigBuilder::new(object_mode())
        .output_dir("out")
        .output(OutputKind::Vector)
        .build()
        .unwrap();
    cfg.decorations.panel_label.show = true;
    cfg.decorations.panel_label.start_index = 1;
    let a = gray("a", 40, 40);
    let b = gray("b", 40, 40);
    let mut sink = MemorySink::new();
    Exporter::new(cfg).unwrap().run(
        &[ImageItem::rgb(&a), ImageItem::rgb(&b)],
        &mut sink,
        &CancelToken::new(),
    );
    let svgs: Vec<&str> = sink
        .figures
        .iter()
        .map(|(_, p)| match p {
            FigurePayload::Vector(svg) => svg.as_str(),
            FigurePayload::Raster { .. } => panic!("vector expected"),
        })
        .collect();
    assert!(svgs[0].contains(">B</text>"));
    assert!(svgs[1].contains(">C</text>"));
}

#[test]
fn split_channels_write_merge_and_channel_panels_with_sidecar() {
    let cfg = ExportConfigBuilder::new(object_mode())
        .output_dir("out")
        .split_channels(Some(SplitChannelOptions {
            legend: false,
            ..SplitChannelOptions::default()
        }))
        .write_sidecar(true)
        .build()
        .unwrap();
    let source = MemoryChannelSource::new(
        "cells",
        4,
        4,
        vec![
            ChannelInfo::new("DAPI", Color::rgb(0, 0, 255)),
            ChannelInfo::new("GFP", Color::rgb(0, 255, 0)),
        ],
        vec![vec![1.0; 16], vec![0.5; 16]],
    )
    .unwrap();
    let display = FixedDisplaySettings::new(vec![Some((0.0, 1.0)), Some((0.0, 1.0))]);
    let mut sink = MemorySink::new();
    let summary = Exporter::new(cfg).unwrap().run(
        &[ImageItem::channels(&source, Some(&display)).with_pixel_size(Some(0.5))],
        &mut sink,
        &CancelToken::new(),
    );
    assert_eq!(summary.succeeded, 3);
    assert_eq!(
        sink.names(),
        vec!["cells_merge.png", "cells_DAPI.png", "cells_GFP.png"]
    );
    let FigurePayload::Raster { image: merge, .. } = &sink.figures[0].1 else {
        panic!("raster expected");
    };
    assert_eq!(merge.get_pixel(2, 2).0, [0, 128, 255, 255]);

    assert_eq!(sink.sidecars.len(), 1);
    let (name, json) = &sink.sidecars[0];
    assert_eq!(name, "cells.json");
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(value["channels"][1]["name"], "GFP");
    assert_eq!(value["outputs"].as_array().unwrap().len(), 3);
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn missing_display_settings_warn_once_per_image() {
    let cfg = ExportConfigBuilder::new(object_mode())
        .output_dir("out")
        .split_channels(Some(SplitChannelOptions {
            legend: false,
            ..SplitChannelOptions::default()
        }))
        .build()
        .unwrap();
    let source = MemoryChannelSource::new(
        "cells",
        8,
        8,
        vec![
            ChannelInfo::new("DAPI", Color::rgb(0, 0, 255)),
            ChannelInfo::new("GFP", Color::rgb(0, 255, 0)),
        ],
        vec![vec![1.0; 64], vec![0.5; 64]],
    )
    .unwrap();
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let mut sink = MemorySink::new();
    let summary = tracing::subscriber::with_default(subscriber, || {
        Exporter::new(cfg).unwrap().run(
            &[ImageItem::channels(&source, None)],
            &mut sink,
            &CancelToken::new(),
        )
    });
    assert_eq!(summary.succeeded, 3);
    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert_eq!(text.matches("display settings unavailable").count(), 1, "{text}");
}

#[test]
fn color_maps_are_checked_when_installed() {
    let density = ExportConfigBuilder::new(RenderMode::DensityMapOverlay {
        density_map: "cells".to_owned(),
        color_map: "Viridis".to_owned(),
        min: None,
        max: None,
    })
    .output_dir("out")
    .build()
    .unwrap();
    let err = Exporter::new(density.clone())
        .unwrap()
        .with_color_maps(ColorMapRegistry::empty())
        .unwrap_err();
    assert!(matches!(err, SlidefigError::Config(_)));

    // An unknown name still resolves to the first map.
    let mut maps = ColorMapRegistry::empty();
    maps.insert(ColorMap::from_stops("Ice", vec![Color::BLACK, Color::rgb(0, 255, 255)]).unwrap());
    assert!(Exporter::new(density).unwrap().with_color_maps(maps).is_ok());

    let objects = ExportConfigBuilder::new(object_mode())
        .output_dir("out")
        .build()
        .unwrap();
    assert!(
        Exporter::new(objects)
            .unwrap()
            .with_color_maps(ColorMapRegistry::empty())
            .is_ok()
    );
}
