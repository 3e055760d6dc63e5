use super::*;

fn tiny() -> image::RgbaImage {
    image::RgbaImage::from_pixel(4, 3, image::Rgba([200, 100, 50, 255]))
}

#[test]
fn file_stems_drop_path_separators() {
    assert_eq!(file_stem("a/b\\c:d"), "a_b_c_d");
    assert_eq!(file_stem("slide 1.svs"), "slide 1.svs");
    assert_eq!(file_stem(".."), "figure");
}

#[test]
fn directory_sink_writes_every_format() {
    let tmp = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(tmp.path().join("nested/out")).unwrap();
    for format in [RasterFormat::Png, RasterFormat::Jpeg, RasterFormat::Tiff] {
        let name = sink
            .write_figure(
                "slide",
                &FigurePayload::Raster {
                    image: tiny(),
                    format,
                },
            )
            .unwrap();
        let decoded = image::open(sink.dir().join(&name)).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }
    let png = image::open(sink.dir().join("slide.png")).unwrap().to_rgba8();
    assert_eq!(png.get_pixel(1, 1).0, [200, 100, 50, 255]);

    let name = sink
        .write_figure("slide", &FigurePayload::Vector("<svg/>".to_owned()))
        .unwrap();
    assert_eq!(name, "slide.svg");
    assert_eq!(std::fs::read_to_string(sink.dir().join(name)).unwrap(), "<svg/>");

    let name = sink.write_sidecar("slide", "{}").unwrap();
    assert!(sink.dir().join(name).is_file());
}

#[test]
fn memory_sink_records_names_in_order() {
    let mut sink = MemorySink::new();
    sink.write_figure("a", &FigurePayload::Vector(String::new())).unwrap();
    sink.write_figure(
        "b",
        &FigurePayload::Raster {
            image: tiny(),
            format: RasterFormat::Jpeg,
        },
    )
    .unwrap();
    assert_eq!(sink.names(), vec!["a.svg", "b.jpg"]);
}

#[test]
fn sidecar_serializes_region_and_omits_empty_channels() {
    let sidecar = Sidecar {
        image: "slide".to_owned(),
        width: 100,
        height: 50,
        pixel_size_um: Some(0.5),
        effective_downsample: 2.0,
        mode: "object-overlay".to_owned(),
        channels: Vec::new(),
        outputs: vec![SidecarOutput {
            file: "slide.png".to_owned(),
            region: Region::full(100, 50, 2.0).unwrap(),
        }],
    };
    let value: serde_json::Value = serde_json::from_str(&sidecar.to_json().unwrap()).unwrap();
    assert_eq!(value["outputs"][0]["region"]["width"], 100);
    assert_eq!(value["pixel_size_um"], 0.5);
    assert!(value.get("channels").is_none());
}
