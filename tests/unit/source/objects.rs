use super::*;

const SAMPLE: &str = r##"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "id": "a1",
      "geometry": {"type": "Polygon", "coordinates": [[[10, 10], [50, 10], [50, 40], [10, 40], [10, 10]]]},
      "properties": {"objectType": "annotation", "classification": {"name": "Tumor", "color": [200, 0, 0]}}
    },
    {
      "type": "Feature",
      "id": 7,
      "geometry": {"type": "Point", "coordinates": [100, 100]},
      "properties": {"objectType": "detection", "classification": {"name": "Stroma", "color": "#00ff00"}}
    },
    {
      "type": "Feature",
      "geometry": {"type": "LineString", "coordinates": [[0, 0], [5, 5, 0]]},
      "properties": {}
    },
    {
      "type": "Feature",
      "geometry": {"type": "GeometryCollection", "geometries": []},
      "properties": {}
    }
  ]
}"##;

#[test]
fn geojson_features_become_shapes() {
    let src = VecObjectSource::from_geojson_str(SAMPLE).unwrap();
    let shapes = src.shapes(&ClassFilter::all()).unwrap();
    assert_eq!(shapes.len(), 3);

    assert_eq!(shapes[0].id, "a1");
    assert_eq!(shapes[0].kind, ObjectKind::Annotation);
    assert_eq!(shapes[0].class_name(), "Tumor");
    assert_eq!(shapes[0].style.stroke, Color::rgb(200, 0, 0));
    assert_eq!(shapes[0].bounds(), Rect::new(10.0, 10.0, 50.0, 40.0));

    assert_eq!(shapes[1].id, "7");
    assert_eq!(shapes[1].kind, ObjectKind::Detection);
    assert_eq!(shapes[1].style.stroke, Color::rgb(0, 255, 0));

    assert_eq!(shapes[2].id, "object3");
    assert_eq!(shapes[2].class_name(), UNCLASSIFIED);
    assert_eq!(shapes[2].style.stroke, DEFAULT_STROKE);
}

#[test]
fn filter_selects_by_class_name() {
    let src = VecObjectSource::from_geojson_str(SAMPLE).unwrap();
    let tumor = src.shapes(&ClassFilter::only(["Tumor"])).unwrap();
    assert_eq!(tumor.len(), 1);
    let unclassified = src.shapes(&ClassFilter::only([UNCLASSIFIED])).unwrap();
    assert_eq!(unclassified.len(), 1);
    assert_eq!(unclassified[0].id, "object3");
}

#[test]
fn bare_feature_arrays_are_accepted() {
    let text = r#"[{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":null}]"#;
    let src = VecObjectSource::from_geojson_str(text).unwrap();
    assert_eq!(src.shapes(&ClassFilter::all()).unwrap().len(), 1);
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(
        VecObjectSource::from_geojson_str("{not json"),
        Err(SlidefigError::Serde(_))
    ));
}

#[test]
fn fill_defaults_to_translucent_stroke() {
    let style = ShapeStyle::from_class_color(Color::rgb(1, 2, 3));
    assert_eq!(style.fill, Color::new(1, 2, 3, 64));
}
