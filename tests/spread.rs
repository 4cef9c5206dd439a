mod common;

use std::collections::{BTreeMap, HashMap};

use svg_spread::model::{
    Axis, Dim, Ladder, Layout, Paragraph, Point, PreviousImage, Rect, TextField, TextPrefill,
};
use svg_spread::svg::parse_layout;
use svg_spread::{Error, apply_overrides, compose};

use common::{anchor, assert_close, init_logging, layer, size_box, svg_doc};

fn no_ladders() -> BTreeMap<String, Ladder> {
    BTreeMap::new()
}

fn layout() -> Layout {
    Layout {
        dim: Dim::new(600.0, 800.0),
        reference_anchor: Point::new(0.0, 800.0),
        ..Default::default()
    }
}

fn previous(width: f32, height: f32) -> PreviousImage {
    PreviousImage {
        filename: "scan.png".into(),
        width,
        height,
    }
}

fn ladder() -> Ladder {
    Ladder {
        id: "flow".into(),
        dim: Dim::new(100.0, 50.0),
        reference_anchor: Point::new(0.0, 50.0),
        text_fields: vec![TextField {
            id: "answer".into(),
            rect: Rect {
                corner: Point::new(10.0, -45.0),
                dim: Dim::new(80.0, 20.0),
            },
            prefill: String::new(),
            tab_sequence: 1,
            multiline: false,
        }],
        text_prefills: vec![TextPrefill {
            id: "label".into(),
            rect: Rect {
                corner: Point::new(0.0, -20.0),
                dim: Dim::new(100.0, 20.0),
            },
            text: Paragraph {
                text: "Mark".into(),
                ..Default::default()
            },
        }],
    }
}

#[test]
fn static_page_is_used_verbatim() {
    let mut layout = layout();
    layout.page_dim_static.insert("mark".into(), Dim::new(100.0, 200.0));

    let spread = compose(&layout, "mark", &no_ladders(), None).unwrap();
    assert_eq!(spread.dim, Dim::new(100.0, 200.0));
    assert_eq!(spread.extra, 0.0);
    assert_eq!(spread.dynamic_axis, None);
    assert!(spread.images.is_empty());
    assert!(spread.previous_image.is_none());
}

#[test]
fn dynamic_page_with_static_image_resolves_immediately() {
    let mut layout = layout();
    layout
        .page_dim_dynamic
        .insert("check".into(), Dim::dynamic(0.0, 50.0, Axis::Width));
    layout.image_dim_static.insert("check".into(), Dim::new(20.0, 50.0));

    let spread = compose(&layout, "check", &no_ladders(), None).unwrap();
    assert_eq!(spread.dim, Dim::new(20.0, 50.0));
    assert_eq!(spread.dynamic_axis, Some(Axis::Width));
    assert_eq!(spread.extra, 20.0);
}

#[test]
fn mismatched_dynamic_axes_fail() {
    let mut layout = layout();
    layout
        .page_dim_dynamic
        .insert("mark".into(), Dim::dynamic(0.0, 300.0, Axis::Width));
    layout
        .image_dim_dynamic
        .insert("previous-mark".into(), Dim::dynamic(200.0, 0.0, Axis::Height));

    match compose(&layout, "mark", &no_ladders(), Some(&previous(10.0, 10.0))) {
        Err(Error::AxisMismatch { spread, page, image }) => {
            assert_eq!(spread, "mark");
            assert_eq!(page, Some(Axis::Width));
            assert_eq!(image, Some(Axis::Height));
        }
        other => panic!("expected an axis mismatch, got {other:?}"),
    }
}

#[test]
fn static_page_with_dynamic_image_fails() {
    let mut layout = layout();
    layout.page_dim_static.insert("mark".into(), Dim::new(100.0, 100.0));
    layout
        .image_dim_dynamic
        .insert("previous-mark".into(), Dim::dynamic(0.0, 100.0, Axis::Width));

    assert!(matches!(
        compose(&layout, "mark", &no_ladders(), None),
        Err(Error::AxisMismatch { page: None, image: Some(Axis::Width), .. })
    ));
}

#[test]
fn missing_page_size_fails() {
    assert!(matches!(
        compose(&layout(), "mark", &no_ladders(), None),
        Err(Error::NoPageSize(name)) if name == "mark"
    ));
}

#[test]
fn decorative_image_without_size_fails() {
    let mut layout = layout();
    layout.page_dim_static.insert("mark".into(), Dim::new(100.0, 200.0));
    layout.anchors.insert("logo-mark".into(), Point::new(5.0, 150.0));
    layout.filenames.insert("logo-mark".into(), "logo".into());

    assert!(matches!(
        compose(&layout, "mark", &no_ladders(), None),
        Err(Error::MissingImageSize(name)) if name == "logo-mark"
    ));

    layout.image_dim_static.insert("logo-mark".into(), Dim::new(40.0, 20.0));
    let spread = compose(&layout, "mark", &no_ladders(), None).unwrap();
    assert_eq!(spread.images.len(), 1);
    assert_eq!(spread.images[0].filename, "logo.jpg");
    // the anchor marks the image's top-left
    assert_eq!(spread.images[0].corner, Point::new(5.0, 130.0));
    assert_eq!(spread.images[0].dim, Dim::new(40.0, 20.0));
}

#[test]
fn ladders_hang_from_their_anchor() {
    init_logging();
    let mut layout = layout();
    layout.page_dim_static.insert("mark".into(), Dim::new(600.0, 800.0));
    layout.anchors.insert("svg-mark-flow".into(), Point::new(100.0, 400.0));
    layout.filenames.insert("svg-mark-flow".into(), "flow".into());
    layout.filenames.insert("svg-mark-side".into(), "side".into());

    let mut ladders = BTreeMap::new();
    ladders.insert("svg-mark-flow".to_string(), ladder());
    ladders.insert("svg-other-flow".to_string(), ladder());

    let spread = compose(&layout, "mark", &ladders, None).unwrap();

    assert_eq!(spread.images.len(), 1);
    let chrome = &spread.images[0];
    assert_eq!(chrome.name, "svg-mark-flow");
    assert_eq!(chrome.filename, "flow.png");
    assert_eq!(chrome.corner, Point::new(100.0, 350.0));
    assert_eq!(chrome.dim, Dim::new(100.0, 50.0));

    assert_eq!(spread.text_fields.len(), 1);
    assert_eq!(spread.text_fields[0].rect.corner, Point::new(110.0, 355.0));
    assert_eq!(spread.text_prefills.len(), 1);
    assert_eq!(spread.text_prefills[0].rect.corner, Point::new(100.0, 380.0));
    // the chrome's top edge sits on the anchor
    assert_eq!(chrome.corner.y + chrome.dim.height, 400.0);
}

#[test]
fn ladder_without_anchor_uses_the_reference() {
    let mut layout = layout();
    layout.page_dim_static.insert("mark".into(), Dim::new(600.0, 800.0));

    let mut ladders = BTreeMap::new();
    ladders.insert("svg-mark-flow".to_string(), ladder());

    let spread = compose(&layout, "mark", &ladders, None).unwrap();
    assert_eq!(spread.images[0].corner, Point::new(0.0, 750.0));
    assert_eq!(spread.images[0].filename, "svg-mark-flow.png");
    assert_eq!(spread.text_fields[0].rect.corner, Point::new(10.0, 755.0));
}

#[test]
fn deferred_width_is_resolved_from_the_previous_image() {
    let mut layout = layout();
    layout
        .page_dim_dynamic
        .insert("mark".into(), Dim::dynamic(150.0, 400.0, Axis::Width));
    layout
        .image_dim_dynamic
        .insert("previous-mark".into(), Dim::dynamic(0.0, 400.0, Axis::Width));
    layout.anchors.insert("img-previous-mark".into(), Point::new(0.0, 400.0));
    layout.anchors.insert("svg-mark-side".into(), Point::new(10.0, 100.0));

    let mut ladders = BTreeMap::new();
    ladders.insert("svg-mark-side".to_string(), ladder());

    // 600x800 scan scaled to the 400pt height is 300pt wide.
    let spread = compose(&layout, "mark", &ladders, Some(&previous(600.0, 800.0))).unwrap();
    assert_close(spread.dim.width, 450.0);
    assert_close(spread.dim.height, 400.0);
    assert!(spread.dim.is_static());
    assert_close(spread.extra, 300.0);

    let prev = spread.previous_image.as_ref().unwrap();
    assert_eq!(prev.filename, "scan.png");
    assert_eq!(prev.corner, Point::new(0.0, 0.0));
    assert_close(prev.dim.width, 300.0);
    assert_close(prev.dim.height, 400.0);

    // Everything else moves right to make room for the scan.
    assert_close(spread.images[0].corner.x, 310.0);
    assert_close(spread.images[0].corner.y, 50.0);
    assert_close(spread.text_fields[0].rect.corner.x, 320.0);
    assert_close(spread.text_prefills[0].rect.corner.x, 310.0);
}

#[test]
fn deferred_height_grows_the_page_upwards() {
    let mut layout = layout();
    layout
        .page_dim_dynamic
        .insert("mark".into(), Dim::dynamic(300.0, 20.0, Axis::Height));
    layout.anchors.insert("logo-mark".into(), Point::new(0.0, 20.0));
    layout.anchors.insert("img-previous-mark".into(), Point::new(0.0, 150.0));
    layout.filenames.insert("logo-mark".into(), "logo".into());
    layout.image_dim_static.insert("logo-mark".into(), Dim::new(300.0, 20.0));

    // No previous-image size entry: the page's own width is the target.
    let spread = compose(&layout, "mark", &no_ladders(), Some(&previous(100.0, 50.0))).unwrap();
    assert_close(spread.dim.width, 300.0);
    assert_close(spread.dim.height, 170.0);
    assert_close(spread.extra, 150.0);
    assert_eq!(spread.dynamic_axis, Some(Axis::Height));
    assert_close(spread.images[0].corner.y, 150.0);
    let prev = spread.previous_image.as_ref().unwrap();
    assert_close(prev.dim.height, 150.0);
    assert_eq!(prev.corner, Point::new(0.0, 0.0));
}

#[test]
fn deferred_axis_scales_to_the_page_not_the_image_box() {
    let mut layout = layout();
    layout
        .page_dim_dynamic
        .insert("mark".into(), Dim::dynamic(150.0, 400.0, Axis::Width));
    // The image box is drawn shorter than the page; only its axis matters.
    layout
        .image_dim_dynamic
        .insert("previous-mark".into(), Dim::dynamic(0.0, 200.0, Axis::Width));

    let spread = compose(&layout, "mark", &no_ladders(), Some(&previous(600.0, 800.0))).unwrap();
    assert_close(spread.extra, 300.0);
    assert_close(spread.dim.width, 450.0);
    assert_close(spread.dim.height, 400.0);
    let prev = spread.previous_image.unwrap();
    assert_close(prev.dim.width, 300.0);
    assert_close(prev.dim.height, 400.0);
}

#[test]
fn deferred_axis_without_previous_image_keeps_page_delta() {
    let mut layout = layout();
    layout
        .page_dim_dynamic
        .insert("mark".into(), Dim::dynamic(150.0, 400.0, Axis::Width));

    let spread = compose(&layout, "mark", &no_ladders(), None).unwrap();
    assert_eq!(spread.dim, Dim::new(150.0, 400.0));
    assert_eq!(spread.extra, 0.0);
    assert!(spread.previous_image.is_none());
}

#[test]
fn static_previous_image_fits_its_box() {
    let mut layout = layout();
    layout.page_dim_static.insert("mark".into(), Dim::new(600.0, 800.0));
    layout
        .image_dim_static
        .insert("previous-mark".into(), Dim::new(400.0, 500.0));

    // Tall image: fitting the height keeps it inside the width.
    let spread = compose(&layout, "mark", &no_ladders(), Some(&previous(100.0, 250.0))).unwrap();
    let dim = spread.previous_image.unwrap().dim;
    assert_close(dim.width, 200.0);
    assert_close(dim.height, 500.0);

    // Wide image: fitting the height would overflow, so fit the width.
    let spread = compose(&layout, "mark", &no_ladders(), Some(&previous(800.0, 200.0))).unwrap();
    let dim = spread.previous_image.unwrap().dim;
    assert_close(dim.width, 400.0);
    assert_close(dim.height, 100.0);

    assert_eq!(spread.dim, Dim::new(600.0, 800.0));
    assert_eq!(spread.extra, 0.0);
}

#[test]
fn empty_previous_image_fails() {
    let mut layout = layout();
    layout.page_dim_static.insert("mark".into(), Dim::new(600.0, 800.0));
    assert!(matches!(
        compose(&layout, "mark", &no_ladders(), Some(&previous(0.0, 10.0))),
        Err(Error::EmptyImage(_))
    ));
}

#[test]
fn exact_page_key_beats_containing_key() {
    let mut layout = layout();
    layout.page_dim_static.insert("mark".into(), Dim::new(1.0, 1.0));
    layout.page_dim_static.insert("mark-extra".into(), Dim::new(2.0, 2.0));
    layout
        .page_dim_static
        .insert("a-mark".into(), Dim::new(3.0, 3.0));

    let spread = compose(&layout, "mark", &no_ladders(), None).unwrap();
    assert_eq!(spread.dim, Dim::new(1.0, 1.0));

    layout.page_dim_static.remove("mark");
    let spread = compose(&layout, "mark", &no_ladders(), None).unwrap();
    assert_eq!(spread.dim, Dim::new(3.0, 3.0));
}

#[test]
fn overrides_replace_prefill_text_and_decorative_files() {
    let mut layout = layout();
    layout.page_dim_static.insert("mark".into(), Dim::new(600.0, 800.0));
    layout.filenames.insert("logo-mark".into(), "logo".into());
    layout.image_dim_static.insert("logo-mark".into(), Dim::new(40.0, 20.0));
    layout.filenames.insert("svg-mark-flow".into(), "flow".into());

    let mut ladders = BTreeMap::new();
    ladders.insert("svg-mark-flow".to_string(), ladder());
    let mut spread = compose(&layout, "mark", &ladders, None).unwrap();

    let prefills = HashMap::from([("label".to_string(), "Total".to_string())]);
    let images = HashMap::from([
        ("logo-mark".to_string(), "crest".to_string()),
        ("svg-mark-flow".to_string(), "ignored".to_string()),
    ]);
    apply_overrides(&mut spread, &prefills, &images);

    assert_eq!(spread.text_prefills[0].text.text, "Total");
    let files: Vec<&str> = spread.images.iter().map(|i| i.filename.as_str()).collect();
    assert_eq!(files, ["flow.png", "crest.jpg"]);
}

#[test]
fn parsed_layout_composes_end_to_end() {
    let doc = svg_doc(
        "100pt",
        "200pt",
        Some("pt"),
        &[
            layer(
                "anchors",
                None,
                &[anchor(Some("svg-mark-flow"), 20.0, 100.0, Some("flow"))],
            ),
            layer(
                "pages",
                None,
                &[size_box(Some("page-static-mark"), 100.0, 200.0)],
            ),
        ],
    );
    let layout = parse_layout(doc.as_bytes()).unwrap();
    let mut ladders = BTreeMap::new();
    ladders.insert("svg-mark-flow".to_string(), ladder());

    let spread = compose(&layout, "mark", &ladders, None).unwrap();
    assert_eq!(spread.dim, Dim::new(100.0, 200.0));
    assert_eq!(spread.images[0].corner, Point::new(20.0, 50.0));
    assert_eq!(spread.text_fields[0].rect.corner, Point::new(30.0, 55.0));
}
