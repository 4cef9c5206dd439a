#![allow(dead_code)]

use std::path::Path;

pub const EPS: f32 = 1e-3;

/// Route `log` output through the test harness; `RUST_LOG=warn` shows skipped elements.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {expected}, got {actual}"
    );
}

/// An Inkscape-style document: `width`/`height` carry units, `units` goes on
/// the namedview, `layers` are already-rendered `<g>` elements.
pub fn svg_doc(width: &str, height: &str, units: Option<&str>, layers: &[String]) -> String {
    let namedview = match units {
        Some(u) => format!(r#"<sodipodi:namedview id="base" inkscape:document-units="{u}"/>"#),
        None => String::new(),
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd"
     xmlns:dc="http://purl.org/dc/elements/1.1/"
     xmlns:cc="http://creativecommons.org/ns#"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     width="{width}" height="{height}">
  {namedview}
  <metadata><rdf:RDF><cc:Work rdf:about=""><dc:title>test-doc</dc:title></cc:Work></rdf:RDF></metadata>
  {}
</svg>"#,
        layers.join("\n  ")
    )
}

pub fn layer(label: &str, transform: Option<&str>, body: &[String]) -> String {
    let transform = transform
        .map(|t| format!(r#" transform="{t}""#))
        .unwrap_or_default();
    format!(
        r#"<g inkscape:groupmode="layer" inkscape:label="{label}"{transform}>{}</g>"#,
        body.join("")
    )
}

fn meta(title: Option<&str>, desc: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(t) = title {
        out.push_str(&format!("<title>{t}</title>"));
    }
    if let Some(d) = desc {
        out.push_str(&format!("<desc>{d}</desc>"));
    }
    out
}

pub fn anchor(title: Option<&str>, cx: f32, cy: f32, desc: Option<&str>) -> String {
    format!(
        r#"<circle cx="{cx}" cy="{cy}" r="1">{}</circle>"#,
        meta(title, desc)
    )
}

/// A sizing box for the pages or images layer.
pub fn size_box(title: Option<&str>, width: f32, height: f32) -> String {
    format!(
        r#"<rect x="0" y="0" width="{width}" height="{height}">{}</rect>"#,
        meta(title, None)
    )
}

pub fn field_box(
    id: &str,
    title: Option<&str>,
    desc: Option<&str>,
    (x, y, w, h): (f32, f32, f32, f32),
) -> String {
    format!(
        r#"<rect id="{id}" x="{x}" y="{y}" width="{w}" height="{h}">{}</rect>"#,
        meta(title, desc)
    )
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
    img.save(path).expect("write png");
}

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 40, 200]));
    img.save(path).expect("write jpeg");
}
