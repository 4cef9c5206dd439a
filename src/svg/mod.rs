//! Geometry extraction from Inkscape drawings.
//!
//! A drawing is split into layers (top-level `<g inkscape:label="...">`), each
//! with one [`LayerRole`]. Layouts describe a whole spread, ladders describe a
//! single placeable sub-document. Both are converted to points and flipped so
//! y grows upwards from the bottom of the page.

mod ladder;
mod layout;
pub mod naming;
pub mod units;

use crate::error::Error;
use crate::model::{Dim, Point, Rect};

pub use ladder::parse_ladder;
pub use layout::parse_layout;
pub use naming::{Classified, LayerRole, classify};
pub use units::{parse_unit_value, scale_factor};

const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";
const SODIPODI_NS: &str = "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

/// Offset of a `translate(dx,dy)` transform. Anything else, including a
/// malformed translate, counts as no offset.
pub fn parse_translate_offset(transform: &str) -> (f32, f32) {
    const MARKER: &str = "translate";
    let Some(start) = transform.find(MARKER) else {
        return (0.0, 0.0);
    };
    let rest = &transform[start + MARKER.len()..];
    let (Some(open), Some(comma), Some(close)) = (rest.find('('), rest.find(','), rest.find(')'))
    else {
        return (0.0, 0.0);
    };
    if !(open < comma && comma < close) {
        return (0.0, 0.0);
    }
    match (
        rest[open + 1..comma].trim().parse::<f32>(),
        rest[comma + 1..close].trim().parse::<f32>(),
    ) {
        (Ok(dx), Ok(dy)) => (dx, dy),
        _ => (0.0, 0.0),
    }
}

/// Mirror `y` within `extent`; applying it twice gives `y` back.
pub fn flip_y(extent: f32, y: f32) -> f32 {
    extent - y
}

/// Conversion from raw drawing coordinates to the output frame.
pub(crate) struct Frame {
    sf: f32,
    left: f32,
    ytop: f32,
}

impl Frame {
    /// Page frame of a layout. Returns the frame together with the flipped
    /// reference anchor.
    pub(crate) fn new(height: f32, sf: f32, raw_reference: Point) -> (Frame, Point) {
        let reference = Point::new(sf * raw_reference.x, sf * raw_reference.y);
        let ytop = flip_y(height, reference.y);
        (Frame { sf, left: 0.0, ytop }, Point::new(reference.x, ytop))
    }

    /// Frame of a ladder, with its reference anchor at the origin so that
    /// content hangs below and to the right of wherever the ladder is placed.
    /// The returned point is the reference in the ladder's own page frame.
    pub(crate) fn anchored(height: f32, sf: f32, raw_reference: Point) -> (Frame, Point) {
        let reference = Point::new(sf * raw_reference.x, sf * raw_reference.y);
        let frame = Frame {
            sf,
            left: reference.x,
            ytop: reference.y,
        };
        (frame, Point::new(reference.x, flip_y(height, reference.y)))
    }

    pub(crate) fn point(&self, raw: Point) -> Point {
        Point::new(self.sf * raw.x - self.left, flip_y(self.ytop, self.sf * raw.y))
    }

    /// Raw boxes are anchored top-left with y down; the result is anchored
    /// bottom-left with y up.
    pub(crate) fn rect(&self, raw: &RawBox) -> Rect {
        Rect {
            corner: Point::new(
                self.sf * raw.x - self.left,
                flip_y(self.ytop, self.sf * (raw.y + raw.height)),
            ),
            dim: Dim::new(self.sf * raw.width, self.sf * raw.height),
        }
    }

    pub(crate) fn dim(&self, raw: Dim) -> Dim {
        raw.scaled(self.sf)
    }
}

/// A point from an anchors layer, with layer and element translation applied.
pub(crate) struct RawAnchor {
    pub(crate) title: String,
    pub(crate) desc: Option<String>,
    pub(crate) at: Point,
}

/// A `<rect>` from a box layer, in document user units.
pub(crate) struct RawBox {
    pub(crate) id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) desc: Option<String>,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

/// The root `<svg>` of a drawing plus what every builder needs from it.
pub(crate) struct Drawing<'a> {
    pub(crate) root: roxmltree::Node<'a, 'a>,
    pub(crate) id: String,
    pub(crate) dim: Dim,
    pub(crate) sf: f32,
}

pub(crate) fn as_text(input: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(input).map_err(|e| Error::InvalidSvg(format!("not UTF-8: {e}")))
}

impl<'a> Drawing<'a> {
    pub(crate) fn new(xml: &'a roxmltree::Document<'a>) -> Result<Self, Error> {
        let root = xml.root_element();
        if root.tag_name().name() != "svg" {
            return Err(Error::InvalidSvg(format!(
                "root element is <{}>, expected <svg>",
                root.tag_name().name()
            )));
        }
        let width = root
            .attribute("width")
            .ok_or_else(|| Error::InvalidSvg("missing width on <svg>".into()))?;
        let height = root
            .attribute("height")
            .ok_or_else(|| Error::InvalidSvg("missing height on <svg>".into()))?;
        let dim = Dim::new(parse_unit_value(width)?, parse_unit_value(height)?);

        let declared = root
            .children()
            .find(|n| n.tag_name().name() == "namedview" && n.tag_name().namespace() == Some(SODIPODI_NS))
            .and_then(|n| n.attribute((INKSCAPE_NS, "document-units")));

        Ok(Drawing {
            root,
            id: document_title(root).unwrap_or_default(),
            dim,
            sf: scale_factor(declared),
        })
    }

    /// Top-level layers with a recognised role, in document order.
    pub(crate) fn layers(&self) -> impl Iterator<Item = (LayerRole, roxmltree::Node<'a, 'a>)> + '_ {
        self.root
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "g")
            .filter_map(|g| {
                let label = g.attribute((INKSCAPE_NS, "label"))?;
                match LayerRole::from_label(label) {
                    Some(role) => Some((role, g)),
                    None => {
                        log::debug!("Ignoring layer {label:?}");
                        None
                    }
                }
            })
    }
}

fn document_title(root: roxmltree::Node) -> Option<String> {
    root.children()
        .find(|n| n.tag_name().name() == "metadata")?
        .descendants()
        .find(|n| n.tag_name().name() == "title" && n.tag_name().namespace() == Some(DC_NS))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
}

fn child_text(node: roxmltree::Node, name: &str) -> Option<String> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Text of the `<title>` child, the element's label in Inkscape.
pub(crate) fn element_title(node: roxmltree::Node) -> Option<String> {
    child_text(node, "title")
}

pub(crate) fn element_desc(node: roxmltree::Node) -> Option<String> {
    child_text(node, "desc")
}

fn describe(node: roxmltree::Node) -> String {
    match node.attribute("id") {
        Some(id) => format!("<{} id=\"{id}\">", node.tag_name().name()),
        None => format!("<{}>", node.tag_name().name()),
    }
}

/// Attribute by local name in any namespace (`cx` and `sodipodi:cx` alike).
fn any_ns_attr<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<&'a str> {
    node.attributes().find(|a| a.name() == name).map(|a| a.value())
}

fn number(node: roxmltree::Node, attribute: &'static str, raw: Option<&str>) -> Result<f32, Error> {
    let value = raw.unwrap_or_default();
    value.trim().parse::<f32>().map_err(|_| Error::Geometry {
        element: describe(node),
        attribute,
        value: value.to_string(),
    })
}

fn translation(node: roxmltree::Node) -> Point {
    let (dx, dy) = node
        .attribute("transform")
        .map(parse_translate_offset)
        .unwrap_or((0.0, 0.0));
    Point::new(dx, dy)
}

/// Elements of the given kinds anywhere under `layer`, including inside
/// groups, each paired with the summed translation of the layer and of every
/// group enclosing it.
fn shapes<'a, 'input>(
    layer: roxmltree::Node<'a, 'input>,
    kinds: &[&str],
) -> Vec<(roxmltree::Node<'a, 'input>, Point)> {
    fn walk<'a, 'input>(
        parent: roxmltree::Node<'a, 'input>,
        offset: Point,
        kinds: &[&str],
        out: &mut Vec<(roxmltree::Node<'a, 'input>, Point)>,
    ) {
        for node in parent.children().filter(|n| n.is_element()) {
            let name = node.tag_name().name();
            if name == "g" {
                walk(node, offset.translate(translation(node)), kinds, out);
            } else if kinds.contains(&name) {
                out.push((node, offset));
            }
        }
    }

    let mut out = Vec::new();
    walk(layer, translation(layer), kinds, &mut out);
    out
}

/// Titled points of an anchors layer. Untitled points are dropped with a
/// warning before any of their attributes are read.
pub(crate) fn collect_anchors(layer: roxmltree::Node) -> Result<Vec<RawAnchor>, Error> {
    let mut anchors = Vec::new();
    for (node, offset) in shapes(layer, &["path", "circle", "ellipse"]) {
        let Some(title) = element_title(node) else {
            log::warn!("Anchor {} has no title, ignoring it", describe(node));
            continue;
        };
        let x = number(node, "cx", any_ns_attr(node, "cx"))?;
        let y = number(node, "cy", any_ns_attr(node, "cy"))?;
        anchors.push(RawAnchor {
            title,
            desc: element_desc(node),
            at: Point::new(x, y).translate(translation(node)).translate(offset),
        });
    }
    Ok(anchors)
}

/// Every `<rect>` of a box layer, grouped or not. Position is only read when
/// `with_position`, since page and image boxes carry nothing but a size.
pub(crate) fn collect_boxes(layer: roxmltree::Node, with_position: bool) -> Result<Vec<RawBox>, Error> {
    let mut boxes = Vec::new();
    for (node, offset) in shapes(layer, &["rect"]) {
        let width = number(node, "width", node.attribute("width"))?;
        let height = number(node, "height", node.attribute("height"))?;
        let (x, y) = if with_position {
            let x = node.attribute("x").map_or(Ok(0.0), |v| number(node, "x", Some(v)))?;
            let y = node.attribute("y").map_or(Ok(0.0), |v| number(node, "y", Some(v)))?;
            let at = Point::new(x, y).translate(translation(node)).translate(offset);
            (at.x, at.y)
        } else {
            (0.0, 0.0)
        };
        boxes.push(RawBox {
            id: node.attribute("id").map(str::to_string),
            title: element_title(node),
            desc: element_desc(node),
            x,
            y,
            width,
            height,
        });
    }
    Ok(boxes)
}
