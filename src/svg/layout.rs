use std::collections::BTreeMap;

use crate::error::Error;
use crate::model::{Dim, Layout, Point};

use super::naming::{REFERENCE_ANCHOR, classify};
use super::{Drawing, Frame, LayerRole, as_text, collect_anchors, collect_boxes};

/// Build a [`Layout`] from the bytes of a layout drawing.
///
/// Anchors come from the `anchors` layer (the reference point is kept apart
/// from the rest, and an anchor's description names the file placed there),
/// page sizes from `pages` and image sizes from `images`. Any unparsable
/// numeral aborts the whole layout.
pub fn parse_layout(input: &[u8]) -> Result<Layout, Error> {
    let xml = roxmltree::Document::parse(as_text(input)?)?;
    let drawing = Drawing::new(&xml)?;

    let mut raw_reference = Point::default();
    let mut anchors = BTreeMap::new();
    let mut filenames = BTreeMap::new();
    let mut page_dim_static = BTreeMap::new();
    let mut page_dim_dynamic = BTreeMap::new();
    let mut image_dim_static = BTreeMap::new();
    let mut image_dim_dynamic = BTreeMap::new();

    for (role, layer) in drawing.layers() {
        match role {
            LayerRole::Anchors => {
                for anchor in collect_anchors(layer)? {
                    if anchor.title == REFERENCE_ANCHOR {
                        raw_reference = anchor.at;
                        continue;
                    }
                    if let Some(desc) = anchor.desc {
                        filenames.insert(anchor.title.clone(), desc);
                    }
                    anchors.insert(anchor.title, anchor.at);
                }
            }
            LayerRole::Pages | LayerRole::Images => {
                let (statics, dynamics) = if role == LayerRole::Pages {
                    (&mut page_dim_static, &mut page_dim_dynamic)
                } else {
                    (&mut image_dim_static, &mut image_dim_dynamic)
                };
                for b in collect_boxes(layer, false)? {
                    let Some(title) = b.title else {
                        log::warn!(
                            "Box of size ({:.2},{:.2}) on the {} layer has no title, ignoring it",
                            b.width,
                            b.height,
                            role.label()
                        );
                        continue;
                    };
                    let Some(class) = classify(role, &title) else {
                        log::warn!("Box {title:?} on the {} layer has no name, ignoring it", role.label());
                        continue;
                    };
                    match class.dynamic {
                        Some(axis) => {
                            dynamics.insert(class.name, Dim::dynamic(b.width, b.height, axis));
                        }
                        None => {
                            statics.insert(class.name, Dim::new(b.width, b.height));
                        }
                    }
                }
            }
            LayerRole::TextFields | LayerRole::Prefills => {
                log::debug!("Layout has a {} layer; only ladders use it", role.label());
            }
        }
    }

    let (frame, reference_anchor) = Frame::new(drawing.dim.height, drawing.sf, raw_reference);
    let scale_all = |map: BTreeMap<String, Dim>| -> BTreeMap<String, Dim> {
        map.into_iter().map(|(k, v)| (k, frame.dim(v))).collect()
    };

    Ok(Layout {
        id: drawing.id,
        dim: drawing.dim,
        reference_anchor,
        anchors: anchors
            .into_iter()
            .map(|(k, v)| (k, frame.point(v)))
            .collect(),
        page_dim_static: scale_all(page_dim_static),
        page_dim_dynamic: scale_all(page_dim_dynamic),
        image_dim_static: scale_all(image_dim_static),
        image_dim_dynamic: scale_all(image_dim_dynamic),
        filenames,
    })
}
