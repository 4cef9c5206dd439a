use crate::error::Error;
use crate::model::{Ladder, Paragraph, Point, TextField, TextPrefill};

use super::naming::{REFERENCE_ANCHOR, is_multiline, tab_sequence};
use super::{Drawing, Frame, LayerRole, RawBox, as_text, collect_anchors, collect_boxes};

/// Build a [`Ladder`] from the bytes of a sub-document drawing.
///
/// Field and prefill boxes are relative to the ladder's reference anchor
/// (y up, so content below the anchor has negative y). Text fields are
/// returned in tab order. A prefill's description, when it has
/// one, must be a JSON [`Paragraph`].
pub fn parse_ladder(input: &[u8]) -> Result<Ladder, Error> {
    let xml = roxmltree::Document::parse(as_text(input)?)?;
    let drawing = Drawing::new(&xml)?;

    let mut raw_reference = Point::default();
    let mut fields: Vec<(RawBox, String)> = Vec::new();
    let mut prefills: Vec<(RawBox, String, Paragraph)> = Vec::new();

    for (role, layer) in drawing.layers() {
        match role {
            LayerRole::Anchors => {
                for anchor in collect_anchors(layer)? {
                    if anchor.title == REFERENCE_ANCHOR {
                        raw_reference = anchor.at;
                    } else {
                        log::debug!("Ladder anchor {:?} is not used", anchor.title);
                    }
                }
            }
            LayerRole::TextFields => {
                for mut b in collect_boxes(layer, true)? {
                    let Some(title) = b.title.take() else {
                        log::warn!("Text field at ({:.2},{:.2}) has no title, ignoring it", b.x, b.y);
                        continue;
                    };
                    fields.push((b, title));
                }
            }
            LayerRole::Prefills => {
                for mut b in collect_boxes(layer, true)? {
                    let Some(title) = b.title.take() else {
                        log::warn!("Prefill at ({:.2},{:.2}) has no title, ignoring it", b.x, b.y);
                        continue;
                    };
                    let paragraph = match b.desc.as_deref() {
                        Some(desc) => serde_json::from_str::<Paragraph>(desc).map_err(|source| {
                            Error::PrefillDecode {
                                id: title.clone(),
                                source,
                            }
                        })?,
                        None => Paragraph::default(),
                    };
                    prefills.push((b, title, paragraph));
                }
            }
            LayerRole::Pages | LayerRole::Images => {
                log::debug!("Ladder has a {} layer; only layouts use it", role.label());
            }
        }
    }

    let (frame, reference_anchor) = Frame::anchored(drawing.dim.height, drawing.sf, raw_reference);

    let mut text_fields: Vec<TextField> = fields
        .into_iter()
        .map(|(b, title)| {
            // The tab marker normally lives in the element id; fall back to the title.
            let identifier = b.id.as_deref().unwrap_or_default();
            let tab = match tab_sequence(identifier) {
                0 => tab_sequence(&title),
                n => n,
            };
            TextField {
                rect: frame.rect(&b),
                multiline: is_multiline(identifier),
                prefill: b.desc.unwrap_or_default(),
                tab_sequence: tab,
                id: title,
            }
        })
        .collect();
    // sort_by_key is stable, so equal tabs keep document order
    text_fields.sort_by_key(|tf| tf.tab_sequence);

    let text_prefills = prefills
        .into_iter()
        .map(|(b, id, text)| TextPrefill {
            rect: frame.rect(&b),
            id,
            text,
        })
        .collect();

    Ok(Ladder {
        id: drawing.id,
        dim: drawing.dim,
        reference_anchor,
        text_fields,
        text_prefills,
    })
}
