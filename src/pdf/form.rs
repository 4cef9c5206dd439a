use pdf_writer::types::{AnnotationFlags, FieldFlags, FieldType};
use pdf_writer::{Pdf, Rect, Ref, Str, TextStr};

use crate::model::TextField;

/// Resource name of the font text widgets draw with.
pub(super) const FIELD_FONT: &str = "Helv";
const DEFAULT_APPEARANCE: &[u8] = b"/Helv 0 Tf 0 g";

/// Fully qualified field name: fields of every page share one form, so the
/// page number keeps them apart.
pub fn field_name(page_number: u32, id: &str) -> String {
    format!("page-{page_number:03}-{id}")
}

/// Write one text field with its widget annotation at `field_ref`.
pub(super) fn write_text_field(pdf: &mut Pdf, field_ref: Ref, page_number: u32, tf: &TextField) {
    let name = field_name(page_number, &tf.id);
    let mut field = pdf.form_field(field_ref);
    field
        .partial_name(TextStr(&name))
        .field_type(FieldType::Text)
        .vartext_default_appearance(Str(DEFAULT_APPEARANCE));
    if !tf.prefill.is_empty() {
        field.text_value(TextStr(&tf.prefill));
    }
    if tf.multiline {
        field.field_flags(FieldFlags::MULTILINE);
    }

    let r = &tf.rect;
    let mut annot = field.into_annotation();
    annot
        .rect(Rect::new(
            r.corner.x,
            r.corner.y,
            r.corner.x + r.dim.width,
            r.top(),
        ))
        .flags(AnnotationFlags::PRINT);
}

/// Default appearance string shared by the form dictionary.
pub(super) fn default_appearance() -> Str<'static> {
    Str(DEFAULT_APPEARANCE)
}
