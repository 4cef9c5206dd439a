use pdf_writer::{Content, Name, Str};

use crate::fonts::{FontEntry, to_winansi_bytes};
use crate::model::{Alignment, Paragraph, Rect};

/// Fraction of the font size above the baseline, used to place the first line.
const ASCENDER_RATIO: f32 = 0.75;

#[derive(Debug, PartialEq)]
pub(super) struct TextLine {
    pub(super) text: String,
    pub(super) width: f32,
    pub(super) words: usize,
    /// Last line of its paragraph; never justified.
    pub(super) ends_paragraph: bool,
}

/// Split `text` into lines. Hard breaks always split; when `max_width` is
/// given, words are also wrapped greedily. A word wider than the line gets a
/// line of its own.
pub(super) fn build_lines(
    text: &str,
    font: &FontEntry,
    font_size: f32,
    max_width: Option<f32>,
) -> Vec<TextLine> {
    let space = font.space_width(font_size);
    let mut lines = Vec::new();

    for hard_line in text.lines() {
        let Some(max_width) = max_width else {
            lines.push(TextLine {
                width: font.word_width(hard_line, font_size),
                text: hard_line.to_string(),
                words: hard_line.split_whitespace().count(),
                ends_paragraph: true,
            });
            continue;
        };

        let mut current = String::new();
        let mut width = 0.0f32;
        let mut words = 0usize;
        for word in hard_line.split_whitespace() {
            let w = font.word_width(word, font_size);
            if words > 0 && width + space + w > max_width {
                lines.push(TextLine {
                    text: std::mem::take(&mut current),
                    width,
                    words,
                    ends_paragraph: false,
                });
                width = 0.0;
                words = 0;
            }
            if words > 0 {
                current.push(' ');
                width += space;
            }
            current.push_str(word);
            width += w;
            words += 1;
        }
        lines.push(TextLine {
            text: current,
            width,
            words,
            ends_paragraph: true,
        });
    }
    lines
}

/// Draw a prefill paragraph inside `rect`.
///
/// Text flows down from the top of the box, inside its margins. With absolute
/// positioning the first baseline sits on the box corner instead. A non-zero
/// angle rotates the whole paragraph counter-clockwise about the corner.
pub(super) fn render_paragraph(content: &mut Content, rect: &Rect, para: &Paragraph, font: &FontEntry) {
    if para.text.trim().is_empty() {
        return;
    }
    let size = para.text_size;
    let text_width = (rect.dim.width - para.margin_left - para.margin_right).max(0.0);
    let max_width = para.wrap.then(|| {
        if para.wrap_width > 0.0 {
            para.wrap_width
        } else {
            text_width
        }
    });
    let lines = build_lines(&para.text, font, size, max_width);
    let box_width = max_width.unwrap_or(text_width);
    let pitch = size * para.line_height;

    // Local frame: origin at the box corner, rotated by the paragraph angle.
    let (sin, cos) = para.angle.to_radians().sin_cos();
    content.save_state();
    content.transform([cos, sin, -sin, cos, rect.corner.x, rect.corner.y]);

    if let Some([r, g, b]) = para.rgb() {
        content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    } else {
        content.set_fill_gray(0.0);
    }

    let first_baseline = if para.absolute_positioning {
        para.margin_bottom
    } else {
        rect.dim.height - para.margin_top - size * ASCENDER_RATIO
    };

    content.begin_text();
    content.set_font(Name(font.pdf_name.as_bytes()), size);
    let mut td_x = 0.0f32;
    let mut td_y = 0.0f32;
    let mut word_spacing = 0.0f32;
    for (i, line) in lines.iter().enumerate() {
        let x = para.margin_left
            + match para.alignment {
                Alignment::Center => (box_width - line.width) / 2.0,
                Alignment::Right => box_width - line.width,
                Alignment::Left | Alignment::Justify => 0.0,
            };
        let y = first_baseline - i as f32 * pitch;

        let spacing = if para.alignment == Alignment::Justify && !line.ends_paragraph && line.words > 1 {
            (box_width - line.width).max(0.0) / (line.words - 1) as f32
        } else {
            0.0
        };
        if spacing != word_spacing {
            content.set_word_spacing(spacing);
            word_spacing = spacing;
        }

        content.next_line(x - td_x, y - td_y);
        td_x = x;
        td_y = y;
        content.show(Str(&to_winansi_bytes(&line.text)));
    }
    content.end_text();
    content.restore_state();
}
