use pdf_writer::{Name, Pdf, Ref};

/// The base-14 fonts every PDF viewer carries, so nothing needs embedding.
const STANDARD_FONTS: &[&str] = &[
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Courier",
    "Courier-Bold",
    "Courier-Oblique",
    "Courier-BoldOblique",
    "Symbol",
    "ZapfDingbats",
];

pub(crate) const DEFAULT_FONT: &str = "Helvetica";

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    pub(crate) base_font: &'static str,
    widths_1000: Vec<f32>,
}

impl FontEntry {
    /// Width of a single character in 1000-units, looked up through WinAnsi.
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        match char_to_winansi(ch) {
            Some(byte) if byte >= 32 => self.widths_1000[(byte - 32) as usize],
            _ => 0.0,
        }
    }

    pub(crate) fn word_width(&self, word: &str, font_size: f32) -> f32 {
        word.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub(crate) fn space_width(&self, font_size: f32) -> f32 {
        self.char_width_1000(' ') * font_size / 1000.0
    }
}

/// Resolve a paragraph font name to a base-14 font, case-insensitively.
/// `Arial` and `Times New Roman` style names map to their metric twins.
pub(crate) fn standard_font(name: &str) -> &'static str {
    let wanted = name.trim();
    if let Some(found) = STANDARD_FONTS
        .iter()
        .find(|f| f.eq_ignore_ascii_case(wanted))
    {
        return found;
    }
    match wanted.to_ascii_lowercase().as_str() {
        "arial" | "sans" | "sans-serif" => "Helvetica",
        "arial bold" | "arial-bold" => "Helvetica-Bold",
        "times" | "times new roman" | "serif" => "Times-Roman",
        "courier new" | "monospace" | "mono" => "Courier",
        _ => {
            log::warn!("Font not available: {name:?}, using {DEFAULT_FONT}");
            DEFAULT_FONT
        }
    }
}

/// Write a Type1 font object for `base_font` and return its metrics.
pub(crate) fn register_font(
    pdf: &mut Pdf,
    base_font: &'static str,
    pdf_name: String,
    alloc: &mut impl FnMut() -> Ref,
) -> FontEntry {
    let font_ref = alloc();
    let mut font = pdf.type1_font(font_ref);
    font.base_font(Name(base_font.as_bytes()));
    // Symbol and ZapfDingbats carry their own built-in encodings.
    if !matches!(base_font, "Symbol" | "ZapfDingbats") {
        font.encoding_predefined(Name(b"WinAnsiEncoding"));
    }
    drop(font);

    let widths_1000 = if base_font.starts_with("Courier") {
        vec![600.0; 224]
    } else {
        helvetica_widths()
    };
    log::debug!("register_font: {base_font} as /{pdf_name}");

    FontEntry {
        pdf_name,
        font_ref,
        base_font,
        widths_1000,
    }
}

/// WinAnsi code for `c`. Latin-1 maps to itself; the 0x80..=0x9F block holds
/// the typographic punctuation that prefill text tends to contain.
fn char_to_winansi(c: char) -> Option<u8> {
    let byte = match c as u32 {
        0x0000..=0x007F | 0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Prefill and field text as a PDF string in WinAnsi. Anything the code page
/// cannot hold is dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars().filter_map(char_to_winansi).collect()
}

/// Helvetica advance widths for printable ASCII (0x20..=0x7E), from the AFM.
#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Widths for WinAnsi codes 32..=255 at 1000 units/em. Codes above ASCII use
/// an average lowercase width, which is close enough for line breaking.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            0x20..=0x7E => f32::from(HELVETICA_ASCII[usize::from(b - 0x20)]),
            _ => 556.0,
        })
        .collect()
}
