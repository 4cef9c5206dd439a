use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn translate(self, by: Point) -> Point {
        Point {
            x: self.x + by.x,
            y: self.y + by.y,
        }
    }

    /// Move along `axis` (x for width, y for height).
    pub fn shift(self, axis: Axis, amount: f32) -> Point {
        match axis {
            Axis::Width => Point::new(self.x + amount, self.y),
            Axis::Height => Point::new(self.x, self.y + amount),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::Width => Axis::Height,
            Axis::Height => Axis::Width,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dim {
    pub width: f32,
    pub height: f32,
    pub width_is_dynamic: bool,
    pub height_is_dynamic: bool,
}

impl Dim {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// A Dim whose `axis` is resolved only once the previous-stage image is measured.
    pub fn dynamic(width: f32, height: f32, axis: Axis) -> Self {
        Self {
            width,
            height,
            width_is_dynamic: axis == Axis::Width,
            height_is_dynamic: axis == Axis::Height,
        }
    }

    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Width => self.width = value,
            Axis::Height => self.height = value,
        }
    }

    /// Width wins if both flags are set; page and image entries never carry both.
    pub fn dynamic_axis(&self) -> Option<Axis> {
        if self.width_is_dynamic {
            Some(Axis::Width)
        } else if self.height_is_dynamic {
            Some(Axis::Height)
        } else {
            None
        }
    }

    pub fn is_static(&self) -> bool {
        self.dynamic_axis().is_none()
    }

    pub fn scaled(&self, sf: f32) -> Dim {
        Dim {
            width: self.width * sf,
            height: self.height * sf,
            ..*self
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Lower-left corner in the output frame.
    pub corner: Point,
    pub dim: Dim,
}

impl Rect {
    pub fn top(&self) -> f32 {
        self.corner.y + self.dim.height
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub id: String,
    pub dim: Dim,
    pub reference_anchor: Point,
    pub anchors: BTreeMap<String, Point>,
    pub page_dim_static: BTreeMap<String, Dim>,
    pub page_dim_dynamic: BTreeMap<String, Dim>,
    pub image_dim_static: BTreeMap<String, Dim>,
    pub image_dim_dynamic: BTreeMap<String, Dim>,
    pub filenames: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ladder {
    pub id: String,
    pub dim: Dim,
    /// Reference anchor in the ladder's own page frame. Field and prefill
    /// rects are relative to it.
    pub reference_anchor: Point,
    /// Sorted by tab sequence, ties in document order.
    pub text_fields: Vec<TextField>,
    pub text_prefills: Vec<TextPrefill>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextField {
    pub id: String,
    pub rect: Rect,
    pub prefill: String,
    pub tab_sequence: i64,
    pub multiline: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPrefill {
    pub id: String,
    pub rect: Rect,
    pub text: Paragraph,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Style descriptor stored as JSON in a prefill box's description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paragraph {
    #[serde(alias = "Text")]
    pub text: String,
    #[serde(alias = "Font")]
    pub font: String,
    #[serde(alias = "TextSize")]
    pub text_size: f32,
    #[serde(alias = "LineHeight")]
    pub line_height: f32,
    #[serde(alias = "Alignment")]
    pub alignment: Alignment,
    #[serde(alias = "Wrap")]
    pub wrap: bool,
    #[serde(alias = "WrapWidth")]
    pub wrap_width: f32,
    #[serde(alias = "Angle")]
    pub angle: f32, // degrees, counter-clockwise
    #[serde(alias = "MarginLeft")]
    pub margin_left: f32,
    #[serde(alias = "MarginRight")]
    pub margin_right: f32,
    #[serde(alias = "MarginTop")]
    pub margin_top: f32,
    #[serde(alias = "MarginBottom")]
    pub margin_bottom: f32,
    #[serde(alias = "AbsolutePositioning")]
    pub absolute_positioning: bool,
    #[serde(alias = "Color")]
    pub color: Option<String>, // "#rrggbb"
}

impl Default for Paragraph {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: String::from("Helvetica"),
            text_size: 12.0,
            line_height: 1.2,
            alignment: Alignment::Left,
            wrap: false,
            wrap_width: 0.0,
            angle: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
            margin_top: 0.0,
            margin_bottom: 0.0,
            absolute_positioning: false,
            color: None,
        }
    }
}

impl Paragraph {
    /// RGB fill, `None` for unset or unparsable colors (black).
    pub fn rgb(&self) -> Option<[u8; 3]> {
        self.color.as_deref().and_then(parse_hex_color)
    }
}

pub fn parse_hex_color(val: &str) -> Option<[u8; 3]> {
    let val = val.trim().trim_start_matches('#');
    if val.len() != 6 || !val.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&val[0..2], 16).ok()?;
    let g = u8::from_str_radix(&val[2..4], 16).ok()?;
    let b = u8::from_str_radix(&val[4..6], 16).ok()?;
    Some([r, g, b])
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInsert {
    /// Layout anchor name this insert was derived from.
    pub name: String,
    pub filename: String,
    pub corner: Point,
    pub dim: Dim,
}

/// The raster produced by an earlier stage, as measured by the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviousImage {
    pub filename: String,
    pub width: f32,
    pub height: f32,
}

impl PreviousImage {
    pub fn size(&self) -> Dim {
        Dim::new(self.width, self.height)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spread {
    pub name: String,
    /// Final page size with every dynamic axis resolved.
    pub dim: Dim,
    pub dynamic_axis: Option<Axis>,
    pub extra: f32,
    pub previous_image: Option<ImageInsert>,
    pub images: Vec<ImageInsert>,
    pub text_fields: Vec<TextField>,
    pub text_prefills: Vec<TextPrefill>,
}
