use crate::error::Error;

/// Points per inch.
pub const PPIN: f32 = 72.0;
/// Points per millimetre.
pub const PPMM: f32 = PPIN / 25.4;
/// Points per pixel, at the 96 dpi Inkscape assumes.
pub const PPPX: f32 = PPIN / 96.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentUnit {
    Millimeter,
    Pixel,
    Point,
    Inch,
}

impl DocumentUnit {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "mm" => Some(Self::Millimeter),
            "px" => Some(Self::Pixel),
            "pt" => Some(Self::Point),
            "in" => Some(Self::Inch),
            _ => None,
        }
    }

    pub fn points_per_unit(self) -> f32 {
        match self {
            Self::Millimeter => PPMM,
            Self::Pixel => PPPX,
            Self::Point => 1.0,
            Self::Inch => PPIN,
        }
    }
}

/// Scale factor from document user units to points. Unknown or missing
/// declarations are taken to already be in points.
pub fn scale_factor(declared: Option<&str>) -> f32 {
    match declared.map(str::trim).and_then(DocumentUnit::from_code) {
        Some(unit) => unit.points_per_unit(),
        None => {
            if let Some(other) = declared {
                log::debug!("Unrecognised document unit {other:?}, assuming points");
            }
            1.0
        }
    }
}

/// Parse a unit-suffixed length such as `"210mm"` into points. The last two
/// characters are the unit code.
pub fn parse_unit_value(text: &str) -> Result<f32, Error> {
    let s = text.trim();
    let split = s
        .len()
        .checked_sub(2)
        .filter(|&i| s.is_char_boundary(i))
        .ok_or_else(|| Error::Unit(text.to_string()))?;
    let (number, code) = s.split_at(split);
    let unit = DocumentUnit::from_code(code).ok_or_else(|| Error::Unit(text.to_string()))?;
    let value = number
        .trim()
        .parse::<f32>()
        .map_err(|_| Error::Unit(text.to_string()))?;
    Ok(value * unit.points_per_unit())
}
