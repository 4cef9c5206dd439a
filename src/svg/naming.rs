use crate::model::Axis;

/// Title of the point that marks a document's own origin.
pub const REFERENCE_ANCHOR: &str = "ref-anchor";
/// Anchor names with this prefix place a ladder (chrome image plus form fields).
pub const LADDER_PREFIX: &str = "svg-";
/// `img-previous-<spread>` positions the previous-stage image.
pub const PREVIOUS_IMAGE_ANCHOR_PREFIX: &str = "img-previous-";
/// `previous-<spread>` sizes the previous-stage image.
pub const PREVIOUS_IMAGE_DIM_PREFIX: &str = "previous-";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerRole {
    Anchors,
    Pages,
    Images,
    TextFields,
    Prefills,
}

impl LayerRole {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "anchors" => Some(Self::Anchors),
            "pages" => Some(Self::Pages),
            "images" => Some(Self::Images),
            "textfields" => Some(Self::TextFields),
            "prefills" => Some(Self::Prefills),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Anchors => "anchors",
            Self::Pages => "pages",
            Self::Images => "images",
            Self::TextFields => "textfields",
            Self::Prefills => "prefills",
        }
    }
}

/// A box title with its role prefix stripped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classified {
    pub name: String,
    /// Axis resolved at composition time, `None` for static sizes.
    pub dynamic: Option<Axis>,
}

// Longest prefixes first: the first match wins.
const PAGE_PREFIXES: &[(&str, Option<Axis>)] = &[
    ("page-dynamic-width-", Some(Axis::Width)),
    ("page-dynamic-height-", Some(Axis::Height)),
    ("page-dynamic-", Some(Axis::Width)),
    ("page-static-", None),
    ("page-", None),
];

const IMAGE_PREFIXES: &[(&str, Option<Axis>)] = &[
    ("image-dynamic-width-", Some(Axis::Width)),
    ("image-dynamic-height-", Some(Axis::Height)),
    ("image-dynamic-", Some(Axis::Width)),
    ("image-static-", None),
    ("image-", None),
];

/// Classify a titled element of a layer. Returns `None` when nothing is left
/// of the name once the prefix is stripped.
pub fn classify(role: LayerRole, title: &str) -> Option<Classified> {
    let prefixes: &[(&str, Option<Axis>)] = match role {
        LayerRole::Pages => PAGE_PREFIXES,
        LayerRole::Images => IMAGE_PREFIXES,
        LayerRole::Anchors | LayerRole::TextFields | LayerRole::Prefills => &[],
    };
    let (name, dynamic) = prefixes
        .iter()
        .find_map(|&(prefix, axis)| title.strip_prefix(prefix).map(|rest| (rest, axis)))
        .unwrap_or((title, None));
    if name.is_empty() {
        return None;
    }
    Some(Classified {
        name: name.to_string(),
        dynamic,
    })
}

/// Tab order from a `tab-<digits>` marker anywhere in an identifier
/// (case-insensitive), 0 when there is none.
pub fn tab_sequence(identifier: &str) -> i64 {
    let lower = identifier.to_ascii_lowercase();
    let mut rest = lower.as_str();
    while let Some(pos) = rest.find("tab-") {
        let after = &rest[pos + 4..];
        let end = after
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after.len());
        if let Ok(n) = after[..end].parse::<i64>() {
            return n;
        }
        rest = after;
    }
    0
}

pub fn is_multiline(identifier: &str) -> bool {
    identifier.to_ascii_lowercase().contains("multiline")
}
