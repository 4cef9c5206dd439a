use crate::model::Axis;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed SVG document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("invalid SVG document: {0}")]
    InvalidSvg(String),

    /// A box or point carried a numeral that does not parse.
    #[error("cannot parse {attribute}={value:?} on {element}")]
    Geometry {
        element: String,
        attribute: &'static str,
        value: String,
    },

    #[error("unsupported or missing unit in {0:?} (expected mm, px, pt or in)")]
    Unit(String),

    #[error("prefill {id}: cannot decode paragraph description: {source}")]
    PrefillDecode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no page size info for spread {0}")]
    NoPageSize(String),

    #[error(
        "no size for image {0} (add a correctly named box to the images layer of the layout)"
    )]
    MissingImageSize(String),

    #[error("spread {spread}: page is dynamic on {page:?} but previous image is dynamic on {image:?}")]
    AxisMismatch {
        spread: String,
        page: Option<Axis>,
        image: Option<Axis>,
    },

    #[error("previous image {0} has zero width or height")]
    EmptyImage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("render error: {0}")]
    Render(String),
}
