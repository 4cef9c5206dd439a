//! Spread composition: resolve the page size of one spread, place its ladders
//! and images in the layout frame, and fit the previous-stage image.
//!
//! Page and image sizes are either static or dynamic along one axis. A dynamic
//! axis is only known once the previous-stage image has been measured: the page
//! grows by the image's scaled extent and everything designed on the page
//! shifts along that axis to make room for it.

use std::collections::{BTreeMap, HashMap};

use crate::error::Error;
use crate::model::{Axis, Dim, ImageInsert, Ladder, Layout, Point, PreviousImage, Spread};
use crate::svg::naming::{LADDER_PREFIX, PREVIOUS_IMAGE_ANCHOR_PREFIX, PREVIOUS_IMAGE_DIM_PREFIX};

/// Extension of the rendered chrome that accompanies each ladder.
pub const CHROME_EXTENSION: &str = "png";
/// Extension of decorative images named in a layout.
pub const IMAGE_EXTENSION: &str = "jpg";

/// A dynamic axis still waiting for the previous image to be measured.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Deferred {
    axis: Axis,
    /// The page's own extent on `axis`, added to the image's.
    delta: f32,
}

#[derive(Debug, PartialEq)]
struct PagePlan {
    dim: Dim,
    dynamic_axis: Option<Axis>,
    extra: f32,
    deferred: Option<Deferred>,
}

/// Compose spread `name` from `layout`.
///
/// `ladders` maps layout anchor names (`svg-...`) to parsed ladders; only those
/// whose name contains `name` are placed. `previous` is the measured
/// previous-stage image, if the spread has one.
pub fn compose(
    layout: &Layout,
    name: &str,
    ladders: &BTreeMap<String, Ladder>,
    previous: Option<&PreviousImage>,
) -> Result<Spread, Error> {
    let page = find_page(layout, name).ok_or_else(|| Error::NoPageSize(name.to_string()))?;
    let image_entry = find_previous_dim(layout, name);
    let plan = resolve_page(name, page, image_entry)?;

    let mut spread = Spread {
        name: name.to_string(),
        dim: plan.dim,
        dynamic_axis: plan.dynamic_axis,
        extra: plan.extra,
        ..Default::default()
    };

    for (ladder_name, ladder) in ladders.iter().filter(|(k, _)| k.contains(name)) {
        let offset = placement(layout, ladder_name);
        let base = layout
            .filenames
            .get(ladder_name)
            .map(String::as_str)
            .unwrap_or(ladder_name);
        spread.images.push(ImageInsert {
            name: ladder_name.clone(),
            filename: format!("{base}.{CHROME_EXTENSION}"),
            corner: Point::new(
                offset.x - ladder.reference_anchor.x,
                offset.y - ladder.reference_anchor.y,
            ),
            dim: ladder.dim,
        });
        spread.text_fields.extend(ladder.text_fields.iter().cloned().map(|mut tf| {
            tf.rect.corner = tf.rect.corner.translate(offset);
            tf
        }));
        spread.text_prefills.extend(ladder.text_prefills.iter().cloned().map(|mut tp| {
            tp.rect.corner = tp.rect.corner.translate(offset);
            tp
        }));
    }

    for key in layout.filenames.keys() {
        if key.starts_with(LADDER_PREFIX) && key.contains(name) && !ladders.contains_key(key) {
            log::warn!("Spread {name}: no ladder supplied for {key}, skipping it");
        }
    }

    for (image_name, base) in layout
        .filenames
        .iter()
        .filter(|(k, _)| is_decorative(k, name))
    {
        let dim = layout
            .image_dim_static
            .get(image_name)
            .ok_or_else(|| Error::MissingImageSize(image_name.clone()))?;
        spread.images.push(ImageInsert {
            name: image_name.clone(),
            filename: format!("{base}.{IMAGE_EXTENSION}"),
            corner: hang(placement(layout, image_name), *dim),
            dim: *dim,
        });
    }

    let anchor_name = format!("{PREVIOUS_IMAGE_ANCHOR_PREFIX}{name}");
    let anchor = placement(layout, &anchor_name);
    match (plan.deferred, previous) {
        (Some(deferred), Some(image)) => {
            let fixed = deferred.axis.other();
            let target = spread.dim.get(fixed);
            let native = measured(image)?;
            let along = native.get(deferred.axis) * target / native.get(fixed);
            spread.dim.set(deferred.axis, along + deferred.delta);
            spread.extra = along;

            let mut dim = Dim::default();
            dim.set(fixed, target);
            dim.set(deferred.axis, along);
            spread.previous_image = Some(ImageInsert {
                name: anchor_name,
                filename: image.filename.clone(),
                corner: hang(anchor, dim),
                dim,
            });
        }
        (Some(deferred), None) => {
            log::warn!(
                "Spread {name}: {:?} is dynamic but there is no previous image to size it",
                deferred.axis
            );
            spread.dim.set(deferred.axis, deferred.delta);
        }
        (None, Some(image)) => {
            let frame = image_entry.unwrap_or(spread.dim);
            let dim = fit(measured(image)?, frame);
            spread.previous_image = Some(ImageInsert {
                name: anchor_name,
                filename: image.filename.clone(),
                corner: hang(anchor, dim),
                dim,
            });
        }
        (None, None) => {}
    }

    if let Some(axis) = spread.dynamic_axis
        && spread.extra != 0.0
    {
        let extra = spread.extra;
        for image in &mut spread.images {
            image.corner = image.corner.shift(axis, extra);
        }
        for tf in &mut spread.text_fields {
            tf.rect.corner = tf.rect.corner.shift(axis, extra);
        }
        for tp in &mut spread.text_prefills {
            tp.rect.corner = tp.rect.corner.shift(axis, extra);
        }
    }

    Ok(spread)
}

/// Replace prefill text by prefill id, and decorative image files by anchor
/// name (the override is a base filename, as in the layout).
pub fn apply_overrides(
    spread: &mut Spread,
    prefills: &HashMap<String, String>,
    images: &HashMap<String, String>,
) {
    for tp in &mut spread.text_prefills {
        if let Some(text) = prefills.get(&tp.id) {
            tp.text.text = text.clone();
        }
    }
    for insert in &mut spread.images {
        if insert.name.starts_with(LADDER_PREFIX) {
            continue;
        }
        if let Some(base) = images.get(&insert.name) {
            insert.filename = format!("{base}.{IMAGE_EXTENSION}");
        }
    }
    for id in prefills.keys() {
        if !spread.text_prefills.iter().any(|tp| &tp.id == id) {
            log::warn!("Spread {}: no prefill {id:?} to override", spread.name);
        }
    }
}

/// Where content named `anchor` goes: its own anchor, else the reference.
fn placement(layout: &Layout, anchor: &str) -> Point {
    layout
        .anchors
        .get(anchor)
        .copied()
        .unwrap_or(layout.reference_anchor)
}

/// Lower-left corner of a box whose top-left sits at `anchor`.
fn hang(anchor: Point, dim: Dim) -> Point {
    Point::new(anchor.x, anchor.y - dim.height)
}

/// Named images other than ladders and the previous-stage image.
fn is_decorative(key: &str, name: &str) -> bool {
    key.contains(name)
        && !key.starts_with(LADDER_PREFIX)
        && !key.starts_with(PREVIOUS_IMAGE_ANCHOR_PREFIX)
}

fn containing<'a>(map: &'a BTreeMap<String, Dim>, name: &str, usable: impl Fn(&str) -> bool) -> Option<&'a Dim> {
    let mut matches = map
        .iter()
        .filter(|(k, _)| k.contains(name) && usable(k.as_str()));
    let (key, dim) = matches.next()?;
    let ignored: Vec<&str> = matches.map(|(k, _)| k.as_str()).collect();
    if !ignored.is_empty() {
        log::warn!("Spread {name}: using size {key}, also matched {ignored:?}");
    }
    Some(dim)
}

/// Page size for spread `name`: an exact key beats a containing one, and a
/// dynamic entry beats a static one.
fn find_page(layout: &Layout, name: &str) -> Option<Dim> {
    layout
        .page_dim_dynamic
        .get(name)
        .or_else(|| layout.page_dim_static.get(name))
        .or_else(|| containing(&layout.page_dim_dynamic, name, |_| true))
        .or_else(|| containing(&layout.page_dim_static, name, |_| true))
        .copied()
}

/// Size entry of the previous-stage image. Keys naming decorative images are
/// never candidates.
fn find_previous_dim(layout: &Layout, name: &str) -> Option<Dim> {
    let usable = |k: &str| !layout.filenames.contains_key(k);
    let preferred = format!("{PREVIOUS_IMAGE_DIM_PREFIX}{name}");
    [preferred.as_str(), name]
        .into_iter()
        .filter(|&key| usable(key))
        .find_map(|key| {
            layout
                .image_dim_dynamic
                .get(key)
                .or_else(|| layout.image_dim_static.get(key))
        })
        .or_else(|| containing(&layout.image_dim_dynamic, name, usable))
        .or_else(|| containing(&layout.image_dim_static, name, usable))
        .copied()
}

fn resolve_page(name: &str, page: Dim, image: Option<Dim>) -> Result<PagePlan, Error> {
    let image_axis = image.and_then(|d| d.dynamic_axis());
    let mismatch = || Error::AxisMismatch {
        spread: name.to_string(),
        page: page.dynamic_axis(),
        image: image_axis,
    };

    let Some(axis) = page.dynamic_axis() else {
        if image_axis.is_some() {
            return Err(mismatch());
        }
        return Ok(PagePlan {
            dim: page,
            dynamic_axis: None,
            extra: 0.0,
            deferred: None,
        });
    };

    let mut dim = Dim::new(page.width, page.height);
    match image {
        // The image is already sized, so the page can be too.
        Some(image) if image.is_static() => {
            let extra = image.get(axis);
            dim.set(axis, page.get(axis) + extra);
            Ok(PagePlan {
                dim,
                dynamic_axis: Some(axis),
                extra,
                deferred: None,
            })
        }
        Some(_) if image_axis != Some(axis) => Err(mismatch()),
        _ => Ok(PagePlan {
            dim,
            dynamic_axis: Some(axis),
            extra: 0.0,
            deferred: Some(Deferred {
                axis,
                delta: page.get(axis),
            }),
        }),
    }
}

fn measured(image: &PreviousImage) -> Result<Dim, Error> {
    if image.width <= 0.0 || image.height <= 0.0 {
        return Err(Error::EmptyImage(image.filename.clone()));
    }
    Ok(image.size())
}

/// Scale `native` to the height of `frame`, or to its width if that would overflow.
fn fit(native: Dim, frame: Dim) -> Dim {
    let scaled_width = native.width * frame.height / native.height;
    if scaled_width > frame.width {
        Dim::new(frame.width, native.height * frame.width / native.width)
    } else {
        Dim::new(scaled_width, frame.height)
    }
}
