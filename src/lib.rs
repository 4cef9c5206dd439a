mod error;
mod fonts;
pub mod model;
pub mod pdf;
pub mod spread;
pub mod svg;

pub use error::Error;
pub use spread::{apply_overrides, compose};

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use model::{Ladder, Layout, PreviousImage, Spread};
use svg::naming::LADDER_PREFIX;

/// Everything needed to compose, and optionally render, one spread.
#[derive(Clone, Debug, Default)]
pub struct SpreadJob {
    /// Layout SVG; ladders and images it names resolve next to it.
    pub layout_path: PathBuf,
    pub spread_name: String,
    /// Raster produced by the previous stage, if the spread places one.
    pub previous_image: Option<PathBuf>,
    /// Mangled into form field names.
    pub page_number: u32,
    /// Prefill id to replacement text.
    pub prefills: HashMap<String, String>,
    /// Decorative image anchor name to replacement base filename.
    pub image_overrides: HashMap<String, String>,
}

impl SpreadJob {
    pub fn new(layout_path: impl Into<PathBuf>, spread_name: impl Into<String>) -> Self {
        Self {
            layout_path: layout_path.into(),
            spread_name: spread_name.into(),
            ..Default::default()
        }
    }

    fn base_dir(&self) -> &Path {
        self.layout_path.parent().unwrap_or(Path::new(""))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))))
}

pub fn load_layout(path: &Path) -> Result<Layout, Error> {
    svg::parse_layout(&read_file(path)?)
}

pub fn load_ladder(path: &Path) -> Result<Ladder, Error> {
    svg::parse_ladder(&read_file(path)?)
}

/// Parse every ladder `layout` names for `spread_name`, keyed by anchor name.
/// Each is read from `<base>.svg` in `dir`.
pub fn load_ladders(
    layout: &Layout,
    spread_name: &str,
    dir: &Path,
) -> Result<BTreeMap<String, Ladder>, Error> {
    layout
        .filenames
        .iter()
        .filter(|(name, _)| name.starts_with(LADDER_PREFIX) && name.contains(spread_name))
        .map(|(name, base)| {
            let ladder = load_ladder(&dir.join(format!("{base}.svg")))?;
            Ok((name.clone(), ladder))
        })
        .collect()
}

/// Measure a raster's pixel size; one pixel is taken as one point.
pub fn measure_image(path: &Path) -> Result<PreviousImage, Error> {
    let (width, height) = image::image_dimensions(path)?;
    Ok(PreviousImage {
        filename: path.to_string_lossy().into_owned(),
        width: width as f32,
        height: height as f32,
    })
}

pub fn compose_spread(job: &SpreadJob) -> Result<Spread, Error> {
    let t0 = Instant::now();

    let layout = load_layout(&job.layout_path)?;
    let ladders = load_ladders(&layout, &job.spread_name, job.base_dir())?;
    let previous = job
        .previous_image
        .as_deref()
        .map(measure_image)
        .transpose()?;
    let t_parse = t0.elapsed();

    let spread = compose(&layout, &job.spread_name, &ladders, previous.as_ref())?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, compose={:.1}ms, total={:.1}ms ({} ladders, {} images)",
        t_parse.as_secs_f64() * 1000.0,
        (t_total - t_parse).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        ladders.len(),
        spread.images.len(),
    );

    Ok(spread)
}

/// Compose the spread, apply the job's overrides and write a one-page PDF.
pub fn render_spread(job: &SpreadJob, output: &Path) -> Result<(), Error> {
    let t0 = Instant::now();

    let mut spread = compose_spread(job)?;
    apply_overrides(&mut spread, &job.prefills, &job.image_overrides);
    let t_compose = t0.elapsed();

    let dir = job.base_dir();
    let mut assets = pdf::Assets::new();
    for insert in spread.previous_image.iter().chain(spread.images.iter()) {
        if !assets.contains_key(&insert.filename) {
            let data = read_file(&dir.join(&insert.filename))?;
            assets.insert(insert.filename.clone(), data);
        }
    }
    let t_load = t0.elapsed();

    let options = pdf::RenderOptions {
        page_number: job.page_number,
    };
    let bytes = pdf::render(&spread, &assets, &options)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: compose={:.1}ms, load={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_compose.as_secs_f64() * 1000.0,
        (t_load - t_compose).as_secs_f64() * 1000.0,
        (t_render - t_load).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}

/// Indented JSON of any record, for inspecting what a drawing produced.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(value)?)
}
