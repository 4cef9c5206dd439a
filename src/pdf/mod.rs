mod form;
mod images;
mod layout;

use std::collections::HashMap;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

use crate::error::Error;
use crate::fonts::{DEFAULT_FONT, FontEntry, register_font, standard_font};
use crate::model::{ImageInsert, Spread};

pub use form::field_name;

/// Image bytes keyed by the filename an [`ImageInsert`] names.
pub type Assets = HashMap<String, Vec<u8>>;

#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Page number mangled into form field names.
    pub page_number: u32,
}

/// Render a composed spread to a single-page PDF.
///
/// Draw order: previous-stage image, image inserts in spread order, prefill
/// text. Text fields become widgets of the document's form.
pub fn render(spread: &Spread, assets: &Assets, options: &RenderOptions) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let page_id = alloc();
    let content_id = alloc();

    // Phase 1: embed each distinct image once
    let mut image_xobjects: Vec<(String, Ref)> = Vec::new();
    let mut names_by_file: HashMap<&str, String> = HashMap::new();
    let inserts: Vec<&ImageInsert> = spread
        .previous_image
        .iter()
        .chain(spread.images.iter())
        .collect();
    for insert in &inserts {
        if names_by_file.contains_key(insert.filename.as_str()) {
            continue;
        }
        let data = assets
            .get(&insert.filename)
            .ok_or_else(|| Error::Render(format!("no image data for {}", insert.filename)))?;
        let xobj_ref = alloc();
        images::embed_image(&mut pdf, xobj_ref, data, &mut alloc)?;
        let pdf_name = format!("Im{}", image_xobjects.len() + 1);
        names_by_file.insert(insert.filename.as_str(), pdf_name.clone());
        image_xobjects.push((pdf_name, xobj_ref));
    }

    let t_images = t0.elapsed();

    // Phase 2: standard fonts used by prefills
    let mut fonts: Vec<FontEntry> = Vec::new();
    let mut prefill_fonts: Vec<usize> = Vec::with_capacity(spread.text_prefills.len());
    for tp in &spread.text_prefills {
        let base = standard_font(&tp.text.font);
        let idx = match fonts.iter().position(|f| f.base_font == base) {
            Some(idx) => idx,
            None => {
                let pdf_name = format!("F{}", fonts.len() + 1);
                fonts.push(register_font(&mut pdf, base, pdf_name, &mut alloc));
                fonts.len() - 1
            }
        };
        prefill_fonts.push(idx);
    }

    // Phase 3: page content
    let mut content = Content::new();
    for insert in &inserts {
        let name = &names_by_file[insert.filename.as_str()];
        content.save_state();
        content.transform([
            insert.dim.width,
            0.0,
            0.0,
            insert.dim.height,
            insert.corner.x,
            insert.corner.y,
        ]);
        content.x_object(Name(name.as_bytes()));
        content.restore_state();
    }
    for (tp, &idx) in spread.text_prefills.iter().zip(&prefill_fonts) {
        layout::render_paragraph(&mut content, &tp.rect, &tp.text, &fonts[idx]);
    }

    let t_content = t0.elapsed();

    // Phase 4: form fields
    let field_refs: Vec<Ref> = spread.text_fields.iter().map(|_| alloc()).collect();
    for (tf, &field_ref) in spread.text_fields.iter().zip(&field_refs) {
        form::write_text_field(&mut pdf, field_ref, options.page_number, tf);
    }
    let field_font = if field_refs.is_empty() {
        None
    } else {
        match fonts.iter().find(|f| f.base_font == DEFAULT_FONT) {
            Some(entry) => Some(entry.font_ref),
            None => {
                let entry = register_font(&mut pdf, DEFAULT_FONT, form::FIELD_FONT.into(), &mut alloc);
                Some(entry.font_ref)
            }
        }
    };

    // Phase 5: assembly
    let raw = content.finish();
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
    pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

    {
        let mut catalog = pdf.catalog(catalog_id);
        catalog.pages(pages_id);
        if let Some(font_ref) = field_font {
            let mut acro = catalog.form();
            acro.fields(field_refs.iter().copied());
            acro.default_resources()
                .fonts()
                .pair(Name(form::FIELD_FONT.as_bytes()), font_ref);
            acro.default_appearance(form::default_appearance());
        }
    }
    pdf.pages(pages_id).kids([page_id]).count(1);

    {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, spread.dim.width, spread.dim.height))
            .parent(pages_id)
            .contents(content_id);
        if !field_refs.is_empty() {
            page.annotations(field_refs.iter().copied());
        }
        let mut resources = page.resources();
        if !fonts.is_empty() || field_font.is_some() {
            let mut font_dict = resources.fonts();
            for entry in &fonts {
                font_dict.pair(Name(entry.pdf_name.as_bytes()), entry.font_ref);
            }
            if let Some(font_ref) = field_font {
                font_dict.pair(Name(form::FIELD_FONT.as_bytes()), font_ref);
            }
        }
        if !image_xobjects.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &image_xobjects {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
    }

    let t_assembly = t0.elapsed();

    log::info!(
        "Render phases: images={:.1}ms, content={:.1}ms, assembly={:.1}ms",
        t_images.as_secs_f64() * 1000.0,
        (t_content - t_images).as_secs_f64() * 1000.0,
        (t_assembly - t_content).as_secs_f64() * 1000.0,
    );

    Ok(pdf.finish())
}
