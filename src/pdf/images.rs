use std::io::Cursor;

use image::ImageDecoder;
use image::codecs::jpeg::JpegDecoder;
use pdf_writer::{Filter, Pdf, Ref};

use crate::error::Error;

fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8, 0xFF])
}

/// Write `data` as an image XObject at `xobj_ref`.
///
/// Baseline RGB and grayscale JPEGs are passed through with DCTDecode; anything
/// else is decoded, split into RGB plus an alpha soft mask, and deflated.
pub(super) fn embed_image(
    pdf: &mut Pdf,
    xobj_ref: Ref,
    data: &[u8],
    alloc: &mut impl FnMut() -> Ref,
) -> Result<(), Error> {
    if is_jpeg(data) {
        let decoder = JpegDecoder::new(Cursor::new(data))?;
        let (w, h) = decoder.dimensions();
        let gray = match decoder.original_color_type() {
            image::ExtendedColorType::L8 => Some(true),
            image::ExtendedColorType::Rgb8 => Some(false),
            _ => None,
        };
        if let Some(gray) = gray {
            let mut xobj = pdf.image_xobject(xobj_ref, data);
            xobj.filter(Filter::DctDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            if gray {
                xobj.color_space().device_gray();
            } else {
                xobj.color_space().device_rgb();
            }
            xobj.bits_per_component(8);
            return Ok(());
        }
        log::debug!("Re-encoding JPEG with unusual color type");
    }

    let rgba = image::load_from_memory(data)?.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w as i32);
        mask.height(h as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w as i32);
    xobj.height(h as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    Ok(())
}
