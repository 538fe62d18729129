pub mod canvas;
pub mod layout;
pub mod table;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::fonts::{Font, register_fonts, to_winansi_bytes};
use crate::images::{Image, ImageFormat};

use canvas::{Canvas, Color, DrawOp};

/// Image data in the form the PDF image XObject needs.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub data: PreparedData,
}

#[derive(Clone, Debug)]
pub enum PreparedData {
    /// JPEG bytes embedded as-is (DCTDecode).
    Jpeg { data: Vec<u8>, gray: bool },
    /// zlib-compressed RGB samples with an optional compressed alpha channel.
    Flate { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

#[derive(Clone, Debug, Default)]
pub struct DocumentInfo {
    pub title: String,
    pub subject: String,
    pub author: String,
}

/// JPEG: (width, height, components) from the first SOF marker.
fn jpeg_header(data: &[u8]) -> Option<(u32, u32, u8)> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }
    let mut i = 2;
    while i + 4 < data.len() {
        if data[i] != 0xFF {
            return None;
        }
        let marker = data[i + 1];
        if marker == 0xD9 || marker == 0xDA {
            break;
        }
        let len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if (marker == 0xC0 || marker == 0xC1 || marker == 0xC2) && i + 9 < data.len() {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Some((width, height, data[i + 9]));
        }
        i += 2 + len;
    }
    None
}

/// Turn encoded bytes into XObject-ready data. Baseline/progressive RGB and
/// greyscale JPEGs pass through; everything else is decoded to RGB + alpha.
pub(crate) fn prepare_image(image: &Image) -> Result<PreparedImage, String> {
    if image.format == ImageFormat::Jpeg
        && let Some((w, h, components)) = jpeg_header(&image.data)
        && (components == 1 || components == 3)
        && w > 0
        && h > 0
    {
        return Ok(PreparedImage {
            pixel_width: w,
            pixel_height: h,
            data: PreparedData::Jpeg {
                data: image.data.clone(),
                gray: components == 1,
            },
        });
    }

    let format = match image.format {
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
    };
    let decoded = image::load_from_memory_with_format(&image.data, format)
        .map_err(|e| format!("decode failed: {e}"))?;
    let rgba: image::RgbaImage = decoded.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    if w == 0 || h == 0 {
        return Err("image has no pixels".to_string());
    }
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);
    let alpha = has_alpha.then(|| {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6)
    });

    Ok(PreparedImage {
        pixel_width: w,
        pixel_height: h,
        data: PreparedData::Flate { rgb, alpha },
    })
}

fn rgb(color: Color) -> (f32, f32, f32) {
    (
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
    )
}

fn font_resource(font: Font) -> &'static str {
    font.entry().pdf_name
}

fn draw_op(content: &mut Content, op: &DrawOp) {
    match op {
        DrawOp::Text {
            x,
            y,
            font,
            size,
            color,
            text,
        } => {
            let (r, g, b) = rgb(*color);
            let bytes = to_winansi_bytes(text);
            content.set_fill_rgb(r, g, b);
            content
                .begin_text()
                .set_font(Name(font_resource(*font).as_bytes()), *size)
                .next_line(*x, *y)
                .show(Str(&bytes))
                .end_text();
        }
        DrawOp::FillRect { x, y, w, h, color } => {
            let (r, g, b) = rgb(*color);
            content.save_state();
            content.set_fill_rgb(r, g, b);
            content.rect(*x, *y, *w, *h);
            content.fill_nonzero();
            content.restore_state();
        }
        DrawOp::StrokeRect {
            x,
            y,
            w,
            h,
            width,
            color,
            dashed,
        } => {
            let (r, g, b) = rgb(*color);
            content.save_state();
            content.set_line_width(*width);
            content.set_stroke_rgb(r, g, b);
            if *dashed {
                content.set_dash_pattern([3.0, 2.0], 0.0);
            }
            content.rect(*x, *y, *w, *h);
            content.stroke();
            content.restore_state();
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
            dashed,
        } => {
            let (r, g, b) = rgb(*color);
            content.save_state();
            content.set_line_width(*width);
            content.set_stroke_rgb(r, g, b);
            if *dashed {
                content.set_dash_pattern([3.0, 2.0], 0.0);
            }
            content.move_to(*x1, *y1);
            content.line_to(*x2, *y2);
            content.stroke();
            content.restore_state();
        }
        DrawOp::Image { image, x, y, w, h } => {
            let name = format!("Im{}", image + 1);
            content.save_state();
            content.transform([*w, 0.0, 0.0, *h, *x, *y]);
            content.x_object(Name(name.as_bytes()));
            content.restore_state();
        }
        DrawOp::PageBorder { x, y, w, h } => {
            content.save_state();
            content.set_stroke_rgb(0.1, 0.15, 0.3);
            content.set_line_width(1.2);
            content.rect(*x, *y, *w, *h);
            content.stroke();
            content.set_line_width(0.4);
            content.rect(*x + 2.0, *y + 2.0, *w - 4.0, *h - 4.0);
            content.stroke();
            content.restore_state();
        }
    }
}

/// Serialise the canvas into PDF bytes.
pub fn write(canvas: &Canvas, info: &DocumentInfo) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    let font_pairs = register_fonts(&mut pdf, &mut alloc);

    let mut image_xobjects: Vec<(String, Ref)> = Vec::new();
    for (i, img) in canvas.images().iter().enumerate() {
        let xobj_ref = alloc();
        let (w, h) = (img.pixel_width as i32, img.pixel_height as i32);
        match &img.data {
            PreparedData::Jpeg { data, gray } => {
                let mut xobj = pdf.image_xobject(xobj_ref, data);
                xobj.filter(Filter::DctDecode);
                xobj.width(w);
                xobj.height(h);
                if *gray {
                    xobj.color_space().device_gray();
                } else {
                    xobj.color_space().device_rgb();
                }
                xobj.bits_per_component(8);
            }
            PreparedData::Flate { rgb, alpha } => {
                let smask_ref = alpha.as_ref().map(|alpha| {
                    let mask_ref = alloc();
                    let mut mask = pdf.image_xobject(mask_ref, alpha);
                    mask.filter(Filter::FlateDecode);
                    mask.width(w);
                    mask.height(h);
                    mask.color_space().device_gray();
                    mask.bits_per_component(8);
                    mask_ref
                });
                let mut xobj = pdf.image_xobject(xobj_ref, rgb);
                xobj.filter(Filter::FlateDecode);
                xobj.width(w);
                xobj.height(h);
                xobj.color_space().device_rgb();
                xobj.bits_per_component(8);
                if let Some(mask_ref) = smask_ref {
                    xobj.s_mask(mask_ref);
                }
            }
        }
        image_xobjects.push((format!("Im{}", i + 1), xobj_ref));
    }

    let n = canvas.page_count();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, page) in canvas.pages().iter().enumerate() {
        let mut content = Content::new();
        for op in &page.ops {
            draw_op(&mut content, op);
        }
        let raw = content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed)
            .filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    let g = canvas.geometry();
    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, g.page_width, g.page_height))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut fonts = resources.fonts();
            for (name, font_ref) in &font_pairs {
                fonts.pair(Name(name.as_bytes()), *font_ref);
            }
        }
        if !image_xobjects.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &image_xobjects {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
    }

    pdf.document_info(info_id)
        .title(TextStr(&info.title))
        .subject(TextStr(&info.subject))
        .author(TextStr(&info.author))
        .creator(TextStr("fir-report"))
        .producer(TextStr(concat!("fir-report ", env!("CARGO_PKG_VERSION"))));

    pdf.finish()
}
