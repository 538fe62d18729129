//! Flat rendering model: one display list per page.
//!
//! Coordinates are PDF points with the origin at the bottom-left of the page.
//! Nothing here is structured beyond "page -> ordered draw operations"; the
//! serializer in [`super::write`] replays the lists into content streams.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::config::PageGeometry;
use crate::fonts::{Font, substitute_unencodable};
use crate::images::Image;

use super::{PreparedImage, prepare_image};

pub type Color = [u8; 3];

pub const BLACK: Color = [0, 0, 0];
pub const WHITE: Color = [255, 255, 255];

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Color,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    StrokeRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        width: f32,
        color: Color,
        dashed: bool,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Color,
        dashed: bool,
    },
    /// `image` indexes [`Canvas::images`].
    Image {
        image: usize,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    /// Double-ruled frame around the page.
    PageBorder { x: f32, y: f32, w: f32, h: f32 },
}

#[derive(Debug, Default)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn is_bordered(&self) -> bool {
        self.border_count() > 0
    }

    pub fn border_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::PageBorder { .. }))
            .count()
    }

    /// Text of every text operation on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn image_ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Image { .. }))
    }
}

pub struct Canvas {
    geometry: PageGeometry,
    pages: Vec<Page>,
    images: Vec<PreparedImage>,
    // original bytes of each entry in `images`
    image_sources: Vec<Vec<u8>>,
    // content hash -> indices into `images`, so repeated photos embed once
    image_index: HashMap<u64, Vec<usize>>,
    replaced_chars: usize,
}

impl Canvas {
    /// A canvas with one bordered, empty page.
    pub fn new(geometry: PageGeometry) -> Self {
        let mut canvas = Canvas {
            geometry,
            pages: Vec::new(),
            images: Vec::new(),
            image_sources: Vec::new(),
            image_index: HashMap::new(),
            replaced_chars: 0,
        };
        canvas.add_page();
        canvas
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn images(&self) -> &[PreparedImage] {
        &self.images
    }

    /// Characters drawn as `?` because the standard fonts cannot encode them.
    pub fn replaced_chars(&self) -> usize {
        self.replaced_chars
    }

    /// Append a page, bordered immediately. Returns its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        let idx = self.pages.len() - 1;
        self.stamp_border(idx);
        idx
    }

    /// Draw the page border unless the page already has one. Returns whether it drew.
    pub fn stamp_border(&mut self, page: usize) -> bool {
        let g = self.geometry;
        let Some(p) = self.pages.get_mut(page) else {
            return false;
        };
        if p.is_bordered() {
            return false;
        }
        p.ops.push(DrawOp::PageBorder {
            x: g.border_inset,
            y: g.border_inset,
            w: g.page_width - 2.0 * g.border_inset,
            h: g.page_height - 2.0 * g.border_inset,
        });
        true
    }

    pub fn push(&mut self, page: usize, mut op: DrawOp) {
        let Some(p) = self.pages.get_mut(page) else {
            return;
        };
        if let DrawOp::Text { text, .. } = &mut op {
            let (encodable, replaced) = substitute_unencodable(text);
            if replaced > 0 {
                *text = encodable;
                self.replaced_chars += replaced;
            }
        }
        p.ops.push(op);
    }

    /// Prepare an image for embedding, reusing an earlier copy of identical bytes.
    /// A failure is logged and reported as `None`; the caller simply skips the draw.
    pub fn embed(&mut self, image: &Image) -> Option<usize> {
        let key = content_key(&image.data);
        if let Some(&idx) = self
            .image_index
            .get(&key)
            .and_then(|candidates| candidates.iter().find(|&&i| self.image_sources[i] == image.data))
        {
            return Some(idx);
        }
        match prepare_image(image) {
            Ok(prepared) => {
                self.images.push(prepared);
                self.image_sources.push(image.data.clone());
                let idx = self.images.len() - 1;
                self.image_index.entry(key).or_default().push(idx);
                Some(idx)
            }
            Err(e) => {
                log::warn!("Image could not be embedded ({:?}): {e}", image.format);
                None
            }
        }
    }

    /// Draw `image` scaled to fit inside the box whose top-left corner is
    /// (`x`, `top`), centred, keeping its aspect ratio.
    pub fn draw_image_fit(
        &mut self,
        page: usize,
        image: &Image,
        x: f32,
        top: f32,
        box_w: f32,
        box_h: f32,
    ) -> bool {
        let Some(idx) = self.embed(image) else {
            return false;
        };
        let prepared = &self.images[idx];
        let (pw, ph) = (
            prepared.pixel_width.max(1) as f32,
            prepared.pixel_height.max(1) as f32,
        );
        let scale = (box_w / pw).min(box_h / ph);
        let (w, h) = (pw * scale, ph * scale);
        let ix = x + (box_w - w) / 2.0;
        let iy = top - box_h + (box_h - h) / 2.0;
        self.push(
            page,
            DrawOp::Image {
                image: idx,
                x: ix,
                y: iy,
                w,
                h,
            },
        );
        true
    }
}

fn content_key(data: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::images::ImageFormat;

    fn png(shade: u8) -> Image {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([shade, shade, shade]));
        let mut data = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
            .unwrap();
        Image {
            data,
            format: ImageFormat::Png,
        }
    }

    #[test]
    fn identical_bytes_embed_once() {
        let mut canvas = Canvas::new(PageGeometry::A4_PORTRAIT);
        assert_eq!(canvas.embed(&png(10)), Some(0));
        assert_eq!(canvas.embed(&png(10)), Some(0));
        assert_eq!(canvas.embed(&png(200)), Some(1));
        assert_eq!(canvas.images().len(), 2);
    }

    #[test]
    fn colliding_hash_does_not_reuse_other_bytes() {
        let mut canvas = Canvas::new(PageGeometry::A4_PORTRAIT);
        let (first, second) = (png(10), png(200));
        assert_eq!(canvas.embed(&first), Some(0));
        // Pretend `second` hashes to the same key as `first`
        canvas.image_index.entry(content_key(&second.data)).or_default().push(0);

        assert_eq!(canvas.embed(&second), Some(1));
        assert_eq!(canvas.embed(&second), Some(1));
        assert_eq!(canvas.embed(&first), Some(0));
    }

    #[test]
    fn unencodable_text_is_replaced_and_counted() {
        let mut canvas = Canvas::new(PageGeometry::A4_PORTRAIT);
        canvas.push(
            0,
            DrawOp::Text {
                x: 0.0,
                y: 0.0,
                font: Font::Regular,
                size: 9.0,
                color: BLACK,
                text: "Ram \u{0930}\u{093E}\u{092E}".to_string(),
            },
        );
        assert_eq!(canvas.pages()[0].texts().collect::<Vec<_>>(), vec!["Ram ???"]);
        assert_eq!(canvas.replaced_chars(), 3);
    }
}
