use crate::config::mm;
use crate::images::{Image, ImageLoader};
use crate::model::{CaseDetails, NOT_AVAILABLE, Person, format_date, join_present, or_na, present};
use crate::pdf::layout::{LayoutContext, TextStyle};

use super::fields::{LABEL_COLUMN, Row, rows};
use super::{INK, LABEL, QUOTE, RULE, separator};

pub(crate) const PHOTO_W: f32 = mm(28.0);
pub(crate) const PHOTO_H: f32 = mm(35.0);
/// Reserved before a block starts so its photo always lands on one page.
pub(crate) const BLOCK_SPACE: f32 = mm(55.0);
const PHOTO_PAD: f32 = mm(3.0);
const PHOTO_GAP: f32 = mm(5.0);
const SIGNATURE_W: f32 = mm(45.0);
const SIGNATURE_H: f32 = mm(15.0);

const ROLE: TextStyle = TextStyle::new(crate::fonts::Font::Bold, 9.5, INK, 13.0);

struct Block<'a> {
    role_label: Option<&'a str>,
    rows: Vec<Row<'a>>,
    photo: Option<Image>,
    signature: Option<Image>,
    statement: Option<&'a str>,
}

pub(crate) fn person_block(
    ctx: &mut LayoutContext,
    images: &ImageLoader,
    person: &Person,
    role_label: Option<&str>,
) {
    let name = person.full_name();
    let dob = format_date(&person.date_of_birth);
    let address = person.address_line();
    draw_block(
        ctx,
        Block {
            role_label,
            rows: vec![
                Row::single("Full Name", &name),
                Row::pair("Gender", or_na(&person.gender), "Date of Birth", &dob),
                Row::pair(
                    "Citizenship",
                    or_na(&person.citizenship),
                    "National ID",
                    or_na(&person.national_id),
                ),
                Row::single("Contact", or_na(&person.contact)),
                Row::single("Email", or_na(&person.email)),
                Row::single("Address", &address),
            ],
            photo: images.load_person_photo(&person.photo),
            signature: None,
            statement: present(&person.statement),
        },
    );
}

/// The registering officer: the same block with officer rows and a signature.
pub(crate) fn officer_block(ctx: &mut LayoutContext, images: &ImageLoader, case: &CaseDetails) {
    let name = case.officer_full_name();
    let station = join_present(&[&case.station_name, &case.station_code], " / ")
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    draw_block(
        ctx,
        Block {
            role_label: None,
            rows: vec![
                Row::single("Full Name", &name),
                Row::pair(
                    "Rank",
                    or_na(&case.officer_rank),
                    "Badge No.",
                    or_na(&case.officer_badge),
                ),
                Row::single("Department", or_na(&case.officer_department)),
                Row::single("Station", &station),
                Row::single("Contact", or_na(&case.officer_contact)),
                Row::single("Email", or_na(&case.officer_email)),
            ],
            photo: images.load_person_photo(&case.officer_photo),
            signature: images.load(&case.officer_signature),
            statement: None,
        },
    );
}

fn draw_block(ctx: &mut LayoutContext, block: Block) {
    ctx.ensure_space(BLOCK_SPACE);
    let start_page = ctx.page();
    let start = ctx.cursor();
    let photo_x = ctx.right() - PHOTO_W;

    if let Some(photo) = &block.photo {
        ctx.image_fit(photo, photo_x, start, PHOTO_W, PHOTO_H);
    }
    ctx.stroke_rect(photo_x, start - PHOTO_H, PHOTO_W, PHOTO_H, 0.5, RULE, false);

    let x = ctx.left();
    let width = ctx.content_width() - PHOTO_W - PHOTO_GAP;
    if let Some(role) = block.role_label {
        let top = ctx.cursor();
        ctx.text(x, ROLE.baseline(top), &ROLE, &format!("[{role}]"));
        ctx.advance(ROLE.line_h);
    }
    rows(ctx, x, width, &block.rows);

    // Clear the photo before anything full-width is drawn
    if ctx.page() == start_page {
        ctx.advance_to(start - PHOTO_H - PHOTO_PAD);
    }

    if let Some(signature) = &block.signature {
        ctx.ensure_space(LABEL.line_h + SIGNATURE_H);
        let top = ctx.cursor();
        ctx.text(x, LABEL.baseline(top), &LABEL, "Signature:");
        ctx.image_fit(signature, x + LABEL_COLUMN, top, SIGNATURE_W, SIGNATURE_H);
        ctx.advance(SIGNATURE_H.max(LABEL.line_h) + mm(1.5));
    }

    if let Some(statement) = block.statement {
        ctx.advance(mm(1.0));
        ctx.ensure_space(LABEL.line_h + QUOTE.line_h);
        let top = ctx.cursor();
        ctx.text(x, LABEL.baseline(top), &LABEL, "Statement:");
        ctx.advance(LABEL.line_h);
        let indent = mm(4.0);
        let quoted = format!("\u{201C}{statement}\u{201D}");
        let full = ctx.content_width() - indent;
        ctx.paragraph(x + indent, full, &QUOTE, &quoted);
    }

    separator(ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageGeometry;
    use crate::images::ImageSource;
    use crate::pdf::canvas::{DrawOp, Page};

    struct NoImages;

    impl ImageSource for NoImages {
        fn fetch(&self, reference: &str) -> Result<Vec<u8>, String> {
            Err(format!("{reference}: not found"))
        }
    }

    fn witness() -> Person {
        Person {
            first_name: Some("Mina".to_string()),
            last_name: Some("Gurung".to_string()),
            ..Person::default()
        }
    }

    /// Bottom edge of the photo frame on `page`, if one was drawn there.
    fn photo_frame_bottom(page: &Page) -> Option<f32> {
        page.ops.iter().find_map(|op| match op {
            DrawOp::StrokeRect { y, w, h, .. }
                if (*w - PHOTO_W).abs() < 0.01 && (*h - PHOTO_H).abs() < 0.01 =>
            {
                Some(*y)
            }
            _ => None,
        })
    }

    fn block_with_room(room: f32) -> LayoutContext {
        let g = PageGeometry::A4_PORTRAIT;
        let mut ctx = LayoutContext::new(g);
        ctx.advance(ctx.cursor() - g.bottom() - room);
        let source = NoImages;
        let images = ImageLoader::new(&source);
        person_block(&mut ctx, &images, &witness(), None);
        ctx
    }

    #[test]
    fn block_moves_whole_to_the_next_page() {
        let ctx = block_with_room(mm(40.0));
        let pages = ctx.canvas().pages();
        assert_eq!(pages.len(), 2);
        assert!(photo_frame_bottom(&pages[0]).is_none());
        assert_eq!(pages[0].texts().count(), 0);

        let bottom = photo_frame_bottom(&pages[1]).expect("photo frame on the next page");
        assert!(bottom >= ctx.geometry().bottom());
        assert!(pages[1].texts().any(|t| t == "Full Name:"));
        assert_eq!(pages[1].image_ops().count(), 1, "placeholder photo drawn");
    }

    #[test]
    fn block_stays_when_there_is_room() {
        let ctx = block_with_room(mm(60.0));
        let pages = ctx.canvas().pages();
        assert_eq!(pages.len(), 1);
        let bottom = photo_frame_bottom(&pages[0]).expect("photo frame");
        assert!(bottom >= ctx.geometry().bottom());
        assert!(pages[0].texts().any(|t| t == "Full Name:"));
    }
}
