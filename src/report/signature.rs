use crate::config::mm;
use crate::fonts::Font;
use crate::images::{Image, ImageLoader};
use crate::model::{NOT_AVAILABLE, PersonGroup, ReportBundle, format_date, join_present, or_na};
use crate::pdf::layout::{LayoutContext, TextStyle, fit_text, wrap_text};

use super::{INK, MUTED, RULE, SMALL, VALUE};

const BOX_GAP: f32 = mm(6.0);
const IMAGE_H: f32 = mm(20.0);
const CAPTION: TextStyle = TextStyle::new(Font::Bold, 8.5, INK, 11.0);
const DISCLAIMER: TextStyle = TextStyle::new(Font::Italic, 7.5, MUTED, 9.5);

const DECLARATION: &str = "Certified that the information recorded above was read over to the \
complainant / informant, admitted to be correctly recorded, and that a copy of this report has \
been given to the complainant / informant free of cost.";

pub(crate) const COPY_LIST: [&str; 5] = [
    "The complainant / informant",
    "The officer in charge of the police station",
    "The district superintendent of police",
    "The court of competent jurisdiction",
    "The case file",
];

const DISCLAIMER_TEXT: &str = "This is a computer-generated report of a First Information \
Report registered at the station named above. Any alteration without authority renders it invalid.";

struct SignatureBox<'a> {
    label: &'a str,
    name: String,
    caption: String,
    kind: BoxKind,
}

enum BoxKind {
    Signature(Option<Image>),
    Seal,
}

pub(crate) fn signature_block(ctx: &mut LayoutContext, images: &ImageLoader, bundle: &ReportBundle) {
    let case = &bundle.case_details;
    let (left, width) = (ctx.left(), ctx.content_width());

    ctx.paragraph(left, width, &VALUE, DECLARATION);
    ctx.advance(mm(4.0));

    let complainant = bundle.persons_in(PersonGroup::Complainants).next();
    let officer_name = join_present(
        &[
            &case.officer_rank,
            &case.officer_first_name,
            &case.officer_middle_name,
            &case.officer_last_name,
        ],
        " ",
    )
    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let boxes = [
        SignatureBox {
            label: "Signature of Complainant",
            name: complainant.map_or_else(|| NOT_AVAILABLE.to_string(), |p| p.full_name()),
            caption: format!("Date: {}", format_date(&case.filing_date)),
            kind: BoxKind::Signature(complainant.and_then(|p| images.load(&p.signature))),
        },
        SignatureBox {
            label: "Station Seal",
            name: or_na(&case.station_name).to_string(),
            caption: "Stamp & Date".to_string(),
            kind: BoxKind::Seal,
        },
        SignatureBox {
            label: "Signature of Officer",
            name: officer_name,
            caption: format!("Badge No.: {}", or_na(&case.officer_badge)),
            kind: BoxKind::Signature(images.load(&case.officer_signature)),
        },
    ];

    let box_w = (width - 2.0 * BOX_GAP) / 3.0;
    let captions_h = CAPTION.line_h + 2.0 * SMALL.line_h;
    ctx.ensure_space(IMAGE_H + mm(2.0) + captions_h);
    let top = ctx.cursor();
    for (i, b) in boxes.iter().enumerate() {
        let x = left + i as f32 * (box_w + BOX_GAP);
        draw_box(ctx, b, x, top, box_w);
    }
    ctx.advance(IMAGE_H + mm(2.0) + captions_h + mm(5.0));

    copy_list(ctx);
    ctx.advance(mm(4.0));
    centred_paragraph(ctx, &DISCLAIMER, DISCLAIMER_TEXT);
}

/// Captions sit at fixed offsets below the image area whether or not the image loaded.
fn draw_box(ctx: &mut LayoutContext, b: &SignatureBox, x: f32, top: f32, w: f32) {
    let rule_y = top - IMAGE_H;
    match &b.kind {
        BoxKind::Signature(image) => {
            if let Some(image) = image {
                ctx.image_fit(image, x + mm(3.0), top - mm(1.0), w - mm(6.0), IMAGE_H - mm(2.0));
            }
            ctx.line(x + mm(3.0), rule_y, x + w - mm(3.0), rule_y, 0.6, INK, false);
        }
        BoxKind::Seal => {
            let seal_w = IMAGE_H.min(w);
            let seal_x = x + (w - seal_w) / 2.0;
            ctx.stroke_rect(seal_x, rule_y, seal_w, IMAGE_H, 0.6, RULE, true);
        }
    }

    let center = x + w / 2.0;
    let mut line_top = rule_y - mm(2.0);
    ctx.text_centered(center, CAPTION.baseline(line_top), &CAPTION, b.label);
    line_top -= CAPTION.line_h;
    for text in [&b.name, &b.caption] {
        let fitted = fit_text(text, SMALL.font, SMALL.size, w);
        ctx.text_centered(center, SMALL.baseline(line_top), &SMALL, &fitted);
        line_top -= SMALL.line_h;
    }
}

fn copy_list(ctx: &mut LayoutContext) {
    let left = ctx.left();
    ctx.ensure_space(CAPTION.line_h + VALUE.line_h);
    let top = ctx.cursor();
    ctx.text(left, CAPTION.baseline(top), &CAPTION, "Copy forwarded to:");
    ctx.advance(CAPTION.line_h);
    let items: Vec<String> = COPY_LIST
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect();
    ctx.lines(left + mm(4.0), &items, &VALUE);
}

fn centred_paragraph(ctx: &mut LayoutContext, style: &TextStyle, text: &str) {
    let center = (ctx.left() + ctx.right()) / 2.0;
    for line in wrap_text(text, style.font, style.size, ctx.content_width() - mm(10.0)) {
        ctx.ensure_space(style.line_h);
        let top = ctx.cursor();
        ctx.text_centered(center, style.baseline(top), style, &line);
        ctx.advance(style.line_h);
    }
}
