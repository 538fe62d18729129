//! The report generator: one forward pass over the bundle, section by section,
//! followed by the finalization sweep that stamps borders and page numbers.

mod fields;
mod person;
mod records;
mod signature;

use chrono::NaiveDateTime;

use crate::config::{ReportConfig, mm};
use crate::fonts::Font;
use crate::images::{Image, ImageLoader, ImageSource};
use crate::model::{PersonGroup, ReportBundle, format_date, or_na};
use crate::pdf::canvas::{Canvas, Color, DrawOp, WHITE};
use crate::pdf::layout::{LayoutContext, SectionMark, TextStyle};

use fields::{Row, field_row, labelled_paragraph, rows};

pub(crate) const BAND: Color = [26, 54, 93];
pub(crate) const INK: Color = [25, 25, 25];
pub(crate) const MUTED: Color = [85, 85, 85];
pub(crate) const RULE: Color = [120, 120, 120];

pub(crate) const VALUE: TextStyle = TextStyle::new(Font::Regular, 9.0, INK, 12.0);
pub(crate) const LABEL: TextStyle = TextStyle::new(Font::Bold, 9.0, MUTED, 12.0);
pub(crate) const QUOTE: TextStyle = TextStyle::new(Font::Italic, 9.0, INK, 12.0);
pub(crate) const SMALL: TextStyle = TextStyle::new(Font::Regular, 8.0, MUTED, 10.0);

const SECTION_SPACE: f32 = mm(14.0);
const BAND_HEIGHT: f32 = mm(8.0);
const BRAND_BOX: f32 = mm(22.0);

const FOOTER_RULE_Y: f32 = mm(12.0);
const FOOTER_TEXT_Y: f32 = mm(8.5);

pub(crate) struct ReportLayout {
    pub canvas: Canvas,
    pub sections: Vec<SectionMark>,
    pub omitted_persons: usize,
}

/// Lay out the whole report. The bundle must already be validated.
pub(crate) fn layout(
    bundle: &ReportBundle,
    config: &ReportConfig,
    source: &dyn ImageSource,
) -> ReportLayout {
    let mut images = ImageLoader::new(source);
    if let Some(path) = &config.placeholder_photo {
        match std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| Image::from_bytes(bytes, None))
            .and_then(|image| image.verify().map(|_| image))
        {
            Ok(image) => images = images.with_placeholder(image),
            Err(e) => log::warn!(
                "Placeholder photo {} not usable, using built-in: {e}",
                path.display()
            ),
        }
    }

    let omitted: Vec<&str> = bundle
        .unrendered_persons()
        .map(|p| p.role.label())
        .collect();
    if !omitted.is_empty() {
        log::warn!(
            "{} person(s) with unrecognised roles left out of the report: {:?}",
            omitted.len(),
            omitted
        );
    }

    let mut ctx = LayoutContext::new(config.page);
    let case = &bundle.case_details;

    draw_header(&mut ctx, bundle, config, &images);
    station_section(&mut ctx, bundle);
    incident_section(&mut ctx, bundle);

    for group in PersonGroup::ALL {
        let persons: Vec<_> = bundle.persons_in(group).collect();
        if persons.is_empty() {
            log::debug!("skipping empty section '{}'", group.title());
            continue;
        }
        start_section(&mut ctx, group.title());
        for p in persons {
            let label = group.shows_role_label().then(|| p.role.label());
            person::person_block(&mut ctx, &images, p, label);
        }
    }

    start_section(&mut ctx, "Registering Officer");
    person::officer_block(&mut ctx, &images, case);

    if !bundle.evidence.is_empty() {
        start_section(&mut ctx, "Evidence Details");
        records::evidence(&mut ctx, &bundle.evidence);
    }
    if !bundle.supplementary_statements.is_empty() {
        start_section(&mut ctx, "Supplementary Statements");
        records::statements(&mut ctx, &bundle.supplementary_statements);
    }
    if !bundle.tracking_records.is_empty() {
        start_section(&mut ctx, "Case Timeline");
        records::timeline(&mut ctx, &bundle.tracking_records);
    }

    start_section(&mut ctx, "Declaration & Signatures");
    signature::signature_block(&mut ctx, &images, bundle);

    let (mut canvas, sections) = ctx.into_parts();
    finalize(&mut canvas, &case.fir_number, config.generated_at());
    if canvas.replaced_chars() > 0 {
        log::warn!(
            "{} character(s) have no glyph in the standard fonts and were drawn as '?'",
            canvas.replaced_chars()
        );
    }

    ReportLayout {
        canvas,
        sections,
        omitted_persons: omitted.len(),
    }
}

/// Numbered header band. Returns the ordinal assigned to the section.
pub(crate) fn start_section(ctx: &mut LayoutContext, title: &str) -> u32 {
    ctx.ensure_space(SECTION_SPACE);
    let ordinal = ctx.next_section(title);
    let (left, width, top) = (ctx.left(), ctx.content_width(), ctx.cursor());
    ctx.fill_rect(left, top - BAND_HEIGHT, width, BAND_HEIGHT, BAND);

    let style = TextStyle::new(Font::Bold, 10.5, WHITE, BAND_HEIGHT);
    let label = format!("{ordinal}. {}", title.to_uppercase());
    ctx.text(left + mm(3.0), style.baseline(top), &style, &label);
    ctx.advance(BAND_HEIGHT + mm(3.0));

    log::debug!("SECTION {label} page={} y={:.2}", ctx.page() + 1, top);
    ordinal
}

/// Dashed rule across the content width followed by a small gap.
pub(crate) fn separator(ctx: &mut LayoutContext) {
    ctx.advance(mm(1.5));
    let y = ctx.cursor();
    let (left, right) = (ctx.left(), ctx.right());
    ctx.line(left, y, right, y, 0.5, RULE, true);
    ctx.advance(mm(3.0));
}

/// Page 1 masthead: fixed logo and emblem boxes, centred titles, FIR line.
/// Text positions do not depend on which images loaded.
fn draw_header(
    ctx: &mut LayoutContext,
    bundle: &ReportBundle,
    config: &ReportConfig,
    images: &ImageLoader,
) {
    let top = ctx.cursor();
    let (left, right) = (ctx.left(), ctx.right());
    let center = (left + right) / 2.0;

    if let Some(logo) = images.load_encoded(&bundle.logo_image) {
        ctx.image_fit(&logo, left, top, BRAND_BOX, BRAND_BOX);
    }
    if let Some(emblem) = images.load_encoded(&bundle.emblem_image) {
        ctx.image_fit(&emblem, right - BRAND_BOX, top, BRAND_BOX, BRAND_BOX);
    }

    let org = TextStyle::new(Font::Bold, 14.0, BAND, 18.0);
    let title = TextStyle::new(Font::Bold, 16.0, INK, 20.0);
    let subtitle = TextStyle::new(Font::Italic, 9.0, MUTED, 12.0);
    let fir = TextStyle::new(Font::Regular, 9.5, INK, 13.0);

    let mut line_top = top;
    ctx.text_centered(center, org.baseline(line_top), &org, &config.organization);
    line_top -= org.line_h;
    ctx.text_centered(center, title.baseline(line_top), &title, &config.report_title);
    line_top -= title.line_h;
    if let Some(sub) = config.report_subtitle.as_deref().filter(|s| !s.trim().is_empty()) {
        ctx.text_centered(center, subtitle.baseline(line_top), &subtitle, sub);
        line_top -= subtitle.line_h;
    }
    let case = &bundle.case_details;
    let fir_line = format!(
        "FIR No.: {}    Date of Filing: {}",
        case.fir_number.trim(),
        format_date(&case.filing_date)
    );
    ctx.text_centered(center, fir.baseline(line_top), &fir, &fir_line);
    line_top -= fir.line_h;

    ctx.advance_to(line_top.min(top - BRAND_BOX) - mm(2.0));
    let y = ctx.cursor();
    ctx.line(left, y, right, y, 1.2, BAND, false);
    ctx.line(left, y - 2.0, right, y - 2.0, 0.4, BAND, false);
    ctx.advance(mm(5.0));
}

fn station_section(ctx: &mut LayoutContext, bundle: &ReportBundle) {
    let case = &bundle.case_details;
    start_section(ctx, "Police Station Information");
    let (x, width) = (ctx.left(), ctx.content_width());
    rows(
        ctx,
        x,
        width,
        &[
            Row::pair(
                "Station Name",
                or_na(&case.station_name),
                "Station Code",
                or_na(&case.station_code),
            ),
            Row::pair(
                "District",
                or_na(&case.station_district),
                "Province",
                or_na(&case.station_province),
            ),
            Row::single("Phone", or_na(&case.station_phone)),
            Row::single("Address", or_na(&case.station_address)),
            Row::single("Jurisdiction", or_na(&case.station_jurisdiction)),
        ],
    );
    let in_charge = case.station_in_charge();
    field_row(ctx, "Officer in Charge", &in_charge, x, width);
    ctx.advance(mm(3.0));
}

fn incident_section(ctx: &mut LayoutContext, bundle: &ReportBundle) {
    let case = &bundle.case_details;
    start_section(ctx, "Incident Details");
    let (x, width) = (ctx.left(), ctx.content_width());
    let incident_date = format_date(&case.incident_date);
    let filing_date = format_date(&case.filing_date);
    rows(
        ctx,
        x,
        width,
        &[
            Row::pair("FIR Number", case.fir_number.trim(), "Status", or_na(&case.status)),
            Row::pair(
                "Priority",
                or_na(&case.priority),
                "Crime Type",
                or_na(&case.crime_type),
            ),
            Row::single("Legal Section", or_na(&case.crime_section)),
            Row::pair("Incident Date", &incident_date, "Filing Date", &filing_date),
            Row::pair(
                "Location",
                or_na(&case.location),
                "District",
                or_na(&case.district),
            ),
        ],
    );
    ctx.advance(mm(1.5));
    labelled_paragraph(ctx, "Brief Facts of the Case", or_na(&case.summary), &VALUE);
    ctx.advance(mm(3.0));
}

/// Stamp every page once the page count is final: border (if a page has
/// none yet), footer rule, FIR number, "Page i of N" and generation time.
pub(crate) fn finalize(canvas: &mut Canvas, fir_number: &str, generated_at: NaiveDateTime) {
    let g = *canvas.geometry();
    let total = canvas.page_count();
    let style = TextStyle::new(Font::Regular, 7.5, MUTED, 9.0);
    let left = g.margin_left;
    let right = g.page_width - g.margin_right;
    let fir = format!("FIR No. {}", fir_number.trim());
    let generated = format!("Generated {}", generated_at.format("%d/%m/%Y %H:%M"));

    let mut added_borders = 0;
    for page in 0..total {
        if canvas.stamp_border(page) {
            added_borders += 1;
        }
        canvas.push(
            page,
            DrawOp::Line {
                x1: left,
                y1: FOOTER_RULE_Y,
                x2: right,
                y2: FOOTER_RULE_Y,
                width: 0.5,
                color: RULE,
                dashed: false,
            },
        );
        let stamp = format!("Page {} of {}", page + 1, total);
        let centred = (left + right - style.width(&stamp)) / 2.0;
        let right_aligned = right - style.width(&generated);
        for (x, text) in [
            (left, fir.clone()),
            (centred, stamp),
            (right_aligned, generated.clone()),
        ] {
            canvas.push(
                page,
                DrawOp::Text {
                    x,
                    y: FOOTER_TEXT_Y,
                    font: style.font,
                    size: style.size,
                    color: style.color,
                    text,
                },
            );
        }
    }
    log::debug!("finalized {total} page(s), {added_borders} border(s) added late");
}
