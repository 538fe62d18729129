//! Evidence list, supplementary statements and the case timeline.

use crate::config::mm;
use crate::fonts::Font;
use crate::model::{
    EvidenceItem, NOT_AVAILABLE, SupplementaryStatement, TrackingRecord, format_date,
    format_timestamp, join_present, or_na, present,
};
use crate::pdf::layout::{LayoutContext, TextStyle, fit_text, truncate_chars};
use crate::pdf::table::{CellAlign, Column, Table, render_table, report_table_style};

use super::{BAND, INK, LABEL, QUOTE, SMALL, VALUE, separator};

/// Longest description shown in a timeline row, "..." included.
pub(crate) const TIMELINE_DESCRIPTION_MAX: usize = 80;

const HEADING: TextStyle = TextStyle::new(Font::Bold, 9.5, INK, 13.0);
const NOTE: TextStyle = TextStyle::new(Font::Italic, 8.0, INK, 10.0);

/// Heading line with a right-aligned caption; the left text is cut to fit.
fn heading_line(ctx: &mut LayoutContext, left_text: &str, right_text: &str) {
    let top = ctx.cursor();
    let (x, right) = (ctx.left(), ctx.right());
    let caption_w = SMALL.width(right_text);
    let room = ctx.content_width() - caption_w - mm(4.0);
    let left_text = fit_text(left_text, HEADING.font, HEADING.size, room);
    ctx.text(x, HEADING.baseline(top), &HEADING, &left_text);
    ctx.text_right(right, HEADING.baseline(top), &SMALL, right_text);
    ctx.advance(HEADING.line_h);
}

fn officer_line(name: &Option<String>, rank: &Option<String>) -> Option<String> {
    join_present(&[rank, name], " ")
}

/// Last component of a path-like reference.
pub(crate) fn file_name_of(reference: &str) -> &str {
    let trimmed = reference.trim().trim_end_matches(['/', '\\']);
    let without_query = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    without_query
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(without_query)
}

pub(crate) fn evidence(ctx: &mut LayoutContext, items: &[EvidenceItem]) {
    let indent = mm(4.0);
    for (i, item) in items.iter().enumerate() {
        // Heading, collector line and the first description lines stay together
        ctx.ensure_space(HEADING.line_h + SMALL.line_h + 2.0 * VALUE.line_h);
        let heading = format!(
            "{}. {} | {} | Status: {}",
            i + 1,
            or_na(&item.code),
            or_na(&item.evidence_type),
            or_na(&item.status)
        );
        let collected = format!("Collected: {}", format_date(&item.collection_date));
        heading_line(ctx, &heading, &collected);

        let x = ctx.left() + indent;
        let width = ctx.content_width() - indent;
        if let Some(by) = officer_line(&item.collected_by_name, &item.collected_by_rank) {
            ctx.lines(x, &[format!("Collected by: {by}")], &SMALL);
        }
        ctx.paragraph(x, width, &VALUE, or_na(&item.description));
        if let Some(reference) = present(&item.file_reference) {
            let name = file_name_of(reference);
            if !name.is_empty() {
                ctx.lines(x, &[format!("Attached file: {name}")], &NOTE);
            }
        }

        if i + 1 < items.len() {
            separator(ctx);
        } else {
            ctx.advance(mm(3.0));
        }
    }
}

pub(crate) fn statements(ctx: &mut LayoutContext, statements: &[SupplementaryStatement]) {
    let indent = mm(4.0);
    for st in statements {
        ctx.ensure_space(HEADING.line_h + SMALL.line_h + 2.0 * QUOTE.line_h);
        let heading = format!("{}: {}", or_na(&st.person_role), or_na(&st.person_name));
        let date = format!("Date: {}", format_date(&st.statement_date));
        heading_line(ctx, &heading, &date);

        let x = ctx.left() + indent;
        let width = ctx.content_width() - indent;
        if let Some(by) = officer_line(&st.recorded_by_name, &st.recorded_by_rank) {
            ctx.lines(x, &[format!("Recorded by: {by}")], &SMALL);
        }
        let text = present(&st.statement).unwrap_or(NOT_AVAILABLE);
        ctx.paragraph(x, width, &QUOTE, &format!("\u{201C}{text}\u{201D}"));
        if let Some(remarks) = present(&st.remarks) {
            ctx.ensure_space(LABEL.line_h);
            ctx.paragraph(x, width, &VALUE, &format!("Remarks: {remarks}"));
        }
        separator(ctx);
    }
}

/// "old >> new", just "new", or "-" when no new status was recorded.
pub(crate) fn status_transition(old: &Option<String>, new: &Option<String>) -> String {
    match (present(old), present(new)) {
        (Some(o), Some(n)) => format!("{o} >> {n}"),
        (None, Some(n)) => n.to_string(),
        _ => "-".to_string(),
    }
}

fn timeline_table(records: &[TrackingRecord]) -> Table {
    let column = |title: &str, share: f32, align: CellAlign| Column {
        title: title.to_string(),
        share,
        align,
    };
    Table {
        columns: vec![
            column("#", 0.06, CellAlign::Center),
            column("Date / Time", 0.18, CellAlign::Left),
            column("Action", 0.18, CellAlign::Left),
            column("Description", 0.38, CellAlign::Left),
            column("Status", 0.20, CellAlign::Center),
        ],
        rows: records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                vec![
                    (i + 1).to_string(),
                    format_timestamp(&r.timestamp),
                    or_na(&r.action_type).to_string(),
                    truncate_chars(or_na(&r.action_description), TIMELINE_DESCRIPTION_MAX),
                    status_transition(&r.old_status, &r.new_status),
                ]
            })
            .collect(),
    }
}

/// The timeline table paginates itself; the cursor picks up where it ended.
pub(crate) fn timeline(ctx: &mut LayoutContext, records: &[TrackingRecord]) {
    let table = timeline_table(records);
    let style = report_table_style(BAND);
    let (x, width, page, y) = (ctx.left(), ctx.content_width(), ctx.page(), ctx.cursor());
    let outcome = render_table(ctx.canvas_mut(), &table, &style, x, width, page, y);
    log::debug!(
        "timeline: {} row(s), {} page(s) added, ends page={} y={:.2}",
        records.len(),
        outcome.pages_added,
        outcome.final_page + 1,
        outcome.final_y
    );
    ctx.resync(outcome);
    ctx.advance(mm(4.0));
}
