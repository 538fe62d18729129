//! Label/value renderers.
//!
//! Rows are atomic: the space they need is checked before anything is drawn.
//! A row taller than a whole page is the exception and breaks between value
//! lines. Paragraphs always check space line by line.

use crate::config::mm;
use crate::model::NOT_AVAILABLE;
use crate::pdf::layout::{LayoutContext, TextStyle, fit_text, wrap_text};

use super::{LABEL, VALUE};

/// Offset of the value column from the start of a label/value pair.
pub(crate) const LABEL_COLUMN: f32 = mm(38.0);
const PAIR_GAP: f32 = mm(3.0);

#[derive(Clone, Copy, Debug)]
pub(crate) enum Row<'a> {
    Single(&'a str, &'a str),
    Pair(&'a str, &'a str, &'a str, &'a str),
}

impl<'a> Row<'a> {
    pub(crate) fn single(label: &'a str, value: &'a str) -> Self {
        Row::Single(label, value)
    }

    pub(crate) fn pair(label1: &'a str, value1: &'a str, label2: &'a str, value2: &'a str) -> Self {
        Row::Pair(label1, value1, label2, value2)
    }
}

fn shown(value: &str) -> &str {
    let v = value.trim();
    if v.is_empty() { NOT_AVAILABLE } else { v }
}

/// Bold "Label:" with the value wrapped in the remaining width. Returns the
/// height consumed: at least one line, more when the value wraps.
pub(crate) fn field_row(
    ctx: &mut LayoutContext,
    label: &str,
    value: &str,
    x: f32,
    width: f32,
) -> f32 {
    let value_width = (width - LABEL_COLUMN).max(mm(10.0));
    let lines = wrap_text(shown(value), VALUE.font, VALUE.size, value_width);
    let height = (lines.len() as f32 * VALUE.line_h).max(VALUE.line_h);
    let printable = ctx.geometry().top() - ctx.geometry().bottom();

    if height > printable {
        ctx.ensure_space(VALUE.line_h);
        let top = ctx.cursor();
        ctx.text(x, LABEL.baseline(top), &LABEL, &format!("{label}:"));
        return ctx.lines(x + LABEL_COLUMN, &lines, &VALUE);
    }

    ctx.ensure_space(height);
    let top = ctx.cursor();
    ctx.text(x, LABEL.baseline(top), &LABEL, &format!("{label}:"));
    let mut line_top = top;
    for line in &lines {
        ctx.text(x + LABEL_COLUMN, VALUE.baseline(line_top), &VALUE, line);
        line_top -= VALUE.line_h;
    }
    ctx.advance(height);
    height
}

/// Two label/value pairs side by side on one line. Values are cut to fit
/// their half rather than wrapped, so the height is always one line.
pub(crate) fn field_row_two_column(
    ctx: &mut LayoutContext,
    (label1, value1): (&str, &str),
    (label2, value2): (&str, &str),
    x: f32,
    width: f32,
) -> f32 {
    let half = width / 2.0;
    ctx.ensure_space(VALUE.line_h);
    let top = ctx.cursor();
    for (col_x, label, value) in [(x, label1, value1), (x + half, label2, value2)] {
        let label_text = fit_text(&format!("{label}:"), LABEL.font, LABEL.size, LABEL_COLUMN - mm(1.0));
        ctx.text(col_x, LABEL.baseline(top), &LABEL, &label_text);
        let value_width = (half - LABEL_COLUMN - PAIR_GAP).max(mm(5.0));
        let value_text = fit_text(shown(value), VALUE.font, VALUE.size, value_width);
        ctx.text(col_x + LABEL_COLUMN, VALUE.baseline(top), &VALUE, &value_text);
    }
    ctx.advance(VALUE.line_h);
    VALUE.line_h
}

/// Draw a stack of rows. Returns the total height consumed.
pub(crate) fn rows(ctx: &mut LayoutContext, x: f32, width: f32, rows: &[Row]) -> f32 {
    rows.iter()
        .map(|row| match *row {
            Row::Single(label, value) => field_row(ctx, label, value, x, width),
            Row::Pair(l1, v1, l2, v2) => field_row_two_column(ctx, (l1, v1), (l2, v2), x, width),
        })
        .sum()
}

/// A bold label on its own line followed by a full-width wrapped paragraph.
pub(crate) fn labelled_paragraph(ctx: &mut LayoutContext, label: &str, text: &str, style: &TextStyle) -> f32 {
    ctx.ensure_space(LABEL.line_h + style.line_h);
    let top = ctx.cursor();
    let x = ctx.left();
    ctx.text(x, LABEL.baseline(top), &LABEL, &format!("{label}:"));
    ctx.advance(LABEL.line_h);
    let indent = mm(4.0);
    let width = ctx.content_width() - indent;
    LABEL.line_h + ctx.paragraph(x + indent, width, style, shown(text))
}
