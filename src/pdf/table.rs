//! Grid table with its own pagination.
//!
//! The table draws straight onto the [`Canvas`] and adds pages itself when a
//! row does not fit; the header row is repeated on every page it reaches.
//! The caller gets a [`TableOutcome`] back and must resync its cursor from it.

use crate::fonts::Font;

use super::canvas::{Canvas, Color, DrawOp, WHITE};
use super::layout::{TextStyle, wrap_text};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellAlign {
    Left,
    Center,
}

#[derive(Clone, Debug)]
pub struct Column {
    pub title: String,
    /// Share of the table width; shares are normalised to sum to 1.
    pub share: f32,
    pub align: CellAlign,
}

#[derive(Clone, Debug, Default)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Clone, Copy, Debug)]
pub struct TableStyle {
    pub header: TextStyle,
    pub body: TextStyle,
    pub padding: f32,
    pub header_fill: Color,
    pub stripe_fill: Option<Color>,
    pub grid: Color,
}

/// Where the table finished. `pages_added` counts pages created by the table itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableOutcome {
    pub final_page: usize,
    pub final_y: f32,
    pub pages_added: usize,
}

struct RowLayout {
    height: f32,
    cell_lines: Vec<Vec<String>>,
}

fn column_widths(table: &Table, width: f32) -> Vec<f32> {
    let total: f32 = table.columns.iter().map(|c| c.share.max(0.0)).sum();
    if total <= 0.0 {
        let n = table.columns.len().max(1) as f32;
        return vec![width / n; table.columns.len()];
    }
    table
        .columns
        .iter()
        .map(|c| width * c.share.max(0.0) / total)
        .collect()
}

fn layout_row(cells: &[String], col_widths: &[f32], style: &TextStyle, padding: f32) -> RowLayout {
    let mut max_lines = 1usize;
    let cell_lines: Vec<Vec<String>> = col_widths
        .iter()
        .enumerate()
        .map(|(ci, &w)| {
            let text = cells.get(ci).map(String::as_str).unwrap_or("");
            let lines = wrap_text(text, style.font, style.size, (w - 2.0 * padding).max(1.0));
            max_lines = max_lines.max(lines.len());
            lines
        })
        .collect();
    RowLayout {
        height: max_lines as f32 * style.line_h + 2.0 * padding,
        cell_lines,
    }
}

fn draw_row(
    canvas: &mut Canvas,
    page: usize,
    layout: &RowLayout,
    columns: &[Column],
    col_widths: &[f32],
    x: f32,
    top: f32,
    style: &TextStyle,
    fill: Option<Color>,
    ts: &TableStyle,
) {
    let width: f32 = col_widths.iter().sum();
    let bottom = top - layout.height;
    if let Some(color) = fill {
        canvas.push(
            page,
            DrawOp::FillRect {
                x,
                y: bottom,
                w: width,
                h: layout.height,
                color,
            },
        );
    }

    let mut cell_x = x;
    for ((lines, &w), column) in layout.cell_lines.iter().zip(col_widths).zip(columns) {
        let mut line_top = top - ts.padding;
        for line in lines {
            let line_x = match column.align {
                CellAlign::Left => cell_x + ts.padding,
                CellAlign::Center => cell_x + (w - style.width(line)) / 2.0,
            };
            canvas.push(
                page,
                DrawOp::Text {
                    x: line_x,
                    y: style.baseline(line_top),
                    font: style.font,
                    size: style.size,
                    color: style.color,
                    text: line.clone(),
                },
            );
            line_top -= style.line_h;
        }
        canvas.push(
            page,
            DrawOp::StrokeRect {
                x: cell_x,
                y: bottom,
                w,
                h: layout.height,
                width: 0.4,
                color: ts.grid,
                dashed: false,
            },
        );
        cell_x += w;
    }
}

/// Draw `table` starting at (`x`, `start_y`) on `start_page`.
pub fn render_table(
    canvas: &mut Canvas,
    table: &Table,
    ts: &TableStyle,
    x: f32,
    width: f32,
    start_page: usize,
    start_y: f32,
) -> TableOutcome {
    let geometry = *canvas.geometry();
    let col_widths = column_widths(table, width);
    let titles: Vec<String> = table.columns.iter().map(|c| c.title.clone()).collect();
    let header = layout_row(&titles, &col_widths, &ts.header, ts.padding);
    let header_style = ts.header.with_color(WHITE);
    let rows: Vec<RowLayout> = table
        .rows
        .iter()
        .map(|r| layout_row(r, &col_widths, &ts.body, ts.padding))
        .collect();

    let mut page = start_page;
    let mut slot_top = start_y;
    let mut pages_added = 0usize;

    // Header plus the first row must fit, otherwise start on a fresh page
    let first_h = header.height + rows.first().map_or(0.0, |r| r.height);
    if slot_top - first_h < geometry.bottom() && (slot_top - geometry.top()).abs() >= 1.0 {
        page = canvas.add_page();
        pages_added += 1;
        slot_top = geometry.top();
    }
    draw_row(canvas, page, &header, &table.columns, &col_widths, x, slot_top, &header_style, Some(ts.header_fill), ts);
    slot_top -= header.height;

    for (ri, row) in rows.iter().enumerate() {
        let below_header = (slot_top - (geometry.top() - header.height)).abs() < 1.0;
        if !below_header && slot_top - row.height < geometry.bottom() {
            page = canvas.add_page();
            pages_added += 1;
            slot_top = geometry.top();
            draw_row(canvas, page, &header, &table.columns, &col_widths, x, slot_top, &header_style, Some(ts.header_fill), ts);
            slot_top -= header.height;
        }
        log::debug!(
            "TABLE row={} row_h={:.2} page={} slot_top={:.2}",
            ri,
            row.height,
            page + 1,
            slot_top
        );
        let fill = if ri % 2 == 1 { ts.stripe_fill } else { None };
        draw_row(canvas, page, row, &table.columns, &col_widths, x, slot_top, &ts.body, fill, ts);
        slot_top -= row.height;
    }

    TableOutcome {
        final_page: page,
        final_y: slot_top,
        pages_added,
    }
}

/// Default look: bold white header on the report's band colour, light zebra rows.
pub fn report_table_style(header_fill: Color) -> TableStyle {
    let body = TextStyle::new(Font::Regular, 8.0, [30, 30, 30], 10.0);
    TableStyle {
        header: body.with_font(Font::Bold),
        body,
        padding: 3.0,
        header_fill,
        stripe_fill: Some([242, 244, 247]),
        grid: [160, 166, 176],
    }
}
