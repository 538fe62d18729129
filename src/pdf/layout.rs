use crate::config::PageGeometry;
use crate::fonts::Font;
use crate::images::Image;

use super::canvas::{Canvas, Color, DrawOp};
use super::table::TableOutcome;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: Color,
    pub line_h: f32,
}

impl TextStyle {
    pub const fn new(font: Font, size: f32, color: Color, line_h: f32) -> Self {
        TextStyle {
            font,
            size,
            color,
            line_h,
        }
    }

    pub const fn with_font(self, font: Font) -> Self {
        TextStyle { font, ..self }
    }

    pub const fn with_color(self, color: Color) -> Self {
        TextStyle { color, ..self }
    }

    /// Baseline of a line whose box starts at `top`.
    pub fn baseline(&self, top: f32) -> f32 {
        top - self.size * 0.75 - (self.line_h - self.size).max(0.0) / 2.0
    }

    pub fn width(&self, text: &str) -> f32 {
        self.font.text_width(text, self.size)
    }
}

/// Word-wrap `text` to `max_width`. Newlines start new lines; words wider than
/// a whole line are broken between characters. Blank input gives no lines.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let space_w = font.text_width(" ", size);
    let mut lines = Vec::new();

    for para in text.split('\n') {
        let para = para.trim_end_matches('\r');
        let mut current = String::new();
        let mut current_w = 0.0f32;

        for word in para.split_whitespace() {
            let ww = font.text_width(word, size);
            let need_space = !current.is_empty();
            let proposed = if need_space {
                current_w + space_w + ww
            } else {
                ww
            };

            if proposed <= max_width {
                if need_space {
                    current.push(' ');
                }
                current.push_str(word);
                current_w = proposed;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_w = 0.0;
            }
            if ww <= max_width {
                current.push_str(word);
                current_w = ww;
                continue;
            }
            // Over-long word: hard break between characters
            for ch in word.chars() {
                let cw = font.text_width(ch.encode_utf8(&mut [0u8; 4]), size);
                if !current.is_empty() && current_w + cw > max_width {
                    lines.push(std::mem::take(&mut current));
                    current_w = 0.0;
                }
                current.push(ch);
                current_w += cw;
            }
        }
        lines.push(current);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Cap `text` at `max_chars` characters, ending in "..." when shortened.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Shorten `text` with "..." until it fits `max_width` on one line.
pub fn fit_text(text: &str, font: Font, size: f32, max_width: f32) -> String {
    if font.text_width(text, size) <= max_width {
        return text.to_string();
    }
    let ellipsis_w = font.text_width("...", size);
    let mut out = String::new();
    let mut w = 0.0f32;
    for ch in text.chars() {
        let cw = font.text_width(ch.encode_utf8(&mut [0u8; 4]), size);
        if w + cw + ellipsis_w > max_width {
            break;
        }
        out.push(ch);
        w += cw;
    }
    out.push_str("...");
    out
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionMark {
    pub ordinal: u32,
    pub title: String,
    pub page: usize,
}

/// Cursor and page manager for one report run.
///
/// `slot_top` is the y of the next free line (PDF points, measured from the
/// page bottom) on page `page`. Everything that draws goes through here so a
/// page break can never happen in the middle of an atomic unit.
pub struct LayoutContext {
    canvas: Canvas,
    page: usize,
    slot_top: f32,
    section_counter: u32,
    sections: Vec<SectionMark>,
}

impl LayoutContext {
    pub fn new(geometry: PageGeometry) -> Self {
        LayoutContext {
            canvas: Canvas::new(geometry),
            page: 0,
            slot_top: geometry.top(),
            section_counter: 0,
            sections: Vec::new(),
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        self.canvas.geometry()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn into_parts(self) -> (Canvas, Vec<SectionMark>) {
        (self.canvas, self.sections)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn cursor(&self) -> f32 {
        self.slot_top
    }

    pub fn left(&self) -> f32 {
        self.geometry().margin_left
    }

    pub fn right(&self) -> f32 {
        self.geometry().page_width - self.geometry().margin_right
    }

    pub fn content_width(&self) -> f32 {
        self.geometry().content_width()
    }

    pub fn at_page_top(&self) -> bool {
        (self.slot_top - self.geometry().top()).abs() < 1.0
    }

    /// Start a new page when `needed` points would run past the bottom margin.
    /// Returns whether a break happened. Content taller than a whole page is
    /// drawn from the top of the page it starts on rather than breaking forever.
    pub fn ensure_space(&mut self, needed: f32) -> bool {
        if !self.at_page_top() && self.slot_top - needed < self.geometry().bottom() {
            self.new_page();
            return true;
        }
        false
    }

    pub fn new_page(&mut self) {
        self.page = self.canvas.add_page();
        self.slot_top = self.geometry().top();
        log::debug!("page break -> page {}", self.page + 1);
    }

    pub fn advance(&mut self, dy: f32) {
        self.slot_top -= dy;
    }

    /// Move the cursor down to `y` if it is currently above it. Never moves up.
    pub fn advance_to(&mut self, y: f32) {
        self.slot_top = self.slot_top.min(y);
    }

    /// Pick up where a self-paginating component (the table) left off.
    pub fn resync(&mut self, outcome: TableOutcome) {
        self.page = outcome.final_page;
        self.slot_top = outcome.final_y;
    }

    /// Count a new section and return its ordinal (1-based, no gaps).
    pub fn next_section(&mut self, title: &str) -> u32 {
        self.section_counter += 1;
        self.sections.push(SectionMark {
            ordinal: self.section_counter,
            title: title.to_string(),
            page: self.page,
        });
        self.section_counter
    }

    pub fn sections(&self) -> &[SectionMark] {
        &self.sections
    }

    fn push(&mut self, op: DrawOp) {
        self.canvas.push(self.page, op);
    }

    pub fn text(&mut self, x: f32, baseline: f32, style: &TextStyle, text: &str) {
        if text.is_empty() {
            return;
        }
        self.push(DrawOp::Text {
            x,
            y: baseline,
            font: style.font,
            size: style.size,
            color: style.color,
            text: text.to_string(),
        });
    }

    pub fn text_right(&mut self, right: f32, baseline: f32, style: &TextStyle, text: &str) {
        let w = style.width(text);
        self.text(right - w, baseline, style, text);
    }

    pub fn text_centered(&mut self, center: f32, baseline: f32, style: &TextStyle, text: &str) {
        let w = style.width(text);
        self.text(center - w / 2.0, baseline, style, text);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.push(DrawOp::FillRect { x, y, w, h, color });
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, width: f32, color: Color, dashed: bool) {
        self.push(DrawOp::StrokeRect {
            x,
            y,
            w,
            h,
            width,
            color,
            dashed,
        });
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Color, dashed: bool) {
        self.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
            dashed,
        });
    }

    /// Draw an image fitted into a box on the current page. `false` means nothing was drawn.
    pub fn image_fit(&mut self, image: &Image, x: f32, top: f32, w: f32, h: f32) -> bool {
        let page = self.page;
        self.canvas.draw_image_fit(page, image, x, top, w, h)
    }

    /// Draw wrapped text line by line from the cursor, checking page space
    /// before every line. Returns the height consumed.
    pub fn paragraph(&mut self, x: f32, width: f32, style: &TextStyle, text: &str) -> f32 {
        let lines = wrap_text(text, style.font, style.size, width);
        self.lines(x, &lines, style)
    }

    pub fn lines(&mut self, x: f32, lines: &[String], style: &TextStyle) -> f32 {
        let mut consumed = 0.0;
        for line in lines {
            self.ensure_space(style.line_h);
            let baseline = style.baseline(self.slot_top);
            self.text(x, baseline, style, line);
            self.slot_top -= style.line_h;
            consumed += style.line_h;
        }
        consumed
    }
}
