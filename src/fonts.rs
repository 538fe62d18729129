use std::sync::OnceLock;

use pdf_writer::{Name, Pdf, Ref};

/// The three faces the report uses. All are standard-14 PDF fonts, so nothing is embedded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
    Italic,
}

pub(crate) struct FontEntry {
    pub(crate) pdf_name: &'static str,
    pub(crate) base_font: &'static str,
    /// Advance widths at 1000 units/em for WinAnsi bytes 32..=255.
    pub(crate) widths_1000: Vec<f32>,
}

impl FontEntry {
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        let byte = match char_to_winansi(ch) {
            0 => REPLACEMENT,
            b => b,
        };
        self.widths_1000[(byte - 32) as usize]
    }

    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }
}

// Helvetica AFM advances for ASCII 32..=126.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // 58-64
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A-Z
    278, 278, 278, 469, 556, 333, // 91-96
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // a-z
    334, 260, 334, 584, // 123-126
];

const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    333, 333, 584, 584, 584, 611, 975, // 58-64
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A-Z
    333, 278, 333, 584, 556, 333, // 91-96
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
    556, 333, 611, 556, 778, 556, 556, 500, // a-z
    389, 280, 389, 584, // 123-126
];

/// Widths for WinAnsi 32..=255: exact for ASCII, average lowercase width above.
fn widths_from_ascii(ascii: &[u16; 95]) -> Vec<f32> {
    (32u16..=255u16)
        .map(|b| match b {
            32..=126 => ascii[(b - 32) as usize] as f32,
            0x93 | 0x94 => 333.0, // curly double quotes
            0x95 => 350.0,        // bullet
            0x96 => 556.0,
            0x97 => 1000.0,
            _ => 556.0,
        })
        .collect()
}

static FONTS: OnceLock<[FontEntry; 3]> = OnceLock::new();

fn font_table() -> &'static [FontEntry; 3] {
    FONTS.get_or_init(|| {
        [
            FontEntry {
                pdf_name: "F1",
                base_font: "Helvetica",
                widths_1000: widths_from_ascii(&HELVETICA_ASCII),
            },
            FontEntry {
                pdf_name: "F2",
                base_font: "Helvetica-Bold",
                widths_1000: widths_from_ascii(&HELVETICA_BOLD_ASCII),
            },
            FontEntry {
                pdf_name: "F3",
                base_font: "Helvetica-Oblique",
                widths_1000: widths_from_ascii(&HELVETICA_ASCII),
            },
        ]
    })
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Italic];

    pub(crate) fn entry(self) -> &'static FontEntry {
        let table = font_table();
        match self {
            Font::Regular => &table[0],
            Font::Bold => &table[1],
            Font::Italic => &table[2],
        }
    }

    pub fn text_width(self, text: &str, font_size: f32) -> f32 {
        self.entry().text_width(text, font_size)
    }
}

/// Drawn in place of characters WinAnsi has no code for.
const REPLACEMENT: u8 = b'?';

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Characters outside the code page become `?`.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match char_to_winansi(c) {
            0 => REPLACEMENT,
            b => b,
        })
        .collect()
}

/// Replace characters outside WinAnsi with `?`, returning how many were replaced.
pub(crate) fn substitute_unencodable(text: &str) -> (String, usize) {
    let mut replaced = 0;
    let out = text
        .chars()
        .map(|c| {
            if char_to_winansi(c) == 0 {
                replaced += 1;
                REPLACEMENT as char
            } else {
                c
            }
        })
        .collect();
    (out, replaced)
}

/// Write the Type1 font dictionaries. Returns (resource name, object ref) pairs.
pub(crate) fn register_fonts(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
) -> Vec<(&'static str, Ref)> {
    Font::ALL
        .iter()
        .map(|font| {
            let entry = font.entry();
            let font_ref = alloc();
            pdf.type1_font(font_ref)
                .base_font(Name(entry.base_font.as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            (entry.pdf_name, font_ref)
        })
        .collect()
}
