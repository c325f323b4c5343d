//! Standard Type1 fonts and their metrics.
//!
//! Every conforming PDF reader ships Helvetica and Helvetica-Bold, so the
//! sheet references them by name instead of embedding a font program. Text
//! is encoded as WinAnsiEncoding; characters outside Latin-1 are replaced
//! with `?`.
//!
//! Widths come from the Adobe AFM files and are expressed in 1/1000 em.

use lopdf::{Dictionary, Object};

use crate::render::FontStyle;
use crate::util::pt_to_mm;

/// Advance widths of Helvetica for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Advance widths of Helvetica-Bold for ASCII 32..=126.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Width used for characters without an ASCII entry.
const FALLBACK_WIDTH: u16 = 556;

/// A base-14 font with built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardFont {
    style: FontStyle,
}

impl StandardFont {
    pub const fn new(style: FontStyle) -> Self {
        Self { style }
    }

    /// Resource name used in content streams.
    pub const fn resource_name(self) -> &'static str {
        match self.style {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
        }
    }

    pub const fn base_font(self) -> &'static str {
        match self.style {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
        }
    }

    /// Advance width of one character in 1/1000 em.
    pub fn char_width(self, c: char) -> u16 {
        let table = match self.style {
            FontStyle::Regular => &HELVETICA_WIDTHS,
            FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        let code = u32::from(c);
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            FALLBACK_WIDTH
        }
    }

    /// Width of a string in PDF points at the given font size.
    pub fn string_width_pt(self, text: &str, size_pt: f32) -> f32 {
        let total_units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        #[allow(clippy::cast_precision_loss)] // text runs are short
        let units = total_units as f32;
        units * size_pt / 1000.0
    }

    /// Width of a string in millimetres at the given font size.
    pub fn string_width_mm(self, text: &str, size_pt: f32) -> f32 {
        pt_to_mm(self.string_width_pt(text, size_pt))
    }

    /// Font dictionary for a page's Resources.
    pub fn dictionary(self) -> Dictionary {
        Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(self.base_font().as_bytes().to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ])
    }
}

/// The Font resource dictionary shared by every page.
pub fn font_resources() -> Dictionary {
    let mut fonts = Dictionary::new();
    for style in [FontStyle::Regular, FontStyle::Bold] {
        let font = StandardFont::new(style);
        fonts.set(font.resource_name(), Object::Dictionary(font.dictionary()));
    }
    fonts
}

/// Characters of the WinAnsi 0x80..=0x9F block, indexed from 0x80.
///
/// `None` marks codes that WinAnsiEncoding leaves undefined.
const WIN_ANSI_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// WinAnsi code of one character, if the encoding has it.
fn win_ansi_code(c: char) -> Option<u8> {
    match u32::from(c) {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => u8::try_from(code).ok(),
        _ => WIN_ANSI_HIGH
            .iter()
            .position(|&mapped| mapped == Some(c))
            .and_then(|index| u8::try_from(0x80 + index).ok()),
    }
}

/// Encode text for a WinAnsi string operand.
///
/// Characters WinAnsi cannot represent, control characters included,
/// become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| win_ansi_code(c).unwrap_or(b'?')).collect()
}
