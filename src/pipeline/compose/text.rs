//! Text measurement and line breaking for fixed-width boxes.

use super::fonts::{Base14, FontSource};
use super::RenderError;

/// Helvetica advance widths (1/1000 em) for ASCII 0x20..=0x7E, from the AFM.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Helvetica-Bold advance widths (1/1000 em) for ASCII 0x20..=0x7E.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width of glyphs missing from the font, in em.
const FALLBACK_ADVANCE_EM: f32 = 0.5;

/// Advance-width source for one font.
pub enum FontMetrics<'a> {
    Ttf(ttf_parser::Face<'a>),
    Base14(Base14),
}

impl<'a> FontMetrics<'a> {
    pub fn from_source(source: &'a FontSource) -> Result<Self, RenderError> {
        match source {
            FontSource::Embedded { name, bytes } => ttf_parser::Face::parse(bytes, 0)
                .map(FontMetrics::Ttf)
                .map_err(|e| RenderError::Font(format!("{name}: {e}"))),
            FontSource::Builtin(face) => Ok(FontMetrics::Base14(*face)),
        }
    }

    /// Advance of `c` in em.
    fn advance_em(&self, c: char) -> f32 {
        match self {
            Self::Ttf(face) => {
                let upem = face.units_per_em() as f32;
                face.glyph_index(c)
                    .and_then(|g| face.glyph_hor_advance(g))
                    .map(|adv| adv as f32 / upem)
                    .unwrap_or(FALLBACK_ADVANCE_EM)
            }
            Self::Base14(face) => {
                let table = match face {
                    Base14::Helvetica => &HELVETICA_WIDTHS,
                    Base14::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
                };
                match c {
                    ' '..='~' => table[c as usize - 0x20] as f32 / 1000.0,
                    _ => FALLBACK_ADVANCE_EM,
                }
            }
        }
    }

    /// Width of `text` set at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.advance_em(c)).sum::<f32>() * size
    }

    /// Base-14 fonts are written without an encoding map, so only ASCII
    /// comes out right. TTF fonts need a glyph for every visible character.
    pub fn can_render(&self, text: &str) -> bool {
        match self {
            Self::Ttf(face) => text
                .chars()
                .all(|c| c.is_whitespace() || face.glyph_index(c).is_some()),
            Self::Base14(_) => text.is_ascii(),
        }
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Breaks at spaces; a single word wider than the box is split between
/// characters. Always returns at least one line.
pub fn wrap_to_width(text: &str, max_width: f32, size: f32, metrics: &FontMetrics) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if metrics.text_width(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if metrics.text_width(word, size) <= max_width {
            current = word.to_string();
            continue;
        }

        for c in word.chars() {
            current.push(c);
            if metrics.text_width(&current, size) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::replace(&mut current, c.to_string()));
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Keep at most `max_lines`, marking the cut on the last kept line.
pub fn clamp_lines(mut lines: Vec<String>, max_lines: usize) -> Vec<String> {
    if lines.len() > max_lines && max_lines > 0 {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push_str("...");
        }
    }
    lines
}
