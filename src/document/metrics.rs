//! Glyph widths for the standard Helvetica faces.
//!
//! The PDF writer uses the base-14 fonts, which carry no embedded metrics,
//! so centering and wrapping need the AFM advance widths. Tables cover
//! printable ASCII (32..=126) in units of 1/1000 em.

const FIRST: u32 = 32;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width used for characters outside the tables.
const FALLBACK: u16 = 556;

fn glyph_width(c: char, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    (c as u32)
        .checked_sub(FIRST)
        .and_then(|i| table.get(i as usize))
        .copied()
        .unwrap_or(FALLBACK)
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(c, bold) as u32).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap to `max_width` points.
///
/// Words wider than a full line are placed on a line of their own rather
/// than split. Always yields at least one line.
pub fn wrap(text: &str, size: f32, bold: bool, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut line = String::new();
        for word in raw.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if !line.is_empty() && text_width(&candidate, size, bold) > max_width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Keep at most `max_lines` wrapped lines.
///
/// When lines are dropped, or the last kept line is still wider than
/// `max_width`, the last line is shortened and ends in `...`.
pub fn clamp_lines(
    mut lines: Vec<String>,
    max_lines: usize,
    size: f32,
    bold: bool,
    max_width: f32,
) -> Vec<String> {
    let max_lines = max_lines.max(1);
    let truncated = lines.len() > max_lines;
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        if truncated || text_width(last, size, bold) > max_width {
            let mut kept = last.trim_end().to_string();
            while !kept.is_empty() && text_width(&format!("{kept}..."), size, bold) > max_width {
                kept.pop();
            }
            *last = format!("{}...", kept.trim_end());
        }
    }
    lines
}

/// Encode text for a WinAnsi-encoded standard font.
///
/// Characters beyond Latin-1 become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(c as u32).unwrap_or(b'?'))
        .collect()
}
