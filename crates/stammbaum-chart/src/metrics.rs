//! Advance widths of the built-in PDF fonts.
//!
//! The tables hold the Adobe AFM widths (1/1000 em) of Helvetica and
//! Helvetica-Bold for printable ASCII. Anything outside that range is
//! measured as a digit, which is close enough for centring.

use crate::layout::Font;

const FIRST: u32 = 32;
const FALLBACK: u16 = 556;
const MM_PER_PT: f64 = 25.4 / 72.0;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
  278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //  !"#$%&'()*+,-./
  556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0-9 :;<=>?
  1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @A-O
  667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P-Z [\]^_
  333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `a-o
  556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p-z {|}~
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

fn glyph_width(c: char, font: Font) -> u16 {
  let table = match font {
    Font::Regular => &HELVETICA,
    Font::Bold => &HELVETICA_BOLD,
  };
  (c as u32)
    .checked_sub(FIRST)
    .and_then(|i| table.get(i as usize))
    .copied()
    .unwrap_or(FALLBACK)
}

/// Width of `text` set in `font` at `size` points, in millimetres.
pub fn text_width(text: &str, font: Font, size: f64) -> f64 {
  if text.is_empty() || size <= 0.0 {
    return 0.0;
  }
  let units: u32 = text.chars().map(|c| u32::from(glyph_width(c, font))).sum();
  f64::from(units) / 1000.0 * size * MM_PER_PT
}
