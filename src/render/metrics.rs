//! Advance widths of the standard Helvetica faces, in 1/1000 em, for the
//! printable ASCII range. Oblique shares the regular widths.

use crate::render::layout::FontFace;

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

// Upper half of WinAnsi: close enough to the average accented letter.
const HIGH_BYTE_REGULAR: u16 = 556;
const HIGH_BYTE_BOLD: u16 = 611;

fn glyph_width(face: FontFace, byte: u8) -> u16 {
    let (table, high) = match face {
        FontFace::Bold => (&HELVETICA_BOLD, HIGH_BYTE_BOLD),
        FontFace::Regular | FontFace::Italic => (&HELVETICA, HIGH_BYTE_REGULAR),
    };
    match byte {
        32..=126 => table[(byte - 32) as usize],
        _ => high,
    }
}

/// Width in points of already-encoded text set in `face` at `size`.
pub fn text_width(bytes: &[u8], face: FontFace, size: f32) -> f32 {
    let units: u32 = bytes.iter().map(|&b| u32::from(glyph_width(face, b))).sum();
    units as f32 * size / 1000.0
}
