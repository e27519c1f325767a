//! 5×7 bitmap font for the ticker: printable ASCII `' '..='z'` plus a degree sign.
//!
//! Each glyph is five column bytes. Bit `y` of column `x` is set when pixel `(x, y)` is lit,
//! with row 0 at the top.

/// Glyph width in pixels.
pub const GLYPH_WIDTH: usize = 5;
/// Glyph height in pixels.
pub const GLYPH_HEIGHT: usize = 7;
/// Horizontal advance from one glyph to the next: the glyph plus one blank column.
pub const GLYPH_ADVANCE: usize = GLYPH_WIDTH + 1;

/// Code of the first glyph in the table (space).
pub const FIRST_CODE: u8 = 0x20;
/// Reserved code that holds the degree glyph. `'{'` therefore has no glyph of its own.
pub const DEGREE_CODE: u8 = 0x7B;

const GLYPH_COUNT: usize = (DEGREE_CODE - FIRST_CODE) as usize + 1;

#[rustfmt::skip]
const FONT_5X7: [u8; GLYPH_COUNT * GLYPH_WIDTH] = [
    0x00, 0x00, 0x00, 0x00, 0x00, // space
    0x00, 0x00, 0x5f, 0x00, 0x00, // '!'
    0x00, 0x07, 0x00, 0x07, 0x00, // '"'
    0x14, 0x7f, 0x14, 0x7f, 0x14, // '#'
    0x24, 0x2a, 0x7f, 0x2a, 0x12, // '$'
    0x23, 0x13, 0x08, 0x64, 0x62, // '%'
    0x36, 0x49, 0x55, 0x22, 0x50, // '&'
    0x00, 0x05, 0x03, 0x00, 0x00, // '\''
    0x00, 0x1c, 0x22, 0x41, 0x00, // '('
    0x00, 0x41, 0x22, 0x1c, 0x00, // ')'
    0x14, 0x08, 0x3e, 0x08, 0x14, // '*'
    0x08, 0x08, 0x3e, 0x08, 0x08, // '+'
    0x00, 0x50, 0x30, 0x00, 0x00, // ','
    0x08, 0x08, 0x08, 0x08, 0x08, // '-'
    0x00, 0x60, 0x60, 0x00, 0x00, // '.'
    0x20, 0x10, 0x08, 0x04, 0x02, // '/'
    0x3e, 0x51, 0x49, 0x45, 0x3e, // '0'
    0x00, 0x42, 0x7f, 0x40, 0x00, // '1'
    0x42, 0x61, 0x51, 0x49, 0x46, // '2'
    0x21, 0x41, 0x45, 0x4b, 0x31, // '3'
    0x18, 0x14, 0x12, 0x7f, 0x10, // '4'
    0x27, 0x45, 0x45, 0x45, 0x39, // '5'
    0x3c, 0x4a, 0x49, 0x49, 0x30, // '6'
    0x01, 0x71, 0x09, 0x05, 0x03, // '7'
    0x36, 0x49, 0x49, 0x49, 0x36, // '8'
    0x06, 0x49, 0x49, 0x29, 0x1e, // '9'
    0x00, 0x36, 0x36, 0x00, 0x00, // ':'
    0x00, 0x56, 0x36, 0x00, 0x00, // ';'
    0x08, 0x14, 0x22, 0x41, 0x00, // '<'
    0x14, 0x14, 0x14, 0x14, 0x14, // '='
    0x00, 0x41, 0x22, 0x14, 0x08, // '>'
    0x02, 0x01, 0x51, 0x09, 0x06, // '?'
    0x32, 0x49, 0x79, 0x41, 0x3e, // '@'
    0x7e, 0x11, 0x11, 0x11, 0x7e, // 'A'
    0x7f, 0x49, 0x49, 0x49, 0x36, // 'B'
    0x3e, 0x41, 0x41, 0x41, 0x22, // 'C'
    0x7f, 0x41, 0x41, 0x22, 0x1c, // 'D'
    0x7f, 0x49, 0x49, 0x49, 0x41, // 'E'
    0x7f, 0x09, 0x09, 0x09, 0x01, // 'F'
    0x3e, 0x41, 0x49, 0x49, 0x7a, // 'G'
    0x7f, 0x08, 0x08, 0x08, 0x7f, // 'H'
    0x00, 0x41, 0x7f, 0x41, 0x00, // 'I'
    0x20, 0x40, 0x41, 0x3f, 0x01, // 'J'
    0x7f, 0x08, 0x14, 0x22, 0x41, // 'K'
    0x7f, 0x40, 0x40, 0x40, 0x40, // 'L'
    0x7f, 0x02, 0x0c, 0x02, 0x7f, // 'M'
    0x7f, 0x04, 0x08, 0x10, 0x7f, // 'N'
    0x3e, 0x41, 0x41, 0x41, 0x3e, // 'O'
    0x7f, 0x09, 0x09, 0x09, 0x06, // 'P'
    0x3e, 0x41, 0x51, 0x21, 0x5e, // 'Q'
    0x7f, 0x09, 0x19, 0x29, 0x46, // 'R'
    0x46, 0x49, 0x49, 0x49, 0x31, // 'S'
    0x01, 0x01, 0x7f, 0x01, 0x01, // 'T'
    0x3f, 0x40, 0x40, 0x40, 0x3f, // 'U'
    0x1f, 0x20, 0x40, 0x20, 0x1f, // 'V'
    0x3f, 0x40, 0x38, 0x40, 0x3f, // 'W'
    0x63, 0x14, 0x08, 0x14, 0x63, // 'X'
    0x07, 0x08, 0x70, 0x08, 0x07, // 'Y'
    0x61, 0x51, 0x49, 0x45, 0x43, // 'Z'
    0x00, 0x7f, 0x41, 0x41, 0x00, // '['
    0x02, 0x04, 0x08, 0x10, 0x20, // '\\'
    0x00, 0x41, 0x41, 0x7f, 0x00, // ']'
    0x04, 0x02, 0x01, 0x02, 0x04, // '^'
    0x40, 0x40, 0x40, 0x40, 0x40, // '_'
    0x00, 0x01, 0x02, 0x04, 0x00, // '`'
    0x20, 0x54, 0x54, 0x54, 0x78, // 'a'
    0x7f, 0x48, 0x44, 0x44, 0x38, // 'b'
    0x38, 0x44, 0x44, 0x44, 0x20, // 'c'
    0x38, 0x44, 0x44, 0x48, 0x7f, // 'd'
    0x38, 0x54, 0x54, 0x54, 0x18, // 'e'
    0x08, 0x7e, 0x09, 0x01, 0x02, // 'f'
    0x0c, 0x52, 0x52, 0x52, 0x3e, // 'g'
    0x7f, 0x08, 0x04, 0x04, 0x78, // 'h'
    0x00, 0x44, 0x7d, 0x40, 0x00, // 'i'
    0x20, 0x40, 0x44, 0x3d, 0x00, // 'j'
    0x7f, 0x10, 0x28, 0x44, 0x00, // 'k'
    0x00, 0x41, 0x7f, 0x40, 0x00, // 'l'
    0x7c, 0x04, 0x18, 0x04, 0x78, // 'm'
    0x7c, 0x08, 0x04, 0x04, 0x78, // 'n'
    0x38, 0x44, 0x44, 0x44, 0x38, // 'o'
    0x7c, 0x14, 0x14, 0x14, 0x08, // 'p'
    0x08, 0x14, 0x14, 0x18, 0x7c, // 'q'
    0x7c, 0x08, 0x04, 0x04, 0x08, // 'r'
    0x48, 0x54, 0x54, 0x54, 0x20, // 's'
    0x04, 0x3f, 0x44, 0x40, 0x20, // 't'
    0x3c, 0x40, 0x40, 0x20, 0x7c, // 'u'
    0x1c, 0x20, 0x40, 0x20, 0x1c, // 'v'
    0x3c, 0x40, 0x30, 0x40, 0x3c, // 'w'
    0x44, 0x28, 0x10, 0x28, 0x44, // 'x'
    0x0c, 0x50, 0x50, 0x50, 0x3c, // 'y'
    0x44, 0x64, 0x54, 0x4c, 0x44, // 'z'
    0x06, 0x09, 0x09, 0x06, 0x00, // '°'
];

/// One character's bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph([u8; GLYPH_WIDTH]);

impl Glyph {
    /// Column bytes, leftmost first.
    #[must_use]
    pub const fn columns(&self) -> &[u8; GLYPH_WIDTH] {
        &self.0
    }

    /// Whether the pixel at `(col, row)` is lit. Positions outside the glyph are unlit.
    #[must_use]
    pub fn is_lit(&self, col: usize, row: usize) -> bool {
        row < GLYPH_HEIGHT && self.0.get(col).is_some_and(|bits| bits & (1 << row) != 0)
    }

    /// Every `(col, row, lit)` cell of the glyph, column by column.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        (0..GLYPH_WIDTH)
            .flat_map(|col| (0..GLYPH_HEIGHT).map(move |row| (col, row)))
            .map(|(col, row)| (col, row, self.is_lit(col, row)))
    }
}

/// Table code for `ch`, or `None` when the font has no glyph for it.
#[must_use]
pub fn code_for(ch: char) -> Option<u8> {
    match ch {
        '°' => Some(DEGREE_CODE),
        ' '..='z' => u8::try_from(ch).ok(),
        _ => None,
    }
}

/// Bounds-checked glyph lookup.
///
/// Returns `None` for any character outside the table, including `'{'`,
/// whose code is taken by the degree glyph.
#[must_use]
pub fn glyph(ch: char) -> Option<Glyph> {
    let code = code_for(ch)?;
    let start = usize::from(code.checked_sub(FIRST_CODE)?) * GLYPH_WIDTH;
    let bytes = FONT_5X7.get(start..start + GLYPH_WIDTH)?;
    let mut columns = [0; GLYPH_WIDTH];
    columns.copy_from_slice(bytes);
    Some(Glyph(columns))
}

/// Like [`glyph`], but unknown characters fall back to the blank space glyph.
#[must_use]
pub fn glyph_or_blank(ch: char) -> Glyph {
    glyph(ch).unwrap_or(Glyph([0; GLYPH_WIDTH]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_space_through_degree() {
        assert_eq!(GLYPH_COUNT, 92);
        assert_eq!(glyph(' '), Some(Glyph([0; 5])));
        assert_eq!(glyph('z').map(|g| *g.columns()), Some([0x44, 0x64, 0x54, 0x4c, 0x44]));
    }

    #[test]
    fn degree_sign_uses_reserved_code() {
        let degree = glyph('°').expect("degree glyph exists");
        assert_eq!(degree.columns(), &[0x06, 0x09, 0x09, 0x06, 0x00]);
        assert!(degree.is_lit(0, 1));
        assert!(!degree.is_lit(0, 0));
    }

    #[test]
    fn characters_outside_the_table_are_rejected() {
        for ch in ['{', '~', '\u{7f}', '\n', '\u{1f}', 'é', '€'] {
            assert_eq!(glyph(ch), None, "{ch:?}");
        }
        assert_eq!(glyph_or_blank('~'), glyph_or_blank(' '));
    }

    #[test]
    fn letter_a_has_expected_pixels() {
        let a = glyph('A').expect("A exists");
        // 0x7E: rows 1..=6 lit in the first column.
        assert!(!a.is_lit(0, 0));
        assert!((1..7).all(|row| a.is_lit(0, row)));
        assert_eq!(a.cells().filter(|&(_, _, lit)| lit).count(), 6 + 2 + 2 + 2 + 6);
        assert!(!a.is_lit(5, 0));
    }
}
