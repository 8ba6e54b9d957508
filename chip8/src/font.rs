//! Built-in hexadecimal font.
use crate::constants::*;

/// Glyphs 0-F, 4 pixels wide and 5 rows tall.
///
/// Fonts are 5 bytes high, and packed together for historical reasons.
#[rustfmt::skip]
pub const FONTSET: [u8; FONTSET_DATA_LENGTH] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Address of the glyph for the low nibble of `digit`.
#[inline(always)]
pub fn glyph_address(digit: u8) -> usize {
    FONTSET_START + (digit & 0xF) as usize * FONTSET_HEIGHT
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_glyph_address() {
        assert_eq!(glyph_address(0x0), 0x050);
        assert_eq!(glyph_address(0xA), 0x050 + 50);
        // only the low nibble selects the glyph
        assert_eq!(glyph_address(0x1F), glyph_address(0xF));
        assert!(glyph_address(0xF) + FONTSET_HEIGHT <= MEM_START);
    }
}
