//! Advance widths for the standard PDF fonts docket uses.
//!
//! Widths come from the Adobe AFM files and are expressed in 1/1000 em.
//! Only the printable ASCII range is tabulated; other WinAnsi characters use
//! a sensible default, which is close enough for alignment purposes.

/// Helvetica, codepoints 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :;<=>?@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [\]^_`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {|}~
];

/// Helvetica-Bold, codepoints 32..=126.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    333, 333, 584, 584, 584, 611, 975, // :;<=>?@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    333, 278, 333, 584, 556, 333, // [\]^_`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a-m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n-z
    389, 280, 389, 584, // {|}~
];

/// Width table for one standard font.
#[derive(Debug, Clone, Copy)]
pub enum StandardFontMetrics {
    Proportional(&'static [u16; 95]),
    /// Every glyph has the same advance (Courier).
    Monospaced(u16),
}

impl StandardFontMetrics {
    pub const HELVETICA: Self = Self::Proportional(&HELVETICA);
    pub const HELVETICA_BOLD: Self = Self::Proportional(&HELVETICA_BOLD);
    pub const COURIER: Self = Self::Monospaced(600);

    /// Advance width of one character in 1/1000 em.
    pub fn advance(&self, ch: char) -> u16 {
        match self {
            Self::Monospaced(w) => *w,
            Self::Proportional(table) => {
                let cp = ch as u32;
                if (32..=126).contains(&cp) {
                    table[(cp - 32) as usize]
                } else if ch == '\u{2026}' || ch == '\u{2014}' {
                    1000
                } else {
                    556
                }
            }
        }
    }

    /// Width of a single character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.advance(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_digits_are_tabular() {
        let m = StandardFontMetrics::HELVETICA;
        for d in '0'..='9' {
            assert_eq!(m.advance(d), 556);
        }
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let text = "Water Tanks";
        let regular = StandardFontMetrics::HELVETICA.measure_string(text, 10.0, 0.0);
        let bold = StandardFontMetrics::HELVETICA_BOLD.measure_string(text, 10.0, 0.0);
        assert!(bold > regular);
    }

    #[test]
    fn courier_is_monospaced() {
        let m = StandardFontMetrics::COURIER;
        assert_eq!(m.measure_string("iiii", 10.0, 0.0), m.measure_string("WWWW", 10.0, 0.0));
        assert!((m.measure_string("ab", 10.0, 0.0) - 12.0).abs() < 1e-9);
    }
}
