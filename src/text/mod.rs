//! # Text Fitting
//!
//! Two bounded text problems: greedy line wrapping inside a fixed width, and
//! clipping a single line with an ellipsis. Break opportunities come from the
//! Unicode line-breaking algorithm (UAX#14). There is no hyphenation or
//! justification.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::FontContext;
use crate::style::TextStyle;

const ELLIPSIS: char = '\u{2026}';

/// Break `text` into lines no wider than `max_width` (mm).
///
/// Mandatory breaks (`\n`) are honoured. A single word wider than the box is
/// split between characters. Always returns at least one line.
pub fn wrap(fonts: &FontContext, text: &str, style: &TextStyle, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut start = 0;

    for (end, opportunity) in linebreaks(text) {
        let segment = &text[start..end];
        start = end;
        let mandatory = matches!(opportunity, BreakOpportunity::Mandatory);
        let segment = if mandatory {
            segment.trim_end_matches(['\n', '\r', '\u{2028}', '\u{2029}'])
        } else {
            segment
        };

        let candidate = format!("{}{}", line, segment);
        if fonts.measure(candidate.trim_end(), style) <= max_width || line.is_empty() {
            line = candidate;
        } else {
            lines.push(line.trim_end().to_string());
            line = segment.to_string();
        }

        // A lone segment may still be too wide for the box.
        while fonts.measure(line.trim_end(), style) > max_width && line.chars().count() > 1 {
            let (head, tail) = split_to_width(fonts, &line, style, max_width);
            lines.push(head);
            line = tail;
        }

        if mandatory && end < text.len() {
            lines.push(line.trim_end().to_string());
            line.clear();
        }
    }

    lines.push(line.trim_end().to_string());
    lines
}

/// Split off the longest prefix that fits, keeping at least one character.
fn split_to_width(
    fonts: &FontContext,
    text: &str,
    style: &TextStyle,
    max_width: f64,
) -> (String, String) {
    let mut head = String::new();
    for (idx, ch) in text.char_indices() {
        head.push(ch);
        if fonts.measure(&head, style) > max_width {
            if idx == 0 {
                let next = idx + ch.len_utf8();
                return (head, text[next..].to_string());
            }
            head.pop();
            return (head, text[idx..].to_string());
        }
    }
    (head, String::new())
}

/// Clip `text` to `max_width` (mm), ending in an ellipsis when shortened.
pub fn clip(fonts: &FontContext, text: &str, style: &TextStyle, max_width: f64) -> String {
    if fonts.measure(text, style) <= max_width {
        return text.to_string();
    }
    let mut clipped: String = text.to_string();
    while !clipped.is_empty() {
        clipped.pop();
        let candidate = format!("{}{}", clipped.trim_end(), ELLIPSIS);
        if fonts.measure(&candidate, style) <= max_width {
            return candidate;
        }
    }
    String::new()
}
