//! Text measurement and caption placement.
//!
//! Widths are estimated, not measured: no font rasterizer is involved, so
//! every glyph is assumed to be `CHAR_WIDTH_RATIO` of the font size wide.
//! Proportional fonts drift from this, which is accepted.

use std::ops::Range;

use storyreel_media_model::{CaptionPosition, HorizontalAnchor, VerticalAnchor};

/// Average glyph width as a fraction of the font size.
pub const CHAR_WIDTH_RATIO: f64 = 0.55;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_RATIO: f64 = 1.25;

/// Fraction of the frame width captions may occupy.
pub const SAFE_WIDTH_FRACTION: f64 = 0.9;

/// Bézier handle length for a quarter circle of radius 1.
const KAPPA: f64 = 0.5523;

/// Estimated rendered width of `text` in pixels.
pub fn estimate_text_width(text: &str, font_size: u32) -> f64 {
    text.chars().count() as f64 * font_size as f64 * CHAR_WIDTH_RATIO
}

pub fn line_height(font_size: u32) -> f64 {
    font_size as f64 * LINE_HEIGHT_RATIO
}

/// Greedy line breaking over `words`, returned as index ranges.
///
/// A line ends when the next word would push it past `max_width` or when it
/// already holds `words_per_line` words (`0` means no word limit). A word
/// wider than `max_width` still gets a line of its own.
pub fn wrap_ranges<T: AsRef<str>>(
    words: &[T],
    max_width: f64,
    font_size: u32,
    words_per_line: usize,
) -> Vec<Range<usize>> {
    let space = estimate_text_width(" ", font_size);
    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0;

    for (i, word) in words.iter().enumerate() {
        let width = estimate_text_width(word.as_ref(), font_size);
        let count = i - line_start;
        if count > 0 {
            let too_wide = line_width + space + width > max_width;
            let too_many = words_per_line > 0 && count >= words_per_line;
            if too_wide || too_many {
                lines.push(line_start..i);
                line_start = i;
                line_width = width;
                continue;
            }
            line_width += space + width;
        } else {
            line_width = width;
        }
    }
    if line_start < words.len() {
        lines.push(line_start..words.len());
    }
    lines
}

/// Greedy line breaking over `words`, returned as joined lines.
pub fn wrap_words<T: AsRef<str>>(
    words: &[T],
    max_width: f64,
    font_size: u32,
    words_per_line: usize,
) -> Vec<String> {
    wrap_ranges(words, max_width, font_size, words_per_line)
        .into_iter()
        .map(|range| {
            words[range]
                .iter()
                .map(|w| w.as_ref())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// ASS vector drawing (for `\p1`) of a rounded pill `width` × `height`,
/// origin at the top-left corner. Ends are quarter-circle Béziers.
pub fn pill_path(width: f64, height: f64) -> String {
    let h = height.max(2.0);
    let w = width.max(h);
    let r = h / 2.0;
    let c = r * KAPPA;
    let p = |v: f64| v.round() as i64;

    format!(
        "m {r} 0 l {wr} 0 b {wrc} 0 {w} {rmc} {w} {r} b {w} {rpc} {wrc} {h} {wr} {h} \
         l {r} {h} b {rmc} {h} 0 {rpc} 0 {r} b 0 {rmc} {rmc} 0 {r} 0",
        r = p(r),
        wr = p(w - r),
        wrc = p(w - r + c),
        w = p(w),
        h = p(h),
        rmc = p(r - c),
        rpc = p(r + c),
    )
}

/// Distances kept clear of the frame edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub horizontal: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Margins {
    /// Bottom margin clears the interface overlays of vertical-video players.
    pub fn for_frame(width: u32, height: u32) -> Self {
        Self {
            horizontal: (width as f64 * 0.06).round(),
            top: (height as f64 * 0.08).round(),
            bottom: (height as f64 * 0.15).round(),
        }
    }

    /// The single `MarginV` value ASS applies for this anchor.
    pub fn vertical_for(&self, vertical: VerticalAnchor) -> f64 {
        match vertical {
            VerticalAnchor::Top => self.top,
            VerticalAnchor::Middle => 0.0,
            VerticalAnchor::Bottom => self.bottom,
        }
    }
}

/// Numpad-style ASS `\an` alignment for a position.
pub fn ass_alignment(position: CaptionPosition) -> u8 {
    let row = match position.vertical {
        VerticalAnchor::Bottom => 0,
        VerticalAnchor::Middle => 3,
        VerticalAnchor::Top => 6,
    };
    let column = match position.horizontal {
        HorizontalAnchor::Left => 1,
        HorizontalAnchor::Center => 2,
        HorizontalAnchor::Right => 3,
    };
    row + column
}

/// The point an `\an`-aligned caption is anchored to.
pub fn anchor_point(position: CaptionPosition, width: u32, height: u32) -> (f64, f64) {
    let margins = Margins::for_frame(width, height);
    let x = match position.horizontal {
        HorizontalAnchor::Left => margins.horizontal,
        HorizontalAnchor::Center => width as f64 / 2.0,
        HorizontalAnchor::Right => width as f64 - margins.horizontal,
    };
    let y = match position.vertical {
        VerticalAnchor::Top => margins.top,
        VerticalAnchor::Middle => height as f64 / 2.0,
        VerticalAnchor::Bottom => height as f64 - margins.bottom,
    };
    (x, y)
}

/// Left edge of a line `line_width` wide.
pub fn line_left(position: CaptionPosition, line_width: f64, width: u32) -> f64 {
    let margins = Margins::for_frame(width, 1);
    let left = match position.horizontal {
        HorizontalAnchor::Left => margins.horizontal,
        HorizontalAnchor::Center => (width as f64 - line_width) / 2.0,
        HorizontalAnchor::Right => width as f64 - margins.horizontal - line_width,
    };
    left.max(0.0)
}

/// Top edge of a text block `block_height` tall.
pub fn block_top(position: CaptionPosition, block_height: f64, height: u32) -> f64 {
    let margins = Margins::for_frame(1, height);
    let top = match position.vertical {
        VerticalAnchor::Top => margins.top,
        VerticalAnchor::Middle => (height as f64 - block_height) / 2.0,
        VerticalAnchor::Bottom => height as f64 - margins.bottom - block_height,
    };
    top.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_estimate() {
        assert!((estimate_text_width("hello", 40) - 110.0).abs() < 1e-9);
        assert_eq!(estimate_text_width("", 40), 0.0);
    }

    #[test]
    fn test_wrap_respects_word_limit() {
        let words = ["one", "two", "three", "four", "five"];
        let lines = wrap_words(&words, 10_000.0, 40, 2);
        assert_eq!(lines, vec!["one two", "three four", "five"]);
    }

    #[test]
    fn test_wrap_respects_width() {
        // each 5-letter word is 110px at 40pt, a space is 22px
        let words = ["aaaaa", "bbbbb", "ccccc"];
        let lines = wrap_ranges(&words, 250.0, 40, 0);
        assert_eq!(lines, vec![0..2, 2..3]);
    }

    #[test]
    fn test_oversized_word_gets_own_line() {
        let words = ["tiny", "enormouslylongword", "x"];
        let lines = wrap_ranges(&words, 100.0, 40, 0);
        assert_eq!(lines, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_pill_path_shape() {
        let path = pill_path(200.0, 60.0);
        assert!(path.starts_with("m 30 0 l 170 0 b"));
        assert_eq!(path.matches(" b ").count(), 4);
        assert!(path.ends_with("30 0"));
    }

    #[test]
    fn test_alignment_numpad() {
        assert_eq!(ass_alignment(CaptionPosition::default()), 2);
        let top_right = CaptionPosition::new(VerticalAnchor::Top, HorizontalAnchor::Right);
        assert_eq!(ass_alignment(top_right), 9);
        let middle_left = CaptionPosition::new(VerticalAnchor::Middle, HorizontalAnchor::Left);
        assert_eq!(ass_alignment(middle_left), 4);
    }

    #[test]
    fn test_centered_line_placement() {
        let left = line_left(CaptionPosition::default(), 200.0, 1080);
        assert!((left - 440.0).abs() < 1e-9);
        let top = block_top(CaptionPosition::default(), 80.0, 1920);
        assert!((top - (1920.0 - 288.0 - 80.0)).abs() < 1e-9);
    }
}
