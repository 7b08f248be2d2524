//! Word-highlight strategy: per-word `drawtext` overlays.
//!
//! Every word is drawn twice: a base copy enabled across its whole segment
//! and a highlighted copy enabled only while the word is spoken. Lines are
//! wrapped first and each word's x-offset is measured from the start of its
//! own centred line.

use storyreel_media_model::{CaptionOptions, SubtitleSegment};

use crate::color::{hex_to_ffmpeg, hex_to_ffmpeg_alpha};
use crate::drawtext::{between, DrawText};
use crate::layout::{block_top, estimate_text_width, line_height, line_left, wrap_ranges};
use crate::timing::extract_word_timings;

use super::max_line_width;

/// How the spoken word is distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Color,
    Box,
    Pop,
    Fill,
    Focus,
    Outline,
    Glow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordLook {
    pub id: &'static str,
    pub highlight: Highlight,
}

static LOOKS: [WordLook; 7] = [
    WordLook { id: "word-highlight", highlight: Highlight::Color },
    WordLook { id: "word-box", highlight: Highlight::Box },
    WordLook { id: "word-pop", highlight: Highlight::Pop },
    WordLook { id: "word-fill", highlight: Highlight::Fill },
    WordLook { id: "word-focus", highlight: Highlight::Focus },
    WordLook { id: "word-outline", highlight: Highlight::Outline },
    WordLook { id: "word-glow", highlight: Highlight::Glow },
];

pub fn look_for(id: &str) -> Option<&'static WordLook> {
    LOOKS.iter().find(|l| l.id == id)
}

const STROKE: &str = "0x000000";

/// Build the overlay list for all segments.
pub fn build_overlays(
    look: &WordLook,
    segments: &[SubtitleSegment],
    options: &CaptionOptions,
) -> Vec<DrawText> {
    let font = options.font.as_str();
    let size = options.font_size;
    let base_color = match look.highlight {
        Highlight::Focus => hex_to_ffmpeg_alpha(&options.font_color, 0.45),
        _ => hex_to_ffmpeg(&options.font_color),
    };
    let accent = hex_to_ffmpeg(&options.highlight_color);
    let space = estimate_text_width(" ", size);
    let row = line_height(size);

    let mut overlays = Vec::new();
    for segment in segments {
        let words = extract_word_timings(segment);
        if words.is_empty() {
            continue;
        }
        let texts: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        let lines = wrap_ranges(&texts, max_line_width(options), size, options.words_per_line);
        let top = block_top(options.position, row * lines.len() as f64, options.video_height);
        let segment_window = between(segment.start_time, segment.end_time);

        for (line_index, range) in lines.into_iter().enumerate() {
            let line_text = texts[range.clone()].join(" ");
            let left = line_left(
                options.position,
                estimate_text_width(&line_text, size),
                options.video_width,
            );
            let y = top + row * line_index as f64;

            let mut offset = 0.0;
            for word in &words[range] {
                let x = left + offset;
                let width = estimate_text_width(&word.word, size);
                offset += width + space;

                overlays.push(
                    DrawText::new(word.word.clone(), font, size, base_color.clone())
                        .at(x, y)
                        .border(3, STROKE)
                        .enabled(segment_window.clone()),
                );

                let spoken = between(word.start, word.end);
                let highlighted = DrawText::new(word.word.clone(), font, size, accent.clone()).at(x, y);
                match look.highlight {
                    Highlight::Color => overlays.push(highlighted.border(3, STROKE).enabled(spoken)),
                    Highlight::Box => overlays.push(
                        DrawText::new(word.word.clone(), font, size, STROKE)
                            .at(x, y)
                            .boxed(hex_to_ffmpeg_alpha(&options.highlight_color, 0.9), size / 6)
                            .enabled(spoken),
                    ),
                    Highlight::Pop => {
                        let big = (size as f64 * 1.15).round() as u32;
                        let grow = estimate_text_width(&word.word, big) - width;
                        let lift = (big - size) as f64 / 2.0;
                        overlays.push(
                            DrawText::new(word.word.clone(), font, big, accent.clone())
                                .at(x - grow / 2.0, y - lift)
                                .border(4, STROKE)
                                .enabled(spoken),
                        );
                    }
                    Highlight::Fill => overlays.push(highlighted.border(6, STROKE).enabled(spoken)),
                    Highlight::Focus => overlays.push(
                        DrawText::new(word.word.clone(), font, size, hex_to_ffmpeg(&options.font_color))
                            .at(x, y)
                            .border(3, STROKE)
                            .enabled(spoken),
                    ),
                    Highlight::Outline => overlays.push(
                        DrawText::new(word.word.clone(), font, size, hex_to_ffmpeg(&options.font_color))
                            .at(x, y)
                            .border(5, accent.clone())
                            .enabled(spoken),
                    ),
                    Highlight::Glow => {
                        let haze = hex_to_ffmpeg_alpha(&options.highlight_color, 0.35);
                        overlays.push(
                            DrawText::new(word.word.clone(), font, size, haze.clone())
                                .at(x, y)
                                .border(10, haze)
                                .enabled(spoken.clone()),
                        );
                        overlays.push(highlighted.border(2, STROKE).enabled(spoken));
                    }
                }
            }
        }
    }
    overlays
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_media_model::WordTiming;

    fn two_words() -> SubtitleSegment {
        SubtitleSegment::new("a b", 0.0, 2.0).with_word_timings(vec![
            WordTiming::new("a", 0.0, 1.0),
            WordTiming::new("b", 1.0, 2.0),
        ])
    }

    #[test]
    fn test_highlight_windows_match_word_timing() {
        let overlays = build_overlays(
            look_for("word-highlight").unwrap(),
            &[two_words()],
            &CaptionOptions::default(),
        );
        let windows: Vec<&str> = overlays.iter().filter_map(|o| o.enable.as_deref()).collect();

        assert_eq!(overlays.len(), 4);
        assert_eq!(windows.iter().filter(|w| **w == "gte(t,0)*lt(t,2)").count(), 2);
        assert_eq!(windows.iter().filter(|w| **w == "gte(t,0)*lt(t,1)").count(), 1);
        assert_eq!(windows.iter().filter(|w| **w == "gte(t,1)*lt(t,2)").count(), 1);
    }

    #[test]
    fn test_highlight_shares_base_position() {
        let overlays = build_overlays(
            look_for("word-fill").unwrap(),
            &[two_words()],
            &CaptionOptions::default(),
        );
        assert_eq!(overlays[0].x, overlays[1].x);
        assert_eq!(overlays[0].y, overlays[1].y);
        assert_ne!(overlays[0].x, overlays[2].x);
    }

    #[test]
    fn test_wrapped_lines_are_each_centred() {
        let mut options = CaptionOptions::default();
        options.words_per_line = 2;
        let segment = SubtitleSegment::new("aa bb cc", 0.0, 3.0);
        let overlays = build_overlays(look_for("word-highlight").unwrap(), &[segment], &options);

        // third word starts a new, single-word line centred on its own width
        let width = estimate_text_width("cc", options.font_size);
        let expected = ((options.video_width as f64 - width) / 2.0).round() as i64;
        assert_eq!(overlays[4].x, expected.to_string());
        assert_ne!(overlays[0].y, overlays[4].y);
    }

    #[test]
    fn test_focus_dims_the_base_copy() {
        let overlays = build_overlays(
            look_for("word-focus").unwrap(),
            &[two_words()],
            &CaptionOptions::default(),
        );
        assert_eq!(overlays[0].font_color, "0xFFFFFF@0.45");
        assert_eq!(overlays[1].font_color, "0xFFFFFF");
    }

    #[test]
    fn test_glow_adds_a_haze_layer() {
        let overlays = build_overlays(
            look_for("word-glow").unwrap(),
            &[two_words()],
            &CaptionOptions::default(),
        );
        assert_eq!(overlays.len(), 6);
    }
}
