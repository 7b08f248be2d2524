//! Effect strategy: layered `drawtext` copies.
//!
//! Effects stack coloured, offset copies of each phrase. Flicker comes from
//! periodic enable windows (`lt(mod(t,period),on)`), chromatic aberration
//! from channel-coloured copies shifted sideways, and depth from stacks of
//! progressively offset shadows.

use storyreel_media_model::{CaptionOptions, SubtitleSegment, WordTiming};

use crate::color::{hex_to_ffmpeg, hex_to_ffmpeg_alpha};
use crate::drawtext::{between, periodic, periodic_off, DrawText};
use crate::layout::{block_top, estimate_text_width, line_height, line_left};
use crate::timing::{chunk_by_pattern, extract_word_timings, join_words};

use super::hold_groups;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Fire,
    Ice,
    Glitch,
    RetroWave,
    Extrude,
    NeonFlicker,
    LongShadow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectRecipe {
    pub id: &'static str,
    pub effect: Effect,
    pub uppercase: bool,
}

static RECIPES: [EffectRecipe; 7] = [
    EffectRecipe { id: "fire", effect: Effect::Fire, uppercase: false },
    EffectRecipe { id: "ice", effect: Effect::Ice, uppercase: false },
    EffectRecipe { id: "glitch", effect: Effect::Glitch, uppercase: true },
    EffectRecipe { id: "retro-wave", effect: Effect::RetroWave, uppercase: true },
    EffectRecipe { id: "3d-extrude", effect: Effect::Extrude, uppercase: true },
    EffectRecipe { id: "neon-flicker", effect: Effect::NeonFlicker, uppercase: false },
    EffectRecipe { id: "long-shadow", effect: Effect::LongShadow, uppercase: false },
];

pub fn recipe_for(id: &str) -> Option<&'static EffectRecipe> {
    RECIPES.iter().find(|r| r.id == id)
}

const FLICKER_PERIOD: f64 = 0.3;
const SHIMMER_PERIOD: f64 = 0.8;
const JITTER_PERIOD: f64 = 0.5;
const NEON_PERIOD: f64 = 1.3;
const NEON_DROPOUT: f64 = 0.07;

/// Everything a layer builder needs about one phrase.
struct Phrase<'a> {
    text: String,
    font: &'a str,
    size: u32,
    x: f64,
    y: f64,
    start: f64,
    end: f64,
}

impl Phrase<'_> {
    fn layer(&self, color: impl Into<String>, dx: f64, dy: f64) -> DrawText {
        DrawText::new(self.text.clone(), self.font, self.size, color).at(self.x + dx, self.y + dy)
    }

    fn window(&self) -> String {
        between(self.start, self.end)
    }
}

/// Build the overlay list for all segments.
pub fn build_overlays(
    recipe: &EffectRecipe,
    segments: &[SubtitleSegment],
    options: &CaptionOptions,
) -> Vec<DrawText> {
    let size = options.font_size;
    let row = line_height(size);
    let mut overlays = Vec::new();

    for segment in segments {
        let words: Vec<WordTiming> = extract_word_timings(segment);
        if words.is_empty() {
            continue;
        }
        let chunks = chunk_by_pattern(&words, &[options.words_per_line.max(1)]);
        for group in hold_groups(segment, &chunks) {
            let mut text = join_words(group.words);
            if recipe.uppercase {
                text = text.to_uppercase();
            }
            let width = estimate_text_width(&text, size);
            let phrase = Phrase {
                x: line_left(options.position, width, options.video_width),
                y: block_top(options.position, row, options.video_height),
                text,
                font: &options.font,
                size,
                start: group.start,
                end: group.end,
            };
            layers(recipe.effect, &phrase, options, &mut overlays);
        }
    }
    overlays
}

fn layers(effect: Effect, p: &Phrase<'_>, options: &CaptionOptions, out: &mut Vec<DrawText>) {
    let face = hex_to_ffmpeg(&options.font_color);
    let accent = hex_to_ffmpeg(&options.highlight_color);
    let (s, e) = (p.start, p.end);

    match effect {
        Effect::Fire => {
            out.push(
                p.layer("0xFF2A00@0.90", 0.0, -6.0)
                    .border(8, "0xFF2A00@0.50")
                    .enabled(periodic(s, e, FLICKER_PERIOD, FLICKER_PERIOD / 2.0)),
            );
            out.push(
                p.layer("0xFF7A00", 0.0, -3.0)
                    .border(5, "0xFF7A00@0.60")
                    .enabled(periodic_off(s, e, FLICKER_PERIOD, FLICKER_PERIOD / 2.0)),
            );
            out.push(p.layer("0xFFD000", 0.0, 0.0).border(2, "0x7A1000").enabled(p.window()));
        }
        Effect::Ice => {
            out.push(
                p.layer("0x00BFFF@0.60", 0.0, 2.0)
                    .border(8, "0x00BFFF@0.40")
                    .enabled(p.window()),
            );
            out.push(
                p.layer("0xA5F2FF", 0.0, -2.0)
                    .enabled(periodic(s, e, SHIMMER_PERIOD, SHIMMER_PERIOD / 2.0)),
            );
            out.push(p.layer("0xFFFFFF", 0.0, 0.0).border(2, "0x004A6E").enabled(p.window()));
        }
        Effect::Glitch => {
            out.push(p.layer("0xFF0040@0.80", -4.0, 0.0).enabled(p.window()));
            out.push(p.layer("0x00FFFF@0.80", 4.0, 0.0).enabled(p.window()));
            out.push(p.layer(face, 0.0, 0.0).enabled(p.window()));
            out.push(
                p.layer(accent, 10.0, -3.0)
                    .enabled(periodic(s, e, JITTER_PERIOD, 0.08)),
            );
        }
        Effect::RetroWave => {
            out.push(p.layer("0xFF00FF", 4.0, 4.0).enabled(p.window()));
            out.push(p.layer("0x00FFFF", -3.0, -3.0).enabled(p.window()));
            out.push(p.layer("0xFFFFFF", 0.0, 0.0).border(3, "0x2B0057").enabled(p.window()));
        }
        Effect::Extrude => {
            for depth in (1..=6).rev() {
                let step = depth as f64 * 2.0;
                let alpha = 0.95 - depth as f64 * 0.1;
                out.push(
                    p.layer(hex_to_ffmpeg_alpha("#1A1A1A", alpha), step, step)
                        .enabled(p.window()),
                );
            }
            out.push(p.layer(face, 0.0, 0.0).border(2, "0x000000").enabled(p.window()));
        }
        Effect::NeonFlicker => {
            let haze = hex_to_ffmpeg_alpha(&options.highlight_color, 0.35);
            out.push(
                p.layer(haze.clone(), 0.0, 0.0)
                    .border(12, haze)
                    .enabled(periodic_off(s, e, NEON_PERIOD, NEON_DROPOUT)),
            );
            out.push(
                p.layer(face, 0.0, 0.0)
                    .border(3, accent)
                    .enabled(periodic_off(s, e, NEON_PERIOD, NEON_DROPOUT)),
            );
            out.push(
                p.layer(hex_to_ffmpeg_alpha(&options.highlight_color, 0.25), 0.0, 0.0)
                    .enabled(periodic(s, e, NEON_PERIOD, NEON_DROPOUT)),
            );
        }
        Effect::LongShadow => {
            for depth in (1..=12).rev() {
                let step = depth as f64 * 3.0;
                let alpha = 0.5 * (1.0 - depth as f64 / 13.0);
                out.push(
                    p.layer(hex_to_ffmpeg_alpha("#000000", alpha), step, step)
                        .enabled(p.window()),
                );
            }
            out.push(p.layer(face, 0.0, 0.0).border(2, "0x000000").enabled(p.window()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlays_for(id: &str) -> Vec<DrawText> {
        build_overlays(
            recipe_for(id).unwrap(),
            &[SubtitleSegment::new("feel the heat", 0.0, 3.0)],
            &CaptionOptions::default(),
        )
    }

    #[test]
    fn test_fire_alternates_flicker_layers() {
        let overlays = overlays_for("fire");
        assert_eq!(overlays.len(), 3);
        let on = overlays[0].enable.as_deref().unwrap();
        let off = overlays[1].enable.as_deref().unwrap();
        assert!(on.ends_with("*lt(mod(t,0.3),0.15)"));
        assert!(off.ends_with("*gte(mod(t,0.3),0.15)"));
    }

    #[test]
    fn test_glitch_splits_channels_sideways() {
        let overlays = overlays_for("glitch");
        let red: i64 = overlays[0].x.parse().unwrap();
        let cyan: i64 = overlays[1].x.parse().unwrap();
        let main: i64 = overlays[2].x.parse().unwrap();
        assert!(red < main && main < cyan);
        assert_eq!(overlays[0].y, overlays[2].y);
        assert_eq!(overlays[2].text, "FEEL THE HEAT");
    }

    #[test]
    fn test_extrude_stacks_shadows_behind_text() {
        let overlays = overlays_for("3d-extrude");
        assert_eq!(overlays.len(), 7);
        assert_eq!(overlays[6].font_color, "0xFFFFFF");
        let deepest: i64 = overlays[0].x.parse().unwrap();
        let face: i64 = overlays[6].x.parse().unwrap();
        assert_eq!(deepest - face, 12);
    }

    #[test]
    fn test_phrases_follow_words_per_line() {
        let mut options = CaptionOptions::default();
        options.words_per_line = 1;
        let overlays = build_overlays(
            recipe_for("retro-wave").unwrap(),
            &[SubtitleSegment::new("one two", 0.0, 2.0)],
            &options,
        );
        assert_eq!(overlays.len(), 6);
        assert_eq!(overlays[0].text, "ONE");
        assert_eq!(overlays[3].text, "TWO");
    }
}
