//! Caption style catalog.
//!
//! The catalog is static and immutable: every style id the engine can
//! render is listed here with its category, and the category decides which
//! execution strategy produces it.

use serde::Serialize;

/// Style id rendered when a request names a style the catalog lacks.
pub const FALLBACK_STYLE_ID: &str = "none";

/// Style family, used for grouping in listings and strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleCategory {
    Basic,
    Styled,
    Word,
    Effect,
}

impl StyleCategory {
    pub const ALL: [StyleCategory; 4] = [
        StyleCategory::Basic,
        StyleCategory::Styled,
        StyleCategory::Word,
        StyleCategory::Effect,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleCategory::Basic => "basic",
            StyleCategory::Styled => "styled",
            StyleCategory::Word => "word",
            StyleCategory::Effect => "effect",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// How captions of this category are rendered.
    pub fn strategy(self) -> CaptionStrategy {
        match self {
            StyleCategory::Basic | StyleCategory::Styled => CaptionStrategy::SubtitleFile,
            StyleCategory::Word => CaptionStrategy::WordHighlight,
            StyleCategory::Effect => CaptionStrategy::Effect,
        }
    }
}

/// Execution strategy behind a caption style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionStrategy {
    /// A complete ASS script burned in with the `subtitles` filter.
    SubtitleFile,
    /// Per-word `drawtext` overlays with timed highlight copies.
    WordHighlight,
    /// Layered `drawtext` copies with periodic enable windows.
    Effect,
}

/// Catalog entry for one caption style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnimationStyleMeta {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: StyleCategory,
    /// The style animates individual words and so needs word timings
    /// (synthesized from the segment span when the input has none).
    pub requires_word_timing: bool,
}

impl AnimationStyleMeta {
    pub fn strategy(&self) -> CaptionStrategy {
        self.category.strategy()
    }
}

const fn style(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: StyleCategory,
    requires_word_timing: bool,
) -> AnimationStyleMeta {
    AnimationStyleMeta {
        id,
        name,
        description,
        category,
        requires_word_timing,
    }
}

use StyleCategory::{Basic, Effect, Styled, Word};

static STYLES: [AnimationStyleMeta; 35] = [
    // basic
    style("none", "None", "Plain captions, no animation", Basic, false),
    style("fade", "Fade", "Captions fade in and out", Basic, false),
    style("pop-in", "Pop In", "Captions overshoot then settle", Basic, false),
    style("slide-up", "Slide Up", "Captions slide up into place", Basic, false),
    style("typewriter", "Typewriter", "Words appear one at a time", Basic, true),
    style("scale-in", "Scale In", "Captions grow from nothing", Basic, false),
    // styled
    style("bold-stroke", "Bold Stroke", "Heavy uppercase text with a thick outline", Styled, false),
    style("boxed", "Boxed", "Text on a translucent box", Styled, false),
    style("pill", "Pill", "Short phrases on a rounded pill", Styled, true),
    style("neon-glow", "Neon Glow", "Blurred coloured glow behind crisp text", Styled, false),
    style("tilted", "Tilted", "Phrases alternate a slight tilt", Styled, true),
    style("scale-bounce", "Scale Bounce", "Word pairs pulse on entry", Styled, true),
    style("karaoke", "Karaoke", "Colour sweeps across each word as it is spoken", Styled, true),
    style("hormozi", "Hormozi", "Punchy uppercase beats with one emphasised word", Styled, true),
    style("impact-pop", "Impact Pop", "One large word at a time", Styled, true),
    style("stacked", "Stacked", "Words stacked vertically with alternating sizes", Styled, true),
    style("color-cycle", "Color Cycle", "Phrases cycle through a colour palette", Styled, true),
    style("shadow-drop", "Shadow Drop", "Text with a hard drop shadow", Styled, false),
    style("lower-third", "Lower Third", "Broadcast-style boxed caption in the corner", Styled, false),
    style("cinematic", "Cinematic", "Wide-tracked text with slow fades", Styled, false),
    style("word-pill", "Word Pill", "A pill follows the spoken word", Styled, true),
    // word
    style("word-highlight", "Word Highlight", "The spoken word changes colour", Word, true),
    style("word-box", "Word Box", "The spoken word sits on a coloured box", Word, true),
    style("word-pop", "Word Pop", "The spoken word grows in place", Word, true),
    style("word-fill", "Word Fill", "The spoken word fills with colour behind a heavy stroke", Word, true),
    style("word-focus", "Word Focus", "Other words dim while one is spoken", Word, true),
    style("word-outline", "Word Outline", "The spoken word gains a coloured outline", Word, true),
    style("word-glow", "Word Glow", "The spoken word glows", Word, true),
    // effect
    style("fire", "Fire", "Flickering warm layers", Effect, false),
    style("ice", "Ice", "Slow shimmering cold layers", Effect, false),
    style("glitch", "Glitch", "Chromatic split with periodic jitter", Effect, false),
    style("retro-wave", "Retro Wave", "Magenta and cyan offset copies", Effect, false),
    style("3d-extrude", "3D Extrude", "Stacked shadows extrude the text", Effect, false),
    style("neon-flicker", "Neon Flicker", "Glowing text that briefly cuts out", Effect, false),
    style("long-shadow", "Long Shadow", "A long diagonal fading shadow", Effect, false),
];

/// Every style in catalog order.
pub fn all_styles() -> &'static [AnimationStyleMeta] {
    &STYLES
}

/// Look up a style by id (case-insensitive).
pub fn find_style(id: &str) -> Option<&'static AnimationStyleMeta> {
    let id = id.trim();
    STYLES.iter().find(|s| s.id.eq_ignore_ascii_case(id))
}

/// Styles belonging to `category`, in catalog order.
pub fn styles_in(category: StyleCategory) -> Vec<&'static AnimationStyleMeta> {
    STYLES.iter().filter(|s| s.category == category).collect()
}

/// Strategy for a style id. Unknown ids resolve to the fallback style's
/// strategy.
pub fn strategy_for(id: &str) -> CaptionStrategy {
    find_style(id)
        .map(|s| s.strategy())
        .unwrap_or(CaptionStrategy::SubtitleFile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_35_unique_ids() {
        let ids: HashSet<&str> = all_styles().iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 35);
        assert!(ids.contains(FALLBACK_STYLE_ID));
    }

    #[test]
    fn test_category_sizes() {
        assert_eq!(styles_in(StyleCategory::Basic).len(), 6);
        assert_eq!(styles_in(StyleCategory::Styled).len(), 15);
        assert_eq!(styles_in(StyleCategory::Word).len(), 7);
        assert_eq!(styles_in(StyleCategory::Effect).len(), 7);
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(strategy_for("none"), CaptionStrategy::SubtitleFile);
        assert_eq!(strategy_for("fade"), CaptionStrategy::SubtitleFile);
        assert_eq!(strategy_for("karaoke"), CaptionStrategy::SubtitleFile);
        assert_eq!(strategy_for("word-highlight"), CaptionStrategy::WordHighlight);
        assert_eq!(strategy_for("glitch"), CaptionStrategy::Effect);
        assert_eq!(strategy_for("made-up-style"), CaptionStrategy::SubtitleFile);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(find_style("Word-Glow").map(|s| s.id), Some("word-glow"));
        assert!(find_style("sparkle").is_none());
        assert_eq!(StyleCategory::parse("EFFECT"), Some(StyleCategory::Effect));
    }

    #[test]
    fn test_every_word_style_requires_timing() {
        assert!(styles_in(StyleCategory::Word)
            .iter()
            .all(|s| s.requires_word_timing));
    }
}
