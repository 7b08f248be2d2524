//! Caption style engine.
//!
//! Resolves a style id to its strategy and renders segments into either an
//! ASS script or a list of `drawtext` overlays. Styles with randomised
//! variety draw from the engine's own seedable RNG, so the same seed and
//! inputs always produce the same captions.

use rand::rngs::StdRng;
use rand::SeedableRng;
use storyreel_common::error::{StoryreelError, StoryreelResult};
use storyreel_media_model::{validate_dimensions, CaptionOptions, SubtitleSegment};

use crate::drawtext::{overlay_chain, DrawText};
use crate::registry::{all_styles, find_style, AnimationStyleMeta, CaptionStrategy, FALLBACK_STYLE_ID};
use crate::styles::{effect, subtitle, word};

/// Renderer-ready captions.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptionPlan {
    /// Complete ASS script, burned in with the `subtitles` filter.
    SubtitleScript(String),
    /// `drawtext` overlays, applied as one filter chain.
    Overlays(Vec<DrawText>),
}

impl CaptionPlan {
    /// Text handed to ffmpeg: the script itself, or the overlay chain.
    pub fn to_filter_text(&self) -> String {
        match self {
            CaptionPlan::SubtitleScript(script) => script.clone(),
            CaptionPlan::Overlays(overlays) => overlay_chain(overlays),
        }
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            CaptionPlan::SubtitleScript(script) => !script.contains("\nDialogue:"),
            CaptionPlan::Overlays(overlays) => overlays.is_empty(),
        }
    }
}

pub struct CaptionEngine {
    rng: StdRng,
}

impl Default for CaptionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptionEngine {
    /// Engine seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Catalog entry for `id`, or the fallback style when the id is unknown.
    pub fn resolve_style(id: &str) -> &'static AnimationStyleMeta {
        match find_style(id) {
            Some(style) => style,
            None => {
                tracing::debug!(requested = id, fallback = FALLBACK_STYLE_ID, "Unknown caption style, using fallback");
                find_style(FALLBACK_STYLE_ID).unwrap_or(&all_styles()[0])
            }
        }
    }

    /// Check `segments` and `options` without rendering anything.
    pub fn validate(segments: &[SubtitleSegment], options: &CaptionOptions) -> StoryreelResult<()> {
        validate_dimensions(options.video_width, options.video_height)?;
        if options.font_size == 0 {
            return Err(StoryreelError::validation("caption font size must be positive"));
        }
        for segment in segments {
            if !(segment.start_time.is_finite() && segment.end_time.is_finite())
                || segment.end_time < segment.start_time
            {
                return Err(StoryreelError::validation(format!(
                    "caption segment '{}' has an invalid span {}..{}",
                    segment.text, segment.start_time, segment.end_time
                )));
            }
        }
        Ok(())
    }

    /// Render `segments` with the style named in `options.animation_style`.
    pub fn render(
        &mut self,
        segments: &[SubtitleSegment],
        options: &CaptionOptions,
    ) -> StoryreelResult<CaptionPlan> {
        Self::validate(segments, options)?;
        let style = Self::resolve_style(&options.animation_style);
        self.render_style(style, segments, options)
    }

    /// Render with an already resolved style. A style whose generator is
    /// missing renders with the fallback subtitle generator.
    fn render_style(
        &mut self,
        style: &AnimationStyleMeta,
        segments: &[SubtitleSegment],
        options: &CaptionOptions,
    ) -> StoryreelResult<CaptionPlan> {
        let plan = match style.strategy() {
            CaptionStrategy::SubtitleFile => subtitle::recipe_for(style.id)
                .map(|recipe| CaptionPlan::SubtitleScript(subtitle::generate(recipe, segments, options, &mut self.rng))),
            CaptionStrategy::WordHighlight => word::look_for(style.id)
                .map(|look| CaptionPlan::Overlays(word::build_overlays(look, segments, options))),
            CaptionStrategy::Effect => effect::recipe_for(style.id)
                .map(|recipe| CaptionPlan::Overlays(effect::build_overlays(recipe, segments, options))),
        };

        let plan = match plan {
            Some(plan) => plan,
            None => {
                tracing::debug!(style = style.id, fallback = FALLBACK_STYLE_ID, "No generator for caption style, using fallback");
                let recipe = subtitle::recipe_for(FALLBACK_STYLE_ID)
                    .ok_or_else(|| StoryreelError::render("fallback caption style has no generator"))?;
                CaptionPlan::SubtitleScript(subtitle::generate(recipe, segments, options, &mut self.rng))
            }
        };

        tracing::debug!(
            style = style.id,
            segments = segments.len(),
            strategy = ?style.strategy(),
            "Caption plan built"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StyleCategory;
    use storyreel_common::error::ErrorKind;

    fn options(style: &str) -> CaptionOptions {
        CaptionOptions {
            animation_style: style.to_string(),
            ..CaptionOptions::default()
        }
    }

    #[test]
    fn test_unknown_style_falls_back_to_none() {
        let segments = vec![SubtitleSegment::new("Hello there", 0.0, 2.0)];
        let mut engine = CaptionEngine::with_seed(1);
        let fallback = engine.render(&segments, &options("made-up-style")).unwrap();
        let none = engine.render(&segments, &options("none")).unwrap();
        assert_eq!(fallback, none);
        assert!(matches!(fallback, CaptionPlan::SubtitleScript(_)));
    }

    #[test]
    fn test_style_without_generator_falls_back_to_none() {
        let segments = vec![SubtitleSegment::new("Hello there", 0.0, 2.0)];
        let expected = CaptionEngine::with_seed(3).render(&segments, &options("none")).unwrap();

        for category in [StyleCategory::Word, StyleCategory::Effect] {
            let unbuilt = AnimationStyleMeta {
                id: "unbuilt",
                name: "Unbuilt",
                description: "",
                category,
                requires_word_timing: true,
            };
            let plan = CaptionEngine::with_seed(3)
                .render_style(&unbuilt, &segments, &options("none"))
                .unwrap();
            assert_eq!(plan, expected);
        }
    }

    #[test]
    fn test_strategy_dispatch() {
        let segments = vec![SubtitleSegment::new("Hello there", 0.0, 2.0)];
        let mut engine = CaptionEngine::with_seed(1);
        assert!(matches!(
            engine.render(&segments, &options("word-box")).unwrap(),
            CaptionPlan::Overlays(_)
        ));
        assert!(matches!(
            engine.render(&segments, &options("ice")).unwrap(),
            CaptionPlan::Overlays(_)
        ));
        assert!(matches!(
            engine.render(&segments, &options("karaoke")).unwrap(),
            CaptionPlan::SubtitleScript(_)
        ));
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let mut engine = CaptionEngine::with_seed(1);
        let mut bad = options("none");
        bad.video_width = 0;
        let err = engine.render(&[], &bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let backwards = vec![SubtitleSegment::new("x", 3.0, 1.0)];
        assert!(engine.render(&backwards, &options("none")).is_err());
    }

    #[test]
    fn test_empty_input_produces_empty_plan() {
        let mut engine = CaptionEngine::with_seed(1);
        assert!(engine.render(&[], &options("fade")).unwrap().is_empty());
        assert!(engine.render(&[], &options("word-pop")).unwrap().is_empty());
    }
}
