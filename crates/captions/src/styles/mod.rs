//! Style implementations, one module per execution strategy.

pub mod effect;
pub mod subtitle;
pub mod word;

use storyreel_media_model::{CaptionOptions, SubtitleSegment, WordTiming};

use crate::layout::SAFE_WIDTH_FRACTION;
use crate::registry::{AnimationStyleMeta, CaptionStrategy};

/// Whether the strategy module behind `style` has an implementation for it.
pub fn is_implemented(style: &AnimationStyleMeta) -> bool {
    match style.strategy() {
        CaptionStrategy::SubtitleFile => subtitle::recipe_for(style.id).is_some(),
        CaptionStrategy::WordHighlight => word::look_for(style.id).is_some(),
        CaptionStrategy::Effect => effect::recipe_for(style.id).is_some(),
    }
}

pub(crate) fn max_line_width(options: &CaptionOptions) -> f64 {
    options.video_width as f64 * SAFE_WIDTH_FRACTION
}

/// A run of words shown together, with its on-screen span.
pub(crate) struct TimedGroup<'a> {
    pub words: &'a [WordTiming],
    pub start: f64,
    pub end: f64,
}

/// Give each chunk a span from its first word until the next chunk starts,
/// so captions never blink out mid-segment. The last chunk ends with its
/// last word.
pub(crate) fn hold_groups<'a>(
    segment: &SubtitleSegment,
    chunks: &[&'a [WordTiming]],
) -> Vec<TimedGroup<'a>> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let start = chunk.first().map(|w| w.start).unwrap_or(segment.start_time);
            let end = match chunks.get(i + 1).and_then(|next| next.first()) {
                Some(next) => next.start,
                None => chunk.last().map(|w| w.end).unwrap_or(segment.end_time),
            };
            TimedGroup {
                words: chunk,
                start,
                end: end.max(start),
            }
        })
        .collect()
}
