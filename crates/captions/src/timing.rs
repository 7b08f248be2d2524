//! Word-level timing for caption segments.

use storyreel_media_model::{SubtitleSegment, WordTiming};

/// Share of a segment's duration left empty at each end when word timings
/// have to be synthesized.
pub const EDGE_BUFFER_FRACTION: f64 = 0.05;

/// Word timings for `segment`.
///
/// Explicit timings are returned unchanged. Otherwise the text is split on
/// whitespace and the span between two 5% edge buffers is shared evenly
/// between the words, so the result is non-decreasing, stays inside the
/// segment, and has exactly one entry per word.
pub fn extract_word_timings(segment: &SubtitleSegment) -> Vec<WordTiming> {
    if let Some(timings) = segment.word_timings.as_ref().filter(|t| !t.is_empty()) {
        return timings.clone();
    }

    let words: Vec<&str> = segment.text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let count = words.len();
    let duration = segment.duration();
    let buffer = duration * EDGE_BUFFER_FRACTION;
    let per_word = (duration - 2.0 * buffer) / count as f64;
    let origin = segment.start_time + buffer;

    words
        .into_iter()
        .enumerate()
        .map(|(i, word)| {
            let start = origin + per_word * i as f64;
            // Pin the last word to the buffer edge so rounding never spills past it.
            let end = if i + 1 == count {
                segment.end_time - buffer
            } else {
                start + per_word
            };
            WordTiming::new(word, start, end.max(start))
        })
        .collect()
}

/// All words of all segments as one ordered stream.
pub fn flatten_words(segments: &[SubtitleSegment]) -> Vec<WordTiming> {
    segments.iter().flat_map(extract_word_timings).collect()
}

/// Split `words` into consecutive groups whose sizes repeat `pattern`.
///
/// `[1, 4, 2]` yields groups of one, four, two, one, four, ... words; the
/// final group takes whatever is left. Zero entries count as one and an
/// empty pattern means one word per group.
pub fn chunk_by_pattern<'a>(words: &'a [WordTiming], pattern: &[usize]) -> Vec<&'a [WordTiming]> {
    let mut chunks = Vec::new();
    let mut cursor = 0;
    let mut beat = 0;

    while cursor < words.len() {
        let size = if pattern.is_empty() {
            1
        } else {
            pattern[beat % pattern.len()].max(1)
        };
        let end = (cursor + size).min(words.len());
        chunks.push(&words[cursor..end]);
        cursor = end;
        beat += 1;
    }

    chunks
}

/// Text of a word group, space separated.
pub fn join_words(words: &[WordTiming]) -> String {
    words
        .iter()
        .map(|w| w.word.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Segments moved `offset` seconds later on the timeline, word timings
/// included.
pub fn offset_segments(segments: &[SubtitleSegment], offset: f64) -> Vec<SubtitleSegment> {
    segments
        .iter()
        .map(|segment| SubtitleSegment {
            text: segment.text.clone(),
            start_time: segment.start_time + offset,
            end_time: segment.end_time + offset,
            word_timings: segment.word_timings.as_ref().map(|timings| {
                timings
                    .iter()
                    .map(|w| WordTiming::new(w.word.clone(), w.start + offset, w.end + offset))
                    .collect()
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_offset_moves_segments_and_words() {
        let segments = vec![
            SubtitleSegment::new("plain", 0.0, 1.0),
            SubtitleSegment::new("a b", 1.0, 2.0)
                .with_word_timings(vec![WordTiming::new("a", 1.0, 1.5), WordTiming::new("b", 1.5, 2.0)]),
        ];
        let shifted = offset_segments(&segments, 2.5);

        assert_eq!((shifted[0].start_time, shifted[0].end_time), (2.5, 3.5));
        assert!(shifted[0].word_timings.is_none());
        let words = shifted[1].word_timings.as_ref().unwrap();
        assert_eq!((words[0].start, words[0].end), (3.5, 4.0));
        assert_eq!((words[1].start, words[1].end), (4.0, 4.5));
        assert_eq!(offset_segments(&segments, 0.0), segments);
    }

    #[test]
    fn test_explicit_timings_pass_through() {
        let timings = vec![WordTiming::new("hi", 1.0, 1.2), WordTiming::new("there", 1.3, 2.0)];
        let segment = SubtitleSegment::new("hi there", 1.0, 2.0).with_word_timings(timings.clone());
        assert_eq!(extract_word_timings(&segment), timings);
    }

    #[test]
    fn test_synthesized_timings_leave_edge_buffers() {
        let segment = SubtitleSegment::new("one two three four", 0.0, 2.0);
        let words = extract_word_timings(&segment);
        assert_eq!(words.len(), 4);
        assert!((words[0].start - 0.1).abs() < 1e-9);
        assert!((words[3].end - 1.9).abs() < 1e-9);
        assert!((words[1].start - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_has_no_words() {
        assert!(extract_word_timings(&SubtitleSegment::new("   ", 0.0, 1.0)).is_empty());
    }

    #[test]
    fn test_chunk_by_beat_pattern() {
        let segment = SubtitleSegment::new("a b c d e f g h i", 0.0, 9.0);
        let words = extract_word_timings(&segment);
        let sizes: Vec<usize> = chunk_by_pattern(&words, &[1, 4, 2]).iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![1, 4, 2, 1, 1]);
        assert_eq!(chunk_by_pattern(&words, &[]).len(), 9);
        assert_eq!(chunk_by_pattern(&words, &[0, 3]).len(), 5);
    }

    #[test]
    fn test_flatten_keeps_segment_order() {
        let segments = vec![
            SubtitleSegment::new("first words", 0.0, 1.0),
            SubtitleSegment::new("then more", 2.0, 3.0),
        ];
        let words = flatten_words(&segments);
        assert_eq!(join_words(&words), "first words then more");
        assert!(words[2].start >= 2.0);
    }

    proptest! {
        #[test]
        fn synthesized_timings_are_ordered_and_bounded(
            word_count in 1usize..40,
            start in 0.0f64..100.0,
            duration in 0.1f64..30.0,
        ) {
            let text = vec!["word"; word_count].join(" ");
            let segment = SubtitleSegment::new(text, start, start + duration);
            let words = extract_word_timings(&segment);

            prop_assert_eq!(words.len(), word_count);
            prop_assert!(words[0].start >= segment.start_time);
            prop_assert!(words[word_count - 1].end <= segment.end_time);
            for pair in words.windows(2) {
                prop_assert!(pair[0].start <= pair[1].start);
                prop_assert!(pair[0].end <= pair[1].start + 1e-9);
            }
            for w in &words {
                prop_assert!(w.start <= w.end);
            }
        }
    }
}
