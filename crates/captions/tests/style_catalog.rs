use storyreel_captions::styles::is_implemented;
use storyreel_captions::{all_styles, CaptionEngine, CaptionPlan, CaptionStrategy};
use storyreel_media_model::{CaptionOptions, SubtitleSegment, WordTiming};

fn options(style: &str) -> CaptionOptions {
    CaptionOptions {
        animation_style: style.to_string(),
        ..CaptionOptions::default()
    }
}

fn sample_segments() -> Vec<SubtitleSegment> {
    vec![
        SubtitleSegment::new("Stop scrolling and watch this", 0.0, 2.4),
        SubtitleSegment::new("it changes everything you know", 2.6, 5.0).with_word_timings(vec![
            WordTiming::new("it", 2.6, 2.8),
            WordTiming::new("changes", 2.8, 3.4),
            WordTiming::new("everything", 3.4, 4.1),
            WordTiming::new("you", 4.1, 4.4),
            WordTiming::new("know", 4.4, 5.0),
        ]),
    ]
}

#[test]
fn every_catalog_style_has_an_implementation() {
    for style in all_styles() {
        assert!(is_implemented(style), "style '{}' has no generator", style.id);
    }
}

#[test]
fn every_style_renders_with_its_strategy() {
    let segments = sample_segments();
    let mut engine = CaptionEngine::with_seed(42);

    for style in all_styles() {
        let plan = engine.render(&segments, &options(style.id)).unwrap();
        assert!(!plan.is_empty(), "style '{}' rendered nothing", style.id);
        match (style.strategy(), &plan) {
            (CaptionStrategy::SubtitleFile, CaptionPlan::SubtitleScript(script)) => {
                assert!(script.contains("[Events]"));
            }
            (CaptionStrategy::WordHighlight | CaptionStrategy::Effect, CaptionPlan::Overlays(overlays)) => {
                assert!(overlays.iter().all(|o| o.enable.is_some()));
            }
            (strategy, _) => panic!("style '{}' produced the wrong plan for {strategy:?}", style.id),
        }
    }
}

#[test]
fn same_seed_gives_identical_captions() {
    let segments = sample_segments();
    for style in all_styles() {
        let a = CaptionEngine::with_seed(9)
            .render(&segments, &options(style.id))
            .unwrap();
        let b = CaptionEngine::with_seed(9)
            .render(&segments, &options(style.id))
            .unwrap();
        assert_eq!(a, b, "style '{}' is not deterministic", style.id);
    }
}

#[test]
fn hormozi_emphasis_follows_the_seed() {
    let segment = SubtitleSegment::new(
        "one two three four five six seven eight nine ten eleven twelve thirteen fourteen",
        0.0,
        14.0,
    );
    let render = |seed| {
        CaptionEngine::with_seed(seed)
            .render(std::slice::from_ref(&segment), &options("hormozi"))
            .unwrap()
            .to_filter_text()
    };

    assert_eq!(render(3), render(3));
    let distinct: std::collections::HashSet<String> = (0..16).map(render).collect();
    assert!(distinct.len() > 1, "emphasis never varies across seeds");
}

#[test]
fn word_highlight_intervals_are_half_open_word_spans() {
    let segment = SubtitleSegment::new("a b", 0.0, 2.0).with_word_timings(vec![
        WordTiming::new("a", 0.0, 1.0),
        WordTiming::new("b", 1.0, 2.0),
    ]);
    let plan = CaptionEngine::with_seed(0)
        .render(&[segment], &options("word-highlight"))
        .unwrap();

    let CaptionPlan::Overlays(overlays) = plan else {
        panic!("word-highlight must produce overlays");
    };
    let windows: Vec<&str> = overlays.iter().filter_map(|o| o.enable.as_deref()).collect();
    let highlights: Vec<&&str> = windows.iter().filter(|w| **w != "gte(t,0)*lt(t,2)").collect();
    assert_eq!(highlights, vec![&"gte(t,0)*lt(t,1)", &"gte(t,1)*lt(t,2)"]);
    assert_eq!(windows.iter().filter(|w| **w == "gte(t,0)*lt(t,2)").count(), 2);
}

#[test]
fn unknown_style_uses_plain_subtitles() {
    let segments = sample_segments();
    let plan = CaptionEngine::with_seed(0)
        .render(&segments, &options("made-up-style"))
        .unwrap();
    let CaptionPlan::SubtitleScript(script) = plan else {
        panic!("fallback must be a subtitle script");
    };
    assert!(script.contains("Stop scrolling"));
    assert!(!script.contains("\\fad"));
}

/// Text value of a rendered `drawtext` filter.
fn text_value(filter: &str) -> &str {
    let start = filter.find("text='").map(|i| i + "text='".len()).unwrap_or(0);
    let len = filter[start..].find('\'').unwrap_or(0);
    &filter[start..start + len]
}

#[test]
fn overlay_text_keeps_filter_syntax_literal() {
    let segments = vec![SubtitleSegment::new(r"Step 1: save C:\temp at 100%", 0.0, 3.0)];

    for style in ["word-highlight", "glitch"] {
        let plan = CaptionEngine::with_seed(5).render(&segments, &options(style)).unwrap();
        let CaptionPlan::Overlays(overlays) = plan else {
            panic!("{style} must produce overlays");
        };

        let texts: Vec<String> = overlays.iter().map(|o| text_value(&o.to_filter()).to_string()).collect();
        for text in &texts {
            let bytes = text.as_bytes();
            for (i, byte) in bytes.iter().enumerate() {
                if *byte == b':' {
                    assert!(i > 0 && bytes[i - 1] == b'\\', "{style}: unescaped ':' in {text}");
                }
            }
        }
        assert!(texts.iter().any(|t| t.contains(r"\\")), "{style}: backslash lost");
        assert!(texts.iter().any(|t| t.contains('%')), "{style}: percent lost");
    }
}
