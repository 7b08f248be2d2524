//! Subtitle-file strategy: `basic` and `styled` captions as an ASS script.
//!
//! Every style is a [`StyleRecipe`]. Generators share one pipeline: take
//! each segment's words, regroup them, then emit dialogue events whose
//! override tags come from the recipe's [`Markup`].

use rand::Rng;
use storyreel_media_model::{CaptionOptions, SubtitleSegment, WordTiming};

use crate::ass::{escape_text, AssScript, AssStyle, DEFAULT_STYLE};
use crate::color::{hex_to_ass, hex_to_ass_alpha, hex_to_ass_inline};
use crate::layout::{
    anchor_point, block_top, estimate_text_width, line_height, line_left, pill_path, wrap_ranges,
    Margins,
};
use crate::timing::{chunk_by_pattern, extract_word_timings};

use super::{hold_groups, max_line_width, TimedGroup};

/// How a segment's words are split into dialogue events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// One event for the whole segment.
    Segment,
    /// Consecutive words with group sizes cycling through the pattern.
    Beat(&'static [usize]),
    /// `words_per_line` words per event.
    Line,
}

/// Per-event decoration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Markup {
    Plain,
    Fade { in_ms: u32, out_ms: u32 },
    PopIn,
    SlideUp,
    Typewriter,
    ScaleIn,
    /// Groups alternate between `-degrees` and `+degrees` of rotation.
    Tilt { degrees: f64 },
    /// Blurred coloured copy underneath the text.
    Glow { blur: f64 },
    ScaleBounce,
    Karaoke,
    /// One randomly chosen word per group in the highlight colour.
    Emphasis,
    Pill,
    Stacked,
    ColorCycle,
    LowerThird,
    WordPill,
}

/// Base style adjustments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Look {
    pub outline: f64,
    pub shadow: f64,
    pub opaque_box: bool,
    pub uppercase: bool,
    /// Font size multiplier.
    pub scale: f64,
    pub spacing: f64,
}

const PLAIN: Look = Look {
    outline: 3.0,
    shadow: 0.0,
    opaque_box: false,
    uppercase: false,
    scale: 1.0,
    spacing: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleRecipe {
    pub id: &'static str,
    pub grouping: Grouping,
    pub markup: Markup,
    pub look: Look,
}

const fn recipe(id: &'static str, grouping: Grouping, markup: Markup, look: Look) -> StyleRecipe {
    StyleRecipe {
        id,
        grouping,
        markup,
        look,
    }
}

static RECIPES: [StyleRecipe; 21] = [
    recipe("none", Grouping::Segment, Markup::Plain, PLAIN),
    recipe("fade", Grouping::Segment, Markup::Fade { in_ms: 200, out_ms: 200 }, PLAIN),
    recipe("pop-in", Grouping::Segment, Markup::PopIn, PLAIN),
    recipe("slide-up", Grouping::Segment, Markup::SlideUp, PLAIN),
    recipe("typewriter", Grouping::Segment, Markup::Typewriter, PLAIN),
    recipe("scale-in", Grouping::Segment, Markup::ScaleIn, PLAIN),
    recipe(
        "bold-stroke",
        Grouping::Line,
        Markup::Plain,
        Look { outline: 7.0, uppercase: true, ..PLAIN },
    ),
    recipe(
        "boxed",
        Grouping::Line,
        Markup::Plain,
        Look { outline: 14.0, opaque_box: true, ..PLAIN },
    ),
    recipe("pill", Grouping::Beat(&[3]), Markup::Pill, Look { outline: 0.0, ..PLAIN }),
    recipe("neon-glow", Grouping::Line, Markup::Glow { blur: 8.0 }, Look { outline: 2.0, ..PLAIN }),
    recipe("tilted", Grouping::Beat(&[2, 3]), Markup::Tilt { degrees: 4.0 }, Look { outline: 5.0, uppercase: true, ..PLAIN }),
    recipe("scale-bounce", Grouping::Beat(&[2]), Markup::ScaleBounce, Look { outline: 4.0, ..PLAIN }),
    recipe("karaoke", Grouping::Line, Markup::Karaoke, PLAIN),
    recipe(
        "hormozi",
        Grouping::Beat(&[1, 4, 2]),
        Markup::Emphasis,
        Look { outline: 5.0, uppercase: true, scale: 1.1, ..PLAIN },
    ),
    recipe(
        "impact-pop",
        Grouping::Beat(&[1]),
        Markup::PopIn,
        Look { outline: 6.0, uppercase: true, scale: 1.4, ..PLAIN },
    ),
    recipe("stacked", Grouping::Beat(&[2, 3]), Markup::Stacked, Look { outline: 5.0, uppercase: true, ..PLAIN }),
    recipe("color-cycle", Grouping::Beat(&[3]), Markup::ColorCycle, Look { outline: 4.0, ..PLAIN }),
    recipe("shadow-drop", Grouping::Line, Markup::Plain, Look { outline: 1.0, shadow: 6.0, ..PLAIN }),
    recipe(
        "lower-third",
        Grouping::Segment,
        Markup::LowerThird,
        Look { outline: 10.0, opaque_box: true, scale: 0.7, ..PLAIN },
    ),
    recipe(
        "cinematic",
        Grouping::Segment,
        Markup::Fade { in_ms: 400, out_ms: 400 },
        Look { outline: 0.0, shadow: 2.0, uppercase: true, spacing: 6.0, ..PLAIN },
    ),
    recipe("word-pill", Grouping::Line, Markup::WordPill, Look { outline: 0.0, ..PLAIN }),
];

pub fn recipe_for(id: &str) -> Option<&'static StyleRecipe> {
    RECIPES.iter().find(|r| r.id == id)
}

pub fn recipes() -> &'static [StyleRecipe] {
    &RECIPES
}

/// Colours `color-cycle` rotates through after the two option colours.
const CYCLE_EXTRAS: [&str; 2] = ["#00E5FF", "#FF4FD8"];

/// Render `segments` as a full ASS script.
pub fn generate<R: Rng>(
    recipe: &StyleRecipe,
    segments: &[SubtitleSegment],
    options: &CaptionOptions,
    rng: &mut R,
) -> String {
    let font_size = ((options.font_size as f64 * recipe.look.scale).round() as u32).max(1);
    let mut script = AssScript::new(options.video_width, options.video_height);
    script.add_style(base_style(recipe, options, font_size));

    let emitter = Emitter {
        recipe,
        options,
        font_size,
    };

    for segment in segments {
        let words = extract_word_timings(segment);
        if words.is_empty() {
            continue;
        }
        let words: Vec<WordTiming> = if recipe.look.uppercase {
            words
                .into_iter()
                .map(|w| WordTiming::new(w.word.to_uppercase(), w.start, w.end))
                .collect()
        } else {
            words
        };

        for (index, group) in group_words(recipe.grouping, segment, &words, options).iter().enumerate() {
            emitter.emit(&mut script, group, index, rng);
        }
    }

    script.render()
}

fn base_style(recipe: &StyleRecipe, options: &CaptionOptions, font_size: u32) -> AssStyle {
    let mut style = AssStyle::from_options(DEFAULT_STYLE, options);
    style.font_size = font_size;
    style.outline = recipe.look.outline;
    style.shadow = recipe.look.shadow;
    style.spacing = recipe.look.spacing;
    if recipe.look.opaque_box {
        // libass paints the opaque box with the outline colour
        style.border_style = 3;
        style.outline_color = hex_to_ass_alpha("#000000", 0x60);
        style.back_color = hex_to_ass_alpha("#000000", 0x60);
    }
    if recipe.look.shadow > 0.0 {
        style.back_color = hex_to_ass_alpha("#000000", 0x40);
    }
    if recipe.markup == Markup::Karaoke {
        // \kf sweeps from secondary to primary
        style.primary = hex_to_ass(&options.highlight_color);
        style.secondary = hex_to_ass(&options.font_color);
    }
    style
}

fn group_words<'a>(
    grouping: Grouping,
    segment: &SubtitleSegment,
    words: &'a [WordTiming],
    options: &CaptionOptions,
) -> Vec<TimedGroup<'a>> {
    let chunks = match grouping {
        Grouping::Segment => {
            return vec![TimedGroup {
                words,
                start: segment.start_time,
                end: segment.end_time,
            }]
        }
        Grouping::Beat(pattern) => chunk_by_pattern(words, pattern),
        Grouping::Line => chunk_by_pattern(words, &[options.words_per_line.max(1)]),
    };
    hold_groups(segment, &chunks)
}

struct Emitter<'a> {
    recipe: &'a StyleRecipe,
    options: &'a CaptionOptions,
    font_size: u32,
}

impl Emitter<'_> {
    fn emit<R: Rng>(&self, script: &mut AssScript, group: &TimedGroup<'_>, index: usize, rng: &mut R) {
        let (start, end) = (group.start, group.end);
        match self.recipe.markup {
            Markup::Plain => script.push_event(0, start, end, DEFAULT_STYLE, self.wrapped(group.words)),
            Markup::Fade { in_ms, out_ms } => script.push_event(
                0,
                start,
                end,
                DEFAULT_STYLE,
                format!("{{\\fad({in_ms},{out_ms})}}{}", self.wrapped(group.words)),
            ),
            Markup::PopIn => script.push_event(
                0,
                start,
                end,
                DEFAULT_STYLE,
                format!(
                    "{{\\fscx70\\fscy70\\t(0,90,\\fscx112\\fscy112)\\t(90,170,\\fscx100\\fscy100)}}{}",
                    self.wrapped(group.words)
                ),
            ),
            Markup::SlideUp => {
                let (x, y) = anchor_point(
                    self.options.position,
                    self.options.video_width,
                    self.options.video_height,
                );
                let (x, y) = (x.round() as i64, y.round() as i64);
                script.push_event(
                    0,
                    start,
                    end,
                    DEFAULT_STYLE,
                    format!(
                        "{{\\move({x},{},{x},{y},0,220)\\fad(120,0)}}{}",
                        y + 60,
                        self.wrapped(group.words)
                    ),
                );
            }
            Markup::ScaleIn => script.push_event(
                0,
                start,
                end,
                DEFAULT_STYLE,
                format!(
                    "{{\\fscx0\\fscy0\\t(0,300,\\fscx100\\fscy100)}}{}",
                    self.wrapped(group.words)
                ),
            ),
            Markup::Typewriter => self.typewriter(script, group),
            Markup::Tilt { degrees } => {
                let angle = if index % 2 == 0 { -degrees } else { degrees };
                script.push_event(
                    0,
                    start,
                    end,
                    DEFAULT_STYLE,
                    format!("{{\\frz{angle}}}{}", self.wrapped(group.words)),
                );
            }
            Markup::Glow { blur } => {
                let glow = hex_to_ass_inline(&self.options.highlight_color);
                let text = self.wrapped(group.words);
                script.push_event(
                    0,
                    start,
                    end,
                    DEFAULT_STYLE,
                    format!("{{\\blur{blur}\\bord8\\3c{glow}\\c{glow}}}{text}"),
                );
                script.push_event(1, start, end, DEFAULT_STYLE, format!("{{\\3c{glow}}}{text}"));
            }
            Markup::ScaleBounce => script.push_event(
                0,
                start,
                end,
                DEFAULT_STYLE,
                format!(
                    "{{\\t(0,80,\\fscx118\\fscy118)\\t(80,180,\\fscx100\\fscy100)}}{}",
                    self.wrapped(group.words)
                ),
            ),
            Markup::Karaoke => self.karaoke(script, group),
            Markup::Emphasis => {
                let chosen = rng.gen_range(0..group.words.len());
                let accent = hex_to_ass_inline(&self.options.highlight_color);
                let text = group
                    .words
                    .iter()
                    .enumerate()
                    .map(|(i, w)| {
                        let word = escape_text(&w.word);
                        if i == chosen {
                            format!("{{\\c{accent}\\fscx115\\fscy115}}{word}{{\\r}}")
                        } else {
                            word
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                script.push_event(0, start, end, DEFAULT_STYLE, text);
            }
            Markup::Pill => self.pill(script, group),
            Markup::Stacked => {
                let big = (self.font_size as f64 * 1.2).round() as u32;
                let small = (self.font_size as f64 * 0.8).round() as u32;
                let text = group
                    .words
                    .iter()
                    .enumerate()
                    .map(|(i, w)| {
                        let size = if i % 2 == 0 { big } else { small };
                        format!("{{\\fs{size}}}{}", escape_text(&w.word))
                    })
                    .collect::<Vec<_>>()
                    .join("\\N");
                script.push_event(0, start, end, DEFAULT_STYLE, text);
            }
            Markup::ColorCycle => {
                let palette = [
                    self.options.font_color.as_str(),
                    self.options.highlight_color.as_str(),
                    CYCLE_EXTRAS[0],
                    CYCLE_EXTRAS[1],
                ];
                let color = hex_to_ass_inline(palette[index % palette.len()]);
                script.push_event(
                    0,
                    start,
                    end,
                    DEFAULT_STYLE,
                    format!("{{\\c{color}}}{}", self.wrapped(group.words)),
                );
            }
            Markup::LowerThird => {
                let margins = Margins::for_frame(self.options.video_width, self.options.video_height);
                let x = margins.horizontal.round() as i64;
                let y = (self.options.video_height as f64 - margins.bottom * 0.6).round() as i64;
                script.push_event(
                    0,
                    start,
                    end,
                    DEFAULT_STYLE,
                    format!("{{\\an1\\pos({x},{y})\\fad(250,250)}}{}", self.wrapped(group.words)),
                );
            }
            Markup::WordPill => self.word_pill(script, group),
        }
    }

    /// Group text broken into lines with `\N`.
    fn wrapped(&self, words: &[WordTiming]) -> String {
        let texts: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        wrap_ranges(&texts, max_line_width(self.options), self.font_size, 0)
            .into_iter()
            .map(|range| escape_text(&texts[range].join(" ")))
            .collect::<Vec<_>>()
            .join("\\N")
    }

    /// Positions (in word indices) where a new line begins.
    fn line_breaks(&self, words: &[WordTiming]) -> Vec<usize> {
        let texts: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        wrap_ranges(&texts, max_line_width(self.options), self.font_size, 0)
            .into_iter()
            .skip(1)
            .map(|range| range.start)
            .collect()
    }

    /// Cumulative reveal: event `i` shows words `0..=i`, the rest are laid out
    /// but fully transparent so lines don't reflow.
    fn typewriter(&self, script: &mut AssScript, group: &TimedGroup<'_>) {
        let breaks = self.line_breaks(group.words);
        for (i, word) in group.words.iter().enumerate() {
            let start = if i == 0 { group.start } else { word.start };
            let end = group.words.get(i + 1).map(|next| next.start).unwrap_or(group.end);

            let mut text = String::new();
            for (j, w) in group.words.iter().enumerate() {
                if j > 0 {
                    text.push_str(if breaks.contains(&j) { "\\N" } else { " " });
                }
                if j == i + 1 {
                    text.push_str("{\\alpha&HFF&}");
                }
                text.push_str(&escape_text(&w.word));
            }
            script.push_event(0, start, end, DEFAULT_STYLE, text);
        }
    }

    fn karaoke(&self, script: &mut AssScript, group: &TimedGroup<'_>) {
        let breaks = self.line_breaks(group.words);
        let centis = |secs: f64| (secs.max(0.0) * 100.0).round() as i64;

        let mut text = String::new();
        let lead = centis(group.words[0].start - group.start);
        if lead > 0 {
            text.push_str(&format!("{{\\k{lead}}}"));
        }
        for (j, w) in group.words.iter().enumerate() {
            if j > 0 {
                text.push_str(if breaks.contains(&j) { "\\N" } else { " " });
            }
            let until = group.words.get(j + 1).map(|next| next.start).unwrap_or(w.end);
            text.push_str(&format!("{{\\kf{}}}{}", centis(until - w.start), escape_text(&w.word)));
        }
        script.push_event(0, group.start, group.end, DEFAULT_STYLE, text);
    }

    fn pill_padding(&self) -> f64 {
        self.font_size as f64 * 0.45
    }

    fn pill(&self, script: &mut AssScript, group: &TimedGroup<'_>) {
        let text = escape_text(
            &group
                .words
                .iter()
                .map(|w| w.word.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        );
        let pad = self.pill_padding();
        let pill_w = estimate_text_width(&text, self.font_size) + 2.0 * pad;
        let pill_h = line_height(self.font_size) + pad * 0.5;
        let left = line_left(self.options.position, pill_w, self.options.video_width);
        let top = block_top(self.options.position, pill_h, self.options.video_height);
        let fill = hex_to_ass_inline(&self.options.highlight_color);

        script.push_event(
            0,
            group.start,
            group.end,
            DEFAULT_STYLE,
            format!(
                "{{\\an7\\pos({},{})\\bord0\\shad0\\c{fill}\\alpha&H20&\\p1}}{}{{\\p0}}",
                left.round() as i64,
                top.round() as i64,
                pill_path(pill_w, pill_h)
            ),
        );
        script.push_event(
            1,
            group.start,
            group.end,
            DEFAULT_STYLE,
            format!(
                "{{\\an5\\pos({},{})\\bord0}}{text}",
                (left + pill_w / 2.0).round() as i64,
                (top + pill_h / 2.0).round() as i64
            ),
        );
    }

    /// One line of words with a pill sliding under whichever word is spoken.
    fn word_pill(&self, script: &mut AssScript, group: &TimedGroup<'_>) {
        let texts: Vec<String> = group.words.iter().map(|w| escape_text(&w.word)).collect();
        let line = texts.join(" ");
        let line_w = estimate_text_width(&line, self.font_size);
        let line_h = line_height(self.font_size);
        let left = line_left(self.options.position, line_w, self.options.video_width);
        let top = block_top(self.options.position, line_h, self.options.video_height);
        let pad = self.pill_padding() * 0.6;
        let fill = hex_to_ass_inline(&self.options.highlight_color);

        let mut offset = 0.0;
        for (i, (word, text)) in group.words.iter().zip(&texts).enumerate() {
            let word_w = estimate_text_width(text, self.font_size);
            let start = if i == 0 { group.start } else { word.start };
            let end = group.words.get(i + 1).map(|next| next.start).unwrap_or(group.end);
            script.push_event(
                0,
                start,
                end,
                DEFAULT_STYLE,
                format!(
                    "{{\\an7\\pos({},{})\\bord0\\shad0\\c{fill}\\p1}}{}{{\\p0}}",
                    (left + offset - pad).round() as i64,
                    (top - pad * 0.25).round() as i64,
                    pill_path(word_w + 2.0 * pad, line_h + pad * 0.5)
                ),
            );
            offset += word_w + estimate_text_width(" ", self.font_size);
        }

        script.push_event(
            1,
            group.start,
            group.end,
            DEFAULT_STYLE,
            format!(
                "{{\\an7\\pos({},{})\\bord0}}{line}",
                left.round() as i64,
                top.round() as i64
            ),
        );
    }
}
