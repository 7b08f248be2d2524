//! Caption inputs: timed segments, word timings, and presentation options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single spoken word with timing, in seconds on the video timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl WordTiming {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// A caption segment as produced by speech-to-text alignment.
///
/// Segments are read-only inputs to rendering; word timings, when present,
/// are monotonically non-decreasing and cover the segment span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSegment {
    pub text: String,

    #[serde(alias = "startTime", alias = "start")]
    pub start_time: f64,

    #[serde(alias = "endTime", alias = "end")]
    pub end_time: f64,

    #[serde(default, alias = "wordTimings", skip_serializing_if = "Option::is_none")]
    pub word_timings: Option<Vec<WordTiming>>,
}

impl SubtitleSegment {
    pub fn new(text: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            text: text.into(),
            start_time,
            end_time,
            word_timings: None,
        }
    }

    pub fn with_word_timings(mut self, timings: Vec<WordTiming>) -> Self {
        self.word_timings = Some(timings);
        self
    }

    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    pub fn has_word_timings(&self) -> bool {
        self.word_timings
            .as_ref()
            .map(|timings| !timings.is_empty())
            .unwrap_or(false)
    }
}

/// Vertical caption anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAnchor {
    Top,
    Middle,
    #[default]
    Bottom,
}

/// Horizontal caption anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAnchor {
    Left,
    #[default]
    Center,
    Right,
}

/// Caption placement: `{top|middle|bottom} × {left|center|right}`.
///
/// Serialized as `"bottom-center"`; a bare vertical anchor (`"top"`) means
/// centred horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaptionPosition {
    pub vertical: VerticalAnchor,
    pub horizontal: HorizontalAnchor,
}

impl CaptionPosition {
    pub fn new(vertical: VerticalAnchor, horizontal: HorizontalAnchor) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }
}

impl FromStr for CaptionPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let mut parts = normalized.split('-').filter(|p| !p.is_empty());
        let vertical = match parts.next() {
            Some("top") => VerticalAnchor::Top,
            Some("middle") | Some("center") => VerticalAnchor::Middle,
            Some("bottom") => VerticalAnchor::Bottom,
            _ => return Err(format!("invalid caption position '{s}'")),
        };
        let horizontal = match parts.next() {
            None | Some("center") => HorizontalAnchor::Center,
            Some("left") => HorizontalAnchor::Left,
            Some("right") => HorizontalAnchor::Right,
            Some(_) => return Err(format!("invalid caption position '{s}'")),
        };
        if parts.next().is_some() {
            return Err(format!("invalid caption position '{s}'"));
        }
        Ok(Self {
            vertical,
            horizontal,
        })
    }
}

impl TryFrom<String> for CaptionPosition {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CaptionPosition> for String {
    fn from(value: CaptionPosition) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CaptionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertical = match self.vertical {
            VerticalAnchor::Top => "top",
            VerticalAnchor::Middle => "middle",
            VerticalAnchor::Bottom => "bottom",
        };
        let horizontal = match self.horizontal {
            HorizontalAnchor::Left => "left",
            HorizontalAnchor::Center => "center",
            HorizontalAnchor::Right => "right",
        };
        write!(f, "{vertical}-{horizontal}")
    }
}

/// Presentation options for a caption render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionOptions {
    /// Font family name as known to fontconfig.
    pub font: String,

    #[serde(alias = "fontSize")]
    pub font_size: u32,

    /// Base text colour, `#RRGGBB`.
    #[serde(alias = "fontColor")]
    pub font_color: String,

    pub position: CaptionPosition,

    /// Caption style id from the style catalog.
    #[serde(alias = "animationStyle")]
    pub animation_style: String,

    /// Accent colour for highlighted words, `#RRGGBB`.
    #[serde(alias = "highlightColor")]
    pub highlight_color: String,

    /// Upper bound on words per visual line.
    #[serde(alias = "wordsPerLine")]
    pub words_per_line: usize,

    #[serde(alias = "videoWidth")]
    pub video_width: u32,

    #[serde(alias = "videoHeight")]
    pub video_height: u32,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            font: "Montserrat".to_string(),
            font_size: 64,
            font_color: "#FFFFFF".to_string(),
            position: CaptionPosition::default(),
            animation_style: "none".to_string(),
            highlight_color: "#FFD700".to_string(),
            words_per_line: 4,
            video_width: 1080,
            video_height: 1920,
        }
    }
}
