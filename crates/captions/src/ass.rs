//! Advanced SubStation Alpha (ASS) script writer.

use std::fmt::Write as _;

use storyreel_common::timecode::format_ass_time;
use storyreel_media_model::CaptionOptions;

use crate::color::{hex_to_ass, hex_to_ass_alpha};
use crate::layout::{ass_alignment, Margins};

/// Name of the style every generator writes its events against.
pub const DEFAULT_STYLE: &str = "Default";

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// One `[V4+ Styles]` entry. Colours are already in `&HAABBGGRR` form.
#[derive(Debug, Clone, PartialEq)]
pub struct AssStyle {
    pub name: String,
    pub font: String,
    pub font_size: u32,
    pub primary: String,
    pub secondary: String,
    pub outline_color: String,
    pub back_color: String,
    pub bold: bool,
    pub spacing: f64,
    /// `1` outline + shadow, `3` opaque box.
    pub border_style: u8,
    pub outline: f64,
    pub shadow: f64,
    pub alignment: u8,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
}

impl AssStyle {
    /// Base style derived from caption options: options colour on a black
    /// outline, anchored per the requested position.
    pub fn from_options(name: &str, options: &CaptionOptions) -> Self {
        let margins = Margins::for_frame(options.video_width, options.video_height);
        Self {
            name: name.to_string(),
            font: options.font.clone(),
            font_size: options.font_size,
            primary: hex_to_ass(&options.font_color),
            secondary: hex_to_ass(&options.highlight_color),
            outline_color: hex_to_ass("#000000"),
            back_color: hex_to_ass_alpha("#000000", 0x80),
            bold: true,
            spacing: 0.0,
            border_style: 1,
            outline: 3.0,
            shadow: 0.0,
            alignment: ass_alignment(options.position),
            margin_l: margins.horizontal as u32,
            margin_r: margins.horizontal as u32,
            margin_v: margins.vertical_for(options.position.vertical) as u32,
        }
    }

    fn to_line(&self) -> String {
        // Commas delimit fields, so they cannot appear in names.
        format!(
            "Style: {},{},{},{},{},{},{},{},0,0,0,100,100,{},0,{},{},{},{},{},{},{},1",
            self.name.replace(',', " "),
            self.font.replace(',', " "),
            self.font_size,
            self.primary,
            self.secondary,
            self.outline_color,
            self.back_color,
            if self.bold { -1 } else { 0 },
            self.spacing,
            self.border_style,
            self.outline,
            self.shadow,
            self.alignment,
            self.margin_l,
            self.margin_r,
            self.margin_v,
        )
    }
}

/// One `Dialogue:` line. `text` may contain override tags.
#[derive(Debug, Clone, PartialEq)]
pub struct AssEvent {
    pub layer: u32,
    pub start: f64,
    pub end: f64,
    pub style: String,
    pub text: String,
}

/// A complete script: header, styles, and events in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct AssScript {
    play_res_x: u32,
    play_res_y: u32,
    styles: Vec<AssStyle>,
    events: Vec<AssEvent>,
}

impl AssScript {
    /// Script whose coordinate space matches the video frame.
    pub fn new(play_res_x: u32, play_res_y: u32) -> Self {
        Self {
            play_res_x,
            play_res_y,
            styles: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn add_style(&mut self, style: AssStyle) {
        self.styles.push(style);
    }

    /// Append an event against `style`. Zero-length events are dropped.
    pub fn push_event(&mut self, layer: u32, start: f64, end: f64, style: &str, text: impl Into<String>) {
        if end <= start {
            return;
        }
        self.events.push(AssEvent {
            layer,
            start,
            end,
            style: style.to_string(),
            text: text.into(),
        });
    }

    pub fn events(&self) -> &[AssEvent] {
        &self.events
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "[Script Info]");
        let _ = writeln!(out, "ScriptType: v4.00+");
        let _ = writeln!(out, "PlayResX: {}", self.play_res_x);
        let _ = writeln!(out, "PlayResY: {}", self.play_res_y);
        let _ = writeln!(out, "WrapStyle: 2");
        let _ = writeln!(out, "ScaledBorderAndShadow: yes");
        let _ = writeln!(out);
        let _ = writeln!(out, "[V4+ Styles]");
        let _ = writeln!(out, "{STYLE_FORMAT}");
        for style in &self.styles {
            let _ = writeln!(out, "{}", style.to_line());
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "[Events]");
        let _ = writeln!(out, "{EVENT_FORMAT}");
        for event in &self.events {
            let _ = writeln!(
                out,
                "Dialogue: {},{},{},{},,0,0,0,,{}",
                event.layer,
                format_ass_time(event.start),
                format_ass_time(event.end),
                event.style,
                event.text
            );
        }
        out
    }
}

/// Make caption text safe inside a dialogue line. Braces and backslashes
/// are replaced; newlines become `\N`.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '{' => out.push('('),
            '}' => out.push(')'),
            '\\' => out.push('/'),
            '\n' => out.push_str("\\N"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}
