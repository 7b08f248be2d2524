//! `drawtext` overlay builder.
//!
//! Each [`DrawText`] renders to one filter in a comma-separated chain. Text
//! is drawn with `expansion=none` so `%` is literal.
//!
//! Option values pass through two ffmpeg parsers. The graph parser strips
//! the single quotes and keeps everything inside them verbatim; the option
//! parser then splits on `:` and unescapes `\`. Values are therefore
//! escaped for the option parser and wrapped in quotes for the graph
//! parser, with the quote itself swapped for a typographic one.

use std::fmt::Write as _;

use storyreel_common::timecode::format_secs;

/// A single `drawtext` filter instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawText {
    pub text: String,
    pub font: String,
    pub font_size: u32,
    /// ffmpeg colour, `0xRRGGBB[@alpha]`.
    pub font_color: String,
    /// x expression (pixels or an ffmpeg expression).
    pub x: String,
    /// y expression.
    pub y: String,
    /// Timeline `enable` expression; always-on when absent.
    pub enable: Option<String>,
    pub border_width: u32,
    pub border_color: Option<String>,
    pub shadow: Option<Shadow>,
    pub text_box: Option<TextBox>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub dx: i32,
    pub dy: i32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub color: String,
    pub padding: u32,
}

impl DrawText {
    pub fn new(text: impl Into<String>, font: &str, font_size: u32, font_color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: font.to_string(),
            font_size,
            font_color: font_color.into(),
            x: "(w-text_w)/2".to_string(),
            y: "(h-text_h)/2".to_string(),
            enable: None,
            border_width: 0,
            border_color: None,
            shadow: None,
            text_box: None,
        }
    }

    /// Place the text's top-left corner at a pixel position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = format!("{}", x.round() as i64);
        self.y = format!("{}", y.round() as i64);
        self
    }

    pub fn enabled(mut self, expr: impl Into<String>) -> Self {
        self.enable = Some(expr.into());
        self
    }

    pub fn border(mut self, width: u32, color: impl Into<String>) -> Self {
        self.border_width = width;
        self.border_color = Some(color.into());
        self
    }

    pub fn shadow(mut self, dx: i32, dy: i32, color: impl Into<String>) -> Self {
        self.shadow = Some(Shadow {
            dx,
            dy,
            color: color.into(),
        });
        self
    }

    pub fn boxed(mut self, color: impl Into<String>, padding: u32) -> Self {
        self.text_box = Some(TextBox {
            color: color.into(),
            padding,
        });
        self
    }

    /// Serialize as a `drawtext=...` filter.
    pub fn to_filter(&self) -> String {
        let mut out = String::from("drawtext=");
        let _ = write!(
            out,
            "font='{}':text='{}':expansion=none:fontsize={}:fontcolor={}:x='{}':y='{}'",
            escape_option(&self.font),
            escape_option(&self.text),
            self.font_size,
            self.font_color,
            self.x,
            self.y,
        );
        if self.border_width > 0 {
            let _ = write!(out, ":borderw={}", self.border_width);
            if let Some(color) = &self.border_color {
                let _ = write!(out, ":bordercolor={color}");
            }
        }
        if let Some(shadow) = &self.shadow {
            let _ = write!(
                out,
                ":shadowx={}:shadowy={}:shadowcolor={}",
                shadow.dx, shadow.dy, shadow.color
            );
        }
        if let Some(text_box) = &self.text_box {
            let _ = write!(
                out,
                ":box=1:boxcolor={}:boxborderw={}",
                text_box.color, text_box.padding
            );
        }
        if let Some(enable) = &self.enable {
            let _ = write!(out, ":enable='{enable}'");
        }
        out
    }
}

/// Escape a value for use inside a single-quoted filter option.
pub fn escape_option(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' | '\r' => {}
            '\'' => escaped.push('\u{2019}'),
            '\\' => escaped.push_str("\\\\"),
            ':' => escaped.push_str("\\:"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Half-open window `[start, end)` as an `enable` expression.
pub fn between(start: f64, end: f64) -> String {
    format!("gte(t,{})*lt(t,{})", format_secs(start), format_secs(end))
}

/// `[start, end)` restricted to the first `on` seconds of every `period`.
pub fn periodic(start: f64, end: f64, period: f64, on: f64) -> String {
    format!(
        "{}*lt(mod(t,{}),{})",
        between(start, end),
        format_secs(period),
        format_secs(on)
    )
}

/// `[start, end)` excluding the first `off` seconds of every `period`.
pub fn periodic_off(start: f64, end: f64, period: f64, off: f64) -> String {
    format!(
        "{}*gte(mod(t,{}),{})",
        between(start, end),
        format_secs(period),
        format_secs(off)
    )
}

/// Join overlays into one filter chain, suitable for `-filter_script:v`.
pub fn overlay_chain(overlays: &[DrawText]) -> String {
    overlays
        .iter()
        .map(DrawText::to_filter)
        .collect::<Vec<_>>()
        .join(",\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_windows() {
        assert_eq!(between(0.0, 1.5), "gte(t,0)*lt(t,1.5)");
        assert_eq!(periodic(1.0, 3.0, 0.3, 0.15), "gte(t,1)*lt(t,3)*lt(mod(t,0.3),0.15)");
        assert_eq!(periodic_off(0.0, 2.0, 1.3, 0.07), "gte(t,0)*lt(t,2)*gte(mod(t,1.3),0.07)");
    }

    #[test]
    fn test_filter_serialization() {
        let filter = DrawText::new("it's 100%", "Montserrat", 64, "0xFFFFFF")
            .at(120.4, 1500.6)
            .border(4, "0x000000")
            .enabled(between(0.0, 2.0))
            .to_filter();

        assert!(filter.starts_with("drawtext=font='Montserrat':text='it\u{2019}s 100%':expansion=none"));
        assert!(filter.contains(":x='120':y='1501'"));
        assert!(filter.contains(":borderw=4:bordercolor=0x000000"));
        assert!(filter.ends_with(":enable='gte(t,0)*lt(t,2)'"));
    }

    #[test]
    fn test_option_separators_are_escaped() {
        let filter = DrawText::new("Step 1: go", "Arial", 48, "white").at(10.0, 20.0).to_filter();
        assert!(filter.starts_with("drawtext=font='Arial':text='Step 1\\: go':expansion=none"));

        assert_eq!(escape_option(r"C:\new"), r"C\:\\new");
        assert_eq!(escape_option("line\nbreak"), "linebreak");
        assert_eq!(escape_option("50% off"), "50% off");
    }

    #[test]
    fn test_box_and_shadow() {
        let filter = DrawText::new("hi", "Inter", 40, "0x000000")
            .boxed("0xFFD700@0.85", 12)
            .shadow(3, 3, "0x000000@0.50")
            .to_filter();
        assert!(filter.contains(":shadowx=3:shadowy=3:shadowcolor=0x000000@0.50"));
        assert!(filter.contains(":box=1:boxcolor=0xFFD700@0.85:boxborderw=12"));
        assert!(!filter.contains("enable"));
    }

    #[test]
    fn test_chain_joins_filters() {
        let a = DrawText::new("a", "Inter", 40, "0xFFFFFF");
        let b = DrawText::new("b", "Inter", 40, "0xFFFFFF");
        let chain = overlay_chain(&[a, b]);
        assert_eq!(chain.matches("drawtext=").count(), 2);
        assert!(chain.contains(",\n"));
    }
}
