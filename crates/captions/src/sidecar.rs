//! Sidecar subtitle export in SRT and VTT formats.

use std::path::Path;

use storyreel_common::error::StoryreelResult;
use storyreel_common::timecode::{format_srt_time, format_vtt_time};
use storyreel_media_model::SubtitleSegment;

/// Sidecar file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarFormat {
    Srt,
    Vtt,
}

impl SidecarFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "srt" => Some(Self::Srt),
            "vtt" | "webvtt" => Some(Self::Vtt),
            _ => None,
        }
    }

    /// Format implied by a file extension; SRT unless it is `.vtt`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("vtt") => Self::Vtt,
            _ => Self::Srt,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }

    pub fn render(self, segments: &[SubtitleSegment]) -> String {
        match self {
            Self::Srt => generate_srt(segments),
            Self::Vtt => generate_vtt(segments),
        }
    }
}

/// Generate SRT subtitle content from caption segments.
pub fn generate_srt(segments: &[SubtitleSegment]) -> String {
    let mut output = String::new();

    for (i, segment) in cue_segments(segments).enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(segment.start_time),
            format_srt_time(segment.end_time),
        ));
        output.push_str(segment.text.trim());
        output.push_str("\n\n");
    }

    output
}

/// Generate WebVTT subtitle content from caption segments.
pub fn generate_vtt(segments: &[SubtitleSegment]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for segment in cue_segments(segments) {
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_time(segment.start_time),
            format_vtt_time(segment.end_time),
        ));
        output.push_str(segment.text.trim());
        output.push_str("\n\n");
    }

    output
}

// A blank line would terminate the cue early in both formats.
fn cue_segments(segments: &[SubtitleSegment]) -> impl Iterator<Item = &SubtitleSegment> {
    segments.iter().filter(|s| !s.text.trim().is_empty())
}

/// Save subtitles to a file; the extension picks the format.
pub fn save_subtitles(segments: &[SubtitleSegment], path: &Path) -> StoryreelResult<()> {
    let content = SidecarFormat::from_path(path).render(segments);
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), cues = segments.len(), "Subtitles written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srt_generation() {
        let segments = vec![
            SubtitleSegment::new("Hello world", 0.0, 2.5),
            SubtitleSegment::new("This is a test", 3.0, 5.0),
        ];

        let srt = generate_srt(&segments);
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500\nHello world"));
        assert!(srt.contains("2\n00:00:03,000 --> 00:00:05,000\nThis is a test"));
    }

    #[test]
    fn test_vtt_generation() {
        let segments = vec![SubtitleSegment::new("One minute in", 61.5, 63.0)];

        let vtt = generate_vtt(&segments);
        assert!(vtt.starts_with("WEBVTT\n"));
        assert!(vtt.contains("00:01:01.500 --> 00:01:03.000"));
    }

    #[test]
    fn test_blank_segments_are_skipped() {
        let segments = vec![
            SubtitleSegment::new("   ", 0.0, 1.0),
            SubtitleSegment::new("kept", 1.0, 2.0),
        ];
        let srt = generate_srt(&segments);
        assert!(srt.starts_with("1\n00:00:01,000"));
    }

    #[test]
    fn test_save_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("captions.vtt");
        save_subtitles(&[SubtitleSegment::new("hi", 0.0, 1.0)], &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("WEBVTT"));
        assert_eq!(SidecarFormat::parse("SRT"), Some(SidecarFormat::Srt));
    }
}
