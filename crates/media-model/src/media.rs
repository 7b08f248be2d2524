//! Media payload locations and output container formats.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where a media payload comes from.
///
/// Fetching is not this crate's concern: URLs are handed to the media tool
/// as-is, paths are read in place, and byte buffers are written into the
/// operation's scratch directory first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSource {
    Url(String),
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl MediaSource {
    /// Interpret a CLI/manifest string: `http(s)://` is a URL, anything else a path.
    pub fn from_location(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            MediaSource::Url(trimmed.to_string())
        } else {
            MediaSource::Path(PathBuf::from(trimmed))
        }
    }

    pub fn is_bytes(&self) -> bool {
        matches!(self, MediaSource::Bytes(_))
    }

    /// Whether the source names a video container. Byte payloads carry no
    /// name and count as stills.
    pub fn is_video(&self) -> bool {
        let name = match self {
            MediaSource::Url(url) => url.split(['?', '#']).next().unwrap_or(url),
            MediaSource::Path(path) => path.to_str().unwrap_or_default(),
            MediaSource::Bytes(_) => return false,
        };
        let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        matches!(
            ext.as_deref(),
            Some("mp4" | "mov" | "m4v" | "mkv" | "webm" | "avi")
        )
    }

    /// Short description for logs (never dumps byte payloads).
    pub fn describe(&self) -> String {
        match self {
            MediaSource::Url(url) => url.clone(),
            MediaSource::Path(path) => path.display().to_string(),
            MediaSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

/// Output container/codec combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "mp4")]
    Mp4H264,
    #[serde(rename = "mp4-h265")]
    Mp4H265,
    #[serde(rename = "webm")]
    Webm,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mp4" | "mp4-h264" | "h264" => Some(OutputFormat::Mp4H264),
            "mp4-h265" | "h265" | "hevc" => Some(OutputFormat::Mp4H265),
            "webm" => Some(OutputFormat::Webm),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp4H264 | OutputFormat::Mp4H265 => "mp4",
            OutputFormat::Webm => "webm",
        }
    }

    /// Short label reported back to callers (`format` field of render outputs).
    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Mp4H264 => "mp4",
            OutputFormat::Mp4H265 => "mp4-h265",
            OutputFormat::Webm => "webm",
        }
    }

    /// Encoder arguments for the final encode.
    pub fn codec_args(self, video_bitrate_kbps: u32, audio_bitrate_kbps: u32) -> Vec<String> {
        let video_bitrate = format!("{}k", video_bitrate_kbps.max(1000));
        let audio_bitrate = format!("{}k", audio_bitrate_kbps.max(64));

        match self {
            OutputFormat::Mp4H264 => vec![
                "-c:v".to_string(),
                "libx264".to_string(),
                "-preset".to_string(),
                "medium".to_string(),
                "-profile:v".to_string(),
                "high".to_string(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
                "-b:v".to_string(),
                video_bitrate,
                "-c:a".to_string(),
                "aac".to_string(),
                "-b:a".to_string(),
                audio_bitrate,
                "-movflags".to_string(),
                "+faststart".to_string(),
            ],
            OutputFormat::Mp4H265 => vec![
                "-c:v".to_string(),
                "libx265".to_string(),
                "-preset".to_string(),
                "medium".to_string(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
                "-tag:v".to_string(),
                "hvc1".to_string(),
                "-b:v".to_string(),
                video_bitrate,
                "-c:a".to_string(),
                "aac".to_string(),
                "-b:a".to_string(),
                audio_bitrate,
                "-movflags".to_string(),
                "+faststart".to_string(),
            ],
            OutputFormat::Webm => vec![
                "-c:v".to_string(),
                "libvpx-vp9".to_string(),
                "-b:v".to_string(),
                video_bitrate,
                "-c:a".to_string(),
                "libopus".to_string(),
                "-b:a".to_string(),
                "128k".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_sources_by_extension() {
        assert!(MediaSource::from_location("clips/intro.MP4").is_video());
        assert!(MediaSource::from_location("https://cdn.example.com/b.webm?sig=1").is_video());
        assert!(!MediaSource::from_location("scenes/a.png").is_video());
        assert!(!MediaSource::from_location("https://cdn.example.com/mp4/a.jpg").is_video());
        assert!(!MediaSource::Bytes(vec![0; 4]).is_video());
    }

    #[test]
    fn test_location_parsing() {
        assert_eq!(
            MediaSource::from_location("https://cdn.example.com/a.png"),
            MediaSource::Url("https://cdn.example.com/a.png".to_string())
        );
        assert_eq!(
            MediaSource::from_location("scenes/a.png"),
            MediaSource::Path(PathBuf::from("scenes/a.png"))
        );
    }

    #[test]
    fn test_bytes_description_hides_payload() {
        let source = MediaSource::Bytes(vec![0; 2048]);
        assert_eq!(source.describe(), "<2048 bytes>");
        assert!(source.is_bytes());
    }

    #[test]
    fn test_output_format_parsing_and_codecs() {
        assert_eq!(OutputFormat::parse("MP4"), Some(OutputFormat::Mp4H264));
        assert_eq!(OutputFormat::parse("webm"), Some(OutputFormat::Webm));
        assert_eq!(OutputFormat::parse("gif"), None);

        let args = OutputFormat::Mp4H264.codec_args(200, 32);
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"1000k".to_string()));
        assert!(args.contains(&"64k".to_string()));
        assert_eq!(OutputFormat::Webm.extension(), "webm");
    }
}
