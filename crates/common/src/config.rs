//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Parent directory for per-operation scratch space (system temp dir when unset).
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// External media tool locations.
    #[serde(default)]
    pub ffmpeg: FfmpegConfig,

    /// Default render parameters.
    #[serde(default)]
    pub render: RenderDefaults,

    /// Per-operation subprocess time budgets.
    #[serde(default)]
    pub timeouts: RenderTimeouts,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Locations of the external media-processing binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfmpegConfig {
    /// `ffmpeg` binary (name on PATH or absolute path).
    pub binary: PathBuf,

    /// `ffprobe` binary, used for duration probes.
    pub ffprobe_binary: PathBuf,
}

/// Default render parameters, applied when a request leaves them unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderDefaults {
    pub width: u32,
    pub height: u32,
    pub fps: u32,

    /// Target video bitrate.
    pub video_bitrate_kbps: u32,

    /// Target audio bitrate.
    pub audio_bitrate_kbps: u32,

    /// Codec used when re-encoding scene audio during the merge step.
    pub audio_codec: String,
}

/// Subprocess time budgets, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderTimeouts {
    /// `-version` probes and ffprobe calls.
    pub probe_secs: u64,

    /// Single image-to-clip render.
    pub clip_secs: u64,

    /// One per-scene picture/audio merge.
    pub merge_secs: u64,

    /// Full multi-scene assembly with transitions.
    pub assembly_secs: u64,

    /// Caption burn-in pass.
    pub captions_secs: u64,

    /// Narration/music mixdown.
    pub audio_mix_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "storyreel=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            ffmpeg: FfmpegConfig::default(),
            render: RenderDefaults::default(),
            timeouts: RenderTimeouts::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            ffprobe_binary: PathBuf::from("ffprobe"),
        }
    }
}

impl FfmpegConfig {
    /// Apply `STORYREEL_FFMPEG` / `STORYREEL_FFPROBE` overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(binary) = std::env::var("STORYREEL_FFMPEG") {
            if !binary.trim().is_empty() {
                tracing::info!(binary = %binary, "Using ffmpeg override from environment");
                self.binary = PathBuf::from(binary);
            }
        }
        if let Ok(binary) = std::env::var("STORYREEL_FFPROBE") {
            if !binary.trim().is_empty() {
                self.ffprobe_binary = PathBuf::from(binary);
            }
        }
        self
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            video_bitrate_kbps: 6000,
            audio_bitrate_kbps: 192,
            audio_codec: "aac".to_string(),
        }
    }
}

impl Default for RenderTimeouts {
    fn default() -> Self {
        Self {
            probe_secs: 10,
            clip_secs: 120,
            merge_secs: 120,
            assembly_secs: 600,
            captions_secs: 300,
            audio_mix_secs: 120,
        }
    }
}

impl RenderTimeouts {
    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs.max(1))
    }

    pub fn clip(&self) -> Duration {
        Duration::from_secs(self.clip_secs.max(1))
    }

    pub fn merge(&self) -> Duration {
        Duration::from_secs(self.merge_secs.max(1))
    }

    pub fn assembly(&self) -> Duration {
        Duration::from_secs(self.assembly_secs.max(1))
    }

    pub fn captions(&self) -> Duration {
        Duration::from_secs(self.captions_secs.max(1))
    }

    pub fn audio_mix(&self) -> Duration {
        Duration::from_secs(self.audio_mix_secs.max(1))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        let config = if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                    None
                }
            }
        } else {
            None
        };

        let mut config: AppConfig = config.unwrap_or_default();
        config.ffmpeg = config.ffmpeg.with_env_overrides();
        config
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("storyreel").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts_escalate() {
        let timeouts = RenderTimeouts::default();
        assert_eq!(timeouts.clip(), Duration::from_secs(120));
        assert_eq!(timeouts.assembly(), Duration::from_secs(600));
        assert!(timeouts.assembly() > timeouts.clip());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"render":{"width":720,"height":1280,"fps":24,"video_bitrate_kbps":4000,"audio_bitrate_kbps":128,"audio_codec":"aac"}}"#)
                .unwrap();
        assert_eq!(config.render.width, 720);
        assert_eq!(config.ffmpeg.binary, PathBuf::from("ffmpeg"));
        assert_eq!(config.timeouts.merge_secs, 120);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_zero_timeout_is_floored() {
        let timeouts = RenderTimeouts {
            probe_secs: 0,
            ..RenderTimeouts::default()
        };
        assert_eq!(timeouts.probe(), Duration::from_secs(1));
    }
}
