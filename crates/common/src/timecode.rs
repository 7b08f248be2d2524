//! Timecode formatting and frame math.
//!
//! Every time value in StoryReel is carried as `f64` seconds. This module
//! converts them into the textual forms the subtitle formats expect and
//! into whole frame counts for the encoder.

/// Format seconds as an ASS timestamp: `H:MM:SS.cc` (centiseconds).
pub fn format_ass_time(secs: f64) -> String {
    let total_cs = (secs.max(0.0) * 100.0).round() as u64;
    let hours = total_cs / 360_000;
    let minutes = (total_cs % 360_000) / 6_000;
    let seconds = (total_cs % 6_000) / 100;
    let centis = total_cs % 100;
    format!("{hours}:{minutes:02}:{seconds:02}.{centis:02}")
}

/// Format seconds as SRT timestamp: `HH:MM:SS,mmm`.
pub fn format_srt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Format seconds as VTT timestamp: `HH:MM:SS.mmm`.
pub fn format_vtt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

fn split_millis(secs: f64) -> (u64, u64, u64, u64) {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}

/// Number of whole frames covering `duration_secs` at `fps` (at least one).
pub fn frame_count(duration_secs: f64, fps: u32) -> u64 {
    ((duration_secs.max(0.0) * fps.max(1) as f64).round() as u64).max(1)
}

/// Length of one frame in seconds.
pub fn frame_interval(fps: u32) -> f64 {
    1.0 / fps.max(1) as f64
}

/// Format a seconds value for ffmpeg arguments and filter options.
///
/// Trailing zeros are trimmed so `2.500` renders as `2.5`.
pub fn format_secs(secs: f64) -> String {
    let rendered = format!("{secs:.3}");
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
