//! Numeric limits enforced at the render boundary.
//!
//! Every check here runs before scratch space is allocated or a subprocess
//! is spawned, so an out-of-range request never touches the filesystem.

use storyreel_common::error::{StoryreelError, StoryreelResult};

pub const MAX_WIDTH: u32 = 7680;
pub const MAX_HEIGHT: u32 = 4320;
pub const MAX_FPS: u32 = 120;
pub const MIN_DURATION_SECS: f64 = 0.1;
pub const MAX_DURATION_SECS: f64 = 3600.0;

/// Validate output dimensions: `width ∈ [1,7680]`, `height ∈ [1,4320]`.
pub fn validate_dimensions(width: u32, height: u32) -> StoryreelResult<()> {
    if width == 0 || width > MAX_WIDTH {
        return Err(StoryreelError::validation(format!(
            "width {width} out of range [1, {MAX_WIDTH}]"
        )));
    }
    if height == 0 || height > MAX_HEIGHT {
        return Err(StoryreelError::validation(format!(
            "height {height} out of range [1, {MAX_HEIGHT}]"
        )));
    }
    Ok(())
}

/// Validate a frame rate: `fps ∈ [1,120]`.
pub fn validate_fps(fps: u32) -> StoryreelResult<()> {
    if fps == 0 || fps > MAX_FPS {
        return Err(StoryreelError::validation(format!(
            "fps {fps} out of range [1, {MAX_FPS}]"
        )));
    }
    Ok(())
}

/// Validate a duration in seconds: `duration ∈ [0.1,3600]`.
pub fn validate_duration(duration_secs: f64) -> StoryreelResult<()> {
    if !duration_secs.is_finite()
        || !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&duration_secs)
    {
        return Err(StoryreelError::validation(format!(
            "duration {duration_secs}s out of range [{MIN_DURATION_SECS}, {MAX_DURATION_SECS}]"
        )));
    }
    Ok(())
}

/// Validate a volume percentage (non-negative, finite; no upper bound).
pub fn validate_volume(label: &str, volume_percent: f64) -> StoryreelResult<()> {
    if !volume_percent.is_finite() || volume_percent < 0.0 {
        return Err(StoryreelError::validation(format!(
            "{label} volume {volume_percent} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Validate the full `(width, height, fps, duration)` tuple of a clip render.
pub fn validate_clip_params(
    width: u32,
    height: u32,
    fps: u32,
    duration_secs: f64,
) -> StoryreelResult<()> {
    validate_dimensions(width, height)?;
    validate_fps(fps)?;
    validate_duration(duration_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_common::error::ErrorKind;

    #[test]
    fn test_dimension_bounds() {
        assert!(validate_dimensions(1, 1).is_ok());
        assert!(validate_dimensions(7680, 4320).is_ok());
        assert!(validate_dimensions(0, 1080).is_err());
        assert!(validate_dimensions(7681, 1080).is_err());
        assert!(validate_dimensions(1920, 4321).is_err());
    }

    #[test]
    fn test_fps_and_duration_bounds() {
        assert!(validate_fps(120).is_ok());
        assert!(validate_fps(0).is_err());
        assert!(validate_fps(121).is_err());
        assert!(validate_duration(0.1).is_ok());
        assert!(validate_duration(3600.0).is_ok());
        assert!(validate_duration(0.05).is_err());
        assert!(validate_duration(f64::NAN).is_err());
        assert!(validate_duration(3600.5).is_err());
    }

    #[test]
    fn test_volume_has_no_upper_bound() {
        assert!(validate_volume("music", 0.0).is_ok());
        assert!(validate_volume("music", 450.0).is_ok());
        let err = validate_volume("narration", -5.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(validate_volume("music", f64::INFINITY).is_err());
    }
}
