//! Pan/zoom motion applied when a still image becomes a clip.

use serde::{Deserialize, Serialize};

/// Slowest speed a motion is rendered at; lower requests are raised to it.
pub const MIN_MOTION_SPEED: f64 = 0.1;
/// Fastest speed a motion is rendered at.
pub const MAX_MOTION_SPEED: f64 = 1.0;

/// Motion family. Each selects a distinct parametric expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionType {
    ZoomIn,
    ZoomOut,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    KenburnsIn,
    KenburnsOut,
    Static,
}

impl MotionType {
    pub const ALL: [MotionType; 9] = [
        MotionType::ZoomIn,
        MotionType::ZoomOut,
        MotionType::PanLeft,
        MotionType::PanRight,
        MotionType::PanUp,
        MotionType::PanDown,
        MotionType::KenburnsIn,
        MotionType::KenburnsOut,
        MotionType::Static,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MotionType::ZoomIn => "zoom_in",
            MotionType::ZoomOut => "zoom_out",
            MotionType::PanLeft => "pan_left",
            MotionType::PanRight => "pan_right",
            MotionType::PanUp => "pan_up",
            MotionType::PanDown => "pan_down",
            MotionType::KenburnsIn => "kenburns_in",
            MotionType::KenburnsOut => "kenburns_out",
            MotionType::Static => "static",
        }
    }

    /// Parse the snake_case name (`-` is accepted in place of `_`).
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|motion| motion.as_str() == normalized)
    }
}

/// A motion request for one image-to-clip conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSpec {
    #[serde(rename = "type")]
    pub kind: MotionType,

    /// Requested speed in `[0, 1]`; see [`MotionSpec::effective_speed`].
    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_speed() -> f64 {
    0.5
}

impl MotionSpec {
    pub fn new(kind: MotionType, speed: f64) -> Self {
        Self { kind, speed }
    }

    /// Speed clamped into `[0.1, 1.0]`; NaN is treated as the minimum.
    pub fn effective_speed(&self) -> f64 {
        if self.speed.is_nan() {
            return MIN_MOTION_SPEED;
        }
        self.speed.clamp(MIN_MOTION_SPEED, MAX_MOTION_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_motion_names() {
        assert_eq!(MotionType::parse("zoom_in"), Some(MotionType::ZoomIn));
        assert_eq!(MotionType::parse("Kenburns-Out"), Some(MotionType::KenburnsOut));
        assert_eq!(MotionType::parse("spin"), None);
    }

    #[test]
    fn test_serde_uses_type_key() {
        let spec: MotionSpec = serde_json::from_str(r#"{"type":"pan_left","speed":0.3}"#).unwrap();
        assert_eq!(spec.kind, MotionType::PanLeft);
        assert!((spec.speed - 0.3).abs() < 1e-12);

        let defaulted: MotionSpec = serde_json::from_str(r#"{"type":"static"}"#).unwrap();
        assert!((defaulted.speed - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nan_speed_is_minimum() {
        assert_eq!(MotionSpec::new(MotionType::ZoomIn, f64::NAN).effective_speed(), 0.1);
    }

    proptest! {
        #[test]
        fn effective_speed_is_always_clamped(speed in -10.0f64..10.0) {
            let s = MotionSpec::new(MotionType::ZoomIn, speed).effective_speed();
            prop_assert!((MIN_MOTION_SPEED..=MAX_MOTION_SPEED).contains(&s));
        }
    }
}
