//! Transitions between adjacent timeline scenes.

use serde::{Deserialize, Serialize};

/// Fraction of the shorter adjacent scene a transition may occupy.
pub const MAX_TRANSITION_FRACTION: f64 = 0.4;

/// Duration used when `none` appears inside a crossfade chain.
pub const DEGENERATE_TRANSITION_SECS: f64 = 0.001;

/// Duration assumed when a transition omits one.
pub const DEFAULT_TRANSITION_SECS: f64 = 0.5;

/// Named transition. Every variant except `None` maps onto an `xfade` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    #[default]
    None,
    Fade,
    Dissolve,
    FadeBlack,
    FadeWhite,
    WipeLeft,
    WipeRight,
    WipeUp,
    WipeDown,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    CircleOpen,
    CircleClose,
}

impl TransitionKind {
    /// The 14 named (visible) transitions.
    pub const NAMED: [TransitionKind; 14] = [
        TransitionKind::Fade,
        TransitionKind::Dissolve,
        TransitionKind::FadeBlack,
        TransitionKind::FadeWhite,
        TransitionKind::WipeLeft,
        TransitionKind::WipeRight,
        TransitionKind::WipeUp,
        TransitionKind::WipeDown,
        TransitionKind::SlideLeft,
        TransitionKind::SlideRight,
        TransitionKind::SlideUp,
        TransitionKind::SlideDown,
        TransitionKind::CircleOpen,
        TransitionKind::CircleClose,
    ];

    pub fn is_none(self) -> bool {
        self == TransitionKind::None
    }

    /// `xfade` transition mode. `None` renders as a fade of degenerate length.
    pub fn xfade_name(self) -> &'static str {
        match self {
            TransitionKind::None | TransitionKind::Fade => "fade",
            TransitionKind::Dissolve => "dissolve",
            TransitionKind::FadeBlack => "fadeblack",
            TransitionKind::FadeWhite => "fadewhite",
            TransitionKind::WipeLeft => "wipeleft",
            TransitionKind::WipeRight => "wiperight",
            TransitionKind::WipeUp => "wipeup",
            TransitionKind::WipeDown => "wipedown",
            TransitionKind::SlideLeft => "slideleft",
            TransitionKind::SlideRight => "slideright",
            TransitionKind::SlideUp => "slideup",
            TransitionKind::SlideDown => "slidedown",
            TransitionKind::CircleOpen => "circleopen",
            TransitionKind::CircleClose => "circleclose",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransitionKind::None => "none",
            other => other.xfade_name(),
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', '_'], "");
        if normalized == "none" || normalized == "cut" {
            return Some(TransitionKind::None);
        }
        Self::NAMED
            .into_iter()
            .find(|kind| kind.xfade_name() == normalized)
    }
}

/// A transition request between a scene and the one after it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    #[serde(rename = "type", default)]
    pub kind: TransitionKind,

    /// Requested duration in seconds, before capping.
    #[serde(default = "default_transition_secs")]
    pub duration: f64,
}

fn default_transition_secs() -> f64 {
    DEFAULT_TRANSITION_SECS
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self::none()
    }
}

impl TransitionSpec {
    pub fn new(kind: TransitionKind, duration: f64) -> Self {
        Self { kind, duration }
    }

    pub fn none() -> Self {
        Self {
            kind: TransitionKind::None,
            duration: 0.0,
        }
    }

    /// Duration actually rendered between scenes lasting `before` and `after`
    /// seconds: at most 40% of the shorter one, and a degenerate sliver for
    /// `none`.
    pub fn capped_duration(&self, before: f64, after: f64) -> f64 {
        let cap = MAX_TRANSITION_FRACTION * before.min(after).max(0.0);
        let requested = if self.kind.is_none() || !self.duration.is_finite() {
            DEGENERATE_TRANSITION_SECS
        } else {
            self.duration.max(DEGENERATE_TRANSITION_SECS)
        };
        requested.min(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fourteen_named_transitions_all_distinct() {
        let mut names: Vec<&str> = TransitionKind::NAMED.iter().map(|k| k.xfade_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 14);
    }

    #[test]
    fn test_parse_transition_names() {
        assert_eq!(TransitionKind::parse("fade"), Some(TransitionKind::Fade));
        assert_eq!(TransitionKind::parse("wipe-left"), Some(TransitionKind::WipeLeft));
        assert_eq!(TransitionKind::parse("circle_open"), Some(TransitionKind::CircleOpen));
        assert_eq!(TransitionKind::parse("none"), Some(TransitionKind::None));
        assert_eq!(TransitionKind::parse("spiral"), None);
    }

    #[test]
    fn test_capped_duration() {
        let fade = TransitionSpec::new(TransitionKind::Fade, 0.5);
        assert!((fade.capped_duration(3.0, 4.0) - 0.5).abs() < 1e-12);

        let long = TransitionSpec::new(TransitionKind::Dissolve, 3.0);
        assert!((long.capped_duration(2.0, 5.0) - 0.8).abs() < 1e-12);

        let none = TransitionSpec::none();
        assert!((none.capped_duration(3.0, 3.0) - DEGENERATE_TRANSITION_SECS).abs() < 1e-12);
    }

    #[test]
    fn test_serde_defaults() {
        let spec: TransitionSpec = serde_json::from_str(r#"{"type":"slideup"}"#).unwrap();
        assert_eq!(spec.kind, TransitionKind::SlideUp);
        assert!((spec.duration - DEFAULT_TRANSITION_SECS).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn capped_duration_never_exceeds_forty_percent(
            duration in 0.0f64..20.0,
            before in 0.1f64..60.0,
            after in 0.1f64..60.0,
            idx in 0usize..14,
        ) {
            let spec = TransitionSpec::new(TransitionKind::NAMED[idx], duration);
            let capped = spec.capped_duration(before, after);
            prop_assert!(capped <= MAX_TRANSITION_FRACTION * before.min(after) + 1e-12);
            prop_assert!(capped > 0.0);
        }
    }
}
