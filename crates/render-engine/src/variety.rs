//! Seedable variety for scenes that leave motion or transitions unset.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use storyreel_media_model::{
    AssemblyScene, MotionSpec, MotionType, RenderSceneRequest, TransitionKind, TransitionSpec,
    DEFAULT_TRANSITION_SECS,
};

/// Motions picked for scenes without one. `static` is never picked.
pub const MOTION_POOL: [MotionType; 8] = [
    MotionType::ZoomIn,
    MotionType::ZoomOut,
    MotionType::PanLeft,
    MotionType::PanRight,
    MotionType::PanUp,
    MotionType::PanDown,
    MotionType::KenburnsIn,
    MotionType::KenburnsOut,
];

/// Transitions picked for joins without one.
pub const TRANSITION_POOL: [TransitionKind; 6] = [
    TransitionKind::Fade,
    TransitionKind::Dissolve,
    TransitionKind::SlideLeft,
    TransitionKind::SlideUp,
    TransitionKind::WipeLeft,
    TransitionKind::CircleOpen,
];

pub struct VarietyPicker {
    rng: StdRng,
    last_motion: Option<MotionType>,
    last_transition: Option<TransitionKind>,
}

impl Default for VarietyPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl VarietyPicker {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            last_motion: None,
            last_transition: None,
        }
    }

    /// A motion different from the previous pick.
    pub fn pick_motion(&mut self) -> MotionSpec {
        let previous = self.last_motion;
        let pool: Vec<MotionType> = MOTION_POOL.iter().copied().filter(|m| Some(*m) != previous).collect();
        let kind = pool.choose(&mut self.rng).copied().unwrap_or(MotionType::ZoomIn);
        let speed = self.rng.gen_range(0.3..=0.7);
        self.last_motion = Some(kind);
        MotionSpec::new(kind, speed)
    }

    /// A transition different from the previous pick.
    pub fn pick_transition(&mut self) -> TransitionSpec {
        let previous = self.last_transition;
        let pool: Vec<TransitionKind> = TRANSITION_POOL
            .iter()
            .copied()
            .filter(|t| Some(*t) != previous)
            .collect();
        let kind = pool.choose(&mut self.rng).copied().unwrap_or(TransitionKind::Fade);
        self.last_transition = Some(kind);
        TransitionSpec::new(kind, DEFAULT_TRANSITION_SECS)
    }

    /// Give every scene without a motion a picked one.
    pub fn fill_missing_motion(&mut self, scenes: &mut [RenderSceneRequest]) {
        for scene in scenes.iter_mut().filter(|s| s.motion.is_none()) {
            let motion = self.pick_motion();
            tracing::debug!(scene_id = %scene.scene_id, motion = motion.kind.as_str(), "Picked motion");
            scene.motion = Some(motion);
        }
    }

    /// Give every join without a transition a picked one.
    ///
    /// The last scene has no following join and is left as is.
    pub fn fill_missing(&mut self, scenes: &mut [AssemblyScene]) {
        let joins = scenes.len().saturating_sub(1);
        for scene in scenes[..joins].iter_mut().filter(|s| s.transition.is_none()) {
            let transition = self.pick_transition();
            tracing::debug!(transition = transition.kind.as_str(), "Picked transition");
            scene.transition = Some(transition);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_media_model::MediaSource;

    fn scenes(count: usize) -> Vec<AssemblyScene> {
        (0..count)
            .map(|i| AssemblyScene {
                video: MediaSource::from_location(&format!("s{i}.mp4")),
                audio: None,
                duration: 3.0,
                transition: None,
            })
            .collect()
    }

    #[test]
    fn test_same_seed_same_picks() {
        let mut a = scenes(6);
        let mut b = scenes(6);
        VarietyPicker::with_seed(7).fill_missing(&mut a);
        VarietyPicker::with_seed(7).fill_missing(&mut b);
        let kinds = |s: &[AssemblyScene]| s.iter().map(|x| x.transition.map(|t| t.kind)).collect::<Vec<_>>();
        assert_eq!(kinds(&a), kinds(&b));
    }

    #[test]
    fn test_explicit_specs_are_kept() {
        let mut list = scenes(3);
        list[0].transition = Some(TransitionSpec::none());
        VarietyPicker::with_seed(1).fill_missing(&mut list);
        assert_eq!(list[0].transition.map(|t| t.kind), Some(TransitionKind::None));
        assert!(list[1].transition.is_some());
        assert!(list[2].transition.is_none());
    }

    #[test]
    fn test_consecutive_picks_differ() {
        let mut picker = VarietyPicker::with_seed(42);
        let mut previous = picker.pick_motion().kind;
        for _ in 0..50 {
            let next = picker.pick_motion();
            assert_ne!(next.kind, previous);
            assert!((0.3..=0.7).contains(&next.speed));
            previous = next.kind;
        }
    }

    #[test]
    fn test_fill_missing_motion() {
        let mut requests = vec![RenderSceneRequest {
            scene_id: "s1".to_string(),
            source: MediaSource::from_location("s1.png"),
            duration: 3.0,
            motion: None,
            width: None,
            height: None,
            fps: None,
        }];
        VarietyPicker::with_seed(3).fill_missing_motion(&mut requests);
        let motion = requests[0].motion.unwrap();
        assert_ne!(motion.kind, MotionType::Static);
    }
}
