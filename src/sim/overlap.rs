//! Reference overlap detection between fork tips and target bodies
//!
//! Hosts normally get overlaps from their own physics. This detector treats
//! the fork tip and every target as circles, which is enough for headless
//! runs and tests.

use glam::Vec2;

use super::fork::PlayerId;
use super::state::MatchState;
use super::target::TargetId;

/// Circle-circle overlap test
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) <= reach * reach
}

/// Every (fork, active target) pair whose bodies touch, in fork then target order
pub fn detect_overlaps(state: &MatchState) -> Vec<(PlayerId, TargetId)> {
    let mut hits = Vec::new();
    for fork in &state.forks {
        let tip = fork.tip(state.tip_length);
        for target in state.registry.targets().iter().filter(|t| t.active) {
            let Some(kind) = state.registry.kinds().get(target.kind) else {
                continue;
            };
            if circles_overlap(tip, state.tip_radius, target.pos, kind.radius) {
                hits.push((fork.id, target.id));
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Level, SpawnRange};
    use crate::sim::TargetRegistry;

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 8.0, Vec2::new(20.0, 0.0), 16.0));
        assert!(circles_overlap(Vec2::ZERO, 8.0, Vec2::new(24.0, 0.0), 16.0));
        assert!(!circles_overlap(Vec2::ZERO, 8.0, Vec2::new(25.0, 0.0), 16.0));
    }

    #[test]
    fn test_detect_only_active_targets_near_tips() {
        let mut config = Level::Classic.config().with_seed(3);
        config.targets.truncate(1);
        config.targets[0].count = SpawnRange::fixed(1);
        config.targets[0].x = SpawnRange::fixed(200.0);
        config.targets[0].y = SpawnRange::fixed(90.0);
        let mut state = MatchState::new(&config, 0.0).unwrap();

        // Green tip hangs at y=82, within reach of the cube at y=90
        let hits = detect_overlaps(&state);
        assert_eq!(hits, vec![(PlayerId(0), TargetId(0))]);

        state.resolve_overlap(PlayerId(0), TargetId(0));
        let fork = &mut state.forks[0];
        assert!(state.registry.collect(fork).is_some());
        assert!(detect_overlaps(&state).is_empty());
    }

    #[test]
    fn test_target_without_kind_never_overlaps() {
        let mut state = MatchState::new(&Level::Classic.config().with_seed(3), 0.0).unwrap();
        state.registry = TargetRegistry::new(Vec::new());
        state.registry.insert(0, Vec2::new(200.0, 82.0));
        assert!(detect_overlaps(&state).is_empty());
    }
}
