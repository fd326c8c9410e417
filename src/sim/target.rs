//! Targets and the registry that owns them
//!
//! The registry is the only place the fork <-> target relation is written:
//! `Fork::held` and the ownership map are always updated together here.

use std::collections::HashMap;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::fork::{Fork, ForkState, PlayerId};
use crate::config::{TargetClass, TargetKindConfig};

/// Stable handle of a target (index into the registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Shared template for a class of targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetKind {
    pub name: String,
    pub value: i32,
    pub weight: f32,
    pub radius: f32,
    pub class: TargetClass,
}

impl From<&TargetKindConfig> for TargetKind {
    fn from(cfg: &TargetKindConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            value: cfg.value,
            weight: cfg.weight,
            radius: cfg.radius,
            class: cfg.class,
        }
    }
}

/// A capturable target body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    /// Index into the registry's kind table
    pub kind: usize,
    pub pos: Vec2,
    /// Cleared exactly once, when a fork brings it home
    pub active: bool,
}

/// Result of feeding one overlap into the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arbitration {
    /// Retracting fork, inactive/unknown target, or unknown fork
    Ignored,
    /// Fork already owns this target
    AlreadyHeld,
    /// Unowned target picked up
    Captured,
    /// Target taken from another fork
    Stolen { from: PlayerId },
}

/// All targets of a match plus who holds what
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    kinds: Vec<TargetKind>,
    targets: Vec<Target>,
    owners: HashMap<TargetId, PlayerId>,
}

impl TargetRegistry {
    pub fn new(kinds: Vec<TargetKind>) -> Self {
        Self {
            kinds,
            targets: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Build the kind table and scatter each kind inside its spawn box
    pub fn spawn<R: Rng>(configs: &[TargetKindConfig], rng: &mut R) -> Self {
        let mut registry = Self::new(configs.iter().map(TargetKind::from).collect());

        for (kind, cfg) in configs.iter().enumerate() {
            let count = rng.random_range(cfg.count.min..=cfg.count.max);
            for _ in 0..count {
                let x = rng.random_range(cfg.x.min..=cfg.x.max);
                let y = rng.random_range(cfg.y.min..=cfg.y.max);
                registry.insert(kind, Vec2::new(x, y));
            }
            log::debug!("Spawned {} x {}", count, cfg.name);
        }

        registry
    }

    /// Add an active target of the given kind
    pub fn insert(&mut self, kind: usize, pos: Vec2) -> TargetId {
        let id = TargetId(self.targets.len() as u32);
        self.targets.push(Target {
            id,
            kind,
            pos,
            active: true,
        });
        id
    }

    pub fn kinds(&self) -> &[TargetKind] {
        &self.kinds
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(id.0 as usize)
    }

    pub fn kind_of(&self, id: TargetId) -> Option<&TargetKind> {
        self.get(id).and_then(|t| self.kinds.get(t.kind))
    }

    pub fn owner(&self, id: TargetId) -> Option<PlayerId> {
        self.owners.get(&id).copied()
    }

    pub fn is_active(&self, id: TargetId) -> bool {
        self.get(id).is_some_and(|t| t.active)
    }

    /// Move a target body (used to drag held targets along)
    pub fn set_position(&mut self, id: TargetId, pos: Vec2) {
        if let Some(target) = self.targets.get_mut(id.0 as usize) {
            target.pos = pos;
        }
    }

    /// Ownership arbitration for one overlap between `player`'s fork and `target`.
    ///
    /// A retracting fork ignores overlaps. Otherwise the fork takes the target,
    /// from its previous holder if need be, and is forced to retract. Only the
    /// state of the fork receiving the overlap is checked.
    pub fn on_overlap(&mut self, forks: &mut [Fork], player: PlayerId, target: TargetId) -> Arbitration {
        match self.get(target) {
            Some(t) if t.active => {}
            Some(_) => {
                log::debug!("Overlap with collected target {:?} ignored", target);
                return Arbitration::Ignored;
            }
            None => {
                log::warn!("Overlap with unknown target {:?} ignored", target);
                return Arbitration::Ignored;
            }
        }

        match forks.get(player.0) {
            Some(fork) if fork.state == ForkState::Retracting => return Arbitration::Ignored,
            Some(_) => {}
            None => {
                log::warn!("Overlap for unknown player {:?} ignored", player);
                return Arbitration::Ignored;
            }
        }

        let previous = self.owners.get(&target).copied();
        if previous == Some(player) {
            return Arbitration::AlreadyHeld;
        }
        if let Some(owner) = previous {
            if let Some(prev_fork) = forks.get_mut(owner.0) {
                if prev_fork.held == Some(target) {
                    prev_fork.held = None;
                }
            }
        }

        let fork = &mut forks[player.0];
        // A fork carries one target at most
        if let Some(dropped) = fork.held.take() {
            self.owners.remove(&dropped);
        }
        self.owners.insert(target, player);
        fork.held = Some(target);
        fork.begin_retract();

        match previous {
            Some(from) => Arbitration::Stolen { from },
            None => Arbitration::Captured,
        }
    }

    /// Finish a capture: the fork's held target is deactivated and released.
    ///
    /// Returns the target and its value, or None if the fork held nothing.
    pub fn collect(&mut self, fork: &mut Fork) -> Option<(TargetId, i32)> {
        let id = fork.held.take()?;
        self.owners.remove(&id);

        let target = self.targets.get_mut(id.0 as usize)?;
        if !target.active {
            return None;
        }
        target.active = false;
        self.kinds.get(target.kind).map(|k| (id, k.value))
    }

    /// Active targets whose kind counts toward the end condition
    pub fn scoring_remaining(&self) -> usize {
        self.active_scoring().count()
    }

    /// Sum of values still on the field in scoring kinds
    pub fn remaining_potential(&self) -> i64 {
        self.active_scoring()
            .filter_map(|t| self.kinds.get(t.kind))
            .map(|k| i64::from(k.value))
            .sum()
    }

    pub fn active_count(&self) -> usize {
        self.targets.iter().filter(|t| t.active).count()
    }

    /// Targets whose kind is missing from the table never count
    fn active_scoring(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| {
            t.active
                && self
                    .kinds
                    .get(t.kind)
                    .is_some_and(|k| k.class == TargetClass::Scoring)
        })
    }

    /// Check that forks and the ownership map agree, and that nothing
    /// inactive is still owned
    pub fn ownership_consistent(&self, forks: &[Fork]) -> bool {
        for (target, owner) in &self.owners {
            if !self.is_active(*target) {
                return false;
            }
            match forks.get(owner.0) {
                Some(fork) if fork.held == Some(*target) => {}
                _ => return false,
            }
        }
        forks.iter().all(|fork| match fork.held {
            Some(t) => self.owners.get(&t) == Some(&fork.id),
            None => true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Level, SpawnRange};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn kinds() -> Vec<TargetKind> {
        vec![
            TargetKind {
                name: "cube".to_string(),
                value: 1,
                weight: 2.0,
                radius: 16.0,
                class: TargetClass::Scoring,
            },
            TargetKind {
                name: "question".to_string(),
                value: -3,
                weight: 0.5,
                radius: 16.0,
                class: TargetClass::Bonus,
            },
        ]
    }

    fn forks() -> Vec<Fork> {
        vec![
            Fork::new(PlayerId(0), "Green", "fork", Vec2::new(200.0, 50.0), 0.0),
            Fork::new(PlayerId(1), "Red", "red-fork", Vec2::new(600.0, 50.0), 0.0),
        ]
    }

    #[test]
    fn test_capture_forces_retract() {
        let mut registry = TargetRegistry::new(kinds());
        let t = registry.insert(0, Vec2::new(200.0, 300.0));
        let mut forks = forks();
        forks[0].trigger();

        let result = registry.on_overlap(&mut forks, PlayerId(0), t);
        assert_eq!(result, Arbitration::Captured);
        assert_eq!(forks[0].held(), Some(t));
        assert_eq!(forks[0].state, ForkState::Retracting);
        assert_eq!(registry.owner(t), Some(PlayerId(0)));
        assert!(registry.ownership_consistent(&forks));
    }

    #[test]
    fn test_retracting_fork_ignores_overlap() {
        let mut registry = TargetRegistry::new(kinds());
        let t = registry.insert(0, Vec2::new(200.0, 300.0));
        let mut forks = forks();
        forks[0].begin_retract();

        assert_eq!(registry.on_overlap(&mut forks, PlayerId(0), t), Arbitration::Ignored);
        assert_eq!(forks[0].held(), None);
        assert_eq!(registry.owner(t), None);
    }

    #[test]
    fn test_contested_capture_transfers() {
        let mut registry = TargetRegistry::new(kinds());
        let t = registry.insert(0, Vec2::new(400.0, 300.0));
        let mut forks = forks();
        forks[0].trigger();
        forks[1].trigger();

        registry.on_overlap(&mut forks, PlayerId(0), t);
        let result = registry.on_overlap(&mut forks, PlayerId(1), t);

        assert_eq!(result, Arbitration::Stolen { from: PlayerId(0) });
        assert_eq!(forks[0].held(), None);
        assert_eq!(forks[1].held(), Some(t));
        assert_eq!(registry.owner(t), Some(PlayerId(1)));
        // The loser keeps retracting, empty-handed
        assert_eq!(forks[0].state, ForkState::Retracting);
        assert!(registry.ownership_consistent(&forks));
    }

    #[test]
    fn test_steal_from_holder_still_extending() {
        let mut registry = TargetRegistry::new(kinds());
        let t = registry.insert(0, Vec2::new(400.0, 300.0));
        let mut forks = forks();
        registry.on_overlap(&mut forks, PlayerId(0), t);
        // Holder not yet retracting
        forks[0].state = ForkState::Extending;
        forks[1].trigger();

        registry.on_overlap(&mut forks, PlayerId(1), t);
        assert_eq!(forks[0].held(), None);
        assert_eq!(forks[1].held(), Some(t));
    }

    #[test]
    fn test_retracting_fork_does_not_steal() {
        let mut registry = TargetRegistry::new(kinds());
        let t = registry.insert(0, Vec2::new(400.0, 300.0));
        let mut forks = forks();
        forks[0].trigger();
        registry.on_overlap(&mut forks, PlayerId(0), t);
        forks[1].begin_retract();

        assert_eq!(registry.on_overlap(&mut forks, PlayerId(1), t), Arbitration::Ignored);
        assert_eq!(forks[0].held(), Some(t));
    }

    #[test]
    fn test_owner_overlap_is_noop() {
        let mut registry = TargetRegistry::new(kinds());
        let t = registry.insert(0, Vec2::new(400.0, 300.0));
        let mut forks = forks();
        registry.on_overlap(&mut forks, PlayerId(0), t);
        forks[0].state = ForkState::Extending;

        assert_eq!(registry.on_overlap(&mut forks, PlayerId(0), t), Arbitration::AlreadyHeld);
        // No-op: state untouched
        assert_eq!(forks[0].state, ForkState::Extending);
    }

    #[test]
    fn test_collect_deactivates_once() {
        let mut registry = TargetRegistry::new(kinds());
        let t = registry.insert(1, Vec2::new(400.0, 300.0));
        let mut forks = forks();
        registry.on_overlap(&mut forks, PlayerId(0), t);

        assert_eq!(registry.collect(&mut forks[0]), Some((t, -3)));
        assert!(!registry.is_active(t));
        assert_eq!(registry.owner(t), None);
        assert_eq!(forks[0].held(), None);
        assert_eq!(registry.collect(&mut forks[0]), None);

        // Late overlap after collection
        forks[1].trigger();
        assert_eq!(registry.on_overlap(&mut forks, PlayerId(1), t), Arbitration::Ignored);
        assert_eq!(registry.owner(t), None);
        assert!(registry.ownership_consistent(&forks));
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let mut registry = TargetRegistry::new(kinds());
        let t = registry.insert(0, Vec2::ZERO);
        let mut forks = forks();
        assert_eq!(registry.on_overlap(&mut forks, PlayerId(7), t), Arbitration::Ignored);
        assert_eq!(registry.on_overlap(&mut forks, PlayerId(0), TargetId(99)), Arbitration::Ignored);
        assert_eq!(registry.owner(t), None);
    }

    #[test]
    fn test_remaining_potential_excludes_bonus() {
        let mut registry = TargetRegistry::new(kinds());
        registry.insert(0, Vec2::ZERO);
        registry.insert(0, Vec2::ZERO);
        registry.insert(1, Vec2::ZERO);
        assert_eq!(registry.remaining_potential(), 2);
        assert_eq!(registry.scoring_remaining(), 2);
        assert_eq!(registry.active_count(), 3);
    }

    #[test]
    fn test_unknown_kind_is_inert() {
        let mut registry = TargetRegistry::new(kinds());
        registry.insert(0, Vec2::ZERO);
        let stray = registry.insert(9, Vec2::ZERO);

        assert_eq!(registry.remaining_potential(), 1);
        assert_eq!(registry.scoring_remaining(), 1);
        assert_eq!(registry.kind_of(stray), None);

        // Collecting it scores nothing
        let mut forks = forks();
        registry.on_overlap(&mut forks, PlayerId(0), stray);
        assert_eq!(registry.collect(&mut forks[0]), None);
    }

    #[test]
    fn test_spawn_within_bounds() {
        let config = Level::Bonus.config();
        let mut rng = Pcg32::seed_from_u64(42);
        let registry = TargetRegistry::spawn(&config.targets, &mut rng);

        assert_eq!(registry.targets().len(), 12);
        let questions = registry.targets().iter().filter(|t| t.kind == 2).count();
        assert_eq!(questions, 2);
        for target in registry.targets() {
            let cfg = &config.targets[target.kind];
            assert!(target.active);
            assert!(target.pos.x >= cfg.x.min && target.pos.x <= cfg.x.max);
            assert!(target.pos.y >= cfg.y.min && target.pos.y <= cfg.y.max);
        }
    }

    #[test]
    fn test_spawn_is_seeded() {
        let mut config = Level::Classic.config();
        config.targets[0].count = SpawnRange::new(2, 8);
        let a = TargetRegistry::spawn(&config.targets, &mut Pcg32::seed_from_u64(7));
        let b = TargetRegistry::spawn(&config.targets, &mut Pcg32::seed_from_u64(7));
        assert_eq!(a.targets().len(), b.targets().len());
        for (x, y) in a.targets().iter().zip(b.targets()) {
            assert_eq!(x.pos, y.pos);
        }
    }

    proptest! {
        /// Random overlap/collect sequences never leave a target held twice
        /// or let a collected target back in
        #[test]
        fn prop_ownership_exclusive(ops in prop::collection::vec((0usize..3, 0u32..4, 0u8..4), 1..80)) {
            let mut registry = TargetRegistry::new(kinds());
            for i in 0..4 {
                registry.insert((i % 2) as usize, Vec2::ZERO);
            }
            let mut forks = forks();
            let mut collected = Vec::new();

            for (player, target, action) in ops {
                let player = player.min(1);
                match action {
                    0 => { forks[player].trigger(); }
                    1 => { registry.on_overlap(&mut forks, PlayerId(player), TargetId(target)); }
                    2 => {
                        if let Some((id, _)) = registry.collect(&mut forks[player]) {
                            prop_assert!(!collected.contains(&id));
                            collected.push(id);
                        }
                        forks[player].state = ForkState::Idle;
                    }
                    _ => { forks[player].state = ForkState::Extending; }
                }

                prop_assert!(registry.ownership_consistent(&forks));
                if let (Some(a), Some(b)) = (forks[0].held(), forks[1].held()) {
                    prop_assert_ne!(a, b);
                }
                for id in &collected {
                    prop_assert!(registry.owner(*id).is_none());
                }
            }
        }
    }
}
