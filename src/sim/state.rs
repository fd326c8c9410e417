//! Match state and core simulation types
//!
//! Everything the match mutates lives in `MatchState`; there is no global state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::fork::{Field, Fork, PlayerId};
use super::target::{Arbitration, TargetId, TargetRegistry};
use crate::config::{ConfigError, EndPolicy, MatchConfig};

/// Result of a finished match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Winner(PlayerId),
    Draw,
}

impl MatchOutcome {
    /// Text shown to the players
    pub fn message(&self, forks: &[Fork]) -> String {
        match self {
            MatchOutcome::Draw => "You guys are equally strong.".to_string(),
            MatchOutcome::Winner(id) => {
                let name = forks.get(id.0).map(|f| f.name.as_str()).unwrap_or("?");
                format!("Congratulation Player {}, you win!!!", name)
            }
        }
    }
}

/// Something that happened during a frame, for the host to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    Fired { player: PlayerId },
    LeftField { player: PlayerId },
    Captured { player: PlayerId, target: TargetId },
    Stolen { from: PlayerId, to: PlayerId, target: TargetId },
    /// Target brought past the origin line and removed
    Collected { player: PlayerId, target: TargetId, value: i32 },
    Returned { player: PlayerId },
    /// First frame the end condition held
    Ended(MatchOutcome),
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct MatchState {
    /// Layout seed for reproducibility
    pub seed: u64,
    pub field: Field,
    /// Body center to tip distance
    pub tip_length: f32,
    /// Tip radius for overlap checks
    pub tip_radius: f32,
    pub end_policy: EndPolicy,
    /// One per player, indexed by `PlayerId`
    pub forks: Vec<Fork>,
    pub registry: TargetRegistry,
    /// Set once the end condition first holds, then kept up to date
    pub outcome: Option<MatchOutcome>,
    /// Frames ticked so far
    pub frame: u64,
    /// Events since the host last drained them
    pub events: Vec<MatchEvent>,
}

impl MatchState {
    /// Validate the config, seed the RNG and scatter the targets.
    ///
    /// `now` is the wall-clock time the forks measure their first step from.
    pub fn new(config: &MatchConfig, now: f64) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);
        let registry = TargetRegistry::spawn(&config.targets, &mut rng);

        let forks = config
            .forks
            .iter()
            .enumerate()
            .map(|(i, cfg)| {
                let spawn = Vec2::new(cfg.spawn[0], cfg.spawn[1]);
                Fork::new(PlayerId(i), &cfg.name, &cfg.sprite, spawn, now)
            })
            .collect();

        log::info!(
            "Match set up with seed {}: {} targets, {} policy",
            seed,
            registry.targets().len(),
            config.end_policy.as_str()
        );

        Ok(Self {
            seed,
            field: Field {
                width: config.width,
                height: config.height,
                origin_y: config.origin_y,
            },
            tip_length: config.fork_tip_length,
            tip_radius: config.tip_radius,
            end_policy: config.end_policy,
            forks,
            registry,
            outcome: None,
            frame: 0,
            events: Vec::new(),
        })
    }

    pub fn fork(&self, player: PlayerId) -> Option<&Fork> {
        self.forks.get(player.0)
    }

    /// Fire command for a player. Unknown players and busy forks are ignored.
    pub fn fire(&mut self, player: PlayerId) -> bool {
        let Some(fork) = self.forks.get_mut(player.0) else {
            log::debug!("Fire for unknown player {:?} ignored", player);
            return false;
        };
        if !fork.trigger() {
            return false;
        }
        log::debug!("{} fires at rotation {:.2}", fork.name, fork.rotation);
        self.events.push(MatchEvent::Fired { player });
        true
    }

    /// Feed one overlap notification through ownership arbitration
    pub fn resolve_overlap(&mut self, player: PlayerId, target: TargetId) -> Arbitration {
        let result = self.registry.on_overlap(&mut self.forks, player, target);
        match result {
            Arbitration::Captured => {
                log::debug!("Player {:?} captured {:?}", player, target);
                self.events.push(MatchEvent::Captured { player, target });
            }
            Arbitration::Stolen { from } => {
                log::debug!("Player {:?} stole {:?} from {:?}", player, target, from);
                self.events.push(MatchEvent::Stolen {
                    from,
                    to: player,
                    target,
                });
            }
            Arbitration::Ignored | Arbitration::AlreadyHeld => {}
        }
        result
    }

    pub fn is_game_ended(&self) -> bool {
        self.outcome.is_some()
    }

    /// End-of-match text, once the match is over
    pub fn outcome_message(&self) -> Option<String> {
        self.outcome.map(|o| o.message(&self.forks))
    }

    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }
}
