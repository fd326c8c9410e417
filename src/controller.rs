//! Match controller: the surface a host engine drives
//!
//! The host calls `on_frame` once per display refresh, `on_key_down` /
//! `on_fire_key` for input and `on_overlap` for every fork/target contact its
//! physics reports. After each frame the controller pushes fork transforms,
//! dragged targets, removals, scores and the end message back into the `World`.

use crate::clock::Clock;
use crate::config::{ConfigError, MatchConfig};
use crate::host::{BodyHandle, World};
use crate::sim::{Arbitration, ForkState, MatchEvent, MatchState, PlayerId, TargetId, tick};

/// Owns the match and talks to the host world
#[derive(Debug)]
pub struct MatchController<W: World, C: Clock> {
    state: MatchState,
    world: W,
    clock: C,
    /// Lowercased fire key -> player
    bindings: Vec<(char, PlayerId)>,
}

impl<W: World, C: Clock> MatchController<W, C> {
    /// Set up the match and place every body in the world
    pub fn new(config: &MatchConfig, world: W, clock: C) -> Result<Self, ConfigError> {
        let state = MatchState::new(config, clock.now())?;
        let bindings = config
            .forks
            .iter()
            .enumerate()
            .map(|(i, fork)| (fork.fire_key.to_ascii_lowercase(), PlayerId(i)))
            .collect();

        let mut controller = Self {
            state,
            world,
            clock,
            bindings,
        };
        controller.place_bodies();
        Ok(controller)
    }

    /// Per-frame callback. The host's elapsed time is only logged: forks
    /// measure their own step from the clock.
    pub fn on_frame(&mut self, elapsed: f64) {
        log::trace!("Frame {} (host elapsed {:.4}s)", self.state.frame + 1, elapsed);
        tick(&mut self.state, self.clock.now());
        self.sync_world();
    }

    /// Raw key-down; fires the fork bound to `key`, if any
    pub fn on_key_down(&mut self, key: char) -> bool {
        let key = key.to_ascii_lowercase();
        match self.bindings.iter().find(|(k, _)| *k == key) {
            Some(&(_, player)) => self.on_fire_key(player),
            None => {
                log::trace!("Unbound key {:?}", key);
                false
            }
        }
    }

    pub fn on_fire_key(&mut self, player: PlayerId) -> bool {
        self.state.fire(player)
    }

    pub fn on_overlap(&mut self, player: PlayerId, target: TargetId) -> Arbitration {
        self.state.resolve_overlap(player, target)
    }

    pub fn is_game_ended(&self) -> bool {
        self.state.is_game_ended()
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    fn place_bodies(&mut self) {
        for fork in &self.state.forks {
            let body = BodyHandle::Fork(fork.id);
            self.world.set_body_position(body, fork.pos);
            self.world.set_body_rotation(body, fork.rotation);
        }
        for target in self.state.registry.targets() {
            self.world
                .set_body_position(BodyHandle::Target(target.id), target.pos);
        }
        self.world.refresh_static_group();
    }

    fn sync_world(&mut self) {
        for event in self.state.drain_events() {
            if let MatchEvent::Collected { target, .. } = event {
                self.world.destroy_body(BodyHandle::Target(target));
            }
        }

        let mut dragged = false;
        for fork in &self.state.forks {
            let body = BodyHandle::Fork(fork.id);
            self.world.set_body_position(body, fork.pos);
            self.world.set_body_rotation(body, fork.rotation);

            if fork.state != ForkState::Retracting {
                continue;
            }
            if let Some(target) = fork.held().and_then(|t| self.state.registry.get(t)) {
                self.world
                    .set_body_position(BodyHandle::Target(target.id), target.pos);
                dragged = true;
            }
        }
        if dragged {
            self.world.refresh_static_group();
        }

        for fork in &self.state.forks {
            self.world.render_score(fork.id, fork.score);
        }
        if let Some(message) = self.state.outcome_message() {
            self.world.render_message(&message);
        }
    }
}
