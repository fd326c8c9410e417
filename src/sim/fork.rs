//! Fork actor: idle swing, extension, retraction
//!
//! A fork never touches targets itself. It only reports what its own motion
//! did; capture and collection are handled by the target registry.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::target::TargetId;
use crate::consts::*;
use crate::facing;

/// Index of a player (and of that player's fork)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

/// Fork actuation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForkState {
    /// Swinging back and forth, waiting for the fire key
    #[default]
    Idle,
    /// Flying outward along the frozen facing
    Extending,
    /// Pulling back toward the origin line, dragging any held target
    Retracting,
}

/// The rectangle forks fly in, plus the line they return past
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    pub origin_y: f32,
}

impl Field {
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

/// Outcome of a single fork update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkStep {
    /// Swung or moved, no transition
    Moved,
    /// Extending fork left the field and started retracting
    LeftField,
    /// Retracting fork crossed the origin line and is idle again
    Returned,
}

/// A player's fork
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fork {
    pub id: PlayerId,
    /// Display name ("Green", "Red")
    pub name: String,
    /// Sprite key for the renderer
    pub sprite: String,
    pub state: ForkState,
    /// Body center
    pub pos: Vec2,
    /// Radians, 0 = pointing down the field
    pub rotation: f32,
    /// +1 or -1
    pub rotation_dir: f32,
    /// Carried target. Only the target registry writes this.
    pub(crate) held: Option<TargetId>,
    pub score: i32,
    /// Wall-clock seconds of the previous update
    last_update: f64,
}

impl Fork {
    pub fn new(id: PlayerId, name: &str, sprite: &str, pos: Vec2, now: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            sprite: sprite.to_string(),
            state: ForkState::Idle,
            pos,
            rotation: 0.0,
            rotation_dir: 1.0,
            held: None,
            score: 0,
            last_update: now,
        }
    }

    /// Target this fork is carrying, if any
    #[inline]
    pub fn held(&self) -> Option<TargetId> {
        self.held
    }

    #[inline]
    pub fn facing(&self) -> Vec2 {
        facing(self.rotation)
    }

    /// Tip of the fork (bottom center of the body), where targets attach
    #[inline]
    pub fn tip(&self, tip_length: f32) -> Vec2 {
        self.pos + self.facing() * tip_length
    }

    /// Fire command. Only an idle fork launches; anything else is dropped.
    pub fn trigger(&mut self) -> bool {
        if self.state == ForkState::Idle {
            self.state = ForkState::Extending;
            true
        } else {
            false
        }
    }

    /// Switch to retracting (capture forces this even mid-extension)
    pub(crate) fn begin_retract(&mut self) {
        self.state = ForkState::Retracting;
    }

    /// Advance by the wall-clock time since this fork's last update.
    ///
    /// `held_weight` is the weight of the carried target's kind, if any.
    pub fn update(&mut self, now: f64, field: &Field, held_weight: Option<f32>) -> ForkStep {
        let dt = self.take_dt(now);

        match self.state {
            ForkState::Idle => {
                self.swing(dt);
                ForkStep::Moved
            }
            ForkState::Extending => {
                self.move_along_facing(EXTEND_SPEED * dt);
                if field.contains(self.pos) {
                    ForkStep::Moved
                } else {
                    self.state = ForkState::Retracting;
                    ForkStep::LeftField
                }
            }
            ForkState::Retracting => {
                let speed = -RETRACT_SPEED / held_weight.unwrap_or(1.0);
                self.move_along_facing(speed * dt);
                if self.pos.y < field.origin_y {
                    self.state = ForkState::Idle;
                    ForkStep::Returned
                } else {
                    ForkStep::Moved
                }
            }
        }
    }

    /// Seconds since the previous update; records `now` as the new reference
    fn take_dt(&mut self, now: f64) -> f32 {
        let dt = (now - self.last_update).max(0.0);
        self.last_update = now;
        dt as f32
    }

    fn swing(&mut self, dt: f32) {
        self.rotation += ANGULAR_SPEED * self.rotation_dir * dt;
        if self.rotation > ROTATION_LIMIT {
            self.rotation_dir = -1.0;
        }
        if self.rotation < -ROTATION_LIMIT {
            self.rotation_dir = 1.0;
        }
    }

    fn move_along_facing(&mut self, distance: f32) {
        self.pos += self.facing() * distance;
    }
}
