//! Fork Duel - A two-player fork-throwing arcade game
//!
//! Core modules:
//! - `sim`: Pure match logic (fork state machine, target ownership, scoring)
//! - `controller`: Host-facing match controller driven by frame/key/overlap callbacks
//! - `host`: Contract with the rendering/physics collaborator
//! - `clock`: Wall-clock sources for per-fork timing
//! - `config`: Data-driven match configuration and level presets

pub mod clock;
pub mod config;
pub mod controller;
pub mod host;
pub mod sim;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EndPolicy, Level, MatchConfig, TargetClass};
pub use controller::MatchController;
pub use host::{BodyHandle, World};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    /// Y coordinate of the line forks launch from and return past
    pub const ORIGIN_Y: f32 = 50.0;

    /// Idle swing speed (radians per second)
    pub const ANGULAR_SPEED: f32 = 2.0;
    /// Swing direction flips once |rotation| exceeds this
    pub const ROTATION_LIMIT: f32 = 1.3;

    /// Outward speed while extending (units per second)
    pub const EXTEND_SPEED: f32 = 300.0;
    /// Return speed with an empty fork; divided by the held target's weight
    pub const RETRACT_SPEED: f32 = 150.0;

    /// Distance from fork body center to its tip (bottom center of the sprite)
    pub const FORK_TIP_LENGTH: f32 = 32.0;
    /// Radius of the fork tip used by the reference overlap detector
    pub const TIP_RADIUS: f32 = 8.0;
    /// Default target body radius
    pub const TARGET_RADIUS: f32 = 16.0;
    /// Most targets a single kind may spawn
    pub const MAX_TARGETS_PER_KIND: u32 = 1000;
}

/// Unit vector a fork points along at the given rotation.
///
/// Rotation 0 points straight down the field (+y), positive rotation swings
/// the tip toward -x.
#[inline]
pub fn facing(theta: f32) -> Vec2 {
    Vec2::new(-theta.sin(), theta.cos())
}
