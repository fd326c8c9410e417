//! Match configuration and level presets
//!
//! Everything here is data: field geometry, fork placement and key bindings,
//! and the table of target kinds. `MatchConfig::validate` rejects anything the
//! simulation cannot run with, so the sim never has to.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Reasons a configuration is refused at load time
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid field size: {width}x{height}")]
    InvalidField { width: f32, height: f32 },

    #[error("Origin line y={origin_y} lies outside the field (height {height})")]
    OriginOutsideField { origin_y: f32, height: f32 },

    #[error("Expected exactly two forks, found {found}")]
    ForkCount { found: usize },

    #[error("Fire key {key:?} is bound to more than one fork")]
    DuplicateFireKey { key: char },

    #[error("No target kinds configured")]
    NoTargetKinds,

    #[error("Duplicate target kind: {name}")]
    DuplicateKind { name: String },

    #[error("Target kind {name} has weight {weight}, weight must be positive")]
    InvalidWeight { name: String, weight: f32 },

    #[error("Target kind {name} has radius {radius}, radius must be positive")]
    InvalidRadius { name: String, radius: f32 },

    #[error("Target kind {name} asks for up to {count} targets, the limit is {limit}")]
    TooManyTargets { name: String, count: u32, limit: u32 },

    #[error("Target kind {name}: {axis} range {min}..={max} is empty")]
    InvalidRange {
        name: String,
        axis: &'static str,
        min: f32,
        max: f32,
    },
}

/// How the match decides it is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EndPolicy {
    /// Over once every scoring target has been collected
    #[default]
    Exhaustion,
    /// Over once the trailing player cannot catch up with what is left
    Mercy,
}

impl EndPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndPolicy::Exhaustion => "Exhaustion",
            EndPolicy::Mercy => "Mercy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exhaustion" => Some(EndPolicy::Exhaustion),
            "mercy" => Some(EndPolicy::Mercy),
            _ => None,
        }
    }
}

/// Whether a kind counts toward the end condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetClass {
    #[default]
    Scoring,
    /// Traps and jackpots: never block the end of a match
    Bonus,
}

/// Inclusive spawn range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> SpawnRange<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// A range that always yields `value`
    pub fn fixed(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// True if no value satisfies min <= v <= max (also catches NaN bounds)
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn is_empty(&self) -> bool {
        !(self.min <= self.max)
    }
}

/// One player's fork
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForkConfig {
    /// Display name used in the victory message ("Green", "Red")
    pub name: String,
    /// Sprite key handed to the renderer
    pub sprite: String,
    /// Where the fork body starts
    pub spawn: [f32; 2],
    /// Key that fires this fork
    pub fire_key: char,
}

/// A kind of target and how many to scatter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetKindConfig {
    /// Unique name, doubles as the sprite key
    pub name: String,
    /// Score delta on collection (negative for traps)
    pub value: i32,
    /// Divides the retraction speed while held
    pub weight: f32,
    #[serde(default = "default_target_radius")]
    pub radius: f32,
    pub count: SpawnRange<u32>,
    pub x: SpawnRange<f32>,
    pub y: SpawnRange<f32>,
    #[serde(default)]
    pub class: TargetClass,
}

fn default_target_radius() -> f32 {
    TARGET_RADIUS
}

fn default_tip_length() -> f32 {
    FORK_TIP_LENGTH
}

fn default_tip_radius() -> f32 {
    TIP_RADIUS
}

/// Complete description of a match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    pub width: f32,
    pub height: f32,
    pub origin_y: f32,
    #[serde(default = "default_tip_length")]
    pub fork_tip_length: f32,
    #[serde(default = "default_tip_radius")]
    pub tip_radius: f32,
    /// Layout seed; a random one is drawn when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub end_policy: EndPolicy,
    pub forks: Vec<ForkConfig>,
    pub targets: Vec<TargetKindConfig>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Level::Classic.config()
    }
}

impl MatchConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded config from {} ({} target kinds)",
            path.as_ref().display(),
            config.targets.len()
        );
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_end_policy(mut self, policy: EndPolicy) -> Self {
        self.end_policy = policy;
        self
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::InvalidField {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.origin_y >= 0.0 && self.origin_y <= self.height) {
            return Err(ConfigError::OriginOutsideField {
                origin_y: self.origin_y,
                height: self.height,
            });
        }

        if self.forks.len() != 2 {
            return Err(ConfigError::ForkCount {
                found: self.forks.len(),
            });
        }
        let mut keys = HashSet::new();
        for fork in &self.forks {
            let key = fork.fire_key.to_ascii_lowercase();
            if !keys.insert(key) {
                return Err(ConfigError::DuplicateFireKey { key: fork.fire_key });
            }
        }

        if self.targets.is_empty() {
            return Err(ConfigError::NoTargetKinds);
        }
        let mut names = HashSet::new();
        for kind in &self.targets {
            if !names.insert(kind.name.as_str()) {
                return Err(ConfigError::DuplicateKind {
                    name: kind.name.clone(),
                });
            }
            // Retraction speed divides by weight
            if !(kind.weight > 0.0 && kind.weight.is_finite()) {
                return Err(ConfigError::InvalidWeight {
                    name: kind.name.clone(),
                    weight: kind.weight,
                });
            }
            if !(kind.radius > 0.0) {
                return Err(ConfigError::InvalidRadius {
                    name: kind.name.clone(),
                    radius: kind.radius,
                });
            }
            if kind.count.max > MAX_TARGETS_PER_KIND {
                return Err(ConfigError::TooManyTargets {
                    name: kind.name.clone(),
                    count: kind.count.max,
                    limit: MAX_TARGETS_PER_KIND,
                });
            }
            let ranges = [
                ("count", kind.count.is_empty(), kind.count.min as f32, kind.count.max as f32),
                ("x", kind.x.is_empty(), kind.x.min, kind.x.max),
                ("y", kind.y.is_empty(), kind.y.min, kind.y.max),
            ];
            for (axis, empty, min, max) in ranges {
                if empty || !min.is_finite() || !max.is_finite() {
                    return Err(ConfigError::InvalidRange {
                        name: kind.name.clone(),
                        axis,
                        min,
                        max,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Built-in levels. Each is a fixed set of constants; there is no progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Level {
    /// Cubes and mushrooms, play until the field is empty
    #[default]
    Classic,
    /// Classic plus question-mark traps, ends on an uncatchable lead
    Bonus,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Classic => "Classic",
            Level::Bonus => "Bonus",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Level::Classic),
            "bonus" => Some(Level::Bonus),
            _ => None,
        }
    }

    pub fn config(&self) -> MatchConfig {
        let mut targets = vec![
            TargetKindConfig {
                name: "cube".to_string(),
                value: 1,
                weight: 2.0,
                radius: TARGET_RADIUS,
                count: SpawnRange::fixed(5),
                x: SpawnRange::new(200.0, 600.0),
                y: SpawnRange::new(250.0, 350.0),
                class: TargetClass::Scoring,
            },
            TargetKindConfig {
                name: "mushroom".to_string(),
                value: 2,
                weight: 1.0,
                radius: TARGET_RADIUS,
                count: SpawnRange::fixed(5),
                x: SpawnRange::new(200.0, 600.0),
                y: SpawnRange::new(400.0, 550.0),
                class: TargetClass::Scoring,
            },
        ];

        let end_policy = match self {
            Level::Classic => EndPolicy::Exhaustion,
            Level::Bonus => {
                targets.push(TargetKindConfig {
                    name: "question".to_string(),
                    value: -3,
                    weight: 0.5,
                    radius: TARGET_RADIUS,
                    count: SpawnRange::fixed(2),
                    x: SpawnRange::new(150.0, 650.0),
                    y: SpawnRange::new(300.0, 500.0),
                    class: TargetClass::Bonus,
                });
                EndPolicy::Mercy
            }
        };

        MatchConfig {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            origin_y: ORIGIN_Y,
            fork_tip_length: FORK_TIP_LENGTH,
            tip_radius: TIP_RADIUS,
            seed: None,
            end_policy,
            forks: vec![
                ForkConfig {
                    name: "Green".to_string(),
                    sprite: "fork".to_string(),
                    spawn: [200.0, ORIGIN_Y],
                    fire_key: 'Q',
                },
                ForkConfig {
                    name: "Red".to_string(),
                    sprite: "red-fork".to_string(),
                    spawn: [600.0, ORIGIN_Y],
                    fire_key: 'P',
                },
            ],
            targets,
        }
    }
}
