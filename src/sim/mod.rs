//! Match simulation module
//!
//! All gameplay logic lives here, with no rendering or platform dependencies:
//! - Time comes in as wall-clock seconds, each fork keeps its own reference
//! - Seeded RNG only
//! - Stable iteration order (forks by player index, targets by id)

pub mod fork;
pub mod overlap;
pub mod state;
pub mod target;
pub mod tick;

pub use fork::{Field, Fork, ForkState, ForkStep, PlayerId};
pub use overlap::{circles_overlap, detect_overlaps};
pub use state::{MatchEvent, MatchOutcome, MatchState};
pub use target::{Arbitration, Target, TargetId, TargetKind, TargetRegistry};
pub use tick::{decide_outcome, end_reached, tick};
