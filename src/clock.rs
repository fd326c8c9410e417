//! Wall-clock sources
//!
//! Each fork measures its own time step from wall-clock reads instead of the
//! frame delta the host passes in, so the clock is injected.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic time source in seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Real time since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Hand-advanced clock for headless runs and tests.
///
/// Clones share the same time, so a host can keep one handle while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            time: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, secs: f64) {
        self.time.set(self.time.get() + secs);
    }

    pub fn set(&self, secs: f64) {
        self.time.set(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}
