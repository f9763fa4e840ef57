//! Logical tick scheduling
//!
//! The host calls `on_frame` on every render opportunity (typically
//! `requestAnimationFrame`). Fixed-rate games accumulate elapsed time and only
//! step when their interval has passed; display-rate games step every frame.
//! A render is requested on every frame regardless.
//!
//! Unlike a physics accumulator, missed steps are dropped rather than caught
//! up: at most one logical step runs per frame, even after a long stall.

use serde::{Deserialize, Serialize};

/// How often a game advances its world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TickRate {
    /// One step per elapsed interval (ms)
    Fixed { interval_ms: f64 },
    /// One step per render opportunity
    Display,
}

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    /// Created, not yet started (menu screen)
    Idle,
    /// Stepping
    Running,
    /// Suspended, world retained
    Paused,
    /// Halted (game over / won / destroyed)
    Stopped,
}

/// What the session should do for one render opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOutcome {
    pub step: bool,
    pub render: bool,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    rate: TickRate,
    state: ClockState,
    accumulator_ms: f64,
    ticks: u64,
}

impl Scheduler {
    pub fn new(rate: TickRate) -> Self {
        Self {
            rate,
            state: ClockState::Idle,
            accumulator_ms: 0.0,
            ticks: 0,
        }
    }

    pub fn rate(&self) -> TickRate {
        self.rate
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Logical steps issued since the last `start`
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Begin (or restart) ticking from a clean accumulator
    pub fn start(&mut self) {
        self.state = ClockState::Running;
        self.accumulator_ms = 0.0;
        self.ticks = 0;
    }

    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
        }
    }

    /// Resume without counting the paused time toward the next step
    pub fn resume(&mut self) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Running;
            self.accumulator_ms = 0.0;
        }
    }

    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.accumulator_ms = 0.0;
    }

    /// Feed one render opportunity with the wall time elapsed since the last one
    pub fn on_frame(&mut self, elapsed_ms: f64) -> FrameOutcome {
        if self.state != ClockState::Running {
            return FrameOutcome {
                step: false,
                render: true,
            };
        }

        let step = match self.rate {
            TickRate::Display => true,
            TickRate::Fixed { interval_ms } => {
                // Negative/NaN deltas (clock skew, first frame) count as zero
                let elapsed = if elapsed_ms.is_finite() {
                    elapsed_ms.max(0.0)
                } else {
                    0.0
                };
                self.accumulator_ms += elapsed;
                if self.accumulator_ms >= interval_ms {
                    // Keep the phase, drop whole missed intervals
                    self.accumulator_ms %= interval_ms;
                    true
                } else {
                    false
                }
            }
        };

        if step {
            self.ticks += 1;
        }
        FrameOutcome { step, render: true }
    }
}
