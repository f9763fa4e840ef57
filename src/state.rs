//! Game lifecycle state machine
//!
//! ```text
//! Menu ──start──▶ Playing ──pause──▶ Paused
//!                  │  ▲ ◀──resume──────┘
//!          lose/win│  │restart
//!                  ▼  │
//!            GameOver / Won
//! ```
//!
//! Transitions are a total function of (state, event); anything not in the
//! table is a no-op, never an error.

use serde::{Deserialize, Serialize};

/// Current lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Title screen, waiting for a start intent
    #[default]
    Menu,
    Playing,
    /// Only reachable for pausable games
    Paused,
    GameOver,
    Won,
}

impl GameState {
    /// Terminal screens are left only through a restart
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameState::GameOver | GameState::Won)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Menu => "menu",
            GameState::Playing => "playing",
            GameState::Paused => "paused",
            GameState::GameOver => "gameover",
            GameState::Won => "won",
        }
    }
}

/// Whether a game supports pausing; fixed at session creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    Pausable,
    NonPausable,
}

/// Something that can move the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Start,
    Pause,
    Resume,
    /// Fatal collision or other loss condition
    Lose,
    /// Win condition reached
    Win,
    Restart,
}

/// Side effect the engine must apply when a transition fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Reset the world to its initial configuration and zero the score
    ResetWorld,
    /// Freeze the scheduler, keep the world
    FreezeClock,
    /// Resume the scheduler
    ResumeClock,
    /// Stop the scheduler and record the score
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: GameState,
    pub effect: Effect,
}

/// Look up the transition for `event` in `state`, or `None` if the event is
/// not valid there.
pub fn transition(state: GameState, event: Event, capability: Capability) -> Option<Transition> {
    use Effect::*;
    use GameState::*;

    let (to, effect) = match (state, event) {
        (Menu, Event::Start) => (Playing, ResetWorld),
        (Playing, Event::Pause) if capability == Capability::Pausable => (Paused, FreezeClock),
        (Paused, Event::Resume) => (Playing, ResumeClock),
        (Playing, Event::Lose) => (GameOver, Finish),
        (Playing, Event::Win) => (Won, Finish),
        (GameOver | Won, Event::Restart) => (Playing, ResetWorld),
        _ => return None,
    };
    Some(Transition { to, effect })
}
