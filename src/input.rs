//! Raw device input to game intents
//!
//! Key bindings resolve per context, so the same key can mean "jump" while
//! playing and "start" on the menu:
//!   (key, context) → Action → Intent
//!
//! Rules enforced here:
//! - every press yields at most one intent; key auto-repeat and held pointers
//!   never re-fire until released
//! - on the menu / game-over / won screens only the start intent exists
//! - swipes resolve to their dominant axis and must exceed a minimum length
//!
//! The reversal guard needs the current heading, so the grid-chase game
//! applies it when the intent reaches its world.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SWIPE_THRESHOLD;
use crate::state::GameState;

/// Cardinal movement direction (screen space, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// (column, row) delta of one step
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Raw event from the host (canvas-relative coordinates)
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// `KeyboardEvent.key`
    KeyDown(String),
    KeyUp(String),
    PointerDown { x: f32, y: f32 },
    PointerUp,
    TouchStart { x: f32, y: f32 },
    TouchEnd { x: f32, y: f32 },
}

/// A discrete request to the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Start from the menu, or restart after game over / win
    Start,
    /// Pause while playing, resume while paused
    TogglePause,
    Move(Direction),
    /// Jump / flip / gather
    Activate,
    /// Pointer press at canvas coordinates
    Select { x: f32, y: f32 },
    /// Pick an entry from a numbered catalog (0-based)
    Choose(u8),
}

/// Which screen the input arrives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputContext {
    /// Menu, game over and won screens
    Menu,
    Playing,
    Paused,
}

impl InputContext {
    pub fn for_state(state: GameState) -> Self {
        match state {
            GameState::Playing => InputContext::Playing,
            GameState::Paused => InputContext::Paused,
            GameState::Menu | GameState::GameOver | GameState::Won => InputContext::Menu,
        }
    }
}

/// (key, context) → intent
#[derive(Debug, Clone, Default)]
pub struct InputBindings {
    keys: HashMap<(String, InputContext), Intent>,
}

impl InputBindings {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Defaults shared by every game: start keys, arrows + WASD, activate on
    /// space.
    pub fn standard() -> Self {
        let mut b = Self::empty();
        for key in ["Enter", " "] {
            b.bind(key, InputContext::Menu, Intent::Start);
        }
        let moves = [
            (["ArrowUp", "w", "W"], Direction::Up),
            (["ArrowDown", "s", "S"], Direction::Down),
            (["ArrowLeft", "a", "A"], Direction::Left),
            (["ArrowRight", "d", "D"], Direction::Right),
        ];
        for (keys, dir) in moves {
            for key in keys {
                b.bind(key, InputContext::Playing, Intent::Move(dir));
            }
        }
        b.bind(" ", InputContext::Playing, Intent::Activate);
        b
    }

    /// Bind pause toggling in both the playing and paused contexts
    pub fn with_pause(mut self) -> Self {
        for key in ["p", "P", "Escape"] {
            self.bind(key, InputContext::Playing, Intent::TogglePause);
            self.bind(key, InputContext::Paused, Intent::TogglePause);
        }
        self
    }

    /// Bind the digit keys `1..=count` to catalog choices
    pub fn with_catalog(mut self, count: u8) -> Self {
        for i in 0..count.min(9) {
            let key = (i + 1).to_string();
            self.bind(&key, InputContext::Playing, Intent::Choose(i));
        }
        self
    }

    pub fn bind(&mut self, key: &str, context: InputContext, intent: Intent) {
        self.keys.insert((key.to_string(), context), intent);
    }

    pub fn unbind(&mut self, key: &str, context: InputContext) {
        self.keys.remove(&(key.to_string(), context));
    }

    pub fn resolve(&self, key: &str, context: InputContext) -> Option<Intent> {
        self.keys.get(&(key.to_string(), context)).copied()
    }
}

/// Stateful mapper: tracks held keys/pointers and in-flight touches
#[derive(Debug, Clone)]
pub struct InputMapper {
    bindings: InputBindings,
    held_keys: HashSet<String>,
    pointer_held: bool,
    touch_start: Option<Vec2>,
    swipe_threshold: f32,
}

impl InputMapper {
    pub fn new(bindings: InputBindings) -> Self {
        Self {
            bindings,
            held_keys: HashSet::new(),
            pointer_held: false,
            touch_start: None,
            swipe_threshold: SWIPE_THRESHOLD,
        }
    }

    pub fn with_swipe_threshold(mut self, threshold: f32) -> Self {
        self.swipe_threshold = threshold.max(0.0);
        self
    }

    pub fn bindings(&self) -> &InputBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut InputBindings {
        &mut self.bindings
    }

    /// Translate one raw event given the current game state
    pub fn map(&mut self, raw: &RawInput, state: GameState) -> Option<Intent> {
        let context = InputContext::for_state(state);
        match raw {
            RawInput::KeyDown(key) => {
                // Auto-repeat: already held keys stay silent until released
                if !self.held_keys.insert(key.clone()) {
                    return None;
                }
                self.bindings.resolve(key, context)
            }
            RawInput::KeyUp(key) => {
                self.held_keys.remove(key);
                None
            }
            RawInput::PointerDown { x, y } => {
                if self.pointer_held {
                    return None;
                }
                self.pointer_held = true;
                match context {
                    InputContext::Menu => Some(Intent::Start),
                    InputContext::Playing => Some(Intent::Select { x: *x, y: *y }),
                    InputContext::Paused => None,
                }
            }
            RawInput::PointerUp => {
                self.pointer_held = false;
                None
            }
            RawInput::TouchStart { x, y } => {
                self.touch_start = Some(Vec2::new(*x, *y));
                None
            }
            RawInput::TouchEnd { x, y } => {
                let start = self.touch_start.take()?;
                let dir = resolve_swipe(start, Vec2::new(*x, *y), self.swipe_threshold)?;
                match context {
                    InputContext::Menu => Some(Intent::Start),
                    InputContext::Playing => Some(Intent::Move(dir)),
                    InputContext::Paused => None,
                }
            }
        }
    }

    /// Forget held keys (focus loss, session restart)
    pub fn release_all(&mut self) {
        self.held_keys.clear();
        self.pointer_held = false;
        self.touch_start = None;
    }
}

/// Resolve a swipe to its dominant axis; short gestures are noise
pub fn resolve_swipe(start: Vec2, end: Vec2, threshold: f32) -> Option<Direction> {
    let delta = end - start;
    let (ax, ay) = (delta.x.abs(), delta.y.abs());
    if ax.max(ay) <= threshold {
        return None;
    }
    if ax > ay {
        Some(if delta.x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        })
    } else {
        Some(if delta.y > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        })
    }
}
