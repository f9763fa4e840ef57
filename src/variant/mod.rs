//! Per-game strategies plugged into the shared engine
//!
//! Each game supplies its world, how intents and ticks mutate it, its loss/win
//! rules and how it is drawn. The session owns everything else: lifecycle,
//! scheduling, score bookkeeping and persistence.

pub mod memory;
pub mod runner;
pub mod snake;
pub mod village;

pub use memory::Memory;
pub use runner::Runner;
pub use snake::Snake;
pub use village::Village;

use std::fmt;
use std::str::FromStr;

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::clock::TickRate;
use crate::error::EngineError;
use crate::input::{InputBindings, Intent};
use crate::platform::Surface;
use crate::settings::EngineSettings;
use crate::state::Capability;

/// The arcade games the engine can host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantKind {
    /// Grid-chase
    Snake,
    /// Endless runner
    Runner,
    /// Card matching
    Memory,
    /// Idle builder
    Village,
}

impl VariantKind {
    pub const ALL: [VariantKind; 4] = [
        VariantKind::Snake,
        VariantKind::Runner,
        VariantKind::Memory,
        VariantKind::Village,
    ];

    /// Identifier used by the host and in storage keys
    pub fn id(&self) -> &'static str {
        match self {
            VariantKind::Snake => "snake",
            VariantKind::Runner => "dino",
            VariantKind::Memory => "memory",
            VariantKind::Village => "village",
        }
    }

    /// Display name
    pub fn title(&self) -> &'static str {
        match self {
            VariantKind::Snake => "Snake",
            VariantKind::Runner => "Dino Run",
            VariantKind::Memory => "Memory Match",
            VariantKind::Village => "Village Builder",
        }
    }

    /// Instantiate the game's strategy with a fresh (not yet reset) world
    pub fn build(&self, settings: &EngineSettings, surface_size: (f32, f32)) -> Box<dyn Variant> {
        match self {
            VariantKind::Snake => Box::new(Snake::new(settings.snake.clone())),
            VariantKind::Runner => Box::new(Runner::new(settings.runner.clone())),
            VariantKind::Memory => Box::new(Memory::new(settings.memory.clone(), surface_size)),
            VariantKind::Village => Box::new(Village::new(settings.village.clone(), surface_size)),
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for VariantKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snake" => Ok(VariantKind::Snake),
            "dino" | "runner" => Ok(VariantKind::Runner),
            "memory" => Ok(VariantKind::Memory),
            "village" => Ok(VariantKind::Village),
            _ => Err(EngineError::UnknownVariant(s.to_string())),
        }
    }
}

/// How a step or intent ended for the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    Continue,
    Lost,
    Won,
}

/// Result of applying an intent or a tick to a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    pub outcome: Outcome,
    /// Score earned by this step
    pub points: u64,
}

impl StepReport {
    pub fn points(points: u64) -> Self {
        Self {
            outcome: Outcome::Continue,
            points,
        }
    }

    pub fn lost() -> Self {
        Self {
            outcome: Outcome::Lost,
            points: 0,
        }
    }

    pub fn won(points: u64) -> Self {
        Self {
            outcome: Outcome::Won,
            points,
        }
    }
}

/// A game's world plus its rules
pub trait Variant {
    fn kind(&self) -> VariantKind;

    fn capability(&self) -> Capability {
        Capability::NonPausable
    }

    fn tick_rate(&self) -> TickRate;

    /// Key bindings for this game
    fn bindings(&self) -> InputBindings {
        InputBindings::standard()
    }

    /// Restore the initial configuration
    fn reset(&mut self, rng: &mut Pcg32);

    /// Apply a gameplay intent while playing. `None` means the intent was
    /// rejected and the world is untouched.
    fn apply_intent(&mut self, intent: Intent, rng: &mut Pcg32) -> Option<StepReport>;

    /// Advance the world by one logical tick
    fn update(&mut self, rng: &mut Pcg32) -> StepReport;

    /// Check the world's structural invariants
    fn is_consistent(&self) -> bool;

    /// Draw the world (overlays are drawn by the engine)
    fn render(&self, surface: &mut dyn Surface);

    /// Stable serialization of the world, for change detection and debugging
    fn fingerprint(&self) -> String;
}

/// Serialize a world for `Variant::fingerprint`
pub(crate) fn fingerprint_of<T: Serialize>(world: &T) -> String {
    serde_json::to_string(world).unwrap_or_default()
}
