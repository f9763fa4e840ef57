//! Arcade Core - shared engine for the desktop simulator's arcade games
//!
//! Core modules:
//! - `clock`: Logical tick scheduling decoupled from paint rate
//! - `input`: Raw key/pointer/touch events to game intents
//! - `entity` / `collision`: Positional state and overlap tests
//! - `spawn`: Procedural placement of food and obstacles
//! - `state`: Game lifecycle state machine
//! - `score`: High score persistence
//! - `variant`: Per-game strategies (snake, dino, memory, village)
//! - `session` / `registry`: The engine driving one hosted game, and the host-owned registry
//! - `platform`: Drawing surface, key-value store and notification sink

pub mod clock;
pub mod collision;
pub mod entity;
pub mod error;
pub mod input;
pub mod platform;
pub mod registry;
pub mod render;
pub mod score;
pub mod session;
pub mod settings;
pub mod spawn;
pub mod state;
pub mod variant;

pub use error::EngineError;
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{GameSession, SessionConfig, SessionSnapshot};
pub use settings::EngineSettings;
pub use state::GameState;
pub use variant::VariantKind;

/// Engine configuration constants
pub mod consts {
    /// Logical step for discrete grid movement (ms)
    pub const GRID_STEP_MS: f64 = 150.0;
    /// Logical step for the idle builder economy (ms)
    pub const ECONOMY_STEP_MS: f64 = 1000.0;

    /// Minimum swipe length before a touch gesture registers (px)
    pub const SWIPE_THRESHOLD: f32 = 30.0;

    /// Toast duration for high score callouts (ms)
    pub const HIGH_SCORE_TOAST_MS: u32 = 3000;

    /// LocalStorage key for engine settings
    pub const SETTINGS_KEY: &str = "arcade_settings";
    /// Suffix appended to the variant id to form its high score key
    pub const HIGH_SCORE_SUFFIX: &str = "_high_score";
}
