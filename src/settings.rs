//! Engine settings and per-game tuning
//!
//! Persisted as one JSON document in the key-value store. Missing fields take
//! their defaults, so older documents keep loading as new knobs are added.

use serde::{Deserialize, Serialize};

use crate::consts::{ECONOMY_STEP_MS, GRID_STEP_MS, SETTINGS_KEY, SWIPE_THRESHOLD};
use crate::platform::KeyValueStore;
use crate::spawn::SpawnTable;

/// Input tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Minimum swipe length (px)
    pub swipe_threshold: f32,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            swipe_threshold: SWIPE_THRESHOLD,
        }
    }
}

/// Grid-chase tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeSettings {
    pub cols: i32,
    pub rows: i32,
    pub step_ms: f64,
    pub start_length: usize,
    pub food_points: u64,
}

impl Default for SnakeSettings {
    fn default() -> Self {
        Self {
            cols: 20,
            rows: 20,
            step_ms: GRID_STEP_MS,
            start_length: 3,
            food_points: 10,
        }
    }
}

/// Endless runner tuning (distances in px, times in ticks)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    pub width: f32,
    pub height: f32,
    pub ground_y: f32,
    pub player_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub start_speed: f32,
    pub speed_ramp: f32,
    pub max_speed: f32,
    pub points_per_tick: u64,
    pub spawn: SpawnTable,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 150.0,
            ground_y: 130.0,
            player_x: 50.0,
            player_width: 20.0,
            player_height: 40.0,
            gravity: 0.6,
            jump_velocity: -10.0,
            start_speed: 6.0,
            speed_ramp: 0.001,
            max_speed: 13.0,
            points_per_tick: 1,
            spawn: SpawnTable::default(),
        }
    }
}

/// Card-matching tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    pub cols: usize,
    pub rows: usize,
    pub step_ms: f64,
    /// Ticks a mismatched pair stays face-up
    pub reveal_ticks: u32,
    pub match_points: u64,
    /// Per-move bonus left over on a win
    pub par_bonus: u64,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            cols: 4,
            rows: 4,
            step_ms: GRID_STEP_MS,
            reveal_ticks: 6,
            match_points: 100,
            par_bonus: 10,
        }
    }
}

/// Idle builder tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VillageSettings {
    pub step_ms: f64,
    pub starting_gold: u64,
    pub gather_gold: u64,
    pub target_population: u64,
}

impl Default for VillageSettings {
    fn default() -> Self {
        Self {
            step_ms: ECONOMY_STEP_MS,
            starting_gold: 50,
            gather_gold: 1,
            target_population: 100,
        }
    }
}

/// All engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub input: InputSettings,
    pub snake: SnakeSettings,
    pub runner: RunnerSettings,
    pub memory: MemorySettings,
    pub village: VillageSettings,
}

/// Largest memory board supported by the symbol set
pub const MAX_MEMORY_CARDS: usize = 24;

impl EngineSettings {
    /// Clamp values that would make a game unplayable or break an invariant
    pub fn sanitized(mut self) -> Self {
        self.input.swipe_threshold = self.input.swipe_threshold.max(1.0);

        let s = &mut self.snake;
        s.cols = s.cols.clamp(4, 200);
        s.rows = s.rows.clamp(4, 200);
        s.step_ms = s.step_ms.max(1.0);
        // Body must fit in a row with room for food
        s.start_length = s.start_length.clamp(1, (s.cols as usize) / 2);

        let r = &mut self.runner;
        r.width = r.width.max(100.0);
        r.height = r.height.max(50.0);
        r.player_width = r.player_width.clamp(1.0, r.width / 4.0);
        r.player_height = r.player_height.clamp(1.0, r.height / 2.0);
        r.ground_y = r.ground_y.clamp(r.player_height, r.height);
        r.player_x = r.player_x.clamp(0.0, r.width - r.player_width);
        r.gravity = r.gravity.max(0.01);
        r.start_speed = r.start_speed.max(0.0);
        r.speed_ramp = r.speed_ramp.max(0.0);
        r.max_speed = r.max_speed.max(r.start_speed);
        r.spawn.base_probability = r.spawn.base_probability.clamp(0.0, 1.0);
        r.spawn.max_probability = r.spawn.max_probability.clamp(0.0, 1.0);
        r.spawn.probability_override = r.spawn.probability_override.map(|p| p.clamp(0.0, 1.0));
        r.spawn.min_gap = r.spawn.min_gap.max(0.0);
        r.spawn.ramp_per_tick = r.spawn.ramp_per_tick.max(0.0);

        let m = &mut self.memory;
        m.cols = m.cols.clamp(2, 6);
        m.rows = m.rows.clamp(2, 6);
        if (m.cols * m.rows) % 2 == 1 || m.cols * m.rows > MAX_MEMORY_CARDS {
            log::warn!("Memory board {}x{} unsupported, using 4x4", m.cols, m.rows);
            m.cols = 4;
            m.rows = 4;
        }
        m.step_ms = m.step_ms.max(1.0);
        m.reveal_ticks = m.reveal_ticks.max(1);

        let v = &mut self.village;
        v.step_ms = v.step_ms.max(1.0);
        v.target_population = v.target_population.max(1);

        self
    }

    /// Load settings from the store, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Some(json) => match serde_json::from_str::<EngineSettings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded engine settings");
                    settings.sanitized()
                }
                Err(e) => {
                    log::warn!("Corrupt engine settings, using defaults: {}", e);
                    Self::default()
                }
            },
            None => {
                log::info!("Using default engine settings");
                Self::default()
            }
        }
    }

    /// Save settings to the store; failures are logged and otherwise ignored
    pub fn save(&self, store: &dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(SETTINGS_KEY, &json) {
                Ok(()) => log::info!("Engine settings saved"),
                Err(e) => log::warn!("Engine settings not saved: {}", e),
            },
            Err(e) => log::warn!("Engine settings not serializable: {}", e),
        }
    }
}
