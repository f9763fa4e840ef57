//! Procedural content: food placement and obstacle spawning
//!
//! Food is rejection-sampled onto free grid cells. Obstacles spawn at the
//! leading edge of a scrolling field with a probability that ramps up with
//! elapsed play time, and are culled once fully scrolled past.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::collision::aabb_overlap;
use crate::entity::{Bounds, Cell, Entity, Rect, Role, Shape, Sprite};

/// Draw uniformly random cells until one is not occupied.
///
/// Returns `None` only when every cell is occupied; otherwise sampling
/// terminates with probability 1 and the result is always free.
pub fn place_consumable<R: Rng + ?Sized>(
    rng: &mut R,
    cols: i32,
    rows: i32,
    occupied: &[Cell],
) -> Option<Cell> {
    if cols <= 0 || rows <= 0 {
        return None;
    }
    let taken: HashSet<Cell> = occupied
        .iter()
        .copied()
        .filter(|c| c.col >= 0 && c.row >= 0 && c.col < cols && c.row < rows)
        .collect();
    let capacity = Bounds::Grid { cols, rows }.capacity();
    if taken.len() >= capacity {
        return None;
    }

    loop {
        let candidate = Cell::new(rng.random_range(0..cols), rng.random_range(0..rows));
        if !taken.contains(&candidate) {
            return Some(candidate);
        }
    }
}

/// The fixed catalog of runner obstacles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    SmallCactus,
    LargeCactus,
    CactusCluster,
    /// Bird at head height of a standing player (must jump)
    LowBird,
    /// Bird above a standing player (harmless unless jumping into it)
    HighBird,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::SmallCactus,
        ObstacleKind::LargeCactus,
        ObstacleKind::CactusCluster,
        ObstacleKind::LowBird,
        ObstacleKind::HighBird,
    ];

    /// (width, height) in pixels
    pub fn size(&self) -> (f32, f32) {
        match self {
            ObstacleKind::SmallCactus => (17.0, 35.0),
            ObstacleKind::LargeCactus => (25.0, 50.0),
            ObstacleKind::CactusCluster => (50.0, 35.0),
            ObstacleKind::LowBird | ObstacleKind::HighBird => (46.0, 30.0),
        }
    }

    /// Gap between the obstacle's bottom and the ground line
    pub fn lift(&self) -> f32 {
        match self {
            ObstacleKind::LowBird => 12.0,
            ObstacleKind::HighBird => 45.0,
            _ => 0.0,
        }
    }

    /// Birds only show up once the run is underway
    pub fn min_ticks(&self) -> u64 {
        match self {
            ObstacleKind::LowBird | ObstacleKind::HighBird => 600,
            _ => 0,
        }
    }

    pub fn sprite(&self) -> Sprite {
        match self {
            ObstacleKind::SmallCactus => Sprite::SmallCactus,
            ObstacleKind::LargeCactus => Sprite::LargeCactus,
            ObstacleKind::CactusCluster => Sprite::CactusCluster,
            ObstacleKind::LowBird | ObstacleKind::HighBird => Sprite::Bird,
        }
    }
}

/// Difficulty ramp for obstacle spawning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTable {
    /// Per-tick probability at the start of a run
    pub base_probability: f32,
    /// Added per elapsed tick
    pub ramp_per_tick: f32,
    /// Ceiling for the ramp
    pub max_probability: f32,
    /// Fixed probability, ignoring the ramp (0 disables spawning)
    pub probability_override: Option<f32>,
    /// Minimum horizontal distance from the previous obstacle (px)
    pub min_gap: f32,
}

impl Default for SpawnTable {
    fn default() -> Self {
        Self {
            base_probability: 0.01,
            ramp_per_tick: 0.000_01,
            max_probability: 0.05,
            probability_override: None,
            min_gap: 220.0,
        }
    }
}

impl SpawnTable {
    /// Spawn chance for this tick; non-decreasing in `elapsed_ticks`
    pub fn probability(&self, elapsed_ticks: u64) -> f32 {
        if let Some(p) = self.probability_override {
            return p.clamp(0.0, 1.0);
        }
        let ramped = self.base_probability + self.ramp_per_tick * elapsed_ticks as f32;
        ramped.clamp(0.0, self.max_probability.clamp(0.0, 1.0))
    }
}

/// Maybe spawn one obstacle at the right edge of the field.
///
/// `ground_y` is the ground line; `existing` are the live obstacles and
/// `player` the player's box, which a new obstacle must never overlap.
pub fn spawn_obstacle<R: Rng + ?Sized>(
    rng: &mut R,
    table: &SpawnTable,
    elapsed_ticks: u64,
    field_width: f32,
    ground_y: f32,
    existing: &[Entity],
    player: &Rect,
) -> Option<(ObstacleKind, Entity)> {
    let p = table.probability(elapsed_ticks);
    if p <= 0.0 || rng.random::<f32>() >= p {
        return None;
    }

    let spaced = existing
        .iter()
        .all(|o| field_width - o.shape.as_rect().right() >= table.min_gap);
    if !spaced {
        return None;
    }

    let eligible: Vec<ObstacleKind> = ObstacleKind::ALL
        .into_iter()
        .filter(|k| elapsed_ticks >= k.min_ticks())
        .collect();
    let kind = eligible[rng.random_range(0..eligible.len())];

    let (w, h) = kind.size();
    let rect = Rect::new(field_width, ground_y - kind.lift() - h, w, h);
    if aabb_overlap(&rect, player) {
        return None;
    }

    log::debug!("Spawned {:?} at tick {}", kind, elapsed_ticks);
    let entity = Entity::new(Role::Obstacle, Shape::Rect(rect)).with_sprite(kind.sprite());
    Some((kind, entity))
}

/// Drop obstacles that have scrolled fully past the left edge
pub fn cull_offscreen(obstacles: &mut Vec<Entity>) {
    obstacles.retain(|o| o.shape.as_rect().right() > 0.0);
}
