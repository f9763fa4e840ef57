//! Positional model shared by every game
//!
//! Grid games place entities on discrete cells; continuous games use
//! axis-aligned rectangles in surface pixels. Entities carry no identity beyond
//! their slot in the owning world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::input::Direction;

/// A discrete grid cell (signed so a step off the edge is representable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The neighbouring cell one step in `dir`
    pub fn step(self, dir: Direction) -> Self {
        let (dc, dr) = dir.delta();
        Self::new(self.col + dc, self.row + dr)
    }
}

/// An axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Unit rectangle covering a grid cell
    pub fn from_cell(cell: Cell) -> Self {
        Self::new(cell.col as f32, cell.row as f32, 1.0, 1.0)
    }
}

/// Bounding shape of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Cell(Cell),
    Rect(Rect),
}

impl Shape {
    /// Continuous view of the shape (cells become unit squares)
    pub fn as_rect(&self) -> Rect {
        match *self {
            Shape::Cell(cell) => Rect::from_cell(cell),
            Shape::Rect(rect) => rect,
        }
    }
}

/// What an entity means to the collision rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Consumable,
    Obstacle,
    Decoration,
}

/// Visual flavour, only read by renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sprite {
    #[default]
    Plain,
    Food,
    SmallCactus,
    LargeCactus,
    CactusCluster,
    Bird,
}

/// A positioned object in a world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub role: Role,
    pub shape: Shape,
    #[serde(default)]
    pub sprite: Sprite,
}

impl Entity {
    pub fn new(role: Role, shape: Shape) -> Self {
        Self {
            role,
            shape,
            sprite: Sprite::Plain,
        }
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = sprite;
        self
    }
}

/// The legal play area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bounds {
    /// `cols` x `rows` cells, valid cells are `0..cols` by `0..rows`
    Grid { cols: i32, rows: i32 },
    /// `width` x `height` pixels anchored at the origin
    Area { width: f32, height: f32 },
}

impl Bounds {
    /// Number of cells on a grid field (0 for continuous fields)
    pub fn capacity(&self) -> usize {
        match *self {
            Bounds::Grid { cols, rows } => (cols.max(0) as usize) * (rows.max(0) as usize),
            Bounds::Area { .. } => 0,
        }
    }

    /// Continuous extent of the field
    pub fn extent(&self) -> Vec2 {
        match *self {
            Bounds::Grid { cols, rows } => Vec2::new(cols as f32, rows as f32),
            Bounds::Area { width, height } => Vec2::new(width, height),
        }
    }
}
