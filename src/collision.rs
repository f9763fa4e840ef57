//! Collision detection for grid cells and axis-aligned rectangles
//!
//! Evaluated once per logical tick, before the world is reconciled (food
//! consumed, obstacles culled). Leaving the field is reported exactly like a
//! fatal obstacle hit; nothing is clamped here.

use serde::{Deserialize, Serialize};

use crate::entity::{Bounds, Cell, Entity, Rect, Role, Shape};

/// Something the player touched this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionEvent {
    /// Player left the play field
    OutOfBounds,
    /// Prospective head landed on the player's own body
    SelfOverlap,
    /// Player overlaps the obstacle at this slot
    Obstacle { index: usize },
    /// Player overlaps the consumable at this slot
    Consumable { index: usize },
}

impl CollisionEvent {
    /// Whether this event ends the run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CollisionEvent::OutOfBounds
                | CollisionEvent::SelfOverlap
                | CollisionEvent::Obstacle { .. }
        )
    }
}

/// Strict AABB overlap; rectangles that only share an edge do not overlap
#[inline]
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Whether two shapes occupy common space
pub fn shapes_overlap(a: &Shape, b: &Shape) -> bool {
    match (a, b) {
        (Shape::Cell(a), Shape::Cell(b)) => a == b,
        _ => aabb_overlap(&a.as_rect(), &b.as_rect()),
    }
}

/// Whether a shape extends past the field. Touching an edge is inside.
pub fn out_of_bounds(shape: &Shape, bounds: &Bounds) -> bool {
    match (shape, bounds) {
        (Shape::Cell(cell), Bounds::Grid { cols, rows }) => {
            cell.col < 0 || cell.row < 0 || cell.col >= *cols || cell.row >= *rows
        }
        _ => {
            let rect = shape.as_rect();
            let extent = bounds.extent();
            rect.left() < 0.0
                || rect.top() < 0.0
                || rect.right() > extent.x
                || rect.bottom() > extent.y
        }
    }
}

/// Whether a prospective head cell lands on any existing body segment
pub fn hits_body<'a>(head: Cell, body: impl IntoIterator<Item = &'a Cell>) -> bool {
    body.into_iter().any(|&segment| segment == head)
}

/// All collisions between the player shape and the world's entities.
///
/// Boundary first, then entities in slot order. Player and decoration
/// entities never collide.
pub fn detect_collisions(player: &Shape, entities: &[Entity], bounds: &Bounds) -> Vec<CollisionEvent> {
    let mut events = Vec::new();

    if out_of_bounds(player, bounds) {
        events.push(CollisionEvent::OutOfBounds);
    }

    for (index, entity) in entities.iter().enumerate() {
        if !shapes_overlap(player, &entity.shape) {
            continue;
        }
        match entity.role {
            Role::Obstacle => events.push(CollisionEvent::Obstacle { index }),
            Role::Consumable => events.push(CollisionEvent::Consumable { index }),
            Role::Player | Role::Decoration => {}
        }
    }

    events
}

/// Convenience: does any event end the run
pub fn any_fatal(events: &[CollisionEvent]) -> bool {
    events.iter().any(CollisionEvent::is_fatal)
}
