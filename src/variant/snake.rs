//! Grid-chase: a growing snake eats food on a fixed grid
//!
//! One cell per 150 ms step. The head moves first; the tail is dropped unless
//! food was eaten, in one atomic move so the body is never observed one
//! segment too long or too short. Hitting a wall or any current segment
//! (including the tail) ends the run.

use std::collections::{HashSet, VecDeque};

use rand_pcg::Pcg32;
use serde::Serialize;

use super::{StepReport, Variant, VariantKind, fingerprint_of};
use crate::clock::TickRate;
use crate::collision::{CollisionEvent, any_fatal, detect_collisions, hits_body, out_of_bounds};
use crate::entity::{Bounds, Cell, Entity, Role, Shape, Sprite};
use crate::input::{Direction, InputBindings, Intent};
use crate::platform::Surface;
use crate::render::palette;
use crate::settings::SnakeSettings;
use crate::spawn::place_consumable;
use crate::state::Capability;

#[derive(Debug, Clone, Serialize)]
pub struct Snake {
    #[serde(skip)]
    settings: SnakeSettings,
    /// Head first
    body: VecDeque<Cell>,
    /// Direction committed at the last step
    heading: Direction,
    /// Turn to apply at the next step
    queued: Option<Direction>,
    /// `None` once the body fills the grid
    food: Option<Cell>,
}

impl Snake {
    pub fn new(settings: SnakeSettings) -> Self {
        let mut snake = Self {
            settings,
            body: VecDeque::new(),
            heading: Direction::Right,
            queued: None,
            food: None,
        };
        snake.lay_out();
        snake
    }

    /// Initial body in the middle of the grid, pointing right
    fn lay_out(&mut self) {
        let s = &self.settings;
        let head = Cell::new(s.cols / 2, s.rows / 2);
        self.body = (0..s.start_length as i32)
            .map(|i| Cell::new(head.col - i, head.row))
            .collect();
        self.heading = Direction::Right;
        self.queued = None;
        // Deterministic placeholder until the first reset draws a real one
        self.food = Some(Cell::new((s.cols * 3 / 4).min(s.cols - 1), s.rows / 2));
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::Grid {
            cols: self.settings.cols,
            rows: self.settings.rows,
        }
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn head(&self) -> Option<Cell> {
        self.body.front().copied()
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    /// Prepend the new head and drop the tail unless growing
    fn slither(&mut self, next: Cell, grow: bool) {
        self.body.push_front(next);
        if !grow {
            self.body.pop_back();
        }
    }

    fn food_entities(&self) -> Vec<Entity> {
        self.food
            .map(|cell| Entity::new(Role::Consumable, Shape::Cell(cell)).with_sprite(Sprite::Food))
            .into_iter()
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn with_world(
        settings: SnakeSettings,
        body: &[Cell],
        heading: Direction,
        food: Option<Cell>,
    ) -> Self {
        Self {
            settings,
            body: body.iter().copied().collect(),
            heading,
            queued: None,
            food,
        }
    }
}

impl Variant for Snake {
    fn kind(&self) -> VariantKind {
        VariantKind::Snake
    }

    fn capability(&self) -> Capability {
        Capability::Pausable
    }

    fn tick_rate(&self) -> TickRate {
        TickRate::Fixed {
            interval_ms: self.settings.step_ms,
        }
    }

    fn bindings(&self) -> InputBindings {
        InputBindings::standard().with_pause()
    }

    fn reset(&mut self, rng: &mut Pcg32) {
        self.lay_out();
        let occupied: Vec<Cell> = self.body.iter().copied().collect();
        self.food = place_consumable(rng, self.settings.cols, self.settings.rows, &occupied);
    }

    fn apply_intent(&mut self, intent: Intent, _rng: &mut Pcg32) -> Option<StepReport> {
        let Intent::Move(dir) = intent else {
            return None;
        };
        // Axis-locked: only orthogonal turns relative to the committed heading
        if dir.is_opposite(self.heading) {
            return None;
        }
        self.queued = Some(dir);
        Some(StepReport::default())
    }

    fn update(&mut self, rng: &mut Pcg32) -> StepReport {
        if let Some(dir) = self.queued.take() {
            self.heading = dir;
        }
        let Some(head) = self.head() else {
            return StepReport::lost();
        };
        let next = head.step(self.heading);

        let events = detect_collisions(&Shape::Cell(next), &self.food_entities(), &self.bounds());
        if any_fatal(&events) || hits_body(next, &self.body) {
            return StepReport::lost();
        }
        let eating = events
            .iter()
            .any(|e| matches!(e, CollisionEvent::Consumable { .. }));

        self.slither(next, eating);
        if !eating {
            return StepReport::default();
        }

        let points = self.settings.food_points;
        let occupied: Vec<Cell> = self.body.iter().copied().collect();
        self.food = place_consumable(rng, self.settings.cols, self.settings.rows, &occupied);
        match self.food {
            Some(_) => StepReport::points(points),
            // Nowhere left to put food: the body fills the grid
            None => StepReport::won(points),
        }
    }

    fn is_consistent(&self) -> bool {
        if self.body.is_empty() {
            return false;
        }
        let bounds = self.bounds();
        let mut seen = HashSet::with_capacity(self.body.len());
        for &segment in &self.body {
            if !seen.insert(segment) || out_of_bounds(&Shape::Cell(segment), &bounds) {
                return false;
            }
        }
        match self.food {
            Some(food) => !seen.contains(&food) && !out_of_bounds(&Shape::Cell(food), &bounds),
            None => self.body.len() == bounds.capacity(),
        }
    }

    fn render(&self, surface: &mut dyn Surface) {
        let cell_w = surface.width() / self.settings.cols as f32;
        let cell_h = surface.height() / self.settings.rows as f32;
        let inset = 1.0;

        if let Some(food) = self.food {
            surface.fill_circle(
                (food.col as f32 + 0.5) * cell_w,
                (food.row as f32 + 0.5) * cell_h,
                cell_w.min(cell_h) * 0.4,
                palette::DANGER,
            );
        }

        for (i, segment) in self.body.iter().enumerate() {
            let color = if i == 0 {
                palette::ACCENT_BRIGHT
            } else {
                palette::ACCENT
            };
            surface.fill_rect(
                segment.col as f32 * cell_w + inset,
                segment.row as f32 * cell_h + inset,
                cell_w - inset * 2.0,
                cell_h - inset * 2.0,
                color,
            );
        }
    }

    fn fingerprint(&self) -> String {
        fingerprint_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Outcome;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn small() -> SnakeSettings {
        SnakeSettings {
            cols: 10,
            rows: 10,
            ..SnakeSettings::default()
        }
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(12345)
    }

    #[test]
    fn test_reset_layout() {
        let mut snake = Snake::new(SnakeSettings::default());
        snake.reset(&mut rng());
        assert_eq!(snake.body().len(), 3);
        assert_eq!(snake.head(), Some(Cell::new(10, 10)));
        assert_eq!(snake.heading(), Direction::Right);
        assert!(snake.is_consistent());
    }

    #[test]
    fn test_reversal_rejected() {
        let mut snake = Snake::new(small());
        let mut r = rng();
        snake.reset(&mut r);
        let before = snake.fingerprint();
        assert!(snake.apply_intent(Intent::Move(Direction::Left), &mut r).is_none());
        assert_eq!(snake.fingerprint(), before);
        assert!(snake.apply_intent(Intent::Activate, &mut r).is_none());
        assert_eq!(snake.fingerprint(), before);
        assert!(snake.apply_intent(Intent::Move(Direction::Up), &mut r).is_some());
    }

    #[test]
    fn test_double_turn_cannot_reverse() {
        // Up then Left within one tick: Left is checked against the committed
        // heading (Right) and rejected, so the snake goes up
        let mut snake = Snake::new(small());
        let mut r = rng();
        snake.reset(&mut r);
        snake.apply_intent(Intent::Move(Direction::Up), &mut r);
        assert!(snake.apply_intent(Intent::Move(Direction::Left), &mut r).is_none());
        snake.update(&mut r);
        assert_eq!(snake.heading(), Direction::Up);
        assert_eq!(snake.head(), Some(Cell::new(5, 4)));
    }

    #[test]
    fn test_move_keeps_length() {
        let mut snake = Snake::with_world(
            small(),
            &[Cell::new(3, 3), Cell::new(2, 3), Cell::new(1, 3)],
            Direction::Right,
            Some(Cell::new(8, 8)),
        );
        let report = snake.update(&mut rng());
        assert_eq!(report, StepReport::default());
        assert_eq!(
            snake.body().iter().copied().collect::<Vec<_>>(),
            vec![Cell::new(4, 3), Cell::new(3, 3), Cell::new(2, 3)]
        );
    }

    #[test]
    fn test_eating_grows_by_one() {
        let mut snake = Snake::with_world(
            small(),
            &[Cell::new(3, 3), Cell::new(2, 3), Cell::new(1, 3)],
            Direction::Right,
            Some(Cell::new(4, 3)),
        );
        let report = snake.update(&mut rng());
        assert_eq!(report.points, 10);
        assert_eq!(report.outcome, Outcome::Continue);
        assert_eq!(snake.body().len(), 4);
        assert_eq!(snake.body().back(), Some(&Cell::new(1, 3)));
        let food = snake.food().expect("food replaced");
        assert!(!snake.body().contains(&food));
        assert!(snake.is_consistent());
    }

    #[test]
    fn test_wall_is_fatal() {
        let mut snake = Snake::with_world(
            small(),
            &[Cell::new(9, 0), Cell::new(8, 0)],
            Direction::Right,
            Some(Cell::new(0, 9)),
        );
        let before = snake.fingerprint();
        assert_eq!(snake.update(&mut rng()).outcome, Outcome::Lost);
        // Loss is decided before insertion
        assert_eq!(snake.fingerprint(), before);
    }

    #[test]
    fn test_self_collision_is_fatal() {
        // Hook shape; turning right runs into the fourth segment
        let mut snake = Snake::with_world(
            small(),
            &[
                Cell::new(5, 5),
                Cell::new(5, 6),
                Cell::new(6, 6),
                Cell::new(6, 5),
                Cell::new(6, 4),
            ],
            Direction::Up,
            Some(Cell::new(0, 0)),
        );
        let mut r = rng();
        assert!(snake.apply_intent(Intent::Move(Direction::Right), &mut r).is_some());
        assert_eq!(snake.update(&mut r).outcome, Outcome::Lost);
    }

    #[test]
    fn test_tail_cell_is_fatal() {
        // 2x2 loop: the head's next cell is the current tail
        let mut snake = Snake::with_world(
            small(),
            &[
                Cell::new(1, 1),
                Cell::new(2, 1),
                Cell::new(2, 2),
                Cell::new(1, 2),
            ],
            Direction::Left,
            Some(Cell::new(7, 7)),
        );
        let mut r = rng();
        assert!(snake.apply_intent(Intent::Move(Direction::Down), &mut r).is_some());
        assert_eq!(snake.update(&mut r).outcome, Outcome::Lost);
    }

    #[test]
    fn test_filling_the_grid_wins() {
        let settings = SnakeSettings {
            cols: 4,
            rows: 4,
            start_length: 2,
            ..SnakeSettings::default()
        };
        // Serpentine body covering 15 of 16 cells, head at (1,3) heading left
        let mut cells = Vec::new();
        for row in (0..4).rev() {
            let cols: Vec<i32> = if row % 2 == 1 { (0..4).collect() } else { (0..4).rev().collect() };
            for col in cols {
                cells.push(Cell::new(col, row));
            }
        }
        // cells[0] = (0,3); drop it so (0,3) is the food and (1,3) the head
        let food = cells.remove(0);
        let mut snake = Snake::with_world(settings, &cells, Direction::Left, Some(food));
        assert!(snake.is_consistent());

        let report = snake.update(&mut rng());
        assert_eq!(report.outcome, Outcome::Won);
        assert_eq!(snake.body().len(), 16);
        assert_eq!(snake.food(), None);
        assert!(snake.is_consistent());
    }

    fn dir_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn prop_body_unique_and_growth_bounded(
            seed in any::<u64>(),
            turns in proptest::collection::vec(proptest::option::of(dir_strategy()), 1..300),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut snake = Snake::new(small());
            snake.reset(&mut rng);
            let mut score = 0u64;

            for turn in turns {
                if let Some(dir) = turn {
                    snake.apply_intent(Intent::Move(dir), &mut rng);
                }
                let len_before = snake.body().len();
                let report = snake.update(&mut rng);
                if report.outcome == Outcome::Lost {
                    prop_assert_eq!(snake.body().len(), len_before);
                    break;
                }
                let len_after = snake.body().len();
                prop_assert!(len_after == len_before || len_after == len_before + 1);
                if len_after == len_before + 1 {
                    prop_assert_eq!(report.points, 10);
                } else {
                    prop_assert_eq!(report.points, 0);
                }
                score += report.points;
                prop_assert_eq!(score, 10 * (len_after as u64 - 3));
                prop_assert!(snake.is_consistent());
                if report.outcome == Outcome::Won {
                    break;
                }
            }
        }
    }
}
