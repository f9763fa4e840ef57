//! Endless runner: jump over obstacles scrolling in from the right
//!
//! Steps once per render opportunity. The player only moves vertically;
//! obstacles scroll left at a speed that ramps up over the run. One point per
//! tick survived.

use rand_pcg::Pcg32;
use serde::Serialize;

use super::{StepReport, Variant, VariantKind, fingerprint_of};
use crate::clock::TickRate;
use crate::collision::{any_fatal, detect_collisions, out_of_bounds};
use crate::entity::{Bounds, Entity, Rect, Shape, Sprite};
use crate::input::{Direction, Intent};
use crate::platform::Surface;
use crate::render::palette;
use crate::settings::RunnerSettings;
use crate::spawn::{cull_offscreen, spawn_obstacle};

#[derive(Debug, Clone, Serialize)]
pub struct Runner {
    #[serde(skip)]
    settings: RunnerSettings,
    player: Rect,
    /// Vertical velocity (px/tick, negative is up)
    velocity_y: f32,
    grounded: bool,
    jump_requested: bool,
    obstacles: Vec<Entity>,
    /// Scroll speed (px/tick)
    speed: f32,
    elapsed_ticks: u64,
}

impl Runner {
    pub fn new(settings: RunnerSettings) -> Self {
        let mut runner = Self {
            player: Rect::new(0.0, 0.0, 0.0, 0.0),
            velocity_y: 0.0,
            grounded: true,
            jump_requested: false,
            obstacles: Vec::new(),
            speed: settings.start_speed,
            elapsed_ticks: 0,
            settings,
        };
        runner.lay_out();
        runner
    }

    fn lay_out(&mut self) {
        let s = &self.settings;
        self.player = Rect::new(
            s.player_x,
            s.ground_y - s.player_height,
            s.player_width,
            s.player_height,
        );
        self.velocity_y = 0.0;
        self.grounded = true;
        self.jump_requested = false;
        self.obstacles.clear();
        self.speed = s.start_speed;
        self.elapsed_ticks = 0;
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::Area {
            width: self.settings.width,
            height: self.settings.height,
        }
    }

    pub fn player(&self) -> &Rect {
        &self.player
    }

    pub fn obstacles(&self) -> &[Entity] {
        &self.obstacles
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// Apply gravity and land on the ground line
    fn integrate_player(&mut self) {
        if self.jump_requested && self.grounded {
            self.velocity_y = self.settings.jump_velocity;
            self.grounded = false;
        }
        self.jump_requested = false;

        if self.grounded {
            return;
        }
        self.velocity_y += self.settings.gravity;
        self.player.pos.y += self.velocity_y;
        let floor = self.settings.ground_y - self.player.size.y;
        if self.player.pos.y >= floor {
            self.player.pos.y = floor;
            self.velocity_y = 0.0;
            self.grounded = true;
        }
    }

    #[cfg(test)]
    pub(crate) fn push_obstacle(&mut self, kind: crate::spawn::ObstacleKind, x: f32) {
        use crate::entity::Role;
        let (w, h) = kind.size();
        let rect = Rect::new(x, self.settings.ground_y - kind.lift() - h, w, h);
        self.obstacles
            .push(Entity::new(Role::Obstacle, Shape::Rect(rect)).with_sprite(kind.sprite()));
    }
}

impl Variant for Runner {
    fn kind(&self) -> VariantKind {
        VariantKind::Runner
    }

    fn tick_rate(&self) -> TickRate {
        TickRate::Display
    }

    fn reset(&mut self, _rng: &mut Pcg32) {
        self.lay_out();
    }

    fn apply_intent(&mut self, intent: Intent, _rng: &mut Pcg32) -> Option<StepReport> {
        match intent {
            Intent::Activate | Intent::Move(Direction::Up) | Intent::Select { .. } => {
                // No double jumps
                if !self.grounded || self.jump_requested {
                    return None;
                }
                self.jump_requested = true;
                Some(StepReport::default())
            }
            _ => None,
        }
    }

    fn update(&mut self, rng: &mut Pcg32) -> StepReport {
        self.integrate_player();
        for obstacle in &mut self.obstacles {
            if let Shape::Rect(rect) = &mut obstacle.shape {
                rect.pos.x -= self.speed;
            }
        }

        let events = detect_collisions(&Shape::Rect(self.player), &self.obstacles, &self.bounds());
        if any_fatal(&events) {
            return StepReport::lost();
        }

        cull_offscreen(&mut self.obstacles);
        if let Some((_, obstacle)) = spawn_obstacle(
            rng,
            &self.settings.spawn,
            self.elapsed_ticks,
            self.settings.width,
            self.settings.ground_y,
            &self.obstacles,
            &self.player,
        ) {
            self.obstacles.push(obstacle);
        }

        self.elapsed_ticks += 1;
        self.speed = (self.settings.start_speed + self.settings.speed_ramp * self.elapsed_ticks as f32)
            .min(self.settings.max_speed);

        StepReport::points(self.settings.points_per_tick)
    }

    fn is_consistent(&self) -> bool {
        let floor = self.settings.ground_y - self.player.size.y;
        !out_of_bounds(&Shape::Rect(self.player), &self.bounds())
            && self.player.pos.y <= floor + f32::EPSILON
            && (!self.grounded || self.velocity_y == 0.0)
    }

    fn render(&self, surface: &mut dyn Surface) {
        // Scale the logical field onto the surface
        let sx = surface.width() / self.settings.width;
        let sy = surface.height() / self.settings.height;
        let map = |r: &Rect| (r.pos.x * sx, r.pos.y * sy, r.size.x * sx, r.size.y * sy);

        surface.fill_rect(0.0, self.settings.ground_y * sy, surface.width(), 1.0, palette::MUTED);

        let (x, y, w, h) = map(&self.player);
        surface.fill_rect(x, y, w, h, palette::FOREGROUND);

        for obstacle in &self.obstacles {
            let color = match obstacle.sprite {
                Sprite::Bird => palette::MUTED,
                _ => palette::ACCENT,
            };
            let (x, y, w, h) = map(&obstacle.shape.as_rect());
            surface.fill_rect(x, y, w, h, color);
        }
    }

    fn fingerprint(&self) -> String {
        fingerprint_of(self)
    }
}
