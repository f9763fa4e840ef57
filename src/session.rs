//! One hosted game: the shared engine around a game's world
//!
//! Per render opportunity the host calls [`GameSession::frame`]. The
//! scheduler decides whether a logical step runs; a render always follows.
//!
//! A logical step advances the world one tick, adds earned points, fires
//! loss/win transitions and then verifies the world's invariants. A broken
//! world ends the run.
//!
//! Intents are judged the moment they arrive. Start and pause go through the
//! state machine; gameplay intents (move, jump, flip, buy) go to the world,
//! which either takes them or leaves itself untouched. Games that act once
//! per tick keep only their latest accepted intent until the next step.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::clock::Scheduler;
use crate::error::EngineError;
use crate::input::{InputMapper, Intent, RawInput};
use crate::platform::Surface;
use crate::registry::SessionHandle;
use crate::render::{HudInfo, draw_hud, draw_overlay, palette};
use crate::score::ScoreBook;
use crate::settings::EngineSettings;
use crate::state::{Capability, Effect, Event, GameState, transition};
use crate::variant::{Outcome, StepReport, Variant, VariantKind};

/// What the host asks for when creating a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub kind: VariantKind,
    /// Fixed RNG seed for reproducible runs; drawn at random when `None`
    pub seed: Option<u64>,
    pub settings: EngineSettings,
}

impl SessionConfig {
    pub fn new(kind: VariantKind) -> Self {
        Self {
            kind,
            seed: None,
            settings: EngineSettings::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Read-only view of a session for host HUDs and tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub variant: String,
    pub state: GameState,
    pub score: u64,
    pub high_score: u64,
    /// Logical steps since the current run started
    pub ticks: u64,
    pub new_high_score: bool,
}

pub struct GameSession {
    handle: SessionHandle,
    kind: VariantKind,
    capability: Capability,
    state: GameState,
    scheduler: Scheduler,
    variant: Box<dyn Variant>,
    mapper: InputMapper,
    rng: Pcg32,
    score: u64,
    high_score: u64,
    new_high_score: bool,
    scores: ScoreBook,
    surface: Box<dyn Surface>,
    /// Set by `stop`/`destroy`; no further steps are issued
    halted: bool,
    destroyed: bool,
}

impl GameSession {
    /// Create a session in the menu state.
    ///
    /// Fails when the host has no drawing surface for it or the surface has
    /// no drawable area.
    pub fn new(
        handle: SessionHandle,
        config: SessionConfig,
        surface: Option<Box<dyn Surface>>,
        scores: ScoreBook,
    ) -> Result<Self, EngineError> {
        let surface = surface.ok_or_else(|| EngineError::SurfaceMissing {
            session: handle.to_string(),
        })?;
        let (w, h) = (surface.width(), surface.height());
        if !(w.is_finite() && h.is_finite() && w >= 1.0 && h >= 1.0) {
            return Err(EngineError::SurfaceTooSmall {
                width: w.max(0.0) as u32,
                height: h.max(0.0) as u32,
            });
        }

        let settings = config.settings.sanitized();
        let variant = config.kind.build(&settings, (w, h));
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self::with_variant(
            handle,
            variant,
            surface,
            scores,
            seed,
            settings.input.swipe_threshold,
        ))
    }

    pub(crate) fn with_variant(
        handle: SessionHandle,
        variant: Box<dyn Variant>,
        surface: Box<dyn Surface>,
        scores: ScoreBook,
        seed: u64,
        swipe_threshold: f32,
    ) -> Self {
        let kind = variant.kind();
        let high_score = scores.high_score(kind);
        log::info!(
            "Created {} session {} ({}x{}, seed {})",
            kind.id(),
            handle,
            surface.width(),
            surface.height(),
            seed
        );
        Self {
            handle,
            kind,
            capability: variant.capability(),
            state: GameState::Menu,
            scheduler: Scheduler::new(variant.tick_rate()),
            mapper: InputMapper::new(variant.bindings()).with_swipe_threshold(swipe_threshold),
            variant,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            high_score,
            new_high_score: false,
            scores,
            surface,
            halted: false,
            destroyed: false,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn ticks(&self) -> u64 {
        self.scheduler.ticks()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn variant(&self) -> &dyn Variant {
        self.variant.as_ref()
    }

    /// Serialized world, for detecting changes
    pub fn fingerprint(&self) -> String {
        self.variant.fingerprint()
    }

    pub fn input_mapper_mut(&mut self) -> &mut InputMapper {
        &mut self.mapper
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            variant: self.kind.id().to_string(),
            state: self.state,
            score: self.score,
            high_score: self.high_score,
            ticks: self.scheduler.ticks(),
            new_high_score: self.new_high_score,
        }
    }

    /// Feed a raw device event. Returns whether it produced an accepted
    /// intent.
    pub fn handle_input(&mut self, raw: &RawInput) -> bool {
        if self.halted {
            return false;
        }
        match self.mapper.map(raw, self.state) {
            Some(intent) => self.apply_intent(intent),
            None => false,
        }
    }

    /// Submit an intent. Returns whether it was accepted; intents that do not
    /// fit the current state are dropped without effect.
    pub fn apply_intent(&mut self, intent: Intent) -> bool {
        if self.halted {
            return false;
        }
        match intent {
            Intent::Start => self.start(),
            Intent::TogglePause => match self.state {
                GameState::Playing => self.pause(),
                GameState::Paused => self.resume(),
                _ => false,
            },
            _ if self.state != GameState::Playing => false,
            _ => {
                let Some(report) = self.variant.apply_intent(intent, &mut self.rng) else {
                    log::trace!("{} session {} rejected {:?}", self.kind.id(), self.handle, intent);
                    return false;
                };
                self.absorb(report);
                self.check_world();
                true
            }
        }
    }

    /// The host lost focus or went hidden. Held keys and pointers are
    /// forgotten and a pausable game in play is paused.
    pub fn focus_lost(&mut self) {
        self.mapper.release_all();
        if self.capability == Capability::Pausable && self.state == GameState::Playing {
            self.pause();
        }
    }

    /// Start from the menu, or restart after the run ended
    pub fn start(&mut self) -> bool {
        let event = if self.state.is_terminal() {
            Event::Restart
        } else {
            Event::Start
        };
        self.fire(event)
    }

    pub fn pause(&mut self) -> bool {
        self.fire(Event::Pause)
    }

    pub fn resume(&mut self) -> bool {
        self.fire(Event::Resume)
    }

    /// Halt ticking for good. The last frame stays on screen.
    pub fn stop(&mut self) {
        if self.halted {
            return;
        }
        self.halted = true;
        self.scheduler.stop();
        log::info!("Stopped {} session {}", self.kind.id(), self.handle);
    }

    /// Stop and release the session; safe to call repeatedly, including from
    /// inside a host callback
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.stop();
        self.destroyed = true;
        self.mapper.release_all();
        log::info!("Destroyed {} session {}", self.kind.id(), self.handle);
    }

    /// One render opportunity
    pub fn frame(&mut self, elapsed_ms: f64) {
        if self.destroyed {
            return;
        }
        let outcome = self.scheduler.on_frame(elapsed_ms);
        if outcome.step && !self.halted {
            self.step();
        }
        if outcome.render {
            self.render();
        }
    }

    /// Run one logical step
    fn step(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        let report = self.variant.update(&mut self.rng);
        self.absorb(report);
        self.check_world();
    }

    /// End the run if the world no longer holds together
    fn check_world(&mut self) {
        if self.state == GameState::Playing && !self.variant.is_consistent() {
            log::warn!(
                "{} session {} world invariant broken, ending run",
                self.kind.id(),
                self.handle
            );
            self.fire(Event::Lose);
        }
    }

    fn absorb(&mut self, report: StepReport) {
        if self.state != GameState::Playing {
            return;
        }
        self.score = self.score.saturating_add(report.points);
        match report.outcome {
            Outcome::Continue => {}
            Outcome::Lost => {
                self.fire(Event::Lose);
            }
            Outcome::Won => {
                self.fire(Event::Win);
            }
        }
    }

    /// Run a state machine event and its side effect
    fn fire(&mut self, event: Event) -> bool {
        if self.halted {
            return false;
        }
        let Some(t) = transition(self.state, event, self.capability) else {
            return false;
        };
        let from = self.state;
        self.state = t.to;
        match t.effect {
            Effect::ResetWorld => {
                self.variant.reset(&mut self.rng);
                self.score = 0;
                self.new_high_score = false;
                self.scheduler.start();
            }
            Effect::FreezeClock => self.scheduler.pause(),
            Effect::ResumeClock => self.scheduler.resume(),
            Effect::Finish => {
                self.scheduler.stop();
                let record = self.scores.record_score(self.kind, self.score);
                self.high_score = record.stored_high_score;
                self.new_high_score = record.is_new_high_score;
            }
        }
        log::info!(
            "{} session {}: {} -> {}",
            self.kind.id(),
            self.handle,
            from.as_str(),
            self.state.as_str()
        );
        true
    }

    /// Paint the world, HUD and any overlay
    pub fn render(&mut self) {
        if self.destroyed {
            return;
        }
        let surface = self.surface.as_mut();
        surface.clear(palette::BACKGROUND);
        self.variant.render(surface);

        let info = HudInfo {
            title: self.kind.title(),
            state: self.state,
            score: self.score,
            high_score: self.high_score.max(self.score),
            new_high_score: self.new_high_score,
            pausable: self.capability == Capability::Pausable,
        };
        if self.state != GameState::Menu {
            draw_hud(surface, &info);
        }
        draw_overlay(surface, &info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TickRate;
    use crate::input::Direction;
    use crate::platform::{KeyValueStore, MemoryStore, RecordingNotifier, RecordingSurface, TextAlign};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Surface the test can inspect after handing it to the session
    struct SharedSurface(Rc<RefCell<RecordingSurface>>);

    impl Surface for SharedSurface {
        fn width(&self) -> f32 {
            self.0.borrow().width()
        }
        fn height(&self) -> f32 {
            self.0.borrow().height()
        }
        fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
            self.0.borrow_mut().fill_rect(x, y, w, h, color);
        }
        fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str) {
            self.0.borrow_mut().fill_circle(x, y, radius, color);
        }
        fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: &str, align: TextAlign) {
            self.0.borrow_mut().fill_text(text, x, y, size, color, align);
        }
        fn clear(&mut self, color: &str) {
            self.0.borrow_mut().clear(color);
        }
    }

    struct Host {
        store: Rc<MemoryStore>,
        notifier: Rc<RecordingNotifier>,
        scores: ScoreBook,
    }

    fn host() -> Host {
        let store = Rc::new(MemoryStore::new());
        let notifier = Rc::new(RecordingNotifier::default());
        let scores = ScoreBook::new(store.clone(), notifier.clone());
        Host {
            store,
            notifier,
            scores,
        }
    }

    fn session(host: &Host, config: SessionConfig) -> GameSession {
        let surface: Box<dyn Surface> = Box::new(RecordingSurface::new(400.0, 300.0));
        GameSession::new(SessionHandle(1), config.with_seed(42), Some(surface), host.scores.clone()).unwrap()
    }

    fn village_to(target_population: u64) -> SessionConfig {
        let mut settings = EngineSettings::default();
        settings.village.target_population = target_population;
        SessionConfig::new(VariantKind::Village).with_settings(settings)
    }

    #[test]
    fn test_missing_surface_is_creation_failure() {
        let h = host();
        let err = GameSession::new(SessionHandle(7), SessionConfig::new(VariantKind::Snake), None, h.scores.clone())
            .err();
        assert_eq!(
            err,
            Some(EngineError::SurfaceMissing {
                session: "session-7".to_string()
            })
        );
    }

    #[test]
    fn test_empty_surface_is_creation_failure() {
        let h = host();
        let surface: Box<dyn Surface> = Box::new(RecordingSurface::new(0.0, 300.0));
        let err = GameSession::new(SessionHandle(1), SessionConfig::new(VariantKind::Memory), Some(surface), h.scores)
            .err();
        assert_eq!(
            err,
            Some(EngineError::SurfaceTooSmall {
                width: 0,
                height: 300
            })
        );
    }

    #[test]
    fn test_starts_in_menu_and_idles() {
        let h = host();
        let mut s = session(&h, SessionConfig::new(VariantKind::Snake));
        assert_eq!(s.state(), GameState::Menu);
        for _ in 0..20 {
            s.frame(200.0);
        }
        assert_eq!(s.ticks(), 0);

        assert!(s.apply_intent(Intent::Start));
        assert_eq!(s.state(), GameState::Playing);
        // Only one start per menu
        assert!(!s.apply_intent(Intent::Start));
    }

    #[test]
    fn test_runner_survives_without_obstacles() {
        let h = host();
        let mut settings = EngineSettings::default();
        settings.runner.spawn.probability_override = Some(0.0);
        let mut s = session(&h, SessionConfig::new(VariantKind::Runner).with_settings(settings));
        s.start();
        for _ in 0..1000 {
            s.frame(16.7);
        }
        assert_eq!(s.state(), GameState::Playing);
        assert_eq!(s.ticks(), 1000);
        assert_eq!(s.score(), 1000);
    }

    #[test]
    fn test_fixed_rate_steps_at_most_once_per_frame() {
        let h = host();
        let mut s = session(&h, SessionConfig::new(VariantKind::Snake));
        assert_eq!(s.variant().tick_rate(), TickRate::Fixed { interval_ms: 150.0 });
        s.start();
        s.frame(100.0);
        assert_eq!(s.ticks(), 0);
        s.frame(60.0);
        assert_eq!(s.ticks(), 1);
        // A long stall still yields a single step
        s.frame(5_000.0);
        assert_eq!(s.ticks(), 2);
    }

    #[test]
    fn test_pause_only_where_supported() {
        let h = host();
        let mut snake = session(&h, SessionConfig::new(VariantKind::Snake));
        snake.start();
        snake.frame(150.0);
        let before = snake.fingerprint();
        assert!(snake.apply_intent(Intent::TogglePause));
        assert_eq!(snake.state(), GameState::Paused);
        for _ in 0..10 {
            snake.frame(150.0);
        }
        assert_eq!(snake.ticks(), 1);
        assert_eq!(snake.fingerprint(), before);
        // Gameplay intents are ignored while paused
        assert!(!snake.apply_intent(Intent::Move(Direction::Up)));
        assert!(snake.apply_intent(Intent::TogglePause));
        assert_eq!(snake.state(), GameState::Playing);
        snake.frame(150.0);
        assert_eq!(snake.ticks(), 2);

        let mut memory = session(&h, SessionConfig::new(VariantKind::Memory));
        memory.start();
        assert!(!memory.apply_intent(Intent::TogglePause));
        assert!(!memory.pause());
        assert_eq!(memory.state(), GameState::Playing);
    }

    #[test]
    fn test_snake_hits_wall() {
        let h = host();
        let mut s = session(&h, SessionConfig::new(VariantKind::Snake));
        s.start();
        // Heading right from the centre of a 20-wide grid
        for _ in 0..25 {
            s.frame(150.0);
        }
        assert_eq!(s.state(), GameState::GameOver);
        let ticks = s.ticks();
        s.frame(150.0);
        assert_eq!(s.ticks(), ticks);
        assert!(s.high_score() >= s.score());
    }

    #[test]
    fn test_win_records_high_score_once() {
        let h = host();
        let mut s = session(&h, village_to(4));
        s.start();
        for _ in 0..3 {
            assert!(s.apply_intent(Intent::Activate));
        }
        assert!(s.apply_intent(Intent::Choose(0)));
        s.frame(1000.0);

        assert_eq!(s.state(), GameState::Won);
        assert_eq!(s.score(), 3);
        let snap = s.snapshot();
        assert!(snap.new_high_score);
        assert_eq!(snap.high_score, 3);
        assert_eq!(h.store.get("village_high_score"), Some("3".to_string()));
        assert_eq!(h.notifier.count(), 1);

        // Same score again: no update, no toast
        s.start();
        assert_eq!(s.score(), 0);
        for _ in 0..3 {
            s.apply_intent(Intent::Activate);
        }
        s.apply_intent(Intent::Choose(0));
        s.frame(1000.0);
        assert_eq!(s.state(), GameState::Won);
        assert!(!s.snapshot().new_high_score);
        assert_eq!(s.high_score(), 3);
        assert_eq!(h.notifier.count(), 1);
    }

    #[test]
    fn test_failed_write_keeps_high_score_in_memory() {
        let h = host();
        h.store.set_fail_writes(true);
        let mut s = session(&h, village_to(4));
        s.start();
        s.apply_intent(Intent::Activate);
        s.apply_intent(Intent::Choose(0));
        s.frame(1000.0);
        assert_eq!(s.state(), GameState::Won);
        assert_eq!(s.high_score(), 1);
        assert!(h.store.is_empty());
        assert_eq!(h.scores.high_score(VariantKind::Village), 1);
    }

    fn key(s: &mut GameSession, name: &str) -> bool {
        let down = s.handle_input(&RawInput::KeyDown(name.to_string()));
        s.handle_input(&RawInput::KeyUp(name.to_string()));
        down
    }

    fn snake_head(s: &GameSession) -> (i64, i64) {
        let world: serde_json::Value = serde_json::from_str(&s.fingerprint()).unwrap();
        let head = &world["body"][0];
        (head["col"].as_i64().unwrap(), head["row"].as_i64().unwrap())
    }

    #[test]
    fn test_every_press_counts_between_steps() {
        let h = host();
        let mut s = session(&h, SessionConfig::new(VariantKind::Village));
        s.start();
        for _ in 0..12 {
            assert!(key(&mut s, " "));
        }
        assert_eq!(s.score(), 12);
        s.frame(1000.0);
        assert_eq!(s.ticks(), 1);
        assert_eq!(s.score(), 12);
    }

    #[test]
    fn test_rejected_intents_do_not_crowd_out_a_turn() {
        let h = host();
        let mut s = session(&h, SessionConfig::new(VariantKind::Snake));
        s.start();
        assert_eq!(snake_head(&s), (10, 10));
        for _ in 0..8 {
            assert!(!s.apply_intent(Intent::Activate));
        }
        assert!(s.apply_intent(Intent::Move(Direction::Up)));
        s.frame(150.0);
        assert_eq!(snake_head(&s), (10, 9));
    }

    #[test]
    fn test_reversal_leaves_snake_untouched() {
        let h = host();
        let mut a = session(&h, SessionConfig::new(VariantKind::Snake));
        let mut b = session(&h, SessionConfig::new(VariantKind::Snake));
        a.start();
        b.start();
        let before = a.fingerprint();
        assert!(!a.apply_intent(Intent::Move(Direction::Left)));
        assert_eq!(a.fingerprint(), before);
        a.frame(150.0);
        b.frame(150.0);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_unaffordable_purchase_leaves_village_untouched() {
        let h = host();
        let mut a = session(&h, SessionConfig::new(VariantKind::Village));
        let mut b = session(&h, SessionConfig::new(VariantKind::Village));
        a.start();
        b.start();
        let before = a.fingerprint();
        // Market costs more than the starting purse
        assert!(!a.apply_intent(Intent::Choose(3)));
        assert_eq!(a.fingerprint(), before);
        a.frame(1000.0);
        b.frame(1000.0);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.snapshot(), b.snapshot());
    }

    fn cursor_to(s: &mut GameSession, from: usize, to: usize, cols: usize) {
        let (fc, fr) = (from % cols, from / cols);
        let (tc, tr) = (to % cols, to / cols);
        let horizontal = if tc > fc { Direction::Right } else { Direction::Left };
        let vertical = if tr > fr { Direction::Down } else { Direction::Up };
        for _ in 0..fc.abs_diff(tc) {
            assert!(s.apply_intent(Intent::Move(horizontal)));
        }
        for _ in 0..fr.abs_diff(tr) {
            assert!(s.apply_intent(Intent::Move(vertical)));
        }
    }

    #[test]
    fn test_flipping_matched_card_leaves_memory_untouched() {
        let h = host();
        let mut a = session(&h, SessionConfig::new(VariantKind::Memory));
        let mut b = session(&h, SessionConfig::new(VariantKind::Memory));
        a.start();
        b.start();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let world: serde_json::Value = serde_json::from_str(&a.fingerprint()).unwrap();
        let symbols: Vec<u64> = world["cards"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["symbol"].as_u64().unwrap())
            .collect();
        let first = 0;
        let second = (1..symbols.len()).find(|&i| symbols[i] == symbols[first]).unwrap();
        let cols = EngineSettings::default().memory.cols;

        for s in [&mut a, &mut b] {
            assert!(s.apply_intent(Intent::Activate));
            cursor_to(s, first, second, cols);
            assert!(s.apply_intent(Intent::Activate));
            cursor_to(s, second, first, cols);
        }
        assert_eq!(a.score(), 100);

        let before = a.fingerprint();
        assert!(!a.apply_intent(Intent::Activate));
        assert_eq!(a.fingerprint(), before);
        a.frame(1000.0);
        b.frame(1000.0);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_focus_loss_pauses_pausable_game() {
        let h = host();
        let mut s = session(&h, SessionConfig::new(VariantKind::Snake));
        s.start();
        assert!(s.handle_input(&RawInput::KeyDown("ArrowUp".to_string())));
        s.focus_lost();
        assert_eq!(s.state(), GameState::Paused);
        for _ in 0..5 {
            s.frame(150.0);
        }
        assert_eq!(s.ticks(), 0);

        // Focus loss outside play changes nothing
        let mut menu = session(&h, SessionConfig::new(VariantKind::Snake));
        menu.focus_lost();
        assert_eq!(menu.state(), GameState::Menu);
    }

    #[test]
    fn test_focus_loss_releases_held_keys() {
        let h = host();
        let mut settings = EngineSettings::default();
        settings.runner.spawn.probability_override = Some(0.0);
        let mut s = session(&h, SessionConfig::new(VariantKind::Runner).with_settings(settings));
        s.start();
        assert!(s.handle_input(&RawInput::KeyDown(" ".to_string())));
        s.focus_lost();
        // Runner cannot pause
        assert_eq!(s.state(), GameState::Playing);
        for _ in 0..120 {
            s.frame(16.7);
        }
        // The key-up was never seen, yet the next press jumps again
        assert!(s.handle_input(&RawInput::KeyDown(" ".to_string())));
        assert!(!s.handle_input(&RawInput::KeyDown(" ".to_string())));
    }

    #[test]
    fn test_keyboard_drives_lifecycle() {
        let h = host();
        let mut s = session(&h, SessionConfig::new(VariantKind::Snake));
        s.handle_input(&RawInput::KeyDown("ArrowUp".to_string()));
        assert_eq!(s.state(), GameState::Menu);
        s.handle_input(&RawInput::KeyDown("Enter".to_string()));
        assert_eq!(s.state(), GameState::Playing);
        s.handle_input(&RawInput::KeyDown("p".to_string()));
        assert_eq!(s.state(), GameState::Paused);
        // Held key does not toggle back
        s.handle_input(&RawInput::KeyDown("p".to_string()));
        assert_eq!(s.state(), GameState::Paused);
        s.handle_input(&RawInput::KeyUp("p".to_string()));
        s.handle_input(&RawInput::KeyDown("p".to_string()));
        assert_eq!(s.state(), GameState::Playing);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let h = host();
        let mut s = session(&h, SessionConfig::new(VariantKind::Runner));
        s.start();
        s.frame(16.0);
        s.destroy();
        s.destroy();
        assert!(s.is_destroyed());
        let ticks = s.ticks();
        s.frame(16.0);
        assert_eq!(s.ticks(), ticks);
        assert!(!s.apply_intent(Intent::Activate));
        assert!(!s.apply_intent(Intent::Start));
    }

    #[test]
    fn test_renders_every_frame() {
        let h = host();
        let shared = Rc::new(RefCell::new(RecordingSurface::new(400.0, 400.0)));
        let surface: Box<dyn Surface> = Box::new(SharedSurface(shared.clone()));
        let mut s = GameSession::new(
            SessionHandle(1),
            SessionConfig::new(VariantKind::Snake).with_seed(3),
            Some(surface),
            h.scores.clone(),
        )
        .unwrap();

        s.frame(16.0);
        assert!(shared.borrow().texts().contains(&"Snake"));
        s.start();
        s.frame(16.0);
        s.frame(16.0);
        assert_eq!(shared.borrow().frames, 3);
        assert!(shared.borrow().texts().contains(&"Score: 0"));
        assert!(!shared.borrow().texts().contains(&"Paused"));
    }

    /// World that reports itself broken after its first tick
    struct Broken {
        ticked: bool,
    }

    impl Variant for Broken {
        fn kind(&self) -> VariantKind {
            VariantKind::Snake
        }
        fn tick_rate(&self) -> TickRate {
            TickRate::Display
        }
        fn reset(&mut self, _rng: &mut Pcg32) {
            self.ticked = false;
        }
        fn apply_intent(&mut self, _intent: Intent, _rng: &mut Pcg32) -> Option<StepReport> {
            None
        }
        fn update(&mut self, _rng: &mut Pcg32) -> StepReport {
            self.ticked = true;
            StepReport::points(5)
        }
        fn is_consistent(&self) -> bool {
            !self.ticked
        }
        fn render(&self, _surface: &mut dyn Surface) {}
        fn fingerprint(&self) -> String {
            self.ticked.to_string()
        }
    }

    #[test]
    fn test_broken_world_forces_game_over() {
        let h = host();
        let mut s = GameSession::with_variant(
            SessionHandle(9),
            Box::new(Broken { ticked: false }),
            Box::new(RecordingSurface::new(100.0, 100.0)),
            h.scores.clone(),
            1,
            30.0,
        );
        s.start();
        s.frame(16.0);
        assert_eq!(s.state(), GameState::GameOver);
        assert_eq!(s.high_score(), 5);
    }

    fn gameplay_intent() -> impl Strategy<Value = Intent> {
        prop_oneof![
            Just(Intent::Activate),
            Just(Intent::TogglePause),
            Just(Intent::Move(Direction::Up)),
            Just(Intent::Move(Direction::Left)),
            any::<u8>().prop_map(Intent::Choose),
            (0.0f32..400.0, 0.0f32..300.0).prop_map(|(x, y)| Intent::Select { x, y }),
        ]
    }

    /// A session parked outside play: each game's menu, then a paused snake,
    /// a crashed snake and a won village
    fn parked(h: &Host, case: usize) -> GameSession {
        match case {
            0..=3 => session(h, SessionConfig::new(VariantKind::ALL[case])),
            4 => {
                let mut s = session(h, SessionConfig::new(VariantKind::Snake));
                s.start();
                s.frame(150.0);
                s.pause();
                s
            }
            5 => {
                let mut s = session(h, SessionConfig::new(VariantKind::Snake));
                s.start();
                while s.state() == GameState::Playing {
                    s.frame(150.0);
                }
                s
            }
            _ => {
                let mut s = session(h, village_to(4));
                s.start();
                s.apply_intent(Intent::Activate);
                s.apply_intent(Intent::Choose(0));
                s
            }
        }
    }

    #[test]
    fn test_parked_sessions_reach_their_states() {
        let h = host();
        let states: Vec<GameState> = (0..7).map(|c| parked(&h, c).state()).collect();
        assert_eq!(
            states,
            vec![
                GameState::Menu,
                GameState::Menu,
                GameState::Menu,
                GameState::Menu,
                GameState::Paused,
                GameState::GameOver,
                GameState::Won,
            ]
        );
    }

    proptest! {
        #[test]
        fn test_intents_outside_play_change_nothing(
            case in 0usize..7,
            intents in proptest::collection::vec(gameplay_intent(), 1..20),
        ) {
            let h = host();
            let mut s = parked(&h, case);
            let before = (s.state(), s.fingerprint(), s.snapshot());
            for intent in intents {
                // Toggling pause is the one valid intent while paused
                if s.state() == GameState::Paused && intent == Intent::TogglePause {
                    continue;
                }
                prop_assert!(!s.apply_intent(intent));
                s.frame(16.0);
            }
            prop_assert_eq!(before, (s.state(), s.fingerprint(), s.snapshot()));
        }
    }
}
