//! Card matching: flip two cards at a time looking for pairs
//!
//! A mismatched pair stays visible for a short reveal delay during which
//! further flips are ignored. The run is won once every pair is matched;
//! fewer moves earn a larger bonus.

use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::{StepReport, Variant, VariantKind, fingerprint_of};
use crate::clock::TickRate;
use crate::entity::Rect;
use crate::input::{Direction, Intent};
use crate::platform::{Surface, TextAlign};
use crate::render::palette;
use crate::settings::MemorySettings;

/// Card faces; one pair per symbol
pub const SYMBOLS: [&str; 12] = [
    "\u{2605}", "\u{2665}", "\u{2666}", "\u{2663}", "\u{2660}", "\u{2600}", "\u{2602}", "\u{266a}",
    "\u{2691}", "\u{273f}", "\u{263e}", "\u{2708}",
];

const TOP_MARGIN: f32 = 28.0;
const PADDING: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Index into `SYMBOLS`
    pub symbol: usize,
    pub face_up: bool,
    pub matched: bool,
}

/// A mismatched pair waiting to turn back over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct Reveal {
    first: usize,
    second: usize,
    ticks_left: u32,
    /// Armed since the last update; the countdown starts on the next one
    armed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Memory {
    #[serde(skip)]
    settings: MemorySettings,
    #[serde(skip)]
    surface_size: (f32, f32),
    cards: Vec<Card>,
    /// First card of the pair in progress
    flipped: Option<usize>,
    reveal: Option<Reveal>,
    cursor: usize,
    moves: u32,
    matched_pairs: usize,
}

impl Memory {
    pub fn new(settings: MemorySettings, surface_size: (f32, f32)) -> Self {
        let mut memory = Self {
            settings,
            surface_size,
            cards: Vec::new(),
            flipped: None,
            reveal: None,
            cursor: 0,
            moves: 0,
            matched_pairs: 0,
        };
        memory.deal();
        memory
    }

    /// Lay the cards out in symbol order, all face down
    fn deal(&mut self) {
        let pairs = self.pair_count();
        self.cards = (0..pairs)
            .flat_map(|symbol| {
                let card = Card {
                    symbol,
                    face_up: false,
                    matched: false,
                };
                [card, card]
            })
            .collect();
        self.flipped = None;
        self.reveal = None;
        self.cursor = 0;
        self.moves = 0;
        self.matched_pairs = 0;
    }

    pub fn pair_count(&self) -> usize {
        (self.settings.cols * self.settings.rows / 2).min(SYMBOLS.len())
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    /// Screen rectangle of the card at `index`
    pub fn card_rect(&self, index: usize) -> Rect {
        let (w, h) = self.surface_size;
        let cols = self.settings.cols.max(1);
        let rows = self.settings.rows.max(1);
        let card_w = (w - PADDING * (cols as f32 + 1.0)) / cols as f32;
        let card_h = (h - TOP_MARGIN - PADDING * (rows as f32 + 1.0)) / rows as f32;
        let col = index % cols;
        let row = index / cols;
        Rect::new(
            PADDING + col as f32 * (card_w + PADDING),
            TOP_MARGIN + PADDING + row as f32 * (card_h + PADDING),
            card_w,
            card_h,
        )
    }

    /// Card under a pointer position, if any
    pub fn card_at(&self, x: f32, y: f32) -> Option<usize> {
        (0..self.cards.len()).find(|&i| {
            let r = self.card_rect(i);
            x >= r.left() && x < r.right() && y >= r.top() && y < r.bottom()
        })
    }

    fn move_cursor(&mut self, dir: Direction) -> bool {
        let cols = self.settings.cols as i32;
        let rows = (self.cards.len() / self.settings.cols.max(1)) as i32;
        let (dc, dr) = dir.delta();
        let col = self.cursor as i32 % cols + dc;
        let row = self.cursor as i32 / cols + dr;
        if col < 0 || row < 0 || col >= cols || row >= rows {
            return false;
        }
        self.cursor = (row * cols + col) as usize;
        true
    }

    /// Turn a card face up, resolving the pair when it is the second flip
    pub fn flip(&mut self, index: usize) -> Option<StepReport> {
        if self.reveal.is_some() {
            return None;
        }
        let card = self.cards.get(index)?;
        if card.matched || card.face_up {
            return None;
        }
        self.cards[index].face_up = true;

        let Some(first) = self.flipped.take() else {
            self.flipped = Some(index);
            return Some(StepReport::default());
        };

        self.moves += 1;
        if self.cards[first].symbol != self.cards[index].symbol {
            self.reveal = Some(Reveal {
                first,
                second: index,
                ticks_left: self.settings.reveal_ticks,
                armed: true,
            });
            return Some(StepReport::default());
        }

        self.cards[first].matched = true;
        self.cards[index].matched = true;
        self.matched_pairs += 1;
        let points = self.settings.match_points;
        if self.matched_pairs < self.pair_count() {
            return Some(StepReport::points(points));
        }
        let par = self.cards.len() as u64;
        let bonus = par.saturating_sub(self.moves as u64) * self.settings.par_bonus;
        log::info!("All pairs matched in {} moves (bonus {})", self.moves, bonus);
        Some(StepReport::won(points + bonus))
    }
}

impl Variant for Memory {
    fn kind(&self) -> VariantKind {
        VariantKind::Memory
    }

    fn tick_rate(&self) -> TickRate {
        TickRate::Fixed {
            interval_ms: self.settings.step_ms,
        }
    }

    fn reset(&mut self, rng: &mut Pcg32) {
        self.deal();
        self.cards.shuffle(rng);
    }

    fn apply_intent(&mut self, intent: Intent, _rng: &mut Pcg32) -> Option<StepReport> {
        match intent {
            Intent::Move(dir) => self.move_cursor(dir).then(StepReport::default),
            Intent::Activate => self.flip(self.cursor),
            Intent::Select { x, y } => {
                let index = self.card_at(x, y)?;
                let report = self.flip(index)?;
                self.cursor = index;
                Some(report)
            }
            _ => None,
        }
    }

    fn update(&mut self, _rng: &mut Pcg32) -> StepReport {
        if let Some(reveal) = &mut self.reveal {
            if reveal.armed {
                // A partial interval does not count toward the delay
                reveal.armed = false;
                return StepReport::default();
            }
            reveal.ticks_left = reveal.ticks_left.saturating_sub(1);
            if reveal.ticks_left == 0 {
                let (a, b) = (reveal.first, reveal.second);
                self.cards[a].face_up = false;
                self.cards[b].face_up = false;
                self.reveal = None;
            }
        }
        StepReport::default()
    }

    fn is_consistent(&self) -> bool {
        if self.cards.len() != self.pair_count() * 2 || self.cursor >= self.cards.len() {
            return false;
        }
        let mut counts = vec![0usize; self.pair_count()];
        for card in &self.cards {
            match counts.get_mut(card.symbol) {
                Some(n) => *n += 1,
                None => return false,
            }
            if card.matched && !card.face_up {
                return false;
            }
        }
        let matched = self.cards.iter().filter(|c| c.matched).count();
        let open = self.cards.iter().filter(|c| c.face_up && !c.matched).count();
        counts.iter().all(|&n| n == 2) && matched == self.matched_pairs * 2 && open <= 2
    }

    fn render(&self, surface: &mut dyn Surface) {
        for (i, card) in self.cards.iter().enumerate() {
            let r = self.card_rect(i);
            if i == self.cursor {
                surface.fill_rect(r.left() - 3.0, r.top() - 3.0, r.size.x + 6.0, r.size.y + 6.0, palette::ACCENT_BRIGHT);
            }
            let color = if card.matched {
                palette::CARD_MATCHED
            } else if card.face_up {
                palette::CARD_FACE
            } else {
                palette::CARD_BACK
            };
            surface.fill_rect(r.left(), r.top(), r.size.x, r.size.y, color);
            if card.face_up {
                let size = r.size.x.min(r.size.y) * 0.5;
                surface.fill_text(
                    SYMBOLS[card.symbol],
                    r.left() + r.size.x / 2.0,
                    r.top() + r.size.y / 2.0 + size / 3.0,
                    size,
                    palette::BACKGROUND,
                    TextAlign::Center,
                );
            }
        }
        surface.fill_text(
            &format!("Moves: {}", self.moves),
            surface.width() / 2.0,
            18.0,
            14.0,
            palette::MUTED,
            TextAlign::Center,
        );
    }

    fn fingerprint(&self) -> String {
        fingerprint_of(self)
    }
}
