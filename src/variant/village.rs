//! Idle village builder: gather gold, buy buildings, grow the population
//!
//! The economy ticks once a second. Farms, mines and markets pay passive
//! income; houses raise the population. Score is the total gold ever earned,
//! so spending never lowers it.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{StepReport, Variant, VariantKind, fingerprint_of};
use crate::clock::TickRate;
use crate::entity::Rect;
use crate::input::{InputBindings, Intent};
use crate::platform::{Surface, TextAlign};
use crate::render::palette;
use crate::settings::VillageSettings;

const TOP_MARGIN: f32 = 28.0;
const PADDING: f32 = 8.0;

/// Buildings available for purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Building {
    House,
    Farm,
    Mine,
    Market,
}

impl Building {
    pub const ALL: [Building; 4] = [Building::House, Building::Farm, Building::Mine, Building::Market];

    pub fn label(&self) -> &'static str {
        match self {
            Building::House => "House",
            Building::Farm => "Farm",
            Building::Mine => "Mine",
            Building::Market => "Market",
        }
    }

    /// Price of the first one
    pub fn base_cost(&self) -> u64 {
        match self {
            Building::House => 25,
            Building::Farm => 60,
            Building::Mine => 150,
            Building::Market => 400,
        }
    }

    /// Price after `owned` have been bought; each purchase adds a quarter of
    /// the base price
    pub fn cost(&self, owned: u64) -> u64 {
        self.base_cost().saturating_mul(owned.saturating_add(4)) / 4
    }

    /// Residents added per building
    pub fn population(&self) -> u64 {
        match self {
            Building::House => 4,
            _ => 0,
        }
    }

    /// Gold produced per tick by one building
    pub fn income(&self, population: u64) -> u64 {
        match self {
            Building::House => 0,
            Building::Farm => 2,
            Building::Mine => 6,
            Building::Market => population / 5,
        }
    }

    fn index(&self) -> usize {
        match self {
            Building::House => 0,
            Building::Farm => 1,
            Building::Mine => 2,
            Building::Market => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Village {
    #[serde(skip)]
    settings: VillageSettings,
    #[serde(skip)]
    surface_size: (f32, f32),
    gold: u64,
    population: u64,
    /// Owned count per `Building::ALL` entry
    owned: [u64; 4],
    /// Gold earned since the start, never decreases
    earned: u64,
}

impl Village {
    pub fn new(settings: VillageSettings, surface_size: (f32, f32)) -> Self {
        Self {
            gold: settings.starting_gold,
            population: 0,
            owned: [0; 4],
            earned: 0,
            settings,
            surface_size,
        }
    }

    pub fn gold(&self) -> u64 {
        self.gold
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    pub fn owned(&self, building: Building) -> u64 {
        self.owned[building.index()]
    }

    pub fn earned(&self) -> u64 {
        self.earned
    }

    pub fn price(&self, building: Building) -> u64 {
        building.cost(self.owned(building))
    }

    /// Passive gold for one tick
    pub fn income_per_tick(&self) -> u64 {
        Building::ALL
            .iter()
            .map(|b| b.income(self.population).saturating_mul(self.owned(*b)))
            .fold(0u64, u64::saturating_add)
    }

    fn earn(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
        self.earned = self.earned.saturating_add(amount);
    }

    /// Buy one building. Either the gold is paid and the building counted,
    /// or nothing changes.
    pub fn purchase(&mut self, building: Building) -> Option<StepReport> {
        let price = self.price(building);
        let remaining = self.gold.checked_sub(price)?;
        self.gold = remaining;
        self.owned[building.index()] += 1;
        self.population += building.population();
        log::debug!("Bought {} for {} gold", building.label(), price);

        if self.population >= self.settings.target_population {
            Some(StepReport::won(0))
        } else {
            Some(StepReport::default())
        }
    }

    fn gather(&mut self) -> StepReport {
        let amount = self.settings.gather_gold;
        self.earn(amount);
        StepReport::points(amount)
    }

    /// Big button on the left
    pub fn gather_rect(&self) -> Rect {
        let (w, h) = self.surface_size;
        Rect::new(PADDING, TOP_MARGIN + PADDING, w * 0.4 - PADDING * 1.5, h - TOP_MARGIN - PADDING * 2.0)
    }

    /// Catalog buttons stacked on the right
    pub fn catalog_rect(&self, slot: usize) -> Rect {
        let (w, h) = self.surface_size;
        let x = w * 0.4 + PADDING * 0.5;
        let count = Building::ALL.len() as f32;
        let button_h = (h - TOP_MARGIN - PADDING * (count + 1.0)) / count;
        Rect::new(
            x,
            TOP_MARGIN + PADDING + slot as f32 * (button_h + PADDING),
            w - x - PADDING,
            button_h,
        )
    }

    fn hit(rect: &Rect, x: f32, y: f32) -> bool {
        x >= rect.left() && x < rect.right() && y >= rect.top() && y < rect.bottom()
    }
}

impl Variant for Village {
    fn kind(&self) -> VariantKind {
        VariantKind::Village
    }

    fn tick_rate(&self) -> TickRate {
        TickRate::Fixed {
            interval_ms: self.settings.step_ms,
        }
    }

    fn bindings(&self) -> InputBindings {
        InputBindings::standard().with_catalog(Building::ALL.len() as u8)
    }

    fn reset(&mut self, _rng: &mut Pcg32) {
        self.gold = self.settings.starting_gold;
        self.population = 0;
        self.owned = [0; 4];
        self.earned = 0;
    }

    fn apply_intent(&mut self, intent: Intent, _rng: &mut Pcg32) -> Option<StepReport> {
        match intent {
            Intent::Activate => Some(self.gather()),
            Intent::Choose(i) => {
                let building = *Building::ALL.get(i as usize)?;
                self.purchase(building)
            }
            Intent::Select { x, y } => {
                if Self::hit(&self.gather_rect(), x, y) {
                    return Some(self.gather());
                }
                let slot = (0..Building::ALL.len()).find(|&i| Self::hit(&self.catalog_rect(i), x, y))?;
                self.purchase(Building::ALL[slot])
            }
            _ => None,
        }
    }

    fn update(&mut self, _rng: &mut Pcg32) -> StepReport {
        let income = self.income_per_tick();
        self.earn(income);
        StepReport::points(income)
    }

    fn is_consistent(&self) -> bool {
        let housed: u64 = Building::ALL
            .iter()
            .map(|b| b.population() * self.owned(*b))
            .sum();
        housed == self.population && self.gold <= self.settings.starting_gold.saturating_add(self.earned)
    }

    fn render(&self, surface: &mut dyn Surface) {
        let g = self.gather_rect();
        surface.fill_rect(g.left(), g.top(), g.size.x, g.size.y, palette::GOLD);
        let cx = g.left() + g.size.x / 2.0;
        surface.fill_text("Gold mine", cx, g.top() + 24.0, 16.0, palette::BACKGROUND, TextAlign::Center);
        surface.fill_text(
            &format!("{} gold", self.gold),
            cx,
            g.top() + g.size.y / 2.0,
            18.0,
            palette::BACKGROUND,
            TextAlign::Center,
        );
        surface.fill_text(
            &format!("Pop {} / {}", self.population, self.settings.target_population),
            cx,
            g.top() + g.size.y / 2.0 + 24.0,
            14.0,
            palette::BACKGROUND,
            TextAlign::Center,
        );
        surface.fill_text(
            &format!("+{}/s", self.income_per_tick()),
            cx,
            g.bottom() - 12.0,
            12.0,
            palette::BACKGROUND,
            TextAlign::Center,
        );

        for (slot, building) in Building::ALL.iter().enumerate() {
            let r = self.catalog_rect(slot);
            let price = self.price(*building);
            let color = if price <= self.gold {
                palette::ACCENT
            } else {
                palette::MUTED
            };
            surface.fill_rect(r.left(), r.top(), r.size.x, r.size.y, color);
            surface.fill_text(
                &format!("{} {} {}g (x{})", slot + 1, building.label(), price, self.owned(*building)),
                r.left() + 8.0,
                r.top() + r.size.y / 2.0 + 5.0,
                13.0,
                palette::BACKGROUND,
                TextAlign::Left,
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
    use rand::SeedableRng;

    fn village() -> (Village, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut v = Village::new(VillageSettings::default(), (400.0, 300.0));
        v.reset(&mut rng);
        (v, rng)
    }

    #[test]
    fn test_cost_scaling() {
        assert_eq!(Building::House.cost(0), 25);
        assert_eq!(Building::House.cost(4), 50);
        assert_eq!(Building::Market.cost(1), 500);
    }

    #[test]
    fn test_purchase_is_atomic() {
        let (mut v, mut rng) = village();
        assert_eq!(v.gold(), 50);
        // Mine costs 150: rejected, nothing changes
        let before = v.fingerprint();
        assert_eq!(v.apply_intent(Intent::Choose(2), &mut rng), None);
        assert_eq!(v.fingerprint(), before);

        assert!(v.apply_intent(Intent::Choose(0), &mut rng).is_some());
        assert_eq!(v.gold(), 25);
        assert_eq!(v.owned(Building::House), 1);
        assert_eq!(v.population(), 4);

        // Second house now costs 31
        assert_eq!(v.apply_intent(Intent::Choose(0), &mut rng), None);
        assert_eq!(v.gold(), 25);
        assert_eq!(v.owned(Building::House), 1);
        assert!(v.is_consistent());
    }

    #[test]
    fn test_unknown_catalog_entry_rejected() {
        let (mut v, mut rng) = village();
        assert_eq!(v.apply_intent(Intent::Choose(7), &mut rng), None);
    }

    #[test]
    fn test_gather_and_income() {
        let (mut v, mut rng) = village();
        assert_eq!(v.apply_intent(Intent::Activate, &mut rng), Some(StepReport::points(1)));
        assert_eq!(v.gold(), 51);

        for _ in 0..9 {
            v.apply_intent(Intent::Activate, &mut rng);
        }
        v.purchase(Building::Farm);
        assert_eq!(v.gold(), 0);
        assert_eq!(v.update(&mut rng), StepReport::points(2));
        // Score counts gold earned, not gold held
        assert_eq!(v.earned(), 12);
    }

    #[test]
    fn test_market_scales_with_population() {
        let mut v = Village::new(
            VillageSettings {
                starting_gold: 10_000,
                ..VillageSettings::default()
            },
            (400.0, 300.0),
        );
        for _ in 0..5 {
            v.purchase(Building::House);
        }
        v.purchase(Building::Market);
        assert_eq!(v.population(), 20);
        assert_eq!(v.income_per_tick(), 4);
    }

    #[test]
    fn test_reaching_target_population_wins() {
        let mut v = Village::new(
            VillageSettings {
                starting_gold: 1_000_000,
                target_population: 12,
                ..VillageSettings::default()
            },
            (400.0, 300.0),
        );
        assert_eq!(v.purchase(Building::House).map(|r| r.outcome), Some(Outcome::Continue));
        assert_eq!(v.purchase(Building::House).map(|r| r.outcome), Some(Outcome::Continue));
        assert_eq!(v.purchase(Building::House).map(|r| r.outcome), Some(Outcome::Won));
    }

    #[test]
    fn test_pointer_targets() {
        let (mut v, mut rng) = village();
        let g = v.gather_rect();
        let report = v.apply_intent(
            Intent::Select {
                x: g.left() + 5.0,
                y: g.top() + 5.0,
            },
            &mut rng,
        );
        assert_eq!(report, Some(StepReport::points(1)));

        let house = v.catalog_rect(0);
        v.apply_intent(
            Intent::Select {
                x: house.left() + 5.0,
                y: house.top() + 5.0,
            },
            &mut rng,
        );
        assert_eq!(v.owned(Building::House), 1);

        // Between buttons
        assert_eq!(v.apply_intent(Intent::Select { x: 1.0, y: 1.0 }, &mut rng), None);
    }
}
