//! Chest reward expected values. Chest tiers are plain configuration values
//! consumed by pure functions; no state survives a draw.

use serde::Serialize;

/// Chance that a chest draw is a card at all.
pub const CARD_CHANCE: f64 = 0.33;
/// Chance that a drawn card comes out gold foil.
pub const GOLD_FOIL_CHANCE: f64 = 0.02;
/// Each batch of chests costs 1.5x the previous one.
pub const BATCH_COST_GROWTH: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChestTier {
    Minor,
    Major,
    Ultimate,
}

impl ChestTier {
    pub fn from_name(name: &str) -> Option<ChestTier> {
        match name.to_lowercase().as_str() {
            "minor" => Some(ChestTier::Minor),
            "major" => Some(ChestTier::Major),
            "ultimate" => Some(ChestTier::Ultimate),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ChestTier::Minor => "minor",
            ChestTier::Major => "major",
            ChestTier::Ultimate => "ultimate",
        }
    }
}

/// Draw odds and reward ranges for one chest tier at one batch depth.
/// `(min, max)` pairs are uniform ranges; expectation uses their midpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChestConfig {
    pub tier: ChestTier,
    pub batch: u32,
    pub potion_chance: f64,
    pub merit_chance: f64,
    pub energy_chance: f64,
    pub jackpot_chance: f64,
    pub card_chance: f64,
    pub gold_foil_chance: f64,
    pub base_cost: f64,
    pub common_card_chance: f64,
    pub rare_card_chance: f64,
    pub epic_card_chance: f64,
    pub legendary_card_chance: f64,
    pub common_multiplier_rf: (f64, f64),
    pub rare_multiplier_rf: (f64, f64),
    pub epic_multiplier_rf: (f64, f64),
    pub legendary_multiplier_rf: (f64, f64),
    pub common_multiplier_gf: (f64, f64),
    pub rare_multiplier_gf: (f64, f64),
    pub epic_multiplier_gf: (f64, f64),
    pub legendary_multiplier_gf: (f64, f64),
    pub potion_multiplier: (f64, f64),
    pub merits_multiplier: (f64, f64),
    pub energy_multiplier: (f64, f64),
}

/// Expected contents of a single draw, by reward category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DrawExpectation {
    pub legendary_potions: f64,
    pub alchemy_potions: f64,
    pub energy: f64,
    pub jackpot: f64,
    pub merits: f64,
    pub common_rf: f64,
    pub rare_rf: f64,
    pub epic_rf: f64,
    pub legendary_rf: f64,
    pub common_gf: f64,
    pub rare_gf: f64,
    pub epic_gf: f64,
    pub legendary_gf: f64,
}

impl ChestConfig {
    pub fn new(
        tier: ChestTier,
        batch: u32,
        legendary_potion: bool,
        alchemy_potion: bool,
    ) -> ChestConfig {
        match tier {
            ChestTier::Minor => ChestConfig::minor(batch, legendary_potion, alchemy_potion),
            ChestTier::Major => ChestConfig::major(batch, legendary_potion, alchemy_potion),
            ChestTier::Ultimate => ChestConfig::ultimate(batch, legendary_potion, alchemy_potion),
        }
    }

    pub fn minor(batch: u32, legendary_potion: bool, alchemy_potion: bool) -> ChestConfig {
        ChestConfig {
            tier: ChestTier::Minor,
            batch,
            potion_chance: 0.31999,
            merit_chance: 0.3,
            energy_chance: 0.05,
            jackpot_chance: 0.00001,
            card_chance: CARD_CHANCE,
            gold_foil_chance: GOLD_FOIL_CHANCE,
            base_cost: 200.0,
            common_card_chance: 0.789,
            rare_card_chance: 0.2,
            epic_card_chance: 0.01,
            legendary_card_chance: 0.001,
            common_multiplier_rf: (1.0, 1.0),
            rare_multiplier_rf: (1.0, 1.0),
            epic_multiplier_rf: (1.0, 1.0),
            legendary_multiplier_rf: (1.0, 1.0),
            common_multiplier_gf: (1.0, 1.0),
            rare_multiplier_gf: (1.0, 1.0),
            epic_multiplier_gf: (1.0, 1.0),
            legendary_multiplier_gf: (1.0, 1.0),
            potion_multiplier: (1.0, 1.0),
            merits_multiplier: (20.0, 180.0),
            energy_multiplier: (1.0, 1.0),
        }
        .apply_potions(legendary_potion, alchemy_potion)
    }

    pub fn major(batch: u32, legendary_potion: bool, alchemy_potion: bool) -> ChestConfig {
        ChestConfig {
            tier: ChestTier::Major,
            batch,
            potion_chance: 0.3099,
            merit_chance: 0.26,
            energy_chance: 0.1,
            jackpot_chance: 0.0001,
            card_chance: CARD_CHANCE,
            gold_foil_chance: GOLD_FOIL_CHANCE,
            base_cost: 1000.0,
            common_card_chance: 0.76,
            rare_card_chance: 0.2,
            epic_card_chance: 0.03,
            legendary_card_chance: 0.01,
            common_multiplier_rf: (2.0, 6.0),
            rare_multiplier_rf: (1.0, 5.0),
            epic_multiplier_rf: (1.0, 2.0),
            legendary_multiplier_rf: (1.0, 1.0),
            common_multiplier_gf: (1.0, 3.0),
            rare_multiplier_gf: (1.0, 3.0),
            epic_multiplier_gf: (1.0, 2.0),
            legendary_multiplier_gf: (1.0, 1.0),
            potion_multiplier: (3.0, 7.0),
            merits_multiplier: (250.0, 750.0),
            energy_multiplier: (1.0, 4.0),
        }
        .apply_potions(legendary_potion, alchemy_potion)
    }

    pub fn ultimate(batch: u32, legendary_potion: bool, alchemy_potion: bool) -> ChestConfig {
        ChestConfig {
            tier: ChestTier::Ultimate,
            batch,
            potion_chance: 0.269,
            merit_chance: 0.2,
            energy_chance: 0.2,
            jackpot_chance: 0.001,
            card_chance: CARD_CHANCE,
            gold_foil_chance: GOLD_FOIL_CHANCE,
            base_cost: 4500.0,
            common_card_chance: 0.688,
            rare_card_chance: 0.2,
            epic_card_chance: 0.08,
            legendary_card_chance: 0.032,
            common_multiplier_rf: (5.0, 11.0),
            rare_multiplier_rf: (3.0, 9.0),
            epic_multiplier_rf: (1.0, 2.0),
            legendary_multiplier_rf: (1.0, 2.0),
            common_multiplier_gf: (2.0, 6.0),
            rare_multiplier_gf: (2.0, 6.0),
            epic_multiplier_gf: (1.0, 2.0),
            legendary_multiplier_gf: (1.0, 2.0),
            potion_multiplier: (5.0, 15.0),
            merits_multiplier: (1000.0, 3000.0),
            energy_multiplier: (3.0, 5.0),
        }
        .apply_potions(legendary_potion, alchemy_potion)
    }

    /// Legendary potions double epic/legendary card chances at the expense
    /// of commons; alchemy potions double the gold foil chance.
    fn apply_potions(mut self, legendary_potion: bool, alchemy_potion: bool) -> ChestConfig {
        if legendary_potion {
            self.common_card_chance -= self.epic_card_chance;
            self.common_card_chance -= self.legendary_card_chance;
            self.epic_card_chance *= 2.0;
            self.legendary_card_chance *= 2.0;
        }
        if alchemy_potion {
            self.gold_foil_chance *= 2.0;
        }
        self
    }

    /// Glint cost of this batch.
    pub fn cost(&self) -> f64 {
        self.base_cost * BATCH_COST_GROWTH.powi(self.batch as i32 - 1)
    }

    /// Expected result of a single draw.
    pub fn average_draw(&self) -> DrawExpectation {
        let legendary_potions = 0.5 * self.potion_chance * midpoint(self.potion_multiplier);
        DrawExpectation {
            legendary_potions,
            alchemy_potions: legendary_potions,
            energy: self.energy_chance * midpoint(self.energy_multiplier),
            jackpot: self.jackpot_chance,
            merits: self.merit_chance * range_sum(self.merits_multiplier),
            common_rf: self.card_expectation(self.common_card_chance, self.common_multiplier_rf, false),
            rare_rf: self.card_expectation(self.rare_card_chance, self.rare_multiplier_rf, false),
            epic_rf: self.card_expectation(self.epic_card_chance, self.epic_multiplier_rf, false),
            legendary_rf: self
                .card_expectation(self.legendary_card_chance, self.legendary_multiplier_rf, false),
            common_gf: self.card_expectation(self.common_card_chance, self.common_multiplier_gf, true),
            rare_gf: self.card_expectation(self.rare_card_chance, self.rare_multiplier_gf, true),
            epic_gf: self.card_expectation(self.epic_card_chance, self.epic_multiplier_gf, true),
            legendary_gf: self
                .card_expectation(self.legendary_card_chance, self.legendary_multiplier_gf, true),
        }
    }

    fn card_expectation(&self, rarity_chance: f64, multiplier: (f64, f64), gold: bool) -> f64 {
        let foil_chance = if gold {
            self.gold_foil_chance
        } else {
            1.0 - self.gold_foil_chance
        };
        self.card_chance * rarity_chance * foil_chance * midpoint(multiplier)
    }
}

fn midpoint(range: (f64, f64)) -> f64 {
    0.5 * (range.0 + range.1)
}

/// Merits historically pay out on the full range sum, not the midpoint.
fn range_sum(range: (f64, f64)) -> f64 {
    range.0 + range.1
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn batch_cost_grows_by_half_each_batch() {
        assert!((ChestConfig::minor(1, true, true).cost() - 200.0).abs() < TOL);
        assert!((ChestConfig::minor(3, true, true).cost() - 450.0).abs() < TOL);
        assert!((ChestConfig::ultimate(2, true, true).cost() - 6750.0).abs() < TOL);
    }

    #[test]
    fn legendary_potion_moves_mass_from_commons() {
        let plain = ChestConfig::major(1, false, false);
        let boosted = ChestConfig::major(1, true, false);
        assert!((boosted.epic_card_chance - 2.0 * plain.epic_card_chance).abs() < TOL);
        assert!((boosted.legendary_card_chance - 2.0 * plain.legendary_card_chance).abs() < TOL);
        assert!(
            (boosted.common_card_chance
                - (plain.common_card_chance
                    - plain.epic_card_chance
                    - plain.legendary_card_chance))
                .abs()
                < TOL
        );
        // Rarity chances still sum to what they did before the potion.
        let sum = |c: &ChestConfig| {
            c.common_card_chance + c.rare_card_chance + c.epic_card_chance + c.legendary_card_chance
        };
        assert!((sum(&plain) - sum(&boosted)).abs() < TOL);
    }

    #[test]
    fn alchemy_potion_doubles_gold_foil_only() {
        let boosted = ChestConfig::minor(1, false, true);
        assert!((boosted.gold_foil_chance - 2.0 * GOLD_FOIL_CHANCE).abs() < TOL);
        assert!((boosted.common_card_chance - 0.789).abs() < TOL);
    }

    #[test]
    fn average_draw_matches_hand_computation() {
        let chest = ChestConfig::minor(1, false, false);
        let draw = chest.average_draw();
        // potions: 0.5 * 0.31999 * mid(1,1)
        assert!((draw.legendary_potions - 0.5 * 0.31999).abs() < TOL);
        assert!((draw.alchemy_potions - draw.legendary_potions).abs() < TOL);
        // merits keep the historical full-range sum.
        assert!((draw.merits - 0.3 * 200.0).abs() < TOL);
        // common regular foil: 0.33 * 0.789 * 0.98 * mid(1,1)
        assert!((draw.common_rf - 0.33 * 0.789 * 0.98).abs() < TOL);
        // common gold foil complements the regular foil chance.
        assert!((draw.common_gf - 0.33 * 0.789 * 0.02).abs() < TOL);
        assert!((draw.jackpot - 0.00001).abs() < TOL);
    }
}
