//! Bonus aggregation: team composition, active effects and base stats folded
//! into the two numbers the economy uses, click gain and passive income.

use crate::effects::aggregate_multiplier;
use crate::shared::*;

/// Named channels derived from the team. Multiplicative channels start at 1,
/// additive channels at 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bonuses {
    pub click_mult: f64,
    pub coin_mult: f64,
    pub xp_mult: f64,
    pub click_power_add: f64,
    pub auto_income_add: f64,
    pub global_mult: f64,
}

impl Default for Bonuses {
    fn default() -> Self {
        Self {
            click_mult: 1.0,
            coin_mult: 1.0,
            xp_mult: 1.0,
            click_power_add: 0.0,
            auto_income_add: 0.0,
            global_mult: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Power {
    pub click: f64,
    pub income: f64,
    pub bonuses: Bonuses,
}

pub fn level_factor(level: u32) -> f64 {
    1.0 + level as f64 * 0.1
}

/// Folds every occupied team slot into `Bonuses`, in slot order.
///
/// The bonus category comes from the catalog when it is online and falls
/// back to the species-id rule otherwise.
pub fn compute_bonuses(state: &PlayerState, creatures: &CreatureRegistry) -> Bonuses {
    let mut bonuses = Bonuses::default();
    for creature in state.team_creatures() {
        let id = creature.catalog_id;
        let category = creatures
            .get(id)
            .map(|def| def.bonus_category)
            .unwrap_or_else(|| BonusCategory::for_species(id));
        let factor = level_factor(creature.level);

        if category.is_additive() {
            let add = id as f64 / 2.0 * factor;
            match category {
                BonusCategory::ClickPower => bonuses.click_power_add += add,
                _ => bonuses.auto_income_add += add,
            }
        } else {
            let mult = (1.1 + id as f64 / 1000.0) * factor;
            match category {
                BonusCategory::ClickMult => bonuses.click_mult *= mult,
                BonusCategory::CoinMult => bonuses.coin_mult *= mult,
                BonusCategory::XpMult => bonuses.xp_mult *= mult,
                _ => bonuses.global_mult *= mult,
            }
        }
    }
    bonuses
}

/// Instantaneous click gain and passive income per tick.
pub fn compute_power(state: &PlayerState, creatures: &CreatureRegistry) -> Power {
    let bonuses = compute_bonuses(state, creatures);
    let click = (state.click_power + bonuses.click_power_add)
        * state.multiplier
        * aggregate_multiplier(state)
        * bonuses.click_mult
        * bonuses.global_mult;
    let income = (state.auto_income + bonuses.auto_income_add)
        * state.multiplier
        * bonuses.coin_mult
        * bonuses.global_mult;
    Power { click, income, bonuses }
}
