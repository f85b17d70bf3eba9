//! Progression engine: the one entry point every gain flows through, plus
//! trainer and creature leveling.
//!
//! Clicks, passive income, windfalls and coin items all call `apply_gain`,
//! so score, coins, xp and team experience always move together.

pub mod evolution;

use bevy::prelude::*;

use crate::bonuses::compute_bonuses;
use crate::shared::*;

pub use evolution::{
    apply_evolution_patch, check_evolution, resolve_evolution, EvolutionPatch, EvolutionPlugin,
    PendingEvolutions,
};

/// What a gain changed beyond the counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GainOutcome {
    /// Every trainer level reached, in order.
    pub new_levels: Vec<u32>,
    pub creature_level_ups: Vec<CreatureLevelUp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatureLevelUp {
    pub uid: CreatureUid,
    pub catalog_id: u32,
    pub level: u32,
}

impl GainOutcome {
    pub fn is_empty(&self) -> bool {
        self.new_levels.is_empty() && self.creature_level_ups.is_empty()
    }

    pub fn merge(&mut self, other: GainOutcome) {
        self.new_levels.extend(other.new_levels);
        self.creature_level_ups.extend(other.creature_level_ups);
    }
}

pub fn xp_to_next(level: u32) -> f64 {
    XP_PER_TRAINER_LEVEL * level as f64
}

pub fn creature_xp_to_next(level: u32) -> f64 {
    XP_PER_CREATURE_LEVEL * level as f64
}

/// Adds `amount` to score and coins, `amount * xp_mult * global_mult` to
/// trainer xp, and a tenth of `amount` to every team creature. Negative amounts count as 0.
pub fn apply_gain(
    state: &mut PlayerState,
    amount: f64,
    creatures: &CreatureRegistry,
    now_ms: u64,
) -> GainOutcome {
    let amount = amount.max(0.0);
    let bonuses = compute_bonuses(state, creatures);

    state.score += amount;
    state.coins += amount;
    state.xp += amount * bonuses.xp_mult * bonuses.global_mult;

    let mut outcome = GainOutcome {
        new_levels: try_level_up(state, now_ms),
        creature_level_ups: Vec::new(),
    };

    let share = amount * TEAM_XP_SHARE;
    if share > 0.0 {
        outcome.creature_level_ups = give_team_xp(state, share, creatures, now_ms);
    }
    outcome
}

/// Consumes xp level by level. Each level grants +1 click power and +0.05
/// multiplier and writes one log line.
pub fn try_level_up(state: &mut PlayerState, now_ms: u64) -> Vec<u32> {
    let mut gained = Vec::new();
    while state.xp >= xp_to_next(state.level) {
        state.xp -= xp_to_next(state.level);
        state.level += 1;
        state.click_power += LEVEL_UP_CLICK_POWER;
        state.multiplier += LEVEL_UP_MULTIPLIER;
        let level = state.level;
        state.log(now_ms, format!("Trainer reached level {level}!"));
        gained.push(level);
    }
    gained
}

/// Grants experience to one creature and returns every level it reached.
pub fn give_creature_xp(creature: &mut OwnedCreature, amount: f64) -> Vec<u32> {
    creature.exp += amount.max(0.0);
    let mut reached = Vec::new();
    while creature.exp >= creature_xp_to_next(creature.level) {
        creature.exp -= creature_xp_to_next(creature.level);
        creature.level += 1;
        reached.push(creature.level);
    }
    reached
}

/// Gives `amount` to each occupied team slot, logging level-ups by name.
pub fn give_team_xp(
    state: &mut PlayerState,
    amount: f64,
    creatures: &CreatureRegistry,
    now_ms: u64,
) -> Vec<CreatureLevelUp> {
    let uids: Vec<CreatureUid> = state.team.iter().flatten().copied().collect();
    let mut level_ups = Vec::new();
    for uid in uids {
        let Some(creature) = state.creature_mut(uid) else {
            continue;
        };
        let catalog_id = creature.catalog_id;
        for level in give_creature_xp(creature, amount) {
            level_ups.push(CreatureLevelUp { uid, catalog_id, level });
        }
    }
    for up in &level_ups {
        let name = creatures.name_of(up.catalog_id);
        state.log(now_ms, format!("{name} grew to level {}!", up.level));
    }
    level_ups
}

/// Forwards a gain's side effects as outcome events.
pub fn emit_gain_outcome(
    outcome: &GainOutcome,
    level_ups: &mut EventWriter<LevelUpEvent>,
    creature_level_ups: &mut EventWriter<CreatureLevelUpEvent>,
) {
    for &level in &outcome.new_levels {
        info!("[Progression] trainer level {level}");
        level_ups.send(LevelUpEvent { level });
    }
    for up in &outcome.creature_level_ups {
        creature_level_ups.send(CreatureLevelUpEvent {
            uid: up.uid,
            catalog_id: up.catalog_id,
            level: up.level,
        });
    }
}
