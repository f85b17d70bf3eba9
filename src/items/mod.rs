//! Inventory, item drops and item use.

use bevy::prelude::*;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::effects::add_effect;
use crate::progression::{apply_gain, emit_gain_outcome, give_team_xp, try_level_up, GainOutcome};
use crate::shared::*;

pub struct ItemsPlugin;

impl Plugin for ItemsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, handle_use_item.in_set(EconomySet::Actions));
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// INVENTORY
// ──────────────────────────────────────────────────────────────────────────────

pub fn add_item(state: &mut PlayerState, item_id: &str, count: u32) {
    if count == 0 {
        return;
    }
    match state.inventory.iter_mut().find(|s| s.item_id == item_id) {
        Some(stack) => stack.count = stack.count.saturating_add(count),
        None => state.inventory.push(ItemStack {
            item_id: item_id.to_string(),
            count,
        }),
    }
}

/// Takes one item; the stack disappears when it reaches zero.
pub fn remove_item(state: &mut PlayerState, item_id: &str) -> bool {
    let Some(index) = state.inventory.iter().position(|s| s.item_id == item_id) else {
        return false;
    };
    let stack = &mut state.inventory[index];
    stack.count -= 1;
    if stack.count == 0 {
        state.inventory.remove(index);
    }
    true
}

// ──────────────────────────────────────────────────────────────────────────────
// DROPS
// ──────────────────────────────────────────────────────────────────────────────

/// Chance gate, then a rarity-weighted pick across the registry.
pub fn roll_item_drop<'a>(
    registry: &'a ItemRegistry,
    chance: f64,
    rng: &mut impl Rng,
) -> Option<&'a ItemDef> {
    if !rng.gen_bool(probability(chance)) {
        return None;
    }
    let weights = registry.items.iter().map(|i| i.rarity.drop_weight());
    let dist = WeightedIndex::new(weights).ok()?;
    registry.items.get(dist.sample(rng))
}

// ──────────────────────────────────────────────────────────────────────────────
// USE
// ──────────────────────────────────────────────────────────────────────────────

/// Consumes one item and applies its effect.
///
/// `InvalidReference` when the item is unknown or not in the inventory.
pub fn use_item(
    state: &mut PlayerState,
    items: &ItemRegistry,
    creatures: &CreatureRegistry,
    item_id: &str,
    now_ms: u64,
) -> Result<GainOutcome, GameError> {
    let def = items
        .get(item_id)
        .ok_or_else(|| GameError::InvalidReference(format!("item '{item_id}'")))?;
    if !remove_item(state, item_id) {
        return Err(GameError::InvalidReference(format!("no '{item_id}' in inventory")));
    }

    let outcome = match def.effect {
        ItemEffect::Boost { kind, value, duration_ms } => {
            add_effect(state, kind, value, duration_ms, now_ms);
            GainOutcome::default()
        }
        ItemEffect::Coins(amount) => apply_gain(state, amount, creatures, now_ms),
        ItemEffect::TrainerXp(amount) => {
            state.xp += amount.max(0.0);
            GainOutcome {
                new_levels: try_level_up(state, now_ms),
                ..Default::default()
            }
        }
        ItemEffect::TeamXp(amount) => GainOutcome {
            creature_level_ups: give_team_xp(state, amount, creatures, now_ms),
            ..Default::default()
        },
    };
    state.log(now_ms, format!("Used {}", def.name));
    Ok(outcome)
}

#[allow(clippy::too_many_arguments)]
fn handle_use_item(
    mut requests: EventReader<UseItemEvent>,
    mut state: ResMut<PlayerState>,
    items: Res<ItemRegistry>,
    creatures: Res<CreatureRegistry>,
    clock: Res<GameClock>,
    mut progress: EventWriter<QuestProgressEvent>,
    mut level_ups: EventWriter<LevelUpEvent>,
    mut creature_level_ups: EventWriter<CreatureLevelUpEvent>,
) {
    for request in requests.read() {
        match use_item(&mut state, &items, &creatures, &request.item_id, clock.now_ms) {
            Ok(outcome) => {
                info!("[Items] used '{}'", request.item_id);
                emit_gain_outcome(&outcome, &mut level_ups, &mut creature_level_ups);
                progress.send(QuestProgressEvent::new(QuestKind::UseItem, 1.0));
                progress.send(QuestProgressEvent::coins_gauge());
            }
            Err(e) => debug!("[Items] use ignored: {e}"),
        }
    }
}
