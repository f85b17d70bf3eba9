use bevy::prelude::*;
use crate::shared::*;

use super::coins::format_coins;

// ─────────────────────────────────────────────────────────────────────────────
// Pricing
// ─────────────────────────────────────────────────────────────────────────────

/// `ceil(base * growth^owned)`. Strictly increasing in `owned` for growth > 1.
pub fn cost_at(base_cost: f64, cost_growth: f64, owned: u32) -> f64 {
    (base_cost * cost_growth.powi(owned as i32)).ceil()
}

pub fn listing_cost(listing: &ShopListing) -> f64 {
    cost_at(listing.def.base_cost, listing.def.cost_growth, listing.owned)
}

pub fn apply_stat_effect(state: &mut PlayerState, effect: &StatEffect) {
    match effect.stat {
        Stat::ClickPower => state.click_power += effect.delta,
        Stat::AutoIncome => state.auto_income += effect.delta,
        Stat::Multiplier => state.multiplier += effect.delta,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Purchase
// ─────────────────────────────────────────────────────────────────────────────

/// Buys one level of an upgrade and returns the price paid.
///
/// Nothing changes on failure: unknown ids are `InvalidReference`, a short
/// balance is `InsufficientFunds`.
pub fn buy(state: &mut PlayerState, shop: &mut Shop, item_id: &str, now_ms: u64) -> Result<f64, GameError> {
    let listing = shop
        .get_mut(item_id)
        .ok_or_else(|| GameError::InvalidReference(format!("shop item '{item_id}'")))?;
    let cost = listing_cost(listing);
    if state.coins < cost {
        return Err(GameError::InsufficientFunds {
            needed: cost,
            available: state.coins,
        });
    }

    state.coins -= cost;
    listing.owned += 1;
    for effect in &listing.def.effects {
        apply_stat_effect(state, effect);
    }
    state.log(
        now_ms,
        format!("Bought {} for {} coins", listing.def.name, format_coins(cost)),
    );
    Ok(cost)
}

/// Processes PurchaseRequestEvents through `buy`.
pub fn handle_purchase_requests(
    mut requests: EventReader<PurchaseRequestEvent>,
    mut state: ResMut<PlayerState>,
    mut shop: ResMut<Shop>,
    clock: Res<GameClock>,
    mut progress: EventWriter<QuestProgressEvent>,
) {
    for ev in requests.read() {
        match buy(&mut state, &mut shop, &ev.item_id, clock.now_ms) {
            Ok(cost) => {
                info!(
                    "[Economy] Bought '{}' for {}. Remaining coins: {}",
                    ev.item_id,
                    format_coins(cost),
                    format_coins(state.coins)
                );
                progress.send(QuestProgressEvent::new(QuestKind::Buy, 1.0));
            }
            Err(GameError::InsufficientFunds { needed, available }) => {
                info!(
                    "[Economy] Cannot afford '{}' (need {}, have {})",
                    ev.item_id,
                    format_coins(needed),
                    format_coins(available)
                );
                state.log(
                    clock.now_ms,
                    format!("Not enough coins (need {})", format_coins(needed)),
                );
            }
            Err(e) => warn!("[Economy] Buy failed: {e}"),
        }
    }
}
