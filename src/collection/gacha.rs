use bevy::prelude::*;
use rand::Rng;

use crate::economy::coins::format_coins;
use crate::shared::*;

/// Base forms the player does not own yet, in catalog order.
pub fn unowned_base_forms<'a>(state: &PlayerState, creatures: &'a CreatureRegistry) -> Vec<&'a CreatureDef> {
    creatures
        .creatures
        .iter()
        .filter(|def| def.is_base_form && !state.owns_species(def.id))
        .collect()
}

/// Draws one not-yet-owned base form.
///
/// Every failure leaves coins and price untouched: catalog offline is
/// `DataUnavailable`, a short balance is `InsufficientFunds`, an empty pool
/// is `PoolExhausted`.
pub fn pull_gacha(
    state: &mut PlayerState,
    creatures: &CreatureRegistry,
    rng: &mut impl Rng,
    now_ms: u64,
) -> Result<OwnedCreature, GameError> {
    if !creatures.is_online() {
        return Err(GameError::DataUnavailable("creature catalog offline".into()));
    }
    let price = state.gacha_price;
    if state.coins < price {
        return Err(GameError::InsufficientFunds {
            needed: price,
            available: state.coins,
        });
    }
    let pool = unowned_base_forms(state, creatures);
    if pool.is_empty() {
        return Err(GameError::PoolExhausted);
    }
    let def = pool[rng.gen_range(0..pool.len())];

    state.coins -= price;
    state.gacha_price = (price * GACHA_PRICE_GROWTH).ceil();
    let creature = OwnedCreature {
        catalog_id: def.id,
        uid: state.allocate_uid(),
        exp: 0.0,
        level: 1,
    };
    state.collection.push(creature.clone());
    state.log(
        now_ms,
        format!("Caught {} [{}]!", def.name, def.rarity.letter()),
    );
    Ok(creature)
}

pub fn handle_gacha_pulls(
    mut requests: EventReader<GachaPullEvent>,
    mut state: ResMut<PlayerState>,
    mut rng: ResMut<GameRng>,
    creatures: Res<CreatureRegistry>,
    clock: Res<GameClock>,
    mut progress: EventWriter<QuestProgressEvent>,
) {
    for _ in requests.read() {
        match pull_gacha(&mut state, &creatures, &mut rng.0, clock.now_ms) {
            Ok(creature) => {
                info!(
                    "[Collection] pulled #{} (uid {}), next price {}",
                    creature.catalog_id,
                    creature.uid,
                    format_coins(state.gacha_price)
                );
                progress.send(QuestProgressEvent::new(QuestKind::Pull, 1.0));
            }
            Err(e) => {
                info!("[Collection] pull rejected: {e}");
                let message = match e {
                    GameError::InsufficientFunds { needed, .. } => {
                        format!("Not enough coins to pull (need {})", format_coins(needed))
                    }
                    GameError::PoolExhausted => "You already own every base form!".to_string(),
                    _ => "Creature data unavailable. Try again later.".to_string(),
                };
                state.log(clock.now_ms, message);
            }
        }
    }
}
