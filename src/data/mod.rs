//! Data layer: populates the static registries at game startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), fills Shop, QuestRegistry,
//! ItemRegistry and EventRegistry from the hard-coded game-design data in the
//! submodules, then transitions the game into GameState::Playing.
//!
//! Creatures are not seeded here; they come from the catalog provider.

mod events;
mod items;
mod quests;
mod shops;

pub use events::populate_events;
pub use items::populate_items;
pub use quests::populate_quests;
pub use shops::populate_shop;

use bevy::prelude::*;
use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Shop>()
            .init_resource::<QuestRegistry>()
            .init_resource::<ItemRegistry>()
            .init_resource::<EventRegistry>()
            .add_systems(
                OnEnter(GameState::Loading),
                load_all_data.in_set(LoadingSet::Catalogs),
            );
    }
}

fn load_all_data(
    mut shop: ResMut<Shop>,
    mut quest_registry: ResMut<QuestRegistry>,
    mut item_registry: ResMut<ItemRegistry>,
    mut event_registry: ResMut<EventRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("[Data] populating registries…");

    populate_shop(&mut shop);
    info!("  Shop upgrades loaded: {}", shop.listings.len());

    populate_quests(&mut quest_registry);
    info!("  Quests loaded: {}", quest_registry.quests.len());

    populate_items(&mut item_registry);
    info!("  Items loaded: {}", item_registry.items.len());

    populate_events(&mut event_registry);
    info!("  Random events loaded: {}", event_registry.events.len());

    info!("[Data] all registries populated. Transitioning to Playing.");
    next_state.set(GameState::Playing);
}
