use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use std::time::Duration;

use clickdex::catalog::{BuiltinCatalog, CatalogPlugin, CatalogSource, RonCatalog};
use clickdex::collection::CollectionPlugin;
use clickdex::config::GameConfig;
use clickdex::data::DataPlugin;
use clickdex::economy::EconomyPlugin;
use clickdex::engine::{ClockPlugin, EnginePlugin};
use clickdex::input::{ConsoleInput, ConsolePlugin, HELP};
use clickdex::items::ItemsPlugin;
use clickdex::progression::EvolutionPlugin;
use clickdex::quests::QuestPlugin;
use clickdex::random_events::RandomEventsPlugin;
use clickdex::save::SavePlugin;
use clickdex::shared::*;

fn main() {
    let config = GameConfig::from_env();

    let catalog = match &config.creature_catalog {
        Some(path) => CatalogSource::new(RonCatalog::new(path)),
        None => CatalogSource::new(BuiltinCatalog),
    };
    let rng = match config.rng_seed {
        Some(seed) => GameRng::seeded(seed),
        None => GameRng::default(),
    };

    println!("Clickdex\n{HELP}");

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 30.0,
            ))),
            LogPlugin::default(),
            StatesPlugin,
        ))
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .insert_resource(config)
        .insert_resource(catalog)
        .insert_resource(rng)
        .init_resource::<GameClock>()
        .init_resource::<PlayerState>()
        // Action events
        .add_event::<ClickEvent>()
        .add_event::<PurchaseRequestEvent>()
        .add_event::<ClaimQuestEvent>()
        .add_event::<UseItemEvent>()
        .add_event::<GachaPullEvent>()
        .add_event::<AssignTeamEvent>()
        .add_event::<RemoveTeamEvent>()
        .add_event::<SaveRequestEvent>()
        .add_event::<LoadRequestEvent>()
        .add_event::<ResetRequestEvent>()
        // Outcome events
        .add_event::<LevelUpEvent>()
        .add_event::<CreatureLevelUpEvent>()
        .add_event::<EvolutionEvent>()
        .add_event::<QuestProgressEvent>()
        .add_event::<QuestCompletedEvent>()
        .add_event::<SaveCompleteEvent>()
        .add_event::<LoadCompleteEvent>()
        // Domain plugins
        .add_plugins((
            ClockPlugin,
            EnginePlugin,
            DataPlugin,
            CatalogPlugin,
            EconomyPlugin,
            QuestPlugin,
            RandomEventsPlugin,
            ItemsPlugin,
            CollectionPlugin,
            EvolutionPlugin,
            SavePlugin,
            ConsolePlugin,
        ))
        .insert_resource(ConsoleInput::spawn_stdin_reader())
        .run();
}
