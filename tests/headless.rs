//! Headless integration tests for Clickdex.
//!
//! These tests exercise the economy's ECS wiring without a terminal or
//! wall clock. They use Bevy's `MinimalPlugins` to tick the app, drive
//! `GameClock` by hand, and seed `GameRng` so every roll is reproducible.
//!
//! Run with: `cargo test --test headless`

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use std::path::PathBuf;
use std::time::Duration;

use clickdex::catalog::{CatalogPlugin, CatalogSource, RonCatalog};
use clickdex::collection::CollectionPlugin;
use clickdex::config::GameConfig;
use clickdex::data::DataPlugin;
use clickdex::economy::EconomyPlugin;
use clickdex::effects::add_effect;
use clickdex::engine::EnginePlugin;
use clickdex::items::{add_item, ItemsPlugin};
use clickdex::progression::EvolutionPlugin;
use clickdex::quests::QuestPlugin;
use clickdex::random_events::RandomEventsPlugin;
use clickdex::save::{self, SavePlugin};
use clickdex::shared::*;

const T0: u64 = 1_700_000_000_000;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

fn test_save_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("clickdex_headless_{}_{name}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

/// Every roll disabled and autosave off; tests opt in to what they need.
fn quiet_config(name: &str) -> GameConfig {
    GameConfig {
        event_chance: 0.0,
        item_drop_chance: 0.0,
        autosave_interval_ms: 0,
        save_path: test_save_path(name),
        rng_seed: Some(42),
        ..Default::default()
    }
}

/// Builds a minimal Bevy app with all shared resources, events and domain
/// plugins registered (mirrors main.rs) but no wall clock and no console.
fn build_test_app(config: GameConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);

    // ── Game State ───────────────────────────────────────────────────────
    app.init_state::<GameState>();

    // ── Shared Resources (mirrors main.rs) ───────────────────────────────
    app.insert_resource(GameRng::seeded(config.rng_seed.unwrap_or(0)))
        .insert_resource(config)
        .insert_resource(GameClock::at(T0))
        .init_resource::<PlayerState>();

    // ── Action Events ────────────────────────────────────────────────────
    app.add_event::<ClickEvent>()
        .add_event::<PurchaseRequestEvent>()
        .add_event::<ClaimQuestEvent>()
        .add_event::<UseItemEvent>()
        .add_event::<GachaPullEvent>()
        .add_event::<AssignTeamEvent>()
        .add_event::<RemoveTeamEvent>()
        .add_event::<SaveRequestEvent>()
        .add_event::<LoadRequestEvent>()
        .add_event::<ResetRequestEvent>();

    // ── Outcome Events ───────────────────────────────────────────────────
    app.add_event::<LevelUpEvent>()
        .add_event::<CreatureLevelUpEvent>()
        .add_event::<EvolutionEvent>()
        .add_event::<QuestProgressEvent>()
        .add_event::<QuestCompletedEvent>()
        .add_event::<SaveCompleteEvent>()
        .add_event::<LoadCompleteEvent>();

    app.add_plugins((
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
    ));

    app
}

/// Runs Loading and lands in Playing with the clock at `T0`.
fn boot(app: &mut App) {
    app.update();
    app.update();
    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::Playing
    );
}

fn wait_for_catalog(app: &mut App) {
    for _ in 0..500 {
        if app.world().resource::<CreatureRegistry>().status != CatalogStatus::Loading {
            return;
        }
        std::thread::sleep(Duration::from_millis(2));
        app.update();
    }
    panic!("creature catalog never resolved");
}

fn set_clock(app: &mut App, now_ms: u64) {
    app.world_mut().resource_mut::<GameClock>().now_ms = now_ms;
}

fn state(app: &App) -> &PlayerState {
    app.world().resource::<PlayerState>()
}

fn state_mut(app: &mut App) -> Mut<'_, PlayerState> {
    app.world_mut().resource_mut::<PlayerState>()
}

fn quest_progress(app: &App, id: &str) -> f64 {
    state(app).quest(id).map(|q| q.progress).unwrap_or(-1.0)
}

fn drain<E: Event>(app: &mut App) -> Vec<E> {
    app.world_mut().resource_mut::<Events<E>>().drain().collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Startup
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_boot_populates_registries_and_seeds_quests() {
    let mut app = build_test_app(quiet_config("boot"));
    boot(&mut app);

    let quests = app.world().resource::<QuestRegistry>().quests.len();
    assert!(quests > 0);
    assert_eq!(state(&app).quests.len(), quests);
    assert_eq!(app.world().resource::<Shop>().listings.len(), 4);
    assert!(state(&app).log.latest().unwrap().contains("A new adventure begins!"));
}

#[test]
fn test_corrupt_save_on_startup_starts_fresh() {
    let config = quiet_config("corrupt_boot");
    std::fs::write(&config.save_path, "{\"state\": [1, 2").unwrap();
    let mut app = build_test_app(config.clone());
    boot(&mut app);

    assert_eq!(state(&app).coins, 0.0);
    assert_eq!(state(&app).level, 1);
    assert!(state(&app).log.latest().unwrap().contains("unreadable"));
    let _ = std::fs::remove_file(&config.save_path);
}

#[test]
fn test_existing_save_is_restored_on_startup() {
    let config = quiet_config("restore_boot");
    std::fs::write(
        &config.save_path,
        r#"{"version":1,"savedAt":0,"state":{"coins":321,"score":999,"clickPower":4},"shopOwnership":[{"id":"protein","owned":3}]}"#,
    )
    .unwrap();
    let mut app = build_test_app(config.clone());
    boot(&mut app);

    assert_eq!(state(&app).coins, 321.0);
    assert_eq!(state(&app).click_power, 4.0);
    assert_eq!(app.world().resource::<Shop>().get("protein").unwrap().owned, 3);
    assert_eq!(app.world().resource::<Shop>().get("exp_share").unwrap().owned, 0);
    let _ = std::fs::remove_file(&config.save_path);
}

// ─────────────────────────────────────────────────────────────────────────────
// Clicks & ticks
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_clicks_pay_out_and_track_quest() {
    let mut app = build_test_app(quiet_config("clicks"));
    boot(&mut app);

    for _ in 0..3 {
        app.world_mut().send_event(ClickEvent);
    }
    app.update();

    assert_eq!(state(&app).coins, 3.0);
    assert_eq!(state(&app).score, 3.0);
    assert_eq!(quest_progress(&app, "first_taps"), 3.0);
}

#[test]
fn test_click_effect_expires_on_time() {
    let mut app = build_test_app(quiet_config("click_effect"));
    boot(&mut app);
    add_effect(&mut state_mut(&mut app), EffectKind::Boost, 2.0, 5000, T0);

    set_clock(&mut app, T0 + 4999);
    app.world_mut().send_event(ClickEvent);
    app.update();
    assert_eq!(state(&app).coins, 2.0);

    set_clock(&mut app, T0 + 5001);
    app.world_mut().send_event(ClickEvent);
    app.update();
    assert_eq!(state(&app).coins, 3.0);
    assert!(state(&app).effects.is_empty());
}

#[test]
fn test_tick_pays_passive_income() {
    let mut app = build_test_app(quiet_config("tick_income"));
    boot(&mut app);
    state_mut(&mut app).auto_income = 2.0;

    set_clock(&mut app, T0 + 999);
    app.update();
    assert_eq!(state(&app).coins, 0.0);

    set_clock(&mut app, T0 + 1000);
    app.update();
    assert_eq!(state(&app).coins, 2.0);
}

#[test]
fn test_long_pause_pays_one_tick_not_backlog() {
    let mut app = build_test_app(quiet_config("tick_resync"));
    boot(&mut app);
    state_mut(&mut app).auto_income = 1.0;

    set_clock(&mut app, T0 + 60_000);
    app.update();
    app.update();
    assert_eq!(state(&app).coins, 1.0);
}

#[test]
fn test_level_up_feeds_level_quest() {
    let mut app = build_test_app(quiet_config("level_quest"));
    boot(&mut app);
    state_mut(&mut app).click_power = 250.0;

    app.world_mut().send_event(ClickEvent);
    app.update();

    assert_eq!(state(&app).level, 2);
    assert_eq!(state(&app).xp, 150.0);
    assert_eq!(quest_progress(&app, "rising_trainer"), 1.0);
    let levels: Vec<u32> = drain::<LevelUpEvent>(&mut app).iter().map(|e| e.level).collect();
    assert_eq!(levels, vec![2]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Shop & quests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_purchase_flow() {
    let mut app = build_test_app(quiet_config("purchase"));
    boot(&mut app);
    state_mut(&mut app).coins = 20.0;

    app.world_mut().send_event(PurchaseRequestEvent { item_id: "protein".into() });
    app.update();

    assert_eq!(state(&app).coins, 0.0);
    assert_eq!(state(&app).click_power, 2.0);
    assert_eq!(app.world().resource::<Shop>().get("protein").unwrap().owned, 1);
    assert_eq!(quest_progress(&app, "regular_customer"), 1.0);
}

#[test]
fn test_unaffordable_purchase_changes_nothing() {
    let mut app = build_test_app(quiet_config("purchase_poor"));
    boot(&mut app);
    state_mut(&mut app).coins = 10.0;

    app.world_mut().send_event(PurchaseRequestEvent { item_id: "protein".into() });
    app.update();

    assert_eq!(state(&app).coins, 10.0);
    assert_eq!(state(&app).click_power, 1.0);
    assert_eq!(app.world().resource::<Shop>().get("protein").unwrap().owned, 0);
    assert_eq!(quest_progress(&app, "regular_customer"), 0.0);
    assert!(state(&app).log.latest().unwrap().contains("Not enough coins"));
}

#[test]
fn test_quest_completes_and_claims_once() {
    let mut app = build_test_app(quiet_config("claim"));
    boot(&mut app);

    for _ in 0..100 {
        app.world_mut().send_event(ClickEvent);
    }
    app.update();
    assert!(state(&app).quest("first_taps").unwrap().is_completed);
    let completed: Vec<String> = drain::<QuestCompletedEvent>(&mut app)
        .into_iter()
        .map(|e| e.quest_id)
        .collect();
    assert!(completed.contains(&"first_taps".to_string()));

    let coins_before = state(&app).coins;
    app.world_mut().send_event(ClaimQuestEvent { quest_id: "first_taps".into() });
    app.update();
    app.world_mut().send_event(ClaimQuestEvent { quest_id: "first_taps".into() });
    app.update();

    assert_eq!(state(&app).coins, coins_before + 50.0);
    assert_eq!(state(&app).quest("first_taps").unwrap().status(), QuestStatus::Claimed);
}

// ─────────────────────────────────────────────────────────────────────────────
// Random events & items
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_event_fires_on_interval() {
    let mut app = build_test_app(GameConfig {
        event_chance: 1.0,
        ..quiet_config("events")
    });
    boot(&mut app);

    set_clock(&mut app, T0 + 9_999);
    app.update();
    assert!(state(&app).active_events.is_empty());

    set_clock(&mut app, T0 + 10_000);
    app.update();
    let s = state(&app);
    assert_eq!(s.active_events.len(), 1);
    assert!(s.coins > 0.0 || !s.effects.is_empty());
}

#[test]
fn test_item_drops_and_use() {
    let mut app = build_test_app(GameConfig {
        item_drop_chance: 1.0,
        ..quiet_config("drops")
    });
    boot(&mut app);

    set_clock(&mut app, T0 + 1000);
    app.update();
    let inventory = state(&app).inventory.clone();
    assert_eq!(inventory.len(), 1);
    assert_eq!(inventory[0].count, 1);

    app.world_mut().send_event(UseItemEvent { item_id: inventory[0].item_id.clone() });
    app.update();
    assert!(state(&app).inventory.is_empty());
    assert_eq!(quest_progress(&app, "item_user"), 1.0);
}

#[test]
fn test_using_missing_item_is_silent() {
    let mut app = build_test_app(quiet_config("missing_item"));
    boot(&mut app);
    let log_len = state(&app).log.len();

    app.world_mut().send_event(UseItemEvent { item_id: "nugget".into() });
    app.update();

    assert_eq!(state(&app).coins, 0.0);
    assert_eq!(state(&app).log.len(), log_len);
    assert_eq!(quest_progress(&app, "item_user"), 0.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Collectibles
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_gacha_pull_through_events() {
    let mut app = build_test_app(quiet_config("gacha"));
    boot(&mut app);
    wait_for_catalog(&mut app);
    state_mut(&mut app).coins = 500.0;

    app.world_mut().send_event(GachaPullEvent);
    app.update();

    let s = state(&app);
    assert_eq!(s.collection.len(), 1);
    assert_eq!(s.coins, 0.0);
    assert_eq!(s.gacha_price, 750.0);
    assert!(s.quest("first_catch").unwrap().is_completed);
}

#[test]
fn test_unavailable_catalog_degrades_gracefully() {
    let mut app = build_test_app(quiet_config("no_catalog"));
    app.insert_resource(CatalogSource::new(RonCatalog::new("/nonexistent/creatures.ron")));
    boot(&mut app);
    wait_for_catalog(&mut app);
    assert_eq!(
        app.world().resource::<CreatureRegistry>().status,
        CatalogStatus::Unavailable
    );

    state_mut(&mut app).coins = 1000.0;
    app.world_mut().send_event(GachaPullEvent);
    app.world_mut().send_event(ClickEvent);
    app.update();

    let s = state(&app);
    assert!(s.collection.is_empty());
    assert_eq!(s.coins, 1001.0);
    assert_eq!(s.gacha_price, STARTING_GACHA_PRICE);
}

#[test]
fn test_team_level_up_evolves_in_place() {
    let mut app = build_test_app(quiet_config("evolution"));
    boot(&mut app);
    wait_for_catalog(&mut app);

    let uid = {
        let mut s = state_mut(&mut app);
        let uid = s.allocate_uid();
        s.collection.push(OwnedCreature { catalog_id: 4, uid, exp: 0.0, level: 15 });
        uid
    };
    app.world_mut().send_event(AssignTeamEvent { uid });
    app.update();
    assert_eq!(state(&app).team[0], Some(uid));

    // A tenth of the click reaches the team: 7,500 exp takes level 15 → 16.
    state_mut(&mut app).click_power = 75_000.0;
    app.world_mut().send_event(ClickEvent);
    app.update();
    assert_eq!(state(&app).creature(uid).unwrap().level, 16);

    let mut evolved = false;
    for _ in 0..500 {
        if state(&app).creature(uid).unwrap().catalog_id == 5 {
            evolved = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
        app.update();
    }
    assert!(evolved, "Charmander should evolve into Charmeleon");
    let creature = state(&app).creature(uid).unwrap();
    assert_eq!(creature.uid, uid);
    assert_eq!(creature.level, 16);
    assert_eq!(state(&app).team[0], Some(uid));
}

#[test]
fn test_remove_from_team_through_events() {
    let mut app = build_test_app(quiet_config("team_rm"));
    boot(&mut app);
    let uid = {
        let mut s = state_mut(&mut app);
        let uid = s.allocate_uid();
        s.collection.push(OwnedCreature { catalog_id: 1, uid, exp: 0.0, level: 1 });
        uid
    };
    app.world_mut().send_event(AssignTeamEvent { uid });
    app.update();
    app.world_mut().send_event(RemoveTeamEvent { slot: 0 });
    app.world_mut().send_event(RemoveTeamEvent { slot: 40 });
    app.update();

    assert!(state(&app).team.iter().all(Option::is_none));
    assert_eq!(state(&app).collection.len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────────────────────

fn populated_state(app: &mut App) -> PlayerState {
    let mut s = state_mut(app);
    s.score = 12_345.5;
    s.coins = 678.25;
    s.click_power = 7.0;
    s.multiplier = 1.5;
    s.auto_income = 4.0;
    s.level = 6;
    s.xp = 42.0;
    add_effect(&mut s, EffectKind::Frenzy, 3.0, 10_000, T0);
    s.active_events.push(EventMarker { icon: "🔥".into(), expires_at: T0 + 10_000 });
    add_item(&mut s, "nugget", 2);
    add_item(&mut s, "rare_candy", 1);
    let uid = s.allocate_uid();
    s.collection.push(OwnedCreature { catalog_id: 25, uid, exp: 120.0, level: 3 });
    s.team[2] = Some(uid);
    s.gacha_price = 750.0;
    s.quests[0].progress = 100.0;
    s.quests[0].is_completed = true;
    s.quests[1].progress = 400.0;
    s.log(T0, "snapshot");
    s.clone()
}

#[test]
fn test_codec_round_trip_is_lossless() {
    let mut app = build_test_app(quiet_config("codec"));
    boot(&mut app);
    let original = populated_state(&mut app);
    app.world_mut().resource_mut::<Shop>().get_mut("macho_brace").unwrap().owned = 2;

    let world = app.world_mut();
    let json = {
        let shop = world.resource::<Shop>();
        save::serialize(&original, shop, T0).unwrap()
    };
    let quests = world.resource::<QuestRegistry>().clone();
    let mut shop = world.resource::<Shop>().clone();
    shop.reset_ownership();

    let restored = save::deserialize(&json, &quests, &mut shop, T0).unwrap();
    assert_eq!(restored, original);
    assert_eq!(shop.get("macho_brace").unwrap().owned, 2);
}

#[test]
fn test_save_then_load_through_events() {
    let config = quiet_config("save_load");
    let path = config.save_path.clone();
    let mut app = build_test_app(config);
    boot(&mut app);
    let original = populated_state(&mut app);
    app.world_mut().resource_mut::<Shop>().get_mut("protein").unwrap().owned = 5;

    app.world_mut().send_event(SaveRequestEvent);
    app.update();
    let saves = drain::<SaveCompleteEvent>(&mut app);
    assert!(saves.iter().any(|e| e.success));
    assert!(path.exists());

    {
        let mut s = state_mut(&mut app);
        s.coins = 0.0;
        s.collection.clear();
    }
    app.world_mut().resource_mut::<Shop>().get_mut("protein").unwrap().owned = 0;

    app.world_mut().send_event(LoadRequestEvent);
    app.update();

    let s = state(&app);
    assert_eq!(s.coins, original.coins);
    assert_eq!(s.collection, original.collection);
    assert_eq!(s.team, original.team);
    assert_eq!(s.inventory, original.inventory);
    assert_eq!(app.world().resource::<Shop>().get("protein").unwrap().owned, 5);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_reset_clears_progress_and_file() {
    let config = quiet_config("reset");
    let path = config.save_path.clone();
    let mut app = build_test_app(config);
    boot(&mut app);
    state_mut(&mut app).coins = 20.0;
    app.world_mut().send_event(PurchaseRequestEvent { item_id: "protein".into() });
    app.world_mut().send_event(SaveRequestEvent);
    app.update();
    assert!(path.exists());

    app.world_mut().send_event(ResetRequestEvent);
    app.update();

    let s = state(&app);
    assert_eq!(s.click_power, 1.0);
    assert_eq!(s.coins, 0.0);
    assert_eq!(s.quests.len(), app.world().resource::<QuestRegistry>().quests.len());
    assert_eq!(app.world().resource::<Shop>().get("protein").unwrap().owned, 0);
    assert!(!path.exists());
}

#[test]
fn test_autosave_writes_on_interval() {
    let config = GameConfig {
        autosave_interval_ms: 60_000,
        ..quiet_config("autosave")
    };
    let path = config.save_path.clone();
    let mut app = build_test_app(config);
    boot(&mut app);
    assert!(!path.exists());

    set_clock(&mut app, T0 + 60_000);
    app.update();
    assert!(path.exists());
    let _ = std::fs::remove_file(&path);
}
