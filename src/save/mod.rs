use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::config::GameConfig;
use crate::progression::try_level_up;
use crate::quests::seed_quests;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SAVE_VERSION: u32 = 1;

/// Shop owned counts live outside `PlayerState` but travel with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipEntry {
    pub id: String,
    pub owned: u32,
}

/// The persisted blob. Every field defaults, so files written by older
/// builds still decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveFile {
    pub version: u32,
    pub saved_at: u64,
    pub state: PlayerState,
    pub shop_ownership: Vec<OwnershipEntry>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct AutosaveTimer {
    pub last_save_ms: Option<u64>,
}

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutosaveTimer>()
            .add_systems(
                OnEnter(GameState::Loading),
                restore_on_startup.in_set(LoadingSet::Restore),
            )
            .add_systems(
                Update,
                (
                    autosave_on_interval,
                    handle_save_request,
                    handle_load_request,
                    handle_reset_request,
                )
                    .chain()
                    .in_set(EconomySet::Outcomes),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CODEC
// ═══════════════════════════════════════════════════════════════════════

pub fn serialize(state: &PlayerState, shop: &Shop, now_ms: u64) -> Result<String, GameError> {
    let file = SaveFile {
        version: SAVE_VERSION,
        saved_at: now_ms,
        state: state.clone(),
        shop_ownership: shop
            .listings
            .iter()
            .map(|l| OwnershipEntry {
                id: l.def.id.clone(),
                owned: l.owned,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&file).map_err(|e| GameError::Storage(io::Error::other(e)))
}

/// Decodes a save and restores shop ownership from it.
///
/// Parsing happens before anything is touched, so a corrupt blob leaves
/// `shop` as it was. Unknown shop ids are ignored; catalog ids missing from
/// the save come back at 0 owned.
pub fn deserialize(
    raw: &str,
    quests: &QuestRegistry,
    shop: &mut Shop,
    now_ms: u64,
) -> Result<PlayerState, GameError> {
    let file: SaveFile =
        serde_json::from_str(raw).map_err(|e| GameError::CorruptSave(e.to_string()))?;
    if file.version > SAVE_VERSION {
        warn!(
            "[Save] file has version {} but current version is {}. Attempting to load anyway.",
            file.version, SAVE_VERSION
        );
    }

    let mut state = file.state;
    normalize(&mut state, quests, now_ms);

    shop.reset_ownership();
    for entry in &file.shop_ownership {
        match shop.get_mut(&entry.id) {
            Some(listing) => listing.owned = entry.owned,
            None => debug!("[Save] ignoring unknown shop id '{}'", entry.id),
        }
    }
    Ok(state)
}

/// Repairs whatever schema drift or hand edits could leave behind.
pub fn normalize(state: &mut PlayerState, quests: &QuestRegistry, now_ms: u64) {
    seed_quests(state, quests);
    state.inventory.retain(|s| s.count > 0);

    state.team.resize(TEAM_SIZE, None);
    let mut seen = Vec::new();
    for slot in state.team.iter_mut() {
        let Some(uid) = *slot else { continue };
        let exists = state.collection.iter().any(|c| c.uid == uid);
        if !exists || seen.contains(&uid) {
            *slot = None;
        } else {
            seen.push(uid);
        }
    }

    let highest_id = state
        .collection
        .iter()
        .map(|c| c.uid)
        .chain(state.effects.iter().map(|e| e.id))
        .max()
        .unwrap_or(0);
    state.next_uid = state.next_uid.max(highest_id + 1);

    state.level = state.level.max(1);
    for creature in state.collection.iter_mut() {
        creature.level = creature.level.max(1);
    }
    try_level_up(state, now_ms);
}

/// Defaults with every quest seeded and shop ownership cleared.
pub fn fresh_state(quests: &QuestRegistry, shop: &mut Shop) -> PlayerState {
    let mut state = PlayerState::default();
    seed_quests(&mut state, quests);
    shop.reset_ownership();
    state
}

// ═══════════════════════════════════════════════════════════════════════
// STORAGE
// ═══════════════════════════════════════════════════════════════════════

pub fn write_save(path: &Path, json: &str) -> Result<(), GameError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// `Ok(None)` when there is no save yet.
pub fn read_save(path: &Path) -> Result<Option<String>, GameError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_save(path: &Path) -> Result<(), GameError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Reads and decodes the save at `path`. A missing file gives a fresh
/// state; a corrupt one gives a fresh state plus the error to report.
pub fn load_from_disk(
    path: &Path,
    quests: &QuestRegistry,
    shop: &mut Shop,
    now_ms: u64,
) -> (PlayerState, Result<bool, GameError>) {
    let decoded = read_save(path).and_then(|raw| match raw {
        Some(raw) => deserialize(&raw, quests, shop, now_ms).map(Some),
        None => Ok(None),
    });
    match decoded {
        Ok(Some(state)) => (state, Ok(true)),
        Ok(None) => (fresh_state(quests, shop), Ok(false)),
        Err(e) => (fresh_state(quests, shop), Err(e)),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

fn restore_on_startup(
    mut state: ResMut<PlayerState>,
    mut shop: ResMut<Shop>,
    quests: Res<QuestRegistry>,
    config: Res<GameConfig>,
    clock: Res<GameClock>,
) {
    let (loaded, outcome) = load_from_disk(&config.save_path, &quests, &mut shop, clock.now_ms);
    *state = loaded;
    match outcome {
        Ok(true) => {
            info!("[Save] restored '{}'", config.save_path.display());
            state.log(clock.now_ms, "Welcome back!");
        }
        Ok(false) => {
            info!("[Save] no save at '{}', starting fresh", config.save_path.display());
            state.log(clock.now_ms, "A new adventure begins!");
        }
        Err(e) => {
            warn!("[Save] {e}. Starting fresh.");
            state.log(clock.now_ms, "Save data was unreadable. Starting fresh.");
        }
    }
}

fn autosave_on_interval(
    mut timer: ResMut<AutosaveTimer>,
    config: Res<GameConfig>,
    clock: Res<GameClock>,
    mut save_writer: EventWriter<SaveRequestEvent>,
) {
    if config.autosave_interval_ms == 0 {
        return;
    }
    let Some(last) = timer.last_save_ms else {
        timer.last_save_ms = Some(clock.now_ms);
        return;
    };
    if clock.now_ms.saturating_sub(last) >= config.autosave_interval_ms {
        timer.last_save_ms = Some(clock.now_ms);
        debug!("[Save] autosave");
        save_writer.send(SaveRequestEvent);
    }
}

fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    mut complete_events: EventWriter<SaveCompleteEvent>,
    mut state: ResMut<PlayerState>,
    shop: Res<Shop>,
    config: Res<GameConfig>,
    clock: Res<GameClock>,
) {
    // Several requests in one frame collapse into one write.
    if save_events.read().count() == 0 {
        return;
    }

    let result = serialize(&state, &shop, clock.now_ms)
        .and_then(|json| write_save(&config.save_path, &json));
    match result {
        Ok(()) => {
            info!("[Save] wrote '{}'", config.save_path.display());
            complete_events.send(SaveCompleteEvent {
                success: true,
                error_message: None,
            });
        }
        Err(e) => {
            warn!("[Save] write FAILED: {e}");
            state.log(clock.now_ms, "Save failed!");
            complete_events.send(SaveCompleteEvent {
                success: false,
                error_message: Some(e.to_string()),
            });
        }
    }
}

fn handle_load_request(
    mut load_events: EventReader<LoadRequestEvent>,
    mut complete_events: EventWriter<LoadCompleteEvent>,
    mut state: ResMut<PlayerState>,
    mut shop: ResMut<Shop>,
    quests: Res<QuestRegistry>,
    config: Res<GameConfig>,
    clock: Res<GameClock>,
) {
    if load_events.read().count() == 0 {
        return;
    }

    let raw = match read_save(&config.save_path) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("[Save] nothing to load at '{}'", config.save_path.display());
            state.log(clock.now_ms, "No save found.");
            complete_events.send(LoadCompleteEvent {
                success: false,
                error_message: Some("no save file".into()),
            });
            return;
        }
        Err(e) => {
            warn!("[Save] read FAILED: {e}");
            complete_events.send(LoadCompleteEvent {
                success: false,
                error_message: Some(e.to_string()),
            });
            return;
        }
    };

    match deserialize(&raw, &quests, &mut shop, clock.now_ms) {
        Ok(loaded) => {
            *state = loaded;
            info!("[Save] load succeeded");
            state.log(clock.now_ms, "Game loaded.");
            complete_events.send(LoadCompleteEvent {
                success: true,
                error_message: None,
            });
        }
        Err(e) => {
            warn!("[Save] {e}. Resetting to defaults.");
            *state = fresh_state(&quests, &mut shop);
            state.log(clock.now_ms, "Save data was unreadable. Starting fresh.");
            complete_events.send(LoadCompleteEvent {
                success: false,
                error_message: Some(e.to_string()),
            });
        }
    }
}

fn handle_reset_request(
    mut reset_events: EventReader<ResetRequestEvent>,
    mut state: ResMut<PlayerState>,
    mut shop: ResMut<Shop>,
    quests: Res<QuestRegistry>,
    config: Res<GameConfig>,
    clock: Res<GameClock>,
) {
    if reset_events.read().count() == 0 {
        return;
    }
    if let Err(e) = delete_save(&config.save_path) {
        warn!("[Save] could not delete '{}': {e}", config.save_path.display());
    }
    *state = fresh_state(&quests, &mut shop);
    info!("[Save] progress reset");
    state.log(clock.now_ms, "Progress reset.");
}
