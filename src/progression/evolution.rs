//! Deferred evolution.
//!
//! A creature level-up commits immediately. The catalog lookup that decides
//! whether the creature evolves runs on the async compute pool and comes back
//! as an `EvolutionPatch`, which is re-validated against the current state
//! before it is applied. A late, failed or stale lookup only skips the
//! relabel; it never touches level or experience.

use bevy::prelude::*;
use bevy::tasks::futures_lite::future;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};
use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::{CatalogError, CatalogProvider, CatalogSource};
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolutionPatch {
    pub uid: CreatureUid,
    pub from_id: u32,
    pub to_id: u32,
    pub min_level: u32,
}

type LookupResult = Result<Option<EvolutionPatch>, CatalogError>;

#[derive(Resource, Default)]
pub struct PendingEvolutions {
    tasks: Vec<Task<LookupResult>>,
}

impl PendingEvolutions {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

pub struct EvolutionPlugin;

impl Plugin for EvolutionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingEvolutions>().add_systems(
            Update,
            (queue_evolution_checks, poll_evolution_tasks)
                .chain()
                .in_set(EconomySet::Outcomes),
        );
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// PURE RULES
// ──────────────────────────────────────────────────────────────────────────────

/// Asks the provider whether a creature of species `from_id` at `level`
/// evolves. Rules without a minimum level use `DEFAULT_EVOLUTION_LEVEL`.
pub fn resolve_evolution(
    provider: &dyn CatalogProvider,
    rule: &str,
    uid: CreatureUid,
    from_id: u32,
    level: u32,
) -> LookupResult {
    let rule = provider.evolution_rule(rule)?;
    let min_level = rule.min_level.unwrap_or(DEFAULT_EVOLUTION_LEVEL);
    if level < min_level {
        return Ok(None);
    }
    Ok(Some(EvolutionPatch {
        uid,
        from_id,
        to_id: rule.successor_id,
        min_level,
    }))
}

/// Applies a patch only if the creature still exists, is still the species
/// the lookup was made for, and still meets the level. Returns whether the
/// creature changed; a second application of the same patch returns false.
pub fn apply_evolution_patch(state: &mut PlayerState, patch: &EvolutionPatch) -> bool {
    let Some(creature) = state.creature_mut(patch.uid) else {
        return false;
    };
    if creature.catalog_id != patch.from_id || creature.level < patch.min_level {
        return false;
    }
    creature.catalog_id = patch.to_id;
    true
}

/// Synchronous lookup-and-apply for one creature.
pub fn check_evolution(
    state: &mut PlayerState,
    uid: CreatureUid,
    creatures: &CreatureRegistry,
    provider: &dyn CatalogProvider,
) -> Result<Option<EvolutionPatch>, GameError> {
    let creature = state
        .creature(uid)
        .ok_or_else(|| GameError::InvalidReference(format!("creature {uid}")))?;
    let Some(rule) = evolution_rule_of(creatures, creature.catalog_id)? else {
        return Ok(None);
    };
    let patch = resolve_evolution(provider, &rule, uid, creature.catalog_id, creature.level)?;
    Ok(patch.filter(|p| apply_evolution_patch(state, p)))
}

fn evolution_rule_of(creatures: &CreatureRegistry, catalog_id: u32) -> Result<Option<String>, GameError> {
    if !creatures.is_online() {
        return Err(GameError::DataUnavailable("creature catalog offline".into()));
    }
    Ok(creatures
        .get(catalog_id)
        .and_then(|def| def.evolution_rule.clone()))
}

// ──────────────────────────────────────────────────────────────────────────────
// SYSTEMS
// ──────────────────────────────────────────────────────────────────────────────

fn spawn_lookup(
    pending: &mut PendingEvolutions,
    provider: &Arc<dyn CatalogProvider>,
    rule: String,
    creature: &OwnedCreature,
) {
    let provider = Arc::clone(provider);
    let (uid, from_id, level) = (creature.uid, creature.catalog_id, creature.level);
    let task = AsyncComputeTaskPool::get()
        .spawn(async move { resolve_evolution(provider.as_ref(), &rule, uid, from_id, level) });
    pending.tasks.push(task);
}

/// One lookup per creature that leveled this frame, made against its current level.
fn queue_evolution_checks(
    mut events: EventReader<CreatureLevelUpEvent>,
    state: Res<PlayerState>,
    creatures: Res<CreatureRegistry>,
    source: Res<CatalogSource>,
    mut pending: ResMut<PendingEvolutions>,
) {
    let mut seen = HashSet::new();
    for event in events.read() {
        if !seen.insert(event.uid) {
            continue;
        }
        let Some(creature) = state.creature(event.uid) else {
            continue;
        };
        match evolution_rule_of(&creatures, creature.catalog_id) {
            Ok(Some(rule)) => spawn_lookup(&mut pending, &source.0, rule, creature),
            Ok(None) => {}
            Err(e) => debug!("[Evolution] skipped uid {}: {e}", event.uid),
        }
    }
}

fn poll_evolution_tasks(
    mut pending: ResMut<PendingEvolutions>,
    mut state: ResMut<PlayerState>,
    creatures: Res<CreatureRegistry>,
    source: Res<CatalogSource>,
    clock: Res<GameClock>,
    mut evolutions: EventWriter<EvolutionEvent>,
) {
    if pending.tasks.is_empty() {
        return;
    }

    let mut finished = Vec::new();
    pending.tasks.retain_mut(|task| match block_on(future::poll_once(task)) {
        Some(result) => {
            finished.push(result);
            false
        }
        None => true,
    });

    for result in finished {
        let patch = match result {
            Ok(Some(patch)) => patch,
            Ok(None) => continue,
            Err(e) => {
                warn!("[Evolution] lookup failed, no evolution this time: {e}");
                continue;
            }
        };
        if !apply_evolution_patch(&mut state, &patch) {
            debug!("[Evolution] discarded stale patch for uid {}", patch.uid);
            continue;
        }

        let from = creatures.name_of(patch.from_id);
        let to = creatures.name_of(patch.to_id);
        info!("[Evolution] uid {} {from} → {to}", patch.uid);
        state.log(clock.now_ms, format!("{from} evolved into {to}!"));
        evolutions.send(EvolutionEvent {
            uid: patch.uid,
            from_id: patch.from_id,
            to_id: patch.to_id,
        });

        // The new form may already qualify for its own evolution.
        if let (Some(creature), Ok(Some(rule))) = (
            state.creature(patch.uid),
            evolution_rule_of(&creatures, patch.to_id),
        ) {
            spawn_lookup(&mut pending, &source.0, rule, creature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{install_creatures, BuiltinCatalog};

    fn online_registry() -> CreatureRegistry {
        let mut registry = CreatureRegistry::default();
        install_creatures(&mut registry, BuiltinCatalog.list_creatures()).unwrap();
        registry
    }

    fn state_with(catalog_id: u32, level: u32) -> (PlayerState, CreatureUid) {
        let mut state = PlayerState::default();
        let uid = state.allocate_uid();
        state.collection.push(OwnedCreature { catalog_id, uid, exp: 0.0, level });
        (state, uid)
    }

    #[test]
    fn test_evolves_at_threshold() {
        let (mut state, uid) = state_with(4, 16);
        let patch = check_evolution(&mut state, uid, &online_registry(), &BuiltinCatalog).unwrap();
        assert_eq!(patch.map(|p| p.to_id), Some(5));
        let creature = state.creature(uid).unwrap();
        assert_eq!(creature.catalog_id, 5);
        assert_eq!(creature.uid, uid);
        assert_eq!(creature.level, 16);
    }

    #[test]
    fn test_below_threshold_keeps_species() {
        let (mut state, uid) = state_with(4, 15);
        let patch = check_evolution(&mut state, uid, &online_registry(), &BuiltinCatalog).unwrap();
        assert!(patch.is_none());
        assert_eq!(state.creature(uid).unwrap().catalog_id, 4);
    }

    #[test]
    fn test_missing_min_level_falls_back_to_default() {
        let patch = resolve_evolution(&BuiltinCatalog, "pikachu", 1, 25, 15).unwrap();
        assert!(patch.is_none());
        let patch = resolve_evolution(&BuiltinCatalog, "pikachu", 1, 25, 16).unwrap();
        assert_eq!(patch.map(|p| p.min_level), Some(DEFAULT_EVOLUTION_LEVEL));
    }

    #[test]
    fn test_patch_is_idempotent_and_validated() {
        let (mut state, uid) = state_with(1, 20);
        let patch = EvolutionPatch { uid, from_id: 1, to_id: 2, min_level: 16 };
        assert!(apply_evolution_patch(&mut state, &patch));
        assert!(!apply_evolution_patch(&mut state, &patch));
        assert_eq!(state.creature(uid).unwrap().catalog_id, 2);

        let gone = EvolutionPatch { uid: 999, ..patch };
        assert!(!apply_evolution_patch(&mut state, &gone));
    }

    #[test]
    fn test_offline_catalog_is_data_unavailable() {
        let (mut state, uid) = state_with(4, 40);
        let result = check_evolution(&mut state, uid, &CreatureRegistry::default(), &BuiltinCatalog);
        assert!(matches!(result, Err(GameError::DataUnavailable(_))));
        assert_eq!(state.creature(uid).unwrap().catalog_id, 4);
    }
}
