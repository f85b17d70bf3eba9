//! Quest tracker.
//!
//! Each quest instance moves Active → Completed → Claimed and never back.
//! Progress arrives as `QuestProgressEvent`s from the other domains and as
//! `LevelUpEvent`s; claims arrive as `ClaimQuestEvent`s.

use bevy::prelude::*;

use crate::progression::try_level_up;
use crate::shared::*;

pub struct QuestPlugin;

impl Plugin for QuestPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, handle_claim_requests.in_set(EconomySet::Actions))
            .add_systems(Update, apply_quest_progress.in_set(EconomySet::Quests));
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// PURE RULES
// ──────────────────────────────────────────────────────────────────────────────

/// Adds an instance for every definition the state does not track yet.
/// Existing instances keep their progress. Returns how many were added.
pub fn seed_quests(state: &mut PlayerState, registry: &QuestRegistry) -> usize {
    let mut added = 0;
    for def in &registry.quests {
        if state.quest(&def.id).is_some() {
            continue;
        }
        state.quests.push(QuestInstance {
            id: def.id.clone(),
            kind: def.kind,
            goal: def.goal,
            progress: 0.0,
            is_completed: false,
            claimed: false,
        });
        added += 1;
    }
    added
}

/// Advances every unfinished quest of `kind` and returns the ids that just
/// completed. `Coins` quests ignore `amount` and latch to the highest
/// balance seen; spending never lowers their progress.
pub fn update_progress(state: &mut PlayerState, kind: QuestKind, amount: f64) -> Vec<String> {
    let coins = state.coins;
    let mut completed = Vec::new();
    for quest in state.quests.iter_mut() {
        if quest.kind != kind || quest.is_completed {
            continue;
        }
        quest.progress = match kind {
            QuestKind::Coins => quest.progress.max(coins),
            _ => quest.progress + amount.max(0.0),
        };
        if quest.progress >= quest.goal {
            quest.is_completed = true;
            completed.push(quest.id.clone());
        }
    }
    completed
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimOutcome {
    pub title: String,
    pub reward: QuestReward,
    pub new_levels: Vec<u32>,
}

/// Pays out a completed quest exactly once.
///
/// `Ok(None)` when the quest is not claimable (still active or already
/// claimed). `InvalidReference` when no such quest exists.
pub fn claim(
    state: &mut PlayerState,
    registry: &QuestRegistry,
    quest_id: &str,
    now_ms: u64,
) -> Result<Option<ClaimOutcome>, GameError> {
    let def = registry
        .get(quest_id)
        .ok_or_else(|| GameError::InvalidReference(format!("quest '{quest_id}'")))?;
    let quest = state
        .quests
        .iter_mut()
        .find(|q| q.id == quest_id)
        .ok_or_else(|| GameError::InvalidReference(format!("quest '{quest_id}'")))?;
    if quest.status() != QuestStatus::Completed {
        return Ok(None);
    }
    quest.claimed = true;

    let reward = def.reward.clone();
    state.coins += reward.coins;
    state.score += reward.coins;
    state.click_power += reward.click_power;
    state.auto_income += reward.auto_income;
    state.multiplier += reward.multiplier;
    state.xp += reward.xp.max(0.0);
    let new_levels = try_level_up(state, now_ms);

    state.log(now_ms, format!("Claimed \"{}\"", def.title));
    Ok(Some(ClaimOutcome {
        title: def.title.clone(),
        reward,
        new_levels,
    }))
}

// ──────────────────────────────────────────────────────────────────────────────
// SYSTEMS
// ──────────────────────────────────────────────────────────────────────────────

fn handle_claim_requests(
    mut requests: EventReader<ClaimQuestEvent>,
    mut state: ResMut<PlayerState>,
    registry: Res<QuestRegistry>,
    clock: Res<GameClock>,
    mut level_ups: EventWriter<LevelUpEvent>,
) {
    for request in requests.read() {
        match claim(&mut state, &registry, &request.quest_id, clock.now_ms) {
            Ok(Some(outcome)) => {
                info!("[Quests] claimed '{}'", request.quest_id);
                for level in outcome.new_levels {
                    level_ups.send(LevelUpEvent { level });
                }
            }
            Ok(None) => debug!("[Quests] '{}' is not claimable", request.quest_id),
            Err(e) => debug!("[Quests] claim ignored: {e}"),
        }
    }
}

fn apply_quest_progress(
    mut progress: EventReader<QuestProgressEvent>,
    mut level_ups: EventReader<LevelUpEvent>,
    mut state: ResMut<PlayerState>,
    registry: Res<QuestRegistry>,
    clock: Res<GameClock>,
    mut completed_writer: EventWriter<QuestCompletedEvent>,
) {
    let mut completed = Vec::new();
    for event in progress.read() {
        completed.extend(update_progress(&mut state, event.kind, event.amount));
    }
    let levels = level_ups.read().count();
    if levels > 0 {
        completed.extend(update_progress(&mut state, QuestKind::LevelUp, levels as f64));
    }

    for quest_id in completed {
        let title = registry
            .get(&quest_id)
            .map(|d| d.title.clone())
            .unwrap_or_else(|| quest_id.clone());
        info!("[Quests] completed '{quest_id}'");
        state.log(clock.now_ms, format!("Quest complete: {title}"));
        completed_writer.send(QuestCompletedEvent { quest_id });
    }
}
