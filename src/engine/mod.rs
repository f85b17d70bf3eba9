//! Engine domain: the fixed-period economy tick, manual clicks, and the
//! system-set ordering every other domain plugs into.

use bevy::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::bonuses::compute_power;
use crate::config::GameConfig;
use crate::effects::sweep_expired;
use crate::items::{add_item, roll_item_drop};
use crate::progression::{apply_gain, emit_gain_outcome, GainOutcome};
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tick schedule
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Resource, Debug, Clone, Default)]
pub struct TickSchedule {
    /// Unset until the first frame in `Playing`, which anchors the cadence.
    pub last_tick_ms: Option<u64>,
    /// Set by the tick for the systems later in the same frame.
    pub fired_this_frame: bool,
}

impl TickSchedule {
    /// At most one tick per call. Falling more than `MAX_TICK_BACKLOG`
    /// periods behind resyncs to `now_ms` instead of replaying.
    pub fn advance(&mut self, now_ms: u64, period_ms: u64) -> bool {
        let period_ms = period_ms.max(1);
        let Some(last) = self.last_tick_ms else {
            self.last_tick_ms = Some(now_ms);
            return false;
        };
        let elapsed = now_ms.saturating_sub(last);
        if elapsed < period_ms {
            return false;
        }
        self.last_tick_ms = if elapsed > period_ms * MAX_TICK_BACKLOG {
            Some(now_ms)
        } else {
            Some(last + period_ms)
        };
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugins
// ─────────────────────────────────────────────────────────────────────────────

pub struct EnginePlugin;

impl Plugin for EnginePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TickSchedule>()
            .init_resource::<GameConfig>()
            .init_resource::<GameClock>()
            .init_resource::<GameRng>()
            .configure_sets(
                OnEnter(GameState::Loading),
                (LoadingSet::Catalogs, LoadingSet::Restore).chain(),
            )
            .configure_sets(
                Update,
                (
                    EconomySet::Actions,
                    EconomySet::Tick,
                    EconomySet::Events,
                    EconomySet::Quests,
                    EconomySet::Outcomes,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Update, handle_clicks.in_set(EconomySet::Actions))
            .add_systems(Update, run_economy_tick.in_set(EconomySet::Tick))
            .add_systems(Update, roll_tick_item_drop.in_set(EconomySet::Outcomes));
    }
}

/// Copies the wall clock into `GameClock` every frame. Tests leave this out
/// and drive the clock by hand.
pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(First, sync_wall_clock);
    }
}

pub fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn sync_wall_clock(mut clock: ResMut<GameClock>) {
    clock.now_ms = wall_clock_ms();
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// One gain per click, at the power computed after sweeping stale effects.
pub fn handle_clicks(
    mut clicks: EventReader<ClickEvent>,
    mut state: ResMut<PlayerState>,
    creatures: Res<CreatureRegistry>,
    clock: Res<GameClock>,
    mut progress: EventWriter<QuestProgressEvent>,
    mut level_ups: EventWriter<LevelUpEvent>,
    mut creature_level_ups: EventWriter<CreatureLevelUpEvent>,
) {
    let count = clicks.read().count();
    if count == 0 {
        return;
    }

    let mut outcome = GainOutcome::default();
    for _ in 0..count {
        sweep_expired(&mut state, clock.now_ms);
        let power = compute_power(&state, &creatures);
        outcome.merge(apply_gain(&mut state, power.click, &creatures, clock.now_ms));
    }
    emit_gain_outcome(&outcome, &mut level_ups, &mut creature_level_ups);
    progress.send(QuestProgressEvent::new(QuestKind::Click, count as f64));
    progress.send(QuestProgressEvent::coins_gauge());
}

/// Sweep, then passive income. The event roll, quest re-evaluation and
/// item drop follow in later sets of the same frame.
#[allow(clippy::too_many_arguments)]
pub fn run_economy_tick(
    mut schedule: ResMut<TickSchedule>,
    mut state: ResMut<PlayerState>,
    creatures: Res<CreatureRegistry>,
    config: Res<GameConfig>,
    clock: Res<GameClock>,
    mut progress: EventWriter<QuestProgressEvent>,
    mut level_ups: EventWriter<LevelUpEvent>,
    mut creature_level_ups: EventWriter<CreatureLevelUpEvent>,
) {
    schedule.fired_this_frame = schedule.advance(clock.now_ms, config.tick_period_ms);
    if !schedule.fired_this_frame {
        return;
    }

    let expired = sweep_expired(&mut state, clock.now_ms);
    if expired > 0 {
        debug!("[Engine] {expired} effect(s) expired");
    }

    let income = compute_power(&state, &creatures).income;
    if income > 0.0 {
        let outcome = apply_gain(&mut state, income, &creatures, clock.now_ms);
        emit_gain_outcome(&outcome, &mut level_ups, &mut creature_level_ups);
    }
    progress.send(QuestProgressEvent::coins_gauge());
}

pub fn roll_tick_item_drop(
    schedule: Res<TickSchedule>,
    mut state: ResMut<PlayerState>,
    mut rng: ResMut<GameRng>,
    items: Res<ItemRegistry>,
    config: Res<GameConfig>,
    clock: Res<GameClock>,
) {
    if !schedule.fired_this_frame {
        return;
    }
    let Some(item) = roll_item_drop(&items, config.item_drop_chance, &mut rng.0) else {
        return;
    };
    add_item(&mut state, &item.id, 1);
    info!("[Engine] dropped '{}'", item.id);
    state.log(
        clock.now_ms,
        format!("Found a {} [{}]!", item.name, item.rarity.letter()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_anchors() {
        let mut schedule = TickSchedule::default();
        assert!(!schedule.advance(5_000, 1000));
        assert!(!schedule.advance(5_999, 1000));
        assert!(schedule.advance(6_000, 1000));
        assert_eq!(schedule.last_tick_ms, Some(6_000));
    }

    #[test]
    fn test_small_backlog_catches_up_one_period_at_a_time() {
        let mut schedule = TickSchedule { last_tick_ms: Some(0), ..Default::default() };
        assert!(schedule.advance(3_500, 1000));
        assert_eq!(schedule.last_tick_ms, Some(1_000));
        assert!(schedule.advance(3_500, 1000));
        assert!(schedule.advance(3_500, 1000));
        assert!(!schedule.advance(3_500, 1000));
    }

    #[test]
    fn test_large_backlog_resyncs() {
        let mut schedule = TickSchedule { last_tick_ms: Some(0), ..Default::default() };
        assert!(schedule.advance(60_000, 1000));
        assert_eq!(schedule.last_tick_ms, Some(60_000));
        assert!(!schedule.advance(60_500, 1000));
    }
}
