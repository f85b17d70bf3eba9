//! Event dispatcher: every interval, a chance roll for one random global event.
//!
//! A missed roll is simply a missed opportunity. There is no retry and no queue.

use bevy::prelude::*;
use rand::Rng;

use crate::config::GameConfig;
use crate::effects::{add_effect, add_event_marker};
use crate::progression::{apply_gain, emit_gain_outcome, GainOutcome};
use crate::shared::*;

#[derive(Resource, Debug, Clone, Default)]
pub struct EventDispatcher {
    /// Unset until the first frame in `Playing`, which anchors the interval.
    pub last_roll_ms: Option<u64>,
}

impl EventDispatcher {
    /// True once per elapsed interval.
    pub fn due(&mut self, now_ms: u64, interval_ms: u64) -> bool {
        match self.last_roll_ms {
            None => {
                self.last_roll_ms = Some(now_ms);
                false
            }
            Some(last) if now_ms.saturating_sub(last) >= interval_ms => {
                self.last_roll_ms = Some(now_ms);
                true
            }
            Some(_) => false,
        }
    }
}

pub struct RandomEventsPlugin;

impl Plugin for RandomEventsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EventDispatcher>()
            .add_systems(Update, roll_random_events.in_set(EconomySet::Events));
    }
}

/// Chance gate, then a uniform pick. `chance` goes through `probability`.
pub fn roll_event<'a>(
    registry: &'a EventRegistry,
    chance: f64,
    rng: &mut impl Rng,
) -> Option<&'a EventDef> {
    if registry.events.is_empty() || !rng.gen_bool(probability(chance)) {
        return None;
    }
    let index = rng.gen_range(0..registry.events.len());
    registry.events.get(index)
}

/// Applies an event's effect and puts its marker up.
pub fn apply_event(
    state: &mut PlayerState,
    event: &EventDef,
    creatures: &CreatureRegistry,
    now_ms: u64,
) -> GainOutcome {
    let outcome = match event.effect {
        EventEffect::Windfall { coins } => apply_gain(state, coins, creatures, now_ms),
        EventEffect::Buff { kind, value, duration_ms } => {
            add_effect(state, kind, value, duration_ms, now_ms);
            GainOutcome::default()
        }
    };
    add_event_marker(state, &event.icon, event.marker_ms, now_ms);
    state.log(now_ms, format!("{} {}!", event.icon, event.name));
    outcome
}

#[allow(clippy::too_many_arguments)]
fn roll_random_events(
    mut dispatcher: ResMut<EventDispatcher>,
    mut state: ResMut<PlayerState>,
    mut rng: ResMut<GameRng>,
    registry: Res<EventRegistry>,
    creatures: Res<CreatureRegistry>,
    config: Res<GameConfig>,
    clock: Res<GameClock>,
    mut level_ups: EventWriter<LevelUpEvent>,
    mut creature_level_ups: EventWriter<CreatureLevelUpEvent>,
) {
    if !dispatcher.due(clock.now_ms, config.event_interval_ms) {
        return;
    }
    let Some(event) = roll_event(&registry, config.event_chance, &mut rng.0) else {
        return;
    };
    info!("[Events] {} fired", event.id);
    let outcome = apply_event(&mut state, event, &creatures, clock.now_ms);
    emit_gain_outcome(&outcome, &mut level_ups, &mut creature_level_ups);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::populate_events;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn registry() -> EventRegistry {
        let mut registry = EventRegistry::default();
        populate_events(&mut registry);
        registry
    }

    #[test]
    fn test_zero_chance_never_fires() {
        let mut rng = StdRng::seed_from_u64(1);
        let registry = registry();
        for _ in 0..100 {
            assert!(roll_event(&registry, 0.0, &mut rng).is_none());
        }
    }

    #[test]
    fn test_nan_chance_never_fires() {
        let mut rng = StdRng::seed_from_u64(4);
        let registry = registry();
        for _ in 0..20 {
            assert!(roll_event(&registry, f64::NAN, &mut rng).is_none());
        }
    }

    #[test]
    fn test_certain_chance_always_fires() {
        let mut rng = StdRng::seed_from_u64(2);
        let registry = registry();
        for _ in 0..100 {
            assert!(roll_event(&registry, 1.5, &mut rng).is_some());
        }
    }

    #[test]
    fn test_windfall_goes_through_gain() {
        let mut state = PlayerState::default();
        let event = registry().events.into_iter().find(|e| e.id == "meteor_shower").unwrap();
        apply_event(&mut state, &event, &CreatureRegistry::default(), 0);
        assert_eq!(state.coins, 100.0);
        assert_eq!(state.score, 100.0);
        assert_eq!(state.active_events.len(), 1);
    }

    #[test]
    fn test_buff_installs_effect() {
        let mut state = PlayerState::default();
        let event = registry().events.into_iter().find(|e| e.id == "click_frenzy").unwrap();
        apply_event(&mut state, &event, &CreatureRegistry::default(), 1000);
        assert_eq!(state.effects.len(), 1);
        assert_eq!(state.effects[0].expires_at, 11_000);
        assert_eq!(state.coins, 0.0);
    }

    #[test]
    fn test_dispatcher_interval() {
        let mut dispatcher = EventDispatcher::default();
        assert!(!dispatcher.due(0, 10_000));
        assert!(!dispatcher.due(9_999, 10_000));
        assert!(dispatcher.due(10_000, 10_000));
        assert!(!dispatcher.due(15_000, 10_000));
    }
}
