//! Effect ledger: time-bounded multiplicative modifiers and event markers.
//!
//! Nothing here merges or stacks by kind. Two effects of the same kind both
//! stay in the ledger and both count in `aggregate_multiplier`.

use crate::shared::*;

// ──────────────────────────────────────────────────────────────────────────────
// LEDGER OPERATIONS
// ──────────────────────────────────────────────────────────────────────────────

/// Appends an effect expiring at `now_ms + duration_ms` and returns its id.
pub fn add_effect(
    state: &mut PlayerState,
    kind: EffectKind,
    value: f64,
    duration_ms: u64,
    now_ms: u64,
) -> u64 {
    let id = state.allocate_uid();
    state.effects.push(Effect {
        id,
        kind,
        value,
        expires_at: now_ms.saturating_add(duration_ms),
    });
    id
}

pub fn add_event_marker(state: &mut PlayerState, icon: &str, duration_ms: u64, now_ms: u64) {
    state.active_events.push(EventMarker {
        icon: icon.to_string(),
        expires_at: now_ms.saturating_add(duration_ms),
    });
}

/// Drops every effect and marker with `expires_at <= now_ms`.
/// Returns how many effects were removed.
pub fn sweep_expired(state: &mut PlayerState, now_ms: u64) -> usize {
    let before = state.effects.len();
    state.effects.retain(|e| e.expires_at > now_ms);
    state.active_events.retain(|m| m.expires_at > now_ms);
    before - state.effects.len()
}

/// Product of every effect value; 1.0 when the ledger is empty.
pub fn aggregate_multiplier(state: &PlayerState) -> f64 {
    state.effects.iter().map(|e| e.value).product()
}
