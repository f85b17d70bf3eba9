use bevy::prelude::*;

use crate::shared::*;

/// Puts a creature into the first empty slot and returns the slot index.
///
/// `Ok(None)` when it is already on the team. Unknown uids are
/// `InvalidReference`; no empty slot is `TeamFull`.
pub fn assign_to_team(state: &mut PlayerState, uid: CreatureUid) -> Result<Option<usize>, GameError> {
    if state.creature(uid).is_none() {
        return Err(GameError::InvalidReference(format!("creature {uid}")));
    }
    if state.is_on_team(uid) {
        return Ok(None);
    }
    let slot = state
        .team
        .iter()
        .position(Option::is_none)
        .ok_or(GameError::TeamFull)?;
    state.team[slot] = Some(uid);
    Ok(Some(slot))
}

/// Clears a slot and returns the uid that was there. Out-of-range and empty
/// slots return `None`.
pub fn remove_from_team(state: &mut PlayerState, slot: usize) -> Option<CreatureUid> {
    state.team.get_mut(slot).and_then(Option::take)
}

pub fn handle_team_changes(
    mut assigns: EventReader<AssignTeamEvent>,
    mut removals: EventReader<RemoveTeamEvent>,
    mut state: ResMut<PlayerState>,
    creatures: Res<CreatureRegistry>,
    clock: Res<GameClock>,
) {
    for ev in assigns.read() {
        match assign_to_team(&mut state, ev.uid) {
            Ok(Some(slot)) => {
                let name = state
                    .creature(ev.uid)
                    .map(|c| creatures.name_of(c.catalog_id))
                    .unwrap_or_default();
                info!("[Collection] uid {} → slot {slot}", ev.uid);
                state.log(clock.now_ms, format!("{name} joined the team"));
            }
            Ok(None) => debug!("[Collection] uid {} already on team", ev.uid),
            Err(GameError::TeamFull) => state.log(clock.now_ms, "Team is full!"),
            Err(e) => debug!("[Collection] assign ignored: {e}"),
        }
    }

    for ev in removals.read() {
        if let Some(uid) = remove_from_team(&mut state, ev.slot) {
            info!("[Collection] slot {} cleared (uid {uid})", ev.slot);
        }
    }
}
