//! Collectible creatures: gacha acquisition and the six-slot team.

use bevy::prelude::*;
use crate::shared::*;

pub mod gacha;
pub mod team;

pub use gacha::{pull_gacha, unowned_base_forms};
pub use team::{assign_to_team, remove_from_team};

pub struct CollectionPlugin;

impl Plugin for CollectionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (gacha::handle_gacha_pulls, team::handle_team_changes).in_set(EconomySet::Actions),
        );
    }
}
