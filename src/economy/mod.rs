//! Economy domain: upgrade shop and coin formatting.
//!
//! All cross-domain communication goes through `crate::shared::*` events and resources.

use bevy::prelude::*;
use crate::shared::*;

pub mod coins;
pub mod shop;

use shop::handle_purchase_requests;

// ─────────────────────────────────────────────────────────────────────────────
// Plugin
// ─────────────────────────────────────────────────────────────────────────────

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, handle_purchase_requests.in_set(EconomySet::Actions));

        info!("[Economy] EconomyPlugin registered.");
    }
}
