//! Creature catalog provider.
//!
//! The creature list and evolution rules come from an external source that
//! may be slow or missing. The list is fetched once on the IO task pool; a
//! failure leaves `CreatureRegistry` marked `Unavailable` and every other
//! system keeps running.

mod builtin;

pub use builtin::{rarity_for, BuiltinCatalog};

use bevy::prelude::*;
use bevy::tasks::futures_lite::future;
use bevy::tasks::{block_on, IoTaskPool, Task};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::shared::*;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog parse failed: {0}")]
    Parse(String),
    #[error("no evolution rule named '{0}'")]
    UnknownRule(String),
}

impl From<CatalogError> for GameError {
    fn from(e: CatalogError) -> Self {
        GameError::DataUnavailable(e.to_string())
    }
}

/// Read-only source of creature reference data.
pub trait CatalogProvider: Send + Sync {
    fn list_creatures(&self) -> Result<Vec<CreatureDef>, CatalogError>;
    fn evolution_rule(&self, rule: &str) -> Result<EvolutionRule, CatalogError>;
}

/// On-disk catalog layout for `RonCatalog`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    pub creatures: Vec<CreatureDef>,
    #[serde(default)]
    pub evolutions: HashMap<String, EvolutionRule>,
}

/// Reads the catalog from a RON file on every call.
#[derive(Debug, Clone)]
pub struct RonCatalog {
    pub path: PathBuf,
}

impl RonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<CatalogFile, CatalogError> {
        let content = fs::read_to_string(&self.path)?;
        ron::from_str(&content).map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

impl CatalogProvider for RonCatalog {
    fn list_creatures(&self) -> Result<Vec<CreatureDef>, CatalogError> {
        Ok(self.read()?.creatures)
    }

    fn evolution_rule(&self, rule: &str) -> Result<EvolutionRule, CatalogError> {
        self.read()?
            .evolutions
            .get(rule)
            .copied()
            .ok_or_else(|| CatalogError::UnknownRule(rule.to_string()))
    }
}

#[derive(Resource, Clone)]
pub struct CatalogSource(pub Arc<dyn CatalogProvider>);

impl CatalogSource {
    pub fn new(provider: impl CatalogProvider + 'static) -> Self {
        Self(Arc::new(provider))
    }
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self::new(BuiltinCatalog)
    }
}

#[derive(Resource, Default)]
pub struct PendingCatalogLoad {
    task: Option<Task<Result<Vec<CreatureDef>, CatalogError>>>,
}

pub struct CatalogPlugin;

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CatalogSource>()
            .init_resource::<CreatureRegistry>()
            .init_resource::<PendingCatalogLoad>()
            .add_systems(
                OnEnter(GameState::Loading),
                start_catalog_load.in_set(LoadingSet::Catalogs),
            )
            .add_systems(PreUpdate, poll_catalog_load);
    }
}

fn start_catalog_load(
    source: Res<CatalogSource>,
    mut pending: ResMut<PendingCatalogLoad>,
    mut registry: ResMut<CreatureRegistry>,
) {
    let provider = Arc::clone(&source.0);
    registry.status = CatalogStatus::Loading;
    pending.task = Some(IoTaskPool::get().spawn(async move { provider.list_creatures() }));
    info!("[Catalog] fetching creature list…");
}

fn poll_catalog_load(
    mut pending: ResMut<PendingCatalogLoad>,
    mut registry: ResMut<CreatureRegistry>,
    mut state: ResMut<PlayerState>,
    clock: Res<GameClock>,
) {
    let Some(ref mut task) = pending.task else {
        return;
    };
    let Some(result) = block_on(future::poll_once(task)) else {
        return;
    };
    pending.task = None;

    if let Err(msg) = install_creatures(&mut registry, result) {
        warn!("[Catalog] {msg}");
        state.log(clock.now_ms, "Creature data unavailable. Collecting is disabled.");
    }
}

/// Installs a finished catalog fetch. An error marks the registry unavailable.
pub fn install_creatures(
    registry: &mut CreatureRegistry,
    result: Result<Vec<CreatureDef>, CatalogError>,
) -> Result<(), GameError> {
    match result {
        Ok(creatures) => {
            info!("[Catalog] {} creatures online", creatures.len());
            registry.creatures = creatures;
            registry.status = CatalogStatus::Online;
            Ok(())
        }
        Err(e) => {
            registry.creatures.clear();
            registry.status = CatalogStatus::Unavailable;
            Err(e.into())
        }
    }
}
