//! Shared components, resources, events, and states for Clickdex.
//!
//! This is the type contract. Every domain plugin imports from here.
//! Domains only call each other's pure functions, never each other's systems.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

mod error;

pub use error::*;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

/// Ordering of the economy systems inside one `Update`.
///
/// Actions (user input) run first, then the fixed tick, then the random event
/// roll, then quest evaluation, then deferred work (evolution lookups, saves).
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EconomySet {
    Actions,
    Tick,
    Events,
    Quests,
    Outcomes,
}

/// Ordering inside `OnEnter(GameState::Loading)`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadingSet {
    Catalogs,
    Restore,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TEAM_SIZE: usize = 6;
pub const LOG_CAPACITY: usize = 10;

pub const XP_PER_TRAINER_LEVEL: f64 = 100.0;
pub const XP_PER_CREATURE_LEVEL: f64 = 500.0;
pub const LEVEL_UP_CLICK_POWER: f64 = 1.0;
pub const LEVEL_UP_MULTIPLIER: f64 = 0.05;

/// Fraction of every gain shared with each creature on the team.
pub const TEAM_XP_SHARE: f64 = 0.1;

/// Evolution threshold used when the catalog rule carries no minimum level.
pub const DEFAULT_EVOLUTION_LEVEL: u32 = 16;

pub const STARTING_GACHA_PRICE: f64 = 500.0;
pub const GACHA_PRICE_GROWTH: f64 = 1.5;

/// The tick resyncs to "now" instead of replaying more than this many periods.
pub const MAX_TICK_BACKLOG: u64 = 5;

// ═══════════════════════════════════════════════════════════════════════
// CLOCK & RNG
// ═══════════════════════════════════════════════════════════════════════

/// Wall-clock time in Unix epoch milliseconds. Every expiry and interval in
/// the economy is measured against this value.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameClock {
    pub now_ms: u64,
}

impl GameClock {
    pub fn at(now_ms: u64) -> Self {
        Self { now_ms }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub StdRng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

/// Clamps a configured chance into [0, 1] for `gen_bool`. NaN counts as 0.
pub fn probability(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER STATE
// ═══════════════════════════════════════════════════════════════════════

pub type CreatureUid = u64;

/// The single mutable aggregate of the game. Created at startup from the
/// save file or defaults, mutated only through the domain entry points.
///
/// `#[serde(default)]` keeps older saves readable: any field missing from
/// the JSON takes its value from `PlayerState::default()`.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerState {
    /// Lifetime total of everything earned.
    pub score: f64,
    /// Spendable balance.
    pub coins: f64,
    pub click_power: f64,
    pub multiplier: f64,
    pub auto_income: f64,
    pub level: u32,
    pub xp: f64,
    pub effects: Vec<Effect>,
    pub active_events: Vec<EventMarker>,
    pub quests: Vec<QuestInstance>,
    pub inventory: Vec<ItemStack>,
    #[serde(rename = "pokemonCollection")]
    pub collection: Vec<OwnedCreature>,
    /// Fixed-size slots, each empty or holding the uid of an owned creature.
    pub team: Vec<Option<CreatureUid>>,
    pub gacha_price: f64,
    pub next_uid: u64,
    pub log: MessageLog,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            score: 0.0,
            coins: 0.0,
            click_power: 1.0,
            multiplier: 1.0,
            auto_income: 0.0,
            level: 1,
            xp: 0.0,
            effects: Vec::new(),
            active_events: Vec::new(),
            quests: Vec::new(),
            inventory: Vec::new(),
            collection: Vec::new(),
            team: vec![None; TEAM_SIZE],
            gacha_price: STARTING_GACHA_PRICE,
            next_uid: 1,
            log: MessageLog::default(),
        }
    }
}

impl PlayerState {
    /// Hands out a fresh identifier for creatures and effects.
    pub fn allocate_uid(&mut self) -> u64 {
        let uid = self.next_uid.max(1);
        self.next_uid = uid + 1;
        uid
    }

    pub fn creature(&self, uid: CreatureUid) -> Option<&OwnedCreature> {
        self.collection.iter().find(|c| c.uid == uid)
    }

    pub fn creature_mut(&mut self, uid: CreatureUid) -> Option<&mut OwnedCreature> {
        self.collection.iter_mut().find(|c| c.uid == uid)
    }

    /// Team creatures in slot order. Empty and dangling slots are skipped.
    pub fn team_creatures(&self) -> impl Iterator<Item = &OwnedCreature> + '_ {
        self.team
            .iter()
            .flatten()
            .filter_map(move |uid| self.creature(*uid))
    }

    pub fn is_on_team(&self, uid: CreatureUid) -> bool {
        self.team.iter().any(|slot| *slot == Some(uid))
    }

    pub fn owns_species(&self, catalog_id: u32) -> bool {
        self.collection.iter().any(|c| c.catalog_id == catalog_id)
    }

    pub fn quest(&self, quest_id: &str) -> Option<&QuestInstance> {
        self.quests.iter().find(|q| q.id == quest_id)
    }

    pub fn item_count(&self, item_id: &str) -> u32 {
        self.inventory
            .iter()
            .find(|s| s.item_id == item_id)
            .map(|s| s.count)
            .unwrap_or(0)
    }

    pub fn log(&mut self, now_ms: u64, message: impl AsRef<str>) {
        self.log.push(now_ms, message.as_ref());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EFFECTS & EVENT MARKERS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Frenzy,
    Boost,
    Blessing,
}

/// A time-bounded multiplicative modifier. Values above 1 boost output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    pub id: u64,
    pub kind: EffectKind,
    pub value: f64,
    pub expires_at: u64,
}

/// UI-facing marker for a running random event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMarker {
    pub icon: String,
    pub expires_at: u64,
}

// ═══════════════════════════════════════════════════════════════════════
// QUESTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestKind {
    Click,
    /// Balance gauge: progress latches to the highest coin balance seen.
    Coins,
    Buy,
    Pull,
    UseItem,
    LevelUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestStatus {
    Active,
    Completed,
    Claimed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestKind,
    pub goal: f64,
    pub progress: f64,
    pub is_completed: bool,
    pub claimed: bool,
}

impl QuestInstance {
    pub fn status(&self) -> QuestStatus {
        match (self.is_completed, self.claimed) {
            (_, true) => QuestStatus::Claimed,
            (true, false) => QuestStatus::Completed,
            (false, false) => QuestStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestReward {
    pub coins: f64,
    pub xp: f64,
    pub click_power: f64,
    pub auto_income: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestDef {
    pub id: String,
    pub title: String,
    pub kind: QuestKind,
    pub goal: f64,
    pub reward: QuestReward,
}

/// Quest definitions in display order.
#[derive(Resource, Debug, Clone, Default)]
pub struct QuestRegistry {
    pub quests: Vec<QuestDef>,
}

impl QuestRegistry {
    pub fn get(&self, id: &str) -> Option<&QuestDef> {
        self.quests.iter().find(|q| q.id == id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INVENTORY & ITEMS
// ═══════════════════════════════════════════════════════════════════════

/// Item ids are strings for data-driven flexibility.
pub type ItemId = String;

/// One inventory entry. `count` is always above zero while the stack exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStack {
    pub item_id: ItemId,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Relative weight used by the item-drop roll.
    pub fn drop_weight(self) -> u32 {
        match self {
            Rarity::Common => 60,
            Rarity::Uncommon => 25,
            Rarity::Rare => 12,
            Rarity::Epic => 6,
            Rarity::Legendary => 3,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Rarity::Common => "C",
            Rarity::Uncommon => "U",
            Rarity::Rare => "R",
            Rarity::Epic => "E",
            Rarity::Legendary => "L",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Booster,
    Treasure,
    Candy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemEffect {
    /// Installs an effect in the ledger.
    Boost {
        kind: EffectKind,
        value: f64,
        duration_ms: u64,
    },
    /// Routed through the regular gain path.
    Coins(f64),
    TrainerXp(f64),
    /// Granted to every creature on the team.
    TeamXp(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub effect: ItemEffect,
    pub rarity: Rarity,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ItemRegistry {
    pub items: Vec<ItemDef>,
}

impl ItemRegistry {
    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items.iter().find(|i| i.id == id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SHOP
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    ClickPower,
    AutoIncome,
    Multiplier,
}

/// A permanent stat change, interpreted by one generic applier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatEffect {
    pub stat: Stat,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShopItemDef {
    pub id: String,
    pub name: String,
    pub base_cost: f64,
    pub cost_growth: f64,
    pub effects: Vec<StatEffect>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShopListing {
    pub def: ShopItemDef,
    pub owned: u32,
}

/// Shop upgrades and how many of each the player owns. Owned counts live
/// here rather than in `PlayerState` but are persisted alongside it.
#[derive(Resource, Debug, Clone, Default)]
pub struct Shop {
    pub listings: Vec<ShopListing>,
}

impl Shop {
    pub fn get(&self, id: &str) -> Option<&ShopListing> {
        self.listings.iter().find(|l| l.def.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ShopListing> {
        self.listings.iter_mut().find(|l| l.def.id == id)
    }

    pub fn reset_ownership(&mut self) {
        for listing in self.listings.iter_mut() {
            listing.owned = 0;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RANDOM EVENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum EventEffect {
    Windfall { coins: f64 },
    Buff {
        kind: EffectKind,
        value: f64,
        duration_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDef {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub effect: EventEffect,
    /// How long the UI marker stays up.
    pub marker_ms: u64,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct EventRegistry {
    pub events: Vec<EventDef>,
}

// ═══════════════════════════════════════════════════════════════════════
// COLLECTIBLE CREATURES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusCategory {
    ClickMult,
    CoinMult,
    XpMult,
    ClickPower,
    AutoIncome,
    GlobalMult,
}

impl BonusCategory {
    pub const ALL: [BonusCategory; 6] = [
        BonusCategory::ClickMult,
        BonusCategory::CoinMult,
        BonusCategory::XpMult,
        BonusCategory::ClickPower,
        BonusCategory::AutoIncome,
        BonusCategory::GlobalMult,
    ];

    /// Species ids cycle through the categories.
    pub fn for_species(id: u32) -> Self {
        Self::ALL[id as usize % Self::ALL.len()]
    }

    /// Additive categories add flat power; the rest multiply a channel.
    pub fn is_additive(self) -> bool {
        matches!(self, BonusCategory::ClickPower | BonusCategory::AutoIncome)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureDef {
    pub id: u32,
    pub name: String,
    pub sprite_ref: String,
    pub rarity: Rarity,
    pub is_base_form: bool,
    pub bonus_category: BonusCategory,
    /// Key passed to `CatalogProvider::evolution_rule`; `None` = final form.
    #[serde(default)]
    pub evolution_rule: Option<String>,
    #[serde(default)]
    pub flavor_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionRule {
    pub successor_id: u32,
    #[serde(default)]
    pub min_level: Option<u32>,
}

/// One acquired creature. `uid` never changes; `catalog_id` changes on evolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCreature {
    pub catalog_id: u32,
    pub uid: CreatureUid,
    pub exp: f64,
    pub level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogStatus {
    #[default]
    Loading,
    Online,
    Unavailable,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CreatureRegistry {
    pub creatures: Vec<CreatureDef>,
    pub status: CatalogStatus,
}

impl CreatureRegistry {
    pub fn get(&self, id: u32) -> Option<&CreatureDef> {
        self.creatures.iter().find(|c| c.id == id)
    }

    pub fn is_online(&self) -> bool {
        self.status == CatalogStatus::Online
    }

    /// Display name with a numeric fallback for ids the catalog does not know.
    pub fn name_of(&self, id: u32) -> String {
        self.get(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MESSAGE LOG
// ═══════════════════════════════════════════════════════════════════════

/// Newest-first ring of human-readable messages, capped at `LOG_CAPACITY`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageLog {
    entries: VecDeque<String>,
}

impl MessageLog {
    pub fn push(&mut self, now_ms: u64, message: &str) {
        self.entries
            .push_front(format!("[{}] {}", format_clock(now_ms), message));
        self.entries.truncate(LOG_CAPACITY);
    }

    pub fn entries(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Formats epoch milliseconds as a UTC `HH:MM:SS` time of day.
pub fn format_clock(now_ms: u64) -> String {
    let secs = (now_ms / 1000) % 86_400;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: action surface (UI → core)
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone, Default)]
pub struct ClickEvent;

#[derive(Event, Debug, Clone)]
pub struct PurchaseRequestEvent {
    pub item_id: String,
}

#[derive(Event, Debug, Clone)]
pub struct ClaimQuestEvent {
    pub quest_id: String,
}

#[derive(Event, Debug, Clone)]
pub struct UseItemEvent {
    pub item_id: ItemId,
}

#[derive(Event, Debug, Clone, Default)]
pub struct GachaPullEvent;

#[derive(Event, Debug, Clone)]
pub struct AssignTeamEvent {
    pub uid: CreatureUid,
}

#[derive(Event, Debug, Clone)]
pub struct RemoveTeamEvent {
    pub slot: usize,
}

#[derive(Event, Debug, Clone, Default)]
pub struct SaveRequestEvent;

#[derive(Event, Debug, Clone, Default)]
pub struct LoadRequestEvent;

#[derive(Event, Debug, Clone, Default)]
pub struct ResetRequestEvent;

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: outcomes (core → listeners)
// ═══════════════════════════════════════════════════════════════════════

/// One per trainer level gained.
#[derive(Event, Debug, Clone)]
pub struct LevelUpEvent {
    pub level: u32,
}

/// One per creature level gained.
#[derive(Event, Debug, Clone)]
pub struct CreatureLevelUpEvent {
    pub uid: CreatureUid,
    pub catalog_id: u32,
    pub level: u32,
}

#[derive(Event, Debug, Clone)]
pub struct EvolutionEvent {
    pub uid: CreatureUid,
    pub from_id: u32,
    pub to_id: u32,
}

/// Progress to feed into the quest tracker.
#[derive(Event, Debug, Clone)]
pub struct QuestProgressEvent {
    pub kind: QuestKind,
    pub amount: f64,
}

impl QuestProgressEvent {
    pub fn new(kind: QuestKind, amount: f64) -> Self {
        Self { kind, amount }
    }

    pub fn coins_gauge() -> Self {
        Self::new(QuestKind::Coins, 0.0)
    }
}

#[derive(Event, Debug, Clone)]
pub struct QuestCompletedEvent {
    pub quest_id: String,
}

#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}
