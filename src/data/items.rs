use crate::shared::*;

fn item(id: &str, name: &str, kind: ItemKind, effect: ItemEffect, rarity: Rarity) -> ItemDef {
    ItemDef {
        id: id.into(),
        name: name.into(),
        kind,
        effect,
        rarity,
    }
}

fn boost(kind: EffectKind, value: f64, duration_ms: u64) -> ItemEffect {
    ItemEffect::Boost { kind, value, duration_ms }
}

/// Populate the ItemRegistry with every item that can drop from the tick.
pub fn populate_items(registry: &mut ItemRegistry) {
    registry.items = vec![
        // ── Treasures ──
        item("pearl", "Pearl", ItemKind::Treasure, ItemEffect::Coins(100.0), Rarity::Common),
        item("nugget", "Nugget", ItemKind::Treasure, ItemEffect::Coins(500.0), Rarity::Uncommon),
        item("star_piece", "Star Piece", ItemKind::Treasure, ItemEffect::Coins(2000.0), Rarity::Epic),
        // ── Candies ──
        item("exp_candy", "EXP Candy", ItemKind::Candy, ItemEffect::TrainerXp(50.0), Rarity::Common),
        item("rare_candy", "Rare Candy", ItemKind::Candy, ItemEffect::TeamXp(500.0), Rarity::Rare),
        // ── Boosters ──
        item("lucky_egg", "Lucky Egg", ItemKind::Booster, boost(EffectKind::Boost, 2.0, 30_000), Rarity::Uncommon),
        item("x_attack", "X Attack", ItemKind::Booster, boost(EffectKind::Frenzy, 3.0, 10_000), Rarity::Rare),
        item(
            "sacred_ash",
            "Sacred Ash",
            ItemKind::Booster,
            boost(EffectKind::Blessing, 5.0, 60_000),
            Rarity::Legendary,
        ),
    ];
}
