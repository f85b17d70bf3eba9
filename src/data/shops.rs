use crate::shared::*;

fn upgrade(id: &str, name: &str, base_cost: f64, cost_growth: f64, effects: Vec<StatEffect>) -> ShopListing {
    ShopListing {
        def: ShopItemDef {
            id: id.into(),
            name: name.into(),
            base_cost,
            cost_growth,
            effects,
        },
        owned: 0,
    }
}

fn stat(stat: Stat, delta: f64) -> StatEffect {
    StatEffect { stat, delta }
}

/// Populate the Shop with every permanent upgrade, all at zero owned.
///
/// Growth sits between 1.2 and 1.35 so that each repeat purchase costs
/// noticeably more than the last.
pub fn populate_shop(shop: &mut Shop) {
    shop.listings = vec![
        upgrade("protein", "Protein", 20.0, 1.2, vec![stat(Stat::ClickPower, 1.0)]),
        upgrade("exp_share", "EXP Share", 50.0, 1.2, vec![stat(Stat::AutoIncome, 1.0)]),
        upgrade("macho_brace", "Macho Brace", 150.0, 1.3, vec![stat(Stat::Multiplier, 0.1)]),
        upgrade(
            "amulet_coin",
            "Amulet Coin",
            1000.0,
            1.35,
            vec![stat(Stat::AutoIncome, 5.0), stat(Stat::ClickPower, 2.0)],
        ),
    ];
}
