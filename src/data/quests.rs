use crate::shared::*;

fn quest(id: &str, title: &str, kind: QuestKind, goal: f64, reward: QuestReward) -> QuestDef {
    QuestDef {
        id: id.into(),
        title: title.into(),
        kind,
        goal,
        reward,
    }
}

pub fn populate_quests(registry: &mut QuestRegistry) {
    registry.quests = vec![
        quest(
            "first_taps",
            "Click 100 times",
            QuestKind::Click,
            100.0,
            QuestReward { coins: 50.0, xp: 20.0, ..Default::default() },
        ),
        quest(
            "nest_egg",
            "Hold 1,000 coins",
            QuestKind::Coins,
            1000.0,
            QuestReward { xp: 100.0, ..Default::default() },
        ),
        quest(
            "regular_customer",
            "Buy 5 upgrades",
            QuestKind::Buy,
            5.0,
            QuestReward { auto_income: 1.0, ..Default::default() },
        ),
        quest(
            "first_catch",
            "Pull your first creature",
            QuestKind::Pull,
            1.0,
            QuestReward { coins: 250.0, ..Default::default() },
        ),
        quest(
            "item_user",
            "Use 3 items",
            QuestKind::UseItem,
            3.0,
            QuestReward { xp: 50.0, ..Default::default() },
        ),
        quest(
            "rising_trainer",
            "Gain 5 trainer levels",
            QuestKind::LevelUp,
            5.0,
            QuestReward { coins: 1000.0, ..Default::default() },
        ),
        quest(
            "click_master",
            "Click 1,000 times",
            QuestKind::Click,
            1000.0,
            QuestReward { coins: 500.0, click_power: 1.0, ..Default::default() },
        ),
        quest(
            "tycoon",
            "Hold 10,000 coins",
            QuestKind::Coins,
            10_000.0,
            QuestReward { multiplier: 0.1, ..Default::default() },
        ),
    ];
}
