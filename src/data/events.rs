use crate::shared::*;

pub fn populate_events(registry: &mut EventRegistry) {
    registry.events = vec![
        EventDef {
            id: "meteor_shower".into(),
            name: "Meteor Shower".into(),
            icon: "☄️".into(),
            effect: EventEffect::Windfall { coins: 100.0 },
            marker_ms: 5_000,
        },
        EventDef {
            id: "lucky_day".into(),
            name: "Lucky Day".into(),
            icon: "🍀".into(),
            effect: EventEffect::Windfall { coins: 500.0 },
            marker_ms: 5_000,
        },
        EventDef {
            id: "click_frenzy".into(),
            name: "Click Frenzy".into(),
            icon: "🔥".into(),
            effect: EventEffect::Buff {
                kind: EffectKind::Frenzy,
                value: 7.0,
                duration_ms: 10_000,
            },
            marker_ms: 10_000,
        },
        EventDef {
            id: "rainbow_blessing".into(),
            name: "Rainbow Blessing".into(),
            icon: "🌈".into(),
            effect: EventEffect::Buff {
                kind: EffectKind::Blessing,
                value: 2.0,
                duration_ms: 30_000,
            },
            marker_ms: 30_000,
        },
    ];
}
