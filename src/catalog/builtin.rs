//! Built-in creature table, used when no external catalog file is configured.

use super::{CatalogError, CatalogProvider};
use crate::shared::*;

/// (id, name, evolves into, minimum level, flavor text)
type Row = (u32, &'static str, Option<u32>, Option<u32>, &'static str);

const CREATURES: &[Row] = &[
    (1, "Bulbasaur", Some(2), Some(16), "A seed sleeps on its back from birth."),
    (2, "Ivysaur", Some(3), Some(32), "The bud on its back grows heavy."),
    (3, "Venusaur", None, None, "Its flower soaks up sunlight for power."),
    (4, "Charmander", Some(5), Some(16), "The flame on its tail shows its mood."),
    (5, "Charmeleon", Some(6), Some(36), "Swings its burning tail at foes."),
    (6, "Charizard", None, None, "Breathes fire hot enough to melt boulders."),
    (7, "Squirtle", Some(8), Some(16), "Withdraws into its shell to spray water."),
    (8, "Wartortle", Some(9), Some(36), "Its furry tail is a symbol of age."),
    (9, "Blastoise", None, None, "Water cannons burst from its shell."),
    (10, "Caterpie", Some(11), Some(7), "Its short feet grip any surface."),
    (11, "Metapod", Some(12), Some(10), "Hardens its shell and waits."),
    (12, "Butterfree", None, None, "Its wings are coated in toxic dust."),
    (13, "Weedle", Some(14), Some(7), "A sharp stinger sits on its head."),
    (14, "Kakuna", Some(15), Some(10), "Barely moves while it evolves."),
    (15, "Beedrill", None, None, "Attacks in swarms with venomous stingers."),
    (16, "Pidgey", Some(17), Some(18), "Kicks up sand to blind its foes."),
    (17, "Pidgeotto", Some(18), Some(36), "Claims a large territory."),
    (18, "Pidgeot", None, None, "Flies at twice the speed of sound."),
    (19, "Rattata", Some(20), Some(20), "Bites anything when it attacks."),
    (20, "Raticate", None, None, "Its whiskers keep it balanced."),
    (21, "Spearow", Some(22), Some(20), "Flaps its short wings at high speed."),
    (22, "Fearow", None, None, "Can fly all day without landing."),
    (23, "Ekans", Some(24), Some(22), "Swallows eggs whole."),
    (24, "Arbok", None, None, "The pattern on its belly scares foes."),
    (25, "Pikachu", Some(26), None, "Stores electricity in its cheeks."),
    (26, "Raichu", None, None, "Its tail grounds stray electricity."),
    (27, "Sandshrew", Some(28), Some(22), "Burrows deep to stay cool."),
    (28, "Sandslash", None, None, "Curls into a spiny ball."),
    (29, "Nidoran F", Some(30), Some(16), "Small but armed with a potent poison barb."),
    (30, "Nidorina", Some(31), None, "Folds back its spines when resting."),
    (31, "Nidoqueen", None, None, "Its hard scales shield its nest."),
    (32, "Nidoran M", Some(33), Some(16), "Raises its large ears to sense danger."),
    (33, "Nidorino", Some(34), None, "Quick to anger and ready to charge."),
    (34, "Nidoking", None, None, "Its tail can snap a telephone pole."),
    (35, "Clefairy", Some(36), None, "Dances in the light of the full moon."),
    (36, "Clefable", None, None, "Hears a pin drop a kilometer away."),
    (37, "Vulpix", Some(38), None, "Its six tails grow more splendid with age."),
    (38, "Ninetales", None, None, "Said to live for a thousand years."),
    (39, "Jigglypuff", Some(40), None, "Sings a lullaby no one can resist."),
    (40, "Wigglytuff", None, None, "Its fur feels like a fine carpet."),
    (41, "Zubat", Some(42), Some(22), "Navigates by ultrasonic waves."),
    (42, "Golbat", None, None, "Drinks its fill in a single bite."),
    (43, "Oddish", Some(44), Some(21), "Buries itself in soil by day."),
    (44, "Gloom", Some(45), Some(21), "Its nectar smells unbearably foul."),
    (45, "Vileplume", None, None, "Its petals scatter toxic pollen."),
    (46, "Paras", Some(47), Some(24), "Mushrooms grow on its back."),
    (47, "Parasect", None, None, "The mushroom controls its host."),
    (48, "Venonat", Some(49), Some(31), "Its large eyes see in the dark."),
    (49, "Venomoth", None, None, "Shakes poison dust from its wings."),
    (50, "Diglett", Some(51), Some(26), "Lives about one meter underground."),
    (51, "Dugtrio", None, None, "Three heads tunnel as one."),
    (52, "Meowth", Some(53), Some(28), "Loves anything round and shiny."),
    (53, "Persian", None, None, "Moves with elegant, silent grace."),
    (54, "Psyduck", Some(55), Some(33), "A constant headache fuels its powers."),
    (55, "Golduck", None, None, "Swims faster than any athlete."),
    (56, "Mankey", Some(57), Some(28), "Flies into a rage at the slightest thing."),
    (57, "Primeape", None, None, "Chases anyone who angers it."),
    (58, "Growlithe", Some(59), None, "Fiercely loyal to its trainer."),
    (59, "Arcanine", None, None, "Runs ten thousand kilometers in a day."),
    (60, "Poliwag", Some(61), Some(25), "Its skin shows the spiral of its insides."),
    (61, "Poliwhirl", Some(62), None, "Sweats to keep its body slick."),
    (62, "Poliwrath", None, None, "Swims across oceans with ease."),
    (63, "Abra", Some(64), Some(16), "Sleeps eighteen hours a day."),
    (64, "Kadabra", Some(65), None, "Its spoon amplifies its brain waves."),
    (65, "Alakazam", None, None, "Remembers everything it has seen."),
    (66, "Machop", Some(67), Some(28), "Trains by lifting boulders."),
    (67, "Machoke", Some(68), None, "Its belt restrains its power."),
    (68, "Machamp", None, None, "Throws a thousand punches in two seconds."),
    (69, "Bellsprout", Some(70), Some(21), "Snares prey with its vines."),
    (70, "Weepinbell", Some(71), None, "Spits acid that melts iron."),
    (71, "Victreebel", None, None, "Lures prey with sweet nectar."),
    (72, "Tentacool", Some(73), Some(30), "Its body is nearly all water."),
    (73, "Tentacruel", None, None, "Its tentacles stretch without limit."),
    (74, "Geodude", Some(75), Some(25), "Often mistaken for a rock."),
    (75, "Graveler", Some(76), None, "Rolls down mountain paths."),
    (76, "Golem", None, None, "Sheds its shell once a year."),
    (77, "Ponyta", Some(78), Some(40), "Its hooves are harder than diamond."),
    (78, "Rapidash", None, None, "Gallops at two hundred kilometers an hour."),
    (79, "Slowpoke", Some(80), Some(37), "Takes a moment to notice pain."),
    (80, "Slowbro", None, None, "A shell bit its tail and held on."),
    (81, "Magnemite", Some(82), Some(30), "Floats by defying gravity."),
    (82, "Magneton", None, None, "Three units linked by magnetism."),
    (83, "Farfetch'd", None, None, "Never parts with its leek."),
    (84, "Doduo", Some(85), Some(31), "Its two heads never sleep at once."),
    (85, "Dodrio", None, None, "Three heads plan three moves ahead."),
    (86, "Seel", Some(87), Some(34), "Loves to swim in frigid seas."),
    (87, "Dewgong", None, None, "Sleeps on icebergs."),
    (88, "Grimer", Some(89), Some(38), "Born from sludge."),
    (89, "Muk", None, None, "Its touch poisons plants."),
    (90, "Shellder", Some(91), None, "Hides its tongue behind a hard shell."),
    (91, "Cloyster", None, None, "Its shell withstands any blast."),
    (92, "Gastly", Some(93), Some(25), "Made almost entirely of gas."),
    (93, "Haunter", Some(94), None, "Licks its prey to make it shiver."),
    (94, "Gengar", None, None, "Hides in shadows on moonlit nights."),
    (95, "Onix", None, None, "Tunnels at eighty kilometers an hour."),
    (96, "Drowzee", Some(97), Some(26), "Eats the dreams of sleepers."),
    (97, "Hypno", None, None, "Swings a pendulum to hypnotize."),
    (98, "Krabby", Some(99), Some(28), "Lives in holes along the beach."),
    (99, "Kingler", None, None, "One claw is far too heavy."),
    (100, "Voltorb", Some(101), Some(30), "Looks exactly like a capsule."),
    (101, "Electrode", None, None, "Explodes at the lightest touch."),
    (102, "Exeggcute", Some(103), None, "Six seeds that think as one."),
    (103, "Exeggutor", None, None, "Each head thinks its own thoughts."),
    (104, "Cubone", Some(105), Some(28), "Wears the skull of its mother."),
    (105, "Marowak", None, None, "Wields a bone as a club."),
    (106, "Hitmonlee", None, None, "Its legs stretch to kick from afar."),
    (107, "Hitmonchan", None, None, "Punches faster than the eye can follow."),
    (108, "Lickitung", None, None, "Its tongue is twice its height."),
    (109, "Koffing", Some(110), Some(35), "Its body is full of toxic gas."),
    (110, "Weezing", None, None, "Two bodies share one cloud of gas."),
    (111, "Rhyhorn", Some(112), Some(42), "Charges in a straight line."),
    (112, "Rhydon", None, None, "Its horn can crush raw diamonds."),
    (113, "Chansey", None, None, "Shares its eggs with the injured."),
    (114, "Tangela", None, None, "Hidden beneath a mass of vines."),
    (115, "Kangaskhan", None, None, "Raises its young in its pouch."),
    (116, "Horsea", Some(117), Some(32), "Shoots ink at large foes."),
    (117, "Seadra", None, None, "Its spines are sharp and venomous."),
    (118, "Goldeen", Some(119), Some(33), "Swims upstream in spring."),
    (119, "Seaking", None, None, "Builds its nest in riverbeds."),
    (120, "Staryu", Some(121), None, "Its core glows at night."),
    (121, "Starmie", None, None, "Its core glows in seven colors."),
    (122, "Mr. Mime", None, None, "Builds invisible walls with its hands."),
    (123, "Scyther", None, None, "Slashes with its scythes."),
    (124, "Jynx", None, None, "Sways its hips as it walks."),
    (125, "Electabuzz", None, None, "Appears at power plants."),
    (126, "Magmar", None, None, "Its body burns with fire."),
    (127, "Pinsir", None, None, "Crushes prey between its horns."),
    (128, "Tauros", None, None, "Lashes itself with its tails."),
    (129, "Magikarp", Some(130), Some(20), "Flops around without purpose."),
    (130, "Gyarados", None, None, "Rampages once it is enraged."),
    (131, "Lapras", None, None, "Ferries people across the sea."),
    (132, "Ditto", None, None, "Copies any form it sees."),
    (133, "Eevee", Some(134), None, "Its genes adapt to any surroundings."),
    (134, "Vaporeon", None, None, "Melts into water and vanishes."),
    (135, "Jolteon", None, None, "Its fur bristles with static."),
    (136, "Flareon", None, None, "Stores heat in a flame sac."),
    (137, "Porygon", None, None, "Built entirely from code."),
    (138, "Omanyte", Some(139), Some(40), "Revived from an ancient fossil."),
    (139, "Omastar", None, None, "Its heavy shell slowed it down."),
    (140, "Kabuto", Some(141), Some(40), "Revived from an ancient fossil."),
    (141, "Kabutops", None, None, "Slices prey with its sharp claws."),
    (142, "Aerodactyl", None, None, "A ferocious flier from ancient times."),
    (143, "Snorlax", None, None, "Wakes only to eat."),
    (144, "Articuno", None, None, "A legendary bird of ice."),
    (145, "Zapdos", None, None, "A legendary bird of thunder."),
    (146, "Moltres", None, None, "A legendary bird of flame."),
    (147, "Dratini", Some(148), Some(30), "Sheds its skin as it grows."),
    (148, "Dragonair", Some(149), Some(55), "Controls the weather around it."),
    (149, "Dragonite", None, None, "Circles the globe in sixteen hours."),
    (150, "Mewtwo", None, None, "Created by genetic manipulation."),
    (151, "Mew", None, None, "Said to carry the genes of every creature."),
];

const LEGENDARY_IDS: &[u32] = &[144, 145, 146, 150, 151];
const EPIC_IDS: &[u32] = &[3, 6, 9, 38, 59, 65, 68, 94, 130, 143, 149];

/// Species whose earlier form is outside this table. They are not base forms.
const HAS_EARLIER_FORM: &[u32] = &[25, 35, 39, 106, 107, 113, 122, 124, 125, 126, 143];

pub fn rarity_for(id: u32) -> Rarity {
    if LEGENDARY_IDS.contains(&id) {
        Rarity::Legendary
    } else if EPIC_IDS.contains(&id) {
        Rarity::Epic
    } else if id % 10 == 0 {
        Rarity::Rare
    } else if id % 5 == 0 {
        Rarity::Uncommon
    } else {
        Rarity::Common
    }
}

fn rule_ref(name: &str) -> String {
    name.to_lowercase()
}

/// Static Gen-1 style table. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl CatalogProvider for BuiltinCatalog {
    fn list_creatures(&self) -> Result<Vec<CreatureDef>, CatalogError> {
        let defs = CREATURES
            .iter()
            .map(|&(id, name, next, _, flavor)| CreatureDef {
                id,
                name: name.to_string(),
                sprite_ref: format!("sprites/{id}.png"),
                rarity: rarity_for(id),
                is_base_form: !HAS_EARLIER_FORM.contains(&id)
                    && !CREATURES.iter().any(|row| row.2 == Some(id)),
                bonus_category: BonusCategory::for_species(id),
                evolution_rule: next.map(|_| rule_ref(name)),
                flavor_text: flavor.to_string(),
            })
            .collect();
        Ok(defs)
    }

    fn evolution_rule(&self, rule: &str) -> Result<EvolutionRule, CatalogError> {
        CREATURES
            .iter()
            .find(|row| row.2.is_some() && rule_ref(row.1) == rule)
            .and_then(|&(_, _, next, min_level, _)| {
                next.map(|successor_id| EvolutionRule {
                    successor_id,
                    min_level,
                })
            })
            .ok_or_else(|| CatalogError::UnknownRule(rule.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_rules() {
        assert_eq!(rarity_for(150), Rarity::Legendary);
        assert_eq!(rarity_for(144), Rarity::Legendary);
        assert_eq!(rarity_for(147), Rarity::Common);
        assert_eq!(rarity_for(148), Rarity::Common);
        assert_eq!(rarity_for(149), Rarity::Epic);
        assert_eq!(rarity_for(6), Rarity::Epic);
        assert_eq!(rarity_for(130), Rarity::Epic);
        assert_eq!(rarity_for(20), Rarity::Rare);
        assert_eq!(rarity_for(25), Rarity::Uncommon);
        assert_eq!(rarity_for(1), Rarity::Common);
    }

    #[test]
    fn test_base_forms_are_not_evolution_targets() {
        let defs = BuiltinCatalog.list_creatures().unwrap();
        let bulbasaur = defs.iter().find(|d| d.id == 1).unwrap();
        let ivysaur = defs.iter().find(|d| d.id == 2).unwrap();
        assert!(bulbasaur.is_base_form);
        assert!(!ivysaur.is_base_form);
        assert_eq!(bulbasaur.evolution_rule.as_deref(), Some("bulbasaur"));
        assert!(defs.iter().find(|d| d.id == 151).unwrap().evolution_rule.is_none());
    }

    #[test]
    fn test_full_table() {
        let defs = BuiltinCatalog.list_creatures().unwrap();
        assert_eq!(defs.len(), 151);
        assert!(defs.iter().enumerate().all(|(i, d)| d.id == i as u32 + 1));
        assert_eq!(defs.iter().filter(|d| d.is_base_form).count(), 70);
        // Pichu line starts outside the table
        assert!(!defs[24].is_base_form);
        assert!(defs[128].is_base_form);
    }

    #[test]
    fn test_evolution_targets_exist() {
        let ids: Vec<u32> = CREATURES.iter().map(|row| row.0).collect();
        for &(_, _, next, _, _) in CREATURES {
            if let Some(next) = next {
                assert!(ids.contains(&next), "missing target {next}");
            }
        }
    }

    #[test]
    fn test_evolution_rule_lookup() {
        let rule = BuiltinCatalog.evolution_rule("charmander").unwrap();
        assert_eq!(rule.successor_id, 5);
        assert_eq!(rule.min_level, Some(16));

        let stone = BuiltinCatalog.evolution_rule("pikachu").unwrap();
        assert_eq!(stone.min_level, None);

        assert!(BuiltinCatalog.evolution_rule("mew").is_err());
    }
}
