//! Console front end: stdin lines become action events, the player log is
//! echoed back to stdout.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Mutex;

use crate::bonuses::compute_power;
use crate::economy::coins::format_coins;
use crate::economy::shop::listing_cost;
use crate::progression::xp_to_next;
use crate::shared::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Click(u32),
    Buy(String),
    Claim(String),
    Use(String),
    Pull,
    TeamAdd(CreatureUid),
    TeamRemove(usize),
    Save,
    Load,
    Reset,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "commands: click [n] | buy <id> | claim <id> | use <id> | pull | \
team add <uid> | team rm <slot> | save | load | reset | status | quit";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        ["click"] | ["c"] => Command::Click(1),
        ["click", n] | ["c", n] => Command::Click(parse_number(n)?),
        ["buy", id] => Command::Buy(id.to_string()),
        ["claim", id] => Command::Claim(id.to_string()),
        ["use", id] => Command::Use(id.to_string()),
        ["pull"] => Command::Pull,
        ["team", "add", uid] => Command::TeamAdd(parse_number(uid)?),
        ["team", "rm", slot] => Command::TeamRemove(parse_number(slot)?),
        ["save"] => Command::Save,
        ["load"] => Command::Load,
        ["reset"] => Command::Reset,
        ["status"] | ["s"] => Command::Status,
        ["help"] | ["?"] => Command::Help,
        ["quit"] | ["exit"] => Command::Quit,
        [] => return Err("empty command".into()),
        _ => return Err(format!("unknown command '{}'", line.trim())),
    };
    Ok(command)
}

fn parse_number<T: std::str::FromStr>(word: &str) -> Result<T, String> {
    word.parse().map_err(|_| format!("'{word}' is not a number"))
}

/// Lines read from stdin by a background thread.
#[derive(Resource)]
pub struct ConsoleInput(pub Mutex<Receiver<String>>);

impl ConsoleInput {
    pub fn spawn_stdin_reader() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self(Mutex::new(rx))
    }
}

/// Newest log line already echoed, so only fresh lines are printed.
#[derive(Resource, Default)]
struct EchoedLog(Option<String>);

pub struct ConsolePlugin;

impl Plugin for ConsolePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EchoedLog>()
            .add_systems(
                PreUpdate,
                read_console_commands
                    .run_if(resource_exists::<ConsoleInput>)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Last, echo_player_log);
    }
}

#[derive(SystemParam)]
struct ActionWriters<'w> {
    clicks: EventWriter<'w, ClickEvent>,
    purchases: EventWriter<'w, PurchaseRequestEvent>,
    claims: EventWriter<'w, ClaimQuestEvent>,
    uses: EventWriter<'w, UseItemEvent>,
    pulls: EventWriter<'w, GachaPullEvent>,
    assigns: EventWriter<'w, AssignTeamEvent>,
    removals: EventWriter<'w, RemoveTeamEvent>,
    saves: EventWriter<'w, SaveRequestEvent>,
    loads: EventWriter<'w, LoadRequestEvent>,
    resets: EventWriter<'w, ResetRequestEvent>,
    exit: EventWriter<'w, AppExit>,
}

/// The single point where console input becomes game actions.
fn read_console_commands(
    console: Res<ConsoleInput>,
    mut writers: ActionWriters,
    state: Res<PlayerState>,
    shop: Res<Shop>,
    creatures: Res<CreatureRegistry>,
) {
    let Ok(rx) = console.0.lock() else {
        return;
    };
    loop {
        let line = match rx.try_recv() {
            Ok(line) => line,
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                info!("[Input] stdin closed, saving and exiting");
                writers.saves.send(SaveRequestEvent);
                writers.exit.send(AppExit::Success);
                break;
            }
        };
        match parse_command(&line) {
            Ok(command) => dispatch(command, &mut writers, &state, &shop, &creatures),
            Err(e) => println!("{e}\n{HELP}"),
        }
    }
}

fn dispatch(
    command: Command,
    writers: &mut ActionWriters,
    state: &PlayerState,
    shop: &Shop,
    creatures: &CreatureRegistry,
) {
    match command {
        Command::Click(n) => {
            writers.clicks.send_batch((0..n).map(|_| ClickEvent));
        }
        Command::Buy(item_id) => {
            writers.purchases.send(PurchaseRequestEvent { item_id });
        }
        Command::Claim(quest_id) => {
            writers.claims.send(ClaimQuestEvent { quest_id });
        }
        Command::Use(item_id) => {
            writers.uses.send(UseItemEvent { item_id });
        }
        Command::Pull => {
            writers.pulls.send(GachaPullEvent);
        }
        Command::TeamAdd(uid) => {
            writers.assigns.send(AssignTeamEvent { uid });
        }
        Command::TeamRemove(slot) => {
            writers.removals.send(RemoveTeamEvent { slot });
        }
        Command::Save => {
            writers.saves.send(SaveRequestEvent);
        }
        Command::Load => {
            writers.loads.send(LoadRequestEvent);
        }
        Command::Reset => {
            writers.resets.send(ResetRequestEvent);
        }
        Command::Status => println!("{}", status_report(state, shop, creatures)),
        Command::Help => println!("{HELP}"),
        Command::Quit => {
            writers.saves.send(SaveRequestEvent);
            writers.exit.send(AppExit::Success);
        }
    }
}

/// Multi-line summary of the economy for the `status` command.
pub fn status_report(state: &PlayerState, shop: &Shop, creatures: &CreatureRegistry) -> String {
    let power = compute_power(state, creatures);
    let mut out = format!(
        "coins {} | score {} | level {} ({:.0}/{:.0} xp)\nclick {:.2} | income {:.2}/s | gacha {}",
        format_coins(state.coins),
        format_coins(state.score),
        state.level,
        state.xp,
        xp_to_next(state.level),
        power.click,
        power.income,
        format_coins(state.gacha_price),
    );
    for listing in &shop.listings {
        out.push_str(&format!(
            "\n  shop {:<12} x{:<3} {}",
            listing.def.id,
            listing.owned,
            format_coins(listing_cost(listing))
        ));
    }
    for quest in &state.quests {
        out.push_str(&format!(
            "\n  quest {:<16} {:.0}/{:.0} {:?}",
            quest.id,
            quest.progress.min(quest.goal),
            quest.goal,
            quest.status()
        ));
    }
    for stack in &state.inventory {
        out.push_str(&format!("\n  item {} x{}", stack.item_id, stack.count));
    }
    for creature in &state.collection {
        let slot = state.team.iter().position(|s| *s == Some(creature.uid));
        out.push_str(&format!(
            "\n  uid {:<4} {:<12} lv {:<3}{}",
            creature.uid,
            creatures.name_of(creature.catalog_id),
            creature.level,
            slot.map(|s| format!(" [team {s}]")).unwrap_or_default()
        ));
    }
    out
}

fn echo_player_log(state: Res<PlayerState>, mut echoed: ResMut<EchoedLog>) {
    let Some(latest) = state.log.latest() else {
        return;
    };
    if echoed.0.as_deref() == Some(latest) {
        return;
    }
    let fresh: Vec<&String> = state
        .log
        .entries()
        .take_while(|line| Some(line.as_str()) != echoed.0.as_deref())
        .collect();
    for line in fresh.iter().rev() {
        println!("{line}");
    }
    echoed.0 = Some(latest.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("click"), Ok(Command::Click(1)));
        assert_eq!(parse_command("  click 25 "), Ok(Command::Click(25)));
        assert_eq!(parse_command("buy protein"), Ok(Command::Buy("protein".into())));
        assert_eq!(parse_command("team add 7"), Ok(Command::TeamAdd(7)));
        assert_eq!(parse_command("team rm 2"), Ok(Command::TeamRemove(2)));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_command("").is_err());
        assert!(parse_command("click many").is_err());
        assert!(parse_command("dance").is_err());
        assert!(parse_command("team add").is_err());
    }

    #[test]
    fn test_status_report_lists_shop() {
        let mut shop = Shop::default();
        crate::data::populate_shop(&mut shop);
        let report = status_report(&PlayerState::default(), &shop, &CreatureRegistry::default());
        assert!(report.contains("protein"));
        assert!(report.contains("level 1"));
    }
}
