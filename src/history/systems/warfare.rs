//! War declaration, battles and settlement

use crate::core::config::SimTunables;
use crate::core::types::{BattleId, CellId, ChangeId, EventId, PolityId, Year};
use crate::history::events::{Actors, Cause, EventKind, EventRefs, TimelineEvent};
use crate::history::war::{
    Battle, BattleResult, BattleType, Casualties, ChangeType, TerritorialChange, Treaty, War,
    WarOutcome, WarSides,
};
use crate::history::world::HistoryWorld;
use crate::spatial::RangeSet;

/// Ids produced by the war phase of one year
#[derive(Debug, Default)]
pub struct WarYear {
    pub events: Vec<EventId>,
    pub changes: Vec<ChangeId>,
}

/// Possibly open a new war this year
///
/// Only runs on interval years. Two roster slots are drawn; drawing the
/// same polity twice produces nothing.
pub fn declare_war(
    world: &mut HistoryWorld,
    year: Year,
    tunables: &SimTunables,
    out: &mut WarYear,
) -> Option<usize> {
    if year.rem_euclid(tunables.war_interval_years as Year) != 0 {
        return None;
    }

    let last = world.polities.len() as i64 - 1;
    let a = world.prng.next_int(0, last) as usize;
    let b = world.prng.next_int(0, last) as usize;
    if a == b {
        return None;
    }

    let (a_id, a_name) = (world.polities[a].id, world.polities[a].name.clone());
    let (b_id, b_name) = (world.polities[b].id, world.polities[b].name.clone());

    let war_id = world.ids.next_war();
    let war = War {
        id: war_id,
        name: format!("{} - {} Conflict", a_name, b_name),
        start_year: year,
        end_year: None,
        sides: WarSides {
            a: vec![a_id],
            b: vec![b_id],
        },
        battles: Vec::new(),
        outcome: WarOutcome::Draw,
        treaty_id: None,
        territorial_changes: Vec::new(),
        explanation: vec!["Border tension and resource disputes escalated into open conflict.".into()],
    };
    tracing::debug!(war = %war_id, year, attacker = %a_id, defender = %b_id, "war declared");

    let event_id = world.ids.next_event();
    world.history.record(TimelineEvent {
        id: event_id,
        year,
        kind: EventKind::WarDeclared,
        title: format!("{} declares war on {}", a_name, b_name),
        actors: Actors {
            primary: vec![a_id],
            secondary: vec![b_id],
        },
        causes: vec![Cause::new("resource_need", 0.4), Cause::new("border_rivalry", 0.6)],
        effects: vec!["mobilization".into(), format!("war:{}", war_id)],
        explanation: vec!["Resource pressures and historic rivalry pushed both polities into war.".into()],
        refs: EventRefs {
            war_id: Some(war_id),
            ..Default::default()
        },
    });
    out.events.push(event_id);

    let index = world.wars.len();
    world.wars.push(war);
    world.active_wars.push(index);
    Some(index)
}

/// Fight this year's battles and try to settle every active war
///
/// Wars are visited in declaration order, including any declared this year.
pub fn resolve_wars(world: &mut HistoryWorld, year: Year, tunables: &SimTunables, out: &mut WarYear) {
    let active = world.active_wars.clone();
    for war_index in active {
        fight_battles(world, war_index, year, tunables);
        try_settle(world, war_index, year, tunables, out);
    }
    world.retire_ended_wars();
}

fn fight_battles(world: &mut HistoryWorld, war_index: usize, year: Year, tunables: &SimTunables) {
    let last_cell = world.cell_count() as i64 - 1;
    let count = world.prng.next_int(
        tunables.battles_per_year_min as i64,
        tunables.battles_per_year_max as i64,
    );

    for _ in 0..count {
        let result = if world.prng.next_float01() > 0.5 {
            BattleResult::AVictory
        } else {
            BattleResult::BVictory
        };
        let location = world.prng.next_int(0, last_cell) as CellId;
        let battle_type = if world.prng.next_float01() > tunables.siege_chance {
            BattleType::Field
        } else {
            BattleType::Siege
        };
        let casualties = Casualties {
            a: world.prng.next_int(tunables.casualty_min as i64, tunables.casualty_max as i64) as u32,
            b: world.prng.next_int(tunables.casualty_min as i64, tunables.casualty_max as i64) as u32,
        };

        let war = &mut world.wars[war_index];
        let id = BattleId {
            war: war.id,
            seq: war.battles.len() as u32 + 1,
        };
        war.battles.push(Battle {
            id,
            year,
            location_cell_id: location,
            battle_type,
            result,
            casualties_estimate: casualties,
            factors: vec!["logistics".into(), "terrain".into(), "morale".into()],
            explanation: vec!["A clash defined by supply lines and terrain advantages.".into()],
        });
    }
}

fn try_settle(
    world: &mut HistoryWorld,
    war_index: usize,
    year: Year,
    tunables: &SimTunables,
    out: &mut WarYear,
) {
    let roll = world.prng.next_float01();
    let (war_id, start_year) = {
        let war = &world.wars[war_index];
        (war.id, war.start_year)
    };
    let old_enough = year - start_year > tunables.war_min_duration_years as Year;
    if !(roll > 1.0 - tunables.war_end_chance && old_enough) {
        return;
    }

    let outcome = if world.prng.next_float01() > 0.5 {
        WarOutcome::AWin
    } else {
        WarOutcome::BWin
    };
    let sides = &world.wars[war_index].sides;
    let (winner, loser) = match (outcome, sides.lead_a(), sides.lead_b()) {
        (WarOutcome::AWin, Some(a), Some(b)) => (a, b),
        (_, Some(a), Some(b)) => (b, a),
        _ => return,
    };

    let Some(cell) = pick_ceded_cell(world, loser) else {
        tracing::debug!(war = %war_id, year, loser = %loser, "settlement skipped, loser holds no land");
        return;
    };

    world.transfer_cell(cell, winner, loser);

    let change_id = world.ids.next_change();
    let treaty_id = world.ids.next_treaty();
    world.changes.push(TerritorialChange {
        id: change_id,
        year,
        change_type: ChangeType::AnnexationPartial,
        winner_polity_id: Some(winner),
        loser_polity_id: Some(loser),
        regions_transferred: RangeSet::new().with_cell(cell),
        reason: "War settlement redrew border regions.".into(),
        linked_war_id: Some(war_id),
        treaty_id: Some(treaty_id),
    });
    world.treaties.push(Treaty {
        id: treaty_id,
        name: format!("Treaty of {}", year),
        year,
        participants: vec![winner, loser],
        terms: vec!["Border adjustments".into(), "War reparations".into()],
    });

    let war = &mut world.wars[war_index];
    war.end_year = Some(year);
    war.outcome = outcome;
    war.treaty_id = Some(treaty_id);
    war.territorial_changes.push(change_id);
    let title = format!("Treaty ends {}", war.name);
    tracing::debug!(war = %war_id, year, winner = %winner, cell, "war settled");

    let event_id = world.ids.next_event();
    world.history.record(TimelineEvent {
        id: event_id,
        year,
        kind: EventKind::WarEnded,
        title,
        actors: Actors {
            primary: vec![winner],
            secondary: vec![loser],
        },
        causes: vec![Cause::new("war_exhaustion", 0.5), Cause::new("logistics_cost", 0.5)],
        effects: vec!["treaty_signed".into(), format!("territory_change:{}", change_id)],
        explanation: vec!["Both sides agreed to a settlement after costly campaigns.".into()],
        refs: EventRefs {
            war_id: Some(war_id),
            treaty_id: Some(treaty_id),
            change_id: Some(change_id),
            battle_id: None,
        },
    });

    out.changes.push(change_id);
    out.events.push(event_id);
}

/// Draw the cell the loser cedes, or `None` (without drawing) if it has none
fn pick_ceded_cell(world: &mut HistoryWorld, loser: PolityId) -> Option<CellId> {
    let held = world.polity(loser).map(|p| p.territory.len()).unwrap_or(0);
    if held == 0 {
        return None;
    }
    let k = world.prng.next_int(0, held as i64 - 1) as usize;
    world.polity(loser).and_then(|p| p.territory.nth(k))
}
