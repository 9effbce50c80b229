//! Roster-level aggregate stats and tactical advisories for one team.
//! Sums cover monsters only; the summoner contributes through pre-battle
//! buff actions and the boost advisories.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::battle::types::{
    RawAction, UnitState, STAT_ARMOR, STAT_ATTACK, STAT_HEALTH, STAT_MAGIC, STAT_RANGED,
    STAT_SPEED,
};
use crate::battle::Team;

const WEAPONS_TRAINING: &str = "Weapons Training";
const TRAINED_TAG: &str = "Trained";
/// Advisories fire when fewer than this many units back a boost.
const BOOST_SYNERGY_MIN: i64 = 3;
const SLOW_TEAM_SPEED: f64 = 3.0;

/// Combined combat stats for one team's monster roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamStats {
    pub attack: i64,
    pub ranged: i64,
    pub magic: i64,
    pub armor: i64,
    pub health: i64,
    pub average_speed: f64,
    /// Occurrences of each ability tag across the roster.
    pub abilities: BTreeMap<String, u32>,
}

impl TeamStats {
    /// Compute the roster totals plus ability-derived and pre-battle
    /// corrections. `pre_battle` is the battle-wide setup action list.
    pub fn compute(team: &Team, pre_battle: &[RawAction]) -> TeamStats {
        let monsters = &team.monsters;
        let n_monsters = monsters.len() as i64;

        let mut stats = TeamStats {
            attack: monsters.iter().map(|m| m.stat(STAT_ATTACK)).sum(),
            ranged: monsters.iter().map(|m| m.stat(STAT_RANGED)).sum(),
            magic: monsters.iter().map(|m| m.stat(STAT_MAGIC)).sum(),
            armor: monsters.iter().map(|m| m.stat(STAT_ARMOR)).sum(),
            health: monsters.iter().map(|m| m.stat(STAT_HEALTH)).sum(),
            average_speed: 0.0,
            abilities: BTreeMap::new(),
        };

        if !monsters.is_empty() {
            let speed_sum: i64 = monsters.iter().map(|m| m.stat(STAT_SPEED)).sum();
            stats.average_speed = round2(speed_sum as f64 / monsters.len() as f64);
        }

        for monster in monsters {
            for ability in &monster.abilities {
                *stats.abilities.entry(ability.clone()).or_insert(0) += 1;
            }
        }

        if let Some(count) = stats.abilities.get("Swiftness") {
            stats.average_speed += f64::from(*count);
        }
        if let Some(count) = stats.abilities.get("Inspire") {
            stats.attack += i64::from(*count) * melee_attackers(team);
        }

        // Weapons Training grants attack stats to otherwise unarmed units;
        // the deltas live in the pre-battle group state.
        let mut trained: BTreeMap<String, (i64, i64, i64)> = BTreeMap::new();
        for action in pre_battle {
            let named_training = action
                .details
                .as_ref()
                .and_then(|d| d.name.as_deref())
                == Some(WEAPONS_TRAINING);
            if !named_training {
                continue;
            }
            let Some(group) = action.group_state.as_deref() else {
                continue;
            };
            for entry in group {
                if !team.contains_uid(&entry.monster) {
                    continue;
                }
                if let Some(delta) = entry.state.as_ref().and_then(trained_delta) {
                    trained.insert(entry.monster.clone(), delta);
                }
            }
        }
        for (attack, ranged, magic) in trained.values() {
            stats.attack += attack;
            stats.ranged += ranged;
            stats.magic += magic;
        }

        // Summoner armor/speed/health buffs; only positive values feed the
        // totals, debuffs are tracked on the opposing summoner instead.
        for action in pre_battle {
            if action.action_type != "buff" {
                continue;
            }
            let Some(details) = action.details.as_ref() else {
                continue;
            };
            if details.name.as_deref() != Some("Summoner") {
                continue;
            }
            let Some(buff_stats) = details.stats.as_ref() else {
                continue;
            };
            for (stat_name, value) in buff_stats {
                if *value <= 0 {
                    continue;
                }
                match stat_name.as_str() {
                    "armor" => stats.armor += value * n_monsters,
                    "speed" => stats.average_speed += *value as f64,
                    "health" => stats.health += value * n_monsters,
                    _ => {}
                }
            }
        }

        stats
    }

    pub fn markdown_table(&self) -> String {
        format!(
            "Attack | Ranged | Magic | Armor | Health | Average Speed\n-|-|-|-|-|-\n{} | {} | {} | {} | {} | {}\n\n",
            self.attack, self.ranged, self.magic, self.armor, self.health, self.average_speed,
        )
    }
}

/// Stat table plus one advisory paragraph per triggered heuristic.
pub fn render_summary(team: &Team, pre_battle: &[RawAction]) -> String {
    let stats = TeamStats::compute(team, pre_battle);
    let mut out = stats.markdown_table();
    for advisory in advisories(team, &stats) {
        out.push_str(&advisory);
    }
    out
}

/// Advisory lines for synergy gaps: boosts without enough units to carry
/// them, and slow rosters without accuracy backup.
pub fn advisories(team: &Team, stats: &TeamStats) -> Vec<String> {
    let mut lines = Vec::new();
    let attackers = melee_attackers(team);
    let rangers = count_positive(team, STAT_RANGED);
    let magics = count_positive(team, STAT_MAGIC);

    if stats.abilities.contains_key("Inspire") && attackers < BOOST_SYNERGY_MIN {
        lines.push(format!(
            "You have a unit with Inspire but only {attackers} melee attackers. Consider adding more melee attackers to more efficiently use this ability.\n\n"
        ));
    }
    for (stat_index, count, kind) in [
        (STAT_ATTACK, attackers, "attack"),
        (STAT_RANGED, rangers, "ranged"),
        (STAT_MAGIC, magics, "magic"),
    ] {
        if team.summoner.stat(stat_index) > 0 && count < BOOST_SYNERGY_MIN {
            let noun = match kind {
                "attack" => "melee",
                other => other,
            };
            lines.push(format!(
                "You have a summoner that boosts {kind} but only {count} {noun} attackers. Consider adding more {noun} attackers to more efficiently use this summoner.\n\n"
            ));
        }
    }
    if stats.average_speed < SLOW_TEAM_SPEED && !stats.abilities.contains_key("True Strike") {
        lines.push(format!(
            "Your team has an average speed of {}. This makes it weak against miss-based defensive strategies.",
            stats.average_speed,
        ));
    }
    lines
}

fn melee_attackers(team: &Team) -> i64 {
    count_positive(team, STAT_ATTACK)
}

fn count_positive(team: &Team, stat_index: usize) -> i64 {
    team.monsters.iter().filter(|m| m.stat(stat_index) > 0).count() as i64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Extract the `("Trained", {attack, ranged, magic})` pair from a group
/// entry's heterogeneous `other` list.
fn trained_delta(state: &UnitState) -> Option<(i64, i64, i64)> {
    let pairs = state.other.as_ref()?.as_array()?;
    for pair in pairs {
        let items = pair.as_array()?;
        if items.first().and_then(|v| v.as_str()) != Some(TRAINED_TAG) {
            continue;
        }
        let delta = items.get(1)?;
        return Some((
            delta.get("attack").and_then(|v| v.as_i64()).unwrap_or(0),
            delta.get("ranged").and_then(|v| v.as_i64()).unwrap_or(0),
            delta.get("magic").and_then(|v| v.as_i64()).unwrap_or(0),
        ));
    }
    None
}
