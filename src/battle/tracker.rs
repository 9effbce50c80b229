//! Per-unit running combat statistics, keyed by the stable unit id rather
//! than the display name; name-keyed views are derived only at render time.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::battle::{NameMap, Team};

/// Running counters for one unit. Monotonic: the reconstructor only ever
/// adds to these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnitTally {
    pub damage_done: i64,
    pub damage_taken: i64,
    pub healing_done: i64,
    pub armor_repaired: i64,
    pub units_killed: u32,
}

/// One entry per unit across both teams, initialized to zero before any
/// action is processed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatTracker {
    entries: BTreeMap<String, UnitTally>,
}

impl CombatTracker {
    pub fn for_teams(team1: &Team, team2: &Team) -> CombatTracker {
        let entries = team1
            .units()
            .chain(team2.units())
            .map(|unit| (unit.uid.clone(), UnitTally::default()))
            .collect();
        CombatTracker { entries }
    }

    pub fn tally(&self, uid: &str) -> Option<&UnitTally> {
        self.entries.get(uid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UnitTally)> {
        self.entries.iter().map(|(uid, tally)| (uid.as_str(), tally))
    }

    pub(crate) fn add_damage_done(&mut self, uid: &str, amount: i64) {
        if let Some(tally) = self.entries.get_mut(uid) {
            tally.damage_done += amount;
        }
    }

    pub(crate) fn add_damage_taken(&mut self, uid: &str, amount: i64) {
        if let Some(tally) = self.entries.get_mut(uid) {
            tally.damage_taken += amount;
        }
    }

    pub(crate) fn add_healing_done(&mut self, uid: &str, amount: i64) {
        if let Some(tally) = self.entries.get_mut(uid) {
            tally.healing_done += amount;
        }
    }

    pub(crate) fn add_armor_repaired(&mut self, uid: &str, amount: i64) {
        if let Some(tally) = self.entries.get_mut(uid) {
            tally.armor_repaired += amount;
        }
    }

    pub(crate) fn add_kill(&mut self, uid: &str) {
        if let Some(tally) = self.entries.get_mut(uid) {
            tally.units_killed += 1;
        }
    }

    /// Markdown table of one team's counters, in roster order.
    pub fn markdown_table(&self, team: &Team, names: &NameMap) -> String {
        let mut out = String::from(
            "Unit | Damage Done | Damage taken | Healing Done | Armor Repaired | Units Killed\n-|-|-|-|-|-\n",
        );
        for unit in team.units() {
            let tally = self.tally(&unit.uid).copied().unwrap_or_default();
            let name = names.get(&unit.uid).map(String::as_str).unwrap_or(unit.uid.as_str());
            out.push_str(&format!(
                "{name} | {} | {} | {} | {} | {}\n",
                tally.damage_done,
                tally.damage_taken,
                tally.healing_done,
                tally.armor_repaired,
                tally.units_killed,
            ));
        }
        out.push('\n');
        out
    }

    /// CSV export of the counters for the given teams, in roster order.
    pub fn csv_table(&self, teams: &[&Team], names: &NameMap) -> Result<String, String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "unit",
                "team",
                "damage_done",
                "damage_taken",
                "healing_done",
                "armor_repaired",
                "units_killed",
            ])
            .map_err(|e| e.to_string())?;
        for team in teams {
            for unit in team.units() {
                let tally = self.tally(&unit.uid).copied().unwrap_or_default();
                let name =
                    names.get(&unit.uid).map(String::as_str).unwrap_or(unit.uid.as_str());
                writer
                    .write_record([
                        name.to_string(),
                        team.color.label().to_string(),
                        tally.damage_done.to_string(),
                        tally.damage_taken.to_string(),
                        tally.healing_done.to_string(),
                        tally.armor_repaired.to_string(),
                        tally.units_killed.to_string(),
                    ])
                    .map_err(|e| e.to_string())?;
            }
        }
        let bytes = writer.into_inner().map_err(|e| e.error().to_string())?;
        String::from_utf8(bytes).map_err(|e| e.to_string())
    }
}
